//! Durable card collection over a small key-value interface.
//!
//! The store owns three JSON-encoded keys: the card list (newest-first),
//! the manual order overlays (one id list per view), and the binder
//! registry. Every mutating call writes through synchronously; unreadable
//! stored data degrades to empty rather than failing.

mod binder;
mod collection;
mod kv;
mod order;
pub mod page;

pub use binder::Binder;
pub use collection::{CollectionStore, CollectionTotals, UpsertOutcome};
pub use kv::{keys, JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use order::ViewKey;
