use crate::collection::CollectionStore;
use crate::kv::{keys, StoreError};
use card_model::{now_millis, uid};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub(crate) const DEFAULT_BINDER_NAME: &str = "Main Binder";

/// A named binder. Binders are labels a UI hangs views off of; cards do
/// not belong to a binder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binder {
    pub id: String,
    pub name: String,
    pub created_at: u64,
}

impl CollectionStore {
    /// The binder registry, materializing the default binder on first
    /// access so the UI always has somewhere to land.
    pub fn binders(&mut self) -> Result<Vec<Binder>, StoreError> {
        let mut binders = self.load_binders();
        if binders.is_empty() {
            binders.push(Binder {
                id: uid("binder"),
                name: DEFAULT_BINDER_NAME.to_string(),
                created_at: now_millis(),
            });
            self.save_binders(&binders)?;
            info!("Materialized default binder");
        }
        Ok(binders)
    }

    /// Create a binder with a distinct, non-empty name. Names are
    /// compared case-insensitively, so "main binder" collides with the
    /// default.
    pub fn create_binder(&mut self, name: &str) -> Result<Binder, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyBinderName);
        }

        let mut binders = self.binders()?;
        let lowered = name.to_lowercase();
        if binders.iter().any(|b| b.name.to_lowercase() == lowered) {
            return Err(StoreError::DuplicateBinderName);
        }

        let binder = Binder {
            id: uid("binder"),
            name: name.to_string(),
            created_at: now_millis(),
        };
        binders.insert(0, binder.clone()); // newest-first, like cards
        self.save_binders(&binders)?;
        info!("Created binder '{}'", binder.name);
        Ok(binder)
    }

    fn load_binders(&self) -> Vec<Binder> {
        let Some(text) = self.kv.get(keys::BINDERS) else {
            return Vec::new();
        };
        match serde_json::from_str(&text) {
            Ok(binders) => binders,
            Err(e) => {
                warn!("Stored binder list is unreadable ({}). Starting empty.", e);
                Vec::new()
            }
        }
    }

    fn save_binders(&mut self, binders: &[Binder]) -> Result<(), StoreError> {
        let json = serde_json::to_string(binders).map_err(|source| StoreError::Encode {
            key: keys::BINDERS.to_string(),
            source,
        })?;
        self.kv.set(keys::BINDERS, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    fn memory_store() -> CollectionStore {
        CollectionStore::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_default_binder_materializes_once() {
        let mut store = memory_store();
        let first = store.binders().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, DEFAULT_BINDER_NAME);

        let second = store.binders().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_create_binder_prepends() {
        let mut store = memory_store();
        store.create_binder("Trade Stock").unwrap();
        let binders = store.binders().unwrap();
        assert_eq!(binders.len(), 2);
        assert_eq!(binders[0].name, "Trade Stock");
        assert_eq!(binders[1].name, DEFAULT_BINDER_NAME);
    }

    #[test]
    fn test_create_binder_rejects_blank_names() {
        let mut store = memory_store();
        assert!(matches!(
            store.create_binder("   "),
            Err(StoreError::EmptyBinderName)
        ));
    }

    #[test]
    fn test_create_binder_rejects_duplicates_case_insensitively() {
        let mut store = memory_store();
        assert!(matches!(
            store.create_binder("main BINDER"),
            Err(StoreError::DuplicateBinderName)
        ));
        store.create_binder("Vintage").unwrap();
        assert!(matches!(
            store.create_binder("  vintage "),
            Err(StoreError::DuplicateBinderName)
        ));
    }
}
