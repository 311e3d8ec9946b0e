//! Card schema and the small pure helpers every other crate shares:
//! merge-identity normalization, printed-number parsing, and the set
//! metadata catalog.

mod card;
mod number;
mod sets;

pub use card::{
    now_millis, uid, Card, CardCandidate, CardImage, CardPatch, GameDetails, IdentityKey,
    IdentityPolicy, MtgFields, PokemonFields,
};
pub use number::{default_card_cmp, parse_number_parts, NumberParts};
pub use sets::{Expansion, Series, SetCatalog, SetOption};
