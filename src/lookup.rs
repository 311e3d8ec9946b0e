use card_model::CardCandidate;

/// Search terms for a card database, built from scan recognition or a
/// form. Empty fields are not part of the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupQuery {
    pub name: String,
    pub number: String,
    pub expansion: String,
}

/// A card database that can turn partial fields into full candidates,
/// e.g. a Scryfall or pokemontcg.io client.
///
/// Lookups are best-effort: backends surface failures as empty result
/// lists, so manual entry always works without one.
pub trait CardLookup {
    fn search(&self, query: &LookupQuery) -> Vec<CardCandidate>;
}
