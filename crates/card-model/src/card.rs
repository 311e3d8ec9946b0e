use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single owned card in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Opaque unique id, assigned at creation, immutable.
    pub id: String,
    pub name: String,
    pub series: String,
    pub expansion: String,
    /// Printed card number as it appears on the card, e.g. "4/102".
    pub number: String,
    pub rarity: String,
    /// Copies owned, always at least 1.
    pub qty: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub game: GameDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CardImage>,
    /// Estimated market value of a single copy.
    #[serde(default)]
    pub value: f64,
    /// Epoch milliseconds.
    pub created_at: u64,
    pub updated_at: u64,
}

/// Game-specific attributes, one variant per supported game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameDetails {
    #[default]
    Unknown,
    Pokemon(PokemonFields),
    Mtg(MtgFields),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PokemonFields {
    pub hp: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub ability: String,
    pub attacks: String,
    pub illustrator: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MtgFields {
    pub mana_cost: String,
    pub card_type: String,
    pub rules_text: String,
    pub power_toughness: String,
    pub artist: String,
}

/// Card artwork: either pixels embedded as a data URL or a remote
/// reference. Merging never downgrades an existing image to nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CardImage {
    Embedded { data_url: String },
    Remote { url: String },
}

/// Input to `upsert`: the fields a form, a lookup service, or a scan
/// produced. A `qty` of 0 means "unspecified" and is treated as 1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardCandidate {
    pub name: String,
    pub series: String,
    pub expansion: String,
    pub number: String,
    pub rarity: String,
    pub qty: u32,
    pub notes: String,
    pub game: GameDetails,
    pub image: Option<CardImage>,
    pub value: f64,
}

impl CardCandidate {
    pub fn new(name: &str, series: &str, expansion: &str, number: &str) -> Self {
        Self {
            name: name.to_string(),
            series: series.to_string(),
            expansion: expansion.to_string(),
            number: number.to_string(),
            qty: 1,
            ..Self::default()
        }
    }

    pub fn identity(&self, policy: IdentityPolicy) -> IdentityKey {
        policy.key_for(&self.series, &self.expansion, &self.name, &self.number, &self.rarity)
    }
}

impl Card {
    pub fn identity(&self, policy: IdentityPolicy) -> IdentityKey {
        policy.key_for(&self.series, &self.expansion, &self.name, &self.number, &self.rarity)
    }
}

/// Partial update for an existing card; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardPatch {
    pub name: Option<String>,
    pub series: Option<String>,
    pub expansion: Option<String>,
    pub number: Option<String>,
    pub rarity: Option<String>,
    pub qty: Option<u32>,
    pub notes: Option<String>,
    pub game: Option<GameDetails>,
    pub image: Option<CardImage>,
    pub value: Option<f64>,
}

/// How candidates are matched against stored cards. The baseline tuple is
/// {series, expansion, name, number}; stricter setups also compare rarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityPolicy {
    pub include_rarity: bool,
}

/// Normalized classification tuple two cards are compared by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub series: String,
    pub expansion: String,
    pub name: String,
    pub number: String,
    pub rarity: Option<String>,
}

impl IdentityPolicy {
    pub fn key_for(
        &self,
        series: &str,
        expansion: &str,
        name: &str,
        number: &str,
        rarity: &str,
    ) -> IdentityKey {
        IdentityKey {
            series: normalize(series),
            expansion: normalize(expansion),
            name: normalize(name),
            number: normalize(number),
            rarity: self.include_rarity.then(|| normalize(rarity)),
        }
    }
}

/// Trim and case-fold a field for identity comparison.
fn normalize(field: &str) -> String {
    field.trim().to_lowercase()
}

/// Generate a prefixed unique id, e.g. `card_6fa459ea-...`.
pub fn uid(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}

/// Wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_normalizes_case_and_whitespace() {
        let policy = IdentityPolicy::default();
        let a = CardCandidate::new("  Charizard ", "Base", "Base Set", "4/102");
        let b = CardCandidate::new("charizard", "base ", " BASE SET", "4/102");
        assert_eq!(a.identity(policy), b.identity(policy));
    }

    #[test]
    fn test_identity_rarity_policy() {
        let mut a = CardCandidate::new("Charizard", "Base", "Base Set", "4/102");
        a.rarity = "Holo Rare".into();
        let mut b = a.clone();
        b.rarity = "Rare".into();

        let baseline = IdentityPolicy::default();
        assert_eq!(a.identity(baseline), b.identity(baseline));

        let strict = IdentityPolicy { include_rarity: true };
        assert_ne!(a.identity(strict), b.identity(strict));
    }

    #[test]
    fn test_card_wire_shape() {
        let card = Card {
            id: "card_1".into(),
            name: "Pikachu".into(),
            series: "Scarlet & Violet".into(),
            expansion: "Paldea Evolved".into(),
            number: "1".into(),
            rarity: "Rare".into(),
            qty: 2,
            notes: String::new(),
            game: GameDetails::Pokemon(PokemonFields {
                hp: "60".into(),
                ..PokemonFields::default()
            }),
            image: None,
            value: 1.5,
            created_at: 1,
            updated_at: 2,
        };
        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("\"createdAt\":1"));
        assert!(json.contains("\"kind\":\"pokemon\""));
        assert!(json.contains("\"hp\":\"60\""));
        // Absent image is omitted entirely, so a later merge can tell
        // "no image supplied" from "image cleared".
        assert!(!json.contains("\"image\""));

        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn test_uid_prefixes() {
        let id = uid("card");
        assert!(id.starts_with("card_"));
        assert_ne!(uid("card"), uid("card"));
    }
}
