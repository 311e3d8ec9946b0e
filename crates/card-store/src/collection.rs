use crate::kv::{keys, KeyValueStore, StoreError};
use card_model::{now_millis, uid, Card, CardCandidate, CardPatch, IdentityPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of an upsert: whether an existing card absorbed the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    pub merged: bool,
    pub card: Card,
}

/// Collection-wide stats for header displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionTotals {
    /// Total copies owned (sum of quantities).
    pub count: u64,
    /// Sum of per-copy value times quantity.
    pub total_value: f64,
}

/// The canonical card collection over a key-value backend.
pub struct CollectionStore {
    pub(crate) kv: Box<dyn KeyValueStore>,
    policy: IdentityPolicy,
}

impl CollectionStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            policy: IdentityPolicy::default(),
        }
    }

    /// Use a stricter or looser merge identity than the default
    /// {series, expansion, name, number} tuple.
    pub fn with_identity_policy(kv: Box<dyn KeyValueStore>, policy: IdentityPolicy) -> Self {
        Self { kv, policy }
    }

    pub fn identity_policy(&self) -> IdentityPolicy {
        self.policy
    }

    /// All cards, newest-first. This is the persisted order, not the
    /// display order a view resolves.
    pub fn list(&self) -> Vec<Card> {
        self.load_cards()
    }

    pub fn get(&self, id: &str) -> Option<Card> {
        self.load_cards().into_iter().find(|c| c.id == id)
    }

    /// Add the candidate, or merge it into the card with the same
    /// normalized identity tuple.
    ///
    /// A merge sums quantities, takes a non-empty candidate name, and
    /// takes a supplied image without ever blanking an existing one; a
    /// miss prepends a new card. Other fields are edited via `update`.
    pub fn upsert(&mut self, candidate: CardCandidate) -> Result<UpsertOutcome, StoreError> {
        let mut cards = self.load_cards();
        let key = candidate.identity(self.policy);
        let add_qty = candidate.qty.max(1);

        if let Some(existing) = cards.iter_mut().find(|c| c.identity(self.policy) == key) {
            existing.qty = existing.qty.saturating_add(add_qty).max(1);
            if !candidate.name.trim().is_empty() {
                existing.name = candidate.name;
            }
            // Never blank an existing image
            if candidate.image.is_some() {
                existing.image = candidate.image;
            }
            existing.updated_at = now_millis();

            let card = existing.clone();
            self.save_cards(&cards)?;
            debug!("Merged candidate into {} (qty now {})", card.id, card.qty);
            return Ok(UpsertOutcome { merged: true, card });
        }

        let now = now_millis();
        let card = Card {
            id: uid("card"),
            name: candidate.name,
            series: candidate.series,
            expansion: candidate.expansion,
            number: candidate.number,
            rarity: candidate.rarity,
            qty: add_qty,
            notes: candidate.notes,
            game: candidate.game,
            image: candidate.image,
            value: candidate.value,
            created_at: now,
            updated_at: now,
        };
        cards.insert(0, card.clone()); // newest-first
        self.save_cards(&cards)?;
        debug!("Added {} ('{}')", card.id, card.name);
        Ok(UpsertOutcome {
            merged: false,
            card,
        })
    }

    /// Apply a partial update and bump `updatedAt`. Returns the updated
    /// card, or `None` when the id is unknown (a no-op, not an error).
    pub fn update(&mut self, id: &str, patch: CardPatch) -> Result<Option<Card>, StoreError> {
        let mut cards = self.load_cards();
        let Some(card) = cards.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            card.name = name;
        }
        if let Some(series) = patch.series {
            card.series = series;
        }
        if let Some(expansion) = patch.expansion {
            card.expansion = expansion;
        }
        if let Some(number) = patch.number {
            card.number = number;
        }
        if let Some(rarity) = patch.rarity {
            card.rarity = rarity;
        }
        if let Some(qty) = patch.qty {
            card.qty = qty.max(1);
        }
        if let Some(notes) = patch.notes {
            card.notes = notes;
        }
        if let Some(game) = patch.game {
            card.game = game;
        }
        if let Some(image) = patch.image {
            card.image = Some(image);
        }
        if let Some(value) = patch.value {
            card.value = value;
        }
        card.updated_at = now_millis();

        let updated = card.clone();
        self.save_cards(&cards)?;
        Ok(Some(updated))
    }

    /// Remove a card and purge its id from every saved order overlay, so
    /// stale ids never accumulate. Returns whether a card was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut cards = self.load_cards();
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            return Ok(false);
        }

        self.save_cards(&cards)?;
        self.purge_from_orders(id)?;
        info!("Deleted card {}", id);
        Ok(true)
    }

    /// Wipe cards, order overlays, and binders (reset / demo-seed flow).
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.kv.remove(keys::CARDS)?;
        self.kv.remove(keys::ORDERS)?;
        self.kv.remove(keys::BINDERS)?;
        info!("Collection cleared");
        Ok(())
    }

    /// Header stats: total copies owned and summed market value.
    pub fn totals(&self) -> CollectionTotals {
        let cards = self.load_cards();
        CollectionTotals {
            count: cards.iter().map(|c| u64::from(c.qty)).sum(),
            total_value: cards.iter().map(|c| c.value * f64::from(c.qty)).sum(),
        }
    }

    pub(crate) fn load_cards(&self) -> Vec<Card> {
        let Some(text) = self.kv.get(keys::CARDS) else {
            return Vec::new();
        };
        match serde_json::from_str(&text) {
            Ok(cards) => cards,
            Err(e) => {
                warn!("Stored card list is unreadable ({}). Starting empty.", e);
                Vec::new()
            }
        }
    }

    pub(crate) fn save_cards(&mut self, cards: &[Card]) -> Result<(), StoreError> {
        let json = serde_json::to_string(cards).map_err(|source| StoreError::Encode {
            key: keys::CARDS.to_string(),
            source,
        })?;
        self.kv.set(keys::CARDS, &json)
    }
}
