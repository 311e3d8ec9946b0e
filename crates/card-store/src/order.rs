use std::collections::HashMap;

use crate::collection::CollectionStore;
use crate::kv::{keys, StoreError};
use card_model::{default_card_cmp, Card};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Identifies the binder view an order overlay belongs to. The global
/// view (no set filter) has both fields empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewKey {
    pub series: String,
    pub expansion: String,
}

impl ViewKey {
    pub fn new(series: &str, expansion: &str) -> Self {
        Self {
            series: series.to_string(),
            expansion: expansion.to_string(),
        }
    }

    /// Storage key for this view's overlay. "||" cannot occur inside a
    /// single field without making the two views identical anyway.
    pub fn signature(&self) -> String {
        format!("{}||{}", self.series, self.expansion)
    }
}

type OrderMap = HashMap<String, Vec<String>>;

impl CollectionStore {
    /// The saved id order for a view, or empty when the view was never
    /// manually rearranged.
    pub fn order_for(&self, view: &ViewKey) -> Vec<String> {
        self.load_orders()
            .remove(&view.signature())
            .unwrap_or_default()
    }

    pub fn save_order(&mut self, view: &ViewKey, ids: Vec<String>) -> Result<(), StoreError> {
        let mut orders = self.load_orders();
        orders.insert(view.signature(), ids);
        self.save_orders(&orders)
    }

    /// Arrange `cards` for display: saved ids first (in saved order, ids
    /// that no longer resolve are dropped), then everything the overlay
    /// does not mention, sorted by printed number.
    pub fn resolve_display_order(&self, view: &ViewKey, cards: &[Card]) -> Vec<Card> {
        let saved = self.order_for(view);
        let mut remaining: Vec<&Card> = cards.iter().collect();
        let mut ordered: Vec<Card> = Vec::with_capacity(cards.len());

        for id in &saved {
            if let Some(pos) = remaining.iter().position(|c| &c.id == id) {
                ordered.push(remaining.remove(pos).clone());
            }
        }

        remaining.sort_by(|a, b| default_card_cmp(a, b));
        ordered.extend(remaining.into_iter().cloned());
        ordered
    }

    /// Move the card at display position `from` so it lands at `to`,
    /// splice-style: the card is lifted out first, so a move toward the
    /// end inserts one slot earlier than the raw target.
    ///
    /// Persists the full resolved id list, freezing the current layout
    /// even when the move is a no-op.
    pub fn move_card(
        &mut self,
        view: &ViewKey,
        cards: &[Card],
        from: usize,
        to: usize,
    ) -> Result<(), StoreError> {
        let mut ids: Vec<String> = self
            .resolve_display_order(view, cards)
            .into_iter()
            .map(|c| c.id)
            .collect();
        if from >= ids.len() {
            return Ok(());
        }

        let id = ids.remove(from);
        let target = if to > from { to - 1 } else { to };
        let target = target.min(ids.len());
        ids.insert(target, id);
        debug!(
            "Moved card {} -> {} in view '{}'",
            from,
            target,
            view.signature()
        );
        self.save_order(view, ids)
    }

    /// Drop a deleted card's id from every overlay that mentions it.
    pub(crate) fn purge_from_orders(&mut self, id: &str) -> Result<(), StoreError> {
        let mut orders = self.load_orders();
        let mut changed = false;
        for ids in orders.values_mut() {
            let before = ids.len();
            ids.retain(|saved| saved != id);
            changed |= ids.len() != before;
        }
        if changed {
            self.save_orders(&orders)?;
        }
        Ok(())
    }

    fn load_orders(&self) -> OrderMap {
        let Some(text) = self.kv.get(keys::ORDERS) else {
            return OrderMap::new();
        };
        match serde_json::from_str(&text) {
            Ok(orders) => orders,
            Err(e) => {
                warn!("Stored order overlays are unreadable ({}). Starting empty.", e);
                OrderMap::new()
            }
        }
    }

    fn save_orders(&mut self, orders: &OrderMap) -> Result<(), StoreError> {
        let json = serde_json::to_string(orders).map_err(|source| StoreError::Encode {
            key: keys::ORDERS.to_string(),
            source,
        })?;
        self.kv.set(keys::ORDERS, &json)
    }
}
