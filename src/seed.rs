use card_model::{CardCandidate, GameDetails};
use card_store::StoreError;
use tracing::info;

use crate::Cardflow;

/// The well-known cards an empty collection is seeded with for demos.
pub(crate) fn demo_cards() -> Vec<CardCandidate> {
    let demo = [
        ("Pikachu", "Scarlet & Violet", "Paldea Evolved", "Rare", "1", 2),
        ("Charizard", "Scarlet & Violet", "Obsidian Flames", "Ultra Rare", "2", 2),
        ("Gengar", "Sword & Shield", "Lost Origin", "Holo Rare", "3", 1),
        ("Mewtwo", "Sun & Moon", "Unified Minds", "Rare", "4", 1),
        ("Eevee", "Sword & Shield", "Evolving Skies", "Uncommon", "5", 1),
        ("Snorlax", "Sun & Moon", "Team Up", "Rare", "6", 1),
        ("Lucario", "Diamond & Pearl", "Majestic Dawn", "Holo Rare", "7", 1),
        ("Infernape", "Diamond & Pearl", "Stormfront", "Rare", "8", 1),
        ("Blastoise", "Base Set", "Base Set", "Rare Holo", "9", 1),
        ("Venusaur", "Base Set", "Base Set", "Rare Holo", "10", 1),
    ];

    demo.into_iter()
        .map(|(name, series, expansion, rarity, number, qty)| {
            let mut c = CardCandidate::new(name, series, expansion, number);
            c.rarity = rarity.to_string();
            c.qty = qty;
            c.game = GameDetails::Pokemon(Default::default());
            c
        })
        .collect()
}

impl Cardflow {
    /// Fill an empty collection with demo cards through the public
    /// upsert path. Returns whether anything was seeded; a collection
    /// with cards is left alone.
    pub fn seed_demo(&mut self) -> Result<bool, StoreError> {
        if !self.store.list().is_empty() {
            return Ok(false);
        }

        let cards = demo_cards();
        let count = cards.len();
        for candidate in cards {
            self.store.upsert(candidate)?;
        }
        info!("Seeded {} demo cards", count);
        Ok(true)
    }
}
