//! Binder-app core: a durable card collection with paginated binder
//! views, manual reordering, and a photo-to-card scan pipeline.
//!
//! The facade owns the collection store and the set catalog and exposes
//! the operations a front end calls: CRUD and merge-upsert, filtered and
//! manually ordered views, padded binder pages and two-page spreads, and
//! scan-to-candidate wiring. The member crates stay independent;
//! everything here is composition.

mod lookup;
mod scan;
mod seed;

pub use card_capture::{capture_frame, CaptureError, StillSource, VideoSource};
pub use card_model::{
    default_card_cmp, parse_number_parts, Card, CardCandidate, CardImage, CardPatch, Expansion,
    GameDetails, IdentityPolicy, MtgFields, NumberParts, PokemonFields, Series, SetCatalog,
    SetOption,
};
pub use card_store::{
    page::{LIST_PAGE_SIZE, SLOTS_PER_PAGE},
    Binder, CollectionStore, CollectionTotals, JsonFileStore, KeyValueStore, MemoryStore,
    StoreError, UpsertOutcome, ViewKey,
};
pub use card_vision::{
    capture_and_warp, detect_card_quad, order_corners, rectify, recognize_text, GameGuess,
    OcrEngine, Point, Quad, Recognition, RectifyError, ScanOutcome, TesseractOcr,
};
pub use lookup::{CardLookup, LookupQuery};
pub use scan::{scan_to_candidate, ScannedCard};

use card_store::page;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Which slice of the collection a view shows. Empty fields match
/// everything; `search` narrows by case-insensitive name substring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFilter {
    pub series: String,
    pub expansion: String,
    pub search: String,
}

impl ViewFilter {
    /// The unfiltered global view.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_set(series: &str, expansion: &str) -> Self {
        Self {
            series: series.to_string(),
            expansion: expansion.to_string(),
            search: String::new(),
        }
    }

    fn matches(&self, card: &Card) -> bool {
        self.matches_set(card)
            && (self.search.is_empty()
                || card
                    .name
                    .to_lowercase()
                    .contains(&self.search.to_lowercase()))
    }

    /// Set-level match only. Reorders key off this, so a search box does
    /// not fragment the saved order.
    fn matches_set(&self, card: &Card) -> bool {
        (self.series.is_empty() || card.series == self.series)
            && (self.expansion.is_empty() || card.expansion == self.expansion)
    }

    fn view_key(&self) -> ViewKey {
        ViewKey::new(&self.series, &self.expansion)
    }
}

/// One rendered binder page: exactly `slots.len()` pockets, empty ones
/// padded with `None`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinderPage {
    pub page_index: usize,
    pub total_pages: usize,
    pub slots: Vec<Option<Card>>,
}

/// An open binder: two facing 9-pocket pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinderSpread {
    pub spread_index: usize,
    pub total_spreads: usize,
    pub left: Vec<Option<Card>>,
    pub right: Vec<Option<Card>>,
}

/// The application core a front end talks to.
pub struct Cardflow {
    store: CollectionStore,
    catalog: SetCatalog,
}

impl Cardflow {
    /// Open (or create) a collection in `data_dir`, loading the set
    /// catalog from the same directory.
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let store = CollectionStore::new(Box::new(JsonFileStore::open(data_dir)?));
        let catalog = SetCatalog::load(data_dir)?;
        info!("Opened collection at {}", data_dir.display());
        Ok(Self { store, catalog })
    }

    /// A collection that lives and dies with the process. Used by tests
    /// and previews.
    pub fn in_memory() -> Self {
        Self::with_store(CollectionStore::new(Box::new(MemoryStore::new())))
    }

    pub fn with_store(store: CollectionStore) -> Self {
        Self {
            store,
            catalog: SetCatalog::default(),
        }
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CollectionStore {
        &mut self.store
    }

    pub fn catalog(&self) -> &SetCatalog {
        &self.catalog
    }

    pub fn reload_catalog(&mut self) -> anyhow::Result<()> {
        self.catalog.reload()
    }

    // Collection CRUD, delegated to the store.

    pub fn add_card(&mut self, candidate: CardCandidate) -> Result<UpsertOutcome, StoreError> {
        self.store.upsert(candidate)
    }

    pub fn card(&self, id: &str) -> Option<Card> {
        self.store.get(id)
    }

    pub fn update_card(&mut self, id: &str, patch: CardPatch) -> Result<Option<Card>, StoreError> {
        self.store.update(id, patch)
    }

    pub fn delete_card(&mut self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(id)
    }

    /// All cards in persisted (newest-first) order.
    pub fn cards(&self) -> Vec<Card> {
        self.store.list()
    }

    pub fn totals(&self) -> CollectionTotals {
        self.store.totals()
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.clear()
    }

    pub fn binders(&mut self) -> Result<Vec<Binder>, StoreError> {
        self.store.binders()
    }

    pub fn create_binder(&mut self, name: &str) -> Result<Binder, StoreError> {
        self.store.create_binder(name)
    }

    // Views.

    /// The cards a view shows, in display order: the view's saved manual
    /// order first, the rest sorted by printed number.
    pub fn cards_for(&self, filter: &ViewFilter) -> Vec<Card> {
        let matching: Vec<Card> = self
            .store
            .list()
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        self.store.resolve_display_order(&filter.view_key(), &matching)
    }

    /// One binder page, clamped into range and padded with empty slots
    /// to exactly `page_size`.
    pub fn page(&self, filter: &ViewFilter, page_index: usize, page_size: usize) -> BinderPage {
        let cards = self.cards_for(filter);
        let total_pages = page::page_count(cards.len(), page_size);
        let page_index = page::clamp_page_index(page_index, total_pages);

        let mut slots: Vec<Option<Card>> = page::slice_page(&cards, page_index, page_size)
            .iter()
            .cloned()
            .map(Some)
            .collect();
        slots.resize(page_size.max(1), None);

        BinderPage {
            page_index,
            total_pages,
            slots,
        }
    }

    /// Two facing 9-pocket pages. Spread N shows cards 18N..18N+17.
    pub fn spread(&self, filter: &ViewFilter, spread_index: usize) -> BinderSpread {
        let window = page::SLOTS_PER_PAGE * 2;
        let cards = self.cards_for(filter);
        let total_spreads = page::page_count(cards.len(), window);
        let spread_index = page::clamp_page_index(spread_index, total_spreads);

        let visible = page::slice_page(&cards, spread_index, window);
        let split = visible.len().min(page::SLOTS_PER_PAGE);
        let (left, right) = visible.split_at(split);

        let mut left: Vec<Option<Card>> = left.iter().cloned().map(Some).collect();
        let mut right: Vec<Option<Card>> = right.iter().cloned().map(Some).collect();
        left.resize(page::SLOTS_PER_PAGE, None);
        right.resize(page::SLOTS_PER_PAGE, None);

        BinderSpread {
            spread_index,
            total_spreads,
            left,
            right,
        }
    }

    /// Move a card between display positions in a view and persist the
    /// resulting order. Indices address the set-filtered list; an active
    /// search changes what is shown, not what is movable.
    pub fn move_card(
        &mut self,
        filter: &ViewFilter,
        from: usize,
        to: usize,
    ) -> Result<(), StoreError> {
        let matching: Vec<Card> = self
            .store
            .list()
            .into_iter()
            .filter(|c| filter.matches_set(c))
            .collect();
        self.store.move_card(&filter.view_key(), &matching, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, series: &str, expansion: &str, number: &str) -> CardCandidate {
        CardCandidate::new(name, series, expansion, number)
    }

    #[test]
    fn test_end_to_end_upsert_merge_delete() {
        let mut app = Cardflow::in_memory();
        assert!(app.cards().is_empty());

        let first = app
            .add_card(candidate("Charizard", "Base", "Base Set", "4/102"))
            .unwrap();
        assert!(!first.merged);
        assert_eq!(first.card.qty, 1);

        let second = app
            .add_card(candidate("Charizard", "Base", "Base Set", "4/102"))
            .unwrap();
        assert!(second.merged);
        assert_eq!(second.card.qty, 2);
        assert_eq!(second.card.id, first.card.id);

        // Pin the card into an overlay, then make sure deletion purges it
        let filter = ViewFilter::for_set("Base", "Base Set");
        app.move_card(&filter, 0, 0).unwrap();
        assert!(!app.store().order_for(&filter.view_key()).is_empty());

        assert!(app.delete_card(&first.card.id).unwrap());
        assert!(app.cards().is_empty());
        assert!(app.store().order_for(&filter.view_key()).is_empty());
    }

    #[test]
    fn test_page_pads_and_clamps() {
        let mut app = Cardflow::in_memory();
        for i in 0..11 {
            let name = format!("Card {}", i);
            let number = format!("{}/102", i + 1);
            app.add_card(candidate(&name, "Base", "Base Set", &number))
                .unwrap();
        }

        let page = app.page(&ViewFilter::all(), 1, 9);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.slots.len(), 9);
        assert_eq!(page.slots.iter().filter(|s| s.is_some()).count(), 2);

        // Out-of-range index clamps to the last page
        let clamped = app.page(&ViewFilter::all(), 99, 9);
        assert_eq!(clamped.page_index, 1);

        // Empty view still renders one blank page
        let empty = app.page(&ViewFilter::for_set("None", "None"), 0, 9);
        assert_eq!(empty.total_pages, 1);
        assert_eq!(empty.slots.len(), 9);
        assert!(empty.slots.iter().all(|s| s.is_none()));
    }

    #[test]
    fn test_spread_splits_left_and_right() {
        let mut app = Cardflow::in_memory();
        for i in 0..12 {
            let name = format!("Card {}", i);
            let number = format!("{}/102", i + 1);
            app.add_card(candidate(&name, "Base", "Base Set", &number))
                .unwrap();
        }

        let spread = app.spread(&ViewFilter::all(), 0);
        assert_eq!(spread.total_spreads, 1);
        assert_eq!(spread.left.len(), 9);
        assert_eq!(spread.right.len(), 9);
        assert!(spread.left.iter().all(|s| s.is_some()));
        assert_eq!(spread.right.iter().filter(|s| s.is_some()).count(), 3);

        // Display order is by printed number, so the left page starts at 1/102
        let first = spread.left[0].as_ref().unwrap();
        assert_eq!(first.number, "1/102");
    }

    #[test]
    fn test_filters_and_search() {
        let mut app = Cardflow::in_memory();
        app.add_card(candidate("Pikachu", "SV", "Paldea Evolved", "1"))
            .unwrap();
        app.add_card(candidate("Charizard", "Base", "Base Set", "4/102"))
            .unwrap();
        app.add_card(candidate("Blastoise", "Base", "Base Set", "2/102"))
            .unwrap();

        let base = app.cards_for(&ViewFilter::for_set("Base", "Base Set"));
        assert_eq!(base.len(), 2);

        let mut search = ViewFilter::all();
        search.search = "CHAR".into();
        let hits = app.cards_for(&search);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Charizard");
    }

    #[test]
    fn test_move_uses_set_scope_not_search_scope() {
        let mut app = Cardflow::in_memory();
        app.add_card(candidate("Alpha", "Base", "Base Set", "1/102"))
            .unwrap();
        app.add_card(candidate("Beta", "Base", "Base Set", "2/102"))
            .unwrap();
        app.add_card(candidate("Gamma", "Base", "Base Set", "3/102"))
            .unwrap();

        // A search is active, but indices still address the whole set view
        let mut filter = ViewFilter::for_set("Base", "Base Set");
        filter.search = "gamma".into();
        app.move_card(&filter, 2, 0).unwrap();

        let shown: Vec<String> = app
            .cards_for(&ViewFilter::for_set("Base", "Base Set"))
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(shown, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[test]
    fn test_wire_shapes_are_camel_case() {
        let mut app = Cardflow::in_memory();
        let outcome = app
            .add_card(candidate("Pikachu", "SV", "Paldea Evolved", "1"))
            .unwrap();
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"merged\":false"));
        assert!(json.contains("\"createdAt\""));

        let page = app.page(&ViewFilter::all(), 0, 9);
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"pageIndex\":0"));
        assert!(json.contains("\"totalPages\":1"));
    }

    #[test]
    fn test_open_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sets.json"),
            r#"{"series":[{"name":"Base","expansions":[{"name":"Base Set","code":"BS","releaseYear":1999}]}]}"#,
        )
        .unwrap();

        let id = {
            let mut app = Cardflow::open(dir.path()).unwrap();
            assert_eq!(app.catalog().series().len(), 1);
            app.add_card(candidate("Charizard", "Base", "Base Set", "4/102"))
                .unwrap()
                .card
                .id
        };

        let app = Cardflow::open(dir.path()).unwrap();
        assert_eq!(app.card(&id).unwrap().name, "Charizard");
    }

    #[test]
    fn test_seed_demo_is_idempotent() {
        let mut app = Cardflow::in_memory();
        assert!(app.seed_demo().unwrap());
        let totals = app.totals();
        assert_eq!(app.cards().len(), 10);
        // Pikachu and Charizard are seeded with two copies each
        assert_eq!(totals.count, 12);

        assert!(!app.seed_demo().unwrap());
        assert_eq!(app.cards().len(), 10);
    }

    struct FixedOcr(&'static str);

    impl OcrEngine for FixedOcr {
        fn is_available(&self) -> bool {
            true
        }
        fn extract_text(&self, _image: &image::RgbaImage) -> String {
            self.0.to_string()
        }
    }

    struct FixtureLookup;

    impl CardLookup for FixtureLookup {
        fn search(&self, query: &LookupQuery) -> Vec<CardCandidate> {
            if query.name.to_lowercase().contains("pikachu") {
                vec![candidate("Pikachu", "Base", "Base Set", "25/102")]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn test_scan_to_candidate_flows_into_upsert() {
        let frame = image::RgbaImage::from_pixel(100, 100, image::Rgba([12, 12, 12, 255]));
        let mut source = StillSource::from_image(frame);
        let ocr = FixedOcr("Pikachu\nHP 60\nWeakness Fighting\n25/102");

        let scan = scan_to_candidate(&mut source, &ocr, Some(&FixtureLookup)).unwrap();
        // Featureless frame: raw fallback, but text still recognized
        assert!(!scan.used_warp);
        assert_eq!(scan.recognition.game, GameGuess::Pokemon);
        assert_eq!(scan.candidate.name, "Pikachu");
        // Lookup filled in the set
        assert_eq!(scan.candidate.series, "Base");

        let mut app = Cardflow::in_memory();
        let outcome = app.add_card(scan.candidate).unwrap();
        assert!(!outcome.merged);
        assert_eq!(outcome.card.number, "25/102");
    }
}
