//! Locating and loading decks from a data directory or site.
//!
//! Two layouts are supported. The deck layout has `data/decks/index.json` listing one file
//! per deck, each optionally paired with a reference document for coverage. The legacy
//! layout (`data/cards/`) predates decks and is exposed as a single deck.

pub mod legacy;
pub mod source;

use serde_json::Value;
use tracing::{
    info,
    warn,
};

use crate::{
    core::{
        utils::scalar_text,
        Deck,
        DeckMeta,
        FlashdeckError,
    },
    coverage::{
        ClassificationRules,
        Reference,
    },
    deck::normalize_deck,
};
use source::{
    join_path,
    DocumentSource,
};

pub const DECKS_DIR: &str = "data/decks/";
pub const DECKS_INDEX: &str = "data/decks/index.json";
pub const LEGACY_DIR: &str = "data/cards/";
pub const LEGACY_INDEX: &str = "data/cards/index.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogMode {
    Decks(Vec<DeckMeta>),
    Legacy,
}

/// A deck ready for display, with its reference document when one is configured.
#[derive(Debug, Clone)]
pub struct LoadedDeck {
    pub meta: DeckMeta,
    pub deck: Deck,
    pub reference: Option<Reference>,
    /// Loaded from the legacy layout, which always opens on its first card.
    pub legacy: bool,
}

pub struct Catalog<S: DocumentSource> {
    source: S,
    mode: CatalogMode,
    rules: ClassificationRules,
}

impl<S: DocumentSource> Catalog<S> {
    /// Opens the deck layout, falling back to the legacy layout when it is unavailable.
    pub fn open(source: S, rules: ClassificationRules) -> Result<Self, FlashdeckError> {
        let mode = match load_deck_index(&source) {
            Ok(entries) => {
                info!("Loaded deck index with {} decks from {}", entries.len(), source.describe());
                CatalogMode::Decks(entries)
            }
            Err(decks_err) => {
                warn!("Deck index not available, falling back to legacy cards: {}", decks_err);
                legacy::probe(&source).map_err(|legacy_err| FlashdeckError::CatalogUnavailable {
                    decks: decks_err.to_string(),
                    legacy: legacy_err.to_string(),
                })?;
                CatalogMode::Legacy
            }
        };

        Ok(Self { source, mode, rules })
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self.mode, CatalogMode::Legacy)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Entries offered for selection; the legacy layout exposes a single entry.
    pub fn entries(&self) -> Vec<DeckMeta> {
        match &self.mode {
            CatalogMode::Decks(entries) => entries.clone(),
            CatalogMode::Legacy => vec![legacy_meta()],
        }
    }

    /// Loads a deck by id. An unknown or absent id selects the first deck.
    pub fn load_deck(&self, deck_id: Option<&str>) -> Result<LoadedDeck, FlashdeckError> {
        let entries = match &self.mode {
            CatalogMode::Legacy => {
                let deck = legacy::load_legacy_deck(&self.source)?;
                let meta = legacy_meta();
                return Ok(LoadedDeck { meta, deck, reference: None, legacy: true });
            }
            CatalogMode::Decks(entries) => entries,
        };

        let meta = select_entry(entries, deck_id)?.clone();

        let raw = self.source.fetch_json(&join_path(DECKS_DIR, &meta.file))?;
        let deck = normalize_deck(&raw, &meta.id);
        let reference = self.load_reference(&meta)?;

        Ok(LoadedDeck { meta, deck, reference, legacy: false })
    }

    fn load_reference(&self, meta: &DeckMeta) -> Result<Option<Reference>, FlashdeckError> {
        let Some(file) = meta.reference.as_deref() else {
            return Ok(None);
        };

        match self.source.fetch_optional(&join_path(DECKS_DIR, file))? {
            Some(raw) => Ok(Some(Reference::from_raw(&raw, self.rules))),
            None => {
                info!("Reference {} for deck {} not found, coverage disabled", file, meta.id);
                Ok(None)
            }
        }
    }
}

fn select_entry<'a>(
    entries: &'a [DeckMeta],
    deck_id: Option<&str>,
) -> Result<&'a DeckMeta, FlashdeckError> {
    let first = entries.first().ok_or(FlashdeckError::EmptyDeckIndex)?;

    match deck_id {
        Some(id) => match entries.iter().find(|meta| meta.id == id) {
            Some(meta) => Ok(meta),
            None => {
                warn!("Unknown deck {:?}, using {}", id, first.id);
                Ok(first)
            }
        },
        None => Ok(first),
    }
}

fn legacy_meta() -> DeckMeta {
    DeckMeta {
        id: legacy::LEGACY_DECK_ID.to_string(),
        title: legacy::LEGACY_DECK_TITLE.to_string(),
        file: LEGACY_INDEX.to_string(),
        reference: None,
    }
}

/// Reads `data/decks/index.json`, keeping entries with both an id and a file.
pub fn load_deck_index<S: DocumentSource + ?Sized>(
    source: &S,
) -> Result<Vec<DeckMeta>, FlashdeckError> {
    let index = source.fetch_json(DECKS_INDEX)?;
    let raw_entries = match index.get("decks") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Err(FlashdeckError::EmptyDeckIndex),
    };

    let entries: Vec<DeckMeta> = raw_entries.iter().filter_map(parse_deck_meta).collect();
    if entries.is_empty() {
        return Err(FlashdeckError::EmptyDeckIndex);
    }

    Ok(entries)
}

fn parse_deck_meta(raw: &Value) -> Option<DeckMeta> {
    let text = |field: &str| raw.get(field).and_then(scalar_text);

    let id = text("id")?;
    let file = text("file")?;
    let title = text("title").unwrap_or_default();
    let reference = text("ref").or_else(|| text("reference"));

    Some(DeckMeta { id, title, file, reference })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        source::MemorySource,
        *,
    };
    use crate::coverage::{
        compute_coverage,
        MatchMode,
    };

    fn deck_source() -> MemorySource {
        MemorySource::new()
            .with(
                DECKS_INDEX,
                json!({
                    "decks": [
                        {
                            "id": "physique",
                            "title": "Physique",
                            "file": "physique.json",
                            "ref": "refs/physique.json"
                        },
                        { "id": "chimie", "file": "chimie.json", "ref": "refs/absent.json" },
                        { "id": "", "file": "nope.json" },
                        { "id": "orphan" }
                    ]
                }),
            )
            .with(
                "data/decks/physique.json",
                json!({
                    "title": "Physique",
                    "cards": [
                        { "lo": "FL-1.1.1", "notion": "Force" },
                        { "lo": "FL-1.1.2", "notion": "Masse" }
                    ]
                }),
            )
            .with(
                "data/decks/chimie.json",
                json!({ "id": "chimie-v2", "cards": [{ "notion": "Atome" }] }),
            )
            .with("data/decks/refs/physique.json", json!({ "expected": ["FL-1.1.1", "FL-1.1.3"] }))
    }

    #[test]
    fn test_open_deck_catalog() {
        let catalog = Catalog::open(deck_source(), ClassificationRules::default()).unwrap();
        assert!(!catalog.is_legacy());

        let ids: Vec<String> = catalog.entries().into_iter().map(|meta| meta.id).collect();
        assert_eq!(ids, vec!["physique", "chimie"]);
        assert_eq!(catalog.entries()[1].display_title(), "chimie");
    }

    #[test]
    fn test_load_deck_with_reference() {
        let catalog = Catalog::open(deck_source(), ClassificationRules::default()).unwrap();
        let loaded = catalog.load_deck(Some("physique")).unwrap();

        assert_eq!(loaded.deck.id, "physique");
        assert_eq!(loaded.deck.cards.len(), 2);
        assert!(!loaded.legacy);

        let reference = loaded.reference.expect("reference should load");
        assert_eq!(reference.match_mode, MatchMode::Lo);

        let coverage = compute_coverage(&loaded.deck, Some(&reference));
        assert_eq!(coverage.covered_count, 1);
        assert_eq!(coverage.missing, vec!["FL-1.1.3".to_string()]);
    }

    #[test]
    fn test_absent_reference_is_not_an_error() {
        let catalog = Catalog::open(deck_source(), ClassificationRules::default()).unwrap();
        let loaded = catalog.load_deck(Some("chimie")).unwrap();

        assert_eq!(loaded.deck.id, "chimie-v2");
        assert_eq!(loaded.meta.id, "chimie");
        assert!(loaded.reference.is_none());
    }

    #[test]
    fn test_unknown_deck_selects_first() {
        let catalog = Catalog::open(deck_source(), ClassificationRules::default()).unwrap();
        assert_eq!(catalog.load_deck(Some("biologie")).unwrap().meta.id, "physique");
        assert_eq!(catalog.load_deck(None).unwrap().meta.id, "physique");
    }

    #[test]
    fn test_falls_back_to_legacy() {
        let source = MemorySource::new()
            .with(DECKS_INDEX, json!({ "decks": [] }))
            .with(LEGACY_INDEX, json!({ "cards": [{ "id": "p1", "file": "p1.json" }] }))
            .with("data/cards/p1.json", json!({ "nom": "Curie", "prenom": "Marie" }));

        let catalog = Catalog::open(source, ClassificationRules::default()).unwrap();
        assert!(catalog.is_legacy());
        assert_eq!(catalog.entries().len(), 1);

        let loaded = catalog.load_deck(Some("whatever")).unwrap();
        assert_eq!(loaded.deck.id, legacy::LEGACY_DECK_ID);
        assert_eq!(loaded.deck.cards[0].notion, "Marie Curie");
        assert!(loaded.reference.is_none());
        assert!(loaded.legacy);
    }

    #[test]
    fn test_no_catalog_at_all() {
        let err = Catalog::open(MemorySource::new(), ClassificationRules::default()).err().unwrap();
        assert!(matches!(err, FlashdeckError::CatalogUnavailable { .. }));
    }

    #[test]
    fn test_index_without_usable_entries() {
        let source = MemorySource::new().with(DECKS_INDEX, json!({ "decks": [{ "title": "x" }] }));
        assert!(matches!(load_deck_index(&source), Err(FlashdeckError::EmptyDeckIndex)));

        let source = MemorySource::new().with(DECKS_INDEX, json!({ "items": [] }));
        assert!(matches!(load_deck_index(&source), Err(FlashdeckError::EmptyDeckIndex)));
    }
}
