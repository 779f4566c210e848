pub mod catalog;
pub mod config;
pub mod core;
pub mod coverage;
pub mod deck;
pub mod images;
pub mod persistence;
pub mod render;
pub mod session;

pub use catalog::{
    Catalog,
    LoadedDeck,
};
pub use config::Settings;
pub use crate::core::{
    Card,
    CardImage,
    Deck,
    DeckMeta,
    FlashdeckError,
};
pub use coverage::{
    compute_coverage,
    ClassificationRules,
    CoverageResult,
    MatchMode,
    Reference,
};
pub use deck::normalize_deck;
pub use images::ImageProvider;
pub use session::{
    PositionStore,
    Session,
};
