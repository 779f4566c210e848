pub mod errors;
pub mod models;
pub mod utils;

pub use errors::FlashdeckError;
pub use models::{
    Card,
    CardImage,
    Deck,
    DeckMeta,
};
