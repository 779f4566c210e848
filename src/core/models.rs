use serde::{
    Deserialize,
    Serialize,
};

/// Illustration attached to a card. `alt` is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardImage {
    pub src: String,
    pub alt: String,
}

/// Canonical flashcard.
///
/// Serializes with the newest deck schema field names (`explication`, `exemple`) so that a
/// canonical deck written back to disk is itself a valid raw deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub lo: Option<String>,
    pub notion: String,
    #[serde(rename = "explication")]
    pub explanation: String,
    #[serde(rename = "exemple")]
    pub example: String,
    pub image: Option<CardImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }
}

/// Entry of the deck catalog (`data/decks/index.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckMeta {
    pub id: String,
    pub title: String,
    pub file: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl DeckMeta {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}
