//! Normalization of raw deck documents into the canonical [`Deck`] shape.
//!
//! Several historical schemas coexist in the data directory. Text fields that were renamed
//! over time are looked up through ordered candidate lists, newest name first.

use serde_json::Value;

use crate::core::{
    utils::{
        first_present,
        padded_position,
        present_text,
        safe_text,
        DEFAULT_DECK_TITLE,
        DEFAULT_IMAGE_CAPTION,
        PLACEHOLDER,
    },
    Card,
    CardImage,
    Deck,
};

pub const EXPLANATION_FIELDS: &[&str] = &["explication", "definition"];

pub const EXAMPLE_FIELDS: &[&str] = &["exemple", "example"];

/// Builds a canonical deck from any JSON value.
///
/// Never fails: missing or malformed parts fall back to defaults. `fallback_id` is used when
/// the document carries no usable `id`.
pub fn normalize_deck(raw: &Value, fallback_id: &str) -> Deck {
    let id = present_text(raw.get("id")).unwrap_or_else(|| fallback_id.to_string());
    let title = present_text(raw.get("title")).unwrap_or_else(|| DEFAULT_DECK_TITLE.to_string());
    let description = present_text(raw.get("description"));

    let cards = match raw.get("cards") {
        Some(Value::Array(cards)) => {
            cards.iter().enumerate().map(|(idx, card)| normalize_card(card, idx)).collect()
        }
        _ => Vec::new(),
    };

    Deck { id, title, description, cards }
}

/// Normalizes one raw card found at 0-based position `idx`.
pub fn normalize_card(raw: &Value, idx: usize) -> Card {
    let id = present_text(raw.get("id")).unwrap_or_else(|| padded_position(idx));
    let notion = safe_text(raw.get("notion"));
    let explanation = safe_text(first_present(raw, EXPLANATION_FIELDS));
    let example = safe_text(first_present(raw, EXAMPLE_FIELDS));
    let lo = present_text(raw.get("lo"));
    let image = raw.get("image").and_then(|image| normalize_image(image, &notion));

    Card { id, lo, notion, explanation, example, image }
}

fn normalize_image(raw: &Value, notion: &str) -> Option<CardImage> {
    let src = raw.get("src").and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())?;

    let alt = raw
        .get("alt")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| image_caption(notion));

    Some(CardImage { src: src.to_string(), alt })
}

/// Alt text derived from a card title; the placeholder glyph is not a caption.
pub fn image_caption(notion: &str) -> String {
    if notion.is_empty() || notion == PLACEHOLDER {
        DEFAULT_IMAGE_CAPTION.to_string()
    } else {
        notion.to_string()
    }
}
