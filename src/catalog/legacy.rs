//! Pre-deck data layout: `data/cards/index.json` listing one JSON file per person.

use serde_json::{
    json,
    Value,
};
use tracing::{
    debug,
    warn,
};

use super::{
    source::{
        join_path,
        DocumentSource,
    },
    LEGACY_DIR,
    LEGACY_INDEX,
};
use crate::{
    core::{
        utils::{
            safe_text,
            scalar_text,
            PLACEHOLDER,
        },
        Deck,
        FlashdeckError,
    },
    deck::normalize_deck,
};

pub const LEGACY_DECK_ID: &str = "legacy";
pub const LEGACY_DECK_TITLE: &str = "Deck (legacy)";
const LEGACY_DESCRIPTION: &str = "Deck généré depuis data/cards (ancien format).";
const LEGACY_EXAMPLE: &str = "Exemple : cette carte vient de l'ancien format (fallback).";

/// Checks that the legacy index exists and is readable.
pub fn probe<S: DocumentSource + ?Sized>(source: &S) -> Result<(), FlashdeckError> {
    source.fetch_json(LEGACY_INDEX).map(|_| ())
}

/// Builds the single legacy deck from the person files listed in the legacy index.
pub fn load_legacy_deck<S: DocumentSource + ?Sized>(source: &S) -> Result<Deck, FlashdeckError> {
    let index = source.fetch_json(LEGACY_INDEX)?;
    let entries: &[Value] = match index.get("cards") {
        Some(Value::Array(entries)) => entries.as_slice(),
        _ => &[],
    };

    let mut cards = Vec::new();
    for entry in entries {
        let file = match entry.get("file").and_then(scalar_text) {
            Some(file) => file,
            None => {
                warn!("Skipping legacy entry without file: {}", entry);
                continue;
            }
        };

        let id = entry.get("id").and_then(scalar_text).unwrap_or_else(|| PLACEHOLDER.to_string());
        let person = source.fetch_json(&join_path(LEGACY_DIR, &file))?;
        cards.push(person_card(&id, &person));
    }

    debug!("Loaded {} legacy cards", cards.len());

    Ok(normalize_deck(
        &json!({
            "id": LEGACY_DECK_ID,
            "title": LEGACY_DECK_TITLE,
            "description": LEGACY_DESCRIPTION,
            "cards": cards,
        }),
        LEGACY_DECK_ID,
    ))
}

/// Raw card for one person record (`{nom, prenom, age}`).
fn person_card(id: &str, person: &Value) -> Value {
    let nom = safe_text(person.get("nom"));
    let prenom = safe_text(person.get("prenom"));
    let age = safe_text(person.get("age"));

    let full_name = format!("{} {}", prenom, nom).trim().to_string();
    let notion = if full_name.is_empty() { "Identité".to_string() } else { full_name };

    json!({
        "id": id,
        "notion": notion,
        "definition": format!("Nom: {} • Prénom: {} • Âge: {}", nom, prenom, age),
        "exemple": LEGACY_EXAMPLE,
        "image": null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::source::MemorySource;

    #[test]
    fn test_load_legacy_deck() {
        let source = MemorySource::new()
            .with(
                "data/cards/index.json",
                json!({
                    "cards": [
                        { "id": "p1", "file": "person-001.json" },
                        { "id": "p2" },
                        { "file": "person-002.json" }
                    ]
                }),
            )
            .with(
                "data/cards/person-001.json",
                json!({ "nom": "Curie", "prenom": "Marie", "age": 66 }),
            )
            .with("data/cards/person-002.json", json!({ "nom": "Pasteur" }));

        let deck = load_legacy_deck(&source).unwrap();

        assert_eq!(deck.id, LEGACY_DECK_ID);
        assert_eq!(deck.title, LEGACY_DECK_TITLE);
        assert_eq!(deck.description.as_deref(), Some(LEGACY_DESCRIPTION));
        assert_eq!(deck.cards.len(), 2);

        let curie = &deck.cards[0];
        assert_eq!(curie.id, "p1");
        assert_eq!(curie.notion, "Marie Curie");
        assert_eq!(curie.explanation, "Nom: Curie • Prénom: Marie • Âge: 66");
        assert_eq!(curie.example, LEGACY_EXAMPLE);
        assert_eq!(curie.image, None);

        let pasteur = &deck.cards[1];
        assert_eq!(pasteur.id, "002");
        assert_eq!(pasteur.notion, "— Pasteur");
        assert_eq!(pasteur.explanation, "Nom: Pasteur • Prénom: — • Âge: —");
    }

    #[test]
    fn test_missing_person_file_fails() {
        let source = MemorySource::new()
            .with(
                "data/cards/index.json",
                json!({ "cards": [{ "id": "p1", "file": "gone.json" }] }),
            );

        assert!(load_legacy_deck(&source).unwrap_err().is_not_found());
    }

    #[test]
    fn test_missing_legacy_index() {
        assert!(probe(&MemorySource::new()).is_err());
    }
}
