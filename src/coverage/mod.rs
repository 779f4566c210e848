//! Coverage of a deck against a reference document listing expected keys.

pub mod classify;

use std::collections::HashSet;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use tracing::{
    debug,
    warn,
};

pub use classify::{
    looks_like_reference_code,
    ClassificationRules,
};

use crate::core::{
    utils::present_text,
    Card,
    Deck,
};

/// Card field that coverage keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Lo,
    Id,
}

impl MatchMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lo" => Some(MatchMode::Lo),
            "id" => Some(MatchMode::Id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Lo => "lo",
            MatchMode::Id => "id",
        }
    }

    /// Key a card contributes under this mode; missing keys are empty.
    pub fn key_of<'a>(&self, card: &'a Card) -> &'a str {
        match self {
            MatchMode::Lo => card.lo.as_deref().unwrap_or(""),
            MatchMode::Id => card.id.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub expected: Vec<String>,
    pub expected_set: HashSet<String>,
    pub match_mode: MatchMode,
    /// Descriptive title or chapter carried by the document, for display only.
    pub label: Option<String>,
}

impl Reference {
    pub fn new(expected: Vec<String>, match_mode: MatchMode) -> Self {
        let expected = dedup_keys(expected);
        let expected_set = expected.iter().cloned().collect();
        Self { expected, expected_set, match_mode, label: None }
    }

    /// Builds a reference from a raw document.
    ///
    /// An explicit `matchMode` field wins; otherwise the mode is inferred from the shape of
    /// the expected keys using `rules`.
    pub fn from_raw(raw: &Value, rules: ClassificationRules) -> Self {
        let expected: Vec<String> = match raw.get("expected") {
            Some(Value::Array(entries)) => {
                entries.iter().filter_map(|entry| present_text(Some(entry))).collect()
            }
            _ => Vec::new(),
        };
        let expected = dedup_keys(expected);

        let declared = raw
            .get("matchMode")
            .or_else(|| raw.get("match_mode"))
            .and_then(Value::as_str)
            .map(|value| (value, MatchMode::parse(value)));

        let match_mode = match declared {
            Some((_, Some(mode))) => mode,
            Some((value, None)) => {
                let mode = rules.classify(&expected);
                warn!(
                    "Unknown matchMode {:?} in reference document, inferred {} from expected keys",
                    value,
                    mode.as_str()
                );
                mode
            }
            None => {
                let mode = rules.classify(&expected);
                debug!(
                    "Reference has no matchMode, inferred {} from {} expected keys ({:?} rules)",
                    mode.as_str(),
                    expected.len(),
                    rules
                );
                mode
            }
        };

        let label = present_text(raw.get("title")).or_else(|| present_text(raw.get("chapter")));
        let expected_set = expected.iter().cloned().collect();

        Self { expected, expected_set, match_mode, label }
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }
}

fn dedup_keys(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageResult {
    pub has_ref: bool,
    pub match_mode: MatchMode,
    pub expected_total: usize,
    pub covered_count: usize,
    pub missing: Vec<String>,
    expected_set: HashSet<String>,
}

impl CoverageResult {
    /// Result for a deck without reference tracking.
    pub fn disabled() -> Self {
        Self {
            has_ref: false,
            match_mode: MatchMode::Id,
            expected_total: 0,
            covered_count: 0,
            missing: Vec::new(),
            expected_set: HashSet::new(),
        }
    }

    /// Whether the card's key is one of the expected keys. Always false without a reference.
    pub fn card_is_referenced(&self, card: &Card) -> bool {
        if !self.has_ref {
            return false;
        }
        let key = self.match_mode.key_of(card).trim();
        !key.is_empty() && self.expected_set.contains(key)
    }

    pub fn is_complete(&self) -> bool {
        self.has_ref && self.missing.is_empty()
    }

    pub fn ratio(&self) -> Option<f32> {
        if self.has_ref && self.expected_total > 0 {
            Some(self.covered_count as f32 / self.expected_total as f32)
        } else {
            None
        }
    }
}

pub fn compute_coverage(deck: &Deck, reference: Option<&Reference>) -> CoverageResult {
    let reference = match reference {
        Some(reference) if !reference.is_empty() => reference,
        _ => return CoverageResult::disabled(),
    };

    let mode = reference.match_mode;
    let present: HashSet<&str> = deck
        .cards
        .iter()
        .map(|card| mode.key_of(card).trim())
        .filter(|key| !key.is_empty())
        .collect();

    let missing: Vec<String> = reference
        .expected
        .iter()
        .filter(|key| !present.contains(key.as_str()))
        .cloned()
        .collect();

    let expected_total = reference.expected.len();

    CoverageResult {
        has_ref: true,
        match_mode: mode,
        expected_total,
        covered_count: expected_total - missing.len(),
        missing,
        expected_set: reference.expected_set.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::deck::normalize_deck;

    const RULES: ClassificationRules = ClassificationRules::Extended;

    fn lo_deck() -> Deck {
        normalize_deck(
            &json!({
                "id": "physique",
                "cards": [
                    { "lo": "FL-1.1.1", "notion": "Force" },
                    { "lo": "FL-1.1.2", "notion": "Masse" },
                    { "lo": null, "notion": "Poids" }
                ]
            }),
            "physique",
        )
    }

    #[test]
    fn test_partial_coverage_by_lo() {
        let deck = lo_deck();
        let reference = Reference::from_raw(
            &json!({ "expected": ["FL-1.1.1", "FL-1.1.2", "FL-1.1.3"] }),
            ClassificationRules::default(),
        );

        let result = compute_coverage(&deck, Some(&reference));

        assert!(result.has_ref);
        assert_eq!(result.match_mode, MatchMode::Lo);
        assert_eq!(result.expected_total, 3);
        assert_eq!(result.covered_count, 2);
        assert_eq!(result.missing, vec!["FL-1.1.3".to_string()]);

        assert!(result.card_is_referenced(&deck.cards[0]));
        assert!(result.card_is_referenced(&deck.cards[1]));
        assert!(!result.card_is_referenced(&deck.cards[2]));
    }

    #[test]
    fn test_missing_reference_disables_coverage() {
        let deck = lo_deck();
        let result = compute_coverage(&deck, None);

        assert!(!result.has_ref);
        assert_eq!(result.expected_total, 0);
        assert_eq!(result.covered_count, 0);
        assert!(result.missing.is_empty());
        assert!(deck.cards.iter().all(|card| !result.card_is_referenced(card)));
        assert_eq!(result.ratio(), None);
    }

    #[test]
    fn test_empty_expected_list_disables_coverage() {
        let deck = lo_deck();
        for raw in [json!({}), json!({ "expected": [] }), json!({ "expected": ["  ", null] })] {
            let reference = Reference::from_raw(&raw, ClassificationRules::default());
            let result = compute_coverage(&deck, Some(&reference));
            assert_eq!(result, CoverageResult::disabled());
        }
    }

    #[test]
    fn test_full_coverage_is_distinct_from_disabled() {
        let deck = lo_deck();
        let reference = Reference::new(
            vec!["FL-1.1.1".to_string(), "FL-1.1.2".to_string()],
            MatchMode::Lo,
        );

        let result = compute_coverage(&deck, Some(&reference));

        assert!(result.has_ref);
        assert!(result.missing.is_empty());
        assert_eq!(result.covered_count, result.expected_total);
        assert!(result.is_complete());
        assert!(!CoverageResult::disabled().is_complete());
        assert_ne!(result.has_ref, CoverageResult::disabled().has_ref);
    }

    #[test]
    fn test_id_mode_coverage() {
        let deck = normalize_deck(&json!({ "cards": [{}, {}, { "id": "007" }] }), "d");
        let reference = Reference::from_raw(&json!({ "expected": ["001", "003", "007"] }), RULES);

        assert_eq!(reference.match_mode, MatchMode::Id);

        let result = compute_coverage(&deck, Some(&reference));
        assert_eq!(result.covered_count, 2);
        assert_eq!(result.missing, vec!["003".to_string()]);
        assert!(result.card_is_referenced(&deck.cards[0]));
        assert!(!result.card_is_referenced(&deck.cards[1]));
    }

    #[test]
    fn test_float_ids_match_integer_keys() {
        let raw = json!({ "cards": [{ "id": 1.0, "lo": 2.50 }, { "id": 2 }] });
        let deck = normalize_deck(&raw, "d");
        assert_eq!(deck.cards[0].id, "1");
        assert_eq!(deck.cards[0].lo.as_deref(), Some("2.5"));

        let reference = Reference::new(vec!["1".to_string(), "2".to_string()], MatchMode::Id);
        let result = compute_coverage(&deck, Some(&reference));
        assert!(result.is_complete());
    }

    #[test]
    fn test_matching_is_exact_after_trimming() {
        let raw = json!({ "cards": [{ "lo": " FL-1.1.1 " }, { "lo": "fl-1.1.2" }] });
        let deck = normalize_deck(&raw, "d");
        let reference = Reference::from_raw(
            &json!({ "expected": [" FL-1.1.1", "FL-1.1.2"] }),
            ClassificationRules::default(),
        );

        let result = compute_coverage(&deck, Some(&reference));
        assert_eq!(result.missing, vec!["FL-1.1.2".to_string()]);
    }

    #[test]
    fn test_explicit_match_mode_wins_over_heuristic() {
        let reference = Reference::from_raw(
            &json!({ "matchMode": "id", "expected": ["FL-1.1.1"] }),
            ClassificationRules::default(),
        );
        assert_eq!(reference.match_mode, MatchMode::Id);

        let reference =
            Reference::from_raw(&json!({ "matchMode": "LO", "expected": ["003"] }), RULES);
        assert_eq!(reference.match_mode, MatchMode::Lo);

        let unknown = Reference::from_raw(
            &json!({ "matchMode": "title", "expected": ["FL-2"] }),
            ClassificationRules::default(),
        );
        assert_eq!(unknown.match_mode, MatchMode::Lo);
    }

    #[test]
    fn test_expected_keys_are_cleaned() {
        let reference = Reference::from_raw(
            &json!({
                "title": "Chapitre 4",
                "expected": [" 003 ", "007", "003", "", 12, null, { "x": 1 }]
            }),
            ClassificationRules::default(),
        );

        assert_eq!(reference.expected, vec!["003", "007", "12"]);
        assert_eq!(reference.expected_set.len(), 3);
        assert_eq!(reference.label.as_deref(), Some("Chapitre 4"));
    }

    #[test]
    fn test_ratio() {
        let deck = lo_deck();
        let reference = Reference::new(
            ["FL-1.1.1", "FL-9", "FL-10", "FL-11"].iter().map(|key| key.to_string()).collect(),
            MatchMode::Lo,
        );
        let result = compute_coverage(&deck, Some(&reference));
        assert_eq!(result.ratio(), Some(0.25));
    }
}
