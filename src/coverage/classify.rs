use std::sync::OnceLock;

use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};

use super::MatchMode;

/// Heuristic used to guess whether expected keys are reference codes (`lo`) or card ids.
///
/// Best-effort only: a reference document should declare `matchMode` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRules {
    /// Only keys starting with `FL-` count as reference codes.
    PrefixOnly,
    /// `FL-` or `CH` prefixes, `AB1`-style codes, or any key mixing uppercase and a hyphen.
    #[default]
    Extended,
}

impl ClassificationRules {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "prefix_only" | "prefix" => Some(ClassificationRules::PrefixOnly),
            "extended" => Some(ClassificationRules::Extended),
            _ => None,
        }
    }

    pub fn classify<S: AsRef<str>>(&self, expected: &[S]) -> MatchMode {
        if expected.iter().any(|key| looks_like_reference_code(key.as_ref(), *self)) {
            MatchMode::Lo
        } else {
            MatchMode::Id
        }
    }
}

fn code_pattern() -> &'static Regex {
    static CODE: OnceLock<Regex> = OnceLock::new();
    CODE.get_or_init(|| Regex::new(r"^[A-Z]{2,}[0-9]").expect("static pattern"))
}

pub fn looks_like_reference_code(key: &str, rules: ClassificationRules) -> bool {
    if key.starts_with("FL-") {
        return true;
    }

    match rules {
        ClassificationRules::PrefixOnly => false,
        ClassificationRules::Extended => {
            key.starts_with("CH")
                || code_pattern().is_match(key)
                || (key.chars().any(|c| c.is_ascii_uppercase()) && key.contains('-'))
        }
    }
}
