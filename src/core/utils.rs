use serde_json::{
    Number,
    Value,
};

/// Glyph shown in place of any missing or blank display text.
pub const PLACEHOLDER: &str = "—";

pub const DEFAULT_DECK_TITLE: &str = "Deck";

pub const DEFAULT_IMAGE_CAPTION: &str = "Illustration";

/// Stringifies a scalar JSON value and trims it.
///
/// `null`, arrays and objects have no display text and yield `None`, as do strings that are
/// blank once trimmed.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Integral floats print without a fractional part (`1.0` is `"1"`), so a float-typed id
/// still matches its integer spelling.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

/// Display text for an optional value, falling back to [`PLACEHOLDER`].
pub fn safe_text(value: Option<&Value>) -> String {
    value.and_then(scalar_text).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Non-placeholder text, or `None`.
///
/// A raw value that literally is the placeholder counts as absent.
pub fn present_text(value: Option<&Value>) -> Option<String> {
    value.and_then(scalar_text).filter(|text| text != PLACEHOLDER)
}

/// First candidate field that exists and is not `null`, in priority order.
///
/// Mirrors a `a ?? b` chain: an empty string still wins over a later populated field.
pub fn first_present<'a>(value: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().filter_map(|field| value.get(*field)).find(|v| !v.is_null())
}

/// 1-based position zero-padded to width 3 (`0` -> `"001"`).
pub fn padded_position(index: usize) -> String {
    format!("{:03}", index + 1)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
