//! Text and HTML views of a card and of deck coverage.

use std::fmt::Write;

use crate::{
    core::{
        utils::escape_html,
        Card,
        CardImage,
        Deck,
    },
    coverage::CoverageResult,
};

pub const EXPLANATION_LABEL: &str = "Définition / explication";
pub const EXAMPLE_LABEL: &str = "Exemple";

pub fn badge(deck: &Deck, card: &Card, position: &str) -> String {
    format!("{} • ID {} • {}", deck.title, card.id, position)
}

/// Terminal rendering of one card. `image` overrides the card's own image when given.
pub fn card_text(
    deck: &Deck,
    card: &Card,
    position: &str,
    image: Option<&CardImage>,
    referenced: Option<bool>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", badge(deck, card, position));
    if let Some(lo) = &card.lo {
        let _ = writeln!(out, "[{}]", lo);
    }
    if let Some(referenced) = referenced {
        let _ = writeln!(out, "Référentiel: {}", if referenced { "✓" } else { "✗" });
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", card.notion);
    let _ = writeln!(out, "{}", "=".repeat(card.notion.chars().count().max(1)));

    if let Some(image) = image.or(card.image.as_ref()) {
        let _ = writeln!(out, "[image: {} — {}]", image.src, image.alt);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", EXPLANATION_LABEL);
    let _ = writeln!(out, "  {}", card.explanation);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", EXAMPLE_LABEL);
    let _ = write!(out, "  {}", card.example);

    out
}

pub fn empty_deck_text(deck: &Deck) -> String {
    format!("{}\nAucune carte\nCe deck ne contient aucune carte pour le moment.", deck.title)
}

/// HTML fragment for one card; all text coming from deck documents is escaped.
pub fn card_html(deck: &Deck, card: &Card, position: &str, image: Option<&CardImage>) -> String {
    let media = match image.or(card.image.as_ref()) {
        Some(image) => format!(
            r#"
      <div class="card__media">
        <img class="card__img" src="{}" alt="{}" loading="lazy" />
      </div>
"#,
            escape_html(&image.src),
            escape_html(&image.alt)
        ),
        None => String::new(),
    };

    format!(
        r#"<article class="card">
      <div class="card__badge">{badge}</div>

      <h2 class="card__title">{title}</h2>
{media}
      <div class="card__sections">
        <section class="section">
          <h3 class="section__label">{explanation_label}</h3>
          <p class="section__content">{explanation}</p>
        </section>

        <section class="section">
          <h3 class="section__label">{example_label}</h3>
          <p class="section__content">{example}</p>
        </section>
      </div>
    </article>"#,
        badge = escape_html(&badge(deck, card, position)),
        title = escape_html(&card.notion),
        media = media,
        explanation_label = EXPLANATION_LABEL,
        explanation = escape_html(&card.explanation),
        example_label = EXAMPLE_LABEL,
        example = escape_html(&card.example),
    )
}

pub fn empty_deck_html() -> String {
    r#"<article class="card">
      <h2 class="card__title">Aucune carte</h2>
      <p class="card__text">Ce deck ne contient aucune carte pour le moment.</p>
    </article>"#
        .to_string()
}

pub fn coverage_text(coverage: &CoverageResult) -> String {
    if !coverage.has_ref {
        return "Pas de référentiel pour ce deck.".to_string();
    }

    let mut out = format!(
        "Couverture ({}): {}/{}",
        coverage.match_mode.as_str(),
        coverage.covered_count,
        coverage.expected_total
    );
    if let Some(ratio) = coverage.ratio() {
        let _ = write!(out, " ({:.0}%)", ratio * 100.0);
    }

    if coverage.missing.is_empty() {
        out.push_str("\nTout est couvert.");
    } else {
        let _ = write!(out, "\nManquant ({}):", coverage.missing.len());
        for key in &coverage.missing {
            let _ = write!(out, "\n  - {}", key);
        }
    }

    out
}
