pub mod position;

use rand::{
    rngs::StdRng,
    Rng,
    SeedableRng,
};
use tracing::debug;

pub use position::{
    JsonPositionStore,
    MemoryPositionStore,
    PositionStore,
};

use crate::{
    catalog::LoadedDeck,
    core::{
        Card,
        Deck,
    },
    coverage::{
        compute_coverage,
        CoverageResult,
        Reference,
    },
};

/// Builds the RNG used for random navigation and image picks.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Navigation applied when a deck is opened from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Stay,
    Next,
    Random,
}

/// One deck being revised: the card shown, its coverage, and where to remember the position.
pub struct Session<P: PositionStore> {
    deck: Deck,
    coverage: CoverageResult,
    index: usize,
    store: P,
    rng: StdRng,
}

impl<P: PositionStore> Session<P> {
    /// Starts on the stored position for this deck, clamped to the deck size.
    pub fn new(deck: Deck, reference: Option<&Reference>, store: P, rng: StdRng) -> Self {
        let coverage = compute_coverage(&deck, reference);
        let saved = store.load(&deck.id);
        let index = saved.min(deck.len().saturating_sub(1));
        debug!("Opening deck {} at card {} (saved {})", deck.id, index, saved);

        Self { deck, coverage, index, store, rng }
    }

    /// Starts on the first card, ignoring any stored position.
    pub fn from_start(deck: Deck, reference: Option<&Reference>, store: P, rng: StdRng) -> Self {
        let coverage = compute_coverage(&deck, reference);
        debug!("Opening deck {} at its first card", deck.id);

        Self { deck, coverage, index: 0, store, rng }
    }

    /// Legacy decks always open on their first card.
    pub fn from_loaded(loaded: LoadedDeck, store: P, rng: StdRng) -> Self {
        if loaded.legacy {
            Self::from_start(loaded.deck, loaded.reference.as_ref(), store, rng)
        } else {
            Self::new(loaded.deck, loaded.reference.as_ref(), store, rng)
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn coverage(&self) -> &CoverageResult {
        &self.coverage
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn current(&self) -> Option<&Card> {
        self.deck.card(self.index)
    }

    /// `"3/12"`, or `None` for an empty deck.
    pub fn position_text(&self) -> Option<String> {
        if self.deck.is_empty() {
            None
        } else {
            Some(format!("{}/{}", self.index + 1, self.deck.len()))
        }
    }

    /// Advances to the next card, wrapping around. No-op on an empty deck.
    pub fn next(&mut self) -> Option<&Card> {
        if self.deck.is_empty() {
            return None;
        }

        self.index = (self.index + 1) % self.deck.len();
        self.store.save(&self.deck.id, self.index);
        self.current()
    }

    /// Jumps to a random card other than the current one.
    ///
    /// A single-card deck stays on its card without touching the stored position.
    pub fn random(&mut self) -> Option<&Card> {
        let total = self.deck.len();
        if total == 0 {
            return None;
        }
        if total == 1 {
            self.index = 0;
            return self.current();
        }

        let mut next = self.index;
        while next == self.index {
            next = self.rng.random_range(0..total);
        }

        self.index = next;
        self.store.save(&self.deck.id, self.index);
        self.current()
    }

    pub fn step(&mut self, step: Step) -> Option<&Card> {
        match step {
            Step::Stay => self.current(),
            Step::Next => self.next(),
            Step::Random => self.random(),
        }
    }

    /// Whether the current card is listed in the deck's reference.
    pub fn current_is_referenced(&self) -> bool {
        self.current().map(|card| self.coverage.card_is_referenced(card)).unwrap_or(false)
    }
}
