use rand::{
    rngs::StdRng,
    Rng,
};
use serde_json::Value;
use tracing::debug;

use crate::{
    catalog::source::DocumentSource,
    core::{
        utils::scalar_text,
        Card,
        CardImage,
        FlashdeckError,
    },
    deck::image_caption,
    session::make_rng,
};

pub const DEFAULT_IMAGE: &str = "assets/img/default.png";
pub const IMAGE_MANIFEST: &str = "data/images/manifest.json";

/// Picks illustrations for cards that have none.
///
/// Consecutive picks never return the same manifest entry when more than one is available.
pub struct ImageProvider {
    manifest: Vec<String>,
    default_image: String,
    rng: StdRng,
    last: Option<usize>,
}

impl ImageProvider {
    pub fn new(manifest: Vec<String>, default_image: &str, rng: StdRng) -> Self {
        Self { manifest, default_image: default_image.to_string(), rng, last: None }
    }

    pub fn with_seed(manifest: Vec<String>, default_image: &str, seed: u64) -> Self {
        Self::new(manifest, default_image, make_rng(Some(seed)))
    }

    /// Loads the manifest from `path`; an absent manifest yields an empty one.
    pub fn load<S: DocumentSource + ?Sized>(
        source: &S,
        path: &str,
        default_image: &str,
        rng: StdRng,
    ) -> Result<Self, FlashdeckError> {
        let manifest = match source.fetch_optional(path)? {
            Some(raw) => parse_manifest(&raw),
            None => {
                debug!("No image manifest at {}", path);
                Vec::new()
            }
        };
        Ok(Self::new(manifest, default_image, rng))
    }

    pub fn manifest(&self) -> &[String] {
        &self.manifest
    }

    pub fn pick(&mut self) -> &str {
        let total = self.manifest.len();
        if total == 0 {
            return &self.default_image;
        }

        let mut next = self.rng.random_range(0..total);
        if total > 1 {
            while Some(next) == self.last {
                next = self.rng.random_range(0..total);
            }
        }

        self.last = Some(next);
        &self.manifest[next]
    }

    /// The card's own image, or a picked one captioned after the card.
    pub fn resolve(&mut self, card: &Card) -> CardImage {
        if let Some(image) = &card.image {
            return image.clone();
        }
        let src = self.pick().to_string();
        CardImage { src, alt: image_caption(&card.notion) }
    }

    /// Like [`resolve`](Self::resolve) but never falls back to the default image: without a
    /// manifest only the card's own image is shown.
    pub fn illustration(&mut self, card: &Card) -> Option<CardImage> {
        if card.image.is_none() && self.manifest.is_empty() {
            return None;
        }
        Some(self.resolve(card))
    }
}

/// Accepts either a bare array of paths or `{ "images": [...] }`.
pub fn parse_manifest(raw: &Value) -> Vec<String> {
    let entries = match raw {
        Value::Array(entries) => entries,
        _ => match raw.get("images") {
            Some(Value::Array(entries)) => entries,
            _ => return Vec::new(),
        },
    };

    entries.iter().filter_map(scalar_text).collect()
}
