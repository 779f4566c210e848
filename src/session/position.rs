use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    path::PathBuf,
};

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::warn;

use crate::persistence::{
    get_data_file_path,
    load_json_at,
    save_json_at,
};

pub const POSITIONS_FILE: &str = "positions.json";

/// Storage key of the last viewed index for a deck.
pub fn storage_key(deck_id: &str) -> String {
    format!("revisionapp:deck:{}:index", deck_id)
}

/// Remembers the last viewed card per deck.
///
/// Implementations never fail. Storage errors are logged and an unknown deck reads as 0.
pub trait PositionStore {
    fn load(&self, deck_id: &str) -> usize;
    fn save(&mut self, deck_id: &str, index: usize);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPositionStore {
    positions: HashMap<String, usize>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionStore for MemoryPositionStore {
    fn load(&self, deck_id: &str) -> usize {
        self.positions.get(&storage_key(deck_id)).copied().unwrap_or(0)
    }

    fn save(&mut self, deck_id: &str, index: usize) {
        self.positions.insert(storage_key(deck_id), index);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub index: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PositionFile {
    #[serde(default)]
    positions: BTreeMap<String, PositionEntry>,
}

/// Positions kept in a JSON file, `positions.json` in the app data directory by default.
#[derive(Debug)]
pub struct JsonPositionStore {
    path: PathBuf,
    data: PositionFile,
}

impl JsonPositionStore {
    pub fn open_default() -> Self {
        Self::open(get_data_file_path(POSITIONS_FILE))
    }

    pub fn open(path: PathBuf) -> Self {
        let data = match load_json_at::<PositionFile>(&path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Ignoring unreadable positions file {}: {}", path.display(), e);
                PositionFile::default()
            }
        };
        Self { path, data }
    }

    pub fn entry(&self, deck_id: &str) -> Option<&PositionEntry> {
        self.data.positions.get(&storage_key(deck_id))
    }
}

impl PositionStore for JsonPositionStore {
    fn load(&self, deck_id: &str) -> usize {
        self.entry(deck_id).map(|entry| entry.index).unwrap_or(0)
    }

    fn save(&mut self, deck_id: &str, index: usize) {
        self.data
            .positions
            .insert(storage_key(deck_id), PositionEntry { index, updated_at: Utc::now() });

        if let Err(e) = save_json_at(&self.data, &self.path) {
            warn!("Failed to save position for deck {}: {}", deck_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("physique"), "revisionapp:deck:physique:index");
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryPositionStore::new();
        assert_eq!(store.load("physique"), 0);
        store.save("physique", 4);
        assert_eq!(store.load("physique"), 4);
        assert_eq!(store.load("chimie"), 0);
    }

    #[test]
    fn test_json_store_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("flashdeck-{}", uuid::Uuid::new_v4()));
        let path = dir.join(POSITIONS_FILE);

        let mut store = JsonPositionStore::open(path.clone());
        assert_eq!(store.load("physique"), 0);
        store.save("physique", 7);

        let reopened = JsonPositionStore::open(path.clone());
        assert_eq!(reopened.load("physique"), 7);
        assert!(reopened.entry("physique").is_some());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_store_ignores_corrupt_file() {
        let dir = std::env::temp_dir().join(format!("flashdeck-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(POSITIONS_FILE);
        fs::write(&path, "{ \"positions\": 12 }").unwrap();

        let mut store = JsonPositionStore::open(path.clone());
        assert_eq!(store.load("physique"), 0);
        store.save("physique", 1);
        assert_eq!(JsonPositionStore::open(path).load("physique"), 1);

        fs::remove_dir_all(&dir).unwrap();
    }
}
