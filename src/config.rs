use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    catalog::source::{
        DocumentSource,
        FsSource,
        HttpSource,
    },
    core::FlashdeckError,
    coverage::ClassificationRules,
    images::{
        DEFAULT_IMAGE,
        IMAGE_MANIFEST,
    },
    persistence::{
        get_data_file_path,
        load_json_or_default_at,
        save_json_at,
    },
};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory containing `data/`.
    pub data_root: String,
    /// Site serving `data/`; used instead of `data_root` when set.
    pub base_url: Option<String>,
    pub classification: ClassificationRules,
    pub image_manifest: String,
    pub default_image: String,
    pub seed: Option<u64>,
}

/// Values given on the command line for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub root: Option<String>,
    pub url: Option<String>,
    pub rules: Option<ClassificationRules>,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: ".".to_string(),
            base_url: None,
            classification: ClassificationRules::default(),
            image_manifest: IMAGE_MANIFEST.to_string(),
            default_image: DEFAULT_IMAGE.to_string(),
            seed: None,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_at(&get_data_file_path(SETTINGS_FILE))
    }

    pub fn load_at(path: &Path) -> Self {
        load_json_or_default_at(path)
    }

    pub fn save(&self) -> Result<(), FlashdeckError> {
        self.save_at(&get_data_file_path(SETTINGS_FILE))
    }

    pub fn save_at(&self, path: &Path) -> Result<(), FlashdeckError> {
        save_json_at(self, path)
    }

    /// A local root replaces any configured site; a URL wins over both.
    pub fn apply(&mut self, overrides: &SettingsOverrides) {
        if let Some(root) = &overrides.root {
            self.data_root = root.clone();
            self.base_url = None;
        }
        if let Some(url) = &overrides.url {
            self.base_url = Some(url.clone());
        }
        if let Some(rules) = overrides.rules {
            self.classification = rules;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
    }

    pub fn document_source(&self) -> Result<Box<dyn DocumentSource>, FlashdeckError> {
        match self.base_url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Ok(Box::new(HttpSource::new(url)?)),
            None => Ok(Box::new(FsSource::new(&self.data_root))),
        }
    }
}
