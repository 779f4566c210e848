use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
    time::Duration,
};

use reqwest::{
    blocking::Client,
    header::{
        CACHE_CONTROL,
        USER_AGENT,
    },
    StatusCode,
};
use serde_json::Value;
use tracing::debug;

use crate::core::FlashdeckError;

/// Somewhere JSON documents can be read from, addressed by `/`-separated relative paths.
pub trait DocumentSource {
    /// Reads and parses one document. Absent documents are reported as
    /// [`FlashdeckError::NotFound`].
    fn fetch_json(&self, path: &str) -> Result<Value, FlashdeckError>;

    /// Like [`fetch_json`](Self::fetch_json) but maps an absent document to `None`.
    fn fetch_optional(&self, path: &str) -> Result<Option<Value>, FlashdeckError> {
        match self.fetch_json(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn describe(&self) -> String;
}

/// Resolves `file` against directory `dir` the way a relative URL would.
///
/// A leading `/` restarts from the source root; `.` and `..` segments are collapsed and `..`
/// never climbs above the root.
pub fn join_path(dir: &str, file: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    let base = if file.starts_with('/') { "" } else { dir };
    for segment in base.split('/').chain(file.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}

/// Documents under a local directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentSource for FsSource {
    fn fetch_json(&self, path: &str) -> Result<Value, FlashdeckError> {
        let file_path = self.root.join(join_path("", path));
        debug!("Reading {}", file_path.display());

        let content = fs::read_to_string(&file_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FlashdeckError::NotFound(file_path.display().to_string()),
            _ => FlashdeckError::from(e),
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Documents served over HTTP below a base URL.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, FlashdeckError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FlashdeckError::Custom(format!("HTTP client build failed: {e}")))?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, join_path("", path))
    }
}

impl DocumentSource for HttpSource {
    fn fetch_json(&self, path: &str) -> Result<Value, FlashdeckError> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, concat!("flashdeck/", env!("CARGO_PKG_VERSION")))
            .header(CACHE_CONTROL, "no-cache")
            .send()?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FlashdeckError::NotFound(url));
        }
        if !status.is_success() {
            return Err(FlashdeckError::HttpStatus { status: status.as_u16(), url });
        }

        Ok(resp.json::<Value>()?)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// In-memory documents keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, Value>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, document: Value) {
        self.documents.insert(join_path("", path), document);
    }

    pub fn with(mut self, path: &str, document: Value) -> Self {
        self.insert(path, document);
        self
    }
}

impl DocumentSource for MemorySource {
    fn fetch_json(&self, path: &str) -> Result<Value, FlashdeckError> {
        let key = join_path("", path);
        self.documents.get(&key).cloned().ok_or(FlashdeckError::NotFound(key))
    }

    fn describe(&self) -> String {
        format!("memory ({} documents)", self.documents.len())
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    fn fetch_json(&self, path: &str) -> Result<Value, FlashdeckError> {
        (**self).fetch_json(path)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
