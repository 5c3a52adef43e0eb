// src/repository.rs
//! Loading and caching of the per-piece-type datasets.

use crate::core::types::{Dataset, PieceType};
use crate::error::{CommError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Where raw dataset documents come from.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Short description for logs, e.g. the base URL.
    fn describe(&self) -> String;

    /// Fetches the raw JSON document for one piece type.
    async fn fetch(&self, piece_type: PieceType) -> Result<Vec<u8>>;
}

/// Fetches `{base_url}/{resource}.json` over HTTP.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CommError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, piece_type: PieceType) -> String {
        format!("{}/{}.json", self.base_url, piece_type.resource_name())
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch(&self, piece_type: PieceType) -> Result<Vec<u8>> {
        let url = self.url_for(piece_type);
        debug!(%url, "fetching dataset");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CommError::unavailable(piece_type, e))?;

        if !response.status().is_success() {
            return Err(CommError::unavailable(
                piece_type,
                format!("{} returned {}", url, response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CommError::unavailable(piece_type, e))?;
        Ok(body.to_vec())
    }
}

/// Reads `{root}/{resource}.json` from disk.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DatasetSource for DirectorySource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn fetch(&self, piece_type: PieceType) -> Result<Vec<u8>> {
        let path = self.root.join(format!("{}.json", piece_type.resource_name()));
        tokio::fs::read(&path)
            .await
            .map_err(|e| CommError::unavailable(piece_type, format!("{}: {}", path.display(), e)))
    }
}

/// In-memory documents, for tests and embedding. Counts fetches.
#[derive(Default)]
pub struct MemorySource {
    documents: HashMap<PieceType, Vec<u8>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, piece_type: PieceType, json: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(piece_type, json.into());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} documents)", self.documents.len())
    }

    async fn fetch(&self, piece_type: PieceType) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(&piece_type)
            .cloned()
            .ok_or_else(|| CommError::unavailable(piece_type, "no such document"))
    }
}

/// Loads datasets once per piece type and keeps them for the lifetime of the
/// repository. Only successful loads are cached, so a failed fetch is retried
/// on the next call. Concurrent first loads may both fetch; the documents are
/// identical, so whichever insert lands last is as good as the other.
pub struct DatasetRepository {
    source: Arc<dyn DatasetSource>,
    cache: RwLock<HashMap<PieceType, Arc<Dataset>>>,
}

impl DatasetRepository {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &dyn DatasetSource {
        self.source.as_ref()
    }

    pub async fn load(&self, piece_type: PieceType) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.cache.read().await.get(&piece_type) {
            debug!(%piece_type, "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        let raw = self.source.fetch(piece_type).await.map_err(|e| {
            warn!(%piece_type, source = %self.source.describe(), "dataset fetch failed: {}", e);
            e
        })?;

        let dataset: Dataset = serde_json::from_slice(&raw).map_err(|e| {
            warn!(%piece_type, "dataset did not parse: {}", e);
            CommError::unavailable(piece_type, format!("malformed dataset: {}", e))
        })?;
        let dataset = Arc::new(dataset);

        info!(%piece_type, patterns = dataset.len(), "dataset loaded");
        self.cache.write().await.insert(piece_type, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub async fn is_cached(&self, piece_type: PieceType) -> bool {
        self.cache.read().await.contains_key(&piece_type)
    }

    /// Drops every cached dataset.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }
}
