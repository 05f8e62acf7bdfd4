//! Content resolution.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// Resolves the bytes served at a path.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Load the content for `path`.
    async fn resolve(&self, path: &str) -> GateResult<Vec<u8>>;
}

/// Where an offering's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Literal text held in configuration.
    Inline(String),
    /// File read on every serve.
    File(PathBuf),
}

/// Resolver backed by a path → source table.
#[derive(Debug, Clone, Default)]
pub struct SourceMapResolver {
    sources: HashMap<String, ContentSource>,
}

impl SourceMapResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the source for `path`, replacing any previous one.
    pub fn insert(&mut self, path: impl Into<String>, source: ContentSource) {
        self.sources.insert(path.into(), source);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_source(mut self, path: impl Into<String>, source: ContentSource) -> Self {
        self.insert(path, source);
        self
    }
}

#[async_trait]
impl ContentResolver for SourceMapResolver {
    async fn resolve(&self, path: &str) -> GateResult<Vec<u8>> {
        match self.sources.get(path) {
            Some(ContentSource::Inline(text)) => Ok(text.as_bytes().to_vec()),
            Some(ContentSource::File(file)) => tokio::fs::read(file)
                .await
                .map_err(|e| GateError::content(path, format!("{}: {}", file.display(), e))),
            None => Err(GateError::content(path, "no content source configured")),
        }
    }
}
