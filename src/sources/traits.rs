use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::SourceReference;
use crate::tool::ToolError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("lookup returned malformed output: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("retrieval produced no file for '{0}'")]
    MissingOutput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Search hit as reported by the lookup, before any download
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Candidate {
    /// Retrievable handle, if the lookup supplied one
    pub fn handle(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

/// Metadata-only search capability
#[async_trait]
pub trait SourceLookup: Send + Sync {
    /// Return up to `limit` candidates for `query` in the lookup's own ranking order
    ///
    /// Implementations must not download media content.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, SourceError>;
}

/// Content retrieval capability
#[async_trait]
pub trait SourceRetriever: Send + Sync {
    /// Download `reference` and decode it to `<dir>/<stem>.<format>`
    ///
    /// Returns the path of the written file. Leftovers on failure are the
    /// caller's to clean up; they all share the `stem` prefix.
    async fn retrieve(
        &self,
        reference: &SourceReference,
        dir: &Path,
        stem: &str,
        format: &str,
    ) -> Result<PathBuf, SourceError>;
}
