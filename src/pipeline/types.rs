//! Request-scoped values passed between pipeline stages

use std::path::PathBuf;
use std::time::Duration;

/// One validated form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub performer: String,
    pub count: u32,
    pub duration_secs: u32,
    pub recipient: String,
}

impl Query {
    pub fn clip_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }
}

/// Retrievable handle for one audio source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    pub url: String,
    pub id: Option<String>,
    pub title: Option<String>,
}

impl SourceReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id: None,
            title: None,
        }
    }

    /// Output file stem for this reference's position in the job
    ///
    /// The index prefix keeps stems unique even when two references share an id.
    pub fn file_stem(&self, index: usize) -> String {
        let tag: String = self
            .id
            .as_deref()
            .unwrap_or("source")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
            .take(32)
            .collect();

        if tag.is_empty() {
            format!("{index:03}")
        } else {
            format!("{index:03}-{tag}")
        }
    }
}

/// Decoded audio on local storage with its measured length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub duration: Duration,
}

impl AudioAsset {
    pub fn new(path: impl Into<PathBuf>, duration: Duration) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// Compressed container holding the final mashup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MashupArchive {
    pub path: PathBuf,
    /// Name of the single audio entry inside the container
    pub entry_name: String,
    pub size: u64,
}

impl MashupArchive {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
