//! Audio decode/encode collaborators plus the trim and mix operations built on them
//!
//! [`FfmpegEngine`] is the production engine (MP3 in, MP3 out). [`WavEngine`]
//! does the same work in-process on WAV files through `hound` and is exact
//! to the sample.

mod ffmpeg;
mod wav;

pub use ffmpeg::FfmpegEngine;
pub use wav::WavEngine;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{AudioConfig, AudioEngineKind};
use crate::pipeline::AudioAsset;
use crate::tool::ToolError;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("could not determine duration of {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("WAV codec error: {0}")]
    Wav(#[from] hound::Error),

    #[error("{path} does not match the format of the first part")]
    FormatMismatch { path: PathBuf },

    #[error("nothing to mix")]
    EmptyMix,

    #[error("audio task aborted: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode/encode capability the pipeline relies on
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Container extension this engine reads and writes
    fn format(&self) -> &'static str;

    /// Measure the playable length of the file at `path`
    async fn probe(&self, path: &Path) -> Result<Duration, AudioError>;

    /// Write at most the first `limit` of `source` to `dest`
    async fn truncate(
        &self,
        source: &Path,
        limit: Duration,
        dest: &Path,
    ) -> Result<(), AudioError>;

    /// Write `parts` end to end, in slice order, to `dest`
    async fn concat(&self, parts: &[PathBuf], dest: &Path) -> Result<(), AudioError>;
}

/// Build the engine selected by `audio.engine`
pub fn engine_from_config(config: &AudioConfig) -> Arc<dyn AudioEngine> {
    match config.engine {
        AudioEngineKind::Ffmpeg => Arc::new(FfmpegEngine::from_config(config)),
        AudioEngineKind::Wav => Arc::new(WavEngine::new()),
    }
}

/// Keep the leading `limit` of `asset`, writing the result to `dest`
///
/// Shorter inputs are copied whole; audio is never padded or looped. The
/// recorded duration is measured from the written file, since lossy encoders
/// may add frame padding.
pub async fn trim(
    engine: &dyn AudioEngine,
    asset: &AudioAsset,
    limit: Duration,
    dest: &Path,
) -> Result<AudioAsset, AudioError> {
    engine.truncate(&asset.path, limit, dest).await?;
    let duration = engine.probe(dest).await?;
    Ok(AudioAsset::new(dest, duration))
}

/// Concatenate `assets` in the given order into a single asset at `dest`
pub async fn mix(
    engine: &dyn AudioEngine,
    assets: &[AudioAsset],
    dest: &Path,
) -> Result<AudioAsset, AudioError> {
    if assets.is_empty() {
        return Err(AudioError::EmptyMix);
    }

    let parts: Vec<PathBuf> = assets.iter().map(|asset| asset.path.clone()).collect();
    engine.concat(&parts, dest).await?;

    let total = assets.iter().map(|asset| asset.duration).sum();
    Ok(AudioAsset::new(dest, total))
}
