use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{AudioAsset, SourceReference};
use crate::audio::{AudioEngine, AudioError};
use crate::sources::{SourceError, SourceRetriever};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Retrieve(#[from] SourceError),

    #[error("retrieved file is not decodable audio: {0}")]
    Decode(#[from] AudioError),
}

/// Best-effort retrieval of located references into decoded assets
///
/// A reference that fails for any reason yields nothing and leaves no files
/// behind; it never affects the other references of the job.
#[derive(Clone)]
pub struct Fetcher {
    retriever: Arc<dyn SourceRetriever>,
    engine: Arc<dyn AudioEngine>,
    concurrency: usize,
}

impl Fetcher {
    pub fn new(
        retriever: Arc<dyn SourceRetriever>,
        engine: Arc<dyn AudioEngine>,
        concurrency: usize,
    ) -> Self {
        Self {
            retriever,
            engine,
            concurrency: concurrency.max(1),
        }
    }

    /// Retrieve and probe one reference into `dir`
    pub async fn fetch(
        &self,
        reference: &SourceReference,
        index: usize,
        dir: &Path,
    ) -> Result<AudioAsset, FetchError> {
        let stem = reference.file_stem(index);

        match self.try_fetch(reference, &stem, dir).await {
            Ok(asset) => Ok(asset),
            Err(e) => {
                remove_stem_files(dir, &stem).await;
                Err(e)
            }
        }
    }

    async fn try_fetch(
        &self,
        reference: &SourceReference,
        stem: &str,
        dir: &Path,
    ) -> Result<AudioAsset, FetchError> {
        let path = self
            .retriever
            .retrieve(reference, dir, stem, self.engine.format())
            .await?;
        let duration = self.engine.probe(&path).await?;

        debug!(url = %reference.url, path = %path.display(), ?duration, "Source fetched");
        Ok(AudioAsset::new(path, duration))
    }

    /// Fetch every reference, keeping the successes in reference order
    pub async fn fetch_all(&self, references: &[SourceReference], dir: &Path) -> Vec<AudioAsset> {
        // Owned items keep the stream future Send for spawned jobs
        let items = references.iter().cloned().enumerate();
        let results: Vec<Option<AudioAsset>> = stream::iter(items)
            .map(|(index, reference)| async move {
                match self.fetch(&reference, index, dir).await {
                    Ok(asset) => Some(asset),
                    Err(e) => {
                        warn!(url = %reference.url, error = %e, "Skipping source");
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let assets: Vec<AudioAsset> = results.into_iter().flatten().collect();
        info!(
            requested = references.len(),
            fetched = assets.len(),
            "Fetch stage finished"
        );
        assets
    }
}

/// Delete every file in `dir` produced for `stem` (outputs, `.part` files, intermediates)
async fn remove_stem_files(dir: &Path, stem: &str) {
    let prefix = format!("{stem}.");
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return;
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(&prefix) {
            if let Err(e) = tokio::fs::remove_file(entry.path()).await {
                warn!(path = %entry.path().display(), error = %e, "Failed to remove partial download");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::WavEngine;
    use async_trait::async_trait;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    /// What the fake retriever does for a given URL
    #[derive(Clone)]
    enum Behavior {
        Wav(u32),
        Garbage,
        Fail,
    }

    struct FakeRetriever {
        behaviors: HashMap<String, Behavior>,
    }

    #[async_trait]
    impl SourceRetriever for FakeRetriever {
        async fn retrieve(
            &self,
            reference: &SourceReference,
            dir: &Path,
            stem: &str,
            format: &str,
        ) -> Result<PathBuf, SourceError> {
            let path = dir.join(format!("{stem}.{format}"));
            match self.behaviors[&reference.url] {
                Behavior::Wav(seconds) => {
                    let spec = WavSpec {
                        channels: 1,
                        sample_rate: 8000,
                        bits_per_sample: 16,
                        sample_format: SampleFormat::Int,
                    };
                    let mut writer = WavWriter::create(&path, spec).unwrap();
                    for _ in 0..seconds * 8000 {
                        writer.write_sample(0i16).unwrap();
                    }
                    writer.finalize().unwrap();
                    Ok(path)
                }
                Behavior::Garbage => {
                    std::fs::write(&path, b"not audio").unwrap();
                    Ok(path)
                }
                Behavior::Fail => {
                    std::fs::write(dir.join(format!("{stem}.webm.part")), b"partial").unwrap();
                    Err(SourceError::MissingOutput(reference.url.clone()))
                }
            }
        }
    }

    fn setup(behaviors: &[(&str, Behavior)]) -> (Fetcher, Vec<SourceReference>) {
        let retriever = FakeRetriever {
            behaviors: behaviors
                .iter()
                .map(|(url, b)| (url.to_string(), b.clone()))
                .collect(),
        };
        let references = behaviors
            .iter()
            .map(|(url, _)| SourceReference::new(*url))
            .collect();
        let fetcher = Fetcher::new(Arc::new(retriever), Arc::new(WavEngine::new()), 2);
        (fetcher, references)
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_successes_in_order() {
        let dir = TempDir::new().unwrap();
        let (fetcher, references) = setup(&[
            ("https://a", Behavior::Wav(2)),
            ("https://b", Behavior::Fail),
            ("https://c", Behavior::Wav(1)),
        ]);

        let assets = fetcher.fetch_all(&references, dir.path()).await;

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].duration, Duration::from_secs(2));
        assert_eq!(assets[1].duration, Duration::from_secs(1));
        assert_eq!(file_names(dir.path()), vec!["000-source.wav", "002-source.wav"]);
    }

    #[tokio::test]
    async fn test_fetch_all_runs_on_spawned_task() {
        let dir = TempDir::new().unwrap();
        let (fetcher, references) = setup(&[
            ("https://a", Behavior::Wav(1)),
            ("https://b", Behavior::Wav(1)),
        ]);
        let path = dir.path().to_path_buf();

        let assets = tokio::spawn(async move { fetcher.fetch_all(&references, &path).await })
            .await
            .unwrap();

        assert_eq!(assets.len(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_download_is_removed() {
        let dir = TempDir::new().unwrap();
        let (fetcher, references) = setup(&[("https://junk", Behavior::Garbage)]);

        let result = fetcher.fetch(&references[0], 0, dir.path()).await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
        assert!(file_names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_failed_retrieval_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let (fetcher, references) = setup(&[("https://gone", Behavior::Fail)]);

        let assets = fetcher.fetch_all(&references, dir.path()).await;

        assert!(assets.is_empty());
        assert!(file_names(dir.path()).is_empty());
    }
}
