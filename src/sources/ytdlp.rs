//! yt-dlp adapter for YouTube search and audio extraction

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::traits::{Candidate, SourceError, SourceLookup, SourceRetriever};
use crate::config::SourcesConfig;
use crate::pipeline::SourceReference;
use crate::tool;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Shape of `--dump-single-json` output for a flat search playlist
#[derive(Debug, Deserialize)]
struct SearchPlaylist {
    #[serde(default)]
    entries: Vec<Option<Candidate>>,
}

#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    audio_quality: String,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>, audio_quality: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            audio_quality: audio_quality.into(),
        }
    }

    pub fn from_config(config: &SourcesConfig) -> Self {
        Self::new(config.ytdlp_path.clone(), config.audio_quality.clone())
    }

    fn search_args(query: &str, limit: usize) -> Vec<OsString> {
        [
            "--flat-playlist",
            "--dump-single-json",
            "--quiet",
            "--no-warnings",
            "--",
        ]
        .into_iter()
        .map(OsString::from)
        .chain([OsString::from(search_expression(query, limit))])
        .collect()
    }

    fn retrieve_args(&self, url: &str, template: &Path, format: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            format,
            "--audio-quality",
            self.audio_quality.as_str(),
            "--no-playlist",
            "--quiet",
            "--no-warnings",
            "--output",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(template.as_os_str().to_owned());
        args.push(OsString::from("--"));
        args.push(OsString::from(url));
        args
    }
}

/// yt-dlp's pseudo-URL for "first `limit` search results"
fn search_expression(query: &str, limit: usize) -> String {
    format!("ytsearch{limit}:{}", query.trim())
}

/// Parse a flat search dump, filling in watch URLs for entries that only carry an id
fn parse_search_output(raw: &[u8]) -> Result<Vec<Candidate>, SourceError> {
    let playlist: SearchPlaylist = serde_json::from_slice(raw)?;

    Ok(playlist
        .entries
        .into_iter()
        .flatten()
        .map(|mut candidate| {
            if candidate.handle().is_none() {
                candidate.url = candidate
                    .id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(|id| format!("{WATCH_URL}{id}"));
            }
            candidate
        })
        .collect())
}

#[async_trait]
impl SourceLookup for YtDlp {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, SourceError> {
        let stdout = tool::run(&self.program, Self::search_args(query, limit)).await?;
        let candidates = parse_search_output(&stdout)?;
        debug!(query, limit, returned = candidates.len(), "yt-dlp search finished");
        Ok(candidates)
    }
}

#[async_trait]
impl SourceRetriever for YtDlp {
    async fn retrieve(
        &self,
        reference: &SourceReference,
        dir: &Path,
        stem: &str,
        format: &str,
    ) -> Result<PathBuf, SourceError> {
        let template = dir.join(format!("{stem}.%(ext)s"));
        let expected = dir.join(format!("{stem}.{format}"));

        tool::run(
            &self.program,
            self.retrieve_args(&reference.url, &template, format),
        )
        .await?;

        if tokio::fs::try_exists(&expected).await? {
            Ok(expected)
        } else {
            Err(SourceError::MissingOutput(reference.url.clone()))
        }
    }
}
