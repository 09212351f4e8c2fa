//! ffmpeg/ffprobe engine producing MP3 output

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{AudioEngine, AudioError};
use crate::config::AudioConfig;
use crate::tool;

#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    bitrate: String,
}

impl FfmpegEngine {
    pub fn new(
        ffmpeg: impl Into<PathBuf>,
        ffprobe: impl Into<PathBuf>,
        bitrate: impl Into<String>,
    ) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            bitrate: bitrate.into(),
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
            config.bitrate.clone(),
        )
    }

    fn base_args() -> Vec<OsString> {
        ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    fn encode_args(&self, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            ["-vn", "-codec:a", "libmp3lame", "-b:a", self.bitrate.as_str()]
                .into_iter()
                .map(OsString::from)
                .collect();
        args.push(dest.as_os_str().to_owned());
        args
    }

    fn truncate_args(&self, source: &Path, limit: Duration, dest: &Path) -> Vec<OsString> {
        let mut args = Self::base_args();
        args.push("-i".into());
        args.push(source.as_os_str().to_owned());
        args.push("-t".into());
        args.push(format!("{:.3}", limit.as_secs_f64()).into());
        args.extend(self.encode_args(dest));
        args
    }

    fn concat_args(&self, list: &Path, dest: &Path) -> Vec<OsString> {
        let mut args = Self::base_args();
        args.extend(["-f", "concat", "-safe", "0", "-i"].map(OsString::from));
        args.push(list.as_os_str().to_owned());
        args.extend(self.encode_args(dest));
        args
    }
}

/// Body of a concat-demuxer list file, one `file '<path>'` line per part
fn concat_list(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|part| {
            let quoted = part.to_string_lossy().replace('\'', r"'\''");
            format!("file '{quoted}'\n")
        })
        .collect()
}

fn parse_probe_output(path: &Path, stdout: &[u8]) -> Result<Duration, AudioError> {
    let text = String::from_utf8_lossy(stdout);
    let probe_error = |reason: String| AudioError::Probe {
        path: path.to_path_buf(),
        reason,
    };

    let seconds: f64 = text
        .trim()
        .parse()
        .map_err(|_| probe_error(format!("unexpected ffprobe output '{}'", text.trim())))?;

    Duration::try_from_secs_f64(seconds).map_err(|e| probe_error(e.to_string()))
}

#[async_trait]
impl AudioEngine for FfmpegEngine {
    fn format(&self) -> &'static str {
        "mp3"
    }

    async fn probe(&self, path: &Path) -> Result<Duration, AudioError> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(path.as_os_str().to_owned());

        let stdout = tool::run(&self.ffprobe, args).await?;
        parse_probe_output(path, &stdout)
    }

    async fn truncate(
        &self,
        source: &Path,
        limit: Duration,
        dest: &Path,
    ) -> Result<(), AudioError> {
        tool::run(&self.ffmpeg, self.truncate_args(source, limit, dest)).await?;
        Ok(())
    }

    async fn concat(&self, parts: &[PathBuf], dest: &Path) -> Result<(), AudioError> {
        let list = dest.with_extension("concat.txt");
        tokio::fs::write(&list, concat_list(parts)).await?;

        let result = tool::run(&self.ffmpeg, self.concat_args(&list, dest)).await;
        // The list file sits in the job workspace; removal is best effort
        let _ = tokio::fs::remove_file(&list).await;

        result?;
        Ok(())
    }
}
