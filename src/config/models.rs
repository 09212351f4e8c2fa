use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: FormLimits,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Upper bound on the submitted form body
    #[serde(default = "default_max_form_bytes")]
    pub max_form_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_form_bytes: default_max_form_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_max_form_bytes() -> ByteSize {
    ByteSize::kib(16)
}

/// Bounds applied to form input before a job is started
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormLimits {
    #[serde(default = "default_max_videos")]
    pub max_videos: u32,
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u32,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            max_videos: default_max_videos(),
            max_duration_secs: default_max_duration_secs(),
        }
    }
}

fn default_max_videos() -> u32 {
    25
}

fn default_max_duration_secs() -> u32 {
    600
}

/// Source lookup and retrieval (yt-dlp)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,
    /// Candidates requested per wanted source
    #[serde(default = "default_oversample")]
    pub oversample: usize,
    /// Fetches in flight at once within a single job
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// Passed to `--audio-quality`
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            oversample: default_oversample(),
            fetch_concurrency: default_fetch_concurrency(),
            audio_quality: default_audio_quality(),
        }
    }
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_oversample() -> usize {
    3
}

fn default_fetch_concurrency() -> usize {
    2
}

fn default_audio_quality() -> String {
    "128K".to_string()
}

/// Audio engine selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEngineKind {
    #[default]
    Ffmpeg,
    Wav,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub engine: AudioEngineKind,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    /// MP3 export bitrate for the ffmpeg engine
    #[serde(default = "default_bitrate")]
    pub bitrate: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            engine: AudioEngineKind::default(),
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            bitrate: default_bitrate(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_bitrate() -> String {
    "128k".to_string()
}

/// Working storage for per-job scratch directories
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scratch_root: default_scratch_root(),
        }
    }
}

fn default_scratch_root() -> PathBuf {
    std::env::temp_dir().join("mashup")
}

/// Outbound email (SendGrid)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_html_body")]
    pub html_body: String,
    #[serde(default = "default_attachment_name")]
    pub attachment_name: String,
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: ByteSize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sender address (loaded from `FROM_EMAIL`, not from config file)
    #[serde(skip)]
    pub sender: Option<String>,
    /// SendGrid API key (loaded from `SENDGRID_API_KEY`, not from config file)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            subject: default_subject(),
            html_body: default_html_body(),
            attachment_name: default_attachment_name(),
            max_attachment_bytes: default_max_attachment_bytes(),
            timeout_secs: default_timeout_secs(),
            sender: None,
            api_key: None,
        }
    }
}

fn default_api_base() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_subject() -> String {
    "Your Mashup File".to_string()
}

fn default_html_body() -> String {
    "Your mashup is attached.".to_string()
}

fn default_attachment_name() -> String {
    "mashup.zip".to_string()
}

fn default_max_attachment_bytes() -> ByteSize {
    ByteSize::mib(30)
}

fn default_timeout_secs() -> u64 {
    30
}
