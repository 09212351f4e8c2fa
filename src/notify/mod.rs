//! Email delivery of the finished archive

mod sendgrid;

pub use sendgrid::{SendGridMessage, SendGridNotifier};

use async_trait::async_trait;
use thiserror::Error;

use crate::pipeline::MashupArchive;

/// Media type of the attached archive
pub const ARCHIVE_MEDIA_TYPE: &str = "application/zip";

/// Reasons a delivery attempt failed; only ever logged
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("archive {0} is missing")]
    MissingArchive(String),

    #[error("archive is {size} bytes, over the {limit} byte attachment limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("delivery request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("delivery service rejected the message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivers an archive to a recipient
///
/// Never fails outward: the caller still has to clean up the archive, so
/// every problem is folded into the returned flag.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns true when the delivery service accepted the message
    async fn notify(&self, recipient: &str, archive: &MashupArchive) -> bool;
}
