//! Source lookup and retrieval collaborators
//!
//! The pipeline only sees the [`SourceLookup`] and [`SourceRetriever`] traits;
//! [`YtDlp`] is the production adapter behind both.

mod traits;
mod ytdlp;

pub use traits::{Candidate, SourceError, SourceLookup, SourceRetriever};
pub use ytdlp::YtDlp;
