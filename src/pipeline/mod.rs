//! The mashup job: locate → fetch → trim → mix → package → notify → clean up

mod fetcher;
mod locator;
mod orchestrator;
mod state;
mod types;
mod workspace;

pub use fetcher::{FetchError, Fetcher};
pub use locator::SourceLocator;
pub use orchestrator::{Orchestrator, PipelineError};
pub use state::{JobReport, Outcome, Stage, Transition};
pub use types::{AudioAsset, MashupArchive, Query, SourceReference};
pub use workspace::Workspace;
