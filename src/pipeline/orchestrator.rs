//! Drives one job through the pipeline state machine
//!
//! ```text
//! Idle → Locating → Fetching → Trimming → Mixing → Packaging → Notifying
//!                       │                                          │
//!                       └─ no assets ───────► CleaningUp ◄─────────┘
//!                                                 │
//!                        Succeeded | FailedNoAudio | FailedDelivery
//! ```
//!
//! Every exit path, including stage errors, goes through `CleaningUp`.

use bon::Builder;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, error, info, info_span, warn};

use super::fetcher::Fetcher;
use super::locator::SourceLocator;
use super::state::{JobReport, Outcome, Stage, Transition};
use super::types::{AudioAsset, MashupArchive, Query, SourceReference};
use super::workspace::Workspace;
use crate::archive::{self, ArchiveError};
use crate::audio::{self, AudioEngine, AudioError};
use crate::config::{Config, Credentials};
use crate::notify::{Notifier, NotifyError, SendGridNotifier};
use crate::observability::Metrics;
use crate::sources::{SourceError, YtDlp};

/// Failures that abort a job before delivery
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source lookup failed: {0}")]
    Locate(#[from] SourceError),

    #[error("audio processing failed: {0}")]
    Audio(#[from] AudioError),

    #[error("packaging failed: {0}")]
    Package(#[from] ArchiveError),

    #[error("working storage error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("{0} stage reached without its input")]
    MissingInput(Stage),

    #[error("{0} is not a runnable stage")]
    UnexpectedStage(Stage),
}

/// Values produced by earlier stages and consumed by later ones
struct Job<'a> {
    query: &'a Query,
    workspace: &'a Workspace,
    references: Vec<SourceReference>,
    fetched: Vec<AudioAsset>,
    trimmed: Vec<AudioAsset>,
    mixed: Option<AudioAsset>,
    archive: Option<MashupArchive>,
}

impl<'a> Job<'a> {
    fn new(query: &'a Query, workspace: &'a Workspace) -> Self {
        Self {
            query,
            workspace,
            references: Vec::new(),
            fetched: Vec::new(),
            trimmed: Vec::new(),
            mixed: None,
            archive: None,
        }
    }
}

#[derive(Builder)]
pub struct Orchestrator {
    locator: SourceLocator,
    fetcher: Fetcher,
    engine: Arc<dyn AudioEngine>,
    notifier: Arc<dyn Notifier>,
    #[builder(into)]
    scratch_root: PathBuf,
    #[builder(into, default = "mashup.zip".to_string())]
    archive_name: String,
    #[builder(default)]
    metrics: Arc<Metrics>,
}

impl Orchestrator {
    /// Wire the production collaborators (yt-dlp, configured audio engine, SendGrid)
    pub fn from_config(
        config: &Config,
        credentials: Credentials,
        metrics: Arc<Metrics>,
    ) -> Result<Self, NotifyError> {
        let ytdlp = Arc::new(YtDlp::from_config(&config.sources));
        let engine = audio::engine_from_config(&config.audio);
        let notifier = SendGridNotifier::new(&config.mail, credentials)?;

        Ok(Self::builder()
            .locator(SourceLocator::new(ytdlp.clone(), config.sources.oversample))
            .fetcher(Fetcher::new(
                ytdlp,
                engine.clone(),
                config.sources.fetch_concurrency,
            ))
            .engine(engine)
            .notifier(Arc::new(notifier))
            .scratch_root(config.storage.scratch_root.clone())
            .archive_name(config.mail.attachment_name.clone())
            .metrics(metrics)
            .build())
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Run `query` to a terminal outcome; never fails and always cleans up
    pub async fn run(&self, query: &Query) -> JobReport {
        self.metrics.job_started();
        let mut report = JobReport::start();

        let outcome = match Workspace::create(&self.scratch_root).await {
            Ok(mut workspace) => {
                report.job_id = Some(workspace.id());
                let span = info_span!("job", job_id = %workspace.id());
                let outcome = self
                    .drive(query, &workspace, &mut report)
                    .instrument(span)
                    .await;

                report.enter(Stage::CleaningUp);
                if let Err(e) = workspace.cleanup().await {
                    error!(job_id = %workspace.id(), error = %e, "Failed to remove workspace");
                }
                outcome
            }
            Err(e) => {
                error!(
                    root = %self.scratch_root.display(),
                    error = %e,
                    "Could not allocate workspace"
                );
                report.failure = Some(PipelineError::Workspace(e).to_string());
                report.enter(Stage::CleaningUp);
                Outcome::FailedNoAudio
            }
        };

        self.metrics.job_finished(outcome);
        let report = report.finish(outcome);
        info!(
            job_id = ?report.job_id,
            outcome = %Stage::Finished(outcome),
            located = report.located,
            fetched = report.fetched,
            elapsed_ms = report.elapsed_ms(),
            "Job finished"
        );
        report
    }

    async fn drive(
        &self,
        query: &Query,
        workspace: &Workspace,
        report: &mut JobReport,
    ) -> Outcome {
        let mut job = Job::new(query, workspace);
        let mut stage = Stage::Locating;

        let outcome = loop {
            report.enter(stage);
            match self.step(stage, &mut job).await {
                Ok(Transition::Advance(next)) => stage = next,
                Ok(Transition::Conclude(outcome)) => break outcome,
                Err(e) => {
                    warn!(%stage, error = %e, "Stage failed");
                    report.failure = Some(e.to_string());
                    break Outcome::FailedNoAudio;
                }
            }
        };

        report.located = job.references.len();
        report.fetched = job.fetched.len();
        if outcome == Outcome::FailedNoAudio && report.failure.is_none() {
            report.failure = Some("no source produced audio".to_string());
        }
        outcome
    }

    async fn step(&self, stage: Stage, job: &mut Job<'_>) -> Result<Transition, PipelineError> {
        match stage {
            Stage::Locating => {
                job.references = self
                    .locator
                    .locate(&job.query.performer, job.query.count as usize)
                    .await?;
                Ok(Transition::Advance(Stage::Fetching))
            }
            Stage::Fetching => {
                job.fetched = self
                    .fetcher
                    .fetch_all(&job.references, &job.workspace.fetched_dir())
                    .await;
                self.metrics
                    .fetches_failed((job.references.len() - job.fetched.len()) as u64);

                if job.fetched.is_empty() {
                    warn!(located = job.references.len(), "No audio survived fetching");
                    return Ok(Transition::Conclude(Outcome::FailedNoAudio));
                }
                Ok(Transition::Advance(Stage::Trimming))
            }
            Stage::Trimming => {
                let limit = job.query.clip_duration();
                let dir = job.workspace.trimmed_dir();

                let mut trimmed = Vec::with_capacity(job.fetched.len());
                for (index, asset) in job.fetched.iter().enumerate() {
                    let name = asset
                        .file_name()
                        .map(str::to_owned)
                        .unwrap_or_else(|| format!("{index:03}.{}", self.engine.format()));
                    let dest = dir.join(name);
                    trimmed.push(audio::trim(self.engine.as_ref(), asset, limit, &dest).await?);
                }
                job.trimmed = trimmed;
                Ok(Transition::Advance(Stage::Mixing))
            }
            Stage::Mixing => {
                let dest = job.workspace.mix_path(self.engine.format());
                let mixed = audio::mix(self.engine.as_ref(), &job.trimmed, &dest).await?;
                info!(parts = job.trimmed.len(), duration = ?mixed.duration, "Mashup mixed");
                job.mixed = Some(mixed);
                Ok(Transition::Advance(Stage::Packaging))
            }
            Stage::Packaging => {
                let mixed = job
                    .mixed
                    .clone()
                    .ok_or(PipelineError::MissingInput(Stage::Packaging))?;
                let dest = job.workspace.archive_path(&self.archive_name);
                job.archive = Some(archive::package_async(mixed, dest).await?);
                Ok(Transition::Advance(Stage::Notifying))
            }
            Stage::Notifying => {
                let archive = job
                    .archive
                    .as_ref()
                    .ok_or(PipelineError::MissingInput(Stage::Notifying))?;
                let delivered = self.notifier.notify(&job.query.recipient, archive).await;
                Ok(Transition::Conclude(if delivered {
                    Outcome::Succeeded
                } else {
                    Outcome::FailedDelivery
                }))
            }
            Stage::Idle | Stage::CleaningUp | Stage::Finished(_) => {
                Err(PipelineError::UnexpectedStage(stage))
            }
        }
    }
}
