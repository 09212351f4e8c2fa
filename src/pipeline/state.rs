//! Orchestrator states, terminal outcomes, and the per-job report

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Terminal classification of a job, one per user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Succeeded,
    FailedNoAudio,
    FailedDelivery,
}

impl Outcome {
    /// Literal status text shown to the requester
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Succeeded => "Mashup created and sent to your email.",
            Outcome::FailedDelivery => "Mashup created but email could not be sent.",
            Outcome::FailedNoAudio => {
                "Could not create mashup (YouTube may have blocked requests)."
            }
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

/// Pipeline state machine; transitions only ever move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Locating,
    Fetching,
    Trimming,
    Mixing,
    Packaging,
    Notifying,
    CleaningUp,
    Finished(Outcome),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Locating => "locating",
            Stage::Fetching => "fetching",
            Stage::Trimming => "trimming",
            Stage::Mixing => "mixing",
            Stage::Packaging => "packaging",
            Stage::Notifying => "notifying",
            Stage::CleaningUp => "cleaning_up",
            Stage::Finished(Outcome::Succeeded) => "succeeded",
            Stage::Finished(Outcome::FailedNoAudio) => "failed_no_audio",
            Stage::Finished(Outcome::FailedDelivery) => "failed_delivery",
        };
        f.write_str(name)
    }
}

/// Result of one stage handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance(Stage),
    Conclude(Outcome),
}

/// What happened during one job, for logs and tests
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stages: Vec<Stage>,
    pub located: usize,
    pub fetched: usize,
    /// Internal cause of a failure; never shown to the requester
    pub failure: Option<String>,
    pub outcome: Option<Outcome>,
}

impl JobReport {
    pub fn start() -> Self {
        Self {
            job_id: None,
            started_at: Utc::now(),
            finished_at: None,
            stages: vec![Stage::Idle],
            located: 0,
            fetched: 0,
            failure: None,
            outcome: None,
        }
    }

    pub fn enter(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn finish(mut self, outcome: Outcome) -> Self {
        self.stages.push(Stage::Finished(outcome));
        self.outcome = Some(outcome);
        self.finished_at = Some(Utc::now());
        self
    }

    /// Terminal outcome, treating an unfinished report as a failure
    pub fn outcome(&self) -> Outcome {
        self.outcome.unwrap_or(Outcome::FailedNoAudio)
    }

    pub fn visited(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn elapsed_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let messages = [
            Outcome::Succeeded.message(),
            Outcome::FailedNoAudio.message(),
            Outcome::FailedDelivery.message(),
        ];
        assert_eq!(messages[0], "Mashup created and sent to your email.");
        assert_eq!(messages[2], "Mashup created but email could not be sent.");
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
    }

    #[test]
    fn test_report_lifecycle() {
        let mut report = JobReport::start();
        report.enter(Stage::Locating);
        report.enter(Stage::CleaningUp);
        let report = report.finish(Outcome::FailedDelivery);

        assert_eq!(
            report.stages,
            vec![
                Stage::Idle,
                Stage::Locating,
                Stage::CleaningUp,
                Stage::Finished(Outcome::FailedDelivery)
            ]
        );
        assert_eq!(report.outcome(), Outcome::FailedDelivery);
        assert!(report.elapsed_ms().is_some());
        assert!(!report.visited(Stage::Mixing));
    }

    #[test]
    fn test_unfinished_report_counts_as_failure() {
        assert_eq!(JobReport::start().outcome(), Outcome::FailedNoAudio);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::CleaningUp.to_string(), "cleaning_up");
        assert_eq!(Stage::Finished(Outcome::Succeeded).to_string(), "succeeded");
    }
}
