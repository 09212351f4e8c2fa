//! Per-job scratch directories
//!
//! Every job gets `<scratch_root>/job-<uuidv7>/` with `fetched/` and
//! `trimmed/` inside. Nothing is shared between jobs, and the whole tree is
//! removed by [`Workspace::cleanup`] or, failing that, on drop.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const FETCHED_DIR: &str = "fetched";
const TRIMMED_DIR: &str = "trimmed";
const MIX_STEM: &str = "mashup";

#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    root: PathBuf,
    cleaned: bool,
}

impl Workspace {
    /// Allocate a fresh namespace under `scratch_root`
    pub async fn create(scratch_root: &Path) -> io::Result<Self> {
        let id = Uuid::now_v7();
        let root = scratch_root.join(format!("job-{id}"));

        let workspace = Self {
            id,
            root,
            cleaned: false,
        };
        tokio::fs::create_dir_all(workspace.fetched_dir()).await?;
        tokio::fs::create_dir_all(workspace.trimmed_dir()).await?;

        debug!(job_id = %id, root = %workspace.root.display(), "Workspace created");
        Ok(workspace)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fetched_dir(&self) -> PathBuf {
        self.root.join(FETCHED_DIR)
    }

    pub fn trimmed_dir(&self) -> PathBuf {
        self.root.join(TRIMMED_DIR)
    }

    /// Destination of the combined audio
    pub fn mix_path(&self, extension: &str) -> PathBuf {
        self.root.join(format!("{MIX_STEM}.{extension}"))
    }

    pub fn archive_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Remove everything this job wrote; safe to call repeatedly
    pub async fn cleanup(&mut self) -> io::Result<()> {
        tolerate_missing(tokio::fs::remove_dir_all(&self.root).await)?;
        debug!(job_id = %self.id, "Workspace removed");
        self.cleaned = true;
        Ok(())
    }
}

fn tolerate_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        // Reached when a job unwinds before `cleanup`
        match tolerate_missing(std::fs::remove_dir_all(&self.root)) {
            Ok(()) => self.cleaned = true,
            Err(e) => {
                warn!(job_id = %self.id, error = %e, "Failed to remove workspace on drop")
            }
        }
    }
}
