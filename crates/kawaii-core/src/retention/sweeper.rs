//! Deletes conversations older than the retention threshold.

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use kawaii_types::error::RepositoryError;

use crate::chat::repository::ConversationRepository;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Conversations created strictly before this instant were removed.
    pub cutoff: DateTime<Utc>,
    pub deleted: u64,
}

pub struct RetentionSweeper<C: ConversationRepository> {
    repo: C,
    max_age: Duration,
}

impl<C: ConversationRepository> RetentionSweeper<C> {
    pub fn new(repo: C, max_age: Duration) -> Self {
        Self { repo, max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Sweep relative to `now`. Turns go with their conversation.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, RepositoryError> {
        let cutoff = now - self.max_age;
        let deleted = self.repo.delete_created_before(cutoff).await?;
        Ok(SweepReport { cutoff, deleted })
    }

    /// Sweep relative to the current time.
    ///
    /// Failures are logged and swallowed; the next scheduled sweep starts
    /// from scratch.
    pub async fn run_once(&self) -> Option<SweepReport> {
        match self.sweep_at(Utc::now()).await {
            Ok(report) => {
                info!(
                    deleted = report.deleted,
                    cutoff = %report.cutoff,
                    "Cleaned up {} old conversations",
                    report.deleted
                );
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Error cleaning up old conversations");
                None
            }
        }
    }
}
