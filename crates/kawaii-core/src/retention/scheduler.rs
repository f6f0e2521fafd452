//! Periodic retention sweeps on top of `tokio-cron-scheduler`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use super::sweeper::RetentionSweeper;
use crate::chat::repository::ConversationRepository;

/// Errors that can occur while managing the sweep schedule.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler error: {0}")]
    JobError(String),

    #[error("retention scheduler already running")]
    AlreadyRunning,
}

/// Owns the background job that runs [`RetentionSweeper::run_once`].
///
/// Not started on construction; call [`start`](Self::start) once the
/// database is ready and [`stop`](Self::stop) on shutdown.
#[derive(Default)]
pub struct RetentionScheduler {
    inner: Mutex<Option<JobScheduler>>,
}

impl RetentionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one sweep immediately, then every `interval`.
    pub async fn start<C>(
        &self,
        sweeper: Arc<RetentionSweeper<C>>,
        interval: Duration,
    ) -> Result<(), SchedulerError>
    where
        C: ConversationRepository + 'static,
    {
        let mut inner = self.inner.lock().await;
        if inner.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        sweeper.run_once().await;

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                tracing::debug!("retention sweep fired");
                sweeper.run_once().await;
            })
        })
        .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;
        scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        *inner = Some(scheduler);
        tracing::info!(interval_secs = interval.as_secs(), "retention scheduler started");
        Ok(())
    }

    /// Stop the schedule. A no-op if it was never started.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let mut inner = self.inner.lock().await;
        if let Some(mut scheduler) = inner.take() {
            scheduler
                .shutdown()
                .await
                .map_err(|e| SchedulerError::JobError(e.to_string()))?;
            tracing::info!("retention scheduler stopped");
        }
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryConversationRepository;
    use chrono::Utc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_start_sweeps_eagerly_and_stops() {
        let repo = InMemoryConversationRepository::new();
        repo.create_conversation(Utc::now() - chrono::Duration::days(30))
            .await
            .unwrap();
        let sweeper = Arc::new(RetentionSweeper::new(repo, chrono::Duration::days(7)));

        let scheduler = RetentionScheduler::new();
        scheduler
            .start(sweeper.clone(), Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(scheduler.is_running().await);
        assert_eq!(sweeper.sweep_at(Utc::now()).await.unwrap().deleted, 0);

        assert!(matches!(
            scheduler.start(sweeper.clone(), Duration::from_secs(3600)).await,
            Err(SchedulerError::AlreadyRunning)
        ));

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let scheduler = RetentionScheduler::new();
        assert!(scheduler.stop().await.is_ok());
    }
}
