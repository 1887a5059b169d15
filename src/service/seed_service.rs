use crate::config::seed_conf::{SeedConfig, SeedFailurePolicy};
use crate::repository::user_repo::UserRepository;
use crate::util::user_generator::UserGenerator;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Seeding task failed: {0}")]
    Task(#[from] JoinError),

    #[error("Concurrency limiter closed: {0}")]
    Limiter(#[from] AcquireError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFailure {
    pub index: usize,
    pub username: String,
    pub message: String,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub requested: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<SeedFailure>,
}

impl SeedReport {
    fn new(requested: usize) -> Self {
        SeedReport { requested, ..Default::default() }
    }

    /// True only when every requested record was stored.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.succeeded == self.requested
    }

    fn record(&mut self, outcome: InsertOutcome) {
        match outcome.result {
            Ok(()) => {
                debug!("Created user: {}", outcome.username);
                self.succeeded += 1;
            }
            Err(message) => {
                error!(index = outcome.index, "Error creating user: {}: {}", outcome.username, message);
                self.failures.push(SeedFailure {
                    index: outcome.index,
                    username: outcome.username,
                    message,
                });
            }
        }
    }
}

struct InsertOutcome {
    index: usize,
    username: String,
    result: Result<(), String>,
}

/// Inserts generated users with at most `concurrency` inserts in flight.
pub struct BulkSeeder {
    repo: Arc<dyn UserRepository>,
    generator: Arc<dyn UserGenerator>,
    count: usize,
    concurrency: usize,
    policy: SeedFailurePolicy,
}

impl BulkSeeder {
    pub fn new(repo: Arc<dyn UserRepository>, generator: Arc<dyn UserGenerator>, config: &SeedConfig) -> Self {
        BulkSeeder {
            repo,
            generator,
            count: config.count,
            concurrency: config.concurrency.max(1),
            policy: config.failure_policy,
        }
    }

    #[instrument(skip(self), fields(count = self.count, concurrency = self.concurrency, policy = ?self.policy))]
    pub async fn run(&self) -> Result<SeedReport, SeedError> {
        info!("Seeding dummy users");
        let limiter = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut report = SeedReport::new(self.count);

        for index in 0..self.count {
            let permit = limiter.clone().acquire_owned().await?;
            while let Some(joined) = tasks.try_join_next() {
                report.record(joined?);
            }
            if self.should_stop(&report) {
                warn!(index, "Stopping after first failure; waiting for in-flight inserts");
                break;
            }

            let user = self.generator.generate();
            let username = user.username().to_string();
            let repo = self.repo.clone();
            report.attempted += 1;
            tasks.spawn(async move {
                let result = repo.insert(user).await.map(|_| ()).map_err(|e| e.to_string());
                drop(permit);
                InsertOutcome { index, username, result }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            report.record(joined?);
        }

        if report.is_success() {
            info!(succeeded = report.succeeded, "Successfully created all dummy users");
        } else {
            error!(
                attempted = report.attempted,
                succeeded = report.succeeded,
                failed = report.failures.len(),
                "Error creating dummy users"
            );
        }
        Ok(report)
    }

    fn should_stop(&self, report: &SeedReport) -> bool {
        self.policy == SeedFailurePolicy::FailFast && !report.failures.is_empty()
    }
}
