//! In-memory emulation of an upstream provider's job lifecycle.
//!
//! [`SimulatedJobs`] owns every simulated job, keyed by id. Each job gets one
//! spawned schedule task that walks it through `queued -> processing ->
//! succeeded` (or `failed`, see [`SimulatorConfig::failure_rate`]) on fixed
//! offsets from its creation time. The terminal step is only reached after
//! the processing step has been applied.
//!
//! Every mutation (create, cancel, scheduled step, purge) happens under the
//! registry write lock. A scheduled step rechecks its job's cancellation
//! token under that lock, so once a reader has seen `canceled` no step can
//! land afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use rand::Rng;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::job::{GenerationOptions, Job};
use crate::types::JobId;

/// Diagnostic attached to jobs the simulator decides to fail.
pub const SIMULATED_FAILURE_MESSAGE: &str = "Simulated generation failure";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing and outcome parameters for simulated jobs.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Offset from creation at which a job moves to `processing`.
    pub processing_delay: Duration,
    /// Offset from creation at which a job reaches its terminal state.
    pub completion_delay: Duration,
    /// Probability in `[0, 1]` that a job ends `failed` instead of `succeeded`.
    pub failure_rate: f64,
    /// Base URL for synthesized video links (`{base}/{id}.mp4`).
    pub video_base_url: String,
    /// How long a terminal job stays queryable before
    /// [`SimulatedJobs::purge_expired`] drops it. Zero keeps jobs forever.
    pub retention: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_secs(1),
            completion_delay: Duration::from_secs(5),
            failure_rate: 0.0,
            video_base_url: "https://example.com/videos".to_string(),
            retention: Duration::from_secs(3600),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A registered job plus the handle for its pending schedule.
struct SimulatedJob {
    job: Job,
    schedule: CancellationToken,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Processing,
    Finish,
}

/// Registry of simulated jobs.
///
/// Construct once per process and share it behind an [`Arc`]; `create`
/// needs the `Arc` to hand the schedule task a weak back-reference.
pub struct SimulatedJobs {
    config: SimulatorConfig,
    clock: Arc<dyn Clock>,
    jobs: RwLock<HashMap<JobId, SimulatedJob>>,
}

impl SimulatedJobs {
    pub fn new(mut config: SimulatorConfig, clock: Arc<dyn Clock>) -> Self {
        config.failure_rate = if config.failure_rate.is_nan() {
            0.0
        } else {
            config.failure_rate.clamp(0.0, 1.0)
        };
        config.video_base_url = config.video_base_url.trim_end_matches('/').to_string();

        Self {
            config,
            clock,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Register a new job and schedule its lifecycle.
    ///
    /// Rejects options without a usable prompt before anything is registered.
    pub async fn create(self: &Arc<Self>, options: GenerationOptions) -> Result<Job, CoreError> {
        options.validate()?;

        let id = uuid::Uuid::new_v4().to_string();
        let job = Job::new(id.clone(), options, self.clock.now());
        let schedule = CancellationToken::new();

        self.jobs.write().await.insert(
            id.clone(),
            SimulatedJob {
                job: job.clone(),
                schedule: schedule.clone(),
            },
        );

        tokio::spawn(run_schedule(
            Arc::downgrade(self),
            id.clone(),
            schedule,
            Instant::now(),
            self.config.processing_delay,
            self.config.completion_delay,
        ));

        tracing::info!(job_id = %id, "Simulated job created");
        Ok(job)
    }

    /// Current projection of a job.
    pub async fn get(&self, id: &str) -> Result<Job, CoreError> {
        self.jobs
            .read()
            .await
            .get(id)
            .map(|entry| entry.job.clone())
            .ok_or_else(|| not_found(id))
    }

    /// Cancel a job that has not reached a terminal state.
    ///
    /// Terminal jobs are returned unchanged.
    pub async fn cancel(&self, id: &str) -> Result<Job, CoreError> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs.get_mut(id).ok_or_else(|| not_found(id))?;

        if entry.job.status.is_terminal() {
            tracing::debug!(job_id = %id, status = %entry.job.status, "Cancel on terminal job ignored");
            return Ok(entry.job.clone());
        }

        entry.schedule.cancel();
        entry.job.cancel(self.clock.now());

        tracing::info!(job_id = %id, "Simulated job canceled");
        Ok(entry.job.clone())
    }

    /// Number of jobs currently registered.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Drop terminal jobs whose last transition is older than the configured
    /// retention. Returns the number of jobs removed.
    pub async fn purge_expired(&self) -> usize {
        if self.config.retention.is_zero() {
            return 0;
        }
        let Ok(retention) = chrono::Duration::from_std(self.config.retention) else {
            return 0;
        };
        let cutoff = self.clock.now() - retention;

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, entry| !entry.job.status.is_terminal() || entry.job.updated_at >= cutoff);
        before - jobs.len()
    }

    /// Cancel every pending schedule. Job states are left as they are.
    pub async fn shutdown(&self) {
        let jobs = self.jobs.read().await;
        for entry in jobs.values() {
            entry.schedule.cancel();
        }
        tracing::info!(jobs = jobs.len(), "Simulator schedules stopped");
    }

    /// Apply one scheduled step. Returns `false` when the schedule should stop.
    async fn apply_step(&self, id: &str, schedule: &CancellationToken, step: Step) -> bool {
        let fails = matches!(step, Step::Finish) && self.roll_failure();

        let mut jobs = self.jobs.write().await;
        let Some(entry) = jobs.get_mut(id) else {
            return false;
        };
        if schedule.is_cancelled() {
            return false;
        }

        let now = self.clock.now();
        let applied = match step {
            Step::Processing => entry.job.start_processing(now),
            Step::Finish if fails => entry.job.fail(SIMULATED_FAILURE_MESSAGE, now),
            Step::Finish => {
                let video_url = format!("{}/{}.mp4", self.config.video_base_url, id);
                entry.job.succeed(video_url, now)
            }
        };

        if applied {
            tracing::debug!(job_id = %id, status = %entry.job.status, "Simulated job advanced");
        }
        applied && !entry.job.status.is_terminal()
    }

    fn roll_failure(&self) -> bool {
        self.config.failure_rate > 0.0 && rand::rng().random_bool(self.config.failure_rate)
    }
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Job",
        id: id.to_string(),
    }
}

/// Drive one job through its scheduled steps.
///
/// Offsets are measured from `created`; the finish step is only awaited once
/// the processing step has been applied, so it can never overtake it.
async fn run_schedule(
    registry: Weak<SimulatedJobs>,
    id: JobId,
    schedule: CancellationToken,
    created: Instant,
    processing_delay: Duration,
    completion_delay: Duration,
) {
    let steps = [
        (processing_delay, Step::Processing),
        (completion_delay, Step::Finish),
    ];

    for (offset, step) in steps {
        tokio::select! {
            biased;
            _ = schedule.cancelled() => return,
            _ = tokio::time::sleep_until(created + offset) => {}
        }

        let Some(registry) = registry.upgrade() else {
            return;
        };
        if !registry.apply_step(&id, &schedule, step).await {
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
