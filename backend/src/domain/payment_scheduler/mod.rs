//! Timer driver for the monthly payment sweeps.
//!
//! Two jobs run on independent Tokio tasks: the cycle reset on local day 1
//! and deadline enforcement on local day 11, both at 00:01. Each task sleeps
//! until its next fire instant, runs one sweep through the repository and
//! loops. A failed sweep is logged and retried at the next occurrence; fires
//! missed while the process was down are not replayed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::ports::{StudentRepository, StudentRepositoryError};
use crate::domain::{BillingCalendar, CycleReset, ENFORCEMENT_DAY, RESET_DAY};

mod runtime;

pub use runtime::{PaymentSchedulerRuntime, TokioSleeper};

/// Monthly sweep driven by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepJob {
    /// Open a new payment cycle on day 1.
    CycleReset,
    /// Block unpaid students on day 11.
    DeadlineEnforcement,
}

impl SweepJob {
    /// Every job the scheduler runs.
    pub const ALL: [Self; 2] = [Self::CycleReset, Self::DeadlineEnforcement];

    /// Stable name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CycleReset => "cycle-reset",
            Self::DeadlineEnforcement => "deadline-enforcement",
        }
    }

    /// Local day of the month the job fires on.
    #[must_use]
    pub const fn day_of_month(self) -> u32 {
        match self {
            Self::CycleReset => RESET_DAY,
            Self::DeadlineEnforcement => ENFORCEMENT_DAY,
        }
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Job that ran.
    pub job: SweepJob,
    /// Students changed by the sweep.
    pub affected: u64,
    /// Instant the sweep ran.
    pub ran_at: DateTime<Utc>,
}

/// Async sleeping abstraction so tests can drive the timers.
#[async_trait]
pub trait SchedulerSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Scheduler running the monthly sweeps against a student repository.
pub struct PaymentScheduler {
    repo: Arc<dyn StudentRepository>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn SchedulerSleeper>,
    calendar: BillingCalendar,
}

impl PaymentScheduler {
    /// Build a scheduler that sleeps on the Tokio timer.
    pub fn new(
        repo: Arc<dyn StudentRepository>,
        clock: Arc<dyn Clock>,
        calendar: BillingCalendar,
    ) -> Self {
        Self::with_runtime(repo, clock, calendar, PaymentSchedulerRuntime::default())
    }

    /// Build a scheduler with injected runtime abstractions.
    pub fn with_runtime(
        repo: Arc<dyn StudentRepository>,
        clock: Arc<dyn Clock>,
        calendar: BillingCalendar,
        runtime: PaymentSchedulerRuntime,
    ) -> Self {
        Self {
            repo,
            clock,
            sleeper: runtime.sleeper,
            calendar,
        }
    }

    /// Next instant strictly after now at which `job` fires.
    #[must_use]
    pub fn next_fire(&self, job: SweepJob) -> DateTime<Utc> {
        self.calendar
            .next_monthly_fire(job.day_of_month(), self.clock.utc())
    }

    /// Run one sweep immediately.
    pub async fn run_job(&self, job: SweepJob) -> Result<SweepReport, StudentRepositoryError> {
        let now = self.clock.utc();
        let affected = match job {
            SweepJob::CycleReset => {
                self.repo
                    .reset_cycle(&CycleReset::starting(&self.calendar, now))
                    .await?
            }
            SweepJob::DeadlineEnforcement => self.repo.enforce_deadline(now).await?,
        };
        Ok(SweepReport {
            job,
            affected,
            ran_at: now,
        })
    }

    /// Run one sweep, logging the outcome instead of returning errors.
    pub async fn tick(&self, job: SweepJob) -> Option<SweepReport> {
        match self.run_job(job).await {
            Ok(report) => {
                info!(
                    job = job.name(),
                    affected = report.affected,
                    ran_at = %report.ran_at,
                    "payment sweep finished"
                );
                Some(report)
            }
            Err(error) => {
                error!(job = job.name(), %error, "payment sweep failed");
                None
            }
        }
    }

    /// Sleep until the next fire instant of `job`, then run it once.
    pub async fn run_next(&self, job: SweepJob) -> Option<SweepReport> {
        let fire_at = self.next_fire(job);
        info!(job = job.name(), fire_at = %fire_at, "payment sweep scheduled");
        loop {
            let remaining = fire_at - self.clock.utc();
            let Ok(remaining) = remaining.to_std() else {
                break;
            };
            if remaining.is_zero() {
                break;
            }
            self.sleeper.sleep(remaining).await;
        }
        self.tick(job).await
    }

    /// Run `job` on every occurrence until the task is aborted.
    pub async fn run_forever(&self, job: SweepJob) {
        loop {
            self.run_next(job).await;
        }
    }

    /// Spawn one Tokio task per job.
    ///
    /// Dropping the handles leaves the tasks running; abort them to stop.
    pub fn spawn(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        SweepJob::ALL
            .into_iter()
            .map(|job| {
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move { scheduler.run_forever(job).await })
            })
            .collect()
    }
}
