//! Polling state machine for async image jobs
//!
//! ```text
//! Submitted -> Polling -> Done
//!                     \-> Failed    (done without image, or provider error)
//!                     \-> TimedOut  (attempt budget or caller deadline)
//! ```
//!
//! Each check is preceded by one interval of non-busy sleep on the injected
//! clock. The caller deadline is checked before sleeping, so the loop stops
//! as soon as another interval would overrun it. A status check still in
//! flight when the deadline passes is abandoned.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::with_access_token;
use crate::auth::TokenManager;
use crate::core::clock::to_chrono;
use crate::core::{Clock, ImageGenerate, PollStatus};
use crate::error::{Result, ServiceError, TimeoutCause, UpstreamFailure};
use crate::models::{AsyncHandle, GenerationJob, JobStatus, PosterImage};

/// Interval and attempt budget for status checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

impl PollPolicy {
    /// Longest wall-clock wait the budget allows
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Drives one job from `Polling` to a terminal state
pub struct JobPoller<'a> {
    adapter: &'a dyn ImageGenerate,
    tokens: &'a TokenManager,
    clock: &'a dyn Clock,
    policy: PollPolicy,
}

impl<'a> JobPoller<'a> {
    pub fn new(
        adapter: &'a dyn ImageGenerate,
        tokens: &'a TokenManager,
        clock: &'a dyn Clock,
        policy: PollPolicy,
    ) -> Self {
        Self {
            adapter,
            tokens,
            clock,
            policy,
        }
    }

    /// Poll until the job is terminal; `job` records every transition
    pub async fn run(
        &self,
        handle: &AsyncHandle,
        job: &mut GenerationJob,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<PosterImage> {
        job.status = JobStatus::Polling;

        loop {
            if job.attempt >= self.policy.max_attempts {
                return Err(timed_out(job, TimeoutCause::AttemptBudget));
            }

            if let Some(deadline) = deadline {
                if self.clock.now() + to_chrono(self.policy.interval) > deadline {
                    return Err(timed_out(job, TimeoutCause::Deadline));
                }
            }

            self.clock.sleep(self.policy.interval).await;
            job.attempt += 1;

            let check = with_access_token(self.tokens, handle.provider, |token| async move {
                self.adapter.check_status(handle, token.as_ref()).await
            });
            let status = match until_deadline(self.clock, deadline, check).await {
                Some(status) => status,
                None => return Err(timed_out(job, TimeoutCause::Deadline)),
            };

            match status {
                Ok(PollStatus::Pending) => {
                    log::debug!(
                        "{} job {} pending after check {}/{}",
                        handle.provider,
                        handle.job_id,
                        job.attempt,
                        self.policy.max_attempts
                    );
                }
                Ok(PollStatus::Done(Some(image))) => {
                    job.status = JobStatus::Done;
                    job.result = Some(image.clone());
                    log::info!(
                        "{} job {} done after {} checks",
                        handle.provider,
                        handle.job_id,
                        job.attempt
                    );
                    return Ok(image);
                }
                Ok(PollStatus::Done(None)) => {
                    job.status = JobStatus::Failed;
                    log::warn!(
                        "{} job {} finished without an image",
                        handle.provider,
                        handle.job_id
                    );
                    return Err(ServiceError::upstream(
                        handle.provider,
                        UpstreamFailure::JobFailed,
                        format!("Job {} finished without an image", handle.job_id),
                    ));
                }
                Err(e) => {
                    job.status = JobStatus::Failed;
                    log::warn!(
                        "{} job {} failed on check {}: {}",
                        handle.provider,
                        handle.job_id,
                        job.attempt,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// Drive `future` until the caller deadline; `None` once it has passed
///
/// The remaining budget is measured on `clock` and enforced on the tokio
/// timer, so a hung provider call cannot outlive the caller.
pub(crate) async fn until_deadline<F: Future>(
    clock: &dyn Clock,
    deadline: Option<DateTime<Utc>>,
    future: F,
) -> Option<F::Output> {
    match deadline {
        None => Some(future.await),
        Some(deadline) => {
            let remaining = (deadline - clock.now()).to_std().unwrap_or(Duration::ZERO);
            tokio::time::timeout(remaining, future).await.ok()
        }
    }
}

/// Mark `job` timed out and build the matching error
pub(crate) fn timed_out(job: &mut GenerationJob, cause: TimeoutCause) -> ServiceError {
    job.status = JobStatus::TimedOut;
    log::warn!(
        "{} job {} timed out after {} checks: {}",
        job.provider,
        job.id,
        job.attempt,
        cause
    );
    ServiceError::TimedOut {
        provider: job.provider,
        attempts: job.attempt,
        cause,
    }
}
