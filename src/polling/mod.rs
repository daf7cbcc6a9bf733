//! Fixed-interval polling for asynchronous captcha types.
//!
//! Challenge-token captchas are solved server-side over tens of seconds, so
//! the client sleeps between status requests until a terminal result or the
//! wall-clock deadline. There is no backoff, no jitter, and no attempt-count
//! bound: elapsed time alone governs every edge case.
//!
//! The clock and sleep primitive live behind the [`Waiter`] trait so the
//! same loop runs under any async caller and tests drive it with a virtual
//! clock.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;

use crate::client::{ClientError, ResultSource};
use crate::protocol::types::{JobId, PollResult, ServiceError, Solution};

/// Interval and deadline configuration for one polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between consecutive status requests.
    pub interval: Duration,
    /// Overall wall-clock budget, measured from submission.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Clock plus sleep primitive used by the poll loop.
#[async_trait]
pub trait Waiter: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Production waiter backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioWaiter;

#[async_trait]
impl Waiter for TokioWaiter {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A submitted captcha being tracked to completion. The deadline is fixed at
/// submission time and never extended.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    submitted_at: Instant,
    deadline: Instant,
}

impl Job {
    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// Terminal outcomes of a polling run other than success.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Client(ClientError),
    #[error("captcha was not solved within {0:?}")]
    Timeout(Duration),
}

/// Drives submit → wait → fetch cycles against a [`ResultSource`].
#[derive(Debug, Clone)]
pub struct ResultPoller<W: Waiter = TokioWaiter> {
    policy: PollPolicy,
    waiter: W,
}

impl ResultPoller<TokioWaiter> {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            waiter: TokioWaiter,
        }
    }
}

impl Default for ResultPoller<TokioWaiter> {
    fn default() -> Self {
        Self::new(PollPolicy::default())
    }
}

impl<W: Waiter> ResultPoller<W> {
    pub fn with_waiter(policy: PollPolicy, waiter: W) -> Self {
        Self { policy, waiter }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Start tracking a freshly submitted job; the deadline is derived from
    /// the policy timeout at this instant.
    pub fn track(&self, id: JobId) -> Job {
        let submitted_at = self.waiter.now();
        Job {
            id,
            submitted_at,
            deadline: submitted_at + self.policy.timeout,
        }
    }

    /// Poll until the job reaches a terminal result or its deadline passes.
    ///
    /// Each cycle sleeps one interval, re-checks the deadline, then issues a
    /// single status request. `Pending` loops; `Solved` and `Failed` return;
    /// transport errors abort immediately without a retry.
    pub async fn poll_to_completion(
        &self,
        source: &dyn ResultSource,
        job: &Job,
    ) -> Result<Solution, PollError> {
        loop {
            if self.waiter.now() >= job.deadline {
                return Err(PollError::Timeout(self.policy.timeout));
            }
            self.waiter.sleep(self.policy.interval).await;
            if self.waiter.now() >= job.deadline {
                log::debug!("job {} expired before next status request", job.id());
                return Err(PollError::Timeout(self.policy.timeout));
            }

            match source.poll(job.id()).await {
                Ok(PollResult::Pending) => continue,
                Ok(PollResult::Solved(solution)) => return Ok(solution),
                Ok(PollResult::Failed(err)) => return Err(PollError::Service(err)),
                Err(ClientError::Service(err)) => return Err(PollError::Service(err)),
                Err(err) => return Err(PollError::Client(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::transport::TransportError;

    /// Virtual clock: `sleep` advances `now` without suspending.
    struct MockWaiter {
        base: Instant,
        elapsed: Mutex<Duration>,
    }

    impl MockWaiter {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                elapsed: Mutex::new(Duration::ZERO),
            }
        }
    }

    #[async_trait]
    impl Waiter for MockWaiter {
        fn now(&self) -> Instant {
            self.base + *self.elapsed.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            *self.elapsed.lock().unwrap() += duration;
        }
    }

    struct ScriptedSource {
        results: Mutex<VecDeque<Result<PollResult, ClientError>>>,
        attempts: AtomicU32,
    }

    impl ScriptedSource {
        fn new<I: IntoIterator<Item = Result<PollResult, ClientError>>>(results: I) -> Self {
            Self {
                results: Mutex::new(results.into_iter().collect()),
                attempts: AtomicU32::new(0),
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResultSource for ScriptedSource {
        async fn poll(&self, _id: &JobId) -> Result<PollResult, ClientError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(PollResult::Pending))
        }
    }

    fn policy_15_60() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn solved_on_third_attempt_stays_under_four() {
        let poller = ResultPoller::with_waiter(policy_15_60(), MockWaiter::new());
        let source = ScriptedSource::new([
            Ok(PollResult::Pending),
            Ok(PollResult::Pending),
            Ok(PollResult::Solved(Solution::new("token"))),
        ]);

        let job = poller.track(JobId::from("1"));
        let solution = poller
            .poll_to_completion(&source, &job)
            .await
            .expect("should solve");
        assert_eq!(solution.text, "token");
        assert_eq!(source.attempts(), 3);
    }

    #[tokio::test]
    async fn deadline_expiry_stops_polling() {
        let poller = ResultPoller::with_waiter(policy_15_60(), MockWaiter::new());
        let source = ScriptedSource::new([]);

        let job = poller.track(JobId::from("1"));
        let err = poller
            .poll_to_completion(&source, &job)
            .await
            .expect_err("should time out");
        assert!(matches!(err, PollError::Timeout(t) if t == Duration::from_secs(60)));
        // Attempts at t=15, 30, 45; the wake-up at t=60 hits the deadline
        // before a fourth request is issued.
        assert_eq!(source.attempts(), 3);
    }

    #[tokio::test]
    async fn service_failure_is_terminal() {
        let poller = ResultPoller::with_waiter(policy_15_60(), MockWaiter::new());
        let source = ScriptedSource::new([
            Ok(PollResult::Pending),
            Ok(PollResult::Failed(ServiceError::new(1001, "unsolvable"))),
        ]);

        let job = poller.track(JobId::from("1"));
        let err = poller
            .poll_to_completion(&source, &job)
            .await
            .expect_err("should fail");
        assert!(matches!(err, PollError::Service(e) if e.code == 1001));
        assert_eq!(source.attempts(), 2);
    }

    #[tokio::test]
    async fn transport_error_aborts_without_retry() {
        let poller = ResultPoller::with_waiter(policy_15_60(), MockWaiter::new());
        let source = ScriptedSource::new([Err(ClientError::Transport(
            TransportError::Transport("connection reset".into()),
        ))]);

        let job = poller.track(JobId::from("1"));
        let err = poller
            .poll_to_completion(&source, &job)
            .await
            .expect_err("should abort");
        assert!(matches!(err, PollError::Client(ClientError::Transport(_))));
        assert_eq!(source.attempts(), 1);
    }

    #[test]
    fn job_deadline_is_fixed_at_tracking_time() {
        let poller = ResultPoller::with_waiter(policy_15_60(), MockWaiter::new());
        let job = poller.track(JobId::from("9"));
        assert_eq!(job.deadline() - job.submitted_at(), Duration::from_secs(60));
        assert_eq!(job.id().as_str(), "9");
    }
}
