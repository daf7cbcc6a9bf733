//! High level solve orchestration.
//!
//! Wires the service client, the result poller, and the event hooks into a
//! single builder-configured entry point: submit a task, wait out the
//! asynchronous solving, hand back the solution.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use url::Url;

use crate::client::{CaptchaServiceClient, ClientError, ResultSource};
use crate::events::{
    EventDispatcher, EventHandler, FailedEvent, LoggingHandler, PollEvent, SolvedEvent,
    SolverEvent, SubmittedEvent,
};
use crate::polling::{Job, PollError, PollPolicy, ResultPoller};
use crate::protocol::types::{JobId, PollResult, Solution};
use crate::tasks::CaptchaTask;
use crate::transport::ServiceHttpClient;

/// Result alias used across the orchestration layer.
pub type SolverResult<T> = Result<T, SolverError>;

/// High-level error surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Poll(#[from] PollError),
}

/// Solver configuration used by the builder.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub base_url: Option<Url>,
    pub poll_interval: Duration,
    pub solve_timeout: Duration,
    pub cost_aware: bool,
    pub soft_id: Option<u32>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            base_url: None,
            poll_interval: policy.interval,
            solve_timeout: policy.timeout,
            cost_aware: false,
            soft_id: None,
        }
    }
}

/// Fluent builder for [`CaptchaSolver`].
pub struct CaptchaSolverBuilder {
    api_key: String,
    config: SolverConfig,
    transport: Option<Arc<dyn ServiceHttpClient>>,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl CaptchaSolverBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            config: SolverConfig::default(),
            transport: None,
            handlers: Vec::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.config.base_url = Some(base_url);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn with_solve_timeout(mut self, timeout: Duration) -> Self {
        self.config.solve_timeout = timeout;
        self
    }

    pub fn with_cost_aware(mut self, cost_aware: bool) -> Self {
        self.config.cost_aware = cost_aware;
        self
    }

    pub fn with_soft_id(mut self, soft_id: u32) -> Self {
        self.config.soft_id = Some(soft_id);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn ServiceHttpClient>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> SolverResult<CaptchaSolver> {
        let mut client = match self.transport {
            Some(transport) => CaptchaServiceClient::with_transport(self.api_key, transport)?,
            None => CaptchaServiceClient::new(self.api_key)?,
        };
        if let Some(base_url) = self.config.base_url.clone() {
            client = client.with_base_url(base_url);
        }
        client = client.with_cost_aware(self.config.cost_aware);
        if let Some(soft_id) = self.config.soft_id {
            client = client.with_soft_id(soft_id);
        }

        let poller = ResultPoller::new(PollPolicy {
            interval: self.config.poll_interval,
            timeout: self.config.solve_timeout,
        });

        let mut events = EventDispatcher::new();
        events.register_handler(Arc::new(LoggingHandler));
        for handler in self.handlers {
            events.register_handler(handler);
        }

        Ok(CaptchaSolver {
            client,
            poller,
            events: Arc::new(events),
        })
    }
}

/// One-call captcha solving against a configured account.
pub struct CaptchaSolver {
    client: CaptchaServiceClient,
    poller: ResultPoller,
    events: Arc<EventDispatcher>,
}

impl CaptchaSolver {
    /// Obtain a builder to customise the solver instance.
    pub fn builder(api_key: impl Into<String>) -> CaptchaSolverBuilder {
        CaptchaSolverBuilder::new(api_key)
    }

    /// Solver with default configuration.
    pub fn new(api_key: impl Into<String>) -> SolverResult<Self> {
        CaptchaSolverBuilder::new(api_key).build()
    }

    /// The underlying client, for account operations (balance, reporting,
    /// pingbacks, load stats) and manual status requests.
    pub fn client(&self) -> &CaptchaServiceClient {
        &self.client
    }

    /// Submit a task and start tracking it, without waiting for the result.
    pub async fn submit(&self, task: &CaptchaTask) -> SolverResult<Job> {
        match self.client.submit(task).await {
            Ok(id) => {
                self.events.dispatch(SolverEvent::Submitted(SubmittedEvent {
                    job: id.clone(),
                    capability: task.capability(),
                    timestamp: Utc::now(),
                }));
                Ok(self.poller.track(id))
            }
            Err(err) => {
                self.events.dispatch(SolverEvent::Failed(FailedEvent {
                    job: None,
                    error: err.to_string(),
                    timestamp: Utc::now(),
                }));
                Err(err.into())
            }
        }
    }

    /// Submit a task and poll until it is solved, fails, or times out.
    pub async fn solve(&self, task: &CaptchaTask) -> SolverResult<Solution> {
        let job = self.submit(task).await?;
        self.wait_for(&job).await
    }

    /// Poll a previously submitted job to completion.
    pub async fn wait_for(&self, job: &Job) -> SolverResult<Solution> {
        let source = ObservedSource {
            inner: &self.client,
            events: &self.events,
            attempts: AtomicU32::new(0),
        };

        match self.poller.poll_to_completion(&source, job).await {
            Ok(solution) => {
                self.events.dispatch(SolverEvent::Solved(SolvedEvent {
                    job: job.id().clone(),
                    cost: solution.cost.clone(),
                    elapsed: job.submitted_at().elapsed(),
                    timestamp: Utc::now(),
                }));
                Ok(solution)
            }
            Err(err) => {
                self.events.dispatch(SolverEvent::Failed(FailedEvent {
                    job: Some(job.id().clone()),
                    error: err.to_string(),
                    timestamp: Utc::now(),
                }));
                Err(err.into())
            }
        }
    }
}

/// Result source that announces every status request to the event hooks.
struct ObservedSource<'a> {
    inner: &'a CaptchaServiceClient,
    events: &'a EventDispatcher,
    attempts: AtomicU32,
}

#[async_trait]
impl ResultSource for ObservedSource<'_> {
    async fn poll(&self, id: &JobId) -> Result<PollResult, ClientError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.events.dispatch(SolverEvent::Poll(PollEvent {
            job: id.clone(),
            attempt,
            timestamp: Utc::now(),
        }));
        self.inner.fetch_result(id).await
    }
}
