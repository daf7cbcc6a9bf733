//! Event hooks around submission and polling.
//!
//! Provides hooks for logging and custom reactions without giving handlers
//! any control over the solve flow; dispatching is synchronous and
//! fire-and-forget.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::protocol::types::JobId;
use crate::tasks::Capability;

/// A captcha was accepted by the service.
#[derive(Debug, Clone)]
pub struct SubmittedEvent {
    pub job: JobId,
    pub capability: Capability,
    pub timestamp: DateTime<Utc>,
}

/// One status request is about to be issued.
#[derive(Debug, Clone)]
pub struct PollEvent {
    pub job: JobId,
    pub attempt: u32,
    pub timestamp: DateTime<Utc>,
}

/// A job reached its solved result.
#[derive(Debug, Clone)]
pub struct SolvedEvent {
    pub job: JobId,
    pub cost: Option<String>,
    pub elapsed: Duration,
    pub timestamp: DateTime<Utc>,
}

/// A solve run ended without a solution.
#[derive(Debug, Clone)]
pub struct FailedEvent {
    pub job: Option<JobId>,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum SolverEvent {
    Submitted(SubmittedEvent),
    Poll(PollEvent),
    Solved(SolvedEvent),
    Failed(FailedEvent),
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &SolverEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, event: SolverEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

/// Logs events using the `log` crate. Solved tokens themselves are never
/// logged.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &SolverEvent) {
        match event {
            SolverEvent::Submitted(submitted) => {
                log::info!(
                    "submitted {:?} captcha as job {}",
                    submitted.capability,
                    submitted.job
                );
            }
            SolverEvent::Poll(poll) => {
                log::debug!("job {} status request #{}", poll.job, poll.attempt);
            }
            SolverEvent::Solved(solved) => {
                log::info!(
                    "job {} solved in {:.1}s{}",
                    solved.job,
                    solved.elapsed.as_secs_f64(),
                    solved
                        .cost
                        .as_deref()
                        .map(|cost| format!(" (cost {cost})"))
                        .unwrap_or_default()
                );
            }
            SolverEvent::Failed(failed) => match &failed.job {
                Some(job) => log::warn!("job {} failed: {}", job, failed.error),
                None => log::warn!("submission failed: {}", failed.error),
            },
        }
    }
}
