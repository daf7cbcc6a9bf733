//! Typed results and errors shared across the client, poller, and decoders.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier the service assigns to a submitted captcha. Opaque and
/// immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Solved captcha text or token, plus the solving cost when the cost-aware
/// status action was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub text: String,
    pub cost: Option<String>,
}

impl Solution {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cost: None,
        }
    }

    pub fn with_cost(mut self, cost: impl Into<String>) -> Self {
        self.cost = Some(cost.into());
        self
    }
}

/// Error payload reported by the remote service, as opposed to a transport
/// failure. The code comes from the `ERROR:<digits>` marker when present;
/// unrecognized payloads carry code 0 and the raw body as message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("service error {code}: {message}")]
pub struct ServiceError {
    pub code: u16,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Outcome of one status request. `Solved` and `Failed` are terminal; the
/// caller must stop polling once either is observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollResult {
    Pending,
    Solved(Solution),
    Failed(ServiceError),
}

impl PollResult {
    pub fn is_pending(&self) -> bool {
        matches!(self, PollResult::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

/// One slot of a bulk status response. The bulk endpoint never reports cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkEntry {
    Pending,
    Solved(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_opaque() {
        let id = JobId::from("2122988149");
        assert_eq!(id.as_str(), "2122988149");
        assert_eq!(id.to_string(), "2122988149");
    }

    #[test]
    fn poll_result_terminality() {
        assert!(PollResult::Pending.is_pending());
        assert!(PollResult::Solved(Solution::new("abc")).is_terminal());
        assert!(PollResult::Failed(ServiceError::new(1, "boom")).is_terminal());
    }
}
