//! # twocaptcha-rs
//!
//! Async Rust client for the 2captcha/RuCaptcha text API.
//!
//! The service solves captchas asynchronously: you submit an image or a
//! site key, receive a job id, and poll until a human or automated worker
//! produces the answer. This crate hides the wire protocol (pipe-delimited
//! bodies, sentinel strings, the `ERROR:<code>` convention) behind typed
//! results, and drives the poll loop for you.
//!
//! ## Features
//!
//! - Image, reCAPTCHA v2/v3, hCaptcha, and Turnstile submissions
//! - Fixed-interval polling with a wall-clock deadline
//! - Bulk status requests for many jobs at once
//! - Account operations: balance, bad-captcha reporting, pingback
//!   whitelist management, server load stats
//! - Pluggable HTTP transport and event hooks
//!
//! ## Example
//!
//! ```no_run
//! use twocaptcha_rs::{CaptchaSolver, RecaptchaV2Task};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let solver = CaptchaSolver::new("YOUR_API_KEY")?;
//!     let page = Url::parse("https://example.com/login")?;
//!     let task = RecaptchaV2Task::new("site-key", page).into();
//!     let solution = solver.solve(&task).await?;
//!     println!("token: {}", solution.text);
//!     Ok(())
//! }
//! ```

mod client;
mod solver;

pub mod events;
pub mod polling;
pub mod protocol;
pub mod tasks;
pub mod transport;

pub use crate::client::{CaptchaServiceClient, ClientError, DEFAULT_BASE_URL, ResultSource};

pub use crate::solver::{
    CaptchaSolver,
    CaptchaSolverBuilder,
    SolverConfig,
    SolverError,
    SolverResult,
};

pub use crate::protocol::{
    BulkEntry,
    DecodeError,
    JobId,
    PollResult,
    ServiceError,
    Solution,
};

pub use crate::polling::{
    Job,
    PollError,
    PollPolicy,
    ResultPoller,
    TokioWaiter,
    Waiter,
};

pub use crate::tasks::{
    Capability,
    CaptchaTask,
    HCaptchaTask,
    ImageTask,
    RecaptchaV2Task,
    RecaptchaV3Task,
    TurnstileTask,
};

pub use crate::transport::{
    ReqwestServiceHttpClient,
    ServiceHttpClient,
    TransportError,
};

pub use crate::events::{
    EventDispatcher,
    EventHandler,
    FailedEvent,
    LoggingHandler,
    PollEvent,
    SolvedEvent,
    SolverEvent,
    SubmittedEvent,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
