//! Per-captcha-type submission builders.
//!
//! Each supported captcha type carries its own request builder; the
//! [`Capability`] enum is the single selection point. The service client
//! stays generic over all of them and only ever sees finished form fields.

pub mod image;
pub mod token;

use std::collections::HashMap;

pub use image::ImageTask;
pub use token::{HCaptchaTask, RecaptchaV2Task, RecaptchaV3Task, TurnstileTask};

/// Captcha types this client can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Image,
    RecaptchaV2,
    RecaptchaV3,
    HCaptcha,
    Turnstile,
}

/// One captcha ready for submission.
#[derive(Debug, Clone)]
pub enum CaptchaTask {
    Image(ImageTask),
    RecaptchaV2(RecaptchaV2Task),
    RecaptchaV3(RecaptchaV3Task),
    HCaptcha(HCaptchaTask),
    Turnstile(TurnstileTask),
}

impl CaptchaTask {
    pub fn capability(&self) -> Capability {
        match self {
            CaptchaTask::Image(_) => Capability::Image,
            CaptchaTask::RecaptchaV2(_) => Capability::RecaptchaV2,
            CaptchaTask::RecaptchaV3(_) => Capability::RecaptchaV3,
            CaptchaTask::HCaptcha(_) => Capability::HCaptcha,
            CaptchaTask::Turnstile(_) => Capability::Turnstile,
        }
    }

    /// Form fields for the submission endpoint, minus the account key the
    /// client attaches itself.
    pub(crate) fn form_fields(&self) -> HashMap<String, String> {
        match self {
            CaptchaTask::Image(task) => task.form_fields(),
            CaptchaTask::RecaptchaV2(task) => task.form_fields(),
            CaptchaTask::RecaptchaV3(task) => task.form_fields(),
            CaptchaTask::HCaptcha(task) => task.form_fields(),
            CaptchaTask::Turnstile(task) => task.form_fields(),
        }
    }
}

impl From<ImageTask> for CaptchaTask {
    fn from(task: ImageTask) -> Self {
        CaptchaTask::Image(task)
    }
}

impl From<RecaptchaV2Task> for CaptchaTask {
    fn from(task: RecaptchaV2Task) -> Self {
        CaptchaTask::RecaptchaV2(task)
    }
}

impl From<RecaptchaV3Task> for CaptchaTask {
    fn from(task: RecaptchaV3Task) -> Self {
        CaptchaTask::RecaptchaV3(task)
    }
}

impl From<HCaptchaTask> for CaptchaTask {
    fn from(task: HCaptchaTask) -> Self {
        CaptchaTask::HCaptcha(task)
    }
}

impl From<TurnstileTask> for CaptchaTask {
    fn from(task: TurnstileTask) -> Self {
        CaptchaTask::Turnstile(task)
    }
}
