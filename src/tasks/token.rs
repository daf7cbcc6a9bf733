//! Builders for challenge-token captchas (reCAPTCHA, hCaptcha, Turnstile).
//!
//! These are solved against a site key and the page hosting the widget;
//! solving is inherently asynchronous and typically takes tens of seconds,
//! so submissions of these types go through the result poller.

use std::collections::HashMap;

use url::Url;

/// Google reCAPTCHA v2 (checkbox or invisible).
#[derive(Debug, Clone)]
pub struct RecaptchaV2Task {
    site_key: String,
    page_url: Url,
    invisible: bool,
    extra: HashMap<String, String>,
}

impl RecaptchaV2Task {
    pub fn new(site_key: impl Into<String>, page_url: Url) -> Self {
        Self {
            site_key: site_key.into(),
            page_url,
            invisible: false,
            extra: HashMap::new(),
        }
    }

    pub fn invisible(mut self) -> Self {
        self.invisible = true;
        self
    }

    pub fn insert_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn form_fields(&self) -> HashMap<String, String> {
        let mut fields = self.extra.clone();
        fields.insert("method".into(), "userrecaptcha".into());
        fields.insert("googlekey".into(), self.site_key.clone());
        fields.insert("pageurl".into(), self.page_url.as_str().to_string());
        if self.invisible {
            fields.insert("invisible".into(), "1".into());
        }
        fields
    }
}

/// Google reCAPTCHA v3: scored, with an optional action name.
#[derive(Debug, Clone)]
pub struct RecaptchaV3Task {
    site_key: String,
    page_url: Url,
    action: Option<String>,
    min_score: Option<f32>,
    extra: HashMap<String, String>,
}

impl RecaptchaV3Task {
    pub fn new(site_key: impl Into<String>, page_url: Url) -> Self {
        Self {
            site_key: site_key.into(),
            page_url,
            action: None,
            min_score: None,
            extra: HashMap::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn insert_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn form_fields(&self) -> HashMap<String, String> {
        let mut fields = self.extra.clone();
        fields.insert("method".into(), "userrecaptcha".into());
        fields.insert("version".into(), "v3".into());
        fields.insert("googlekey".into(), self.site_key.clone());
        fields.insert("pageurl".into(), self.page_url.as_str().to_string());
        if let Some(action) = &self.action {
            fields.insert("action".into(), action.clone());
        }
        if let Some(min_score) = self.min_score {
            fields.insert("min_score".into(), min_score.to_string());
        }
        fields
    }
}

/// hCaptcha widget.
#[derive(Debug, Clone)]
pub struct HCaptchaTask {
    site_key: String,
    page_url: Url,
    extra: HashMap<String, String>,
}

impl HCaptchaTask {
    pub fn new(site_key: impl Into<String>, page_url: Url) -> Self {
        Self {
            site_key: site_key.into(),
            page_url,
            extra: HashMap::new(),
        }
    }

    pub fn insert_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn form_fields(&self) -> HashMap<String, String> {
        let mut fields = self.extra.clone();
        fields.insert("method".into(), "hcaptcha".into());
        fields.insert("sitekey".into(), self.site_key.clone());
        fields.insert("pageurl".into(), self.page_url.as_str().to_string());
        fields
    }
}

/// Cloudflare Turnstile widget.
#[derive(Debug, Clone)]
pub struct TurnstileTask {
    site_key: String,
    page_url: Url,
    extra: HashMap<String, String>,
}

impl TurnstileTask {
    pub fn new(site_key: impl Into<String>, page_url: Url) -> Self {
        Self {
            site_key: site_key.into(),
            page_url,
            extra: HashMap::new(),
        }
    }

    pub fn insert_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn form_fields(&self) -> HashMap<String, String> {
        let mut fields = self.extra.clone();
        fields.insert("method".into(), "turnstile".into());
        fields.insert("sitekey".into(), self.site_key.clone());
        fields.insert("pageurl".into(), self.page_url.as_str().to_string());
        fields
    }
}
