//! Builder for classic image-to-text captchas.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;

/// An image captcha plus the recognition hints the service accepts.
///
/// The image travels base64-encoded in the `body` form field. Hints are only
/// sent when explicitly set, so the service's own defaults apply otherwise.
#[derive(Debug, Clone)]
pub struct ImageTask {
    image: Bytes,
    phrase: Option<bool>,
    case_sensitive: Option<bool>,
    numeric: Option<u8>,
    min_len: Option<u32>,
    max_len: Option<u32>,
    extra: HashMap<String, String>,
}

impl ImageTask {
    pub fn new(image: impl Into<Bytes>) -> Self {
        Self {
            image: image.into(),
            phrase: None,
            case_sensitive: None,
            numeric: None,
            min_len: None,
            max_len: None,
            extra: HashMap::new(),
        }
    }

    /// The captcha contains two or more words.
    pub fn with_phrase(mut self, phrase: bool) -> Self {
        self.phrase = Some(phrase);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    /// Numeric hint as defined by the service (0-4).
    pub fn with_numeric(mut self, numeric: u8) -> Self {
        self.numeric = Some(numeric);
        self
    }

    pub fn with_length_bounds(mut self, min_len: u32, max_len: u32) -> Self {
        self.min_len = Some(min_len);
        self.max_len = Some(max_len);
        self
    }

    /// Free-form extra parameter passed through to the submission endpoint.
    pub fn insert_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn form_fields(&self) -> HashMap<String, String> {
        let mut fields = self.extra.clone();
        fields.insert("method".into(), "base64".into());
        fields.insert("body".into(), BASE64.encode(&self.image));
        if let Some(phrase) = self.phrase {
            fields.insert("phrase".into(), flag(phrase));
        }
        if let Some(case_sensitive) = self.case_sensitive {
            fields.insert("regsense".into(), flag(case_sensitive));
        }
        if let Some(numeric) = self.numeric {
            fields.insert("numeric".into(), numeric.to_string());
        }
        if let Some(min_len) = self.min_len {
            fields.insert("min_len".into(), min_len.to_string());
        }
        if let Some(max_len) = self.max_len {
            fields.insert("max_len".into(), max_len.to_string());
        }
        fields
    }
}

fn flag(value: bool) -> String {
    if value { "1".into() } else { "0".into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_image_and_hints() {
        let task = ImageTask::new(&b"\x89PNG fake"[..])
            .with_case_sensitive(true)
            .with_numeric(1)
            .with_length_bounds(4, 8);
        let fields = task.form_fields();

        assert_eq!(fields.get("method").unwrap(), "base64");
        assert_eq!(fields.get("body").unwrap(), &BASE64.encode(b"\x89PNG fake"));
        assert_eq!(fields.get("regsense").unwrap(), "1");
        assert_eq!(fields.get("numeric").unwrap(), "1");
        assert_eq!(fields.get("min_len").unwrap(), "4");
        assert_eq!(fields.get("max_len").unwrap(), "8");
        assert!(!fields.contains_key("phrase"));
    }

    #[test]
    fn extra_params_pass_through() {
        let fields = ImageTask::new(&b"img"[..])
            .insert_param("lang", "en")
            .form_fields();
        assert_eq!(fields.get("lang").unwrap(), "en");
    }
}
