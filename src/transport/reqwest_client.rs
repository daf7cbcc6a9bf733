//! Reqwest-based implementation of the `ServiceHttpClient` trait.
//!
//! Thin adapter around `reqwest::Client`; converts transport-level failures
//! into [`TransportError`] and hands response bodies back as text.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{ServiceHttpClient, TransportError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-backed HTTP client used for all service calls.
pub struct ReqwestServiceHttpClient {
    client: Client,
}

impl ReqwestServiceHttpClient {
    /// Creates a client with a per-request timeout. Redirects follow the
    /// reqwest default; the service endpoints do not redirect.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| TransportError::Transport(err.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client, e.g. one configured with a proxy.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceHttpClient for ReqwestServiceHttpClient {
    async fn get_text(
        &self,
        url: &Url,
        query: &HashMap<String, String>,
    ) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url.as_str())
            .query(query)
            .send()
            .await
            .map_err(|err| TransportError::Transport(err.to_string()))?;

        body_text(response).await
    }

    async fn post_form(
        &self,
        url: &Url,
        form_fields: &HashMap<String, String>,
    ) -> Result<String, TransportError> {
        let response = self
            .client
            .post(url.as_str())
            .form(form_fields)
            .send()
            .await
            .map_err(|err| TransportError::Transport(err.to_string()))?;

        body_text(response).await
    }
}

async fn body_text(response: reqwest::Response) -> Result<String, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }
    response
        .text()
        .await
        .map_err(|err| TransportError::Transport(err.to_string()))
}
