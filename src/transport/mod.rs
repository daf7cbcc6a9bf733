//! HTTP transport seam.
//!
//! The protocol core is written against the [`ServiceHttpClient`] trait so
//! the concrete HTTP stack stays swappable and tests can drive the client
//! with canned bodies. Transport failures are propagated untouched; nothing
//! at this layer interprets response text.

pub mod reqwest_client;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

pub use reqwest_client::ReqwestServiceHttpClient;

/// Network and HTTP-layer failures, distinct from service-reported errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// Minimal HTTP surface the service client needs: a GET with query
/// parameters and a form POST, both returning the body as text.
#[async_trait]
pub trait ServiceHttpClient: Send + Sync {
    async fn get_text(
        &self,
        url: &Url,
        query: &HashMap<String, String>,
    ) -> Result<String, TransportError>;

    async fn post_form(
        &self,
        url: &Url,
        form_fields: &HashMap<String, String>,
    ) -> Result<String, TransportError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-response transport shared by the client and solver tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone)]
    pub enum Recorded {
        Get {
            path: String,
            query: HashMap<String, String>,
        },
        Post {
            path: String,
            fields: HashMap<String, String>,
        },
    }

    pub struct StubTransport {
        responses: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<Recorded>>,
    }

    impl StubTransport {
        pub fn new<I: IntoIterator<Item = &'static str>>(responses: I) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        fn next_response(&self) -> String {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("stub transport ran out of responses")
        }
    }

    #[async_trait]
    impl ServiceHttpClient for StubTransport {
        async fn get_text(
            &self,
            url: &Url,
            query: &HashMap<String, String>,
        ) -> Result<String, TransportError> {
            self.requests.lock().unwrap().push(Recorded::Get {
                path: url.path().to_string(),
                query: query.clone(),
            });
            Ok(self.next_response())
        }

        async fn post_form(
            &self,
            url: &Url,
            form_fields: &HashMap<String, String>,
        ) -> Result<String, TransportError> {
            self.requests.lock().unwrap().push(Recorded::Post {
                path: url.path().to_string(),
                fields: form_fields.clone(),
            });
            Ok(self.next_response())
        }
    }
}
