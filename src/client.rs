//! Typed client for the solving service's REST-like endpoints.
//!
//! Translates operations into HTTP requests against the fixed endpoints and
//! hands every response body to the protocol decoders exactly once. No call
//! here retries; the poll loop in [`crate::polling`] is the only place that
//! repeats a request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::protocol::decode::{
    DecodeError, decode_balance, decode_bulk, decode_load_fields, decode_pingback_list,
    decode_sentinel, decode_status, decode_submit,
};
use crate::protocol::types::{BulkEntry, JobId, PollResult, ServiceError};
use crate::tasks::CaptchaTask;
use crate::transport::{ReqwestServiceHttpClient, ServiceHttpClient, TransportError};

/// Default service origin; RuCaptcha and other compatible services are
/// reachable by overriding the base URL.
pub const DEFAULT_BASE_URL: &str = "https://2captcha.com";

const SUBMIT_PATH: &str = "in.php";
const STATUS_PATH: &str = "res.php";
const LOAD_PATH: &str = "load.php";

const REPORT_RECORDED: &str = "OK_REPORT_RECORDED";

/// Errors surfaced by the service client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("bulk response returned {actual} fields for {expected} ids")]
    BulkCountMismatch { expected: usize, actual: usize },
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl From<DecodeError> for ClientError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Service(err) => ClientError::Service(err),
            DecodeError::BulkCountMismatch { expected, actual } => {
                ClientError::BulkCountMismatch { expected, actual }
            }
        }
    }
}

/// Anything the poller can ask for a job status. Implemented by
/// [`CaptchaServiceClient`]; tests substitute scripted sources.
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn poll(&self, id: &JobId) -> Result<PollResult, ClientError>;
}

/// Client for one account against one service origin. Cheap to share; all
/// state is immutable after construction.
pub struct CaptchaServiceClient {
    transport: Arc<dyn ServiceHttpClient>,
    api_key: String,
    base_url: Url,
    cost_aware: bool,
    soft_id: Option<u32>,
}

impl CaptchaServiceClient {
    /// Client with the default reqwest transport and service origin.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        let transport = Arc::new(ReqwestServiceHttpClient::new()?);
        Self::with_transport(api_key, transport)
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(
        api_key: impl Into<String>,
        transport: Arc<dyn ServiceHttpClient>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            transport,
            api_key: api_key.into(),
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            cost_aware: false,
            soft_id: None,
        })
    }

    /// Point the client at a different compatible service origin.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Use the cost-reporting status action; solved results then carry the
    /// price charged for the job.
    pub fn with_cost_aware(mut self, cost_aware: bool) -> Self {
        self.cost_aware = cost_aware;
        self
    }

    /// Software id attached to every submission.
    pub fn with_soft_id(mut self, soft_id: u32) -> Self {
        self.soft_id = Some(soft_id);
        self
    }

    /// Submit a captcha and return the job id the service assigned.
    pub async fn submit(&self, task: &CaptchaTask) -> Result<JobId, ClientError> {
        let mut fields = task.form_fields();
        fields.insert("key".into(), self.api_key.clone());
        if let Some(soft_id) = self.soft_id {
            fields.insert("soft_id".into(), soft_id.to_string());
        }

        let url = self.endpoint(SUBMIT_PATH)?;
        log::debug!("submitting {:?} captcha", task.capability());
        let body = self.transport.post_form(&url, &fields).await?;
        let id = decode_submit(&body)?;
        log::info!("captcha submitted as job {id}");
        Ok(id)
    }

    /// Ask for the status of one job. `Pending` is not an error; `Failed`
    /// carries the service-reported error without aborting the call.
    pub async fn fetch_result(&self, id: &JobId) -> Result<PollResult, ClientError> {
        let action = if self.cost_aware { "get2" } else { "get" };
        let mut query = self.res_query(action);
        query.insert("id".into(), id.as_str().to_string());

        let url = self.endpoint(STATUS_PATH)?;
        let body = self.transport.get_text(&url, &query).await?;
        Ok(decode_status(&body, self.cost_aware))
    }

    /// Fetch the status of several jobs in one request. The response fields
    /// correspond positionally to `ids`; a count mismatch is a hard error.
    pub async fn fetch_bulk_results(
        &self,
        ids: &[JobId],
    ) -> Result<HashMap<JobId, BulkEntry>, ClientError> {
        let joined = ids
            .iter()
            .map(JobId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let mut query = self.res_query("get");
        query.insert("ids".into(), joined);

        let url = self.endpoint(STATUS_PATH)?;
        let body = self.transport.get_text(&url, &query).await?;
        let entries = decode_bulk(&body, ids.len())?;
        Ok(ids.iter().cloned().zip(entries).collect())
    }

    /// Report a wrongly solved captcha.
    pub async fn report_bad(&self, id: &JobId) -> Result<(), ClientError> {
        let mut query = self.res_query("reportbad");
        query.insert("id".into(), id.as_str().to_string());
        let body = self.request_status(&query).await?;
        decode_sentinel(&body, REPORT_RECORDED)?;
        log::info!("job {id} reported as bad");
        Ok(())
    }

    /// Whitelist a pingback URL for completion callbacks.
    pub async fn add_pingback(&self, addr: &Url) -> Result<(), ClientError> {
        let mut query = self.res_query("add_pingback");
        query.insert("addr".into(), addr.as_str().to_string());
        let body = self.request_status(&query).await?;
        decode_sentinel(&body, "OK")?;
        Ok(())
    }

    /// List the whitelisted pingback URLs.
    pub async fn list_pingbacks(&self) -> Result<Vec<String>, ClientError> {
        let query = self.res_query("get_pingback");
        let body = self.request_status(&query).await?;
        Ok(decode_pingback_list(&body)?)
    }

    /// Remove one pingback URL from the whitelist.
    pub async fn delete_pingback(&self, addr: &str) -> Result<(), ClientError> {
        let mut query = self.res_query("del_pingback");
        query.insert("addr".into(), addr.to_string());
        let body = self.request_status(&query).await?;
        decode_sentinel(&body, "OK")?;
        Ok(())
    }

    /// Clear the whole pingback whitelist.
    pub async fn delete_all_pingbacks(&self) -> Result<(), ClientError> {
        self.delete_pingback("all").await
    }

    /// Current account balance.
    pub async fn balance(&self) -> Result<f64, ClientError> {
        let query = self.res_query("getbalance");
        let body = self.request_status(&query).await?;
        Ok(decode_balance(&body)?)
    }

    /// Named numeric fields from the server load report, in request order.
    pub async fn load_stats(&self, fields: &[&str]) -> Result<Vec<(String, f64)>, ClientError> {
        let url = self.endpoint(LOAD_PATH)?;
        let body = self.transport.get_text(&url, &HashMap::new()).await?;
        Ok(decode_load_fields(&body, fields)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    fn res_query(&self, action: &str) -> HashMap<String, String> {
        let mut query = HashMap::new();
        query.insert("key".into(), self.api_key.clone());
        query.insert("action".into(), action.to_string());
        query
    }

    async fn request_status(
        &self,
        query: &HashMap<String, String>,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(STATUS_PATH)?;
        Ok(self.transport.get_text(&url, query).await?)
    }
}

#[async_trait]
impl ResultSource for CaptchaServiceClient {
    async fn poll(&self, id: &JobId) -> Result<PollResult, ClientError> {
        self.fetch_result(id).await
    }
}
