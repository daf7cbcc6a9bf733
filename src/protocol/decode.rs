//! Decoders for the service's ad-hoc text responses.
//!
//! Every response body is turned into a typed value exactly once, here.
//! Downstream code never inspects raw strings: sentinel matching, pipe
//! splitting, and error-code extraction all terminate in this module.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::types::{BulkEntry, JobId, PollResult, ServiceError, Solution};

/// Sentinel body meaning the captcha has not been solved yet.
pub const NOT_READY: &str = "CAPCHA_NOT_READY";

/// Prefix of every successful response carrying a payload.
const OK_PREFIX: &str = "OK|";

/// Error marker: `ERROR:` followed by up to four digits, case-insensitive.
/// The digit group may be empty, in which case the code is 0.
static ERROR_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)ERROR:(\d{0,4})").expect("invalid error code regex")
});

/// Failures while decoding a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The bulk endpoint returned a different number of fields than ids were
    /// requested. Silently misaligning results would attribute answers to the
    /// wrong jobs, so this is a hard error.
    #[error("bulk response returned {actual} fields for {expected} ids")]
    BulkCountMismatch { expected: usize, actual: usize },
}

/// Extract a [`ServiceError`] from an arbitrary response body.
///
/// The body is scanned case-insensitively for `ERROR:` followed by zero to
/// four digits. A match without digits, or no match at all, yields code 0.
/// The raw (trimmed) body always becomes the message.
pub fn extract_error(body: &str) -> ServiceError {
    let code = ERROR_CODE_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<u16>().ok())
        .unwrap_or(0);
    ServiceError::new(code, body.trim())
}

/// Decode a submission response: `OK|<id>` with the id returned verbatim.
pub fn decode_submit(body: &str) -> Result<JobId, DecodeError> {
    let trimmed = body.trim();
    match trimmed.strip_prefix(OK_PREFIX) {
        Some(id) if !id.is_empty() => Ok(JobId::from(id)),
        _ => Err(extract_error(trimmed).into()),
    }
}

/// Decode a single-job status response.
///
/// Exact `CAPCHA_NOT_READY` maps to `Pending`. `OK|<text>` maps to `Solved`;
/// with `cost_aware` the text is split once more and the second field becomes
/// the cost. Anything else decodes as `Failed` via [`extract_error`].
pub fn decode_status(body: &str, cost_aware: bool) -> PollResult {
    let trimmed = body.trim();
    if trimmed == NOT_READY {
        return PollResult::Pending;
    }
    match trimmed.strip_prefix(OK_PREFIX) {
        Some(rest) => {
            let solution = if cost_aware {
                match rest.split_once('|') {
                    Some((text, cost)) => Solution::new(text).with_cost(cost),
                    None => Solution::new(rest),
                }
            } else {
                Solution::new(rest)
            };
            PollResult::Solved(solution)
        }
        None => PollResult::Failed(extract_error(trimmed)),
    }
}

/// Decode a bulk status response against the number of requested ids.
///
/// Fields are split on `|` and correspond positionally to the input ids; a
/// per-field `CAPCHA_NOT_READY` means that job is still pending. A field
/// count that does not match `expected` is a hard error, unless the body is
/// an error payload for the whole batch.
pub fn decode_bulk(body: &str, expected: usize) -> Result<Vec<BulkEntry>, DecodeError> {
    let trimmed = body.trim();
    let fields: Vec<&str> = trimmed.split('|').collect();
    if fields.len() != expected {
        if ERROR_CODE_RE.is_match(trimmed) {
            return Err(extract_error(trimmed).into());
        }
        return Err(DecodeError::BulkCountMismatch {
            expected,
            actual: fields.len(),
        });
    }
    Ok(fields
        .into_iter()
        .map(|field| {
            if field == NOT_READY {
                BulkEntry::Pending
            } else {
                BulkEntry::Solved(field.to_string())
            }
        })
        .collect())
}

/// Check a response against an exact success sentinel such as `OK` or
/// `OK_REPORT_RECORDED`.
pub fn decode_sentinel(body: &str, expected: &str) -> Result<(), DecodeError> {
    let trimmed = body.trim();
    if trimmed == expected {
        Ok(())
    } else {
        Err(extract_error(trimmed).into())
    }
}

/// Decode the pingback whitelist: `OK|url1|url2|…`, or bare `OK` when the
/// whitelist is empty.
pub fn decode_pingback_list(body: &str) -> Result<Vec<String>, DecodeError> {
    let trimmed = body.trim();
    if trimmed == "OK" {
        return Ok(Vec::new());
    }
    match trimmed.strip_prefix(OK_PREFIX) {
        Some(rest) => Ok(rest
            .split('|')
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()),
        None => Err(extract_error(trimmed).into()),
    }
}

/// Decode the account balance: a bare decimal body.
pub fn decode_balance(body: &str) -> Result<f64, DecodeError> {
    let trimmed = body.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| extract_error(trimmed).into())
}

/// Extract named numeric fields from the load-statistics XML document.
///
/// The document is flat (`<waiting>42</waiting>` style), so a per-field
/// pattern is sufficient. A requested field that is absent aborts the
/// operation.
pub fn decode_load_fields(
    body: &str,
    fields: &[&str],
) -> Result<Vec<(String, f64)>, DecodeError> {
    let mut values = Vec::with_capacity(fields.len());
    for name in fields {
        let pattern = format!("(?i)<{0}>\\s*([0-9]+(?:\\.[0-9]+)?)\\s*</{0}>", regex::escape(name));
        let re = Regex::new(&pattern)
            .map_err(|_| ServiceError::new(0, format!("invalid load field name '{name}'")))?;
        let value = re
            .captures(body)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .ok_or_else(|| ServiceError::new(0, format!("load response missing field '{name}'")))?;
        values.push((name.to_string(), value));
    }
    Ok(values)
}
