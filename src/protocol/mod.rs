//! Wire-level model of the solving service's text protocol.

pub mod decode;
pub mod types;

pub use decode::{
    DecodeError, NOT_READY, decode_balance, decode_bulk, decode_load_fields,
    decode_pingback_list, decode_sentinel, decode_status, decode_submit, extract_error,
};
pub use types::{BulkEntry, JobId, PollResult, ServiceError, Solution};
