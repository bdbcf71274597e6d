use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::{
    Error,
    normalize::{self, ErrorFn},
};

pub const CODE_SUCCESS: i64 = 200;
pub const CODE_INPUT_ERROR: i64 = 422;
pub const CODE_SYSTEM_ERROR: i64 = 500;

pub const MSG_SUCCESS: &str = "success";
pub const MSG_INPUT_ERROR: &str = "input error";
pub const MSG_SYSTEM_ERROR: &str = "system error";

/// Body sent when a handler fails with an error that has no code.
pub const SYSTEM_ERROR_BODY: &[u8] = br#"{"code":500,"msg":"system error"}"#;
/// Body sent when the request body does not decode into the handler input.
pub const INPUT_ERROR_BODY: &[u8] = br#"{"code":422,"msg":"input error"}"#;
/// Body sent when a handler without data output succeeds.
pub const SUCCESS_BODY: &[u8] = br#"{"code":200,"msg":"success"}"#;

/// The `{code, msg, data?}` object written for every request.
///
/// `data` is left out of the JSON entirely when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<D = Box<RawValue>> {
    pub code: i64,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
}

impl<D> Envelope<D> {
    pub fn new(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
    pub fn success(data: D) -> Self {
        Self {
            code: CODE_SUCCESS,
            msg: MSG_SUCCESS.into(),
            data: Some(data),
        }
    }
}

/// What came out of decoding and invoking a handler.
#[derive(Debug)]
pub enum Outcome {
    DecodeFailed(serde_json::Error),
    /// The handler succeeded but its output could not be encoded.
    EncodeFailed(serde_json::Error),
    Succeeded(Option<Box<RawValue>>),
    Failed(Error),
}

pub(crate) fn map_outcome(
    outcome: Outcome,
    normalizer: Option<&ErrorFn>,
    handler: &str,
) -> (StatusCode, Bytes) {
    match outcome {
        Outcome::DecodeFailed(e) => {
            tracing::debug!(handler, error = %e, "request body rejected");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Bytes::from_static(INPUT_ERROR_BODY),
            )
        }
        Outcome::EncodeFailed(e) => {
            tracing::error!(handler, error = %e, "failed to encode handler output");
            system_error()
        }
        Outcome::Succeeded(None) => (StatusCode::OK, Bytes::from_static(SUCCESS_BODY)),
        Outcome::Succeeded(Some(data)) => match encode(&Envelope::success(data), handler) {
            Some(body) => (StatusCode::OK, body),
            None => system_error(),
        },
        Outcome::Failed(e) => {
            let e = normalize::apply(normalizer, e);
            let Some(code) = e.code() else {
                tracing::error!(handler, error = %e, "handler failed");
                return system_error();
            };
            tracing::debug!(handler, code, error = %e, "handler returned coded error");
            match encode(&Envelope::<()>::new(code, e.to_string()), handler) {
                Some(body) => (StatusCode::BAD_REQUEST, body),
                None => system_error(),
            }
        }
    }
}

fn system_error() -> (StatusCode, Bytes) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Bytes::from_static(SYSTEM_ERROR_BODY),
    )
}

fn encode<D: Serialize>(envelope: &Envelope<D>, handler: &str) -> Option<Bytes> {
    match serde_json::to_vec(envelope) {
        Ok(body) => Some(body.into()),
        Err(e) => {
            tracing::error!(handler, error = %e, "failed to encode response");
            None
        }
    }
}
