//! Local decoding of the bearer credential's claims.
//!
//! The service issues three-part dot-separated tokens whose middle part is
//! base64url JSON. Only the subject claim is read; the signature is never
//! checked here because the service re-validates every request.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::Id;

/// Reasons a credential payload could not be read.
///
/// Never surfaced to callers of [`current_user_id`]; a malformed credential
/// simply means there is no current user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeFailure {
    #[error("expected 3 token segments, found {0}")]
    SegmentCount(usize),
    #[error("payload is not base64url: {0}")]
    Base64(String),
    #[error("payload is not JSON: {0}")]
    Json(String),
    #[error("subject claim missing or not numeric")]
    Subject,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<Value>,
}

/// Decode the subject claim of `token` into a user id.
pub fn decode_subject(token: &str) -> Result<Id, DecodeFailure> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeFailure::SegmentCount(segments.len()));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| DecodeFailure::Base64(err.to_string()))?;
    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|err| DecodeFailure::Json(err.to_string()))?;

    match claims.sub {
        Some(Value::Number(number)) => number.as_i64().ok_or(DecodeFailure::Subject),
        Some(Value::String(text)) => text.trim().parse().map_err(|_| DecodeFailure::Subject),
        _ => Err(DecodeFailure::Subject),
    }
}

/// Current user id carried by `token`, or `None` when it cannot be decoded.
pub fn current_user_id(token: &str) -> Option<Id> {
    match decode_subject(token) {
        Ok(id) => Some(id),
        Err(err) => {
            debug!(error = %err, "credential payload could not be decoded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn numeric_subject_yields_user_id() {
        let token = token_with_payload(r#"{"sub":42,"email":"cook@example.com","iat":1}"#);
        assert_eq!(current_user_id(&token), Some(42));
    }

    #[test]
    fn string_subject_is_parsed() {
        let token = token_with_payload(r#"{"sub":"17"}"#);
        assert_eq!(current_user_id(&token), Some(17));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let padded = base64::engine::general_purpose::URL_SAFE.encode(r#"{"sub":5}"#);
        let token = format!("h.{padded}.s");
        assert_eq!(current_user_id(&token), Some(5));
    }

    #[test]
    fn two_part_token_yields_no_user() {
        let full = token_with_payload(r#"{"sub":42}"#);
        let truncated = full.rsplit_once('.').map(|(head, _)| head).unwrap_or_default();
        assert_eq!(
            decode_subject(truncated),
            Err(DecodeFailure::SegmentCount(2))
        );
        assert_eq!(current_user_id(truncated), None);
    }

    #[test]
    fn garbage_payloads_yield_no_user() {
        assert_eq!(current_user_id("a.!!!.c"), None);
        assert_eq!(current_user_id(&token_with_payload("not json")), None);
        assert_eq!(current_user_id(&token_with_payload(r#"{"email":"x"}"#)), None);
        assert_eq!(current_user_id(&token_with_payload(r#"{"sub":"chef"}"#)), None);
        assert_eq!(current_user_id(""), None);
    }
}
