//! Repair and interpretation of Horde's response envelope.
//!
//! # Design
//! Horde does not send plain JSON: the payload is framed as
//! `/*-secure-{...}*/`. The frame is described by a `WrapperFormat` (prefix
//! and suffix length in characters) so a change on the server side surfaces
//! as a loud decoding error instead of silent truncation.
//!
//! The decoded envelope is then matched against the known shapes in a fixed
//! order: success, known failure, unknown.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ApiError, ServerError, UnknownServerError};
use crate::types::{ResponseBody, ResponseMessage};

/// Characters Horde puts in front of the JSON payload (`/*-secure-`).
pub const HORDE_PREFIX_LEN: usize = 10;
/// Characters Horde puts after the JSON payload (`*/`).
pub const HORDE_SUFFIX_LEN: usize = 2;

/// Fixed-length framing around the JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperFormat {
    pub prefix_len: usize,
    pub suffix_len: usize,
}

impl Default for WrapperFormat {
    fn default() -> Self {
        Self::HORDE
    }
}

impl WrapperFormat {
    /// The `/*-secure-` ... `*/` frame used by Horde.
    pub const HORDE: WrapperFormat = WrapperFormat {
        prefix_len: HORDE_PREFIX_LEN,
        suffix_len: HORDE_SUFFIX_LEN,
    };

    /// No framing: the body is plain JSON.
    pub const NONE: WrapperFormat = WrapperFormat {
        prefix_len: 0,
        suffix_len: 0,
    };

    pub const fn new(prefix_len: usize, suffix_len: usize) -> Self {
        Self {
            prefix_len,
            suffix_len,
        }
    }

    /// Cut the frame off `raw`, counting characters rather than bytes.
    pub fn strip<'a>(&self, raw: &'a str) -> Result<&'a str, ApiError> {
        let len = raw.chars().count();
        let malformed = || ApiError::MalformedEnvelope {
            len,
            prefix_len: self.prefix_len,
            suffix_len: self.suffix_len,
        };
        let too_short = self
            .prefix_len
            .checked_add(self.suffix_len)
            .map_or(true, |frame| len < frame);
        if too_short {
            return Err(malformed());
        }

        let start = byte_offset(raw, self.prefix_len).ok_or_else(malformed)?;
        let end = byte_offset(raw, len - self.suffix_len).ok_or_else(malformed)?;
        Ok(&raw[start..end])
    }

    /// Strip the frame and parse the remainder as JSON.
    pub fn decode(&self, raw: &str) -> Result<Value, ApiError> {
        let payload = self.strip(raw)?;
        Ok(serde_json::from_str(payload)?)
    }
}

/// Byte index of the `n`th character, or `raw.len()` when `n` is the count.
fn byte_offset(raw: &str, n: usize) -> Option<usize> {
    raw.char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(raw.len()))
        .nth(n)
}

impl ResponseBody {
    /// Classify a decoded envelope.
    pub fn from_envelope(envelope: Value) -> ResponseBody {
        let Value::Object(mut envelope) = envelope else {
            warn!("response envelope is not an object");
            return ResponseBody::Unknown(UnknownServerError);
        };

        if let Some(Value::Object(response)) = envelope.remove("response") {
            if response.get("success").is_some_and(is_truthy) {
                debug!("server reported success");
                return ResponseBody::Success(response);
            }
        }

        if let Some(err) = envelope.remove("msgs").and_then(server_error_from_msgs) {
            debug!(kind = ?err.kind(), "server reported an error");
            return ResponseBody::Failure(err);
        }

        warn!("response envelope matches no known shape");
        ResponseBody::Unknown(UnknownServerError)
    }
}

fn server_error_from_msgs(msgs: Value) -> Option<ServerError> {
    let Value::Array(msgs) = msgs else {
        return None;
    };
    let mut msgs = msgs.into_iter();
    let first = msgs.next()?;
    let message = first.get("message").filter(|v| is_truthy(v))?;
    let kind = first.get("type").filter(|v| is_truthy(v))?;

    let additional = msgs
        .enumerate()
        .filter_map(|(idx, entry)| match entry {
            Value::Object(fields) => Some(message_from_fields(&fields)),
            other => {
                warn!(index = idx + 1, entry = %other, "skipping malformed server message");
                None
            }
        })
        .collect();

    Some(ServerError::new(
        Some(value_text(message)),
        Some(value_text(kind)),
        additional,
    ))
}

fn message_from_fields(fields: &Map<String, Value>) -> ResponseMessage {
    let text = |key: &str| fields.get(key).map(value_text).unwrap_or_default();
    ResponseMessage::new(text("message"), text("type"))
}

/// Strings verbatim, anything else as its JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strips_horde_secure_frame() {
        let raw = r#"/*-secure-{"response":{"success":true,"a":1}}*/"#;
        let payload = WrapperFormat::HORDE.strip(raw).unwrap();
        assert_eq!(payload, r#"{"response":{"success":true,"a":1}}"#);

        let value = WrapperFormat::HORDE.decode(raw).unwrap();
        assert_eq!(value, json!({"response": {"success": true, "a": 1}}));
    }

    #[test]
    fn strip_counts_characters_not_bytes() {
        let raw = "ééééééééééé{}ü!";
        let payload = WrapperFormat::new(11, 2).strip(raw).unwrap();
        assert_eq!(payload, "{}");
    }

    #[test]
    fn short_body_is_malformed() {
        let err = WrapperFormat::HORDE.strip("/*-secure").unwrap_err();
        assert!(matches!(
            err,
            ApiError::MalformedEnvelope {
                len: 9,
                prefix_len: 10,
                suffix_len: 2
            }
        ));
    }

    #[test]
    fn oversized_frame_is_malformed() {
        let err = WrapperFormat::new(usize::MAX, 1).strip("abc").unwrap_err();
        assert!(matches!(
            err,
            ApiError::MalformedEnvelope {
                len: 3,
                prefix_len: usize::MAX,
                suffix_len: 1
            }
        ));
    }

    #[test]
    fn wrong_frame_fails_to_parse() {
        let err = WrapperFormat::HORDE
            .decode(r#"{"response":{"success":true}}"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn unframed_format_parses_plain_json() {
        let value = WrapperFormat::NONE.decode(r#"{"msgs":[]}"#).unwrap();
        assert_eq!(value, json!({"msgs": []}));
    }

    #[test]
    fn success_keeps_whole_response_object() {
        let body = ResponseBody::from_envelope(json!({
            "response": {"success": true, "mailboxes": ["INBOX", "Sent"], "count": 2},
            "msgs": [{"message": "ignored", "type": "horde.error"}]
        }));
        let ResponseBody::Success(data) = body else {
            panic!("expected success, got {body:?}");
        };
        assert_eq!(data["mailboxes"], json!(["INBOX", "Sent"]));
        assert_eq!(data["count"], 2);
        assert_eq!(data["success"], true);
    }

    #[test]
    fn truthy_success_values_count() {
        for flag in [json!(1), json!("yes"), json!({}), json!([])] {
            let body = ResponseBody::from_envelope(json!({"response": {"success": flag}}));
            assert!(body.is_success(), "flag {flag} should be truthy");
        }
    }

    #[test]
    fn falsy_success_falls_through() {
        for flag in [json!(false), json!(0), json!(""), json!(null)] {
            let body = ResponseBody::from_envelope(json!({"response": {"success": flag}}));
            assert_eq!(body, ResponseBody::Unknown(UnknownServerError), "flag {flag}");
        }
    }

    #[test]
    fn failure_carries_first_message_and_the_rest_in_order() {
        let body = ResponseBody::from_envelope(json!({
            "response": {"success": false},
            "msgs": [
                {"message": "Permission denied", "type": "horde.error"},
                {"message": "Session expires soon", "type": "horde.warning"},
                {"message": "Retry later", "type": "horde.message"}
            ]
        }));
        let ResponseBody::Failure(err) = body else {
            panic!("expected failure, got {body:?}");
        };
        assert_eq!(err.message(), Some("Permission denied"));
        assert_eq!(err.kind(), Some("horde.error"));
        assert_eq!(
            err.additional_messages(),
            &[
                ResponseMessage::new("Session expires soon", "horde.warning"),
                ResponseMessage::new("Retry later", "horde.message"),
            ]
        );
    }

    #[test]
    fn single_message_has_no_secondary_messages() {
        let body = ResponseBody::from_envelope(json!({
            "msgs": [{"message": "Bad token", "type": "horde.error"}]
        }));
        let ResponseBody::Failure(err) = body else {
            panic!("expected failure");
        };
        assert!(err.additional_messages().is_empty());
    }

    #[test]
    fn malformed_secondary_messages_are_skipped() {
        let body = ResponseBody::from_envelope(json!({
            "msgs": [
                {"message": "Failed", "type": "horde.error"},
                "stray",
                {"message": "Detail"}
            ]
        }));
        let ResponseBody::Failure(err) = body else {
            panic!("expected failure");
        };
        assert_eq!(err.additional_messages(), &[ResponseMessage::new("Detail", "")]);
    }

    #[test]
    fn first_message_needs_message_and_type() {
        let shapes = [
            json!({"msgs": []}),
            json!({"msgs": [{"message": "no type"}]}),
            json!({"msgs": [{"type": "horde.error"}]}),
            json!({"msgs": [{"message": "", "type": "horde.error"}]}),
            json!({"msgs": "not a list"}),
        ];
        for shape in shapes {
            let body = ResponseBody::from_envelope(shape.clone());
            assert_eq!(body, ResponseBody::Unknown(UnknownServerError), "{shape}");
        }
    }

    #[test]
    fn non_object_envelope_is_unknown() {
        assert_eq!(
            ResponseBody::from_envelope(json!([1, 2, 3])),
            ResponseBody::Unknown(UnknownServerError)
        );
        assert_eq!(
            ResponseBody::from_envelope(json!({"response": "ok"})),
            ResponseBody::Unknown(UnknownServerError)
        );
    }
}
