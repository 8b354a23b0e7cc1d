//! Query-string and form-body building.

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Separator Horde expects between query-string parameters.
pub const QUERY_SEPARATOR: char = ';';
/// Separator used for URL-encoded form bodies.
pub const FORM_SEPARATOR: char = '&';

/// Ordered query parameters.
pub type QueryParams = Vec<(String, String)>;

/// Join `key=value` pairs with `separator`, percent-encoding both sides.
pub fn build_request_parameters<K, V>(params: &[(K, V)], separator: char) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::new();
    for (key, value) in params {
        if !out.is_empty() {
            out.push(separator);
        }
        out.push_str(&urlencoding::encode(key.as_ref()));
        out.push('=');
        out.push_str(&urlencoding::encode(value.as_ref()));
    }
    out
}

/// Query string for `params`, `?`-prefixed, or empty when there are none.
pub fn build_query_string<K, V>(params: &[(K, V)], separator: char) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return String::new();
    }
    format!("?{}", build_request_parameters(params, separator))
}

/// Append the session token to a query string. The token is appended
/// verbatim, the way Horde hands it out.
pub fn append_token(params: &str, token: &str) -> String {
    if params.is_empty() {
        format!("?token={token}")
    } else if params.contains('?') {
        format!("{params}&token={token}")
    } else {
        format!("{params}?token={token}")
    }
}

/// Render a structured object as a form body. Object and array values
/// (and `null`) are sent as their JSON text.
pub fn encode_form_fields(fields: &Map<String, Value>) -> Result<String, ApiError> {
    let pairs = fields
        .iter()
        .map(|(key, value)| Ok((key.as_str(), field_text(value)?)))
        .collect::<Result<Vec<_>, ApiError>>()?;
    Ok(build_request_parameters(&pairs, FORM_SEPARATOR))
}

fn field_text(value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other).map_err(ApiError::Serialization),
    }
}
