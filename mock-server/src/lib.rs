use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Form, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Frame Horde puts around every AJAX response.
pub const SECURE_PREFIX: &str = "/*-secure-";
pub const SECURE_SUFFIX: &str = "*/";

#[derive(Clone, Debug)]
pub struct AppState {
    pub token: Arc<str>,
}

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
    };
    Router::new()
        .route("/services/ajax.php/{app}/{action}", any(ajax))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), "mock horde listening");
    axum::serve(listener, app(token)).await
}

/// Wrap `envelope` the way Horde does.
pub fn secure(envelope: &Value) -> String {
    format!("{SECURE_PREFIX}{envelope}{SECURE_SUFFIX}")
}

fn reply(envelope: Value) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        secure(&envelope),
    )
        .into_response()
}

fn error_msg(message: &str, kind: &str) -> Value {
    json!({"message": message, "type": kind})
}

async fn ajax(
    State(state): State<AppState>,
    Path((app, action)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    debug!(%app, %action, "ajax call");

    if query.get("token").map(String::as_str) != Some(&*state.token) {
        return reply(json!({
            "msgs": [error_msg("Invalid token.", "horde.error")]
        }));
    }

    // Bodiless calls carry no form content type.
    let form: Map<String, Value> = form
        .map(|Form(pairs)| pairs)
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    match (app.as_str(), action.as_str()) {
        ("imp", "listMailboxes") => reply(json!({
            "response": {
                "success": 1,
                "mailboxes": ["INBOX", "Drafts", "Sent", "Trash"]
            }
        })),
        // Echoes the decoded form fields.
        ("horde", "echo") => {
            let mut response = form;
            response.insert("success".to_string(), Value::Bool(true));
            reply(json!({ "response": response }))
        }
        ("imp", "deleteMessages") => reply(json!({
            "response": {"success": 0},
            "msgs": [
                error_msg("Could not delete messages.", "horde.error"),
                error_msg("Mailbox is read-only.", "horde.warning"),
                error_msg("Contact your administrator.", "horde.message")
            ]
        })),
        ("horde", "garbled") => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        ("horde", "broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => reply(json!({ "response": false })),
    }
}
