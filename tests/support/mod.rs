#![allow(dead_code)]

use daemon_mcp::Service;
use daemon_mcp::http::{HttpRequest, HttpResponse};
use daemon_mcp::source::{DocumentSource, FetchError, StaticSource};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const MOCK_DAEMON_MD: &str = "# DAEMON DATA FILE

[ABOUT]
Test about content for testing purposes.

[MISSION]
Test mission statement.

[TELOS]
Test TELOS framework content.

[CURRENT_LOCATION]
Test location.

[PREFERENCES]
- Preference 1
- Preference 2

[FAVORITE_BOOKS]
- Book 1
- Book 2

[FAVORITE_MOVIES]
- Movie 1
- Movie 2

[FAVORITE_PODCASTS]
- Podcast 1
- Podcast 2

[DAILY_ROUTINE]
- 8AM: Wake up
- 9AM: Work

[PREDICTIONS]
- Prediction 1 (Probable)
- Prediction 2 (Likely)
";

pub const MOCK_SECTIONS: [&str; 10] = [
    "ABOUT",
    "MISSION",
    "TELOS",
    "CURRENT_LOCATION",
    "PREFERENCES",
    "FAVORITE_BOOKS",
    "FAVORITE_MOVIES",
    "FAVORITE_PODCASTS",
    "DAILY_ROUTINE",
    "PREDICTIONS",
];

pub(crate) fn mock_service() -> Service<StaticSource> {
    Service::new(StaticSource::new(MOCK_DAEMON_MD))
}

/// A source whose upstream always fails, counting how often it was asked.
#[derive(Default)]
pub(crate) struct FailingSource {
    pub(crate) status: Option<u16>,
    pub(crate) fetches: AtomicUsize,
}

impl DocumentSource for FailingSource {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Err(match self.status {
            Some(status) => FetchError::Status(status),
            None => FetchError::Transport("connection refused".to_string()),
        })
    }
}

pub(crate) fn rpc(method: &str, params: Option<Value>, id: Value) -> Value {
    let mut envelope = json!({"jsonrpc": "2.0", "method": method, "id": id});
    if let Some(params) = params {
        envelope["params"] = params;
    }
    envelope
}

pub(crate) fn post<S: DocumentSource>(service: &Service<S>, body: &Value) -> HttpResponse {
    service.handle(&HttpRequest::new("POST", body.to_string()))
}

pub(crate) fn call_tool<S: DocumentSource>(
    service: &Service<S>,
    name: &str,
    arguments: Option<Value>,
    id: Value,
) -> HttpResponse {
    let mut params = json!({"name": name});
    if let Some(arguments) = arguments {
        params["arguments"] = arguments;
    }
    post(service, &rpc("tools/call", Some(params), id))
}

pub(crate) fn body(response: &HttpResponse) -> Value {
    serde_json::from_slice(response.body()).expect("response body is JSON")
}

/// The text of the first content item of a successful reply.
pub(crate) fn text(reply: &Value) -> &str {
    reply["result"]["content"][0]["text"]
        .as_str()
        .expect("reply carries text content")
}

pub(crate) fn assert_cors(response: &HttpResponse) {
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(
        response.header("Access-Control-Allow-Methods"),
        Some("POST, OPTIONS")
    );
    assert_eq!(
        response.header("Access-Control-Allow-Headers"),
        Some("Content-Type")
    );
    assert_eq!(response.header("Access-Control-Max-Age"), Some("86400"));
}
