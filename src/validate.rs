//! Envelope checks for inbound JSON-RPC calls.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. the HTTP method must be [`WRITE_METHOD`] (405 otherwise),
//! 2. the body must be JSON,
//! 3. `jsonrpc` must be the string `"2.0"`,
//! 4. `method` must be a non-empty string,
//! 5. `id` must be present (a literal `null` counts as present).
//!
//! Steps 2-5 answer 400. A failure is returned as a [`Rejection`], which already
//! knows its HTTP status and the id to echo.
//!
//! # Examples
//!
//! ```
//! use daemon_mcp::validate::validate;
//! use daemon_mcp::http::Status;
//!
//! let ok = validate("POST", br#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#).unwrap();
//! assert_eq!(ok.method, "tools/list");
//!
//! let rejected = validate("GET", b"").unwrap_err();
//! assert_eq!(rejected.status, Status::MethodNotAllowed);
//! assert_eq!(rejected.error.code, -32600);
//! ```

use crate::http::Status;
use crate::jrpc::{self, Request, Response};
use serde_json::Value;

/// The only HTTP method that carries JSON-RPC calls.
pub const WRITE_METHOD: &str = "POST";

/// A request refused before any tool ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Transport status to answer with
    pub status: Status,
    /// The JSON-RPC error to put in the envelope
    pub error: jrpc::Error,
    /// The id to echo, `null` when it could not be recovered
    pub id: Value,
}

impl Rejection {
    pub fn new(status: Status, error: jrpc::Error, id: Value) -> Self {
        Self { status, error, id }
    }

    /// The error envelope for this rejection.
    pub fn into_response<R>(self) -> Response<R> {
        Response::err(self.error, self.id)
    }
}

/// Validates the transport method and JSON-RPC envelope of one call.
pub fn validate(method: &str, body: &[u8]) -> Result<Request, Rejection> {
    if method != WRITE_METHOD {
        return Err(Rejection::new(
            Status::MethodNotAllowed,
            jrpc::Error::invalid_request(format!("Only {WRITE_METHOD} requests are supported")),
            Value::Null,
        ));
    }

    let envelope: Value = serde_json::from_slice(body).map_err(|_| {
        Rejection::new(
            Status::BadRequest,
            jrpc::Error::parse_error("Invalid JSON"),
            Value::Null,
        )
    })?;

    let field = |name: &str| envelope.as_object().and_then(|object| object.get(name));
    let echoed_id = field("id").cloned().unwrap_or(Value::Null);
    let invalid = |message: &str, id: Value| {
        Rejection::new(Status::BadRequest, jrpc::Error::invalid_request(message), id)
    };

    if field("jsonrpc").and_then(Value::as_str) != Some(jrpc::VERSION) {
        return Err(invalid(
            "Invalid Request: jsonrpc must be \"2.0\"",
            echoed_id,
        ));
    }

    let rpc_method = match field("method").and_then(Value::as_str) {
        Some(rpc_method) if !rpc_method.is_empty() => rpc_method.to_string(),
        _ => return Err(invalid("Invalid Request: method required", echoed_id)),
    };

    let Some(id) = field("id").cloned() else {
        return Err(invalid("Invalid Request: id required", Value::Null));
    };

    let params = field("params").filter(|params| !params.is_null()).cloned();
    Ok(Request::new(rpc_method, params, id))
}
