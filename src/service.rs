//! Per-request pipeline.
//!
//! ```text
//! OPTIONS -> preflight
//! else    -> validate -> fetch -> decode -> sections::parse -> mcp::dispatch
//! ```
//!
//! Every stage either hands its output on or produces the final response.
//! Whatever comes out, including a fault caught at the outermost boundary,
//! leaves with the CORS headers attached.

use crate::cors;
use crate::http::{self, HttpRequest, HttpResponse, Status};
use crate::jrpc::{self, Response};
use crate::mcp::{self, Routed};
use crate::sections;
use crate::source::{self, DocumentSource};
use crate::validate::{self, Rejection};
use logwise::privacy::LogIt;
use serde::Serialize;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};

/// A failure of this server, as opposed to a bad request or a bad upstream.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Panicked(String),
}

/// The stateless request handler.
///
/// Holds nothing but its document source, so one instance serves every
/// connection concurrently.
///
/// # Examples
///
/// ```
/// use daemon_mcp::Service;
/// use daemon_mcp::http::{HttpRequest, Status};
/// use daemon_mcp::source::StaticSource;
///
/// let service = Service::new(StaticSource::new("[ABOUT]\nhello"));
/// let body = r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"get_about"},"id":1}"#;
/// let response = service.handle(&HttpRequest::new("POST", body));
/// assert_eq!(response.status, Status::Ok);
///
/// let reply: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
/// assert_eq!(reply["result"]["content"][0]["text"], "hello");
/// ```
#[derive(Debug)]
pub struct Service<S> {
    source: S,
}

impl<S: DocumentSource> Service<S> {
    pub fn new(source: S) -> Self {
        Service { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Answers one HTTP request. Never fails; faults become a 500 envelope.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let mut response = if cors::is_preflight(request) {
            cors::preflight()
        } else {
            match panic::catch_unwind(AssertUnwindSafe(|| self.respond(request))) {
                Ok(Ok(response)) => response,
                Ok(Err(fault)) => fault_response(&fault),
                Err(payload) => fault_response(&Fault::Panicked(panic_message(payload.as_ref()))),
            }
        };
        cors::decorate(&mut response);
        response
    }

    fn respond(&self, request: &HttpRequest) -> Result<HttpResponse, Fault> {
        let call = match validate::validate(&request.method, &request.body) {
            Ok(call) => call,
            Err(rejection) => return reject(rejection),
        };
        logwise::info_sync!(
            "JSON-RPC call {method} id={id}",
            method = LogIt(&call.method),
            id = LogIt(&call.id)
        );

        let bytes = match self.source.fetch() {
            Ok(bytes) => bytes,
            Err(e) => {
                let error = jrpc::Error::internal_error(format!("Failed to load daemon data: {e}"));
                return reject(Rejection::new(Status::InternalServerError, error, call.id));
            }
        };
        let document = match source::decode(bytes) {
            Ok(document) => document,
            Err(e) => {
                let error = jrpc::Error::document_parse_error(format!("Failed to parse daemon.md: {e}"));
                return reject(Rejection::new(Status::InternalServerError, error, call.id));
            }
        };
        let sections = sections::parse(&document);

        match mcp::dispatch(&call, &sections)? {
            Routed::Reply(reply) => json_response(Status::Ok, &reply),
            Routed::Rejected(rejection) => reject(rejection),
        }
    }
}

/// The answer to a request the transport could not read.
///
/// Oversized requests get 413, anything else 400. The id is always `null`
/// since no envelope was parsed.
pub fn unreadable(error: &http::Error) -> HttpResponse {
    let status = match error {
        http::Error::TooLarge(_) => Status::PayloadTooLarge,
        http::Error::Malformed(_) | http::Error::Io(_) => Status::BadRequest,
    };
    let error = jrpc::Error::invalid_request(format!("Invalid Request: {error}"));
    let mut response = reject(Rejection::new(status, error, Value::Null))
        .unwrap_or_else(|fault| fault_response(&fault));
    cors::decorate(&mut response);
    response
}

fn reject(rejection: Rejection) -> Result<HttpResponse, Fault> {
    logwise::warn_sync!(
        "Rejected with {status}: {message}",
        status = LogIt(&rejection.status.code()),
        message = LogIt(&rejection.error.message)
    );
    let status = rejection.status;
    json_response(status, &rejection.into_response::<()>())
}

fn json_response<R: Serialize>(status: Status, reply: &Response<R>) -> Result<HttpResponse, Fault> {
    Ok(HttpResponse::json(status, serde_json::to_vec(reply)?))
}

fn fault_response(fault: &Fault) -> HttpResponse {
    logwise::error_sync!("Internal server error: {fault}", fault = LogIt(fault));
    let body = serde_json::json!({
        "jsonrpc": jrpc::VERSION,
        "error": jrpc::Error::internal_error(format!("Internal server error: {fault}")),
        "id": null,
    });
    HttpResponse::json(Status::InternalServerError, body.to_string().into_bytes())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "request handler panicked".to_string()
    }
}
