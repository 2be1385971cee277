//! JSON-RPC 2.0 envelope types.
//!
//! This module provides the request, response and error objects exchanged with
//! MCP clients. It follows the [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification)
//! with two server-defined codes on top of the standard ones (see [`ErrorCode`]).
//!
//! # Protocol Details
//!
//! JSON-RPC 2.0 messages are JSON objects that contain:
//! - A `jsonrpc` field with the value `"2.0"`
//! - Method information (`method` field) on requests
//! - Optional parameters (`params` field)
//! - An identifier (`id` field), echoed verbatim on the response
//!
//! Every response this crate emits carries `jsonrpc` and `id`, even when the id
//! could not be recovered from the request (it is then `null`).
//!
//! # Examples
//!
//! ```
//! use daemon_mcp::jrpc::{Error, Response};
//! use serde_json::json;
//!
//! let ok = Response::new(json!({"status": "ok"}), json!(7));
//! let text = serde_json::to_string(&ok).unwrap();
//! assert!(text.contains("\"result\""));
//! assert!(!text.contains("\"error\""));
//!
//! let failed: Response<serde_json::Value> =
//!     Response::err(Error::method_not_found("ping"), json!("req-1"));
//! let value = serde_json::to_value(&failed).unwrap();
//! assert_eq!(value["error"]["code"], json!(-32601));
//! assert_eq!(value["id"], json!("req-1"));
//! ```

use std::fmt::{Display, Formatter};

/// The protocol marker carried by every message.
pub const VERSION: &str = "2.0";

/// A validated JSON-RPC 2.0 request.
///
/// Instances are produced by [`crate::validate::validate`], which checks the
/// raw envelope field by field before building one.
///
/// # Fields
///
/// * `jsonrpc` - Protocol version, always "2.0" once validated
/// * `method` - The name of the method to be invoked
/// * `params` - Optional parameters (`null` is normalized to `None`)
/// * `id` - The request identifier, which may be a literal `null`
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Request {
    /// The JSON-RPC protocol version (must be "2.0")
    pub jsonrpc: String,
    /// The name of the method to invoke
    pub method: String,
    /// Optional parameters for the method call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Identifier echoed on the response
    pub id: serde_json::Value,
}

impl Request {
    /// Creates a new JSON-RPC 2.0 request.
    ///
    /// # Examples
    ///
    /// ```
    /// use daemon_mcp::jrpc::Request;
    /// use serde_json::json;
    ///
    /// let request = Request::new("tools/list".to_string(), None, json!(1));
    /// assert_eq!(request.jsonrpc, "2.0");
    /// ```
    pub fn new(method: String, params: Option<serde_json::Value>, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            method,
            params,
            id,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// Contains either a `result` or an `error`, never both. The generic type
/// parameter `R` is the type of the successful result.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Response<R> {
    /// The JSON-RPC protocol version
    pub jsonrpc: String,
    /// The result of the method call (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<R>,
    /// Error information if the method call failed (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
    /// The same identifier that was in the request, or `null`
    pub id: serde_json::Value,
}

impl<R> Response<R> {
    /// Creates a successful response with the given result.
    pub fn new(result: R, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Creates an error response with the given error.
    ///
    /// # Examples
    ///
    /// ```
    /// use daemon_mcp::jrpc::{Error, Response};
    /// use serde_json::json;
    ///
    /// let response: Response<String> = Response::err(
    ///     Error::invalid_params("Missing required parameter: section"),
    ///     json!(123),
    /// );
    /// assert!(response.result.is_none());
    /// assert_eq!(response.error.unwrap().code, -32602);
    /// ```
    pub fn err(e: Error, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            result: None,
            error: Some(e),
            id,
        }
    }
}

/// The error kinds this server reports.
///
/// Each kind maps to one fixed numeric code. `-32001` and `-32002` sit in the
/// implementation-defined server range.
///
/// # Examples
///
/// ```
/// use daemon_mcp::jrpc::ErrorCode;
///
/// assert_eq!(ErrorCode::ParseError.code(), -32700);
/// assert_eq!(ErrorCode::TOOL_NOT_FOUND.code(), ErrorCode::MethodNotFound.code());
/// assert_eq!(ErrorCode::DocumentParseError.code(), -32002);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON is not a valid request envelope.
    InvalidRequest,
    /// The method does not exist.
    MethodNotFound,
    /// The method exists but its parameters are wrong.
    InvalidParams,
    /// An unexpected server fault.
    InternalError,
    /// A requested document section does not exist.
    SectionNotFound,
    /// The upstream document could not be read as text.
    DocumentParseError,
}

impl ErrorCode {
    /// Unknown tools share the method-not-found code.
    pub const TOOL_NOT_FOUND: ErrorCode = ErrorCode::MethodNotFound;

    /// The numeric code sent on the wire.
    pub const fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::SectionNotFound => -32001,
            ErrorCode::DocumentParseError => -32002,
        }
    }
}

/// A JSON-RPC 2.0 error object.
///
/// # Fields
///
/// * `code` - A number indicating the error type, see [`ErrorCode`]
/// * `message` - A short human-readable description
/// * `data` - Optional structured detail, omitted from the wire when absent
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Error {
    /// Error code as defined by [`ErrorCode::code`]
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Optional additional information about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Creates a new error of the given kind with no `data`.
    pub fn new(kind: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: kind.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured detail to the error.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Creates a "Parse error" (code -32700).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    /// Creates an "Invalid Request" error (code -32600).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Creates a "Method not found" error (code -32601) naming the method.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(ErrorCode::MethodNotFound, format!("Method not found: {method}"))
    }

    /// Creates an error for an unknown tool (code -32601).
    ///
    /// # Examples
    ///
    /// ```
    /// use daemon_mcp::jrpc::Error;
    ///
    /// let error = Error::tool_not_found("get_weather");
    /// assert_eq!(error.code, -32601);
    /// assert_eq!(error.message, "Tool not found: get_weather");
    /// ```
    pub fn tool_not_found(name: &str) -> Self {
        Self::new(ErrorCode::TOOL_NOT_FOUND, format!("Tool not found: {name}"))
    }

    /// Creates an "Invalid params" error (code -32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// Creates an "Internal error" (code -32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Creates a "Section not found" error (code -32001).
    ///
    /// `available` lists the sections the document does contain, so callers can
    /// discover valid names from the failure itself.
    pub fn section_not_found<I, S>(key: &str, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let available: Vec<String> = available.into_iter().map(Into::into).collect();
        Self::new(ErrorCode::SectionNotFound, format!("Section not found: {key}"))
            .with_data(serde_json::json!({ "available_sections": available }))
    }

    /// Creates a document parse error (code -32002).
    pub fn document_parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DocumentParseError, message)
    }
}
