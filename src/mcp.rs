//! MCP method routing.
//!
//! Two methods are served: `tools/list` answers with the static catalog and
//! `tools/call` runs one tool against the parsed document. Anything else is
//! `METHOD_NOT_FOUND` at HTTP 404.

use crate::http::Status;
use crate::jrpc::{Error, Request, Response};
use crate::sections::SectionMap;
use crate::validate::Rejection;
use serde_json::{Map, Value};

pub mod profile;
pub mod tools;

use profile::DispatchError;
use tools::ToolCallResponse;

/// The outcome of routing one validated request.
#[derive(Debug)]
pub enum Routed {
    /// An envelope to send with HTTP 200, success or application error.
    Reply(Response<ToolCallResponse>),
    /// The method or its params were refused at the transport level.
    Rejected(Rejection),
}

/// Routes `request` to its MCP method.
///
/// Serialization failures are returned as `Err`; they are faults of this server,
/// not of the caller.
pub fn dispatch(request: &Request, sections: &SectionMap) -> Result<Routed, serde_json::Error> {
    match request.method.as_str() {
        "tools/list" => {
            let text = serde_json::to_string(&tools::list())?;
            Ok(Routed::Reply(Response::new(
                ToolCallResponse::text(text),
                request.id.clone(),
            )))
        }
        "tools/call" => call(request, sections),
        other => Ok(Routed::Rejected(Rejection::new(
            Status::NotFound,
            Error::method_not_found(other),
            request.id.clone(),
        ))),
    }
}

/// `tools/call` parameters: `{"name": string, "arguments"?: object}`.
#[derive(Debug)]
struct ToolCallParams {
    name: String,
    arguments: Map<String, Value>,
}

impl ToolCallParams {
    fn from_params(params: Option<&Value>) -> Option<Self> {
        let params = params?.as_object()?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())?;
        let arguments = params
            .get("arguments")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Some(ToolCallParams {
            name: name.to_string(),
            arguments,
        })
    }
}

fn call(request: &Request, sections: &SectionMap) -> Result<Routed, serde_json::Error> {
    let id = request.id.clone();
    let Some(params) = ToolCallParams::from_params(request.params.as_ref()) else {
        return Ok(Routed::Rejected(Rejection::new(
            Status::BadRequest,
            Error::invalid_params("Invalid params: tool name required"),
            id,
        )));
    };
    match profile::call(&params.name, &params.arguments, sections) {
        Ok(response) => Ok(Routed::Reply(Response::new(response, id))),
        Err(DispatchError::Rejected(error)) => Ok(Routed::Reply(Response::err(error, id))),
        Err(DispatchError::Serialize(error)) => Err(error),
    }
}
