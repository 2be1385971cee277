//! Answers `tools/call` against a parsed daemon document.
//!
//! Each catalog row is resolved by its [`ToolKind`]:
//!
//! - fixed getters return their section body, or a placeholder sentence when
//!   the document lacks the section (this is a success, not an error);
//! - `get_all` returns every facet as one JSON object stamped with the time of
//!   the call;
//! - `get_section` looks up any section by name, case-insensitively, and fails
//!   with `SECTION_NOT_FOUND` listing what the document does contain.

use crate::jrpc;
use crate::mcp::tools::{self, ToolCallResponse, ToolKind};
use crate::sections::SectionMap;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Why a tool call did not produce content.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The caller asked for something that does not exist or omitted an argument.
    #[error(transparent)]
    Rejected(#[from] jrpc::Error),
    /// A payload could not be rendered as JSON.
    #[error("failed to serialize tool payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The `get_all` payload. Field order is the order clients see.
#[derive(Debug, serde::Serialize)]
struct ProfileSnapshot<'a> {
    about: &'a str,
    mission: &'a str,
    telos: &'a str,
    current_location: &'a str,
    preferences: &'a str,
    favorite_books: &'a str,
    favorite_movies: &'a str,
    favorite_podcasts: &'a str,
    daily_routine: &'a str,
    predictions: &'a str,
    projects: &'a str,
    last_updated: String,
}

impl<'a> ProfileSnapshot<'a> {
    fn capture(sections: &'a SectionMap) -> Self {
        let facet = |key: &str| sections.get_nonempty(key).unwrap_or("");
        ProfileSnapshot {
            about: facet("ABOUT"),
            mission: facet("MISSION"),
            telos: facet("TELOS"),
            current_location: facet("CURRENT_LOCATION"),
            preferences: facet("PREFERENCES"),
            favorite_books: facet("FAVORITE_BOOKS"),
            favorite_movies: facet("FAVORITE_MOVIES"),
            favorite_podcasts: facet("FAVORITE_PODCASTS"),
            daily_routine: facet("DAILY_ROUTINE"),
            predictions: facet("PREDICTIONS"),
            projects: facet("PROJECTS"),
            last_updated: now_rfc3339(),
        }
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Runs the tool called `name` with `arguments` against `sections`.
pub fn call(
    name: &str,
    arguments: &Map<String, Value>,
    sections: &SectionMap,
) -> Result<ToolCallResponse, DispatchError> {
    let tool = tools::find(name).ok_or_else(|| jrpc::Error::tool_not_found(name))?;
    match tool.kind {
        ToolKind::Section(key) => Ok(match sections.get_nonempty(key) {
            Some(body) => ToolCallResponse::text(body),
            None => ToolCallResponse::text(format!("{key} section not available")),
        }),
        ToolKind::All => {
            let snapshot = ProfileSnapshot::capture(sections);
            Ok(ToolCallResponse::text(serde_json::to_string(&snapshot)?))
        }
        ToolKind::Dynamic => {
            let requested = arguments
                .get("section")
                .and_then(Value::as_str)
                .filter(|section| !section.is_empty())
                .ok_or_else(|| jrpc::Error::invalid_params("Missing required parameter: section"))?;
            let key = requested.to_uppercase();
            match sections.get_nonempty(&key) {
                Some(body) => Ok(ToolCallResponse::text(body)),
                None => Err(jrpc::Error::section_not_found(&key, sections.keys()).into()),
            }
        }
    }
}
