//! Tool catalog and MCP tool payload types.
//!
//! The catalog is a fixed table: every tool is one [`ToolDescriptor`] row whose
//! [`ToolKind`] tells the dispatcher how to answer it. Nothing registers tools
//! at runtime, so the table can be shared freely between request threads.
//!
//! # Examples
//!
//! ```
//! use daemon_mcp::mcp::tools::{self, ToolKind};
//!
//! let about = tools::find("get_about").unwrap();
//! assert_eq!(about.kind, ToolKind::Section("ABOUT"));
//! assert!(tools::find("get_weather").is_none());
//!
//! let listed = serde_json::to_value(tools::list()).unwrap();
//! assert_eq!(listed["tools"].as_array().unwrap().len(), tools::CATALOG.len());
//! ```

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// How a tool produces its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Returns the body of one fixed document section.
    Section(&'static str),
    /// Returns every known facet as one JSON object.
    All,
    /// Returns the section named by the `section` argument.
    Dynamic,
}

/// One row of the tool catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ToolKind,
}

impl ToolDescriptor {
    const fn section(name: &'static str, description: &'static str, key: &'static str) -> Self {
        ToolDescriptor {
            name,
            description,
            kind: ToolKind::Section(key),
        }
    }

    /// The JSON schema advertised for this tool's arguments.
    pub fn input_schema(&self) -> InputSchema {
        match self.kind {
            ToolKind::Dynamic => InputSchema::new([Argument::new(
                "section",
                "string",
                "The section name to retrieve (e.g., 'ABOUT', 'MISSION', 'TELOS')",
                true,
            )]),
            ToolKind::Section(_) | ToolKind::All => InputSchema::new(Vec::<Argument>::new()),
        }
    }
}

/// Every tool this server exposes, in listing order.
pub static CATALOG: [ToolDescriptor; 13] = [
    ToolDescriptor::section("get_about", "Get basic information about the person", "ABOUT"),
    ToolDescriptor::section("get_mission", "Get the person's mission statement", "MISSION"),
    ToolDescriptor::section(
        "get_telos",
        "Get the complete TELOS framework (Problems, Missions, Goals)",
        "TELOS",
    ),
    ToolDescriptor::section(
        "get_current_location",
        "Get the person's current location",
        "CURRENT_LOCATION",
    ),
    ToolDescriptor::section(
        "get_preferences",
        "Get work style, tools, and general preferences",
        "PREFERENCES",
    ),
    ToolDescriptor::section("get_favorite_books", "Get list of recommended books", "FAVORITE_BOOKS"),
    ToolDescriptor::section(
        "get_favorite_movies",
        "Get list of recommended movies",
        "FAVORITE_MOVIES",
    ),
    ToolDescriptor::section(
        "get_favorite_podcasts",
        "Get list of recommended podcasts",
        "FAVORITE_PODCASTS",
    ),
    ToolDescriptor::section(
        "get_daily_routine",
        "Get typical daily schedule and habits",
        "DAILY_ROUTINE",
    ),
    ToolDescriptor::section(
        "get_predictions",
        "Get future predictions with confidence levels",
        "PREDICTIONS",
    ),
    ToolDescriptor::section("get_projects", "Get list of active projects", "PROJECTS"),
    ToolDescriptor {
        name: "get_all",
        description: "Get all daemon data in one call",
        kind: ToolKind::All,
    },
    ToolDescriptor {
        name: "get_section",
        description: "Get any section by name dynamically",
        kind: ToolKind::Dynamic,
    },
];

/// Looks a tool up by its exact name.
pub fn find(name: &str) -> Option<&'static ToolDescriptor> {
    CATALOG.iter().find(|tool| tool.name == name)
}

/// The payload of a `tools/list` answer.
#[derive(Debug, serde::Serialize)]
pub struct ToolList {
    tools: Vec<ToolInfo>,
}

/// Builds the `tools/list` payload from [`CATALOG`].
pub fn list() -> ToolList {
    ToolList {
        tools: CATALOG.iter().map(ToolInfo::from_descriptor).collect(),
    }
}

/// Metadata about a tool, as advertised to clients.
#[derive(Debug, serde::Serialize)]
struct ToolInfo {
    name: &'static str,
    description: &'static str,
    #[serde(rename = "inputSchema")]
    input_schema: InputSchema,
}

impl ToolInfo {
    fn from_descriptor(tool: &ToolDescriptor) -> Self {
        ToolInfo {
            name: tool.name,
            description: tool.description,
            input_schema: tool.input_schema(),
        }
    }
}

/// Schema defining a tool's input parameters.
///
/// Always an `object` schema; `required` is present even when empty.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InputSchema {
    r#type: &'static str,
    properties: BTreeMap<&'static str, PropertySchema>,
    required: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
struct PropertySchema {
    r#type: &'static str,
    description: &'static str,
}

/// A single named parameter of a tool.
pub struct Argument {
    name: &'static str,
    r#type: &'static str,
    description: &'static str,
    required: bool,
}

impl Argument {
    pub const fn new(
        name: &'static str,
        r#type: &'static str,
        description: &'static str,
        required: bool,
    ) -> Self {
        Self {
            name,
            r#type,
            description,
            required,
        }
    }
}

impl InputSchema {
    /// Builds an object schema from argument specifications.
    pub fn new<A: IntoIterator<Item = Argument>>(arguments: A) -> Self {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();
        for argument in arguments {
            if argument.required {
                required.push(argument.name);
            }
            properties.insert(
                argument.name,
                PropertySchema {
                    r#type: argument.r#type,
                    description: argument.description,
                },
            );
        }
        InputSchema {
            r#type: "object",
            properties,
            required,
        }
    }
}

/// The result of a successful tool call: `{"content": [...]}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ToolCallResponse {
    pub(crate) content: Vec<ToolContent>,
}

impl ToolCallResponse {
    /// A response carrying a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        ToolCallResponse {
            content: vec![ToolContent::Text(text.into())],
        }
    }

    pub fn content(&self) -> &[ToolContent] {
        &self.content
    }
}

/// Content returned by a tool.
///
/// Serialized as `{"type": "text", "text": ...}`.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ToolContent {
    /// Text content
    Text(String),
}

impl ToolContent {
    /// Returns the content as a string slice if it's text content.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToolContent::Text(text) => Some(text),
        }
    }
}

impl Serialize for ToolContent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        match self {
            ToolContent::Text(text) => {
                let mut s = serializer.serialize_struct("ToolContent", 2)?;
                s.serialize_field("type", "text")?;
                s.serialize_field("text", text)?;
                s.end()
            }
        }
    }
}
