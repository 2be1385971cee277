//! Section grammar for the daemon document.
//!
//! The document is free text split into blocks by header lines of the form
//! `[SECTION_NAME]`. A header must occupy the whole line and consist only of
//! uppercase ASCII letters and underscores between the brackets. Everything up
//! to the next header belongs to that section.
//!
//! ```text
//! # preamble, ignored
//!
//! [ABOUT]
//! Builder, tinkerer.
//!
//! [TELOS]
//! - P1: ...
//! ```
//!
//! Parsing is total: any input yields a [`SectionMap`], possibly empty.
//!
//! # Examples
//!
//! ```
//! use daemon_mcp::sections;
//!
//! let map = sections::parse("intro\n[ABOUT]\n  hello  \n\n[MISSION]\nship it\n");
//! assert_eq!(map.get("ABOUT"), Some("hello"));
//! assert_eq!(map.get("MISSION"), Some("ship it"));
//! assert_eq!(map.keys().collect::<Vec<_>>(), ["ABOUT", "MISSION"]);
//! ```

use regex::Regex;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([A-Z_]+)\]$").expect("section header pattern is valid"));

/// Section bodies keyed by section name, in order of first appearance.
///
/// Inserting a key that is already present replaces its body but keeps its
/// original position, so a document that repeats a header resolves to the last
/// body while listing the key where it first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl SectionMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `body` under `key`, replacing any earlier body.
    pub fn insert(&mut self, key: String, body: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = body,
            None => self.entries.push((key, body)),
        }
    }

    /// The body stored under `key`, if the document has that section.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, body)| body.as_str())
    }

    /// The body under `key`, treating an empty body like a missing section.
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|body| !body.is_empty())
    }

    /// Section names in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits `document` into sections.
///
/// Lines are separated on `\n`. Each body is its lines joined back with `\n`
/// and trimmed at both ends. Lines before the first header are dropped.
pub fn parse(document: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current: Option<String> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in document.split('\n') {
        if let Some(captures) = HEADER.captures(line) {
            if let Some(name) = current.take() {
                sections.insert(name, lines.join("\n").trim().to_string());
            }
            current = Some(captures[1].to_string());
            lines.clear();
        } else if current.is_some() {
            lines.push(line);
        }
    }

    if let Some(name) = current {
        sections.insert(name, lines.join("\n").trim().to_string());
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_headerless_documents_yield_no_sections() {
        assert!(parse("").is_empty());
        assert!(parse("just some notes\nno headers here\n").is_empty());
    }

    #[test]
    fn preamble_is_discarded() {
        let map = parse("# DAEMON DATA FILE\n\n[ABOUT]\nTest about content.\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("ABOUT"), Some("Test about content."));
    }

    #[test]
    fn bodies_keep_inner_lines_and_are_trimmed() {
        let map = parse("[PREFERENCES]\n\n- Preference 1\n- Preference 2\n\n\n[NEXT]\n");
        assert_eq!(map.get("PREFERENCES"), Some("- Preference 1\n- Preference 2"));
        assert_eq!(map.get("NEXT"), Some(""));
    }

    #[test]
    fn header_must_be_whole_line_of_uppercase() {
        let map = parse("[ABOUT]\n [MISSION]\n[Mission]\n[MISSION] trailing\n[MISSION2]\n[]\n");
        assert_eq!(map.keys().collect::<Vec<_>>(), ["ABOUT"]);
        assert_eq!(
            map.get("ABOUT"),
            Some("[MISSION]\n[Mission]\n[MISSION] trailing\n[MISSION2]\n[]")
        );
    }

    #[test]
    fn underscores_are_allowed_in_names() {
        let map = parse("[CURRENT_LOCATION]\nEarth\n[_]\nodd\n");
        assert_eq!(map.get("CURRENT_LOCATION"), Some("Earth"));
        assert_eq!(map.get("_"), Some("odd"));
    }

    #[test]
    fn carriage_return_headers_do_not_match() {
        let map = parse("[ABOUT]\r\nwindows line\r\n");
        assert!(map.is_empty());
    }

    #[test]
    fn duplicate_headers_keep_first_position_and_last_body() {
        let map = parse("[A]\nfirst\n[B]\nb\n[A]\nsecond\n");
        assert_eq!(map.keys().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(map.get("A"), Some("second"));
    }

    #[test]
    fn empty_body_is_present_but_not_nonempty() {
        let map = parse("[EMPTY]\n   \n[FULL]\nx");
        assert_eq!(map.get("EMPTY"), Some(""));
        assert_eq!(map.get_nonempty("EMPTY"), None);
        assert_eq!(map.get_nonempty("FULL"), Some("x"));
    }

    #[test]
    fn parsing_is_deterministic() {
        let doc = "[ABOUT]\nx\n[TELOS]\ny\n[ABOUT]\nz\n";
        assert_eq!(parse(doc), parse(doc));
    }
}
