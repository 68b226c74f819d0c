use std::sync::OnceLock;

use regex::Regex;

/// Classification of a single line containing only local facts.
///
/// This is phase 1 of parsing: each line is classified independently, without
/// knowing whether the parser is currently inside a block. The session decides
/// which of these facts apply to its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClass<'a> {
    /// Line with surrounding whitespace and the line terminator removed.
    pub trimmed: &'a str,
    /// Blank, or starts with a comment prefix.
    pub is_skipped: bool,
    /// Block type if the line reads `<identifier> {`.
    pub open: Option<&'a str>,
    /// `(key, value)` if the line reads `<key>=<value>`. The value is taken
    /// from the untrimmed line so trailing whitespace survives.
    pub field: Option<(&'a str, &'a str)>,
    /// The line contains a closing brace.
    pub closes: bool,
}

/// Classifies individual lines of a status file.
#[derive(Debug, Clone)]
pub struct StatusLineClassifier {
    comment_prefixes: Vec<String>,
}

fn block_open_regex() -> &'static Regex {
    static BLOCK_OPEN: OnceLock<Regex> = OnceLock::new();
    BLOCK_OPEN.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*\{$").expect("Invalid block open regex")
    })
}

fn field_key_regex() -> &'static Regex {
    static FIELD_KEY: OnceLock<Regex> = OnceLock::new();
    FIELD_KEY.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid key regex"))
}

impl StatusLineClassifier {
    pub fn new(comment_prefixes: Vec<String>) -> Self {
        Self { comment_prefixes }
    }

    pub fn classify<'a>(&self, raw: &'a str) -> LineClass<'a> {
        let unterminated = raw.trim_end_matches(['\r', '\n']);
        let trimmed = unterminated.trim();

        let is_skipped = trimmed.is_empty()
            || self
                .comment_prefixes
                .iter()
                .any(|p| !p.is_empty() && trimmed.starts_with(p.as_str()));
        if is_skipped {
            return LineClass {
                trimmed,
                is_skipped,
                open: None,
                field: None,
                closes: false,
            };
        }

        let open = block_open_regex()
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());

        LineClass {
            trimmed,
            is_skipped,
            open,
            field: Self::field(unterminated),
            closes: trimmed.contains('}'),
        }
    }

    fn field(unterminated: &str) -> Option<(&str, &str)> {
        let (key, value) = unterminated.trim_start().split_once('=')?;
        field_key_regex().is_match(key).then_some((key, value))
    }
}

impl Default for StatusLineClassifier {
    fn default() -> Self {
        Self::new(vec!["#".to_string()])
    }
}
