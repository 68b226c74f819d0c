use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Severity levels, ordered from most to least severe.
///
/// The numeric values follow the syslog convention (`EMERG = 0` .. `DEBUG = 7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// System is unusable
    Emerg = 0,
    /// Action must be taken immediately
    Alert = 1,
    /// Critical conditions, e.g. the input could not be opened
    Crit = 2,
    /// Error conditions, e.g. a malformed line
    Err = 3,
    /// Warning conditions, e.g. input ended inside a block
    Warn = 4,
    /// Normal but significant condition
    Notice = 5,
    /// Informational, e.g. parsing started or finished
    Info = 6,
    /// Debug-level detail
    Debug = 7,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Emerg => "EMERG",
            Severity::Alert => "ALERT",
            Severity::Crit => "CRIT",
            Severity::Err => "ERR",
            Severity::Warn => "WARN",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// The `log` level a message of this severity is forwarded at.
    pub fn log_level(&self) -> log::Level {
        match self {
            Severity::Emerg | Severity::Alert | Severity::Crit | Severity::Err => log::Level::Error,
            Severity::Warn => log::Level::Warn,
            Severity::Notice | Severity::Info => log::Level::Info,
            Severity::Debug => log::Level::Debug,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable diagnostic record emitted while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    text: String,
    severity: Severity,
    data: BTreeMap<String, String>,
}

impl Message {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
            data: BTreeMap::new(),
        }
    }

    /// Attaches a piece of context. Only used while building the message.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.text)?;
        if let Some(line) = self.data.get("line_number") {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_follows_syslog_numbers() {
        assert!(Severity::Emerg < Severity::Crit);
        assert!(Severity::Err < Severity::Warn);
        assert_eq!(Severity::Debug as u8, 7);
    }

    #[test]
    fn severity_maps_to_log_level() {
        assert_eq!(Severity::Crit.log_level(), log::Level::Error);
        assert_eq!(Severity::Warn.log_level(), log::Level::Warn);
        assert_eq!(Severity::Notice.log_level(), log::Level::Info);
        assert_eq!(Severity::Debug.log_level(), log::Level::Debug);
    }

    #[test]
    fn message_carries_context() {
        let msg = Message::new("Malformed line", Severity::Err)
            .with("line", "garbage")
            .with("line_number", "3");

        assert_eq!(msg.text(), "Malformed line");
        assert_eq!(msg.severity(), Severity::Err);
        assert_eq!(msg.get("line"), Some("garbage"));
        assert_eq!(msg.get("missing"), None);
        assert_eq!(msg.to_string(), "[ERR] Malformed line (line 3)");
    }

    #[test]
    fn message_serializes_severity_name() {
        let msg = Message::new("Parsing started", Severity::Info).with("format", "xml");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"text":"Parsing started","severity":"INFO","data":{"format":"xml"}}"#
        );
    }
}
