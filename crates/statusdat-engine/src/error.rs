use std::io;

use crate::message::{Message, Severity};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Renderer not found: {0}")]
    NotFound(String),
    #[error("Cannot make unregistered renderer the default: {0}")]
    UnknownDefault(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Failed to open {input}: {source}")]
    Open { input: String, source: io::Error },
    #[error("Failed to read line {line}: {source}")]
    Read { line: usize, source: io::Error },
    #[error("Failed to write output: {0}")]
    Write(#[source] io::Error),
}

impl RenderError {
    /// The diagnostic published on the bus when a render fails with this error.
    pub fn to_message(&self) -> Message {
        match self {
            RenderError::Registry(RegistryError::NotFound(name)) => {
                Message::new("Renderer not found", Severity::Err).with("format", name.as_str())
            }
            RenderError::Registry(RegistryError::UnknownDefault(name)) => {
                Message::new("Unknown default renderer", Severity::Err)
                    .with("format", name.as_str())
            }
            RenderError::Open { input, source } => {
                Message::new("Unable to open input", Severity::Crit)
                    .with("source", input.as_str())
                    .with("error", source.to_string())
            }
            RenderError::Read { line, source } => {
                Message::new("Failed to read input", Severity::Crit)
                    .with("line_number", line.to_string())
                    .with("error", source.to_string())
            }
            RenderError::Write(source) => Message::new("Failed to write output", Severity::Crit)
                .with("error", source.to_string()),
        }
    }
}
