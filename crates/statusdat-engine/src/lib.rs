pub mod block;
pub mod diagnostics;
pub mod error;
pub mod message;
pub mod parsing;
pub mod render;
pub mod source;
pub mod status;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use block::Block;
pub use diagnostics::{DiagnosticsBus, Listener, LogListener};
pub use error::{RegistryError, RenderError};
pub use message::{Message, Severity};
pub use parsing::{ParseSummary, ParserOptions};
pub use render::{JsonRenderer, Renderer, RendererFactory, RendererRegistry, XmlRenderer};
pub use source::InputSource;
pub use status::StatusParser;
