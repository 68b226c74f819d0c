//! # Renderers
//!
//! A renderer turns the stream of completed blocks into one output format.
//! The parser drives it through a fixed document lifecycle:
//!
//! ```text
//! begin()          ← envelope opening, e.g. an XML prologue
//!   emit(block)    ← once per closed block, in the order blocks close
//!   emit(block)
//! end()            ← envelope closing, also called after I/O failures
//! ```
//!
//! Renderers write straight to the sink they are given, so nothing but the
//! block being emitted is held in memory. Formats are looked up by name in a
//! [`RendererRegistry`].

pub mod collect;
pub mod json;
pub mod registry;
pub mod xml;

use std::borrow::Cow;
use std::io::{self, Write};

use crate::block::Block;

pub use collect::BlockCollector;
pub use json::JsonRenderer;
pub use registry::{RendererFactory, RendererRegistry};
pub use xml::XmlRenderer;

pub trait Renderer {
    /// Format name, as registered.
    fn name(&self) -> &str;

    fn begin(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    fn emit(&mut self, block: &Block, out: &mut dyn Write) -> io::Result<()>;

    fn end(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    /// Makes a field value safe to place in this format's output.
    fn escape<'a>(&self, value: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(value)
    }
}
