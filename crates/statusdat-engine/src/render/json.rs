use std::borrow::Cow;
use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, Serializer};

use crate::block::Block;

use super::Renderer;

/// Renders blocks as a JSON array of flat objects, each carrying its block
/// type under `_type`.
///
/// Output is safe to embed in HTML: `<`, `>`, `&`, `'`, `/`, quotes,
/// backslashes and control characters only ever appear as `\uXXXX` escapes.
#[derive(Debug, Default)]
pub struct JsonRenderer {
    emitted: usize,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn needs_escape(c: char) -> bool {
    c < ' '
        || matches!(
            c,
            '"' | '\\' | '<' | '>' | '&' | '\'' | '/' | '\u{2028}' | '\u{2029}'
        )
}

/// Escapes a string for the inside of a JSON string literal.
pub fn escape_json(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_escape) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        if needs_escape(c) {
            escaped.push_str(&format!("\\u{:04X}", c as u32));
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}

/// Compact JSON formatter using [`escape_json`] for all string content.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        writer.write_all(escape_json(fragment).as_bytes())
    }

    fn write_char_escape<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        let code = match char_escape {
            CharEscape::Quote => b'"',
            CharEscape::ReverseSolidus => b'\\',
            CharEscape::Solidus => b'/',
            CharEscape::Backspace => 0x08,
            CharEscape::FormFeed => 0x0C,
            CharEscape::LineFeed => b'\n',
            CharEscape::CarriageReturn => b'\r',
            CharEscape::Tab => b'\t',
            CharEscape::AsciiControl(byte) => byte,
        };
        write!(writer, "\\u{code:04X}")
    }
}

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn begin(&mut self, out: &mut dyn Write) -> io::Result<()> {
        self.emitted = 0;
        out.write_all(b"[")
    }

    fn emit(&mut self, block: &Block, out: &mut dyn Write) -> io::Result<()> {
        if self.emitted > 0 {
            out.write_all(b",")?;
        }
        let mut serializer = Serializer::with_formatter(&mut *out, HtmlSafeFormatter);
        block.serialize(&mut serializer).map_err(io::Error::other)?;
        self.emitted += 1;
        Ok(())
    }

    fn end(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(b"]")
    }

    fn escape<'a>(&self, value: &'a str) -> Cow<'a, str> {
        escape_json(value)
    }
}
