use std::borrow::Cow;
use std::io::{self, Write};

use crate::block::Block;

use super::Renderer;

pub const XML_PROLOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>"#;

/// Renders blocks as a `<statusDat>` document with one `<status>` element per
/// block.
#[derive(Debug, Default)]
pub struct XmlRenderer;

impl XmlRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Replaces every character XML 1.0 cannot carry with a space.
pub fn scrub(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_xml_char) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .chars()
            .map(|c| if is_xml_char(c) { c } else { ' ' })
            .collect(),
    )
}

impl Renderer for XmlRenderer {
    fn name(&self) -> &str {
        "xml"
    }

    fn begin(&mut self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{XML_PROLOGUE}<statusDat>")
    }

    fn emit(&mut self, block: &Block, out: &mut dyn Write) -> io::Result<()> {
        let block_type = self.escape(block.block_type());
        write!(out, r#"<status type="{block_type}"><type>{block_type}</type><report>"#)?;
        for (key, value) in block.fields() {
            write!(out, "<{key}>{}</{key}>", self.escape(value))?;
        }
        out.write_all(b"</report></status>")
    }

    fn end(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(b"</statusDat>")
    }

    /// Scrubs illegal characters, then escapes `&`, `<`, `>` and `"`.
    /// Apostrophes are left alone; many older consumers choke on `&#039;`.
    fn escape<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match scrub(value) {
            Cow::Borrowed(s) => html_escape::encode_double_quoted_attribute(s),
            Cow::Owned(s) => {
                Cow::Owned(html_escape::encode_double_quoted_attribute(&s).into_owned())
            }
        }
    }
}
