pub mod classify;
pub mod session;

use std::io::{BufRead, Write};

use crate::diagnostics::DiagnosticsBus;
use crate::error::RenderError;
use crate::render::Renderer;

pub use classify::{LineClass, StatusLineClassifier};
pub use session::{ParseSummary, Session};

/// Tunables for the line grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Lines starting with any of these (after trimming) are ignored.
    pub comment_prefixes: Vec<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            comment_prefixes: vec!["#".to_string()],
        }
    }
}

impl ParserOptions {
    pub fn classifier(&self) -> StatusLineClassifier {
        StatusLineClassifier::new(self.comment_prefixes.clone())
    }
}

/// Runs the whole document lifecycle: `begin`, open the input, feed every
/// line, `end`.
///
/// `end` is called even when opening or reading the input fails, so the
/// renderer can close its envelope.
pub fn drive<R, F>(
    open: F,
    classifier: &StatusLineClassifier,
    renderer: &mut dyn Renderer,
    out: &mut dyn Write,
    bus: &mut DiagnosticsBus,
) -> Result<ParseSummary, RenderError>
where
    R: BufRead,
    F: FnOnce() -> Result<R, RenderError>,
{
    renderer.begin(out).map_err(RenderError::Write)?;

    let parsed =
        open().and_then(|mut reader| parse_lines(&mut reader, classifier, renderer, out, bus));

    let ended = renderer
        .end(out)
        .and_then(|()| out.flush())
        .map_err(RenderError::Write);

    let summary = parsed?;
    ended?;
    Ok(summary)
}

/// [`drive`] over an already open reader.
pub fn parse_stream<R: BufRead>(
    reader: R,
    classifier: &StatusLineClassifier,
    renderer: &mut dyn Renderer,
    out: &mut dyn Write,
    bus: &mut DiagnosticsBus,
) -> Result<ParseSummary, RenderError> {
    drive(|| Ok(reader), classifier, renderer, out, bus)
}

/// Feeds every line of `reader` through a fresh [`Session`].
///
/// Lines are read whole regardless of length; invalid UTF-8 is replaced
/// rather than rejected.
pub fn parse_lines<R: BufRead + ?Sized>(
    reader: &mut R,
    classifier: &StatusLineClassifier,
    renderer: &mut dyn Renderer,
    out: &mut dyn Write,
    bus: &mut DiagnosticsBus,
) -> Result<ParseSummary, RenderError> {
    let mut session = Session::new(classifier);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| RenderError::Read {
                line: session.line_number() + 1,
                source,
            })?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        session
            .push(&line, renderer, out, bus)
            .map_err(RenderError::Write)?;
    }

    Ok(session.finish(bus))
}
