use std::io::{self, Write};

use crate::block::Block;
use crate::diagnostics::DiagnosticsBus;
use crate::message::{Message, Severity};
use crate::render::Renderer;

use super::classify::{LineClass, StatusLineClassifier};

#[derive(Debug)]
enum State {
    OutsideBlock,
    InsideBlock(Block),
}

/// Counters describing one completed pass over the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Lines read, including blank and comment lines.
    pub lines: usize,
    /// Blocks handed to the renderer.
    pub blocks: usize,
    /// Malformed lines reported on the bus.
    pub malformed: usize,
    /// The input ended while a block was still open.
    pub unterminated: bool,
}

/// Phase 2 of parsing: the block state machine.
///
/// Completed blocks are handed to the renderer as soon as their closing line
/// is seen and are not kept afterwards.
pub struct Session<'c> {
    classifier: &'c StatusLineClassifier,
    state: State,
    summary: ParseSummary,
}

impl<'c> Session<'c> {
    pub fn new(classifier: &'c StatusLineClassifier) -> Self {
        Self {
            classifier,
            state: State::OutsideBlock,
            summary: ParseSummary::default(),
        }
    }

    pub fn line_number(&self) -> usize {
        self.summary.lines
    }

    pub fn is_inside_block(&self) -> bool {
        matches!(self.state, State::InsideBlock(_))
    }

    /// Feeds one raw line. Only a failure to write rendered output is an error.
    pub fn push(
        &mut self,
        raw: &str,
        renderer: &mut dyn Renderer,
        out: &mut dyn Write,
        bus: &mut DiagnosticsBus,
    ) -> io::Result<()> {
        self.summary.lines += 1;
        let class = self.classifier.classify(raw);
        if class.is_skipped {
            return Ok(());
        }

        match std::mem::replace(&mut self.state, State::OutsideBlock) {
            State::OutsideBlock => {
                if let Some(block_type) = class.open {
                    self.state = State::InsideBlock(Block::new(block_type));
                } else {
                    self.summary.malformed += 1;
                    bus.emit(self.malformed(&class, "Malformed line outside of a block"));
                }
            }
            // `=` is tested before `}` so a value may contain a closing brace.
            State::InsideBlock(mut block) => {
                if let Some((key, value)) = class.field {
                    block.set(key, value);
                    self.state = State::InsideBlock(block);
                } else if class.closes {
                    log::debug!(
                        "Rendering {} block ending on line {}",
                        block.block_type(),
                        self.summary.lines
                    );
                    renderer.emit(&block, out)?;
                    self.summary.blocks += 1;
                } else {
                    self.summary.malformed += 1;
                    let message = self
                        .malformed(&class, "Malformed entry inside a block")
                        .with("block_type", block.block_type())
                        .with("block", block.to_dump());
                    bus.emit(message);
                    self.state = State::InsideBlock(block);
                }
            }
        }
        Ok(())
    }

    /// Ends the pass. A block still open at this point is dropped unrendered.
    pub fn finish(mut self, bus: &mut DiagnosticsBus) -> ParseSummary {
        if let State::InsideBlock(block) = std::mem::replace(&mut self.state, State::OutsideBlock)
        {
            self.summary.unterminated = true;
            bus.emit(
                Message::new("Unexpected end of input inside a block", Severity::Warn)
                    .with("line_number", self.summary.lines.to_string())
                    .with("block_type", block.block_type())
                    .with("block", block.to_dump()),
            );
        }
        self.summary
    }

    fn malformed(&self, class: &LineClass<'_>, text: &str) -> Message {
        Message::new(text, Severity::Err)
            .with("line", class.trimmed)
            .with("line_number", self.summary.lines.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recording {
        emitted: Vec<Block>,
    }

    impl Renderer for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn emit(&mut self, block: &Block, _out: &mut dyn Write) -> io::Result<()> {
            self.emitted.push(block.clone());
            Ok(())
        }
    }

    fn feed(lines: &[&str]) -> (Recording, DiagnosticsBus, ParseSummary) {
        let classifier = StatusLineClassifier::default();
        let mut session = Session::new(&classifier);
        let mut renderer = Recording::default();
        let mut bus = DiagnosticsBus::new();
        let mut out = Vec::new();
        for line in lines {
            session.push(line, &mut renderer, &mut out, &mut bus).unwrap();
        }
        let summary = session.finish(&mut bus);
        (renderer, bus, summary)
    }

    #[test]
    fn test_single_block() {
        let (renderer, bus, summary) = feed(&[
            "hoststatus {\n",
            "\thost_name=server1\n",
            "\tcurrent_state=0\n",
            "\t}\n",
        ]);

        assert_eq!(renderer.emitted.len(), 1);
        let block = &renderer.emitted[0];
        assert_eq!(block.block_type(), "hoststatus");
        assert_eq!(
            block.fields().collect::<Vec<_>>(),
            vec![("host_name", "server1"), ("current_state", "0")]
        );
        assert!(bus.history().is_empty());
        assert_eq!(
            summary,
            ParseSummary {
                lines: 4,
                blocks: 1,
                malformed: 0,
                unterminated: false
            }
        );
    }

    #[test]
    fn test_garbage_outside_block_is_reported_and_skipped() {
        let (renderer, bus, summary) = feed(&["garbage\n", "info {\n", "version=4.4.6\n", "}\n"]);

        assert_eq!(renderer.emitted.len(), 1);
        assert_eq!(summary.malformed, 1);
        let msg = bus.last().unwrap();
        assert_eq!(msg.severity(), Severity::Err);
        assert_eq!(msg.get("line"), Some("garbage"));
        assert_eq!(msg.get("line_number"), Some("1"));
    }

    #[test]
    fn test_malformed_entry_keeps_partial_block() {
        let (renderer, bus, _) = feed(&[
            "servicestatus {\n",
            "host_name=web\n",
            "not a field\n",
            "service_description=HTTP\n",
            "}\n",
        ]);

        let msg = bus.last().unwrap();
        assert_eq!(msg.text(), "Malformed entry inside a block");
        assert_eq!(msg.get("block_type"), Some("servicestatus"));
        assert_eq!(msg.get("block"), Some("host_name=web"));
        assert_eq!(msg.get("line"), Some("not a field"));

        assert_eq!(renderer.emitted.len(), 1);
        assert_eq!(renderer.emitted[0].len(), 2);
    }

    #[test]
    fn test_equals_wins_over_closing_brace() {
        let (renderer, _, summary) = feed(&["contactstatus {\n", "x=}\n", "}\n"]);

        assert_eq!(summary.blocks, 1);
        assert_eq!(renderer.emitted[0].get("x"), Some("}"));
    }

    #[test]
    fn test_brace_in_invalid_key_closes_block() {
        let (renderer, bus, summary) = feed(&["h {\n", "a}=b\n", "c=d\n", "}\n"]);

        assert_eq!(summary.blocks, 1);
        assert!(renderer.emitted[0].is_empty());
        let errors: Vec<_> = bus
            .history()
            .iter()
            .filter(|m| m.severity() == Severity::Err)
            .map(|m| m.get("line_number"))
            .collect();
        assert_eq!(errors, vec![Some("3"), Some("4")]);
    }

    #[test]
    fn test_unterminated_block_is_dropped_with_warning() {
        let (renderer, bus, summary) = feed(&["programstatus {\n", "pid=42\n"]);

        assert!(renderer.emitted.is_empty());
        assert!(summary.unterminated);
        let msg = bus.last().unwrap();
        assert_eq!(msg.severity(), Severity::Warn);
        assert_eq!(msg.get("block_type"), Some("programstatus"));
    }

    #[test]
    fn test_comments_and_blank_lines_do_not_change_state() {
        let (renderer, bus, summary) = feed(&[
            "########################################\n",
            "\n",
            "info {\n",
            "# inside comment\n",
            "   \n",
            "created=1\n",
            "}\n",
        ]);

        assert_eq!(renderer.emitted.len(), 1);
        assert_eq!(renderer.emitted[0].len(), 1);
        assert!(bus.history().is_empty());
        assert_eq!(summary.lines, 7);
    }

    #[test]
    fn test_stray_closing_brace_outside_block() {
        let (renderer, bus, _) = feed(&["}\n"]);
        assert!(renderer.emitted.is_empty());
        assert_eq!(bus.history().len(), 1);
        assert_eq!(bus.history()[0].get("line"), Some("}"));
    }

    #[test]
    fn test_nested_open_inside_block_is_malformed() {
        let (renderer, bus, _) = feed(&["hoststatus {\n", "servicestatus {\n", "}\n"]);
        assert_eq!(renderer.emitted.len(), 1);
        assert_eq!(renderer.emitted[0].block_type(), "hoststatus");
        assert_eq!(bus.history()[0].text(), "Malformed entry inside a block");
    }

    #[test]
    fn test_session_tracks_state() {
        let classifier = StatusLineClassifier::default();
        let mut session = Session::new(&classifier);
        let mut renderer = Recording::default();
        let mut bus = DiagnosticsBus::new();
        let mut out = Vec::new();

        assert!(!session.is_inside_block());
        session
            .push("info {\n", &mut renderer, &mut out, &mut bus)
            .unwrap();
        assert!(session.is_inside_block());
        assert_eq!(session.line_number(), 1);
        session.push("}\n", &mut renderer, &mut out, &mut bus).unwrap();
        assert!(!session.is_inside_block());
    }
}
