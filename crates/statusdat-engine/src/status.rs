use std::io::{self, BufWriter, Write};
use std::rc::Rc;

use crate::block::Block;
use crate::diagnostics::{DiagnosticsBus, Listener};
use crate::error::RenderError;
use crate::message::{Message, Severity};
use crate::parsing::{self, ParseSummary, ParserOptions};
use crate::render::collect::group_by_type;
use crate::render::{BlockCollector, Renderer, RendererRegistry};
use crate::source::InputSource;

/// Entry point: renders one status file through a named format.
///
/// Every call to a `render*`/`collect*` method is an independent pass over the
/// input. Problems found along the way go to the diagnostics bus; only an
/// unknown format or an I/O failure makes the call return `Err`, and those are
/// published on the bus as well.
#[derive(Debug)]
pub struct StatusParser {
    source: InputSource,
    options: ParserOptions,
    registry: RendererRegistry,
    bus: DiagnosticsBus,
}

impl StatusParser {
    pub fn new(source: impl Into<InputSource>) -> Self {
        Self {
            source: source.into(),
            options: ParserOptions::default(),
            registry: RendererRegistry::with_builtins(),
            bus: DiagnosticsBus::new(),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    pub fn bus(&self) -> &DiagnosticsBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut DiagnosticsBus {
        &mut self.bus
    }

    /// Shorthand for `bus_mut().register(..)`.
    pub fn subscribe(&mut self, listener: Rc<dyn Listener>) -> bool {
        self.bus.register(listener)
    }

    pub fn history(&self) -> &[Message] {
        self.bus.history()
    }

    /// Renders straight to standard output.
    pub fn render(&mut self, format: Option<&str>) -> Result<ParseSummary, RenderError> {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        self.render_to(format, &mut out)
    }

    /// Renders into a string. Nothing is returned on failure.
    pub fn render_to_string(&mut self, format: Option<&str>) -> Result<String, RenderError> {
        let mut buf = Vec::new();
        self.render_to(format, &mut buf)?;
        String::from_utf8(buf).map_err(|e| {
            self.fail(RenderError::Write(io::Error::new(
                io::ErrorKind::InvalidData,
                e,
            )))
        })
    }

    pub fn render_to(
        &mut self,
        format: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<ParseSummary, RenderError> {
        let mut renderer = match self.registry.resolve(format) {
            Ok(renderer) => renderer,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.run(renderer.as_mut(), out)
    }

    /// All blocks in source order.
    pub fn collect(&mut self) -> Result<Vec<Block>, RenderError> {
        let mut collector = BlockCollector::new();
        self.run(&mut collector, &mut io::sink())?;
        Ok(collector.into_blocks())
    }

    /// Blocks grouped by type, types in order of first appearance.
    pub fn collect_grouped(&mut self) -> Result<Vec<(String, Vec<Block>)>, RenderError> {
        Ok(group_by_type(self.collect()?))
    }

    fn run(
        &mut self,
        renderer: &mut dyn Renderer,
        out: &mut dyn Write,
    ) -> Result<ParseSummary, RenderError> {
        self.bus.emit(
            Message::new("Parsing started", Severity::Info)
                .with("source", self.source.to_string())
                .with("format", renderer.name()),
        );

        let classifier = self.options.classifier();
        let input = &self.source;
        let result = parsing::drive(
            || {
                input.open().map_err(|source| RenderError::Open {
                    input: input.to_string(),
                    source,
                })
            },
            &classifier,
            renderer,
            out,
            &mut self.bus,
        );

        match result {
            Ok(summary) => {
                self.bus.emit(
                    Message::new("Parsing finished", Severity::Info)
                        .with("blocks", summary.blocks.to_string())
                        .with("lines", summary.lines.to_string()),
                );
                Ok(summary)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, err: RenderError) -> RenderError {
        self.bus.emit(err.to_message());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{SAMPLE_STATUS, create_status_file, create_test_dir};
    use std::cell::RefCell;
    use std::io::{BufReader, Cursor, Read};

    /// Yields its data, then fails.
    struct BrokenPipe {
        data: Cursor<Vec<u8>>,
    }

    impl Read for BrokenPipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::from(io::ErrorKind::BrokenPipe)),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_render_to_string_from_file() {
        let dir = create_test_dir();
        let path = create_status_file(&dir, "status.dat", SAMPLE_STATUS);

        let mut parser = StatusParser::new(path);
        let xml = parser.render_to_string(None).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" ?><statusDat>"#));
        assert_eq!(xml.matches("<status ").count(), 3);
        assert!(xml.ends_with("</statusDat>"));
    }

    #[test]
    fn test_unknown_format_emits_single_error() {
        let mut parser = StatusParser::new(InputSource::text(SAMPLE_STATUS));
        let result = parser.render_to_string(Some("nonexistent"));

        assert!(matches!(result, Err(RenderError::Registry(_))));
        assert_eq!(parser.history().len(), 1);
        let msg = &parser.history()[0];
        assert_eq!(msg.severity(), Severity::Err);
        assert_eq!(msg.get("format"), Some("nonexistent"));
    }

    #[test]
    fn test_unknown_format_writes_nothing() {
        let mut parser = StatusParser::new(InputSource::text(SAMPLE_STATUS));
        let mut out = Vec::new();
        assert!(parser.render_to(Some("yaml"), &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_file_is_critical() {
        let dir = create_test_dir();
        let mut parser = StatusParser::new(dir.path().join("missing.dat"));
        let mut out = Vec::new();

        let result = parser.render_to(Some("json"), &mut out);

        assert!(matches!(result, Err(RenderError::Open { .. })));
        assert_eq!(String::from_utf8(out).unwrap(), "[]");
        let last = parser.bus().last().unwrap();
        assert_eq!(last.severity(), Severity::Crit);
        assert_eq!(last.text(), "Unable to open input");
    }

    #[test]
    fn test_render_from_reader() {
        let mut parser = StatusParser::new(InputSource::reader(Cursor::new(
            SAMPLE_STATUS.as_bytes().to_vec(),
        )));

        let json = parser.render_to_string(Some("json")).unwrap();

        assert!(json.contains(r#""host_name":"server1""#));
        assert_eq!(parser.history()[0].get("source"), Some("<stream>"));
    }

    #[test]
    fn test_reader_is_gone_after_first_render() {
        let source = InputSource::reader(Cursor::new(b"info {\n}\n".to_vec()));
        let mut parser = StatusParser::new(source);
        assert_eq!(parser.collect().unwrap().len(), 1);

        let result = parser.render_to_string(Some("json"));

        assert!(matches!(result, Err(RenderError::Open { .. })));
        assert_eq!(parser.bus().last().unwrap().severity(), Severity::Crit);
    }

    #[test]
    fn test_read_failure_mid_stream_is_critical() {
        let reader = BufReader::new(BrokenPipe {
            data: Cursor::new(b"info {\nversion=1\n}\n".to_vec()),
        });
        let mut parser = StatusParser::new(InputSource::reader(reader));
        let mut out = Vec::new();

        let result = parser.render_to(Some("xml"), &mut out);

        assert!(matches!(result, Err(RenderError::Read { line: 4, .. })));
        let last = parser.bus().last().unwrap();
        assert_eq!(last.severity(), Severity::Crit);
        assert_eq!(last.text(), "Failed to read input");
        assert_eq!(last.get("line_number"), Some("4"));
        assert!(
            parser
                .history()
                .iter()
                .all(|m| m.text() != "Parsing finished")
        );

        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("<version>1</version>"));
        assert!(xml.ends_with("</statusDat>"));
    }

    #[test]
    fn test_phase_messages_bracket_the_parse() {
        let mut parser = StatusParser::new(InputSource::text(""));
        parser.render_to_string(Some("json")).unwrap();

        let texts: Vec<_> = parser.history().iter().map(Message::text).collect();
        assert_eq!(texts, vec!["Parsing started", "Parsing finished"]);
        assert_eq!(parser.history()[0].get("format"), Some("json"));
        assert_eq!(parser.history()[1].get("blocks"), Some("0"));
    }

    #[test]
    fn test_subscribed_listener_sees_errors() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut parser = StatusParser::new(InputSource::text("garbage\n"));
        parser.subscribe(Rc::new(move |m: &Message| -> anyhow::Result<()> {
            sink.borrow_mut().push((m.severity(), m.text().to_string()));
            Ok(())
        }));

        parser.render_to_string(None).unwrap();

        assert!(
            seen.borrow()
                .contains(&(Severity::Err, "Malformed line outside of a block".to_string()))
        );
    }

    #[test]
    fn test_collect_grouped() {
        let mut parser = StatusParser::new(InputSource::text(SAMPLE_STATUS));
        let groups = parser.collect_grouped().unwrap();

        let types: Vec<_> = groups.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(types, vec!["info", "hoststatus", "servicestatus"]);
        assert_eq!(groups[1].1[0].get("host_name"), Some("server1"));
    }

    #[test]
    fn test_custom_comment_prefix() {
        let options = ParserOptions {
            comment_prefixes: vec![";".to_string()],
        };
        let mut parser =
            StatusParser::new(InputSource::text("; header\ninfo {\n}\n")).with_options(options);

        let blocks = parser.collect().unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(
            parser
                .history()
                .iter()
                .all(|m| m.severity() == Severity::Info)
        );
    }
}
