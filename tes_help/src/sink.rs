use std::io::{self, Write};

use log::warn;

/// Destination for query output, one line per call.
pub trait ResultSink {
    fn emit(&mut self, line: &str);
}

/// Writes lines to a stream, stdout by default.
///
/// Write failures are logged and dropped; a query never fails on output.
#[derive(Debug)]
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for ConsoleSink<W> {
    fn emit(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}") {
            warn!("dropping console output: {err}");
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl ResultSink for MemorySink {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
