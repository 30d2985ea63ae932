//! Output helpers for CLI commands

use std::io::{self, Write};
use std::path::Path;

/// Writer duplicating every byte to two sinks, typically stdout and a log file.
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    /// Duplicate writes to `first` and `second`.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Give back both sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

/// Format error message for display
pub fn format_error(operation: &str, details: impl std::fmt::Display) -> String {
    format!("{}: {}", operation, details)
}

/// Write `content` to `path`, replacing any existing file.
pub fn write_file(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content)
        .map_err(|e| format!("Failed to write to {}: {}", path.display(), e))
}

/// Print to stdout and flush.
pub fn print_flush(content: &str) -> Result<(), String> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| format!("Failed to write to stdout: {}", e))
}

/// Threshold as a float literal: `0.75`, `1.0`.
pub fn format_threshold(t: f64) -> String {
    if t.fract() == 0.0 {
        format!("{:.1}", t)
    } else {
        format!("{}", t)
    }
}
