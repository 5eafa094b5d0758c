//! Human-readable narration of a replication.

use std::fmt;
use std::io;

/// Receives a sentence for each transition of the clinic.
///
/// A sink is a pure observer: nothing it does can feed back into the simulation. Messages arrive as
/// [`fmt::Arguments`] so that a sink which is switched off never pays for formatting. `()` is a sink that drops
/// everything.
pub trait TraceSink {
    fn message(&mut self, time: f64, message: fmt::Arguments<'_>);
}

impl TraceSink for () {
    fn message(&mut self, _: f64, _: fmt::Arguments<'_>) {}
}

/// Collects trace lines in memory, prefixed with the clock rounded to a fixed number of decimals.
///
/// Every kept line is also emitted as a `tracing` event at TRACE level.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    enabled: bool,
    decimals: usize,
    lines: Vec<String>,
}

impl TraceLog {
    /// A log that keeps lines only when `enabled`, printing the clock with `decimals` decimals.
    pub fn new(enabled: bool, decimals: usize) -> Self {
        Self {
            enabled,
            decimals,
            lines: Vec::new(),
        }
    }

    /// A log that records nothing.
    pub fn disabled() -> Self {
        Self::new(false, 0)
    }

    /// Whether lines are being kept.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The kept lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Write every line, each followed by a newline.
    ///
    /// # Errors
    ///
    /// Fails if the underlying writer does.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        for line in &self.lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()
    }
}

impl TraceSink for TraceLog {
    fn message(&mut self, time: f64, message: fmt::Arguments<'_>) {
        if !self.enabled {
            return;
        }
        let line = format!("At t = {time:.prec$}: {message}", prec = self.decimals);
        tracing::trace!(target: "clinic_des::trace", "{line}");
        self.lines.push(line);
    }
}
