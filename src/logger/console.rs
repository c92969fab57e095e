//! Line-oriented console sink for mirrored rows.

use std::io::Write;

/// Text sink receiving whole lines
pub trait ConsoleSink: Send {
    fn write_line(&mut self, line: &str);
}

/// Writes lines to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl ConsoleSink for StdoutConsole {
    fn write_line(&mut self, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not take the sample loop down
        let _ = writeln!(out, "{}", line);
    }
}
