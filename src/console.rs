//! Console transcript shared by scope bodies and their managers
//!
//! Everything a scenario prints goes through a [`Transcript`]. The handle is
//! cheap to clone and every clone appends to the same line buffer, so a
//! handler object, a procedure and the scope body can all print in the order
//! they run.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use tracing::{trace, warn};

const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Default)]
struct Buffer {
    lines: Vec<String>,
    echo: bool,
}

/// Shared, single-threaded console capture
#[derive(Clone, Default)]
pub struct Transcript {
    inner: Rc<RefCell<Buffer>>,
}

impl Transcript {
    /// Create an empty transcript that only records
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transcript that also writes each line to stdout
    #[must_use]
    pub fn echoing() -> Self {
        let transcript = Self::new();
        transcript.set_echo(true);
        transcript
    }

    /// Enable or disable writing to stdout
    pub fn set_echo(&self, echo: bool) {
        self.inner.borrow_mut().echo = echo;
    }

    /// Print one line
    pub fn print(&self, line: impl fmt::Display) {
        let line = line.to_string();
        let mut buffer = self.inner.borrow_mut();
        if buffer.echo {
            write_stdout(&line);
        }
        buffer.lines.push(line);
    }

    /// Snapshot of the recorded lines
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.inner.borrow().lines.clone()
    }

    /// Recorded lines joined with newlines, as printed
    #[must_use]
    pub fn text(&self) -> String {
        let buffer = self.inner.borrow();
        let mut out = String::new();
        for line in &buffer.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Number of recorded lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().lines.len()
    }

    /// Whether nothing has been printed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().lines.is_empty()
    }

    /// Drop all recorded lines
    pub fn clear(&self) {
        self.inner.borrow_mut().lines.clear();
    }
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffer = self.inner.borrow();
        f.debug_struct("Transcript")
            .field("lines", &buffer.lines.len())
            .field("echo", &buffer.echo)
            .finish()
    }
}

/// Write one line to stdout
///
/// A closed stdout (`scopekit run | head -1`) is not an error.
pub fn write_stdout(line: &str) {
    write_line(&mut io::stdout().lock(), line);
}

fn write_line(out: &mut impl Write, line: &str) {
    match writeln!(out, "{line}") {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => trace!("stdout closed"),
        Err(e) => warn!(error = %e, "cannot write to stdout"),
    }
}

/// Banner printed before a scenario's output
///
/// Two blank lines, then `#### <name>() stdout`, yellow when `color` is set.
#[must_use]
pub fn stdout_header(name: &str, color: bool) -> String {
    if color {
        format!("\n\n{YELLOW}#### {name}() stdout{RESET}")
    } else {
        format!("\n\n#### {name}() stdout")
    }
}
