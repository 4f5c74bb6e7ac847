//! Response-assembly policy for the text dialects
//!
//! Serial instruments send no explicit end-of-message marker, so the only
//! way to decide that a reply is complete is the line classification here
//! plus an idle-timeout policy applied by the link while draining. The
//! policy makes both knobs explicit: how many consecutive empty reads
//! terminate the drain, and an optional command echo to await before any
//! line is trusted as part of the answer.

use std::fmt;

/// Classification of one line read from the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Part of the answer to the command just issued
    Answer,

    /// An asynchronous sentence the instrument emitted on its own schedule
    Unsolicited,

    /// Prompt or banner text to be discarded
    Prompt,
}

/// Classify a single received line
///
/// Lines starting with `$` are unsolicited sentences regardless of which
/// command is in flight; blank lines and the `scpi>` prompt are noise.
pub fn classify(line: &str) -> LineClass {
    let trimmed = line.trim();
    if trimmed.starts_with('$') {
        LineClass::Unsolicited
    } else if trimmed.is_empty() || trimmed == crate::constants::SCPI_PROMPT {
        LineClass::Prompt
    } else {
        LineClass::Answer
    }
}

/// Termination and filtering policy for one drain
#[derive(Debug, Clone, Default)]
pub struct DrainPolicy {
    /// Drop the first answer line; instruments that echo the command print
    /// it ahead of the reply
    pub discard_first: bool,

    /// The command produces no answer; anything still received is consumed
    /// and logged as discarded so it cannot leak into the next drain
    pub expect_empty: bool,

    /// Extra consecutive idle timeouts tolerated before the drain
    /// concludes (0 = first empty read ends the response)
    pub idle_limit: u32,

    /// Await a line containing this text before accumulating; a stronger
    /// completion signal than the idle timeout where the instrument echoes
    /// commands
    pub echo: Option<String>,
}

impl DrainPolicy {
    /// Policy for a query: discard the command echo, keep the reply
    pub fn query() -> Self {
        Self {
            discard_first: true,
            ..Self::default()
        }
    }

    /// Policy for a fire-and-forget command: consume the echo, expect no
    /// answer
    pub fn command() -> Self {
        Self {
            expect_empty: true,
            ..Self::default()
        }
    }

    /// Await the command echo before trusting answer lines
    pub fn with_echo(mut self, command: impl Into<String>) -> Self {
        self.echo = Some(command.into());
        self
    }

    /// Tolerate `n` extra consecutive idle timeouts
    pub fn with_idle_limit(mut self, n: u32) -> Self {
        self.idle_limit = n;
        self
    }
}

/// Ordered answer lines collected for one command
///
/// Empty means no data arrived before the timeout, which for a query is a
/// valid outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    lines: Vec<String>,
}

impl Response {
    /// Build a response from collected answer lines
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// No answer lines arrived before the timeout
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of answer lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Answer lines in arrival order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// First answer line, if any
    pub fn first(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// Answer joined with newlines in arrival order
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
