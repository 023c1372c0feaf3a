//! Plain-text scrollback the status classifier reads from.

use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

/// Complete escape sequences: CSI, string controls (OSC, DCS, SOS, PM, APC)
/// ended by BEL or ST, then any other ESC sequence such as charset
/// selection (`ESC ( B`), cursor save (`ESC 7`) or keypad mode (`ESC =`)
static ANSI_ESCAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b\[[0-?]*[ -/]*[@-~]",
        r"|\x1b[\]PX^_][^\x07\x1b]*(?:\x07|\x1b\\)",
        r"|\x1b[ -/]*[0-~]",
    ))
    .ok()
});

/// A sequence cut off at the end of the text: a lone ESC, ESC plus
/// intermediates, CSI without its final byte, or a string control without
/// its terminator
static PARTIAL_ESCAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b(?:",
        r"\[[0-?]*[ -/]*",
        r"|[\]PX^_][^\x07\x1b]*\x1b?",
        r"|[ -/]*",
        r")\z",
    ))
    .ok()
});

/// An escape this long without terminating is treated as garbage
const MAX_HELD_ESCAPE: usize = 256;

/// Bounded line buffer of decoded, escape-stripped output.
///
/// A bare carriage return discards the line in progress, which matches how
/// spinners and progress bars redraw in place.
#[derive(Debug)]
pub struct OutputBuffer {
    lines: VecDeque<String>,
    current: String,
    held_escape: String,
    max_lines: usize,
    pending_cr: bool,
}

impl OutputBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            current: String::new(),
            held_escape: String::new(),
            max_lines: max_lines.max(1),
            pending_cr: false,
        }
    }

    /// Number of completed lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.current.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.current.clear();
        self.held_escape.clear();
        self.pending_cr = false;
    }

    /// Append decoded text
    pub fn push_str(&mut self, text: &str) {
        let mut joined = std::mem::take(&mut self.held_escape);
        joined.push_str(text);

        let complete = self.hold_partial_escape(joined);
        let stripped = match ANSI_ESCAPE.as_ref() {
            Some(re) => re.replace_all(&complete, ""),
            None => complete.as_str().into(),
        };
        for ch in stripped.chars() {
            self.push_char(ch);
        }
    }

    /// Split off a trailing escape sequence that continues in the next chunk
    fn hold_partial_escape(&mut self, mut text: String) -> String {
        let Some(start) = PARTIAL_ESCAPE
            .as_ref()
            .and_then(|re| re.find(&text))
            .map(|m| m.start())
        else {
            return text;
        };
        if text.len() - start < MAX_HELD_ESCAPE {
            self.held_escape = text.split_off(start);
        }
        text
    }

    fn push_char(&mut self, ch: char) {
        if self.pending_cr {
            self.pending_cr = false;
            if ch != '\n' {
                self.current.clear();
            }
        }
        match ch {
            '\n' => self.end_line(),
            '\r' => self.pending_cr = true,
            '\u{8}' => {
                self.current.pop();
            }
            '\t' => self.current.push(ch),
            c if c.is_control() => {}
            c => self.current.push(c),
        }
    }

    fn end_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    /// The last `n` lines, oldest first, including the line in progress
    pub fn tail(&self, n: usize) -> Vec<&str> {
        if n == 0 {
            return Vec::new();
        }
        let partial = (!self.current.is_empty()).then_some(self.current.as_str());
        let from_complete = n.saturating_sub(usize::from(partial.is_some()));
        let skip = self.lines.len().saturating_sub(from_complete);
        self.lines
            .iter()
            .skip(skip)
            .map(String::as_str)
            .chain(partial)
            .collect()
    }
}
