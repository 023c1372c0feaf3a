//! Text matchers used by the status classifier.
//!
//! Each matcher answers one question about a single line of terminal text.
//! A [`MatcherTable`] groups them into "busy" and "waiting" sets; the tables
//! can be extended at runtime without touching the classifier.

use regex::Regex;

pub trait TextMatcher: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    fn matches(&self, line: &str) -> bool;
}

/// Case-insensitive substring
#[derive(Debug, Clone)]
pub struct Substring {
    needle: String,
}

impl Substring {
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_lowercase(),
        }
    }
}

impl TextMatcher for Substring {
    fn name(&self) -> &str {
        &self.needle
    }

    fn matches(&self, line: &str) -> bool {
        line.to_lowercase().contains(&self.needle)
    }
}

/// Regular expression, matched anywhere in the line
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl TextMatcher for Pattern {
    fn name(&self) -> &str {
        self.regex.as_str()
    }

    fn matches(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// A line that starts with a progress glyph followed by text, e.g. `✻ Thinking`
#[derive(Debug, Clone)]
pub struct SpinnerGlyph {
    glyphs: Vec<char>,
}

impl SpinnerGlyph {
    pub fn new(glyphs: &str) -> Self {
        Self {
            glyphs: glyphs.chars().collect(),
        }
    }
}

impl TextMatcher for SpinnerGlyph {
    fn name(&self) -> &str {
        "spinner"
    }

    fn matches(&self, line: &str) -> bool {
        let mut chars = line.trim_start().chars();
        let Some(first) = chars.next() else {
            return false;
        };
        self.glyphs.contains(&first)
            && chars.next().is_some_and(char::is_whitespace)
            && chars.any(char::is_alphabetic)
    }
}

/// A known busy word directly followed by an ellipsis, e.g. `Pondering…`
#[derive(Debug, Clone)]
pub struct BusyWord {
    words: Vec<String>,
}

impl BusyWord {
    pub fn new(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }
}

impl TextMatcher for BusyWord {
    fn name(&self) -> &str {
        "busy-word"
    }

    fn matches(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.words.iter().any(|word| {
            lower.match_indices(word.as_str()).any(|(at, _)| {
                let rest = &lower[at + word.len()..];
                rest.starts_with('…') || rest.starts_with("...")
            })
        })
    }
}

const SPINNER_GLYPHS: &str = "✻✽✶✳✢·⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

const BUSY_PHRASES: &[&str] = &["esc to interrupt", "ctrl+c to interrupt", "esc to cancel"];

const BUSY_WORDS: &[&str] = &[
    "thinking",
    "working",
    "pondering",
    "cogitating",
    "musing",
    "processing",
    "computing",
    "brewing",
    "crafting",
    "reticulating",
    "analyzing",
    "generating",
    "considering",
    "noodling",
    "percolating",
];

const WAITING_PHRASES: &[&str] = &[
    "[y/n]",
    "(y/n)",
    "allow?",
    "do you want to proceed",
    "do you want to make this edit",
    "do you want to create",
    "allow edit",
    "allow bash",
    "press enter to continue",
    "waiting for your input",
];

/// `❯ 1. Yes` style selection menus
const WAITING_MENU: &str = r"^\s*[❯>›]\s*1\.\s+Yes";

/// Busy and waiting matchers for the classifier
pub struct MatcherTable {
    busy: Vec<Box<dyn TextMatcher>>,
    waiting: Vec<Box<dyn TextMatcher>>,
}

impl MatcherTable {
    /// A table with no matchers
    pub fn empty() -> Self {
        Self {
            busy: Vec::new(),
            waiting: Vec::new(),
        }
    }

    pub fn with_busy(mut self, matcher: impl TextMatcher + 'static) -> Self {
        self.busy.push(Box::new(matcher));
        self
    }

    pub fn with_waiting(mut self, matcher: impl TextMatcher + 'static) -> Self {
        self.waiting.push(Box::new(matcher));
        self
    }

    fn first_match<'a>(
        matchers: &'a [Box<dyn TextMatcher>],
        lines: &[&str],
    ) -> Option<&'a dyn TextMatcher> {
        matchers
            .iter()
            .find(|m| lines.iter().any(|line| m.matches(line)))
            .map(|m| m.as_ref())
    }

    /// The busy matcher hit by any of `lines`
    pub fn busy_match(&self, lines: &[&str]) -> Option<&dyn TextMatcher> {
        Self::first_match(&self.busy, lines)
    }

    /// The waiting matcher hit by any of `lines`
    pub fn waiting_match(&self, lines: &[&str]) -> Option<&dyn TextMatcher> {
        Self::first_match(&self.waiting, lines)
    }

    pub fn is_busy(&self, lines: &[&str]) -> bool {
        self.busy_match(lines).is_some()
    }

    pub fn is_waiting(&self, lines: &[&str]) -> bool {
        self.waiting_match(lines).is_some()
    }
}

impl Default for MatcherTable {
    fn default() -> Self {
        let mut table = Self::empty()
            .with_busy(SpinnerGlyph::new(SPINNER_GLYPHS))
            .with_busy(BusyWord::new(BUSY_WORDS));
        for phrase in BUSY_PHRASES {
            table = table.with_busy(Substring::new(phrase));
        }
        for phrase in WAITING_PHRASES {
            table = table.with_waiting(Substring::new(phrase));
        }
        match Pattern::new(WAITING_MENU) {
            Ok(menu) => table.with_waiting(menu),
            Err(e) => {
                log::error!("Invalid built-in waiting pattern: {}", e);
                table
            }
        }
    }
}

impl std::fmt::Debug for MatcherTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherTable")
            .field("busy", &self.busy.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field(
                "waiting",
                &self.waiting.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
