//! Status classification and rollup.

pub mod aggregate;
pub mod matchers;
pub mod notify;
pub mod tracker;

pub use aggregate::{ProjectStatusSummary, StatusChange, StatusEvent};
pub use matchers::{BusyWord, MatcherTable, Pattern, SpinnerGlyph, Substring, TextMatcher};
pub use notify::{
    DesktopNotifier, NotificationSink, Notifier, TerminalBell, TerminalTitle, TitleSink,
    badge_title,
};
pub use tracker::{AgentStatus, StatusTracker, Transition};
