//! Notification side effects of status edges: desktop notifications, the
//! terminal bell and the window-title badge.
//!
//! Sinks are fire-and-forget. A failing sink logs and carries on; nothing here
//! ever reaches back into the status state machine.

use super::aggregate::{ProjectStatusSummary, StatusEvent};
use aterm_config::NotificationConfig;
use std::io::Write;

/// Receives user-facing notifications
pub trait NotificationSink: Send {
    fn notify(&mut self, title: &str, body: &str);
}

/// Receives the window title
pub trait TitleSink: Send {
    fn set_title(&mut self, title: &str);
}

/// Native desktop notifications
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    timeout_ms: u32,
}

impl DesktopNotifier {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

#[cfg(target_os = "macos")]
fn applescript_quote(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\n', '\r'], " ")
}

impl NotificationSink for DesktopNotifier {
    #[cfg(not(target_os = "macos"))]
    fn notify(&mut self, title: &str, body: &str) {
        if let Err(e) = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .timeout(notify_rust::Timeout::Milliseconds(self.timeout_ms))
            .show()
        {
            log::warn!("Desktop notification failed: {}", e);
        }
    }

    #[cfg(target_os = "macos")]
    fn notify(&mut self, title: &str, body: &str) {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            applescript_quote(body),
            applescript_quote(title),
        );
        if let Err(e) = std::process::Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .output()
        {
            log::warn!("Desktop notification failed: {}", e);
        }
    }
}

/// Rings the controlling terminal's bell
#[derive(Debug, Default, Clone)]
pub struct TerminalBell;

impl NotificationSink for TerminalBell {
    fn notify(&mut self, _title: &str, _body: &str) {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            log::debug!("Bell failed: {}", e);
        }
    }
}

/// Sets the title of the controlling terminal with OSC 0
#[derive(Debug, Default, Clone)]
pub struct TerminalTitle;

impl TitleSink for TerminalTitle {
    fn set_title(&mut self, title: &str) {
        let mut stderr = std::io::stderr();
        let sequence = format!("\x1b]0;{}\x07", title.replace(['\x07', '\x1b'], ""));
        if let Err(e) = stderr
            .write_all(sequence.as_bytes())
            .and_then(|_| stderr.flush())
        {
            log::debug!("Title update failed: {}", e);
        }
    }
}

/// `"(N) name"` while N sessions need attention, else just the name
pub fn badge_title(name: &str, summary: &ProjectStatusSummary) -> String {
    if summary.waiting_count > 0 {
        format!("({}) {}", summary.waiting_count, name)
    } else {
        name.to_string()
    }
}

/// Routes status events and summaries to the configured sinks
pub struct Notifier {
    sinks: Vec<Box<dyn NotificationSink>>,
    title: Option<Box<dyn TitleSink>>,
    last_title: Option<String>,
}

impl Notifier {
    /// No sinks at all
    pub fn silent() -> Self {
        Self {
            sinks: Vec::new(),
            title: None,
            last_title: None,
        }
    }

    /// Sinks enabled by `config`
    pub fn from_config(config: &NotificationConfig) -> Self {
        let mut notifier = Self::silent();
        if config.desktop {
            notifier = notifier.with_sink(DesktopNotifier::new(config.timeout_ms));
        }
        if config.sound {
            notifier = notifier.with_sink(TerminalBell);
        }
        if config.title_badge {
            notifier = notifier.with_title(TerminalTitle);
        }
        notifier
    }

    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn with_title(mut self, sink: impl TitleSink + 'static) -> Self {
        self.title = Some(Box::new(sink));
        self
    }

    /// Tell every sink about an event. `pane_name` is the pane's display name.
    pub fn dispatch(&mut self, event: &StatusEvent, project_name: &str, pane_name: &str) {
        let (title, body) = match event {
            StatusEvent::NeedsInput(_) => (
                format!("{project_name}: input needed"),
                format!("{pane_name} is waiting for you"),
            ),
            StatusEvent::Finished(_) => (
                format!("{project_name}: done"),
                format!("{pane_name} finished"),
            ),
        };
        log::info!("{} ({})", title, body);
        for sink in &mut self.sinks {
            sink.notify(&title, &body);
        }
    }

    /// Rewrite the window title if the badge changed
    pub fn update_title(&mut self, project_name: &str, summary: &ProjectStatusSummary) {
        let Some(sink) = self.title.as_mut() else {
            return;
        };
        let title = badge_title(project_name, summary);
        if self.last_title.as_deref() != Some(title.as_str()) {
            sink.set_title(&title);
            self.last_title = Some(title);
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("sinks", &self.sinks.len())
            .field("title", &self.title.is_some())
            .finish()
    }
}
