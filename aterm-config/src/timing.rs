//! Product-tuned thresholds for the status classifier, the I/O pipeline
//! and notification dispatch.
//!
//! Every value has a serde default so partial YAML sections are accepted.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status classifier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTiming {
    /// How often each session's buffer is classified
    #[serde(default = "crate::defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Grace period an agent session stays `running` after its busy pattern disappears
    #[serde(default = "crate::defaults::cooldown_ms")]
    pub cooldown_ms: u64,
    /// Sliding window for the activity-spike detector
    #[serde(default = "crate::defaults::spike_window_ms")]
    pub spike_window_ms: u64,
    /// Change events inside the window that count as sustained activity
    #[serde(default = "crate::defaults::spike_threshold")]
    pub spike_threshold: u32,
    /// Trailing lines scanned for busy indicators
    #[serde(default = "crate::defaults::scan_lines")]
    pub scan_lines: usize,
    /// Trailing lines scanned for waiting prompts
    #[serde(default = "crate::defaults::waiting_scan_lines")]
    pub waiting_scan_lines: usize,
}

impl StatusTiming {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn spike_window(&self) -> Duration {
        Duration::from_millis(self.spike_window_ms)
    }
}

impl Default for StatusTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: crate::defaults::poll_interval_ms(),
            cooldown_ms: crate::defaults::cooldown_ms(),
            spike_window_ms: crate::defaults::spike_window_ms(),
            spike_threshold: crate::defaults::spike_threshold(),
            scan_lines: crate::defaults::scan_lines(),
            waiting_scan_lines: crate::defaults::waiting_scan_lines(),
        }
    }
}

/// Session I/O pipeline timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoTiming {
    /// Display frame period; output is flushed at most once per frame
    #[serde(default = "crate::defaults::frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Trailing-edge delay before a resize is sent to the process
    #[serde(default = "crate::defaults::resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    /// Output silence that counts as "idle" for initial-input injection
    #[serde(default = "crate::defaults::injection_idle_ms")]
    pub injection_idle_ms: u64,
    /// Unconditional deadline for sending the initial prompt
    #[serde(default = "crate::defaults::injection_fallback_ms")]
    pub injection_fallback_ms: u64,
    /// Unconditional deadline for sending the remote bootstrap command
    #[serde(default = "crate::defaults::bootstrap_fallback_ms")]
    pub bootstrap_fallback_ms: u64,
    /// Decoded lines retained per session
    #[serde(default = "crate::defaults::scrollback_lines")]
    pub scrollback_lines: usize,
    /// Initial PTY size before the first container measurement
    #[serde(default = "crate::defaults::cols")]
    pub cols: u16,
    #[serde(default = "crate::defaults::rows")]
    pub rows: u16,
}

impl IoTiming {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn injection_idle(&self) -> Duration {
        Duration::from_millis(self.injection_idle_ms)
    }

    pub fn injection_fallback(&self) -> Duration {
        Duration::from_millis(self.injection_fallback_ms)
    }

    pub fn bootstrap_fallback(&self) -> Duration {
        Duration::from_millis(self.bootstrap_fallback_ms)
    }
}

impl Default for IoTiming {
    fn default() -> Self {
        Self {
            frame_interval_ms: crate::defaults::frame_interval_ms(),
            resize_debounce_ms: crate::defaults::resize_debounce_ms(),
            injection_idle_ms: crate::defaults::injection_idle_ms(),
            injection_fallback_ms: crate::defaults::injection_fallback_ms(),
            bootstrap_fallback_ms: crate::defaults::bootstrap_fallback_ms(),
            scrollback_lines: crate::defaults::scrollback_lines(),
            cols: crate::defaults::cols(),
            rows: crate::defaults::rows(),
        }
    }
}

/// Which side effects status transitions trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Desktop notification when an agent finishes or needs input
    #[serde(default = "crate::defaults::bool_true")]
    pub desktop: bool,
    /// Terminal bell on the same edges
    #[serde(default = "crate::defaults::bool_false")]
    pub sound: bool,
    /// Prefix the window title with the number of sessions needing attention
    #[serde(default = "crate::defaults::bool_true")]
    pub title_badge: bool,
    #[serde(default = "crate::defaults::notification_timeout_ms")]
    pub timeout_ms: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            desktop: true,
            sound: false,
            title_badge: true,
            timeout_ms: crate::defaults::notification_timeout_ms(),
        }
    }
}
