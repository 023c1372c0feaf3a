//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes so that
//! partially written YAML files fill in the same values as `Default` impls.

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_false() -> bool {
    false
}

pub fn bool_true() -> bool {
    true
}

pub fn flex() -> f64 {
    1.0
}

// ── Status classifier ──────────────────────────────────────────────────────

pub fn poll_interval_ms() -> u64 {
    500
}

pub fn cooldown_ms() -> u64 {
    2000
}

pub fn spike_window_ms() -> u64 {
    1000
}

pub fn spike_threshold() -> u32 {
    2
}

pub fn scan_lines() -> usize {
    50
}

pub fn waiting_scan_lines() -> usize {
    5
}

// ── Session I/O ────────────────────────────────────────────────────────────

pub fn frame_interval_ms() -> u64 {
    16
}

pub fn resize_debounce_ms() -> u64 {
    100
}

pub fn injection_idle_ms() -> u64 {
    1500
}

pub fn injection_fallback_ms() -> u64 {
    10_000
}

pub fn bootstrap_fallback_ms() -> u64 {
    2000
}

pub fn scrollback_lines() -> usize {
    5000
}

pub fn cols() -> u16 {
    80
}

pub fn rows() -> u16 {
    24
}

// ── Remote hosts ───────────────────────────────────────────────────────────

pub fn ssh_port() -> u16 {
    22
}

pub fn tmux_session_prefix() -> String {
    "aterm".to_string()
}

// ── Notifications ──────────────────────────────────────────────────────────

pub fn notification_timeout_ms() -> u32 {
    5000
}
