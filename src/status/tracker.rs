//! Per-session status state machine.
//!
//! On each poll the classifier looks at the recent tail of the session's
//! output and applies, in order:
//!
//! 1. busy indicator anywhere in the scan window: `Running`
//! 2. waiting prompt in the last few lines: `Waiting`
//! 3. an agent was seen and activity is within the cooldown: still `Running`
//! 4. otherwise `Idle`
//!
//! Activity pulses from raw output feed a spike detector that keeps the
//! cooldown fresh while output is streaming.

use super::matchers::MatcherTable;
use aterm_config::StatusTiming;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Running,
    Waiting,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Running => "running",
            AgentStatus::Waiting => "waiting",
        })
    }
}

/// A status change produced by a poll or an acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AgentStatus,
    pub to: AgentStatus,
}

#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    status: AgentStatus,
    last_change: Option<Instant>,
    acknowledged: bool,
    spike_window_start: Option<Instant>,
    spike_count: u32,
    agent_detected: bool,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Once true, stays true for the life of the session
    pub fn is_agent_detected(&self) -> bool {
        self.agent_detected
    }

    pub fn last_change(&self) -> Option<Instant> {
        self.last_change
    }

    /// Waiting and not yet seen by the user
    pub fn needs_attention(&self) -> bool {
        self.status == AgentStatus::Waiting && !self.acknowledged
    }

    /// Classify the tail of the output. `lines` is oldest first.
    pub fn evaluate(
        &mut self,
        lines: &[&str],
        matchers: &MatcherTable,
        timing: &StatusTiming,
        now: Instant,
    ) -> Option<Transition> {
        let scan = &lines[lines.len().saturating_sub(timing.scan_lines)..];
        let waiting_scan = &lines[lines.len().saturating_sub(timing.waiting_scan_lines)..];

        let next = if let Some(matcher) = matchers.busy_match(scan) {
            log::trace!("busy matcher '{}' hit", matcher.name());
            self.last_change = Some(now);
            self.agent_detected = true;
            AgentStatus::Running
        } else if let Some(matcher) = matchers.waiting_match(waiting_scan) {
            log::trace!("waiting matcher '{}' hit", matcher.name());
            self.agent_detected = true;
            self.acknowledged = false;
            AgentStatus::Waiting
        } else if self.agent_detected
            && self
                .last_change
                .is_some_and(|t| now.saturating_duration_since(t) < timing.cooldown())
        {
            AgentStatus::Running
        } else {
            self.acknowledged = true;
            AgentStatus::Idle
        };

        self.set(next)
    }

    /// Record one raw data event (output chunk or keystroke echo)
    pub fn record_activity(&mut self, timing: &StatusTiming, now: Instant) -> bool {
        match self.spike_window_start {
            Some(start) if now.saturating_duration_since(start) < timing.spike_window() => {
                self.spike_count += 1;
            }
            _ => {
                self.spike_window_start = Some(now);
                self.spike_count = 1;
            }
        }

        let sustained = self.spike_count >= timing.spike_threshold;
        if sustained {
            self.last_change = Some(now);
            self.acknowledged = false;
        }
        sustained
    }

    /// The user has seen this session. A waiting session drops to idle; a
    /// prompt still on screen puts it back to waiting on the next poll.
    pub fn acknowledge(&mut self) -> Option<Transition> {
        if self.status != AgentStatus::Waiting {
            return None;
        }
        self.acknowledged = true;
        self.set(AgentStatus::Idle)
    }

    fn set(&mut self, next: AgentStatus) -> Option<Transition> {
        if next == self.status {
            return None;
        }
        let from = std::mem::replace(&mut self.status, next);
        Some(Transition { from, to: next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn eval(tracker: &mut StatusTracker, lines: &[&str], now: Instant) -> Option<Transition> {
        tracker.evaluate(lines, &MatcherTable::default(), &StatusTiming::default(), now)
    }

    #[test]
    fn test_busy_wins_over_waiting() {
        let mut tracker = StatusTracker::new();
        let t0 = Instant::now();
        eval(&mut tracker, &["Allow? [y/N]", "✻ Thinking… (esc to interrupt)"], t0);
        assert_eq!(tracker.status(), AgentStatus::Running);
        assert!(tracker.is_agent_detected());
    }

    #[test]
    fn test_waiting_only_checks_last_lines() {
        let mut tracker = StatusTracker::new();
        let mut lines = vec!["Continue? [y/N]"];
        lines.extend(std::iter::repeat_n("output", 5));
        eval(&mut tracker, &lines, Instant::now());
        assert_eq!(tracker.status(), AgentStatus::Idle);
    }

    #[test]
    fn test_cooldown_then_idle() {
        let mut tracker = StatusTracker::new();
        let t0 = Instant::now();
        eval(&mut tracker, &["✶ Brewing…"], t0);

        let change = eval(&mut tracker, &["done"], t0 + ms(1999));
        assert_eq!(change, None);
        assert_eq!(tracker.status(), AgentStatus::Running);

        let change = eval(&mut tracker, &["done"], t0 + ms(2000));
        assert_eq!(
            change,
            Some(Transition {
                from: AgentStatus::Running,
                to: AgentStatus::Idle
            })
        );
        assert!(tracker.is_agent_detected());
    }

    #[test]
    fn test_plain_shell_never_runs_on_cooldown() {
        let mut tracker = StatusTracker::new();
        let timing = StatusTiming::default();
        let t0 = Instant::now();
        tracker.record_activity(&timing, t0);
        tracker.record_activity(&timing, t0 + ms(10));
        eval(&mut tracker, &["$ make"], t0 + ms(20));
        assert_eq!(tracker.status(), AgentStatus::Idle);
    }

    #[test]
    fn test_spike_needs_two_events_in_window() {
        let mut tracker = StatusTracker::new();
        let timing = StatusTiming::default();
        let t0 = Instant::now();
        assert!(!tracker.record_activity(&timing, t0));
        assert!(!tracker.record_activity(&timing, t0 + ms(1500)));
        assert!(tracker.record_activity(&timing, t0 + ms(1900)));
        assert_eq!(tracker.last_change(), Some(t0 + ms(1900)));
    }

    #[test]
    fn test_spike_extends_agent_cooldown() {
        let mut tracker = StatusTracker::new();
        let timing = StatusTiming::default();
        let t0 = Instant::now();
        eval(&mut tracker, &["✻ Thinking…"], t0);
        tracker.record_activity(&timing, t0 + ms(1800));
        tracker.record_activity(&timing, t0 + ms(1900));
        eval(&mut tracker, &["streaming"], t0 + ms(3000));
        assert_eq!(tracker.status(), AgentStatus::Running);
    }

    #[test]
    fn test_acknowledge_clears_waiting() {
        let mut tracker = StatusTracker::new();
        let t0 = Instant::now();
        eval(&mut tracker, &["✻ Thinking…"], t0);
        eval(&mut tracker, &["Do you want to proceed?"], t0 + ms(500));
        assert!(tracker.needs_attention());

        let change = tracker.acknowledge();
        assert_eq!(change.map(|t| t.to), Some(AgentStatus::Idle));
        assert!(tracker.acknowledge().is_none());

        // The prompt is still on screen: waiting again, unacknowledged
        let change = eval(&mut tracker, &["Do you want to proceed?"], t0 + ms(1000));
        assert_eq!(
            change,
            Some(Transition {
                from: AgentStatus::Idle,
                to: AgentStatus::Waiting
            })
        );
        assert!(!tracker.is_acknowledged());
        assert!(tracker.needs_attention());
    }

    #[test]
    fn test_every_waiting_match_clears_acknowledged() {
        let mut tracker = StatusTracker::new();
        let t0 = Instant::now();
        eval(&mut tracker, &["Allow? [y/N]"], t0);
        tracker.acknowledge();
        assert!(tracker.is_acknowledged());

        eval(&mut tracker, &["Allow? [y/N]"], t0 + ms(500));
        assert_eq!(tracker.status(), AgentStatus::Waiting);
        assert!(!tracker.is_acknowledged());
    }
}
