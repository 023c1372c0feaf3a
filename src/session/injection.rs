//! One-shot input injected into a freshly spawned session.
//!
//! An optional bootstrap command goes first (for remote sessions, the
//! command that starts the agent inside tmux), then the task prompt. Each
//! step fires when the output stream goes quiet after having produced
//! something, or unconditionally once its fallback delay expires.

use aterm_config::IoTiming;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Bootstrap,
    Prompt,
    Done,
}

#[derive(Debug)]
pub struct InitialInput {
    bootstrap: Option<Vec<u8>>,
    prompt: Option<Vec<u8>>,
    stage: Stage,
    stage_started: Instant,
    last_output: Option<Instant>,
    idle: Duration,
    bootstrap_fallback: Duration,
    prompt_fallback: Duration,
    prompt_sent: bool,
}

impl InitialInput {
    pub fn new(
        bootstrap: Option<Vec<u8>>,
        prompt: Option<Vec<u8>>,
        timing: &IoTiming,
        now: Instant,
    ) -> Self {
        let stage = if bootstrap.is_some() {
            Stage::Bootstrap
        } else if prompt.is_some() {
            Stage::Prompt
        } else {
            Stage::Done
        };
        Self {
            bootstrap,
            prompt,
            stage,
            stage_started: now,
            last_output: None,
            idle: timing.injection_idle(),
            bootstrap_fallback: timing.bootstrap_fallback(),
            prompt_fallback: timing.injection_fallback(),
            prompt_sent: false,
        }
    }

    /// Note that the session produced output
    pub fn on_output(&mut self, now: Instant) {
        if self.stage != Stage::Done {
            self.last_output = Some(now);
        }
    }

    /// Whether the prompt has been written. Never goes back to false.
    pub fn is_sent(&self) -> bool {
        self.prompt_sent
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Next time [`poll`](Self::poll) could return something
    pub fn deadline(&self) -> Option<Instant> {
        let fallback = match self.stage {
            Stage::Bootstrap => self.bootstrap_fallback,
            Stage::Prompt => self.prompt_fallback,
            Stage::Done => return None,
        };
        let forced = self.stage_started + fallback;
        Some(match self.last_output {
            Some(last) => forced.min(last + self.idle),
            None => forced,
        })
    }

    fn ready(&self, fallback: Duration, now: Instant) -> bool {
        let quiet = self
            .last_output
            .is_some_and(|last| now.saturating_duration_since(last) >= self.idle);
        quiet || now.saturating_duration_since(self.stage_started) >= fallback
    }

    /// Bytes to write now, if a step is due
    pub fn poll(&mut self, now: Instant) -> Option<Vec<u8>> {
        match self.stage {
            Stage::Bootstrap if self.ready(self.bootstrap_fallback, now) => {
                self.stage = if self.prompt.is_some() {
                    Stage::Prompt
                } else {
                    Stage::Done
                };
                self.stage_started = now;
                self.last_output = None;
                self.bootstrap.take()
            }
            Stage::Prompt if !self.prompt_sent && self.ready(self.prompt_fallback, now) => {
                self.prompt_sent = true;
                self.stage = Stage::Done;
                self.prompt.take()
            }
            _ => None,
        }
    }

    /// Abandon any step not yet sent
    pub fn cancel(&mut self) {
        self.stage = Stage::Done;
        self.bootstrap = None;
        self.prompt = None;
    }
}
