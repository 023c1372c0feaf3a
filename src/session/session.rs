use super::batcher::FrameBatcher;
use super::buffer::OutputBuffer;
use super::debounce::Debouncer;
use super::decoder::Utf8StreamDecoder;
use super::injection::InitialInput;
use super::key::SessionKey;
use crate::status::{AgentStatus, MatcherTable, StatusTracker, Transition};
use aterm_config::{IoTiming, StatusTiming};
use std::time::Instant;

/// One live pane session: the process behind it plus everything derived
/// from its output.
#[derive(Debug)]
pub struct Session {
    key: SessionKey,
    pty_id: String,
    /// Backend spawn this session's events must carry
    generation: u64,
    decoder: Utf8StreamDecoder,
    buffer: OutputBuffer,
    batcher: FrameBatcher,
    tracker: StatusTracker,
    pub(super) resize: Debouncer<(u16, u16)>,
    pub(super) injection: Option<InitialInput>,
    size: (u16, u16),
    /// Next status poll; `None` once the poll timer is cancelled
    pub(super) next_poll: Option<Instant>,
    container: Option<String>,
    attach_count: u32,
    exited: bool,
}

impl Session {
    pub(super) fn new(
        key: SessionKey,
        generation: u64,
        io: &IoTiming,
        status: &StatusTiming,
        injection: Option<InitialInput>,
        now: Instant,
    ) -> Self {
        Self {
            pty_id: key.pty_id(),
            key,
            generation,
            decoder: Utf8StreamDecoder::new(),
            buffer: OutputBuffer::new(io.scrollback_lines),
            batcher: FrameBatcher::new(),
            tracker: StatusTracker::new(),
            resize: Debouncer::new(io.resize_debounce()),
            injection,
            size: (io.cols, io.rows),
            next_poll: Some(now + status.poll_interval()),
            container: None,
            attach_count: 0,
            exited: false,
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn pty_id(&self) -> &str {
        &self.pty_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> AgentStatus {
        self.tracker.status()
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    pub(super) fn tracker_mut(&mut self) -> &mut StatusTracker {
        &mut self.tracker
    }

    pub fn buffer(&self) -> &OutputBuffer {
        &self.buffer
    }

    /// Last size sent to the process
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub(super) fn set_size(&mut self, size: (u16, u16)) {
        self.size = size;
    }

    /// Container the render surface is currently mounted in
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// How many times the render surface has been mounted
    pub fn attach_count(&self) -> u32 {
        self.attach_count
    }

    /// Mount the render surface in `container`. Returns true if it moved.
    pub fn attach(&mut self, container: &str) -> bool {
        if self.container.as_deref() == Some(container) {
            return false;
        }
        self.container = Some(container.to_string());
        self.attach_count += 1;
        true
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub(super) fn mark_exited(&mut self) {
        self.exited = true;
    }

    pub fn has_pending_flush(&self) -> bool {
        self.batcher.is_scheduled()
    }

    /// Whether the initial prompt has gone out (true if there never was one)
    pub fn initial_input_sent(&self) -> bool {
        self.injection.as_ref().is_none_or(|i| i.is_sent() || i.is_done())
    }

    /// Queue an output chunk for the next frame
    pub(super) fn receive(&mut self, chunk: &[u8], status: &StatusTiming, now: Instant) {
        self.batcher.push(chunk);
        if let Some(injection) = self.injection.as_mut() {
            injection.on_output(now);
        }
        self.tracker.record_activity(status, now);
    }

    /// Decode and append everything queued since the last frame
    pub(super) fn flush(&mut self) -> bool {
        let Some(bytes) = self.batcher.take() else {
            return false;
        };
        let text = self.decoder.decode(&bytes);
        if !text.is_empty() {
            self.buffer.push_str(&text);
        }
        true
    }

    /// Classify the tail of the buffer
    pub(super) fn poll_status(
        &mut self,
        matchers: &MatcherTable,
        timing: &StatusTiming,
        now: Instant,
    ) -> Option<Transition> {
        let lines = self.buffer.tail(timing.scan_lines);
        self.tracker.evaluate(&lines, matchers, timing, now)
    }

    /// Stop every timer and release decoder and buffer state
    pub(super) fn dispose(&mut self) {
        self.next_poll = None;
        self.resize.cancel();
        if let Some(injection) = self.injection.as_mut() {
            injection.cancel();
        }
        self.batcher.clear();
        let _ = self.decoder.finish();
        self.buffer.clear();
        self.container = None;
    }
}
