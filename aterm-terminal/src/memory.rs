//! In-memory PTY backend.
//!
//! Records every call and lets the owner push output for a session onto the
//! event channel as if a process had produced it.

use crate::command::SpawnRequest;
use crate::error::PtyError;
use crate::{PtyBackend, PtyEvent, PtyEventSender};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct MemoryState {
    /// Live ids and the generation of their current spawn
    live: HashMap<String, u64>,
    last_generation: u64,
    spawns: Vec<(String, SpawnRequest)>,
    writes: Vec<(String, Vec<u8>)>,
    resizes: Vec<(String, u16, u16)>,
    kills: Vec<String>,
    fail_spawn: bool,
}

#[derive(Default)]
pub struct MemoryPtyBackend {
    state: Mutex<MemoryState>,
    events: Option<PtyEventSender>,
}

impl MemoryPtyBackend {
    /// Backend that records calls but has no output channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose [`emit`](Self::emit) publishes on `events`
    pub fn with_events(events: PtyEventSender) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            events: Some(events),
        }
    }

    /// Make subsequent spawns fail
    pub fn set_fail_spawn(&self, fail: bool) {
        self.state.lock().fail_spawn = fail;
    }

    /// Publish output for a live session. Returns false if the id is not live
    /// or there is no channel.
    pub fn emit(&self, id: &str, data: &[u8]) -> bool {
        let Some(generation) = self.generation(id) else {
            return false;
        };
        self.send(PtyEvent::Output {
            id: id.to_string(),
            generation,
            data: data.to_vec(),
        })
    }

    /// Publish an exit for a live session
    pub fn emit_exit(&self, id: &str) -> bool {
        let Some(generation) = self.generation(id) else {
            return false;
        };
        self.send(PtyEvent::Exited {
            id: id.to_string(),
            generation,
        })
    }

    fn send(&self, event: PtyEvent) -> bool {
        self.events
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_ok())
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.state.lock().live.contains_key(id)
    }

    /// Generation of the live spawn for an id
    pub fn generation(&self, id: &str) -> Option<u64> {
        self.state.lock().live.get(id).copied()
    }

    /// Number of successful spawns for an id
    pub fn spawn_count(&self, id: &str) -> usize {
        self.state.lock().spawns.iter().filter(|(s, _)| s == id).count()
    }

    /// The most recent spawn request for an id
    pub fn last_spawn(&self, id: &str) -> Option<SpawnRequest> {
        self.state
            .lock()
            .spawns
            .iter()
            .rev()
            .find(|(s, _)| s == id)
            .map(|(_, r)| r.clone())
    }

    /// Every write for an id, in order
    pub fn writes(&self, id: &str) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .writes
            .iter()
            .filter(|(s, _)| s == id)
            .map(|(_, d)| d.clone())
            .collect()
    }

    /// Every resize for an id, in order
    pub fn resizes(&self, id: &str) -> Vec<(u16, u16)> {
        self.state
            .lock()
            .resizes
            .iter()
            .filter(|(s, _, _)| s == id)
            .map(|(_, c, r)| (*c, *r))
            .collect()
    }

    /// Number of kill calls for an id, including ones for dead ids
    pub fn kill_count(&self, id: &str) -> usize {
        self.state.lock().kills.iter().filter(|s| *s == id).count()
    }
}

impl PtyBackend for MemoryPtyBackend {
    fn spawn(&self, id: &str, request: &SpawnRequest) -> Result<u64, PtyError> {
        let mut state = self.state.lock();
        if state.fail_spawn {
            return Err(PtyError::Spawn(format!("spawn of {id} refused")));
        }
        if let Some(generation) = state.live.get(id) {
            return Ok(*generation);
        }
        state.last_generation += 1;
        let generation = state.last_generation;
        state.live.insert(id.to_string(), generation);
        state.spawns.push((id.to_string(), request.clone()));
        Ok(generation)
    }

    fn write(&self, id: &str, data: &[u8]) -> Result<(), PtyError> {
        let mut state = self.state.lock();
        if !state.live.contains_key(id) {
            return Err(PtyError::NotFound(id.to_string()));
        }
        state.writes.push((id.to_string(), data.to_vec()));
        Ok(())
    }

    fn resize(&self, id: &str, cols: u16, rows: u16) -> Result<(), PtyError> {
        let mut state = self.state.lock();
        if !state.live.contains_key(id) {
            return Err(PtyError::NotFound(id.to_string()));
        }
        state.resizes.push((id.to_string(), cols, rows));
        Ok(())
    }

    fn kill(&self, id: &str) -> Result<(), PtyError> {
        let mut state = self.state.lock();
        state.kills.push(id.to_string());
        state.live.remove(id);
        Ok(())
    }

    fn kill_all(&self) {
        let mut state = self.state.lock();
        let live: Vec<String> = state.live.drain().map(|(id, _)| id).collect();
        state.kills.extend(live);
    }

    fn active_count(&self) -> usize {
        self.state.lock().live.len()
    }
}
