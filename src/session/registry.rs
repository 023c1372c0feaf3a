//! Process-wide map from session key to live session.
//!
//! The registry owns every session for the life of the application. Views
//! come and go; a session is created the first time its key is acquired and
//! destroyed only by [`SessionRegistry::release`].

use super::error::SessionError;
use super::injection::InitialInput;
use super::input::encode_input;
use super::key::SessionKey;
use super::session::Session;
use crate::status::{MatcherTable, ProjectStatusSummary, StatusChange};
use aterm_config::{IoTiming, RemoteHost, StatusTiming};
use aterm_terminal::{PtyBackend, PtyEvent, SpawnRequest, SpawnTarget};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Instant;

/// What to start when a key is acquired for the first time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnParams {
    pub cwd: String,
    /// Command run before the interactive shell
    pub command: Option<String>,
    /// Run over SSH inside tmux instead of locally
    pub remote: Option<RemoteHost>,
    /// Typed once the remote session settles, before the prompt
    pub bootstrap: Option<String>,
    /// Task prompt typed once the session settles
    pub prompt: Option<String>,
}

impl SpawnParams {
    pub fn local(cwd: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    fn request(&self, key: &SessionKey, cols: u16, rows: u16) -> SpawnRequest {
        let target = match &self.remote {
            Some(host) => SpawnTarget::Remote {
                tmux_session: host.tmux_session_name(&key.pane_id),
                host: host.clone(),
            },
            None => SpawnTarget::Local,
        };
        SpawnRequest {
            cwd: self.cwd.clone(),
            cols,
            rows,
            command: self.command.clone(),
            target,
        }
    }
}

pub struct SessionRegistry {
    backend: Arc<dyn PtyBackend>,
    sessions: HashMap<SessionKey, Session>,
    by_pty: HashMap<String, SessionKey>,
    matchers: MatcherTable,
    status_timing: StatusTiming,
    io_timing: IoTiming,
}

impl SessionRegistry {
    pub fn new(
        backend: Arc<dyn PtyBackend>,
        status_timing: StatusTiming,
        io_timing: IoTiming,
    ) -> Self {
        Self {
            backend,
            sessions: HashMap::new(),
            by_pty: HashMap::new(),
            matchers: MatcherTable::default(),
            status_timing,
            io_timing,
        }
    }

    /// Replace the classifier's matcher table
    pub fn with_matchers(mut self, matchers: MatcherTable) -> Self {
        self.matchers = matchers;
        self
    }

    pub fn backend(&self) -> &Arc<dyn PtyBackend> {
        &self.backend
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    pub fn get(&self, key: &SessionKey) -> Option<&Session> {
        self.sessions.get(key)
    }

    /// Keys of every session in a project, sorted
    pub fn project_keys(&self, project_id: &str) -> Vec<SessionKey> {
        let mut keys: Vec<SessionKey> = self
            .sessions
            .keys()
            .filter(|k| k.belongs_to(project_id))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Return the session for `key`, starting it if needed, and mount its
    /// render surface in `container`.
    ///
    /// An existing session is never respawned, whatever `params` says.
    pub fn acquire(
        &mut self,
        key: &SessionKey,
        params: &SpawnParams,
        container: &str,
        now: Instant,
    ) -> Result<&mut Session, SessionError> {
        let slot = match self.sessions.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let session = entry.into_mut();
                if session.attach(container) {
                    log::debug!("Session {} reattached to {}", key, container);
                }
                return Ok(session);
            }
            Entry::Vacant(slot) => slot,
        };

        let pty_id = key.pty_id();
        let request = params.request(key, self.io_timing.cols, self.io_timing.rows);
        let generation = self
            .backend
            .spawn(&pty_id, &request)
            .map_err(|source| SessionError::Spawn {
                key: key.clone(),
                source,
            })?;
        log::info!("Session {} started in {}", key, request.cwd);

        let bootstrap = params
            .bootstrap
            .as_deref()
            .and_then(|text| encode_input(text, true));
        let prompt = params
            .prompt
            .as_deref()
            .and_then(|text| encode_input(text, true));
        let injection = (bootstrap.is_some() || prompt.is_some())
            .then(|| InitialInput::new(bootstrap, prompt, &self.io_timing, now));

        let mut session = Session::new(
            key.clone(),
            generation,
            &self.io_timing,
            &self.status_timing,
            injection,
            now,
        );
        session.attach(container);
        self.by_pty.insert(pty_id, key.clone());
        Ok(slot.insert(session))
    }

    /// Tear a session down: timers, decoder and buffer, process, entry.
    ///
    /// The kill request is sent even if no entry exists, so a session is
    /// never left running. Returns whether an entry was removed.
    pub fn release(&mut self, key: &SessionKey) -> bool {
        let pty_id = key.pty_id();
        let existed = match self.sessions.get_mut(key) {
            Some(session) => {
                session.dispose();
                true
            }
            None => false,
        };
        if let Err(e) = self.backend.kill(&pty_id) {
            log::warn!("Kill of session {} failed: {}", key, e);
        }
        self.sessions.remove(key);
        self.by_pty.remove(&pty_id);
        if existed {
            log::info!("Session {} released", key);
        }
        existed
    }

    /// Release every session of a project
    pub fn release_project(&mut self, project_id: &str) -> usize {
        let keys = self.project_keys(project_id);
        keys.iter().filter(|key| self.release(key)).count()
    }

    /// Release everything, then make sure the backend has nothing left running
    pub fn release_all(&mut self) -> usize {
        let keys: Vec<SessionKey> = self.sessions.keys().cloned().collect();
        let released = keys.iter().filter(|key| self.release(key)).count();
        self.backend.kill_all();
        released
    }

    /// Send input to a session. Failures are logged, never returned.
    pub fn write(&self, key: &SessionKey, data: &[u8]) {
        if !self.sessions.contains_key(key) {
            log::warn!("Write to unknown session {}", key);
            return;
        }
        if let Err(e) = self.backend.write(&key.pty_id(), data) {
            log::warn!("Write to session {} failed: {}", key, e);
        }
    }

    /// Request a new terminal size, sent once resizing settles
    pub fn request_resize(&mut self, key: &SessionKey, cols: u16, rows: u16, now: Instant) {
        if let Some(session) = self.sessions.get_mut(key) {
            session.resize.schedule((cols, rows), now);
        }
    }

    /// Route a backend event to its session.
    ///
    /// Events from a process that has since been replaced under the same
    /// id are dropped.
    pub fn dispatch(&mut self, event: PtyEvent, now: Instant) -> Option<SessionKey> {
        let Some(key) = self.by_pty.get(event.id()) else {
            log::trace!("Dropping event for released session {}", event.id());
            return None;
        };
        let session = self.sessions.get_mut(key)?;
        if session.generation() != event.generation() {
            log::trace!(
                "Dropping event from generation {} of session {} (live: {})",
                event.generation(),
                key,
                session.generation()
            );
            return None;
        }
        let data = match event {
            PtyEvent::Output { data, .. } => Some(data),
            PtyEvent::Exited { .. } => None,
        };
        match data {
            Some(chunk) => session.receive(&chunk, &self.status_timing, now),
            None => {
                log::info!("Session {} exited", key);
                session.mark_exited();
            }
        }
        Some(key.clone())
    }

    /// Render pass: flush each session's queued output. Returns how many flushed.
    pub fn on_frame(&mut self) -> usize {
        self.sessions
            .values_mut()
            .map(Session::flush)
            .filter(|flushed| *flushed)
            .count()
    }

    /// Timer pass: due resizes, due injections and due status polls
    pub fn on_tick(&mut self, now: Instant) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        for (key, session) in self.sessions.iter_mut() {
            let pty_id = session.pty_id().to_string();

            if let Some(size) = session.resize.poll(now)
                && size != session.size()
            {
                match self.backend.resize(&pty_id, size.0, size.1) {
                    Ok(()) => session.set_size(size),
                    Err(e) => log::warn!("Resize of session {} failed: {}", key, e),
                }
            }

            if let Some(bytes) = session.injection.as_mut().and_then(|i| i.poll(now)) {
                log::info!("Injecting initial input into session {}", key);
                if let Err(e) = self.backend.write(&pty_id, &bytes) {
                    log::warn!("Initial input to session {} failed: {}", key, e);
                }
            }

            if session.next_poll.is_some_and(|due| due <= now) {
                session.next_poll = Some(now + self.status_timing.poll_interval());
                if let Some(transition) =
                    session.poll_status(&self.matchers, &self.status_timing, now)
                {
                    changes.push(StatusChange {
                        key: key.clone(),
                        transition,
                    });
                }
            }
        }
        changes.sort_by(|a, b| a.key.cmp(&b.key));
        changes
    }

    /// The user has looked at a session
    pub fn acknowledge(&mut self, key: &SessionKey) -> Option<StatusChange> {
        let transition = self.sessions.get_mut(key)?.tracker_mut().acknowledge()?;
        Some(StatusChange {
            key: key.clone(),
            transition,
        })
    }

    pub fn summary(&self, project_id: &str) -> ProjectStatusSummary {
        ProjectStatusSummary::from_trackers(
            self.sessions
                .iter()
                .filter(|(k, _)| k.belongs_to(project_id))
                .map(|(_, s)| s.tracker()),
        )
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .field("matchers", &self.matchers)
            .finish()
    }
}
