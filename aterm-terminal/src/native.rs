//! Native PTY backend built on `portable-pty`.
//!
//! Each session gets its own reader thread that forwards raw output chunks
//! to the event channel in order, tagged with the spawn's generation.
//! Writers and masters are held in a single map guarded by a
//! `parking_lot::Mutex`; the reader thread never takes it.

use crate::command::{SpawnRequest, default_shell};
use crate::error::PtyError;
use crate::{PtyBackend, PtyEvent, PtyEventSender};
use parking_lot::Mutex;
use portable_pty::{PtySize, native_pty_system};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// 64KB read buffer for throughput on fast output
const READ_BUFFER_SIZE: usize = 64 * 1024;

struct PtyHandle {
    master: Box<dyn portable_pty::MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn portable_pty::Child + Send + Sync>,
    generation: u64,
}

pub struct NativePtyBackend {
    ptys: Mutex<HashMap<String, PtyHandle>>,
    events: PtyEventSender,
    shell: String,
    next_generation: AtomicU64,
}

impl NativePtyBackend {
    /// Create a backend publishing output on `events`, using the user's login shell
    pub fn new(events: PtyEventSender) -> Self {
        Self::with_shell(events, default_shell())
    }

    /// Create a backend with an explicit shell
    pub fn with_shell(events: PtyEventSender, shell: impl Into<String>) -> Self {
        Self {
            ptys: Mutex::new(HashMap::new()),
            events,
            shell: shell.into(),
            next_generation: AtomicU64::new(1),
        }
    }

    fn size(cols: u16, rows: u16) -> PtySize {
        PtySize {
            rows: rows.max(1),
            cols: cols.max(1),
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    fn spawn_reader(
        &self,
        id: String,
        generation: u64,
        mut reader: Box<dyn Read + Send>,
    ) -> Result<(), PtyError> {
        let events = self.events.clone();
        thread::Builder::new()
            .name(format!("pty-reader-{id}"))
            .spawn(move || {
                let mut buf = vec![0u8; READ_BUFFER_SIZE];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            let event = PtyEvent::Output {
                                id: id.clone(),
                                generation,
                                data: buf[..n].to_vec(),
                            };
                            if events.send(event).is_err() {
                                // Receiver dropped: workspace is shutting down
                                return;
                            }
                        }
                        Err(e) => {
                            log::debug!("PTY reader for {} stopped: {}", id, e);
                            break;
                        }
                    }
                }
                let _ = events.send(PtyEvent::Exited { id, generation });
            })?;
        Ok(())
    }
}

impl PtyBackend for NativePtyBackend {
    fn spawn(&self, id: &str, request: &SpawnRequest) -> Result<u64, PtyError> {
        if let Some(pty) = self.ptys.lock().get(id) {
            log::warn!("Ignoring spawn for already-live PTY {}", id);
            return Ok(pty.generation);
        }

        let command = request.command_line(&self.shell);
        log::info!(
            "Spawning PTY {} ({}x{}): {} {:?}",
            id,
            request.cols,
            request.rows,
            command.program,
            command.args
        );

        let pair = native_pty_system()
            .openpty(Self::size(request.cols, request.rows))
            .map_err(|e| PtyError::Create(e.to_string()))?;

        let child = pair
            .slave
            .spawn_command(command.to_builder())
            .map_err(|e| PtyError::Spawn(e.to_string()))?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| PtyError::CloneReader(e.to_string()))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| PtyError::Writer(e.to_string()))?;

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.ptys.lock().insert(
            id.to_string(),
            PtyHandle {
                master: pair.master,
                writer,
                child,
                generation,
            },
        );

        self.spawn_reader(id.to_string(), generation, reader)?;
        Ok(generation)
    }

    fn write(&self, id: &str, data: &[u8]) -> Result<(), PtyError> {
        let mut ptys = self.ptys.lock();
        let pty = ptys
            .get_mut(id)
            .ok_or_else(|| PtyError::NotFound(id.to_string()))?;
        pty.writer.write_all(data)?;
        pty.writer.flush()?;
        Ok(())
    }

    fn resize(&self, id: &str, cols: u16, rows: u16) -> Result<(), PtyError> {
        let ptys = self.ptys.lock();
        let pty = ptys
            .get(id)
            .ok_or_else(|| PtyError::NotFound(id.to_string()))?;
        pty.master
            .resize(Self::size(cols, rows))
            .map_err(|e| PtyError::Resize(e.to_string()))
    }

    fn kill(&self, id: &str) -> Result<(), PtyError> {
        let handle = self.ptys.lock().remove(id);
        if let Some(pty) = handle {
            log::info!("Killing PTY {}", id);
            terminate(id, pty.child);
        }
        Ok(())
    }

    fn kill_all(&self) {
        let drained: Vec<(String, PtyHandle)> = self.ptys.lock().drain().collect();
        for (id, pty) in drained {
            terminate(&id, pty.child);
        }
    }

    fn active_count(&self) -> usize {
        self.ptys.lock().len()
    }
}

/// Kill a child and reap it so it does not linger as a zombie.
///
/// A child that has not exited by the time the kill returns is waited on
/// from a short-lived thread.
fn terminate(id: &str, mut child: Box<dyn portable_pty::Child + Send + Sync>) {
    if let Err(e) = child.kill() {
        // Already exited
        log::debug!("Kill of PTY {} reported: {}", id, e);
    }
    match child.try_wait() {
        Ok(Some(status)) => log::debug!("PTY {} reaped: {:?}", id, status),
        Ok(None) => {
            let name = format!("pty-reap-{id}");
            let id = id.to_string();
            let spawned = thread::Builder::new().name(name).spawn(move || {
                match child.wait() {
                    Ok(status) => log::debug!("PTY {} reaped: {:?}", id, status),
                    Err(e) => log::debug!("Wait on PTY {} failed: {}", id, e),
                }
            });
            if let Err(e) = spawned {
                log::warn!("Could not start reaper thread: {}", e);
            }
        }
        Err(e) => log::debug!("Wait on PTY {} failed: {}", id, e),
    }
}

impl Drop for NativePtyBackend {
    fn drop(&mut self) {
        self.kill_all();
    }
}
