//! The workspace ties layouts to sessions.
//!
//! Every committed layout is reconciled against the session registry: panes
//! in the layout get a session (existing ones are reused and only remounted),
//! and sessions are torn down only for panes a command explicitly closed or
//! when a project is removed.

pub mod event_loop;

use crate::layout::{DragState, LayoutCommand, LayoutStore, ResizeDrag, ResizeTarget};
use crate::session::{SessionKey, SessionRegistry, SpawnParams};
use crate::status::{Notifier, ProjectStatusSummary, StatusEvent};
use crate::{debug_error, debug_info, debug_log};
use anyhow::{Context, Result, anyhow};
use aterm_config::{Config, Layout, PaneId, ProjectId};
use aterm_terminal::{PtyBackend, PtyEvent};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Container a maximized pane is mounted in
pub const MAXIMIZED_CONTAINER: &str = "maximized";

/// Text typed into a new session once it settles
#[derive(Debug, Clone, Default)]
struct QueuedInput {
    bootstrap: Option<String>,
    prompt: Option<String>,
}

#[derive(Debug)]
struct ActiveResize {
    project_id: ProjectId,
    drag: ResizeDrag,
}

#[derive(Debug)]
pub struct Workspace {
    config: Config,
    config_path: Option<PathBuf>,
    stores: HashMap<ProjectId, LayoutStore>,
    registry: SessionRegistry,
    drag: DragState,
    resize: Option<ActiveResize>,
    maximized: HashMap<ProjectId, PaneId>,
    queued: HashMap<SessionKey, QueuedInput>,
    notifier: Notifier,
}

impl Workspace {
    pub fn new(config: Config, backend: Arc<dyn PtyBackend>, notifier: Notifier) -> Self {
        let registry = SessionRegistry::new(backend, config.status.clone(), config.io.clone());
        Self {
            config,
            config_path: None,
            stores: HashMap::new(),
            registry,
            drag: DragState::new(),
            resize: None,
            maximized: HashMap::new(),
            queued: HashMap::new(),
            notifier,
        }
    }

    /// Save persisted layouts to this file
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SessionRegistry {
        &mut self.registry
    }

    /// The working layout of a project, once activated
    pub fn layout(&self, project_id: &str) -> Option<&Layout> {
        self.stores.get(project_id).and_then(LayoutStore::current)
    }

    pub fn store(&self, project_id: &str) -> Option<&LayoutStore> {
        self.stores.get(project_id)
    }

    pub fn maximized(&self, project_id: &str) -> Option<&str> {
        self.maximized.get(project_id).map(String::as_str)
    }

    /// Open a project (or switch its layout) and start its sessions.
    ///
    /// Returns how many panes failed to start.
    pub fn activate_project(
        &mut self,
        project_id: &str,
        layout_id: Option<&str>,
        now: Instant,
    ) -> Result<usize> {
        let project = self
            .config
            .project(project_id)
            .ok_or_else(|| anyhow!("unknown project '{}'", project_id))?;
        let store = self
            .stores
            .entry(project_id.to_string())
            .or_insert_with(|| LayoutStore::new(project));
        store
            .activate(layout_id)
            .with_context(|| format!("project '{}' has no layout to activate", project_id))?;
        debug_info!("WORKSPACE", "Activated project {}", project_id);
        Ok(self.reconcile(project_id, now))
    }

    /// Type text into the session for `key` once it starts
    pub fn queue_input(
        &mut self,
        key: SessionKey,
        bootstrap: Option<String>,
        prompt: Option<String>,
    ) {
        self.queued.insert(key, QueuedInput { bootstrap, prompt });
    }

    fn spawn_params(&self, project_id: &str, pane_id: &str) -> Option<SpawnParams> {
        let project = self.config.project(project_id)?;
        let pane = self.layout(project_id)?.find_pane(pane_id)?;
        let command = self
            .config
            .profile(&pane.profile_id)
            .and_then(|p| p.effective_command())
            .map(str::to_string);
        Some(SpawnParams {
            cwd: project.path.clone(),
            command,
            remote: project.remote.clone(),
            ..SpawnParams::default()
        })
    }

    /// Where a pane's surface is mounted: its slot in the tree, or the
    /// maximized view
    fn container_for(&self, project_id: &str, pane_id: &str) -> Option<String> {
        if self.maximized(project_id) == Some(pane_id) {
            return Some(MAXIMIZED_CONTAINER.to_string());
        }
        let layout = self.layout(project_id)?;
        let loc = layout.locate(pane_id)?;
        Some(format!("{}/{}", layout.rows[loc.row_index].id, loc.pane_index))
    }

    /// Acquire a session for every pane of the project's working layout.
    ///
    /// Returns how many panes failed to start. Failures are logged and retried
    /// on the next reconcile.
    pub fn reconcile(&mut self, project_id: &str, now: Instant) -> usize {
        let Some(layout) = self.layout(project_id) else {
            return 0;
        };
        let pane_ids = layout.all_pane_ids();
        let mut failed = 0;
        for pane_id in pane_ids {
            let key = SessionKey::new(project_id, pane_id.as_str());
            let (Some(mut params), Some(container)) = (
                self.spawn_params(project_id, &pane_id),
                self.container_for(project_id, &pane_id),
            ) else {
                continue;
            };
            if !self.registry.contains(&key)
                && let Some(queued) = self.queued.remove(&key)
            {
                params.bootstrap = queued.bootstrap;
                params.prompt = queued.prompt;
            }
            if let Err(e) = self.registry.acquire(&key, &params, &container, now) {
                debug_error!("WORKSPACE", "{}", e);
                failed += 1;
            }
        }
        failed
    }

    fn store_mut(&mut self, project_id: &str) -> Result<&mut LayoutStore> {
        self.stores
            .get_mut(project_id)
            .ok_or_else(|| anyhow!("project '{}' is not active", project_id))
    }

    fn release_closed(&mut self, project_id: &str, closed: &[PaneId]) {
        for pane_id in closed {
            self.registry.release(&SessionKey::new(project_id, pane_id.as_str()));
            if self.maximized(project_id) == Some(pane_id.as_str()) {
                self.maximized.remove(project_id);
            }
        }
    }

    /// Run a layout command, tear down what it closed and start what it added.
    ///
    /// Returns the closed pane ids.
    pub fn apply(
        &mut self,
        project_id: &str,
        command: &LayoutCommand,
        now: Instant,
    ) -> Result<Vec<PaneId>> {
        let closed = self.store_mut(project_id)?.apply(command);
        debug_log!("WORKSPACE", "{:?} closed {:?}", command, closed);
        self.release_closed(project_id, &closed);
        self.reconcile(project_id, now);
        Ok(closed)
    }

    /// Begin dragging a pane. Refused while another drag is in flight.
    pub fn start_drag(&mut self, pane_id: &str) -> bool {
        self.drag.start(pane_id)
    }

    /// Drop the dragged pane on `over_id`
    pub fn end_drag(
        &mut self,
        project_id: &str,
        over_id: Option<&str>,
        now: Instant,
    ) -> Result<()> {
        let Some(active) = self.drag.active().map(str::to_string) else {
            self.drag.cancel();
            return Ok(());
        };
        let result = self.apply(
            project_id,
            &LayoutCommand::DragEnd {
                active_id: active,
                over_id: over_id.map(str::to_string),
            },
            now,
        );
        self.drag.cancel();
        result.map(|_| ())
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Pointer pressed on a divider
    pub fn begin_resize(
        &mut self,
        project_id: &str,
        target: ResizeTarget,
        pos: f64,
        container: f64,
    ) {
        self.resize = Some(ActiveResize {
            project_id: project_id.to_string(),
            drag: ResizeDrag::begin(target, pos, container),
        });
    }

    /// Pointer moved during a divider drag; the layout is committed every move
    pub fn update_resize(&mut self, pos: f64) -> bool {
        let Some(active) = self.resize.as_mut() else {
            return false;
        };
        let Some(store) = self.stores.get_mut(&active.project_id) else {
            return false;
        };
        let Some(current) = store.current() else {
            return false;
        };
        let next = active.drag.update(current, pos);
        store.commit(next)
    }

    /// Pointer released
    pub fn end_resize(&mut self) {
        self.resize = None;
    }

    /// Maximize a pane, or restore the tree if it is already maximized.
    ///
    /// Sessions are only remounted, never restarted.
    pub fn toggle_maximize(&mut self, project_id: &str, pane_id: &str, now: Instant) -> bool {
        let is_pane = self
            .layout(project_id)
            .is_some_and(|l| l.find_pane(pane_id).is_some());
        if !is_pane {
            return false;
        }
        let maximized = if self.maximized(project_id) == Some(pane_id) {
            self.maximized.remove(project_id);
            false
        } else {
            self.maximized
                .insert(project_id.to_string(), pane_id.to_string());
            true
        };
        self.reconcile(project_id, now);
        maximized
    }

    /// Save the working layout into the config (and to disk if a path is set)
    pub fn persist(&mut self, project_id: &str) -> Result<()> {
        let layout = self
            .store_mut(project_id)?
            .persist()
            .with_context(|| format!("project '{}' has no working layout", project_id))?;
        let project = self
            .config
            .project_mut(project_id)
            .ok_or_else(|| anyhow!("unknown project '{}'", project_id))?;
        project.active_layout_id = Some(layout.id.clone());
        project.store_layout(layout);
        if let Some(path) = &self.config_path {
            self.config
                .save_to(path)
                .with_context(|| format!("failed to save {}", path.display()))?;
        }
        debug_info!("WORKSPACE", "Persisted layout of {}", project_id);
        Ok(())
    }

    /// Drop unsaved edits; sessions of panes that only existed in them end
    pub fn discard(&mut self, project_id: &str, now: Instant) -> Result<Vec<PaneId>> {
        let dropped = self.store_mut(project_id)?.discard();
        self.release_closed(project_id, &dropped);
        self.reconcile(project_id, now);
        Ok(dropped)
    }

    /// Close a project: all its sessions end
    pub fn remove_project(&mut self, project_id: &str) -> usize {
        self.stores.remove(project_id);
        self.maximized.remove(project_id);
        self.queued.retain(|k, _| !k.belongs_to(project_id));
        let released = self.registry.release_project(project_id);
        debug_info!("WORKSPACE", "Removed project {} ({} sessions)", project_id, released);
        released
    }

    /// Send input to a pane's session
    pub fn write(&self, key: &SessionKey, data: &[u8]) {
        self.registry.write(key, data);
    }

    /// The pane's container changed size
    pub fn resize_session(&mut self, key: &SessionKey, cols: u16, rows: u16, now: Instant) {
        self.registry.request_resize(key, cols, rows, now);
    }

    /// The user focused a pane
    pub fn acknowledge(&mut self, key: &SessionKey) {
        if self.registry.acknowledge(key).is_some() {
            self.refresh_title(&key.project_id);
        }
    }

    pub fn summary(&self, project_id: &str) -> ProjectStatusSummary {
        self.registry.summary(project_id)
    }

    pub fn handle_output(&mut self, event: PtyEvent, now: Instant) {
        self.registry.dispatch(event, now);
    }

    pub fn on_frame(&mut self) -> usize {
        self.registry.on_frame()
    }

    /// Run due timers and notify about status edges
    pub fn on_tick(&mut self, now: Instant) -> Vec<StatusEvent> {
        let changes = self.registry.on_tick(now);
        let mut events = Vec::new();
        let mut touched: Vec<ProjectId> = Vec::new();
        for change in &changes {
            if !touched.contains(&change.key.project_id) {
                touched.push(change.key.project_id.clone());
            }
            debug_log!(
                "WORKSPACE",
                "Session {}: {} -> {}",
                change.key,
                change.transition.from,
                change.transition.to
            );
            let Some(event) = StatusEvent::from_change(change) else {
                continue;
            };
            let (project_name, pane_name) = self.names(event.key());
            self.notifier.dispatch(&event, &project_name, &pane_name);
            events.push(event);
        }
        for project_id in touched {
            self.refresh_title(&project_id);
        }
        events
    }

    fn names(&self, key: &SessionKey) -> (String, String) {
        let project_name = self
            .config
            .project(&key.project_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| key.project_id.clone());
        let pane_name = self
            .layout(&key.project_id)
            .and_then(|l| l.find_pane(&key.pane_id))
            .map(|pane| {
                pane.display_name(self.config.profile(&pane.profile_id))
                    .to_string()
            })
            .unwrap_or_else(|| key.pane_id.clone());
        (project_name, pane_name)
    }

    fn refresh_title(&mut self, project_id: &str) {
        let summary = self.registry.summary(project_id);
        let name = self
            .config
            .project(project_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| project_id.to_string());
        self.notifier.update_title(&name, &summary);
    }

    /// End every session. Returns how many were released.
    pub fn shutdown(&mut self) -> usize {
        self.drag.cancel();
        self.resize = None;
        let released = self.registry.release_all();
        debug_info!("WORKSPACE", "Shut down {} sessions", released);
        released
    }
}
