//! Headless event loop.
//!
//! One task drives the whole workspace: PTY output is queued as it arrives,
//! rendered on the frame tick and classified on the timer tick. Callbacks
//! never overlap, so no state here needs a lock.

use super::Workspace;
use crate::debug_trace;
use aterm_terminal::PtyEventReceiver;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval};

/// Granularity of debounce, injection and status timers
pub const TIMER_RESOLUTION: Duration = Duration::from_millis(20);

/// Run until `shutdown` resolves or every backend is gone.
///
/// Sessions are left running; call [`Workspace::shutdown`] afterwards.
pub async fn run(
    workspace: &mut Workspace,
    mut events: PtyEventReceiver,
    shutdown: impl Future<Output = ()>,
) {
    let frame_interval = workspace.config().io.frame_interval();
    let mut frame = interval(frame_interval.max(Duration::from_millis(1)));
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut timer = interval(TIMER_RESOLUTION);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => {
                log::info!("Shutdown requested");
                break;
            }
            event = events.recv() => match event {
                Some(event) => workspace.handle_output(event, Instant::now().into_std()),
                None => {
                    log::warn!("PTY event channel closed");
                    break;
                }
            },
            _ = frame.tick() => {
                let flushed = workspace.on_frame();
                if flushed > 0 {
                    debug_trace!("EVENT_LOOP", "Rendered {} sessions", flushed);
                }
            }
            _ = timer.tick() => {
                for event in workspace.on_tick(Instant::now().into_std()) {
                    log::debug!("Status event: {:?}", event);
                }
            }
        }
    }
    // Render whatever arrived before the loop stopped
    workspace.on_frame();
}
