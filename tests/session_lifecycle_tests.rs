//! Session identity and teardown through the workspace.
//!
//! A session lives as long as its pane: layout moves and maximize only
//! remount the render surface, while close, project removal and shutdown
//! end the process exactly once from the registry's point of view.

mod common;

use aterm::layout::LayoutCommand;
use aterm::session::SessionKey;
use aterm::workspace::MAXIMIZED_CONTAINER;
use aterm_config::{Config, Project, RemoteHost};
use aterm_terminal::{PtyBackend, PtyEvent, SpawnTarget};
use common::{Harness, PROJECT, layout_of, memory_workspace, test_config};

fn key(pane_id: &str) -> SessionKey {
    SessionKey::new(PROJECT, pane_id)
}

/// Config whose project starts with rows `[A, B]` and `[C]`
fn three_pane_config() -> Config {
    let mut config = test_config();
    let layout = layout_of(&[&["A", "B"], &["C"]]);
    let project = &mut config.projects[0];
    project.active_layout_id = Some(layout.id.clone());
    project.layouts = vec![layout];
    config
}

fn three_pane_workspace() -> Harness {
    let mut harness = Harness::new(three_pane_config());
    let failed = harness
        .workspace
        .activate_project(PROJECT, None, harness.t0)
        .unwrap();
    assert_eq!(failed, 0);
    harness
}

#[test]
fn test_activation_spawns_one_session_per_pane() {
    let h = three_pane_workspace();
    assert_eq!(h.workspace.registry().len(), 3);
    for pane in ["A", "B", "C"] {
        assert_eq!(h.backend.spawn_count(&key(pane).pty_id()), 1);
    }
    let spawn = h.backend.last_spawn("p1:A").unwrap();
    assert_eq!(spawn.cwd, "/tmp/api");
    assert_eq!((spawn.cols, spawn.rows), (80, 24));
    assert_eq!(spawn.target, SpawnTarget::Local);
}

/// Dragging a pane to another row keeps its process and its scrollback
#[test]
fn test_drag_keeps_session_identity() {
    let mut h = three_pane_workspace();
    h.output("C", b"build ok\r\n", h.at(10));
    h.workspace.on_frame();
    let before = h.workspace.registry().get(&key("C")).unwrap().attach_count();

    assert!(h.workspace.start_drag("C"));
    h.workspace
        .end_drag(PROJECT, Some("row-drop-0"), h.at(20))
        .unwrap();

    let layout = h.layout();
    assert_eq!(layout.rows[0].panes[0].id, "C");
    let session = h.workspace.registry().get(&key("C")).unwrap();
    assert_eq!(h.backend.spawn_count("p1:C"), 1);
    assert_eq!(h.backend.kill_count("p1:C"), 0);
    assert_eq!(session.attach_count(), before + 1);
    assert_eq!(
        session.container(),
        Some(format!("{}/0", layout.rows[0].id).as_str())
    );
    assert_eq!(session.buffer().tail(1), vec!["build ok"]);

    // Output keeps flowing into the same buffer
    h.output("C", b"tests ok\r\n", h.at(30));
    h.workspace.on_frame();
    let session = h.workspace.registry().get(&key("C")).unwrap();
    assert_eq!(session.buffer().tail(2), vec!["build ok", "tests ok"]);
}

#[test]
fn test_second_drag_is_refused_while_one_is_in_flight() {
    let mut h = three_pane_workspace();
    assert!(h.workspace.start_drag("A"));
    assert!(!h.workspace.start_drag("B"));
    h.workspace.cancel_drag();
    assert!(h.workspace.start_drag("B"));
    h.workspace.end_drag(PROJECT, None, h.at(5)).unwrap();
    assert_eq!(h.layout().rows[0].panes[1].id, "B");
}

#[test]
fn test_maximize_remounts_without_respawning() {
    let mut h = three_pane_workspace();
    let row0 = h.layout().rows[0].id.clone();

    assert!(h.workspace.toggle_maximize(PROJECT, "B", h.at(10)));
    assert_eq!(h.workspace.maximized(PROJECT), Some("B"));
    let session = h.workspace.registry().get(&key("B")).unwrap();
    assert_eq!(session.container(), Some(MAXIMIZED_CONTAINER));
    assert_eq!(session.attach_count(), 2);

    assert!(!h.workspace.toggle_maximize(PROJECT, "B", h.at(20)));
    assert_eq!(h.workspace.maximized(PROJECT), None);
    let session = h.workspace.registry().get(&key("B")).unwrap();
    assert_eq!(session.container(), Some(format!("{row0}/1").as_str()));
    assert_eq!(session.attach_count(), 3);
    assert_eq!(h.backend.spawn_count("p1:B"), 1);

    assert!(!h.workspace.toggle_maximize(PROJECT, "ghost", h.at(30)));
}

/// Closing a pane ends its session; the other sessions are untouched
#[test]
fn test_close_releases_only_the_closed_pane() {
    let mut h = three_pane_workspace();
    let row0 = h.layout().rows[0].id.clone();
    let closed = h
        .workspace
        .apply(
            PROJECT,
            &LayoutCommand::ClosePane {
                pane_id: "A".to_string(),
                row_id: row0,
            },
            h.at(10),
        )
        .unwrap();
    assert_eq!(closed, vec!["A".to_string()]);
    assert!(!h.workspace.registry().contains(&key("A")));
    assert_eq!(h.backend.kill_count("p1:A"), 1);
    assert!(!h.backend.is_live("p1:A"));
    for pane in ["B", "C"] {
        assert!(h.workspace.registry().contains(&key(pane)));
        assert_eq!(h.backend.kill_count(&key(pane).pty_id()), 0);
    }
}

#[test]
fn test_split_starts_a_session_for_the_new_pane() {
    let mut h = memory_workspace();
    let row = h.layout().rows[0].id.clone();
    let first = h.layout().rows[0].panes[0].id.clone();
    h.workspace
        .apply(
            PROJECT,
            &LayoutCommand::SplitVertical {
                pane_id: first.clone(),
                row_id: row,
                profile_id: "git".to_string(),
            },
            h.at(10),
        )
        .unwrap();
    let added = h.layout().rows[0].panes[1].id.clone();
    assert!(h.workspace.registry().contains(&key(&added)));
    assert_eq!(h.backend.spawn_count(&key(&first).pty_id()), 1);
    assert_eq!(h.backend.spawn_count(&key(&added).pty_id()), 1);
}

/// Release is safe to repeat and always asks the backend to kill
#[test]
fn test_release_twice_is_harmless() {
    let mut h = memory_workspace();
    let pane = h.layout().rows[0].panes[0].id.clone();
    let k = key(&pane);

    assert!(h.workspace.registry_mut().release(&k));
    assert!(!h.workspace.registry_mut().release(&k));
    assert_eq!(h.backend.kill_count(&k.pty_id()), 2);
    assert!(!h.workspace.registry().contains(&k));
    assert!(h.workspace.registry().is_empty());
}

/// Late output for a released session is dropped, not resurrected
#[test]
fn test_output_after_release_is_dropped() {
    let mut h = memory_workspace();
    let pane = h.layout().rows[0].panes[0].id.clone();
    let k = key(&pane);
    let generation = h.workspace.registry().get(&k).unwrap().generation();
    h.workspace.registry_mut().release(&k);

    h.workspace.handle_output(
        PtyEvent::Output {
            id: k.pty_id(),
            generation,
            data: b"late".to_vec(),
        },
        h.at(10),
    );
    assert_eq!(h.workspace.on_frame(), 0);
    assert!(!h.workspace.registry().contains(&k));
}

#[test]
fn test_exit_marks_session_without_removing_it() {
    let mut h = memory_workspace();
    let pane = h.layout().rows[0].panes[0].id.clone();
    let k = key(&pane);
    assert!(h.backend.emit_exit(&k.pty_id()));
    h.pump(h.at(10));
    let session = h.workspace.registry().get(&k).unwrap();
    assert!(session.is_exited());
    assert_eq!(h.backend.kill_count(&k.pty_id()), 0);
}

/// A replaced process's late events never reach the session now using its id
#[test]
fn test_stale_events_skip_a_respawned_session() {
    let mut h = three_pane_workspace();
    let k = key("A");
    let old = h.workspace.registry().get(&k).unwrap().generation();

    assert_eq!(h.workspace.remove_project(PROJECT), 3);
    h.workspace.activate_project(PROJECT, None, h.at(10)).unwrap();
    let session = h.workspace.registry().get(&k).unwrap();
    assert_ne!(session.generation(), old);
    assert_eq!(h.backend.spawn_count("p1:A"), 2);

    for event in [
        PtyEvent::Output {
            id: k.pty_id(),
            generation: old,
            data: b"from the old shell\r\n".to_vec(),
        },
        PtyEvent::Exited {
            id: k.pty_id(),
            generation: old,
        },
    ] {
        h.workspace.handle_output(event, h.at(20));
    }
    assert_eq!(h.workspace.on_frame(), 0);
    let session = h.workspace.registry().get(&k).unwrap();
    assert!(!session.is_exited());
    assert!(session.buffer().is_empty());

    // The live process still gets through
    h.output("A", b"fresh\r\n", h.at(30));
    h.workspace.on_frame();
    let session = h.workspace.registry().get(&k).unwrap();
    assert_eq!(session.buffer().tail(1), vec!["fresh"]);
}

/// A failed spawn leaves no entry and is retried on the next reconcile
#[test]
fn test_spawn_failure_is_retried() {
    let mut h = memory_workspace();
    let row = h.layout().rows[0].id.clone();
    h.backend.set_fail_spawn(true);
    h.workspace
        .apply(
            PROJECT,
            &LayoutCommand::SplitHorizontal {
                row_id: row,
                profile_id: "shell".to_string(),
            },
            h.at(10),
        )
        .unwrap();
    let added = h.layout().rows[1].panes[0].id.clone();
    assert!(!h.workspace.registry().contains(&key(&added)));

    h.backend.set_fail_spawn(false);
    assert_eq!(h.workspace.reconcile(PROJECT, h.at(20)), 0);
    assert!(h.workspace.registry().contains(&key(&added)));
    assert_eq!(h.workspace.registry().len(), 2);
}

#[test]
fn test_remove_project_and_shutdown() {
    let mut config = three_pane_config();
    config
        .projects
        .push(Project::new("p2", "web", "/tmp/web", "shell"));
    let mut h = Harness::new(config);
    h.workspace.activate_project(PROJECT, None, h.t0).unwrap();
    h.workspace.activate_project("p2", None, h.t0).unwrap();
    assert_eq!(h.workspace.registry().len(), 4);

    assert_eq!(h.workspace.remove_project(PROJECT), 3);
    assert_eq!(h.workspace.registry().len(), 1);
    assert!(h.workspace.layout(PROJECT).is_none());
    assert_eq!(h.backend.kill_count("p1:A"), 1);

    assert_eq!(h.workspace.shutdown(), 1);
    assert!(h.workspace.registry().is_empty());
    assert_eq!(h.backend.active_count(), 0);
}

/// Remote projects spawn over SSH into a per-pane tmux session
#[test]
fn test_remote_project_spawn_request() {
    let mut config = test_config();
    config.projects[0].remote = Some(RemoteHost {
        host: "dev.example.com".to_string(),
        port: 2222,
        user: "me".to_string(),
        key_path: None,
        remote_path: Some("/srv/api".to_string()),
        tmux_session_prefix: "aterm".to_string(),
    });
    let mut h = Harness::new(config);
    h.workspace.activate_project(PROJECT, None, h.t0).unwrap();
    let pane = h.layout().rows[0].panes[0].id.clone();

    let spawn = h.backend.last_spawn(&key(&pane).pty_id()).unwrap();
    match spawn.target {
        SpawnTarget::Remote { host, tmux_session } => {
            assert_eq!(host.host, "dev.example.com");
            assert_eq!(host.port, 2222);
            assert_eq!(tmux_session, format!("aterm-{pane}"));
        }
        other => panic!("expected a remote spawn, got {other:?}"),
    }
}
