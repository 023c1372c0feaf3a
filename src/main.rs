use anyhow::{Context, Result, bail};
use aterm::cli::{self, Cli, Commands};
use aterm::session::SessionKey;
use aterm::status::Notifier;
use aterm::workspace::{Workspace, event_loop};
use aterm_terminal::{NativePtyBackend, event_channel};
use clap::Parser;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI --log-level takes precedence over RUST_LOG, which beats the config.
    // The config is not loaded yet, so start from the CLI/env level and
    // adjust once it is.
    let rust_log = std::env::var("RUST_LOG").ok();
    let early = aterm::debug::resolve_level(
        cli.log_level,
        rust_log.as_deref(),
        log::LevelFilter::Warn,
    );
    aterm::debug::init_log_bridge(early);

    let (config, config_path) = cli::load_config(cli.config.as_deref())?;
    aterm::debug::set_level(aterm::debug::resolve_level(
        cli.log_level,
        rust_log.as_deref(),
        config.log_level.to_level_filter(),
    ));
    log::info!("Starting aterm {} with {}", aterm::VERSION, config_path.display());

    match cli.command {
        Commands::Check => {
            println!("{}", cli::check_report(&config));
            Ok(())
        }
        Commands::Layout { project } => {
            let layout = config
                .project(&project)
                .and_then(|p| p.active_layout())
                .with_context(|| format!("no layout for project '{project}'"))?;
            print!("{}", cli::render_layout(layout, &config));
            Ok(())
        }
        Commands::Run {
            project,
            layout,
            prompt,
            exit_after,
        } => run(config, config_path, &project, layout.as_deref(), prompt, exit_after),
    }
}

fn run(
    config: aterm_config::Config,
    config_path: std::path::PathBuf,
    project_id: &str,
    layout_id: Option<&str>,
    prompt: Option<String>,
    exit_after: Option<Duration>,
) -> Result<()> {
    let Some(project) = config.project(project_id) else {
        bail!("unknown project '{project_id}'");
    };
    let layout = match layout_id {
        Some(id) => project.layouts.iter().find(|l| l.id == id),
        None => project.active_layout(),
    };
    let first_pane = layout
        .and_then(|l| l.panes().next())
        .map(|p| p.id.clone());

    let runtime = Runtime::new()?;
    let (tx, rx) = event_channel();
    let notifier = Notifier::from_config(&config.notifications);
    let mut workspace = Workspace::new(config, Arc::new(NativePtyBackend::new(tx)), notifier)
        .with_config_path(config_path);

    if let (Some(prompt), Some(pane_id)) = (prompt, first_pane) {
        workspace.queue_input(SessionKey::new(project_id, pane_id), None, Some(prompt));
    }
    let failed = workspace.activate_project(project_id, layout_id, Instant::now())?;
    if failed > 0 {
        log::warn!("{} panes failed to start", failed);
    }

    runtime.block_on(async {
        let shutdown = async {
            match exit_after {
                Some(limit) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = tokio::time::sleep(limit) => {}
                    }
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::error!("Failed to listen for Ctrl-C: {}", e);
                    }
                }
            }
        };
        event_loop::run(&mut workspace, rx, shutdown).await;
    });

    let released = workspace.shutdown();
    log::info!("Released {} sessions, exiting", released);
    runtime.shutdown_timeout(Duration::from_secs(2));
    Ok(())
}
