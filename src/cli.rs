//! Command-line interface for aterm.

use anyhow::{Context, Result};
use aterm_config::{Config, Layout};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// aterm - terminal-multiplexing workspace with agent status tracking
#[derive(Parser, Debug)]
#[command(name = "aterm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.config/aterm/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_level)]
    pub log_level: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start every pane of a project and track their status until Ctrl-C
    Run {
        /// Project id
        project: String,

        /// Layout id to activate instead of the project's active one
        #[arg(long, value_name = "ID")]
        layout: Option<String>,

        /// Task prompt typed into the first pane once it settles
        #[arg(long, value_name = "TEXT")]
        prompt: Option<String>,

        /// Exit after the specified number of seconds
        #[arg(long, value_name = "SECONDS", value_parser = parse_seconds)]
        exit_after: Option<Duration>,
    },
    /// Print a project's active layout
    Layout {
        /// Project id
        project: String,
    },
    /// Load and validate the configuration
    Check,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse()
        .map_err(|_| format!("invalid log level '{s}' (off, error, warn, info, debug, trace)"))
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{s}': {e}"))
}

/// Load the config from `path`, or the default location
pub fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Config::config_path);
    let config = Config::load_from(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    Ok((config, path))
}

/// Human-readable tree of a layout
pub fn render_layout(layout: &Layout, config: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} rows, {} panes)",
        layout.name,
        layout.rows.len(),
        layout.pane_count()
    );
    for (i, row) in layout.rows.iter().enumerate() {
        let _ = writeln!(out, "  row {} [flex {:.2}]", i + 1, row.flex);
        for pane in &row.panes {
            let profile = config.profile(&pane.profile_id);
            let _ = writeln!(
                out,
                "    {} [flex {:.2}] {}",
                pane.display_name(profile),
                pane.flex,
                pane.id
            );
        }
    }
    out
}

/// Summary printed by `aterm check`
pub fn check_report(config: &Config) -> String {
    let panes: usize = config
        .projects
        .iter()
        .flat_map(|p| p.layouts.iter())
        .map(Layout::pane_count)
        .sum();
    format!(
        "ok: {} profiles, {} projects, {} panes",
        config.profiles.len(),
        config.projects.len(),
        panes
    )
}
