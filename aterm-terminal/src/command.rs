//! Spawn request construction: local login shells and SSH/tmux remotes.

use aterm_config::RemoteHost;
use portable_pty::CommandBuilder;

/// Resolve the user's login shell
pub fn default_shell() -> String {
    std::env::var("SHELL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "/bin/sh".to_string())
}

/// Where the session's process runs
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnTarget {
    /// A login shell on this machine
    Local,
    /// An SSH connection attaching to (or creating) a named tmux session
    Remote {
        host: RemoteHost,
        tmux_session: String,
    },
}

/// Everything needed to start one session's process
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub cwd: String,
    pub cols: u16,
    pub rows: u16,
    /// Command run before the interactive shell takes over
    pub command: Option<String>,
    pub target: SpawnTarget,
}

/// A fully resolved program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for local processes
    pub cwd: Option<String>,
    pub env: Vec<(String, String)>,
}

impl SpawnRequest {
    /// Resolve the program and arguments for this request.
    ///
    /// Local sessions run `SHELL -l -i`, or `SHELL -l -i -c "CMD; exec SHELL -l -i"`
    /// so the shell survives the command exiting. Remote sessions run
    /// `ssh -t ... user@host "tmux new-session -A -s NAME -c DIR [CMD]"`.
    pub fn command_line(&self, shell: &str) -> CommandLine {
        let env = vec![("TERM".to_string(), "xterm-256color".to_string())];
        match &self.target {
            SpawnTarget::Local => {
                let mut args = vec!["-l".to_string(), "-i".to_string()];
                if let Some(command) = self.command.as_deref().filter(|c| !c.trim().is_empty()) {
                    args.push("-c".to_string());
                    args.push(format!("{}; exec {} -l -i", command, shell));
                }
                CommandLine {
                    program: shell.to_string(),
                    args,
                    cwd: Some(self.cwd.clone()),
                    env,
                }
            }
            SpawnTarget::Remote { host, tmux_session } => {
                let remote_cwd = host.remote_path.as_deref().unwrap_or(&self.cwd);
                let mut tmux = vec![
                    "tmux",
                    "new-session",
                    "-A",
                    "-s",
                    tmux_session.as_str(),
                    "-c",
                    remote_cwd,
                ];
                if let Some(command) = self.command.as_deref().filter(|c| !c.trim().is_empty()) {
                    tmux.push(command);
                }
                let tmux_cmd = shell_words::join(tmux);

                let mut args = vec![
                    "-t".to_string(),
                    "-o".to_string(),
                    "StrictHostKeyChecking=accept-new".to_string(),
                    "-p".to_string(),
                    host.port.to_string(),
                ];
                if let Some(key) = &host.key_path {
                    args.push("-i".to_string());
                    args.push(key.clone());
                }
                args.push(format!("{}@{}", host.user, host.host));
                args.push(tmux_cmd);

                CommandLine {
                    program: "ssh".to_string(),
                    args,
                    cwd: None,
                    env,
                }
            }
        }
    }
}

impl CommandLine {
    /// Build the portable-pty command
    pub fn to_builder(&self) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.cwd(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}
