//! External command execution
//!
//! Every interaction with `dig` and `speedtest` goes through the
//! [`CommandRunner`] trait so the pipeline can be driven by stub runners in
//! tests without spawning real processes.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Captured result of one finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    /// Standard output decoded as UTF-8 (lossy)
    pub stdout: String,
    /// Standard error decoded as UTF-8 (lossy)
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a command that exited 0 with the given stdout
    pub fn success<S: Into<String>>(stdout: S) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Output of a command that exited with `code` and wrote `stderr`
    pub fn failure<S: Into<String>>(code: i32, stderr: S) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with status 0
    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Capability to find and run external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve `program` to an executable on the search path
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` with `args` to completion, capturing stdout, stderr and
    /// the exit status. A non-zero exit is not an error at this level.
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Runner backed by real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let path = std::env::var_os("PATH")?;
        find_in_path(program, &path)
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::io(format!("Failed to run `{}`: {}", program, e)))?;

        Ok(output.into())
    }
}

/// Search every directory of a `PATH`-style list for an executable `program`
pub fn find_in_path(program: &str, path: &OsStr) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    // Explicit paths are not looked up.
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return is_executable(as_path).then(|| as_path.to_path_buf());
    }

    std::env::split_paths(path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidate_names(program).into_iter().map(move |name| dir.join(name)))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidate_names(program: &str) -> Vec<String> {
    vec![program.to_string(), format!("{}.exe", program)]
}

#[cfg(not(windows))]
fn candidate_names(program: &str) -> Vec<String> {
    vec![program.to_string()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
