//! Required external tool checks

use crate::error::{AppError, Result};
use crate::runner::CommandRunner;

/// An external executable the pipeline shells out to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    /// Command name looked up on the search path
    pub command: &'static str,
    /// Message shown when the command is missing
    pub hint: &'static str,
}

/// Tools needed for a full run, in the order they are reported
pub const REQUIRED_DEPENDENCIES: &[Dependency] = &[
    Dependency {
        command: crate::defaults::DIG_COMMAND,
        hint: "Missing `dig`",
    },
    Dependency {
        command: crate::defaults::SPEEDTEST_COMMAND,
        hint: "Missing `speedtest` (https://www.speedtest.net/apps/cli)",
    },
];

/// Return the dependencies that `runner` cannot locate
pub fn find_missing<'a, R>(runner: &R, dependencies: &'a [Dependency]) -> Vec<&'a Dependency>
where
    R: CommandRunner + ?Sized,
{
    dependencies
        .iter()
        .filter(|dep| runner.locate(dep.command).is_none())
        .collect()
}

/// Verify every dependency is installed.
///
/// All missing tools are reported at once, one hint per line. Nothing is
/// executed.
pub fn check_dependencies<R>(runner: &R, dependencies: &[Dependency]) -> Result<()>
where
    R: CommandRunner + ?Sized,
{
    let missing = find_missing(runner, dependencies);
    if missing.is_empty() {
        return Ok(());
    }

    let message = missing
        .iter()
        .map(|dep| dep.hint)
        .collect::<Vec<_>>()
        .join("\n");
    Err(AppError::missing_dependency(message))
}
