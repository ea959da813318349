//! Utility functions for use in other parts of gowm
use crate::Result;
use std::{
    fmt,
    process::{Command, Stdio},
};
use tracing::info;

/// Run an external command
///
/// The command is split on whitespace with the first element used as the program to run.
/// This redirects the process stdout and stderr to /dev/null and does not wait for it to
/// exit.
pub fn spawn<S: Into<String>>(cmd: S) -> Result<()> {
    let s = cmd.into();
    let parts: Vec<&str> = s.split_whitespace().collect();
    let (prog, args) = match parts.split_first() {
        Some(split) => split,
        None => return Ok(()),
    };

    info!(cmd = %s, "spawning subprocess");
    Command::new(prog)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(())
}

/// Something that is able to start external programs on behalf of the window manager.
pub trait Spawn: fmt::Debug {
    /// Start `cmd` without waiting for it to complete.
    fn spawn(&self, cmd: &str) -> Result<()>;
}

/// Spawns fully detached processes using [spawn].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Detached;

impl Spawn for Detached {
    fn spawn(&self, cmd: &str) -> Result<()> {
        spawn(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawning_an_empty_command_is_a_no_op() {
        assert!(spawn("   ").is_ok());
    }

    #[test]
    fn spawning_a_missing_program_is_an_io_error() {
        let res = spawn("gowm-this-program-does-not-exist --flag");

        assert!(matches!(res, Err(crate::Error::Io(_))));
    }
}
