//! External program execution
//!
//! Everything the tool asks the host to do (k3d, sudo, the pager) is an
//! [`Invocation`] handed to a [`CommandRunner`].

use crate::error::{ClusterError, ClusterResult};
use std::fmt;
use std::process::Command;
use tracing::debug;

/// One external program run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run, looked up on `PATH`
    pub program: String,
    /// Arguments, passed as-is
    pub args: Vec<String>,
    /// Attach to the terminal instead of capturing output
    pub attached: bool,
}

impl Invocation {
    /// Captured-output invocation
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            attached: false,
        }
    }

    /// Run attached to the terminal
    pub fn attached(mut self) -> Self {
        self.attached = true;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs external programs
pub trait CommandRunner {
    /// Run to completion; a non-zero exit is an error
    fn run(&mut self, invocation: &Invocation) -> ClusterResult<()>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, invocation: &Invocation) -> ClusterResult<()> {
        (**self).run(invocation)
    }
}

/// Runs programs on the host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> ClusterResult<()> {
        debug!("Running: {}", invocation);
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);

        let spawn_error = |source| ClusterError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        let (status, stderr) = if invocation.attached {
            (command.status().map_err(spawn_error)?, String::new())
        } else {
            let output = command.output().map_err(spawn_error)?;
            (
                output.status,
                String::from_utf8_lossy(&output.stderr).into_owned(),
            )
        };

        if status.success() {
            Ok(())
        } else {
            Err(ClusterError::CommandFailed {
                command: invocation.to_string(),
                status: status.code(),
                stderr,
            })
        }
    }
}

/// Records invocations instead of running them
///
/// Programs registered with [`RecordingRunner::fail_on`] are recorded and
/// then reported as failed.
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    invocations: Vec<Invocation>,
    failing: Vec<String>,
}

impl RecordingRunner {
    /// Empty recorder where every invocation succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every invocation whose command line starts with `prefix`
    pub fn fail_on(mut self, prefix: impl Into<String>) -> Self {
        self.failing.push(prefix.into());
        self
    }

    /// Everything run so far, in order
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// Command lines run so far, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations.iter().map(|i| i.to_string()).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, invocation: &Invocation) -> ClusterResult<()> {
        self.invocations.push(invocation.clone());
        let line = invocation.to_string();
        if self.failing.iter().any(|prefix| line.starts_with(prefix.as_str())) {
            return Err(ClusterError::CommandFailed {
                command: line,
                status: Some(1),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}
