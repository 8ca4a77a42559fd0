//! Typed errors for the flush interpreter
//!
//! Every failure the interpreter can hit while handling a line maps to one
//! [`ShellError`] variant. Each variant carries a stable error code and the
//! status a child process exits with when the failure happens inside it.

use nix::errno::Errno;
use std::io;

/// Status a child exits with when its redirections cannot be installed.
pub const REDIRECTION_FAILURE_STATUS: i32 = 1;
/// Status a child exits with when `execvp` fails for a reason other than a missing program.
pub const EXEC_FAILURE_STATUS: i32 = 126;
/// Status a child exits with when the program was not found.
pub const COMMAND_NOT_FOUND_STATUS: i32 = 127;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("malformed redirection: {reason}")]
    MalformedRedirection { reason: String },

    #[error("malformed pipeline: {reason}")]
    MalformedPipeline { reason: String },

    #[error("{command}: {reason}")]
    ArgumentError { command: String, reason: String },

    #[error("cd: {path}: {source}")]
    DirectoryChange {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("fork failed: {0}")]
    Spawn(#[source] Errno),

    #[error("pipe failed: {0}")]
    Pipe(#[source] io::Error),

    #[error("{path}: {source}")]
    RedirectionOpen {
        path: String,
        #[source]
        source: Errno,
    },

    #[error("{program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: Errno,
    },

    #[error("wait failed for pid {pid}: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: Errno,
    },

    #[error("invalid argument '{0}': contains a NUL byte")]
    InvalidArgument(String),
}

impl ShellError {
    pub fn malformed_redirection(reason: impl Into<String>) -> Self {
        Self::MalformedRedirection {
            reason: reason.into(),
        }
    }

    pub fn malformed_pipeline(reason: impl Into<String>) -> Self {
        Self::MalformedPipeline {
            reason: reason.into(),
        }
    }

    /// Stable identifier for the error category
    pub fn error_code(&self) -> &'static str {
        match self {
            ShellError::MalformedRedirection { .. } => "MALFORMED_REDIRECTION",
            ShellError::MalformedPipeline { .. } => "MALFORMED_PIPELINE",
            ShellError::ArgumentError { .. } => "ARGUMENT_ERROR",
            ShellError::DirectoryChange { .. } => "DIRECTORY_CHANGE_ERROR",
            ShellError::Spawn(_) => "SPAWN_ERROR",
            ShellError::Pipe(_) => "PIPE_ERROR",
            ShellError::RedirectionOpen { .. } => "REDIRECTION_OPEN_ERROR",
            ShellError::Exec { .. } => "EXEC_ERROR",
            ShellError::Wait { .. } => "WAIT_ERROR",
            ShellError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }

    /// Exit status used when this error terminates a child process.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Exec { source, .. } if *source == Errno::ENOENT => COMMAND_NOT_FOUND_STATUS,
            ShellError::Exec { .. } => EXEC_FAILURE_STATUS,
            _ => REDIRECTION_FAILURE_STATUS,
        }
    }
}
