use crate::executor::ExecutionResult;
use crate::runtime::Runtime;
use anyhow::Result;

/// Raised by `exit` and `quit` to stop the read loop.
///
/// The executor downcasts it and turns it into
/// [`Continuation::Terminate`](crate::executor::Continuation::Terminate).
/// Background jobs still in the registry are left running.
#[derive(Debug)]
pub struct ExitSignal {
    pub abandoned_jobs: usize,
}

impl std::fmt::Display for ExitSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exit ({} background jobs abandoned)", self.abandoned_jobs)
    }
}

impl std::error::Error for ExitSignal {}

/// Farewell line printed when the interpreter is asked to leave.
pub const FAREWELL: &str = "Goodbye";

/// Implementation of the `exit` builtin (also registered as `quit`)
///
/// Usage:
///   exit
///
/// Arguments are ignored; the interpreter always leaves with status 0.
pub fn builtin_exit(_args: &[String], runtime: &mut Runtime) -> Result<ExecutionResult> {
    Err(anyhow::Error::new(ExitSignal {
        abandoned_jobs: runtime.jobs().len(),
    }))
}
