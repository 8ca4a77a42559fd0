pub mod launcher;

use crate::builtins::{Builtins, ExitSignal, FAREWELL};
use crate::error::ShellError;
use crate::parser::ast::PipelineSpec;
use crate::parser::Parser;
use crate::runtime::Runtime;
use launcher::Launch;
use std::io::{self, Write};
use tracing::{debug, warn};

/// What the read loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// An external command ran (or the line was blank or rejected).
    Continue,
    ContinueAfterBuiltin,
    Terminate,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub exit_code: i32,
}

impl ExecutionResult {
    pub fn success(stdout: String) -> Self {
        Self {
            stdout,
            exit_code: 0,
        }
    }
}

/// Per-line entry point: parse, dispatch built-ins, launch the rest.
///
/// Status lines and built-in output go to `out`; diagnostics go to `err` as
/// a single `flush: <message>` line each.
pub struct Executor {
    runtime: Runtime,
    builtins: Builtins,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_output(out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self {
            runtime: Runtime::new(),
            builtins: Builtins::new(),
            out,
            err,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn execute_line(&mut self, line: &str) -> Continuation {
        let command_line = line.trim_end_matches(['\n', '\r']);

        let spec = match Parser::parse_line(line) {
            Ok(Some(spec)) => spec,
            Ok(None) => return Continuation::Continue,
            Err(e) => {
                debug!(code = e.error_code(), "rejected line");
                self.report_error(&e);
                return Continuation::Continue;
            }
        };

        if self.builtins.is_builtin(&spec.head().program) {
            return self.run_builtin(&spec);
        }

        if spec.is_pipeline() && spec.is_background() {
            warn!(line = command_line, "pipelines always run in the foreground, ignoring '&'");
        }

        match launcher::launch(&spec, command_line, self.runtime.jobs_mut()) {
            Ok(Launch::Foreground(reports)) => {
                for report in reports {
                    self.write_out(&report.describe(command_line));
                }
            }
            Ok(Launch::Background(pid)) => {
                debug!(pid = pid.as_raw(), line = command_line, "started in background");
            }
            Err(e) => {
                debug!(code = e.error_code(), "launch failed");
                self.report_error(&e);
            }
        }

        Continuation::Continue
    }

    fn run_builtin(&mut self, spec: &PipelineSpec) -> Continuation {
        let head = spec.head();
        debug!(builtin = %head.program, "running builtin");

        match self
            .builtins
            .execute(&head.program, head.operands(), &mut self.runtime)
        {
            Ok(result) => {
                if !result.stdout.is_empty() {
                    let _ = self.out.write_all(result.stdout.as_bytes());
                    let _ = self.out.flush();
                }
                Continuation::ContinueAfterBuiltin
            }
            Err(e) => {
                if let Some(signal) = e.downcast_ref::<ExitSignal>() {
                    if signal.abandoned_jobs > 0 {
                        debug!(jobs = signal.abandoned_jobs, "leaving background jobs running");
                    }
                    self.write_out(FAREWELL);
                    return Continuation::Terminate;
                }
                debug!(code = error_code(&e).unwrap_or("BUILTIN_ERROR"), "builtin failed");
                self.report_error(&e);
                Continuation::ContinueAfterBuiltin
            }
        }
    }

    /// Poll background jobs once and print a status line for each finished one.
    pub fn reap_jobs(&mut self) -> usize {
        let completions = self.runtime.jobs_mut().reap();
        for completion in &completions {
            self.write_out(&completion.describe());
        }
        completions.len()
    }

    fn write_out(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }

    fn report_error(&mut self, error: &dyn std::fmt::Display) {
        let _ = writeln!(self.err, "flush: {}", error);
        let _ = self.err.flush();
    }
}

/// Stable code of a typed error carried inside an `anyhow::Error`.
fn error_code(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<ShellError>().map(ShellError::error_code)
}
