use crate::executor::{Continuation, Executor};
use crate::input::{LineSource, ReadOutcome};
use crate::prompt::FlushPrompt;
use crate::signal::SignalHandler;
use std::io;
use tracing::debug;

/// Printed by the binary when stdin runs dry.
pub const END_OF_INPUT_NOTICE: &str = "flush: EOF signal is received";

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    EndOfInput,
    ExitBuiltin,
    /// SIGTERM or SIGHUP, carrying the process exit code.
    Signal(i32),
}

impl LoopExit {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoopExit::EndOfInput | LoopExit::ExitBuiltin => 0,
            LoopExit::Signal(code) => *code,
        }
    }
}

/// Read, execute, repeat.
///
/// Finished background jobs are reported at the top of every iteration,
/// before the next line is read. Read errors end the loop as `Err`.
pub fn run(
    source: &mut dyn LineSource,
    executor: &mut Executor,
    prompt: &FlushPrompt,
    signals: &SignalHandler,
) -> io::Result<LoopExit> {
    loop {
        if signals.should_shutdown() {
            debug!(signal = signals.signal_number(), "shutdown requested");
            return Ok(LoopExit::Signal(signals.exit_code()));
        }
        if signals.take_interrupted() {
            debug!("interrupted");
        }

        executor.reap_jobs();

        match source.read_line(prompt)? {
            ReadOutcome::Line(line) => {
                if executor.execute_line(&line) == Continuation::Terminate {
                    return Ok(LoopExit::ExitBuiltin);
                }
            }
            ReadOutcome::Interrupted => continue,
            ReadOutcome::EndOfInput => return Ok(LoopExit::EndOfInput),
        }
    }
}
