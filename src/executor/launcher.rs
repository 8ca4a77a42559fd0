use crate::error::ShellError;
use crate::jobs::{ExitReport, JobRegistry};
use crate::parser::ast::{CommandSpec, PipelineSpec};
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{close, dup2, execvp, fork, ForkResult, Pid};
use std::convert::Infallible;
use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, RawFd};
use tracing::{debug, error};

const STDIN_FD: RawFd = 0;
const STDOUT_FD: RawFd = 1;

/// Where a child's standard input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Inherit,
    File(String),
    Pipe(RawFd),
}

/// Where a child's standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Inherit,
    File(String),
    Pipe(RawFd),
}

/// Descriptor wiring for one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoPlan {
    pub stdin: Source,
    pub stdout: Sink,
    /// Inherited descriptors the child closes before exec.
    pub close: Vec<RawFd>,
}

impl IoPlan {
    /// File redirections only, taken straight from the command.
    pub fn for_command(command: &CommandSpec) -> Self {
        Self {
            stdin: command
                .input_path
                .clone()
                .map_or(Source::Inherit, Source::File),
            stdout: command
                .output_path
                .clone()
                .map_or(Sink::Inherit, Sink::File),
            close: Vec::new(),
        }
    }
}

/// What the parent did with a launched line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// Reports in stage order, first stage first.
    Foreground(Vec<ExitReport>),
    Background(Pid),
}

/// Everything the child needs, converted before `fork` so the child only
/// touches descriptors.
struct Prepared {
    program: CString,
    argv: Vec<CString>,
    stdin: Option<(String, CString)>,
    stdout: Option<(String, CString)>,
    plan: IoPlan,
}

impl Prepared {
    fn new(command: &CommandSpec, plan: IoPlan) -> Result<Self, ShellError> {
        let argv = command
            .args
            .iter()
            .map(|arg| c_string(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let stdin = match &plan.stdin {
            Source::File(path) => Some((path.clone(), c_string(path)?)),
            _ => None,
        };
        let stdout = match &plan.stdout {
            Sink::File(path) => Some((path.clone(), c_string(path)?)),
            _ => None,
        };

        Ok(Self {
            program: c_string(&command.program)?,
            argv,
            stdin,
            stdout,
            plan,
        })
    }

    fn describe(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

fn c_string(text: &str) -> Result<CString, ShellError> {
    CString::new(text).map_err(|_| ShellError::InvalidArgument(text.to_string()))
}

/// Run one parsed line.
///
/// Foreground commands are waited for before returning. A background single
/// command is registered in `jobs` under `command_line` and left running.
pub fn launch(
    spec: &PipelineSpec,
    command_line: &str,
    jobs: &mut JobRegistry,
) -> Result<Launch, ShellError> {
    match spec {
        PipelineSpec::Single(command) => {
            let prepared = Prepared::new(command, IoPlan::for_command(command))?;
            let pid = spawn(&prepared)?;

            if command.background {
                jobs.register(pid, command_line);
                Ok(Launch::Background(pid))
            } else {
                Ok(Launch::Foreground(vec![wait_for(pid)?]))
            }
        }
        PipelineSpec::Pair { first, second } => launch_pair(first, second),
    }
}

fn launch_pair(first: &CommandSpec, second: &CommandSpec) -> Result<Launch, ShellError> {
    let (reader, writer) = os_pipe::pipe().map_err(ShellError::Pipe)?;
    let ends = vec![reader.as_raw_fd(), writer.as_raw_fd()];

    let mut first_plan = IoPlan::for_command(first);
    first_plan.stdout = Sink::Pipe(writer.as_raw_fd());
    first_plan.close = ends.clone();

    let mut second_plan = IoPlan::for_command(second);
    second_plan.stdin = Source::Pipe(reader.as_raw_fd());
    second_plan.close = ends;

    let first = Prepared::new(first, first_plan)?;
    let second = Prepared::new(second, second_plan)?;

    let first_pid = spawn(&first)?;
    let second_pid = spawn(&second);

    // Neither child sees EOF until every write end is gone, ours included.
    drop(reader);
    drop(writer);

    wait_pair(first_pid, second_pid, wait_for)
}

/// Wait for both stages of a pair before reporting any error.
fn wait_pair<W>(
    first_pid: Pid,
    second_pid: Result<Pid, ShellError>,
    mut wait: W,
) -> Result<Launch, ShellError>
where
    W: FnMut(Pid) -> Result<ExitReport, ShellError>,
{
    let first_report = wait(first_pid);
    let second_report = second_pid.and_then(&mut wait);

    match (first_report, second_report) {
        (Ok(first), Ok(second)) => Ok(Launch::Foreground(vec![first, second])),
        (Ok(first), Err(e)) => {
            debug!(
                pid = first_pid.as_raw(),
                code = first.code(),
                "first stage finished after second stage failed"
            );
            Err(e)
        }
        (Err(e), _) => Err(e),
    }
}

fn spawn(prepared: &Prepared) -> Result<Pid, ShellError> {
    // Anything still buffered would otherwise be written twice.
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!(pid = child.as_raw(), program = %prepared.describe(), "spawned child");
            Ok(child)
        }
        Ok(ForkResult::Child) => run_child(prepared),
        Err(e) => {
            error!(program = %prepared.describe(), error = %e, "fork failed");
            Err(ShellError::Spawn(e))
        }
    }
}

fn run_child(prepared: &Prepared) -> ! {
    let err = match exec_child(prepared) {
        Ok(never) => match never {},
        Err(e) => e,
    };

    // Raw write: another thread may have held the std stderr lock at fork time.
    let message = format!("flush: {}\n", err);
    let _ = nix::unistd::write(io::stderr(), message.as_bytes());

    unsafe { libc::_exit(err.exit_code()) }
}

fn exec_child(prepared: &Prepared) -> Result<Infallible, ShellError> {
    // Rust starts with SIGPIPE ignored and exec would keep it that way.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    if let Some((path, c_path)) = &prepared.stdin {
        let fd = open(c_path.as_c_str(), OFlag::O_RDONLY, Mode::empty())
            .map_err(|source| open_error(path, source))?;
        install(fd, STDIN_FD).map_err(|source| open_error(path, source))?;
    }

    if let Some((path, c_path)) = &prepared.stdout {
        let fd = open(
            c_path.as_c_str(),
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            Mode::from_bits_truncate(0o644),
        )
        .map_err(|source| open_error(path, source))?;
        install(fd, STDOUT_FD).map_err(|source| open_error(path, source))?;
    }

    let plan = &prepared.plan;
    if let Source::Pipe(fd) = plan.stdin {
        dup2(fd, STDIN_FD).map_err(|source| open_error("pipe", source))?;
    }
    if let Sink::Pipe(fd) = plan.stdout {
        dup2(fd, STDOUT_FD).map_err(|source| open_error("pipe", source))?;
    }
    for &fd in &plan.close {
        close(fd).map_err(|source| open_error("pipe", source))?;
    }

    execvp(&prepared.program, &prepared.argv).map_err(|source| ShellError::Exec {
        program: prepared.describe(),
        source,
    })
}

/// Move `fd` onto `target` and drop the original.
fn install(fd: RawFd, target: RawFd) -> nix::Result<()> {
    if fd != target {
        dup2(fd, target)?;
        close(fd)?;
    }
    Ok(())
}

fn open_error(path: &str, source: Errno) -> ShellError {
    ShellError::RedirectionOpen {
        path: path.to_string(),
        source,
    }
}

/// Block until `pid` terminates, retrying interrupted waits.
pub fn wait_for(pid: Pid) -> Result<ExitReport, ShellError> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(report) = ExitReport::from_wait_status(status) {
                    debug!(pid = pid.as_raw(), code = report.code(), "child finished");
                    return Ok(report);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(ShellError::Wait {
                    pid: pid.as_raw(),
                    source,
                })
            }
        }
    }
}
