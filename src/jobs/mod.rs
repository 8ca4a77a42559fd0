use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::fmt;
use tracing::debug;

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    Exited(i32),
    Signaled(Signal),
    /// The process was already gone when polled (e.g. reaped elsewhere).
    Unknown,
}

impl ExitReport {
    /// Terminal states only; `None` for still-running, stopped or continued children.
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitReport::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitReport::Signaled(signal)),
            _ => None,
        }
    }

    /// Shell-style numeric status: the exit code, or 128 + signal number.
    pub fn code(&self) -> i32 {
        match self {
            ExitReport::Exited(code) => *code,
            ExitReport::Signaled(signal) => 128 + *signal as i32,
            ExitReport::Unknown => -1,
        }
    }

    /// One status line attributed to the command line that started the process.
    pub fn describe(&self, command_line: &str) -> String {
        match self {
            ExitReport::Exited(code) => format!("Exit status [{}] = {}", command_line, code),
            ExitReport::Signaled(signal) => {
                format!("Killed by signal [{}] = {}", command_line, signal.as_str())
            }
            ExitReport::Unknown => format!("Exit status [{}] = unknown", command_line),
        }
    }
}

/// Result of a non-blocking liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Running,
    Finished(ExitReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    /// The line as the user typed it, minus its line terminator.
    pub command_line: String,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[pid {}] {}", self.pid, self.command_line)
    }
}

/// A job observed to have terminated during a reap pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub job: Job,
    pub report: ExitReport,
}

impl Completion {
    pub fn describe(&self) -> String {
        self.report.describe(&self.job.command_line)
    }
}

/// Background jobs in spawn order.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Vec<Job>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Track a freshly spawned background process.
    pub fn register(&mut self, pid: Pid, command_line: impl Into<String>) {
        let job = Job {
            pid,
            command_line: command_line.into(),
        };
        debug!(pid = pid.as_raw(), command = %job.command_line, "registered background job");
        self.jobs.push(job);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.iter().any(|job| job.pid == pid)
    }

    /// Poll every job once with `waitpid(WNOHANG)` and remove the finished ones.
    pub fn reap(&mut self) -> Vec<Completion> {
        self.reap_with(poll_pid)
    }

    /// One pass over the registry in insertion order.
    ///
    /// Every job is polled exactly once. Finished jobs are moved out and
    /// returned in the order they were registered; the rest keep their
    /// relative order.
    pub fn reap_with<F>(&mut self, mut poll: F) -> Vec<Completion>
    where
        F: FnMut(Pid) -> Poll,
    {
        let mut finished = Vec::new();

        self.jobs.retain(|job| match poll(job.pid) {
            Poll::Running => true,
            Poll::Finished(report) => {
                debug!(pid = job.pid.as_raw(), code = report.code(), "reaped background job");
                finished.push(Completion {
                    job: job.clone(),
                    report,
                });
                false
            }
        });

        finished
    }
}

/// Non-blocking status check of one child.
pub fn poll_pid(pid: Pid) -> Poll {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => return Poll::Running,
            Ok(status) => {
                return match ExitReport::from_wait_status(status) {
                    Some(report) => Poll::Finished(report),
                    None => Poll::Running,
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => {
                debug!(pid = pid.as_raw(), error = %e, "poll failed, treating job as gone");
                return Poll::Finished(ExitReport::Unknown);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::process::Command;
    use std::thread;
    use std::time::{Duration, Instant};

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    #[test]
    fn test_register_keeps_spawn_order() {
        let mut registry = JobRegistry::new();
        registry.register(pid(30), "sleep 30 &");
        registry.register(pid(10), "sleep 10 &");
        registry.register(pid(20), "sleep 20 &");

        let pids: Vec<i32> = registry.iter().map(|j| j.pid.as_raw()).collect();
        assert_eq!(pids, vec![30, 10, 20]);
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(pid(10)));
        assert!(!registry.contains(pid(11)));
    }

    #[test]
    fn test_job_display() {
        let job = Job {
            pid: pid(4242),
            command_line: "sleep 5 &".to_string(),
        };
        assert_eq!(job.to_string(), "[pid 4242] sleep 5 &");
    }

    #[test]
    fn test_reap_removes_only_finished_jobs() {
        let mut registry = JobRegistry::new();
        for n in 1..=5 {
            registry.register(pid(n), format!("job {}", n));
        }

        let done: HashSet<i32> = [2, 3, 5].into_iter().collect();
        let mut polled = Vec::new();
        let completions = registry.reap_with(|p| {
            polled.push(p.as_raw());
            if done.contains(&p.as_raw()) {
                Poll::Finished(ExitReport::Exited(p.as_raw()))
            } else {
                Poll::Running
            }
        });

        assert_eq!(polled, vec![1, 2, 3, 4, 5], "every job is polled exactly once");
        let reaped: Vec<i32> = completions.iter().map(|c| c.job.pid.as_raw()).collect();
        assert_eq!(reaped, vec![2, 3, 5]);
        let left: Vec<i32> = registry.iter().map(|j| j.pid.as_raw()).collect();
        assert_eq!(left, vec![1, 4]);
    }

    #[test]
    fn test_reap_all_at_once() {
        let mut registry = JobRegistry::new();
        registry.register(pid(1), "a &");
        registry.register(pid(2), "b &");

        let completions = registry.reap_with(|_| Poll::Finished(ExitReport::Exited(0)));
        assert_eq!(completions.len(), 2);
        assert!(registry.is_empty());

        // A second pass over an empty registry is a no-op.
        assert!(registry.reap_with(|_| panic!("nothing to poll")).is_empty());
    }

    #[test]
    fn test_exit_report_lines() {
        assert_eq!(
            ExitReport::Exited(3).describe("false"),
            "Exit status [false] = 3"
        );
        assert_eq!(
            ExitReport::Signaled(Signal::SIGKILL).describe("sleep 60 &"),
            "Killed by signal [sleep 60 &] = SIGKILL"
        );
        assert_eq!(ExitReport::Signaled(Signal::SIGTERM).code(), 143);
    }

    #[test]
    fn test_reap_real_child() {
        let child = Command::new("true").spawn().expect("spawn true");
        let child_pid = pid(child.id() as i32);

        let mut registry = JobRegistry::new();
        registry.register(child_pid, "true &");

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut completions = Vec::new();
        while completions.is_empty() && Instant::now() < deadline {
            completions = registry.reap();
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].report, ExitReport::Exited(0));
        assert!(!registry.contains(child_pid));
    }

    #[test]
    fn test_poll_unknown_pid_reports_gone() {
        // Not our child, so waitpid fails with ECHILD.
        assert_eq!(poll_pid(pid(1)), Poll::Finished(ExitReport::Unknown));
    }
}
