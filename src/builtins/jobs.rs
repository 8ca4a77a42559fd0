use crate::executor::ExecutionResult;
use crate::runtime::Runtime;
use anyhow::Result;

/// List background jobs in the order they were started, one `[pid N] line`
/// per job. Read-only: finished jobs disappear on the next reap pass.
pub fn builtin_jobs(_args: &[String], runtime: &mut Runtime) -> Result<ExecutionResult> {
    let mut output = String::new();

    for job in runtime.jobs().iter() {
        output.push_str(&job.to_string());
        output.push('\n');
    }

    Ok(ExecutionResult::success(output))
}
