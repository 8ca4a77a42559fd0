use crate::error::ShellError;
use crate::executor::ExecutionResult;
use crate::runtime::Runtime;
use anyhow::{anyhow, Result};

mod exit_builtin;
mod help;
mod jobs;

pub use exit_builtin::{ExitSignal, FAREWELL};

type BuiltinFn = fn(&[String], &mut Runtime) -> Result<ExecutionResult>;

/// Commands handled inside the interpreter, checked in table order before
/// anything is spawned.
#[derive(Clone)]
pub struct Builtins {
    commands: Vec<(&'static str, BuiltinFn)>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let commands: Vec<(&'static str, BuiltinFn)> = vec![
            ("exit", exit_builtin::builtin_exit),
            ("quit", exit_builtin::builtin_exit),
            ("cd", builtin_cd),
            ("jobs", jobs::builtin_jobs),
            ("help", help::builtin_help),
        ];

        Self { commands }
    }

    fn lookup(&self, name: &str) -> Option<BuiltinFn> {
        self.commands
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, func)| *func)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn builtin_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|(name, _)| *name).collect()
    }

    /// `args` are the operands after the command name.
    pub fn execute(
        &self,
        name: &str,
        args: &[String],
        runtime: &mut Runtime,
    ) -> Result<ExecutionResult> {
        match self.lookup(name) {
            Some(func) => func(args, runtime),
            None => Err(anyhow!("Builtin '{}' not found", name)),
        }
    }
}

/// `cd <dir>`: change the process-wide working directory. Extra operands are
/// ignored; on failure the directory is left as it was.
fn builtin_cd(args: &[String], runtime: &mut Runtime) -> Result<ExecutionResult> {
    let path = args.first().ok_or_else(|| ShellError::ArgumentError {
        command: "cd".to_string(),
        reason: "missing directory operand".to_string(),
    })?;

    runtime
        .set_cwd(path)
        .map_err(|source| ShellError::DirectoryChange {
            path: path.clone(),
            source,
        })?;

    Ok(ExecutionResult::success(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_dispatch_table() {
        let builtins = Builtins::new();
        assert_eq!(
            builtins.builtin_names(),
            vec!["exit", "quit", "cd", "jobs", "help"]
        );
        assert!(builtins.is_builtin("cd"));
        assert!(!builtins.is_builtin("ls"));
        assert!(!builtins.is_builtin("CD"));
    }

    #[test]
    fn test_cd_without_operand() {
        let mut runtime = Runtime::new();
        let before = env::current_dir().unwrap();

        let err = builtin_cd(&[], &mut runtime).unwrap_err();
        let shell_err = err.downcast_ref::<ShellError>().unwrap();
        assert_eq!(shell_err.error_code(), "ARGUMENT_ERROR");
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_cd_missing_directory() {
        let mut runtime = Runtime::new();
        let before = env::current_dir().unwrap();

        let err = builtin_cd(&["/definitely/not/here".to_string()], &mut runtime).unwrap_err();
        let shell_err = err.downcast_ref::<ShellError>().unwrap();
        assert!(matches!(shell_err, ShellError::DirectoryChange { .. }));
        assert!(err.to_string().starts_with("cd: /definitely/not/here: "));
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_execute_unknown() {
        let builtins = Builtins::new();
        let mut runtime = Runtime::new();
        assert!(builtins.execute("ls", &[], &mut runtime).is_err());
    }
}
