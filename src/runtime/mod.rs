use crate::jobs::JobRegistry;
use std::env;
use std::io;
use std::path::Path;

/// Interpreter state that outlives a single line.
///
/// The working directory is process-wide and lives in the OS; only the job
/// registry is owned here.
#[derive(Debug, Default)]
pub struct Runtime {
    jobs: JobRegistry,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> &JobRegistry {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut JobRegistry {
        &mut self.jobs
    }

    pub fn set_cwd(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        env::set_current_dir(path)
    }
}
