use anyhow::{Context, Result};
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::flag;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Signal state shared between the handlers and the read loop.
///
/// Handlers only flip atomics; no helper thread is started, so the process
/// stays single-threaded and safe to `fork`.
#[derive(Clone)]
pub struct SignalHandler {
    interrupted: Arc<AtomicBool>,
    /// Number of the signal that asked for shutdown, 0 if none.
    shutdown: Arc<AtomicUsize>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            interrupted: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Install handlers for SIGINT, SIGTERM and SIGHUP.
    ///
    /// SIGINT no longer kills the interpreter; the foreground child still
    /// gets the default action because `exec` resets caught signals.
    pub fn setup(&self) -> Result<()> {
        flag::register(SIGINT, Arc::clone(&self.interrupted))
            .context("failed to install SIGINT handler")?;
        for signal in [SIGTERM, SIGHUP] {
            flag::register_usize(signal, Arc::clone(&self.shutdown), signal as usize)
                .with_context(|| format!("failed to install handler for signal {}", signal))?;
        }
        Ok(())
    }

    /// Clear and return the SIGINT flag.
    pub fn take_interrupted(&self) -> bool {
        self.interrupted.swap(false, Ordering::SeqCst)
    }

    pub fn should_shutdown(&self) -> bool {
        self.signal_number() != 0
    }

    pub fn signal_number(&self) -> i32 {
        self.shutdown.load(Ordering::SeqCst) as i32
    }

    pub fn reset(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
        self.shutdown.store(0, Ordering::SeqCst);
    }

    /// 128 + the shutdown signal, following shell convention.
    pub fn exit_code(&self) -> i32 {
        match self.signal_number() {
            0 => 1,
            n => 128 + n,
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
