//! Cooperative cancellation between install steps.
//!
//! The first SIGINT/SIGTERM only raises a flag that the reconciler checks
//! before each step, so an in-flight install always runs to completion. A
//! second signal exits immediately.
//!
//! Installer subprocesses are started outside the terminal's foreground
//! process group so a terminal interrupt reaches only this process.

use std::process::Command;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{InstallerError, Result};

static SIGNALS: AtomicUsize = AtomicUsize::new(0);

/// Exit status used when a second signal forces termination.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    signals: bool,
}

impl CancelToken {
    /// A token that is only cancelled through [`CancelToken::cancel`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is also cancelled by SIGINT or SIGTERM.
    pub fn from_signals() -> Self {
        install_handlers();
        Self {
            flag: Arc::default(),
            signals: true,
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || (self.signals && SIGNALS.load(Ordering::SeqCst) > 0)
    }

    /// Fail with [`InstallerError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(InstallerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Start `command` in its own process group so terminal interrupts skip it.
pub fn shield_from_interrupts(command: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        command.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }
}

/// Ignore terminal interrupts for the rest of this process.
///
/// Used by the elevated worker, which has to share the caller's terminal for
/// the elevation prompt and must still finish the request it is serving.
pub fn ignore_interrupts() {
    #[cfg(unix)]
    // SAFETY: installs the predefined ignore disposition, no handler code runs.
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_IGN);
    }
}

#[cfg(unix)]
extern "C" fn on_signal(_signal: libc::c_int) {
    if SIGNALS.fetch_add(1, Ordering::SeqCst) > 0 {
        // SAFETY: _exit is async-signal-safe.
        unsafe { libc::_exit(INTERRUPTED_EXIT_CODE) }
    }
}

#[cfg(unix)]
fn install_handlers() {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only touches an atomic and calls _exit.
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
}

// Without a handler the default console behaviour applies: Ctrl-C ends the
// process at once.
#[cfg(not(unix))]
fn install_handlers() {}
