//! Raw-mode alternate screen behind the preview.
//!
//! Leaving is idempotent; `leave`, drop and the panic hook all share one flag.

use crate::{log_debug, log_panic};
use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

static ENGAGED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: OnceLock<()> = OnceLock::new();

/// Holds raw mode, the alternate screen and the hidden cursor while the preview is up.
pub(super) struct PreviewScreen {
    _engaged: (),
}

impl PreviewScreen {
    /// Take over the terminal. A half-finished switch is rolled back before the error returns.
    pub(super) fn engage(stdout: &mut impl Write) -> Result<Self> {
        install_panic_restore();
        enable_raw_mode().context("failed to enable raw terminal mode")?;
        ENGAGED.store(true, Ordering::SeqCst);
        if let Err(err) = execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            leave_screen();
            return Err(err).context("failed to enter the alternate screen");
        }
        Ok(Self { _engaged: () })
    }

    pub(super) fn leave(&self) {
        leave_screen();
    }
}

impl Drop for PreviewScreen {
    fn drop(&mut self) {
        leave_screen();
    }
}

fn is_engaged() -> bool {
    ENGAGED.load(Ordering::SeqCst)
}

fn leave_screen() {
    if !ENGAGED.swap(false, Ordering::SeqCst) {
        return;
    }
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = stdout.flush();
}

/// Put the terminal back before the default hook prints, so the panic message is readable.
fn install_panic_restore() {
    PANIC_HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let was_engaged = is_engaged();
            leave_screen();
            log_panic(info);
            if was_engaged {
                log_debug("terminal restored after panic");
            }
            previous(info);
        }));
    });
}
