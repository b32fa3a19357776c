/*
 * gui_host.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// What a REPL tick callback tells its [`GuiHost`] to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiTick {
    Continue,
    Stop,
}

/// A capability set `{run(callback, period), quit()}` (§9's "Polymorphic
/// GuiHost" note): the host-language implementation used subclasses per
/// toolkit; here the kernel depends only on this trait, never on a
/// concrete toolkit adapter.
///
/// Contract: `run` must invoke `callback` at least every `period` while
/// no user code is running. During user-code execution inside the
/// Executor the calling thread is blocked and GUI events necessarily
/// stall — that's acceptable and matches the reference REPL (§4.7).
pub trait GuiHost: Send {
    fn run(&mut self, period: Duration, callback: &mut dyn FnMut() -> GuiTick);

    /// Requests that the outer loop given to `run` return. Called from
    /// [`crate::shutdown::ShutdownCoordinator`] once an exit has been
    /// observed anywhere in the kernel (§4.9).
    fn quit(&mut self);
}

/// The degenerate GuiHost used when no GUI toolkit is selected: a plain
/// busy-sleep loop calling `callback` every `period` until `quit()` is
/// called or the callback itself requests `Stop` (§4.7's "a degenerate
/// busy-sleep loop when no GUI is selected").
pub struct BusySleepGuiHost {
    quit_requested: Arc<AtomicBool>,
}

impl BusySleepGuiHost {
    pub fn new() -> Self {
        BusySleepGuiHost {
            quit_requested: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for BusySleepGuiHost {
    fn default() -> Self {
        Self::new()
    }
}

impl GuiHost for BusySleepGuiHost {
    fn run(&mut self, period: Duration, callback: &mut dyn FnMut() -> GuiTick) {
        loop {
            if self.quit_requested.load(Ordering::SeqCst) {
                return;
            }
            if callback() == GuiTick::Stop {
                return;
            }
            std::thread::sleep(period);
        }
    }

    fn quit(&mut self) {
        self.quit_requested.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_when_callback_requests_stop() {
        let mut host = BusySleepGuiHost::new();
        let mut ticks = 0;
        host.run(Duration::from_millis(1), &mut || {
            ticks += 1;
            if ticks >= 3 {
                GuiTick::Stop
            } else {
                GuiTick::Continue
            }
        });
        assert_eq!(ticks, 3);
    }

    #[test]
    fn quit_stops_the_next_iteration() {
        let mut host = BusySleepGuiHost::new();
        let quit_flag = host.quit_requested.clone();
        let mut ticks = 0;
        host.run(Duration::from_millis(1), &mut || {
            ticks += 1;
            if ticks == 2 {
                quit_flag.store(true, Ordering::SeqCst);
            }
            GuiTick::Continue
        });
        assert_eq!(ticks, 2);
    }
}
