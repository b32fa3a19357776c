/*
 * debugger.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use async_trait::async_trait;

use crate::adapters::channels::BreakpointsUpdate;
use crate::namespace::Namespace;

/// One frame on the [`DebugFrameStack`](crate::namespace) exposed while
/// paused (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugFrame {
    pub name: String,
}

/// The kernel's contract with the debugger back-end — only this
/// interface, never the back-end's own implementation, which is an
/// external collaborator (§1).
#[async_trait]
pub trait Debugger: Send {
    /// The current frame stack, innermost last. Non-empty iff the kernel
    /// is in debug mode (§3's DebugFrameStack).
    fn frame_stack(&self) -> &[DebugFrame];

    fn is_active(&self) -> bool {
        !self.frame_stack().is_empty()
    }

    /// Replace the full breakpoint set (§4.8: deliberately coarse, no
    /// delta reconciliation).
    fn sync_breakpoints(&mut self, breakpoints: &BreakpointsUpdate);

    /// Toggle tracing ahead of a unit's execution (§4.4 step 2): on only
    /// while at least one breakpoint is active, for performance. The
    /// default no-op suits a debugger back-end with no tracing cost to
    /// avoid.
    fn set_tracing_enabled(&mut self, _enabled: bool) {}

    /// The (globals, locals) pair of the currently selected frame, used
    /// by the Executor as the execution target while paused (§3).
    fn current_namespace(&mut self) -> Option<&mut dyn Namespace>;

    /// Handles a `DebuggerQuit` signal: the control signal, not an error,
    /// that ends the current debug interaction (§4.4 step 4, §7.4).
    fn stop(&mut self);

    /// Leaves any interactive debug sub-loop so the kernel can unwind on
    /// `SystemExit` (§4.7's ShutdownCoordinator cooperation).
    async fn leave_interaction(&mut self);
}

/// A debugger with no active frames and an empty breakpoint table. The
/// default collaborator when no IDE-side debugger is attached.
#[derive(Default)]
pub struct NullDebugger {
    frames: Vec<DebugFrame>,
}

impl NullDebugger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Debugger for NullDebugger {
    fn frame_stack(&self) -> &[DebugFrame] {
        &self.frames
    }

    fn sync_breakpoints(&mut self, _breakpoints: &BreakpointsUpdate) {
        // Nothing to synchronize: there is no trace backend listening.
    }

    fn current_namespace(&mut self) -> Option<&mut dyn Namespace> {
        None
    }

    fn stop(&mut self) {
        self.frames.clear();
    }

    async fn leave_interaction(&mut self) {}
}
