/*
 * mod.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

//! In-process test doubles for every external collaborator (§2.1), in
//! the spirit of the teacher framework's `fixtures::dummy_frontend`: a
//! fully in-memory stand-in usable from both unit and integration tests
//! without a real front-end or GUI toolkit.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::adapters::channels::BlockMessage;
use crate::adapters::channels::BreakpointsUpdate;
use crate::adapters::channels::Channels;
use crate::adapters::channels::StartupReply;
use crate::adapters::channels::StartupSnapshot;
use crate::adapters::debugger::DebugFrame;
use crate::adapters::debugger::Debugger;
use crate::adapters::gui_host::GuiHost;
use crate::adapters::gui_host::GuiTick;
use crate::adapters::magician::MagicOutcome;
use crate::adapters::magician::Magician;
use crate::namespace::Namespace;
use crate::status::Status;

/// A fully in-memory [`Channels`]: tests enqueue inbound messages with
/// `push_command`/`push_code`/etc. and inspect what the kernel sent with
/// `prompts`/`echoes`/`statuses`.
#[derive(Default)]
pub struct MemoryChannels {
    commands: VecDeque<String>,
    codes: VecDeque<BlockMessage>,
    startup: Option<StartupSnapshot>,
    breakpoints: VecDeque<BreakpointsUpdate>,
    closed: bool,

    /// A random per-instance identity, in the same spirit as
    /// `DummyFrontend`'s random HMAC key and socket identity: gives each
    /// fixture instance in a test run a distinct label without the test
    /// author having to invent one.
    pub connection_id: u64,

    pub prompts: Vec<String>,
    pub echoes: Vec<String>,
    pub statuses: Vec<Status>,
    pub startup_replies: Vec<StartupReply>,
}

impl MemoryChannels {
    pub fn new() -> Self {
        MemoryChannels {
            connection_id: rand::thread_rng().gen(),
            ..Default::default()
        }
    }

    pub fn push_command(&mut self, line: &str) {
        self.commands.push_back(line.to_string());
    }

    pub fn push_code(&mut self, message: BlockMessage) {
        self.codes.push_back(message);
    }

    pub fn set_startup_snapshot(&mut self, snapshot: StartupSnapshot) {
        self.startup = Some(snapshot);
    }

    pub fn push_breakpoints(&mut self, update: BreakpointsUpdate) {
        self.breakpoints.push_back(update);
    }

    /// Simulates the transport tearing down (§4.7 step 4).
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl Channels for MemoryChannels {
    fn try_recv_command(&mut self) -> Option<String> {
        self.commands.pop_front()
    }

    fn try_recv_code(&mut self) -> Option<BlockMessage> {
        self.codes.pop_front()
    }

    fn take_startup_snapshot(&mut self) -> Option<StartupSnapshot> {
        self.startup.take()
    }

    fn try_recv_breakpoints(&mut self) -> Option<BreakpointsUpdate> {
        self.breakpoints.pop_front()
    }

    fn send_prompt(&mut self, prompt: &str) {
        self.prompts.push(prompt.to_string());
    }

    fn send_echo(&mut self, text: &str) {
        self.echoes.push(text.to_string());
    }

    fn send_status(&mut self, status: Status) {
        self.statuses.push(status);
    }

    fn send_startup_reply(&mut self, reply: &StartupReply) {
        self.startup_replies.push(reply.clone());
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A [`GuiHost`] that runs its callback exactly `ticks` times (or until
/// `quit()`/`Stop`, whichever comes first) and records every tick, used
/// to drive REPLLoop a fixed number of iterations in a test without a
/// real event loop.
pub struct RecordingGuiHost {
    pub ticks_run: usize,
    quit_requested: bool,
}

impl RecordingGuiHost {
    pub fn new() -> Self {
        RecordingGuiHost { ticks_run: 0, quit_requested: false }
    }
}

impl Default for RecordingGuiHost {
    fn default() -> Self {
        Self::new()
    }
}

impl GuiHost for RecordingGuiHost {
    fn run(&mut self, _period: Duration, callback: &mut dyn FnMut() -> GuiTick) {
        loop {
            if self.quit_requested {
                return;
            }
            self.ticks_run += 1;
            if callback() == GuiTick::Stop {
                return;
            }
        }
    }

    fn quit(&mut self) {
        self.quit_requested = true;
    }
}

/// A [`Debugger`] double whose frame stack and breakpoint table a test
/// can drive directly, without a real trace backend.
#[derive(Default)]
pub struct StubDebugger {
    frames: Vec<DebugFrame>,
    pub last_synced: Option<BreakpointsUpdate>,
    pub tracing_enabled: bool,
    pub stop_calls: usize,
    pub leave_interaction_calls: usize,
}

impl StubDebugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, name: &str) {
        self.frames.push(DebugFrame { name: name.to_string() });
    }
}

#[async_trait]
impl Debugger for StubDebugger {
    fn frame_stack(&self) -> &[DebugFrame] {
        &self.frames
    }

    fn sync_breakpoints(&mut self, breakpoints: &BreakpointsUpdate) {
        self.last_synced = Some(breakpoints.clone());
    }

    fn set_tracing_enabled(&mut self, enabled: bool) {
        self.tracing_enabled = enabled;
    }

    fn current_namespace(&mut self) -> Option<&mut dyn Namespace> {
        None
    }

    fn stop(&mut self) {
        self.stop_calls += 1;
        self.frames.clear();
    }

    async fn leave_interaction(&mut self) {
        self.leave_interaction_calls += 1;
        self.frames.clear();
    }
}

/// A [`Magician`] double that rewrites any line prefixed with `%` to the
/// remainder with that prefix stripped, and otherwise passes lines
/// through unchanged — just enough surface to exercise REPLLoop's three
/// `MagicOutcome` branches.
#[derive(Default)]
pub struct EchoMagician;

impl EchoMagician {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Magician for EchoMagician {
    async fn process(&mut self, line: &str) -> MagicOutcome {
        if let Some(rest) = line.strip_prefix("%quiet") {
            let _ = rest;
            return MagicOutcome::Consumed;
        }
        if let Some(rest) = line.strip_prefix('%') {
            return MagicOutcome::Rewritten(rest.to_string());
        }
        MagicOutcome::NotMagic
    }
}
