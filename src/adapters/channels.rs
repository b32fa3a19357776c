/*
 * channels.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::status::Status;

/// A structured block submission from the editor (§6, `ctrl_code`).
///
/// `Serialize`/`Deserialize` here mirror how `amalthea`'s wire messages
/// (e.g. `KernelStatus`, `ExecuteRequest`) are defined: a plain
/// `serde`-derived struct, sent as JSON over whatever socket a concrete
/// `Channels` wraps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMessage {
    pub source: String,
    pub fname: String,
    pub lineno: u32,
    #[serde(default, rename = "cellName")]
    pub cell_name: Option<String>,
}

/// One snapshot of frontend-provided startup configuration (§6,
/// `stat_startup`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupSnapshot {
    #[serde(default)]
    pub gui: Option<String>,
    #[serde(default, rename = "projectPath")]
    pub project_path: Option<String>,
    #[serde(default, rename = "scriptFile")]
    pub script_file: Option<String>,
    #[serde(default, rename = "startDir")]
    pub start_dir: Option<String>,
    #[serde(default, rename = "startupScript")]
    pub startup_script: Option<String>,
}

/// The kernel's reply on the same channel, augmenting the snapshot with
/// its own introspection data (§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupReply {
    #[serde(flatten)]
    pub snapshot: StartupSnapshot,
    pub builtins: Vec<String>,
    pub version: (u32, u32, u32, u32),
    pub keywords: Vec<String>,
}

/// `{filename: [line, ...]}`, possibly absent entirely (§6,
/// `stat_breakpoints`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointsUpdate(pub HashMap<String, Vec<u32>>);

/// The Rust-native rendering of "named bidirectional channels" (§6.1):
/// four non-blocking inbound methods and three outbound ones, collapsed
/// into one object so REPLLoop can hold a single `Box<dyn Channels>`
/// rather than a socket per field. Every method here must return
/// immediately — the kernel is single-threaded cooperative and never
/// blocks on a channel read (§5).
pub trait Channels: Send {
    /// One line of interactive input, if one is waiting.
    fn try_recv_command(&mut self) -> Option<String>;

    /// One structured block submission, if one is waiting.
    fn try_recv_code(&mut self) -> Option<BlockMessage>;

    /// The one-shot startup snapshot, if the frontend has sent it and the
    /// kernel hasn't consumed it yet.
    fn take_startup_snapshot(&mut self) -> Option<StartupSnapshot>;

    /// A breakpoint-table update, if one is waiting.
    fn try_recv_breakpoints(&mut self) -> Option<BreakpointsUpdate>;

    /// Send the current prompt string on `strm_prompt`.
    fn send_prompt(&mut self, prompt: &str);

    /// Send input echo or a colored banner on `strm_echo`.
    fn send_echo(&mut self, text: &str);

    /// Send a status transition on `stat_interpreter`.
    fn send_status(&mut self, status: Status);

    /// Reply to the startup handshake with the kernel's own
    /// introspection data.
    fn send_startup_reply(&mut self, reply: &StartupReply);

    /// True once the transport is closed or has no peers (§4.7 step 4):
    /// the kernel requests shutdown when this becomes true.
    fn is_closed(&self) -> bool;
}
