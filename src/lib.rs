/*
 * lib.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

//! An interactive interpreter kernel embedded in an IDE-style host: a
//! REPL state machine, incremental compiler, traceback rewriter, prompt
//! model, executor, and main loop, written against small collaborator
//! traits (`Channels`, `GuiHost`, `Debugger`, `Magician`) rather than any
//! concrete transport, GUI toolkit, or debugger back-end.

pub mod adapters;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod line_buffer;
pub mod namespace;
pub mod prompt;
pub mod repl;
pub mod runtime;
pub mod shutdown;
pub mod source_registry;
pub mod status;
pub mod traceback;

pub mod fixtures;

pub use error::Error;
pub use error::Result;

use std::path::PathBuf;
use std::time::Duration;

/// Kernel-startup configuration, read once at construction (§3.1). The
/// Rust-native analogue of the `stat_startup` snapshot round trip in §6
/// plus the fields the reference bootstrap path reads.
#[derive(Debug, Clone, Default)]
pub struct KernelConfig {
    /// GUI toolkit name, or `None` for the degenerate busy-sleep host.
    pub gui: Option<String>,
    pub project_path: Option<PathBuf>,
    /// If this names an existing regular file, it is run as `__main__`
    /// before the first prompt (§4.10).
    pub script_file: Option<PathBuf>,
    pub start_dir: Option<PathBuf>,
    /// The `$PYTHONSTARTUP`-style sentinel, or a literal source path.
    pub startup_script: Option<String>,
    /// How often GuiHost must invoke the REPL tick while no user code is
    /// running (default 10ms per §4.7).
    pub sleeptime: Duration,
    /// Selects the `In [N]:` PromptModel branch over the plain `>>>` one.
    pub extension_shell: bool,
}

impl KernelConfig {
    pub fn new() -> Self {
        KernelConfig {
            sleeptime: Duration::from_millis(10),
            ..Default::default()
        }
    }
}
