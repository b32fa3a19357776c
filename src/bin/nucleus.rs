/*
 * nucleus.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

//! Process bootstrap for the kernel (§1's "deliberately out of scope"
//! launcher): installs logging, reads a handful of environment-variable
//! knobs into a [`KernelConfig`], wires the stdio-backed [`Channels`]
//! adapter to the degenerate in-process collaborators, and runs the
//! [`REPLLoop`] to completion. Mirrors the shape of `ark`'s own
//! `main.rs`, minus the real Jupyter transport and R language backend —
//! both out of scope here (§1).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use nucleus::adapters::debugger::NullDebugger;
use nucleus::adapters::gui_host::BusySleepGuiHost;
use nucleus::adapters::magician::PassthroughMagician;
use nucleus::adapters::stdio_channels::StdioChannels;
use nucleus::repl::REPLLoop;
use nucleus::runtime::ExprRuntime;
use nucleus::KernelConfig;

/// Installs a `tracing-subscriber` `fmt` layer driven by `NUCLEUS_LOG`
/// (falling back to `info`), the Rust-native analogue of the
/// `RUST_LOG`-style convention `ark`'s own logger follows.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("NUCLEUS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Reads the handful of startup knobs §6 describes as the `stat_startup`
/// snapshot's origin, sourced here from the process environment rather
/// than a frontend round trip, since this binary has no real frontend.
fn config_from_env() -> KernelConfig {
    let mut config = KernelConfig::new();
    config.gui = env::var("NUCLEUS_GUI").ok().filter(|v| !v.is_empty());
    config.project_path = env::var("NUCLEUS_PROJECT_PATH").ok().map(PathBuf::from);
    config.script_file = env::var("NUCLEUS_SCRIPT_FILE").ok().map(PathBuf::from);
    config.start_dir = env::var("NUCLEUS_START_DIR").ok().map(PathBuf::from);
    config.startup_script = env::var("NUCLEUS_STARTUP_SCRIPT").ok();
    config.extension_shell = env::var("NUCLEUS_EXTENSION_SHELL")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if let Ok(millis) = env::var("NUCLEUS_SLEEPTIME_MS") {
        if let Ok(millis) = millis.parse::<u64>() {
            config.sleeptime = Duration::from_millis(millis);
        }
    }
    config
}

fn main() {
    init_logging();

    let config = config_from_env();
    let channels = Box::new(StdioChannels::new());
    let magician = Box::new(PassthroughMagician::new());
    let debugger = Box::new(NullDebugger::new());
    let runtime = Box::new(ExprRuntime::new());

    log::info!("nucleus kernel starting (gui={:?})", config.gui);

    let repl = REPLLoop::new(config, channels, magician, debugger, runtime);
    let mut gui_host = BusySleepGuiHost::new();
    let exit = repl.run(&mut gui_host);

    log::info!("nucleus kernel exiting with code {}", exit.code);
    std::process::exit(exit.code);
}
