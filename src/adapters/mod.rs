/*
 * mod.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

//! External collaborator interfaces (§1, §6, §9): Channels, GuiHost,
//! Debugger, Magician. The kernel depends only on these traits; concrete
//! implementations live on the host side except for the degenerate
//! defaults provided here.

pub mod channels;
pub mod debugger;
pub mod gui_host;
pub mod magician;
pub mod stdio_channels;

pub use channels::Channels;
pub use debugger::Debugger;
pub use gui_host::GuiHost;
pub use magician::Magician;
pub use stdio_channels::StdioChannels;
