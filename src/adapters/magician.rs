/*
 * magician.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use async_trait::async_trait;

/// What the magic-command rewriter did with one interactive line (§6,
/// `magic_commands`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MagicOutcome {
    /// The line carries no magic syntax; feed it to the compiler unchanged.
    NotMagic,

    /// The line was rewritten into ordinary source before compilation.
    Rewritten(String),

    /// The magic handled the line itself (e.g. printed help); nothing is
    /// left to compile or execute.
    Consumed,
}

/// The kernel's contract with the magic-command preprocessor — an
/// external collaborator (§1), never implemented here. Runs ahead of the
/// Compiler on every interactive line, but never on structured block
/// submissions (§4.3 step 1).
#[async_trait]
pub trait Magician: Send {
    async fn process(&mut self, line: &str) -> MagicOutcome;
}

/// The no-op Magician used when no magic-command layer is configured:
/// every line passes through unchanged.
#[derive(Default)]
pub struct PassthroughMagician;

impl PassthroughMagician {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Magician for PassthroughMagician {
    async fn process(&mut self, _line: &str) -> MagicOutcome {
        MagicOutcome::NotMagic
    }
}
