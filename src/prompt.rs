/*
 * prompt.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

/// `(mode, more_expected, debug_frame_name, execution_count)` — derived,
/// never stored as a prompt string; recomputed on each emission (§3).
#[derive(Debug, Clone, Default)]
pub struct PromptState {
    /// Drives PS1 vs PS2 selection directly (the boolean LineBuffer's
    /// compile step returns — §4.2).
    pub more_expected: bool,

    /// `Some(frame_name)` iff the DebugFrameStack is non-empty.
    pub debug_frame_name: Option<String>,

    /// Incremented on every complete submission, interactive line or
    /// block (§4.3 step 2, §4.6).
    pub execution_count: u32,

    /// Whether an "extension shell" `In [N]:`-style prompt is active,
    /// read once from [`crate::KernelConfig`] at kernel construction.
    pub extension_shell: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Ps1,
    Ps2,
}

/// Computes the current PS1/PS2 string from [`PromptState`] (§4.6). A
/// pure function of the state — no operator-overloading "dynamic prompt
/// object" as the reference implementation uses (see SPEC_FULL.md §9).
pub struct PromptModel;

impl PromptModel {
    pub fn render(state: &PromptState, kind: PromptKind) -> String {
        if let Some(frame) = &state.debug_frame_name {
            return match kind {
                PromptKind::Ps1 => format!("({frame})>>> "),
                PromptKind::Ps2 => format!("({frame})... "),
            };
        }

        if state.extension_shell {
            return match kind {
                PromptKind::Ps1 => format!("In [{}]: ", state.execution_count),
                PromptKind::Ps2 => "   ...: ".to_string(),
            };
        }

        match kind {
            PromptKind::Ps1 => ">>> ".to_string(),
            PromptKind::Ps2 => "... ".to_string(),
        }
    }

    /// The prompt kind implied by `more_expected`, then rendered (P1).
    pub fn current(state: &PromptState) -> String {
        let kind = if state.more_expected {
            PromptKind::Ps2
        } else {
            PromptKind::Ps1
        };
        Self::render(state, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ps1_and_ps2() {
        let mut state = PromptState::default();
        assert_eq!(PromptModel::current(&state), ">>> ");
        state.more_expected = true;
        assert_eq!(PromptModel::current(&state), "... ");
    }

    #[test]
    fn debug_mode_prompt_names_the_frame() {
        let state = PromptState {
            debug_frame_name: Some("f".to_string()),
            ..Default::default()
        };
        assert_eq!(PromptModel::current(&state), "(f)>>> ");
    }

    #[test]
    fn extension_shell_uses_execution_counter() {
        let state = PromptState {
            extension_shell: true,
            execution_count: 3,
            ..Default::default()
        };
        assert_eq!(PromptModel::current(&state), "In [3]: ");
    }

    #[test]
    fn debug_mode_takes_priority_over_extension_shell() {
        let state = PromptState {
            extension_shell: true,
            execution_count: 3,
            debug_frame_name: Some("g".to_string()),
            ..Default::default()
        };
        assert_eq!(PromptModel::current(&state), "(g)>>> ");
    }
}
