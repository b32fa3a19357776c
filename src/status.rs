/*
 * status.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;
use strum_macros::EnumString;

/// The kernel's externally-visible state (§3). Emitted on `stat_interpreter`
/// only on transitions (§4.7 step 3), never on every tick.
///
/// Serializes the same way `amalthea`'s `ExecutionState` does for its
/// `status` wire message: a plain tagged string, not an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    Ready,
    More,
    Busy,
    Debug,
}

impl Status {
    /// Recomputed from `(debug_active, more_expected)` each tick (§4.7
    /// step 3); callers compare against the previously emitted value and
    /// send only on change.
    pub fn from_state(debug_active: bool, more_expected: bool) -> Self {
        if debug_active {
            Status::Debug
        } else if more_expected {
            Status::More
        } else {
            Status::Ready
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_active_wins_over_more_expected() {
        assert_eq!(Status::from_state(true, true), Status::Debug);
    }

    #[test]
    fn wire_form_round_trips_through_snake_case() {
        assert_eq!(Status::More.to_string(), "more");
        assert_eq!("busy".parse::<Status>().unwrap(), Status::Busy);
    }
}
