//! Loop bounds for the case-challenge ⇄ principle-reasoning cycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Default upper bound on completed loops.
pub const DEFAULT_MAX_LOOPS: u32 = 5;

/// Default number of loops required before closure may be chosen.
pub const DEFAULT_MIN_LOOPS_FOR_CLOSURE: u32 = 2;

/// Validated loop bounds.
///
/// `max_loops >= 1` and `min_loops_for_closure <= max_loops` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDialogueLimits")]
pub struct DialogueLimits {
    max_loops: u32,
    min_loops_for_closure: u32,
}

/// Unchecked wire form; deserialization goes through [`DialogueLimits::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDialogueLimits {
    max_loops: u32,
    min_loops_for_closure: u32,
}

impl TryFrom<RawDialogueLimits> for DialogueLimits {
    type Error = ValidationError;

    fn try_from(raw: RawDialogueLimits) -> Result<Self, Self::Error> {
        Self::new(raw.max_loops, raw.min_loops_for_closure)
    }
}

impl DialogueLimits {
    pub fn new(max_loops: u32, min_loops_for_closure: u32) -> Result<Self, ValidationError> {
        if max_loops == 0 {
            return Err(ValidationError::invalid_format(
                "max_loops",
                "must be at least 1",
            ));
        }
        if min_loops_for_closure > max_loops {
            return Err(ValidationError::invalid_format(
                "min_loops_for_closure",
                format!("must not exceed max_loops ({})", max_loops),
            ));
        }
        Ok(Self {
            max_loops,
            min_loops_for_closure,
        })
    }

    pub fn max_loops(&self) -> u32 {
        self.max_loops
    }

    pub fn min_loops_for_closure(&self) -> u32 {
        self.min_loops_for_closure
    }
}

impl Default for DialogueLimits {
    fn default() -> Self {
        Self {
            max_loops: DEFAULT_MAX_LOOPS,
            min_loops_for_closure: DEFAULT_MIN_LOOPS_FOR_CLOSURE,
        }
    }
}
