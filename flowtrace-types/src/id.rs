//! Typed ID wrappers. Opaque strings underneath — no format is enforced,
//! the core doesn't care whether an embedder uses UUIDs or ULIDs.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(SessionId, "Unique identifier for a recorded session.");
typed_id!(WorkflowId, "Unique identifier for a workflow definition.");

/// The 0-based, dense position of a [`crate::step::WorkflowStep`] within a
/// [`crate::definition::WorkflowDefinition`]. A thin wrapper rather than a
/// bare `u32` so step-order arithmetic (`sourceStep < step.order`) reads at
/// call sites instead of disappearing into generic integer math.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepOrder(pub u32);

impl StepOrder {
    /// The zeroth step.
    pub const ZERO: StepOrder = StepOrder(0);

    /// Create a step order from a plain index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StepOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StepOrder {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<usize> for StepOrder {
    fn from(v: usize) -> Self {
        Self(v as u32)
    }
}
