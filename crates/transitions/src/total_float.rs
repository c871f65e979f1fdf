// Standard Library Imports
use std::cmp::Ordering;

// External Crate Imports
use derive_more::{Display, From, Into};

// Public API ==========================================================================================================

/// An `f64` with a total order, so predicted m/z values can key a sorted map
#[derive(Copy, Clone, Debug, Display, From, Into)]
pub struct TotalFloat(f64);
pub type Mz = TotalFloat;

// Implementing Ord for TotalFloat  ====================================================================================

impl Ord for TotalFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for TotalFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TotalFloat {
    fn eq(&self, other: &Self) -> bool {
        // NOTE: This is *not* equivalent to `self.0 == other.0`! `.total_cmp()` tells `0.0` from `-0.0`, and the `Ord`
        // and `PartialEq` implementations must agree on which values are equal
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TotalFloat {}

// Module Tests ========================================================================================================
