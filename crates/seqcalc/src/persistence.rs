// External Crate Imports
use rust_decimal::{Decimal, RoundingStrategy};

// Local Crate Imports
use crate::PROTON_MASS;

// Public API ==========================================================================================================

/// The number of decimal places masses are rounded to before they are written anywhere durable
pub const MASS_PRECISION: u32 = 6;

/// Rounds to [`MASS_PRECISION`] decimal places, with ties going to the even digit. Rounding an already rounded value
/// gives it back unchanged, so persisted masses survive being re-read and re-rounded
#[must_use]
pub fn round_mass(mass: f64) -> f64 {
    // NOTE: NaN and the infinities have no decimal form and pass through as they are
    Decimal::try_from(mass)
        .ok()
        .map(|d| d.round_dp_with_strategy(MASS_PRECISION, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| f64::try_from(d).ok())
        .unwrap_or(mass)
}

/// The neutral mass of a mass+H value, rounded for persistence
#[must_use]
pub fn persistent_neutral(mass_h: f64) -> f64 {
    round_mass(mass_h - PROTON_MASS)
}

/// A mass+H value that reproduces itself exactly when persisted as a neutral mass and read back
#[must_use]
pub fn persistent_mh(mass_h: f64) -> f64 {
    persistent_neutral(mass_h) + PROTON_MASS
}

#[must_use]
pub fn persistent_mz(mz: f64) -> f64 {
    round_mass(mz)
}

// Module Tests ========================================================================================================
