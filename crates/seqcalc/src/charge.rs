// Standard Library Imports
use std::iter;

// External Crate Imports
use tracing::trace;

// Local Crate Imports
use crate::{IsotopeLabelType, MzMatchError};

// Public API ==========================================================================================================

// NOTE: This matches the proton of the bundled atomic database, which `SequenceMassCalc` ionises with
pub const PROTON_MASS: f64 = 1.007_276_466_621;

pub const MIN_PRECURSOR_CHARGE: u32 = 1;
pub const MAX_PRECURSOR_CHARGE: u32 = 20;
pub const MIN_PRODUCT_CHARGE: u32 = 1;
pub const MAX_PRODUCT_CHARGE: u32 = 5;

/// Converts a mass+H into the m/z of an ion carrying `charge` protons
#[must_use]
pub fn get_mz(mass_h: f64, charge: u32) -> f64 {
    (mass_h + f64::from(charge.saturating_sub(1)) * PROTON_MASS) / f64::from(charge)
}

/// Converts an m/z at `charge` back into a mass+H
#[must_use]
pub fn get_mh(mz: f64, charge: u32) -> f64 {
    mz * f64::from(charge) - f64::from(charge.saturating_sub(1)) * PROTON_MASS
}

/// The charge whose m/z came closest to an observed value without falling inside the tolerance
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct NearMiss {
    pub charge: u32,
    pub mz: f64,
    /// The observed m/z minus the theoretical one
    pub delta: f64,
}

/// Finds the lowest precursor charge whose m/z lies within `tolerance` of `observed_mz`, or the [`NearMiss`] of the
/// closest charge when none do
pub fn resolve_precursor_charge(mass_h: f64, observed_mz: f64, tolerance: f64) -> Result<u32, NearMiss> {
    let mut nearest = NearMiss::at(mass_h, MIN_PRECURSOR_CHARGE, observed_mz);
    for charge in MIN_PRECURSOR_CHARGE..=MAX_PRECURSOR_CHARGE {
        let candidate = NearMiss::at(mass_h, charge, observed_mz);
        if candidate.delta.abs() <= tolerance {
            return Ok(charge);
        }
        if candidate.delta.abs() < nearest.delta.abs() {
            nearest = candidate;
        }
    }
    Err(nearest)
}

/// Like [`resolve_precursor_charge`], but folded into a single signed charge: a failure to match is reported as the
/// negated charge of the nearest miss
#[must_use]
pub fn calc_precursor_charge(mass_h: f64, observed_mz: f64, tolerance: f64) -> i32 {
    let signed = |charge| i32::try_from(charge).unwrap_or(i32::MAX);
    match resolve_precursor_charge(mass_h, observed_mz, tolerance) {
        Ok(charge) => signed(charge),
        Err(NearMiss { charge, .. }) => -signed(charge),
    }
}

/// Explains an observed precursor m/z with a label type and charge. The `light` mass+H is tried first, then (unless
/// the label type was given explicitly) each of the `heavy` ones. If nothing matches, the error reports whichever
/// candidate came closest
pub fn resolve_precursor_label<'l>(
    light: (&'l IsotopeLabelType, f64),
    heavy: &[(&'l IsotopeLabelType, f64)],
    observed_mz: f64,
    tolerance: f64,
    explicit_label: bool,
) -> Result<(&'l IsotopeLabelType, u32), MzMatchError> {
    let heavy: &[_] = if explicit_label { &[] } else { heavy };
    let mut nearest_mz = f64::INFINITY;
    for &(label_type, mass_h) in iter::once(&light).chain(heavy) {
        let miss = match resolve_precursor_charge(mass_h, observed_mz, tolerance) {
            Ok(charge) => return Ok((label_type, charge)),
            Err(miss) => miss,
        };
        trace!(%label_type, charge = miss.charge, delta = miss.delta, "no precursor charge matched");
        if (observed_mz - miss.mz).abs() < (observed_mz - nearest_mz).abs() {
            nearest_mz = miss.mz;
        }
    }
    Err(MzMatchError::precursor(observed_mz, nearest_mz))
}

// Private Helper Methods ==============================================================================================

impl NearMiss {
    fn at(mass_h: f64, charge: u32, observed_mz: f64) -> Self {
        let mz = get_mz(mass_h, charge);
        Self {
            charge,
            mz,
            delta: observed_mz - mz,
        }
    }
}

// Module Tests ========================================================================================================
