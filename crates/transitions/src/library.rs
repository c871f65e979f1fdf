// Standard Library Imports
use std::collections::{BTreeMap, btree_map::Entry};

// External Crate Imports
use seqcalc::{FragmentMassCalc, IonType, get_mz};

// Local Crate Imports
use crate::{
    Mz, Result, Transition, TransitionError, TransitionGroup, TransitionLibInfo, TransitionLosses, group::lose_mass,
};

// Public API ==========================================================================================================

/// A predicted ion that was found among the most intense peaks of a library spectrum
#[derive(Clone, PartialEq, Debug)]
pub struct RankedIon {
    pub transition: Transition,
    pub losses: Option<TransitionLosses>,
    pub lib_info: TransitionLibInfo,
}

/// Ranked library ions, keyed by the exact m/z predicted for them
pub type LibraryRanks = BTreeMap<Mz, RankedIon>;

/// An annotated peak from a library spectrum
#[derive(Clone, PartialEq, Debug)]
pub struct LibraryPeak {
    pub ion_type: IonType,
    pub cleavage_offset: usize,
    pub charge: u32,
    pub losses: Option<TransitionLosses>,
    pub intensity: f64,
}

/// What is known about the library spectrum of a precursor
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub enum LibraryMatch<'r> {
    /// No library has a spectrum for this precursor
    #[default]
    Unavailable,
    /// A library has a spectrum for this precursor, but it hasn't finished loading
    Pending,
    Ranked(&'r LibraryRanks),
}

impl RankedIon {
    /// Does this library ion have the same type, charge, and neutral losses as a predicted one?
    #[must_use]
    pub fn is_match(&self, ion_type: IonType, charge: u32, losses: Option<&TransitionLosses>) -> bool {
        self.transition.ion_type() == ion_type && self.transition.charge() == charge && self.losses.as_ref() == losses
    }
}

impl<'r> LibraryMatch<'r> {
    #[must_use]
    pub const fn ranks(&self) -> Option<&'r LibraryRanks> {
        match self {
            Self::Ranked(ranks) => Some(ranks),
            _ => None,
        }
    }

    /// The ranked ion predicted at exactly `ion_mz`
    #[must_use]
    pub fn ranked_ion(&self, ion_mz: f64) -> Option<&'r RankedIon> {
        self.ranks().and_then(|ranks| ranks.get(&Mz::from(ion_mz)))
    }
}

/// Ranks the peaks of a library spectrum of `group` by decreasing intensity, keeping only the `ion_count` most
/// intense peaks when a count is given. Each peak is keyed by the m/z that `calc` predicts for it, so the ranks can
/// be matched against transitions predicted with the same calculator. Ranks start at 1
pub fn library_ranks_from_peaks(
    group: &TransitionGroup,
    calc: &impl FragmentMassCalc,
    peaks: &[LibraryPeak],
    ion_count: Option<usize>,
) -> Result<LibraryRanks> {
    let sequence = group.peptide();
    let masses = calc.fragment_ion_masses(sequence);

    let mut by_intensity: Vec<_> = peaks.iter().collect();
    by_intensity.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
    let ion_count = ion_count.unwrap_or(by_intensity.len());

    let mut ranks = LibraryRanks::new();
    for (i, peak) in by_intensity.into_iter().take(ion_count).enumerate() {
        let invalid_peak = || {
            Box::new(TransitionError::LibraryPeak(
                peak.ion_type,
                peak.cleavage_offset,
                peak.charge,
                sequence.to_owned(),
            ))
        };
        let (transition, mass_h) = if peak.ion_type.is_precursor() {
            if peak.charge != group.precursor_charge() {
                return Err(invalid_peak());
            }
            (Transition::precursor(group), calc.precursor_fragment_mass(sequence))
        } else {
            let transition = Transition::new(group, peak.ion_type, peak.cleavage_offset, peak.charge)
                .map_err(|_| invalid_peak())?;
            let mass_h = masses
                .get(peak.ion_type, peak.cleavage_offset)
                .ok_or_else(invalid_peak)?;
            (transition, mass_h)
        };

        let ion_mz = get_mz(lose_mass(mass_h, peak.losses.as_ref()), peak.charge);
        let ranked_ion = RankedIon {
            transition,
            losses: peak.losses.clone(),
            lib_info: TransitionLibInfo::new(i + 1, peak.intensity),
        };
        match ranks.entry(Mz::from(ion_mz)) {
            Entry::Occupied(e) => {
                let len = group.len();
                return Err(Box::new(TransitionError::DuplicateLibraryPeak(
                    e.get().transition.label(len),
                    transition.label(len),
                    ion_mz,
                )));
            }
            Entry::Vacant(e) => e.insert(ranked_ion),
        };
    }
    Ok(ranks)
}

// Module Tests ========================================================================================================
