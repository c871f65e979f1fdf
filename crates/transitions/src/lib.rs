//! Neutral loss enumeration and transition picking for peptide precursors, configured by KDL settings files

mod combinations;
mod errors;
mod filter;
mod group;
mod library;
mod losses;
mod mass_calcs;
mod picker;
mod settings;
mod settings_kdl;
mod total_float;
#[cfg(test)]
mod testing_tools;

// External Crate Imports
use derive_more::Constructor;
use seqcalc::{FragmentLoss, IonType, IsotopeLabelType, MassType, ModTerminus, StaticMod};

pub use combinations::LossCombinations;
pub use errors::{Result, TransitionError};
pub use library::{LibraryMatch, LibraryPeak, LibraryRanks, RankedIon, library_ranks_from_peaks};
pub use losses::{PotentialLosses, calc_potential_losses, calc_transition_losses};
pub use mass_calcs::{MassCalcs, PeptideCalc};
pub use picker::{ProductMatch, pick_transitions, resolve_product_charge};
pub use total_float::{Mz, TotalFloat};

// Public API ==========================================================================================================

/// A precursor of one peptide, at one charge state and with one isotope labelling
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TransitionGroup {
    peptide: String,
    precursor_charge: u32,
    label_type: IsotopeLabelType,
}

/// A monitored product ion. The precursor itself is a transition with the precursor's charge and no cleavage
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Transition {
    ion_type: IonType,
    cleavage_offset: usize,
    charge: u32,
}

/// A neutral loss, along with the modification it comes from, at the mass type it was calculated with
#[derive(Clone, PartialEq, Debug)]
pub struct TransitionLoss {
    modification: StaticMod,
    loss: FragmentLoss,
    mass_type: MassType,
}

/// A set of neutral losses that a single product ion undergoes together
#[derive(Clone, PartialEq, Debug)]
pub struct TransitionLosses {
    losses: Vec<TransitionLoss>,
    mass: f64,
}

/// A neutral loss from the residue at `index_aa`
#[derive(Clone, PartialEq, Debug, Constructor)]
pub struct ExplicitLoss {
    pub index_aa: usize,
    pub loss: TransitionLoss,
}

/// Where a transition ranked in a library spectrum
#[derive(Copy, Clone, PartialEq, Debug, Constructor)]
pub struct TransitionLibInfo {
    pub rank: usize,
    pub intensity: f64,
}

/// A picked transition, with its neutral losses and its mass+H before those losses
#[derive(Clone, PartialEq, Debug)]
pub struct TransitionNode {
    pub transition: Transition,
    pub losses: Option<TransitionLosses>,
    pub mass_h: f64,
    pub lib_info: Option<TransitionLibInfo>,
}

/// Picks the first fragment of an ion series
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StartFinder {
    /// The fragment with this many residues
    Ordinal(usize),
    /// The smallest fragment with an m/z above the precursor, moved by this many fragments
    Mz(isize),
}

/// Picks the last fragment of an ion series
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EndFinder {
    /// This many fragments before the largest one
    Last(usize),
    /// This many fragments in total, counting from the first
    Count(usize),
}

/// The cleavage offsets (inclusive) and minimum m/z of the fragments picked from one ion series
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct FragmentRange {
    pub start: usize,
    pub end: usize,
    pub start_mz: f64,
}

/// A cleavage that gives intense enough fragments to always be measured, wherever it falls in the fragment range
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MeasuredIon {
    name: String,
    fragment: Vec<char>,
    restrict: Vec<char>,
    terminus: ModTerminus,
    min_fragment_length: usize,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TransitionFilter {
    precursor_charges: Vec<u32>,
    product_charges: Vec<u32>,
    ion_types: Vec<IonType>,
    start_finder: StartFinder,
    end_finder: EndFinder,
    measured_ions: Vec<MeasuredIon>,
    precursor_mz_window: f64,
    auto_select: bool,
}

/// The mass types used for precursor and fragment ions
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct TransitionPrediction {
    pub precursor_mass_type: MassType,
    pub fragment_mass_type: MassType,
}

/// How library spectra take part in picking transitions
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum LibraryPick {
    /// Ignore libraries and only use the filter
    None,
    /// Pick the most intense library peaks
    #[default]
    All,
    /// Pick the most intense library peaks that the filter also accepts
    Filter,
    /// Pick the most intense library peaks, plus anything else the filter accepts
    AllPlus,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TransitionLibraries {
    ion_match_tolerance: f64,
    ion_count: usize,
    pick: LibraryPick,
}

/// The m/z range an instrument can measure
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TransitionInstrument {
    min_mz: u32,
    max_mz: u32,
    is_dynamic_min: bool,
    mz_match_tolerance: f64,
}

/// The isotope modifications of one heavy label type
#[derive(Clone, PartialEq, Debug)]
pub struct TypedModifications {
    label_type: IsotopeLabelType,
    modifications: Vec<StaticMod>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct PeptideModifications {
    static_mods: Vec<StaticMod>,
    heavy_mods: Vec<TypedModifications>,
    max_neutral_losses: usize,
}

/// Everything that decides which transitions are picked for a peptide, and how their masses are calculated
#[derive(Clone, PartialEq, Debug)]
pub struct SrmSettings {
    pub prediction: TransitionPrediction,
    pub filter: TransitionFilter,
    pub libraries: TransitionLibraries,
    pub instrument: TransitionInstrument,
    pub modifications: PeptideModifications,
}
