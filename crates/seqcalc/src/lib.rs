//! Peptide precursor and fragment ion masses, built from residue formulae and modification mass tables, plus the
//! inverse problem of explaining an observed m/z with a charge state

mod amino_acids;
mod charge;
mod errors;
mod explicit_mods;
mod fragment_table;
mod ion_type;
mod label_type;
mod mod_masses;
mod modifications;
mod modified_sequence;
mod persistence;
mod sequence_calc;
#[cfg(test)]
mod testing_tools;

// External Crate Imports
use biomass::BioMassCalc;
use derive_more::Constructor;

pub use amino_acids::{amino_acid_formula, is_aa, is_ex_aa};
pub use biomass::{AtomicDatabase, LabelAtoms, MassType};
pub use charge::{
    MAX_PRECURSOR_CHARGE, MAX_PRODUCT_CHARGE, MIN_PRECURSOR_CHARGE, MIN_PRODUCT_CHARGE, NearMiss, PROTON_MASS,
    calc_precursor_charge, get_mh, get_mz, resolve_precursor_charge, resolve_precursor_label,
};
pub use errors::{MzMatchError, Result, SeqCalcError};
pub use modified_sequence::{ModifiedSequence, mod_diff_description, parse_modified_sequence};
pub use persistence::{MASS_PRECISION, persistent_mh, persistent_mz, persistent_neutral, round_mass};

// Public API ==========================================================================================================

/// The fragment ion series, in the order transitions are sorted by. `A`, `B`, and `C` ions keep the N-terminus of
/// the peptide, `X`, `Y`, and `Z` ions keep the C-terminus, and `Precursor` is the intact peptide
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum IonType {
    A,
    B,
    C,
    X,
    Y,
    Z,
    Precursor,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ModTerminus {
    N,
    C,
}

/// An isotope labelling state, like `light` or `heavy`. Label types sort by their sort order, then by name
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct IsotopeLabelType {
    sort_order: u32,
    name: String,
}

/// A neutral loss (like phosphoric acid from a phosphoserine) that fragments of a modified residue can undergo
#[derive(Clone, PartialEq, Debug)]
pub struct FragmentLoss {
    formula: Option<String>,
    monoisotopic_mass: f64,
    average_mass: f64,
}

/// Where the mass of a [`StaticMod`] comes from
#[derive(Clone, PartialEq, Debug)]
pub enum ModMassSource {
    Formula(String),
    Labels(LabelAtoms),
    Masses { monoisotopic: f64, average: f64 },
}

/// A validated structural or isotopic modification
#[derive(Clone, PartialEq, Debug)]
pub struct StaticMod {
    name: String,
    amino_acids: Option<Vec<char>>,
    terminus: Option<ModTerminus>,
    is_variable: bool,
    is_explicit: bool,
    mass: ModMassSource,
    losses: Vec<FragmentLoss>,
}

/// The unvalidated parts of a [`StaticMod`], as they come out of a settings file or user input
#[derive(Clone, PartialEq, Debug, Default)]
pub struct StaticModDefinition {
    pub name: String,
    /// A comma-separated list of residues, like `S, T, Y`
    pub amino_acids: Option<String>,
    pub terminus: Option<ModTerminus>,
    pub is_variable: bool,
    pub is_explicit: bool,
    pub formula: Option<String>,
    pub label_atoms: LabelAtoms,
    pub monoisotopic_mass: Option<f64>,
    pub average_mass: Option<f64>,
    pub losses: Vec<FragmentLoss>,
}

/// Per-residue modification mass deltas, indexed by ASCII code
#[derive(Clone, PartialEq, Debug)]
pub struct ModMasses {
    interior: [f64; 128],
    n_term: [f64; 128],
    c_term: [f64; 128],
    cleave_n: f64,
    cleave_c: f64,
}

/// Calculates peptide and fragment ion masses (as mass+H) for a fixed [`MassType`] and set of modifications
#[derive(Clone, Debug)]
pub struct SequenceMassCalc<'a> {
    calc: BioMassCalc<'a>,
    amino_masses: [f64; 128],
    // NOTE: Indexed by `IonType as usize`, so the precursor has no offset
    ion_offsets: [f64; 6],
    mass_cleave_n: f64,
    mass_cleave_c: f64,
    proton: f64,
    mods: ModMasses,
    heavy_mods: Option<ModMasses>,
}

/// A calculator paired with the isotope label type it computes masses for
#[derive(Clone, Debug, Constructor)]
pub struct TypedMassCalc<'a> {
    pub label_type: IsotopeLabelType,
    pub calc: SequenceMassCalc<'a>,
}

/// The mass+H of every fragment ion in the six ion series, indexed by cleavage offset
#[derive(Clone, PartialEq, Debug)]
pub struct FragmentTable {
    masses: [Vec<f64>; 6],
}

/// Explicit per-residue modification masses for one peptide instance
#[derive(Clone, PartialEq, Debug, Default, Constructor)]
pub struct ExplicitSequenceMods {
    pub mods: Vec<f64>,
    /// When unset, a calculator with a heavy-only table uses it in place of its full modification table
    pub requires_all_calc_mods: bool,
}

/// A [`SequenceMassCalc`] bound to the explicit modifications of a single peptide
#[derive(Clone, Debug)]
pub struct ExplicitSequenceMassCalc<'c, 'a> {
    base: &'c SequenceMassCalc<'a>,
    mods: ExplicitSequenceMods,
}

/// A modification declared on one residue of one peptide
#[derive(Clone, PartialEq, Debug, Constructor)]
pub struct ExplicitMod {
    pub index_aa: usize,
    pub modification: StaticMod,
}

#[derive(Clone, PartialEq, Debug, Constructor)]
pub struct TypedExplicitMods {
    pub label_type: IsotopeLabelType,
    pub mods: Vec<ExplicitMod>,
}

/// The explicit (structural and isotopic) modifications of a single peptide
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ExplicitMods {
    static_mods: Option<Vec<ExplicitMod>>,
    heavy_mods: Vec<TypedExplicitMods>,
    is_variable_static_mods: bool,
}

pub trait PrecursorMassCalc {
    fn precursor_mass(&self, seq: &str) -> f64;
    fn is_modified(&self, seq: &str) -> bool;
    fn modified_sequence(&self, seq: &str, narrow: bool) -> String;
}

pub trait FragmentMassCalc {
    fn mass_type(&self) -> MassType;
    fn fragment_ion_masses(&self, seq: &str) -> FragmentTable;
    fn fragment_mass(&self, seq: &str, ion_type: IonType, ordinal: usize) -> f64;
    fn precursor_fragment_mass(&self, seq: &str) -> f64;
}
