use miette::Diagnostic;
use seqcalc::{IonType, SeqCalcError};
use thiserror::Error;

pub type Result<T, E = Box<TransitionError>> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    SeqCalc {
        #[from]
        error: SeqCalcError,
    },

    #[error("precursor charge {0} must be between {1} and {2}")]
    PrecursorCharge(u32, u32, u32),

    #[error("a peptide needs at least one residue")]
    EmptyPeptide,

    #[error("the peptide {0:?} contains {1:?}, which is not an amino acid")]
    InvalidSequence(String, char),

    #[diagnostic(help("peptides need at least two residues to be fragmented"))]
    #[error("the peptide {0:?} is too short to have fragment ions")]
    NoFragments(String),

    #[error("a {0} ion cannot be cleaved after residue {1} of a peptide with {2} residues")]
    CleavageOffset(IonType, usize, usize),

    #[error("product ion charge {0} must be between {1} and {2}, and at most the precursor charge {3}")]
    ProductCharge(u32, u32, u32, u32),

    #[error("{0} cannot be empty")]
    EmptyCharges(&'static str),

    #[error("{0} specify charge {1} more than once")]
    DuplicateCharge(&'static str, u32),

    #[error("invalid charge {1} found: {0} must be between {2} and {3}")]
    ChargeOutOfRange(&'static str, u32, u32, u32),

    #[error("at least one ion type is required")]
    NoIonTypes,

    #[diagnostic(help("the precursor ion is always considered, so only list fragment ion types (a, b, c, x, y, z)"))]
    #[error("the precursor is not a fragment ion type")]
    PrecursorIonType,

    #[diagnostic(help(
        "try one of \"ion 1\" to \"ion 4\", \"m/z > precursor\", or \"(m/z > precursor) - 2\" to \"(m/z > precursor) + 2\""
    ))]
    #[error("unsupported first fragment name {0:?}")]
    StartFinder(String),

    #[diagnostic(help("try one of \"last ion\" to \"last ion - 3\", or \"1 ion\" to \"6 ions\""))]
    #[error("unsupported last fragment name {0:?}")]
    EndFinder(String),

    #[error("a precursor exclusion window must be between {1} and {2}, got {0}")]
    ExclusionWindow(f64, f64, f64),

    #[error("the measured ion {0:?} must name at least one amino acid to cleave at")]
    MeasuredIonResidues(String),

    #[error("library ion match tolerance value {0} must be between {1} and {2}")]
    IonMatchTolerance(f64, f64, f64),

    #[error("library ion count value {0} must be between {1} and {2}")]
    IonCount(usize, usize, usize),

    #[error("instrument minimum m/z value {0} must be between {1} and {2}")]
    InstrumentMinMz(u32, u32, u32),

    #[error("instrument maximum m/z value {0} is less than {1} from minimum {2}")]
    InstrumentMzRange(u32, u32, u32),

    #[error("instrument maximum m/z value {0} exceeds allowable maximum {1}")]
    InstrumentMaxMz(u32, u32),

    #[error("the m/z match tolerance {0} must be between {1} and {2}")]
    MzMatchTolerance(f64, f64, f64),

    #[error("maximum neutral losses {0} must be between {1} and {2}")]
    MaxNeutralLosses(usize, usize, usize),

    #[diagnostic(help("the light label type always uses the static modifications"))]
    #[error("isotope modifications cannot be declared for the light label type")]
    LightHeavyMods,

    #[error("isotope modifications for the label type {0:?} have already been declared")]
    DuplicateLabelType(String),

    #[diagnostic(help("declare isotope modifications for {0:?} in the peptide modification settings"))]
    #[error("no mass calculator exists for the label type {0:?}")]
    UnknownLabelType(String),

    #[error("the library peak {0}{1} (charge {2}) is not a product ion of {3:?}")]
    LibraryPeak(IonType, usize, u32, String),

    #[error("library peaks {0} and {1} share the predicted m/z {2}")]
    DuplicateLibraryPeak(String, String, f64),
}

impl From<SeqCalcError> for Box<TransitionError> {
    fn from(error: SeqCalcError) -> Self {
        Box::new(error.into())
    }
}

impl From<Box<SeqCalcError>> for Box<TransitionError> {
    fn from(error: Box<SeqCalcError>) -> Self {
        Box::new((*error).into())
    }
}
