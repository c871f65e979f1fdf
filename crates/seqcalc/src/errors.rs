use biomass::BiomassError;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::persistence::round_mass;

pub type Result<T, E = Box<SeqCalcError>> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, PartialEq, Error)]
pub enum SeqCalcError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Biomass {
        #[from]
        error: BiomassError,
    },

    #[diagnostic(help("a formula like \"H2O - H2O\" cancels itself out and describes no change in mass"))]
    #[error("the formula {0:?} has a total mass of zero")]
    ZeroMassFormula(String),

    #[diagnostic(help("variable modifications can't apply to every residue, so name residues or a terminus"))]
    #[error("the variable modification {0:?} must specify an amino acid or a terminus")]
    VariableWithoutTarget(String),

    #[error("the modification {0:?} targets {1:?}, which is not an amino acid")]
    InvalidAminoAcid(String, String),

    #[diagnostic(help("restrict the modification to one or more amino acids"))]
    #[error("the terminal modification {0:?} cannot carry label atoms")]
    LabelledTerminalMod(String),

    #[error("the modification {0:?} must specify a formula, label atoms, or both monoisotopic and average masses")]
    MissingModMass(String),

    #[error("the modification {0:?} cannot combine a formula with label atoms")]
    FormulaWithLabels(String),

    #[error("the modification {0:?} uses a formula or label atoms, so it cannot also specify masses")]
    FormulaWithMasses(String),

    #[error("neutral losses must specify a formula, or both monoisotopic and average masses")]
    MissingLossMass,

    #[error("neutral losses with a formula cannot also specify masses")]
    LossFormulaWithMasses,

    #[error("the neutral loss mass {0} must be greater than 0.0001 and at most 500")]
    LossMassOutOfRange(f64),

    #[diagnostic(help("label types other than \"light\" must have a sort order greater than zero"))]
    #[error("the label type {0:?} cannot share the sort order of the light label")]
    LabelSortOrder(String),

    #[error("the explicit modification {0:?} is on residue {1}, but the peptide has only {2} residues")]
    ExplicitModIndex(String, usize, usize),

    #[diagnostic(help("modified sequences look like PEPC[+57.0]TIDEK, with residue letters and bracketed mass deltas"))]
    #[error("could not interpret {sequence:?} as a modified peptide sequence")]
    ModifiedSequence {
        sequence: String,
        #[label("{reason}")]
        span: SourceSpan,
        reason: &'static str,
    },
}

impl From<BiomassError> for Box<SeqCalcError> {
    fn from(error: BiomassError) -> Self {
        Box::new(error.into())
    }
}

impl From<Box<BiomassError>> for Box<SeqCalcError> {
    fn from(error: Box<BiomassError>) -> Self {
        Box::new((*error).into())
    }
}

/// A recoverable failure to explain an observed m/z value. Unlike [`SeqCalcError`], this reports a tolerance problem
/// that may go away with different settings, not malformed input
#[derive(Debug, Diagnostic, Clone, PartialEq, Error)]
pub enum MzMatchError {
    #[diagnostic(help("check the modification settings or increase the m/z match tolerance"))]
    #[error("precursor m/z {observed} does not match the closest possible value {nearest} (delta = {delta})")]
    Precursor {
        observed: f64,
        nearest: f64,
        delta: f64,
    },

    #[diagnostic(help("check the ion types, charges, and neutral losses allowed, or increase the m/z match tolerance"))]
    #[error("product m/z {observed} has no matching product ion")]
    Product { observed: f64 },
}

impl MzMatchError {
    /// Reports a precursor mismatch with every value rounded, so no spurious digits appear in the message
    #[must_use]
    pub fn precursor(observed: f64, nearest: f64) -> Self {
        let observed = round_mass(observed);
        let nearest = round_mass(nearest);
        let delta = round_mass((observed - nearest).abs());
        Self::Precursor {
            observed,
            nearest,
            delta,
        }
    }

    #[must_use]
    pub fn product(observed: f64) -> Self {
        Self::Product {
            observed: round_mass(observed),
        }
    }
}

// Module Tests ========================================================================================================
