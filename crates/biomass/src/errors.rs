use miette::Diagnostic;
use thiserror::Error;

use crate::{atoms::errors::AtomicLookupError, parsers::errors::FormulaError};

pub type Result<T, E = Box<BiomassError>> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum BiomassError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Formula {
        #[from]
        error: FormulaError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup {
        #[from]
        error: AtomicLookupError,
    },

    #[diagnostic(help("only C13, N15, O18 and H2 can be combined as label atoms"))]
    #[error("{0:?} does not name a heavy label isotope")]
    UnknownLabel(String),
}

impl From<FormulaError> for Box<BiomassError> {
    fn from(error: FormulaError) -> Self {
        Box::new(error.into())
    }
}

impl From<AtomicLookupError> for Box<BiomassError> {
    fn from(error: AtomicLookupError) -> Self {
        Box::new(error.into())
    }
}
