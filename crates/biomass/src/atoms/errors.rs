use miette::Diagnostic;
use thiserror::Error;

use crate::MassNumber;

// NOTE: Public so that the `FormulaError` kinds can carry lookup failures that happen mid-parse
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum AtomicLookupError {
    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error("the element {0:?} could not be found in the supplied atomic database")]
    Element(String),

    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error(
        "the isotope \"{0}-{1}\" could not be found in the supplied atomic database, though the following {2} \
        isotopes were found: {3}"
    )]
    Isotope(String, MassNumber, String, String),

    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error("the particle {0:?} could not be found in the supplied atomic database")]
    Particle(String),

    #[diagnostic(help(
        "consider explicitly selecting the isotope to be used in mass calculations, like [{2}{1}]"
    ))]
    #[error("no natural abundance data could be found for {0} ({1}), though the following isotopes were found: {3}")]
    Abundance(String, String, MassNumber, String),

    #[diagnostic(help("mark one isotope of this element with `label=true` in the atomic database"))]
    #[error("no heavy label isotope is defined for {0} ({1})")]
    Label(String, String),
}

impl AtomicLookupError {
    pub(crate) fn display_vec<I: ToString>(items: impl IntoIterator<Item = I>) -> String {
        let mut items: Vec<_> = items.into_iter().map(|i| i.to_string()).collect();
        items.sort_unstable();
        format!("[{}]", items.join(", "))
    }
}
