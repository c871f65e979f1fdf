// Standard Library Imports
use std::fmt;

// External Crate Imports
use miette::{Diagnostic, LabeledSpan, SourceSpan};
use nom::{
    Err, Finish, IResult, Parser,
    combinator::{all_consuming, complete},
    error::{ErrorKind, ParseError},
};
use thiserror::Error;

// Local Crate Imports
use crate::atoms::errors::AtomicLookupError;

pub type ParseResult<'a, O> = IResult<&'a str, O, FormulaParseError<'a>>;

// Public API ==========================================================================================================

/// A formula parsing failure, rendered by `miette` with a label pointing into the offending formula
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{kind}")]
pub struct FormulaError {
    full_input: String,
    label: Option<(SourceSpan, &'static str)>,
    kind: FormulaErrorKind,
    #[source]
    source: Option<Box<FormulaError>>,
}

// NOTE: Public so that other crates parsing formulae embedded in larger strings can inspect errors
#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum FormulaErrorKind {
    #[error(
        "expected a chemical formula, optionally followed by a '-' and a second formula to subtract"
    )]
    ExpectedFormula,

    #[error(
        "expected an element (like Se), an isotope (like [15N]), or a heavy element (like C') optionally \
        followed by a number"
    )]
    ExpectedAtomicOffset,

    #[diagnostic(help(
        "a 0 value doesn't make sense here, if you've mistakenly included a leading zero, like \
        NH02, try just NH2 instead"
    ))]
    #[error("counts cannot start with 0")]
    ExpectedNoLeadingZero,

    #[error("expected an ASCII digit 1-9")]
    ExpectedDigit,

    #[error("expected an element symbol")]
    ExpectedElementSymbol,

    #[error("expected '[' to open isotope brackets")]
    ExpectedIsotopeStart,

    #[error("expected an isotopic mass number")]
    ExpectedMassNumber,

    #[diagnostic(help("you've probably forgotten to close an earlier '[' bracket"))]
    #[error("expected ']' to close isotope brackets")]
    ExpectedIsotopeEnd,

    #[error("expected an uppercase ASCII letter")]
    ExpectedUppercase,

    #[error("expected a lowercase ASCII letter")]
    ExpectedLowercase,

    #[diagnostic(transparent)]
    #[error(transparent)]
    LookupError(AtomicLookupError),

    #[diagnostic(help(
        "this is an internal error that you shouldn't ever see! If you have gotten this error, \
        then please report it as a bug!"
    ))]
    #[error("internal `nom` error: {0:?}")]
    NomError(ErrorKind),

    #[diagnostic(help(
        "check the unparsed region for errors, or remove it from the rest of the formula"
    ))]
    #[error("could not interpret the full input as a valid chemical formula")]
    Incomplete,
}

impl FormulaError {
    #[must_use]
    pub const fn kind(&self) -> &FormulaErrorKind {
        &self.kind
    }
}

impl Diagnostic for FormulaError {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.full_input)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind.help()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self
            .label
            .iter()
            .map(|&(span, label)| LabeledSpan::new_with_span(Some(label.to_owned()), span));
        Some(Box::new(labels))
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        self.source.as_ref().map(|e| &**e as &dyn Diagnostic)
    }
}

impl FormulaErrorKind {
    fn label(&self) -> Option<&'static str> {
        Some(match self {
            Self::LookupError(e) => match e {
                AtomicLookupError::Element(..) => "element not found",
                AtomicLookupError::Isotope(..) => "isotope not found",
                AtomicLookupError::Particle(..) => "particle not found",
                AtomicLookupError::Abundance(..) => "no natural abundance",
                AtomicLookupError::Label(..) => "no label isotope",
            },
            Self::ExpectedUppercase => "expected uppercase",
            Self::ExpectedLowercase => "expected lowercase",
            Self::ExpectedDigit => "expected digit",
            Self::ExpectedIsotopeStart => "'['",
            Self::ExpectedIsotopeEnd => "expected ']'",
            Self::ExpectedMassNumber => "expected a mass number",
            Self::ExpectedNoLeadingZero => "expected non-zero",
            Self::Incomplete => "input was valid up until this point",
            Self::NomError(_) => "the region that triggered this bug!",
            _ => return None,
        })
    }
}

impl From<AtomicLookupError> for FormulaErrorKind {
    fn from(error: AtomicLookupError) -> Self {
        Self::LookupError(error)
    }
}

impl From<ErrorKind> for FormulaErrorKind {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Eof => Self::Incomplete,
            kind => Self::NomError(kind),
        }
    }
}

// Intermediate Parser Errors ==========================================================================================

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FormulaParseError<'a> {
    input: &'a str,
    length: usize,
    kind: FormulaErrorKind,
    source: Option<Box<FormulaParseError<'a>>>,
}

impl<'a> FormulaParseError<'a> {
    pub fn new(input: &'a str, kind: FormulaErrorKind) -> Self {
        Self {
            input,
            length: 0,
            kind,
            source: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &FormulaErrorKind {
        &self.kind
    }

    // NOTE: `nom` only ever hands out suffixes of the original input, so the start of an error's span is just the
    // length of the input that came before it
    fn into_final_error(self, full_input: &str) -> FormulaError {
        let source = self
            .source
            .map(|e| Box::new(e.into_final_error(full_input)));
        let start = full_input.len() - self.input.len();
        let span = SourceSpan::from((start, self.length));
        let label = self
            .kind
            .label()
            .map(|l| (span, l))
            .or_else(|| source.as_ref().and_then(|e| e.label));
        // NOTE: The additional space is added so that labels can point to the end of an input
        FormulaError {
            full_input: format!("{full_input} "),
            label,
            kind: self.kind,
            source,
        }
    }
}

impl<'a> ParseError<&'a str> for FormulaParseError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::new(input, kind.into())
    }

    fn append(_input: &str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

// Error-Handling Combinators ==========================================================================================

/// Runs `parser` over the whole of its input, converting any failure into a [`FormulaError`]
pub fn final_parser<'a, O, P>(parser: P) -> impl FnMut(&'a str) -> Result<O, FormulaError>
where
    P: Parser<&'a str, O, FormulaParseError<'a>>,
{
    let mut parser = all_consuming(complete(parser));
    move |input| {
        parser
            .parse(input)
            .finish()
            .map(|(_, o)| o)
            .map_err(|e| e.into_final_error(input))
    }
}

/// Applies a fallible function to the output of `parser`, labelling the whole consumed input on failure
pub fn map_res<'a, O1, O2, E, P, F>(
    mut parser: P,
    mut f: F,
) -> impl FnMut(&'a str) -> ParseResult<'a, O2>
where
    P: Parser<&'a str, O1, FormulaParseError<'a>>,
    F: FnMut(O1) -> Result<O2, E>,
    E: Into<FormulaErrorKind>,
{
    move |input| {
        let (rest, o1) = parser.parse(input)?;
        match f(o1) {
            Ok(o2) => Ok((rest, o2)),
            Err(e) => Err(Err::Failure(FormulaParseError {
                length: input.len() - rest.len(),
                ..FormulaParseError::new(input, e.into())
            })),
        }
    }
}

/// Wraps any error from `parser` in a more general error of `kind`, keeping the original as its source
pub fn wrap_err<'a, O, P>(
    mut parser: P,
    kind: FormulaErrorKind,
) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    P: Parser<&'a str, O, FormulaParseError<'a>>,
{
    move |i| {
        parser.parse(i).map_err(|e| {
            e.map(|e| FormulaParseError {
                source: Some(Box::new(e)),
                ..FormulaParseError::new(i, kind.clone())
            })
        })
    }
}

/// Replaces any error from `parser` with an error of `kind`
pub fn expect<'a, O, P>(mut parser: P, kind: FormulaErrorKind) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    P: Parser<&'a str, O, FormulaParseError<'a>>,
{
    move |i| {
        parser
            .parse(i)
            .map_err(|e| e.map(|_| FormulaParseError::new(i, kind.clone())))
    }
}
