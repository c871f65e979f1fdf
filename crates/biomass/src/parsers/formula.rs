// External Crate Imports
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt, recognize},
    multi::many1,
    sequence::{delimited, pair, preceded, terminated},
};

// Local Crate Imports
use super::{
    errors::{FormulaErrorKind, ParseResult, expect, map_res, wrap_err},
    primitives::{count, lowercase, minus, uppercase},
};
use crate::{AtomicDatabase, ChemicalComposition, Count, Element, Formula, MassNumber};

// Public API ==========================================================================================================

/// Formula = Chemical Composition , [ Minus , Chemical Composition ] ;
pub fn formula<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Formula<'a>> {
    let removed = opt(preceded(minus, cut(chemical_composition(db))));
    let parser = map(
        pair(chemical_composition(db), removed),
        |(added, removed)| Formula { added, removed },
    );
    wrap_err(parser, FormulaErrorKind::ExpectedFormula)
}

/// Chemical Composition = { Atomic Offset }- ;
pub fn chemical_composition<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, ChemicalComposition<'a>> {
    map(many1(atomic_offset(db)), |chemical_formula| {
        ChemicalComposition { chemical_formula }
    })
}

// Private Sub-Parsers =================================================================================================

/// Atomic Offset = ( Heavy Element | Element | Isotope ) , [ Count ] ;
fn atomic_offset<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, (Element<'a>, Count)> {
    let element_or_isotope = alt((heavy_element(db), element(db), isotope(db)));
    let optional_count = map(opt(count), Option::unwrap_or_default);
    let parser = pair(element_or_isotope, optional_count);
    wrap_err(parser, FormulaErrorKind::ExpectedAtomicOffset)
}

// ---------------------------------------------------------------------------------------------------------------------

/// Heavy Element = Element , "'" ;
fn heavy_element<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, Element<'a>> {
    map_res(terminated(element_symbol, char('\'')), |symbol| {
        Element::new_heavy(db, symbol)
    })
}

/// Element = uppercase , [ lowercase ] ;
fn element<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Element<'a>> {
    map_res(element_symbol, |symbol| Element::new(db, symbol))
}

// NOTE: These are not meant to be links, it's just EBNF
#[allow(clippy::doc_link_with_quotes)]
/// Isotope = "[" , Count , Element , "]" ;
fn isotope<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Element<'a>> {
    map_res(isotope_expr, |(mass_number, symbol)| {
        Element::new_isotope(db, symbol, mass_number)
    })
}

// ---------------------------------------------------------------------------------------------------------------------

/// Element = uppercase , [ lowercase ] ;
fn element_symbol(i: &str) -> ParseResult<&str> {
    let parser = recognize(pair(uppercase, opt(lowercase)));
    wrap_err(parser, FormulaErrorKind::ExpectedElementSymbol)(i)
}

// NOTE: These are not meant to be links, it's just EBNF
#[allow(clippy::doc_link_with_quotes)]
/// Isotope = "[" , Count , Element , "]" ;
fn isotope_expr(i: &str) -> ParseResult<(MassNumber, &str)> {
    let opening_bracket = expect(char('['), FormulaErrorKind::ExpectedIsotopeStart);
    let mass_number = map(
        wrap_err(count, FormulaErrorKind::ExpectedMassNumber),
        MassNumber::from,
    );
    let closing_bracket = expect(cut(char(']')), FormulaErrorKind::ExpectedIsotopeEnd);
    delimited(
        opening_bracket,
        cut(pair(mass_number, element_symbol)),
        closing_bracket,
    )(i)
}

// Module Tests ========================================================================================================
