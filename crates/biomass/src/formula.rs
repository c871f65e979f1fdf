// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use rust_decimal::Decimal;

// Local Crate Imports
use crate::{
    AtomicDatabase, ChemicalComposition, Element, Formula, LabelAtoms, Massive, Result,
    parsers::{self, errors::final_parser},
};

// Public API ==========================================================================================================

impl<'a> ChemicalComposition<'a> {
    pub fn new(db: &'a AtomicDatabase, formula: impl AsRef<str>) -> Result<Self> {
        let mut parser = final_parser(parsers::formula::chemical_composition(db));
        Ok(parser(formula.as_ref())?)
    }

    /// Replaces every atom named by `label_atoms` with its heavy label isotope
    pub fn relabel(&self, label_atoms: LabelAtoms) -> Result<Self> {
        let chemical_formula = self
            .chemical_formula
            .iter()
            .map(|(element, count)| Ok((element.relabel(label_atoms)?, *count)))
            .collect::<Result<_>>()?;
        Ok(Self { chemical_formula })
    }
}

impl<'a> Formula<'a> {
    pub fn new(db: &'a AtomicDatabase, formula: impl AsRef<str>) -> Result<Self> {
        let mut parser = final_parser(parsers::formula::formula(db));
        Ok(parser(formula.as_ref())?)
    }

    /// The heavy form of this formula, expressed as the difference from its light form
    pub fn label_difference(&self, label_atoms: LabelAtoms) -> Result<Self> {
        let added = self.added.relabel(label_atoms)?;
        let removed = Some(self.added.clone());
        Ok(Self { added, removed })
    }
}

// Massive Trait Implementations =======================================================================================

impl Massive for ChemicalComposition<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        self.mass_with(Element::monoisotopic_mass)
    }

    fn average_mass(&self) -> Decimal {
        self.mass_with(Element::average_mass)
    }
}

impl Massive for Formula<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        self.mass_with(Massive::monoisotopic_mass)
    }

    fn average_mass(&self) -> Decimal {
        self.mass_with(Massive::average_mass)
    }
}

// Display Trait Implementations =======================================================================================

impl Display for ChemicalComposition<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (element, count) in &self.chemical_formula {
            write!(f, "{element}{count}")?;
        }
        Ok(())
    }
}

impl Display for Formula<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.added)?;
        if let Some(removed) = &self.removed {
            write!(f, " - {removed}")?;
        }
        Ok(())
    }
}

// Private Helper Methods ==============================================================================================

impl<'a> ChemicalComposition<'a> {
    fn mass_with(&self, accessor: impl Fn(&Element<'a>) -> Decimal) -> Decimal {
        self.chemical_formula
            .iter()
            .map(|&(ref element, count)| count * accessor(element))
            .sum()
    }
}

impl<'a> Formula<'a> {
    fn mass_with(&self, accessor: impl Fn(&ChemicalComposition<'a>) -> Decimal) -> Decimal {
        let removed = self.removed.as_ref().map_or(Decimal::ZERO, &accessor);
        accessor(&self.added) - removed
    }
}

// Module Tests ========================================================================================================
