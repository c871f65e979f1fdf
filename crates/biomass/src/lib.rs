//! Elemental masses and the chemical formula mini-language that residue and modification masses are built from

pub mod atoms;
pub mod errors;
pub mod parsers;

mod formula;
mod label_atoms;
mod mass_calc;
#[cfg(test)]
mod testing_tools;

// Standard Library Imports
use std::num::NonZeroU32;

// External Crate Imports
use ahash::HashMap;
use derive_more::{BitAnd, BitOr, BitOrAssign};
use rust_decimal::Decimal;

pub use atoms::atomic_database::AtomicDatabase;
pub use errors::{BiomassError, Result};

// NOTE: For the types in this module, 'a lifetimes indicate references to the AtomicDatabase

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ChemicalComposition<'a> {
    chemical_formula: Vec<(Element<'a>, Count)>,
}

/// A composition, optionally followed by a second composition whose mass is subtracted from the first. The
/// `C'6H12ON'2 - C6H12ON2` difference, for example, describes a heavy lysine label
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Formula<'a> {
    added: ChemicalComposition<'a>,
    removed: Option<ChemicalComposition<'a>>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
struct Element<'a> {
    symbol: &'a str,
    name: &'a str,
    mass_number: Option<MassNumber>,
    isotopes: &'a HashMap<MassNumber, Isotope>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Count(NonZeroU32);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct MassNumber(u32);

#[derive(Clone, Eq, PartialEq, Debug)]
struct Isotope {
    relative_mass: Decimal,
    abundance: Option<Decimal>,
    label: bool,
}

/// Selects between the mass of the most abundant isotopes and the abundance-weighted mass of each element
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum MassType {
    #[default]
    Monoisotopic,
    Average,
}

/// Combinable flags naming which atoms of a formula are swapped for their heavy label isotope
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, BitAnd, BitOr, BitOrAssign)]
pub struct LabelAtoms(u8);

/// Converts chemical formulae into `f64` masses of a fixed [`MassType`]
#[derive(Copy, Clone, Debug)]
pub struct BioMassCalc<'a> {
    db: &'a AtomicDatabase,
    mass_type: MassType,
    proton: Decimal,
}

pub trait Massive {
    fn monoisotopic_mass(&self) -> Decimal;
    fn average_mass(&self) -> Decimal;

    fn mass(&self, mass_type: MassType) -> Decimal {
        match mass_type {
            MassType::Monoisotopic => self.monoisotopic_mass(),
            MassType::Average => self.average_mass(),
        }
    }
}
