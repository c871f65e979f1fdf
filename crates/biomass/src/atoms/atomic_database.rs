// Standard Library Imports
use std::str::FromStr;

// External Crate Imports
use ahash::HashMap;
use knuffel::Decode;
use miette::{Diagnostic, Result};
use rust_decimal::Decimal;
use thiserror::Error;

// Local Crate Imports
use crate::{Isotope, MassNumber};

use super::errors::AtomicLookupError;

const ATOMIC_DATABASE_KDL: &str = include_str!("../../atomic_database.kdl");

// Public API ==========================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AtomicDatabase {
    pub(crate) elements: HashMap<String, ElementDescription>,
    pub(crate) particles: HashMap<String, ParticleDescription>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct ElementDescription {
    pub(crate) name: String,
    pub(crate) isotopes: HashMap<MassNumber, Isotope>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct ParticleDescription {
    pub(crate) mass: Decimal,
    pub(crate) charge: i64,
}

impl AtomicDatabase {
    pub fn from_kdl(file_name: impl AsRef<str>, text: impl AsRef<str>) -> Result<Self> {
        let parsed_db: AtomicDatabaseKdl = knuffel::parse(file_name.as_ref(), text.as_ref())?;
        let elements = parsed_db
            .elements
            .into_iter()
            .map(ElementKdl::try_into_entry)
            .collect::<Result<_, _>>()?;
        let particles = parsed_db
            .particles
            .into_iter()
            .map(ParticleKdl::try_into_entry)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            elements,
            particles,
        })
    }

    /// The rest mass of a particle, like `p` (the proton) or `e` (the electron)
    pub fn particle_mass(&self, symbol: impl AsRef<str>) -> Result<Decimal, AtomicLookupError> {
        let symbol = symbol.as_ref();
        self.particles
            .get(symbol)
            .map(|p| p.mass)
            .ok_or_else(|| AtomicLookupError::Particle(symbol.to_owned()))
    }

    pub fn particle_charge(&self, symbol: impl AsRef<str>) -> Result<i64, AtomicLookupError> {
        let symbol = symbol.as_ref();
        self.particles
            .get(symbol)
            .map(|p| p.charge)
            .ok_or_else(|| AtomicLookupError::Particle(symbol.to_owned()))
    }
}

impl Default for AtomicDatabase {
    fn default() -> Self {
        // NOTE: The bundled database is covered by the tests below, so failing to load it is a build defect
        Self::from_kdl("atomic_database.kdl", ATOMIC_DATABASE_KDL)
            .expect("the bundled atomic database failed to load")
    }
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
struct AtomicDatabaseKdl {
    #[knuffel(child, unwrap(children))]
    elements: Vec<ElementKdl>,
    #[knuffel(child, unwrap(children))]
    particles: Vec<ParticleKdl>,
}

#[derive(Debug, Decode)]
struct ElementKdl {
    #[knuffel(node_name)]
    symbol: ElementSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(children(name = "isotope"))]
    isotopes: Vec<IsotopeKdl>,
}

#[derive(Debug, Decode)]
struct ParticleKdl {
    #[knuffel(node_name)]
    symbol: ParticleSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(child, unwrap(argument))]
    mass: f64,
    #[knuffel(child, unwrap(argument))]
    charge: i64,
}

#[derive(Debug, Decode)]
struct IsotopeKdl {
    #[knuffel(argument)]
    mass_number: u32,
    #[knuffel(argument)]
    relative_mass: f64,
    #[knuffel(property)]
    abundance: Option<f64>,
    #[knuffel(property, default)]
    label: bool,
}

// Lossless Conversion of KDL Numbers to Decimal =======================================================================

// NOTE: `f64`'s `Display` prints the shortest string that round-trips, so the digits written in the KDL file are the
// digits that end up in the `Decimal`
fn decimal(value: f64) -> Result<Decimal, AtomicDatabaseError> {
    Decimal::from_str_exact(&value.to_string()).map_err(|_| AtomicDatabaseError::Decimal(value))
}

// Element and Particle Symbol Validation ==============================================================================

#[derive(Debug)]
struct ElementSymbol(String);

impl FromStr for ElementSymbol {
    type Err = AtomicDatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_owned();
        let chrs: Vec<_> = s.chars().collect();
        match chrs[..] {
            [f] if f.is_ascii_uppercase() => Ok(Self(s)),
            [f, l] if f.is_ascii_uppercase() && l.is_ascii_lowercase() => Ok(Self(s)),
            _ => Err(AtomicDatabaseError::ElementSymbol(s)),
        }
    }
}

#[derive(Debug)]
struct ParticleSymbol(String);

impl FromStr for ParticleSymbol {
    type Err = AtomicDatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chrs = s.chars();
        match (chrs.next(), chrs.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => Ok(Self(s.to_owned())),
            _ => Err(AtomicDatabaseError::ParticleSymbol(s.to_owned())),
        }
    }
}

#[derive(PartialEq, Debug, Diagnostic, Error)]
enum AtomicDatabaseError {
    #[error(
        "expected a single uppercase ASCII letter optionally followed by a lowercase ASCII letter, got {0:?}"
    )]
    ElementSymbol(String),

    #[error("expected a single lowercase ASCII letter, got {0:?}")]
    ParticleSymbol(String),

    #[diagnostic(help("every element needs at least one `isotope` child"))]
    #[error("the element {0:?} was defined without any isotopes")]
    NoIsotopes(String),

    #[diagnostic(help("only one isotope per element can be used as the heavy label"))]
    #[error("the element {0:?} marks more than one isotope with `label=true`")]
    ManyLabels(String),

    #[error("{0} cannot be represented as an exact decimal")]
    Decimal(f64),
}

// Conversion From Parsed KDL to Internal Representation ===============================================================

type ElementEntry = (String, ElementDescription);

impl ElementKdl {
    fn try_into_entry(self) -> Result<ElementEntry, AtomicDatabaseError> {
        let Self {
            symbol: ElementSymbol(symbol),
            name,
            isotopes,
        } = self;

        if isotopes.is_empty() {
            return Err(AtomicDatabaseError::NoIsotopes(symbol));
        }
        if isotopes.iter().filter(|i| i.label).count() > 1 {
            return Err(AtomicDatabaseError::ManyLabels(symbol));
        }

        let isotopes = isotopes
            .into_iter()
            .map(IsotopeKdl::try_into_entry)
            .collect::<Result<_, _>>()?;
        Ok((symbol, ElementDescription { name, isotopes }))
    }
}

type IsotopeEntry = (MassNumber, Isotope);

impl IsotopeKdl {
    fn try_into_entry(self) -> Result<IsotopeEntry, AtomicDatabaseError> {
        let Self {
            mass_number,
            relative_mass,
            abundance,
            label,
        } = self;

        let isotope = Isotope {
            relative_mass: decimal(relative_mass)?,
            abundance: abundance.map(decimal).transpose()?,
            label,
        };
        Ok((MassNumber(mass_number), isotope))
    }
}

type ParticleEntry = (String, ParticleDescription);

impl ParticleKdl {
    fn try_into_entry(self) -> Result<ParticleEntry, AtomicDatabaseError> {
        let Self {
            symbol: ParticleSymbol(symbol),
            mass,
            charge,
            ..
        } = self;

        let mass = decimal(mass)?;
        Ok((symbol, ParticleDescription { mass, charge }))
    }
}

// Module Tests ========================================================================================================
