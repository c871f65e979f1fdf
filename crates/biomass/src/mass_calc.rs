// External Crate Imports
use rust_decimal::Decimal;

// Local Crate Imports
use crate::{AtomicDatabase, BioMassCalc, Formula, LabelAtoms, MassType, Massive, Result};

// Public API ==========================================================================================================

impl<'a> BioMassCalc<'a> {
    /// Builds a calculator, failing if the database has no proton (`p`) to ionise with
    pub fn new(db: &'a AtomicDatabase, mass_type: MassType) -> Result<Self> {
        let proton = db.particle_mass("p")?;
        Ok(Self {
            db,
            mass_type,
            proton,
        })
    }

    #[must_use]
    pub const fn mass_type(&self) -> MassType {
        self.mass_type
    }

    #[must_use]
    pub const fn db(&self) -> &'a AtomicDatabase {
        self.db
    }

    #[must_use]
    pub fn mass_proton(&self) -> f64 {
        to_f64(self.proton)
    }

    pub fn calculate_mass(&self, formula: impl AsRef<str>) -> Result<f64> {
        self.calculate_exact_mass(formula).map(to_f64)
    }

    /// Like [`BioMassCalc::calculate_mass`], but without leaving exact decimal arithmetic
    pub fn calculate_exact_mass(&self, formula: impl AsRef<str>) -> Result<Decimal> {
        let formula = Formula::new(self.db, formula)?;
        Ok(formula.mass(self.mass_type))
    }

    /// Rewrites `formula` as the difference between its heavy and light forms, like `[13C]6H12ON2 - C6H12ON2`
    pub fn relabel(&self, formula: impl AsRef<str>, label_atoms: LabelAtoms) -> Result<String> {
        let formula = Formula::new(self.db, formula)?;
        Ok(formula.label_difference(label_atoms)?.to_string())
    }

    /// The mass gained by swapping the atoms named by `label_atoms` for their heavy isotopes
    pub fn label_mass(&self, formula: impl AsRef<str>, label_atoms: LabelAtoms) -> Result<f64> {
        let formula = Formula::new(self.db, formula)?;
        let difference = formula.label_difference(label_atoms)?;
        Ok(to_f64(difference.mass(self.mass_type)))
    }
}

// Private Helper Functions ============================================================================================

// NOTE: Every `Decimal` is within the range of an `f64`, so this conversion can only lose precision
fn to_f64(value: Decimal) -> f64 {
    f64::try_from(value).unwrap_or(f64::NAN)
}

// Module Tests ========================================================================================================
