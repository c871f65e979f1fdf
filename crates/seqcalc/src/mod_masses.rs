// External Crate Imports
use biomass::BioMassCalc;

// Local Crate Imports
use crate::{ModMasses, ModTerminus, Result, StaticMod, amino_acid_formula};

// Public API ==========================================================================================================

impl ModMasses {
    pub const EMPTY: Self = Self {
        interior: [0.0; 128],
        n_term: [0.0; 128],
        c_term: [0.0; 128],
        cleave_n: 0.0,
        cleave_c: 0.0,
    };

    /// Sums the masses of `mods` into a fresh set of tables
    pub fn new<'m>(calc: &BioMassCalc, mods: impl IntoIterator<Item = &'m StaticMod>) -> Result<Self> {
        Self::EMPTY.with_mods(calc, mods)
    }

    /// Returns these tables with the masses of `mods` added on top. Explicit (and variable) modifications only ever
    /// apply to the residues they're declared on, so they're skipped here
    pub fn with_mods<'m>(
        self,
        calc: &BioMassCalc,
        mods: impl IntoIterator<Item = &'m StaticMod>,
    ) -> Result<Self> {
        mods.into_iter()
            .filter(|modification| !modification.is_explicit())
            .try_fold(self, |masses, modification| masses.with_mod(calc, modification))
    }

    #[must_use]
    pub fn interior(&self, residue: u8) -> f64 {
        lookup(&self.interior, residue)
    }

    #[must_use]
    pub fn n_term(&self, residue: u8) -> f64 {
        lookup(&self.n_term, residue)
    }

    #[must_use]
    pub fn c_term(&self, residue: u8) -> f64 {
        lookup(&self.c_term, residue)
    }

    #[must_use]
    pub const fn cleave_n(&self) -> f64 {
        self.cleave_n
    }

    #[must_use]
    pub const fn cleave_c(&self) -> f64 {
        self.cleave_c
    }
}

// Private Helper Methods ==============================================================================================

impl ModMasses {
    fn with_mod(mut self, calc: &BioMassCalc, modification: &StaticMod) -> Result<Self> {
        match (modification.amino_acids(), modification.terminus()) {
            // Terminal modifications without residues shift the cleavage masses
            (None, Some(terminus)) => {
                let mass = modification.mass_on(calc, '\0')?;
                match terminus {
                    ModTerminus::N => self.cleave_n += mass,
                    ModTerminus::C => self.cleave_c += mass,
                }
            }
            // Without residues or a terminus, every amino acid is modified
            (None, None) => {
                for aa in ('A'..='Z').filter(|&aa| amino_acid_formula(aa).is_some()) {
                    let mass = modification.mass_on(calc, aa)?;
                    add_mass(&mut self.interior, aa, mass);
                }
            }
            (Some(amino_acids), terminus) => {
                let table = match terminus {
                    None => &mut self.interior,
                    Some(ModTerminus::N) => &mut self.n_term,
                    Some(ModTerminus::C) => &mut self.c_term,
                };
                for &aa in amino_acids {
                    let mass = modification.mass_on(calc, aa)?;
                    add_mass(table, aa, mass);
                }
            }
        }
        Ok(self)
    }
}

// NOTE: Lowercase residues share the masses of their uppercase counterparts
fn add_mass(table: &mut [f64; 128], aa: char, mass: f64) {
    for residue in [aa.to_ascii_uppercase(), aa.to_ascii_lowercase()] {
        if let Some(entry) = table.get_mut(residue as usize) {
            *entry += mass;
        }
    }
}

fn lookup(table: &[f64; 128], residue: u8) -> f64 {
    table.get(usize::from(residue)).copied().unwrap_or_default()
}

// Module Tests ========================================================================================================
