// Standard Library Imports
use std::iter::Rev;
use std::slice::Iter;

// External Crate Imports
use itertools::Either;

// Local Crate Imports
use crate::{FragmentTable, IonType};

// Public API ==========================================================================================================

impl FragmentTable {
    /// A table of `width` cleavage sites, with every mass set to zero
    pub(crate) fn zeroed(width: usize) -> Self {
        Self {
            masses: std::array::from_fn(|_| vec![0.0; width]),
        }
    }

    /// The number of cleavage sites, one fewer than the number of residues
    #[must_use]
    pub fn len(&self) -> usize {
        self.masses[0].len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mass+H of the `ion_type` fragment produced by cleaving after residue `offset`. There are no precursor
    /// fragments, so that always returns `None`
    #[must_use]
    pub fn get(&self, ion_type: IonType, offset: usize) -> Option<f64> {
        self.series(ion_type)?.get(offset).copied()
    }

    /// Every fragment of one ion series, in cleavage offset order
    #[must_use]
    pub fn series(&self, ion_type: IonType) -> Option<&[f64]> {
        let index = IonType::FRAGMENTS.iter().position(|&t| t == ion_type)?;
        Some(&self.masses[index])
    }

    /// Every fragment of one ion series in ordinal order: N-terminal ions from the N-terminus and C-terminal ions
    /// from the C-terminus, so the first mass is always that of the smallest fragment
    pub fn fragment_masses(
        &self,
        ion_type: IonType,
    ) -> impl Iterator<Item = f64> + '_ {
        let series = self.series(ion_type).unwrap_or_default();
        let ordered: Either<Iter<'_, f64>, Rev<Iter<'_, f64>>> = if ion_type.is_n_terminal() {
            Either::Left(series.iter())
        } else {
            Either::Right(series.iter().rev())
        };
        ordered.copied()
    }

    pub(crate) fn set(&mut self, ion_type: IonType, offset: usize, mass: f64) {
        if let Some(index) = IonType::FRAGMENTS.iter().position(|&t| t == ion_type) {
            if let Some(entry) = self.masses[index].get_mut(offset) {
                *entry = mass;
            }
        }
    }
}

// Module Tests ========================================================================================================
