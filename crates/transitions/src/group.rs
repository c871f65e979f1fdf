// Standard Library Imports
use std::cmp::Ordering;

// External Crate Imports
use seqcalc::{
    IonType, IsotopeLabelType, MAX_PRECURSOR_CHARGE, MAX_PRODUCT_CHARGE, MIN_PRECURSOR_CHARGE, MIN_PRODUCT_CHARGE,
    get_mz, is_ex_aa,
};

// Local Crate Imports
use crate::{Result, Transition, TransitionError, TransitionGroup, TransitionLosses, TransitionNode};

// Public API ==========================================================================================================

impl TransitionGroup {
    /// A precursor of `peptide`, which must be made of (possibly ambiguous) amino acids, with a charge between
    /// [`MIN_PRECURSOR_CHARGE`] and [`MAX_PRECURSOR_CHARGE`]
    pub fn new(peptide: impl Into<String>, precursor_charge: u32, label_type: IsotopeLabelType) -> Result<Self> {
        if !(MIN_PRECURSOR_CHARGE..=MAX_PRECURSOR_CHARGE).contains(&precursor_charge) {
            return Err(Box::new(TransitionError::PrecursorCharge(
                precursor_charge,
                MIN_PRECURSOR_CHARGE,
                MAX_PRECURSOR_CHARGE,
            )));
        }
        Self::new_unlimited(peptide, precursor_charge, label_type)
    }

    /// Like [`TransitionGroup::new`], but without an upper limit on the precursor charge
    pub fn new_unlimited(
        peptide: impl Into<String>,
        precursor_charge: u32,
        label_type: IsotopeLabelType,
    ) -> Result<Self> {
        let peptide = peptide.into();
        if precursor_charge < MIN_PRECURSOR_CHARGE {
            return Err(Box::new(TransitionError::PrecursorCharge(
                precursor_charge,
                MIN_PRECURSOR_CHARGE,
                u32::MAX,
            )));
        }
        if peptide.is_empty() {
            return Err(Box::new(TransitionError::EmptyPeptide));
        }
        if let Some(residue) = peptide.chars().find(|&c| !is_ex_aa(c)) {
            return Err(Box::new(TransitionError::InvalidSequence(peptide, residue)));
        }

        Ok(Self {
            peptide,
            precursor_charge,
            label_type,
        })
    }

    #[must_use]
    pub fn peptide(&self) -> &str {
        &self.peptide
    }

    #[must_use]
    pub const fn precursor_charge(&self) -> u32 {
        self.precursor_charge
    }

    #[must_use]
    pub const fn label_type(&self) -> &IsotopeLabelType {
        &self.label_type
    }

    /// The number of residues in the peptide
    #[must_use]
    pub fn len(&self) -> usize {
        self.peptide.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peptide.is_empty()
    }
}

impl Transition {
    /// A fragment ion of `group`, produced by cleaving after the residue at `cleavage_offset`
    pub fn new(group: &TransitionGroup, ion_type: IonType, cleavage_offset: usize, charge: u32) -> Result<Self> {
        if ion_type.is_precursor() {
            return Err(Box::new(TransitionError::PrecursorIonType));
        }
        let len = group.len();
        if len < 2 {
            return Err(Box::new(TransitionError::NoFragments(group.peptide().to_owned())));
        }
        if cleavage_offset + 1 >= len {
            return Err(Box::new(TransitionError::CleavageOffset(ion_type, cleavage_offset, len)));
        }
        let max_charge = group.precursor_charge().min(MAX_PRODUCT_CHARGE);
        if !(MIN_PRODUCT_CHARGE..=max_charge).contains(&charge) {
            return Err(Box::new(TransitionError::ProductCharge(
                charge,
                MIN_PRODUCT_CHARGE,
                MAX_PRODUCT_CHARGE,
                group.precursor_charge(),
            )));
        }

        Ok(Self::from_parts(ion_type, cleavage_offset, charge))
    }

    /// The intact precursor of `group`, which sits at the last residue and carries the precursor charge
    #[must_use]
    pub fn precursor(group: &TransitionGroup) -> Self {
        Self::from_parts(IonType::Precursor, group.len() - 1, group.precursor_charge())
    }

    #[must_use]
    pub const fn ion_type(&self) -> IonType {
        self.ion_type
    }

    #[must_use]
    pub const fn cleavage_offset(&self) -> usize {
        self.cleavage_offset
    }

    #[must_use]
    pub const fn charge(&self) -> u32 {
        self.charge
    }

    #[must_use]
    pub const fn is_precursor(&self) -> bool {
        self.ion_type.is_precursor()
    }

    /// The number of residues in this fragment of a `sequence_len` residue peptide
    #[must_use]
    pub const fn ordinal(&self, sequence_len: usize) -> usize {
        if self.is_precursor() {
            sequence_len
        } else {
            self.ion_type.ordinal(self.cleavage_offset, sequence_len)
        }
    }

    /// A short name for this transition, like `y5++` or `precursor+`
    #[must_use]
    pub fn label(&self, sequence_len: usize) -> String {
        let charge = "+".repeat(self.charge as usize);
        if self.is_precursor() {
            format!("{}{charge}", self.ion_type)
        } else {
            format!("{}{}{charge}", self.ion_type, self.ordinal(sequence_len))
        }
    }

    pub(crate) const fn from_parts(ion_type: IonType, cleavage_offset: usize, charge: u32) -> Self {
        Self {
            ion_type,
            cleavage_offset,
            charge,
        }
    }
}

impl TransitionNode {
    /// The total mass of this transition's neutral losses, or zero when there are none
    #[must_use]
    pub fn lost_mass(&self) -> f64 {
        self.losses.as_ref().map_or(0.0, TransitionLosses::mass)
    }

    /// The mass+H of the measured ion, after its neutral losses
    #[must_use]
    pub fn ion_mass_h(&self) -> f64 {
        lose_mass(self.mass_h, self.losses.as_ref())
    }

    #[must_use]
    pub fn ion_mz(&self) -> f64 {
        get_mz(self.ion_mass_h(), self.transition.charge())
    }

    /// The order transitions are listed in: by ion type, then charge, then cleavage offset, then lost mass. The
    /// precursor comes after every fragment ion
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.transition, &other.transition);
        a.ion_type
            .cmp(&b.ion_type)
            .then(a.charge.cmp(&b.charge))
            .then(a.cleavage_offset.cmp(&b.cleavage_offset))
            .then_with(|| self.lost_mass().total_cmp(&other.lost_mass()))
    }
}

// Private Helper Methods ==============================================================================================

pub(crate) fn lose_mass(mass_h: f64, losses: Option<&TransitionLosses>) -> f64 {
    mass_h - losses.map_or(0.0, TransitionLosses::mass)
}

// Module Tests ========================================================================================================
