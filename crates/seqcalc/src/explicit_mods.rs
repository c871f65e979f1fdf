// External Crate Imports
use biomass::MassType;

// Local Crate Imports
use crate::{
    ExplicitMod, ExplicitMods, ExplicitSequenceMassCalc, ExplicitSequenceMods, FragmentMassCalc, FragmentTable,
    IonType, IsotopeLabelType, PrecursorMassCalc, Result, SeqCalcError, SequenceMassCalc, TypedExplicitMods,
};

// Public API ==========================================================================================================

impl<'c, 'a> ExplicitSequenceMassCalc<'c, 'a> {
    #[must_use]
    pub const fn new(base: &'c SequenceMassCalc<'a>, mods: ExplicitSequenceMods) -> Self {
        Self { base, mods }
    }

    #[must_use]
    pub const fn base(&self) -> &'c SequenceMassCalc<'a> {
        self.base
    }

    #[must_use]
    pub const fn mods(&self) -> &ExplicitSequenceMods {
        &self.mods
    }
}

impl PrecursorMassCalc for ExplicitSequenceMassCalc<'_, '_> {
    fn precursor_mass(&self, seq: &str) -> f64 {
        self.base.precursor_mass_with(seq, Some(&self.mods))
    }

    fn is_modified(&self, seq: &str) -> bool {
        self.base.is_modified(seq) || self.mods.mods.iter().any(|&m| m != 0.0)
    }

    fn modified_sequence(&self, seq: &str, narrow: bool) -> String {
        self.base.modified_sequence_with(seq, Some(&self.mods), narrow)
    }
}

impl FragmentMassCalc for ExplicitSequenceMassCalc<'_, '_> {
    fn mass_type(&self) -> MassType {
        self.base.mass_type()
    }

    fn fragment_ion_masses(&self, seq: &str) -> FragmentTable {
        self.base.fragment_ion_masses_with(seq, Some(&self.mods))
    }

    fn fragment_mass(&self, seq: &str, ion_type: IonType, ordinal: usize) -> f64 {
        self.base.fragment_mass_with(seq, ion_type, ordinal, Some(&self.mods))
    }

    fn precursor_fragment_mass(&self, seq: &str) -> f64 {
        self.base
            .fragment_mass_with(seq, IonType::Precursor, seq.len(), Some(&self.mods))
    }
}

impl ExplicitMods {
    /// Explicit modifications for the peptide `sequence`. The static modifications, when present, replace the
    /// implicit structural modifications of the settings, unless they are variable modifications, in which case they
    /// are applied on top of them
    pub fn new(
        sequence: &str,
        static_mods: Option<Vec<ExplicitMod>>,
        heavy_mods: Vec<TypedExplicitMods>,
        is_variable_static_mods: bool,
    ) -> Result<Self> {
        let len = sequence.len();
        let all_mods = static_mods
            .iter()
            .flatten()
            .chain(heavy_mods.iter().flat_map(|typed| &typed.mods));
        for ExplicitMod {
            index_aa,
            modification,
        } in all_mods
        {
            if *index_aa >= len {
                return Err(Box::new(SeqCalcError::ExplicitModIndex(
                    modification.name().to_owned(),
                    *index_aa,
                    len,
                )));
            }
        }

        Ok(Self {
            static_mods,
            heavy_mods,
            is_variable_static_mods,
        })
    }

    #[must_use]
    pub fn static_mods(&self) -> Option<&[ExplicitMod]> {
        self.static_mods.as_deref()
    }

    #[must_use]
    pub fn heavy_mods(&self) -> &[TypedExplicitMods] {
        &self.heavy_mods
    }

    #[must_use]
    pub const fn is_variable_static_mods(&self) -> bool {
        self.is_variable_static_mods
    }

    /// The explicit modifications declared for `label_type`, if any were
    #[must_use]
    pub fn mods(&self, label_type: &IsotopeLabelType) -> Option<&[ExplicitMod]> {
        if label_type.is_light() {
            self.static_mods()
        } else {
            self.heavy_mods
                .iter()
                .find(|typed| &typed.label_type == label_type)
                .map(|typed| typed.mods.as_slice())
        }
    }

    #[must_use]
    pub fn is_modified(&self, label_type: &IsotopeLabelType) -> bool {
        self.mods(label_type).is_some()
    }

    #[must_use]
    pub fn has_static_mods(&self) -> bool {
        self.static_mods.is_some()
    }

    #[must_use]
    pub fn has_heavy_mods(&self) -> bool {
        self.heavy_mods.iter().any(|typed| !typed.mods.is_empty())
    }

    /// The explicit structural modifications that fragments can lose mass from
    pub fn loss_mods(&self) -> impl Iterator<Item = &ExplicitMod> {
        self.static_mods
            .iter()
            .flatten()
            .filter(|m| m.modification.has_loss())
    }

    /// The total explicit modification mass on each residue of `sequence`, using the mass type of `calc`. Heavy
    /// label types include the masses of the static modifications too
    pub fn mod_masses(
        &self,
        calc: &SequenceMassCalc,
        sequence: &str,
        label_type: &IsotopeLabelType,
    ) -> Result<Option<Vec<f64>>> {
        let Some(mods) = self.mods(label_type) else {
            return Ok(None);
        };
        let mut masses = residue_masses(calc, sequence, mods)?;
        if let Some(static_mods) = self.static_mods().filter(|_| !label_type.is_light()) {
            let static_masses = residue_masses(calc, sequence, static_mods)?;
            for (mass, static_mass) in masses.iter_mut().zip(static_masses) {
                *mass += static_mass;
            }
        }
        Ok(Some(masses))
    }

    /// The per-residue masses of [`ExplicitMods::mod_masses`], ready for an [`ExplicitSequenceMassCalc`]
    pub fn sequence_mods(
        &self,
        calc: &SequenceMassCalc,
        sequence: &str,
        label_type: &IsotopeLabelType,
    ) -> Result<Option<ExplicitSequenceMods>> {
        let masses = self.mod_masses(calc, sequence, label_type)?;
        Ok(masses.map(|mods| ExplicitSequenceMods::new(mods, self.is_variable_static_mods)))
    }
}

// Private Helper Methods ==============================================================================================

fn residue_masses(calc: &SequenceMassCalc, sequence: &str, mods: &[ExplicitMod]) -> Result<Vec<f64>> {
    let mut masses = vec![0.0; sequence.len()];
    for ExplicitMod {
        index_aa,
        modification,
    } in mods
    {
        let (Some(&aa), Some(mass)) = (sequence.as_bytes().get(*index_aa), masses.get_mut(*index_aa)) else {
            return Err(Box::new(SeqCalcError::ExplicitModIndex(
                modification.name().to_owned(),
                *index_aa,
                sequence.len(),
            )));
        };
        *mass += calc.get_mod_mass(char::from(aa), modification)?;
    }
    Ok(masses)
}

// Module Tests ========================================================================================================
