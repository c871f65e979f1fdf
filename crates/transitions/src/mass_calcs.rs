// External Crate Imports
use seqcalc::{
    AtomicDatabase, ExplicitMods, ExplicitSequenceMassCalc, ExplicitSequenceMods, FragmentMassCalc, FragmentTable,
    IonType, IsotopeLabelType, MassType, PrecursorMassCalc, SequenceMassCalc, TypedMassCalc, get_mz,
};

// Local Crate Imports
use crate::{Result, SrmSettings, TransitionError, TransitionGroup};

// Public API ==========================================================================================================

/// The precursor and fragment mass calculators of every label type that a set of settings describes
#[derive(Clone, Debug)]
pub struct MassCalcs<'a> {
    precursor: Vec<TypedMassCalc<'a>>,
    fragment: Vec<TypedMassCalc<'a>>,
}

/// A calculator for one peptide, which is either shared by every peptide of a label type, or bound to the explicit
/// modifications of this peptide
#[derive(Clone, Debug)]
pub enum PeptideCalc<'c, 'a> {
    Plain(&'c SequenceMassCalc<'a>),
    Explicit(ExplicitSequenceMassCalc<'c, 'a>),
}

impl<'a> MassCalcs<'a> {
    pub fn new(db: &'a AtomicDatabase, settings: &SrmSettings) -> Result<Self> {
        let prediction = settings.prediction;
        let modifications = &settings.modifications;
        let calcs_of = |mass_type: MassType| -> Result<Vec<TypedMassCalc<'a>>> {
            modifications
                .label_types()
                .map(|label_type| -> Result<TypedMassCalc<'a>> {
                    // NOTE: Light calculators get an empty isotope table too, so explicit static modifications can
                    // replace the static modifications of the settings
                    let calc = SequenceMassCalc::new(db, mass_type)?
                        .with_static_mods(modifications.static_mods())?
                        .with_heavy_mods(modifications.heavy_mods_for(&label_type))?;
                    Ok(TypedMassCalc::new(label_type, calc))
                })
                .collect()
        };

        Ok(Self {
            precursor: calcs_of(prediction.precursor_mass_type)?,
            fragment: calcs_of(prediction.fragment_mass_type)?,
        })
    }

    pub fn label_types(&self) -> impl Iterator<Item = &IsotopeLabelType> {
        self.precursor.iter().map(|typed| &typed.label_type)
    }

    /// The precursor calculator of `label_type`, with the explicit modifications of `sequence` applied
    pub fn precursor_calc(
        &self,
        label_type: &IsotopeLabelType,
        sequence: &str,
        mods: Option<&ExplicitMods>,
    ) -> Result<PeptideCalc<'_, 'a>> {
        peptide_calc(find_calc(&self.precursor, label_type)?, label_type, sequence, mods)
    }

    /// The fragment calculator of `label_type`, with the explicit modifications of `sequence` applied
    pub fn fragment_calc(
        &self,
        label_type: &IsotopeLabelType,
        sequence: &str,
        mods: Option<&ExplicitMods>,
    ) -> Result<PeptideCalc<'_, 'a>> {
        peptide_calc(find_calc(&self.fragment, label_type)?, label_type, sequence, mods)
    }

    /// The m/z of the precursor of `group`
    pub fn precursor_mz(&self, group: &TransitionGroup, mods: Option<&ExplicitMods>) -> Result<f64> {
        let calc = self.precursor_calc(group.label_type(), group.peptide(), mods)?;
        Ok(get_mz(calc.precursor_mass(group.peptide()), group.precursor_charge()))
    }
}

impl PrecursorMassCalc for PeptideCalc<'_, '_> {
    fn precursor_mass(&self, seq: &str) -> f64 {
        match self {
            Self::Plain(calc) => calc.precursor_mass(seq),
            Self::Explicit(calc) => calc.precursor_mass(seq),
        }
    }

    fn is_modified(&self, seq: &str) -> bool {
        match self {
            Self::Plain(calc) => calc.is_modified(seq),
            Self::Explicit(calc) => calc.is_modified(seq),
        }
    }

    fn modified_sequence(&self, seq: &str, narrow: bool) -> String {
        match self {
            Self::Plain(calc) => calc.modified_sequence(seq, narrow),
            Self::Explicit(calc) => calc.modified_sequence(seq, narrow),
        }
    }
}

impl FragmentMassCalc for PeptideCalc<'_, '_> {
    fn mass_type(&self) -> MassType {
        match self {
            Self::Plain(calc) => calc.mass_type(),
            Self::Explicit(calc) => calc.mass_type(),
        }
    }

    fn fragment_ion_masses(&self, seq: &str) -> FragmentTable {
        match self {
            Self::Plain(calc) => calc.fragment_ion_masses(seq),
            Self::Explicit(calc) => calc.fragment_ion_masses(seq),
        }
    }

    fn fragment_mass(&self, seq: &str, ion_type: IonType, ordinal: usize) -> f64 {
        match self {
            Self::Plain(calc) => calc.fragment_mass(seq, ion_type, ordinal),
            Self::Explicit(calc) => calc.fragment_mass(seq, ion_type, ordinal),
        }
    }

    fn precursor_fragment_mass(&self, seq: &str) -> f64 {
        match self {
            Self::Plain(calc) => calc.precursor_fragment_mass(seq),
            Self::Explicit(calc) => calc.precursor_fragment_mass(seq),
        }
    }
}

// Private Helper Methods ==============================================================================================

fn find_calc<'c, 'a>(
    calcs: &'c [TypedMassCalc<'a>],
    label_type: &IsotopeLabelType,
) -> Result<&'c SequenceMassCalc<'a>> {
    calcs
        .iter()
        .find(|typed| &typed.label_type == label_type)
        .map(|typed| &typed.calc)
        .ok_or_else(|| Box::new(TransitionError::UnknownLabelType(label_type.name().to_owned())))
}

fn peptide_calc<'c, 'a>(
    base: &'c SequenceMassCalc<'a>,
    label_type: &IsotopeLabelType,
    sequence: &str,
    mods: Option<&ExplicitMods>,
) -> Result<PeptideCalc<'c, 'a>> {
    let Some(mods) = mods else {
        return Ok(PeptideCalc::Plain(base));
    };
    let calc = explicit_sequence_mods(base, label_type, sequence, mods)?
        .map_or(PeptideCalc::Plain(base), |seq_mods| {
            PeptideCalc::Explicit(ExplicitSequenceMassCalc::new(base, seq_mods))
        });
    Ok(calc)
}

/// Heavy label types without explicit modifications of their own still carry the explicit static modifications of
/// the peptide, on top of their isotope modifications
fn explicit_sequence_mods(
    base: &SequenceMassCalc,
    label_type: &IsotopeLabelType,
    sequence: &str,
    mods: &ExplicitMods,
) -> Result<Option<ExplicitSequenceMods>> {
    if let Some(seq_mods) = mods.sequence_mods(base, sequence, label_type)? {
        return Ok(Some(seq_mods));
    }
    if label_type.is_light() || !mods.has_static_mods() {
        return Ok(None);
    }
    Ok(mods.sequence_mods(base, sequence, &IsotopeLabelType::light())?)
}

// Module Tests ========================================================================================================
