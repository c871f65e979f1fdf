// Standard Library Imports
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

// External Crate Imports
use seqcalc::{AtomicDatabase, IsotopeLabelType, MassType, StaticMod};

// Local Crate Imports
use crate::{
    LibraryPick, PeptideModifications, Result, SrmSettings, TransitionError, TransitionInstrument, TransitionLibraries,
    TransitionPrediction, TypedModifications, settings_kdl,
};

const DEFAULT_SETTINGS_KDL: &str = include_str!("../default_settings.kdl");

// Public API ==========================================================================================================

impl SrmSettings {
    /// Loads and validates settings from KDL text, reporting problems against the node they come from
    pub fn from_kdl(db: &AtomicDatabase, file_name: impl AsRef<str>, text: impl AsRef<str>) -> miette::Result<Self> {
        settings_kdl::parse_settings(db, file_name.as_ref(), text.as_ref())
    }
}

impl Default for SrmSettings {
    fn default() -> Self {
        // NOTE: The bundled settings are covered by the tests below, so failing to load them is a build defect
        Self::from_kdl(&AtomicDatabase::default(), "default_settings.kdl", DEFAULT_SETTINGS_KDL)
            .expect("the bundled default settings failed to load")
    }
}

impl TransitionPrediction {
    #[must_use]
    pub const fn new(precursor_mass_type: MassType, fragment_mass_type: MassType) -> Self {
        Self {
            precursor_mass_type,
            fragment_mass_type,
        }
    }
}

impl TransitionLibraries {
    pub const MIN_MATCH_TOLERANCE: f64 = 0.1;
    pub const MAX_MATCH_TOLERANCE: f64 = 1.0;
    pub const MIN_ION_COUNT: usize = 1;
    pub const MAX_ION_COUNT: usize = 10;

    pub fn new(ion_match_tolerance: f64, ion_count: usize, pick: LibraryPick) -> Result<Self> {
        if !(Self::MIN_MATCH_TOLERANCE..=Self::MAX_MATCH_TOLERANCE).contains(&ion_match_tolerance) {
            return Err(Box::new(TransitionError::IonMatchTolerance(
                ion_match_tolerance,
                Self::MIN_MATCH_TOLERANCE,
                Self::MAX_MATCH_TOLERANCE,
            )));
        }
        if !(Self::MIN_ION_COUNT..=Self::MAX_ION_COUNT).contains(&ion_count) {
            return Err(Box::new(TransitionError::IonCount(
                ion_count,
                Self::MIN_ION_COUNT,
                Self::MAX_ION_COUNT,
            )));
        }
        Ok(Self {
            ion_match_tolerance,
            ion_count,
            pick,
        })
    }

    #[must_use]
    pub const fn ion_match_tolerance(&self) -> f64 {
        self.ion_match_tolerance
    }

    /// How many of the most intense library peaks are ranked
    #[must_use]
    pub const fn ion_count(&self) -> usize {
        self.ion_count
    }

    #[must_use]
    pub const fn pick(&self) -> LibraryPick {
        self.pick
    }
}

impl Display for LibraryPick {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::All => "all",
            Self::Filter => "filter",
            Self::AllPlus => "all_plus",
        };
        write!(f, "{name}")
    }
}

impl FromStr for LibraryPick {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "all" => Ok(Self::All),
            "filter" => Ok(Self::Filter),
            "all_plus" => Ok(Self::AllPlus),
            _ => Err(s.to_owned()),
        }
    }
}

impl TransitionInstrument {
    pub const MIN_MEASURABLE_MZ: u32 = 10;
    pub const MAX_MEASURABLE_MZ: u32 = 10_000;
    pub const MIN_MZ_RANGE: u32 = 100;
    pub const MIN_MZ_MATCH_TOLERANCE: f64 = 0.0001;
    pub const MAX_MZ_MATCH_TOLERANCE: f64 = 0.6;

    pub fn new(min_mz: u32, max_mz: u32, is_dynamic_min: bool, mz_match_tolerance: f64) -> Result<Self> {
        let highest_min_mz = Self::MAX_MEASURABLE_MZ - Self::MIN_MZ_RANGE;
        if !(Self::MIN_MEASURABLE_MZ..=highest_min_mz).contains(&min_mz) {
            return Err(Box::new(TransitionError::InstrumentMinMz(
                min_mz,
                Self::MIN_MEASURABLE_MZ,
                highest_min_mz,
            )));
        }
        if max_mz < min_mz + Self::MIN_MZ_RANGE {
            return Err(Box::new(TransitionError::InstrumentMzRange(
                max_mz,
                Self::MIN_MZ_RANGE,
                min_mz,
            )));
        }
        if max_mz > Self::MAX_MEASURABLE_MZ {
            return Err(Box::new(TransitionError::InstrumentMaxMz(
                max_mz,
                Self::MAX_MEASURABLE_MZ,
            )));
        }
        if !(Self::MIN_MZ_MATCH_TOLERANCE..=Self::MAX_MZ_MATCH_TOLERANCE).contains(&mz_match_tolerance) {
            return Err(Box::new(TransitionError::MzMatchTolerance(
                mz_match_tolerance,
                Self::MIN_MZ_MATCH_TOLERANCE,
                Self::MAX_MZ_MATCH_TOLERANCE,
            )));
        }
        Ok(Self {
            min_mz,
            max_mz,
            is_dynamic_min,
            mz_match_tolerance,
        })
    }

    #[must_use]
    pub const fn min_mz(&self) -> u32 {
        self.min_mz
    }

    #[must_use]
    pub const fn max_mz(&self) -> u32 {
        self.max_mz
    }

    #[must_use]
    pub const fn is_dynamic_min(&self) -> bool {
        self.is_dynamic_min
    }

    #[must_use]
    pub const fn mz_match_tolerance(&self) -> f64 {
        self.mz_match_tolerance
    }

    /// The lowest measurable m/z for product ions of a precursor. A dynamic minimum tracks the low-mass cutoff of an
    /// ion trap, at roughly a quarter of the precursor m/z, rounded down to a multiple of 5
    #[must_use]
    pub fn min_mz_for(&self, precursor_mz: f64) -> f64 {
        if self.is_dynamic_min {
            dynamic_min_mz(precursor_mz)
        } else {
            f64::from(self.min_mz)
        }
    }

    #[must_use]
    pub fn is_measurable(&self, mz: f64, precursor_mz: f64) -> bool {
        let min_mz = self.min_mz_for(precursor_mz);
        // NOTE: Ions sitting exactly on a dynamic cutoff are ejected from the trap
        if self.is_dynamic_min && mz <= min_mz {
            return false;
        }
        (min_mz..=f64::from(self.max_mz)).contains(&mz)
    }

    #[must_use]
    pub fn is_mz_match(&self, mz1: f64, mz2: f64) -> bool {
        (mz1 - mz2).abs() <= self.mz_match_tolerance
    }
}

impl TypedModifications {
    pub fn new(label_type: IsotopeLabelType, modifications: Vec<StaticMod>) -> Result<Self> {
        if label_type.is_light() {
            return Err(Box::new(TransitionError::LightHeavyMods));
        }
        Ok(Self {
            label_type,
            modifications,
        })
    }

    #[must_use]
    pub const fn label_type(&self) -> &IsotopeLabelType {
        &self.label_type
    }

    #[must_use]
    pub fn modifications(&self) -> &[StaticMod] {
        &self.modifications
    }
}

impl PeptideModifications {
    pub const MIN_NEUTRAL_LOSSES: usize = 1;
    pub const MAX_NEUTRAL_LOSSES: usize = 5;

    pub fn new(
        static_mods: Vec<StaticMod>,
        heavy_mods: Vec<TypedModifications>,
        max_neutral_losses: usize,
    ) -> Result<Self> {
        if !(Self::MIN_NEUTRAL_LOSSES..=Self::MAX_NEUTRAL_LOSSES).contains(&max_neutral_losses) {
            return Err(Box::new(TransitionError::MaxNeutralLosses(
                max_neutral_losses,
                Self::MIN_NEUTRAL_LOSSES,
                Self::MAX_NEUTRAL_LOSSES,
            )));
        }
        for (i, typed_mods) in heavy_mods.iter().enumerate() {
            let label_type = typed_mods.label_type();
            if heavy_mods[..i].iter().any(|earlier| earlier.label_type() == label_type) {
                return Err(Box::new(TransitionError::DuplicateLabelType(
                    label_type.name().to_owned(),
                )));
            }
        }
        Ok(Self {
            static_mods,
            heavy_mods,
            max_neutral_losses,
        })
    }

    #[must_use]
    pub fn static_mods(&self) -> &[StaticMod] {
        &self.static_mods
    }

    #[must_use]
    pub fn heavy_mods(&self) -> &[TypedModifications] {
        &self.heavy_mods
    }

    /// The isotope modifications of a label type, which is empty for the light label type
    #[must_use]
    pub fn heavy_mods_for(&self, label_type: &IsotopeLabelType) -> &[StaticMod] {
        self.heavy_mods
            .iter()
            .find(|typed_mods| typed_mods.label_type() == label_type)
            .map(TypedModifications::modifications)
            .unwrap_or_default()
    }

    /// Every label type these modifications describe, starting with the light label type
    pub fn label_types(&self) -> impl Iterator<Item = IsotopeLabelType> + '_ {
        std::iter::once(IsotopeLabelType::light())
            .chain(self.heavy_mods.iter().map(|typed_mods| typed_mods.label_type().clone()))
    }

    #[must_use]
    pub const fn max_neutral_losses(&self) -> usize {
        self.max_neutral_losses
    }

    /// Static modifications applied to every matching residue that can lose mass in fragmentation
    pub fn neutral_loss_mods(&self) -> impl Iterator<Item = &StaticMod> {
        self.static_mods
            .iter()
            .filter(|modification| modification.has_loss() && !modification.is_explicit())
    }

    #[must_use]
    pub fn has_neutral_losses(&self) -> bool {
        self.neutral_loss_mods().next().is_some()
    }
}

// Private Helper Methods ==============================================================================================

fn dynamic_min_mz(precursor_mz: f64) -> f64 {
    const ACTIVATION_Q: f64 = 0.25;
    // NOTE: Truncation is intended, and a negative m/z never reaches here
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cutoff = (precursor_mz * (ACTIVATION_Q / 0.908)) as u32;
    f64::from(cutoff / 5 * 5)
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;
    use seqcalc::IonType;

    use crate::{
        EndFinder, MeasuredIon, StartFinder, TransitionFilter,
        testing_tools::{DB, carbamidomethyl, phospho},
    };

    use super::*;

    #[test]
    fn default_settings() {
        let settings = SrmSettings::default();

        assert_eq!(settings.prediction, TransitionPrediction::default());
        assert_eq!(settings.prediction.precursor_mass_type, MassType::Monoisotopic);

        let filter = &settings.filter;
        assert_eq!(filter.precursor_charges(), [2]);
        assert_eq!(filter.product_charges(), [1]);
        assert_eq!(filter.ion_types(), [IonType::Y]);
        assert_eq!(filter.start_finder(), StartFinder::Mz(0));
        assert_eq!(filter.end_finder(), EndFinder::Count(3));
        assert_eq!(filter.measured_ions(), [MeasuredIon::n_term_proline()]);
        assert_float_absolute_eq!(filter.precursor_mz_window(), 0.0);
        assert!(filter.auto_select());

        let libraries = settings.libraries;
        assert_float_absolute_eq!(libraries.ion_match_tolerance(), 0.5);
        assert_eq!(libraries.ion_count(), 3);
        assert_eq!(libraries.pick(), LibraryPick::All);

        let instrument = settings.instrument;
        assert_eq!((instrument.min_mz(), instrument.max_mz()), (50, 1500));
        assert!(!instrument.is_dynamic_min());
        assert_float_absolute_eq!(instrument.mz_match_tolerance(), 0.055);

        let modifications = &settings.modifications;
        assert_eq!(modifications.static_mods(), [carbamidomethyl()]);
        assert!(modifications.heavy_mods().is_empty());
        assert_eq!(modifications.max_neutral_losses(), 1);
        assert!(!modifications.has_neutral_losses());
    }

    #[test]
    fn library_settings() {
        let libraries = TransitionLibraries::new(0.7, 5, LibraryPick::Filter).unwrap();
        assert_float_absolute_eq!(libraries.ion_match_tolerance(), 0.7);
        assert_eq!(libraries.ion_count(), 5);
        assert_eq!(libraries.pick(), LibraryPick::Filter);

        assert_eq!(
            *TransitionLibraries::new(0.05, 3, LibraryPick::All).unwrap_err(),
            TransitionError::IonMatchTolerance(0.05, 0.1, 1.0)
        );
        assert_eq!(
            *TransitionLibraries::new(0.5, 0, LibraryPick::All).unwrap_err(),
            TransitionError::IonCount(0, 1, 10)
        );
        assert_eq!(
            *TransitionLibraries::new(0.5, 11, LibraryPick::All).unwrap_err(),
            TransitionError::IonCount(11, 1, 10)
        );
    }

    #[test]
    fn library_pick_names() {
        for pick in [LibraryPick::None, LibraryPick::All, LibraryPick::Filter, LibraryPick::AllPlus] {
            assert_eq!(pick.to_string().parse(), Ok(pick));
        }
        assert_eq!("all_plus".parse(), Ok(LibraryPick::AllPlus));
        assert_eq!("everything".parse::<LibraryPick>(), Err("everything".to_owned()));
        assert_eq!(LibraryPick::default(), LibraryPick::All);
    }

    #[test]
    fn instrument_limits() {
        assert!(TransitionInstrument::new(10, 110, false, 0.0001).is_ok());
        assert!(TransitionInstrument::new(9900, 10_000, true, 0.6).is_ok());

        assert_eq!(
            *TransitionInstrument::new(5, 1500, false, 0.055).unwrap_err(),
            TransitionError::InstrumentMinMz(5, 10, 9900)
        );
        assert_eq!(
            *TransitionInstrument::new(9950, 10_050, false, 0.055).unwrap_err(),
            TransitionError::InstrumentMinMz(9950, 10, 9900)
        );
        assert_eq!(
            *TransitionInstrument::new(500, 599, false, 0.055).unwrap_err(),
            TransitionError::InstrumentMzRange(599, 100, 500)
        );
        assert_eq!(
            *TransitionInstrument::new(500, 10_001, false, 0.055).unwrap_err(),
            TransitionError::InstrumentMaxMz(10_001, 10_000)
        );
        assert_eq!(
            *TransitionInstrument::new(50, 1500, false, 0.7).unwrap_err(),
            TransitionError::MzMatchTolerance(0.7, 0.0001, 0.6)
        );
    }

    #[test]
    fn measurable_mz() {
        let fixed = TransitionInstrument::new(50, 1500, false, 0.055).unwrap();
        assert_float_absolute_eq!(fixed.min_mz_for(1000.0), 50.0);
        assert!(fixed.is_measurable(50.0, 1000.0));
        assert!(fixed.is_measurable(1500.0, 1000.0));
        assert!(!fixed.is_measurable(49.9, 1000.0));
        assert!(!fixed.is_measurable(1500.1, 1000.0));

        let dynamic = TransitionInstrument::new(50, 1500, true, 0.055).unwrap();
        // 1000 · 0.25 / 0.908 = 275.33, which rounds down to 275
        assert_float_absolute_eq!(dynamic.min_mz_for(1000.0), 275.0);
        // 400.687 · 0.25 / 0.908 = 110.32, which rounds down to 110
        assert_float_absolute_eq!(dynamic.min_mz_for(400.687_258), 110.0);
        assert!(!dynamic.is_measurable(275.0, 1000.0));
        assert!(dynamic.is_measurable(275.1, 1000.0));
        assert!(dynamic.is_measurable(100.0, 300.0));

        assert!(fixed.is_mz_match(400.687, 400.74));
        assert!(!fixed.is_mz_match(400.687, 400.75));
    }

    #[test]
    fn peptide_modifications() {
        let heavy = IsotopeLabelType::heavy();
        let heavy_k = StaticMod::new(
            &DB,
            seqcalc::StaticModDefinition {
                name: "Label:13C(6) (K)".to_owned(),
                amino_acids: Some("K".to_owned()),
                label_atoms: seqcalc::LabelAtoms::C13,
                ..Default::default()
            },
        )
        .unwrap();
        let typed = TypedModifications::new(heavy.clone(), vec![heavy_k.clone()]).unwrap();
        let mods = PeptideModifications::new(vec![carbamidomethyl(), phospho()], vec![typed.clone()], 2).unwrap();

        assert_eq!(mods.static_mods().len(), 2);
        assert_eq!(mods.heavy_mods_for(&heavy), [heavy_k]);
        assert!(mods.heavy_mods_for(&IsotopeLabelType::light()).is_empty());
        assert_eq!(
            mods.label_types().collect::<Vec<_>>(),
            [IsotopeLabelType::light(), heavy.clone()]
        );
        let loss_mods: Vec<_> = mods.neutral_loss_mods().map(StaticMod::name).collect();
        assert_eq!(loss_mods, ["Phospho (ST)"]);
        assert!(mods.has_neutral_losses());

        // Explicit modifications only lose mass where they're declared
        let explicit = PeptideModifications::new(vec![phospho().to_explicit(true)], Vec::new(), 1).unwrap();
        assert!(!explicit.has_neutral_losses());

        assert_eq!(
            *TypedModifications::new(IsotopeLabelType::light(), Vec::new()).unwrap_err(),
            TransitionError::LightHeavyMods
        );
        assert_eq!(
            *PeptideModifications::new(Vec::new(), vec![typed.clone(), typed], 1).unwrap_err(),
            TransitionError::DuplicateLabelType("heavy".to_owned())
        );
        assert_eq!(
            *PeptideModifications::new(Vec::new(), Vec::new(), 6).unwrap_err(),
            TransitionError::MaxNeutralLosses(6, 1, 5)
        );
        assert_eq!(
            *PeptideModifications::new(Vec::new(), Vec::new(), 0).unwrap_err(),
            TransitionError::MaxNeutralLosses(0, 1, 5)
        );
    }

    #[test]
    fn settings_from_code_match_the_defaults() {
        let filter = TransitionFilter::new(
            vec![2],
            vec![1],
            vec![IonType::Y],
            StartFinder::DEFAULT,
            EndFinder::DEFAULT,
            vec![MeasuredIon::n_term_proline()],
            0.0,
            true,
        )
        .unwrap();
        let settings = SrmSettings {
            prediction: TransitionPrediction::new(MassType::Monoisotopic, MassType::Monoisotopic),
            filter,
            libraries: TransitionLibraries::new(0.5, 3, LibraryPick::All).unwrap(),
            instrument: TransitionInstrument::new(50, 1500, false, 0.055).unwrap(),
            modifications: PeptideModifications::new(vec![carbamidomethyl()], Vec::new(), 1).unwrap(),
        };
        assert_eq!(settings, SrmSettings::default());
    }
}
