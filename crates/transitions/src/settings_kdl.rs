// Standard Library Imports
use std::collections::{HashMap, hash_map::Entry};

// External Crate Imports
use biomass::BiomassError;
use knuffel::{
    Decode,
    span::{Span, Spanned},
};
use miette::{Diagnostic, LabeledSpan, NamedSource, Result};
use seqcalc::{
    AtomicDatabase, FragmentLoss, IonType, IsotopeLabelType, LabelAtoms, MassType, ModTerminus, SeqCalcError,
    StaticMod, StaticModDefinition,
};
use thiserror::Error;

// Local Crate Imports
use crate::{
    EndFinder, LibraryPick, MeasuredIon, PeptideModifications, SrmSettings, StartFinder, TransitionError,
    TransitionFilter, TransitionInstrument, TransitionLibraries, TransitionPrediction, TypedModifications,
};

// Public API ==========================================================================================================

pub(crate) fn parse_settings(db: &AtomicDatabase, file_name: &str, kdl_text: &str) -> Result<SrmSettings> {
    let parsed_settings: SrmSettingsKdl = knuffel::parse(file_name, kdl_text)?;
    parsed_settings
        .validate(db)
        .map_err(|e| e.finalize(file_name, kdl_text).into())
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct SrmSettingsKdl {
    #[knuffel(child)]
    prediction: PredictionKdl,
    #[knuffel(child)]
    filter: FilterKdl,
    #[knuffel(child)]
    libraries: LibrariesKdl,
    #[knuffel(child)]
    instrument: InstrumentKdl,
    #[knuffel(child)]
    modifications: ModificationsKdl,
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct PredictionKdl {
    #[knuffel(child, unwrap(argument))]
    precursor_mass_type: NameKdl,
    #[knuffel(child, unwrap(argument))]
    fragment_mass_type: NameKdl,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct FilterKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(child, unwrap(arguments))]
    precursor_charges: Vec<u32>,
    #[knuffel(child, unwrap(arguments))]
    product_charges: Vec<u32>,
    #[knuffel(child, unwrap(arguments))]
    ion_types: Vec<NameKdl>,
    #[knuffel(child, unwrap(argument))]
    first_fragment: NameKdl,
    #[knuffel(child, unwrap(argument))]
    last_fragment: NameKdl,
    #[knuffel(child, unwrap(argument))]
    precursor_mz_window: f64,
    #[knuffel(child, unwrap(argument))]
    auto_select: bool,
    #[knuffel(child, unwrap(children))]
    measured_ions: Vec<MeasuredIonKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct MeasuredIonKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(argument)]
    name: String,
    #[knuffel(property)]
    fragment: String,
    #[knuffel(property)]
    restrict: Option<String>,
    #[knuffel(property)]
    terminus: NameKdl,
    #[knuffel(property(name = "min-length"))]
    min_fragment_length: usize,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct LibrariesKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(child, unwrap(argument))]
    ion_match_tolerance: f64,
    #[knuffel(child, unwrap(argument))]
    ion_count: usize,
    #[knuffel(child, unwrap(argument))]
    pick: NameKdl,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct InstrumentKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(child, unwrap(argument))]
    min_mz: u32,
    #[knuffel(child, unwrap(argument))]
    max_mz: u32,
    #[knuffel(child, unwrap(argument))]
    dynamic_min: bool,
    #[knuffel(child, unwrap(argument))]
    mz_match_tolerance: f64,
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ModificationsKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(child, unwrap(argument))]
    max_neutral_losses: usize,
    #[knuffel(child, unwrap(children))]
    static_mods: Vec<ModKdl>,
    #[knuffel(children(name = "heavy"))]
    heavy_mods: Vec<HeavyModsKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct HeavyModsKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(argument)]
    label_type: String,
    #[knuffel(property(name = "sort-order"))]
    sort_order: Option<u32>,
    #[knuffel(children)]
    modifications: Vec<ModKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ModKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(argument)]
    name: String,
    #[knuffel(property(name = "aa"))]
    amino_acids: Option<String>,
    #[knuffel(property)]
    terminus: Option<NameKdl>,
    #[knuffel(property(name = "variable"), default)]
    is_variable: bool,
    #[knuffel(property(name = "explicit"), default)]
    is_explicit: bool,
    #[knuffel(property)]
    formula: Option<String>,
    #[knuffel(property)]
    labels: Option<NameKdl>,
    #[knuffel(property)]
    mono: Option<f64>,
    #[knuffel(property)]
    average: Option<f64>,
    #[knuffel(children(name = "loss"))]
    losses: Vec<LossKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct LossKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(property)]
    formula: Option<String>,
    #[knuffel(property)]
    mono: Option<f64>,
    #[knuffel(property)]
    average: Option<f64>,
}

// NOTE: Any string value that's parsed after decoding, so errors can point back at it
type NameKdl = Spanned<String, Span>;

// Contextual Validation Trait  ========================================================================================

type SettingsResult<T> = Result<T, SettingsErrorKind>;

trait ValidateInto<'c, T> {
    type Context: 'c;

    fn validate(self, ctx: Self::Context) -> SettingsResult<T>;
}

// Settings Validation =================================================================================================

impl<'a> ValidateInto<'a, SrmSettings> for SrmSettingsKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> SettingsResult<SrmSettings> {
        Ok(SrmSettings {
            prediction: self.prediction.validate(())?,
            filter: self.filter.validate(())?,
            libraries: self.libraries.validate(())?,
            instrument: self.instrument.validate(())?,
            modifications: self.modifications.validate(ctx)?,
        })
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl ValidateInto<'_, TransitionPrediction> for PredictionKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> SettingsResult<TransitionPrediction> {
        Ok(TransitionPrediction::new(
            mass_type(&self.precursor_mass_type)?,
            mass_type(&self.fragment_mass_type)?,
        ))
    }
}

// Validate the Transition Filter ======================================================================================

impl ValidateInto<'_, TransitionFilter> for FilterKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> SettingsResult<TransitionFilter> {
        let ion_types = self
            .ion_types
            .iter()
            .map(|ion_type| {
                ion_type
                    .parse::<IonType>()
                    .map_err(|e| SettingsErrorKind::UnknownIonType(ion_type.span().clone(), e))
            })
            .collect::<Result<_, _>>()?;
        let start_finder = self
            .first_fragment
            .parse::<StartFinder>()
            .map_err(|e| SettingsErrorKind::Finder(self.first_fragment.span().clone(), *e))?;
        let end_finder = self
            .last_fragment
            .parse::<EndFinder>()
            .map_err(|e| SettingsErrorKind::Finder(self.last_fragment.span().clone(), *e))?;
        let measured_ions = self
            .measured_ions
            .into_iter()
            .map(|ion| ion.validate(()))
            .collect::<Result<_, _>>()?;

        TransitionFilter::new(
            self.precursor_charges,
            self.product_charges,
            ion_types,
            start_finder,
            end_finder,
            measured_ions,
            self.precursor_mz_window,
            self.auto_select,
        )
        .map_err(|e| SettingsErrorKind::Filter(self.span.clone(), *e))
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl ValidateInto<'_, MeasuredIon> for MeasuredIonKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> SettingsResult<MeasuredIon> {
        let terminus = terminus(&self.terminus)?;
        MeasuredIon::new(
            self.name,
            &self.fragment,
            self.restrict.as_deref(),
            terminus,
            self.min_fragment_length,
        )
        .map_err(|e| SettingsErrorKind::MeasuredIon(self.span.clone(), *e))
    }
}

// Validate Libraries and Instrument ===================================================================================

impl ValidateInto<'_, TransitionLibraries> for LibrariesKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> SettingsResult<TransitionLibraries> {
        let pick = self
            .pick
            .parse::<LibraryPick>()
            .map_err(|e| SettingsErrorKind::UnknownPick(self.pick.span().clone(), e))?;
        TransitionLibraries::new(self.ion_match_tolerance, self.ion_count, pick)
            .map_err(|e| SettingsErrorKind::Libraries(self.span.clone(), *e))
    }
}

impl ValidateInto<'_, TransitionInstrument> for InstrumentKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> SettingsResult<TransitionInstrument> {
        TransitionInstrument::new(
            self.min_mz,
            self.max_mz,
            self.dynamic_min,
            self.mz_match_tolerance,
        )
        .map_err(|e| SettingsErrorKind::Instrument(self.span.clone(), *e))
    }
}

// Validate Modifications ==============================================================================================

impl<'a> ValidateInto<'a, PeptideModifications> for ModificationsKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> SettingsResult<PeptideModifications> {
        let static_mods = self
            .static_mods
            .into_iter()
            .map(|m| m.validate(ctx))
            .collect::<Result<_, _>>()?;

        let mut seen_label_types = HashMap::new();
        let mut heavy_mods = Vec::with_capacity(self.heavy_mods.len());
        for (i, typed_mods) in self.heavy_mods.into_iter().enumerate() {
            match seen_label_types.entry(typed_mods.label_type.clone()) {
                Entry::Occupied(e) => {
                    let (label_type, first_defined_at) = e.remove_entry();
                    return Err(SettingsErrorKind::DuplicateLabelType(
                        first_defined_at,
                        typed_mods.span.clone(),
                        label_type,
                    ));
                }
                Entry::Vacant(e) => e.insert(typed_mods.span.clone()),
            };
            heavy_mods.push(typed_mods.validate((ctx, i + 1))?);
        }

        PeptideModifications::new(static_mods, heavy_mods, self.max_neutral_losses)
            .map_err(|e| SettingsErrorKind::Modifications(self.span.clone(), *e))
    }
}

// ---------------------------------------------------------------------------------------------------------------------

// NOTE: Label types without an explicit sort order are sorted in the order they're declared
impl<'a> ValidateInto<'a, TypedModifications> for HeavyModsKdl {
    type Context = (&'a AtomicDatabase, usize);

    fn validate(self, ctx: Self::Context) -> SettingsResult<TypedModifications> {
        let (db, position) = ctx;
        if self.label_type == IsotopeLabelType::LIGHT_NAME {
            return Err(SettingsErrorKind::LightHeavyMods(self.span));
        }
        let sort_order = self
            .sort_order
            .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX));
        let label_type = IsotopeLabelType::new(self.label_type, sort_order)
            .map_err(|e| SettingsErrorKind::Modification(self.span.clone(), *e))?;
        let modifications = self
            .modifications
            .into_iter()
            .map(|m| m.validate(db))
            .collect::<Result<_, _>>()?;

        TypedModifications::new(label_type, modifications)
            .map_err(|_| SettingsErrorKind::LightHeavyMods(self.span.clone()))
    }
}

impl<'a> ValidateInto<'a, StaticMod> for ModKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> SettingsResult<StaticMod> {
        let terminus = self.terminus.as_ref().map(terminus).transpose()?;
        let label_atoms = self
            .labels
            .as_ref()
            .map(|labels| {
                labels
                    .parse::<LabelAtoms>()
                    .map_err(|e| SettingsErrorKind::LabelAtoms(labels.span().clone(), *e))
            })
            .transpose()?
            .unwrap_or_default();
        let losses = self
            .losses
            .into_iter()
            .map(|loss| loss.validate(ctx))
            .collect::<Result<_, _>>()?;

        let definition = StaticModDefinition {
            name: self.name,
            amino_acids: self.amino_acids,
            terminus,
            is_variable: self.is_variable,
            is_explicit: self.is_explicit,
            formula: self.formula,
            label_atoms,
            monoisotopic_mass: self.mono,
            average_mass: self.average,
            losses,
        };
        StaticMod::new(ctx, definition).map_err(|e| SettingsErrorKind::Modification(self.span.clone(), *e))
    }
}

impl<'a> ValidateInto<'a, FragmentLoss> for LossKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> SettingsResult<FragmentLoss> {
        FragmentLoss::new(ctx, self.formula, self.mono, self.average)
            .map_err(|e| SettingsErrorKind::Loss(self.span.clone(), *e))
    }
}

// Named Values ========================================================================================================

fn mass_type(name: &NameKdl) -> SettingsResult<MassType> {
    match name.as_str() {
        "monoisotopic" => Ok(MassType::Monoisotopic),
        "average" => Ok(MassType::Average),
        other => Err(SettingsErrorKind::UnknownMassType(name.span().clone(), other.to_owned())),
    }
}

fn terminus(name: &NameKdl) -> SettingsResult<ModTerminus> {
    name.parse::<ModTerminus>()
        .map_err(|e| SettingsErrorKind::UnknownTerminus(name.span().clone(), e))
}

// Validation Error Types and Trait Implementations  ===================================================================

#[derive(Debug, Error)]
#[error("failed to validate settings file")]
struct SettingsError {
    kdl: NamedSource,
    #[source]
    kind: SettingsErrorKind,
}

// NOTE: This is manually implemented because the list of labels is dynamic and needs to be extracted from `self.kind`
impl Diagnostic for SettingsError {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.kdl)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(self.kind.labels().into_iter().map(|(s, l)| {
            LabeledSpan::new_with_span(Some(l.to_owned()), s.clone())
        })))
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        Some(&self.kind)
    }
}

#[derive(Clone, Debug, Diagnostic, Error)]
enum SettingsErrorKind {
    #[error("unknown mass type {1:?}")]
    #[diagnostic(help("mass types are either \"monoisotopic\" or \"average\""))]
    UnknownMassType(Span, String),

    #[error("{1}")]
    UnknownIonType(Span, String),

    #[error("{1}")]
    UnknownTerminus(Span, String),

    #[error("unknown library pick {1:?}")]
    #[diagnostic(help("try one of \"none\", \"all\", \"filter\", or \"all_plus\""))]
    UnknownPick(Span, String),

    #[error("the label type {2:?} has already been declared")]
    #[diagnostic(help("merge the isotope modifications of both declarations"))]
    DuplicateLabelType(Span, Span, String),

    #[error("isotope modifications cannot be declared for the light label type")]
    #[diagnostic(help("the light label type always uses the static modifications"))]
    LightHeavyMods(Span),

    #[error("settings file contained an invalid fragment finder")]
    Finder(
        Span,
        #[source]
        #[diagnostic_source]
        TransitionError,
    ),

    #[error("settings file contained an invalid measured ion")]
    MeasuredIon(
        Span,
        #[source]
        #[diagnostic_source]
        TransitionError,
    ),

    #[error("settings file contained an invalid transition filter")]
    Filter(
        Span,
        #[source]
        #[diagnostic_source]
        TransitionError,
    ),

    #[error("settings file contained invalid library settings")]
    Libraries(
        Span,
        #[source]
        #[diagnostic_source]
        TransitionError,
    ),

    #[error("settings file contained invalid instrument settings")]
    Instrument(
        Span,
        #[source]
        #[diagnostic_source]
        TransitionError,
    ),

    #[error("settings file contained invalid peptide modification settings")]
    Modifications(
        Span,
        #[source]
        #[diagnostic_source]
        TransitionError,
    ),

    #[error("settings file contained an invalid modification")]
    Modification(
        Span,
        #[source]
        #[diagnostic_source]
        SeqCalcError,
    ),

    #[error("settings file contained an invalid neutral loss")]
    Loss(
        Span,
        #[source]
        #[diagnostic_source]
        SeqCalcError,
    ),

    #[error("settings file contained invalid label atoms")]
    LabelAtoms(
        Span,
        #[source]
        #[diagnostic_source]
        BiomassError,
    ),
}

impl SettingsErrorKind {
    fn labels(&self) -> Vec<(&Span, &'static str)> {
        match self {
            Self::UnknownMassType(s, _) => vec![(s, "unknown mass type")],
            Self::UnknownIonType(s, _) => vec![(s, "unknown ion type")],
            Self::UnknownTerminus(s, _) => vec![(s, "unknown terminus")],
            Self::UnknownPick(s, _) => vec![(s, "unknown library pick")],
            Self::DuplicateLabelType(s1, s2, _) => {
                vec![(s1, "first declared here"), (s2, "then again here")]
            }
            Self::LightHeavyMods(s) => vec![(s, "light label type")],
            Self::Finder(s, _) => vec![(s, "invalid fragment finder")],
            Self::MeasuredIon(s, _) => vec![(s, "invalid measured ion")],
            Self::Filter(s, _) => vec![(s, "invalid filter")],
            Self::Libraries(s, _) => vec![(s, "invalid library settings")],
            Self::Instrument(s, _) => vec![(s, "invalid instrument settings")],
            Self::Modifications(s, _) => vec![(s, "invalid modification settings")],
            Self::Modification(s, _) => vec![(s, "invalid modification")],
            Self::Loss(s, _) => vec![(s, "invalid neutral loss")],
            Self::LabelAtoms(s, _) => vec![(s, "invalid label atoms")],
        }
    }

    fn finalize(self, file_name: impl AsRef<str>, kdl: impl AsRef<str>) -> SettingsError {
        let kdl = NamedSource::new(file_name, kdl.as_ref().to_owned());
        SettingsError { kdl, kind: self }
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;
    use indoc::indoc;

    use crate::testing_tools::{DB, carbamidomethyl};

    use super::*;

    const DEFAULT_KDL: &str = include_str!("../default_settings.kdl");

    fn validate(kdl: &str) -> Result<SrmSettings, SettingsError> {
        let settings: SrmSettingsKdl = knuffel::parse("test", kdl).unwrap();
        settings.validate(&DB).map_err(|e| e.finalize("test", kdl))
    }

    fn with_modifications(modifications: &str) -> String {
        let (prefix, _) = DEFAULT_KDL.split_once("modifications {").unwrap();
        format!("{prefix}{modifications}")
    }

    fn label_text(error: &SettingsError) -> Vec<String> {
        Diagnostic::labels(error)
            .unwrap()
            .filter_map(|label| label.label().map(ToOwned::to_owned))
            .collect()
    }

    #[test]
    fn parse_default_settings() {
        let settings = validate(DEFAULT_KDL).unwrap();
        assert_eq!(settings.filter.ion_types(), [IonType::Y]);
        assert_eq!(settings.filter.start_finder(), StartFinder::Mz(0));
        assert_eq!(settings.filter.end_finder(), EndFinder::Count(3));
        assert_eq!(settings.modifications.static_mods(), [carbamidomethyl()]);
        assert_eq!(settings, SrmSettings::default());
    }

    #[test]
    fn parse_custom_settings() {
        let kdl = indoc! {r#"
            prediction {
                precursor-mass-type "average"
                fragment-mass-type "monoisotopic"
            }
            filter {
                precursor-charges 2 3
                product-charges 1 2
                ion-types "b" "y"
                first-fragment "ion 2"
                last-fragment "last ion - 1"
                precursor-mz-window 10.0
                auto-select false
                measured-ions {
                    ion "N-terminal to Proline" fragment="P" terminus="N" min-length=3
                    ion "C-terminal to Glu or Asp" fragment="ED" terminus="C" min-length=3
                    ion "Lys not before Pro" fragment="K" restrict="P" terminus="C" min-length=2
                }
            }
            libraries {
                ion-match-tolerance 0.7
                ion-count 5
                pick "all_plus"
            }
            instrument {
                min-mz 100
                max-mz 2000
                dynamic-min true
                mz-match-tolerance 0.01
            }
            modifications {
                max-neutral-losses 2
                static-mods {
                    mod "Carbamidomethyl (C)" aa="C" formula="H3C2NO"
                    mod "Phospho (ST)" aa="S, T" formula="HPO3" variable=true {
                        loss formula="H3PO4"
                    }
                    mod "Acetyl (N-term)" terminus="N" formula="C2H2O" explicit=true
                    mod "Mass Only" aa="W" mono=15.994915 average=15.9994
                }
                heavy "heavy" {
                    mod "Label:13C(6)15N(2) (K)" aa="K" labels="13C, 15N"
                }
                heavy "medium" sort-order=5 {
                    mod "Label:13C(6) (R)" aa="R" labels="13C"
                }
            }
        "#};
        let settings = validate(kdl).unwrap();

        assert_eq!(settings.prediction.precursor_mass_type, MassType::Average);
        assert_eq!(settings.prediction.fragment_mass_type, MassType::Monoisotopic);

        let filter = &settings.filter;
        assert_eq!(filter.precursor_charges(), [2, 3]);
        assert_eq!(filter.product_charges(), [1, 2]);
        assert_eq!(filter.ion_types(), [IonType::B, IonType::Y]);
        assert_eq!(filter.start_finder(), StartFinder::Ordinal(2));
        assert_eq!(filter.end_finder(), EndFinder::Last(1));
        assert_float_absolute_eq!(filter.precursor_mz_window(), 10.0);
        assert!(!filter.auto_select());
        let measured_ions = filter.measured_ions();
        assert_eq!(measured_ions.len(), 3);
        assert_eq!(measured_ions[0], MeasuredIon::n_term_proline());
        assert_eq!(measured_ions[1], MeasuredIon::c_term_glu_asp());
        assert_eq!(measured_ions[2].min_fragment_length(), 2);
        assert!(measured_ions[2].is_match("PEPKAR", IonType::Y, 3));
        assert!(!measured_ions[2].is_match("PEPKPR", IonType::Y, 3));

        assert_eq!(settings.libraries.pick(), LibraryPick::AllPlus);
        assert_eq!(settings.libraries.ion_count(), 5);
        assert!(settings.instrument.is_dynamic_min());
        assert_eq!(settings.instrument.max_mz(), 2000);

        let modifications = &settings.modifications;
        assert_eq!(modifications.max_neutral_losses(), 2);
        let names: Vec<_> = modifications.static_mods().iter().map(StaticMod::name).collect();
        assert_eq!(
            names,
            ["Carbamidomethyl (C)", "Phospho (ST)", "Acetyl (N-term)", "Mass Only"]
        );
        let phospho = &modifications.static_mods()[1];
        assert!(phospho.is_variable() && phospho.is_explicit());
        assert_eq!(phospho.amino_acids(), Some(['S', 'T'].as_slice()));
        assert_eq!(phospho.losses()[0].formula(), Some("H3PO4"));
        assert_eq!(modifications.static_mods()[2].terminus(), Some(ModTerminus::N));

        let label_types: Vec<_> = modifications.label_types().collect();
        assert_eq!(
            label_types,
            [
                IsotopeLabelType::light(),
                IsotopeLabelType::heavy(),
                IsotopeLabelType::new("medium", 5).unwrap()
            ]
        );
        assert_eq!(modifications.heavy_mods_for(&IsotopeLabelType::heavy()).len(), 1);
    }

    #[test]
    fn parse_unknown_names() {
        let kdl = DEFAULT_KDL.replace(r#"fragment-mass-type "monoisotopic""#, r#"fragment-mass-type "mono""#);
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(&error.kind, SettingsErrorKind::UnknownMassType(_, name) if name == "mono"));
        assert_eq!(label_text(&error), ["unknown mass type"]);

        let kdl = DEFAULT_KDL.replace(r#"ion-types "y""#, r#"ion-types "y" "w""#);
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(error.kind, SettingsErrorKind::UnknownIonType(..)));

        let kdl = DEFAULT_KDL.replace(r#"terminus="N""#, r#"terminus="X""#);
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(error.kind, SettingsErrorKind::UnknownTerminus(..)));

        let kdl = DEFAULT_KDL.replace(r#"pick "all""#, r#"pick "most""#);
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(&error.kind, SettingsErrorKind::UnknownPick(_, name) if name == "most"));

        let kdl = DEFAULT_KDL.replace(r#""3 ions""#, r#""7 ions""#);
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            &error.kind,
            SettingsErrorKind::Finder(_, TransitionError::EndFinder(name)) if name == "7 ions"
        ));
    }

    #[test]
    fn parse_invalid_sections() {
        let kdl = DEFAULT_KDL.replace("precursor-charges 2", "precursor-charges 2 2");
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            error.kind,
            SettingsErrorKind::Filter(_, TransitionError::DuplicateCharge("precursor charges", 2))
        ));
        assert_eq!(label_text(&error), ["invalid filter"]);

        let kdl = DEFAULT_KDL.replace(r#"fragment="P""#, r#"fragment="B""#);
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            error.kind,
            SettingsErrorKind::MeasuredIon(_, TransitionError::MeasuredIonResidues(_))
        ));

        let kdl = DEFAULT_KDL.replace("ion-count 3", "ion-count 12");
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            error.kind,
            SettingsErrorKind::Libraries(_, TransitionError::IonCount(12, 1, 10))
        ));

        let kdl = DEFAULT_KDL.replace("max-mz 1500", "max-mz 120");
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            error.kind,
            SettingsErrorKind::Instrument(_, TransitionError::InstrumentMzRange(120, 100, 50))
        ));

        let kdl = DEFAULT_KDL.replace("max-neutral-losses 1", "max-neutral-losses 9");
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            error.kind,
            SettingsErrorKind::Modifications(_, TransitionError::MaxNeutralLosses(9, 1, 5))
        ));
    }

    #[test]
    fn parse_invalid_modifications() {
        let kdl = with_modifications(indoc! {r#"
            modifications {
                max-neutral-losses 1
                static-mods {
                    mod "Oxidation (M)" formula="O" variable=true
                }
            }
        "#});
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            error.kind,
            SettingsErrorKind::Modification(_, SeqCalcError::VariableWithoutTarget(_))
        ));
        assert_eq!(label_text(&error), ["invalid modification"]);

        let kdl = with_modifications(indoc! {r#"
            modifications {
                max-neutral-losses 1
                static-mods {
                    mod "Phospho (ST)" aa="S, T" formula="HPO3" {
                        loss formula="H3PO4" mono=97.976896
                    }
                }
            }
        "#});
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            error.kind,
            SettingsErrorKind::Loss(_, SeqCalcError::LossFormulaWithMasses)
        ));

        let kdl = with_modifications(indoc! {r#"
            modifications {
                max-neutral-losses 1
                static-mods {
                }
                heavy "heavy" {
                    mod "Label:13C(6) (K)" aa="K" labels="13C, 2Q"
                }
            }
        "#});
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(error.kind, SettingsErrorKind::LabelAtoms(..)));
    }

    #[test]
    fn parse_invalid_label_types() {
        let kdl = with_modifications(indoc! {r#"
            modifications {
                max-neutral-losses 1
                static-mods {
                }
                heavy "heavy" {
                    mod "Label:13C(6) (K)" aa="K" labels="13C"
                }
                heavy "heavy" {
                    mod "Label:13C(6) (R)" aa="R" labels="13C"
                }
            }
        "#});
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(&error.kind, SettingsErrorKind::DuplicateLabelType(_, _, name) if name == "heavy"));
        assert_eq!(label_text(&error), ["first declared here", "then again here"]);

        let kdl = with_modifications(indoc! {r#"
            modifications {
                max-neutral-losses 1
                static-mods {
                }
                heavy "light" {
                    mod "Label:13C(6) (K)" aa="K" labels="13C"
                }
            }
        "#});
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(error.kind, SettingsErrorKind::LightHeavyMods(_)));

        let kdl = with_modifications(indoc! {r#"
            modifications {
                max-neutral-losses 1
                static-mods {
                }
                heavy "medium" sort-order=0 {
                    mod "Label:13C(6) (K)" aa="K" labels="13C"
                }
            }
        "#});
        let error = validate(&kdl).unwrap_err();
        assert!(matches!(
            error.kind,
            SettingsErrorKind::Modification(_, SeqCalcError::LabelSortOrder(_))
        ));
    }

    #[test]
    fn parse_errors_are_reported() {
        let kdl = DEFAULT_KDL.replace("ion-count 3", r#"ion-count "three""#);
        assert!(SrmSettings::from_kdl(&DB, "test", &kdl).is_err());
        let kdl = DEFAULT_KDL.replace("ion-count 3", "ion-count 12");
        let report = SrmSettings::from_kdl(&DB, "test", kdl).unwrap_err();
        assert_eq!(report.to_string(), "failed to validate settings file");
    }
}
