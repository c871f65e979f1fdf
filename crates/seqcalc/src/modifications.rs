// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use biomass::{AtomicDatabase, BioMassCalc, MassType};

// Local Crate Imports
use crate::{
    FragmentLoss, ModMassSource, ModTerminus, Result, SeqCalcError, StaticMod, StaticModDefinition,
    amino_acid_formula, is_aa, persistence::round_mass,
};

// Public API ==========================================================================================================

impl StaticMod {
    /// Validates a modification definition. Formulae are checked against `db`, and neutral losses are sorted by
    /// ascending monoisotopic mass
    pub fn new(db: &AtomicDatabase, definition: StaticModDefinition) -> Result<Self> {
        let StaticModDefinition {
            name,
            amino_acids,
            terminus,
            is_variable,
            is_explicit,
            formula,
            label_atoms,
            monoisotopic_mass,
            average_mass,
            mut losses,
        } = definition;

        if is_variable && terminus.is_none() && amino_acids.is_none() {
            return Err(Box::new(SeqCalcError::VariableWithoutTarget(name)));
        }

        let amino_acids = amino_acids
            .map(|aas| parse_amino_acids(&name, &aas))
            .transpose()?;
        if amino_acids.is_none() && terminus.is_some() && !label_atoms.is_empty() {
            return Err(Box::new(SeqCalcError::LabelledTerminalMod(name)));
        }

        let has_masses = monoisotopic_mass.is_some() || average_mass.is_some();
        let mass = match (formula, label_atoms.is_empty()) {
            (Some(_), false) => return Err(Box::new(SeqCalcError::FormulaWithLabels(name))),
            (Some(_), true) | (None, false) if has_masses => {
                return Err(Box::new(SeqCalcError::FormulaWithMasses(name)));
            }
            (Some(formula), true) => {
                let calc = BioMassCalc::new(db, MassType::Monoisotopic)?;
                parse_mod_mass(&calc, &formula)?;
                ModMassSource::Formula(formula)
            }
            (None, false) => ModMassSource::Labels(label_atoms),
            (None, true) => match (monoisotopic_mass, average_mass) {
                (Some(monoisotopic), Some(average)) => ModMassSource::Masses {
                    monoisotopic,
                    average,
                },
                _ => return Err(Box::new(SeqCalcError::MissingModMass(name))),
            },
        };

        losses.sort_by(|a, b| a.monoisotopic_mass.total_cmp(&b.monoisotopic_mass));

        Ok(Self {
            name,
            amino_acids,
            terminus,
            is_variable,
            // NOTE: Every variable modification is also explicit
            is_explicit: is_explicit || is_variable,
            mass,
            losses,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn amino_acids(&self) -> Option<&[char]> {
        self.amino_acids.as_deref()
    }

    #[must_use]
    pub const fn terminus(&self) -> Option<ModTerminus> {
        self.terminus
    }

    #[must_use]
    pub const fn is_variable(&self) -> bool {
        self.is_variable
    }

    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        self.is_explicit
    }

    #[must_use]
    pub const fn mass_source(&self) -> &ModMassSource {
        &self.mass
    }

    #[must_use]
    pub fn losses(&self) -> &[FragmentLoss] {
        &self.losses
    }

    #[must_use]
    pub fn has_loss(&self) -> bool {
        !self.losses.is_empty()
    }

    /// A copy of this modification that must be declared on a peptide to take effect
    #[must_use]
    pub fn to_explicit(&self, is_explicit: bool) -> Self {
        Self {
            is_explicit,
            is_variable: false,
            ..self.clone()
        }
    }

    /// Does this modification apply to `aa` at `index` in a sequence `len` residues long?
    #[must_use]
    pub fn is_mod(&self, aa: char, index: usize, len: usize) -> bool {
        if self.amino_acids.as_ref().is_some_and(|aas| !aas.contains(&aa)) {
            return false;
        }
        match self.terminus {
            Some(ModTerminus::N) => index == 0,
            Some(ModTerminus::C) => index + 1 == len,
            None => true,
        }
    }

    /// Does this modification apply anywhere in `sequence`?
    #[must_use]
    pub fn is_mod_in(&self, sequence: &str) -> bool {
        let len = sequence.chars().count();
        sequence
            .chars()
            .enumerate()
            .any(|(index, aa)| self.is_mod(aa, index, len))
    }

    /// The mass this modification adds to `aa`. Label atom modifications depend on the residue they are applied to,
    /// so residues without a known formula gain nothing
    pub fn mass_on(&self, calc: &BioMassCalc, aa: char) -> Result<f64> {
        match &self.mass {
            ModMassSource::Masses {
                monoisotopic,
                average,
            } => Ok(match calc.mass_type() {
                MassType::Monoisotopic => *monoisotopic,
                MassType::Average => *average,
            }),
            ModMassSource::Formula(formula) => parse_mod_mass(calc, formula),
            ModMassSource::Labels(label_atoms) => match amino_acid_formula(aa) {
                Some(residue) => Ok(round_mass(calc.label_mass(residue, *label_atoms)?)),
                None => Ok(0.0),
            },
        }
    }
}

impl FragmentLoss {
    pub const MIN_LOSS_MASS: f64 = 0.0001;
    pub const MAX_LOSS_MASS: f64 = 500.0;

    /// A neutral loss described by a formula. Both mass types are calculated up front
    pub fn from_formula(db: &AtomicDatabase, formula: impl Into<String>) -> Result<Self> {
        let formula = formula.into();
        let mass_of = |mass_type| -> Result<f64> {
            let calc = BioMassCalc::new(db, mass_type)?;
            check_loss_mass(parse_mod_mass(&calc, &formula)?)
        };
        let monoisotopic_mass = mass_of(MassType::Monoisotopic)?;
        let average_mass = mass_of(MassType::Average)?;
        Ok(Self {
            formula: Some(formula),
            monoisotopic_mass,
            average_mass,
        })
    }

    pub fn from_masses(monoisotopic_mass: f64, average_mass: f64) -> Result<Self> {
        Ok(Self {
            formula: None,
            monoisotopic_mass: check_loss_mass(monoisotopic_mass)?,
            average_mass: check_loss_mass(average_mass)?,
        })
    }

    /// The general form of the constructors above, taking a loss as it appears in settings: either a formula, or both
    /// masses, but never a mix of the two
    pub fn new(
        db: &AtomicDatabase,
        formula: Option<String>,
        monoisotopic_mass: Option<f64>,
        average_mass: Option<f64>,
    ) -> Result<Self> {
        match (formula, monoisotopic_mass, average_mass) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                Err(Box::new(SeqCalcError::LossFormulaWithMasses))
            }
            (Some(formula), None, None) => Self::from_formula(db, formula),
            (None, Some(monoisotopic), Some(average)) => Self::from_masses(monoisotopic, average),
            (None, ..) => Err(Box::new(SeqCalcError::MissingLossMass)),
        }
    }

    #[must_use]
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    #[must_use]
    pub const fn mass(&self, mass_type: MassType) -> f64 {
        match mass_type {
            MassType::Monoisotopic => self.monoisotopic_mass,
            MassType::Average => self.average_mass,
        }
    }
}

impl Display for FragmentLoss {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.monoisotopic_mass)?;
        if let Some(formula) = &self.formula {
            write!(f, " - {formula}")?;
        }
        Ok(())
    }
}

// Private Helper Methods ==============================================================================================

/// Calculates the mass of a modification formula, rounded to the precision masses are persisted with
pub(crate) fn parse_mod_mass(calc: &BioMassCalc, formula: &str) -> Result<f64> {
    let mass = calc.calculate_mass(formula)?;
    if mass == 0.0 {
        return Err(Box::new(SeqCalcError::ZeroMassFormula(formula.to_owned())));
    }
    Ok(round_mass(mass))
}

fn parse_amino_acids(name: &str, amino_acids: &str) -> Result<Vec<char>> {
    amino_acids
        .split(',')
        .map(str::trim)
        .map(|aa| {
            let mut chars = aa.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if is_aa(c) => Ok(c),
                _ => Err(Box::new(SeqCalcError::InvalidAminoAcid(
                    name.to_owned(),
                    aa.to_owned(),
                ))),
            }
        })
        .collect()
}

fn check_loss_mass(mass: f64) -> Result<f64> {
    if mass <= FragmentLoss::MIN_LOSS_MASS || mass > FragmentLoss::MAX_LOSS_MASS {
        return Err(Box::new(SeqCalcError::LossMassOutOfRange(mass)));
    }
    Ok(mass)
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;

    use crate::{LabelAtoms, testing_tools::{DB, carbamidomethyl}};

    use super::*;

    fn definition(name: &str) -> StaticModDefinition {
        StaticModDefinition {
            name: name.to_owned(),
            ..StaticModDefinition::default()
        }
    }

    #[test]
    fn formula_modification() {
        let carbamidomethyl = carbamidomethyl();
        assert_eq!(carbamidomethyl.name(), "Carbamidomethyl (C)");
        assert_eq!(carbamidomethyl.amino_acids(), Some(&['C'][..]));
        assert_eq!(carbamidomethyl.terminus(), None);
        assert!(!carbamidomethyl.is_explicit());
        assert!(!carbamidomethyl.has_loss());

        let mono = BioMassCalc::new(&DB, MassType::Monoisotopic).unwrap();
        assert_eq!(carbamidomethyl.mass_on(&mono, 'C').unwrap(), 57.021_464);
    }

    #[test]
    fn label_modification() {
        let heavy_k = StaticMod::new(
            &DB,
            StaticModDefinition {
                amino_acids: Some("K".to_owned()),
                label_atoms: LabelAtoms::C13 | LabelAtoms::N15,
                ..definition("Label:13C(6)15N(2) (K)")
            },
        )
        .unwrap();
        let mono = BioMassCalc::new(&DB, MassType::Monoisotopic).unwrap();
        assert_float_absolute_eq!(heavy_k.mass_on(&mono, 'K').unwrap(), 8.014_199, 1e-9);
        assert_eq!(heavy_k.mass_on(&mono, 'X').unwrap(), 0.0);
    }

    #[test]
    fn mass_modification() {
        let oxidation = StaticMod::new(
            &DB,
            StaticModDefinition {
                amino_acids: Some("M".to_owned()),
                is_variable: true,
                monoisotopic_mass: Some(15.994_915),
                average_mass: Some(15.999_4),
                ..definition("Oxidation (M)")
            },
        )
        .unwrap();
        assert!(oxidation.is_variable());
        assert!(oxidation.is_explicit());
        let avg = BioMassCalc::new(&DB, MassType::Average).unwrap();
        assert_eq!(oxidation.mass_on(&avg, 'M').unwrap(), 15.999_4);

        let explicit = oxidation.to_explicit(true);
        assert!(explicit.is_explicit() && !explicit.is_variable());
    }

    #[test]
    fn modification_targets() {
        let n_term_q = StaticMod::new(
            &DB,
            StaticModDefinition {
                amino_acids: Some("Q".to_owned()),
                terminus: Some(ModTerminus::N),
                monoisotopic_mass: Some(-17.026_549),
                average_mass: Some(-17.030_5),
                ..definition("Gln->pyro-Glu (N-term Q)")
            },
        )
        .unwrap();
        assert!(n_term_q.is_mod('Q', 0, 5));
        assert!(!n_term_q.is_mod('Q', 1, 5));
        assert!(!n_term_q.is_mod('E', 0, 5));
        assert!(n_term_q.is_mod_in("QLEDK"));
        assert!(!n_term_q.is_mod_in("LQEDK"));

        let c_term = StaticMod::new(
            &DB,
            StaticModDefinition {
                terminus: Some(ModTerminus::C),
                formula: Some("CH2".to_owned()),
                ..definition("Methyl (C-term)")
            },
        )
        .unwrap();
        assert!(c_term.is_mod('K', 4, 5));
        assert!(!c_term.is_mod('K', 3, 5));

        // Without amino acids or a terminus, every residue is modified
        let everywhere = StaticMod::new(
            &DB,
            StaticModDefinition {
                label_atoms: LabelAtoms::N15,
                ..definition("Label:15N")
            },
        )
        .unwrap();
        assert!("PEPTIDE".chars().enumerate().all(|(i, aa)| everywhere.is_mod(aa, i, 7)));
    }

    #[test]
    fn losses_are_sorted_by_mass() {
        let db = &*DB;
        let losses = vec![
            FragmentLoss::from_formula(db, "H3PO4").unwrap(),
            FragmentLoss::from_formula(db, "H2O").unwrap(),
            FragmentLoss::from_formula(db, "HPO3").unwrap(),
        ];
        let phospho = StaticMod::new(
            db,
            StaticModDefinition {
                amino_acids: Some("S, T, Y".to_owned()),
                is_variable: true,
                formula: Some("HPO3".to_owned()),
                losses,
                ..definition("Phospho (STY)")
            },
        )
        .unwrap();
        assert_eq!(phospho.amino_acids(), Some(&['S', 'T', 'Y'][..]));
        let masses: Vec<_> = phospho
            .losses()
            .iter()
            .map(|l| l.mass(MassType::Monoisotopic))
            .collect();
        assert_eq!(masses, [18.010_565, 79.966_331, 97.976_895]);
        assert!(phospho.has_loss());
    }

    #[test]
    fn invalid_modifications() {
        let error = |definition| StaticMod::new(&DB, definition).unwrap_err().to_string();

        assert_eq!(
            error(StaticModDefinition {
                is_variable: true,
                formula: Some("O".to_owned()),
                ..definition("Anywhere")
            }),
            r#"the variable modification "Anywhere" must specify an amino acid or a terminus"#
        );
        assert_eq!(
            error(StaticModDefinition {
                amino_acids: Some("S, TY".to_owned()),
                formula: Some("HPO3".to_owned()),
                ..definition("Phospho")
            }),
            r#"the modification "Phospho" targets "TY", which is not an amino acid"#
        );
        assert_eq!(
            error(StaticModDefinition {
                amino_acids: Some("B".to_owned()),
                formula: Some("O".to_owned()),
                ..definition("Ambiguous")
            }),
            r#"the modification "Ambiguous" targets "B", which is not an amino acid"#
        );
        assert_eq!(
            error(StaticModDefinition {
                terminus: Some(ModTerminus::N),
                label_atoms: LabelAtoms::C13,
                ..definition("Heavy N-term")
            }),
            r#"the terminal modification "Heavy N-term" cannot carry label atoms"#
        );
        assert_eq!(
            error(StaticModDefinition {
                amino_acids: Some("K".to_owned()),
                monoisotopic_mass: Some(8.0),
                ..definition("Half")
            }),
            r#"the modification "Half" must specify a formula, label atoms, or both monoisotopic and average masses"#
        );
        assert_eq!(
            error(StaticModDefinition {
                amino_acids: Some("K".to_owned()),
                formula: Some("C2H2O".to_owned()),
                label_atoms: LabelAtoms::N15,
                ..definition("Both")
            }),
            r#"the modification "Both" cannot combine a formula with label atoms"#
        );
        assert_eq!(
            error(StaticModDefinition {
                amino_acids: Some("K".to_owned()),
                label_atoms: LabelAtoms::N15,
                monoisotopic_mass: Some(2.0),
                average_mass: Some(2.0),
                ..definition("Overspecified")
            }),
            r#"the modification "Overspecified" uses a formula or label atoms, so it cannot also specify masses"#
        );
        assert_eq!(
            error(StaticModDefinition {
                amino_acids: Some("K".to_owned()),
                formula: Some("H2O - H2O".to_owned()),
                ..definition("Nothing")
            }),
            r#"the formula "H2O - H2O" has a total mass of zero"#
        );
        assert!(
            StaticMod::new(
                &DB,
                StaticModDefinition {
                    amino_acids: Some("K".to_owned()),
                    formula: Some("Xx2".to_owned()),
                    ..definition("Unknown element")
                },
            )
            .is_err()
        );
    }

    #[test]
    fn fragment_losses() {
        let water = FragmentLoss::from_formula(&*DB, "H2O").unwrap();
        assert_eq!(water.formula(), Some("H2O"));
        assert_eq!(water.mass(MassType::Monoisotopic), 18.010_565);
        assert_float_absolute_eq!(water.mass(MassType::Average), 18.015_286);
        assert_eq!(water.to_string(), "18.0106 - H2O");

        let custom = FragmentLoss::new(&DB, None, Some(42.5), Some(42.6)).unwrap();
        assert_eq!(custom.formula(), None);
        assert_eq!(custom.to_string(), "42.5000");
    }

    #[test]
    fn invalid_fragment_losses() {
        let error = |formula: Option<&str>, mono, avg| {
            FragmentLoss::new(&DB, formula.map(str::to_owned), mono, avg)
                .unwrap_err()
                .to_string()
        };
        assert_eq!(
            error(None, Some(18.0), None),
            "neutral losses must specify a formula, or both monoisotopic and average masses"
        );
        assert_eq!(
            error(Some("H2O"), Some(18.0), None),
            "neutral losses with a formula cannot also specify masses"
        );
        assert_eq!(
            error(None, Some(0.0001), Some(1.0)),
            "the neutral loss mass 0.0001 must be greater than 0.0001 and at most 500"
        );
        assert_eq!(
            error(None, Some(10.0), Some(500.5)),
            "the neutral loss mass 500.5 must be greater than 0.0001 and at most 500"
        );
        assert!(FragmentLoss::new(&DB, None, Some(500.0), Some(500.0)).is_ok());
        assert!(FragmentLoss::from_formula(&*DB, "C40H80").is_err());
    }
}
