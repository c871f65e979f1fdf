use biomass::AtomicDatabase;
use once_cell::sync::Lazy;
use seqcalc::{FragmentLoss, StaticMod, StaticModDefinition};

use crate::PeptideModifications;

pub static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);

fn static_mod(definition: StaticModDefinition) -> StaticMod {
    StaticMod::new(&DB, definition).unwrap()
}

pub fn carbamidomethyl() -> StaticMod {
    static_mod(StaticModDefinition {
        name: "Carbamidomethyl (C)".to_owned(),
        amino_acids: Some("C".to_owned()),
        formula: Some("H3C2NO".to_owned()),
        ..StaticModDefinition::default()
    })
}

fn phospho_definition() -> StaticModDefinition {
    StaticModDefinition {
        name: "Phospho (ST)".to_owned(),
        amino_acids: Some("S, T".to_owned()),
        formula: Some("HPO3".to_owned()),
        losses: vec![FragmentLoss::from_formula(&DB, "H3PO4").unwrap()],
        ..StaticModDefinition::default()
    }
}

/// Phosphorylation of every serine and threonine, which can lose phosphoric acid
pub fn phospho() -> StaticMod {
    static_mod(phospho_definition())
}

pub fn phospho_variable() -> StaticMod {
    static_mod(StaticModDefinition {
        is_variable: true,
        ..phospho_definition()
    })
}

pub fn pep_mods(static_mods: Vec<StaticMod>, max_neutral_losses: usize) -> PeptideModifications {
    PeptideModifications::new(static_mods, Vec::new(), max_neutral_losses).unwrap()
}
