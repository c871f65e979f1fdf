use biomass::{AtomicDatabase, LabelAtoms};
use once_cell::sync::Lazy;

use crate::{StaticMod, StaticModDefinition};

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

pub fn oxidation() -> StaticMod {
    static_mod(StaticModDefinition {
        name: "Oxidation (M)".to_owned(),
        amino_acids: Some("M".to_owned()),
        is_variable: true,
        formula: Some("O".to_owned()),
        ..StaticModDefinition::default()
    })
}

pub fn heavy_k() -> StaticMod {
    static_mod(StaticModDefinition {
        name: "Label:13C(6)15N(2) (K)".to_owned(),
        amino_acids: Some("K".to_owned()),
        label_atoms: LabelAtoms::C13 | LabelAtoms::N15,
        ..StaticModDefinition::default()
    })
}
