// External Crate Imports
use biomass::{AtomicDatabase, BioMassCalc, MassType};

// Local Crate Imports
use crate::{
    ExplicitSequenceMods, FragmentMassCalc, FragmentTable, IonType, ModMasses, PrecursorMassCalc, Result,
    SequenceMassCalc, StaticMod, amino_acid_formula, mod_diff_description, modifications::parse_mod_mass,
};

// Public API ==========================================================================================================

impl<'a> SequenceMassCalc<'a> {
    /// The mass of `X`, an unknown residue. This is a historical constant, not an average of the amino acids
    pub const MASS_X: f64 = 111.06;

    /// A calculator with no modifications
    pub fn new(db: &'a AtomicDatabase, mass_type: MassType) -> Result<Self> {
        let calc = BioMassCalc::new(db, mass_type)?;
        let mass = |formula: &str| calc.calculate_mass(formula);

        let mut amino_masses = [0.0; 128];
        for (byte, entry) in (0..=u8::MAX).zip(&mut amino_masses) {
            if let Some(formula) = amino_acid_formula(char::from(byte)) {
                *entry = mass(formula)?;
            }
        }
        let residue = |aa| amino_acid_formula(aa).map_or(Ok(0.0), mass);
        // NOTE: `B` and `Z` stand for either of two amino acids, so take the mean of both. `J` is a placeholder
        // with no mass at all
        let ambiguous = [
            ('B', (residue('D')? + residue('N')?) / 2.0),
            ('Z', (residue('E')? + residue('Q')?) / 2.0),
            ('J', 0.0),
            ('X', Self::MASS_X),
        ];
        for (aa, aa_mass) in ambiguous {
            for byte in [aa, aa.to_ascii_lowercase()].map(|c| c as usize) {
                amino_masses[byte] = aa_mass;
            }
        }

        let water = mass("H2O")?;
        let ion_offsets = [
            -mass("CO")?,
            0.0,
            mass("NH3")?,
            mass("CO2")?,
            water,
            water - mass("NH2")?,
        ];

        Ok(Self {
            calc,
            amino_masses,
            ion_offsets,
            mass_cleave_n: mass("H")?,
            mass_cleave_c: mass("OH")?,
            proton: calc.mass_proton(),
            mods: ModMasses::EMPTY,
            heavy_mods: None,
        })
    }

    /// Adds structural modifications to every peptide this calculator sees
    pub fn with_static_mods<'m>(mut self, mods: impl IntoIterator<Item = &'m StaticMod>) -> Result<Self> {
        self.mods = self.mods.with_mods(&self.calc, mods)?;
        Ok(self)
    }

    /// Adds isotope label modifications. These are also tracked on their own, so that peptides with explicit
    /// modifications can replace the structural modifications while keeping the labels
    pub fn with_heavy_mods(mut self, mods: &[StaticMod]) -> Result<Self> {
        self.mods = self.mods.with_mods(&self.calc, mods)?;
        let heavy_mods = self.heavy_mods.unwrap_or(ModMasses::EMPTY);
        self.heavy_mods = Some(heavy_mods.with_mods(&self.calc, mods)?);
        Ok(self)
    }

    #[must_use]
    pub const fn mass_type(&self) -> MassType {
        self.calc.mass_type()
    }

    #[must_use]
    pub const fn mass_proton(&self) -> f64 {
        self.proton
    }

    /// The unmodified residue mass of `aa`, or zero for unknown characters
    #[must_use]
    pub fn amino_acid_mass(&self, aa: char) -> f64 {
        u8::try_from(aa).map_or(0.0, |byte| self.residue_mass(byte))
    }

    /// The mass `modification` adds to `aa`, using the mass type of this calculator
    pub fn get_mod_mass(&self, aa: char, modification: &StaticMod) -> Result<f64> {
        modification.mass_on(&self.calc, aa)
    }

    /// The mass of a modification formula, rounded to six decimal places. Formulae with no net mass are rejected
    pub fn parse_mod_mass(&self, formula: &str) -> Result<f64> {
        parse_mod_mass(&self.calc, formula)
    }

    /// The modification tables this calculator was built with
    #[must_use]
    pub const fn mod_masses(&self) -> &ModMasses {
        &self.mods
    }
}

impl PrecursorMassCalc for SequenceMassCalc<'_> {
    fn precursor_mass(&self, seq: &str) -> f64 {
        self.precursor_mass_with(seq, None)
    }

    fn is_modified(&self, seq: &str) -> bool {
        let bytes = seq.as_bytes();
        let (Some(&first), Some(&last)) = (bytes.first(), bytes.last()) else {
            return false;
        };
        let mods = &self.mods;
        mods.cleave_n() + mods.cleave_c() != 0.0
            || mods.n_term(first) + mods.c_term(last) != 0.0
            || bytes.iter().any(|&aa| mods.interior(aa) != 0.0)
    }

    fn modified_sequence(&self, seq: &str, narrow: bool) -> String {
        self.modified_sequence_with(seq, None, narrow)
    }
}

impl FragmentMassCalc for SequenceMassCalc<'_> {
    fn mass_type(&self) -> MassType {
        self.calc.mass_type()
    }

    fn fragment_ion_masses(&self, seq: &str) -> FragmentTable {
        self.fragment_ion_masses_with(seq, None)
    }

    fn fragment_mass(&self, seq: &str, ion_type: IonType, ordinal: usize) -> f64 {
        self.fragment_mass_with(seq, ion_type, ordinal, None)
    }

    fn precursor_fragment_mass(&self, seq: &str) -> f64 {
        self.fragment_mass_with(seq, IonType::Precursor, seq.len(), None)
    }
}

// Crate-Internal Mass Calculation =====================================================================================

impl SequenceMassCalc<'_> {
    pub(crate) fn precursor_mass_with(&self, seq: &str, explicit: Option<&ExplicitSequenceMods>) -> f64 {
        let mods = self.select_mods(explicit);
        let bytes = seq.as_bytes();
        let mut mass = self.mass_cleave_n
            + mods.cleave_n()
            + self.mass_cleave_c
            + mods.cleave_c()
            + self.proton;

        if let Some(&first) = bytes.first() {
            mass += mods.n_term(first);
        }
        if let [_, .., last] = bytes {
            mass += mods.c_term(*last);
        }

        mass + bytes
            .iter()
            .enumerate()
            .map(|(i, &aa)| self.modified_residue_mass(mods, explicit, i, aa))
            .sum::<f64>()
    }

    /// Builds every fragment in one pass, walking in from both ends of the peptide at once. The `a` and `c` series
    /// differ from `b` (and `x` and `z` from `y`) by a constant, so only two running sums are needed
    pub(crate) fn fragment_ion_masses_with(&self, seq: &str, explicit: Option<&ExplicitSequenceMods>) -> FragmentTable {
        let bytes = seq.as_bytes();
        let Some(width) = bytes.len().checked_sub(1) else {
            return FragmentTable::zeroed(0);
        };
        let mods = self.select_mods(explicit);
        let mut table = FragmentTable::zeroed(width);

        let offset = |ion_type| self.ion_offset(ion_type);
        let (delta_a, delta_c) = (offset(IonType::A) - offset(IonType::B), offset(IonType::C) - offset(IonType::B));
        let (delta_x, delta_z) = (offset(IonType::X) - offset(IonType::Y), offset(IonType::Z) - offset(IonType::Y));

        let mut n_term_mass = offset(IonType::B) + mods.cleave_n() + self.proton + mods.n_term(bytes[0]);
        let mut c_term_mass = offset(IonType::Y) + mods.cleave_c() + self.proton + mods.c_term(bytes[width]);
        for i_n in 0..width {
            n_term_mass += self.modified_residue_mass(mods, explicit, i_n, bytes[i_n]);
            table.set(IonType::A, i_n, n_term_mass + delta_a);
            table.set(IonType::B, i_n, n_term_mass);
            table.set(IonType::C, i_n, n_term_mass + delta_c);

            let i_c = width - i_n;
            c_term_mass += self.modified_residue_mass(mods, explicit, i_c, bytes[i_c]);
            table.set(IonType::X, i_c - 1, c_term_mass + delta_x);
            table.set(IonType::Y, i_c - 1, c_term_mass);
            table.set(IonType::Z, i_c - 1, c_term_mass + delta_z);
        }
        table
    }

    /// Calculates a single fragment without building the whole table
    pub(crate) fn fragment_mass_with(
        &self,
        seq: &str,
        ion_type: IonType,
        ordinal: usize,
        explicit: Option<&ExplicitSequenceMods>,
    ) -> f64 {
        if ion_type.is_precursor() {
            return self.precursor_mass_with(seq, explicit);
        }

        let mods = self.select_mods(explicit);
        let bytes = seq.as_bytes();
        let ordinal = ordinal.min(bytes.len());
        let (terminal_mods, residues) = if ion_type.is_n_terminal() {
            let terminal = bytes.first().map_or(0.0, |&aa| mods.n_term(aa));
            (mods.cleave_n() + terminal, 0..ordinal)
        } else {
            let terminal = bytes.last().map_or(0.0, |&aa| mods.c_term(aa));
            (mods.cleave_c() + terminal, bytes.len() - ordinal..bytes.len())
        };

        self.ion_offset(ion_type)
            + terminal_mods
            + self.proton
            + residues
                .map(|i| self.modified_residue_mass(mods, explicit, i, bytes[i]))
                .sum::<f64>()
    }

    /// Annotates every modified residue with its total mass shift, like `PEPC[+57.0]TIDEK`
    pub(crate) fn modified_sequence_with(
        &self,
        seq: &str,
        explicit: Option<&ExplicitSequenceMods>,
        narrow: bool,
    ) -> String {
        if explicit.is_none() && !self.is_modified(seq) {
            return seq.to_owned();
        }

        let mods = self.select_mods(explicit);
        let last = seq.len().saturating_sub(1);
        let mut modified = String::with_capacity(seq.len());
        for (i, aa) in seq.bytes().enumerate() {
            let mut delta = mods.interior(aa) + explicit_mass(explicit, i);
            // NOTE: A single residue is only ever treated as the N-terminus
            if i == 0 {
                delta += mods.cleave_n() + mods.n_term(aa);
            } else if i == last {
                delta += mods.cleave_c() + mods.c_term(aa);
            }

            modified.push(char::from(aa));
            if delta != 0.0 {
                modified.push_str(&mod_diff_description(delta, narrow));
            }
        }
        modified
    }
}

// Private Helper Methods ==============================================================================================

impl SequenceMassCalc<'_> {
    // NOTE: Explicit modifications that don't need the full set of modifications replace the structural ones in
    // a calculator with isotope labels, leaving only the heavy table
    fn select_mods(&self, explicit: Option<&ExplicitSequenceMods>) -> &ModMasses {
        match (explicit, &self.heavy_mods) {
            (
                Some(ExplicitSequenceMods {
                    requires_all_calc_mods: false,
                    ..
                }),
                Some(heavy_mods),
            ) => heavy_mods,
            _ => &self.mods,
        }
    }

    fn residue_mass(&self, aa: u8) -> f64 {
        self.amino_masses.get(usize::from(aa)).copied().unwrap_or_default()
    }

    fn modified_residue_mass(
        &self,
        mods: &ModMasses,
        explicit: Option<&ExplicitSequenceMods>,
        index: usize,
        aa: u8,
    ) -> f64 {
        self.residue_mass(aa) + mods.interior(aa) + explicit_mass(explicit, index)
    }

    fn ion_offset(&self, ion_type: IonType) -> f64 {
        IonType::FRAGMENTS
            .iter()
            .position(|&t| t == ion_type)
            .map_or(0.0, |i| self.ion_offsets[i])
    }
}

fn explicit_mass(explicit: Option<&ExplicitSequenceMods>, index: usize) -> f64 {
    explicit
        .and_then(|e| e.mods.get(index))
        .copied()
        .unwrap_or_default()
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;

    use crate::{
        PROTON_MASS, get_mz, persistence::round_mass,
        testing_tools::{DB, carbamidomethyl, heavy_k},
    };

    use super::*;

    const PEPTIDE: f64 = 800.367_240_493_331;
    const PEPTIDE_B: [f64; 6] = [
        98.060_040_315_471,
        227.102_633_403_441,
        324.155_397_252_291,
        425.203_075_720_701,
        538.287_139_697_831,
        653.314_082_721_661,
    ];
    // NOTE: Indexed by cleavage offset, so these are y6 down to y1
    const PEPTIDE_Y: [f64; 6] = [
        703.314_476_644_481,
        574.271_883_556_511,
        477.219_119_707_661,
        376.171_441_239_251,
        263.087_377_262_121,
        148.060_434_238_291,
    ];

    fn mono() -> SequenceMassCalc<'static> {
        SequenceMassCalc::new(&DB, MassType::Monoisotopic).unwrap()
    }

    #[test]
    fn precursor_masses() {
        let calc = mono();
        assert_float_absolute_eq!(calc.precursor_mass("PEPTIDE"), PEPTIDE, 1e-9);
        assert_float_absolute_eq!(calc.precursor_mass("PEPTIDEK"), 928.462_203_507_331, 1e-9);
        assert_float_absolute_eq!(calc.precursor_mass("GG"), 133.060_768_591_461, 1e-9);
        assert_float_absolute_eq!(calc.precursor_mass("ACK"), 321.159_102_733_741, 1e-9);
        // Lowercase residues have the same masses
        assert_eq!(calc.precursor_mass("peptide"), calc.precursor_mass("PEPTIDE"));
        // Repeated calculations are bit-for-bit identical
        assert_eq!(calc.precursor_mass("PEPTIDE").to_bits(), mono().precursor_mass("PEPTIDE").to_bits());
        // An empty sequence is just water and a proton
        assert_float_absolute_eq!(calc.precursor_mass(""), 18.010_564_683_7 + PROTON_MASS, 1e-9);
    }

    #[test]
    fn end_to_end_peptide() {
        let calc = mono();
        let mass_h = calc.precursor_mass("PEPTIDE");
        let residues: f64 = "PEPTIDE".chars().map(|aa| calc.amino_acid_mass(aa)).sum();
        assert_float_absolute_eq!(mass_h, residues + 18.010_564_683_7 + PROTON_MASS, 1e-9);
        assert_eq!(round_mass(mass_h), 800.367_240);
        assert_float_absolute_eq!(get_mz(mass_h, 2), 400.687_258_479_976, 1e-9);
        // Persisting and reloading the rounded mass gives the same value again
        let reloaded: f64 = round_mass(mass_h).to_string().parse().unwrap();
        assert_eq!(round_mass(reloaded), round_mass(mass_h));
    }

    #[test]
    fn ambiguous_residues() {
        let calc = mono();
        assert_float_absolute_eq!(calc.amino_acid_mass('B'), 114.534_935_232_485, 1e-9);
        assert_float_absolute_eq!(calc.amino_acid_mass('Z'), 128.550_585_296_625, 1e-9);
        assert_eq!(calc.amino_acid_mass('J'), 0.0);
        assert_eq!(calc.amino_acid_mass('X'), 111.06);
        assert_eq!(calc.amino_acid_mass('x'), 111.06);
        assert_eq!(calc.amino_acid_mass('-'), 0.0);
        assert_eq!(calc.amino_acid_mass('é'), 0.0);
        assert_float_absolute_eq!(calc.precursor_mass("BZJX"), 373.163_361_679_431, 1e-9);

        // The historical constant doesn't change with the mass type
        let avg = SequenceMassCalc::new(&DB, MassType::Average).unwrap();
        assert_eq!(avg.amino_acid_mass('X'), 111.06);
        assert!(avg.amino_acid_mass('K') > mono().amino_acid_mass('K'));
    }

    #[test]
    fn fragment_table() {
        let calc = mono();
        let table = calc.fragment_ion_masses("PEPTIDE");
        assert_eq!(table.len(), 6);
        for offset in 0..6 {
            assert_float_absolute_eq!(table.get(IonType::B, offset).unwrap(), PEPTIDE_B[offset], 1e-9);
            assert_float_absolute_eq!(table.get(IonType::Y, offset).unwrap(), PEPTIDE_Y[offset], 1e-9);
            // Complementary b and y ions sum to the precursor plus an extra proton
            let b_plus_y = table.get(IonType::B, offset).unwrap() + table.get(IonType::Y, offset).unwrap();
            assert_float_absolute_eq!(b_plus_y, PEPTIDE + PROTON_MASS, 1e-9);
        }
        assert_float_absolute_eq!(table.get(IonType::A, 0).unwrap(), 70.065_125_695_911, 1e-9);
        assert_float_absolute_eq!(table.get(IonType::C, 0).unwrap(), 115.086_589_416_481, 1e-9);
        // x ions sit CO2 - H2O above the y ion of the same ordinal
        assert_float_absolute_eq!(table.get(IonType::X, 5).unwrap(), 174.039_698_793_711, 1e-9);
        assert_float_absolute_eq!(table.get(IonType::Z, 5).unwrap(), 132.041_710_169_351, 1e-9);

        let y_ions: Vec<_> = table.fragment_masses(IonType::Y).collect();
        assert_float_absolute_eq!(y_ions[0], 148.060_434_238_291, 1e-9);
        assert_float_absolute_eq!(y_ions[5], 703.314_476_644_481, 1e-9);
    }

    #[test]
    fn tiny_fragment_tables() {
        let calc = mono();
        assert!(calc.fragment_ion_masses("").is_empty());
        assert!(calc.fragment_ion_masses("K").is_empty());
        let table = calc.fragment_ion_masses("GG");
        assert_eq!(table.len(), 1);
        assert_float_absolute_eq!(
            table.get(IonType::B, 0).unwrap() + table.get(IonType::Y, 0).unwrap(),
            133.060_768_591_461 + PROTON_MASS,
            1e-9
        );
    }

    #[test]
    fn single_fragments_match_the_table() {
        let calc = SequenceMassCalc::new(&DB, MassType::Monoisotopic)
            .and_then(|calc| calc.with_static_mods(&[carbamidomethyl()]))
            .unwrap();
        let seq = "ACDCEK";
        let table = calc.fragment_ion_masses(seq);
        for ion_type in IonType::FRAGMENTS {
            for (i, mass) in table.fragment_masses(ion_type).enumerate() {
                assert_float_absolute_eq!(calc.fragment_mass(seq, ion_type, i + 1), mass, 1e-9);
            }
        }
        assert_eq!(calc.fragment_mass(seq, IonType::Precursor, 6), calc.precursor_mass(seq));
        assert_eq!(calc.precursor_fragment_mass(seq), calc.precursor_mass(seq));
        // Ordinals past the end of the peptide are clamped
        assert_eq!(
            calc.fragment_mass(seq, IonType::Y, 99),
            calc.fragment_mass(seq, IonType::Y, 6)
        );
    }

    #[test]
    fn static_modifications() {
        let calc = mono().with_static_mods(&[carbamidomethyl()]).unwrap();
        assert_float_absolute_eq!(calc.precursor_mass("ACK"), 378.180_566_733_741, 1e-9);
        assert!(calc.is_modified("ACK"));
        assert!(!calc.is_modified("PEPTIDE"));
        assert!(!calc.is_modified(""));
        assert!(!mono().is_modified("ACK"));
        assert_eq!(calc.get_mod_mass('C', &carbamidomethyl()).unwrap(), 57.021_464);
        assert_eq!(calc.parse_mod_mass("H3PO4").unwrap(), 97.976_895);
        assert!(calc.parse_mod_mass("H2O - H2O").is_err());
    }

    #[test]
    fn heavy_modifications() {
        let heavy = mono().with_heavy_mods(&[heavy_k()]).unwrap();
        let shift = heavy.precursor_mass("PEPTIDEK") - mono().precursor_mass("PEPTIDEK");
        assert_float_absolute_eq!(shift, 8.014_199, 1e-9);
        let table = heavy.fragment_ion_masses("PEPTIDEK");
        // Only the C-terminal fragments contain the labelled lysine
        assert_float_absolute_eq!(
            table.get(IonType::Y, 6).unwrap() - mono().fragment_ion_masses("PEPTIDEK").get(IonType::Y, 6).unwrap(),
            8.014_199,
            1e-9
        );
        assert_eq!(
            table.get(IonType::B, 6),
            mono().fragment_ion_masses("PEPTIDEK").get(IonType::B, 6)
        );
    }

    #[test]
    fn explicit_mods_select_tables() {
        let calc = mono()
            .with_static_mods(&[carbamidomethyl()])
            .and_then(|calc| calc.with_heavy_mods(&[heavy_k()]))
            .unwrap();
        let seq = "ACK";
        let plain = mono().precursor_mass(seq);

        // Explicit modifications that replace the structural ones keep only the heavy label
        let replacing = ExplicitSequenceMods::new(vec![0.0, 0.0, 0.0], false);
        assert_float_absolute_eq!(calc.precursor_mass_with(seq, Some(&replacing)) - plain, 8.014_199, 1e-9);

        // Otherwise every modification of the calculator still applies
        let adding = ExplicitSequenceMods::new(vec![15.994_915], true);
        assert_float_absolute_eq!(
            calc.precursor_mass_with(seq, Some(&adding)) - plain,
            15.994_915 + 57.021_464 + 8.014_199,
            1e-9
        );

        // Calculators without heavy modifications always use their full tables
        let light = mono().with_static_mods(&[carbamidomethyl()]).unwrap();
        assert_float_absolute_eq!(
            light.precursor_mass_with(seq, Some(&replacing)) - plain,
            57.021_464,
            1e-9
        );
    }

    #[test]
    fn modified_sequences() {
        let calc = mono().with_static_mods(&[carbamidomethyl()]).unwrap();
        assert_eq!(calc.modified_sequence("PEPTIDE", false), "PEPTIDE");
        assert_eq!(calc.modified_sequence("PEPCTIDEK", false), "PEPC[+57.0]TIDEK");
        assert_eq!(calc.modified_sequence("PEPCTIDEK", true), "PEPC[+57]TIDEK");

        let heavy = mono().with_heavy_mods(&[heavy_k()]).unwrap();
        assert_eq!(heavy.modified_sequence("PEPTIDEK", true), "PEPTIDEK[+8]");
        assert_eq!(heavy.modified_sequence("PEPTIDEK", false), "PEPTIDEK[+8.0]");

        let explicit = ExplicitSequenceMods::new(vec![0.0, -18.010_565], true);
        assert_eq!(
            mono().modified_sequence_with("PEPTIDE", Some(&explicit), false),
            "PE[-18.0]PTIDE"
        );
    }
}
