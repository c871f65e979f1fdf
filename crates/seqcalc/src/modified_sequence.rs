// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use nom::{
    IResult,
    character::complete::{char, satisfy},
    number::complete::double,
    sequence::delimited,
};
use rust_decimal::Decimal;

// Local Crate Imports
use crate::{ExplicitSequenceMods, Result, SeqCalcError};

// Public API ==========================================================================================================

/// A peptide sequence with the mass shift annotations removed, like `PEPC[+57.0]TIDEK`
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ModifiedSequence {
    pub sequence: String,
    /// The mass shift of each residue, zero when a residue is unannotated
    pub mods: Vec<f64>,
}

impl ModifiedSequence {
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.mods.iter().any(|&m| m != 0.0)
    }

    /// The annotated mass shifts as explicit modifications that stack on top of any static ones
    #[must_use]
    pub fn into_explicit_mods(self) -> ExplicitSequenceMods {
        ExplicitSequenceMods::new(self.mods, true)
    }
}

impl Display for ModifiedSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, aa) in self.sequence.chars().enumerate() {
            write!(f, "{aa}")?;
            match self.mods.get(i) {
                Some(&delta) if delta != 0.0 => write!(f, "{}", mod_diff_description(delta, false))?,
                _ => (),
            }
        }
        Ok(())
    }
}

/// Formats a mass shift for a modified sequence. The wide form always has one decimal place (`[+57.0]`, `[-18.0]`)
/// and is what library keys are matched with. The narrow form rounds to one decimal place but drops a trailing zero,
/// so the `[+1]` and `[+2]` shifts of isotope labels stay short. Only positive shifts are given a sign
#[must_use]
pub fn mod_diff_description(mass_diff: f64, narrow: bool) -> String {
    let sign = if mass_diff > 0.0 { "+" } else { "" };
    let narrow_diff = narrow
        .then(|| Decimal::try_from(mass_diff).ok())
        .flatten()
        .map(|d| d.round_dp(1).normalize());
    match narrow_diff {
        Some(diff) => format!("[{sign}{diff}]"),
        None => format!("[{sign}{mass_diff:.1}]"),
    }
}

/// Parses a sequence annotated with narrow or wide mass shifts, like `PEPC[+57.0]TIDEK[+8]`
pub fn parse_modified_sequence(text: &str) -> Result<ModifiedSequence> {
    let error = |rest: &str, len: usize, reason| {
        let offset = text.len() - rest.len();
        Box::new(SeqCalcError::ModifiedSequence {
            sequence: text.to_owned(),
            span: (offset, len.min(rest.len()).max(1)).into(),
            reason,
        })
    };

    if text.is_empty() {
        return Err(error(text, 0, "expected at least one residue"));
    }

    let mut parsed = ModifiedSequence::default();
    let mut rest = text;
    while !rest.is_empty() {
        let Ok((after_residue, aa)) = residue(rest) else {
            let len = rest.chars().next().map_or(1, |c| c.len_utf8());
            return Err(error(rest, len, "expected an amino acid letter"));
        };
        rest = after_residue;

        let mut delta = 0.0;
        if rest.starts_with('[') {
            let len = rest.find(']').map_or(rest.len(), |end| end + 1);
            let Ok((after_mod, mass)) = mass_shift(rest) else {
                return Err(error(rest, len, "expected a mass shift like [+57.0]"));
            };
            rest = after_mod;
            delta = mass;
        }

        parsed.sequence.push(aa);
        parsed.mods.push(delta);
    }
    Ok(parsed)
}

// Private Helper Functions ============================================================================================

fn residue(i: &str) -> IResult<&str, char> {
    satisfy(|c| c.is_ascii_alphabetic())(i)
}

fn mass_shift(i: &str) -> IResult<&str, f64> {
    delimited(char('['), double, char(']'))(i)
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_descriptions() {
        assert_eq!(mod_diff_description(57.021_464, false), "[+57.0]");
        assert_eq!(mod_diff_description(-18.010_565, false), "[-18.0]");
        assert_eq!(mod_diff_description(8.014_199, false), "[+8.0]");
        assert_eq!(mod_diff_description(0.984_016, false), "[+1.0]");
        // Formatting is stable when repeated
        let once = mod_diff_description(79.966_331, false);
        assert_eq!(once, mod_diff_description(79.966_331, false));
        assert_eq!(once, "[+80.0]");
    }

    #[test]
    fn narrow_descriptions() {
        assert_eq!(mod_diff_description(57.021_464, true), "[+57]");
        assert_eq!(mod_diff_description(8.014_199, true), "[+8]");
        assert_eq!(mod_diff_description(0.997_035, true), "[+1]");
        assert_eq!(mod_diff_description(15.994_915, true), "[+16]");
        assert_eq!(mod_diff_description(42.010_565, true), "[+42]");
        assert_eq!(mod_diff_description(-17.026_549, true), "[-17]");
        assert_eq!(mod_diff_description(79.966_331, true), "[+80]");
        assert_eq!(mod_diff_description(6.020_129, true), "[+6]");
        assert_eq!(mod_diff_description(114.042_927, true), "[+114]");
        assert_eq!(mod_diff_description(0.25, true), "[+0.2]");
        assert_eq!(mod_diff_description(-0.984_016, true), "[-1]");
    }

    #[test]
    fn parse_sequences() {
        let parsed = parse_modified_sequence("PEPC[+57.0]TIDEK[+8]").unwrap();
        assert_eq!(parsed.sequence, "PEPCTIDEK");
        assert_eq!(parsed.mods, [0.0, 0.0, 0.0, 57.0, 0.0, 0.0, 0.0, 0.0, 8.0]);
        assert!(parsed.is_modified());
        assert_eq!(parsed.to_string(), "PEPC[+57.0]TIDEK[+8.0]");

        let plain = parse_modified_sequence("PEPTIDE").unwrap();
        assert!(!plain.is_modified());
        assert_eq!(plain.to_string(), "PEPTIDE");

        let negative = parse_modified_sequence("PE[-18.0]PTIDE").unwrap();
        assert_eq!(negative.mods[1], -18.0);
        let explicit = negative.into_explicit_mods();
        assert!(explicit.requires_all_calc_mods);
        assert_eq!(explicit.mods.len(), 7);
    }

    #[test]
    fn formatting_round_trips() {
        for text in ["PEPC[+57.0]TIDEK", "M[+16.0]PEPTIDEK[+8.0]", "AS[+80.0]T[-18.0]K"] {
            let parsed = parse_modified_sequence(text).unwrap();
            assert_eq!(parsed.to_string(), text);
            assert_eq!(parse_modified_sequence(&parsed.to_string()).unwrap(), parsed);
        }
        // Narrow annotations parse to the same shifts as their wide forms
        assert_eq!(
            parse_modified_sequence("PEPC[+57]TIDEK").unwrap(),
            parse_modified_sequence("PEPC[+57.0]TIDEK").unwrap()
        );
    }

    #[test]
    fn invalid_sequences() {
        let error = |text| match *parse_modified_sequence(text).unwrap_err() {
            SeqCalcError::ModifiedSequence { span, reason, .. } => (span.offset(), span.len(), reason),
            other => panic!("unexpected error: {other:?}"),
        };
        assert_eq!(error(""), (0, 1, "expected at least one residue"));
        assert_eq!(error("PEP1DE"), (3, 1, "expected an amino acid letter"));
        assert_eq!(error("[+57.0]PEP"), (0, 1, "expected an amino acid letter"));
        assert_eq!(error("PEPC[+5x.0]K"), (4, 7, "expected a mass shift like [+57.0]"));
        assert_eq!(error("PEPC[+57.0"), (4, 6, "expected a mass shift like [+57.0]"));
        assert_eq!(error("PEPC[]K"), (4, 2, "expected a mass shift like [+57.0]"));
    }
}
