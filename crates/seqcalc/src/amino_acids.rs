// Public API ==========================================================================================================

/// True for the 22 proteinogenic amino acids, including pyrrolysine (`O`) and selenocysteine (`U`)
#[must_use]
pub const fn is_aa(c: char) -> bool {
    matches!(
        c,
        'A' | 'C'
            | 'D'
            | 'E'
            | 'F'
            | 'G'
            | 'H'
            | 'I'
            | 'K'
            | 'L'
            | 'M'
            | 'N'
            | 'O'
            | 'P'
            | 'Q'
            | 'R'
            | 'S'
            | 'T'
            | 'U'
            | 'V'
            | 'W'
            | 'Y'
    )
}

/// Like [`is_aa`], but also accepting the ambiguity codes `B`, `J`, `X`, and `Z`
#[must_use]
pub const fn is_ex_aa(c: char) -> bool {
    is_aa(c) || matches!(c, 'B' | 'J' | 'X' | 'Z')
}

/// The residue formula (the amino acid minus a water) of a canonical amino acid. Lowercase letters share the
/// formulae of their uppercase counterparts
#[must_use]
pub const fn amino_acid_formula(aa: char) -> Option<&'static str> {
    let formula = match aa.to_ascii_uppercase() {
        'A' => "C3H5ON",
        'C' => "C3H5ONS",
        'D' => "C4H5O3N",
        'E' => "C5H7O3N",
        'F' => "C9H9ON",
        'G' => "C2H3ON",
        'H' => "C6H7ON3",
        'I' | 'L' => "C6H11ON",
        'K' => "C6H12ON2",
        'M' => "C5H9ONS",
        'N' => "C4H6O2N2",
        'O' => "C12H19N3O2",
        'P' => "C5H7ON",
        'Q' => "C5H8O2N2",
        'R' => "C6H12ON4",
        'S' => "C3H5O2N",
        'T' => "C4H7O2N",
        'U' => "C3H5NOSe",
        'V' => "C5H9ON",
        'W' => "C11H10ON2",
        'Y' => "C9H9O2N",
        _ => return None,
    };
    Some(formula)
}

// Module Tests ========================================================================================================
