use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::{BiomassError, LabelAtoms};

// NOTE: Each label is listed as (flag, element, isotope, flag name)
const LABELS: [(LabelAtoms, &str, &str, &str); 4] = [
    (LabelAtoms::C13, "C", "13C", "C13"),
    (LabelAtoms::N15, "N", "15N", "N15"),
    (LabelAtoms::O18, "O", "18O", "O18"),
    (LabelAtoms::H2, "H", "2H", "H2"),
];

impl LabelAtoms {
    pub const NONE: Self = Self(0);
    pub const C13: Self = Self(1);
    pub const N15: Self = Self(1 << 1);
    pub const O18: Self = Self(1 << 2);
    pub const H2: Self = Self(1 << 3);

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub(crate) fn labels_element(self, symbol: &str) -> bool {
        LABELS
            .iter()
            .any(|&(flag, element, ..)| element == symbol && self.contains(flag))
    }
}

impl Display for LabelAtoms {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let labels: Vec<_> = LABELS
            .iter()
            .filter(|&&(flag, ..)| self.contains(flag))
            .map(|&(_, _, isotope, _)| isotope)
            .collect();
        write!(f, "{}", labels.join(", "))
    }
}

/// Parses a comma-separated list of label isotopes, like `13C, 15N` or `C13, N15`
impl FromStr for LabelAtoms {
    type Err = Box<BiomassError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .try_fold(Self::NONE, |labels, label| {
                LABELS
                    .iter()
                    .find(|&&(_, _, isotope, name)| isotope == label || name == label)
                    .map(|&(flag, ..)| labels | flag)
                    .ok_or_else(|| Box::new(BiomassError::UnknownLabel(label.to_owned())))
            })
    }
}
