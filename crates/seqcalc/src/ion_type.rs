// Standard Library Imports
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

// Local Crate Imports
use crate::{IonType, ModTerminus};

// Public API ==========================================================================================================

impl IonType {
    /// Every fragment ion series, excluding the precursor
    pub const FRAGMENTS: [Self; 6] = [Self::A, Self::B, Self::C, Self::X, Self::Y, Self::Z];

    #[must_use]
    pub const fn is_n_terminal(self) -> bool {
        matches!(self, Self::A | Self::B | Self::C)
    }

    #[must_use]
    pub const fn is_c_terminal(self) -> bool {
        matches!(self, Self::X | Self::Y | Self::Z)
    }

    #[must_use]
    pub const fn is_precursor(self) -> bool {
        matches!(self, Self::Precursor)
    }

    /// Converts a cleavage offset into the number of residues the fragment contains
    #[must_use]
    pub const fn ordinal(self, cleavage_offset: usize, sequence_len: usize) -> usize {
        if self.is_n_terminal() {
            cleavage_offset + 1
        } else {
            sequence_len.saturating_sub(cleavage_offset + 1)
        }
    }

    /// The inverse of [`IonType::ordinal`]
    #[must_use]
    pub const fn cleavage_offset(self, ordinal: usize, sequence_len: usize) -> usize {
        if self.is_n_terminal() {
            ordinal.saturating_sub(1)
        } else {
            sequence_len.saturating_sub(ordinal + 1)
        }
    }
}

impl Display for IonType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Precursor => "precursor",
        };
        write!(f, "{name}")
    }
}

impl FromStr for IonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "c" => Ok(Self::C),
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            "precursor" => Ok(Self::Precursor),
            _ => Err(format!(
                "expected one of a, b, c, x, y, z, or precursor, got {s:?}"
            )),
        }
    }
}

impl Display for ModTerminus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::N => write!(f, "N"),
            Self::C => write!(f, "C"),
        }
    }
}

impl FromStr for ModTerminus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" | "n" => Ok(Self::N),
            "C" | "c" => Ok(Self::C),
            _ => Err(format!("expected a terminus of N or C, got {s:?}")),
        }
    }
}

// Module Tests ========================================================================================================
