// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// Local Crate Imports
use crate::{IsotopeLabelType, Result, SeqCalcError};

// Public API ==========================================================================================================

impl IsotopeLabelType {
    pub const LIGHT_NAME: &str = "light";
    pub const HEAVY_NAME: &str = "heavy";

    /// A custom label type. Only `light` may use sort order zero
    pub fn new(name: impl Into<String>, sort_order: u32) -> Result<Self> {
        let name = name.into();
        if sort_order == 0 && name != Self::LIGHT_NAME {
            return Err(Box::new(SeqCalcError::LabelSortOrder(name)));
        }
        Ok(Self { sort_order, name })
    }

    #[must_use]
    pub fn light() -> Self {
        Self {
            sort_order: 0,
            name: Self::LIGHT_NAME.to_owned(),
        }
    }

    #[must_use]
    pub fn heavy() -> Self {
        Self {
            sort_order: 1,
            name: Self::HEAVY_NAME.to_owned(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn sort_order(&self) -> u32 {
        self.sort_order
    }

    #[must_use]
    pub const fn is_light(&self) -> bool {
        self.sort_order == 0
    }
}

impl Display for IsotopeLabelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// Module Tests ========================================================================================================
