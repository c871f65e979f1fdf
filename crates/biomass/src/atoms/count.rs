use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    ops::Mul,
};

use rust_decimal::Decimal;

use crate::{Count, MassNumber};

impl Count {
    pub(crate) fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }
}

impl Mul<Decimal> for Count {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Decimal::from(self.0.get()) * rhs
    }
}

impl Display for Count {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let count = self.0.get();
        if count > 1 {
            write!(f, "{count}")?;
        }
        Ok(())
    }
}

impl Default for Count {
    fn default() -> Self {
        Self(NonZeroU32::MIN)
    }
}

impl Display for MassNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MassNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Count> for MassNumber {
    fn from(value: Count) -> Self {
        Self(value.0.get())
    }
}
