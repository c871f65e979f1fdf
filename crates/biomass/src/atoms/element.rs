use std::{
    convert::identity,
    fmt::{self, Display, Formatter},
};

use rust_decimal::Decimal;

use crate::{Element, Isotope, LabelAtoms, MassNumber, Massive};

use super::{
    atomic_database::{AtomicDatabase, ElementDescription},
    errors::AtomicLookupError,
};

impl<'a> Element<'a> {
    pub(crate) fn new(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
    ) -> Result<Self, AtomicLookupError> {
        Self::lookup(db, symbol, None)
    }

    pub(crate) fn new_isotope(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
        mass_number: impl Into<MassNumber>,
    ) -> Result<Self, AtomicLookupError> {
        Self::lookup(db, symbol, Some(mass_number.into()))
    }

    /// Looks up the isotope of `symbol` that is flagged as its heavy label
    pub(crate) fn new_heavy(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
    ) -> Result<Self, AtomicLookupError> {
        Self::new(db, symbol)?.into_heavy()
    }

    /// Swaps this element for its label isotope when `label_atoms` names it, leaving explicit isotopes alone
    pub(crate) fn relabel(&self, label_atoms: LabelAtoms) -> Result<Self, AtomicLookupError> {
        if self.mass_number.is_none() && label_atoms.labels_element(self.symbol) {
            self.clone().into_heavy()
        } else {
            Ok(self.clone())
        }
    }

    fn into_heavy(self) -> Result<Self, AtomicLookupError> {
        let mass_number = self
            .isotopes
            .iter()
            .find_map(|(&a, i)| i.label.then_some(a))
            .ok_or_else(|| AtomicLookupError::Label(self.name.to_owned(), self.symbol.to_owned()))?;

        Ok(Self {
            mass_number: Some(mass_number),
            ..self
        })
    }

    fn lookup(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
        mass_number: Option<MassNumber>,
    ) -> Result<Self, AtomicLookupError> {
        let symbol = symbol.as_ref();
        let (symbol, ElementDescription { name, isotopes }) = db
            .elements
            .get_key_value(symbol)
            .ok_or_else(|| AtomicLookupError::Element(symbol.to_owned()))?;

        let element = Self {
            symbol,
            name,
            mass_number,
            isotopes,
        };

        Self::validate_isotopes(element)
    }

    fn validate_isotopes(
        element @ Self {
            symbol,
            name,
            mass_number,
            isotopes,
        }: Self,
    ) -> Result<Self, AtomicLookupError> {
        if let Some(mass_number) = mass_number {
            if !isotopes.contains_key(&mass_number) {
                return Err(AtomicLookupError::Isotope(
                    symbol.to_owned(),
                    mass_number,
                    name.to_owned(),
                    AtomicLookupError::display_vec(isotopes.keys()),
                ));
            }
        } else if !isotopes.values().any(|i| i.abundance.is_some()) {
            // NOTE: The database loader rejects elements without isotopes, so there is always a minimum here
            let lightest = isotopes.keys().copied().min().unwrap_or(MassNumber(0));
            return Err(AtomicLookupError::Abundance(
                name.to_owned(),
                symbol.to_owned(),
                lightest,
                AtomicLookupError::display_vec(isotopes.keys()),
            ));
        }

        Ok(element)
    }

    fn isotope_mass(&self) -> Option<Decimal> {
        self.mass_number
            .and_then(|a| self.isotopes.get(&a))
            .map(|i| i.relative_mass)
    }

    fn isotope_abundances(&self) -> impl Iterator<Item = (&Isotope, Decimal)> {
        self.isotopes
            .values()
            .filter_map(|i| i.abundance.map(|a| (i, a)))
    }
}

impl Display for Element<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = self.symbol;
        if let Some(mass_number) = self.mass_number {
            write!(f, "[{mass_number}{symbol}]")
        } else {
            write!(f, "{symbol}")
        }
    }
}

impl Massive for Element<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        self.isotope_mass().map_or_else(
            || {
                self.isotope_abundances()
                    .max_by_key(|&(_, abundance)| abundance)
                    .map_or(Decimal::ZERO, |(i, _)| i.relative_mass)
            },
            identity,
        )
    }

    fn average_mass(&self) -> Decimal {
        self.isotope_mass().map_or_else(
            || {
                self.isotope_abundances()
                    .map(|(i, abundance)| i.relative_mass * abundance)
                    .sum()
            },
            identity,
        )
    }
}
