// Standard Library Imports
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

// External Crate Imports
use seqcalc::{
    FragmentTable, IonType, MAX_PRECURSOR_CHARGE, MAX_PRODUCT_CHARGE, MIN_PRECURSOR_CHARGE, MIN_PRODUCT_CHARGE,
    ModTerminus, get_mz, is_aa,
};

// Local Crate Imports
use crate::{EndFinder, FragmentRange, MeasuredIon, Result, StartFinder, TransitionError, TransitionFilter};

// Public API ==========================================================================================================

impl StartFinder {
    pub const DEFAULT: Self = Self::Mz(0);

    /// The cleavage offset of the first fragment to pick from an ion series, along with the smallest m/z that
    /// fragments must have
    #[must_use]
    pub fn find_start(
        &self,
        masses: &FragmentTable,
        ion_type: IonType,
        charge: u32,
        precursor_mz: f64,
        precursor_mz_window: f64,
    ) -> (usize, f64) {
        let series = masses.series(ion_type).unwrap_or_default();
        match *self {
            Self::Ordinal(ordinal) => {
                let start = if ion_type.is_n_terminal() {
                    ordinal.min(series.len()).saturating_sub(1)
                } else {
                    series.len().saturating_sub(ordinal)
                };
                (start, 0.0)
            }
            Self::Mz(offset) => {
                let start = find_mz_start(series, ion_type, charge, precursor_mz, precursor_mz_window, offset);
                // NOTE: Offset starts are measured from the first fragment they pick, not the precursor
                let start_mz = match series.get(start) {
                    Some(&mass_h) if offset != 0 => get_mz(mass_h, charge),
                    _ => precursor_mz,
                };
                (start, start_mz)
            }
        }
    }
}

impl FromStr for StartFinder {
    type Err = Box<TransitionError>;

    fn from_str(s: &str) -> Result<Self> {
        let finder = match s {
            "ion 1" | "y1" => Self::Ordinal(1),
            "ion 2" | "y2" => Self::Ordinal(2),
            "ion 3" | "y3" => Self::Ordinal(3),
            "ion 4" | "y4" => Self::Ordinal(4),
            "m/z > precursor" => Self::Mz(0),
            "(m/z > precursor) - 1" => Self::Mz(-1),
            "(m/z > precursor) - 2" => Self::Mz(-2),
            "(m/z > precursor) + 1" => Self::Mz(1),
            "(m/z > precursor) + 2" => Self::Mz(2),
            _ => return Err(Box::new(TransitionError::StartFinder(s.to_owned()))),
        };
        Ok(finder)
    }
}

impl Display for StartFinder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Ordinal(ordinal) => write!(f, "ion {ordinal}"),
            Self::Mz(0) => write!(f, "m/z > precursor"),
            Self::Mz(offset) if offset < 0 => write!(f, "(m/z > precursor) - {}", offset.unsigned_abs()),
            Self::Mz(offset) => write!(f, "(m/z > precursor) + {offset}"),
        }
    }
}

impl EndFinder {
    pub const DEFAULT: Self = Self::Count(3);

    /// The cleavage offset of the last fragment to pick from an ion series of `len` fragments, given the offset
    /// that picking started from
    #[must_use]
    pub fn find_end(&self, ion_type: IonType, start: usize, len: usize) -> usize {
        let last = len.saturating_sub(1);
        match *self {
            Self::Last(offset) if ion_type.is_n_terminal() => last.saturating_sub(offset),
            Self::Last(offset) => last.min(offset),
            Self::Count(count) if ion_type.is_n_terminal() => (start + count).min(len).saturating_sub(1),
            Self::Count(count) => (start + 1).saturating_sub(count),
        }
    }
}

impl FromStr for EndFinder {
    type Err = Box<TransitionError>;

    fn from_str(s: &str) -> Result<Self> {
        let finder = match s {
            "last ion" | "last y-ion" => Self::Last(0),
            "last ion - 1" | "last y-ion - 1" => Self::Last(1),
            "last ion - 2" | "last y-ion - 2" => Self::Last(2),
            "last ion - 3" | "last y-ion - 3" => Self::Last(3),
            "1 ion" => Self::Count(1),
            "2 ions" => Self::Count(2),
            "3 ions" | "start + 3" => Self::Count(3),
            "4 ions" | "start + 4" => Self::Count(4),
            "5 ions" | "start + 5" => Self::Count(5),
            "6 ions" | "start + 6" => Self::Count(6),
            _ => return Err(Box::new(TransitionError::EndFinder(s.to_owned()))),
        };
        Ok(finder)
    }
}

impl Display for EndFinder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Last(0) => write!(f, "last ion"),
            Self::Last(offset) => write!(f, "last ion - {offset}"),
            Self::Count(1) => write!(f, "1 ion"),
            Self::Count(count) => write!(f, "{count} ions"),
        }
    }
}

impl MeasuredIon {
    /// A measured ion for cleavages next to any of the `fragment` residues, unless the residue on the other side of
    /// the cleavage is one of the `restrict` residues
    pub fn new(
        name: impl Into<String>,
        fragment: &str,
        restrict: Option<&str>,
        terminus: ModTerminus,
        min_fragment_length: usize,
    ) -> Result<Self> {
        let name = name.into();
        let residues = |aas: &str| -> Result<Vec<char>> {
            if aas.is_empty() || !aas.chars().all(is_aa) {
                return Err(Box::new(TransitionError::MeasuredIonResidues(name.clone())));
            }
            Ok(aas.chars().collect())
        };
        let fragment = residues(fragment)?;
        let restrict = restrict.map(residues).transpose()?.unwrap_or_default();

        Ok(Self {
            name,
            fragment,
            restrict,
            terminus,
            min_fragment_length,
        })
    }

    /// Cleavage N-terminal to proline, which gives intense y ions
    #[must_use]
    pub fn n_term_proline() -> Self {
        Self::from_parts("N-terminal to Proline", &['P'], ModTerminus::N, 3)
    }

    /// Cleavage C-terminal to glutamic or aspartic acid
    #[must_use]
    pub fn c_term_glu_asp() -> Self {
        Self::from_parts("C-terminal to Glu or Asp", &['E', 'D'], ModTerminus::C, 3)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn terminus(&self) -> ModTerminus {
        self.terminus
    }

    #[must_use]
    pub const fn min_fragment_length(&self) -> usize {
        self.min_fragment_length
    }

    /// Is the `ion_type` fragment produced by cleaving `sequence` after `cleavage_offset` one of these ions?
    #[must_use]
    pub fn is_match(&self, sequence: &str, ion_type: IonType, cleavage_offset: usize) -> bool {
        if ion_type.is_precursor() || ion_type.ordinal(cleavage_offset, sequence.len()) < self.min_fragment_length {
            return false;
        }
        let bytes = sequence.as_bytes();
        let (Some(&c_term_aa), Some(&n_term_aa)) = (bytes.get(cleavage_offset), bytes.get(cleavage_offset + 1))
        else {
            return false;
        };
        let (cleaved, other) = match self.terminus {
            ModTerminus::C => (c_term_aa, n_term_aa),
            ModTerminus::N => (n_term_aa, c_term_aa),
        };
        self.fragment.contains(&char::from(cleaved)) && !self.restrict.contains(&char::from(other))
    }
}

impl TransitionFilter {
    pub const MIN_EXCLUSION_WINDOW: f64 = 0.01;
    pub const MAX_EXCLUSION_WINDOW: f64 = 50.0;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        precursor_charges: Vec<u32>,
        product_charges: Vec<u32>,
        ion_types: Vec<IonType>,
        start_finder: StartFinder,
        end_finder: EndFinder,
        measured_ions: Vec<MeasuredIon>,
        precursor_mz_window: f64,
        auto_select: bool,
    ) -> Result<Self> {
        validate_charges(
            "precursor charges",
            &precursor_charges,
            MIN_PRECURSOR_CHARGE,
            MAX_PRECURSOR_CHARGE,
        )?;
        validate_charges(
            "product ion charges",
            &product_charges,
            MIN_PRODUCT_CHARGE,
            MAX_PRODUCT_CHARGE,
        )?;
        if ion_types.is_empty() {
            return Err(Box::new(TransitionError::NoIonTypes));
        }
        if ion_types.iter().any(|ion_type| ion_type.is_precursor()) {
            return Err(Box::new(TransitionError::PrecursorIonType));
        }
        let window_range = Self::MIN_EXCLUSION_WINDOW..=Self::MAX_EXCLUSION_WINDOW;
        if precursor_mz_window != 0.0 && !window_range.contains(&precursor_mz_window) {
            return Err(Box::new(TransitionError::ExclusionWindow(
                precursor_mz_window,
                Self::MIN_EXCLUSION_WINDOW,
                Self::MAX_EXCLUSION_WINDOW,
            )));
        }

        Ok(Self {
            precursor_charges,
            product_charges,
            ion_types,
            start_finder,
            end_finder,
            measured_ions,
            precursor_mz_window,
            auto_select,
        })
    }

    #[must_use]
    pub fn precursor_charges(&self) -> &[u32] {
        &self.precursor_charges
    }

    #[must_use]
    pub fn product_charges(&self) -> &[u32] {
        &self.product_charges
    }

    #[must_use]
    pub fn ion_types(&self) -> &[IonType] {
        &self.ion_types
    }

    #[must_use]
    pub const fn start_finder(&self) -> StartFinder {
        self.start_finder
    }

    #[must_use]
    pub const fn end_finder(&self) -> EndFinder {
        self.end_finder
    }

    #[must_use]
    pub fn measured_ions(&self) -> &[MeasuredIon] {
        &self.measured_ions
    }

    /// The width of the m/z window around the precursor that no product ion may fall in. Zero disables the window
    #[must_use]
    pub const fn precursor_mz_window(&self) -> f64 {
        self.precursor_mz_window
    }

    /// Should transitions be picked automatically when a peptide is added?
    #[must_use]
    pub const fn auto_select(&self) -> bool {
        self.auto_select
    }

    /// The offsets and minimum m/z of the fragments to pick from one ion series at one charge
    #[must_use]
    pub fn fragment_range(
        &self,
        masses: &FragmentTable,
        ion_type: IonType,
        charge: u32,
        precursor_mz: f64,
    ) -> FragmentRange {
        let (start, start_mz) =
            self.start_finder
                .find_start(masses, ion_type, charge, precursor_mz, self.precursor_mz_window);
        let end = self.end_finder.find_end(ion_type, start, masses.len());
        // C-terminal series count down from the C-terminus
        let (start, end) = if ion_type.is_c_terminal() {
            (end, start)
        } else {
            (start, end)
        };
        FragmentRange {
            start,
            end,
            start_mz,
        }
    }

    /// Is `ion_mz` within half of the exclusion window of `precursor_mz`?
    #[must_use]
    pub fn is_excluded(&self, ion_mz: f64, precursor_mz: f64) -> bool {
        self.precursor_mz_window != 0.0 && (ion_mz - precursor_mz).abs() * 2.0 < self.precursor_mz_window
    }

    #[must_use]
    pub fn is_special_fragment(&self, sequence: &str, ion_type: IonType, cleavage_offset: usize) -> bool {
        self.measured_ions
            .iter()
            .any(|ion| ion.is_match(sequence, ion_type, cleavage_offset))
    }

    /// Should a fragment be picked? Fragments inside the exclusion window never are, otherwise they must either fall
    /// in `range` or be one of the measured ions
    #[must_use]
    pub fn accept(
        &self,
        sequence: &str,
        precursor_mz: f64,
        ion_type: IonType,
        cleavage_offset: usize,
        ion_mz: f64,
        range: &FragmentRange,
    ) -> bool {
        if self.is_excluded(ion_mz, precursor_mz) {
            return false;
        }
        range.contains(cleavage_offset, ion_mz) || self.is_special_fragment(sequence, ion_type, cleavage_offset)
    }
}

impl FragmentRange {
    #[must_use]
    pub const fn contains(&self, cleavage_offset: usize, ion_mz: f64) -> bool {
        self.start <= cleavage_offset && cleavage_offset <= self.end && self.start_mz <= ion_mz
    }
}

// Private Helper Methods ==============================================================================================

impl MeasuredIon {
    fn from_parts(name: &str, fragment: &[char], terminus: ModTerminus, min_fragment_length: usize) -> Self {
        Self {
            name: name.to_owned(),
            fragment: fragment.to_vec(),
            restrict: Vec::new(),
            terminus,
            min_fragment_length,
        }
    }
}

fn validate_charges(name: &'static str, charges: &[u32], min: u32, max: u32) -> Result<()> {
    if charges.is_empty() {
        return Err(Box::new(TransitionError::EmptyCharges(name)));
    }
    for (i, &charge) in charges.iter().enumerate() {
        if charges[..i].contains(&charge) {
            return Err(Box::new(TransitionError::DuplicateCharge(name, charge)));
        }
        if !(min..=max).contains(&charge) {
            return Err(Box::new(TransitionError::ChargeOutOfRange(name, charge, min, max)));
        }
    }
    Ok(())
}

/// Finds the first fragment (counting from the smallest) whose m/z is above the precursor and its exclusion window,
/// then moves `offset` fragments away from it. Moving towards smaller fragments never stops inside the window
fn find_mz_start(
    series: &[f64],
    ion_type: IonType,
    charge: u32,
    precursor_mz: f64,
    precursor_mz_window: f64,
    mut offset: isize,
) -> usize {
    // NOTE: Fragment tables are far smaller than `isize::MAX`
    let len = series.len() as isize;
    let mz = |i: isize| get_mz(series[i as usize], charge);
    let threshold_mz = precursor_mz + precursor_mz_window / 2.0;

    let n_terminal = ion_type.is_n_terminal();
    let first = if n_terminal {
        (0..len).find(|&i| mz(i) > threshold_mz)
    } else {
        (0..len).rev().find(|&i| mz(i) > threshold_mz)
    };
    let Some(first) = first else {
        return if n_terminal { series.len().saturating_sub(1) } else { 0 };
    };

    let step = |offset: isize| if n_terminal { first + offset } else { first - offset };
    loop {
        let index = step(offset).clamp(0, len - 1);
        offset -= 1;
        let inside_window = (mz(index) - precursor_mz).abs() * 2.0 < precursor_mz_window;
        if !(precursor_mz_window > 0.0 && offset < 0 && (0..len).contains(&step(offset)) && inside_window) {
            return index as usize;
        }
    }
}

// Module Tests ========================================================================================================
