// Standard Library Imports
use std::iter;

// External Crate Imports
use seqcalc::{
    ExplicitMods, FragmentMassCalc, IonType, IsotopeLabelType, MAX_PRODUCT_CHARGE, MIN_PRODUCT_CHARGE, MzMatchError,
    PrecursorMassCalc, get_mz,
};
use tracing::{debug, trace_span};

// Local Crate Imports
use crate::{
    ExplicitLoss, FragmentRange, LibraryMatch, LibraryPick, MassCalcs, Result, SrmSettings, Transition,
    TransitionGroup, TransitionLosses, TransitionNode, calc_potential_losses, calc_transition_losses,
    group::lose_mass,
};

// Public API ==========================================================================================================

/// A product ion whose predicted m/z explains an observed one
#[derive(Clone, PartialEq, Debug)]
pub struct ProductMatch {
    pub transition: Transition,
    pub losses: Option<TransitionLosses>,
    /// The predicted m/z, after any neutral losses
    pub mz: f64,
}

/// Picks the transitions of `group` whose precursor has the m/z `precursor_mz`.
///
/// Without `use_filter`, every fragment ion of every type and charge (up to the precursor charge) that the
/// instrument can measure is returned, along with the precursor itself and all of their neutral loss variants.
///
/// With `use_filter`, only the ion types and charges of the filter are considered, and `library` decides how they
/// are picked: by fragment range when the peptide has no library spectrum, or by the library pick of the settings
/// otherwise. Nothing is picked while a library spectrum is still loading or has no ranked peaks. Neutral losses are
/// only picked with the help of a library spectrum.
///
/// Heavy precursors are filtered with the masses of the light precursor, so light and heavy groups pick the same
/// transitions. The returned nodes are sorted by [`TransitionNode::canonical_cmp`]
pub fn pick_transitions(
    group: &TransitionGroup,
    settings: &SrmSettings,
    calcs: &MassCalcs<'_>,
    mods: Option<&ExplicitMods>,
    precursor_mz: f64,
    library: LibraryMatch<'_>,
    use_filter: bool,
) -> Result<Vec<TransitionNode>> {
    let sequence = group.peptide();
    let _span = trace_span!(
        "pick_transitions",
        sequence,
        charge = group.precursor_charge(),
        label_type = %group.label_type()
    )
    .entered();

    let calc_predict = calcs.fragment_calc(group.label_type(), sequence, mods)?;
    let (precursor_mz, masses_filter) = if group.label_type().is_light() {
        (precursor_mz, None)
    } else {
        let light = IsotopeLabelType::light();
        let precursor_calc = calcs.precursor_calc(&light, sequence, mods)?;
        let fragment_calc = calcs.fragment_calc(&light, sequence, mods)?;
        let light_mz = get_mz(precursor_calc.precursor_mass(sequence), group.precursor_charge());
        (light_mz, Some(fragment_calc.fragment_ion_masses(sequence)))
    };

    let instrument = settings.instrument;
    let min_mz = instrument.min_mz_for(precursor_mz);
    let max_mz = f64::from(instrument.max_mz());
    let mass_type = settings.prediction.fragment_mass_type;
    let potential_losses = calc_potential_losses(sequence, &settings.modifications, mods, mass_type);

    let mut nodes = Vec::new();
    if !use_filter {
        let precursor = Transition::precursor(group);
        let mass_h = calc_predict.precursor_fragment_mass(sequence);
        let losses = calc_transition_losses(
            IonType::Precursor,
            precursor.cleavage_offset(),
            mass_type,
            potential_losses.as_deref(),
        );
        for losses in losses {
            let node = transition_node(precursor, losses, mass_h, library);
            // NOTE: The intact precursor is always kept, but its losses can fall below the instrument's range
            if node.losses.is_some() && node.ion_mz() < min_mz {
                continue;
            }
            nodes.push(node);
        }
    }

    let masses_predict = calc_predict.fragment_ion_masses(sequence);
    let len = masses_predict.len();
    if len == 0 {
        return Ok(nodes);
    }
    let masses_filter = masses_filter.as_ref().unwrap_or(&masses_predict);

    let filter = &settings.filter;
    let all_charges: Vec<_> = (MIN_PRODUCT_CHARGE..=MAX_PRODUCT_CHARGE).collect();
    let all_ion_types = IonType::FRAGMENTS;
    let (pick, charges, ion_types) = if use_filter {
        let pick = match library {
            LibraryMatch::Unavailable => LibraryPick::None,
            _ => settings.libraries.pick(),
        };
        (pick, filter.product_charges(), filter.ion_types())
    } else {
        (LibraryPick::All, all_charges.as_slice(), all_ion_types.as_slice())
    };
    if use_filter && pick != LibraryPick::None && library.ranks().is_none_or(|ranks| ranks.is_empty()) {
        debug!(sequence, ?library, "no ranked library spectrum to pick transitions from");
        return Ok(Vec::new());
    }
    let potential_losses = potential_losses.filter(|_| pick != LibraryPick::None);

    for &ion_type in ion_types {
        for &charge in charges.iter().filter(|&&charge| charge <= group.precursor_charge()) {
            let range = if pick == LibraryPick::All {
                FragmentRange::default()
            } else {
                filter.fragment_range(masses_filter, ion_type, charge, precursor_mz)
            };

            for offset in 0..len {
                let Some(mass_h) = masses_predict.get(ion_type, offset) else {
                    continue;
                };
                let losses = calc_transition_losses(ion_type, offset, mass_type, potential_losses.as_deref());
                for losses in losses {
                    let ion_mz = get_mz(lose_mass(mass_h, losses.as_ref()), charge);
                    if ion_mz < min_mz || ion_mz > max_mz {
                        continue;
                    }

                    let is_ranked = || {
                        library
                            .ranked_ion(ion_mz)
                            .is_some_and(|ion| ion.is_match(ion_type, charge, losses.as_ref()))
                    };
                    let is_accepted = || filter.accept(sequence, precursor_mz, ion_type, offset, ion_mz, &range);
                    let is_picked = match pick {
                        LibraryPick::All => !use_filter || is_ranked(),
                        LibraryPick::AllPlus => is_ranked() || is_accepted(),
                        LibraryPick::Filter => is_accepted() && is_ranked(),
                        LibraryPick::None => is_accepted(),
                    };
                    if is_picked {
                        let transition = Transition::from_parts(ion_type, offset, charge);
                        nodes.push(transition_node(transition, losses, mass_h, library));
                    }
                }
            }
        }
    }

    nodes.sort_by(TransitionNode::canonical_cmp);
    Ok(nodes)
}

/// Finds the product ion of `group` whose m/z lies within `tolerance` of `observed_mz`. Charges are tried from 1 up
/// to the precursor charge (at most [`MAX_PRODUCT_CHARGE`]), and at each charge the precursor is tried before the
/// fragment ions, every ion with each of its neutral loss variants. The first match is returned
pub fn resolve_product_charge(
    group: &TransitionGroup,
    calc: &impl FragmentMassCalc,
    potential_losses: Option<&[Vec<ExplicitLoss>]>,
    observed_mz: f64,
    tolerance: f64,
) -> std::result::Result<ProductMatch, MzMatchError> {
    let sequence = group.peptide();
    let mass_type = calc.mass_type();
    let precursor_mass = calc.precursor_fragment_mass(sequence);
    let masses = &calc.fragment_ion_masses(sequence);
    let precursor_offset = Transition::precursor(group).cleavage_offset();

    let max_charge = group.precursor_charge().min(MAX_PRODUCT_CHARGE);
    for charge in MIN_PRODUCT_CHARGE..=max_charge {
        let precursor = iter::once((IonType::Precursor, precursor_offset, precursor_mass));
        let fragments = IonType::FRAGMENTS.into_iter().flat_map(|ion_type| {
            (0..masses.len()).filter_map(move |offset| Some((ion_type, offset, masses.get(ion_type, offset)?)))
        });

        for (ion_type, offset, mass_h) in precursor.chain(fragments) {
            for losses in calc_transition_losses(ion_type, offset, mass_type, potential_losses) {
                let mz = get_mz(lose_mass(mass_h, losses.as_ref()), charge);
                if (mz - observed_mz).abs() <= tolerance {
                    let transition = Transition::from_parts(ion_type, offset, charge);
                    return Ok(ProductMatch {
                        transition,
                        losses,
                        mz,
                    });
                }
            }
        }
    }
    Err(MzMatchError::product(observed_mz))
}

// Private Helper Methods ==============================================================================================

fn transition_node(
    transition: Transition,
    losses: Option<TransitionLosses>,
    mass_h: f64,
    library: LibraryMatch<'_>,
) -> TransitionNode {
    let mut node = TransitionNode {
        transition,
        losses,
        mass_h,
        lib_info: None,
    };
    node.lib_info = library.ranked_ion(node.ion_mz()).map(|ion| ion.lib_info);
    node
}

// Module Tests ========================================================================================================
