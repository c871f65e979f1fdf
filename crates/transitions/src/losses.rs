// Standard Library Imports
use std::iter;

// External Crate Imports
use seqcalc::{ExplicitMods, FragmentLoss, IonType, MassType, StaticMod};
use tracing::trace_span;

// Local Crate Imports
use crate::{ExplicitLoss, LossCombinations, PeptideModifications, TransitionLoss, TransitionLosses};

// Public API ==========================================================================================================

/// Every combination of neutral losses a peptide's precursor can undergo, each bound to the residues losing mass
pub type PotentialLosses = Vec<Vec<ExplicitLoss>>;

impl TransitionLoss {
    #[must_use]
    pub const fn new(modification: StaticMod, loss: FragmentLoss, mass_type: MassType) -> Self {
        Self {
            modification,
            loss,
            mass_type,
        }
    }

    /// The modification whose residue loses mass
    #[must_use]
    pub const fn modification(&self) -> &StaticMod {
        &self.modification
    }

    #[must_use]
    pub const fn loss(&self) -> &FragmentLoss {
        &self.loss
    }

    #[must_use]
    pub const fn mass_type(&self) -> MassType {
        self.mass_type
    }

    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.loss.mass(self.mass_type)
    }
}

impl TransitionLosses {
    /// Sums the masses of `losses` using `mass_type`
    #[must_use]
    pub fn new(losses: Vec<TransitionLoss>, mass_type: MassType) -> Self {
        let mass = losses.iter().map(|loss| loss.loss().mass(mass_type)).sum();
        Self { losses, mass }
    }

    #[must_use]
    pub fn losses(&self) -> &[TransitionLoss] {
        &self.losses
    }

    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }
}

/// Finds the residues of `sequence` that neutral losses can come from, then enumerates every combination of up to
/// the maximum number of neutral losses from distinct residues. Returns `None` when nothing can be lost.
///
/// Implicit losses come from the non-explicit modifications of `pep_mods`, and are ignored when `explicit_mods`
/// replaces the structural modifications of the peptide (that is, when its static modifications aren't variable)
#[must_use]
pub fn calc_potential_losses(
    sequence: &str,
    pep_mods: &PeptideModifications,
    explicit_mods: Option<&ExplicitMods>,
    mass_type: MassType,
) -> Option<PotentialLosses> {
    let _span = trace_span!("calc_potential_losses", sequence).entered();

    let explicit_static = explicit_mods.filter(|mods| mods.has_static_mods());
    let implicit_allowed = explicit_static.is_none_or(ExplicitMods::is_variable_static_mods);
    let implicit_mods: Vec<_> = if implicit_allowed {
        pep_mods.neutral_loss_mods().collect()
    } else {
        Vec::new()
    };
    let explicit_mods: Vec<_> = explicit_static.into_iter().flat_map(ExplicitMods::loss_mods).collect();

    let len = sequence.len();
    let mut groups: Vec<(Vec<TransitionLoss>, usize)> = Vec::new();
    for (index, aa) in sequence.chars().enumerate() {
        for &modification in implicit_mods.iter().filter(|m| m.is_mod(aa, index, len)) {
            add_losses(&mut groups, index, modification, mass_type);
        }
        for explicit in explicit_mods.iter().filter(|m| m.index_aa == index) {
            add_losses(&mut groups, index, &explicit.modification, mass_type);
        }
    }

    if groups.is_empty() {
        return None;
    }

    let max_losses = pep_mods.max_neutral_losses().min(groups.len());
    let potential_losses = (1..=max_losses)
        .flat_map(|count| {
            LossCombinations::new(count, &groups, |index_aa, loss: &TransitionLoss| {
                ExplicitLoss::new(index_aa, loss.clone())
            })
        })
        .collect();
    Some(potential_losses)
}

/// The distinct sets of neutral losses that one ion can undergo, starting with `None` for the ion without losses.
/// N-terminal fragments only lose mass from residues they contain, and likewise for C-terminal fragments, while the
/// precursor can lose mass from any residue. Loss sets with the same total mass are only listed once, in order of
/// increasing mass
pub fn calc_transition_losses(
    ion_type: IonType,
    cleavage_offset: usize,
    mass_type: MassType,
    potential_losses: Option<&[Vec<ExplicitLoss>]>,
) -> impl Iterator<Item = Option<TransitionLosses>> + use<> {
    let mut distinct: Vec<TransitionLosses> = Vec::new();
    for losses in potential_losses.into_iter().flatten() {
        let Some(ion_losses) = ion_losses(ion_type, cleavage_offset, mass_type, losses) else {
            continue;
        };
        if distinct.iter().all(|seen| seen.mass() != ion_losses.mass()) {
            distinct.push(ion_losses);
        }
    }
    distinct.sort_by(|a, b| a.mass().total_cmp(&b.mass()));

    iter::once(None).chain(distinct.into_iter().map(Some))
}

// Private Helper Methods ==============================================================================================

/// Losses at the same residue are stacked into the same group, so they're never combined with each other
fn add_losses(
    groups: &mut Vec<(Vec<TransitionLoss>, usize)>,
    index_aa: usize,
    modification: &StaticMod,
    mass_type: MassType,
) {
    if groups.last().is_none_or(|&(_, last_index)| last_index != index_aa) {
        groups.push((Vec::new(), index_aa));
    }
    if let Some((losses, _)) = groups.last_mut() {
        losses.extend(
            modification
                .losses()
                .iter()
                .map(|loss| TransitionLoss::new(modification.clone(), loss.clone(), mass_type)),
        );
    }
}

fn ion_losses(
    ion_type: IonType,
    cleavage_offset: usize,
    mass_type: MassType,
    losses: &[ExplicitLoss],
) -> Option<TransitionLosses> {
    let contained = |loss: &&ExplicitLoss| {
        if ion_type.is_n_terminal() {
            loss.index_aa <= cleavage_offset
        } else if ion_type.is_c_terminal() {
            loss.index_aa > cleavage_offset
        } else {
            true
        }
    };
    let kept: Vec<_> = losses.iter().filter(contained).map(|loss| loss.loss.clone()).collect();
    (!kept.is_empty()).then(|| TransitionLosses::new(kept, mass_type))
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;
    use seqcalc::{ExplicitMod, IsotopeLabelType, TypedExplicitMods};

    use crate::testing_tools::{carbamidomethyl, pep_mods, phospho, phospho_variable};

    use super::*;

    const H3PO4: f64 = 97.976_895;

    fn loss_masses(ion_type: IonType, cleavage_offset: usize, potential: Option<&PotentialLosses>) -> Vec<f64> {
        calc_transition_losses(
            ion_type,
            cleavage_offset,
            MassType::Monoisotopic,
            potential.map(Vec::as_slice),
        )
        .map(|losses| losses.map_or(0.0, |l| l.mass()))
        .collect()
    }

    fn assert_masses(found: Vec<f64>, expected: &[f64]) {
        assert_eq!(found.len(), expected.len(), "{found:?} != {expected:?}");
        for (&mass, &expected) in found.iter().zip(expected) {
            assert_float_absolute_eq!(mass, expected);
        }
    }

    fn residues(potential: &PotentialLosses) -> Vec<Vec<usize>> {
        potential
            .iter()
            .map(|losses| losses.iter().map(|loss| loss.index_aa).collect())
            .collect()
    }

    #[test]
    fn transition_loss_masses() {
        let phospho = phospho();
        let loss = phospho.losses()[0].clone();
        let mono = TransitionLoss::new(phospho.clone(), loss.clone(), MassType::Monoisotopic);
        let average = TransitionLoss::new(phospho, loss, MassType::Average);
        assert_float_absolute_eq!(mono.mass(), H3PO4);
        assert_float_absolute_eq!(average.mass(), 97.995, 0.001);
        assert_eq!(mono.modification().name(), "Phospho (ST)");
        assert_eq!(mono.loss().formula(), Some("H3PO4"));

        // The mass type of the set wins over those of its members
        let both = TransitionLosses::new(vec![mono, average], MassType::Monoisotopic);
        assert_eq!(both.losses().len(), 2);
        assert_float_absolute_eq!(both.mass(), 2.0 * H3PO4);
    }

    #[test]
    fn no_potential_losses() {
        let mods = pep_mods(vec![carbamidomethyl()], 1);
        assert_eq!(calc_potential_losses("PEPCSTIDE", &mods, None, MassType::Monoisotopic), None);
        let mods = pep_mods(vec![phospho()], 1);
        let potential = calc_potential_losses("PEPTIDE", &mods, None, MassType::Monoisotopic).unwrap();
        assert_eq!(residues(&potential), [vec![3]]);
        assert_eq!(calc_potential_losses("PEPKIDE", &mods, None, MassType::Monoisotopic), None);
        assert_masses(loss_masses(IonType::Y, 2, None), &[0.0]);
    }

    #[test]
    fn implicit_losses() {
        let single = pep_mods(vec![phospho(), carbamidomethyl()], 1);
        let potential = calc_potential_losses("PESTIDE", &single, None, MassType::Monoisotopic).unwrap();
        assert_eq!(residues(&potential), [vec![2], vec![3]]);

        let double = pep_mods(vec![phospho(), carbamidomethyl()], 2);
        let potential = calc_potential_losses("PESTIDE", &double, None, MassType::Monoisotopic).unwrap();
        assert_eq!(residues(&potential), [vec![2], vec![3], vec![2, 3]]);

        // More losses than residues only yields every residue once
        let many = pep_mods(vec![phospho()], 5);
        let potential = calc_potential_losses("PESTIDE", &many, None, MassType::Monoisotopic).unwrap();
        assert_eq!(potential.len(), 3);
    }

    #[test]
    fn ion_losses_follow_cleavage() {
        let mods = pep_mods(vec![phospho()], 2);
        let potential = calc_potential_losses("PESTIDE", &mods, None, MassType::Monoisotopic);
        let potential = potential.as_ref();

        // Cleaving between S and T leaves one phosphorylation on either side
        assert_masses(loss_masses(IonType::B, 2, potential), &[0.0, H3PO4]);
        assert_masses(loss_masses(IonType::Y, 2, potential), &[0.0, H3PO4]);
        // Before the S, every loss stays with the y ion
        assert_masses(loss_masses(IonType::B, 1, potential), &[0.0]);
        assert_masses(loss_masses(IonType::Y, 1, potential), &[0.0, H3PO4, 2.0 * H3PO4]);
        assert_masses(loss_masses(IonType::Precursor, 0, potential), &[0.0, H3PO4, 2.0 * H3PO4]);
        assert_masses(loss_masses(IonType::Y, 5, potential), &[0.0]);
    }

    #[test]
    fn explicit_static_mods_replace_implicit_losses() {
        let mods = pep_mods(vec![phospho()], 2);
        let explicit_phospho = ExplicitMod::new(3, phospho_variable());
        let explicit = |is_variable| {
            ExplicitMods::new("PESTIDE", Some(vec![explicit_phospho.clone()]), Vec::new(), is_variable).unwrap()
        };

        let replaced = calc_potential_losses("PESTIDE", &mods, Some(&explicit(false)), MassType::Monoisotopic);
        assert_eq!(residues(&replaced.unwrap()), [vec![3]]);

        // Variable modifications are applied on top of the implicit ones, and the losses at T are stacked
        let stacked = calc_potential_losses("PESTIDE", &mods, Some(&explicit(true)), MassType::Monoisotopic).unwrap();
        assert_eq!(residues(&stacked), [vec![2], vec![3], vec![3], vec![2, 3], vec![2, 3]]);
        assert_masses(loss_masses(IonType::Precursor, 0, Some(&stacked)), &[0.0, H3PO4, 2.0 * H3PO4]);

        // Heavy modifications alone don't touch the structural modifications
        let heavy_only = ExplicitMods::new(
            "PESTIDE",
            None,
            vec![TypedExplicitMods::new(IsotopeLabelType::heavy(), Vec::new())],
            false,
        )
        .unwrap();
        let implicit = calc_potential_losses("PESTIDE", &mods, Some(&heavy_only), MassType::Monoisotopic).unwrap();
        assert_eq!(residues(&implicit), [vec![2], vec![3], vec![2, 3]]);
    }
}
