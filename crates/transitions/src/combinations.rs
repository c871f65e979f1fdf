// Standard Library Imports
use std::marker::PhantomData;

// Public API ==========================================================================================================

/// Lazily enumerates every way of picking exactly `count` candidates from a list of residue groups, with at most one
/// candidate from each group. Each group pairs the candidates available at one residue with that residue's index,
/// and groups must be given in ascending residue order, which every combination then preserves.
///
/// Picked candidates are bound to their residue index by `bind`, then collected into a `C`, like a `Vec`.
/// The iterator is `Clone`, so an unstarted copy can be kept around to restart the enumeration
pub struct LossCombinations<'g, S, F, C> {
    groups: Vec<(&'g [S], usize)>,
    bind: F,
    chosen: Vec<usize>,
    picks: Vec<usize>,
    done: bool,
    collection: PhantomData<fn() -> C>,
}

impl<'g, S, B, F, C> LossCombinations<'g, S, F, C>
where
    F: FnMut(usize, &'g S) -> B,
    C: FromIterator<B>,
{
    pub fn new(count: usize, groups: &'g [(Vec<S>, usize)], bind: F) -> Self {
        // NOTE: A residue without candidates can't contribute to any combination
        let groups: Vec<_> = groups
            .iter()
            .filter(|(candidates, _)| !candidates.is_empty())
            .map(|(candidates, index)| (candidates.as_slice(), *index))
            .collect();
        let done = count == 0 || count > groups.len();
        Self {
            groups,
            bind,
            chosen: (0..count).collect(),
            picks: vec![0; count],
            done,
            collection: PhantomData,
        }
    }

    /// The number of residue groups with at least one candidate
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl<'g, S, B, F, C> Iterator for LossCombinations<'g, S, F, C>
where
    F: FnMut(usize, &'g S) -> B,
    C: FromIterator<B>,
{
    type Item = C;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Self {
            groups,
            bind,
            chosen,
            picks,
            ..
        } = self;
        let combination = chosen
            .iter()
            .zip(picks.iter())
            .map(|(&group, &pick)| {
                let (candidates, index) = groups[group];
                bind(index, &candidates[pick])
            })
            .collect();

        self.done = !self.advance();
        Some(combination)
    }
}

impl<S, F: Clone, C> Clone for LossCombinations<'_, S, F, C> {
    fn clone(&self) -> Self {
        Self {
            groups: self.groups.clone(),
            bind: self.bind.clone(),
            chosen: self.chosen.clone(),
            picks: self.picks.clone(),
            done: self.done,
            collection: PhantomData,
        }
    }
}

// Private Helper Methods ==============================================================================================

impl<S, F, C> LossCombinations<'_, S, F, C> {
    /// Steps to the next combination, returning `false` once every combination has been produced. Candidates within
    /// the chosen groups are stepped through like the digits of an odometer, then the next set of groups is chosen
    fn advance(&mut self) -> bool {
        for position in (0..self.picks.len()).rev() {
            let group_len = self.groups[self.chosen[position]].0.len();
            self.picks[position] += 1;
            if self.picks[position] < group_len {
                return true;
            }
            self.picks[position] = 0;
        }

        let (count, group_count) = (self.chosen.len(), self.groups.len());
        let Some(position) = (0..count).rev().find(|&i| self.chosen[i] < group_count - count + i) else {
            return false;
        };
        self.chosen[position] += 1;
        for i in position + 1..count {
            self.chosen[i] = self.chosen[i - 1] + 1;
        }
        true
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    type Pick = (usize, char);

    fn combinations(count: usize, groups: &[(Vec<char>, usize)]) -> Vec<Vec<Pick>> {
        LossCombinations::new(count, groups, |index, &loss| (index, loss)).collect()
    }

    fn binomial(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    #[test]
    fn single_candidate_groups() {
        let groups: Vec<_> = [1, 4, 6, 9].into_iter().map(|i| (vec!['p'], i)).collect();
        for count in 1..=4 {
            let found = combinations(count, &groups);
            assert_eq!(found.len(), binomial(4, count));
            // No residue is used twice, and residues stay in ascending order
            for combination in &found {
                assert!(combination.iter().tuple_windows().all(|((a, _), (b, _))| a < b));
            }
            assert!(found.iter().all_unique());
        }
        assert_eq!(
            combinations(2, &groups[..3]),
            [
                vec![(1, 'p'), (4, 'p')],
                vec![(1, 'p'), (6, 'p')],
                vec![(4, 'p'), (6, 'p')],
            ]
        );
    }

    #[test]
    fn stacked_candidate_groups() {
        let groups = [(vec!['a', 'b'], 2), (vec!['c'], 5), (vec!['d', 'e'], 7)];
        let singles = combinations(1, &groups);
        assert_eq!(
            singles,
            [vec![(2, 'a')], vec![(2, 'b')], vec![(5, 'c')], vec![(7, 'd')], vec![(7, 'e')]]
        );
        let pairs = combinations(2, &groups);
        // 2·1 + 2·2 + 1·2 ways to pick from two distinct residues
        assert_eq!(pairs.len(), 8);
        assert_eq!(pairs[0], [(2, 'a'), (5, 'c')]);
        assert_eq!(pairs[1], [(2, 'b'), (5, 'c')]);
        assert!(pairs.iter().all(|pair| pair[0].0 != pair[1].0));
        assert_eq!(combinations(3, &groups).len(), 4);
    }

    #[test]
    fn degenerate_counts() {
        let groups = [(vec!['a'], 0), (Vec::new(), 1), (vec!['b'], 2)];
        assert!(combinations(0, &groups).is_empty());
        // The empty group doesn't count towards the number of groups
        assert!(combinations(3, &groups).is_empty());
        assert_eq!(combinations(2, &groups), [vec![(0, 'a'), (2, 'b')]]);
        assert!(combinations(1, &[]).is_empty());
    }

    #[test]
    fn restartable_enumeration() {
        let groups = [(vec!['a', 'b'], 0), (vec!['c'], 3), (vec!['d'], 4)];
        let fresh: LossCombinations<_, _, Vec<Pick>> =
            LossCombinations::new(2, &groups, |index, &loss| (index, loss));
        assert_eq!(fresh.group_count(), 3);
        let mut started = fresh.clone();
        started.next();
        let all: Vec<_> = fresh.clone().collect();
        assert_eq!(all.len(), 5);
        assert_eq!(started.count(), 4);
        assert_eq!(fresh.collect::<Vec<_>>(), all);
    }

    #[test]
    fn custom_collections() {
        let groups = [(vec![1.5, 2.5], 0), (vec![4.0], 1)];
        let totals: Vec<f64> = LossCombinations::new(2, &groups, |_, &mass: &f64| mass)
            .map(|masses: Vec<f64>| masses.iter().sum())
            .collect();
        assert_eq!(totals, [5.5, 6.5]);
        let strings: Vec<String> = LossCombinations::new(1, &groups, |index, mass| format!("{index}:{mass}")).collect();
        assert_eq!(strings, ["0:1.5", "0:2.5", "1:4"]);
    }
}
