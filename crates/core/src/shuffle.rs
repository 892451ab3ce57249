//! Fisher–Yates shuffling that remembers where every element came from.

use rand::Rng;

/// A permutation of an input sequence plus the map back to input positions.
///
/// `original_indices[k]` is the input index of the element now at `shuffled[k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleResult<T> {
    pub shuffled: Vec<T>,
    pub original_indices: Vec<usize>,
}

impl<T> ShuffleResult<T> {
    /// Input index of the element at `position`, if in range.
    #[must_use]
    pub fn original_index(&self, position: usize) -> Option<usize> {
        self.original_indices.get(position).copied()
    }

    /// Position in `shuffled` of the element that was at `original` in the input.
    #[must_use]
    pub fn position_of(&self, original: usize) -> Option<usize> {
        self.original_indices.iter().position(|&i| i == original)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shuffled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shuffled.is_empty()
    }
}

/// Shuffle a slice into a new vector, tracking original positions.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> ShuffleResult<T> {
    shuffle_vec(items.to_vec(), rng)
}

/// Shuffle an owned vector in place, tracking original positions.
///
/// Walks `i` from the last index down to 1, swapping with a uniform `j` in
/// `[0, i]`; every permutation is equally likely for an unbiased `rng`.
pub fn shuffle_vec<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> ShuffleResult<T> {
    let mut original_indices: Vec<usize> = (0..items.len()).collect();

    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
        original_indices.swap(i, j);
    }

    ShuffleResult {
        shuffled: items,
        original_indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn empty_input_yields_empty_outputs() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = shuffle::<u8, _>(&[], &mut rng);
        assert!(result.is_empty());
        assert!(result.original_indices.is_empty());
    }

    #[test]
    fn single_element_is_unchanged() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = shuffle(&["only"], &mut rng);
        assert_eq!(result.shuffled, vec!["only"]);
        assert_eq!(result.original_indices, vec![0]);
    }

    #[test]
    fn output_is_a_permutation_with_consistent_index_map() {
        let input: Vec<String> = (0..25).map(|i| format!("item-{i}")).collect();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = shuffle(&input, &mut rng);

            let mut indices = result.original_indices.clone();
            indices.sort_unstable();
            assert_eq!(indices, (0..input.len()).collect::<Vec<_>>());

            for (position, &original) in result.original_indices.iter().enumerate() {
                assert_eq!(result.shuffled[position], input[original]);
                assert_eq!(result.position_of(original), Some(position));
            }
        }
    }

    #[test]
    fn duplicate_values_are_preserved() {
        let input = vec![1, 1, 2, 2, 2, 3];
        let mut rng = StdRng::seed_from_u64(9);
        let mut shuffled = shuffle(&input, &mut rng).shuffled;
        shuffled.sort_unstable();
        assert_eq!(shuffled, input);
    }

    #[test]
    fn permutations_are_roughly_uniform() {
        let input = [0_u8, 1, 2];
        let trials = 6_000;
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();

        for _ in 0..trials {
            let result = shuffle(&input, &mut rng);
            *counts.entry(result.shuffled).or_default() += 1;
        }

        // 3! = 6 permutations, 1000 expected each.
        assert_eq!(counts.len(), 6);
        for (perm, count) in &counts {
            assert!(
                (800..=1200).contains(count),
                "permutation {perm:?} seen {count} times"
            );
        }
    }

    #[test]
    fn index_lookup_out_of_range_is_none() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = shuffle(&['a', 'b'], &mut rng);
        assert_eq!(result.original_index(2), None);
        assert_eq!(result.position_of(7), None);
    }
}
