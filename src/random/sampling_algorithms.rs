//! Uniform random sampling without replacement from iterators of known length.

use rand::seq::index::sample as choose_range;
use rand::Rng;

/// Sample multiple random elements uniformly without replacement from a container of known length.
/// If more samples are requested than are in the container, every element is returned.
///
/// We do not assume the container is randomly indexable, only that it can be iterated over.
/// Selected elements are yielded in their original iteration order.
pub fn sample_multiple_from_known_length<I, R, T>(rng: &mut R, iter: I, requested: usize) -> Vec<T>
where
    R: Rng,
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
{
    let iter = iter.into_iter();
    let len = iter.len();
    let requested = requested.min(len);
    if requested == 0 {
        return Vec::new();
    }

    let mut indexes = Vec::with_capacity(requested);
    indexes.extend(choose_range(rng, len, requested));
    indexes.sort_unstable();
    let mut index_iterator = indexes.into_iter();
    let mut next_idx = index_iterator.next();
    let mut selected = Vec::with_capacity(requested);

    for (idx, item) in iter.enumerate() {
        if Some(idx) == next_idx {
            selected.push(item);
            next_idx = index_iterator.next();
            if next_idx.is_none() {
                break;
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::HashSet;

    #[test]
    fn test_sample_multiple_basic() {
        let data: Vec<u32> = (0..1000).collect();
        let requested = 100;
        let mut rng = StdRng::seed_from_u64(42);
        let sample = sample_multiple_from_known_length(&mut rng, data.iter(), requested);

        // Correct sample size
        assert_eq!(sample.len(), requested);

        // All sampled values are within the valid range
        assert!(sample.iter().all(|v| **v < 1000));

        // The sample should not have duplicates
        let unique: HashSet<_> = sample.iter().collect();
        assert_eq!(unique.len(), sample.len());

        // Original order is preserved
        assert!(sample.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_sample_more_than_available() {
        let data = ["a", "b", "c"];
        let mut rng = StdRng::seed_from_u64(1);
        let sample = sample_multiple_from_known_length(&mut rng, data.iter().copied(), 10);
        assert_eq!(sample, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sample_none_requested() {
        let data = [1, 2, 3];
        let mut rng = StdRng::seed_from_u64(1);
        let sample = sample_multiple_from_known_length(&mut rng, data.iter(), 0);
        assert!(sample.is_empty());

        let empty: Vec<u8> = Vec::new();
        let sample = sample_multiple_from_known_length(&mut rng, empty.iter(), 3);
        assert!(sample.is_empty());
    }

    // Every element should be picked about equally often over many draws.
    #[test]
    fn test_sample_is_roughly_uniform() {
        let data: Vec<usize> = (0..10).collect();
        let mut counts = [0usize; 10];
        let mut rng = StdRng::seed_from_u64(2024);
        let runs = 10_000;
        for _ in 0..runs {
            for v in sample_multiple_from_known_length(&mut rng, data.iter().copied(), 3) {
                counts[v] += 1;
            }
        }
        // Expected 3000 per element.
        for count in counts {
            assert!((2700..3300).contains(&count), "count {count} out of range");
        }
    }
}
