//! K-fold partitioning.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::ValidationError;

/// One train/test split of row positions. Both lists are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K-fold partitioner.
///
/// Rows are (optionally) shuffled and cut into `n_splits` contiguous test
/// blocks; the first `n % n_splits` blocks hold one extra row. Every row
/// appears in exactly one test block.
///
/// # Example
///
/// ```
/// use cacao::validation::KFold;
///
/// let folds = KFold::new(3, 0).split(7).unwrap();
/// let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
/// assert_eq!(sizes, vec![3, 2, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl KFold {
    /// Shuffled k-fold seeded by `seed`.
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed,
        }
    }

    /// Unshuffled k-fold: test blocks are contiguous row ranges.
    pub fn sequential(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            seed: 0,
        }
    }

    #[inline]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Partition `n_samples` rows using a generator seeded from `seed`.
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>, ValidationError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        self.split_with_rng(n_samples, &mut rng)
    }

    /// Partition `n_samples` rows drawing the shuffle from `rng`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidFolds`] if `n_splits < 2` or
    /// `n_splits > n_samples`.
    pub fn split_with_rng<R: Rng + ?Sized>(
        &self,
        n_samples: usize,
        rng: &mut R,
    ) -> Result<Vec<Fold>, ValidationError> {
        if self.n_splits < 2 || self.n_splits > n_samples {
            return Err(ValidationError::InvalidFolds {
                n_splits: self.n_splits,
                n_samples,
            });
        }

        let mut order: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            order.shuffle(rng);
        }

        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for k in 0..self.n_splits {
            let size = base + usize::from(k < extra);
            let mut test = order[start..start + size].to_vec();
            test.sort_unstable();
            let mut train: Vec<usize> = order[..start]
                .iter()
                .chain(&order[start + size..])
                .copied()
                .collect();
            train.sort_unstable();
            folds.push(Fold { train, test });
            start += size;
        }
        Ok(folds)
    }
}

/// Size of the smallest training split `KFold` produces for `n_samples`.
pub(crate) fn min_train_size(n_samples: usize, n_splits: usize) -> usize {
    n_samples - n_samples.div_ceil(n_splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 5)]
    #[case(11, 3)]
    #[case(100, 4)]
    #[case(5, 5)]
    fn folds_partition_rows(#[case] n: usize, #[case] k: usize) {
        let folds = KFold::new(k, 3).split(n).unwrap();
        assert_eq!(folds.len(), k);

        let mut seen = vec![0usize; n];
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), n);
            assert!(fold.test.windows(2).all(|w| w[0] < w[1]));
            assert!(fold.train.windows(2).all(|w| w[0] < w[1]));
            for &i in &fold.test {
                seen[i] += 1;
                assert!(fold.train.binary_search(&i).is_err());
            }
        }
        assert!(seen.iter().all(|&c| c == 1));

        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
        assert!(sizes[0] - sizes[k - 1] <= 1);
    }

    #[test]
    fn same_seed_same_folds() {
        assert_eq!(KFold::new(4, 9).split(50).unwrap(), KFold::new(4, 9).split(50).unwrap());
        assert_ne!(KFold::new(4, 9).split(50).unwrap(), KFold::new(4, 10).split(50).unwrap());
    }

    #[test]
    fn sequential_blocks() {
        let folds = KFold::sequential(2).split(5).unwrap();
        assert_eq!(folds[0].test, vec![0, 1, 2]);
        assert_eq!(folds[1].test, vec![3, 4]);
    }

    #[rstest]
    #[case(1, 10)]
    #[case(11, 10)]
    #[case(2, 0)]
    fn rejects_bad_fold_counts(#[case] k: usize, #[case] n: usize) {
        assert_eq!(
            KFold::new(k, 0).split(n),
            Err(ValidationError::InvalidFolds { n_splits: k, n_samples: n })
        );
    }

    #[test]
    fn min_train_size_matches_largest_test_fold() {
        assert_eq!(min_train_size(10, 3), 6);
        assert_eq!(min_train_size(9, 3), 6);
        assert_eq!(min_train_size(100, 4), 75);
    }
}
