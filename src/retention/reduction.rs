//! Classifying every candidate clause of one reduction pass.
//!
//! The pass hands over a slice of records and gets back one keep bit per record, in
//! input order, plus a histogram of how many trees voted for each record. Records are
//! independent, so large passes are split across the rayon thread pool.

use crate::retention::ensemble::Ensemble;
use crate::retention::features::FeatureVector;
use crate::retention::records::ClauseRecord;
use crate::retention::tree::Tree;
use bit_vec::BitVec;
use rayon::prelude::*;

/// How a batch is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Spread the batch over the rayon thread pool.
    pub parallel: bool,
    /// Batches shorter than this run sequentially even when `parallel` is set.
    pub min_parallel_len: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            min_parallel_len: 1024,
        }
    }
}

impl BatchOptions {
    /// Options that always run on the thread pool.
    #[must_use]
    pub const fn parallel() -> Self {
        Self {
            parallel: true,
            min_parallel_len: 0,
        }
    }
}

/// Result of classifying one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionOutcome {
    /// Bit `i` is set when record `i` is kept.
    pub keep: BitVec,
    /// Entry `v` counts the records that received exactly `v` keep votes.
    pub vote_histogram: Vec<usize>,
}

impl ReductionOutcome {
    /// Number of records kept.
    #[must_use]
    pub fn kept(&self) -> usize {
        self.keep.iter().filter(|&bit| bit).count()
    }

    /// Number of records discarded.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.len() - self.kept()
    }

    /// Number of records classified.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keep.len()
    }

    /// Whether the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keep.is_empty()
    }

    /// Indices of the kept records, ascending.
    pub fn kept_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.keep
            .iter()
            .enumerate()
            .filter_map(|(index, bit)| bit.then_some(index))
    }
}

fn votes_of<T: Tree>(ensemble: &Ensemble<T>, record: &ClauseRecord) -> usize {
    ensemble.vote_count(&FeatureVector::derive(&record.stats, &record.context))
}

/// Classifies every record of a batch.
///
/// The outcome is identical whether or not the batch runs in parallel.
#[must_use]
pub fn classify_batch<T: Tree + Sync>(
    ensemble: &Ensemble<T>,
    records: &[ClauseRecord],
    options: &BatchOptions,
) -> ReductionOutcome {
    let votes: Vec<usize> = if options.parallel && records.len() >= options.min_parallel_len {
        records
            .par_iter()
            .map(|record| votes_of(ensemble, record))
            .collect()
    } else {
        records
            .iter()
            .map(|record| votes_of(ensemble, record))
            .collect()
    };

    let rule = ensemble.rule();
    let mut keep = BitVec::from_elem(records.len(), false);
    let mut vote_histogram = vec![0; ensemble.len() + 1];
    for (index, &count) in votes.iter().enumerate() {
        keep.set(index, rule.keeps(count));
        vote_histogram[count] += 1;
    }

    let outcome = ReductionOutcome {
        keep,
        vote_histogram,
    };
    log::debug!(
        "{}: kept {} of {} clauses",
        ensemble.name(),
        outcome.kept(),
        outcome.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::ensemble::tests::{scenario, stale};
    use crate::retention::records::sample_many;
    use crate::retention::stats::{ClauseStats, ReduceContext};

    fn record((stats, context): (ClauseStats, ReduceContext)) -> ClauseRecord {
        ClauseRecord { stats, context }
    }

    #[test]
    fn test_bits_follow_input_order() {
        let fresh = record(scenario());
        let old = record(stale());
        let records = [fresh, old, old, fresh];

        let outcome = classify_batch(&Ensemble::reference(), &records, &BatchOptions::default());
        assert_eq!(outcome.len(), 4);
        assert_eq!(outcome.kept(), 2);
        assert_eq!(outcome.discarded(), 2);
        assert_eq!(outcome.kept_indices().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_vote_histogram() {
        let records = [record(scenario()), record(stale()), record(scenario())];
        let outcome = classify_batch(&Ensemble::reference(), &records, &BatchOptions::default());

        assert_eq!(outcome.vote_histogram.len(), 11);
        assert_eq!(outcome.vote_histogram[10], 2);
        assert_eq!(outcome.vote_histogram[0], 1);
        assert_eq!(outcome.vote_histogram.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ensemble = Ensemble::reference();
        let records = sample_many(11, 3000, 400_000);

        let sequential = classify_batch(&ensemble, &records, &BatchOptions::default());
        let parallel = classify_batch(&ensemble, &records, &BatchOptions::parallel());
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_batch_matches_single_classification() {
        let ensemble = Ensemble::reference();
        let records = sample_many(5, 500, 80_000);
        let outcome = classify_batch(&ensemble, &records, &BatchOptions::parallel());

        for (index, record) in records.iter().enumerate() {
            assert_eq!(
                outcome.keep.get(index),
                Some(ensemble.keep(&record.stats, &record.context))
            );
        }
    }

    #[test]
    fn test_empty_batch() {
        let outcome = classify_batch(&Ensemble::reference(), &[], &BatchOptions::parallel());
        assert!(outcome.is_empty());
        assert_eq!(outcome.kept(), 0);
        assert_eq!(outcome.vote_histogram, vec![0; 11]);
    }
}
