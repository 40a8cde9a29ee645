#![deny(missing_docs)]
//! This crate decides which learnt clauses a CDCL SAT solver keeps when it reduces its
//! clause database.
//!
//! The decision is made by an ensemble of decision trees over per-clause usage
//! statistics. [`keep`] classifies one clause against the active model: the model
//! installed with [`retention::model::install`], or the compiled-in reference ensemble.

/// The `retention` module holds the feature derivation, the decision trees, the vote
/// aggregator and everything needed to load, inspect and batch-run a model.
pub mod retention;

pub use retention::ensemble::{Ensemble, Verdict, VoteRule};
pub use retention::features::{Feature, FeatureVector};
pub use retention::stats::{ClauseStats, ReduceContext};
pub use retention::tree::{DecisionTree, Node, Tree};

/// Decides whether a learnt clause survives the current reduction pass.
///
/// `sum_conflicts` is the solver-wide conflict counter. The `rdb0_*` values are computed
/// by the reduction pass for this clause. The call is pure and never fails: ratio
/// features with a zero denominator read as `0.0`.
#[must_use]
pub fn keep(
    stats: &ClauseStats,
    sum_conflicts: u64,
    rdb0_last_touched_diff: u32,
    rdb0_act_ranking: u32,
    rdb0_act_ranking_top_10: u32,
) -> bool {
    let context = ReduceContext::new(
        sum_conflicts,
        rdb0_last_touched_diff,
        rdb0_act_ranking,
        rdb0_act_ranking_top_10,
    );
    retention::model::active().keep(stats, &context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_uses_reference_model() {
        let (stats, context) = retention::ensemble::tests::scenario();
        assert!(keep(
            &stats,
            context.sum_conflicts,
            context.rdb0_last_touched_diff,
            context.rdb0_act_ranking,
            context.rdb0_act_ranking_top_10,
        ));

        let (stats, context) = retention::ensemble::tests::stale();
        assert!(!keep(
            &stats,
            context.sum_conflicts,
            context.rdb0_last_touched_diff,
            context.rdb0_act_ranking,
            context.rdb0_act_ranking_top_10,
        ));
    }

    #[test]
    fn test_zero_conflicts_does_not_fail() {
        let stats = ClauseStats {
            size: 3,
            glue: 2,
            sum_uip1_used: 4,
            ..ClauseStats::default()
        };
        let first = keep(&stats, 0, 0, 0, 0);
        assert_eq!(first, keep(&stats, 0, 0, 0, 0));
    }
}
