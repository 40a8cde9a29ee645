//! Per-clause usage statistics and the per-pass scalars the classifier reads.
//!
//! `ClauseStats` is owned by a learnt clause. It is created when the clause is learnt,
//! updated by the solver on every conflict that touches the clause, and only ever read
//! here. `ReduceContext` carries the values that the reduction pass computes for the
//! current pass (the `rdb0_*` values) together with the solver-wide conflict counter.
//!
//! The classifier never validates its inputs. Callers that receive statistics from an
//! untrusted source can use [`ClauseStats::check`] to defend at the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Usage statistics of a single learnt clause.
///
/// Fields with a `_rel` suffix are ratios against a reference population and are not
/// bounded to `[0, 1]`. Fields with an `rdb1_` prefix hold the value as of the previous
/// reduction pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseStats {
    /// Number of literals in the clause.
    pub size: u32,
    /// Literal block distance of the clause.
    pub glue: u32,
    /// Glue relative to the long-term glue average.
    pub glue_rel_long: f64,
    /// Glue relative to the recent glue queue.
    pub glue_rel_queue: f64,
    /// Size relative to the average learnt clause size.
    pub size_rel: f64,

    /// Number of antecedents relative to the average.
    pub num_antecedents_rel: f64,
    /// Total literals of all antecedents relative to the average.
    pub antec_num_total_lits_rel: f64,
    /// Total literals of all antecedents.
    pub num_total_lits_antecedents: u32,
    /// Variance of the glue of long redundant antecedents.
    pub antecedents_glue_long_reds_var: f64,
    /// Literals shared between the antecedents.
    pub num_overlap_literals: u32,
    /// `num_overlap_literals` relative to the average.
    pub num_overlap_literals_rel: f64,

    /// Times the clause took part in deriving a 1st UIP clause.
    pub used_for_uip_creation: u32,
    /// `used_for_uip_creation` as of the previous reduction pass.
    pub rdb1_used_for_uip_creation: u32,
    /// Sum of 1st UIP uses over the clause's lifetime.
    pub sum_uip1_used: u64,
    /// Sum of conflict deltas between consecutive 1st UIP uses.
    pub sum_delta_confl_uip1_used: u64,
    /// Conflict index at which the clause was learnt.
    pub introduced_at_conflict: u64,
    /// Number of reduction passes that have inspected the clause.
    pub dump_number: u32,
    /// Conflicts since last touched, as of the previous reduction pass.
    pub rdb1_last_touched_diff: u32,
    /// Activity top-10 ranking, as of the previous reduction pass.
    pub rdb1_act_ranking_top_10: u32,
}

/// Scalars computed by the reduction pass and passed in with every classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceContext {
    /// Solver-wide conflict counter.
    pub sum_conflicts: u64,
    /// Conflicts since the clause was last touched, for the current pass.
    pub rdb0_last_touched_diff: u32,
    /// Activity ranking of the clause in the current pass.
    pub rdb0_act_ranking: u32,
    /// Activity top-10 ranking of the clause in the current pass.
    pub rdb0_act_ranking_top_10: u32,
}

impl ReduceContext {
    /// Bundles the call-scoped scalars of one classification.
    #[must_use]
    pub const fn new(
        sum_conflicts: u64,
        rdb0_last_touched_diff: u32,
        rdb0_act_ranking: u32,
        rdb0_act_ranking_top_10: u32,
    ) -> Self {
        Self {
            sum_conflicts,
            rdb0_last_touched_diff,
            rdb0_act_ranking,
            rdb0_act_ranking_top_10,
        }
    }
}

/// A violated invariant of a statistics record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// The clause claims to have been learnt after the current conflict.
    #[error("clause introduced at conflict {introduced} but only {sum_conflicts} conflicts happened")]
    IntroducedInFuture {
        /// `introduced_at_conflict` of the record.
        introduced: u64,
        /// `sum_conflicts` of the context.
        sum_conflicts: u64,
    },
    /// A ratio field is NaN or infinite.
    #[error("ratio `{field}` is not finite ({value})")]
    NonFiniteRatio {
        /// Name of the offending field.
        field: &'static str,
        /// The value found.
        value: f64,
    },
    /// A ratio field is negative.
    #[error("ratio `{field}` is negative ({value})")]
    NegativeRatio {
        /// Name of the offending field.
        field: &'static str,
        /// The value found.
        value: f64,
    },
}

impl ClauseStats {
    /// The ratio fields together with their names.
    fn ratios(&self) -> [(&'static str, f64); 7] {
        [
            ("glue_rel_long", self.glue_rel_long),
            ("glue_rel_queue", self.glue_rel_queue),
            ("size_rel", self.size_rel),
            ("num_antecedents_rel", self.num_antecedents_rel),
            ("antec_num_total_lits_rel", self.antec_num_total_lits_rel),
            (
                "antecedents_glue_long_reds_var",
                self.antecedents_glue_long_reds_var,
            ),
            ("num_overlap_literals_rel", self.num_overlap_literals_rel),
        ]
    }

    /// Checks the invariants the classifier relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: a clause introduced after
    /// `context.sum_conflicts`, or a ratio field that is NaN, infinite or negative.
    pub fn check(&self, context: &ReduceContext) -> Result<(), StatsError> {
        if self.introduced_at_conflict > context.sum_conflicts {
            return Err(StatsError::IntroducedInFuture {
                introduced: self.introduced_at_conflict,
                sum_conflicts: context.sum_conflicts,
            });
        }

        for (field, value) in self.ratios() {
            if !value.is_finite() {
                return Err(StatsError::NonFiniteRatio { field, value });
            }
            if value < 0.0 {
                return Err(StatsError::NegativeRatio { field, value });
            }
        }

        Ok(())
    }

    /// Conflicts the clause has spent in the database.
    #[must_use]
    pub const fn time_inside_solver(&self, sum_conflicts: u64) -> u64 {
        sum_conflicts.saturating_sub(self.introduced_at_conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_valid() {
        let stats = ClauseStats::default();
        assert_eq!(stats.check(&ReduceContext::default()), Ok(()));
    }

    #[test]
    fn test_check_rejects_future_clause() {
        let stats = ClauseStats {
            introduced_at_conflict: 120,
            ..ClauseStats::default()
        };
        let context = ReduceContext::new(100, 0, 0, 0);
        assert_eq!(
            stats.check(&context),
            Err(StatsError::IntroducedInFuture {
                introduced: 120,
                sum_conflicts: 100
            })
        );
    }

    #[test]
    fn test_check_rejects_bad_ratios() {
        let context = ReduceContext::new(10, 0, 0, 0);

        let nan = ClauseStats {
            glue_rel_queue: f64::NAN,
            ..ClauseStats::default()
        };
        assert!(matches!(
            nan.check(&context),
            Err(StatsError::NonFiniteRatio {
                field: "glue_rel_queue",
                ..
            })
        ));

        let negative = ClauseStats {
            size_rel: -0.5,
            ..ClauseStats::default()
        };
        assert_eq!(
            negative.check(&context),
            Err(StatsError::NegativeRatio {
                field: "size_rel",
                value: -0.5
            })
        );
    }

    #[test]
    fn test_ratios_above_one_are_allowed() {
        let stats = ClauseStats {
            glue_rel_long: 3.75,
            num_overlap_literals_rel: 12.0,
            ..ClauseStats::default()
        };
        assert!(stats.check(&ReduceContext::new(1, 0, 0, 0)).is_ok());
    }

    #[test]
    fn test_time_inside_solver() {
        let stats = ClauseStats {
            introduced_at_conflict: 40,
            ..ClauseStats::default()
        };
        assert_eq!(stats.time_inside_solver(100), 60);
        assert_eq!(stats.time_inside_solver(40), 0);
    }
}
