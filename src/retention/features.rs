#![allow(clippy::cast_precision_loss)]
//! Feature derivation.
//!
//! Every split of a decision tree reads exactly one [`Feature`]. Most features are raw
//! fields of [`ClauseStats`] or [`ReduceContext`]; three are derived from them:
//!
//! - `rdb_rel_used_for_uip_creation`: `1.0` if the clause was used for UIP creation more
//!   often than at the previous reduction pass, `0.0` otherwise.
//! - `rdb0_avg_confl`: `sum_uip1_used / sum_delta_confl_uip1_used`.
//! - `rdb0_used_per_confl`: `sum_uip1_used / (sum_conflicts - introduced_at_conflict)`.
//!
//! Both ratios are `0.0` when their denominator is zero.
//!
//! A [`FeatureVector`] holds the value of every feature for one clause. It lives on the
//! stack and is computed once per classification, before any tree is walked.

use crate::retention::stats::{ClauseStats, ReduceContext};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Index;

/// An input that a tree split can compare against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Feature {
    /// `ClauseStats::size`.
    Size,
    /// `ClauseStats::glue`.
    Glue,
    /// `ClauseStats::glue_rel_long`.
    GlueRelLong,
    /// `ClauseStats::glue_rel_queue`.
    GlueRelQueue,
    /// `ClauseStats::size_rel`.
    SizeRel,
    /// `ClauseStats::num_antecedents_rel`.
    NumAntecedentsRel,
    /// `ClauseStats::antec_num_total_lits_rel`.
    AntecNumTotalLitsRel,
    /// `ClauseStats::num_total_lits_antecedents`.
    NumTotalLitsAntecedents,
    /// `ClauseStats::antecedents_glue_long_reds_var`.
    AntecedentsGlueLongRedsVar,
    /// `ClauseStats::num_overlap_literals`.
    NumOverlapLiterals,
    /// `ClauseStats::num_overlap_literals_rel`.
    NumOverlapLiteralsRel,
    /// `ClauseStats::used_for_uip_creation`.
    UsedForUipCreation,
    /// `ClauseStats::rdb1_used_for_uip_creation`.
    Rdb1UsedForUipCreation,
    /// `ClauseStats::sum_uip1_used`.
    SumUip1Used,
    /// `ClauseStats::sum_delta_confl_uip1_used`.
    SumDeltaConflUip1Used,
    /// `ClauseStats::dump_number`.
    DumpNumber,
    /// `ClauseStats::rdb1_last_touched_diff`.
    Rdb1LastTouchedDiff,
    /// `ClauseStats::rdb1_act_ranking_top_10`.
    #[serde(rename = "rdb1_act_ranking_top_10")]
    Rdb1ActRankingTop10,
    /// `ReduceContext::rdb0_last_touched_diff`.
    Rdb0LastTouchedDiff,
    /// `ReduceContext::rdb0_act_ranking`.
    Rdb0ActRanking,
    /// `ReduceContext::rdb0_act_ranking_top_10`.
    #[serde(rename = "rdb0_act_ranking_top_10")]
    Rdb0ActRankingTop10,
    /// Whether UIP usage grew since the previous pass.
    RdbRelUsedForUipCreation,
    /// Average conflicts between 1st UIP uses.
    Rdb0AvgConfl,
    /// 1st UIP uses per conflict spent in the solver.
    Rdb0UsedPerConfl,
}

impl Feature {
    /// Number of features.
    pub const COUNT: usize = 24;

    /// Every feature, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Size,
        Self::Glue,
        Self::GlueRelLong,
        Self::GlueRelQueue,
        Self::SizeRel,
        Self::NumAntecedentsRel,
        Self::AntecNumTotalLitsRel,
        Self::NumTotalLitsAntecedents,
        Self::AntecedentsGlueLongRedsVar,
        Self::NumOverlapLiterals,
        Self::NumOverlapLiteralsRel,
        Self::UsedForUipCreation,
        Self::Rdb1UsedForUipCreation,
        Self::SumUip1Used,
        Self::SumDeltaConflUip1Used,
        Self::DumpNumber,
        Self::Rdb1LastTouchedDiff,
        Self::Rdb1ActRankingTop10,
        Self::Rdb0LastTouchedDiff,
        Self::Rdb0ActRanking,
        Self::Rdb0ActRankingTop10,
        Self::RdbRelUsedForUipCreation,
        Self::Rdb0AvgConfl,
        Self::Rdb0UsedPerConfl,
    ];

    /// Position of the feature inside a [`FeatureVector`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the value is computed rather than read from a field.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(
            self,
            Self::RdbRelUsedForUipCreation | Self::Rdb0AvgConfl | Self::Rdb0UsedPerConfl
        )
    }

    /// The name used in model files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Glue => "glue",
            Self::GlueRelLong => "glue_rel_long",
            Self::GlueRelQueue => "glue_rel_queue",
            Self::SizeRel => "size_rel",
            Self::NumAntecedentsRel => "num_antecedents_rel",
            Self::AntecNumTotalLitsRel => "antec_num_total_lits_rel",
            Self::NumTotalLitsAntecedents => "num_total_lits_antecedents",
            Self::AntecedentsGlueLongRedsVar => "antecedents_glue_long_reds_var",
            Self::NumOverlapLiterals => "num_overlap_literals",
            Self::NumOverlapLiteralsRel => "num_overlap_literals_rel",
            Self::UsedForUipCreation => "used_for_uip_creation",
            Self::Rdb1UsedForUipCreation => "rdb1_used_for_uip_creation",
            Self::SumUip1Used => "sum_uip1_used",
            Self::SumDeltaConflUip1Used => "sum_delta_confl_uip1_used",
            Self::DumpNumber => "dump_number",
            Self::Rdb1LastTouchedDiff => "rdb1_last_touched_diff",
            Self::Rdb1ActRankingTop10 => "rdb1_act_ranking_top_10",
            Self::Rdb0LastTouchedDiff => "rdb0_last_touched_diff",
            Self::Rdb0ActRanking => "rdb0_act_ranking",
            Self::Rdb0ActRankingTop10 => "rdb0_act_ranking_top_10",
            Self::RdbRelUsedForUipCreation => "rdb_rel_used_for_uip_creation",
            Self::Rdb0AvgConfl => "rdb0_avg_confl",
            Self::Rdb0UsedPerConfl => "rdb0_used_per_confl",
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Divides, yielding `0.0` for a zero denominator.
fn ratio_or_zero(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// The value of every [`Feature`] for one clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; Feature::COUNT],
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: [0.0; Feature::COUNT],
        }
    }
}

impl FeatureVector {
    /// Computes all features of a clause for the current reduction pass.
    #[must_use]
    pub fn derive(stats: &ClauseStats, context: &ReduceContext) -> Self {
        let mut values = [0.0; Feature::COUNT];
        let mut put = |feature: Feature, value: f64| values[feature.index()] = value;

        put(Feature::Size, f64::from(stats.size));
        put(Feature::Glue, f64::from(stats.glue));
        put(Feature::GlueRelLong, stats.glue_rel_long);
        put(Feature::GlueRelQueue, stats.glue_rel_queue);
        put(Feature::SizeRel, stats.size_rel);
        put(Feature::NumAntecedentsRel, stats.num_antecedents_rel);
        put(Feature::AntecNumTotalLitsRel, stats.antec_num_total_lits_rel);
        put(
            Feature::NumTotalLitsAntecedents,
            f64::from(stats.num_total_lits_antecedents),
        );
        put(
            Feature::AntecedentsGlueLongRedsVar,
            stats.antecedents_glue_long_reds_var,
        );
        put(
            Feature::NumOverlapLiterals,
            f64::from(stats.num_overlap_literals),
        );
        put(Feature::NumOverlapLiteralsRel, stats.num_overlap_literals_rel);
        put(
            Feature::UsedForUipCreation,
            f64::from(stats.used_for_uip_creation),
        );
        put(
            Feature::Rdb1UsedForUipCreation,
            f64::from(stats.rdb1_used_for_uip_creation),
        );
        put(Feature::SumUip1Used, stats.sum_uip1_used as f64);
        put(
            Feature::SumDeltaConflUip1Used,
            stats.sum_delta_confl_uip1_used as f64,
        );
        put(Feature::DumpNumber, f64::from(stats.dump_number));
        put(
            Feature::Rdb1LastTouchedDiff,
            f64::from(stats.rdb1_last_touched_diff),
        );
        put(
            Feature::Rdb1ActRankingTop10,
            f64::from(stats.rdb1_act_ranking_top_10),
        );

        put(
            Feature::Rdb0LastTouchedDiff,
            f64::from(context.rdb0_last_touched_diff),
        );
        put(Feature::Rdb0ActRanking, f64::from(context.rdb0_act_ranking));
        put(
            Feature::Rdb0ActRankingTop10,
            f64::from(context.rdb0_act_ranking_top_10),
        );

        let used_more = stats.used_for_uip_creation > stats.rdb1_used_for_uip_creation;
        put(
            Feature::RdbRelUsedForUipCreation,
            if used_more { 1.0 } else { 0.0 },
        );
        put(
            Feature::Rdb0AvgConfl,
            ratio_or_zero(stats.sum_uip1_used, stats.sum_delta_confl_uip1_used),
        );
        put(
            Feature::Rdb0UsedPerConfl,
            ratio_or_zero(
                stats.sum_uip1_used,
                stats.time_inside_solver(context.sum_conflicts),
            ),
        );

        Self { values }
    }

    /// Value of a single feature.
    #[must_use]
    pub const fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Overrides a single feature, used to probe trees directly.
    pub const fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = value;
    }

    /// Returns a copy with one feature replaced.
    #[must_use]
    pub const fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, value);
        self
    }

    /// Iterates `(feature, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(|&feature| (feature, self.get(feature)))
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &Self::Output {
        &self.values[feature.index()]
    }
}
