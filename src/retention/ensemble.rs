//! The tree ensemble and its vote aggregator.
//!
//! Each tree scores the clause independently. A tree votes to keep the clause when its
//! score is strictly below the rule's cutoff (`1.0` for the reference model). The clause
//! is kept when at least `min_votes` trees vote for it (5 of 10 for the reference model),
//! so an even split resolves toward retention.
//!
//! Classification is a pure function of its inputs. `Ensemble` holds no interior
//! mutability and can be shared by reference across threads.

use crate::retention::features::FeatureVector;
use crate::retention::model::ModelError;
use crate::retention::reference::{REFERENCE_NAME, REFERENCE_TREES};
use crate::retention::stats::{ClauseStats, ReduceContext};
use crate::retention::tree::{DecisionTree, Tree};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Turns tree scores into votes and votes into a decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoteRule {
    /// A tree votes to keep when its score is strictly below this value.
    pub cutoff: f64,
    /// Smallest number of keep votes that retains the clause.
    pub min_votes: usize,
}

impl VoteRule {
    /// Score cutoff of the reference model.
    pub const DEFAULT_CUTOFF: f64 = 1.0;

    /// Rule of the ten-tree reference model: keep when at least 5 scores are below `1.0`.
    pub const REFERENCE: Self = Self::majority(10);

    /// Keep when at least half of `trees` trees vote for it.
    #[must_use]
    pub const fn majority(trees: usize) -> Self {
        Self {
            cutoff: Self::DEFAULT_CUTOFF,
            min_votes: trees.div_ceil(2),
        }
    }

    /// Whether a tree with this score votes to keep the clause.
    #[must_use]
    pub fn votes_to_keep(&self, score: f64) -> bool {
        score < self.cutoff
    }

    /// Whether this many keep votes retain the clause.
    #[must_use]
    pub const fn keeps(&self, votes: usize) -> bool {
        votes >= self.min_votes
    }

    /// Checks the rule against an ensemble of `trees` trees.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidRule`] when the cutoff is not finite or when
    /// `min_votes` is zero or larger than the number of trees.
    pub fn validate(&self, trees: usize) -> Result<(), ModelError> {
        if !self.cutoff.is_finite() || self.min_votes == 0 || self.min_votes > trees {
            return Err(ModelError::InvalidRule {
                cutoff: self.cutoff,
                min_votes: self.min_votes,
                trees,
            });
        }
        Ok(())
    }
}

impl Default for VoteRule {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// The full outcome of one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    scores: SmallVec<[f64; 10]>,
    cutoff: f64,
    votes: usize,
    keep: bool,
}

impl Verdict {
    /// Score of every tree, in ensemble order.
    #[must_use]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// The vote of every tree, in ensemble order.
    pub fn ballots(&self) -> impl Iterator<Item = bool> + '_ {
        self.scores.iter().map(|&score| score < self.cutoff)
    }

    /// Number of trees that voted to keep the clause.
    #[must_use]
    pub const fn votes(&self) -> usize {
        self.votes
    }

    /// Whether the clause is kept.
    #[must_use]
    pub const fn keep(&self) -> bool {
        self.keep
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let decision = if self.keep { "keep" } else { "discard" };
        write!(f, "{decision} ({}/{} votes)", self.votes, self.scores.len())
    }
}

/// An ordered collection of trees voting under one [`VoteRule`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble<T = DecisionTree> {
    name: Cow<'static, str>,
    trees: Vec<T>,
    rule: VoteRule,
}

impl<T: Tree> Ensemble<T> {
    /// Builds an ensemble, checking the rule against the number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoTrees`] for an empty tree list, or
    /// [`ModelError::InvalidRule`] if the rule cannot be satisfied.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        trees: Vec<T>,
        rule: VoteRule,
    ) -> Result<Self, ModelError> {
        if trees.is_empty() {
            return Err(ModelError::NoTrees);
        }
        rule.validate(trees.len())?;

        Ok(Self {
            name: name.into(),
            trees,
            rule,
        })
    }

    /// Builds an ensemble that keeps a clause when at least half of the trees vote for it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoTrees`] for an empty tree list.
    pub fn with_majority(
        name: impl Into<Cow<'static, str>>,
        trees: Vec<T>,
    ) -> Result<Self, ModelError> {
        let rule = VoteRule::majority(trees.len());
        Self::new(name, trees, rule)
    }

    /// Name of the model.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The trees, in vote order.
    #[must_use]
    pub fn trees(&self) -> &[T] {
        &self.trees
    }

    /// The vote rule.
    #[must_use]
    pub const fn rule(&self) -> &VoteRule {
        &self.rule
    }

    /// Number of trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Always false; an ensemble holds at least one tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Number of trees whose score falls below the cutoff.
    #[must_use]
    pub fn vote_count(&self, features: &FeatureVector) -> usize {
        self.trees
            .iter()
            .filter(|tree| self.rule.votes_to_keep(tree.score(features)))
            .count()
    }

    /// Decides retention from precomputed features.
    #[must_use]
    pub fn keep_features(&self, features: &FeatureVector) -> bool {
        self.rule.keeps(self.vote_count(features))
    }

    /// Decides whether a clause survives the current reduction pass.
    #[must_use]
    pub fn keep(&self, stats: &ClauseStats, context: &ReduceContext) -> bool {
        self.keep_features(&FeatureVector::derive(stats, context))
    }

    /// Classifies precomputed features, keeping every tree's score.
    #[must_use]
    pub fn verdict_features(&self, features: &FeatureVector) -> Verdict {
        let scores: SmallVec<[f64; 10]> =
            self.trees.iter().map(|tree| tree.score(features)).collect();
        let votes = scores
            .iter()
            .filter(|&&score| self.rule.votes_to_keep(score))
            .count();
        let verdict = Verdict {
            scores,
            cutoff: self.rule.cutoff,
            votes,
            keep: self.rule.keeps(votes),
        };
        log::trace!("{}: {verdict} {:?}", self.name, verdict.scores);
        verdict
    }

    /// Classifies a clause, keeping every tree's score.
    #[must_use]
    pub fn verdict(&self, stats: &ClauseStats, context: &ReduceContext) -> Verdict {
        self.verdict_features(&FeatureVector::derive(stats, context))
    }
}

impl Ensemble<DecisionTree> {
    /// The compiled-in ten-tree model.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            name: Cow::Borrowed(REFERENCE_NAME),
            trees: REFERENCE_TREES
                .iter()
                .map(|&nodes| DecisionTree::from_static(nodes))
                .collect(),
            rule: VoteRule::REFERENCE,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::retention::features::Feature;

    /// A tree that ignores its input.
    #[derive(Debug, Clone, Copy)]
    struct Constant(f64);

    impl Tree for Constant {
        fn score(&self, _features: &FeatureVector) -> f64 {
            self.0
        }
    }

    fn constants(below: usize, above: usize) -> Ensemble<Constant> {
        let trees = std::iter::repeat_n(Constant(0.5), below)
            .chain(std::iter::repeat_n(Constant(1.5), above))
            .collect();
        Ensemble::new("constants", trees, VoteRule::REFERENCE).unwrap()
    }

    pub(crate) fn scenario() -> (ClauseStats, ReduceContext) {
        let stats = ClauseStats {
            size: 5,
            glue: 3,
            glue_rel_long: 0.5,
            glue_rel_queue: 0.5,
            size_rel: 0.4,
            num_antecedents_rel: 0.5,
            antec_num_total_lits_rel: 0.5,
            num_total_lits_antecedents: 20,
            antecedents_glue_long_reds_var: 1.0,
            num_overlap_literals: 3,
            num_overlap_literals_rel: 0.2,
            introduced_at_conflict: 900,
            dump_number: 1,
            rdb1_last_touched_diff: 50,
            rdb1_act_ranking_top_10: 1,
            ..ClauseStats::default()
        };
        (stats, ReduceContext::new(1000, 100, 1500, 1))
    }

    pub(crate) fn stale() -> (ClauseStats, ReduceContext) {
        let stats = ClauseStats {
            size: 30,
            glue: 14,
            glue_rel_long: 2.0,
            glue_rel_queue: 1.8,
            size_rel: 2.5,
            num_antecedents_rel: 1.5,
            antec_num_total_lits_rel: 1.5,
            num_total_lits_antecedents: 200,
            antecedents_glue_long_reds_var: 5.0,
            num_overlap_literals: 40,
            num_overlap_literals_rel: 1.0,
            introduced_at_conflict: 900,
            dump_number: 12,
            rdb1_last_touched_diff: 40_000,
            rdb1_act_ranking_top_10: 5,
            ..ClauseStats::default()
        };
        (stats, ReduceContext::new(100_000, 50_000, 120_000, 9))
    }

    #[test]
    fn test_all_below_cutoff_keeps() {
        let ensemble = constants(10, 0);
        let features = FeatureVector::default();
        assert_eq!(ensemble.vote_count(&features), 10);
        assert!(ensemble.keep_features(&features));
    }

    #[test]
    fn test_all_above_cutoff_discards() {
        let ensemble = constants(0, 10);
        let features = FeatureVector::default();
        assert_eq!(ensemble.vote_count(&features), 0);
        assert!(!ensemble.keep_features(&features));
    }

    #[test]
    fn test_half_the_votes_keeps() {
        let features = FeatureVector::default();
        assert!(!constants(4, 6).keep_features(&features));
        assert!(constants(5, 5).keep_features(&features));
        assert!(constants(6, 4).keep_features(&features));
    }

    #[test]
    fn test_score_equal_to_cutoff_is_not_a_vote() {
        let trees = vec![Constant(1.0); 10];
        let ensemble = Ensemble::new("ones", trees, VoteRule::REFERENCE).unwrap();
        assert_eq!(ensemble.vote_count(&FeatureVector::default()), 0);
    }

    #[test]
    fn test_majority_rule() {
        assert_eq!(VoteRule::majority(10).min_votes, 5);
        assert_eq!(VoteRule::majority(9).min_votes, 5);
        assert_eq!(VoteRule::majority(1).min_votes, 1);
        assert_eq!(VoteRule::REFERENCE.cutoff, 1.0);
        assert_eq!(VoteRule::default(), VoteRule::REFERENCE);
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let trees = vec![Constant(0.5); 3];
        let zero = VoteRule {
            cutoff: 1.0,
            min_votes: 0,
        };
        assert!(matches!(
            Ensemble::new("x", trees.clone(), zero),
            Err(ModelError::InvalidRule { .. })
        ));

        let too_many = VoteRule {
            cutoff: 1.0,
            min_votes: 4,
        };
        assert!(matches!(
            Ensemble::new("x", trees.clone(), too_many),
            Err(ModelError::InvalidRule { .. })
        ));

        let nan = VoteRule {
            cutoff: f64::NAN,
            min_votes: 2,
        };
        assert!(matches!(
            Ensemble::new("x", trees, nan),
            Err(ModelError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_empty_ensemble_is_rejected() {
        let result = Ensemble::<Constant>::with_majority("empty", Vec::new());
        assert!(matches!(result, Err(ModelError::NoTrees)));
    }

    #[test]
    fn test_reference_trees_are_well_formed() {
        let ensemble = Ensemble::reference();
        assert_eq!(ensemble.len(), 10);
        assert_eq!(ensemble.rule(), &VoteRule::REFERENCE);
        for (index, tree) in ensemble.trees().iter().enumerate() {
            assert_eq!(tree.validate(), Ok(()), "reference tree {index}");
            assert!(tree.depth() < 30, "reference tree {index} is too deep");
        }
    }

    #[test]
    fn test_reference_scenario_tree_seven() {
        let (stats, context) = scenario();
        let ensemble = Ensemble::reference();
        let features = FeatureVector::derive(&stats, &context);

        assert!(features[Feature::Rdb0LastTouchedDiff] <= 9349.5);
        assert!(features[Feature::Size] <= 8.5);
        assert!(features[Feature::Rdb1LastTouchedDiff] <= 9273.5);
        assert_eq!(ensemble.trees()[7].score(&features), 15.0 / 2235.2);
        assert_eq!(ensemble.verdict(&stats, &context).scores()[7], 15.0 / 2235.2);
    }

    #[test]
    fn test_reference_keeps_fresh_clause() {
        let (stats, context) = scenario();
        let verdict = Ensemble::reference().verdict(&stats, &context);
        assert_eq!(verdict.votes(), 10);
        assert!(verdict.keep());
        assert!(verdict.ballots().all(|ballot| ballot));
    }

    #[test]
    fn test_reference_discards_stale_clause() {
        let (stats, context) = stale();
        let ensemble = Ensemble::reference();
        let verdict = ensemble.verdict(&stats, &context);
        assert_eq!(verdict.votes(), 0);
        assert!(!verdict.keep());
        assert!(!ensemble.keep(&stats, &context));
        assert!(verdict.scores().iter().all(|&score| score > 1.0));
    }

    #[test]
    fn test_verdict_agrees_with_keep() {
        let ensemble = Ensemble::reference();
        for (stats, context) in [scenario(), stale()] {
            let verdict = ensemble.verdict(&stats, &context);
            let features = FeatureVector::derive(&stats, &context);
            assert_eq!(verdict.keep(), ensemble.keep(&stats, &context));
            assert_eq!(verdict.votes(), ensemble.vote_count(&features));
            assert_eq!(verdict.ballots().filter(|&ballot| ballot).count(), verdict.votes());
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let ensemble = Ensemble::reference();
        let (stats, context) = scenario();
        let first = ensemble.verdict(&stats, &context);
        for _ in 0..50 {
            assert_eq!(ensemble.verdict(&stats, &context), first);
        }
    }

    #[test]
    fn test_verdict_display() {
        let (stats, context) = stale();
        let verdict = Ensemble::reference().verdict(&stats, &context);
        assert_eq!(verdict.to_string(), "discard (0/10 votes)");
    }

    #[test]
    fn test_ensemble_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ensemble>();
    }
}
