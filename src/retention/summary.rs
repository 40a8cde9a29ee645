//! Structural summary of a model: tree shapes and which features the splits read.

use crate::retention::ensemble::{Ensemble, VoteRule};
use crate::retention::features::Feature;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Shape of one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSummary {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of leaves.
    pub leaves: usize,
    /// Longest root-to-leaf walk, in comparisons.
    pub depth: usize,
    /// Features read by the tree's splits.
    pub features: Vec<Feature>,
}

/// Shape and feature usage of a whole model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    /// Model name.
    pub name: String,
    /// See [`Ensemble::fingerprint`].
    pub fingerprint: u64,
    /// The model's vote rule.
    pub rule: VoteRule,
    /// One entry per tree, in vote order.
    pub trees: Vec<TreeSummary>,
}

impl ModelSummary {
    /// Summarises `ensemble`.
    #[must_use]
    pub fn of(ensemble: &Ensemble) -> Self {
        let trees = ensemble
            .trees()
            .iter()
            .map(|tree| TreeSummary {
                nodes: tree.len(),
                leaves: tree.leaf_count(),
                depth: tree.depth(),
                features: tree.features(),
            })
            .collect();

        Self {
            name: ensemble.name().to_owned(),
            fingerprint: ensemble.fingerprint(),
            rule: *ensemble.rule(),
            trees,
        }
    }

    /// Indices of the trees that read `feature`.
    pub fn readers(&self, feature: Feature) -> impl Iterator<Item = usize> + '_ {
        self.trees
            .iter()
            .positions(move |tree| tree.features.contains(&feature))
    }

    /// Number of trees that read `feature`.
    #[must_use]
    pub fn usage(&self, feature: Feature) -> usize {
        self.readers(feature).count()
    }

    /// Features no split of any tree reads.
    #[must_use]
    pub fn unused_features(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|&feature| self.usage(feature) == 0)
            .collect()
    }

    /// Features read by exactly one tree, paired with that tree's index.
    ///
    /// Changing such a feature can only ever change that one tree's vote.
    #[must_use]
    pub fn exclusive_features(&self) -> Vec<(Feature, usize)> {
        Feature::ALL
            .into_iter()
            .filter_map(|feature| {
                self.readers(feature)
                    .exactly_one()
                    .ok()
                    .map(|tree| (feature, tree))
            })
            .collect()
    }

    /// Total node count over all trees.
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(|tree| tree.nodes).sum()
    }

    /// Deepest tree.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(|tree| tree.depth).max().unwrap_or(0)
    }
}

impl Display for ModelSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "model        {}", self.name)?;
        writeln!(f, "fingerprint  {:016x}", self.fingerprint)?;
        writeln!(
            f,
            "rule         keep when >= {} of {} scores < {}",
            self.rule.min_votes,
            self.trees.len(),
            self.rule.cutoff
        )?;
        writeln!(
            f,
            "nodes        {} (max depth {})",
            self.total_nodes(),
            self.max_depth()
        )?;

        for (index, tree) in self.trees.iter().enumerate() {
            writeln!(
                f,
                "tree {index:>2}      {:>3} nodes {:>3} leaves depth {:>2}  {}",
                tree.nodes,
                tree.leaves,
                tree.depth,
                tree.features.iter().join(", ")
            )?;
        }

        writeln!(f, "feature usage (trees reading each feature):")?;
        for feature in Feature::ALL {
            writeln!(f, "  {:<32} {}", feature.name(), self.usage(feature))?;
        }

        let unused = self.unused_features();
        if !unused.is_empty() {
            writeln!(f, "unused       {}", unused.iter().join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::ensemble::tests::{scenario, stale};
    use crate::retention::features::FeatureVector;

    #[test]
    fn test_reference_summary() {
        let summary = ModelSummary::of(&Ensemble::reference());
        assert_eq!(summary.name, "reference-10");
        assert_eq!(summary.trees.len(), 10);
        assert_eq!(summary.rule, VoteRule::REFERENCE);
        for tree in &summary.trees {
            assert_eq!(tree.leaves, tree.nodes.div_ceil(2));
            assert!(tree.depth > 0 && tree.depth < 30);
        }
    }

    #[test]
    fn test_ratio_features_are_dead_in_reference() {
        let summary = ModelSummary::of(&Ensemble::reference());
        let unused = summary.unused_features();
        assert!(unused.contains(&Feature::Rdb0AvgConfl));
        assert!(unused.contains(&Feature::Rdb0UsedPerConfl));
        assert_eq!(summary.usage(Feature::Rdb0LastTouchedDiff), 10);
    }

    #[test]
    fn test_exclusive_features_in_reference() {
        let summary = ModelSummary::of(&Ensemble::reference());
        let exclusive = summary.exclusive_features();
        assert!(exclusive.contains(&(Feature::AntecedentsGlueLongRedsVar, 3)));
        assert!(exclusive.contains(&(Feature::NumOverlapLiteralsRel, 5)));
        assert!(exclusive.contains(&(Feature::NumTotalLitsAntecedents, 8)));
    }

    #[test]
    fn test_exclusive_feature_changes_only_its_tree() {
        let ensemble = Ensemble::reference();
        let summary = ModelSummary::of(&ensemble);
        let exclusive = summary.exclusive_features();
        assert!(!exclusive.is_empty());

        let probes = [0.0, 0.1, 0.5, 1.0, 3.2417, 3.25, 10.0, 45.5, 46.0, 1000.0];
        for (stats, context) in [scenario(), stale()] {
            let base = FeatureVector::derive(&stats, &context);
            let base_ballots = ensemble.verdict_features(&base).ballots().collect_vec();

            for &(feature, owner) in &exclusive {
                for probe in probes {
                    let ballots = ensemble
                        .verdict_features(&base.with(feature, probe))
                        .ballots()
                        .collect_vec();
                    for (tree, (&before, &after)) in
                        base_ballots.iter().zip(&ballots).enumerate()
                    {
                        if tree != owner {
                            assert_eq!(
                                before, after,
                                "{feature} = {probe} changed the vote of tree {tree}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_exclusive_feature_can_flip_its_tree() {
        let ensemble = Ensemble::reference();
        let (stats, context) = scenario();
        let base = FeatureVector::derive(&stats, &context);

        // Tree 3 routes on this variance right below the root.
        let low = base.with(Feature::AntecedentsGlueLongRedsVar, 1.0);
        let high = base.with(Feature::AntecedentsGlueLongRedsVar, 5.0);
        let tree = &ensemble.trees()[3];
        assert_ne!(tree.leaf_index(&low), tree.leaf_index(&high));
    }

    #[test]
    fn test_display_lists_unused_features() {
        let text = ModelSummary::of(&Ensemble::reference()).to_string();
        assert!(text.starts_with("model        reference-10\n"));
        assert!(text.contains("rdb0_avg_confl"));
        assert!(text.contains("unused"));
    }
}
