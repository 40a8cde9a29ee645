//! Decision trees stored as flat node arenas.
//!
//! A tree is a slice of [`Node`] records. The root lives at index 0. A split node compares
//! one feature against its threshold and continues at `if_le` when
//! `feature <= threshold`, and at `otherwise` when it is not. A leaf ends the walk and
//! yields the tree's score.
//!
//! Scores are weighted class ratios produced by the offline training step. They are not
//! probabilities and frequently exceed `1.0`.
//!
//! Trees loaded from model files go through [`DecisionTree::new`], which checks that every
//! child index points forward and inside the arena. Since children always have a larger
//! index than their parent, every walk ends at a leaf after at most `len` steps.

use crate::retention::features::{Feature, FeatureVector};
use bit_vec::BitVec;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

/// Anything that scores a clause from its features.
///
/// The ensemble only needs this one operation, so reference trees, trees loaded from
/// disk and synthetic trees in tests are interchangeable.
pub trait Tree {
    /// The score of the leaf the features route to.
    fn score(&self, features: &FeatureVector) -> f64;
}

/// One record of a tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Internal node comparing `feature <= threshold`.
    Split {
        /// The feature read by this node.
        feature: Feature,
        /// Upper bound (inclusive) of the `if_le` branch.
        threshold: OrderedFloat<f64>,
        /// Index of the child taken when the comparison holds.
        if_le: u32,
        /// Index of the child taken when it does not.
        otherwise: u32,
    },
    /// Terminal node.
    Leaf {
        /// Score returned for every clause reaching this leaf.
        value: OrderedFloat<f64>,
    },
}

/// Builds a split node.
#[must_use]
pub const fn split(feature: Feature, threshold: f64, if_le: u32, otherwise: u32) -> Node {
    Node::Split {
        feature,
        threshold: OrderedFloat(threshold),
        if_le,
        otherwise,
    }
}

/// Builds a leaf from the weighted sample counts of the training step.
#[must_use]
pub const fn leaf(weight: f64, samples: f64) -> Node {
    Node::Leaf {
        value: OrderedFloat(weight / samples),
    }
}

/// Reasons an arena is not a usable tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The arena has no root.
    #[error("tree has no nodes")]
    Empty,
    /// A child index points past the end of the arena.
    #[error("node {node} points to child {child}, but the tree has {len} nodes")]
    ChildOutOfRange {
        /// Index of the split node.
        node: usize,
        /// The offending child index.
        child: u32,
        /// Arena length.
        len: usize,
    },
    /// A child index does not point forward, which could loop.
    #[error("node {node} points back to child {child}")]
    BackwardChild {
        /// Index of the split node.
        node: usize,
        /// The offending child index.
        child: u32,
    },
    /// A split threshold is NaN or infinite.
    #[error("node {node} has a non-finite threshold")]
    NonFiniteThreshold {
        /// Index of the split node.
        node: usize,
    },
    /// A leaf score is NaN or infinite.
    #[error("leaf {node} has a non-finite value")]
    NonFiniteLeaf {
        /// Index of the leaf.
        node: usize,
    },
}

/// A decision tree over [`FeatureVector`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecisionTree {
    nodes: Cow<'static, [Node]>,
}

impl DecisionTree {
    /// Builds a tree from an arena, checking that it is well formed.
    ///
    /// # Errors
    ///
    /// Returns a [`TreeError`] if the arena is empty, if any child index is out of range
    /// or not greater than its parent's index, or if any threshold or leaf value is not
    /// finite.
    pub fn new(nodes: Vec<Node>) -> Result<Self, TreeError> {
        let tree = Self {
            nodes: Cow::Owned(nodes),
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Wraps a compiled-in arena without copying it.
    ///
    /// The arena is not checked here; compiled-in arenas are checked by the tests.
    pub(crate) const fn from_static(nodes: &'static [Node]) -> Self {
        Self {
            nodes: Cow::Borrowed(nodes),
        }
    }

    /// Checks the arena invariants and warns about nodes no walk can reach.
    ///
    /// # Errors
    ///
    /// See [`DecisionTree::new`].
    pub fn validate(&self) -> Result<(), TreeError> {
        let len = self.nodes.len();
        if len == 0 {
            return Err(TreeError::Empty);
        }

        let mut reachable = BitVec::from_elem(len, false);
        reachable.set(0, true);

        for (node, record) in self.nodes.iter().enumerate() {
            match *record {
                Node::Split {
                    threshold,
                    if_le,
                    otherwise,
                    ..
                } => {
                    if !threshold.0.is_finite() {
                        return Err(TreeError::NonFiniteThreshold { node });
                    }
                    for child in [if_le, otherwise] {
                        let index = child as usize;
                        if index >= len {
                            return Err(TreeError::ChildOutOfRange { node, child, len });
                        }
                        if index <= node {
                            return Err(TreeError::BackwardChild { node, child });
                        }
                        if reachable[node] {
                            reachable.set(index, true);
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.0.is_finite() {
                        return Err(TreeError::NonFiniteLeaf { node });
                    }
                }
            }
        }

        let unreachable = reachable.iter().filter(|&seen| !seen).count();
        if unreachable > 0 {
            log::warn!("tree has {unreachable} unreachable nodes out of {len}");
        }

        Ok(())
    }

    /// The node records, root first.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty. Never true for a validated tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Largest number of comparisons on any root-to-leaf walk.
    #[must_use]
    pub fn depth(&self) -> usize {
        // Children always follow their parent, so a reverse sweep sees every child first.
        let mut depth = vec![0_usize; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate().rev() {
            if let Node::Split {
                if_le, otherwise, ..
            } = *node
            {
                depth[index] = 1 + depth[if_le as usize].max(depth[otherwise as usize]);
            }
        }
        depth.first().copied().unwrap_or(0)
    }

    /// Every feature some split of this tree reads, without duplicates.
    #[must_use]
    pub fn features(&self) -> Vec<Feature> {
        let mut used = BitVec::from_elem(Feature::COUNT, false);
        for node in self.nodes.iter() {
            if let Node::Split { feature, .. } = node {
                used.set(feature.index(), true);
            }
        }
        Feature::ALL
            .into_iter()
            .filter(|feature| used[feature.index()])
            .collect()
    }

    /// Walks from the root to a leaf, returning its index and value.
    fn walk(&self, features: &FeatureVector) -> (usize, f64) {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    if_le,
                    otherwise,
                } => {
                    index = if features[feature] <= threshold.0 {
                        if_le
                    } else {
                        otherwise
                    } as usize;
                }
                Node::Leaf { value } => return (index, value.0),
            }
        }
    }

    /// Index of the leaf the features route to.
    #[must_use]
    pub fn leaf_index(&self, features: &FeatureVector) -> usize {
        self.walk(features).0
    }
}

impl Tree for DecisionTree {
    fn score(&self, features: &FeatureVector) -> f64 {
        self.walk(features).1
    }
}

impl<T: Tree + ?Sized> Tree for &T {
    fn score(&self, features: &FeatureVector) -> f64 {
        (**self).score(features)
    }
}

impl<T: Tree + ?Sized> Tree for Box<T> {
    fn score(&self, features: &FeatureVector) -> f64 {
        (**self).score(features)
    }
}
