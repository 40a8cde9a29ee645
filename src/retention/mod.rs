#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Clause retention: deciding which learnt clauses survive a reduction pass.
//!
//! A reduction pass derives a [`features::FeatureVector`] from each candidate clause's
//! [`stats::ClauseStats`] and the pass's [`stats::ReduceContext`], lets every tree of an
//! [`ensemble::Ensemble`] score it, and keeps the clause when enough trees vote for it.

pub mod ensemble;
pub mod features;
pub mod model;
pub mod records;
pub mod reduction;
mod reference;
pub mod stats;
pub mod summary;
pub mod tree;
