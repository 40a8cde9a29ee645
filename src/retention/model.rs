//! Model files and the process-wide active model.
//!
//! A model file is JSON:
//!
//! ```json
//! {
//!   "name": "reference-10",
//!   "rule": { "cutoff": 1.0, "min_votes": 5 },
//!   "trees": [
//!     { "nodes": [
//!       { "kind": "split", "feature": "size", "threshold": 8.5, "if_le": 1, "otherwise": 2 },
//!       { "kind": "leaf", "value": 0.25 },
//!       { "kind": "leaf", "value": 2.25 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! `rule` may be omitted, in which case a clause is kept when at least half of the trees
//! vote for it. Every tree is validated while loading.
//!
//! A solver loads its model once at start-up and publishes it with [`install`]. Until then,
//! and if nothing is ever installed, [`active`] returns the compiled-in reference model.
//! `install` must run before the first classification: a process that has already
//! classified with the reference model would otherwise switch models mid-run, so such a
//! late install is logged as a warning.

use crate::retention::ensemble::{Ensemble, VoteRule};
use crate::retention::tree::{DecisionTree, Node, TreeError};
use once_cell::sync::{Lazy, OnceCell};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Failures while building, loading or installing a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model file could not be read or written.
    #[error("model file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The model file is not valid model JSON.
    #[error("malformed model file: {0}")]
    Json(#[from] serde_json::Error),
    /// The model has no trees.
    #[error("model has no trees")]
    NoTrees,
    /// One of the trees is malformed.
    #[error("tree {tree} is malformed: {source}")]
    InvalidTree {
        /// Position of the tree in the model.
        tree: usize,
        /// What is wrong with it.
        source: TreeError,
    },
    /// The vote rule cannot be used with this many trees.
    #[error("vote rule with cutoff {cutoff} and {min_votes} required votes is invalid for {trees} trees")]
    InvalidRule {
        /// The rule's cutoff.
        cutoff: f64,
        /// The rule's required votes.
        min_votes: usize,
        /// Number of trees in the model.
        trees: usize,
    },
    /// [`install`] was called a second time.
    #[error("a model has already been installed")]
    AlreadyInstalled,
}

#[derive(Debug, Serialize, Deserialize)]
struct TreeFile<'a> {
    nodes: Cow<'a, [Node]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelFile<'a> {
    name: Cow<'a, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<VoteRule>,
    trees: Vec<TreeFile<'a>>,
}

impl<'a> From<&'a Ensemble> for ModelFile<'a> {
    fn from(ensemble: &'a Ensemble) -> Self {
        Self {
            name: Cow::Borrowed(ensemble.name()),
            rule: Some(*ensemble.rule()),
            trees: ensemble
                .trees()
                .iter()
                .map(|tree| TreeFile {
                    nodes: Cow::Borrowed(tree.nodes()),
                })
                .collect(),
        }
    }
}

impl TryFrom<ModelFile<'_>> for Ensemble {
    type Error = ModelError;

    fn try_from(file: ModelFile<'_>) -> Result<Self, Self::Error> {
        let trees = file
            .trees
            .into_iter()
            .enumerate()
            .map(|(tree, record)| {
                DecisionTree::new(record.nodes.into_owned())
                    .map_err(|source| ModelError::InvalidTree { tree, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name = file.name.into_owned();
        match file.rule {
            Some(rule) => Self::new(name, trees, rule),
            None => Self::with_majority(name, trees),
        }
    }
}

impl Ensemble {
    /// Parses and validates a model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Json`] for malformed JSON, and the validation errors of
    /// [`Ensemble::new`] and [`DecisionTree::new`] for malformed models.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let file: ModelFile<'_> = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    /// Parses and validates a model from a reader.
    ///
    /// # Errors
    ///
    /// See [`Ensemble::from_json`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let file: ModelFile<'_> = serde_json::from_reader(reader)?;
        Self::try_from(file)
    }

    /// Loads a model file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] if the file cannot be opened, otherwise see
    /// [`Ensemble::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let ensemble = Self::from_reader(BufReader::new(File::open(path)?))?;
        log::info!(
            "loaded model `{}` from {} ({} trees, fingerprint {:016x})",
            ensemble.name(),
            path.display(),
            ensemble.len(),
            ensemble.fingerprint()
        );
        Ok(ensemble)
    }

    /// Serialises the model as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Json`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(&ModelFile::from(self))?)
    }

    /// Writes the model to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] or [`ModelError::Json`] if writing fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &ModelFile::from(self))?;
        writer.flush()?;
        Ok(())
    }

    /// A hash of the vote rule and every node, identifying the model's behaviour.
    ///
    /// The name does not take part, so a renamed copy has the same fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.rule().cutoff.to_bits().hash(&mut hasher);
        self.rule().min_votes.hash(&mut hasher);
        for tree in self.trees() {
            tree.nodes().hash(&mut hasher);
        }
        hasher.finish()
    }
}

static REFERENCE: Lazy<Ensemble> = Lazy::new(Ensemble::<DecisionTree>::reference);
static INSTALLED: OnceCell<Ensemble> = OnceCell::new();
static REFERENCE_SERVED: AtomicBool = AtomicBool::new(false);

/// The compiled-in reference model, built on first use.
#[must_use]
pub fn reference() -> &'static Ensemble {
    &REFERENCE
}

/// Publishes `ensemble` as the active model for the rest of the process.
///
/// Call this before the first [`active`] lookup. Installing after [`active`] has already
/// returned the reference model logs a warning, since earlier decisions in the run used a
/// different model.
///
/// # Errors
///
/// Returns [`ModelError::AlreadyInstalled`] if a model was installed before.
pub fn install(ensemble: Ensemble) -> Result<(), ModelError> {
    let name = ensemble.name().to_owned();
    let fingerprint = ensemble.fingerprint();
    INSTALLED
        .set(ensemble)
        .map_err(|_| ModelError::AlreadyInstalled)?;
    if reference_served() {
        log::warn!(
            "model `{name}` installed after the reference model was already used for classification"
        );
    }
    log::info!("installed model `{name}` (fingerprint {fingerprint:016x})");
    Ok(())
}

/// The installed model, or the reference model if none was installed.
#[must_use]
pub fn active() -> &'static Ensemble {
    INSTALLED.get().unwrap_or_else(|| {
        REFERENCE_SERVED.store(true, Ordering::Relaxed);
        reference()
    })
}

/// Whether [`active`] has handed out the reference model because nothing was installed.
#[must_use]
pub fn reference_served() -> bool {
    REFERENCE_SERVED.load(Ordering::Relaxed)
}
