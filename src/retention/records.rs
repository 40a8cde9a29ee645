#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
//! Clause records: one clause's statistics together with the pass scalars it was
//! classified under.
//!
//! Records are stored as JSON lines, one flat object per line:
//!
//! ```text
//! # clauses dumped at conflict 1000
//! {"size": 5, "glue": 3, "rdb1_last_touched_diff": 50, "sum_conflicts": 1000, "rdb0_last_touched_diff": 100}
//! ```
//!
//! Missing fields default to zero; unknown keys are rejected, so a misspelled field
//! cannot silently read as zero. Blank lines and lines starting with `#` are skipped.
//! Every record is checked with [`ClauseStats::check`] as it is read, so malformed
//! statistics never reach the classifier.

use crate::retention::stats::{ClauseStats, ReduceContext, StatsError};
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// A clause as seen by one reduction pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClauseRecord {
    /// The clause's statistics.
    #[serde(flatten)]
    pub stats: ClauseStats,
    /// The pass scalars.
    #[serde(flatten)]
    pub context: ReduceContext,
}

/// Every key a record line may carry.
pub const FIELDS: [&str; 23] = [
    "size",
    "glue",
    "glue_rel_long",
    "glue_rel_queue",
    "size_rel",
    "num_antecedents_rel",
    "antec_num_total_lits_rel",
    "num_total_lits_antecedents",
    "antecedents_glue_long_reds_var",
    "num_overlap_literals",
    "num_overlap_literals_rel",
    "used_for_uip_creation",
    "rdb1_used_for_uip_creation",
    "sum_uip1_used",
    "sum_delta_confl_uip1_used",
    "introduced_at_conflict",
    "dump_number",
    "rdb1_last_touched_diff",
    "rdb1_act_ranking_top_10",
    "sum_conflicts",
    "rdb0_last_touched_diff",
    "rdb0_act_ranking",
    "rdb0_act_ranking_top_10",
];

/// Failures while reading records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The input could not be read.
    #[error("failed to read records: {0}")]
    Io(#[from] io::Error),
    /// A line is not a valid record.
    #[error("line {line}: {source}")]
    Json {
        /// 1-based line number.
        line: usize,
        /// The parse failure.
        source: serde_json::Error,
    },
    /// A line carries a key that is not a record field.
    #[error("line {line}: unknown field `{field}`")]
    UnknownField {
        /// 1-based line number.
        line: usize,
        /// The unrecognised key.
        field: String,
    },
    /// A record violates an invariant of the statistics.
    #[error("line {line}: {source}")]
    Invalid {
        /// 1-based line number.
        line: usize,
        /// The violated invariant.
        source: StatsError,
    },
}

/// Reads JSON-lines records, checking each one.
///
/// # Errors
///
/// Returns the first I/O failure, parse failure, unknown key or invariant violation,
/// tagged with its line number.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<ClauseRecord>, RecordError> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let number = index + 1;
        let json = |source| RecordError::Json {
            line: number,
            source,
        };
        let object: Map<String, Value> = serde_json::from_str(trimmed).map_err(json)?;
        if let Some(field) = object.keys().find(|key| !FIELDS.contains(&key.as_str())) {
            return Err(RecordError::UnknownField {
                line: number,
                field: field.clone(),
            });
        }
        let record: ClauseRecord = serde_json::from_value(Value::Object(object)).map_err(json)?;
        record
            .stats
            .check(&record.context)
            .map_err(|source| RecordError::Invalid {
                line: number,
                source,
            })?;
        records.push(record);
    }

    Ok(records)
}

/// Reads a JSON-lines record file.
///
/// # Errors
///
/// See [`parse_records`].
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<ClauseRecord>, RecordError> {
    let file = File::open(path)?;
    parse_records(BufReader::new(file))
}

/// Writes records as JSON lines.
///
/// # Errors
///
/// Returns any I/O or serialisation failure.
pub fn write_records<W: io::Write>(mut writer: W, records: &[ClauseRecord]) -> io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    writer.flush()
}

/// A ratio around `centre`, spread by `spread` in both directions, never negative.
fn ratio(rng: &mut Rng, centre: f64, spread: f64) -> f64 {
    (centre + (rng.f64() * 2.0 - 1.0) * spread).max(0.0)
}

/// Draws a plausible random clause record for a pass at conflict `sum_conflicts`.
///
/// The record satisfies [`ClauseStats::check`]: it is introduced no later than
/// `sum_conflicts`, its previous-pass counters never exceed the current ones, and every
/// ratio is finite and non-negative.
#[must_use]
pub fn sample(rng: &mut Rng, sum_conflicts: u64) -> ClauseRecord {
    let size = rng.u32(2..=60);
    let glue = rng.u32(2..=size.max(2));
    let introduced_at_conflict = rng.u64(0..=sum_conflicts);
    let age = sum_conflicts - introduced_at_conflict;
    let age_u32 = u32::try_from(age).unwrap_or(u32::MAX);

    let used_for_uip_creation = rng.u32(0..=20);
    let sum_uip1_used = u64::from(used_for_uip_creation) + rng.u64(0..=40);
    let num_total_lits_antecedents = rng.u32(size..=size.saturating_mul(12));

    let stats = ClauseStats {
        size,
        glue,
        glue_rel_long: ratio(rng, f64::from(glue) / 6.0, 0.4),
        glue_rel_queue: ratio(rng, f64::from(glue) / 6.0, 0.5),
        size_rel: ratio(rng, f64::from(size) / 15.0, 0.5),
        num_antecedents_rel: ratio(rng, 1.0, 0.8),
        antec_num_total_lits_rel: ratio(rng, 1.0, 0.8),
        num_total_lits_antecedents,
        antecedents_glue_long_reds_var: ratio(rng, 3.0, 3.0),
        num_overlap_literals: rng.u32(0..=num_total_lits_antecedents.min(80)),
        num_overlap_literals_rel: ratio(rng, 0.6, 0.6),
        used_for_uip_creation,
        rdb1_used_for_uip_creation: rng.u32(0..=used_for_uip_creation),
        sum_uip1_used,
        sum_delta_confl_uip1_used: if sum_uip1_used == 0 {
            0
        } else {
            rng.u64(0..=age)
        },
        introduced_at_conflict,
        dump_number: rng.u32(0..=(age_u32 / 10_000).min(50)),
        rdb1_last_touched_diff: rng.u32(0..=age_u32.min(60_000)),
        rdb1_act_ranking_top_10: rng.u32(0..=10),
    };

    let context = ReduceContext {
        sum_conflicts,
        rdb0_last_touched_diff: rng.u32(0..=age_u32.min(60_000)),
        rdb0_act_ranking: rng.u32(0..=150_000),
        rdb0_act_ranking_top_10: rng.u32(0..=10),
    };

    ClauseRecord { stats, context }
}

/// Draws `count` records from a generator seeded with `seed`.
#[must_use]
pub fn sample_many(seed: u64, count: usize, sum_conflicts: u64) -> Vec<ClauseRecord> {
    let mut rng = Rng::with_seed(seed);
    (0..count).map(|_| sample(&mut rng, sum_conflicts)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_records_skips_comments_and_blank_lines() {
        let input = "# header\n\
                     {\"size\": 5, \"glue\": 3, \"sum_conflicts\": 1000, \"rdb0_last_touched_diff\": 100}\n\
                     \n\
                     {\"size\": 30, \"glue_rel_long\": 2.5, \"sum_conflicts\": 1000}\n";
        let records = parse_records(Cursor::new(input)).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].stats.size, 5);
        assert_eq!(records[0].stats.glue, 3);
        assert_eq!(records[0].context.rdb0_last_touched_diff, 100);
        assert_eq!(records[1].stats.glue_rel_long, 2.5);
        assert_eq!(records[1].stats.dump_number, 0);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "{\"size\": 5}\n# comment\n{\"size\": \"five\"}\n";
        let error = parse_records(Cursor::new(input)).unwrap_err();
        assert!(matches!(error, RecordError::Json { line: 3, .. }));
    }

    #[test]
    fn test_invalid_record_reports_line() {
        let input = "{\"introduced_at_conflict\": 50, \"sum_conflicts\": 10}\n";
        let error = parse_records(Cursor::new(input)).unwrap_err();
        assert!(matches!(
            error,
            RecordError::Invalid {
                line: 1,
                source: StatsError::IntroducedInFuture { .. }
            }
        ));
    }

    #[test]
    fn test_misspelled_field_is_rejected() {
        let input = "{\"size\": 5, \"sum_conflicts\": 1000}\n\
                     {\"rdb0_last_touched_dif\": 99999, \"sum_conflicts\": 1000}\n";
        let error = parse_records(Cursor::new(input)).unwrap_err();
        match error {
            RecordError::UnknownField { line, field } => {
                assert_eq!(line, 2);
                assert_eq!(field, "rdb0_last_touched_dif");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_field_list_matches_record() {
        let value = serde_json::to_value(ClauseRecord::default()).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let mut fields = FIELDS.to_vec();
        keys.sort_unstable();
        fields.sort_unstable();
        assert_eq!(keys, fields);
    }

    #[test]
    fn test_written_records_parse_back() {
        let records = sample_many(7, 25, 50_000);
        let mut buffer = Vec::new();
        write_records(&mut buffer, &records).unwrap();

        let parsed = parse_records(Cursor::new(buffer)).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_samples_are_valid() {
        let mut rng = Rng::with_seed(42);
        for sum_conflicts in [0, 1, 1000, 250_000, 10_000_000] {
            for _ in 0..200 {
                let record = sample(&mut rng, sum_conflicts);
                assert_eq!(record.stats.check(&record.context), Ok(()));
                assert!(record.stats.rdb1_used_for_uip_creation <= record.stats.used_for_uip_creation);
                assert!(record.stats.glue <= record.stats.size);
            }
        }
    }

    #[test]
    fn test_sampling_is_seeded() {
        assert_eq!(sample_many(3, 10, 9000), sample_many(3, 10, 9000));
        assert_ne!(sample_many(3, 10, 9000), sample_many(4, 10, 9000));
    }
}
