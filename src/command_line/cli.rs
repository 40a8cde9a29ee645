#![allow(clippy::cast_precision_loss)]

use clause_retention::retention::ensemble::Ensemble;
use clause_retention::retention::model::{self, ModelError};
use clause_retention::retention::records::{self, ClauseRecord, RecordError};
use clause_retention::retention::reduction::{BatchOptions, ReductionOutcome, classify_batch};
use clause_retention::retention::summary::ModelSummary;
use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface of the clause retention tool.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "clause-retention",
    version,
    about = "Decide which learnt clauses survive a clause database reduction"
)]
pub(crate) struct Cli {
    /// Specifies the subcommand to execute.
    #[clap(subcommand)]
    pub command: Commands,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Classify a JSON-lines record file, or every `.jsonl` file under a directory.
    Classify {
        /// Record file or directory of record files.
        path: PathBuf,

        /// Model file to classify with instead of the reference model.
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Spread each file over the thread pool.
        #[arg(short, long, default_value_t = false)]
        parallel: bool,

        /// Print every record's decision with its score per tree.
        #[arg(long, default_value_t = false)]
        votes: bool,
    },

    /// Print the shape and feature usage of a model.
    Inspect {
        /// Model file to inspect instead of the reference model.
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Write the reference model as a JSON model file.
    Export {
        /// Destination file.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write random clause records as JSON lines.
    Sample {
        /// Number of records.
        #[arg(short, long, default_value_t = 1000)]
        count: usize,

        /// Seed of the generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Conflict counter of the simulated reduction pass.
        #[arg(long, default_value_t = 100_000)]
        sum_conflicts: u64,

        /// Destination file; standard output when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across subcommands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    pub(crate) debug: bool,

    /// Skip the statistics table after classifying.
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) no_stats: bool,
}

/// Anything that stops a command.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("{}: {source}", path.display())]
    Records { path: PathBuf, source: RecordError },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("no .jsonl record files under {}", .0.display())]
    NoRecords(PathBuf),
    #[error("unable to read allocator statistics: {0}")]
    Allocator(#[from] tikv_jemalloc_ctl::Error),
}

/// Runs the parsed command.
///
/// # Errors
///
/// Returns the first failure of the command.
pub(crate) fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Classify {
            path,
            model,
            parallel,
            votes,
        } => {
            let ensemble = load_model(model.as_deref())?;
            let options = BatchOptions {
                parallel,
                ..BatchOptions::default()
            };
            classify_path(&path, ensemble, &options, votes, &cli.common)
        }
        Commands::Inspect { model } => {
            let ensemble = load_model(model.as_deref())?;
            print!("{}", ModelSummary::of(ensemble));
            Ok(())
        }
        Commands::Export { output } => {
            let reference = model::reference();
            reference.save(&output)?;
            println!(
                "Model `{}` written to: {} (fingerprint {:016x})",
                reference.name(),
                output.display(),
                reference.fingerprint()
            );
            Ok(())
        }
        Commands::Sample {
            count,
            seed,
            sum_conflicts,
            output,
        } => {
            let sampled = records::sample_many(seed, count, sum_conflicts);
            match output {
                Some(path) => {
                    records::write_records(BufWriter::new(File::create(&path)?), &sampled)?;
                    log::info!("wrote {count} records to {}", path.display());
                }
                None => records::write_records(io::stdout().lock(), &sampled)?,
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_owned();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Loads and installs the model at `path`, or falls back to the reference model.
fn load_model(path: Option<&Path>) -> Result<&'static Ensemble, CliError> {
    if let Some(path) = path {
        model::install(Ensemble::load(path)?)?;
    }
    Ok(model::active())
}

/// Classifies a single record file or every `.jsonl` file under a directory.
pub(crate) fn classify_path(
    path: &Path,
    ensemble: &Ensemble,
    options: &BatchOptions,
    votes: bool,
    common: &CommonOptions,
) -> Result<(), CliError> {
    if path.is_file() {
        return classify_file(path, ensemble, options, votes, common);
    }

    let files = walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|e| log::warn!("skipping unreadable entry: {e}"))
                .ok()
        })
        .map(walkdir::DirEntry::into_path)
        .filter(|file| file.is_file() && file.extension().is_some_and(|ext| ext == "jsonl"))
        .collect_vec();

    if files.is_empty() {
        // An unreadable root surfaces its own I/O error.
        std::fs::read_dir(path)?;
        return Err(CliError::NoRecords(path.to_path_buf()));
    }

    for file in files {
        classify_file(&file, ensemble, options, votes, common)?;
    }
    Ok(())
}

/// Reads, classifies and reports one record file.
fn classify_file(
    path: &Path,
    ensemble: &Ensemble,
    options: &BatchOptions,
    votes: bool,
    common: &CommonOptions,
) -> Result<(), CliError> {
    println!("Classifying: {}", path.display());

    let time = Instant::now();
    let records = records::read_file(path).map_err(|source| CliError::Records {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_time = time.elapsed();

    epoch::advance()?;
    let time = Instant::now();
    let outcome = classify_batch(ensemble, &records, options);
    let elapsed = time.elapsed();

    if votes {
        print_votes(ensemble, &records);
    } else {
        let kept = outcome.keep.iter().map(|bit| if bit { '1' } else { '0' });
        println!("{}", kept.collect::<String>());
    }

    if !common.no_stats {
        epoch::advance()?;
        let allocated = stats::allocated::read()? as f64 / (1024.0 * 1024.0);
        let resident = stats::resident::read()? as f64 / (1024.0 * 1024.0);
        print_stats(ensemble, &outcome, parse_time, elapsed, allocated, resident);
    }
    Ok(())
}

/// Prints one line per record: its decision, its vote count and every tree's score.
fn print_votes(ensemble: &Ensemble, records: &[ClauseRecord]) {
    for (index, record) in records.iter().enumerate() {
        let verdict = ensemble.verdict(&record.stats, &record.context);
        let scores = verdict
            .scores()
            .iter()
            .map(|score| format!("{score:.3}"))
            .join(" ");
        println!("{index:>6}  {:<22} {scores}", verdict.to_string());
    }
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints the outcome of one batch.
fn print_stats(
    ensemble: &Ensemble,
    outcome: &ReductionOutcome,
    parse_time: Duration,
    elapsed: Duration,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Model ]=====================================");
    stat_line("Model", ensemble.name());
    stat_line("Fingerprint", format!("{:016x}", ensemble.fingerprint()));
    stat_line("Trees", ensemble.len());
    stat_line("Votes to keep", ensemble.rule().min_votes);

    println!("=======================[ Reduction ]=================================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line_with_rate("Clauses", outcome.len(), elapsed_secs);
    stat_line("Kept", outcome.kept());
    stat_line("Discarded", outcome.discarded());
    for (votes, &count) in outcome.vote_histogram.iter().enumerate() {
        if count > 0 {
            stat_line(&format!("  with {votes} votes"), count);
        }
    }
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::parse_from([
            "clause-retention",
            "classify",
            "dumps/",
            "--model",
            "model.json",
            "--parallel",
            "--debug",
        ]);
        assert!(cli.common.debug);
        match cli.command {
            Commands::Classify {
                path,
                model,
                parallel,
                votes,
            } => {
                assert_eq!(path, PathBuf::from("dumps/"));
                assert_eq!(model, Some(PathBuf::from("model.json")));
                assert!(parallel);
                assert!(!votes);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_sample_defaults() {
        let cli = Cli::parse_from(["clause-retention", "sample"]);
        assert!(!cli.common.debug);
        assert!(matches!(
            cli.command,
            Commands::Sample {
                count: 1000,
                seed: 0,
                sum_conflicts: 100_000,
                output: None
            }
        ));
    }

    #[test]
    fn test_directory_without_records_is_an_error() {
        let dir = std::env::temp_dir().join(format!("clause-retention-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let result = classify_path(
            &dir,
            model::reference(),
            &BatchOptions::default(),
            false,
            &CommonOptions::default(),
        );
        assert!(matches!(result, Err(CliError::NoRecords(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_reports_io_error() {
        let dir = std::env::temp_dir().join(format!("clause-retention-missing-{}", std::process::id()));
        let result = classify_path(
            &dir,
            model::reference(),
            &BatchOptions::default(),
            false,
            &CommonOptions::default(),
        );
        match result {
            Err(CliError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
