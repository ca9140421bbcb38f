//! CiteForge Contribution Tool
//!
//! Computes the contribution score of one publication:
//! - Loads document texts from a data directory
//! - Reads the citation network edge list
//! - Optionally reuses and updates a distance snapshot
//! - Prints the score, or why none could be computed

mod citation;
mod loader;
mod snapshot;

use citation::CitationGraph;
use citeforge_common::{
    config::AppConfig,
    errors::{AppError, ErrorReport, Result},
    metrics, telemetry, VERSION,
};
use citeforge_scoring::{Contribution, ContributionCalculator, DistanceCache};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Contribution of a publication relative to its citation neighbourhood
#[derive(Parser, Debug, Clone)]
#[command(name = "contribution", version, about)]
struct Args {
    /// Document to score
    #[arg(long, env = "CITEFORGE_DOC_ID")]
    doc_id: String,

    /// Directory with one text file per document
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Citation edge list (citing<TAB>cited), relative to the data directory
    #[arg(long)]
    citations: Option<PathBuf>,

    /// Distance snapshot to seed the cache from and write back to
    #[arg(long)]
    distances: Option<PathBuf>,

    /// Give up after this many milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Compute distances on a single thread
    #[arg(long)]
    sequential: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file (defaults to config/{default,$APP_ENV,local})
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Everything reported for one run
#[derive(Debug, Serialize)]
struct Report {
    doc_id: String,
    documents: usize,
    references: usize,
    citations: usize,
    contribution: Contribution,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => return fail(&e, args.json),
    };

    if let Err(e) = telemetry::init_tracing(&config.observability) {
        return fail(&e, args.json);
    }
    metrics::register_metrics();

    info!("Starting CiteForge contribution v{}", VERSION);

    match run(&args, &config).await {
        Ok(report) => {
            print_report(&report, args.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, code = ?e.code(), "Contribution run failed");
            fail(&e, args.json)
        }
    }
}

/// Layered configuration with command-line overrides applied last
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(&path.to_string_lossy())?,
        None => AppConfig::load()?,
    };

    if let Some(dir) = &args.data_dir {
        config.data.data_dir = dir.clone();
    }
    if let Some(citations) = &args.citations {
        config.data.citations_file = citations.clone();
    }
    if let Some(distances) = &args.distances {
        config.data.distances_file = Some(distances.clone());
    }
    if let Some(deadline_ms) = args.deadline_ms {
        config.scoring.deadline_ms = Some(deadline_ms);
    }
    if args.sequential {
        config.scoring.parallel = false;
    }
    Ok(config)
}

async fn run(args: &Args, config: &AppConfig) -> Result<Report> {
    let doc_id = args.doc_id.trim().to_string();
    if doc_id.is_empty() {
        return Err(AppError::Validation {
            message: "document id must not be empty".to_string(),
            field: Some("doc_id".to_string()),
        });
    }

    info!("Loading documents");
    let docs = loader::load_documents(&config.data.data_dir, &config.data.text_extension).await?;

    info!("Loading citation network");
    let graph = CitationGraph::load(&config.data.citations_path()).await?;
    if !graph.contains(&doc_id) {
        warn!(doc_id = %doc_id, "Document does not appear in the citation network");
    }

    let references = graph.get_references(&doc_id).to_vec();
    let citations = graph.get_citations(&doc_id).to_vec();
    info!(
        doc_id = %doc_id,
        references = references.len(),
        citations = citations.len(),
        "Resolved citation neighbourhood"
    );

    let cache = match &config.data.distances_file {
        Some(path) => snapshot::load(path).await?.unwrap_or_default(),
        None => DistanceCache::new(),
    };
    let cache = Arc::new(cache);

    let documents = docs.len();
    let (reference_count, citation_count) = (references.len(), citations.len());
    let calculator = ContributionCalculator::new()
        .with_cache(Arc::clone(&cache))
        .with_config(config.scoring.clone());
    let budget = config.scoring.deadline();

    let started = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        calculator.contribution_with_budget(&references, &citations, &docs, budget)
    })
    .await
    .map_err(join_failure)?;

    // Distances computed before a deadline are still worth keeping.
    if let Some(path) = &config.data.distances_file {
        snapshot::save(path, &cache).await?;
    }

    let contribution = outcome.map_err(|_| AppError::DeadlineExceeded {
        elapsed_ms: started.elapsed().as_millis() as u64,
    })?;
    info!(doc_id = %doc_id, "Contribution is {}", contribution);

    Ok(Report {
        doc_id,
        documents,
        references: reference_count,
        citations: citation_count,
        contribution,
    })
}

fn join_failure(err: tokio::task::JoinError) -> AppError {
    AppError::Other(anyhow::Error::new(err).context("scoring task failed"))
}

fn print_report(report: &Report, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to serialize report: {}", e),
        }
    } else {
        println!("{}", report.contribution);
    }
}

fn fail(err: &AppError, json: bool) -> ExitCode {
    if json {
        let report = ErrorReport::from(err);
        match serde_json::to_string(&report) {
            Ok(text) => eprintln!("{}", text),
            Err(_) => eprintln!("error: {}", err),
        }
    } else {
        eprintln!("error: {}", err);
    }
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn corpus(dir: &Path) {
        let texts = [
            ("27", "citation networks and semantic distance"),
            ("1", "the cat sat on the mat"),
            ("2", "quantum entanglement unifies physics theory"),
            ("3", "the cat sat on the mat"),
            ("4", "cats sitting on mats"),
        ];
        for (index, text) in texts {
            fs::write(dir.join(format!("{index}.txt")), text).unwrap();
        }
        // 27 cites 1 and 2, and is cited by 3 and 4
        fs::write(dir.join("citations.tsv"), "27\t1\n27\t2\n3\t27\n4\t27\n1\t2\n").unwrap();
    }

    fn args(dir: &Path, doc_id: &str) -> Args {
        Args::parse_from([
            "contribution",
            "--doc-id",
            doc_id,
            "--data-dir",
            dir.to_str().unwrap(),
        ])
    }

    #[test]
    fn test_args_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("citeforge.toml");
        fs::write(
            &file,
            "[scoring]\nparallel_threshold = 8\ndeadline_ms = 9000\n\n[data]\ndata_dir = \"from-file\"\n",
        )
        .unwrap();

        let args = Args::parse_from([
            "contribution",
            "--doc-id",
            "27",
            "--config",
            file.to_str().unwrap(),
            "--data-dir",
            "corpus",
            "--deadline-ms",
            "500",
            "--sequential",
        ]);
        let config = load_config(&args).unwrap();

        assert_eq!(config.data.data_dir, PathBuf::from("corpus"));
        assert_eq!(config.scoring.parallel_threshold, 8);
        assert_eq!(config.scoring.deadline_ms, Some(500));
        assert!(!config.scoring.parallel);
        assert!(!args.json);
    }

    #[tokio::test]
    async fn test_run_scores_neighbourhood() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path());

        let args = args(dir.path(), "27");
        let mut config = AppConfig::default();
        config.data.data_dir = dir.path().to_path_buf();

        let report = run(&args, &config).await.unwrap();
        assert_eq!(report.documents, 5);
        assert_eq!((report.references, report.citations), (2, 2));
        let score = report.contribution.value().unwrap();
        assert!(score.is_finite() && score >= 0.0);
    }

    #[tokio::test]
    async fn test_run_unknown_document_is_undefined() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path());

        let mut config = AppConfig::default();
        config.data.data_dir = dir.path().to_path_buf();

        let report = run(&args(dir.path(), "404"), &config).await.unwrap();
        assert!(!report.contribution.is_defined());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["contribution"]["status"], "undefined");
        assert_eq!(json["contribution"]["reason"]["kind"], "empty_group");
    }

    #[tokio::test]
    async fn test_run_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path());
        let snapshot_path = dir.path().join("distances.json");

        let mut config = AppConfig::default();
        config.data.data_dir = dir.path().to_path_buf();
        config.data.distances_file = Some(snapshot_path.clone());

        let first = run(&args(dir.path(), "27"), &config).await.unwrap();
        let cache = snapshot::load(&snapshot_path).await.unwrap().unwrap();
        assert!(!cache.is_empty());

        let second = run(&args(dir.path(), "27"), &config).await.unwrap();
        assert_eq!(first.contribution, second.contribution);
    }

    #[tokio::test]
    async fn test_run_expired_deadline() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path());

        let mut config = AppConfig::default();
        config.data.data_dir = dir.path().to_path_buf();
        config.scoring.deadline_ms = Some(0);

        let err = run(&args(dir.path(), "27"), &config).await.unwrap_err();
        assert!(matches!(err, AppError::DeadlineExceeded { .. }));
        assert_eq!(err.exit_code(), 75);
    }

    #[tokio::test]
    async fn test_panicked_scoring_task_is_internal() {
        let join = tokio::task::spawn_blocking(|| panic!("distance engine blew up")).await;
        let err = join_failure(join.unwrap_err());
        assert!(matches!(err, AppError::Other(_)));
        assert_eq!(err.exit_code(), 70);
        assert!(err.to_string().starts_with("scoring task failed: "));
    }

    #[tokio::test]
    async fn test_run_rejects_malformed_network() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path());
        fs::write(dir.path().join("citations.tsv"), "27\t1\nbroken\n").unwrap();

        let mut config = AppConfig::default();
        config.data.data_dir = dir.path().to_path_buf();

        let err = run(&args(dir.path(), "27"), &config).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCitationRow { line: 2, .. }));
    }
}
