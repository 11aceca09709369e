//! CLI `genflow`.
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gen_core::DeterministicSource;
use gen_persistence::{JsonFileSnapshotStore, SnapshotStore};
use genflow::workflow::{GENERATE_PIPELINE, INGEST_PIPELINE};
use genflow::{hashing, logging, AppConfig, Orchestrator};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "genflow", version, about = "Deterministic artifact generation pipeline")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Stable identifier for the deterministic seed (overrides GENFLOW_STABLE_ID / git)
    #[arg(long, global = true)]
    stable_id: Option<String>,
    /// Cache snapshot file (overrides GENFLOW_CACHE_PATH)
    #[arg(long, global = true)]
    cache_path: Option<PathBuf>,
    /// Do not load or save the cache snapshot
    #[arg(long, global = true)]
    no_persist: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an artifact from a triples file and a template
    Generate {
        /// N-Triples input file
        input: PathBuf,
        /// Template file (tera syntax)
        #[arg(short, long)]
        template: PathBuf,
        /// Artifact name
        #[arg(short, long)]
        name: String,
        /// Write artifact content here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse a triples file and print the extracted entities
    Ingest {
        input: PathBuf,
    },
    /// Check that a pipeline reproduces the same output across isolated runs
    Verify {
        /// Pipeline name (ingest, digest) or "generate"
        #[arg(short, long, default_value = INGEST_PIPELINE)]
        pipeline: String,
        input: PathBuf,
        #[arg(short = 'n', long, default_value_t = 3)]
        iterations: usize,
        /// Template file (required for "generate")
        #[arg(short, long)]
        template: Option<PathBuf>,
        /// Artifact name (for "generate")
        #[arg(long, default_value = "artifact")]
        name: String,
    },
    /// Show the resolved deterministic seed
    Seed,
    /// Print the canonical hash of a JSON value (argument or file)
    Hash {
        /// JSON text; with --file, a path to a JSON file
        value: String,
        #[arg(short, long)]
        file: bool,
    },
    /// Inspect or clear the persisted cache snapshot
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    Show,
    Clear,
}

fn read(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = AppConfig::from_env()?;
    if let Some(id) = &cli.stable_id {
        config = config.with_stable_identifier(id.clone());
    }
    if let Some(path) = &cli.cache_path {
        config.persistence.cache_path = path.clone();
    }
    debug!(?config, "configuration loaded");
    let store = JsonFileSnapshotStore::from_config(&config.persistence);

    match cli.command {
        Commands::Seed => {
            let values = DeterministicSource::new(config.seed.clone());
            print_json(values.state())
        }
        Commands::Hash { value, file } => {
            let text = if file { read(&PathBuf::from(&value))? } else { value };
            let parsed: Value = serde_json::from_str(&text).context("value is not valid JSON")?;
            println!("{}", hashing::hash_value(&parsed));
            Ok(())
        }
        Commands::Cache { action } => match action {
            CacheAction::Show => {
                let snapshot = store.load_required()?;
                print_json(&serde_json::json!({
                    "path": store.location(),
                    "engine_version": snapshot.engine_version,
                    "exported_at": snapshot.exported_at,
                    "records": snapshot.len(),
                    "metrics": snapshot.metrics,
                }))
            }
            CacheAction::Clear => {
                let removed = store.clear()?;
                println!("{}", if removed { "cache snapshot removed" } else { "no cache snapshot" });
                Ok(())
            }
        },
        Commands::Ingest { input } => {
            let orchestrator = open(&config, &store, cli.no_persist)?;
            let run = orchestrator.run_pipeline(INGEST_PIPELINE, Value::from(read(&input)?))?;
            finish(&orchestrator, &store, cli.no_persist)?;
            if !run.success {
                bail!("ingest failed: {}", run.error.unwrap_or_default());
            }
            print_json(run.final_value())
        }
        Commands::Generate { input, template, name, output } => {
            let orchestrator = open(&config, &store, cli.no_persist)?;
            let run = orchestrator.generate(&read(&input)?, &read(&template)?, &name)?;
            finish(&orchestrator, &store, cli.no_persist)?;
            if !run.success {
                bail!("generation failed: {}", run.error.unwrap_or_default());
            }
            let artifact = run.final_value();
            let content = artifact["content"].as_str().unwrap_or_default();
            match output {
                Some(path) => {
                    fs::write(&path, content).with_context(|| format!("cannot write {}", path.display()))?;
                    eprintln!("{} -> {} ({})", name, path.display(), artifact["content_hash"].as_str().unwrap_or_default());
                }
                None => print!("{content}"),
            }
            Ok(())
        }
        Commands::Verify { pipeline, input, iterations, template, name } => {
            let orchestrator = Orchestrator::new(&config)?;
            let text = Value::from(read(&input)?);
            let verdict = if pipeline == GENERATE_PIPELINE {
                let Some(template) = template else {
                    bail!("--template is required to verify the generate pipeline");
                };
                let steps = genflow::PipelineCatalog::generation(&read(&template)?, &name)?;
                orchestrator.verify_steps(steps, &text, iterations)?
            } else {
                orchestrator.verify_pipeline(&pipeline, &text, iterations)?
            };
            print_json(&verdict)?;
            if !verdict.is_idempotent {
                bail!("pipeline {pipeline} is not idempotent");
            }
            Ok(())
        }
    }
}

fn open(config: &AppConfig, store: &dyn SnapshotStore, no_persist: bool) -> Result<Orchestrator> {
    let orchestrator = Orchestrator::new(config)?;
    if !no_persist {
        match orchestrator.load_cache(store) {
            Ok(restored) => debug!(restored, "cache snapshot restored"),
            // Un snapshot de otra época o versión se descarta; se reescribe al terminar.
            Err(e) => warn!(error = %e, "cache snapshot ignored"),
        }
    }
    Ok(orchestrator)
}

fn finish(orchestrator: &Orchestrator, store: &dyn SnapshotStore, no_persist: bool) -> Result<()> {
    if !no_persist {
        orchestrator.save_cache(store)?;
    }
    let metrics = orchestrator.metrics();
    debug!(hits = metrics.cache.cache_hits, misses = metrics.cache.cache_misses, "cache metrics");
    Ok(())
}
