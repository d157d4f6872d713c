use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use resumedb_core::config::Config;
use resumedb_core::data_processor::DataProcessor;
use resumedb_core::types::SearchQuery;
use resumedb_core::{Error, ErrorKind};
use resumedb_rag::RetrievalEngine;

#[derive(Parser)]
#[command(name = "resumedb", about = "Semantic search and question answering over a folder of resumes")]
struct Cli {
    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Corpus state file (overrides storage.state_path)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add every .txt resume under a directory
    Ingest {
        dir: PathBuf,
        /// Only ingest the first N files
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Add one resume file
    Add {
        file: PathBuf,
        /// Name to store instead of the file's own name
        #[arg(long)]
        name: Option<String>,
    },
    /// Rank resumes against a query and optionally ask the LLM
    Search {
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Skip answer generation
        #[arg(long)]
        no_answer: bool,
    },
    /// List indexed resumes
    List {
        /// Include full content
        #[arg(long)]
        full: bool,
    },
    /// Show one resume
    Get { id: String },
    /// Remove a resume and rebuild the index
    Delete { id: String },
    /// Corpus and index statistics
    Stats,
    /// Embedding model and LLM reachability
    Health {
        /// Also list the models the LLM backend serves
        #[arg(long)]
        models: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn snippet(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}…", cut)
}

fn save(engine: &RetrievalEngine, state: &Path) -> anyhow::Result<()> {
    engine.save(state).with_context(|| format!("saving corpus to {}", state.display()))
}

#[derive(Serialize)]
struct IngestReport {
    added: usize,
    failed: usize,
    total_documents: usize,
}

#[derive(Serialize)]
struct Added<'a> {
    id: &'a str,
    filename: &'a str,
    total_documents: usize,
}

#[derive(Serialize)]
struct Deleted<'a> {
    id: &'a str,
    filename: &'a str,
    remaining_documents: usize,
}

fn ingest(engine: &RetrievalEngine, dir: &Path, limit: Option<usize>, state: &Path, json: bool) -> anyhow::Result<()> {
    let processor = DataProcessor::new();
    let files = match limit {
        Some(n) => processor.process_directory_limited(dir, n)?,
        None => processor.process_directory(dir)?,
    };
    if files.is_empty() {
        warn!(dir = %dir.display(), "no .txt resumes found");
    }

    let bar = if json { ProgressBar::hidden() } else { ProgressBar::new(files.len() as u64) };
    bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")?);

    let mut added = 0;
    let mut failed = 0;
    for file in &files {
        bar.set_message(file.filename.clone());
        match engine.add(&file.content, &file.filename) {
            Ok(_) => added += 1,
            // The embedder is down or misconfigured; later files would fail the same way.
            Err(e) if e.is_collaborator() || e.kind() == ErrorKind::DimensionMismatch => {
                bar.abandon();
                save(engine, state)?;
                return Err(e).with_context(|| format!("embedding {}", file.path.display()));
            }
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "skipping resume");
                failed += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    save(engine, state)?;

    let report = IngestReport { added, failed, total_documents: engine.len() };
    emit(json, &report, |r| {
        println!("✅ Ingested {} resumes from {} ({} failed)", r.added, dir.display(), r.failed);
        println!("📊 {} documents indexed", r.total_documents);
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    let settings = config.settings()?;
    let state = match cli.state {
        Some(path) => path,
        None => config.state_path()?,
    };

    let engine = RetrievalEngine::from_settings(&settings)?;
    let restored = engine.restore_or_empty(&state)?;
    info!(state = %state.display(), documents = restored, "corpus ready");

    let json = cli.json;
    match cli.command {
        Command::Ingest { dir, limit } => ingest(&engine, &dir, limit, &state, json)?,
        Command::Add { file, name } => {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let content = String::from_utf8_lossy(&bytes);
            let filename = name.unwrap_or_else(|| {
                file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| file.display().to_string())
            });
            let id = engine.add(&content, &filename)?;
            save(&engine, &state)?;
            let added = Added { id: &id, filename: &filename, total_documents: engine.len() };
            emit(json, &added, |a| println!("✅ Added {} as {} ({} documents)", a.filename, a.id, a.total_documents))?;
        }
        Command::Search { query, top_k, no_answer } => {
            let query = SearchQuery::new(query)
                .with_top_k(top_k.unwrap_or(settings.search.default_top_k))
                .with_answer(!no_answer);
            let response = engine.search(&query)?;
            emit(json, &response, |r| {
                println!("🔍 \"{}\": {} of {} documents", r.query, r.results.len(), r.total_documents);
                for (rank, hit) in r.results.iter().enumerate() {
                    println!("\n{}. {} [{}] score {:.4}", rank + 1, hit.document.filename, hit.document.id, hit.score);
                    println!("   {}", snippet(&hit.document.content, 200));
                }
                if let Some(answer) = &r.answer {
                    println!("\n💡 {}", answer.trim());
                }
            })?;
        }
        Command::List { full } => {
            if full {
                emit(json, &engine.documents(), |docs| {
                    for d in docs {
                        println!("{}  {}\n{}\n", d.id, d.filename, d.content);
                    }
                })?;
            } else {
                emit(json, &engine.list(), |metas| {
                    for m in metas {
                        println!("{}  {}", m.id, m.filename);
                    }
                    println!("📊 {} documents", metas.len());
                })?;
            }
        }
        Command::Get { id } => {
            let doc = engine.get(&id)?;
            emit(json, &doc, |d| println!("{} ({})\n\n{}", d.filename, d.id, d.content))?;
        }
        Command::Delete { id } => {
            let removed = engine.delete(&id)?;
            save(&engine, &state)?;
            let deleted = Deleted { id: &removed.id, filename: &removed.filename, remaining_documents: engine.len() };
            emit(json, &deleted, |d| {
                println!("🗑️  Deleted {} ({}); {} documents remain", d.filename, d.id, d.remaining_documents)
            })?;
        }
        Command::Stats => {
            emit(json, &engine.stats(), |s| {
                println!("Documents:  {}", s.total_documents);
                println!("Index size: {}", s.index_size);
                println!("Dimension:  {}", s.dimension);
                println!("Metric:     {}", s.metric);
            })?;
        }
        Command::Health { models } => {
            let health = engine.health();
            emit(json, &health, |h| {
                println!("Documents:       {}", h.documents);
                println!("Embedding model: {}", h.embedding_model);
                match &h.llm_model {
                    Some(m) => println!("LLM:             {} ({})", m, if h.llm_available { "reachable" } else { "unreachable" }),
                    None => println!("LLM:             disabled"),
                }
            })?;
            if models {
                let names = engine.llm_models()?;
                emit(json, &names, |names| names.iter().for_each(|n| println!("  - {}", n)))?;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<Error>().map(Error::kind) {
                Some(ErrorKind::NotFound) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
