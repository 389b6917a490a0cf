//! pactmock interaction checker CLI
//!
//! Loads interaction files, runs each interaction through the same
//! validation and registration path a test suite would use, and reports
//! every interaction that fails.
//!
//! Usage:
//!   pactmock check <file_or_directory>... [OPTIONS]

use clap::{Parser, Subcommand};
use pactmock::backends::{InMemoryServer, MemoryStore};
use pactmock::control::port_from_value;
use pactmock::error::ConfigurationError;
use pactmock::{MockContext, MockControlPlane, MockSettings};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pactmock", author, version, about = "Mock interaction tooling")]
struct Args {
    /// YAML settings file (default_port, consumer)
    #[arg(short, long, env = "PACTMOCK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Default mock port, overrides the settings file
    #[arg(short, long, env = "PACTMOCK_PORT", global = true, value_parser = parse_port)]
    port: Option<u16>,

    /// Default consumer name, overrides the settings file
    #[arg(long, env = "PACTMOCK_CONSUMER", global = true)]
    consumer: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate interaction files (a JSON object or an array of objects)
    Check {
        /// Files or directories (non-recursive, *.json) to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Treat interactions as pact interactions instead of mocks
        #[arg(long)]
        pact: bool,

        /// Output format: text (default), json
        #[arg(short, long, default_value = "text")]
        output: String,
    },
}

#[derive(Debug, Serialize)]
struct Failure {
    file: String,
    /// Position in the file; absent when the file itself could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    message: String,
}

#[derive(Debug, Default, Serialize)]
struct Report {
    files_checked: usize,
    interactions_checked: usize,
    failures: Vec<Failure>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let mut settings = match &args.config {
        Some(path) => MockSettings::from_file(path)?,
        None => MockSettings::default(),
    };
    if let Some(port) = args.port {
        settings.default_port = port;
    }
    if let Some(consumer) = args.consumer {
        settings.consumer = consumer;
    }
    settings.validate()?;

    match args.command {
        Command::Check {
            paths,
            pact,
            output,
        } => {
            let report = check(&settings, &paths, pact).await?;
            match output.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                _ => print_text(&report),
            }
            Ok(report.failures.is_empty())
        }
    }
}

async fn check(settings: &MockSettings, paths: &[PathBuf], pact: bool) -> anyhow::Result<Report> {
    let server = Arc::new(InMemoryServer::new());
    let store = Arc::new(MemoryStore::new());
    let plane = MockControlPlane::new(server.clone(), store.clone());
    let mut ctx = MockContext::new(settings.clone());
    let mut report = Report::default();

    for file in collect_files(paths)? {
        report.files_checked += 1;
        let items = match load(&file) {
            Ok(items) => items,
            Err(e) => {
                report.failures.push(Failure {
                    file: file.display().to_string(),
                    index: None,
                    message: format!("{e:#}"),
                });
                continue;
            }
        };

        for (index, raw) in items.iter().enumerate() {
            report.interactions_checked += 1;
            let result = if pact {
                plane.add_default_pact_interaction(&mut ctx, raw).await
            } else {
                plane.add_default_mock_interaction(&ctx, raw).await
            };
            match result {
                Ok(id) => debug!(file = %file.display(), index, id = %id, "Interaction ok"),
                Err(e) => report.failures.push(Failure {
                    file: file.display().to_string(),
                    index: Some(index),
                    message: e.to_string(),
                }),
            }
        }
    }

    info!(
        registered = server.count(),
        pacts = store.len(),
        "Checked {} interaction(s)",
        report.interactions_checked
    );
    Ok(report)
}

/// Accepts the same forms as a raw `port` field, so `8080.0` is fine.
fn parse_port(arg: &str) -> Result<u16, ConfigurationError> {
    let value = serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()));
    port_from_value(&value)
}

fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn load(path: &Path) -> anyhow::Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

fn print_text(report: &Report) {
    for failure in &report.failures {
        match failure.index {
            Some(index) => println!("{}[{}]: {}", failure.file, index, failure.message),
            None => println!("{}: {}", failure.file, failure.message),
        }
    }
    println!(
        "{} file(s), {} interaction(s), {} failure(s)",
        report.files_checked,
        report.interactions_checked,
        report.failures.len()
    );
}
