//! `filerow` CLI: run a file-to-row stage and emit NDJSON records.

mod ndjson;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use filerow::{
    FileRowStage, LocalFileSystem, OutputFormat, PlainTextExtractor, Produced, StageConfig,
};
use ndjson::NdjsonStream;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI enum for the extraction output format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Text,
    Html,
    Xml,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => OutputFormat::Text,
            CliFormat::Html => OutputFormat::Html,
            CliFormat::Xml => OutputFormat::Xml,
        }
    }
}

#[derive(Parser)]
#[command(name = "filerow")]
#[command(about = "Extract file content and metadata into one NDJSON record per file", long_about = None)]
struct Cli {
    /// Files to process (static mode)
    files: Vec<String>,

    /// Config file (.toml, .yaml/.yml, or .json); defaults to a discovered
    /// filerow.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Streamed mode: read NDJSON records from stdin and take filenames
    /// from this field
    #[arg(long, value_name = "FIELD", conflicts_with = "files")]
    stdin_field: Option<String>,

    /// Extraction output format
    #[arg(long, value_enum)]
    format: Option<CliFormat>,

    /// Stop after this many rows
    #[arg(long)]
    row_limit: Option<u64>,

    /// Skip zero-byte files
    #[arg(long)]
    ignore_empty: bool,

    /// Route per-row failures to stderr instead of aborting
    #[arg(long)]
    route_errors: bool,

    /// Per-file extraction buffer limit in bytes
    #[arg(long)]
    max_bytes: Option<u64>,

    /// Print run counters to stderr when done
    #[arg(long)]
    stats: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let extractor: Box<PlainTextExtractor> = match cli.max_bytes {
        Some(limit) => Box::new(PlainTextExtractor::with_max_bytes(limit)),
        None => Box::new(PlainTextExtractor::new()),
    };
    let fs = Box::new(LocalFileSystem::new());

    let mut stage = if cli.stdin_field.is_some() {
        let stream = NdjsonStream::new(std::io::stdin().lock()).context("reading stdin")?;
        FileRowStage::from_stream(Box::new(stream), fs, extractor, config)?
    } else {
        if cli.files.is_empty() {
            bail!("no input: pass files as arguments or use --stdin-field");
        }
        FileRowStage::from_files(cli.files.clone(), fs, extractor, config)?
    };

    let column_names: Vec<String> = stage
        .output_schema()
        .columns
        .iter()
        .map(|c| c.name.clone())
        .collect();
    debug!(columns = ?column_names, "output schema resolved");

    let stdout = std::io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    loop {
        match stage.produce_one()? {
            Produced::Row(row) => {
                let mut object = serde_json::Map::with_capacity(row.len());
                for (name, value) in column_names.iter().zip(&row) {
                    object.insert(name.clone(), serde_json::to_value(value)?);
                }
                serde_json::to_writer(&mut out, &object)?;
                out.write_all(b"\n")?;
            }
            Produced::RoutedError(record) => {
                eprintln!("{}", serde_json::to_string(&record)?);
            }
            Produced::EndOfStream => break,
        }
    }
    out.flush()?;

    if cli.stats {
        let stats = stage.stats();
        eprintln!("{}", serde_json::to_string(&stats)?);
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<StageConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => StageConfig::discover()?.unwrap_or_default(),
    };

    if let Some(format) = cli.format {
        config.output_format = format.into();
    }
    if let Some(limit) = cli.row_limit {
        config.row_limit = Some(limit);
    }
    if cli.ignore_empty {
        config.ignore_empty_files = true;
    }
    if cli.route_errors {
        config.route_errors = true;
    }
    if let Some(field) = &cli.stdin_field {
        config.filename_field = Some(field.clone());
    }

    Ok(config)
}

fn load_config(path: &PathBuf) -> anyhow::Result<StageConfig> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let config = match extension {
        "toml" => StageConfig::from_toml_file(path)?,
        "yaml" | "yml" => StageConfig::from_yaml_file(path)?,
        "json" => StageConfig::from_json_file(path)?,
        other => bail!("unsupported config extension: {other:?} (expected toml, yaml, or json)"),
    };
    Ok(config)
}
