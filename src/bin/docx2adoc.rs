//! CLI binary for docx2adoc.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docx2adoc::{
    convert_document, normalize_batch, normalize_file, BatchSummary, ConversionConfig,
    LlmGenerationService, NormalizeOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every .docx in the configured input folder
  docx2adoc convert

  # Convert with an explicit config file and model
  docx2adoc convert --config ./config.yaml --model gpt-4.1

  # Fix image references and whitespace in one generated file
  docx2adoc normalize docs_asciidoc/onboarding.adoc

  # Normalize every .adoc in the output folder
  docx2adoc normalize-all

  # Machine-readable batch summary
  docx2adoc convert --json > summary.json

CONFIG FILE (config.yaml):
  openai:
    api_key: sk-...
  paths:
    input_folder: docs_input
    output_folder: docs_asciidoc
    images_folder: images_exported
  model: gpt-5

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY     Used when config.yaml carries no key
  RUST_LOG           Override the log filter (e.g. docx2adoc=debug)
"#;

/// Convert Word documents to AsciiDoc using multimodal LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "docx2adoc",
    version,
    about = "Convert Word documents to AsciiDoc using multimodal LLMs",
    long_about = "Extract text and screenshots from DOCX files in document order, reconstruct \
each document as AsciiDoc through a multimodal LLM, then repair the generated image:: \
references against the exported image files.",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the YAML configuration file.
    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every .docx in the input folder to .adoc.
    Convert {
        /// LLM model ID, overriding the config file.
        #[arg(long)]
        model: Option<String>,

        /// LLM provider name (openai, anthropic, ollama, ...).
        #[arg(long)]
        provider: Option<String>,

        /// Print the batch summary as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Backup, then fix image references and whitespace in one file.
    Normalize {
        /// The .adoc file to normalize in place.
        file: PathBuf,
    },

    /// Normalize every .adoc in the output folder.
    NormalizeAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Convert { ref model, ref provider, json } => {
            // Conversion needs credentials and paths; a missing config file
            // is a fatal startup condition with a message showing the fix.
            let mut config = ConversionConfig::from_yaml_file(&cli.config)?;
            if let Some(model) = model {
                config.model = model.clone();
            }
            config.provider_name = provider.clone();
            run_convert(&config, cli.quiet, json).await
        }
        Command::Normalize { ref file } => {
            let config = load_config_or_default(&cli)?;
            let outcome = normalize_file(file, &config)
                .with_context(|| format!("Failed to normalize {}", file.display()))?;
            if !cli.quiet {
                print_outcome(&outcome);
            }
            Ok(())
        }
        Command::NormalizeAll => {
            let config = load_config_or_default(&cli)?;
            let outcomes = normalize_batch(&config).context("Normalization batch failed")?;
            if !cli.quiet {
                for outcome in &outcomes {
                    print_outcome(outcome);
                }
                eprintln!("{} {} file(s) normalized", green("✔"), bold(&outcomes.len().to_string()));
            }
            Ok(())
        }
    }
}

/// Normalization only needs directory names, so a missing default config
/// file falls back to the built-in defaults. An explicitly named file must
/// still exist.
fn load_config_or_default(cli: &Cli) -> Result<ConversionConfig> {
    if cli.config == PathBuf::from("config.yaml") && !cli.config.exists() {
        return Ok(ConversionConfig::default());
    }
    ConversionConfig::from_yaml_file(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))
}

async fn run_convert(config: &ConversionConfig, quiet: bool, json: bool) -> Result<()> {
    let start = std::time::Instant::now();
    let service = LlmGenerationService::from_config(config).context("Provider setup failed")?;

    let documents = discover_documents(config)?;
    if documents.is_empty() {
        eprintln!(
            "No .docx files found in '{}'",
            config.input_dir.display()
        );
        return Ok(());
    }

    // The bar and JSON both claim stdout/stderr attention; JSON wins.
    let bar = if quiet || json {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(documents.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>2}/{len} documents  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    };

    let mut converted = 0usize;
    let mut failed: Vec<String> = Vec::new();

    for path in &documents {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        bar.set_message(name.clone());

        match convert_document(path, &service, config).await {
            Ok(output) => {
                converted += 1;
                bar.println(format!(
                    "  {} {:<30} {}",
                    green("✓"),
                    name,
                    dim(&format!(
                        "{} images, {:.1}s",
                        output.stats.images_extracted,
                        output.stats.duration_ms as f64 / 1000.0
                    )),
                ));
            }
            Err(e) => {
                failed.push(name.clone());
                bar.println(format!("  {} {:<30} {}", red("✗"), name, red(&e.to_string())));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if json {
        let summary = BatchSummary {
            total_documents: documents.len(),
            converted,
            failed: failed.clone(),
            total_duration_ms: start.elapsed().as_millis() as u64,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !quiet {
        if failed.is_empty() {
            eprintln!(
                "{} {} document(s) converted → {}",
                green("✔"),
                bold(&converted.to_string()),
                bold(&config.output_dir.display().to_string()),
            );
        } else {
            eprintln!(
                "{} {}/{} documents converted  ({} failed)",
                red("⚠"),
                bold(&converted.to_string()),
                documents.len(),
                red(&failed.len().to_string()),
            );
        }
    }

    if converted == 0 && !documents.is_empty() {
        anyhow::bail!("All {} document(s) failed to convert", documents.len());
    }
    Ok(())
}

/// Sorted `*.docx` files in the input directory, skipping Word `~$` lock
/// files.
fn discover_documents(config: &ConversionConfig) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(&config.input_dir)
        .with_context(|| format!("Input directory not found: {}", config.input_dir.display()))?;
    let mut documents: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|e| e.eq_ignore_ascii_case("docx"))
                .unwrap_or(false)
        })
        .filter(|p| {
            p.file_name()
                .map(|n| !n.to_string_lossy().starts_with("~$"))
                .unwrap_or(true)
        })
        .collect();
    documents.sort();
    Ok(documents)
}

fn print_outcome(outcome: &NormalizeOutcome) {
    let status = if outcome.changed { green("✓") } else { dim("·") };
    eprintln!(
        "  {} {:<40} {} exact, {} corrected, {} unresolved",
        status,
        outcome.path.display(),
        outcome.report.exact,
        outcome.report.corrections.len(),
        outcome.report.unresolved.len(),
    );
    for (from, to) in &outcome.report.corrections {
        eprintln!("      {} {from} → {to}", dim("fixed"));
    }
    for name in &outcome.report.unresolved {
        eprintln!("      {} {name}", red("unresolved"));
    }
}
