//! # docx2adoc
//!
//! Convert Word documents to AsciiDoc using multimodal LLMs.
//!
//! ## Why this crate?
//!
//! Plain DOCX-to-text extraction throws away exactly what makes procedure
//! documentation useful — the screenshots, and *where* they sit in the
//! prose. This crate walks `word/document.xml` in native order, exports
//! every embedded image under a deterministic name, and hands the model an
//! interleaved sequence of text and screenshots so the reconstructed
//! AsciiDoc places each `image::` directive where the original figure was.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DOCX
//!  │
//!  ├─ 1. Sequence   walk the body in order → text / image / table units
//!  ├─ 2. Images     export media as <base>_imgNN.png
//!  ├─ 3. Payload    interleaved text + base64 PNG request parts
//!  ├─ 4. Generate   one whole-document LLM call (retry + timeout)
//!  └─ 5. Output     <base>.adoc per document
//!
//! then, separately:
//!
//! .adoc ─▶ backup ─▶ reconcile image:: refs ─▶ whitespace cleanup
//! ```
//!
//! The two phases are deliberately decoupled: conversion costs API tokens,
//! normalization is free and deterministic, so you can re-normalize as many
//! times as you like without re-converting.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx2adoc::{convert_batch, normalize_batch, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::from_yaml_file("config.yaml")?;
//!     let summary = convert_batch(&config).await?;
//!     eprintln!("{}/{} documents converted", summary.converted, summary.total_documents);
//!
//!     for outcome in normalize_batch(&config)? {
//!         eprintln!("{}: {} references fixed", outcome.path.display(),
//!             outcome.report.corrections.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docx2adoc` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docx2adoc = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod normalize;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, DEFAULT_MODEL};
pub use convert::{convert_batch, convert_batch_with, convert_document};
pub use error::Docx2AdocError;
pub use normalize::{normalize_batch, normalize_file, NormalizeOutcome, ReconcileReport};
pub use output::{BatchSummary, DocumentOutput, DocumentStats};
pub use package::DocxPackage;
pub use pipeline::sequence::{extract_sequence, ContentUnit};
pub use pipeline::service::{GenerationService, LlmGenerationService};
