//! Error types for the docx2adoc library.
//!
//! Only conditions that stop a whole operation live here. Per-unit extraction
//! failures (one unreadable paragraph, one missing image relationship) are
//! deliberately *not* represented: the extraction pipeline logs them and
//! drops the offending unit, because partial extraction of a malformed
//! document is preferable to losing the document entirely. Likewise an
//! unresolved image reference during normalization is a warning carried in
//! [`crate::normalize::ReconcileReport`], never an `Err`.
//!
//! The one hard rule going the other way: a backup failure is always fatal
//! for that file's normalization. Mutating a markup file without a safety
//! copy is disallowed, so [`Docx2AdocError::BackupFailed`] must abort before
//! any write to the original.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docx2adoc library.
#[derive(Debug, Error)]
pub enum Docx2AdocError {
    // ── Configuration errors ─────────────────────────────────────────────
    /// The YAML configuration file does not exist.
    #[error(
        "Configuration file not found: '{path}'\n\
Create a config.yaml at the project root with this content:\n\n\
openai:\n  api_key: sk-xxxx\n\
paths:\n  input_folder: docs_input\n  output_folder: docs_asciidoc\n  images_folder: images_exported\n\
model: gpt-5\n"
    )]
    ConfigNotFound { path: PathBuf },

    /// The configuration file exists but could not be parsed.
    #[error("Invalid configuration file '{path}': {detail}")]
    ConfigInvalid { path: PathBuf, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The configured input directory does not exist.
    #[error("Input directory not found: '{path}'")]
    InputDirMissing { path: PathBuf },

    /// The file exists but is not a readable DOCX package.
    #[error("Not a valid DOCX package: '{path}': {detail}")]
    InvalidPackage { path: PathBuf, detail: String },

    /// A required part of the DOCX package is missing (e.g. word/document.xml).
    #[error("Missing package part '{part}'")]
    MissingPart { part: String },

    /// XML inside the package could not be parsed.
    #[error("XML parse error in '{part}': {detail}")]
    XmlParse { part: String, detail: String },

    // ── Generation-service errors ────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The generation service failed after all retries.
    #[error("Generation failed for '{document}' after {retries} retries: {detail}")]
    GenerationFailed {
        document: String,
        retries: u32,
        detail: String,
    },

    /// The generation-service call exceeded the configured timeout.
    #[error("Generation call timed out after {secs}s for '{document}'\nIncrease --api-timeout.")]
    GenerationTimeout { document: String, secs: u64 },

    // ── Normalization errors ─────────────────────────────────────────────
    /// Creating the pre-mutation backup copy failed. The original file must
    /// not be touched when this is returned.
    #[error("Failed to back up '{path}' before normalization: {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── I/O errors ───────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read a file that was expected to exist.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
