//! Output types for conversion results.

use serde::Serialize;

/// Result of converting one DOCX document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutput {
    /// Source file name (e.g. `onboarding.docx`).
    pub document: String,
    /// Path of the written `.adoc` file.
    pub output_path: std::path::PathBuf,
    /// The generated AsciiDoc content.
    pub asciidoc: String,
    /// Per-document statistics.
    pub stats: DocumentStats,
}

/// Statistics for one document's conversion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentStats {
    /// Text units extracted from the document body.
    pub text_units: usize,
    /// Images successfully extracted to the images directory.
    pub images_extracted: usize,
    /// Table placeholders emitted.
    pub tables_detected: usize,
    /// Wall-clock duration of the whole document, milliseconds.
    pub duration_ms: u64,
}

/// Summary of a batch conversion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Documents found in the input directory.
    pub total_documents: usize,
    /// Documents converted and written successfully.
    pub converted: usize,
    /// Documents that failed; the batch continued past them.
    pub failed: Vec<String>,
    /// Total wall-clock duration, milliseconds.
    pub total_duration_ms: u64,
}

impl BatchSummary {
    /// Whether every discovered document converted successfully.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.converted == self.total_documents
    }
}
