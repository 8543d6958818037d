//! Per-document conversion and the batch driver.
//!
//! One document flows through four stages: extract the ordered unit
//! sequence (persisting images as a side effect), annotate each image with
//! its file name so the model can reference it, package the sequence into a
//! multimodal payload, and submit it to the generation service. The raw
//! response is written as `<base>.adoc`; reference reconciliation happens
//! later, in the separate normalization step.
//!
//! Documents are processed sequentially. The batch is bound by the LLM
//! calls, one whole-document request at a time, and sequential processing
//! keeps logs readable and rate limits trivial.

use crate::config::ConversionConfig;
use crate::error::Docx2AdocError;
use crate::output::{BatchSummary, DocumentOutput, DocumentStats};
use crate::package::DocxPackage;
use crate::pipeline::payload::build_payload;
use crate::pipeline::sequence::{extract_sequence, ContentUnit, TABLE_PLACEHOLDER};
use crate::pipeline::service::{GenerationService, LlmGenerationService};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Convert a single DOCX file to AsciiDoc and write `<base>.adoc` into the
/// configured output directory, overwriting any previous version.
pub async fn convert_document(
    path: &Path,
    service: &dyn GenerationService,
    config: &ConversionConfig,
) -> Result<DocumentOutput, Docx2AdocError> {
    let start = Instant::now();
    let document = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let base_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    info!("Converting '{document}'");

    let package = DocxPackage::open(path)?;
    let images_dir = config.images_dir();
    let units = extract_sequence(&package, &base_name, &images_dir)?;

    let stats = DocumentStats {
        text_units: units
            .iter()
            .filter(|u| matches!(u, ContentUnit::Text { content } if content != TABLE_PLACEHOLDER))
            .count(),
        images_extracted: units.iter().filter(|u| u.image_file_name().is_some()).count(),
        tables_detected: units
            .iter()
            .filter(|u| matches!(u, ContentUnit::Text { content } if content == TABLE_PLACEHOLDER))
            .count(),
        duration_ms: 0,
    };

    let payload = build_payload(&annotate_images(&units), &images_dir);

    let asciidoc = if payload.is_empty() {
        warn!("'{document}' produced no content units, writing empty output");
        String::new()
    } else {
        service.submit(&document, &payload).await?
    };

    let output_path = write_output(&asciidoc, &base_name, config)?;
    let stats = DocumentStats {
        duration_ms: start.elapsed().as_millis() as u64,
        ..stats
    };
    info!(
        "Wrote {} ({} text units, {} images, {}ms)",
        output_path.display(),
        stats.text_units,
        stats.images_extracted,
        stats.duration_ms
    );

    Ok(DocumentOutput {
        document,
        output_path,
        asciidoc,
        stats,
    })
}

/// Convert every `*.docx` in the configured input directory, building the
/// generation service from the configuration.
pub async fn convert_batch(config: &ConversionConfig) -> Result<BatchSummary, Docx2AdocError> {
    let service = LlmGenerationService::from_config(config)?;
    convert_batch_with(&service, config).await
}

/// Convert every `*.docx` in the configured input directory using the given
/// service.
///
/// Files are processed in sorted order so runs are reproducible. A
/// per-document failure is logged and recorded in the summary; the batch
/// continues. Only a missing input directory is fatal.
pub async fn convert_batch_with(
    service: &dyn GenerationService,
    config: &ConversionConfig,
) -> Result<BatchSummary, Docx2AdocError> {
    let start = Instant::now();
    let documents = discover_documents(&config.input_dir)?;
    info!(
        "Found {} document(s) in '{}'",
        documents.len(),
        config.input_dir.display()
    );

    let mut summary = BatchSummary {
        total_documents: documents.len(),
        ..Default::default()
    };

    for path in &documents {
        match convert_document(path, service, config).await {
            Ok(_) => summary.converted += 1,
            Err(e) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                warn!("Skipping '{name}': {e}");
                summary.failed.push(name);
            }
        }
    }

    summary.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {}/{} converted in {}ms",
        summary.converted, summary.total_documents, summary.total_duration_ms
    );
    Ok(summary)
}

/// Sorted list of `*.docx` files in the input directory.
fn discover_documents(input_dir: &Path) -> Result<Vec<PathBuf>, Docx2AdocError> {
    let entries = std::fs::read_dir(input_dir).map_err(|_| Docx2AdocError::InputDirMissing {
        path: input_dir.to_path_buf(),
    })?;

    let mut documents: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|e| e.eq_ignore_ascii_case("docx"))
                .unwrap_or(false)
        })
        // Word lock files start with ~$ and are not real documents.
        .filter(|p| {
            p.file_name()
                .map(|n| !n.to_string_lossy().starts_with("~$"))
                .unwrap_or(true)
        })
        .collect();
    documents.sort();
    Ok(documents)
}

/// Prefix each image unit with a text unit naming its file, so the model
/// can emit the matching `image::` directive.
fn annotate_images(units: &[ContentUnit]) -> Vec<ContentUnit> {
    let mut annotated = Vec::with_capacity(units.len() * 2);
    for unit in units {
        if let Some(name) = unit.image_file_name() {
            annotated.push(ContentUnit::Text {
                content: format!("Image file: {name}"),
            });
        }
        annotated.push(unit.clone());
    }
    annotated
}

/// Write the generated AsciiDoc as `<base>.adoc`, creating the output
/// directory on demand.
///
/// Atomic write (temp file + rename) so a crash never leaves a partial
/// `.adoc` that a later normalization run would quietly mangle.
fn write_output(
    asciidoc: &str,
    base_name: &str,
    config: &ConversionConfig,
) -> Result<PathBuf, Docx2AdocError> {
    std::fs::create_dir_all(&config.output_dir).map_err(|e| Docx2AdocError::OutputWriteFailed {
        path: config.output_dir.clone(),
        source: e,
    })?;
    let output_path = config.output_dir.join(format!("{base_name}.adoc"));
    let tmp_path = config.output_dir.join(format!("{base_name}.adoc.tmp"));
    std::fs::write(&tmp_path, asciidoc).map_err(|e| Docx2AdocError::OutputWriteFailed {
        path: output_path.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, &output_path).map_err(|e| Docx2AdocError::OutputWriteFailed {
        path: output_path.clone(),
        source: e,
    })?;
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::payload::GenerationPayload;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Deterministic stand-in that records submitted documents.
    struct EchoService {
        submissions: Mutex<Vec<(String, usize)>>,
    }

    impl EchoService {
        fn new() -> Self {
            Self {
                submissions: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationService for EchoService {
        async fn submit(
            &self,
            document: &str,
            payload: &GenerationPayload,
        ) -> Result<String, Docx2AdocError> {
            self.submissions
                .lock()
                .unwrap()
                .push((document.to_string(), payload.parts.len()));
            Ok(format!("= Generated from {document}\n"))
        }
    }

    struct FailingService;

    #[async_trait]
    impl GenerationService for FailingService {
        async fn submit(
            &self,
            document: &str,
            _payload: &GenerationPayload,
        ) -> Result<String, Docx2AdocError> {
            Err(Docx2AdocError::GenerationFailed {
                document: document.to_string(),
                retries: 0,
                detail: "stub failure".into(),
            })
        }
    }

    fn write_minimal_docx(path: &Path, text: &str) {
        use std::io::Write;
        use zip::write::SimpleFileOptions;
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(
                format!(
                    "<w:document><w:body><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:body></w:document>"
                )
                .as_bytes(),
            )
            .unwrap();
        std::fs::write(path, writer.finish().unwrap().into_inner()).unwrap();
    }

    fn test_config(root: &Path) -> ConversionConfig {
        ConversionConfig::builder()
            .input_dir(root.join("docs_input"))
            .output_dir(root.join("docs_asciidoc"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn convert_document_writes_adoc_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        let docx = config.input_dir.join("guide.docx");
        write_minimal_docx(&docx, "Hello world");

        let service = EchoService::new();
        let output = convert_document(&docx, &service, &config).await.unwrap();

        assert_eq!(output.document, "guide.docx");
        assert_eq!(output.stats.text_units, 1);
        assert_eq!(
            std::fs::read_to_string(&output.output_path).unwrap(),
            "= Generated from guide.docx\n"
        );
        assert_eq!(service.submissions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn batch_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        write_minimal_docx(&config.input_dir.join("a.docx"), "A");
        std::fs::write(config.input_dir.join("broken.docx"), b"not a zip").unwrap();
        write_minimal_docx(&config.input_dir.join("c.docx"), "C");

        let service = EchoService::new();
        let summary = convert_batch_with(&service, &config).await.unwrap();

        assert_eq!(summary.total_documents, 3);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed, vec!["broken.docx".to_string()]);
        assert!(!summary.all_succeeded());
    }

    #[tokio::test]
    async fn batch_skips_lock_files_and_non_docx() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        write_minimal_docx(&config.input_dir.join("real.docx"), "content");
        std::fs::write(config.input_dir.join("~$real.docx"), b"lock").unwrap();
        std::fs::write(config.input_dir.join("notes.txt"), b"text").unwrap();

        let summary = convert_batch_with(&EchoService::new(), &config).await.unwrap();
        assert_eq!(summary.total_documents, 1);
        assert_eq!(summary.converted, 1);
    }

    #[tokio::test]
    async fn batch_missing_input_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        // input_dir never created
        let err = convert_batch_with(&EchoService::new(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Docx2AdocError::InputDirMissing { .. }));
    }

    #[tokio::test]
    async fn generation_failure_propagates_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        let docx = config.input_dir.join("doc.docx");
        write_minimal_docx(&docx, "text");

        let err = convert_document(&docx, &FailingService, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Docx2AdocError::GenerationFailed { .. }));
        // No partial output file.
        assert!(!config.output_dir.join("doc.adoc").exists());
    }

    #[test]
    fn annotate_images_precedes_each_image_with_its_name() {
        let units = vec![
            ContentUnit::Text { content: "intro".into() },
            ContentUnit::Image { file_name: "doc_img01.png".into() },
        ];
        let annotated = annotate_images(&units);
        assert_eq!(annotated.len(), 3);
        assert_eq!(
            annotated[1],
            ContentUnit::Text { content: "Image file: doc_img01.png".into() }
        );
    }
}
