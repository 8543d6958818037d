//! Integration tests for the extraction-to-output path.
//!
//! Each test builds a synthetic DOCX package in a temp directory and runs it
//! through the real pipeline with a deterministic generation service, so no
//! network access or API key is needed.

use async_trait::async_trait;
use docx2adoc::pipeline::payload::GenerationPayload;
use docx2adoc::{
    convert_batch_with, convert_document, ConversionConfig, ContentUnit, Docx2AdocError,
    DocxPackage, GenerationService,
};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use zip::write::SimpleFileOptions;

const PNG_STUB: &[u8] = b"\x89PNG\r\n\x1a\nnot real pixels";

// ── Test helpers ─────────────────────────────────────────────────────────────

struct DocxBuilder {
    body: String,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    fn new() -> Self {
        Self {
            body: String::new(),
            media: Vec::new(),
        }
    }

    fn paragraph(mut self, text: &str) -> Self {
        self.body
            .push_str(&format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"));
        self
    }

    fn image(mut self) -> Self {
        let n = self.media.len() + 1;
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:drawing><a:blip r:embed="rId{n}"/></w:drawing></w:r></w:p>"#
        ));
        self.media.push((format!("image{n}.png"), PNG_STUB.to_vec()));
        self
    }

    fn table(mut self, cells: &[&str]) -> Self {
        self.body.push_str("<w:tbl><w:tr>");
        for cell in cells {
            self.body.push_str(&format!(
                "<w:tc><w:p><w:r><w:t>{cell}</w:t></w:r></w:p></w:tc>"
            ));
        }
        self.body.push_str("</w:tr></w:tbl>");
        self
    }

    fn bytes(self) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(
                format!("<w:document><w:body>{}</w:body></w:document>", self.body).as_bytes(),
            )
            .unwrap();

        let mut rels = String::from("<Relationships>");
        for (i, (name, _)) in self.media.iter().enumerate() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Target="media/{name}"/>"#,
                i + 1
            ));
        }
        rels.push_str("</Relationships>");
        writer
            .start_file("word/_rels/document.xml.rels", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(rels.as_bytes()).unwrap();

        for (name, bytes) in &self.media {
            writer
                .start_file(format!("word/media/{name}"), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn write_to(self, path: &Path) {
        std::fs::write(path, self.bytes()).unwrap();
    }
}

/// Records every submission and replies with a fixed document.
struct RecordingService {
    payloads: Mutex<Vec<(String, GenerationPayload)>>,
    reply: String,
}

impl RecordingService {
    fn new(reply: &str) -> Self {
        Self {
            payloads: Mutex::new(Vec::new()),
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl GenerationService for RecordingService {
    async fn submit(
        &self,
        document: &str,
        payload: &GenerationPayload,
    ) -> Result<String, Docx2AdocError> {
        self.payloads
            .lock()
            .unwrap()
            .push((document.to_string(), payload.clone()));
        Ok(self.reply.clone())
    }
}

fn config_under(root: &Path) -> ConversionConfig {
    let config = ConversionConfig::builder()
        .input_dir(root.join("docs_input"))
        .output_dir(root.join("docs_asciidoc"))
        .build()
        .unwrap();
    std::fs::create_dir_all(&config.input_dir).unwrap();
    config
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn sequence_interleaves_text_images_and_tables_in_document_order() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = DocxBuilder::new()
        .paragraph("Welcome to the tool.")
        .image()
        .paragraph("Fill in the form:")
        .table(&["Field", "Value"])
        .paragraph("Then press Save.")
        .image()
        .bytes();

    let package = DocxPackage::from_bytes(bytes).unwrap();
    let units = docx2adoc::extract_sequence(&package, "manual", dir.path()).unwrap();

    let kinds: Vec<&str> = units
        .iter()
        .map(|u| match u {
            ContentUnit::Text { content } if content == "[Table detected here]" => "table",
            ContentUnit::Text { .. } => "text",
            ContentUnit::Image { .. } => "image",
        })
        .collect();
    assert_eq!(kinds, vec!["text", "image", "text", "table", "text", "image"]);

    // Images land on disk under their announced names.
    assert!(dir.path().join("manual_img01.png").exists());
    assert!(dir.path().join("manual_img02.png").exists());
}

#[tokio::test]
async fn convert_document_submits_ordered_payload_and_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_under(dir.path());
    let docx = config.input_dir.join("guide.docx");
    DocxBuilder::new()
        .paragraph("Step one.")
        .image()
        .paragraph("Step two.")
        .write_to(&docx);

    let service = RecordingService::new("= Guide\n\nimage::guide_img01.png[Step]\n");
    let output = convert_document(&docx, &service, &config).await.unwrap();

    assert_eq!(output.stats.text_units, 2);
    assert_eq!(output.stats.images_extracted, 1);
    assert_eq!(
        std::fs::read_to_string(config.output_dir.join("guide.adoc")).unwrap(),
        "= Guide\n\nimage::guide_img01.png[Step]\n"
    );

    // The service saw one submission whose image part sits between the two
    // text units (with its filename announcement directly before it).
    let payloads = service.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    let (document, payload) = &payloads[0];
    assert_eq!(document, "guide.docx");
    assert_eq!(payload.parts.len(), 4);
    assert_eq!(payload.image_count(), 1);
}

#[tokio::test]
async fn converted_images_are_shared_across_the_batch_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_under(dir.path());
    DocxBuilder::new()
        .paragraph("Doc A")
        .image()
        .write_to(&config.input_dir.join("alpha.docx"));
    DocxBuilder::new()
        .paragraph("Doc B")
        .image()
        .write_to(&config.input_dir.join("beta.docx"));

    let service = RecordingService::new("= Out\n");
    let summary = convert_batch_with(&service, &config).await.unwrap();

    assert!(summary.all_succeeded());
    // Per-document counters restart at 01; names never collide because the
    // base name differs.
    let images = config.images_dir();
    assert!(images.join("alpha_img01.png").exists());
    assert!(images.join("beta_img01.png").exists());
}

#[tokio::test]
async fn rerun_overwrites_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_under(dir.path());
    let docx = config.input_dir.join("doc.docx");
    DocxBuilder::new().paragraph("Content").write_to(&docx);

    let first = RecordingService::new("= First\n");
    convert_document(&docx, &first, &config).await.unwrap();
    let second = RecordingService::new("= Second\n");
    convert_document(&docx, &second, &config).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(config.output_dir.join("doc.adoc")).unwrap(),
        "= Second\n"
    );
}

#[tokio::test]
async fn invalid_package_fails_that_document_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_under(dir.path());
    std::fs::write(config.input_dir.join("bad.docx"), b"zip? no").unwrap();
    DocxBuilder::new()
        .paragraph("fine")
        .write_to(&config.input_dir.join("good.docx"));

    let service = RecordingService::new("= Ok\n");
    let summary = convert_batch_with(&service, &config).await.unwrap();

    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, vec!["bad.docx".to_string()]);
    assert!(config.output_dir.join("good.adoc").exists());
    assert!(!config.output_dir.join("bad.adoc").exists());
}
