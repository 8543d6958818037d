//! Payload assembly: content units → ordered multimodal request parts.
//!
//! The generation service receives one entry per content unit, in sequence
//! order — text units as literal text, image units as base64 PNG data. PNG
//! stays unrecompressed and lossless; text crispness in screenshots matters
//! far more than request size for faithful reconstruction.
//!
//! An image unit whose file is missing on disk (extraction failed earlier,
//! or the directory was cleaned between steps) is skipped with a warning
//! rather than failing the document.

use crate::pipeline::sequence::ContentUnit;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use std::path::Path;
use tracing::{debug, warn};

/// One ordered entry of the multimodal request.
#[derive(Debug, Clone)]
pub enum PayloadPart {
    /// Literal prose, sent as user text.
    Text(String),
    /// Inline-encoded image payload.
    Image(ImageData),
}

/// The single structured request handed to the generation service.
#[derive(Debug, Clone, Default)]
pub struct GenerationPayload {
    /// Ordered parts mirroring the content-unit sequence.
    pub parts: Vec<PayloadPart>,
}

impl GenerationPayload {
    /// Number of image parts in the payload.
    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, PayloadPart::Image(_)))
            .count()
    }

    /// Whether the payload carries no parts at all.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Package the ordered unit sequence into a generation request.
pub fn build_payload(units: &[ContentUnit], images_dir: &Path) -> GenerationPayload {
    let mut parts = Vec::with_capacity(units.len());

    for unit in units {
        match unit {
            ContentUnit::Text { content } => parts.push(PayloadPart::Text(content.clone())),
            ContentUnit::Image { file_name } => {
                let path = images_dir.join(file_name);
                match std::fs::read(&path) {
                    Ok(bytes) => {
                        let b64 = STANDARD.encode(&bytes);
                        debug!("Encoded {} → {} bytes base64", file_name, b64.len());
                        parts.push(PayloadPart::Image(
                            ImageData::new(b64, "image/png").with_detail("high"),
                        ));
                    }
                    Err(e) => {
                        warn!("Skipping payload image '{}': {e}", path.display());
                    }
                }
            }
        }
    }

    GenerationPayload { parts }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_preserves_unit_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc_img01.png"), b"\x89PNG bytes").unwrap();

        let units = vec![
            ContentUnit::Text { content: "Before".into() },
            ContentUnit::Image { file_name: "doc_img01.png".into() },
            ContentUnit::Text { content: "After".into() },
        ];

        let payload = build_payload(&units, dir.path());
        assert_eq!(payload.parts.len(), 3);
        assert!(matches!(&payload.parts[0], PayloadPart::Text(t) if t == "Before"));
        assert!(matches!(&payload.parts[1], PayloadPart::Image(_)));
        assert!(matches!(&payload.parts[2], PayloadPart::Text(t) if t == "After"));
        assert_eq!(payload.image_count(), 1);
    }

    #[test]
    fn image_part_is_valid_base64_png_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_img01.png"), b"pixels").unwrap();

        let units = vec![ContentUnit::Image { file_name: "a_img01.png".into() }];
        let payload = build_payload(&units, dir.path());

        let PayloadPart::Image(img) = &payload.parts[0] else {
            panic!("expected image part");
        };
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(STANDARD.decode(&img.data).unwrap(), b"pixels");
    }

    #[test]
    fn missing_image_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let units = vec![
            ContentUnit::Text { content: "kept".into() },
            ContentUnit::Image { file_name: "gone_img01.png".into() },
        ];

        let payload = build_payload(&units, dir.path());
        assert_eq!(payload.parts.len(), 1);
        assert_eq!(payload.image_count(), 0);
    }

    #[test]
    fn empty_sequence_yields_empty_payload() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_payload(&[], dir.path()).is_empty());
    }
}
