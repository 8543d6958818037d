//! Sequence Builder: document-order extraction of text and images.
//!
//! The whole point of the intermediate representation is *interleaving*: the
//! generation service can only place figures correctly in the reconstructed
//! AsciiDoc if it receives text and images in the exact order a reader sees
//! them. So the builder streams `word/document.xml` events in their native
//! order instead of parsing text and media in separate passes.
//!
//! ## Ordering rules
//!
//! - A paragraph's trimmed text is emitted first (when non-empty), then one
//!   image unit per embedded picture, in run order.
//! - A body-level table collapses to a single placeholder text unit; its
//!   inner paragraphs and images are skipped. The model reconstructs tables
//!   from the surrounding narrative, not from cells.
//! - Image sequence numbers are 1-based, zero-padded, and dense: a picture
//!   whose extraction fails does not consume a number.
//!
//! ## Error policy
//!
//! Best-effort extraction. A failure while reading one paragraph or one
//! picture is logged and the unit dropped; traversal continues. Only a
//! missing or unopenable `word/document.xml` fails the document.

use crate::error::Docx2AdocError;
use crate::package::{DocxPackage, DOCUMENT_PART};
use crate::pipeline::images;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Placeholder emitted for a body-level table.
pub const TABLE_PLACEHOLDER: &str = "[Table detected here]";

/// One atomic piece of extracted document content, tagged and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentUnit {
    /// Non-empty trimmed prose from one paragraph-level block.
    Text { content: String },
    /// Reference to an image already persisted to the images directory.
    Image { file_name: String },
}

impl ContentUnit {
    /// Convenience accessor for the image filename, if this is an image unit.
    pub fn image_file_name(&self) -> Option<&str> {
        match self {
            ContentUnit::Image { file_name } => Some(file_name),
            ContentUnit::Text { .. } => None,
        }
    }
}

/// Compute the deterministic filename for the `n`-th image of a document.
///
/// `n` is 1-based; the sequence restarts for every document.
pub fn image_file_name(base_name: &str, n: u32) -> String {
    format!("{base_name}_img{n:02}.png")
}

/// Walk the document body in native order and produce the unit sequence.
///
/// Images are persisted to `images_dir` as a side effect; the returned
/// sequence references them by bare filename.
pub fn extract_sequence(
    package: &DocxPackage,
    base_name: &str,
    images_dir: &Path,
) -> Result<Vec<ContentUnit>, Docx2AdocError> {
    let xml = package.read_xml(DOCUMENT_PART)?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(false);

    let mut sequence = Vec::new();
    let mut image_counter: u32 = 0;

    let mut in_body = false;
    let mut table_depth: u32 = 0;
    let mut in_paragraph = false;
    let mut in_text_run = false;
    let mut paragraph_text = String::new();
    let mut paragraph_blips: Vec<String> = Vec::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:body" => in_body = true,
                b"w:tbl" if in_body => table_depth += 1,
                b"w:p" if in_body && table_depth == 0 => {
                    in_paragraph = true;
                    paragraph_text.clear();
                    paragraph_blips.clear();
                }
                b"w:t" if in_paragraph => in_text_run = true,
                b"a:blip" if in_paragraph => {
                    if let Some(id) = embed_id(e) {
                        paragraph_blips.push(id);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"a:blip" if in_paragraph => {
                    if let Some(id) = embed_id(e) {
                        paragraph_blips.push(id);
                    }
                }
                b"w:tab" if in_paragraph => paragraph_text.push('\t'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text_run => match e.unescape() {
                Ok(text) => paragraph_text.push_str(&text),
                Err(e) => warn!("Skipping unreadable text run: {e}"),
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:body" => in_body = false,
                b"w:t" => in_text_run = false,
                b"w:tbl" if table_depth > 0 => {
                    table_depth -= 1;
                    if table_depth == 0 {
                        sequence.push(ContentUnit::Text {
                            content: TABLE_PLACEHOLDER.to_string(),
                        });
                    }
                }
                b"w:p" if in_paragraph && table_depth == 0 => {
                    in_paragraph = false;
                    flush_paragraph(
                        package,
                        base_name,
                        images_dir,
                        &mut sequence,
                        &mut image_counter,
                        &paragraph_text,
                        &paragraph_blips,
                    );
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                // Partial extraction beats total failure on malformed XML.
                warn!("Stopping traversal on XML error: {e}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "Extracted {} units ({} images) from '{}'",
        sequence.len(),
        image_counter,
        base_name
    );
    Ok(sequence)
}

/// Emit one paragraph's units: text first, then its images in run order.
fn flush_paragraph(
    package: &DocxPackage,
    base_name: &str,
    images_dir: &Path,
    sequence: &mut Vec<ContentUnit>,
    image_counter: &mut u32,
    paragraph_text: &str,
    paragraph_blips: &[String],
) {
    let text = paragraph_text.trim();
    if !text.is_empty() {
        sequence.push(ContentUnit::Text {
            content: text.to_string(),
        });
    }

    for rel_id in paragraph_blips {
        let file_name = image_file_name(base_name, *image_counter + 1);
        let dest = images_dir.join(&file_name);
        match images::extract_image(package, rel_id, &dest) {
            Ok(()) => {
                *image_counter += 1;
                sequence.push(ContentUnit::Image { file_name });
            }
            Err(e) => {
                warn!("Skipping image '{rel_id}' in '{base_name}': {e}");
            }
        }
    }
}

/// Pull the `r:embed` relationship id off an `a:blip` element.
fn embed_id(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"embed")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}
