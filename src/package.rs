//! ZIP container access for DOCX packages.
//!
//! A DOCX file is an OOXML package: a ZIP archive holding XML parts plus
//! binary media. This module gives the extraction pipeline exactly the three
//! capabilities it needs — read an XML part, read a binary part, and look up
//! the relationship table that maps run-level `r:embed` ids to media paths —
//! without pretending to be a general OOXML parser.

use crate::error::Docx2AdocError;
use quick_xml::events::Event;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

/// Path of the main document part inside the package.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Path of the relationship table for the main document part.
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Relationship table of the main document part: id → target path.
///
/// Targets in the .rels file are relative to `word/` (e.g.
/// `media/image1.png`); [`Relationships::resolve_target`] returns the
/// archive-absolute path.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: HashMap<String, String>,
}

impl Relationships {
    /// Archive path for a relationship id, or `None` if the id is unknown.
    pub fn resolve_target(&self, id: &str) -> Option<String> {
        self.by_id.get(id).map(|target| {
            if let Some(stripped) = target.strip_prefix('/') {
                stripped.to_string()
            } else {
                format!("word/{target}")
            }
        })
    }

    /// Number of relationships in the table.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// An opened DOCX package.
pub struct DocxPackage {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
    relationships: Relationships,
}

impl DocxPackage {
    /// Open a DOCX package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Docx2AdocError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Docx2AdocError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let data = std::fs::read(path).map_err(|e| Docx2AdocError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(data).map_err(|e| match e {
            Docx2AdocError::Internal(detail) => Docx2AdocError::InvalidPackage {
                path: path.to_path_buf(),
                detail,
            },
            other => other,
        })
    }

    /// Open a DOCX package from in-memory bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, Docx2AdocError> {
        let archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| Docx2AdocError::Internal(e.to_string()))?;
        let mut package = Self {
            archive: RefCell::new(archive),
            relationships: Relationships::default(),
        };
        package.relationships = package.parse_document_relationships();
        Ok(package)
    }

    /// Relationship table of the main document part.
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Read an XML part from the archive as a UTF-8 string.
    pub fn read_xml(&self, part: &str) -> Result<String, Docx2AdocError> {
        let bytes = self.read_binary(part)?;
        // Tolerate a UTF-8 BOM; lossy decoding keeps a damaged part readable.
        let bytes = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            &bytes[3..]
        } else {
            &bytes[..]
        };
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a binary part from the archive.
    pub fn read_binary(&self, part: &str) -> Result<Vec<u8>, Docx2AdocError> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive.by_name(part).map_err(|_| Docx2AdocError::MissingPart {
            part: part.to_string(),
        })?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| Docx2AdocError::ReadFailed {
                path: part.into(),
                source: e,
            })?;
        Ok(data)
    }

    /// Check whether a part exists in the archive.
    pub fn contains(&self, part: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == part)
    }

    /// Parse `word/_rels/document.xml.rels` into an id → target map.
    ///
    /// A package without a relationship table is still processable (it just
    /// has no embedded images), so parse failures degrade to an empty table.
    fn parse_document_relationships(&self) -> Relationships {
        let xml = match self.read_xml(DOCUMENT_RELS_PART) {
            Ok(xml) => xml,
            Err(_) => return Relationships::default(),
        };

        let mut by_id = HashMap::new();
        let mut reader = quick_xml::Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut target = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }
                    if !id.is_empty() && !target.is_empty() {
                        by_id.insert(id, target);
                    }
                }
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        Relationships { by_id }
    }
}

impl std::fmt::Debug for DocxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxPackage")
            .field("parts", &self.archive.borrow().len())
            .field("relationships", &self.relationships.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_package(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in parts {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn resolve_target_prefixes_word_dir() {
        let rels = br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#;
        let data = build_package(&[
            ("word/document.xml", b"<w:document/>"),
            ("word/_rels/document.xml.rels", rels),
            ("word/media/image1.png", b"\x89PNG fake"),
        ]);

        let package = DocxPackage::from_bytes(data).unwrap();
        assert_eq!(
            package.relationships().resolve_target("rId5").as_deref(),
            Some("word/media/image1.png")
        );
        assert!(package.relationships().resolve_target("rId9").is_none());
    }

    #[test]
    fn resolve_target_handles_absolute_paths() {
        let rels = br#"<Relationships><Relationship Id="rId1" Target="/word/media/pic.png"/></Relationships>"#;
        let data = build_package(&[
            ("word/document.xml", b"<w:document/>"),
            ("word/_rels/document.xml.rels", rels),
        ]);

        let package = DocxPackage::from_bytes(data).unwrap();
        assert_eq!(
            package.relationships().resolve_target("rId1").as_deref(),
            Some("word/media/pic.png")
        );
    }

    #[test]
    fn missing_rels_yields_empty_table() {
        let data = build_package(&[("word/document.xml", b"<w:document/>")]);
        let package = DocxPackage::from_bytes(data).unwrap();
        assert!(package.relationships().is_empty());
    }

    #[test]
    fn read_binary_missing_part_errors() {
        let data = build_package(&[("word/document.xml", b"<w:document/>")]);
        let package = DocxPackage::from_bytes(data).unwrap();
        let err = package.read_binary("word/media/nope.png").unwrap_err();
        assert!(matches!(err, Docx2AdocError::MissingPart { .. }));
    }

    #[test]
    fn read_xml_strips_utf8_bom() {
        let mut doc = vec![0xEF, 0xBB, 0xBF];
        doc.extend_from_slice(b"<w:document/>");
        let data = build_package(&[("word/document.xml", &doc)]);
        let package = DocxPackage::from_bytes(data).unwrap();
        assert_eq!(package.read_xml(DOCUMENT_PART).unwrap(), "<w:document/>");
    }

    #[test]
    fn open_nonexistent_path_errors() {
        let err = DocxPackage::open("/no/such/file.docx").unwrap_err();
        assert!(matches!(err, Docx2AdocError::FileNotFound { .. }));
    }

    #[test]
    fn open_garbage_is_invalid_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-zip.docx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();
        let err = DocxPackage::open(&path).unwrap_err();
        assert!(matches!(err, Docx2AdocError::InvalidPackage { .. }));
    }
}
