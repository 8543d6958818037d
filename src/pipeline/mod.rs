//! Pipeline stages for DOCX-to-AsciiDoc conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. replace the generation backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! sequence ──▶ images ──▶ payload ──▶ service
//! (w:p / w:tbl)  (media)   (base64)   (LLM)
//! ```
//!
//! 1. [`sequence`] — walk `word/document.xml` in document order and emit the
//!    interleaved text/image/table unit list
//! 2. [`images`]   — copy embedded media blobs out of the package to the
//!    shared images directory
//! 3. [`payload`]  — package the ordered units into a multimodal request
//!    (text verbatim, images base64-wrapped)
//! 4. [`service`]  — drive the generation call with retry/backoff; the only
//!    stage with network I/O

pub mod images;
pub mod payload;
pub mod sequence;
pub mod service;
