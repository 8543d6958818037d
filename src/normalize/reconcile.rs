//! Reference reconciliation: repair `image::` directives against the files
//! that actually exist.
//!
//! The generation service reproduces image file names from what it saw in
//! the payload, and it gets them almost right: transposed letters, dropped
//! characters, a stray directory prefix. This pass rewrites every
//! `image::<target>[<description>]` directive so the target names a real
//! file in the images directory, using exact matching first and bounded
//! fuzzy matching second. Descriptions are never touched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use strsim::{levenshtein, normalized_levenshtein};
use tracing::{debug, warn};

/// Minimum normalized similarity for a fuzzy correction. Below this the
/// reference is left as-is and reported unresolved.
pub const FUZZY_CUTOFF: f64 = 0.6;

static IMAGE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"image::([^\[]+)\[([^\]]*)\]").unwrap());

/// Outcome of reconciling one file's image references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// References that already named an existing file.
    pub exact: usize,
    /// Rewritten references as `(from, to)` pairs.
    pub corrections: Vec<(String, String)>,
    /// Referenced names with no acceptable match; left unchanged in the text.
    pub unresolved: Vec<String>,
}

impl ReconcileReport {
    /// Total directives examined.
    pub fn total(&self) -> usize {
        self.exact + self.corrections.len() + self.unresolved.len()
    }
}

/// Rewrite image references in `text` against the contents of `images_dir`.
///
/// Returns the rewritten text and a report. A missing or unreadable images
/// directory is not an error: the text comes back unchanged with an empty
/// report, because the author may simply not have exported images yet.
pub fn reconcile_references(text: &str, images_dir: &Path) -> (String, ReconcileReport) {
    let available = match list_image_files(images_dir) {
        Some(files) => files,
        None => {
            warn!(
                "Images directory '{}' not found, skipping reference reconciliation",
                images_dir.display()
            );
            return (text.to_string(), ReconcileReport::default());
        }
    };

    let mut report = ReconcileReport::default();
    let rewritten = IMAGE_DIRECTIVE.replace_all(text, |caps: &Captures<'_>| {
        let target = caps[1].trim();
        let description = &caps[2];
        // Strip any directory prefix the model invented; only the base name
        // can be matched against the flat images directory.
        let base = target.rsplit(['/', '\\']).next().unwrap_or(target);

        if available.iter().any(|f| f == base) {
            report.exact += 1;
            return format!("image::{base}[{description}]");
        }

        match best_fuzzy_match(base, &available) {
            Some(matched) => {
                debug!("Corrected image reference '{base}' → '{matched}'");
                report
                    .corrections
                    .push((base.to_string(), matched.to_string()));
                format!("image::{matched}[{description}]")
            }
            None => {
                warn!("Unresolved image reference '{base}'");
                report.unresolved.push(base.to_string());
                caps[0].to_string()
            }
        }
    });

    (rewritten.into_owned(), report)
}

/// Sorted list of file names in the images directory, or `None` when the
/// directory cannot be read.
fn list_image_files(images_dir: &Path) -> Option<Vec<String>> {
    let entries = std::fs::read_dir(images_dir).ok()?;
    let mut files: Vec<String> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    Some(files)
}

/// Best candidate above [`FUZZY_CUTOFF`], or `None`.
///
/// Ties break deterministically: highest similarity, then smallest raw edit
/// distance, then lexicographically smallest name. Given the same text and
/// the same directory contents, the answer never varies between runs.
fn best_fuzzy_match<'a>(reference: &str, candidates: &'a [String]) -> Option<&'a str> {
    let mut best: Option<(&str, f64, usize)> = None;
    for candidate in candidates {
        let score = normalized_levenshtein(reference, candidate);
        if score < FUZZY_CUTOFF {
            continue;
        }
        let distance = levenshtein(reference, candidate);
        let better = match best {
            None => true,
            Some((name, s, d)) => {
                score > s
                    || (score == s && distance < d)
                    || (score == s && distance == d && candidate.as_str() < name)
            }
        };
        if better {
            best = Some((candidate, score, distance));
        }
    }
    best.map(|(name, _, _)| name)
}
