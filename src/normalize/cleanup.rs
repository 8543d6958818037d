//! Deterministic whitespace cleanup for generated AsciiDoc.
//!
//! Generated markup tends to carry invisible debris: non-breaking spaces
//! pasted from source documents, literal tabs, trailing blanks, a missing
//! or tripled final newline. Each rule here is a pure string-to-string pass
//! and the whole chain is idempotent, so re-running normalization on an
//! already-clean file is a no-op.

/// Apply all cleanup rules in order.
pub fn cleanup(text: &str) -> String {
    let text = replace_nonbreaking_spaces(text);
    let text = expand_tabs(&text);
    let text = strip_trailing_whitespace(&text);
    ensure_single_final_newline(&text)
}

/// U+00A0 renders like a space but breaks AsciiDoc list/heading parsing.
fn replace_nonbreaking_spaces(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

/// Tabs become four spaces; AsciiDoc treats literal tabs inconsistently
/// across processors.
fn expand_tabs(text: &str) -> String {
    text.replace('\t', "    ")
}

fn strip_trailing_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.trim_end());
    }
    out
}

fn ensure_single_final_newline(text: &str) -> String {
    let trimmed = text.trim_end_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
