//! PDF text extraction and markdown normalization.
//!
//! Text is extracted with `pdf-extract` on a blocking thread and then
//! normalized: heading-like lines become `#` / `##` headings and lines whose
//! cells are separated by wide gaps become pipe-delimited table rows.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{ComplianceError, Result};

/// Placeholder emitted for PDFs that contain no extractable text.
pub const NO_TEXT_PLACEHOLDER: &str =
    "*[PDF contains no extractable text - may be image-based or encrypted]*";

const MAX_HEADING_LEN: usize = 80;

/// Words allowed to stay lowercase inside a title-case heading.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "per", "the", "to", "with",
];

static CELL_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s{2,}|\t").expect("unreachable error: invalid cell gap pattern")
});
static NUMBERED_TOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.?\s+\S").expect("unreachable error: invalid numbered heading pattern")
});
static NUMBERED_SUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+").expect("unreachable error: invalid sub-heading pattern")
});

/// Extract the text of a PDF and normalize it to markdown.
///
/// # Errors
///
/// Returns [`ComplianceError::Parse`] if the file cannot be opened or decoded.
pub async fn extract_markdown(path: &Path) -> Result<String> {
    let owned = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
        .await
        .map_err(|e| ComplianceError::parse(path, format!("extraction task failed: {e}")))?
        .map_err(|e| ComplianceError::parse(path, format!("PDF extraction error: {e}")))?;

    debug!(path = %path.display(), text_len = text.len(), "extracted PDF text");

    if text.trim().is_empty() {
        return Ok(NO_TEXT_PLACEHOLDER.to_string());
    }
    Ok(pdf_text_to_markdown(&text))
}

/// Normalize raw extracted PDF text to markdown.
///
/// Headings are recognized before tables. A table starts only where two
/// consecutive lines split into the same number of gap-separated cells and
/// continues while rows keep that width.
pub fn pdf_text_to_markdown(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let mut markdown = String::new();
    let mut table_width: Option<usize> = None;

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();

        if line.is_empty() {
            table_width = None;
            if !markdown.is_empty() && !markdown.ends_with("\n\n") {
                markdown.push('\n');
            }
            continue;
        }

        if let Some(width) = table_width {
            match table_cells(line) {
                Some(cells) if cells.len() == width => {
                    markdown.push_str(&table_row(&cells));
                    continue;
                }
                _ => {
                    table_width = None;
                    markdown.push('\n');
                }
            }
        }

        if let Some(level) = heading_level(&lines, i) {
            if !markdown.is_empty() && !markdown.ends_with("\n\n") {
                markdown.push('\n');
            }
            let title = line.split_whitespace().collect::<Vec<_>>().join(" ");
            markdown.push_str(&format!("{} {title}\n\n", "#".repeat(level)));
            continue;
        }

        if let Some(cells) = table_cells(line) {
            let next_width =
                lines.get(i + 1).and_then(|next| table_cells(next.trim())).map(|c| c.len());
            if next_width == Some(cells.len()) {
                if !markdown.is_empty() && !markdown.ends_with("\n\n") {
                    markdown.push('\n');
                }
                markdown.push_str(&table_row(&cells));
                markdown.push_str(&table_row(&vec!["---".to_string(); cells.len()]));
                table_width = Some(cells.len());
                continue;
            }
        }

        markdown.push_str(line);
        markdown.push('\n');
    }

    markdown.trim_end().to_string()
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

/// Split a line into table cells when it has at least two gap-separated cells.
fn table_cells(line: &str) -> Option<Vec<String>> {
    let cells: Vec<String> =
        CELL_GAP.split(line).map(str::trim).filter(|c| !c.is_empty()).map(String::from).collect();
    (cells.len() >= 2).then_some(cells)
}

fn is_upper_case(line: &str) -> bool {
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

fn is_title_case(line: &str) -> bool {
    line.split_whitespace().enumerate().all(|(i, word)| {
        let first = word.chars().find(|c| c.is_alphanumeric());
        match first {
            Some(c) if c.is_alphabetic() => {
                c.is_uppercase() || (i > 0 && MINOR_WORDS.contains(&word.to_lowercase().as_str()))
            }
            _ => true,
        }
    })
}

/// Decide whether line `index` is a heading and at which level.
///
/// A heading is short, contains letters, does not end in sentence
/// punctuation, starts a block (previous line blank or start of text), and is
/// followed by more text. Upper-case or top-level numbered headings are level
/// one; other title-case headings are level two.
fn heading_level(lines: &[&str], index: usize) -> Option<usize> {
    let line = lines[index].trim();
    if line.len() > MAX_HEADING_LEN
        || !line.chars().any(char::is_alphabetic)
        || line.ends_with(['.', ',', ';'])
    {
        return None;
    }

    let starts_block = index == 0 || lines[index - 1].trim().is_empty();
    let has_following_text = lines[index + 1..].iter().any(|l| !l.trim().is_empty());
    if !starts_block || !has_following_text {
        return None;
    }

    if NUMBERED_SUB.is_match(line) {
        Some(2)
    } else if is_upper_case(line) || NUMBERED_TOP.is_match(line) {
        Some(1)
    } else if is_title_case(line) {
        Some(2)
    } else {
        None
    }
}
