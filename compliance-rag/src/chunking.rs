//! Heading-based splitting of normalized markdown text.
//!
//! Sectioned documents are split on level-1 (`#`) and level-2 (`##`)
//! headings. Each section is titled by its nearest enclosing level-1 heading,
//! falling back to the level-2 heading and finally to [`GENERAL_SECTION`].
//! Deeper headings (`###` and below) stay part of the section body.

use crate::document::{Chunk, GENERAL_SECTION};

/// A run of body text under one heading context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Resolved section title.
    pub title: String,
    /// Body text with heading lines removed, trimmed.
    pub text: String,
}

/// Parse an ATX heading line into `(level, title)`.
///
/// Requires one to six `#` characters followed by whitespace and a non-empty
/// title. Closing `#` sequences and surrounding emphasis markers are stripped.
pub(crate) fn parse_heading(line: &str) -> Option<(usize, String)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let rest = &trimmed[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let title = rest.trim().trim_end_matches('#').trim().trim_matches('*').trim();
    if title.is_empty() {
        return None;
    }
    Some((level, title.to_string()))
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Split markdown text into titled sections on `#` and `##` headings.
///
/// Headings inside fenced code blocks are ignored. Sections whose body is
/// empty after trimming are dropped.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut h1: Option<String> = None;
    let mut h2: Option<String> = None;
    let mut body = String::new();
    let mut in_fence = false;

    for line in text.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some((level, title)) = parse_heading(line).filter(|(level, _)| *level <= 2) {
                flush_section(&mut sections, &h1, &h2, &mut body);
                if level == 1 {
                    h1 = Some(title);
                    h2 = None;
                } else {
                    h2 = Some(title);
                }
                continue;
            }
        }

        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(line);
    }

    flush_section(&mut sections, &h1, &h2, &mut body);
    sections
}

fn flush_section(
    sections: &mut Vec<Section>,
    h1: &Option<String>,
    h2: &Option<String>,
    body: &mut String,
) {
    let text = body.trim();
    if !text.is_empty() {
        let title = h1.as_deref().or(h2.as_deref()).unwrap_or(GENERAL_SECTION);
        sections.push(Section { title: title.to_string(), text: text.to_string() });
    }
    body.clear();
}

/// Build one chunk per section of `markdown`, all attributed to `source`.
pub fn sectioned_chunks(source: &str, markdown: &str) -> Vec<Chunk> {
    split_sections(markdown)
        .into_iter()
        .map(|section| Chunk::new(section.text, source, section.title))
        .collect()
}
