//! HTML to markdown conversion for measurement tables.
//!
//! Tables are rendered as pipe-delimited markdown so that row and column
//! alignment survives into the indexed text. Headings become ATX headings,
//! lists become `-` / `1.` items, and `script`/`style` content is dropped.

use scraper::{ElementRef, Html, Node};

/// Upper bound on `colspan`, as browsers clamp it.
const MAX_COLSPAN: usize = 1000;

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "head", "noscript", "template"];

const BLOCK_ELEMENTS: &[&str] = &[
    "html",
    "body",
    "p",
    "div",
    "section",
    "article",
    "main",
    "header",
    "footer",
    "nav",
    "aside",
    "blockquote",
    "figure",
    "figcaption",
    "form",
    "fieldset",
    "caption",
    "dl",
    "dt",
    "dd",
    "hr",
];

/// Accumulates markdown blocks while walking the DOM.
#[derive(Default)]
struct MarkdownWriter {
    blocks: Vec<String>,
    inline: String,
}

impl MarkdownWriter {
    /// Append inline text, collapsing runs of whitespace to a single space.
    fn text(&mut self, text: &str) {
        if text.starts_with(char::is_whitespace) && !self.inline.ends_with(' ') {
            self.inline.push(' ');
        }
        let mut words = text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            self.inline.push_str(word);
            if words.peek().is_some() {
                self.inline.push(' ');
            }
        }
        if text.ends_with(char::is_whitespace) && !self.inline.ends_with(' ') {
            self.inline.push(' ');
        }
    }

    fn flush(&mut self) {
        let paragraph = self.inline.trim();
        if !paragraph.is_empty() {
            self.blocks.push(paragraph.to_string());
        }
        self.inline.clear();
    }

    fn block(&mut self, block: String) {
        self.flush();
        if !block.trim().is_empty() {
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        let mut markdown = self.blocks.join("\n\n");
        if !markdown.is_empty() {
            markdown.push('\n');
        }
        markdown
    }
}

/// Convert an HTML document to markdown, preserving tables as pipe rows.
pub fn html_to_markdown(source: &str) -> String {
    let document = Html::parse_document(source);
    let mut writer = MarkdownWriter::default();
    walk(document.root_element(), &mut writer);
    writer.finish()
}

fn walk(element: ElementRef<'_>, writer: &mut MarkdownWriter) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => writer.text(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, writer);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: ElementRef<'_>, writer: &mut MarkdownWriter) {
    let name = element.value().name();
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }

    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            let title = inline_text(element);
            if !title.is_empty() {
                writer.block(format!("{} {title}", "#".repeat(level)));
            }
        }
        "table" => writer.block(render_table(element)),
        "ul" | "ol" => writer.block(render_list(element, name == "ol")),
        "pre" => {
            let code: String = element.text().collect();
            writer.block(format!("```\n{}\n```", code.trim_end()));
        }
        "br" => writer.flush(),
        _ if BLOCK_ELEMENTS.contains(&name) => {
            writer.flush();
            walk(element, writer);
            writer.flush();
        }
        _ => walk(element, writer),
    }
}

/// Collapse the text content of an element to a single line.
fn inline_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn child_elements<'a>(
    element: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |e| names.contains(&e.value().name()))
}

fn render_list(list: ElementRef<'_>, ordered: bool) -> String {
    child_elements(list, &["li"])
        .enumerate()
        .map(|(i, item)| {
            let text = inline_text(item);
            if ordered { format!("{}. {text}", i + 1) } else { format!("- {text}") }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The nearest `table` enclosing `row`.
fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors().filter_map(ElementRef::wrap).find(|e| e.value().name() == "table")
}

/// Render a table as markdown rows; the first row is treated as the header.
///
/// `colspan` cells are padded with empty cells (at most [`MAX_COLSPAN`]) and
/// short rows are padded to the widest row so every row has the same number
/// of columns. Rows of nested tables stay inside their enclosing cell.
fn render_table(table: ElementRef<'_>) -> String {
    let mut rows: Vec<Vec<String>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr" && owning_table(*e) == Some(table))
        .map(|row| {
            let mut cells = Vec::new();
            for cell in child_elements(row, &["td", "th"]) {
                cells.push(inline_text(cell).replace('|', "\\|"));
                let span = cell
                    .value()
                    .attr("colspan")
                    .and_then(|s| s.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .min(MAX_COLSPAN);
                for _ in 1..span {
                    cells.push(String::new());
                }
            }
            cells
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }
    for row in &mut rows {
        row.resize(width, String::new());
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        lines.push(format!("| {} |", row.join(" | ")));
        if i == 0 {
            lines.push(format!("| {} |", vec!["---"; width].join(" | ")));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEASUREMENTS: &str = r#"<!DOCTYPE html>
<html>
<head><title>Part Measurements</title><style>td { color: red; }</style></head>
<body>
  <h1>Part Measurements</h1>
  <p>Measured by   Test Corporation.</p>
  <table>
    <thead><tr><th>Part</th><th>Lead (ppm)</th><th>Status</th></tr></thead>
    <tbody>
      <tr><td>TC-3541-A</td><td>12</td><td>Pass</td></tr>
      <tr><td>TC-3541-B</td><td colspan="2">pending</td></tr>
    </tbody>
  </table>
  <script>alert("x")</script>
</body>
</html>"#;

    #[test]
    fn tables_become_pipe_rows() {
        let md = html_to_markdown(MEASUREMENTS);
        assert!(md.contains("| Part | Lead (ppm) | Status |"));
        assert!(md.contains("| --- | --- | --- |"));
        assert!(md.contains("| TC-3541-A | 12 | Pass |"));
    }

    #[test]
    fn colspan_keeps_columns_aligned() {
        let md = html_to_markdown(MEASUREMENTS);
        assert!(md.contains("| TC-3541-B | pending |  |"));
    }

    #[test]
    fn headings_and_paragraphs_are_kept() {
        let md = html_to_markdown(MEASUREMENTS);
        assert!(md.starts_with("# Part Measurements"));
        assert!(md.contains("Measured by Test Corporation."));
    }

    #[test]
    fn scripts_and_styles_are_dropped() {
        let md = html_to_markdown(MEASUREMENTS);
        assert!(!md.contains("alert"));
        assert!(!md.contains("color: red"));
    }

    #[test]
    fn pipes_inside_cells_are_escaped() {
        let md = html_to_markdown("<table><tr><td>a|b</td><td>c</td></tr></table>");
        assert!(md.contains(r"| a\|b | c |"));
    }

    #[test]
    fn lists_are_rendered() {
        let md = html_to_markdown("<ol><li>first</li><li>second</li></ol><ul><li>dot</li></ul>");
        assert!(md.contains("1. first\n2. second"));
        assert!(md.contains("- dot"));
    }

    #[test]
    fn oversized_colspan_is_clamped() {
        let md = html_to_markdown(
            r#"<table><tr><td colspan="1000000000">wide</td></tr><tr><td>a</td></tr></table>"#,
        );
        let header = md.lines().next().unwrap();
        assert_eq!(header.matches('|').count(), MAX_COLSPAN + 1);
    }

    #[test]
    fn nested_table_rows_render_once() {
        let md = html_to_markdown(
            "<table><tr><th>Part</th><th>Detail</th></tr>\
             <tr><td>TC-3541-A</td><td><table><tr><td>inner</td></tr></table></td></tr></table>",
        );
        assert_eq!(md.matches("inner").count(), 1);
        assert_eq!(md.lines().count(), 3);
        assert!(md.contains("| TC-3541-A | inner |"));
    }

    #[test]
    fn empty_document_gives_empty_markdown() {
        assert_eq!(html_to_markdown(""), "");
    }
}
