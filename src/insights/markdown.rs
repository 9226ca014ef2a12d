//! Minimal markdown subset for insight reports.
//!
//! Recognized per line:
//! - `# `, `## `, `### ` headings (plain text)
//! - `- ` unordered and `N. ` ordered list items, consecutive items of the
//!   same kind forming one list
//! - any other non-blank line as a paragraph
//!
//! Inline, within list items and paragraphs: `**bold**` and `` `code` ``.
//! Blank lines close an open list.

use once_cell::sync::Lazy;
use regex::Regex;

static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s").expect("valid regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*[^*]+\*\*").expect("valid regex"));
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Code(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    UnorderedList(Vec<Vec<Inline>>),
    OrderedList(Vec<Vec<Inline>>),
    Paragraph(Vec<Inline>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

/// Parse text into display blocks.
pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut open: Option<(ListKind, Vec<Vec<Inline>>)> = None;

    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        let item = if let Some(rest) = line.strip_prefix("- ") {
            Some((ListKind::Unordered, rest))
        } else {
            ORDERED_ITEM
                .find(line)
                .map(|m| (ListKind::Ordered, &line[m.end()..]))
        };

        if let Some((kind, content)) = item {
            match &mut open {
                Some((open_kind, items)) if *open_kind == kind => items.push(parse_inline(content)),
                _ => {
                    close_list(&mut open, &mut blocks);
                    open = Some((kind, vec![parse_inline(content)]));
                }
            }
            continue;
        }

        close_list(&mut open, &mut blocks);

        if let Some((level, heading)) = heading(line) {
            blocks.push(Block::Heading {
                level,
                text: heading.to_string(),
            });
        } else if !line.trim().is_empty() {
            blocks.push(Block::Paragraph(parse_inline(line)));
        }
    }
    close_list(&mut open, &mut blocks);
    blocks
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if let Some(rest) = line.strip_prefix("# ") {
        Some((1, rest))
    } else if let Some(rest) = line.strip_prefix("## ") {
        Some((2, rest))
    } else {
        line.strip_prefix("### ").map(|rest| (3, rest))
    }
}

fn close_list(open: &mut Option<(ListKind, Vec<Vec<Inline>>)>, blocks: &mut Vec<Block>) {
    if let Some((kind, items)) = open.take() {
        blocks.push(match kind {
            ListKind::Unordered => Block::UnorderedList(items),
            ListKind::Ordered => Block::OrderedList(items),
        });
    }
}

/// Split a line into text, bold and code spans. Code spans may sit inside
/// bold spans.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in BOLD.find_iter(text) {
        push_code_spans(&text[last..m.start()], &mut out);
        let mut inner = Vec::new();
        push_code_spans(&text[m.start() + 2..m.end() - 2], &mut inner);
        out.push(Inline::Bold(inner));
        last = m.end();
    }
    push_code_spans(&text[last..], &mut out);
    out
}

fn push_code_spans(text: &str, out: &mut Vec<Inline>) {
    let mut last = 0;
    for m in CODE.find_iter(text) {
        if m.start() > last {
            out.push(Inline::Text(text[last..m.start()].to_string()));
        }
        out.push(Inline::Code(text[m.start() + 1..m.end() - 1].to_string()));
        last = m.end();
    }
    if last < text.len() {
        out.push(Inline::Text(text[last..].to_string()));
    }
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render blocks as HTML. Every text run is escaped before it is wrapped.
pub fn to_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                html.push_str(&format!("<h{0}>{1}</h{0}>", level, escape_html(text)));
            }
            Block::UnorderedList(items) => write_list(&mut html, "ul", items),
            Block::OrderedList(items) => write_list(&mut html, "ol", items),
            Block::Paragraph(spans) => {
                html.push_str("<p>");
                write_inline(&mut html, spans);
                html.push_str("</p>");
            }
        }
    }
    html
}

fn write_list(html: &mut String, tag: &str, items: &[Vec<Inline>]) {
    html.push_str(&format!("<{}>", tag));
    for item in items {
        html.push_str("<li>");
        write_inline(html, item);
        html.push_str("</li>");
    }
    html.push_str(&format!("</{}>", tag));
}

fn write_inline(html: &mut String, spans: &[Inline]) {
    for span in spans {
        match span {
            Inline::Text(text) => html.push_str(&escape_html(text)),
            Inline::Bold(inner) => {
                html.push_str("<b>");
                write_inline(html, inner);
                html.push_str("</b>");
            }
            Inline::Code(code) => {
                html.push_str("<code>");
                html.push_str(&escape_html(code));
                html.push_str("</code>");
            }
        }
    }
}

/// Plain text rendering for terminals.
pub fn to_plain_text(blocks: &[Block]) -> String {
    let mut lines = Vec::new();
    for block in blocks {
        match block {
            Block::Heading { text, .. } => lines.push(text.clone()),
            Block::UnorderedList(items) => {
                lines.extend(items.iter().map(|i| format!("  • {}", inline_text(i))));
            }
            Block::OrderedList(items) => {
                lines.extend(
                    items
                        .iter()
                        .enumerate()
                        .map(|(n, i)| format!("  {}. {}", n + 1, inline_text(i))),
                );
            }
            Block::Paragraph(spans) => lines.push(inline_text(spans)),
        }
    }
    lines.join("\n")
}

fn inline_text(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Text(text) | Inline::Code(text) => text.clone(),
            Inline::Bold(inner) => inline_text(inner),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_list_then_paragraph() {
        let blocks = parse("- a\n- b\n\ntext");
        assert_eq!(
            blocks,
            vec![
                Block::UnorderedList(vec![vec![text("a")], vec![text("b")]]),
                Block::Paragraph(vec![text("text")]),
            ]
        );
    }

    #[test]
    fn test_list_closed_before_heading_and_paragraph() {
        let blocks = parse("1. one\n2. two\n## Next\n- x\nplain");
        assert_eq!(
            blocks,
            vec![
                Block::OrderedList(vec![vec![text("one")], vec![text("two")]]),
                Block::Heading { level: 2, text: "Next".into() },
                Block::UnorderedList(vec![vec![text("x")]]),
                Block::Paragraph(vec![text("plain")]),
            ]
        );
    }

    #[test]
    fn test_switching_list_kind_starts_new_list() {
        let blocks = parse("- a\n1. b");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::UnorderedList(_)));
        assert!(matches!(blocks[1], Block::OrderedList(_)));
    }

    #[test]
    fn test_headings() {
        let blocks = parse("# One\n## Two\n### Three\n#### Four\n#NoSpace");
        assert_eq!(blocks[0], Block::Heading { level: 1, text: "One".into() });
        assert_eq!(blocks[1], Block::Heading { level: 2, text: "Two".into() });
        assert_eq!(blocks[2], Block::Heading { level: 3, text: "Three".into() });
        assert_eq!(blocks[3], Block::Paragraph(vec![text("#### Four")]));
        assert_eq!(blocks[4], Block::Paragraph(vec![text("#NoSpace")]));
    }

    #[test]
    fn test_inline_spans() {
        assert_eq!(
            parse_inline("1 **bold `x`** and `code`"),
            vec![
                text("1 "),
                Inline::Bold(vec![text("bold "), Inline::Code("x".into())]),
                text(" and "),
                Inline::Code("code".into()),
            ]
        );
        assert_eq!(parse_inline("** not bold"), vec![text("** not bold")]);
    }

    #[test]
    fn test_html_escapes_before_formatting() {
        let blocks = parse("# <script>\n- **<b>x</b>** & `<i>`\n<img onerror=\"x\">");
        let html = to_html(&blocks);
        assert_eq!(
            html,
            "<h1>&lt;script&gt;</h1>\
             <ul><li><b>&lt;b&gt;x&lt;/b&gt;</b> &amp; <code>&lt;i&gt;</code></li></ul>\
             <p>&lt;img onerror=&quot;x&quot;&gt;</p>"
        );
    }

    #[test]
    fn test_plain_text() {
        let blocks = parse("# Title\n1. **Rust** (3 items)\n- docs.rs");
        assert_eq!(to_plain_text(&blocks), "Title\n  1. Rust (3 items)\n  • docs.rs");
    }
}
