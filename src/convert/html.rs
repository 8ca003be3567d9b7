// HTML to markdown-ish text
// Keeps headings, lists, links, emphasis and table rows; drops scripts and styles.

use std::path::Path;

use scraper::{ElementRef, Html, Node, Selector};

use super::{io_error, ConversionError, ConversionResult};

pub fn convert(path: &Path) -> Result<ConversionResult, ConversionError> {
    let html = std::fs::read_to_string(path).map_err(io_error(path))?;
    Ok(html_to_markdown(&html))
}

pub fn html_to_markdown(html: &str) -> ConversionResult {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next().map(collapsed_text))
        .filter(|t| !t.is_empty());

    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    render_children(body, &mut out);

    ConversionResult::new(title, tidy(&out))
}

fn render_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(out, &text.text),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    render_element(el, out);
                }
            }
            _ => {}
        }
    }
}

fn render_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    match name {
        "script" | "style" | "noscript" | "head" | "template" | "svg" => {}
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            end_block(out);
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&collapsed_text(el));
            end_block(out);
        }
        "li" => {
            end_line(out);
            out.push_str("* ");
            render_children(el, out);
            end_line(out);
        }
        "tr" => {
            end_line(out);
            render_children(el, out);
            out.push('|');
            end_line(out);
        }
        "td" | "th" => {
            out.push_str("| ");
            render_children(el, out);
            trim_trailing_spaces(out);
            out.push(' ');
        }
        "br" => out.push('\n'),
        "hr" => {
            end_block(out);
            out.push_str("---");
            end_block(out);
        }
        "a" => {
            let text = collapsed_text(el);
            match el.value().attr("href") {
                Some(href) if !text.is_empty() && !href.starts_with("javascript:") => {
                    out.push_str(&format!("[{}]({})", text, href));
                }
                _ => out.push_str(&text),
            }
        }
        "img" => {
            if let Some(src) = el.value().attr("src") {
                let alt = el.value().attr("alt").unwrap_or_default();
                out.push_str(&format!("![{}]({})", alt, src));
            }
        }
        "strong" | "b" => wrap_inline(el, "**", out),
        "em" | "i" => wrap_inline(el, "*", out),
        "code" => wrap_inline(el, "`", out),
        "pre" => {
            end_block(out);
            out.push_str("```\n");
            out.push_str(el.text().collect::<String>().trim_end());
            out.push_str("\n```");
            end_block(out);
        }
        "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside" | "table"
        | "ul" | "ol" | "blockquote" | "figure" | "form" | "dl" => {
            end_block(out);
            render_children(el, out);
            end_block(out);
        }
        _ => render_children(el, out),
    }
}

fn wrap_inline(el: ElementRef<'_>, marker: &str, out: &mut String) {
    let text = collapsed_text(el);
    if !text.is_empty() {
        out.push_str(marker);
        out.push_str(&text);
        out.push_str(marker);
    }
}

fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_text(out: &mut String, raw: &str) {
    let words: Vec<&str> = raw.split_whitespace().collect();
    let needs_gap = !out.is_empty() && !out.ends_with(char::is_whitespace);

    if words.is_empty() {
        if !raw.is_empty() && needs_gap {
            out.push(' ');
        }
        return;
    }

    if raw.starts_with(char::is_whitespace) && needs_gap {
        out.push(' ');
    }
    out.push_str(&words.join(" "));
    if raw.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn trim_trailing_spaces(out: &mut String) {
    let trimmed = out.trim_end_matches([' ', '\t']).len();
    out.truncate(trimmed);
}

fn end_line(out: &mut String) {
    trim_trailing_spaces(out);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn end_block(out: &mut String) {
    end_line(out);
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}

/// Trim each line and collapse runs of blank lines
fn tidy(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim_end) {
        if line.is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
