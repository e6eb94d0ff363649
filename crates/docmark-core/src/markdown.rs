//! HTML to Markdown conversion.
//!
//! Walks the parsed DOM and emits CommonMark-style Markdown: ATX headings,
//! `-`/`1.` lists, inline links and images, fenced code blocks, block quotes
//! and pipe tables. Document metadata (`head`) and script/style content are
//! dropped.

use scraper::{ElementRef, Html, Node};

/// Convert an HTML document or fragment to Markdown.
///
/// The result has no leading blank lines, at most one consecutive blank line
/// outside code fences, and ends with a single `\n` (or is empty).
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let raw = render_children(document.root_element());
    finish(&raw)
}

fn render_children(el: ElementRef) -> String {
    let mut out = String::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let collapsed = collapse_whitespace(text);
                if out.is_empty() || out.ends_with('\n') {
                    out.push_str(&escape(collapsed.trim_start(), true));
                } else {
                    out.push_str(&escape(&collapsed, false));
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.push_str(&render_element(child_el));
                }
            }
            _ => {}
        }
    }
    out
}

fn render_element(el: ElementRef) -> String {
    let tag = el.value().name();
    match tag {
        "head" | "script" | "style" | "noscript" | "template" | "title" | "meta" | "link" => {
            String::new()
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            let content = single_line(&render_children(el));
            if content.is_empty() {
                String::new()
            } else {
                format!("\n\n{} {}\n\n", "#".repeat(level), content)
            }
        }
        "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside"
        | "figure" | "figcaption" | "address" | "dl" | "dt" | "dd" | "form" | "fieldset" => {
            format!("\n\n{}\n\n", render_children(el).trim())
        }
        "br" => "  \n".into(),
        "hr" => "\n\n---\n\n".into(),
        "strong" | "b" => wrap_inline(&render_children(el), "**"),
        "em" | "i" => wrap_inline(&render_children(el), "*"),
        "del" | "s" | "strike" => wrap_inline(&render_children(el), "~~"),
        "code" | "kbd" | "samp" => {
            let code: String = el.text().collect();
            if code.is_empty() {
                String::new()
            } else {
                let fence = if code.contains('`') { "``" } else { "`" };
                format!("{fence}{code}{fence}")
            }
        }
        "pre" => render_pre(el),
        "a" => render_link(el),
        "img" => render_image(el),
        "ul" => render_list(el, false),
        "ol" => render_list(el, true),
        "blockquote" => render_quote(el),
        "table" => render_table(el),
        _ => render_children(el),
    }
}

fn render_pre(el: ElementRef) -> String {
    let code: String = el.text().collect();
    let code = code.strip_prefix('\n').unwrap_or(&code).trim_end_matches('\n');
    let language = el
        .children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().name() == "code")
        .and_then(|c| c.value().attr("class"))
        .and_then(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
        })
        .unwrap_or("");
    format!("\n\n```{language}\n{code}\n```\n\n")
}

fn render_link(el: ElementRef) -> String {
    let text = render_children(el);
    let href = el.value().attr("href").unwrap_or("").trim();
    if href.is_empty() || href.starts_with("javascript:") {
        return text;
    }
    let (prefix, content, suffix) = chomp(&text);
    if content.is_empty() {
        return format!("{prefix}<{href}>{suffix}");
    }
    if content == href && !href.contains(' ') {
        return format!("{prefix}<{href}>{suffix}");
    }
    match el.value().attr("title") {
        Some(title) if !title.is_empty() => {
            format!(
                "{prefix}[{content}]({href} \"{}\"){suffix}",
                title.replace('"', "\\\"")
            )
        }
        _ => format!("{prefix}[{content}]({href}){suffix}"),
    }
}

fn render_image(el: ElementRef) -> String {
    let src = el.value().attr("src").unwrap_or("");
    if src.is_empty() {
        return String::new();
    }
    let alt = el
        .value()
        .attr("alt")
        .unwrap_or("")
        .replace('[', "\\[")
        .replace(']', "\\]");
    match el.value().attr("title") {
        Some(title) if !title.is_empty() => {
            format!("![{alt}]({src} \"{}\")", title.replace('"', "\\\""))
        }
        _ => format!("![{alt}]({src})"),
    }
}

fn render_list(el: ElementRef, ordered: bool) -> String {
    let mut number = el
        .value()
        .attr("start")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(1);

    let mut items = Vec::new();
    for item in el
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "li")
    {
        let marker = if ordered {
            let m = format!("{number}. ");
            number += 1;
            m
        } else {
            "- ".to_string()
        };
        let indent = " ".repeat(marker.len());
        let body = render_children(item);

        let mut rendered = marker;
        let mut first = true;
        for line in body.trim().lines().filter(|l| !l.trim().is_empty()) {
            if !first {
                rendered.push('\n');
                rendered.push_str(&indent);
            }
            rendered.push_str(line);
            first = false;
        }
        items.push(rendered);
    }

    if items.is_empty() {
        return String::new();
    }
    format!("\n\n{}\n\n", items.join("\n"))
}

fn render_quote(el: ElementRef) -> String {
    let body = finish(&render_children(el));
    if body.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = body
        .trim_end()
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect();
    format!("\n\n{}\n\n", quoted.join("\n"))
}

fn render_table(el: ElementRef) -> String {
    let mut rows = Vec::new();
    collect_rows(el, &mut rows);

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "th" | "td"))
                .map(|cell| single_line(&render_children(cell)).replace('|', "\\|"))
                .collect()
        })
        .filter(|row: &Vec<String>| !row.is_empty())
        .collect();

    let width = cells.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut lines = Vec::with_capacity(cells.len() + 1);
    for (i, row) in cells.iter().enumerate() {
        let mut padded = row.clone();
        padded.resize(width, String::new());
        lines.push(format!("| {} |", padded.join(" | ")));
        if i == 0 {
            lines.push(format!("|{}", " --- |".repeat(width)));
        }
    }
    format!("\n\n{}\n\n", lines.join("\n"))
}

fn collect_rows<'a>(el: ElementRef<'a>, rows: &mut Vec<ElementRef<'a>>) {
    for child in el.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => collect_rows(child, rows),
            _ => {}
        }
    }
}

fn wrap_inline(text: &str, marker: &str) -> String {
    let (prefix, content, suffix) = chomp(text);
    if content.is_empty() {
        return text.to_string();
    }
    format!("{prefix}{marker}{content}{marker}{suffix}")
}

/// Split off leading/trailing whitespace so inline markers hug the text.
fn chomp(text: &str) -> (&'static str, &str, &'static str) {
    let prefix = if text.starts_with(char::is_whitespace) { " " } else { "" };
    let suffix = if text.ends_with(char::is_whitespace) { " " } else { "" };
    (prefix, text.trim(), suffix)
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Backslash-escape text so Markdown reads it back as literal characters.
///
/// Block markers (`#`, `-`, `+`, `>`, `=`, `1.`, `1)`) only act at the start
/// of a line, so they are escaped only when `line_start` is set.
fn escape(text: &str, line_start: bool) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;

    if line_start {
        let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if let Some(first) = rest.chars().next() {
            if matches!(first, '#' | '-' | '+' | '>' | '=') {
                out.push('\\');
                out.push(first);
                rest = &rest[first.len_utf8()..];
            } else if (1..=9).contains(&digits)
                && matches!(rest.as_bytes().get(digits), Some(b'.' | b')'))
            {
                out.push_str(&rest[..digits]);
                out.push('\\');
                out.push_str(&rest[digits..=digits]);
                rest = &rest[digits + 1..];
            }
        }
    }

    for (i, c) in rest.char_indices() {
        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '!' => {
                out.push('\\');
                out.push(c);
            }
            '&' if looks_like_entity(&rest[i + 1..]) => out.push_str("\\&"),
            _ => out.push(c),
        }
    }
    out
}

/// `amp;`, `#39;`, `x27;` and similar: what follows a `&` in an entity.
fn looks_like_entity(after_ampersand: &str) -> bool {
    let name_len = after_ampersand
        .strip_prefix('#')
        .unwrap_or(after_ampersand)
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    let offset = usize::from(after_ampersand.starts_with('#'));
    name_len > 0 && after_ampersand.as_bytes().get(offset + name_len) == Some(&b';')
}

/// Normalize blank lines outside code fences and trim the document.
fn finish(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;
    for line in raw.lines() {
        if line.starts_with("```") {
            in_fence = !in_fence;
        }
        if !in_fence && line.trim().is_empty() {
            if lines.last().is_some_and(|l| l.is_empty()) || lines.is_empty() {
                continue;
            }
            lines.push("");
        } else {
            lines.push(line);
        }
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
