//! HTML to Markdown conversion for captured content.
//!
//! Lines are never wrapped; links and images are kept. Whitespace is
//! collapsed everywhere except inside `<pre>`.

use scraper::{ElementRef, Html, Node};

/// Elements whose content never reaches the Markdown.
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "head", "title", "meta", "link",
];

/// Elements that only group block content.
const BLOCK_CONTAINERS: &[&str] = &[
    "html",
    "body",
    "main",
    "article",
    "section",
    "div",
    "p",
    "header",
    "footer",
    "aside",
    "nav",
    "figure",
    "figcaption",
    "address",
    "details",
    "summary",
    "dl",
    "dt",
    "dd",
    "form",
    "fieldset",
    "center",
];

/// Convert an HTML fragment to Markdown ending in a single newline.
///
/// Returns an empty string when the fragment has no visible content.
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut converter = Converter::default();
    converter.walk_children(fragment.root_element());
    converter.finish()
}

/// Accumulates blocks; `inline` holds the paragraph being built.
#[derive(Default)]
struct Converter {
    out: String,
    inline: String,
}

impl Converter {
    fn finish(mut self) -> String {
        self.flush();
        normalize(&self.out)
    }

    fn flush(&mut self) {
        let text = tidy_inline(&self.inline);
        self.inline.clear();
        if !text.is_empty() {
            self.out.push_str("\n\n");
            self.out.push_str(&text);
            self.out.push_str("\n\n");
        }
    }

    fn push_block(&mut self, block: &str) {
        self.flush();
        if !block.trim().is_empty() {
            self.out.push_str("\n\n");
            self.out.push_str(block);
            self.out.push_str("\n\n");
        }
    }

    fn walk_children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_text(&mut self.inline, text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk_element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        match name {
            _ if SKIPPED.contains(&name) => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let mut text = String::new();
                render_inline_children(element, &mut text);
                let text = tidy_inline(&text).replace('\n', " ");
                if !text.is_empty() {
                    self.push_block(&format!("{} {text}", "#".repeat(level)));
                }
            }
            "pre" => self.push_block(&render_pre(element)),
            "ul" | "ol" => self.push_block(&render_list(element, "")),
            "table" => self.push_block(&render_table(element)),
            "hr" => self.push_block("* * *"),
            "blockquote" => {
                let mut inner = Self::default();
                inner.walk_children(element);
                self.push_block(&quote(&inner.finish()));
            }
            "br" => self.inline.push('\n'),
            _ if BLOCK_CONTAINERS.contains(&name) => {
                self.flush();
                self.walk_children(element);
                self.flush();
            }
            _ => render_inline(element, &mut self.inline),
        }
    }
}

fn render_inline_children(element: ElementRef<'_>, buf: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(buf, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_inline(child, buf);
                }
            }
            _ => {}
        }
    }
}

fn render_inline(element: ElementRef<'_>, buf: &mut String) {
    let name = element.value().name();
    match name {
        _ if SKIPPED.contains(&name) => {}
        "br" => buf.push('\n'),
        "strong" | "b" => wrap_inline(element, buf, "**"),
        "em" | "i" => wrap_inline(element, buf, "*"),
        "code" | "kbd" | "samp" | "tt" => {
            let code = element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            if !code.is_empty() {
                let tick = if code.contains('`') { "``" } else { "`" };
                buf.push_str(&format!("{tick}{code}{tick}"));
            }
        }
        "a" => {
            let mut inner = String::new();
            render_inline_children(element, &mut inner);
            let text = inner.split_whitespace().collect::<Vec<_>>().join(" ");
            match element.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() && !href.starts_with("javascript:") => {
                    let label = if text.is_empty() { href } else { text.as_str() };
                    buf.push_str(&format!("[{label}]({href})"));
                }
                _ => buf.push_str(&text),
            }
        }
        "img" => {
            if let Some(src) = element.value().attr("src").map(str::trim)
                && !src.is_empty()
            {
                let alt = element.value().attr("alt").unwrap_or_default().trim();
                buf.push_str(&format!("![{alt}]({src})"));
            }
        }
        _ if BLOCK_CONTAINERS.contains(&name) || name == "li" => {
            buf.push('\n');
            render_inline_children(element, buf);
            buf.push('\n');
        }
        _ => render_inline_children(element, buf),
    }
}

fn wrap_inline(element: ElementRef<'_>, buf: &mut String, marker: &str) {
    let mut inner = String::new();
    render_inline_children(element, &mut inner);
    let text = inner.trim();
    if text.is_empty() {
        return;
    }
    if inner.starts_with(' ') && !buf.is_empty() && !buf.ends_with([' ', '\n']) {
        buf.push(' ');
    }
    buf.push_str(marker);
    buf.push_str(text);
    buf.push_str(marker);
    if inner.ends_with(' ') {
        buf.push(' ');
    }
}

/// Append text with whitespace runs collapsed to one space.
fn push_text(buf: &mut String, text: &str) {
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !buf.is_empty() && !buf.ends_with([' ', '\n']) {
                buf.push(' ');
            }
        } else {
            buf.push(ch);
        }
    }
}

/// Trim each line, collapse inner whitespace, drop empty lines.
fn tidy_inline(text: &str) -> String {
    text.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_pre(element: ElementRef<'_>) -> String {
    let language = code_language(element)
        .or_else(|| {
            element
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| child.value().name() == "code")
                .and_then(code_language)
        })
        .unwrap_or_default();
    let raw: String = element.text().collect();
    let code = raw.strip_prefix('\n').unwrap_or(&raw).trim_end();
    if code.trim().is_empty() {
        return String::new();
    }
    let fence = if code.contains("```") { "````" } else { "```" };
    format!("{fence}{language}\n{code}\n{fence}")
}

fn code_language(element: ElementRef<'_>) -> Option<String> {
    element.value().attr("class")?.split_whitespace().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty())
            .map(ToString::to_string)
    })
}

fn render_list(list: ElementRef<'_>, indent: &str) -> String {
    let ordered = list.value().name() == "ol";
    let mut number: usize = list
        .value()
        .attr("start")
        .and_then(|start| start.trim().parse().ok())
        .unwrap_or(1);

    let mut lines: Vec<String> = Vec::new();
    for item in list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
    {
        let marker = if ordered {
            format!("{number}. ")
        } else {
            "* ".to_string()
        };
        number += 1;
        let child_indent = format!("{indent}{}", " ".repeat(marker.len()));

        let mut text = String::new();
        let mut nested: Vec<String> = Vec::new();
        for child in item.children() {
            match child.value() {
                Node::Text(t) => push_text(&mut text, t),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    match child.value().name() {
                        "ul" | "ol" => nested.push(render_list(child, &child_indent)),
                        "pre" => nested.push(indent_lines(&render_pre(child), &child_indent)),
                        _ => render_inline(child, &mut text),
                    }
                }
                _ => {}
            }
        }

        let text = tidy_inline(&text).replace('\n', " ");
        lines.push(format!("{indent}{marker}{text}").trim_end().to_string());
        lines.extend(nested.into_iter().filter(|block| !block.is_empty()));
    }
    lines.join("\n")
}

fn indent_lines(block: &str, indent: &str) -> String {
    block
        .lines()
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table(table: ElementRef<'_>) -> String {
    let rows: Vec<Vec<String>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(|cell| {
                    let mut text = String::new();
                    render_inline_children(cell, &mut text);
                    tidy_inline(&text).replace('\n', " ").replace('|', "\\|")
                })
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (index, row) in rows.iter().enumerate() {
        let mut cells = row.clone();
        cells.resize(width, String::new());
        lines.push(format!("| {} |", cells.join(" | ")));
        if index == 0 {
            lines.push(format!("|{}|", vec![" --- "; width].join("|")));
        }
    }
    lines.join("\n")
}

fn quote(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse blank-line runs outside code fences and end with one newline.
fn normalize(raw: &str) -> String {
    let mut result = String::new();
    let mut fence: Option<String> = None;
    let mut blank_pending = false;

    for line in raw.lines() {
        if let Some(open) = &fence {
            result.push_str(line);
            result.push('\n');
            if line.trim() == open {
                fence = None;
            }
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() {
            blank_pending = !result.is_empty();
            continue;
        }
        if blank_pending {
            result.push('\n');
            blank_pending = false;
        }
        result.push_str(line);
        result.push('\n');

        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            let ticks = trimmed.chars().take_while(|c| *c == '`').count();
            fence = Some("`".repeat(ticks));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_inline_markup() {
        let html = r#"<h2>Intro</h2><p>Use <strong>CQRS</strong> and <em>events</em>, see <a href="https://x.dev/a">docs</a>.</p>"#;
        assert_eq!(
            html_to_markdown(html),
            "## Intro\n\nUse **CQRS** and *events*, see [docs](https://x.dev/a).\n"
        );
    }

    #[test]
    fn test_code_block_keeps_whitespace() {
        let html = "<pre><code class=\"language-rust\">fn main() {\n    println!(\"hi\");\n\n}\n</code></pre>";
        assert_eq!(
            html_to_markdown(html),
            "```rust\nfn main() {\n    println!(\"hi\");\n\n}\n```\n"
        );
    }

    #[test]
    fn test_nested_lists() {
        let html = r#"<ul><li>One</li><li>Two<ul><li>Inner</li></ul></li></ul><ol start="3"><li>Three</li><li>Four</li></ol>"#;
        assert_eq!(
            html_to_markdown(html),
            "* One\n* Two\n  * Inner\n\n3. Three\n4. Four\n"
        );
    }

    #[test]
    fn test_dropped_elements() {
        let html = "<p>Keep</p><script>alert(1)</script><style>p{}</style><noscript>js</noscript><p>Also</p>";
        assert_eq!(html_to_markdown(html), "Keep\n\nAlso\n");
    }

    #[test]
    fn test_table() {
        let html = "<table><thead><tr><th>Name</th><th>Type</th></tr></thead><tbody><tr><td>id</td><td>a|b</td></tr></tbody></table>";
        assert_eq!(
            html_to_markdown(html),
            "| Name | Type |\n| --- | --- |\n| id | a\\|b |\n"
        );
    }

    #[test]
    fn test_quote_rule_image_and_break() {
        let html = r#"<blockquote><p>Quoted</p><p>Twice</p></blockquote><hr><p>Line one<br>Line two <img src="/a.png" alt="diagram"></p>"#;
        assert_eq!(
            html_to_markdown(html),
            "> Quoted\n>\n> Twice\n\n* * *\n\nLine one\nLine two ![diagram](/a.png)\n"
        );
    }

    #[test]
    fn test_whitespace_collapse() {
        let html = "<div>\n  <p>  spaced   out\n text </p>\n\n\n<div><p>next <code>a  b</code></p></div></div>";
        assert_eq!(html_to_markdown(html), "spaced out text\n\nnext `a b`\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(html_to_markdown(""), "");
        assert_eq!(html_to_markdown("<script>x</script>"), "");
    }
}
