//! HTML to Markdown conversion.
//!
//! A small DOM walk over `scraper`'s tree covering the structure that matters
//! for reading crawled pages offline: headings, paragraphs, lists, links,
//! emphasis, code, quotes, images and rules. Scripts, styles and other
//! non-content elements are dropped. Link and image targets are resolved against
//! the page URL when one is given, so exported files keep working offline.

use scraper::{ElementRef, Html, Node};
use url::Url;

const SKIPPED: [&str; 9] = [
    "head", "script", "style", "noscript", "template", "svg", "iframe", "object", "canvas",
];

const BLOCKS: [&str; 17] = [
    "p", "div", "section", "article", "main", "header", "footer", "nav", "aside", "figure",
    "figcaption", "table", "thead", "tbody", "dl", "address", "details",
];

pub fn to_markdown(html: &str, base: Option<&Url>) -> String {
    let document = Html::parse_document(html);
    let mut writer = Writer {
        base,
        ..Writer::default()
    };
    writer.children(document.root_element());
    finish(&writer.out)
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(usize),
}

#[derive(Debug, Default)]
struct Writer<'a> {
    out: String,
    lists: Vec<ListKind>,
    base: Option<&'a Url>,
}

impl Writer<'_> {
    fn children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if SKIPPED.contains(&name) {
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let text = self.inline(element);
                if !text.is_empty() {
                    self.block_break();
                    self.out.push_str(&"#".repeat(level));
                    self.out.push(' ');
                    self.out.push_str(&text);
                    self.block_break();
                }
            }
            "br" => {
                self.trim_trailing_spaces();
                self.out.push('\n');
            }
            "hr" => {
                self.block_break();
                self.out.push_str("---");
                self.block_break();
            }
            "a" => {
                let text = self.inline(element);
                let href = element.value().attr("href").map(str::trim);
                match href {
                    Some(href) if !text.is_empty() && is_linkable(href) => {
                        let target = self.resolve(href);
                        self.push_inline(&format!("[{}]({})", text, target));
                    }
                    _ => self.push_inline(&text),
                }
            }
            "strong" | "b" => self.wrapped(element, "**"),
            "em" | "i" => self.wrapped(element, "*"),
            "code" | "kbd" | "samp" => self.wrapped(element, "`"),
            "img" => {
                if let Some(src) = element.value().attr("src") {
                    let alt = element.value().attr("alt").unwrap_or_default().trim();
                    let target = self.resolve(src.trim());
                    self.push_inline(&format!("![{}]({})", alt, target));
                }
            }
            "pre" => {
                let code: String = element.text().collect();
                self.block_break();
                self.out.push_str("```\n");
                self.out.push_str(code.trim_end_matches('\n'));
                self.out.push_str("\n```");
                self.block_break();
            }
            "ul" | "ol" => {
                let nested = !self.lists.is_empty();
                if nested {
                    self.line_break();
                } else {
                    self.block_break();
                }
                self.lists.push(if name == "ol" {
                    ListKind::Ordered(0)
                } else {
                    ListKind::Unordered
                });
                self.children(element);
                self.lists.pop();
                if nested {
                    self.line_break();
                } else {
                    self.block_break();
                }
            }
            "li" => {
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        *n += 1;
                        format!("{}. ", n)
                    }
                    _ => "- ".to_string(),
                };
                self.line_break();
                self.out.push_str(&indent);
                self.out.push_str(&marker);
                self.children(element);
                self.line_break();
            }
            "blockquote" => {
                let saved = std::mem::take(&mut self.out);
                self.children(element);
                let quoted = std::mem::replace(&mut self.out, saved);

                self.block_break();
                for line in finish(&quoted).lines() {
                    if line.is_empty() {
                        self.out.push_str(">\n");
                    } else {
                        self.out.push_str("> ");
                        self.out.push_str(line);
                        self.out.push('\n');
                    }
                }
                self.block_break();
            }
            "tr" | "dt" | "dd" => {
                self.line_break();
                self.children(element);
                self.line_break();
            }
            "td" | "th" => {
                self.children(element);
                self.space();
            }
            _ if BLOCKS.contains(&name) => {
                self.block_break();
                self.children(element);
                self.block_break();
            }
            _ => self.children(element),
        }
    }

    fn resolve(&self, target: &str) -> String {
        self.base
            .and_then(|base| base.join(target).ok())
            .map(String::from)
            .unwrap_or_else(|| target.to_string())
    }

    fn wrapped(&mut self, element: ElementRef<'_>, marker: &str) {
        let text = self.inline(element);
        if !text.is_empty() {
            self.push_inline(&format!("{}{}{}", marker, text, marker));
        }
    }

    /// Renders the children of `element` on their own, flattened to one line.
    fn inline(&mut self, element: ElementRef<'_>) -> String {
        let saved = std::mem::take(&mut self.out);
        self.children(element);
        let inner = std::mem::replace(&mut self.out, saved);
        inner.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn text(&mut self, raw: &str) {
        let starts_with_space = raw.starts_with(char::is_whitespace);
        let ends_with_space = raw.ends_with(char::is_whitespace);
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

        if starts_with_space {
            self.space();
        }
        if collapsed.is_empty() {
            return;
        }
        self.push_inline(&collapsed);
        if ends_with_space {
            self.space();
        }
    }

    fn push_inline(&mut self, text: &str) {
        if self.out.is_empty() || self.out.ends_with('\n') {
            self.out.push_str(text.trim_start());
        } else {
            self.out.push_str(text);
        }
    }

    fn space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let len = self.out.trim_end_matches(' ').len();
        self.out.truncate(len);
    }

    fn line_break(&mut self) {
        self.trim_trailing_spaces();
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn block_break(&mut self) {
        self.trim_trailing_spaces();
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}

fn is_linkable(href: &str) -> bool {
    !href.is_empty() && !href.starts_with('#') && !href.to_ascii_lowercase().starts_with("javascript:")
}

/// Trims trailing whitespace per line and collapses runs of blank lines, except
/// inside fenced code.
fn finish(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut in_fence = false;
    let mut pending_blank = false;

    for line in raw.lines() {
        let line = line.trim_end();
        let is_fence = line.trim_start().starts_with("```");

        if !in_fence && line.is_empty() {
            pending_blank = !result.is_empty();
            continue;
        }
        if pending_blank {
            result.push('\n');
            pending_blank = false;
        }
        result.push_str(line);
        result.push('\n');

        if is_fence {
            in_fence = !in_fence;
        }
    }

    result.trim_end().to_string()
}
