use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Turns an HTML document into the plain text that is snapshotted and diffed.
pub trait Extractor: Send + Sync {
    fn extract_text(&self, html: &str) -> String;
}

/// Visible-text extractor.
///
/// Block elements start a new line, list items are prefixed with `* `, link
/// targets are dropped while the anchor text stays, and non-rendered content
/// (`head`, scripts, styles, templates) is skipped. Whitespace runs collapse to
/// one space.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTextExtractor;

impl Extractor for HtmlTextExtractor {
    fn extract_text(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut ctx = TextContext::default();
        for child in document.root_element().children() {
            visit_node(child, &mut ctx);
        }
        ctx.into_text()
    }
}

fn visit_node(node: NodeRef<'_, Node>, ctx: &mut TextContext) {
    match node.value() {
        Node::Text(text) => ctx.append_text(text),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, ctx);
            }
        }
        _ => {
            for child in node.children() {
                visit_node(child, ctx);
            }
        }
    }
}

fn visit_element(element: ElementRef<'_>, ctx: &mut TextContext) {
    let tag = element.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "head" | "script" | "style" | "noscript" | "iframe" | "template" | "img" | "svg" => {}
        "br" => ctx.line_break(),
        "hr" => {
            ctx.ensure_newline();
            ctx.append_text("--------");
            ctx.ensure_newline();
        }
        "li" => {
            ctx.ensure_newline();
            ctx.append_text("* ");
            visit_children(element, ctx);
            ctx.ensure_newline();
        }
        "p" | "div" | "section" | "article" | "main" | "aside" | "header" | "footer" | "nav"
        | "figure" | "figcaption" | "table" | "tr" | "blockquote" | "address" | "ul" | "ol"
        | "dl" | "dt" | "dd" | "pre" | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            ctx.ensure_newline();
            visit_children(element, ctx);
            ctx.ensure_newline();
        }
        "td" | "th" => {
            ctx.append_text(" ");
            visit_children(element, ctx);
            ctx.append_text(" ");
        }
        _ => visit_children(element, ctx),
    }
}

fn visit_children(element: ElementRef<'_>, ctx: &mut TextContext) {
    for child in element.children() {
        visit_node(child, ctx);
    }
}

#[derive(Default)]
struct TextContext {
    builder: String,
    last_char: Option<char>,
}

impl TextContext {
    fn into_text(self) -> String {
        let lines: Vec<&str> = self.builder.lines().map(str::trim).collect();
        lines.join("\n").trim().to_string()
    }

    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.last_char.is_none()
                    || self.last_char == Some(' ')
                    || self.last_char == Some('\n')
                {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn ensure_newline(&mut self) {
        if self.last_char == Some('\n') || self.builder.is_empty() {
            return;
        }
        self.push_char('\n');
    }

    fn line_break(&mut self) {
        if self.builder.is_empty() {
            return;
        }
        self.push_char('\n');
    }

    fn push_char(&mut self, ch: char) {
        self.builder.push(ch);
        self.last_char = Some(ch);
    }
}
