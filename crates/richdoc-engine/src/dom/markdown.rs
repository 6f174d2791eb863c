use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{Dom, DomNodeId, DomNodeKind};

/// Builds a DOM from Markdown source, wrapped in a `div` root.
///
/// Supports the CommonMark block and inline constructs plus GFM tables and
/// strikethrough. Raw HTML is kept as text.
pub fn from_markdown(dom: &mut Dom, source: &str) -> DomNodeId {
    let root = dom.create_element("div");
    let mut builder = Builder {
        dom,
        stack: vec![root],
        in_table_head: false,
    };
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    for event in Parser::new_ext(source, options) {
        builder.event(event);
    }
    root
}

/// Like [`from_markdown`], for raw file contents.
pub fn from_markdown_bytes(dom: &mut Dom, bytes: &[u8]) -> anyhow::Result<DomNodeId> {
    let source = std::str::from_utf8(bytes)?;
    Ok(from_markdown(dom, source))
}

struct Builder<'a> {
    dom: &'a mut Dom,
    stack: Vec<DomNodeId>,
    in_table_head: bool,
}

impl Builder<'_> {
    fn current(&self) -> DomNodeId {
        // The root is never popped
        self.stack[self.stack.len() - 1]
    }

    fn append(&mut self, child: DomNodeId) {
        let parent = self.current();
        if let Err(err) = self.dom.append_child(parent, child) {
            log::warn!("Dropping markdown node: {err}");
        }
    }

    fn open(&mut self, tag: &str, attributes: Vec<(String, String)>) {
        let id = self.dom.create_element_with(tag, attributes);
        self.append(id);
        self.stack.push(id);
    }

    fn close(&mut self, count: usize) {
        for _ in 0..count {
            if self.stack.len() > 1 {
                self.stack.pop();
            }
        }
    }

    fn leaf(&mut self, tag: &str, attributes: Vec<(String, String)>) {
        let id = self.dom.create_element_with(tag, attributes);
        self.append(id);
    }

    /// Appends text, merging with a preceding text sibling.
    fn text(&mut self, content: &str) {
        let parent = self.current();
        if let Some(last) = self.dom.children(parent).last().copied()
            && let Ok(node) = self.dom.node(last)
            && let DomNodeKind::Text(existing) = node.kind()
        {
            let merged = format!("{existing}{content}");
            if self.dom.set_text(last, merged).is_ok() {
                return;
            }
        }
        let id = self.dom.create_text(content);
        self.append(id);
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            // These open two elements
            Event::End(TagEnd::TableHead) => {
                self.in_table_head = false;
                self.close(2);
            }
            Event::End(TagEnd::CodeBlock) => self.close(2),
            Event::End(_) => self.close(1),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => self.text(&text),
            Event::Code(code) => {
                self.open("code", Vec::new());
                self.text(&code);
                self.close(1);
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => self.text(&math),
            Event::FootnoteReference(label) => self.text(&format!("[^{label}]")),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.leaf("br", Vec::new()),
            Event::Rule => self.leaf("hr", Vec::new()),
            Event::TaskListMarker(checked) => {
                let mut attributes = vec![("type".to_string(), "checkbox".to_string())];
                if checked {
                    attributes.push(("checked".to_string(), String::new()));
                }
                self.leaf("input", attributes);
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open("p", Vec::new()),
            Tag::Heading { level, .. } => self.open(heading_tag(level), Vec::new()),
            Tag::BlockQuote(_) => self.open("blockquote", Vec::new()),
            Tag::CodeBlock(kind) => {
                self.open("pre", Vec::new());
                let attributes = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        vec![("class".to_string(), format!("language-{lang}"))]
                    }
                    _ => Vec::new(),
                };
                self.open("code", attributes);
            }
            Tag::List(Some(start)) => {
                let attributes = if start == 1 {
                    Vec::new()
                } else {
                    vec![("start".to_string(), start.to_string())]
                };
                self.open("ol", attributes);
            }
            Tag::List(None) => self.open("ul", Vec::new()),
            Tag::Item => self.open("li", Vec::new()),
            Tag::Table(_) => self.open("table", Vec::new()),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open("thead", Vec::new());
                self.open("tr", Vec::new());
            }
            Tag::TableRow => self.open("tr", Vec::new()),
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                self.open(tag, Vec::new());
            }
            Tag::Emphasis => self.open("em", Vec::new()),
            Tag::Strong => self.open("strong", Vec::new()),
            Tag::Strikethrough => self.open("s", Vec::new()),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut attributes = vec![("href".to_string(), dest_url.to_string())];
                if !title.is_empty() {
                    attributes.push(("title".to_string(), title.to_string()));
                }
                self.open("a", attributes);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut attributes = vec![("src".to_string(), dest_url.to_string())];
                if !title.is_empty() {
                    attributes.push(("title".to_string(), title.to_string()));
                }
                // Alt text events land inside; the reader ignores them
                self.open("img", attributes);
            }
            // Html blocks, footnotes, definition lists and the like
            _ => self.open("div", Vec::new()),
        }
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
