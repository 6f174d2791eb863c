use std::sync::OnceLock;

use regex::Regex;

use crate::dom::{Dom, DomNodeId, is_block_tag};

fn whitespace_run() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"[ \t\n\r\x0C]+").expect("Invalid whitespace regex"))
}

/// Collapses whitespace the way a browser lays out `white-space: normal`
/// text, so the result can be shown with `pre-wrap` unchanged.
///
/// Runs become a single space. A leading space is dropped at the start of a
/// line box (no previous inline content, or right after a block or `<br>`);
/// a trailing space likewise at the end of one.
pub fn normal_to_pre_wrap(dom: &Dom, node: DomNodeId) -> String {
    let raw = dom.text(node).unwrap_or_default();
    let collapsed = whitespace_run().replace_all(raw, " ");
    let mut text: &str = &collapsed;
    if text.starts_with(' ') && at_line_start(dom, node) {
        text = &text[1..];
    }
    if text.ends_with(' ') && at_line_end(dom, node) {
        text = &text[..text.len() - 1];
    }
    text.to_string()
}

fn is_break(dom: &Dom, node: DomNodeId) -> bool {
    dom.tag(node)
        .is_some_and(|tag| is_block_tag(tag) || tag == "br")
}

fn at_line_start(dom: &Dom, node: DomNodeId) -> bool {
    let mut current = node;
    loop {
        if let Some(previous) = dom.previous_sibling(current) {
            return is_break(dom, previous);
        }
        match dom.parent(current) {
            Some(parent) if !is_break(dom, parent) => current = parent,
            _ => return true,
        }
    }
}

fn at_line_end(dom: &Dom, node: DomNodeId) -> bool {
    let mut current = node;
    loop {
        if let Some(next) = dom.next_sibling(current) {
            return is_break(dom, next);
        }
        match dom.parent(current) {
            Some(parent) if !is_break(dom, parent) => current = parent,
            _ => return true,
        }
    }
}
