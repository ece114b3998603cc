//! HTML Fragment Parser
//!
//! A lenient fragment parser that builds a [`Document`] from markup. It never
//! fails: stray closing tags are ignored, unclosed elements are closed at the end
//! of input, and a `<` that does not start a tag is kept as text.
//!
//! Text is kept exactly as written (entities included) so that offsets found by
//! the string hook finder map back onto the source characters. Attribute values
//! are entity-decoded.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::entities::decode_entities;
use super::node::{Document, ElementData, NodeId};
use crate::chars;

pub static VOID_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ])
});

/// Elements whose opening tag implicitly closes an open `<p>`
static CLOSES_PARAGRAPH: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form",
        "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "main", "nav", "ol", "p",
        "pre", "section", "table", "ul",
    ])
});

static RAW_TEXT_ELEMENTS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["script", "style", "textarea", "title"]));

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(name.to_ascii_lowercase().as_str())
}

/// Parses `html` into a fresh document.
pub fn parse_fragment(html: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    parse_into(&mut doc, root, html);
    doc
}

/// Parses `html` and appends the resulting nodes to `parent`.
pub fn parse_into(doc: &mut Document, parent: NodeId, html: &str) {
    let mut parser = FragmentParser {
        input: html,
        pos: 0,
        doc,
        stack: vec![parent],
        text_start: None,
    };
    parser.run();
}

struct FragmentParser<'a, 'd> {
    input: &'a str,
    pos: usize,
    doc: &'d mut Document,
    /// Open elements; the bottom entry is the fragment parent
    stack: Vec<NodeId>,
    text_start: Option<usize>,
}

impl<'a, 'd> FragmentParser<'a, 'd> {
    fn run(&mut self) {
        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];
            if rest.starts_with("<!--") {
                self.flush_text();
                self.consume_comment();
            } else if rest.starts_with("</") && starts_tag_name(&rest[2..]) {
                self.flush_text();
                self.consume_closing_tag();
            } else if rest.starts_with('<') && starts_tag_name(&rest[1..]) {
                self.flush_text();
                self.consume_opening_tag();
            } else {
                if self.text_start.is_none() {
                    self.text_start = Some(self.pos);
                }
                self.pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
        self.flush_text();
    }

    fn current(&self) -> NodeId {
        self.stack[self.stack.len() - 1]
    }

    fn current_name(&self) -> Option<String> {
        if self.stack.len() < 2 {
            return None;
        }
        self.doc
            .element(self.current())
            .map(|el| el.name.to_ascii_lowercase())
    }

    fn flush_text(&mut self) {
        if let Some(start) = self.text_start.take() {
            if start < self.pos {
                let text = self.doc.create_text(&self.input[start..self.pos]);
                let parent = self.current();
                self.doc.append_child(parent, text);
            }
        }
    }

    fn consume_comment(&mut self) {
        let body_start = self.pos + 4;
        let (body_end, next) = match self.input[body_start..].find("-->") {
            Some(offset) => (body_start + offset, body_start + offset + 3),
            None => (self.input.len(), self.input.len()),
        };
        let comment = self.doc.create_comment(&self.input[body_start..body_end]);
        let parent = self.current();
        self.doc.append_child(parent, comment);
        self.pos = next;
    }

    fn consume_closing_tag(&mut self) {
        self.pos += 2;
        let name = self.read_tag_name().to_ascii_lowercase();
        match self.input[self.pos..].find('>') {
            Some(offset) => self.pos += offset + 1,
            None => self.pos = self.input.len(),
        }

        // Pop up to and including the matching open element; ignore strays
        let found = self.stack[1..].iter().rposition(|id| {
            self.doc
                .element(*id)
                .is_some_and(|el| el.name.eq_ignore_ascii_case(&name))
        });
        if let Some(index) = found {
            self.stack.truncate(index + 1);
        }
    }

    fn consume_opening_tag(&mut self) {
        self.pos += 1;
        let name = self.read_tag_name();
        let mut element = ElementData::new(name.clone());
        let self_closing = self.read_attributes(&mut element);
        let lower = name.to_ascii_lowercase();

        if CLOSES_PARAGRAPH.contains(lower.as_str()) && self.current_name().as_deref() == Some("p") {
            self.stack.pop();
        }
        if lower == "li" && self.current_name().as_deref() == Some("li") {
            self.stack.pop();
        }

        let node = self.doc.create_element(element);
        let parent = self.current();
        self.doc.append_child(parent, node);

        if self_closing || VOID_ELEMENTS.contains(lower.as_str()) {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(lower.as_str()) {
            self.consume_raw_text(node, &lower);
            return;
        }
        self.stack.push(node);
    }

    fn consume_raw_text(&mut self, node: NodeId, name: &str) {
        let closing = format!("</{}", name);
        let rest = &self.input[self.pos..];
        let end = rest
            .to_ascii_lowercase()
            .find(&closing)
            .unwrap_or(rest.len());
        if end > 0 {
            let text = self.doc.create_text(&rest[..end]);
            self.doc.append_child(node, text);
        }
        self.pos += end;
        if self.pos < self.input.len() {
            match self.input[self.pos..].find('>') {
                Some(offset) => self.pos += offset + 1,
                None => self.pos = self.input.len(),
            }
        }
    }

    fn read_tag_name(&mut self) -> String {
        let rest = &self.input[self.pos..];
        let len = rest
            .find(|c: char| chars::is_whitespace(c) || c == chars::SLASH || c == chars::GT)
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len].to_string()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start_matches(chars::is_whitespace);
        self.pos += rest.len() - trimmed.len();
    }

    /// Reads attributes up to and including the closing `>` of the tag.
    /// Returns true if the tag was self-closing.
    fn read_attributes(&mut self, element: &mut ElementData) -> bool {
        loop {
            self.skip_whitespace();
            let rest = &self.input[self.pos..];
            if rest.is_empty() {
                return false;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return false;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let name_len = rest
                .find(|c: char| chars::is_whitespace(c) || matches!(c, '=' | '>' | '/'))
                .unwrap_or(rest.len());
            // A lone '=' would otherwise never advance
            let name_len = name_len.max(1);
            let name = rest[..name_len].to_string();
            self.pos += name_len;

            self.skip_whitespace();
            let value = if self.input[self.pos..].starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.read_attribute_value()
            } else {
                String::new()
            };
            element.set_attribute(&name, &decode_entities(&value));
        }
    }

    fn read_attribute_value(&mut self) -> String {
        let rest = &self.input[self.pos..];
        match rest.chars().next() {
            Some(quote) if quote == chars::DQ || quote == chars::SQ => {
                let body = &rest[1..];
                match body.find(quote) {
                    Some(end) => {
                        self.pos += end + 2;
                        body[..end].to_string()
                    }
                    None => {
                        self.pos = self.input.len();
                        body.to_string()
                    }
                }
            }
            _ => {
                let len = rest
                    .find(|c: char| chars::is_whitespace(c) || c == chars::GT)
                    .unwrap_or(rest.len());
                self.pos += len;
                rest[..len].to_string()
            }
        }
    }
}

fn starts_tag_name(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}
