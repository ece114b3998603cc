//! HTML Serializer
//!
//! Writes a document (or part of it) back to markup. Text nodes are written as
//! stored, attribute values are escaped.

use super::html_parser::is_void_element;
use super::node::{Document, NodeData, NodeId};

pub fn serialize_children(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    for child in doc.children(id) {
        write_node(doc, *child, &mut out);
    }
    out
}

pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        NodeData::Root => {
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
        }
        NodeData::Text(text) => out.push_str(text),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for attr in &el.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(&attr.value));
                out.push('"');
            }
            out.push('>');
            if is_void_element(&el.name) {
                return;
            }
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use crate::dom::node::Document;

    #[test]
    fn test_serialize_parsed_markup() {
        let html = r#"<p class="x">Hello <b>there</b><br></p><!--c-->"#;
        let doc = Document::parse(html);
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let doc = Document::parse(r#"<a title='say "hi"'>x</a>"#);
        assert_eq!(doc.to_html(), r#"<a title="say &quot;hi&quot;">x</a>"#);
    }
}
