//! Minimal mutable XML element tree over quick-xml.
//!
//! Office parts are small enough to hold in memory, and every edit the tools
//! make (clearing paragraphs, inserting runs, rewriting slide lists) is a tree
//! operation. The tree keeps attribute order, comments and processing
//! instructions so untouched content survives a round trip.

use crate::error::{Error, Result};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Write as FmtWrite;

/// The standard declaration written at the top of every Office part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl Node {
    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the element mutably if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

/// An XML element with qualified name, ordered attributes and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Qualified name as written in the source (e.g. `p:sp`).
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

/// Split a qualified name into its local part.
pub fn local_name(qname: &str) -> &str {
    match qname.rfind(':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    }
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder: append a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Local part of the element name.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Whether the element's local name matches.
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute by exact qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute by local name, ignoring any prefix.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Parse an attribute as a number.
    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    /// Set or replace an attribute, keeping its position when it exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Remove an attribute by qualified name.
    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|(k, _)| k != name);
    }

    /// Iterate over child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Iterate over child elements mutably.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(local))
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(local))
    }

    /// Child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.is(local))
    }

    /// Follow a chain of local names through first matching children.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        let mut current = self;
        for local in path {
            current = current.child(local)?;
        }
        Some(current)
    }

    /// Mutable variant of [`Element::find`].
    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for local in path {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// All descendant elements in document order (self excluded).
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        fn walk<'a>(e: &'a Element, out: &mut Vec<&'a Element>) {
            for child in e.elements() {
                out.push(child);
                walk(child, out);
            }
        }
        walk(self, &mut out);
        out
    }

    /// First descendant (self excluded) with the given local name.
    pub fn first_descendant(&self, local: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.is(local) {
                return Some(child);
            }
            if let Some(found) = child.first_descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        fn walk(e: &Element, out: &mut String) {
            for child in &e.children {
                match child {
                    Node::Text(t) | Node::CData(t) => out.push_str(t),
                    Node::Element(el) => walk(el, out),
                    _ => {}
                }
            }
        }
        walk(self, &mut out);
        out
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Append a child element and return a mutable reference to it.
    pub fn push(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        match self.children.last_mut() {
            Some(Node::Element(e)) => e,
            _ => unreachable!("element was just pushed"),
        }
    }

    /// Insert a child element before the first child whose local name is in
    /// `before`, or append when none is present. Keeps schema ordering for
    /// sequences like `a:pPr` or `p:spPr`.
    pub fn insert_before(&mut self, child: Element, before: &[&str]) -> &mut Element {
        let pos = self.children.iter().position(|n| {
            n.as_element()
                .map(|e| before.contains(&e.local_name()))
                .unwrap_or(false)
        });
        let idx = match pos {
            Some(idx) => {
                self.children.insert(idx, Node::Element(child));
                idx
            }
            None => {
                self.children.push(Node::Element(child));
                self.children.len() - 1
            }
        };
        match &mut self.children[idx] {
            Node::Element(e) => e,
            _ => unreachable!("element was just inserted"),
        }
    }

    /// Get the first child with `local` name, inserting `make()` (ordered by
    /// `before`) when missing.
    pub fn get_or_insert(
        &mut self,
        local: &str,
        before: &[&str],
        make: impl FnOnce() -> Element,
    ) -> &mut Element {
        if let Some(idx) = self
            .children
            .iter()
            .position(|n| n.as_element().map(|e| e.is(local)).unwrap_or(false))
        {
            match &mut self.children[idx] {
                Node::Element(e) => e,
                _ => unreachable!("position matched an element"),
            }
        } else {
            self.insert_before(make(), before)
        }
    }

    /// Remove child elements matching a predicate.
    pub fn remove_elements(&mut self, mut pred: impl FnMut(&Element) -> bool) {
        self.children.retain(|n| match n {
            Node::Element(e) => !pred(e),
            _ => true,
        });
    }

    /// Element at a path of child-node indices.
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &idx in path {
            current = current.children.get(idx)?.as_element()?;
        }
        Some(current)
    }

    /// Mutable element at a path of child-node indices.
    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &idx in path {
            current = current.children.get_mut(idx)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Namespace prefixes declared on this element (`xmlns:x`).
    pub fn declared_prefixes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter_map(|(k, _)| k.strip_prefix("xmlns:"))
            .collect()
    }

    fn write_start(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", k, escape(v.as_str()));
        }
    }

    fn write_compact(&self, out: &mut String) {
        self.write_start(out);
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            write_node(child, out);
        }
        let _ = write!(out, "</{}>", self.name);
    }

    /// Whether the element only holds element children and blank text, so
    /// its layout whitespace can be regenerated.
    fn is_structural(&self) -> bool {
        self.elements().next().is_some()
            && self.children.iter().all(|n| match n {
                Node::Text(t) => t.trim().is_empty(),
                Node::CData(_) => false,
                _ => true,
            })
    }

    fn write_pretty(&self, out: &mut String, indent: &str, depth: usize) {
        let pad = indent.repeat(depth);
        out.push_str(&pad);
        if !self.is_structural() {
            self.write_compact(out);
            out.push('\n');
            return;
        }
        self.write_start(out);
        out.push_str(">\n");
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_pretty(out, indent, depth + 1),
                Node::Text(_) => {}
                other => {
                    out.push_str(&indent.repeat(depth + 1));
                    write_node(other, out);
                    out.push('\n');
                }
            }
        }
        let _ = writeln!(out, "{}</{}>", pad, self.name);
    }

    /// Drop blank text nodes (except inside `*:t` text elements) and
    /// comments throughout the subtree.
    pub fn condense(&mut self) {
        let keep_blank = self.is("t");
        self.children.retain(|n| match n {
            Node::Comment(_) => false,
            n if n.is_blank_text() => keep_blank,
            _ => true,
        });
        for child in self.elements_mut() {
            child.condense();
        }
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(e) => e.write_compact(out),
        Node::Text(t) => out.push_str(&partial_escape(t.as_str())),
        Node::CData(t) => {
            let _ = write!(out, "<![CDATA[{}]]>", t);
        }
        Node::Comment(t) => {
            let _ = write!(out, "<!--{}-->", t);
        }
        Node::ProcessingInstruction(t) => {
            let _ = write!(out, "<?{}?>", t);
        }
    }
}

/// A parsed XML document: prolog nodes and the root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Comments and processing instructions before the root element.
    pub prolog: Vec<Node>,
    /// The document element.
    pub root: Element,
}

impl Document {
    /// Wrap a root element.
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
        }
    }

    /// Parse XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        parse(xml)
    }

    /// Serialize compactly with the standard declaration.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        for node in &self.prolog {
            write_node(node, &mut out);
        }
        self.root.write_compact(&mut out);
        out
    }

    /// Serialize with one element per line and `indent` per level. Elements
    /// carrying text are written inline so their content is unchanged.
    pub fn to_pretty_string(&self, indent: &str) -> String {
        let mut out = String::with_capacity(8192);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        for node in &self.prolog {
            write_node(node, &mut out);
            out.push('\n');
        }
        self.root.write_pretty(&mut out, indent, 0);
        out
    }

    /// Remove layout whitespace and comments (see [`Element::condense`]).
    pub fn condense(&mut self) {
        self.prolog.retain(|n| !matches!(n, Node::Comment(_)));
        self.root.condense();
    }
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(xml: &str, pos: usize) -> usize {
    let end = pos.min(xml.len());
    xml.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

fn syntax_error(xml: &str, pos: usize, msg: impl std::fmt::Display) -> Error {
    Error::XmlParse(format!("Line {}: {}", line_of(xml, pos), msg))
}

/// Parse XML text into a [`Document`].
///
/// Mismatched or unclosed tags, multiple root elements and text outside the
/// root are rejected; the error message starts with the line number.
pub fn parse(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = true;

    let mut prolog = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| syntax_error(xml, reader.error_position() as usize, e))?;

        match event {
            Event::Start(e) => {
                if root.is_some() && stack.is_empty() {
                    return Err(syntax_error(xml, pos, "multiple root elements"));
                }
                stack.push(start_element(&e, xml, pos)?);
            }
            Event::Empty(e) => {
                let element = start_element(&e, xml, pos)?;
                attach(&mut stack, &mut root, element, xml, pos)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| syntax_error(xml, pos, "unexpected closing tag"))?;
                attach(&mut stack, &mut root, element, xml, pos)?;
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| syntax_error(xml, pos, e))?
                    .into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(text)),
                    None if text.trim().is_empty() => {}
                    None => return Err(syntax_error(xml, pos, "text outside the root element")),
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::CData(text)),
                    None => return Err(syntax_error(xml, pos, "CDATA outside the root element")),
                }
            }
            Event::Comment(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Comment(text)),
                    None if root.is_none() => prolog.push(Node::Comment(text)),
                    None => {}
                }
            }
            Event::PI(pi) => {
                let text = String::from_utf8_lossy(&pi).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::ProcessingInstruction(text)),
                    None if root.is_none() => prolog.push(Node::ProcessingInstruction(text)),
                    None => {}
                }
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(syntax_error(
            xml,
            xml.len(),
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.map(|root| Document { prolog, root })
        .ok_or_else(|| Error::XmlParse("Line 1: no root element".to_string()))
}

fn start_element(
    e: &quick_xml::events::BytesStart<'_>,
    xml: &str,
    pos: usize,
) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|err| syntax_error(xml, pos, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| syntax_error(xml, pos, err))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    xml: &str,
    pos: usize,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(syntax_error(xml, pos, "multiple root elements")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:sp>
        <p:txBody>
          <a:p><a:r><a:t>Fish &amp; Chips</a:t></a:r></a:p>
          <a:p><a:r><a:t xml:space="preserve"> </a:t></a:r></a:p>
        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_and_navigate() {
        let doc = parse(SLIDE).unwrap();
        assert_eq!(doc.root.name, "p:sld");
        let body = doc
            .root
            .find(&["cSld", "spTree", "sp", "txBody"])
            .unwrap();
        assert_eq!(body.children_named("p").count(), 2);
        assert!(body.text().contains("Fish & Chips"));
        assert_eq!(doc.root.declared_prefixes(), vec!["a", "p"]);
    }

    #[test]
    fn test_compact_output_escapes() {
        let doc = parse(SLIDE).unwrap();
        let out = doc.to_xml_string();
        assert!(out.starts_with(XML_DECLARATION));
        assert!(out.contains("Fish &amp; Chips"));
        let reparsed = parse(&out).unwrap();
        assert_eq!(reparsed.root.text(), doc.root.text());
    }

    #[test]
    fn test_condense_keeps_text_whitespace() {
        let mut doc = parse(SLIDE).unwrap();
        doc.condense();
        let out = doc.to_xml_string();
        assert!(out.contains("<p:cSld><p:spTree>"));
        assert!(out.contains(r#"<a:t xml:space="preserve"> </a:t>"#));
    }

    #[test]
    fn test_pretty_then_condense_is_stable() {
        let mut doc = parse(SLIDE).unwrap();
        doc.condense();
        let compact = doc.to_xml_string();

        let pretty = doc.to_pretty_string("  ");
        assert!(pretty.contains("\n  <p:cSld>\n"));
        let mut again = parse(&pretty).unwrap();
        again.condense();
        assert_eq!(again.to_xml_string(), compact);
    }

    #[test]
    fn test_mismatched_tag_reports_line() {
        let err = parse("<a>\n<b>\n</c>\n</a>").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Line 3"), "{}", msg);
    }

    #[test]
    fn test_unclosed_and_multiple_roots() {
        assert!(parse("<a><b></b>").is_err());
        assert!(parse("<a/><b/>").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn test_insert_before_keeps_order() {
        let mut ppr = Element::new("a:pPr").with_child(Element::new("a:buChar"));
        ppr.insert_before(Element::new("a:spcBef"), &["buChar"]);
        ppr.insert_before(Element::new("a:lnSpc"), &["spcBef", "buChar"]);
        let names: Vec<_> = ppr.elements().map(|e| e.local_name().to_string()).collect();
        assert_eq!(names, vec!["lnSpc", "spcBef", "buChar"]);
    }

    #[test]
    fn test_element_paths() {
        let doc = parse("<r><x/><y><z k=\"1\"/></y></r>").unwrap();
        let z = doc.root.element_at(&[1, 0]).unwrap();
        assert_eq!(z.attr("k"), Some("1"));
        assert!(doc.root.element_at(&[5]).is_none());
    }
}
