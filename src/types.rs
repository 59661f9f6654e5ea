//! Core types for i18n-atlas.
//! The XML codec decodes `strings.xml` files into these; the pipelines reshape them.

use std::{borrow::Cow, fmt::Display};

use quick_xml::{
    escape::escape,
    events::{BytesStart, BytesText, Event, attributes::Attribute as XmlAttribute},
};

use crate::error::Error;

/// Namespace URI of the Android `tools:` attributes.
pub const TOOLS_NAMESPACE: &str = "http://schemas.android.com/tools";

/// Name of the root element of a resource file.
pub const RESOURCES_TAG: &str = "resources";

/// Attribute holding an entry's key.
pub const NAME_ATTRIBUTE: &str = "name";

/// Attribute that opts an entry out of translation when set to `false`.
pub const TRANSLATABLE_ATTRIBUTE: &str = "translatable";

/// The element kind of a resource entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// `<string>`
    String,
    /// `<string-array>`
    StringArray,
    /// `<plurals>`
    Plurals,
    /// Any other element (`<color>`, `<dimen>`, `<integer-array>`, ...).
    Other(String),
}

impl EntryKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => EntryKind::String,
            "string-array" => EntryKind::StringArray,
            "plurals" => EntryKind::Plurals,
            other => EntryKind::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            EntryKind::String => "string",
            EntryKind::StringArray => "string-array",
            EntryKind::Plurals => "plurals",
            EntryKind::Other(tag) => tag,
        }
    }

    /// Only these kinds are picked up by translation vendors.
    pub fn is_translatable(&self) -> bool {
        !matches!(self, EntryKind::Other(_))
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// An element attribute.
///
/// `raw` is the value exactly as it appeared in the source (still escaped) and
/// is what gets written back; `value` is its unescaped form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
    pub raw: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Attribute {
            key: key.into(),
            raw: escape(value.as_str()).into_owned(),
            value,
        }
    }

    /// Splits a qualified key into `(prefix, local_name)`.
    pub fn prefix_and_local(&self) -> (Option<&str>, &str) {
        match self.key.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, self.key.as_str()),
        }
    }

    /// Whether this attribute is a namespace declaration (`xmlns` or `xmlns:*`).
    pub fn is_namespace_declaration(&self) -> bool {
        self.key == "xmlns" || self.key.starts_with("xmlns:")
    }

    pub(crate) fn as_xml(&self) -> XmlAttribute<'_> {
        // Values read from single-quoted attributes may hold a bare `"`.
        if self.raw.contains('"') {
            XmlAttribute::from((self.key.as_str(), self.value.as_str()))
        } else {
            XmlAttribute::from((self.key.as_bytes(), self.raw.as_bytes()))
        }
    }
}

/// The content between an entry's start and end tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The entry was written as a self-closing tag.
    Empty,
    /// Raw XML events, kept verbatim and never interpreted.
    Content(Vec<Event<'static>>),
}

/// One top-level element of a resource file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub kind: EntryKind,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Value of the `tools:ignore` attribute, resolved against the namespace
    /// declarations in scope when the entry was parsed.
    pub ignore_marker: Option<String>,
    pub payload: Payload,
}

impl ResourceEntry {
    /// Creates an entry of `kind` with a `name` attribute and an empty body.
    pub fn new(kind: EntryKind, key: impl Into<String>) -> Self {
        ResourceEntry {
            kind,
            attributes: vec![Attribute::new(NAME_ATTRIBUTE, key)],
            ignore_marker: None,
            payload: Payload::Content(Vec::new()),
        }
    }

    /// Creates a `<string>` entry holding `text`.
    pub fn string(key: impl Into<String>, text: &str) -> Self {
        let mut entry = ResourceEntry::new(EntryKind::String, key);
        entry.payload = Payload::Content(vec![Event::Text(BytesText::new(text).into_owned())]);
        entry
    }

    /// Returns a copy with `key = value` set, keeping the attribute's position if present.
    pub fn with_attribute(&self, key: &str, value: &str) -> Self {
        let mut entry = self.clone();
        match entry.attributes.iter_mut().find(|a| a.key == key) {
            Some(attr) => *attr = Attribute::new(key, value),
            None => entry.attributes.push(Attribute::new(key, value)),
        }
        entry
    }

    /// Returns a copy carrying a `tools:ignore` marker.
    pub fn with_tool_ignore(&self, value: &str) -> Self {
        let mut entry = self.with_attribute("tools:ignore", value);
        entry.ignore_marker = Some(value.to_string());
        entry
    }

    /// Returns a copy whose `name` attribute is `key`.
    pub fn with_key(&self, key: &str) -> Self {
        self.with_attribute(NAME_ATTRIBUTE, key)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// The entry's key (its `name` attribute).
    pub fn key(&self) -> Option<&str> {
        self.attribute(NAME_ATTRIBUTE)
    }

    /// Absent or anything other than the literal `false` means translatable.
    pub fn is_translatable(&self) -> bool {
        self.attribute(TRANSLATABLE_ATTRIBUTE) != Some("false")
    }

    pub fn is_tool_ignored(&self) -> bool {
        self.ignore_marker.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Concatenated, unescaped character data of the payload.
    pub fn text(&self) -> Result<String, Error> {
        let mut out = String::new();
        if let Payload::Content(events) = &self.payload {
            for event in events {
                match event {
                    Event::Text(t) => out.push_str(&t.unescape()?),
                    Event::CData(c) => out.push_str(&String::from_utf8_lossy(c)),
                    _ => {}
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn start_tag(&self) -> BytesStart<'_> {
        let mut start = BytesStart::new(self.kind.tag());
        for attr in &self.attributes {
            start.push_attribute(attr.as_xml());
        }
        start
    }
}

/// A free-standing top-level comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    /// Raw comment text between `<!--` and `-->`.
    pub text: String,
}

impl CommentNode {
    pub fn new(text: impl Into<String>) -> Self {
        CommentNode { text: text.into() }
    }

    /// Checks that the text can be written back as an XML comment.
    pub fn validate(&self) -> Result<(), Error> {
        if self.text.contains("--") || self.text.ends_with('-') {
            return Err(Error::InvalidDocument(format!(
                "comment `{}` cannot be serialized",
                self.text
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Entry(ResourceEntry),
    Comment(CommentNode),
}

/// Whitespace written after a top-level node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    /// Newline followed by one tab.
    #[default]
    Indent,
    /// Blank line followed by one tab, used between modules.
    Blank,
}

impl Spacing {
    pub fn as_str(self) -> &'static str {
        match self {
            Spacing::Indent => "\n\t",
            Spacing::Blank => "\n\n\t",
        }
    }
}

/// A top-level node plus the whitespace that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub node: Node,
    pub tail: Spacing,
}

/// One `strings.xml` file: the root element's namespace declarations and its
/// ordered top-level entries and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDocument {
    pub root: String,
    pub namespaces: Vec<Attribute>,
    pub children: Vec<Child>,
}

impl Default for ResourceDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDocument {
    pub fn new() -> Self {
        ResourceDocument {
            root: RESOURCES_TAG.to_string(),
            namespaces: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().map(|c| &c.node)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.nodes().filter_map(|n| match n {
            Node::Entry(e) => Some(e),
            Node::Comment(_) => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &CommentNode> {
        self.nodes().filter_map(|n| match n {
            Node::Comment(c) => Some(c),
            Node::Entry(_) => None,
        })
    }

    pub fn find_entry(&self, key: &str) -> Option<&ResourceEntry> {
        self.entries().find(|e| e.key() == Some(key))
    }

    /// The comment attached to the node at `index`: the node immediately before it,
    /// if that node is a comment.
    pub fn attached_comment(&self, index: usize) -> Option<&CommentNode> {
        let previous = index.checked_sub(1)?;
        match &self.children.get(previous)?.node {
            Node::Comment(c) => Some(c),
            Node::Entry(_) => None,
        }
    }

    /// Iterates entries as `(position, entry, attached comment)`, positions 1-based
    /// among all top-level nodes.
    pub fn entries_with_comments(
        &self,
    ) -> impl Iterator<Item = (usize, &ResourceEntry, Option<&CommentNode>)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(move |(i, child)| match &child.node {
                Node::Entry(e) => Some((i + 1, e, self.attached_comment(i))),
                Node::Comment(_) => None,
            })
    }

    /// Appends a node with single-level indentation.
    pub fn push(&mut self, node: Node) {
        self.children.push(Child {
            node,
            tail: Spacing::Indent,
        });
    }

    /// Appends `entry`, preceded by the comment attached to it in its source document.
    pub fn append_with_comment(
        &mut self,
        entry: ResourceEntry,
        comment: Option<&CommentNode>,
    ) -> Result<(), Error> {
        if entry.kind.tag().is_empty() {
            return Err(Error::InvalidDocument("entry without a tag name".to_string()));
        }
        if let Some(comment) = comment {
            comment.validate()?;
            self.push(Node::Comment(comment.clone()));
        }
        self.push(Node::Entry(entry));
        Ok(())
    }

    /// Puts a blank line after the current last node.
    pub fn mark_section_end(&mut self) {
        if let Some(last) = self.children.last_mut() {
            last.tail = Spacing::Blank;
        }
    }

    /// Adds the prefixed (`xmlns:*`) declarations of `namespaces` that are not
    /// declared yet. A default `xmlns` is never adopted.
    pub fn adopt_namespaces(&mut self, namespaces: &[Attribute]) {
        for ns in namespaces.iter().filter(|ns| ns.key.starts_with("xmlns:")) {
            if !self.namespaces.iter().any(|own| own.key == ns.key) {
                self.namespaces.push(ns.clone());
            }
        }
    }

    /// Resolves a namespace prefix declared on the root element.
    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        namespace_uri(&self.namespaces, prefix)
    }
}

pub(crate) fn namespace_uri<'a>(declarations: &'a [Attribute], prefix: &str) -> Option<&'a str> {
    declarations
        .iter()
        .rev()
        .find(|a| a.key.strip_prefix("xmlns:") == Some(prefix))
        .map(|a| a.value.as_str())
}

pub(crate) fn text_event(s: &str) -> Event<'_> {
    Event::Text(BytesText::from_escaped(Cow::Borrowed(s)))
}
