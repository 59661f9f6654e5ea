//! Reading and writing `strings.xml` files as [`ResourceDocument`]s.
//!
//! Top-level entries and comments become nodes; everything inside an entry is
//! kept as raw `quick-xml` events so the payload is written back untouched.
//! Whitespace between top-level nodes is not kept: output always uses one tab
//! per node and a newline before the closing root tag.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read, Write},
    path::Path,
};

use encoding_rs_io::DecodeReaderBytesBuilder;
use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::Error,
    traits::Parser,
    types::{
        Attribute, CommentNode, EntryKind, Node, Payload, ResourceDocument, ResourceEntry,
        TOOLS_NAMESPACE, namespace_uri, text_event,
    },
};

impl Parser for ResourceDocument {
    /// Parse from any reader. A byte-order mark selects the input encoding.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut decoder = DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(reader);
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded)?;
        parse_document(&decoded)
    }

    /// Parse from file path, attaching the path to any error.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::from_io(path, "open", e))?;
        Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            // Undecodable bytes are a content problem, not a disk one.
            Error::Io(source) if source.kind() == io::ErrorKind::InvalidData => {
                Error::MalformedDocument {
                    path: path.to_path_buf(),
                    message: source.to_string(),
                }
            }
            Error::Io(source) => Error::from_io(path, "read", source),
            Error::Xml(_) | Error::InvalidDocument(_) => Error::MalformedDocument {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
            other => other,
        })
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new(&mut writer);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(text_event("\n"))?;

        let mut root = BytesStart::new(self.root.as_str());
        for ns in &self.namespaces {
            root.push_attribute(ns.as_xml());
        }
        xml_writer.write_event(Event::Start(root))?;
        xml_writer.write_event(text_event(if self.is_empty() { "\n" } else { "\n\t" }))?;

        let last = self.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            write_node(&mut xml_writer, &child.node)?;
            // Unindent the closing root tag.
            let tail = if i == last { "\n" } else { child.tail.as_str() };
            xml_writer.write_event(text_event(tail))?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new(self.root.as_str())))?;
        xml_writer.write_event(text_event("\n"))?;
        Ok(())
    }
}

fn write_node<W: Write>(xml_writer: &mut Writer<W>, node: &Node) -> Result<(), Error> {
    match node {
        Node::Comment(comment) => {
            xml_writer.write_event(Event::Comment(BytesText::from_escaped(
                comment.text.as_str(),
            )))?;
        }
        Node::Entry(entry) => {
            let start = entry.start_tag();
            match &entry.payload {
                Payload::Empty => xml_writer.write_event(Event::Empty(start))?,
                Payload::Content(events) => {
                    xml_writer.write_event(Event::Start(start))?;
                    for event in events {
                        xml_writer.write_event(event.clone())?;
                    }
                    xml_writer.write_event(Event::End(BytesEnd::new(entry.kind.tag())))?;
                }
            }
        }
    }
    Ok(())
}

fn parse_document(xml: &str) -> Result<ResourceDocument, Error> {
    let mut reader = Reader::from_str(xml);

    // Skip the prolog (declaration, doctype, leading comments) up to the root element.
    let (mut document, open) = loop {
        match reader.read_event()? {
            Event::Start(e) => break (open_root(&e)?, true),
            Event::Empty(e) => break (open_root(&e)?, false),
            Event::Text(t) => reject_text(&t, "the document")?,
            Event::Eof => {
                return Err(Error::InvalidDocument("missing root element".to_string()));
            }
            _ => {}
        }
    };

    while open {
        match reader.read_event()? {
            Event::Start(e) => {
                let mut entry = parse_entry_start(&e, &document.namespaces)?;
                entry.payload = Payload::Content(read_payload(&mut reader)?);
                document.push(Node::Entry(entry));
            }
            Event::Empty(e) => {
                let entry = parse_entry_start(&e, &document.namespaces)?;
                document.push(Node::Entry(entry));
            }
            Event::Comment(c) => {
                let text = utf8(&c)?;
                document.push(Node::Comment(CommentNode::new(text)));
            }
            Event::Text(t) => reject_text(&t, &format!("<{}>", document.root))?,
            Event::CData(_) => {
                return Err(Error::InvalidDocument(format!(
                    "unexpected CDATA directly inside <{}>",
                    document.root
                )));
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(Error::InvalidDocument(format!(
                    "unexpected end of file inside <{}>",
                    document.root
                )));
            }
            // Processing instructions.
            _ => {}
        }
    }

    // Only comments, processing instructions and whitespace may follow the root.
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                return Err(Error::InvalidDocument(format!(
                    "unexpected <{}> after </{}>",
                    utf8(e.name().as_ref())?,
                    document.root
                )));
            }
            Event::Text(t) => reject_text(&t, &format!("the tail after </{}>", document.root))?,
            Event::CData(_) => {
                return Err(Error::InvalidDocument(format!(
                    "unexpected CDATA after </{}>",
                    document.root
                )));
            }
            _ => {}
        }
    }
    Ok(document)
}

/// Whitespace between nodes is layout; any other text outside an entry is an error.
fn reject_text(text: &BytesText, context: &str) -> Result<(), Error> {
    if text.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    Err(Error::InvalidDocument(format!(
        "unexpected text `{}` outside an entry in {}",
        String::from_utf8_lossy(text).trim(),
        context
    )))
}

fn open_root(start: &BytesStart) -> Result<ResourceDocument, Error> {
    let mut document = ResourceDocument::new();
    document.root = utf8(start.name().as_ref())?;
    document.namespaces = parse_attributes(start)?
        .into_iter()
        .filter(Attribute::is_namespace_declaration)
        .collect();
    Ok(document)
}

fn parse_entry_start(start: &BytesStart, root_namespaces: &[Attribute]) -> Result<ResourceEntry, Error> {
    let kind = EntryKind::from_tag(&utf8(start.name().as_ref())?);
    let attributes = parse_attributes(start)?;
    let ignore_marker = resolve_ignore_marker(&attributes, root_namespaces);
    Ok(ResourceEntry {
        kind,
        attributes,
        ignore_marker,
        payload: Payload::Empty,
    })
}

fn parse_attributes(start: &BytesStart) -> Result<Vec<Attribute>, Error> {
    let mut attributes = Vec::new();
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::InvalidDocument(e.to_string()))?;
        attributes.push(Attribute {
            key: utf8(attr.key.as_ref())?,
            value: attr.unescape_value()?.into_owned(),
            raw: utf8(&attr.value)?,
        });
    }
    Ok(attributes)
}

/// Finds an `ignore` attribute whose prefix is bound to the tools namespace,
/// either on the element itself or on the root.
fn resolve_ignore_marker(attributes: &[Attribute], root_namespaces: &[Attribute]) -> Option<String> {
    attributes.iter().find_map(|attr| {
        let (Some(prefix), "ignore") = attr.prefix_and_local() else {
            return None;
        };
        let uri = namespace_uri(attributes, prefix).or_else(|| namespace_uri(root_namespaces, prefix))?;
        (uri == TOOLS_NAMESPACE).then(|| attr.value.clone())
    })
}

/// Collects the events of an entry body up to its matching end tag.
fn read_payload(reader: &mut Reader<&[u8]>) -> Result<Vec<Event<'static>>, Error> {
    let mut events = Vec::new();
    let mut depth = 0usize;
    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(events),
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(Error::InvalidDocument(
                    "unexpected end of file inside entry".to_string(),
                ));
            }
            _ => {}
        }
        events.push(event.into_owned());
    }
}

fn utf8(bytes: &[u8]) -> Result<String, Error> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::InvalidDocument(e.to_string()))
}
