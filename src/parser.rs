use crate::document::Document;
use crate::error::{Error, Result};
use crate::value::{Map, Value};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use tracing::trace;

/// Options when parsing xml.
///
/// `attr_key`: key of the map holding an element's attributes.
/// `text_key`: key holding an element's text when it also has attributes or child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub attr_key: String,
    pub text_key: String,
}

impl Default for ReadOptions {
    fn default() -> ReadOptions {
        ReadOptions {
            attr_key: "$".to_string(),
            text_key: "_".to_string(),
        }
    }
}

/// Decode raw document bytes into a string.
///
/// A byte order mark wins. Otherwise the `encoding` of the xml declaration is used,
/// defaulting to UTF-8.
pub(crate) fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, bom_len) = match bytes {
        [0xef, 0xbb, 0xbf, ..] => (UTF_8, 3),
        [0xfe, 0xff, ..] => (UTF_16BE, 2),
        [0xff, 0xfe, ..] => (UTF_16LE, 2),
        [0x00, 0x3c, 0x00, 0x3f, ..] => (UTF_16BE, 0),
        [0x3c, 0x00, 0x3f, 0x00, ..] => (UTF_16LE, 0),
        _ => (declared_encoding(bytes)?, 0),
    };
    trace!(encoding = encoding.name(), "decoding document");
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or(Error::CannotDecode)
}

// Bytes are ASCII compatible here, so the declaration can be read before decoding.
fn declared_encoding(bytes: &[u8]) -> Result<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);
    let mut buf = Vec::with_capacity(100);
    let label = match reader.read_event(&mut buf)? {
        Event::Decl(ev) => match ev.encoding() {
            Some(label) => label?.into_owned(),
            None => return Ok(UTF_8),
        },
        _ => return Ok(UTF_8),
    };
    let encoding = Encoding::for_label(&label).ok_or(Error::CannotDecode)?;
    // A UTF-16 label on bytes that were not UTF-16 is a stale declaration.
    if encoding == UTF_16LE || encoding == UTF_16BE {
        return Ok(UTF_8);
    }
    Ok(encoding)
}

/// Element whose end tag hasn't been read yet.
struct OpenElement {
    name: String,
    attributes: Map,
    children: IndexMap<String, Vec<Value>>,
    text: String,
    // Whitespace was seen after the last piece of text.
    space_pending: bool,
}

impl OpenElement {
    fn from_start(ev: &BytesStart) -> Result<OpenElement> {
        let name = String::from_utf8(ev.name().to_vec())?;
        let mut attributes = Map::new();
        for attr in ev.attributes() {
            let attr = attr?;
            let key = String::from_utf8(attr.key.to_vec())?;
            let value = String::from_utf8(attr.unescaped_value()?.to_vec())?;
            attributes.insert(key, Value::Text(value));
        }
        Ok(OpenElement {
            name,
            attributes,
            children: IndexMap::new(),
            text: String::new(),
            space_pending: false,
        })
    }

    /// Appends character data trimmed at both ends.
    /// Whitespace between two pieces of text collapses to a single space.
    fn push_trimmed(&mut self, content: &str) {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            self.space_pending |= !content.is_empty();
            return;
        }
        if content.starts_with(char::is_whitespace) {
            self.space_pending = true;
        }
        self.push_raw(trimmed);
        self.space_pending = content.ends_with(char::is_whitespace);
    }

    fn push_raw(&mut self, content: &str) {
        if self.space_pending && !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(content);
        self.space_pending = false;
    }

    fn into_value(self, opts: &ReadOptions) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::Text(self.text);
        }
        let mut map = Map::with_capacity(self.children.len() + 2);
        if !self.attributes.is_empty() {
            map.insert(opts.attr_key.clone(), Value::Map(self.attributes));
        }
        for (name, values) in self.children {
            map.insert(name, Value::List(values));
        }
        if !self.text.is_empty() {
            map.insert(opts.text_key.clone(), Value::Text(self.text));
        }
        Value::Map(map)
    }
}

pub(crate) struct DocumentParser {
    read_opts: ReadOptions,
    version: String,
    standalone: bool,
    element_stack: Vec<OpenElement>,
    root: Option<(String, Value)>,
}

impl DocumentParser {
    pub(crate) fn new(opts: ReadOptions) -> DocumentParser {
        DocumentParser {
            read_opts: opts,
            version: "1.0".to_string(),
            standalone: false,
            element_stack: Vec::new(),
            root: None,
        }
    }

    pub(crate) fn parse_bytes(bytes: &[u8], opts: ReadOptions) -> Result<Document> {
        let text = decode(bytes)?;
        DocumentParser::parse_str(&text, opts)
    }

    pub(crate) fn parse_str(str: &str, opts: ReadOptions) -> Result<Document> {
        let mut parser = DocumentParser::new(opts);
        let mut reader = Reader::from_str(str);
        reader.trim_text(false);
        parser.parse_content(reader)?;
        parser.finish()
    }

    fn handle_decl(&mut self, ev: &BytesDecl) -> Result<()> {
        self.version = String::from_utf8(ev.version()?.to_vec())?;
        self.standalone = match ev.standalone() {
            Some(res) => {
                let val = std::str::from_utf8(&*res?)?.to_lowercase();
                if val == "yes" {
                    true
                } else if val == "no" {
                    false
                } else {
                    return Err(Error::MalformedXML(
                        "Standalone Document Declaration has non boolean value".to_string(),
                    ));
                }
            }
            None => false,
        };
        Ok(())
    }

    fn current_element(&mut self) -> Result<&mut OpenElement> {
        self.element_stack.last_mut().ok_or_else(|| {
            Error::MalformedXML("Text found outside of the root element".to_string())
        })
    }

    fn close_element(&mut self, elem: OpenElement) -> Result<()> {
        let name = elem.name.clone();
        let value = elem.into_value(&self.read_opts);
        match self.element_stack.last_mut() {
            Some(parent) => {
                parent.children.entry(name).or_default().push(value);
                Ok(())
            }
            None if self.root.is_some() => Err(Error::MalformedXML(format!(
                "Found a second root element <{}>",
                name
            ))),
            None => {
                self.root = Some((name, value));
                Ok(())
            }
        }
    }

    // Returns if document parsing is finished.
    fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Start(ref ev) => {
                let elem = OpenElement::from_start(ev)?;
                self.element_stack.push(elem);
            }
            Event::Empty(ref ev) => {
                let elem = OpenElement::from_start(ev)?;
                self.close_element(elem)?;
            }
            Event::End(_) => {
                // quick-xml checks if tag names match for us
                let elem = self.element_stack.pop().ok_or_else(|| {
                    Error::MalformedXML("Closing tag without opening tag".to_string())
                })?;
                self.close_element(elem)?;
            }
            Event::Text(ev) => {
                let content = String::from_utf8(ev.unescaped()?.to_vec())?;
                // Whitespace around the root element is not content.
                if self.element_stack.is_empty() && content.trim().is_empty() {
                    return Ok(false);
                }
                self.current_element()?.push_trimmed(&content);
            }
            // CData content is not escaped.
            Event::CData(ev) => {
                let content = String::from_utf8(ev.to_vec())?;
                self.current_element()?.push_raw(&content);
            }
            Event::Decl(ref ev) => self.handle_decl(ev)?,
            Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => return Ok(true),
        }
        Ok(false)
    }

    fn parse_content(&mut self, mut reader: Reader<&[u8]>) -> Result<()> {
        let mut buf = Vec::with_capacity(200); // reduce time increasing capacity at start.
        loop {
            let ev = reader.read_event(&mut buf)?;
            trace!(event = ?ev);
            if self.handle_event(ev)? {
                return Ok(());
            }
            buf.clear();
        }
    }

    fn finish(self) -> Result<Document> {
        if let Some(elem) = self.element_stack.last() {
            return Err(Error::MalformedXML(format!(
                "Element <{}> is never closed",
                elem.name
            )));
        }
        let (name, value) = self
            .root
            .ok_or_else(|| Error::MalformedXML("Document has no root element".to_string()))?;
        let mut tree = Map::new();
        tree.insert(name, value);
        Ok(Document::with_declaration(
            Value::Map(tree),
            self.version,
            self.standalone,
        ))
    }
}
