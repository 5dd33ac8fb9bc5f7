use crate::error::Result;
use crate::parser::{DocumentParser, ReadOptions};
use crate::value::Value;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Options when writing xml.
///
/// `indent_size` of 0 writes the whole document on one line.
/// `attr_key` and `text_key` should match the [`ReadOptions`] the tree was parsed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub indent_char: u8,
    pub indent_size: usize,
    pub attr_key: String,
    pub text_key: String,
}

impl Default for WriteOptions {
    fn default() -> WriteOptions {
        let read_opts = ReadOptions::default();
        WriteOptions {
            indent_char: b' ',
            indent_size: 2,
            attr_key: read_opts.attr_key,
            text_key: read_opts.text_key,
        }
    }
}

/// Represents a XML document.
///
/// Use [`parse_str()`](Document::parse_str), [`parse_reader()`](Document::parse_reader),
/// or [`from_str()`](std::str::FromStr::from_str) to parse xml.
///
/// # Examples
/// ```
/// use sitemap_scrub::{Document, Scrub};
/// use std::str::FromStr;
///
/// let mut doc = Document::from_str(r#"<?xml version="1.0" encoding="UTF-8"?>
/// <urlset>
///     <url>
///         <loc>http://staging.example.com/</loc>
///         <PageMap><DataObject type="thumbnail" /></PageMap>
///     </url>
/// </urlset>
/// "#).unwrap();
/// Scrub::new("http://staging.", "https://www.").apply_document(&mut doc);
/// let xml = doc.write_str().unwrap();
/// assert!(xml.contains("<loc>https://www.example.com/</loc>"));
/// assert!(!xml.contains("PageMap"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    version: String,
    standalone: bool,
    tree: Value,
}

impl Document {
    /// Wraps a tree as a version 1.0 document.
    pub fn new(tree: Value) -> Document {
        Document::with_declaration(tree, "1.0".to_string(), false)
    }

    pub(crate) fn with_declaration(tree: Value, version: String, standalone: bool) -> Document {
        Document {
            version,
            standalone,
            tree,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn standalone(&self) -> bool {
        self.standalone
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Value {
        &mut self.tree
    }

    pub fn into_tree(self) -> Value {
        self.tree
    }

    /// Name and value of the root element.
    ///
    /// `None` if the tree is not a map with exactly one entry, for example after the
    /// root element itself was pruned.
    pub fn root_element(&self) -> Option<(&str, &Value)> {
        match &self.tree {
            Value::Map(map) if map.len() == 1 => map
                .get_index(0)
                .filter(|(_, value)| !matches!(value, Value::List(_)))
                .map(|(name, value)| (name.as_str(), value)),
            _ => None,
        }
    }
}

// Read and write
impl Document {
    /// Parses xml string.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedXML`](crate::Error::MalformedXML): Could not read XML.
    pub fn parse_str(str: &str) -> Result<Document> {
        Document::parse_str_with_opts(str, ReadOptions::default())
    }

    pub fn parse_str_with_opts(str: &str, opts: ReadOptions) -> Result<Document> {
        DocumentParser::parse_str(str, opts)
    }

    /// Parses xml from reader. The whole input is read before parsing.
    ///
    /// # Errors
    ///
    /// - [`Error::CannotDecode`](crate::Error::CannotDecode): Could not decode XML.
    /// - [`Error::MalformedXML`](crate::Error::MalformedXML): Could not read XML.
    /// - [`Error::Io`](crate::Error::Io): IO Error
    pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
        Document::parse_reader_with_opts(reader, ReadOptions::default())
    }

    pub fn parse_reader_with_opts<R: Read>(mut reader: R, opts: ReadOptions) -> Result<Document> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        DocumentParser::parse_bytes(&bytes, opts)
    }

    /// Parses xml file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
        Document::parse_file_with_opts(path, ReadOptions::default())
    }

    pub fn parse_file_with_opts<P: AsRef<Path>>(path: P, opts: ReadOptions) -> Result<Document> {
        let bytes = std::fs::read(path)?;
        DocumentParser::parse_bytes(&bytes, opts)
    }

    /// Writes document as xml string.
    pub fn write_str(&self) -> Result<String> {
        self.write_str_with_opts(&WriteOptions::default())
    }

    pub fn write_str_with_opts(&self, opts: &WriteOptions) -> Result<String> {
        let mut buf: Vec<u8> = Vec::with_capacity(200);
        self.write_with_opts(&mut buf, opts)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Write document to writer. Will be written in UTF-8.
    pub fn write(&self, writer: &mut impl Write) -> Result<()> {
        self.write_with_opts(writer, &WriteOptions::default())
    }

    pub fn write_with_opts(&self, writer: &mut impl Write, opts: &WriteOptions) -> Result<()> {
        let mut writer = if opts.indent_size > 0 {
            Writer::new_with_indent(writer, opts.indent_char, opts.indent_size)
        } else {
            Writer::new(writer)
        };
        self.write_decl(&mut writer)?;
        match self.root_element() {
            Some((name, value)) => write_element(&mut writer, name, value, opts)?,
            // Without a single root, everything goes under a <root> element.
            None => write_single(&mut writer, "root", &self.tree, opts)?,
        }
        writer.write_event(Event::Eof)?;
        Ok(())
    }

    /// Write document to a file.
    ///
    /// The document goes to a temporary file next to `path` that is then renamed over it,
    /// so a failed write never leaves a partial file or clobbers an existing one.
    pub fn write_file<P: AsRef<Path>>(&self, path: P, opts: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        let xml = self.write_str_with_opts(opts)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(xml.as_bytes())?;
        file.persist(path).map_err(|err| err.error)?;
        Ok(())
    }

    fn write_decl(&self, writer: &mut Writer<impl Write>) -> Result<()> {
        let standalone = match self.standalone {
            true => Some("yes".as_bytes()),
            false => None,
        };
        writer.write_event(Event::Decl(BytesDecl::new(
            self.version.as_bytes(),
            Some("UTF-8".as_bytes()),
            standalone,
        )))?;
        Ok(())
    }
}

// Lists repeat the element once per item.
fn write_element(
    writer: &mut Writer<impl Write>,
    name: &str,
    value: &Value,
    opts: &WriteOptions,
) -> Result<()> {
    match value {
        Value::List(items) => {
            for item in items {
                write_element(writer, name, item, opts)?;
            }
            Ok(())
        }
        _ => write_single(writer, name, value, opts),
    }
}

fn write_single(
    writer: &mut Writer<impl Write>,
    name: &str,
    value: &Value,
    opts: &WriteOptions,
) -> Result<()> {
    let name_bytes = name.as_bytes();
    let mut start = BytesStart::borrowed_name(name_bytes);
    if let Some(Value::Map(attributes)) = value.get(&opts.attr_key) {
        for (key, val) in attributes {
            if let Value::Text(val) = val {
                start.push_attribute((key.as_str(), val.as_str()));
            }
        }
    }
    if has_content(value, opts) {
        writer.write_event(Event::Start(start))?;
        write_content(writer, value, opts)?;
        writer.write_event(Event::End(BytesEnd::borrowed(name_bytes)))?;
    } else {
        writer.write_event(Event::Empty(start))?;
    }
    Ok(())
}

fn has_content(value: &Value, opts: &WriteOptions) -> bool {
    match value {
        Value::Text(text) => !text.is_empty(),
        Value::Map(map) => map.keys().any(|key| *key != opts.attr_key),
        Value::List(items) => !items.is_empty(),
    }
}

fn write_content(writer: &mut Writer<impl Write>, value: &Value, opts: &WriteOptions) -> Result<()> {
    match value {
        Value::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_plain_str(text)))?;
        }
        Value::Map(map) => {
            for (key, child) in map {
                if *key == opts.attr_key {
                    continue;
                } else if *key == opts.text_key {
                    write_content(writer, child, opts)?;
                } else {
                    write_element(writer, key, child, opts)?;
                }
            }
        }
        Value::List(items) => {
            for item in items {
                write_content(writer, item, opts)?;
            }
        }
    }
    Ok(())
}

impl FromStr for Document {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Document> {
        Document::parse_str(s)
    }
}
