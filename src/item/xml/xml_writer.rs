use crate::core::item::{RecordWriter, RecordWriterResult};
use crate::core::record::{Attributes, Record};
use crate::error::{ExportError, ExportResult};
use quick_xml::{
    Writer,
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Returns true when `name` can be used as an element name.
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Returns true when `c` may appear in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Renders attributes as `<name>value</name>` elements, values entity-escaped.
///
/// ```
/// use collection_export::item::xml::xml_writer::implode_to_xml;
///
/// let attributes = vec![
///     ("id".to_string(), "1".to_string()),
///     ("name".to_string(), "Fish & Chips".to_string()),
/// ];
///
/// assert_eq!(
///     implode_to_xml(&attributes),
///     "<id>1</id><name>Fish &amp; Chips</name>"
/// );
/// ```
pub fn implode_to_xml(attributes: &Attributes) -> String {
    let mut output = String::new();
    for (key, value) in attributes {
        output.push('<');
        output.push_str(key);
        output.push('>');
        output.push_str(&escape(value.as_str()));
        output.push_str("</");
        output.push_str(key);
        output.push('>');
    }
    output
}

/// Writes a compact XML document: a root element named after the first
/// record's type followed by the collection type, then one element per record
/// holding one child element per field.
///
/// The output is a single line; run [`beautify`](super::xml_beautifier::beautify)
/// on the file to indent it.
///
/// ```
/// use collection_export::core::item::RecordWriter;
/// use collection_export::core::record::Model;
/// use collection_export::item::xml::xml_writer::XmlItemWriterBuilder;
///
/// let car = Model::new("Car").with("id", "1").with("make", "Ford");
///
/// let writer = XmlItemWriterBuilder::new().from_writer(vec![]);
/// writer.open(&car, "Collection").unwrap();
/// writer.write(&car).unwrap();
/// writer.close().unwrap();
///
/// let xml = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(
///     xml,
///     concat!(
///         r#"<?xml version="1.0"?><CarCollection>"#,
///         "<Car><id>1</id><make>Ford</make></Car></CarCollection>"
///     )
/// );
/// ```
pub struct XmlItemWriter<W: Write = File> {
    writer: RefCell<Writer<BufWriter<W>>>,
    root_tag: RefCell<Option<String>>,
}

impl<W: Write> XmlItemWriter<W> {
    fn write_element(&self, name: &str, value: &str) -> RecordWriterResult {
        let mut writer = self.writer.borrow_mut();
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::from_escaped(escape(value))))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> ExportResult<W> {
        self.writer
            .into_inner()
            .into_inner()
            .into_inner()
            .map_err(|error| ExportError::Io(error.into_error()))
    }
}

impl<W: Write> RecordWriter for XmlItemWriter<W> {
    fn accepts(&self, record: &dyn Record) -> Result<(), String> {
        if !is_xml_name(record.type_name()) {
            return Err(format!("{:?} is not a valid element name", record.type_name()));
        }
        for (name, value) in record.attributes() {
            if !is_xml_name(&name) {
                return Err(format!("field {:?} is not a valid element name", name));
            }
            if let Some(c) = value.chars().find(|c| !is_xml_char(*c)) {
                return Err(format!(
                    "field {:?} holds U+{:04X}, which XML cannot represent",
                    name, c as u32
                ));
            }
        }
        Ok(())
    }

    fn open(&self, first: &dyn Record, collection_type: &str) -> RecordWriterResult {
        let root_tag = format!("{}{}", first.type_name(), collection_type);
        if !is_xml_name(&root_tag) {
            return Err(ExportError::MalformedRecord {
                index: 0,
                reason: format!("{:?} is not a valid root element name", root_tag),
            });
        }

        {
            let mut writer = self.writer.borrow_mut();
            writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
            writer.write_event(Event::Start(BytesStart::new(root_tag.as_str())))?;
        }
        self.root_tag.replace(Some(root_tag));
        Ok(())
    }

    fn write(&self, record: &dyn Record) -> RecordWriterResult {
        let tag = record.type_name();
        self.writer
            .borrow_mut()
            .write_event(Event::Start(BytesStart::new(tag)))?;
        for (name, value) in record.attributes() {
            self.write_element(&name, &value)?;
        }
        self.writer
            .borrow_mut()
            .write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn flush(&self) -> RecordWriterResult {
        self.writer.borrow_mut().get_mut().flush()?;
        Ok(())
    }

    fn close(&self) -> RecordWriterResult {
        if let Some(root_tag) = self.root_tag.borrow().as_deref() {
            self.writer
                .borrow_mut()
                .write_event(Event::End(BytesEnd::new(root_tag)))?;
        }
        self.flush()
    }
}

/// Builder for [`XmlItemWriter`].
#[derive(Default)]
pub struct XmlItemWriterBuilder {}

impl XmlItemWriterBuilder {
    pub fn new() -> Self {
        Self {}
    }

    /// Creates (or truncates) the file at `path`.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> ExportResult<XmlItemWriter<File>> {
        let file = File::create(path)?;
        Ok(self.from_writer(file))
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> XmlItemWriter<W> {
        XmlItemWriter {
            writer: RefCell::new(Writer::new(BufWriter::new(wtr))),
            root_tag: RefCell::new(None),
        }
    }
}
