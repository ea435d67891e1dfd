use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::debug;
use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use tempfile::NamedTempFile;

use crate::error::{ExportError, ExportResult};

struct Node {
    name: String,
    /// Raw (still escaped) character data.
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }
}

struct Document {
    decl: Option<BytesDecl<'static>>,
    root: Node,
}

/// Re-parses the XML file at `path` and rewrites it indented by two spaces.
///
/// Fails with [`ExportError::XmlRoundTrip`] when the file is missing or is not
/// well-formed; the file is left untouched in that case. The rewritten file
/// keeps the permissions of the original.
///
/// Only the declaration, elements and their character data are kept. Comments,
/// processing instructions and a DOCTYPE are dropped.
///
/// ```
/// use collection_export::item::xml::xml_beautifier::beautify;
/// use std::fs;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("cars.xml");
/// fs::write(&path, r#"<?xml version="1.0"?><cars><car><id>1</id></car></cars>"#).unwrap();
///
/// beautify(&path).unwrap();
///
/// assert_eq!(
///     fs::read_to_string(&path).unwrap(),
///     "<?xml version=\"1.0\"?>\n<cars>\n  <car>\n    <id>1</id>\n  </car>\n</cars>\n"
/// );
/// ```
pub fn beautify<P: AsRef<Path>>(path: P) -> ExportResult<PathBuf> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|error| {
        ExportError::XmlRoundTrip(format!("cannot read {}: {}", path.display(), error))
    })?;

    debug!("Beautifying XML file {}", path.display());
    let document = parse(&content)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = Writer::new_with_indent(BufWriter::new(temp.as_file_mut()), b' ', 2);
        if let Some(decl) = document.decl {
            writer.write_event(Event::Decl(decl))?;
        }
        write_node(&mut writer, &document.root)?;
        let out = writer.get_mut();
        out.write_all(b"\n")?;
        out.flush()?;
    }
    fs::set_permissions(temp.path(), fs::metadata(path)?.permissions())?;
    temp.persist(path).map_err(|error| ExportError::Io(error.error))?;

    Ok(path.to_path_buf())
}

fn parse(content: &str) -> ExportResult<Document> {
    let mut reader = Reader::from_str(content);
    let mut decl = None;
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExportError::XmlRoundTrip(format!("XML parsing error: {}", e)))?;

        match event {
            Event::Decl(d) => decl = Some(d.into_owned()),
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Node::new(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Node::new(name))?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| ExportError::XmlRoundTrip("unexpected end tag".to_string()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(t) => {
                let text = String::from_utf8_lossy(&t);
                match stack.last_mut() {
                    Some(node) => node.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(ExportError::XmlRoundTrip(
                            "text outside of the root element".to_string(),
                        ));
                    }
                }
            }
            Event::GeneralRef(r) => {
                let node = stack.last_mut().ok_or_else(|| {
                    ExportError::XmlRoundTrip("reference outside of the root element".to_string())
                })?;
                node.text.push('&');
                node.text.push_str(&String::from_utf8_lossy(&r));
                node.text.push(';');
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str("<![CDATA[");
                    node.text.push_str(&String::from_utf8_lossy(&c));
                    node.text.push_str("]]>");
                }
            }
            Event::Eof => break,
            // Comment, PI, DocType
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ExportError::XmlRoundTrip(format!(
            "element <{}> is never closed",
            open.name
        )));
    }
    let root = root.ok_or_else(|| ExportError::XmlRoundTrip("no root element".to_string()))?;

    Ok(Document { decl, root })
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> ExportResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(ExportError::XmlRoundTrip(
                "more than one root element".to_string(),
            ));
        }
    }
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> ExportResult<()> {
    let name = node.name.as_str();

    if node.children.is_empty() {
        if node.text.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(name)))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::from_escaped(node.text.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        return Ok(());
    }

    // Whitespace between child elements is replaced by the indentation.
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
