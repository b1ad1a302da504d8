//! Lossless-enough XML tree used as the canonical POM representation
//!
//! Parsing and serialization go through `quick-xml`. Whitespace text nodes are
//! kept so an untouched document is written back with its original layout.

mod element;

pub use element::{Element, XmlNode};

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// The `<?xml ...?>` declaration of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: None,
        }
    }
}

/// A parsed XML document
#[derive(Debug, Clone)]
pub struct Document {
    pub declaration: Option<Declaration>,
    /// Comments, doctype and whitespace before the root element
    pub prolog: Vec<XmlNode>,
    pub root: Element,
    /// Anything after the root element
    pub epilog: Vec<XmlNode>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(Declaration::default()),
            prolog: vec![XmlNode::Text("\n".to_string())],
            root,
            epilog: vec![XmlNode::Text("\n".to_string())],
        }
    }

    pub fn parse(source: &str) -> Result<Self> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader.read_event()?;
            let node = match event {
                Event::Eof => break,
                Event::Decl(decl) => {
                    let version = decl
                        .version()
                        .map_err(|e| Error::Model(format!("Invalid XML declaration: {e}")))?;
                    let encoding = match decl.encoding() {
                        Some(Ok(value)) => Some(String::from_utf8_lossy(&value).into_owned()),
                        _ => None,
                    };
                    let standalone = match decl.standalone() {
                        Some(Ok(value)) => Some(String::from_utf8_lossy(&value).into_owned()),
                        _ => None,
                    };
                    declaration = Some(Declaration {
                        version: String::from_utf8_lossy(&version).into_owned(),
                        encoding,
                        standalone,
                    });
                    continue;
                }
                Event::Start(start) => {
                    stack.push(start_element(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let finished = stack
                        .pop()
                        .ok_or_else(|| Error::Model("Unbalanced closing tag".to_string()))?;
                    XmlNode::Element(finished)
                }
                Event::Empty(start) => XmlNode::Element(start_element(&start)?),
                Event::Text(text) => XmlNode::Text(
                    text.unescape()
                        .map_err(|e| Error::Model(format!("Invalid XML text: {e}")))?
                        .into_owned(),
                ),
                Event::CData(data) => {
                    XmlNode::CData(String::from_utf8_lossy(&data.into_inner()).into_owned())
                }
                Event::Comment(comment) => {
                    XmlNode::Comment(String::from_utf8_lossy(&comment).into_owned())
                }
                Event::PI(pi) => {
                    XmlNode::ProcessingInstruction(String::from_utf8_lossy(&pi).into_owned())
                }
                Event::DocType(doctype) => {
                    XmlNode::DocType(String::from_utf8_lossy(&doctype).into_owned())
                }
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            } else if let XmlNode::Element(element) = node {
                if root.is_some() {
                    return Err(Error::Model(
                        "Document has more than one root element".to_string(),
                    ));
                }
                root = Some(element);
            } else if root.is_none() {
                prolog.push(node);
            } else {
                epilog.push(node);
            }
        }

        if !stack.is_empty() {
            return Err(Error::Model(format!(
                "Unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }

        let root = root.ok_or_else(|| Error::Model("Document has no root element".to_string()))?;
        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.declaration {
            let mut header = format!("<?xml version=\"{}\"", decl.version);
            if let Some(encoding) = &decl.encoding {
                header.push_str(&format!(" encoding=\"{encoding}\""));
            }
            if let Some(standalone) = &decl.standalone {
                header.push_str(&format!(" standalone=\"{standalone}\""));
            }
            header.push_str("?>");
            writer.get_mut().write_all(header.as_bytes())?;
        }

        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Model(format!("Serialized XML is not UTF-8: {e}")))
    }
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|e| Error::Model(format!("Invalid XML attribute: {e}")))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::Model(format!("Invalid XML attribute value: {e}")))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(element) => write_element(writer, element),
        XmlNode::Text(text) => emit(
            writer,
            Event::Text(BytesText::from_escaped(quick_xml::escape::partial_escape(text))),
        ),
        XmlNode::CData(data) => emit(writer, Event::CData(BytesCData::new(data.as_str()))),
        XmlNode::Comment(comment) => emit(
            writer,
            Event::Comment(BytesText::from_escaped(comment.as_str())),
        ),
        XmlNode::ProcessingInstruction(pi) => {
            writer.get_mut().write_all(format!("<?{pi}?>").as_bytes())?;
            Ok(())
        }
        XmlNode::DocType(doctype) => {
            writer
                .get_mut()
                .write_all(format!("<!DOCTYPE {doctype}>").as_bytes())?;
            Ok(())
        }
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Model(format!("Failed to write XML: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- leading comment -->
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <groupId>org.example</groupId>
  <description><![CDATA[a <raw> block]]></description>
  <name>Tom &amp; Jerry</name>
  <properties/>
</project>
"#;

    #[test]
    fn test_parse_structure() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.root.name, "project");
        assert_eq!(doc.root.attribute("xmlns"), Some("http://maven.apache.org/POM/4.0.0"));
        assert_eq!(doc.root.child_text("groupId").as_deref(), Some("org.example"));
        assert_eq!(doc.root.child_text("description").as_deref(), Some("a <raw> block"));
        assert_eq!(doc.root.child_text("name").as_deref(), Some("Tom & Jerry"));
        assert!(doc.prolog.iter().any(|n| matches!(n, XmlNode::Comment(c) if c.contains("leading"))));
    }

    #[test]
    fn test_unmodified_document_round_trips() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.to_xml_string().unwrap(), SAMPLE);
    }

    #[test]
    fn test_rejects_unbalanced_documents() {
        assert!(Document::parse("<project><groupId>x</groupId>").is_err());
        assert!(Document::parse("").is_err());
    }

    #[test]
    fn test_appended_children_follow_sibling_indentation() {
        let mut doc = Document::parse(
            "<project>\n  <groupId>g</groupId>\n</project>",
        )
        .unwrap();
        doc.root.set_child_text("artifactId", "a");
        let props = doc.root.get_or_create_child("properties");
        props.set_child_text("key", "value");

        assert_eq!(
            doc.to_xml_string().unwrap(),
            "<project>\n  <groupId>g</groupId>\n  <artifactId>a</artifactId>\n  <properties>\n    <key>value</key>\n  </properties>\n</project>"
        );
    }
}
