//! Minimal internal document tree
//!
//! Both the schema compiler and the validator need a materialized view of
//! a (small) XML document with byte offsets preserved, which quick-xml's
//! streaming reader does not provide directly. This module builds that
//! tree. It is an implementation detail of the crate.

use quick_xml::events::Event;
use quick_xml::Reader;

/// One element of a parsed document.
#[derive(Debug, Clone)]
pub(crate) struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Concatenated direct character data, entities resolved.
    pub text: String,
    /// Byte offset of the start tag in the source.
    pub offset: usize,
}

impl XmlNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A well-formedness failure, positioned by byte offset.
#[derive(Debug, Clone)]
pub(crate) struct ParseFailure {
    pub message: String,
    pub offset: usize,
}

/// Parse a document into its root element.
///
/// Comments, processing instructions, the XML declaration, and a doctype
/// are skipped. Non-whitespace character data outside the root element and
/// multiple root elements are failures.
pub(crate) fn parse_document(input: &str) -> Result<XmlNode, ParseFailure> {
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event() {
            Err(err) => {
                return Err(ParseFailure {
                    message: format!("XML parsing error: {err}"),
                    offset: reader.error_position() as usize,
                });
            }
            Ok(Event::Start(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(ParseFailure {
                        message: "multiple root elements".to_string(),
                        offset,
                    });
                }
                stack.push(read_node(&start, offset)?);
            }
            Ok(Event::Empty(start)) => {
                let node = read_node(&start, offset)?;
                attach(node, &mut stack, &mut root, offset)?;
            }
            Ok(Event::End(_)) => {
                // quick-xml has already checked the name matches the start tag.
                let node = stack.pop().ok_or_else(|| ParseFailure {
                    message: "unexpected closing tag".to_string(),
                    offset,
                })?;
                attach(node, &mut stack, &mut root, offset)?;
            }
            // Text events carry no entity references; those arrive as
            // GeneralRef events below.
            Ok(Event::Text(text)) => {
                let text = text.decode().map_err(|err| ParseFailure {
                    message: format!("XML parsing error: {err}"),
                    offset,
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(ParseFailure {
                            message: "character data outside the root element".to_string(),
                            offset,
                        });
                    }
                }
            }
            Ok(Event::CData(cdata)) => {
                let text = String::from_utf8_lossy(&cdata).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&text),
                    None => {
                        return Err(ParseFailure {
                            message: "character data outside the root element".to_string(),
                            offset,
                        });
                    }
                }
            }
            // The reader emits general references as their own events.
            Ok(Event::GeneralRef(reference)) => {
                let resolved = resolve_reference(&reference, offset)?;
                match stack.last_mut() {
                    Some(parent) => parent.text.push(resolved),
                    None => {
                        return Err(ParseFailure {
                            message: "character data outside the root element".to_string(),
                            offset,
                        });
                    }
                }
            }
            Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
        }
    }

    root.ok_or_else(|| ParseFailure {
        message: "document has no root element".to_string(),
        offset: 0,
    })
}

/// Resolve a character reference or one of the five predefined entities.
fn resolve_reference(
    reference: &quick_xml::events::BytesRef<'_>,
    offset: usize,
) -> Result<char, ParseFailure> {
    if let Some(ch) = reference.resolve_char_ref().map_err(|err| ParseFailure {
        message: format!("XML parsing error: {err}"),
        offset,
    })? {
        return Ok(ch);
    }
    match reference.as_ref() {
        b"amp" => Ok('&'),
        b"lt" => Ok('<'),
        b"gt" => Ok('>'),
        b"apos" => Ok('\''),
        b"quot" => Ok('"'),
        other => Err(ParseFailure {
            message: format!(
                "undefined entity reference '&{};'",
                String::from_utf8_lossy(other)
            ),
            offset,
        }),
    }
}

fn read_node(
    start: &quick_xml::events::BytesStart<'_>,
    offset: usize,
) -> Result<XmlNode, ParseFailure> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| ParseFailure {
            message: format!("XML parsing error: {err}"),
            offset,
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ParseFailure {
                message: format!("XML parsing error: {err}"),
                offset,
            })?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(XmlNode {
        name,
        attrs,
        children: Vec::new(),
        text: String::new(),
        offset,
    })
}

fn attach(
    node: XmlNode,
    stack: &mut Vec<XmlNode>,
    root: &mut Option<XmlNode>,
    offset: usize,
) -> Result<(), ParseFailure> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(ParseFailure {
            message: "multiple root elements".to_string(),
            offset,
        }),
    }
}

/// 1-based line and column for a byte offset.
pub(crate) fn line_col(input: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let mut line = 1;
    let mut column = 1;
    for byte in &input.as_bytes()[..offset] {
        if *byte == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_nested_elements_with_text() {
        let root =
            parse_document("<note><title>Hi &amp; bye</title><tags><tag>a</tag></tags></note>")
                .unwrap();
        assert_eq!(root.name, "note");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].text, "Hi & bye");
        assert_eq!(root.children[1].children[0].text, "a");
    }

    #[test]
    fn test_character_and_entity_references_resolve() {
        let root = parse_document("<t>caf&#233; &lt;3 &quot;ok&quot;</t>").unwrap();
        assert_eq!(root.text, "caf\u{e9} <3 \"ok\"");
    }

    #[test]
    fn test_undefined_entity_is_a_failure() {
        let err = parse_document("<t>&nbsp;</t>").unwrap_err();
        assert!(err.message.contains("undefined entity"));
    }

    #[test]
    fn test_empty_element_forms_are_equivalent() {
        let a = parse_document("<note><content/></note>").unwrap();
        let b = parse_document("<note><content></content></note>").unwrap();
        assert_eq!(a.children[0].name, b.children[0].name);
        assert_eq!(a.children[0].text, "");
        assert_eq!(b.children[0].text, "");
    }

    #[test]
    fn test_attributes_are_captured() {
        let root = parse_document(r#"<el name="title" maxOccurs="unbounded"/>"#).unwrap();
        assert_eq!(root.attr("name"), Some("title"));
        assert_eq!(root.attr("maxOccurs"), Some("unbounded"));
        assert_eq!(root.attr("missing"), None);
    }

    #[test]
    fn test_mismatched_tag_is_a_failure() {
        let err = parse_document("<note><title></note>").unwrap_err();
        assert!(err.message.contains("XML parsing error"));
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let err = parse_document("<a/><b/>").unwrap_err();
        assert!(err.message.contains("multiple root"));
    }

    #[test]
    fn test_line_col_counts_from_one() {
        let input = "<a>\n  <b/>\n</a>";
        assert_eq!(line_col(input, 0), (1, 1));
        assert_eq!(line_col(input, 4), (2, 1));
        assert_eq!(line_col(input, 6), (2, 3));
    }
}
