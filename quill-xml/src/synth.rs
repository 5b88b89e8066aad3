//! Shadow document synthesis
//!
//! The shadow is regenerated from canonical fields on every
//! content-affecting write, never patched in place. Synthesis is
//! deterministic: identical fields always yield the identical document.

use crate::dom;
use crate::error::XmlError;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;

/// Which timestamp element the shadow carries.
///
/// A create emits `<createdAt>`, an update emits `<updatedAt>`. The two
/// are otherwise identical for the same field values; an update never
/// re-emits `createdAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

/// Canonical inputs to shadow synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowFields {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub kind: WriteKind,
}

/// Synthesize the shadow document for a note.
///
/// Headless (no XML declaration). Empty optional fields become empty
/// elements so the result always carries the schema's required element
/// set. All text rides XML-escaped.
pub fn synthesize_note_shadow(fields: &ShadowFields) -> String {
    let mut out = String::with_capacity(128);
    out.push_str("<note>");
    push_element(&mut out, "title", &fields.title);
    push_element(&mut out, "content", &fields.content);
    let stamp = fields.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
    match fields.kind {
        WriteKind::Create => push_element(&mut out, "createdAt", &stamp),
        WriteKind::Update => push_element(&mut out, "updatedAt", &stamp),
    }
    out.push_str("<tags>");
    for tag in &fields.tags {
        push_element(&mut out, "tag", tag);
    }
    out.push_str("</tags>");
    out.push_str("</note>");
    out
}

fn push_element(out: &mut String, name: &str, text: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(&escape(text));
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Canonical fields recovered from a note document, used by XML import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedNote {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Pull title, content, and tags out of a note document.
///
/// Callers validate the document against the note schema first; this
/// function still degrades gracefully, defaulting absent elements.
pub fn extract_note_fields(xml: &str) -> Result<ExtractedNote, XmlError> {
    let root = dom::parse_document(xml).map_err(|failure| XmlError::Malformed {
        message: failure.message,
    })?;

    let mut title = None;
    let mut content = String::new();
    let mut tags = Vec::new();
    for child in &root.children {
        match child.name.as_str() {
            "title" => title = Some(child.text.clone()),
            "content" => content = child.text.clone(),
            "tags" => {
                tags = child
                    .children
                    .iter()
                    .filter(|tag| tag.name == "tag")
                    .map(|tag| tag.text.clone())
                    .collect();
            }
            _ => {}
        }
    }

    Ok(ExtractedNote {
        title: title.unwrap_or_else(|| "Imported Note".to_string()),
        content,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaKind, SchemaRegistry};
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, 10, 0, 0).unwrap()
    }

    fn fields(kind: WriteKind) -> ShadowFields {
        ShadowFields {
            title: "Groceries".to_string(),
            content: "milk, eggs".to_string(),
            tags: vec!["home".to_string(), "errands".to_string()],
            timestamp: stamp(),
            kind,
        }
    }

    #[test]
    fn test_create_emits_created_at() {
        let xml = synthesize_note_shadow(&fields(WriteKind::Create));
        assert_eq!(
            xml,
            "<note><title>Groceries</title><content>milk, eggs</content>\
<createdAt>2026-08-28T10:00:00.000Z</createdAt>\
<tags><tag>home</tag><tag>errands</tag></tags></note>"
        );
    }

    #[test]
    fn test_update_differs_from_create_only_in_timestamp_tag() {
        let create = synthesize_note_shadow(&fields(WriteKind::Create));
        let update = synthesize_note_shadow(&fields(WriteKind::Update));
        assert_eq!(create.replace("createdAt", "updatedAt"), update);
        assert!(!update.contains("createdAt"));
    }

    #[test]
    fn test_empty_fields_become_empty_elements() {
        let xml = synthesize_note_shadow(&ShadowFields {
            title: "T".to_string(),
            content: String::new(),
            tags: vec![],
            timestamp: stamp(),
            kind: WriteKind::Create,
        });
        assert!(xml.contains("<content></content>"));
        assert!(xml.contains("<tags></tags>"));
    }

    #[test]
    fn test_markup_in_content_is_escaped() {
        let xml = synthesize_note_shadow(&ShadowFields {
            title: "A & B".to_string(),
            content: "<p>1 < 2</p>".to_string(),
            tags: vec![],
            timestamp: stamp(),
            kind: WriteKind::Create,
        });
        assert!(xml.contains("<title>A &amp; B</title>"));
        assert!(xml.contains("&lt;p&gt;1 &lt; 2&lt;/p&gt;"));
        assert!(SchemaRegistry::builtin()
            .unwrap()
            .validate(&xml, SchemaKind::Note)
            .valid);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let f = fields(WriteKind::Update);
        assert_eq!(synthesize_note_shadow(&f), synthesize_note_shadow(&f));
    }

    #[test]
    fn test_extract_recovers_fields() {
        let xml = synthesize_note_shadow(&fields(WriteKind::Create));
        let extracted = extract_note_fields(&xml).unwrap();
        assert_eq!(extracted.title, "Groceries");
        assert_eq!(extracted.content, "milk, eggs");
        assert_eq!(extracted.tags, vec!["home", "errands"]);
    }

    #[test]
    fn test_extract_defaults_missing_title() {
        let extracted = extract_note_fields("<note><content>x</content></note>").unwrap();
        assert_eq!(extracted.title, "Imported Note");
        assert!(extracted.tags.is_empty());
    }

    #[test]
    fn test_extract_rejects_malformed_input() {
        let err = extract_note_fields("<note><title>").unwrap_err();
        assert!(matches!(err, XmlError::Malformed { .. }));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::schema::{SchemaKind, SchemaRegistry};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn text_strategy(max: usize) -> impl Strategy<Value = String> {
        proptest::collection::vec(any::<char>().prop_filter("xml chars", |c| {
            *c == '\t' || *c == '\n' || !c.is_control()
        }), 0..max)
        .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        // Whatever the canonical fields contain, the synthesized shadow
        // must satisfy the note schema and round-trip through extraction.
        #[test]
        fn prop_shadow_always_validates_and_round_trips(
            title in text_strategy(60).prop_filter("non-empty", |t| !t.is_empty()),
            content in text_strategy(120),
            tags in proptest::collection::vec(text_strategy(20), 0..5),
        ) {
            let registry = SchemaRegistry::builtin().unwrap();
            let fields = ShadowFields {
                title: title.clone(),
                content: content.clone(),
                tags: tags.clone(),
                timestamp: Utc.with_ymd_and_hms(2026, 8, 28, 10, 0, 0).unwrap(),
                kind: WriteKind::Create,
            };
            let xml = synthesize_note_shadow(&fields);

            let report = registry.validate(&xml, SchemaKind::Note);
            prop_assert!(report.valid, "issues: {:?}", report.errors);

            let extracted = extract_note_fields(&xml).unwrap();
            prop_assert_eq!(extracted.title, title);
            prop_assert_eq!(extracted.content, content);
            prop_assert_eq!(extracted.tags, tags);
        }
    }
}
