//! Schema registry and XSD-subset compiler
//!
//! The registry is built once at process startup and passed around by
//! `Arc`. It holds a compiled schema per [`SchemaKind`]; a schema that is
//! missing, unreadable, or outside the supported XSD subset is a startup
//! failure, never a silent "validate everything as true".
//!
//! Supported subset: `xs:schema` with one global `xs:element`,
//! `xs:complexType`/`xs:sequence`/`xs:choice`, nested `xs:element` with
//! `minOccurs`/`maxOccurs`, the simple types `xs:string` and
//! `xs:dateTime`, and `xs:restriction base="xs:string"` with an
//! `xs:maxLength` facet. Anything else is a compile error.

use crate::dom::{self, XmlNode};
use crate::error::{ValidationReport, XmlError};
use crate::validator;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// SCHEMA KINDS
// ============================================================================

/// The fixed set of document schemas the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Note,
    Notebook,
    User,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 3] = [SchemaKind::Note, SchemaKind::Notebook, SchemaKind::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Note => "note",
            SchemaKind::Notebook => "notebook",
            SchemaKind::User => "user",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            SchemaKind::Note => "note.xsd",
            SchemaKind::Notebook => "notebook.xsd",
            SchemaKind::User => "user.xsd",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = XmlError;

    /// An unknown kind is a caller usage error, distinct from a document
    /// validation failure.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(SchemaKind::Note),
            "notebook" => Ok(SchemaKind::Notebook),
            "user" => Ok(SchemaKind::User),
            other => Err(XmlError::UnknownSchema {
                name: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// COMPILED SCHEMA MODEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SimpleType {
    String,
    DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Occurs {
    Bounded(u32),
    Unbounded,
}

#[derive(Debug, Clone)]
pub(crate) enum Content {
    Simple {
        ty: SimpleType,
        max_length: Option<usize>,
    },
    Complex(Vec<Particle>),
}

#[derive(Debug, Clone)]
pub(crate) struct ElementDecl {
    pub name: String,
    pub min_occurs: u32,
    pub max_occurs: Occurs,
    pub content: Content,
}

/// One step of a sequence content model.
#[derive(Debug, Clone)]
pub(crate) enum Particle {
    Element(ElementDecl),
    /// Exactly one of the listed elements must appear.
    Choice(Vec<ElementDecl>),
}

/// A schema compiled to its content-model form, plus the original source
/// (served verbatim by the schema documentation endpoint).
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub(crate) root: ElementDecl,
    source: String,
}

impl CompiledSchema {
    /// Compile an XSD source within the supported subset.
    pub fn compile(kind: SchemaKind, source: &str) -> Result<Self, XmlError> {
        let compile_err = |message: String| XmlError::SchemaCompile {
            kind: kind.as_str().to_string(),
            message,
        };

        let doc = dom::parse_document(source).map_err(|failure| compile_err(failure.message))?;
        if doc.name != "xs:schema" {
            return Err(compile_err(format!(
                "expected xs:schema root, found '{}'",
                doc.name
            )));
        }

        let mut globals = doc.children.iter();
        let root_node = globals
            .next()
            .ok_or_else(|| compile_err("schema declares no global element".to_string()))?;
        if globals.next().is_some() {
            return Err(compile_err(
                "schema must declare exactly one global element".to_string(),
            ));
        }

        let root = compile_element(root_node).map_err(compile_err)?;
        Ok(Self {
            root,
            source: source.to_string(),
        })
    }

    /// Validate a document against this schema.
    pub fn validate(&self, xml: &str) -> ValidationReport {
        validator::validate_document(self, xml)
    }

    /// The XSD source this schema was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

// ============================================================================
// COMPILER
// ============================================================================

fn compile_element(node: &XmlNode) -> Result<ElementDecl, String> {
    if node.name != "xs:element" {
        return Err(format!("unsupported construct '{}'", node.name));
    }
    let name = node
        .attr("name")
        .ok_or("xs:element is missing a name attribute")?
        .to_string();

    let min_occurs = match node.attr("minOccurs") {
        None => 1,
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| format!("invalid minOccurs '{value}' on element '{name}'"))?,
    };
    let max_occurs = match node.attr("maxOccurs") {
        None => Occurs::Bounded(1),
        Some("unbounded") => Occurs::Unbounded,
        Some(value) => Occurs::Bounded(
            value
                .parse::<u32>()
                .map_err(|_| format!("invalid maxOccurs '{value}' on element '{name}'"))?,
        ),
    };

    let content = match (node.attr("type"), node.children.as_slice()) {
        (Some("xs:string"), []) => Content::Simple {
            ty: SimpleType::String,
            max_length: None,
        },
        (Some("xs:dateTime"), []) => Content::Simple {
            ty: SimpleType::DateTime,
            max_length: None,
        },
        (Some(other), _) => {
            return Err(format!("unsupported type '{other}' on element '{name}'"));
        }
        (None, [child]) if child.name == "xs:complexType" => compile_complex_type(child, &name)?,
        (None, [child]) if child.name == "xs:simpleType" => compile_simple_type(child, &name)?,
        (None, _) => {
            return Err(format!(
                "element '{name}' must carry a type attribute or a single type child"
            ));
        }
    };

    Ok(ElementDecl {
        name,
        min_occurs,
        max_occurs,
        content,
    })
}

fn compile_complex_type(node: &XmlNode, element: &str) -> Result<Content, String> {
    let [sequence] = node.children.as_slice() else {
        return Err(format!(
            "xs:complexType of '{element}' must contain exactly one xs:sequence"
        ));
    };
    if sequence.name != "xs:sequence" {
        return Err(format!(
            "unsupported content model '{}' in element '{element}'",
            sequence.name
        ));
    }
    let particles = sequence
        .children
        .iter()
        .map(compile_particle)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Content::Complex(particles))
}

fn compile_simple_type(node: &XmlNode, element: &str) -> Result<Content, String> {
    let [restriction] = node.children.as_slice() else {
        return Err(format!(
            "xs:simpleType of '{element}' must contain exactly one xs:restriction"
        ));
    };
    if restriction.name != "xs:restriction" || restriction.attr("base") != Some("xs:string") {
        return Err(format!(
            "unsupported simple type derivation in element '{element}'"
        ));
    }
    let mut max_length = None;
    for facet in &restriction.children {
        if facet.name != "xs:maxLength" {
            return Err(format!(
                "unsupported facet '{}' in element '{element}'",
                facet.name
            ));
        }
        let value = facet
            .attr("value")
            .ok_or_else(|| format!("xs:maxLength in '{element}' is missing a value"))?;
        max_length = Some(
            value
                .parse::<usize>()
                .map_err(|_| format!("invalid xs:maxLength value '{value}' in '{element}'"))?,
        );
    }
    Ok(Content::Simple {
        ty: SimpleType::String,
        max_length,
    })
}

fn compile_particle(node: &XmlNode) -> Result<Particle, String> {
    match node.name.as_str() {
        "xs:element" => Ok(Particle::Element(compile_element(node)?)),
        "xs:choice" => {
            let branches = node
                .children
                .iter()
                .map(compile_element)
                .collect::<Result<Vec<_>, _>>()?;
            if branches.is_empty() {
                return Err("xs:choice must list at least one element".to_string());
            }
            Ok(Particle::Choice(branches))
        }
        other => Err(format!("unsupported construct '{other}' in xs:sequence")),
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

const NOTE_XSD: &str = include_str!("../schemas/note.xsd");
const NOTEBOOK_XSD: &str = include_str!("../schemas/notebook.xsd");
const USER_XSD: &str = include_str!("../schemas/user.xsd");

/// Compiled schemas for every [`SchemaKind`], built once at startup.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    note: CompiledSchema,
    notebook: CompiledSchema,
    user: CompiledSchema,
}

impl SchemaRegistry {
    /// Build the registry from the schema sources embedded in the binary.
    pub fn builtin() -> Result<Self, XmlError> {
        Self::from_sources(&[
            (SchemaKind::Note, NOTE_XSD.to_string()),
            (SchemaKind::Notebook, NOTEBOOK_XSD.to_string()),
            (SchemaKind::User, USER_XSD.to_string()),
        ])
    }

    /// Build the registry from `.xsd` files in a directory. Every kind
    /// must be present.
    pub fn load(dir: &Path) -> Result<Self, XmlError> {
        let mut sources = Vec::new();
        for kind in SchemaKind::ALL {
            let path = dir.join(kind.file_name());
            let source = std::fs::read_to_string(&path).map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    XmlError::SchemaMissing {
                        kind: kind.as_str().to_string(),
                        dir: dir.display().to_string(),
                    }
                } else {
                    XmlError::SchemaRead {
                        path: path.display().to_string(),
                        source: err,
                    }
                }
            })?;
            sources.push((kind, source));
        }
        Self::from_sources(&sources)
    }

    fn from_sources(sources: &[(SchemaKind, String)]) -> Result<Self, XmlError> {
        let mut compiled: HashMap<SchemaKind, CompiledSchema> = HashMap::new();
        for (kind, source) in sources {
            compiled.insert(*kind, CompiledSchema::compile(*kind, source)?);
        }
        let mut take = |kind: SchemaKind| {
            compiled.remove(&kind).ok_or(XmlError::SchemaMissing {
                kind: kind.as_str().to_string(),
                dir: "<embedded>".to_string(),
            })
        };
        Ok(Self {
            note: take(SchemaKind::Note)?,
            notebook: take(SchemaKind::Notebook)?,
            user: take(SchemaKind::User)?,
        })
    }

    pub fn get(&self, kind: SchemaKind) -> &CompiledSchema {
        match kind {
            SchemaKind::Note => &self.note,
            SchemaKind::Notebook => &self.notebook,
            SchemaKind::User => &self.user,
        }
    }

    /// Validate a document against one of the registered schemas.
    ///
    /// Identical input and kind always produce an identical report.
    pub fn validate(&self, xml: &str, kind: SchemaKind) -> ValidationReport {
        self.get(kind).validate(xml)
    }

    /// The XSD source for a kind, served by the documentation endpoint.
    pub fn source(&self, kind: SchemaKind) -> &str {
        self.get(kind).source()
    }
}
