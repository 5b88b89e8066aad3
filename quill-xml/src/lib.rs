//! Quill XML - Shadow Document Subsystem
//!
//! Every note persists in two representations: the canonical fields users
//! edit and an XML shadow document validated against a fixed XSD schema.
//! This crate owns that subsystem end to end:
//!
//! - [`SchemaRegistry`]: the compiled schemas, built once at startup
//! - [`CompiledSchema::validate`]: structural validation with positioned
//!   `{message, line, column}` issues
//! - [`synthesize_note_shadow`]: deterministic shadow generation from
//!   canonical fields
//! - [`extract_note_fields`]: field recovery for XML import

mod dom;
pub mod error;
pub mod schema;
pub mod synth;
mod validator;

pub use error::{ValidationIssue, ValidationReport, XmlError};
pub use schema::{CompiledSchema, SchemaKind, SchemaRegistry};
pub use synth::{extract_note_fields, synthesize_note_shadow, ExtractedNote, ShadowFields, WriteKind};
