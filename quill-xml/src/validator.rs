//! Document validation against a compiled schema
//!
//! Validation is pure: the same document and schema always produce the
//! same report. A document that is not even well-formed XML yields an
//! invalid report with a single positioned issue rather than an error.

use crate::dom::{self, XmlNode};
use crate::error::{ValidationIssue, ValidationReport};
use crate::schema::{CompiledSchema, Content, ElementDecl, Occurs, Particle, SimpleType};

pub(crate) fn validate_document(schema: &CompiledSchema, input: &str) -> ValidationReport {
    let root = match dom::parse_document(input) {
        Ok(root) => root,
        Err(failure) => {
            let (line, column) = dom::line_col(input, failure.offset);
            return ValidationReport::invalid(vec![ValidationIssue::new(
                failure.message,
                line,
                column,
            )]);
        }
    };

    let mut issues = Vec::new();
    if root.name != schema.root.name {
        issues.push(issue_at(
            input,
            root.offset,
            format!(
                "unexpected root element '{}', expected '{}'",
                root.name, schema.root.name
            ),
        ));
    } else {
        validate_element(&schema.root, &root, input, &mut issues);
    }

    if issues.is_empty() {
        ValidationReport::ok()
    } else {
        ValidationReport::invalid(issues)
    }
}

fn issue_at(input: &str, offset: usize, message: String) -> ValidationIssue {
    let (line, column) = dom::line_col(input, offset);
    ValidationIssue::new(message, line, column)
}

fn validate_element(
    decl: &ElementDecl,
    node: &XmlNode,
    input: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    match &decl.content {
        Content::Simple { ty, max_length } => {
            if let Some(child) = node.children.first() {
                issues.push(issue_at(
                    input,
                    child.offset,
                    format!(
                        "element '{}' has simple content but contains element '{}'",
                        decl.name, child.name
                    ),
                ));
                return;
            }
            validate_simple(decl, node, *ty, *max_length, input, issues);
        }
        Content::Complex(particles) => {
            if !node.text.trim().is_empty() {
                issues.push(issue_at(
                    input,
                    node.offset,
                    format!("element '{}' must not contain character data", decl.name),
                ));
            }
            validate_sequence(decl, particles, node, input, issues);
        }
    }
}

fn validate_simple(
    decl: &ElementDecl,
    node: &XmlNode,
    ty: SimpleType,
    max_length: Option<usize>,
    input: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    match ty {
        SimpleType::String => {
            if let Some(max) = max_length {
                let len = node.text.chars().count();
                if len > max {
                    issues.push(issue_at(
                        input,
                        node.offset,
                        format!(
                            "element '{}' exceeds maxLength {max} (length {len})",
                            decl.name
                        ),
                    ));
                }
            }
        }
        SimpleType::DateTime => {
            // Whitespace collapses for xs:dateTime.
            let text = node.text.trim();
            if chrono::DateTime::parse_from_rfc3339(text).is_err() {
                issues.push(issue_at(
                    input,
                    node.offset,
                    format!(
                        "element '{}' is not a valid xs:dateTime: '{text}'",
                        decl.name
                    ),
                ));
            }
        }
    }
}

fn validate_sequence(
    parent: &ElementDecl,
    particles: &[Particle],
    node: &XmlNode,
    input: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let children = node.children.as_slice();
    let mut next = 0usize;

    for particle in particles {
        match particle {
            Particle::Element(decl) => {
                let mut count = 0u32;
                while let Some(child) = children.get(next) {
                    if child.name != decl.name {
                        break;
                    }
                    validate_element(decl, child, input, issues);
                    count += 1;
                    next += 1;
                }
                if count < decl.min_occurs {
                    let message = match children.get(next) {
                        Some(child) => format!(
                            "unexpected element '{}', expected '{}'",
                            child.name, decl.name
                        ),
                        None => format!(
                            "missing required element '{}' in '{}'",
                            decl.name, parent.name
                        ),
                    };
                    let offset = children
                        .get(next)
                        .map(|child| child.offset)
                        .unwrap_or(node.offset);
                    issues.push(issue_at(input, offset, message));
                    // Do not consume; later particles may still match.
                }
                if let Occurs::Bounded(max) = decl.max_occurs {
                    if count > max {
                        issues.push(issue_at(
                            input,
                            children[next - 1].offset,
                            format!(
                                "element '{}' occurs {count} times, at most {max} allowed",
                                decl.name
                            ),
                        ));
                    }
                }
            }
            Particle::Choice(branches) => {
                let matched = children.get(next).and_then(|child| {
                    branches.iter().find(|branch| branch.name == child.name)
                });
                match matched {
                    Some(branch) => {
                        validate_element(branch, &children[next], input, issues);
                        next += 1;
                    }
                    None => {
                        let expected = branches
                            .iter()
                            .map(|branch| format!("'{}'", branch.name))
                            .collect::<Vec<_>>()
                            .join(", ");
                        let (offset, found) = match children.get(next) {
                            Some(child) => (child.offset, format!("'{}'", child.name)),
                            None => (node.offset, "nothing".to_string()),
                        };
                        issues.push(issue_at(
                            input,
                            offset,
                            format!(
                                "expected one of {expected} in '{}', found {found}",
                                parent.name
                            ),
                        ));
                    }
                }
            }
        }
    }

    for child in &children[next.min(children.len())..] {
        issues.push(issue_at(
            input,
            child.offset,
            format!("unexpected element '{}' in '{}'", child.name, parent.name),
        ));
    }
}
