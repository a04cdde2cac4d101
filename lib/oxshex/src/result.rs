//! Validation result types
//!
//! This module provides types for representing ShEx validation results,
//! including detailed information on why a node does not conform.

use crate::model::Label;
use crate::validator::ShapeSelector;
use oxrdf::{NamedNode, Term};
use std::fmt;

/// Report of a validation run: one entry per validated (node, shape) pair.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    entries: Vec<ShapeResult>,
}

impl ValidationReport {
    /// Creates a new empty validation report (conforming).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if every entry is conformant.
    pub fn conforms(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.status == ValidationStatus::Conformant)
    }

    /// Returns the entries, in request order.
    pub fn entries(&self) -> &[ShapeResult] {
        &self.entries
    }

    /// Returns all diagnostics of all entries.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().flat_map(|entry| &entry.diagnostics)
    }

    /// Adds an entry to the report.
    pub fn add_entry(&mut self, entry: ShapeResult) {
        self.entries.push(entry);
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conforms() {
            return write!(f, "Conforms ({} node(s))", self.entries.len());
        }
        let failing = self
            .entries
            .iter()
            .filter(|entry| entry.status == ValidationStatus::NonConformant)
            .count();
        write!(f, "{failing} non-conformant node(s)")?;
        for entry in &self.entries {
            write!(f, "\n  {entry}")?;
            for (i, diagnostic) in entry.diagnostics.iter().enumerate() {
                write!(f, "\n    {}. {}", i + 1, diagnostic)?;
            }
        }
        Ok(())
    }
}

/// Outcome of validating a node against a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStatus {
    /// The node conforms.
    Conformant,
    /// The node does not conform.
    NonConformant,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conformant => f.write_str("conformant"),
            Self::NonConformant => f.write_str("nonconformant"),
        }
    }
}

/// Result for one (node, shape) pair.
#[derive(Debug, Clone)]
pub struct ShapeResult {
    /// The focus node.
    pub node: Term,
    /// The shape the node was validated against.
    pub shape: ShapeSelector,
    /// Conformance status.
    pub status: ValidationStatus,
    /// Why the node does not conform. Empty if conformant.
    pub diagnostics: Vec<Diagnostic>,
}

impl ShapeResult {
    /// Returns true if the node conforms.
    pub fn conforms(&self) -> bool {
        self.status == ValidationStatus::Conformant
    }
}

impl fmt::Display for ShapeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}: {}", self.node, self.shape, self.status)
    }
}

/// A reason why a node does not conform.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The node that failed.
    pub focus_node: Term,
    /// The innermost shape label being evaluated, if any.
    pub shape: Option<Label>,
    /// The kind of check that failed.
    pub kind: DiagnosticKind,
    /// The predicate involved (for triple-level failures).
    pub predicate: Option<NamedNode>,
    /// The value that caused the failure.
    pub value: Option<Term>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(
        focus_node: Term,
        shape: Option<Label>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            focus_node,
            shape,
            kind,
            predicate: None,
            value: None,
            message: message.into(),
        }
    }

    /// Sets the predicate.
    #[must_use]
    pub fn with_predicate(mut self, predicate: NamedNode) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Sets the value.
    #[must_use]
    pub fn with_value(mut self, value: Term) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(shape) = &self.shape {
            write!(f, " [shape: {shape}]")?;
        }
        if let Some(pred) = &self.predicate {
            write!(f, " [predicate: {pred}]")?;
        }
        if let Some(val) = &self.value {
            write!(f, " [value: {val}]")?;
        }
        Ok(())
    }
}

/// The kind of check a [`Diagnostic`] reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// Node kind constraint (IRI, literal, blank node...).
    NodeKind,
    /// Datatype constraint, including lexical validity.
    Datatype,
    /// Exact length facet.
    Length,
    /// Minimum length facet.
    MinLength,
    /// Maximum length facet.
    MaxLength,
    /// Regex pattern facet.
    Pattern,
    /// Minimum inclusive facet.
    MinInclusive,
    /// Minimum exclusive facet.
    MinExclusive,
    /// Maximum inclusive facet.
    MaxInclusive,
    /// Maximum exclusive facet.
    MaxExclusive,
    /// Total digits facet.
    TotalDigits,
    /// Fraction digits facet.
    FractionDigits,
    /// Value set.
    Values,
    /// Closed shape with an unexpected out-edge.
    Closed,
    /// A neighbourhood triple fits no triple constraint.
    UnmatchedTriple,
    /// No assignment of the neighbourhood satisfies the triple expression.
    NoMatchingAssignment,
    /// The negated expression holds.
    Not,
    /// No disjunct holds.
    Or,
    /// External shapes are never satisfied.
    External,
    /// No concrete subtype of an abstract shape holds.
    AbstractShape,
    /// A semantic action rejected the match.
    SemanticAction,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NodeKind => "NodeKind",
            Self::Datatype => "Datatype",
            Self::Length => "Length",
            Self::MinLength => "MinLength",
            Self::MaxLength => "MaxLength",
            Self::Pattern => "Pattern",
            Self::MinInclusive => "MinInclusive",
            Self::MinExclusive => "MinExclusive",
            Self::MaxInclusive => "MaxInclusive",
            Self::MaxExclusive => "MaxExclusive",
            Self::TotalDigits => "TotalDigits",
            Self::FractionDigits => "FractionDigits",
            Self::Values => "Values",
            Self::Closed => "Closed",
            Self::UnmatchedTriple => "UnmatchedTriple",
            Self::NoMatchingAssignment => "NoMatchingAssignment",
            Self::Not => "ShapeNot",
            Self::Or => "ShapeOr",
            Self::External => "ShapeExternal",
            Self::AbstractShape => "AbstractShape",
            Self::SemanticAction => "SemanticAction",
        })
    }
}
