//! Error types for ShEx schema analysis and validation.
//!
//! A node that does not conform is not an error: it is reported through
//! [`Diagnostic`](crate::Diagnostic)s. The errors here are either structural problems of the
//! schema, caught before any validation, or engine faults that abort a run.

use crate::limits::ValidationLimitError;
use crate::model::Label;
use oxrdf::NamedNode;

/// Main error type for ShEx operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShexError {
    /// The schema is ill-formed.
    #[error(transparent)]
    Schema(#[from] ShexSchemaError),

    /// Validation aborted.
    #[error(transparent)]
    Validation(#[from] ShexValidationError),
}

/// A structural problem of a shapes schema.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShexSchemaError {
    /// A label is declared both as a shape and as a triple expression.
    #[error("Label {label} is declared both as a shape and as a triple expression")]
    DuplicateLabel {
        /// The label declared twice.
        label: Label,
    },

    /// A reference does not resolve to a declaration.
    #[error("Undefined reference: {label}")]
    UndefinedReference {
        /// The referenced label.
        label: Label,
    },

    /// Declarations reference themselves without going through a shape.
    #[error("Cyclic reference between {}", display_labels(labels))]
    CyclicReference {
        /// The declarations of the cycle.
        labels: Vec<Label>,
    },

    /// A shape depends negatively on itself.
    #[error("Unstratified negation: {from} depends negatively on {to} inside a cycle")]
    UnstratifiedNegation {
        /// The shape holding the negation.
        from: Label,
        /// The negated shape.
        to: Label,
    },

    /// A shape is not usable as the subject or target of `EXTENDS`.
    #[error("Ill-formed extension on {label}: {message}")]
    IllFormedExtends {
        /// The extending or extended declaration.
        label: Label,
        /// What is wrong with it.
        message: String,
    },

    /// An `EachOf`/`OneOf` built with too few operands.
    #[error("{operator} requires at least {min} operands, got {actual}")]
    InvalidArity {
        /// `EachOf` or `OneOf`.
        operator: &'static str,
        /// Minimal number of operands.
        min: usize,
        /// Number of operands given.
        actual: usize,
    },

    /// A pattern facet is not a valid regular expression.
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern.
        pattern: String,
        /// The regex compiler error.
        message: String,
    },
}

/// An engine fault: validation could not complete.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShexValidationError {
    /// The requested shape label is not declared.
    #[error("Shape not found: {label}")]
    ShapeNotFound {
        /// The requested label.
        label: Label,
    },

    /// Validation against the start shape of a schema without one.
    #[error("The schema has no start shape")]
    MissingStart,

    /// A reference met during evaluation does not resolve.
    #[error("Dangling reference to {label} during validation")]
    DanglingReference {
        /// The referenced label.
        label: Label,
    },

    /// A normalized triple expression is not in SORBE form.
    #[error("Malformed SORBE expression: {message}")]
    MalformedSorbe {
        /// What is wrong with the expression.
        message: String,
    },

    /// A semantic action handler failed.
    #[error("Semantic action {name} failed: {message}")]
    SemanticAction {
        /// The extension IRI of the action.
        name: NamedNode,
        /// The handler error.
        message: String,
    },

    /// A resource limit was exceeded.
    #[error(transparent)]
    Limit(#[from] ValidationLimitError),

    /// Internal error.
    #[error("Internal validation error: {message}")]
    Internal {
        /// Error description.
        message: String,
    },
}

fn display_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ShexSchemaError {
    /// Creates a duplicate label error.
    pub fn duplicate_label(label: Label) -> Self {
        Self::DuplicateLabel { label }
    }

    /// Creates an undefined reference error.
    pub fn undefined_reference(label: Label) -> Self {
        Self::UndefinedReference { label }
    }

    /// Creates a cyclic reference error.
    pub fn cyclic_reference(labels: Vec<Label>) -> Self {
        Self::CyclicReference { labels }
    }

    /// Creates an unstratified negation error.
    pub fn unstratified_negation(from: Label, to: Label) -> Self {
        Self::UnstratifiedNegation { from, to }
    }

    /// Creates an ill-formed extends error.
    pub fn ill_formed_extends(label: Label, message: impl Into<String>) -> Self {
        Self::IllFormedExtends {
            label,
            message: message.into(),
        }
    }

    /// Creates an invalid arity error.
    pub fn invalid_arity(operator: &'static str, min: usize, actual: usize) -> Self {
        Self::InvalidArity {
            operator,
            min,
            actual,
        }
    }

    /// Creates an invalid regex error.
    pub fn invalid_regex(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ShexValidationError {
    /// Creates a shape not found error.
    pub fn shape_not_found(label: Label) -> Self {
        Self::ShapeNotFound { label }
    }

    /// Creates a dangling reference error.
    pub fn dangling_reference(label: Label) -> Self {
        Self::DanglingReference { label }
    }

    /// Creates a malformed SORBE error.
    pub fn malformed_sorbe(message: impl Into<String>) -> Self {
        Self::MalformedSorbe {
            message: message.into(),
        }
    }

    /// Creates a semantic action error.
    pub fn semantic_action(name: NamedNode, message: impl Into<String>) -> Self {
        Self::SemanticAction {
            name,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
