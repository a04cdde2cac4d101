//! ShEx (Shape Expressions) validation engine for RDF graphs.
//!
//! This crate decides whether nodes of an RDF graph conform to the shapes of a
//! [ShEx](https://shex.io/) schema. It works on the schema data model ([`ShapesSchema`],
//! [`ShapeExpr`], [`TripleExpr`]...): parsing ShExC or ShExJ is left to other crates.
//!
//! # Core Concepts
//!
//! - **Schema**: Shape declarations and labelled triple expressions ([`ShapesSchema`]), checked
//!   once by [`analyze`] for dangling references, reference cycles, unstratified negation and
//!   ill-formed `EXTENDS`
//! - **Normalization**: Triple expressions are rewritten to a SORBE form ([`normalize`]) that
//!   the matcher can evaluate with interval arithmetic on [`Cardinality`]s
//! - **Validation**: [`ShexValidator`] evaluates shape expressions, following recursive
//!   references co-inductively
//! - **Report**: One [`ShapeResult`] per validated node, with [`Diagnostic`]s explaining failures
//!
//! # Quick Start
//!
//! ```
//! use oxrdf::{Graph, NamedNode, Term, Triple};
//! use oxshex::{
//!     Cardinality, Label, ShapeExpr, ShapeSelector, ShapesSchema, Shape, TripleConstraint,
//!     TripleExpr, validate,
//! };
//!
//! let knows = NamedNode::new("http://example.com/knows")?;
//! let person = Label::Iri(NamedNode::new("http://example.com/Person")?);
//!
//! // Person = { ex:knows @Person * }
//! let mut schema = ShapesSchema::new();
//! schema.add_shape(
//!     person.clone(),
//!     ShapeExpr::shape(Shape::with_expression(
//!         TripleExpr::constraint(TripleConstraint::with_value_expr(
//!             knows.clone(),
//!             ShapeExpr::reference(person.clone()),
//!         ))
//!         .with_cardinality(Cardinality::STAR),
//!     )),
//! );
//!
//! let alice = NamedNode::new("http://example.com/alice")?;
//! let bob = NamedNode::new("http://example.com/bob")?;
//! let mut graph = Graph::new();
//! graph.insert(&Triple::new(alice.clone(), knows.clone(), bob.clone()));
//! graph.insert(&Triple::new(bob, knows, alice.clone()));
//!
//! let report = validate(&graph, &schema, &ShapeSelector::Label(person), &Term::from(alice))?;
//! assert!(report.conforms());
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod cardinality;
mod context;
mod error;
mod evaluator;
mod extends;
mod graph;
mod hierarchy;
mod limits;
mod matcher;
mod model;
mod node_constraint;
mod result;
mod semact;
mod sorbe;
mod validator;

pub use analyzer::analyze;
pub use cardinality::Cardinality;
pub use error::{ShexError, ShexSchemaError, ShexValidationError};
pub use graph::{Edge, GraphAccess, Neighbourhood};
pub use hierarchy::TypeHierarchy;
pub use limits::{ValidationLimitError, ValidationLimits};
pub use model::{
    ExprId, ExtendableForm, Label, NodeConstraint, NodeKind, NumericFacet, SemAct, Shape,
    ShapeDecl, ShapeExpr, ShapeExprKind, ShapesSchema, StringFacet, TripleConstraint, TripleExpr,
    TripleExprKind, ValueSetValue,
};
pub use result::{Diagnostic, DiagnosticKind, ShapeResult, ValidationReport, ValidationStatus};
pub use semact::{SemanticActionError, SemanticActionHandler, SemanticActions};
pub use sorbe::{
    AnnotatedSource, SorbeForm, is_sorbe, matches_empty, normalize, normalize_with_limit,
};
pub use validator::{ShapeSelector, ShexValidator};

use oxrdf::Term;

/// Analyzes `schema` and validates `node` against the selected shape.
///
/// Build a [`ShexValidator`] instead to validate many nodes against the same schema.
pub fn validate(
    graph: &impl GraphAccess,
    schema: &ShapesSchema,
    selector: &ShapeSelector,
    node: &Term,
) -> Result<ValidationReport, ShexError> {
    Ok(ShexValidator::new(schema.clone())?.validate(graph, node, selector)?)
}
