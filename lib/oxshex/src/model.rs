//! ShEx expression model.
//!
//! This module defines the value types the engine works on:
//! - [`Label`] - Identifier of a shape or triple expression declaration (IRI or blank node)
//! - [`ShapeExpr`] - Shape expressions (`AND`, `OR`, `NOT`, references, shapes, node constraints)
//! - [`TripleExpr`] - Triple expressions (`EachOf`, `OneOf`, cardinalities, triple constraints)
//! - [`NodeConstraint`] - Constraints on a node itself (kind, datatype, facets, value set)
//! - [`ShapesSchema`] - The declarations, start shape and imports of a schema
//!
//! Expression handles are cheap to clone and carry an [`ExprId`] assigned when the node is
//! built. Two structurally equal expressions built separately have different identities, and
//! everything the engine memoizes is keyed on that identity.

use crate::cardinality::Cardinality;
use crate::error::ShexSchemaError;
use oxrdf::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_EXPR_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u64);

impl ExprId {
    fn fresh() -> Self {
        Self(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Label of a shape expression or triple expression declaration.
///
/// Shape and triple expression labels share one label space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// Named declaration (IRI).
    Iri(NamedNode),
    /// Anonymous declaration (blank node).
    BNode(BlankNode),
}

impl Label {
    /// Creates a label from a named or blank node.
    pub fn from_named_or_blank(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::NamedNode(n) => Self::Iri(n),
            NamedOrBlankNode::BlankNode(b) => Self::BNode(b),
        }
    }

    /// Converts to a Term.
    pub fn to_term(&self) -> Term {
        match self {
            Self::Iri(n) => Term::NamedNode(n.clone()),
            Self::BNode(b) => Term::BlankNode(b.clone()),
        }
    }

    /// Returns the label as a named node if it is one.
    pub fn as_iri(&self) -> Option<&NamedNode> {
        match self {
            Self::Iri(n) => Some(n),
            Self::BNode(_) => None,
        }
    }
}

impl From<NamedNode> for Label {
    fn from(n: NamedNode) -> Self {
        Self::Iri(n)
    }
}

impl From<BlankNode> for Label {
    fn from(b: BlankNode) -> Self {
        Self::BNode(b)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(n) => write!(f, "<{}>", n.as_str()),
            Self::BNode(b) => write!(f, "_:{}", b.as_str()),
        }
    }
}

/// A semantic action: an extension IRI and the code handed to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemAct {
    /// Extension IRI used to pick the handler.
    pub name: NamedNode,
    /// Code passed to the handler.
    pub code: Option<String>,
}

impl SemAct {
    /// Creates a semantic action without code.
    pub fn new(name: NamedNode) -> Self {
        Self { name, code: None }
    }

    /// Sets the code of the action.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Shape expression handle.
///
/// Cloning the handle keeps the node identity.
#[derive(Debug, Clone)]
pub struct ShapeExpr {
    node: Arc<ShapeExprNode>,
}

#[derive(Debug)]
struct ShapeExprNode {
    id: ExprId,
    kind: ShapeExprKind,
    sem_acts: Vec<SemAct>,
}

/// The variants of a shape expression.
#[derive(Debug, Clone)]
pub enum ShapeExprKind {
    /// Conjunction of shape expressions (AND).
    And(Vec<ShapeExpr>),
    /// Disjunction of shape expressions (OR).
    Or(Vec<ShapeExpr>),
    /// Negation of a shape expression (NOT).
    Not(ShapeExpr),
    /// Reference to a shape declaration.
    Ref(Label),
    /// Shape with a triple expression, constraining the focus node neighbourhood.
    Shape(Shape),
    /// Node constraint, constraining the focus node itself.
    NodeConstraint(NodeConstraint),
    /// Shape defined outside of the schema. It is never satisfied by this engine.
    External,
}

impl ShapeExpr {
    /// Builds a new shape expression node.
    pub fn new(kind: ShapeExprKind) -> Self {
        Self::with_sem_acts(kind, Vec::new())
    }

    /// Builds a new shape expression node carrying semantic actions.
    pub fn with_sem_acts(kind: ShapeExprKind, sem_acts: Vec<SemAct>) -> Self {
        Self {
            node: Arc::new(ShapeExprNode {
                id: ExprId::fresh(),
                kind,
                sem_acts,
            }),
        }
    }

    /// `AND` of the given expressions.
    pub fn and(exprs: impl IntoIterator<Item = Self>) -> Self {
        Self::new(ShapeExprKind::And(exprs.into_iter().collect()))
    }

    /// `OR` of the given expressions.
    pub fn or(exprs: impl IntoIterator<Item = Self>) -> Self {
        Self::new(ShapeExprKind::Or(exprs.into_iter().collect()))
    }

    /// `NOT` of the given expression.
    pub fn not(expr: Self) -> Self {
        Self::new(ShapeExprKind::Not(expr))
    }

    /// Reference to a shape declaration.
    pub fn reference(label: impl Into<Label>) -> Self {
        Self::new(ShapeExprKind::Ref(label.into()))
    }

    /// Shape expression wrapping a [`Shape`].
    pub fn shape(shape: Shape) -> Self {
        Self::new(ShapeExprKind::Shape(shape))
    }

    /// Shape expression wrapping a [`NodeConstraint`].
    pub fn node_constraint(constraint: NodeConstraint) -> Self {
        Self::new(ShapeExprKind::NodeConstraint(constraint))
    }

    /// External shape expression.
    pub fn external() -> Self {
        Self::new(ShapeExprKind::External)
    }

    /// Identity of this node.
    #[inline]
    pub fn id(&self) -> ExprId {
        self.node.id
    }

    /// The variant of this node.
    #[inline]
    pub fn kind(&self) -> &ShapeExprKind {
        &self.node.kind
    }

    /// Semantic actions attached to this node.
    #[inline]
    pub fn sem_acts(&self) -> &[SemAct] {
        &self.node.sem_acts
    }

    /// Returns the shape if this node is a [`ShapeExprKind::Shape`].
    pub fn as_shape(&self) -> Option<&Shape> {
        match self.kind() {
            ShapeExprKind::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    /// Splits an expression in extendable normal form into its main shape and constraints.
    ///
    /// The extendable normal form is either a `Shape`, or an `AND` whose first conjunct is a
    /// `Shape`.
    pub fn extendable_form(&self) -> Option<ExtendableForm<'_>> {
        match self.kind() {
            ShapeExprKind::Shape(shape) => Some(ExtendableForm {
                main: self,
                shape,
                constraints: &[],
            }),
            ShapeExprKind::And(conjuncts) => {
                let (main, constraints) = conjuncts.split_first()?;
                Some(ExtendableForm {
                    main,
                    shape: main.as_shape()?,
                    constraints,
                })
            }
            _ => None,
        }
    }
}

/// A shape expression seen as a main shape plus constraints.
#[derive(Debug, Clone, Copy)]
pub struct ExtendableForm<'a> {
    /// The main shape node.
    pub main: &'a ShapeExpr,
    /// The shape of the main node.
    pub shape: &'a Shape,
    /// The remaining conjuncts.
    pub constraints: &'a [ShapeExpr],
}

/// Shape: a triple expression plus closed-world settings.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    /// Triple expression the neighbourhood must match. `None` for `{}`.
    pub expression: Option<TripleExpr>,

    /// Whether this is a closed shape (no out-edges beyond the mentioned predicates).
    pub closed: bool,

    /// Predicates whose triples may be left unmatched.
    pub extra: Vec<NamedNode>,

    /// Labels of the shapes this shape extends.
    pub extends: Vec<Label>,
}

impl Shape {
    /// Creates a new empty shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shape with the given triple expression.
    pub fn with_expression(expression: TripleExpr) -> Self {
        Self {
            expression: Some(expression),
            ..Self::default()
        }
    }

    /// Sets whether this shape is closed.
    #[must_use]
    pub fn with_closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Adds `EXTRA` predicates.
    #[must_use]
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = NamedNode>) -> Self {
        self.extra.extend(extra);
        self
    }

    /// Adds extended shapes.
    #[must_use]
    pub fn with_extends(mut self, extends: impl IntoIterator<Item = Label>) -> Self {
        self.extends.extend(extends);
        self
    }

    /// Returns true if the predicate is declared `EXTRA`.
    pub fn is_extra(&self, predicate: &NamedNode) -> bool {
        self.extra.contains(predicate)
    }
}

/// Triple expression handle.
///
/// Cloning the handle keeps the node identity. Nodes built by the SORBE normalizer keep a
/// back-reference to the node they were cloned from, see [`TripleExpr::source`].
#[derive(Debug, Clone)]
pub struct TripleExpr {
    node: Arc<TripleExprNode>,
}

#[derive(Debug)]
struct TripleExprNode {
    id: ExprId,
    kind: TripleExprKind,
    sem_acts: Vec<SemAct>,
    origin: Option<TripleExpr>,
}

/// The variants of a triple expression.
#[derive(Debug, Clone)]
pub enum TripleExprKind {
    /// All sub-expressions must match (at least two).
    EachOf(Vec<TripleExpr>),
    /// Exactly one sub-expression must match (at least one).
    OneOf(Vec<TripleExpr>),
    /// The sub-expression repeated within the given cardinality.
    Cardinality(TripleExpr, Cardinality),
    /// A single triple constraint.
    Constraint(TripleConstraint),
    /// Reference to a labelled triple expression.
    Ref(Label),
    /// Matches only the empty set of triples.
    Empty,
}

impl TripleExpr {
    /// Builds a new triple expression node, checking `EachOf`/`OneOf` arities.
    pub fn new(kind: TripleExprKind) -> Result<Self, ShexSchemaError> {
        Self::with_sem_acts(kind, Vec::new())
    }

    /// Builds a new triple expression node carrying semantic actions.
    pub fn with_sem_acts(
        kind: TripleExprKind,
        sem_acts: Vec<SemAct>,
    ) -> Result<Self, ShexSchemaError> {
        match &kind {
            TripleExprKind::EachOf(exprs) if exprs.len() < 2 => {
                return Err(ShexSchemaError::invalid_arity("EachOf", 2, exprs.len()));
            }
            TripleExprKind::OneOf(exprs) if exprs.is_empty() => {
                return Err(ShexSchemaError::invalid_arity("OneOf", 1, 0));
            }
            _ => {}
        }
        Ok(Self::build(kind, sem_acts, None))
    }

    /// `EachOf` of the given expressions.
    pub fn each_of(exprs: impl IntoIterator<Item = Self>) -> Result<Self, ShexSchemaError> {
        Self::new(TripleExprKind::EachOf(exprs.into_iter().collect()))
    }

    /// `OneOf` of the given expressions.
    pub fn one_of(exprs: impl IntoIterator<Item = Self>) -> Result<Self, ShexSchemaError> {
        Self::new(TripleExprKind::OneOf(exprs.into_iter().collect()))
    }

    /// A triple constraint.
    pub fn constraint(constraint: TripleConstraint) -> Self {
        Self::build(TripleExprKind::Constraint(constraint), Vec::new(), None)
    }

    /// Reference to a labelled triple expression.
    pub fn reference(label: impl Into<Label>) -> Self {
        Self::build(TripleExprKind::Ref(label.into()), Vec::new(), None)
    }

    /// The empty triple expression.
    pub fn empty() -> Self {
        Self::build(TripleExprKind::Empty, Vec::new(), None)
    }

    /// Wraps this expression into a new cardinality node.
    #[must_use]
    pub fn with_cardinality(self, cardinality: Cardinality) -> Self {
        Self::build(
            TripleExprKind::Cardinality(self, cardinality),
            Vec::new(),
            None,
        )
    }

    /// Builds a node standing for `origin` in a normalized expression.
    pub(crate) fn derived(kind: TripleExprKind, origin: &Self) -> Self {
        Self::build(kind, Vec::new(), Some(origin.source().clone()))
    }

    fn build(kind: TripleExprKind, sem_acts: Vec<SemAct>, origin: Option<Self>) -> Self {
        Self {
            node: Arc::new(TripleExprNode {
                id: ExprId::fresh(),
                kind,
                sem_acts,
                origin,
            }),
        }
    }

    /// Identity of this node.
    #[inline]
    pub fn id(&self) -> ExprId {
        self.node.id
    }

    /// The variant of this node.
    #[inline]
    pub fn kind(&self) -> &TripleExprKind {
        &self.node.kind
    }

    /// Semantic actions attached to this node.
    #[inline]
    pub fn sem_acts(&self) -> &[SemAct] {
        &self.node.sem_acts
    }

    /// The schema node this node was cloned from, or itself if it is not a clone.
    #[inline]
    pub fn source(&self) -> &Self {
        self.node.origin.as_ref().unwrap_or(self)
    }

    /// Returns true if both handles point to the same node.
    #[inline]
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Returns the triple constraint if this node is a [`TripleExprKind::Constraint`].
    pub fn as_constraint(&self) -> Option<&TripleConstraint> {
        match self.kind() {
            TripleExprKind::Constraint(tc) => Some(tc),
            _ => None,
        }
    }
}

/// Constraint on the triples of one predicate.
///
/// Specifies a predicate, a direction and an optional value expression that the node on the
/// other end of the triple must satisfy.
#[derive(Debug, Clone)]
pub struct TripleConstraint {
    /// Predicate IRI for this constraint.
    pub predicate: NamedNode,

    /// Whether this constraint is inverse (focus node is object).
    pub inverse: bool,

    /// Optional shape expression that values must satisfy.
    pub value_expr: Option<ShapeExpr>,
}

impl TripleConstraint {
    /// Creates a new triple constraint with the given predicate.
    pub fn new(predicate: NamedNode) -> Self {
        Self {
            predicate,
            inverse: false,
            value_expr: None,
        }
    }

    /// Creates a new triple constraint with predicate and value expression.
    pub fn with_value_expr(predicate: NamedNode, value_expr: ShapeExpr) -> Self {
        Self {
            predicate,
            inverse: false,
            value_expr: Some(value_expr),
        }
    }

    /// Sets whether this constraint is inverse.
    #[must_use]
    pub fn with_inverse(mut self, inverse: bool) -> Self {
        self.inverse = inverse;
        self
    }
}

/// Node constraint - validates properties of nodes.
///
/// Can constrain node kind, datatype, string facets (length, pattern),
/// numeric facets (range, digits), and value sets. All components must hold.
#[derive(Debug, Clone, Default)]
pub struct NodeConstraint {
    /// Required node kind (IRI, BlankNode, Literal, etc.).
    pub node_kind: Option<NodeKind>,

    /// Required datatype for literals.
    pub datatype: Option<NamedNode>,

    /// String facets (length, pattern).
    pub string_facets: Vec<StringFacet>,

    /// Numeric facets (range, digits).
    pub numeric_facets: Vec<NumericFacet>,

    /// Value set constraint.
    pub values: Vec<ValueSetValue>,
}

impl NodeConstraint {
    /// Creates a new empty node constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node constraint with the given node kind.
    pub fn with_node_kind(node_kind: NodeKind) -> Self {
        Self {
            node_kind: Some(node_kind),
            ..Self::default()
        }
    }

    /// Creates a node constraint with the given datatype.
    pub fn with_datatype(datatype: NamedNode) -> Self {
        Self {
            datatype: Some(datatype),
            ..Self::default()
        }
    }

    /// Creates a node constraint with the given value set.
    pub fn with_values(values: impl IntoIterator<Item = ValueSetValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Adds a string facet.
    #[must_use]
    pub fn with_string_facet(mut self, facet: StringFacet) -> Self {
        self.string_facets.push(facet);
        self
    }

    /// Adds a numeric facet.
    #[must_use]
    pub fn with_numeric_facet(mut self, facet: NumericFacet) -> Self {
        self.numeric_facets.push(facet);
        self
    }

    /// Adds a value to the value set.
    pub fn add_value(&mut self, value: ValueSetValue) {
        self.values.push(value);
    }

    /// Returns true if this constraint is empty.
    pub fn is_empty(&self) -> bool {
        self.node_kind.is_none()
            && self.datatype.is_none()
            && self.string_facets.is_empty()
            && self.numeric_facets.is_empty()
            && self.values.is_empty()
    }
}

/// Node kind constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// IRI node.
    Iri,
    /// Blank node.
    BNode,
    /// Literal value.
    Literal,
    /// Non-literal (IRI or blank node).
    NonLiteral,
}

impl NodeKind {
    /// Returns true if the given term matches this node kind.
    pub fn matches(&self, term: &Term) -> bool {
        match self {
            Self::Iri => matches!(term, Term::NamedNode(_)),
            Self::BNode => matches!(term, Term::BlankNode(_)),
            Self::Literal => matches!(term, Term::Literal(_)),
            Self::NonLiteral => matches!(term, Term::NamedNode(_) | Term::BlankNode(_)),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri => f.write_str("IRI"),
            Self::BNode => f.write_str("BNODE"),
            Self::Literal => f.write_str("LITERAL"),
            Self::NonLiteral => f.write_str("NONLITERAL"),
        }
    }
}

/// String facet constraint (length, pattern).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFacet {
    /// Exact string length.
    Length(usize),
    /// Minimum string length.
    MinLength(usize),
    /// Maximum string length.
    MaxLength(usize),
    /// Regular expression pattern.
    Pattern {
        /// Regex pattern.
        pattern: String,
        /// Optional regex flags (`i`, `m`, `s`, `x`).
        flags: Option<String>,
    },
}

/// Numeric facet constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericFacet {
    /// Minimum inclusive value.
    MinInclusive(Literal),
    /// Minimum exclusive value.
    MinExclusive(Literal),
    /// Maximum inclusive value.
    MaxInclusive(Literal),
    /// Maximum exclusive value.
    MaxExclusive(Literal),
    /// Maximal number of digits.
    TotalDigits(u32),
    /// Maximal number of fractional digits.
    FractionDigits(u32),
}

/// Value in a value set constraint.
///
/// An empty stem matches every term of its kind, which is how wildcard ranges are written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueSetValue {
    /// Exact RDF term.
    ObjectValue(Term),

    /// IRI stem (prefix match).
    IriStem(String),

    /// IRI stem minus exclusions.
    IriStemRange {
        /// Base stem to match.
        stem: String,
        /// Values to exclude.
        exclusions: Vec<ValueSetValue>,
    },

    /// Literal stem (lexical form prefix match).
    LiteralStem(String),

    /// Literal stem minus exclusions.
    LiteralStemRange {
        /// Base stem to match.
        stem: String,
        /// Values to exclude.
        exclusions: Vec<ValueSetValue>,
    },

    /// Exact language tag.
    Language(String),

    /// Language range (language tag prefix match on subtag boundaries).
    LanguageStem(String),

    /// Language range minus exclusions.
    LanguageStemRange {
        /// Base stem to match.
        stem: String,
        /// Values to exclude.
        exclusions: Vec<ValueSetValue>,
    },
}

impl ValueSetValue {
    /// Creates an IRI stem value.
    pub fn iri_stem(stem: impl Into<String>) -> Self {
        Self::IriStem(stem.into())
    }

    /// Creates a literal stem value.
    pub fn literal_stem(stem: impl Into<String>) -> Self {
        Self::LiteralStem(stem.into())
    }

    /// Creates a language stem value.
    pub fn language_stem(stem: impl Into<String>) -> Self {
        Self::LanguageStem(stem.into())
    }
}

/// A labelled shape expression.
#[derive(Debug, Clone)]
pub struct ShapeDecl {
    label: Label,
    is_abstract: bool,
    expr: ShapeExpr,
}

impl ShapeDecl {
    /// Creates a non-abstract declaration.
    pub fn new(label: Label, expr: ShapeExpr) -> Self {
        Self {
            label,
            is_abstract: false,
            expr,
        }
    }

    /// Creates an abstract declaration, only satisfiable through its subtypes.
    pub fn new_abstract(label: Label, expr: ShapeExpr) -> Self {
        Self {
            label,
            is_abstract: true,
            expr,
        }
    }

    /// The declaration label.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Whether the declaration is abstract.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The declared shape expression.
    pub fn expr(&self) -> &ShapeExpr {
        &self.expr
    }
}

/// Collection of shape declarations (shapes schema in ShEx terminology).
///
/// Contains shape declarations and labelled triple expressions indexed by label,
/// with imports and the start shape. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct ShapesSchema {
    /// Shape declarations indexed by label.
    shapes: FxHashMap<Label, ShapeDecl>,

    /// Labelled triple expressions.
    triple_exprs: FxHashMap<Label, TripleExpr>,

    /// Optional start shape (default entry point for validation).
    start: Option<ShapeExpr>,

    /// Semantic actions run once before each validation run.
    start_acts: Vec<SemAct>,

    /// Imported schemas.
    imports: Vec<NamedNode>,

    /// Shape labels in insertion order.
    shape_labels: Vec<Label>,

    /// Triple expression labels in insertion order.
    triple_labels: Vec<Label>,
}

impl ShapesSchema {
    /// Creates a new empty shapes schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a non-abstract shape declaration, replacing any previous one with the same label.
    pub fn add_shape(&mut self, label: Label, expr: ShapeExpr) {
        self.add_shape_decl(ShapeDecl::new(label, expr));
    }

    /// Adds a shape declaration, replacing any previous one with the same label.
    pub fn add_shape_decl(&mut self, decl: ShapeDecl) {
        if !self.shapes.contains_key(decl.label()) {
            self.shape_labels.push(decl.label().clone());
        }
        self.shapes.insert(decl.label().clone(), decl);
    }

    /// Adds a labelled triple expression, replacing any previous one with the same label.
    pub fn add_triple_expr(&mut self, label: Label, expr: TripleExpr) {
        if !self.triple_exprs.contains_key(&label) {
            self.triple_labels.push(label.clone());
        }
        self.triple_exprs.insert(label, expr);
    }

    /// Gets a shape declaration by label.
    pub fn get_shape(&self, label: &Label) -> Option<&ShapeDecl> {
        self.shapes.get(label)
    }

    /// Gets a labelled triple expression.
    pub fn get_triple_expr(&self, label: &Label) -> Option<&TripleExpr> {
        self.triple_exprs.get(label)
    }

    /// Returns an iterator over all shape labels.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.shape_labels.iter()
    }

    /// Returns an iterator over all shape declarations.
    pub fn shapes(&self) -> impl Iterator<Item = &ShapeDecl> {
        self.shape_labels
            .iter()
            .filter_map(|label| self.shapes.get(label))
    }

    /// Returns an iterator over all labelled triple expressions.
    pub fn triple_exprs(&self) -> impl Iterator<Item = (&Label, &TripleExpr)> {
        self.triple_labels
            .iter()
            .filter_map(|label| Some((label, self.triple_exprs.get(label)?)))
    }

    /// Sets the start shape.
    pub fn set_start(&mut self, expr: ShapeExpr) {
        self.start = Some(expr);
    }

    /// Gets the start shape.
    pub fn start(&self) -> Option<&ShapeExpr> {
        self.start.as_ref()
    }

    /// Adds a semantic action run at the start of each validation run.
    pub fn add_start_act(&mut self, act: SemAct) {
        self.start_acts.push(act);
    }

    /// Semantic actions run at the start of each validation run.
    pub fn start_acts(&self) -> &[SemAct] {
        &self.start_acts
    }

    /// Adds an import.
    pub fn add_import(&mut self, import: NamedNode) {
        self.imports.push(import);
    }

    /// Returns an iterator over imports.
    pub fn imports(&self) -> impl Iterator<Item = &NamedNode> {
        self.imports.iter()
    }

    /// Returns true if the schema has no shape declaration.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Returns the number of shape declarations.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nn(iri: &str) -> NamedNode {
        NamedNode::new_unchecked(iri)
    }

    #[test]
    fn test_label_display() {
        let iri = Label::Iri(nn("http://example.org/PersonShape"));
        assert_eq!(iri.to_string(), "<http://example.org/PersonShape>");
        let bnode = Label::BNode(BlankNode::new_unchecked("s1"));
        assert_eq!(bnode.to_string(), "_:s1");
    }

    #[test]
    fn test_identity_survives_clone_only() {
        let tc = TripleConstraint::new(nn("http://example.org/p"));
        let a = TripleExpr::constraint(tc.clone());
        let b = TripleExpr::constraint(tc);
        assert_ne!(a.id(), b.id());
        let a2 = a.clone();
        assert_eq!(a.id(), a2.id());
        assert!(a.is_same(&a2));
        assert!(a.source().is_same(&a));
    }

    #[test]
    fn test_derived_points_to_root_source() {
        let a = TripleExpr::constraint(TripleConstraint::new(nn("http://example.org/p")));
        let clone = TripleExpr::derived(a.kind().clone(), &a);
        let clone_of_clone = TripleExpr::derived(clone.kind().clone(), &clone);
        assert_ne!(clone.id(), a.id());
        assert!(clone.source().is_same(&a));
        assert!(clone_of_clone.source().is_same(&a));
    }

    #[test]
    fn test_arity_is_checked() {
        let p = TripleExpr::constraint(TripleConstraint::new(nn("http://example.org/p")));
        assert!(matches!(
            TripleExpr::each_of([p.clone()]),
            Err(ShexSchemaError::InvalidArity { .. })
        ));
        assert!(matches!(
            TripleExpr::one_of([]),
            Err(ShexSchemaError::InvalidArity { .. })
        ));
        assert!(TripleExpr::one_of([p.clone()]).is_ok());
        assert!(TripleExpr::each_of([p.clone(), p]).is_ok());
    }

    #[test]
    fn test_extendable_form() {
        let main = ShapeExpr::shape(Shape::new());
        let constraint = ShapeExpr::node_constraint(NodeConstraint::with_node_kind(NodeKind::Iri));
        let and = ShapeExpr::and([main.clone(), constraint]);
        let form = and.extendable_form().unwrap();
        assert_eq!(form.main.id(), main.id());
        assert_eq!(form.constraints.len(), 1);
        assert!(main.extendable_form().unwrap().constraints.is_empty());
        let or = ShapeExpr::or([main]);
        assert!(or.extendable_form().is_none());
    }

    #[test]
    fn test_shapes_schema_add_get() {
        let mut schema = ShapesSchema::new();
        let label = Label::Iri(nn("http://example.org/PersonShape"));
        schema.add_shape(
            label.clone(),
            ShapeExpr::node_constraint(NodeConstraint::new()),
        );
        assert_eq!(schema.len(), 1);
        assert!(schema.get_shape(&label).is_some());
        assert!(!schema.get_shape(&label).unwrap().is_abstract());
        assert_eq!(schema.labels().count(), 1);
    }

    #[test]
    fn test_shapes_schema_keeps_insertion_order() {
        let mut schema = ShapesSchema::new();
        for name in ["c", "a", "b"] {
            schema.add_shape(
                Label::Iri(nn(&format!("http://example.org/{name}"))),
                ShapeExpr::external(),
            );
        }
        let order: Vec<_> = schema.labels().map(ToString::to_string).collect();
        assert_eq!(
            order,
            [
                "<http://example.org/c>",
                "<http://example.org/a>",
                "<http://example.org/b>"
            ]
        );
    }

    #[test]
    fn test_node_kind_matches() {
        let iri = Term::NamedNode(nn("http://example.org/"));
        let bnode = Term::BlankNode(BlankNode::default());
        let literal = Term::Literal(Literal::new_simple_literal("test"));

        assert!(NodeKind::Iri.matches(&iri));
        assert!(!NodeKind::Iri.matches(&bnode));
        assert!(!NodeKind::Iri.matches(&literal));

        assert!(NodeKind::BNode.matches(&bnode));
        assert!(!NodeKind::BNode.matches(&iri));

        assert!(NodeKind::Literal.matches(&literal));
        assert!(!NodeKind::Literal.matches(&iri));

        assert!(NodeKind::NonLiteral.matches(&iri));
        assert!(NodeKind::NonLiteral.matches(&bnode));
        assert!(!NodeKind::NonLiteral.matches(&literal));
    }
}
