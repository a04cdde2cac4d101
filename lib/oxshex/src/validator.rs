//! ShEx validator implementation.
//!
//! [`ShexValidator`] owns an analyzed schema and the memo tables shared by all the validation
//! runs made against it. Each call to [`ShexValidator::validate`] is a separate validation run
//! with its own recursion stack and diagnostics.

use crate::analyzer::analyze;
use crate::context::ValidationContext;
use crate::error::{ShexSchemaError, ShexValidationError};
use crate::extends::ExtendsPlan;
use crate::graph::GraphAccess;
use crate::hierarchy::TypeHierarchy;
use crate::limits::ValidationLimits;
use crate::model::{Label, ShapesSchema, TripleExpr};
use crate::result::ValidationReport;
use crate::semact::SemanticActions;
use crate::sorbe::{SorbeCache, SorbeForm};
use dashmap::DashMap;
use oxrdf::Term;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The shape a node is validated against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeSelector {
    /// A shape declaration.
    Label(Label),
    /// The start shape expression of the schema.
    Start,
}

impl From<Label> for ShapeSelector {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

impl fmt::Display for ShapeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => label.fmt(f),
            Self::Start => f.write_str("START"),
        }
    }
}

/// ShEx validator for validating RDF graphs against ShEx shapes.
///
/// The validator is `Send + Sync`: concurrent validations share its SORBE and `EXTENDS` memo
/// tables.
///
/// ```
/// use oxrdf::{Graph, Literal, NamedNode, Term, Triple};
/// use oxshex::{
///     Label, NodeConstraint, NodeKind, ShapeExpr, ShapeSelector, ShapesSchema, ShexValidator,
///     Shape, TripleConstraint, TripleExpr,
/// };
///
/// let p = NamedNode::new("http://example.com/p")?;
/// let label = Label::Iri(NamedNode::new("http://example.com/S")?);
/// let mut schema = ShapesSchema::new();
/// schema.add_shape(
///     label.clone(),
///     ShapeExpr::shape(Shape::with_expression(TripleExpr::constraint(
///         TripleConstraint::with_value_expr(
///             p.clone(),
///             ShapeExpr::node_constraint(NodeConstraint::with_node_kind(NodeKind::Iri)),
///         ),
///     ))),
/// );
/// let validator = ShexValidator::new(schema)?;
///
/// let n1 = NamedNode::new("http://example.com/n1")?;
/// let mut graph = Graph::new();
/// graph.insert(&Triple::new(n1.clone(), p.clone(), NamedNode::new("http://example.com/x")?));
/// let report = validator.validate(&graph, &Term::from(n1.clone()), &ShapeSelector::Label(label.clone()))?;
/// assert!(report.conforms());
///
/// let n2 = NamedNode::new("http://example.com/n2")?;
/// graph.insert(&Triple::new(n2.clone(), p, Literal::from("x")));
/// let report = validator.validate(&graph, &Term::from(n2), &ShapeSelector::Label(label))?;
/// assert!(!report.conforms());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct ShexValidator {
    schema: ShapesSchema,
    hierarchy: TypeHierarchy,
    sorbe: SorbeCache,
    extends_plans: DashMap<Label, Arc<ExtendsPlan>>,
    semantic_actions: SemanticActions,
    limits: ValidationLimits,
}

impl ShexValidator {
    /// Analyzes the schema and creates a validator for it.
    pub fn new(schema: ShapesSchema) -> Result<Self, ShexSchemaError> {
        analyze(&schema)?;
        let hierarchy = TypeHierarchy::new(&schema);
        debug!(shapes = schema.len(), "validator ready");
        Ok(Self {
            schema,
            hierarchy,
            sorbe: SorbeCache::default(),
            extends_plans: DashMap::default(),
            semantic_actions: SemanticActions::new(),
            limits: ValidationLimits::default(),
        })
    }

    /// Sets the resource limits of validation runs.
    #[must_use]
    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the semantic action handlers.
    #[must_use]
    pub fn with_semantic_actions(mut self, semantic_actions: SemanticActions) -> Self {
        self.semantic_actions = semantic_actions;
        self
    }

    /// Returns a reference to the shapes schema.
    pub fn schema(&self) -> &ShapesSchema {
        &self.schema
    }

    /// Returns the `EXTENDS` hierarchy of the schema.
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Returns the resource limits of validation runs.
    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Validates a node against a shape.
    ///
    /// Non-conformance is reported in the returned [`ValidationReport`]. An error means the
    /// engine could not decide.
    pub fn validate(
        &self,
        graph: &impl GraphAccess,
        node: &Term,
        selector: &ShapeSelector,
    ) -> Result<ValidationReport, ShexValidationError> {
        self.validate_shape_map(graph, &[(node.clone(), selector.clone())])
    }

    /// Validates each `(node, shape)` pair, in order, within one validation run.
    ///
    /// The start semantic actions of the schema run once, before the first pair.
    pub fn validate_shape_map(
        &self,
        graph: &impl GraphAccess,
        shape_map: &[(Term, ShapeSelector)],
    ) -> Result<ValidationReport, ShexValidationError> {
        for (_, selector) in shape_map {
            match selector {
                ShapeSelector::Label(label) if self.schema.get_shape(label).is_none() => {
                    return Err(ShexValidationError::shape_not_found(label.clone()));
                }
                ShapeSelector::Start if self.schema.start().is_none() => {
                    return Err(ShexValidationError::MissingStart);
                }
                _ => {}
            }
        }
        let mut context = ValidationContext::new(self, graph);
        let started = context.run_start_acts()?;
        let mut report = ValidationReport::new();
        for (node, selector) in shape_map {
            report.add_entry(context.check(node, selector, started)?);
        }
        debug!(
            entries = report.len(),
            conforms = report.conforms(),
            assignments = context.tracker.assignments(),
            "validation run done"
        );
        Ok(report)
    }

    pub(crate) fn semantic_actions(&self) -> &SemanticActions {
        &self.semantic_actions
    }

    /// The memoized SORBE form of a triple expression.
    pub(crate) fn sorbe_form(
        &self,
        expr: &TripleExpr,
    ) -> Result<Arc<SorbeForm>, ShexValidationError> {
        self.sorbe
            .get_or_normalize(expr, &self.schema, self.limits.max_expansion)
    }

    /// The memoized evaluation plan of a declaration with parents.
    pub(crate) fn extends_plan(
        &self,
        label: &Label,
    ) -> Result<Arc<ExtendsPlan>, ShexValidationError> {
        if let Some(plan) = self.extends_plans.get(label) {
            return Ok(Arc::clone(plan.value()));
        }
        let plan = Arc::new(ExtendsPlan::build(
            label,
            &self.schema,
            &self.hierarchy,
            &self.sorbe,
            self.limits.max_expansion,
        )?);
        Ok(Arc::clone(
            self.extends_plans
                .entry(label.clone())
                .or_insert(plan)
                .value(),
        ))
    }
}
