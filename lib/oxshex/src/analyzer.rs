//! Static checks run on a schema before it is used for validation.
//!
//! [`analyze`] rejects schemas the evaluator cannot give a meaning to: clashing or dangling
//! labels, reference cycles that never go through a shape, negation inside recursion and
//! ill-formed `EXTENDS` declarations.

use crate::error::ShexSchemaError;
use crate::hierarchy::TypeHierarchy;
use crate::model::{
    Label, Shape, ShapeExpr, ShapeExprKind, ShapesSchema, StringFacet, TripleExpr, TripleExprKind,
};
use crate::node_constraint::compile_pattern;
use oxrdf::NamedNode;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Checks that a schema is well-formed.
///
/// Checks run in order and stop at the first failure:
/// 1. no label is used both for a shape and a triple expression,
/// 2. every reference resolves,
/// 3. no reference cycle avoids going through a triple constraint,
/// 4. negation is stratified,
/// 5. `EXTENDS` declarations are well-formed,
/// 6. every pattern facet is a valid regular expression.
pub fn analyze(schema: &ShapesSchema) -> Result<(), ShexSchemaError> {
    check_duplicate_labels(schema)?;
    check_references(schema)?;
    check_direct_cycles(schema)?;
    check_stratification(schema)?;
    check_extends(schema)?;
    check_patterns(schema)?;
    debug!(
        shapes = schema.len(),
        triple_exprs = schema.triple_exprs().count(),
        "schema analyzed"
    );
    Ok(())
}

fn check_duplicate_labels(schema: &ShapesSchema) -> Result<(), ShexSchemaError> {
    for (label, _) in schema.triple_exprs() {
        if schema.get_shape(label).is_some() {
            return Err(ShexSchemaError::duplicate_label(label.clone()));
        }
    }
    Ok(())
}

fn check_references(schema: &ShapesSchema) -> Result<(), ShexSchemaError> {
    for decl in schema.shapes() {
        check_shape_refs(schema, decl.expr())?;
    }
    if let Some(start) = schema.start() {
        check_shape_refs(schema, start)?;
    }
    for (_, te) in schema.triple_exprs() {
        check_triple_refs(schema, te)?;
        let mut result = Ok(());
        walk_triple_expr_values(te, &mut |value| {
            if result.is_ok() {
                result = check_shape_refs(schema, value);
            }
        });
        result?;
    }
    Ok(())
}

/// Checks the shape references, extends targets and triple references under `root`.
fn check_shape_refs(schema: &ShapesSchema, root: &ShapeExpr) -> Result<(), ShexSchemaError> {
    let mut result = Ok(());
    walk_shape_expr(root, &mut |expr| {
        if result.is_err() {
            return;
        }
        result = match expr.kind() {
            ShapeExprKind::Ref(label) => resolve_shape(schema, label),
            ShapeExprKind::Shape(shape) => shape
                .extends
                .iter()
                .try_for_each(|parent| resolve_shape(schema, parent))
                .and_then(|()| {
                    shape
                        .expression
                        .as_ref()
                        .map_or(Ok(()), |te| check_triple_refs(schema, te))
                }),
            _ => Ok(()),
        };
    });
    result
}

fn resolve_shape(schema: &ShapesSchema, label: &Label) -> Result<(), ShexSchemaError> {
    if schema.get_shape(label).is_none() {
        return Err(ShexSchemaError::undefined_reference(label.clone()));
    }
    Ok(())
}

fn check_triple_refs(schema: &ShapesSchema, te: &TripleExpr) -> Result<(), ShexSchemaError> {
    match te.kind() {
        TripleExprKind::EachOf(exprs) | TripleExprKind::OneOf(exprs) => {
            for expr in exprs {
                check_triple_refs(schema, expr)?;
            }
            Ok(())
        }
        TripleExprKind::Cardinality(expr, _) => check_triple_refs(schema, expr),
        TripleExprKind::Ref(label) => {
            if schema.get_triple_expr(label).is_none() {
                return Err(ShexSchemaError::undefined_reference(label.clone()));
            }
            Ok(())
        }
        TripleExprKind::Constraint(_) | TripleExprKind::Empty => Ok(()),
    }
}

fn check_direct_cycles(schema: &ShapesSchema) -> Result<(), ShexSchemaError> {
    let mut shapes = LabelGraph::default();
    for decl in schema.shapes() {
        shapes.node(decl.label());
        let mut targets = Vec::new();
        direct_shape_refs(decl.expr(), &mut targets);
        for target in targets {
            shapes.add_edge(decl.label(), target, Polarity::Positive);
        }
    }
    shapes.reject_cycles()?;

    let mut triple_exprs = LabelGraph::default();
    for (label, te) in schema.triple_exprs() {
        triple_exprs.node(label);
        let mut targets = Vec::new();
        direct_triple_refs(te, &mut targets);
        for target in targets {
            triple_exprs.add_edge(label, target, Polarity::Positive);
        }
    }
    triple_exprs.reject_cycles()
}

/// References reachable through `AND`, `OR` and `NOT` only.
fn direct_shape_refs<'a>(expr: &'a ShapeExpr, out: &mut Vec<&'a Label>) {
    match expr.kind() {
        ShapeExprKind::And(exprs) | ShapeExprKind::Or(exprs) => {
            for expr in exprs {
                direct_shape_refs(expr, out);
            }
        }
        ShapeExprKind::Not(expr) => direct_shape_refs(expr, out),
        ShapeExprKind::Ref(label) => out.push(label),
        ShapeExprKind::Shape(_) | ShapeExprKind::NodeConstraint(_) | ShapeExprKind::External => {}
    }
}

/// Triple expression references reachable without crossing a triple constraint.
fn direct_triple_refs<'a>(te: &'a TripleExpr, out: &mut Vec<&'a Label>) {
    match te.kind() {
        TripleExprKind::EachOf(exprs) | TripleExprKind::OneOf(exprs) => {
            for expr in exprs {
                direct_triple_refs(expr, out);
            }
        }
        TripleExprKind::Cardinality(expr, _) => direct_triple_refs(expr, out),
        TripleExprKind::Ref(label) => out.push(label),
        TripleExprKind::Constraint(_) | TripleExprKind::Empty => {}
    }
}

fn check_stratification(schema: &ShapesSchema) -> Result<(), ShexSchemaError> {
    let mut graph = LabelGraph::default();
    for decl in schema.shapes() {
        graph.node(decl.label());
        let mut dependencies = Vec::new();
        shape_dependencies(
            schema,
            decl.expr(),
            Polarity::Positive,
            &mut FxHashSet::default(),
            &mut dependencies,
        );
        for (target, polarity) in dependencies {
            graph.add_edge(decl.label(), target, polarity);
        }
    }
    graph.reject_negative_cycles()
}

/// Signs of the dependency edges of the stratification graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

fn shape_dependencies<'a>(
    schema: &'a ShapesSchema,
    expr: &'a ShapeExpr,
    polarity: Polarity,
    visiting: &mut FxHashSet<&'a Label>,
    out: &mut Vec<(&'a Label, Polarity)>,
) {
    match expr.kind() {
        ShapeExprKind::And(exprs) | ShapeExprKind::Or(exprs) => {
            for expr in exprs {
                shape_dependencies(schema, expr, polarity, visiting, out);
            }
        }
        ShapeExprKind::Not(expr) => {
            shape_dependencies(schema, expr, polarity.flip(), visiting, out);
        }
        ShapeExprKind::Ref(label) => out.push((label, polarity)),
        ShapeExprKind::Shape(shape) => {
            out.extend(shape.extends.iter().map(|parent| (parent, polarity)));
            if let Some(te) = &shape.expression {
                triple_dependencies(schema, te, shape, polarity, visiting, out);
            }
        }
        ShapeExprKind::NodeConstraint(_) | ShapeExprKind::External => {}
    }
}

fn triple_dependencies<'a>(
    schema: &'a ShapesSchema,
    te: &'a TripleExpr,
    shape: &Shape,
    polarity: Polarity,
    visiting: &mut FxHashSet<&'a Label>,
    out: &mut Vec<(&'a Label, Polarity)>,
) {
    match te.kind() {
        TripleExprKind::EachOf(exprs) | TripleExprKind::OneOf(exprs) => {
            for expr in exprs {
                triple_dependencies(schema, expr, shape, polarity, visiting, out);
            }
        }
        TripleExprKind::Cardinality(expr, _) => {
            triple_dependencies(schema, expr, shape, polarity, visiting, out);
        }
        TripleExprKind::Constraint(tc) => {
            if let Some(value_expr) = &tc.value_expr {
                // Triples left unmatched on an EXTRA predicate must not satisfy the value
                // expression, so it is depended upon negatively as well.
                let polarity = if shape.is_extra(&tc.predicate) {
                    polarity.flip()
                } else {
                    polarity
                };
                shape_dependencies(schema, value_expr, polarity, visiting, out);
            }
        }
        TripleExprKind::Ref(label) => {
            if let Some(target) = schema.get_triple_expr(label) {
                if visiting.insert(label) {
                    triple_dependencies(schema, target, shape, polarity, visiting, out);
                    visiting.remove(label);
                }
            }
        }
        TripleExprKind::Empty => {}
    }
}

fn check_extends(schema: &ShapesSchema) -> Result<(), ShexSchemaError> {
    for decl in schema.shapes() {
        let main = decl.expr().extendable_form().map(|form| form.main.id());
        let mut misplaced = false;
        walk_shape_expr(decl.expr(), &mut |expr| {
            if let ShapeExprKind::Shape(shape) = expr.kind() {
                if !shape.extends.is_empty() && Some(expr.id()) != main {
                    misplaced = true;
                }
            }
        });
        if misplaced {
            return Err(ShexSchemaError::ill_formed_extends(
                decl.label().clone(),
                "EXTENDS is only allowed on the main shape of a declaration",
            ));
        }
    }
    if let Some(start) = schema.start() {
        let mut extending = None;
        walk_shape_expr(start, &mut |expr| {
            if let ShapeExprKind::Shape(shape) = expr.kind() {
                if extending.is_none() {
                    extending = shape.extends.first().cloned();
                }
            }
        });
        if let Some(parent) = extending {
            return Err(ShexSchemaError::ill_formed_extends(
                parent,
                "EXTENDS is not allowed in the start shape expression",
            ));
        }
    }

    let hierarchy = TypeHierarchy::new(schema);
    let mut graph = LabelGraph::default();
    for (child, parent) in hierarchy.edges() {
        graph.add_edge(child, parent, Polarity::Positive);
    }
    if let Some(cycle) = graph.first_cycle() {
        return Err(ShexSchemaError::ill_formed_extends(
            cycle[0].clone(),
            format!(
                "cyclic extension through {}",
                cycle
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }

    let mut touched = FxHashSet::default();
    for (child, parent) in hierarchy.edges() {
        touched.insert(child);
        touched.insert(parent);
    }
    for label in schema.labels().filter(|label| touched.contains(label)) {
        let Some(decl) = schema.get_shape(label) else {
            continue;
        };
        let Some(form) = decl.expr().extendable_form() else {
            return Err(ShexSchemaError::ill_formed_extends(
                label.clone(),
                "extended shapes must be a shape or a conjunction starting with a shape",
            ));
        };
        let mut main_predicates = FxHashSet::default();
        if let Some(te) = &form.shape.expression {
            triple_predicates(schema, te, &mut FxHashSet::default(), &mut main_predicates);
        }
        for constraint in form.constraints {
            let mut predicates = FxHashSet::default();
            walk_shape_expr(constraint, &mut |expr| {
                if let Some(te) = expr.as_shape().and_then(|shape| shape.expression.as_ref()) {
                    triple_predicates(schema, te, &mut FxHashSet::default(), &mut predicates);
                }
            });
            if let Some(shared) = predicates.intersection(&main_predicates).next() {
                return Err(ShexSchemaError::ill_formed_extends(
                    label.clone(),
                    format!("predicate {shared} is used both by the main shape and a constraint"),
                ));
            }
        }
    }
    Ok(())
}

fn triple_predicates<'a>(
    schema: &'a ShapesSchema,
    te: &'a TripleExpr,
    visiting: &mut FxHashSet<&'a Label>,
    out: &mut FxHashSet<&'a NamedNode>,
) {
    match te.kind() {
        TripleExprKind::EachOf(exprs) | TripleExprKind::OneOf(exprs) => {
            for expr in exprs {
                triple_predicates(schema, expr, visiting, out);
            }
        }
        TripleExprKind::Cardinality(expr, _) => triple_predicates(schema, expr, visiting, out),
        TripleExprKind::Constraint(tc) => {
            out.insert(&tc.predicate);
        }
        TripleExprKind::Ref(label) => {
            if let Some(target) = schema.get_triple_expr(label) {
                if visiting.insert(label) {
                    triple_predicates(schema, target, visiting, out);
                }
            }
        }
        TripleExprKind::Empty => {}
    }
}

fn check_patterns(schema: &ShapesSchema) -> Result<(), ShexSchemaError> {
    let mut result = Ok(());
    let mut check = |expr: &ShapeExpr| {
        if result.is_err() {
            return;
        }
        if let ShapeExprKind::NodeConstraint(nc) = expr.kind() {
            for facet in &nc.string_facets {
                if let StringFacet::Pattern { pattern, flags } = facet {
                    if let Err(e) = compile_pattern(pattern, flags.as_deref()) {
                        result = Err(ShexSchemaError::invalid_regex(pattern.clone(), e));
                        return;
                    }
                }
            }
        }
    };
    for decl in schema.shapes() {
        walk_shape_expr(decl.expr(), &mut check);
    }
    if let Some(start) = schema.start() {
        walk_shape_expr(start, &mut check);
    }
    for (_, te) in schema.triple_exprs() {
        walk_triple_expr_values(te, &mut |expr| walk_shape_expr(expr, &mut check));
    }
    result
}

/// Visits `expr` and every shape expression nested in it, value expressions included,
/// without following references.
fn walk_shape_expr<'a>(expr: &'a ShapeExpr, visit: &mut impl FnMut(&'a ShapeExpr)) {
    visit(expr);
    match expr.kind() {
        ShapeExprKind::And(exprs) | ShapeExprKind::Or(exprs) => {
            for expr in exprs {
                walk_shape_expr(expr, visit);
            }
        }
        ShapeExprKind::Not(expr) => walk_shape_expr(expr, visit),
        ShapeExprKind::Shape(shape) => {
            if let Some(te) = &shape.expression {
                walk_triple_expr_values(te, &mut |value| walk_shape_expr(value, visit));
            }
        }
        ShapeExprKind::Ref(_) | ShapeExprKind::NodeConstraint(_) | ShapeExprKind::External => {}
    }
}

/// Visits the value expressions of the triple constraints of `te`.
fn walk_triple_expr_values<'a>(te: &'a TripleExpr, visit: &mut dyn FnMut(&'a ShapeExpr)) {
    match te.kind() {
        TripleExprKind::EachOf(exprs) | TripleExprKind::OneOf(exprs) => {
            for expr in exprs {
                walk_triple_expr_values(expr, visit);
            }
        }
        TripleExprKind::Cardinality(expr, _) => walk_triple_expr_values(expr, visit),
        TripleExprKind::Constraint(tc) => {
            if let Some(value_expr) = &tc.value_expr {
                visit(value_expr);
            }
        }
        TripleExprKind::Ref(_) | TripleExprKind::Empty => {}
    }
}

/// A directed graph over labels, with the most negative polarity kept per edge.
#[derive(Default)]
struct LabelGraph<'a> {
    graph: DiGraph<&'a Label, Polarity>,
    index: FxHashMap<&'a Label, NodeIndex>,
}

impl<'a> LabelGraph<'a> {
    fn node(&mut self, label: &'a Label) -> NodeIndex {
        *self
            .index
            .entry(label)
            .or_insert_with(|| self.graph.add_node(label))
    }

    fn add_edge(&mut self, from: &'a Label, to: &'a Label, polarity: Polarity) {
        let from = self.node(from);
        let to = self.node(to);
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                if polarity == Polarity::Negative {
                    self.graph[edge] = Polarity::Negative;
                }
            }
            None => {
                self.graph.add_edge(from, to, polarity);
            }
        }
    }

    /// Strongly connected components that contain a cycle, members sorted by insertion.
    fn cyclic_components(&self) -> Vec<Vec<NodeIndex>> {
        let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || self.graph.contains_edge(component[0], component[0])
            })
            .map(|mut component| {
                component.sort_unstable();
                component
            })
            .collect();
        components.sort_unstable();
        components
    }

    fn first_cycle(&self) -> Option<Vec<Label>> {
        let component = self.cyclic_components().into_iter().next()?;
        Some(
            component
                .into_iter()
                .map(|node| self.graph[node].clone())
                .collect(),
        )
    }

    fn reject_cycles(&self) -> Result<(), ShexSchemaError> {
        match self.first_cycle() {
            Some(labels) => Err(ShexSchemaError::cyclic_reference(labels)),
            None => Ok(()),
        }
    }

    fn reject_negative_cycles(&self) -> Result<(), ShexSchemaError> {
        let mut component_of = FxHashMap::default();
        for (i, component) in self.cyclic_components().into_iter().enumerate() {
            for node in component {
                component_of.insert(node, i);
            }
        }
        for edge in self.graph.edge_references() {
            if *edge.weight() != Polarity::Negative {
                continue;
            }
            let (from, to) = (edge.source(), edge.target());
            let same_component = match (component_of.get(&from), component_of.get(&to)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            if from == to || same_component {
                return Err(ShexSchemaError::unstratified_negation(
                    self.graph[from].clone(),
                    self.graph[to].clone(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        NodeConstraint, NodeKind, ShapeDecl, TripleConstraint,
    };

    fn nn(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{name}"))
    }

    fn label(name: &str) -> Label {
        Label::Iri(nn(name))
    }

    fn shape_with(te: TripleExpr) -> ShapeExpr {
        ShapeExpr::shape(Shape::with_expression(te))
    }

    fn constraint(predicate: &str, value: Option<ShapeExpr>) -> TripleExpr {
        let tc = match value {
            Some(value) => TripleConstraint::with_value_expr(nn(predicate), value),
            None => TripleConstraint::new(nn(predicate)),
        };
        TripleExpr::constraint(tc)
    }

    #[test]
    fn test_duplicate_label() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(label("A"), ShapeExpr::external());
        schema.add_triple_expr(label("A"), constraint("p", None));
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_undefined_references() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(
            label("A"),
            shape_with(constraint("p", Some(ShapeExpr::reference(label("Missing"))))),
        );
        match analyze(&schema) {
            Err(ShexSchemaError::UndefinedReference { label: l }) => assert_eq!(l, label("Missing")),
            other => panic!("unexpected {other:?}"),
        }

        let mut schema = ShapesSchema::new();
        schema.add_shape(label("A"), shape_with(TripleExpr::reference(label("T"))));
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::UndefinedReference { .. })
        ));

        let mut schema = ShapesSchema::new();
        schema.add_shape(
            label("A"),
            ShapeExpr::shape(Shape::new().with_extends([label("Missing")])),
        );
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::UndefinedReference { .. })
        ));

        let mut schema = ShapesSchema::new();
        schema.set_start(ShapeExpr::reference(label("Missing")));
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::UndefinedReference { .. })
        ));
    }

    #[test]
    fn test_direct_shape_cycle() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(label("A"), ShapeExpr::reference(label("B")));
        schema.add_shape(
            label("B"),
            ShapeExpr::and([
                ShapeExpr::reference(label("A")),
                ShapeExpr::node_constraint(NodeConstraint::with_node_kind(NodeKind::Iri)),
            ]),
        );
        match analyze(&schema) {
            Err(ShexSchemaError::CyclicReference { labels }) => {
                assert_eq!(labels, [label("A"), label("B")]);
            }
            other => panic!("unexpected {other:?}"),
        }

        let mut schema = ShapesSchema::new();
        schema.add_shape(label("A"), ShapeExpr::not(ShapeExpr::reference(label("A"))));
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_triple_expr_cycle() {
        let mut schema = ShapesSchema::new();
        schema.add_triple_expr(
            label("T"),
            TripleExpr::each_of([constraint("p", None), TripleExpr::reference(label("T"))])
                .unwrap(),
        );
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_recursion_through_shape_is_fine() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(
            label("S"),
            shape_with(constraint("p", Some(ShapeExpr::reference(label("S"))))),
        );
        assert!(analyze(&schema).is_ok());
    }

    #[test]
    fn test_negation_in_cycle_is_rejected() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(label("A"), ShapeExpr::not(ShapeExpr::reference(label("B"))));
        schema.add_shape(
            label("B"),
            shape_with(constraint("p", Some(ShapeExpr::reference(label("A"))))),
        );
        match analyze(&schema) {
            Err(ShexSchemaError::UnstratifiedNegation { from, to }) => {
                assert_eq!(from, label("A"));
                assert_eq!(to, label("B"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_negation_outside_cycle_is_fine() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(label("A"), ShapeExpr::not(ShapeExpr::reference(label("B"))));
        schema.add_shape(label("B"), shape_with(constraint("p", None)));
        assert!(analyze(&schema).is_ok());
    }

    #[test]
    fn test_extra_flips_polarity() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(
            label("S"),
            ShapeExpr::shape(
                Shape::with_expression(constraint(
                    "p",
                    Some(ShapeExpr::reference(label("S"))),
                ))
                .with_extra([nn("p")]),
            ),
        );
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::UnstratifiedNegation { .. })
        ));

        // Double negation through NOT and EXTRA is positive again.
        let mut schema = ShapesSchema::new();
        schema.add_shape(
            label("S"),
            ShapeExpr::shape(
                Shape::with_expression(constraint(
                    "p",
                    Some(ShapeExpr::not(ShapeExpr::reference(label("S")))),
                ))
                .with_extra([nn("p")]),
            ),
        );
        assert!(analyze(&schema).is_ok());
    }

    #[test]
    fn test_extends_cycle() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(
            label("A"),
            ShapeExpr::shape(Shape::new().with_extends([label("B")])),
        );
        schema.add_shape(
            label("B"),
            ShapeExpr::shape(Shape::new().with_extends([label("A")])),
        );
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::IllFormedExtends { .. })
        ));
    }

    #[test]
    fn test_extends_requires_normal_form() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(
            label("Parent"),
            ShapeExpr::or([
                shape_with(constraint("p", None)),
                shape_with(constraint("q", None)),
            ]),
        );
        schema.add_shape(
            label("Child"),
            ShapeExpr::shape(Shape::new().with_extends([label("Parent")])),
        );
        match analyze(&schema) {
            Err(ShexSchemaError::IllFormedExtends { label: l, .. }) => {
                assert_eq!(l, label("Parent"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_extends_only_on_main_shape() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(label("Parent"), shape_with(constraint("p", None)));
        schema.add_shape(
            label("Child"),
            ShapeExpr::and([
                shape_with(constraint("q", None)),
                ShapeExpr::shape(Shape::new().with_extends([label("Parent")])),
            ]),
        );
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::IllFormedExtends { .. })
        ));
    }

    #[test]
    fn test_extends_predicates_must_be_disjoint() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(label("Parent"), shape_with(constraint("p", None)));
        schema.add_shape(
            label("Child"),
            ShapeExpr::and([
                ShapeExpr::shape(
                    Shape::with_expression(constraint("q", None))
                        .with_extends([label("Parent")]),
                ),
                shape_with(constraint("q", None)),
            ]),
        );
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::IllFormedExtends { .. })
        ));
    }

    #[test]
    fn test_well_formed_extends() {
        let mut schema = ShapesSchema::new();
        schema.add_shape_decl(ShapeDecl::new_abstract(
            label("Parent"),
            shape_with(constraint("p", None)),
        ));
        schema.add_shape(
            label("Child"),
            ShapeExpr::and([
                ShapeExpr::shape(
                    Shape::with_expression(constraint("q", None))
                        .with_extends([label("Parent")]),
                ),
                shape_with(constraint("r", None)),
            ]),
        );
        assert!(analyze(&schema).is_ok());
    }

    #[test]
    fn test_invalid_regex() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(
            label("A"),
            shape_with(constraint(
                "p",
                Some(ShapeExpr::node_constraint(
                    NodeConstraint::new().with_string_facet(StringFacet::Pattern {
                        pattern: "(unclosed".into(),
                        flags: None,
                    }),
                )),
            )),
        );
        assert!(matches!(
            analyze(&schema),
            Err(ShexSchemaError::InvalidRegex { .. })
        ));
    }
}
