//! Shape expression evaluation.
//!
//! Evaluation is a recursive descent over shape expressions. A `(node, label)` pair met again
//! while it is being validated is assumed to hold, which gives recursive shapes their greatest
//! fixpoint semantics. Failures leave diagnostics in the current scope of the context.

use crate::context::ValidationContext;
use crate::error::ShexValidationError;
use crate::graph::{Edge, Neighbourhood};
use crate::matcher::{Assignment, MatchFailure, MatchResult, find_assignment};
use crate::model::{Label, Shape, ShapeDecl, ShapeExpr, ShapeExprKind};
use crate::node_constraint::check_node_constraint;
use crate::result::DiagnosticKind;
use crate::sorbe::SorbeForm;
use oxrdf::{NamedNode, Term, Triple};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::trace;

impl ValidationContext<'_> {
    /// Returns true if `node` satisfies `expr`.
    ///
    /// When it does not, the reasons are left in the current diagnostics scope.
    pub fn satisfies(
        &mut self,
        node: &Term,
        expr: &ShapeExpr,
    ) -> Result<bool, ShexValidationError> {
        self.tracker.enter_recursion()?;
        let matched = self.evaluate(node, expr);
        self.tracker.exit_recursion();
        let Some(triples) = matched? else {
            return Ok(false);
        };
        self.run_expr_sem_acts(node, expr, &triples)
    }

    /// Evaluates `expr`, returning the triples matched by its shape when it holds.
    fn evaluate(
        &mut self,
        node: &Term,
        expr: &ShapeExpr,
    ) -> Result<Option<Vec<Triple>>, ShexValidationError> {
        match expr.kind() {
            ShapeExprKind::And(conjuncts) => {
                for conjunct in conjuncts {
                    let (conforms, diagnostics) =
                        self.scoped(|context| context.satisfies(node, conjunct))?;
                    if !conforms {
                        self.promote(diagnostics);
                        return Ok(None);
                    }
                }
                Ok(Some(Vec::new()))
            }
            ShapeExprKind::Or(disjuncts) => {
                let mut failures = Vec::new();
                for disjunct in disjuncts {
                    let (conforms, diagnostics) =
                        self.scoped(|context| context.satisfies(node, disjunct))?;
                    if conforms {
                        return Ok(Some(Vec::new()));
                    }
                    failures.extend(diagnostics);
                }
                self.promote(failures);
                self.report(
                    node,
                    DiagnosticKind::Or,
                    format!(
                        "Node {node} does not match any of the {} alternatives",
                        disjuncts.len()
                    ),
                );
                Ok(None)
            }
            ShapeExprKind::Not(inner) => {
                let (conforms, _) = self.scoped(|context| context.satisfies(node, inner))?;
                if conforms {
                    self.report(
                        node,
                        DiagnosticKind::Not,
                        format!("Node {node} matches the negated shape expression"),
                    );
                    Ok(None)
                } else {
                    Ok(Some(Vec::new()))
                }
            }
            ShapeExprKind::Ref(label) => Ok(self.satisfies_label(node, label)?.then(Vec::new)),
            ShapeExprKind::Shape(shape) => self.satisfies_shape(node, shape),
            ShapeExprKind::NodeConstraint(constraint) => {
                let failures = check_node_constraint(node, constraint, &mut self.regexes)?;
                if failures.is_empty() {
                    return Ok(Some(Vec::new()));
                }
                for failure in failures {
                    self.report(node, failure.kind, failure.message);
                }
                Ok(None)
            }
            ShapeExprKind::External => {
                self.report(
                    node,
                    DiagnosticKind::External,
                    "External shapes are not available to this validator",
                );
                Ok(None)
            }
        }
    }

    /// Returns true if `node` satisfies the declaration of `label`.
    pub fn satisfies_label(
        &mut self,
        node: &Term,
        label: &Label,
    ) -> Result<bool, ShexValidationError> {
        let validator = self.validator;
        let decl = validator
            .schema()
            .get_shape(label)
            .ok_or_else(|| ShexValidationError::dangling_reference(label.clone()))?;
        if !self.enter(node, label) {
            trace!(%node, %label, "assumed by recursion");
            return Ok(true);
        }
        let previous = self.set_label(Some(label.clone()));
        let result = if decl.is_abstract() {
            self.satisfies_subtype(node, label)
        } else if validator.hierarchy().has_parents(label) {
            self.satisfies_extending(node, label, decl.expr())
        } else {
            self.satisfies(node, decl.expr())
        };
        self.set_label(previous);
        self.leave(node, label);
        trace!(%node, %label, conforms = ?result.as_ref().ok(), "shape evaluated");
        result
    }

    /// An abstract declaration holds if one of its concrete descendants does.
    fn satisfies_subtype(
        &mut self,
        node: &Term,
        label: &Label,
    ) -> Result<bool, ShexValidationError> {
        let validator = self.validator;
        let mut failures = Vec::new();
        for subtype in validator.hierarchy().descendants(label) {
            if validator
                .schema()
                .get_shape(subtype)
                .is_none_or(ShapeDecl::is_abstract)
            {
                continue;
            }
            let (conforms, diagnostics) =
                self.scoped(|context| context.satisfies_label(node, subtype))?;
            if conforms {
                return Ok(true);
            }
            failures.extend(diagnostics);
        }
        self.promote(failures);
        self.report(
            node,
            DiagnosticKind::AbstractShape,
            format!("Node {node} does not match any concrete shape extending {label}"),
        );
        Ok(false)
    }

    fn satisfies_shape(
        &mut self,
        node: &Term,
        shape: &Shape,
    ) -> Result<Option<Vec<Triple>>, ShexValidationError> {
        let form = match &shape.expression {
            Some(expression) => self.validator.sorbe_form(expression)?,
            None => Arc::new(SorbeForm::empty()),
        };
        let extra: FxHashSet<NamedNode> = shape.extra.iter().cloned().collect();
        let neighbourhood = self.neighbourhood(node, form.inverse_predicates());
        if shape.closed && !self.check_closed(node, &neighbourhood, &form, &extra) {
            return Ok(None);
        }
        Ok(self
            .match_neighbourhood(node, &neighbourhood, &form, &extra)?
            .map(|assignment| assignment.triples()))
    }

    /// Matches the joined main shapes of `label` and its ancestors, then checks the other
    /// conjuncts of each of them against the triples no other part claimed.
    fn satisfies_extending(
        &mut self,
        node: &Term,
        label: &Label,
        declared: &ShapeExpr,
    ) -> Result<bool, ShexValidationError> {
        let plan = self.validator.extends_plan(label)?;
        let form = plan.form();
        let neighbourhood = self.neighbourhood(node, form.inverse_predicates());
        if plan.closed() && !self.check_closed(node, &neighbourhood, form, plan.extra()) {
            return Ok(false);
        }
        let Some(assignment) = self.match_neighbourhood(node, &neighbourhood, form, plan.extra())?
        else {
            return Ok(false);
        };

        let mut claimed: Vec<Vec<Edge>> = vec![Vec::new(); plan.parts().len()];
        for (edge, id) in &assignment.matched {
            let owner = form
                .constraint(*id)
                .and_then(|constraint| plan.owner_of(constraint))
                .and_then(|owner| claimed.get_mut(owner))
                .ok_or_else(|| {
                    ShexValidationError::internal(format!(
                        "triple constraint {id} of {label} belongs to no ancestor"
                    ))
                })?;
            owner.push(edge.clone());
        }

        for (i, part) in plan.parts().iter().enumerate() {
            if !part.main.sem_acts().is_empty() {
                let triples: Vec<Triple> = claimed
                    .get(i)
                    .into_iter()
                    .flatten()
                    .map(|edge| edge.triple.clone())
                    .collect();
                if !self.run_expr_sem_acts(node, &part.main, &triples)? {
                    return Ok(false);
                }
            }
            if part.constraints.is_empty() {
                continue;
            }
            let others: FxHashSet<Edge> = claimed
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .flat_map(|(_, edges)| edges.iter().cloned())
                .collect();
            for constraint in &part.constraints {
                let (conforms, diagnostics) = self.hiding(node, others.clone(), |context| {
                    context.scoped(|context| context.satisfies(node, constraint))
                })?;
                if !conforms {
                    trace!(%node, ancestor = %part.label, "extended constraint failed");
                    self.promote(diagnostics);
                    return Ok(false);
                }
            }
        }

        let own_main = plan.parts().first().map(|part| part.main.id());
        if own_main != Some(declared.id()) {
            return self.run_expr_sem_acts(node, declared, &assignment.triples());
        }
        Ok(true)
    }

    /// Reports every out-edge whose predicate is neither mentioned nor `EXTRA`.
    fn check_closed(
        &mut self,
        node: &Term,
        neighbourhood: &Neighbourhood,
        form: &SorbeForm,
        extra: &FxHashSet<NamedNode>,
    ) -> bool {
        let mut closed = true;
        for triple in &neighbourhood.outgoing {
            if form.forward_predicates().contains(&triple.predicate)
                || extra.contains(&triple.predicate)
            {
                continue;
            }
            closed = false;
            let diagnostic = self
                .diagnostic(
                    node,
                    DiagnosticKind::Closed,
                    format!(
                        "Closed shape violation: unexpected predicate {}",
                        triple.predicate
                    ),
                )
                .with_predicate(triple.predicate.clone())
                .with_value(triple.object.clone());
            self.promote([diagnostic]);
        }
        closed
    }

    fn match_neighbourhood(
        &mut self,
        node: &Term,
        neighbourhood: &Neighbourhood,
        form: &SorbeForm,
        extra: &FxHashSet<NamedNode>,
    ) -> Result<Option<Assignment>, ShexValidationError> {
        let failures = match find_assignment(neighbourhood.edges(), form, extra, self)? {
            MatchResult::Matched(assignment) => {
                trace!(
                    %node,
                    matched = assignment.matched.len(),
                    extra = assignment.extras.len(),
                    "neighbourhood matched"
                );
                return Ok(Some(assignment));
            }
            MatchResult::Failed(failures) => failures,
        };
        for failure in failures {
            match failure {
                MatchFailure::Unmatched { edge, diagnostics } if diagnostics.is_empty() => {
                    let diagnostic = self
                        .diagnostic(
                            node,
                            DiagnosticKind::UnmatchedTriple,
                            format!("Triple {} matches no triple constraint", edge.triple),
                        )
                        .with_predicate(edge.predicate().clone())
                        .with_value(edge.opposite());
                    self.promote([diagnostic]);
                }
                MatchFailure::Unmatched { diagnostics, .. } => self.promote(diagnostics),
                MatchFailure::NoAssignment { tried } => self.report(
                    node,
                    DiagnosticKind::NoMatchingAssignment,
                    format!(
                        "The neighbourhood of {node} does not match the triple expression \
                        ({tried} assignments tried)"
                    ),
                ),
            }
        }
        Ok(None)
    }

    /// Runs the semantic actions attached to a shape expression that holds.
    fn run_expr_sem_acts(
        &mut self,
        node: &Term,
        expr: &ShapeExpr,
        triples: &[Triple],
    ) -> Result<bool, ShexValidationError> {
        if expr.sem_acts().is_empty()
            || self
                .validator
                .semantic_actions()
                .run(expr.sem_acts(), triples)?
        {
            return Ok(true);
        }
        self.report(
            node,
            DiagnosticKind::SemanticAction,
            format!("A semantic action rejected node {node}"),
        );
        Ok(false)
    }
}
