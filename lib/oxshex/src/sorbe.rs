//! SORBE normalization of triple expressions.
//!
//! A SORBE ("single occurrence regular bag expression") form is a triple expression where:
//! - there is no reference to a labelled triple expression,
//! - each triple constraint node occurs once,
//! - the cardinality of a sub-expression that is not a bare triple constraint is one of
//!   `?`, `*`, `+` or `{0,0}`, and `+` never wraps an expression matching the empty bag.
//!
//! These restrictions let the matcher compute, for a bag of triples, the set of repetitions of
//! the expression that bag can form.
//!
//! Nodes built here are clones pointing back to the schema node they stand for through
//! [`TripleExpr::source`]. The form also remembers, for each source node carrying semantic
//! actions, which constraints were cloned from inside it.

use crate::cardinality::Cardinality;
use crate::error::ShexValidationError;
use crate::limits::{DEFAULT_MAX_EXPANSION, ValidationLimitError};
use crate::model::{ExprId, Label, ShapesSchema, TripleExpr, TripleExprKind};
use dashmap::DashMap;
use oxrdf::NamedNode;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::trace;

/// A triple expression in SORBE form with the lookup tables the matcher needs.
#[derive(Debug, Clone)]
pub struct SorbeForm {
    expr: TripleExpr,
    constraints: Vec<TripleExpr>,
    constraint_index: FxHashMap<ExprId, usize>,
    forward_predicates: FxHashSet<NamedNode>,
    inverse_predicates: FxHashSet<NamedNode>,
    annotated: Vec<AnnotatedSource>,
}

/// A schema triple expression carrying semantic actions, with the constraints cloned from it.
#[derive(Debug, Clone)]
pub struct AnnotatedSource {
    /// The schema node holding the semantic actions.
    pub source: TripleExpr,
    /// The SORBE constraint nodes reached through any clone of `source`.
    pub constraints: FxHashSet<ExprId>,
}

impl SorbeForm {
    fn new(expr: TripleExpr, annotated: Vec<AnnotatedSource>) -> Self {
        let mut constraints = Vec::new();
        collect_constraints(&expr, &mut constraints);
        let mut forward_predicates = FxHashSet::default();
        let mut inverse_predicates = FxHashSet::default();
        let mut constraint_index = FxHashMap::default();
        for (i, constraint) in constraints.iter().enumerate() {
            constraint_index.insert(constraint.id(), i);
            if let Some(tc) = constraint.as_constraint() {
                if tc.inverse {
                    inverse_predicates.insert(tc.predicate.clone());
                } else {
                    forward_predicates.insert(tc.predicate.clone());
                }
            }
        }
        Self {
            expr,
            constraints,
            constraint_index,
            forward_predicates,
            inverse_predicates,
            annotated,
        }
    }

    /// The form of a shape without triple expression, matching only the empty neighbourhood.
    pub fn empty() -> Self {
        Self::new(TripleExpr::empty(), Vec::new())
    }

    /// The normalized expression.
    #[inline]
    pub fn expr(&self) -> &TripleExpr {
        &self.expr
    }

    /// The triple constraint nodes, in tree order.
    #[inline]
    pub fn constraints(&self) -> &[TripleExpr] {
        &self.constraints
    }

    /// Looks up a triple constraint node of the form.
    pub fn constraint(&self, id: ExprId) -> Option<&TripleExpr> {
        self.constraints.get(*self.constraint_index.get(&id)?)
    }

    /// Predicates of the forward triple constraints.
    #[inline]
    pub fn forward_predicates(&self) -> &FxHashSet<NamedNode> {
        &self.forward_predicates
    }

    /// Predicates of the inverse triple constraints.
    #[inline]
    pub fn inverse_predicates(&self) -> &FxHashSet<NamedNode> {
        &self.inverse_predicates
    }

    /// Source nodes carrying semantic actions, innermost first.
    #[inline]
    pub fn annotated(&self) -> &[AnnotatedSource] {
        &self.annotated
    }
}

/// Normalizes a triple expression to SORBE form, resolving references against `schema`.
///
/// An expression already in SORBE form is kept as is, with the same identity.
/// The normalized expression is bounded by the default
/// [`max_expansion`](crate::ValidationLimits::max_expansion) limit.
pub fn normalize(
    expr: &TripleExpr,
    schema: &ShapesSchema,
) -> Result<SorbeForm, ShexValidationError> {
    normalize_with_limit(expr, schema, DEFAULT_MAX_EXPANSION)
}

/// Same as [`normalize`], failing with [`ValidationLimitError::ExpansionTooLarge`] once the
/// normalized expression would have more than `max_expansion` nodes.
pub fn normalize_with_limit(
    expr: &TripleExpr,
    schema: &ShapesSchema,
    max_expansion: usize,
) -> Result<SorbeForm, ShexValidationError> {
    if is_sorbe(expr) {
        let mut annotations = Annotations::default();
        annotate_in_place(expr, &mut annotations);
        return Ok(SorbeForm::new(expr.clone(), annotations.into_sources()));
    }
    let mut normalizer = Normalizer {
        schema,
        resolving: Vec::new(),
        annotations: Annotations::default(),
        remaining: max_expansion,
        limit: max_expansion,
    };
    let normalized = normalizer.normalize(expr)?;
    trace!(source = %expr.id(), normalized = %normalized.id(), "SORBE normalization");
    Ok(SorbeForm::new(
        normalized,
        normalizer.annotations.into_sources(),
    ))
}

/// Returns true if the expression is in SORBE form.
pub fn is_sorbe(expr: &TripleExpr) -> bool {
    fn check(expr: &TripleExpr, seen: &mut FxHashSet<ExprId>) -> bool {
        match expr.kind() {
            TripleExprKind::Constraint(_) => seen.insert(expr.id()),
            TripleExprKind::Empty => true,
            TripleExprKind::Ref(_) => false,
            TripleExprKind::EachOf(subs) | TripleExprKind::OneOf(subs) => {
                subs.iter().all(|sub| check(sub, seen))
            }
            TripleExprKind::Cardinality(sub, cardinality) => {
                if sub.as_constraint().is_some() {
                    return seen.insert(sub.id());
                }
                (cardinality.is_standard() || cardinality.is_empty())
                    && check(sub, seen)
                    && !(*cardinality == Cardinality::PLUS && matches_empty(sub))
            }
        }
    }
    check(expr, &mut FxHashSet::default())
}

/// Returns true if the empty bag of triples matches the expression.
///
/// References are considered not to match the empty bag: call this on normalized expressions.
pub fn matches_empty(expr: &TripleExpr) -> bool {
    match expr.kind() {
        TripleExprKind::Constraint(_) | TripleExprKind::Ref(_) => false,
        TripleExprKind::Empty => true,
        TripleExprKind::EachOf(subs) => subs.iter().all(matches_empty),
        TripleExprKind::OneOf(subs) => subs.iter().any(matches_empty),
        TripleExprKind::Cardinality(sub, cardinality) => {
            !cardinality.is_empty() && (cardinality.min() == 0 || matches_empty(sub))
        }
    }
}

fn collect_constraints(expr: &TripleExpr, out: &mut Vec<TripleExpr>) {
    match expr.kind() {
        TripleExprKind::Constraint(_) => out.push(expr.clone()),
        TripleExprKind::EachOf(subs) | TripleExprKind::OneOf(subs) => {
            for sub in subs {
                collect_constraints(sub, out);
            }
        }
        TripleExprKind::Cardinality(sub, _) => collect_constraints(sub, out),
        TripleExprKind::Ref(_) | TripleExprKind::Empty => {}
    }
}

#[derive(Default)]
struct Annotations {
    sources: Vec<AnnotatedSource>,
    index: FxHashMap<ExprId, usize>,
}

impl Annotations {
    /// Attributes the constraints of `normalized` to `source` if it has semantic actions.
    fn record(&mut self, source: &TripleExpr, normalized: &TripleExpr) {
        if source.sem_acts().is_empty() {
            return;
        }
        let mut constraints = Vec::new();
        collect_constraints(normalized, &mut constraints);
        let i = *self.index.entry(source.id()).or_insert_with(|| {
            self.sources.push(AnnotatedSource {
                source: source.clone(),
                constraints: FxHashSet::default(),
            });
            self.sources.len() - 1
        });
        self.sources[i]
            .constraints
            .extend(constraints.iter().map(TripleExpr::id));
    }

    fn into_sources(self) -> Vec<AnnotatedSource> {
        self.sources
    }
}

fn annotate_in_place(expr: &TripleExpr, annotations: &mut Annotations) {
    match expr.kind() {
        TripleExprKind::EachOf(subs) | TripleExprKind::OneOf(subs) => {
            for sub in subs {
                annotate_in_place(sub, annotations);
            }
        }
        TripleExprKind::Cardinality(sub, _) => annotate_in_place(sub, annotations),
        TripleExprKind::Constraint(_) | TripleExprKind::Ref(_) | TripleExprKind::Empty => {}
    }
    annotations.record(expr.source(), expr);
}

struct Normalizer<'a> {
    schema: &'a ShapesSchema,
    resolving: Vec<Label>,
    annotations: Annotations,
    /// Nodes that can still be built.
    remaining: usize,
    limit: usize,
}

impl Normalizer<'_> {
    /// Builds a fresh SORBE clone of `expr`. Each call returns new constraint nodes.
    fn normalize(&mut self, expr: &TripleExpr) -> Result<TripleExpr, ShexValidationError> {
        if !matches!(expr.kind(), TripleExprKind::Ref(_)) {
            self.reserve(1)?;
        }
        let normalized = match expr.kind() {
            TripleExprKind::Constraint(_) | TripleExprKind::Empty => {
                TripleExpr::derived(expr.kind().clone(), expr)
            }
            TripleExprKind::Ref(label) => self.resolve(label)?,
            TripleExprKind::EachOf(subs) => {
                TripleExpr::derived(TripleExprKind::EachOf(self.normalize_all(subs)?), expr)
            }
            TripleExprKind::OneOf(subs) => {
                TripleExpr::derived(TripleExprKind::OneOf(self.normalize_all(subs)?), expr)
            }
            TripleExprKind::Cardinality(sub, cardinality) => {
                self.normalize_cardinality(expr, sub, *cardinality)?
            }
        };
        self.annotations.record(expr.source(), &normalized);
        Ok(normalized)
    }

    fn reserve(&mut self, nodes: usize) -> Result<(), ShexValidationError> {
        self.remaining = self.remaining.checked_sub(nodes).ok_or(
            ValidationLimitError::ExpansionTooLarge { limit: self.limit },
        )?;
        Ok(())
    }

    fn normalize_all(&mut self, subs: &[TripleExpr]) -> Result<Vec<TripleExpr>, ShexValidationError> {
        subs.iter().map(|sub| self.normalize(sub)).collect()
    }

    fn resolve(&mut self, label: &Label) -> Result<TripleExpr, ShexValidationError> {
        if self.resolving.contains(label) {
            return Err(ShexValidationError::malformed_sorbe(format!(
                "triple expression {label} references itself"
            )));
        }
        let target = self
            .schema
            .get_triple_expr(label)
            .ok_or_else(|| ShexValidationError::dangling_reference(label.clone()))?;
        self.resolving.push(label.clone());
        let normalized = self.normalize(target);
        self.resolving.pop();
        normalized
    }

    fn normalize_cardinality(
        &mut self,
        expr: &TripleExpr,
        sub: &TripleExpr,
        cardinality: Cardinality,
    ) -> Result<TripleExpr, ShexValidationError> {
        let first = self.normalize(sub)?;
        if first.as_constraint().is_some() || cardinality.is_empty() || cardinality.is_standard()
        {
            let cardinality = if cardinality == Cardinality::PLUS && matches_empty(&first) {
                Cardinality::STAR
            } else {
                cardinality
            };
            return Ok(TripleExpr::derived(
                TripleExprKind::Cardinality(first, cardinality),
                expr,
            ));
        }
        if cardinality == Cardinality::ONE {
            return Ok(first);
        }

        // {m,n} is m plain clones then n-m optional ones, {m,} is m-1 plain clones then a `+`.
        let min = cardinality.min();
        let (plain, tail) = match cardinality.max() {
            Some(max) => (min, max - min),
            None => (min.saturating_sub(1), 1),
        };
        // Every further clone costs at least one node.
        let clones = usize::try_from(plain + tail).unwrap_or(usize::MAX);
        if clones.saturating_sub(1) > self.remaining {
            return Err(ValidationLimitError::ExpansionTooLarge { limit: self.limit }.into());
        }
        let mut pieces = Vec::new();
        let mut pending = Some(first);
        for i in 0..plain + tail {
            let clone = match pending.take() {
                Some(clone) => clone,
                None => self.normalize(sub)?,
            };
            if i < plain {
                pieces.push(clone);
                continue;
            }
            let wrapper = match cardinality.max() {
                Some(_) => Cardinality::OPTIONAL,
                None if matches_empty(&clone) => Cardinality::STAR,
                None => Cardinality::PLUS,
            };
            pieces.push(TripleExpr::derived(
                TripleExprKind::Cardinality(clone, wrapper),
                expr,
            ));
        }
        Ok(TripleExpr::derived(TripleExprKind::EachOf(pieces), expr))
    }
}

/// Concurrent memo table of SORBE forms, keyed by the identity of the normalized expression.
#[derive(Debug, Default)]
pub(crate) struct SorbeCache {
    forms: DashMap<ExprId, Arc<SorbeForm>>,
}

impl SorbeCache {
    pub(crate) fn get_or_normalize(
        &self,
        expr: &TripleExpr,
        schema: &ShapesSchema,
        max_expansion: usize,
    ) -> Result<Arc<SorbeForm>, ShexValidationError> {
        if let Some(form) = self.forms.get(&expr.id()) {
            return Ok(Arc::clone(form.value()));
        }
        let form = Arc::new(normalize_with_limit(expr, schema, max_expansion)?);
        Ok(Arc::clone(
            self.forms.entry(expr.id()).or_insert(form).value(),
        ))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.forms.len()
    }
}
