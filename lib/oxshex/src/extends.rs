//! Evaluation plans of shape declarations using `EXTENDS`.
//!
//! A declaration with parents is evaluated by matching the triple expressions of the main
//! shapes of itself and all its ancestors as a single expression. Each ancestor's remaining
//! conjuncts are then checked against the triples that were not claimed by the others.

use crate::error::ShexValidationError;
use crate::hierarchy::TypeHierarchy;
use crate::model::{ExprId, Label, ShapeExpr, ShapesSchema, TripleExpr, TripleExprKind};
use crate::sorbe::{SorbeCache, SorbeForm};
use oxrdf::NamedNode;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// One declaration taking part in the evaluation of an extending shape.
#[derive(Debug, Clone)]
pub(crate) struct AncestorPart {
    pub label: Label,
    /// The main shape node of the declaration.
    pub main: ShapeExpr,
    /// The other conjuncts of the declaration.
    pub constraints: Vec<ShapeExpr>,
}

#[derive(Debug)]
pub(crate) struct ExtendsPlan {
    parts: Vec<AncestorPart>,
    form: Arc<SorbeForm>,
    closed: bool,
    extra: FxHashSet<NamedNode>,
    owners: FxHashMap<ExprId, usize>,
}

impl ExtendsPlan {
    /// Builds the plan of `label`, the declaration itself being the first part.
    pub fn build(
        label: &Label,
        schema: &ShapesSchema,
        hierarchy: &TypeHierarchy,
        sorbe: &SorbeCache,
        max_expansion: usize,
    ) -> Result<Self, ShexValidationError> {
        let mut parts = Vec::new();
        let mut expressions = Vec::new();
        let mut owners = FxHashMap::default();
        let mut extra = FxHashSet::default();
        let mut closed = false;
        for (i, ancestor) in hierarchy.ancestors(label).into_iter().enumerate() {
            let decl = schema
                .get_shape(&ancestor)
                .ok_or_else(|| ShexValidationError::dangling_reference(ancestor.clone()))?;
            let form = decl.expr().extendable_form().ok_or_else(|| {
                ShexValidationError::internal(format!(
                    "{ancestor} is extended but is not a shape or a conjunction starting with one"
                ))
            })?;
            if i == 0 {
                closed = form.shape.closed;
            }
            extra.extend(form.shape.extra.iter().cloned());
            if let Some(expression) = &form.shape.expression {
                claim_constraints(expression, i, schema, &mut owners, &mut Vec::new());
                expressions.push(expression.clone());
            }
            parts.push(AncestorPart {
                label: ancestor,
                main: form.main.clone(),
                constraints: form.constraints.to_vec(),
            });
        }

        let form = if expressions.len() > 1 {
            let joined = TripleExpr::each_of(expressions)
                .map_err(|e| ShexValidationError::internal(e.to_string()))?;
            sorbe.get_or_normalize(&joined, schema, max_expansion)?
        } else if let Some(expression) = expressions.pop() {
            sorbe.get_or_normalize(&expression, schema, max_expansion)?
        } else {
            Arc::new(SorbeForm::empty())
        };
        Ok(Self {
            parts,
            form,
            closed,
            extra,
            owners,
        })
    }

    /// The declaration and its ancestors, breadth-first.
    pub fn parts(&self) -> &[AncestorPart] {
        &self.parts
    }

    /// The SORBE form of the joined main shapes.
    pub fn form(&self) -> &Arc<SorbeForm> {
        &self.form
    }

    /// Whether the declaration's own main shape is closed.
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// `EXTRA` predicates of every part.
    pub fn extra(&self) -> &FxHashSet<NamedNode> {
        &self.extra
    }

    /// The index of the part a SORBE constraint of [`Self::form`] comes from.
    pub fn owner_of(&self, constraint: &TripleExpr) -> Option<usize> {
        self.owners.get(&constraint.source().id()).copied()
    }
}

/// Records `owner` for every schema triple constraint reachable from `expr`.
///
/// A constraint reachable from several parts, through a shared labelled triple expression,
/// stays with the first one.
fn claim_constraints(
    expr: &TripleExpr,
    owner: usize,
    schema: &ShapesSchema,
    owners: &mut FxHashMap<ExprId, usize>,
    resolving: &mut Vec<Label>,
) {
    match expr.kind() {
        TripleExprKind::Constraint(_) => {
            owners.entry(expr.id()).or_insert(owner);
        }
        TripleExprKind::EachOf(subs) | TripleExprKind::OneOf(subs) => {
            for sub in subs {
                claim_constraints(sub, owner, schema, owners, resolving);
            }
        }
        TripleExprKind::Cardinality(sub, _) => {
            claim_constraints(sub, owner, schema, owners, resolving);
        }
        TripleExprKind::Ref(label) => {
            if resolving.contains(label) {
                return;
            }
            if let Some(target) = schema.get_triple_expr(label) {
                resolving.push(label.clone());
                claim_constraints(target, owner, schema, owners, resolving);
                resolving.pop();
            }
        }
        TripleExprKind::Empty => {}
    }
}
