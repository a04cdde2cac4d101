//! State of one validation run.

use crate::error::ShexValidationError;
use crate::graph::{Edge, GraphAccess, Neighbourhood};
use crate::limits::LimitTracker;
use crate::matcher::{MatchOracle, Verdict};
use crate::model::{Label, SemAct, ShapeExpr};
use crate::node_constraint::RegexCache;
use crate::result::{Diagnostic, DiagnosticKind, ShapeResult, ValidationStatus};
use crate::validator::{ShapeSelector, ShexValidator};
use oxrdf::{NamedNode, Term, Triple};
use rustc_hash::FxHashSet;
use std::mem;
use tracing::trace;

/// Validation context for tracking state during validation.
pub(crate) struct ValidationContext<'a> {
    /// The validator: schema, memo tables, semantic actions and limits.
    pub validator: &'a ShexValidator,
    /// The data graph being validated.
    pub graph: &'a dyn GraphAccess,
    /// (node, shape label) pairs currently being validated.
    pub stack: FxHashSet<(Term, Label)>,
    /// Innermost shape label being evaluated.
    pub label: Option<Label>,
    /// Diagnostics of the current scope.
    pub diagnostics: Vec<Diagnostic>,
    /// Triples hidden from the neighbourhood of a node.
    pub hidden: Vec<(Term, FxHashSet<Edge>)>,
    pub tracker: LimitTracker,
    pub regexes: RegexCache,
}

impl<'a> ValidationContext<'a> {
    pub fn new(validator: &'a ShexValidator, graph: &'a dyn GraphAccess) -> Self {
        let limits = validator.limits().clone();
        Self {
            validator,
            graph,
            stack: FxHashSet::default(),
            label: None,
            diagnostics: Vec::new(),
            hidden: Vec::new(),
            regexes: RegexCache::new(limits.max_regex_length),
            tracker: LimitTracker::new(limits),
        }
    }

    /// Runs the start semantic actions of the schema.
    pub fn run_start_acts(&mut self) -> Result<bool, ShexValidationError> {
        let acts = self.validator.schema().start_acts();
        if acts.is_empty() {
            return Ok(true);
        }
        self.validator.semantic_actions().run(acts, &[])
    }

    /// Validates one shape map entry.
    pub fn check(
        &mut self,
        node: &Term,
        selector: &ShapeSelector,
        started: bool,
    ) -> Result<ShapeResult, ShexValidationError> {
        self.diagnostics.clear();
        let conforms = if started {
            match selector {
                ShapeSelector::Label(label) => self.satisfies_label(node, label)?,
                ShapeSelector::Start => {
                    let start = self
                        .validator
                        .schema()
                        .start()
                        .ok_or(ShexValidationError::MissingStart)?;
                    self.label = None;
                    self.satisfies(node, start)?
                }
            }
        } else {
            self.report(
                node,
                DiagnosticKind::SemanticAction,
                "A start semantic action rejected the validation",
            );
            false
        };
        let diagnostics = mem::take(&mut self.diagnostics);
        Ok(ShapeResult {
            node: node.clone(),
            shape: selector.clone(),
            status: if conforms {
                ValidationStatus::Conformant
            } else {
                ValidationStatus::NonConformant
            },
            diagnostics: if conforms { Vec::new() } else { diagnostics },
        })
    }

    /// Runs `f` with an empty diagnostics accumulator and returns the diagnostics it produced.
    pub fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ShexValidationError>,
    ) -> Result<(T, Vec<Diagnostic>), ShexValidationError> {
        let outer = mem::take(&mut self.diagnostics);
        let result = f(self);
        let inner = mem::replace(&mut self.diagnostics, outer);
        Ok((result?, inner))
    }

    /// Appends diagnostics to the current scope.
    pub fn promote(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Builds a diagnostic on `node` for the current shape.
    pub fn diagnostic(
        &self,
        node: &Term,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic::new(node.clone(), self.label.clone(), kind, message)
    }

    /// Records a diagnostic on `node` for the current shape.
    pub fn report(&mut self, node: &Term, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = self.diagnostic(node, kind, message);
        self.diagnostics.push(diagnostic);
    }

    /// Marks `(node, label)` as being validated. Returns false if it already is.
    pub fn enter(&mut self, node: &Term, label: &Label) -> bool {
        self.stack.insert((node.clone(), label.clone()))
    }

    pub fn leave(&mut self, node: &Term, label: &Label) {
        self.stack.remove(&(node.clone(), label.clone()));
    }

    /// Sets the current shape label, returning the previous one.
    pub fn set_label(&mut self, label: Option<Label>) -> Option<Label> {
        mem::replace(&mut self.label, label)
    }

    /// The neighbourhood of `node`: all out-edges, in-edges on the given predicates, minus the
    /// hidden triples.
    pub fn neighbourhood(
        &self,
        node: &Term,
        inverse_predicates: &FxHashSet<NamedNode>,
    ) -> Neighbourhood {
        let mut neighbourhood = Neighbourhood::collect(self.graph, node, inverse_predicates);
        for (hidden_node, edges) in &self.hidden {
            if hidden_node == node {
                neighbourhood = neighbourhood.without(edges);
            }
        }
        neighbourhood
    }

    /// Runs `f` with the given triples of `node` hidden from its neighbourhood.
    ///
    /// Value expressions checked while matching triple constraints see the whole graph again.
    pub fn hiding<T>(
        &mut self,
        node: &Term,
        edges: FxHashSet<Edge>,
        f: impl FnOnce(&mut Self) -> Result<T, ShexValidationError>,
    ) -> Result<T, ShexValidationError> {
        self.hidden.push((node.clone(), edges));
        let result = f(self);
        self.hidden.pop();
        result
    }
}

impl MatchOracle for ValidationContext<'_> {
    fn value_conforms(
        &mut self,
        value: &Term,
        expr: &ShapeExpr,
    ) -> Result<Verdict, ShexValidationError> {
        let hidden = mem::take(&mut self.hidden);
        let result = self.scoped(|context| context.satisfies(value, expr));
        self.hidden = hidden;
        let (conforms, diagnostics) = result?;
        trace!(%value, conforms, "value expression");
        Ok(if conforms {
            Verdict::conforming()
        } else {
            Verdict::failing(diagnostics)
        })
    }

    fn run_sem_acts(
        &mut self,
        acts: &[SemAct],
        triples: &[Triple],
    ) -> Result<bool, ShexValidationError> {
        self.validator.semantic_actions().run(acts, triples)
    }

    fn note_assignment(&mut self) -> Result<(), ShexValidationError> {
        self.tracker.record_assignment()?;
        self.tracker.check_timeout()?;
        Ok(())
    }
}
