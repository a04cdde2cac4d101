//! Assignment of neighbourhood triples to the triple constraints of a SORBE form.
//!
//! Every candidate triple is paired with the constraints it could satisfy. The total
//! assignments are then enumerated lazily, in a fixed order, and the first one whose bag of
//! constraint occurrences fits the SORBE expression (and is accepted by the semantic actions)
//! wins.

use crate::cardinality::Cardinality;
use crate::error::ShexValidationError;
use crate::graph::Edge;
use crate::model::{ExprId, SemAct, ShapeExpr, TripleExpr, TripleExprKind};
use crate::result::Diagnostic;
use crate::sorbe::SorbeForm;
use oxrdf::{NamedNode, Term, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

/// Whether a value conforms to a value expression, with the reasons when it does not.
#[derive(Debug, Clone, Default)]
pub(crate) struct Verdict {
    pub conforms: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl Verdict {
    pub fn conforming() -> Self {
        Self {
            conforms: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn failing(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            conforms: false,
            diagnostics,
        }
    }
}

/// The services the matcher needs from the evaluator.
pub(crate) trait MatchOracle {
    /// Evaluates a triple constraint value expression on the node at the other end of a triple.
    fn value_conforms(
        &mut self,
        value: &Term,
        expr: &ShapeExpr,
    ) -> Result<Verdict, ShexValidationError>;

    /// Runs semantic actions with the triples they are attached to.
    fn run_sem_acts(
        &mut self,
        acts: &[SemAct],
        triples: &[Triple],
    ) -> Result<bool, ShexValidationError>;

    /// Called once per enumerated assignment.
    fn note_assignment(&mut self) -> Result<(), ShexValidationError>;
}

/// An accepted assignment.
#[derive(Debug, Clone, Default)]
pub(crate) struct Assignment {
    /// Each matched edge with the SORBE constraint it is assigned to.
    pub matched: Vec<(Edge, ExprId)>,
    /// Edges left unmatched because their predicate is `EXTRA`.
    pub extras: Vec<Edge>,
}

impl Assignment {
    pub fn triples(&self) -> Vec<Triple> {
        self.matched
            .iter()
            .map(|(edge, _)| edge.triple.clone())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum MatchFailure {
    /// An edge whose predicate has triple constraints but none of them accepts it.
    Unmatched {
        edge: Edge,
        /// Why the value expressions rejected the other end of the edge.
        diagnostics: Vec<Diagnostic>,
    },
    /// Every assignment was enumerated and none was accepted.
    NoAssignment { tried: usize },
}

#[derive(Debug, Clone)]
pub(crate) enum MatchResult {
    Matched(Assignment),
    Failed(Vec<MatchFailure>),
}

/// Finds an assignment of `edges` to the constraints of `form`.
///
/// Edges whose predicate and direction match no constraint are ignored. Edges whose predicate is
/// in `extra` may stay unmatched.
pub(crate) fn find_assignment(
    edges: impl IntoIterator<Item = Edge>,
    form: &SorbeForm,
    extra: &FxHashSet<NamedNode>,
    oracle: &mut impl MatchOracle,
) -> Result<MatchResult, ShexValidationError> {
    let mut by_predicate: FxHashMap<(&NamedNode, bool), Vec<&TripleExpr>> = FxHashMap::default();
    for constraint in form.constraints() {
        if let Some(tc) = constraint.as_constraint() {
            by_predicate
                .entry((&tc.predicate, tc.inverse))
                .or_default()
                .push(constraint);
        }
    }

    let mut verdicts: FxHashMap<(Term, ExprId), Verdict> = FxHashMap::default();
    let mut candidates = Vec::new();
    let mut choices: Vec<Vec<Option<ExprId>>> = Vec::new();
    let mut extras = Vec::new();
    let mut failures = Vec::new();
    for edge in edges {
        let Some(constraints) = by_predicate.get(&(edge.predicate(), edge.inverse)) else {
            continue;
        };
        let opposite = edge.opposite();
        let mut possible = Vec::new();
        let mut rejections = Vec::new();
        for constraint in constraints {
            let Some(tc) = constraint.as_constraint() else {
                continue;
            };
            let Some(value_expr) = &tc.value_expr else {
                possible.push(Some(constraint.id()));
                continue;
            };
            let key = (opposite.clone(), value_expr.id());
            let verdict = match verdicts.get(&key) {
                Some(verdict) => verdict.clone(),
                None => {
                    let verdict = oracle.value_conforms(&opposite, value_expr)?;
                    verdicts.insert(key, verdict.clone());
                    verdict
                }
            };
            if verdict.conforms {
                possible.push(Some(constraint.id()));
            } else {
                for diagnostic in verdict.diagnostics {
                    if !rejections.contains(&diagnostic) {
                        rejections.push(diagnostic);
                    }
                }
            }
        }
        let is_extra = extra.contains(edge.predicate());
        if possible.is_empty() {
            if is_extra {
                extras.push(edge);
            } else {
                failures.push(MatchFailure::Unmatched {
                    edge,
                    diagnostics: rejections,
                });
            }
            continue;
        }
        if is_extra {
            possible.push(None);
        }
        candidates.push(edge);
        choices.push(possible);
    }
    if !failures.is_empty() {
        debug!(unmatched = failures.len(), "neighbourhood triples fit no constraint");
        return Ok(MatchResult::Failed(failures));
    }

    let mut odometer = Odometer::new(choices.iter().map(Vec::len).collect());
    let mut tried = 0;
    loop {
        oracle.note_assignment()?;
        tried += 1;
        let mut bag: FxHashMap<ExprId, u32> = FxHashMap::default();
        for (digit, options) in odometer.digits().iter().zip(&choices) {
            if let Some(id) = options[*digit] {
                *bag.entry(id).or_default() += 1;
            }
        }
        let fit = interval(form.expr(), &bag)?;
        trace!(assignment = tried, interval = %fit, "evaluated assignment");
        if fit.contains(1) {
            let mut assignment = Assignment {
                matched: Vec::new(),
                extras: extras.clone(),
            };
            for ((digit, options), edge) in odometer.digits().iter().zip(&choices).zip(&candidates)
            {
                match options[*digit] {
                    Some(id) => assignment.matched.push((edge.clone(), id)),
                    None => assignment.extras.push(edge.clone()),
                }
            }
            if run_sem_acts(form, &assignment, oracle)? {
                debug!(tried, "assignment accepted");
                return Ok(MatchResult::Matched(assignment));
            }
            trace!(assignment = tried, "assignment rejected by a semantic action");
        }
        if !odometer.advance() {
            break;
        }
    }
    debug!(tried, "no assignment accepted");
    Ok(MatchResult::Failed(vec![MatchFailure::NoAssignment { tried }]))
}

fn run_sem_acts(
    form: &SorbeForm,
    assignment: &Assignment,
    oracle: &mut impl MatchOracle,
) -> Result<bool, ShexValidationError> {
    for annotated in form.annotated() {
        let triples: Vec<Triple> = assignment
            .matched
            .iter()
            .filter(|(_, id)| annotated.constraints.contains(id))
            .map(|(edge, _)| edge.triple.clone())
            .collect();
        if !oracle.run_sem_acts(annotated.source.sem_acts(), &triples)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Mixed-radix counter over the choices of each candidate triple.
///
/// The last digit moves fastest. A counter with no digit has exactly one state.
#[derive(Debug)]
struct Odometer {
    digits: Vec<usize>,
    radices: Vec<usize>,
}

impl Odometer {
    fn new(radices: Vec<usize>) -> Self {
        Self {
            digits: vec![0; radices.len()],
            radices,
        }
    }

    fn digits(&self) -> &[usize] {
        &self.digits
    }

    /// Moves to the next state, returning false once every state has been visited.
    fn advance(&mut self) -> bool {
        for (digit, radix) in self.digits.iter_mut().zip(&self.radices).rev() {
            *digit += 1;
            if *digit < *radix {
                return true;
            }
            *digit = 0;
        }
        false
    }
}

/// The interval of repetitions of `expr` that the bag can be split into.
fn interval(
    expr: &TripleExpr,
    bag: &FxHashMap<ExprId, u32>,
) -> Result<Cardinality, ShexValidationError> {
    let count = |id: ExprId| bag.get(&id).copied().unwrap_or(0);
    Ok(match expr.kind() {
        TripleExprKind::Constraint(_) => Cardinality::exactly(count(expr.id())),
        TripleExprKind::Empty => Cardinality::STAR,
        TripleExprKind::EachOf(subs) => {
            let mut result = Cardinality::STAR;
            for sub in subs {
                result = result.intersect(interval(sub, bag)?);
            }
            result
        }
        TripleExprKind::OneOf(subs) => {
            let mut result = Cardinality::ZERO;
            for sub in subs {
                result = result + interval(sub, bag)?;
            }
            result
        }
        TripleExprKind::Cardinality(sub, cardinality) => {
            if sub.as_constraint().is_some() {
                return Ok(Cardinality::div(count(sub.id()), *cardinality));
            }
            if cardinality.is_empty() {
                return Ok(Cardinality::EMPTY);
            }
            let empty_bag = is_empty_bag(sub, bag);
            match *cardinality {
                Cardinality::ZERO => {
                    if empty_bag {
                        Cardinality::STAR
                    } else {
                        Cardinality::EMPTY
                    }
                }
                Cardinality::STAR => {
                    if empty_bag {
                        Cardinality::STAR
                    } else if interval(sub, bag)?.is_empty() {
                        Cardinality::EMPTY
                    } else {
                        Cardinality::PLUS
                    }
                }
                Cardinality::PLUS => {
                    if empty_bag {
                        Cardinality::ZERO
                    } else {
                        let inner = interval(sub, bag)?;
                        if inner.is_empty() {
                            Cardinality::EMPTY
                        } else {
                            Cardinality::new(1, inner.max())
                        }
                    }
                }
                Cardinality::OPTIONAL => {
                    if empty_bag {
                        Cardinality::STAR
                    } else {
                        let inner = interval(sub, bag)?;
                        if inner.is_empty() {
                            Cardinality::EMPTY
                        } else {
                            Cardinality::at_least(inner.min().max(1))
                        }
                    }
                }
                other => {
                    return Err(ShexValidationError::malformed_sorbe(format!(
                        "cardinality {other} over a group in {}",
                        expr.id()
                    )));
                }
            }
        }
        TripleExprKind::Ref(label) => {
            return Err(ShexValidationError::malformed_sorbe(format!(
                "unresolved reference to {label}"
            )));
        }
    })
}

/// Returns true if no constraint under `expr` occurs in the bag.
fn is_empty_bag(expr: &TripleExpr, bag: &FxHashMap<ExprId, u32>) -> bool {
    match expr.kind() {
        TripleExprKind::Constraint(_) => bag.get(&expr.id()).is_none_or(|c| *c == 0),
        TripleExprKind::EachOf(subs) | TripleExprKind::OneOf(subs) => {
            subs.iter().all(|sub| is_empty_bag(sub, bag))
        }
        TripleExprKind::Cardinality(sub, _) => is_empty_bag(sub, bag),
        TripleExprKind::Ref(_) | TripleExprKind::Empty => true,
    }
}
