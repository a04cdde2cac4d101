//! Read access to the data graph.

use oxrdf::{Graph, NamedNode, Term, Triple};
use rustc_hash::FxHashSet;

/// The graph queries a validation run needs.
///
/// Storage is out of the scope of this crate: implement this trait to validate data held
/// anywhere. It is implemented for [`oxrdf::Graph`].
pub trait GraphAccess {
    /// Triples whose subject is `node`.
    fn outgoing(&self, node: &Term) -> Vec<Triple>;

    /// Triples whose object is `node`.
    fn incoming(&self, node: &Term) -> Vec<Triple>;
}

impl<G: GraphAccess + ?Sized> GraphAccess for &G {
    fn outgoing(&self, node: &Term) -> Vec<Triple> {
        (*self).outgoing(node)
    }

    fn incoming(&self, node: &Term) -> Vec<Triple> {
        (*self).incoming(node)
    }
}

impl GraphAccess for Graph {
    fn outgoing(&self, node: &Term) -> Vec<Triple> {
        match node {
            Term::NamedNode(n) => self
                .triples_for_subject(n.as_ref())
                .map(|t| t.into_owned())
                .collect(),
            Term::BlankNode(b) => self
                .triples_for_subject(b.as_ref())
                .map(|t| t.into_owned())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn incoming(&self, node: &Term) -> Vec<Triple> {
        self.triples_for_object(node.as_ref())
            .map(|t| t.into_owned())
            .collect()
    }
}

/// A neighbourhood triple seen from the focus node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// The triple.
    pub triple: Triple,
    /// Whether the focus node is the object of the triple.
    pub inverse: bool,
}

impl Edge {
    /// The predicate of the triple.
    #[inline]
    pub fn predicate(&self) -> &NamedNode {
        &self.triple.predicate
    }

    /// The node at the other end of the triple.
    pub fn opposite(&self) -> Term {
        if self.inverse {
            Term::from(self.triple.subject.clone())
        } else {
            self.triple.object.clone()
        }
    }
}

/// The triples around a focus node that a shape looks at.
#[derive(Debug, Clone, Default)]
pub struct Neighbourhood {
    /// Every out-edge of the focus node.
    pub outgoing: Vec<Triple>,
    /// In-edges of the focus node whose predicate is an inverse predicate of the shape.
    pub incoming: Vec<Triple>,
}

impl Neighbourhood {
    /// Gathers the out-edges of `node` and its in-edges on the given predicates.
    pub fn collect(
        graph: &(impl GraphAccess + ?Sized),
        node: &Term,
        inverse_predicates: &FxHashSet<NamedNode>,
    ) -> Self {
        let incoming = if inverse_predicates.is_empty() {
            Vec::new()
        } else {
            graph
                .incoming(node)
                .into_iter()
                .filter(|t| inverse_predicates.contains(&t.predicate))
                .collect()
        };
        Self {
            outgoing: graph.outgoing(node),
            incoming,
        }
    }

    /// All triples as edges, out-edges first.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.outgoing
            .iter()
            .map(|triple| Edge {
                triple: triple.clone(),
                inverse: false,
            })
            .chain(self.incoming.iter().map(|triple| Edge {
                triple: triple.clone(),
                inverse: true,
            }))
    }

    /// The neighbourhood minus the given edges.
    #[must_use]
    pub fn without(&self, removed: &FxHashSet<Edge>) -> Self {
        let keep = |inverse: bool| {
            move |triple: &&Triple| {
                !removed.contains(&Edge {
                    triple: (*triple).clone(),
                    inverse,
                })
            }
        };
        Self {
            outgoing: self
                .outgoing
                .iter()
                .filter(keep(false))
                .cloned()
                .collect(),
            incoming: self.incoming.iter().filter(keep(true)).cloned().collect(),
        }
    }

    /// Returns true if there is no triple at all.
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}
