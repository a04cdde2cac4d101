//! The `EXTENDS` type hierarchy of a schema.

use crate::model::{Label, ShapesSchema};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Parent/child relations between shape declarations, with their closures.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    parents: FxHashMap<Label, Vec<Label>>,
    ancestors: FxHashMap<Label, Vec<Label>>,
    descendants: FxHashMap<Label, Vec<Label>>,
}

impl TypeHierarchy {
    /// Builds the hierarchy from the `extends` lists of the declarations' main shapes.
    pub fn new(schema: &ShapesSchema) -> Self {
        let mut parents = FxHashMap::default();
        for decl in schema.shapes() {
            if let Some(form) = decl.expr().extendable_form() {
                if !form.shape.extends.is_empty() {
                    parents.insert(decl.label().clone(), form.shape.extends.clone());
                }
            }
        }
        let mut hierarchy = Self {
            parents,
            ancestors: FxHashMap::default(),
            descendants: FxHashMap::default(),
        };
        let with_parents: Vec<Label> = schema
            .labels()
            .filter(|label| hierarchy.parents.contains_key(*label))
            .cloned()
            .collect();
        for label in with_parents {
            let ancestors = hierarchy.compute_ancestors(&label);
            // Descendant lists are filled in schema order since `label` walks that order.
            for ancestor in ancestors.iter().skip(1) {
                hierarchy
                    .descendants
                    .entry(ancestor.clone())
                    .or_default()
                    .push(label.clone());
            }
            hierarchy.ancestors.insert(label, ancestors);
        }
        hierarchy
    }

    /// Self first, then parents breadth-first, without repetition.
    fn compute_ancestors(&self, label: &Label) -> Vec<Label> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([label.clone()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(&current) {
                queue.extend(parents.iter().cloned());
            }
            order.push(current);
        }
        order
    }

    /// The labels `label` directly extends.
    pub fn parents(&self, label: &Label) -> &[Label] {
        self.parents.get(label).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `label` extends something.
    pub fn has_parents(&self, label: &Label) -> bool {
        self.parents.contains_key(label)
    }

    /// `label` followed by its ancestors, breadth-first.
    pub fn ancestors(&self, label: &Label) -> Vec<Label> {
        self.ancestors
            .get(label)
            .cloned()
            .unwrap_or_else(|| vec![label.clone()])
    }

    /// The labels that transitively extend `label`, in schema order.
    pub fn descendants(&self, label: &Label) -> &[Label] {
        self.descendants.get(label).map_or(&[], Vec::as_slice)
    }

    /// Every `(child, parent)` edge.
    pub fn edges(&self) -> impl Iterator<Item = (&Label, &Label)> {
        self.parents
            .iter()
            .flat_map(|(child, parents)| parents.iter().map(move |parent| (child, parent)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Shape, ShapeExpr};
    use oxrdf::NamedNode;

    fn label(name: &str) -> Label {
        Label::Iri(NamedNode::new_unchecked(format!("http://example.org/{name}")))
    }

    fn extending(parents: &[&str]) -> ShapeExpr {
        ShapeExpr::shape(Shape::new().with_extends(parents.iter().map(|p| label(p))))
    }

    #[test]
    fn test_ancestors_breadth_first() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(label("Root"), extending(&[]));
        schema.add_shape(label("A"), extending(&["Root"]));
        schema.add_shape(label("B"), extending(&["Root"]));
        schema.add_shape(label("C"), extending(&["A", "B"]));
        let hierarchy = TypeHierarchy::new(&schema);

        assert_eq!(
            hierarchy.ancestors(&label("C")),
            [label("C"), label("A"), label("B"), label("Root")]
        );
        assert_eq!(hierarchy.ancestors(&label("Root")), [label("Root")]);
        assert_eq!(hierarchy.parents(&label("C")), [label("A"), label("B")]);
    }

    #[test]
    fn test_descendants_in_schema_order() {
        let mut schema = ShapesSchema::new();
        schema.add_shape(label("Root"), extending(&[]));
        schema.add_shape(label("B"), extending(&["Root"]));
        schema.add_shape(label("A"), extending(&["Root"]));
        schema.add_shape(label("C"), extending(&["A"]));
        let hierarchy = TypeHierarchy::new(&schema);

        assert_eq!(
            hierarchy.descendants(&label("Root")),
            [label("B"), label("A"), label("C")]
        );
        assert_eq!(hierarchy.descendants(&label("A")), [label("C")]);
        assert!(hierarchy.descendants(&label("C")).is_empty());
        assert_eq!(hierarchy.edges().count(), 3);
    }
}
