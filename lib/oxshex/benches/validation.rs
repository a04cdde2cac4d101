use codspeed_criterion_compat::{Criterion, Throughput, criterion_group, criterion_main};
use oxrdf::{Graph, Literal, NamedNode, Term, Triple};
use oxshex::{
    Cardinality, Label, NodeConstraint, NodeKind, Shape, ShapeExpr, ShapeSelector, ShapesSchema,
    ShexValidator, TripleConstraint, TripleExpr, ValueSetValue, analyze, normalize,
};

/// Benchmark schema analysis
/// Tests reference resolution, cycle and stratification checks on linear schemas
fn schema_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema analysis");

    for size in [10, 100, 1_000] {
        let schema = create_linked_schema(size);
        group.throughput(Throughput::Elements(size));
        group.bench_function(format!("analyze schema with {size} shapes"), |b| {
            b.iter(|| analyze(&schema).is_ok())
        });
    }

    group.finish();
}

/// Benchmark SORBE normalization of repeated groups
fn sorbe_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorbe normalization");
    let schema = ShapesSchema::new();

    for max in [2, 8, 32] {
        let expr = TripleExpr::each_of([
            TripleExpr::constraint(TripleConstraint::new(nn("a"))),
            TripleExpr::constraint(TripleConstraint::new(nn("b"))),
        ])
        .unwrap()
        .with_cardinality(Cardinality::new(1, Some(max)));
        group.bench_function(format!("normalize group repeated up to {max} times"), |b| {
            b.iter(|| normalize(&expr, &schema).unwrap())
        });
    }

    group.finish();
}

/// Benchmark recursive validation along a linked list
fn recursive_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("recursive validation");
    let validator = ShexValidator::new(create_list_schema()).unwrap();
    let selector = ShapeSelector::Label(label("List"));

    for length in [10, 50, 100] {
        let graph = create_list_graph(length);
        let head = Term::NamedNode(nn("n0"));
        group.throughput(Throughput::Elements(length));
        group.bench_function(format!("validate list of {length} cells"), |b| {
            b.iter(|| validator.validate(&graph, &head, &selector).unwrap())
        });
    }

    group.finish();
}

/// Benchmark validation of many nodes in one shape map
fn shape_map_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape map validation");
    let validator = ShexValidator::new(create_person_schema()).unwrap();

    for size in [10, 100, 1_000] {
        let graph = create_person_graph(size);
        let shape_map: Vec<_> = (0..size)
            .map(|i| {
                (
                    Term::NamedNode(nn(&format!("person{i}"))),
                    ShapeSelector::Label(label("Person")),
                )
            })
            .collect();
        group.throughput(Throughput::Elements(size));
        group.bench_function(format!("validate {size} persons"), |b| {
            b.iter(|| validator.validate_shape_map(&graph, &shape_map).unwrap())
        });
    }

    group.finish();
}

/// Benchmark assignment enumeration when one predicate feeds several constraints
fn ambiguous_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("ambiguous matching");

    for edges in [4, 6, 8] {
        let mut schema = ShapesSchema::new();
        let constraint = || {
            TripleExpr::constraint(TripleConstraint::new(nn("p")))
                .with_cardinality(Cardinality::STAR)
        };
        schema.add_shape(
            label("S"),
            ShapeExpr::shape(Shape::with_expression(
                TripleExpr::each_of([
                    constraint(),
                    constraint(),
                    TripleExpr::constraint(TripleConstraint::new(nn("p")))
                        .with_cardinality(Cardinality::exactly(edges + 1)),
                ])
                .unwrap(),
            )),
        );
        let validator = ShexValidator::new(schema).unwrap();
        let mut graph = Graph::new();
        for i in 0..edges {
            graph.insert(&Triple::new(nn("focus"), nn("p"), Literal::from(i)));
        }
        let focus = Term::NamedNode(nn("focus"));
        let selector = ShapeSelector::Label(label("S"));
        group.bench_function(format!("enumerate {edges} edges over 3 constraints"), |b| {
            b.iter(|| validator.validate(&graph, &focus, &selector).unwrap())
        });
    }

    group.finish();
}

fn nn(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{local}"))
}

fn label(local: &str) -> Label {
    Label::Iri(nn(local))
}

/// `Shape{i} = { ex:next @Shape{i+1} ? }` with the last shape empty
fn create_linked_schema(shape_count: u64) -> ShapesSchema {
    let mut schema = ShapesSchema::new();
    for i in 0..shape_count {
        let expr = if i + 1 < shape_count {
            ShapeExpr::shape(Shape::with_expression(
                TripleExpr::constraint(TripleConstraint::with_value_expr(
                    nn("next"),
                    ShapeExpr::reference(label(&format!("Shape{}", i + 1))),
                ))
                .with_cardinality(Cardinality::OPTIONAL),
            ))
        } else {
            ShapeExpr::shape(Shape::new())
        };
        schema.add_shape(label(&format!("Shape{i}")), expr);
    }
    schema
}

/// `List = { ex:value LITERAL ; ex:next @List ? }`
fn create_list_schema() -> ShapesSchema {
    let mut schema = ShapesSchema::new();
    schema.add_shape(
        label("List"),
        ShapeExpr::shape(Shape::with_expression(
            TripleExpr::each_of([
                TripleExpr::constraint(TripleConstraint::with_value_expr(
                    nn("value"),
                    ShapeExpr::node_constraint(NodeConstraint::with_node_kind(NodeKind::Literal)),
                )),
                TripleExpr::constraint(TripleConstraint::with_value_expr(
                    nn("next"),
                    ShapeExpr::reference(label("List")),
                ))
                .with_cardinality(Cardinality::OPTIONAL),
            ])
            .unwrap(),
        )),
    );
    schema
}

fn create_list_graph(length: u64) -> Graph {
    let mut graph = Graph::new();
    for i in 0..length {
        let cell = nn(&format!("n{i}"));
        graph.insert(&Triple::new(cell.clone(), nn("value"), Literal::from(i)));
        if i + 1 < length {
            graph.insert(&Triple::new(cell, nn("next"), nn(&format!("n{}", i + 1))));
        }
    }
    graph
}

/// `Person = CLOSED { ex:name xsd:string ; ex:status [ex:active ex:inactive] ; ex:knows @Person * }`
fn create_person_schema() -> ShapesSchema {
    let mut schema = ShapesSchema::new();
    schema.add_shape(
        label("Person"),
        ShapeExpr::shape(
            Shape::with_expression(
                TripleExpr::each_of([
                    TripleExpr::constraint(TripleConstraint::with_value_expr(
                        nn("name"),
                        ShapeExpr::node_constraint(NodeConstraint::with_datatype(
                            NamedNode::new_unchecked("http://www.w3.org/2001/XMLSchema#string"),
                        )),
                    )),
                    TripleExpr::constraint(TripleConstraint::with_value_expr(
                        nn("status"),
                        ShapeExpr::node_constraint(NodeConstraint::with_values([
                            ValueSetValue::ObjectValue(Term::NamedNode(nn("active"))),
                            ValueSetValue::ObjectValue(Term::NamedNode(nn("inactive"))),
                        ])),
                    )),
                    TripleExpr::constraint(TripleConstraint::with_value_expr(
                        nn("knows"),
                        ShapeExpr::reference(label("Person")),
                    ))
                    .with_cardinality(Cardinality::STAR),
                ])
                .unwrap(),
            )
            .with_closed(true),
        ),
    );
    schema
}

fn create_person_graph(size: u64) -> Graph {
    let mut graph = Graph::new();
    for i in 0..size {
        let person = nn(&format!("person{i}"));
        graph.insert(&Triple::new(
            person.clone(),
            nn("name"),
            Literal::new_simple_literal(format!("Person {i}")),
        ));
        graph.insert(&Triple::new(person.clone(), nn("status"), nn("active")));
        graph.insert(&Triple::new(
            person,
            nn("knows"),
            nn(&format!("person{}", i / 2)),
        ));
    }
    graph
}

criterion_group!(
    validation_benches,
    schema_analysis,
    sorbe_normalization,
    recursive_validation,
    shape_map_validation,
    ambiguous_matching
);

criterion_main!(validation_benches);
