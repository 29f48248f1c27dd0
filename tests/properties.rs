// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

/// Quantified invariants from spec.md §8, exercised with `quickcheck` the
/// same way the teacher's `tests/quickcheck.rs` exercises CRDT-tree
/// invariants: a small `Arbitrary` generator feeds a handful of
/// hand-picked fixture structures, not unbounded random graph search
/// (reconstruction soundness search is exponential; original_source's own
/// test suite takes the same practical restriction).
use std::collections::HashMap;
use std::collections::HashSet;

use quickcheck::{Arbitrary, Gen, TestResult};
use rand::rngs::StdRng;
use rand::SeedableRng;

use rooted_triplet_distance::graph::distance::{
    average_signed_distance, mu_distance, robinson_foulds, tripartition_distance, triplet_distance,
};
use rooted_triplet_distance::graph::TreeDict;
use rooted_triplet_distance::{GeneralTree, Graph, LevelOneNetwork, Triplet, TripletShape};

fn leaf() -> TreeDict<String> {
    TreeDict::leaf()
}

fn node(children: Vec<(&str, TreeDict<String>)>) -> TreeDict<String> {
    TreeDict(children.into_iter().map(|(l, s)| (l.to_string(), s)).collect())
}

fn tree(root: &str, children: Vec<(&str, TreeDict<String>)>) -> TreeDict<String> {
    let mut m = HashMap::new();
    m.insert(root.to_string(), node(children));
    TreeDict(m)
}

/// A fixed pool of small fixture graphs, covering a plain multifurcation,
/// a general tree with an internal label, and a level-1 network. Property
/// tests index into this pool with an `Arbitrary`-derived selector instead
/// of generating arbitrary graphs from scratch.
fn fixtures() -> Vec<Graph<String>> {
    vec![
        Graph::from_tree_dict(&tree("R", vec![("A", leaf()), ("B", leaf()), ("C", leaf())])).unwrap(),
        Graph::from_tree_dict(&tree(
            "A",
            vec![
                ("B", node(vec![("C", leaf()), ("D", leaf())])),
                ("*0", node(vec![("E", leaf()), ("F", leaf())])),
            ],
        ))
        .unwrap(),
        Graph::from_tree_dict(&tree(
            "p",
            vec![
                (
                    "1",
                    node(vec![
                        ("a", leaf()),
                        ("2", node(vec![("b", node(vec![("e", leaf())])), ("d", leaf())])),
                    ]),
                ),
                (
                    "3",
                    node(vec![
                        ("f", leaf()),
                        ("4", node(vec![("g", node(vec![("h", leaf())])), ("d", node(vec![("c", leaf())]))])),
                    ]),
                ),
            ],
        ))
        .unwrap(),
    ]
}

#[derive(Debug, Clone, Copy)]
struct ShapeChoice(u8);

impl Arbitrary for ShapeChoice {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        ShapeChoice(u8::arbitrary(g) % 8)
    }
}

fn shape_string(choice: u8, a: &str, b: &str, c: &str) -> (String, TripletShape) {
    match choice {
        0 => (format!("{}|{}|{}", a, b, c), TripletShape::Fanned),
        1 => (format!("{},{}|{}", a, b, c), TripletShape::ResolvedPairLeft),
        2 => (format!("{}|{},{}", a, b, c), TripletShape::ResolvedPairRight),
        3 => (format!("{}/{}|{}", a, b, c), TripletShape::DownResolved),
        4 => (format!(r"{}|{}\{}", a, b, c), TripletShape::UpResolved),
        5 => (format!(r"{}/{}\{}", a, b, c), TripletShape::VTriplet),
        6 => (format!("{}/{}/{}", a, b, c), TripletShape::PathDown),
        _ => (format!(r"{}\{}\{}", a, b, c), TripletShape::PathUp),
    }
}

/// Property 1: parser round-trip. For every shape and label triple, the
/// parsed triplet reports the expected shape and re-stringifies to the
/// exact input (no commutative reordering is needed since inputs are
/// already in canonical left-to-right order).
#[quickcheck_macros::quickcheck]
fn prop_parser_round_trip(choice: ShapeChoice) -> TestResult {
    let labels = ["Alpha", "Beta", "Gamma"];
    let (s, expected_shape) = shape_string(choice.0, labels[0], labels[1], labels[2]);
    let t = match Triplet::parse(&s) {
        Ok(t) => t,
        Err(_) => return TestResult::failed(),
    };
    TestResult::from_bool(t.shape() == expected_shape && t.to_string() == s)
}

/// Property 2: triplet enumeration totality. For a genuine tree (not a
/// network — see spec §3/C2: a network's induced set is a *union* over
/// spanning trees and may carry more than one shape per label triple),
/// every unordered label triple induces exactly one triplet: enumeration
/// never drops or duplicates a combination.
#[quickcheck_macros::quickcheck]
fn prop_enumeration_is_total(fixture_idx: usize) -> TestResult {
    let fixtures = fixtures();
    let tree_fixtures: Vec<&Graph<String>> = fixtures.iter().filter(|g| g.is_tree()).collect();
    let g = tree_fixtures[fixture_idx % tree_fixtures.len()];
    let labels: Vec<String> = g.labels().into_iter().collect();
    if labels.len() < 3 {
        return TestResult::discard();
    }
    let triplets = g.triplets();
    let n = labels.len();
    let expected_combinations = n * (n - 1) * (n - 2) / 6;
    TestResult::from_bool(triplets.len() == expected_combinations)
}

/// Property 3/4: reconstruction soundness, full and partial input. A
/// random subset of a fixture's induced triplets, reconstructed back
/// through the matching engine, must still induce every triplet in that
/// subset (full input additionally round-trips to an isomorphic graph;
/// checked directly in `tests/scenarios.rs` S3/S4).
#[quickcheck_macros::quickcheck]
fn prop_partial_input_containment(fixture_idx: usize, subset_mask: u32, seed: u64) -> TestResult {
    let fixtures = fixtures();
    let g = &fixtures[fixture_idx % fixtures.len()];
    let all: Vec<Triplet<String>> = g.triplets().into_iter().collect();
    if all.is_empty() {
        return TestResult::discard();
    }
    let subset: HashSet<Triplet<String>> = all
        .iter()
        .enumerate()
        .filter(|(i, _)| subset_mask & (1 << (i % 32)) != 0)
        .map(|(_, t)| t.clone())
        .collect();
    if subset.is_empty() {
        return TestResult::discard();
    }
    let labels = g.labels();
    let mut rng = StdRng::seed_from_u64(seed);
    let reconstructed = if g.is_tree() {
        match GeneralTree::reconstruct(&subset, &labels, &mut rng, None) {
            Ok(t) => t.triplets(),
            Err(_) => return TestResult::discard(),
        }
    } else {
        match LevelOneNetwork::reconstruct(&subset, &labels, &mut rng, None) {
            Ok(t) => t.triplets(),
            Err(_) => return TestResult::discard(),
        }
    };
    TestResult::from_bool(reconstructed.is_superset(&subset))
}

/// Property 5: distance axioms — reflexivity, symmetry, and (for the
/// normalized metrics) a [0, 1] range, checked pairwise across the
/// fixture pool.
#[test]
fn prop_distance_axioms() {
    let fixtures = fixtures();
    for g in &fixtures {
        assert_eq!(triplet_distance(g, g).unwrap(), 0.0);
        assert_eq!(robinson_foulds(g, g).unwrap(), 0.0);
        assert_eq!(tripartition_distance(g, g).unwrap(), 0.0);
        assert_eq!(mu_distance(g, g).unwrap(), 0.0);
        assert_eq!(average_signed_distance(g, g).unwrap(), 0.0);
    }
    // The fixtures carry disjoint label vocabularies, so symmetry and the
    // [0, 1] range are checked on a pair of graphs that genuinely share a
    // label set: a level-1 network and one of its own spanning trees.
    let network = &fixtures[2];
    let spans = rooted_triplet_distance::graph::spanning::trees(network);
    let span = &spans[0];
    assert_eq!(triplet_distance(network, span).unwrap(), triplet_distance(span, network).unwrap());
    let rf_ab = robinson_foulds(network, span).unwrap();
    let rf_ba = robinson_foulds(span, network).unwrap();
    assert_eq!(rf_ab, rf_ba);
    assert!((0.0..=1.0).contains(&rf_ab));
    let tp = tripartition_distance(network, span).unwrap();
    assert!((0.0..=1.0).contains(&tp));
    assert_eq!(tp, tripartition_distance(span, network).unwrap());
    let mu = mu_distance(network, span).unwrap();
    assert!((0.0..=1.0).contains(&mu));
    assert_eq!(mu, mu_distance(span, network).unwrap());
}

/// Triangle inequality for triplet distance, exercised over the network
/// fixture's own spanning trees (the fixtures otherwise carry disjoint
/// label vocabularies, so a spanning-tree triple is the natural source of
/// three graphs over one shared label set).
#[test]
fn prop_triangle_inequality_on_spanning_trees() {
    let fixtures = fixtures();
    let network = &fixtures[2];
    let spans = rooted_triplet_distance::graph::spanning::trees(network);
    assert!(spans.len() >= 2, "fixture network must have at least one reticulation");
    let a = &spans[0];
    let b = &spans[1];
    let c = network;
    let dab = triplet_distance(a, b).unwrap();
    let dbc = triplet_distance(b, c).unwrap();
    let dac = triplet_distance(a, c).unwrap();
    assert!(dac <= dab + dbc + 1e-9);
}

/// Property 6: spanning-tree union law. A network's triplet set is
/// exactly the union of its spanning trees' triplet sets.
#[test]
fn prop_spanning_tree_union_law() {
    let fixtures = fixtures();
    let network = &fixtures[2];
    let spans = rooted_triplet_distance::graph::spanning::trees(network);
    let mut union = HashSet::new();
    for s in &spans {
        union.extend(s.triplets());
    }
    assert_eq!(network.triplets(), union);
}

/// Property 7: SPR reversibility. Pruning a non-cycle leaf and regrafting
/// it back under its original parent returns an isomorphic graph.
#[test]
fn prop_spr_reversibility() {
    use rooted_triplet_distance::graph::spr::{perform_spr_move, Reattach};

    let fixtures = fixtures();
    let g = &fixtures[0]; // plain multifurcation: R{A,B,C}
    let node_a = g.node_of(&"A".to_string()).unwrap();
    let old_parent = g.parents_of(&node_a)[0];
    let node_b = g.node_of(&"B".to_string()).unwrap();

    let (moved, _len) = perform_spr_move(g, &node_a, Reattach::NewParent(node_b), false).unwrap();
    let (restored, _len2) =
        perform_spr_move(&moved, &node_a, Reattach::NewParent(old_parent), false).unwrap();

    assert_eq!(&restored, g);
}
