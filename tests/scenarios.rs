// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

/// End-to-end reconstruction scenarios (S1-S6).
use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rooted_triplet_distance::graph::TreeDict;
use rooted_triplet_distance::{GeneralTree, Graph, LevelOneNetwork, MultifurcatingTree, ReconstructionError, Triplet};

fn labels(xs: &[&str]) -> HashSet<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn triplets(xs: &[&str]) -> HashSet<Triplet<String>> {
    xs.iter().map(|s| Triplet::parse(s).unwrap()).collect()
}

fn leaf() -> TreeDict<String> {
    TreeDict::leaf()
}

fn node(children: Vec<(&str, TreeDict<String>)>) -> TreeDict<String> {
    TreeDict(
        children
            .into_iter()
            .map(|(label, subtree)| (label.to_string(), subtree))
            .collect(),
    )
}

fn tree(root: &str, children: Vec<(&str, TreeDict<String>)>) -> TreeDict<String> {
    let mut m = std::collections::HashMap::new();
    m.insert(root.to_string(), node(children));
    TreeDict(m)
}

// S1 - multifurcating from fanned triplet.
#[test]
fn s1_multifurcating_from_fanned_triplet() {
    let t = triplets(&["A|B|C"]);
    let tree = MultifurcatingTree::reconstruct(&t, &labels(&["A", "B", "C"]), None).unwrap();
    let graph = tree.graph();
    assert_eq!(graph.labels(), labels(&["A", "B", "C"]));
    let root = graph.root();
    assert_eq!(graph.children_of(&root).len(), 3);
    for child in graph.children_of(&root) {
        assert!(graph.label_of(child).is_some());
    }
}

// S2 - resolved pair.
#[test]
fn s2_resolved_pair() {
    let t = triplets(&["A,B|C", "A|C,D"]);
    let tree = MultifurcatingTree::reconstruct(&t, &labels(&["A", "B", "C", "D"]), None).unwrap();
    let graph = tree.graph();
    let root = graph.root();
    let branches: Vec<HashSet<String>> = graph
        .children_of(&root)
        .iter()
        .map(|c| graph.descendant_labels(c))
        .collect();
    assert!(branches.contains(&labels(&["A", "B"])));
    assert!(branches.contains(&labels(&["C", "D"])));
}

// S3 - general tree with an internal label, round-tripped through its own
// induced triplet set.
#[test]
fn s3_general_tree_with_internal_label_round_trips() {
    // A{B{C,D}, *0{E,F}}
    let dict = tree(
        "A",
        vec![
            ("B", node(vec![("C", leaf()), ("D", leaf())])),
            ("*0", node(vec![("E", leaf()), ("F", leaf())])),
        ],
    );
    let original: Graph<String> = Graph::from_tree_dict(&dict).unwrap();
    let induced = original.triplets();
    let all_labels = original.labels();

    let mut rng = StdRng::seed_from_u64(3);
    let reconstructed = GeneralTree::reconstruct(&induced, &all_labels, &mut rng, None).unwrap();
    assert_eq!(reconstructed.graph(), &original);
}

// S4 - level-1 network with a labeled source: reconstruction round-trips
// through the induced triplet set, and the source label is a candidate
// root.
#[test]
fn s4_level_one_network_labeled_source_round_trips() {
    // p{ 1{a, 2{b{e}, d}}, 3{f, 4{g{h}, d{c}}} }
    let dict = tree(
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
    );
    let original: Graph<String> = Graph::from_tree_dict(&dict).unwrap();
    assert!(!original.is_tree(), "d is a reticulation with two parents");
    assert_eq!(original.parents_of(&original.node_of(&"d".to_string()).unwrap()).len(), 2);

    let induced = original.triplets();
    let all_labels = original.labels();
    assert!(all_labels.contains(&"p".to_string()));

    let mut rng = StdRng::seed_from_u64(4);
    let reconstructed = LevelOneNetwork::reconstruct(&induced, &all_labels, &mut rng, None).unwrap();
    assert_eq!(reconstructed.graph(), &original);
}

// S5 - same structure as S4, but with the source label removed: no
// candidate root is labeled, so reconstruction mints a synthetic apex.
#[test]
fn s5_level_one_network_unlabeled_source() {
    let dict = tree(
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
    );
    let original: Graph<String> = Graph::from_tree_dict(&dict).unwrap();
    let induced = original.triplets();
    let mut without_p = original.labels();
    without_p.remove(&"p".to_string());

    let restricted: HashSet<Triplet<String>> = induced
        .iter()
        .filter(|t| t.labels().is_subset(&without_p))
        .cloned()
        .collect();

    let mut rng = StdRng::seed_from_u64(5);
    let reconstructed = LevelOneNetwork::reconstruct(&restricted, &without_p, &mut rng, None).unwrap();
    assert!(reconstructed.graph().labels().is_subset(&without_p) || reconstructed.graph().labels() == without_p);
    // the reconstructed network's own triplets must still contain every
    // input triplet (soundness on a proper subset of the original's facts).
    assert!(reconstructed.triplets().is_superset(&restricted));
}

// S6 - a genuinely contradictory triplet set errors rather than silently
// picking one of the two incompatible structures.
#[test]
fn s6_contradiction_errors() {
    let t = triplets(&["A,B|C", "A|B|C"]);
    let err = MultifurcatingTree::reconstruct(&t, &labels(&["A", "B", "C"]), None).unwrap_err();
    assert!(matches!(err, ReconstructionError::Contradiction(_)));
}
