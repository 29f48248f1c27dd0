// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! `Triplet`, the closed eight-shape taxonomy of three-label relational
//! constraints (spec §3, §4.1).
//!
//! Ported from `AbstractTriplet`/`GeneralTriplet` in
//! `rooted_triplet_distance/__abstract.py` and
//! `rooted_triplet_distance/general_tree/__general_triplet.py`: the regex
//! dispatch table there relies on labels never containing an operator
//! character, so parsing here just scans for the two operator characters
//! that separate a triplet's three labels instead of trying eight regexes
//! in sequence.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::label::Label;

/// One of the eight triplet shapes (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripletShape {
    /// `1|2|3` — three siblings, no pair closer than any other.
    Fanned,
    /// `1,2|3` — {1,2} share a strict ancestor excluded from 3.
    ResolvedPairLeft,
    /// `1|2,3` — same, flipped.
    ResolvedPairRight,
    /// `1/2|3` — 1 is a proper descendant of 2; 3 is a separate branch.
    DownResolved,
    /// `1|2\3` — 3 is a proper descendant of 2; 1 is a separate branch.
    UpResolved,
    /// `1/2\3` — 2 is a labeled ancestor of 1 and 3, in separate branches.
    VTriplet,
    /// `1/2/3` — chain 3 -> 2 -> 1.
    PathDown,
    /// `1\2\3` — chain 1 -> 2 -> 3.
    PathUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Bar,
    Comma,
    Slash,
    Backslash,
}

impl Op {
    fn from_char(c: char) -> Option<Op> {
        match c {
            '|' => Some(Op::Bar),
            ',' => Some(Op::Comma),
            '/' => Some(Op::Slash),
            '\\' => Some(Op::Backslash),
            _ => None,
        }
    }

    fn shape_for(a: Op, b: Op) -> Option<TripletShape> {
        use Op::*;
        use TripletShape::*;
        match (a, b) {
            (Bar, Bar) => Some(Fanned),
            (Comma, Bar) => Some(ResolvedPairLeft),
            (Bar, Comma) => Some(ResolvedPairRight),
            (Slash, Bar) => Some(DownResolved),
            (Bar, Backslash) => Some(UpResolved),
            (Slash, Backslash) => Some(VTriplet),
            (Slash, Slash) => Some(PathDown),
            (Backslash, Backslash) => Some(PathUp),
            _ => None,
        }
    }
}

/// A top-level part of a triplet's string form: either a lone label or a
/// comma-joined pair. See `Triplet::parts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part<L: Label> {
    /// A single label occupying its own top-level slot.
    Single(L),
    /// Two labels joined by a comma in the same top-level slot.
    Pair(L, L),
}

/// An immutable three-label relational constraint. See spec §3/§4.1 for
/// the full semantics of each shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triplet<L: Label> {
    shape: TripletShape,
    // raw nodes in left-to-right string order, i.e. (1, 2, 3).
    nodes: [L; 3],
}

impl<L: Label> Triplet<L> {
    /// Builds a triplet directly from a shape and its three raw nodes in
    /// left-to-right order. Labels must be pairwise distinct.
    pub fn from_parts(shape: TripletShape, nodes: [L; 3]) -> Result<Self, ParseError> {
        if nodes[0] == nodes[1] || nodes[1] == nodes[2] || nodes[0] == nodes[2] {
            return Err(ParseError(format!("triplet labels must be distinct: {:?}", nodes)));
        }
        Ok(Self { shape, nodes })
    }

    /// The triplet's shape tag.
    pub fn shape(&self) -> TripletShape {
        self.shape
    }

    /// The three labels, unordered.
    pub fn labels(&self) -> HashSet<L> {
        self.nodes.iter().cloned().collect()
    }

    /// True if `label` is one of this triplet's three labels.
    pub fn contains(&self, label: &L) -> bool {
        self.nodes.iter().any(|n| n == label)
    }

    /// The top-level partition of labels: singletons and/or one comma pair.
    /// Only the two resolved-pair shapes produce a non-trivial pair; every
    /// other shape is three singletons (ported from `GeneralTriplet.parts`,
    /// which splits the raw string on every operator *except* comma).
    pub fn parts(&self) -> Vec<Part<L>> {
        let [x, y, z] = self.clone_nodes();
        match self.shape {
            TripletShape::ResolvedPairLeft => vec![Part::Pair(x, y), Part::Single(z)],
            TripletShape::ResolvedPairRight => vec![Part::Single(x), Part::Pair(y, z)],
            _ => vec![Part::Single(x), Part::Single(y), Part::Single(z)],
        }
    }

    /// The partition of labels into sibling groups beneath the triplet's
    /// apex (spec §4.1 table).
    pub fn branches(&self) -> Vec<HashSet<L>> {
        let [x, y, z] = self.clone_nodes();
        use TripletShape::*;
        match self.shape {
            Fanned => vec![single(x), single(y), single(z)],
            ResolvedPairLeft | DownResolved => vec![pair(x, y), single(z)],
            ResolvedPairRight | UpResolved => vec![single(x), pair(y, z)],
            VTriplet => vec![single(x), single(z)],
            PathDown | PathUp => vec![triple(x, y, z)],
        }
    }

    /// The candidate-root set: non-empty only for the three shapes that
    /// pin a labeled apex (spec §4.1 table).
    pub fn candidate_root(&self) -> HashSet<L> {
        let [x, y, z] = self.clone_nodes();
        match self.shape {
            TripletShape::VTriplet => single(y),
            TripletShape::PathDown => single(z),
            TripletShape::PathUp => single(x),
            _ => HashSet::new(),
        }
    }

    /// Per-label descendant facts forced by this triplet (spec §4.1 table).
    pub fn descendants(&self) -> HashMap<L, HashSet<L>> {
        let [x, y, z] = self.clone_nodes();
        let mut m = HashMap::new();
        match self.shape {
            TripletShape::DownResolved => {
                m.insert(y, single(x));
            }
            TripletShape::UpResolved => {
                m.insert(y, single(z));
            }
            TripletShape::VTriplet => {
                m.insert(y, pair(x, z));
            }
            TripletShape::PathDown => {
                m.insert(z.clone(), pair(x.clone(), y.clone()));
                m.insert(y, single(x));
            }
            TripletShape::PathUp => {
                m.insert(x.clone(), pair(y.clone(), z.clone()));
                m.insert(y, single(z));
            }
            TripletShape::Fanned | TripletShape::ResolvedPairLeft | TripletShape::ResolvedPairRight => {}
        }
        m
    }

    /// Per-label separation facts forced by this triplet: labels that
    /// must not share a lowest ancestor with the key (spec §4.1 table).
    ///
    /// Ported verbatim from `__general_triplet.py`'s `__get_separations`:
    /// both resolved-pair shapes map to the same all-pairs-separated dict
    /// as the fanned shape (the spec's looser "pairs crossing the bar"
    /// description undershoots what the original code actually encodes).
    pub fn separations(&self) -> HashMap<L, HashSet<L>> {
        let [x, y, z] = self.clone_nodes();
        use TripletShape::*;
        match self.shape {
            Fanned | ResolvedPairLeft | ResolvedPairRight => {
                let mut m = HashMap::new();
                m.insert(x.clone(), pair(y.clone(), z.clone()));
                m.insert(y.clone(), pair(x.clone(), z.clone()));
                m.insert(z, pair(x, y));
                m
            }
            DownResolved => {
                let mut m = HashMap::new();
                m.insert(x.clone(), single(z.clone()));
                m.insert(y.clone(), single(z.clone()));
                m.insert(z, pair(x, y));
                m
            }
            UpResolved => {
                let mut m = HashMap::new();
                m.insert(x.clone(), pair(y.clone(), z.clone()));
                m.insert(y, single(x.clone()));
                m.insert(z, single(x));
                m
            }
            VTriplet => {
                let mut m = HashMap::new();
                m.insert(x.clone(), single(z.clone()));
                m.insert(z, single(x));
                m
            }
            PathDown | PathUp => HashMap::new(),
        }
    }

    /// `Some(true)` if `a` and `b` fall in different top-level branches of
    /// this triplet, `Some(false)` if they share one, `None` if either is
    /// not one of this triplet's three labels. Ported from
    /// `MultifurcatingTriplet.apart`, generalized to all eight shapes via
    /// `branches()`.
    pub fn apart(&self, a: &L, b: &L) -> Option<bool> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let branches = self.branches();
        let same = branches.iter().any(|br| br.contains(a) && br.contains(b));
        Some(!same)
    }

    /// Canonical equivalence key: two triplets are equal iff their
    /// canonical forms are equal (spec §3 "Canonical form and hash").
    fn canonical(&self) -> Canonical<L> {
        let [x, y, z] = self.clone_nodes();
        match self.shape {
            TripletShape::Fanned => {
                let mut v = [x, y, z];
                v.sort();
                Canonical::Fanned(v)
            }
            TripletShape::ResolvedPairLeft => Canonical::ResolvedPair(z, sorted2(x, y)),
            TripletShape::ResolvedPairRight => Canonical::ResolvedPair(x, sorted2(y, z)),
            TripletShape::DownResolved => Canonical::Descendant(z, y, x),
            TripletShape::UpResolved => Canonical::Descendant(x, y, z),
            TripletShape::VTriplet => Canonical::VBranches(y, sorted2(x, z)),
            TripletShape::PathDown => Canonical::Chain(z, y, x),
            TripletShape::PathUp => Canonical::Chain(x, y, z),
        }
    }

    fn clone_nodes(&self) -> [L; 3] {
        self.nodes.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Canonical<L: Label> {
    Fanned([L; 3]),
    ResolvedPair(L, [L; 2]),
    Descendant(L, L, L),
    VBranches(L, [L; 2]),
    Chain(L, L, L),
}

fn single<L: Label>(a: L) -> HashSet<L> {
    let mut s = HashSet::new();
    s.insert(a);
    s
}

fn pair<L: Label>(a: L, b: L) -> HashSet<L> {
    let mut s = HashSet::new();
    s.insert(a);
    s.insert(b);
    s
}

fn triple<L: Label>(a: L, b: L, c: L) -> HashSet<L> {
    let mut s = HashSet::new();
    s.insert(a);
    s.insert(b);
    s.insert(c);
    s
}

fn sorted2<L: Label>(a: L, b: L) -> [L; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

impl<L: Label> PartialEq for Triplet<L> {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl<L: Label> Eq for Triplet<L> {}

impl<L: Label> std::hash::Hash for Triplet<L> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

fn operator_char(c: char) -> bool {
    matches!(c, '|' | ',' | '/' | '\\')
}

impl Triplet<String> {
    /// Parses one of the eight ASCII triplet forms. Labels are maximal
    /// runs of characters outside `{|, / \}`, must be non-empty, and must
    /// be pairwise distinct (spec §4.1 / §6).
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut labels: Vec<String> = Vec::with_capacity(3);
        let mut ops: Vec<Op> = Vec::with_capacity(2);
        let mut current = String::new();
        for c in s.chars() {
            if let Some(op) = Op::from_char(c) {
                if op == Op::Comma {
                    // Comma only matters inside a resolved-pair part; it is
                    // not a shape-separator on its own. Treat it as part of
                    // the accumulated segment text so "A,B" stays readable,
                    // then split it out below.
                    current.push(c);
                    continue;
                }
                labels.push(std::mem::take(&mut current));
                ops.push(op);
            } else {
                current.push(c);
            }
        }
        labels.push(current);

        if labels.len() != 3 || ops.len() != 2 {
            return Err(ParseError(format!("invalid triplet: {}", s)));
        }
        let shape = Op::shape_for(ops[0], ops[1])
            .ok_or_else(|| ParseError(format!("invalid triplet: {}", s)))?;

        // Exactly one of the three segments may itself be a comma pair,
        // and only for the two resolved-pair shapes.
        let comma_positions: Vec<usize> = (0..3).filter(|i| labels[*i].contains(',')).collect();
        let nodes = match shape {
            TripletShape::ResolvedPairLeft => {
                if comma_positions != [0] {
                    return Err(ParseError(format!("invalid triplet: {}", s)));
                }
                let mut it = labels[0].splitn(2, ',');
                let a = it.next().unwrap().to_string();
                let b = it.next().ok_or_else(|| ParseError(format!("invalid triplet: {}", s)))?.to_string();
                [a, b, labels[2].clone()]
            }
            TripletShape::ResolvedPairRight => {
                if comma_positions != [1] {
                    return Err(ParseError(format!("invalid triplet: {}", s)));
                }
                let mut it = labels[1].splitn(2, ',');
                let b = it.next().unwrap().to_string();
                let c = it.next().ok_or_else(|| ParseError(format!("invalid triplet: {}", s)))?.to_string();
                [labels[0].clone(), b, c]
            }
            _ => {
                if !comma_positions.is_empty() {
                    return Err(ParseError(format!("invalid triplet: {}", s)));
                }
                [labels[0].clone(), labels[1].clone(), labels[2].clone()]
            }
        };

        if nodes.iter().any(|n| n.is_empty()) {
            return Err(ParseError(format!("invalid triplet: {}", s)));
        }
        Triplet::from_parts(shape, nodes)
    }
}

impl<L: Label + fmt::Display> fmt::Display for Triplet<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = &self.nodes;
        match self.shape {
            TripletShape::Fanned => write!(f, "{}|{}|{}", x, y, z),
            TripletShape::ResolvedPairLeft => write!(f, "{},{}|{}", x, y, z),
            TripletShape::ResolvedPairRight => write!(f, "{}|{},{}", x, y, z),
            TripletShape::DownResolved => write!(f, "{}/{}|{}", x, y, z),
            TripletShape::UpResolved => write!(f, "{}|{}\\{}", x, y, z),
            TripletShape::VTriplet => write!(f, "{}/{}\\{}", x, y, z),
            TripletShape::PathDown => write!(f, "{}/{}/{}", x, y, z),
            TripletShape::PathUp => write!(f, "{}\\{}\\{}", x, y, z),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_all_eight_shapes() {
        let cases = [
            ("A|B|C", TripletShape::Fanned),
            ("A,B|C", TripletShape::ResolvedPairLeft),
            ("A|B,C", TripletShape::ResolvedPairRight),
            ("A/B|C", TripletShape::DownResolved),
            (r"A|B\C", TripletShape::UpResolved),
            (r"A/B\C", TripletShape::VTriplet),
            ("A/B/C", TripletShape::PathDown),
            (r"A\B\C", TripletShape::PathUp),
        ];
        for (s, shape) in cases {
            let t = Triplet::parse(s).unwrap();
            assert_eq!(t.shape(), shape, "{}", s);
            assert_eq!(t.to_string(), s);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(Triplet::parse("A|B").is_err());
        assert!(Triplet::parse("A|A|B").is_err());
        assert!(Triplet::parse("A|B|C|D").is_err());
        assert!(Triplet::parse("").is_err());
    }

    #[test]
    fn equal_up_to_commutative_reordering() {
        assert_eq!(Triplet::parse("A,B|C").unwrap(), Triplet::parse("B,A|C").unwrap());
        assert_eq!(Triplet::parse("A|B|C").unwrap(), Triplet::parse("C|B|A").unwrap());
        assert_ne!(Triplet::parse("A,B|C").unwrap(), Triplet::parse("A,C|B").unwrap());
    }

    #[test]
    fn flipped_spellings_are_equal() {
        // A/B|C (A descends from B, C apart) == C|B\A (same relation written the other way)
        assert_eq!(Triplet::parse("A/B|C").unwrap(), Triplet::parse(r"C|B\A").unwrap());
    }

    #[test]
    fn chain_direction_matters() {
        assert_ne!(Triplet::parse("A/B/C").unwrap(), Triplet::parse(r"A\B\C").unwrap());
        assert_eq!(Triplet::parse("C/B/A").unwrap(), Triplet::parse(r"A\B\C").unwrap());
    }

    #[test]
    fn descendants_and_separations_match_table() {
        let t = Triplet::parse("A/B/C").unwrap();
        let d = t.descendants();
        assert_eq!(d.get("C"), Some(&single("A".to_string()).union(&single("B".to_string())).cloned().collect()));
        assert_eq!(d.get("B"), Some(&single("A".to_string())));
        assert_eq!(t.candidate_root(), single("C".to_string()));

        let v = Triplet::parse(r"A/B\C").unwrap();
        assert_eq!(v.candidate_root(), single("B".to_string()));
        assert_eq!(v.separations().get("A"), Some(&single("C".to_string())));
    }
}
