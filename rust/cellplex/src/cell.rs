// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2-cells: polygons attached along a closed walk of edges.
//!
//! A [`Cell`] keeps the node sequence exactly as given, because the order
//! fixes how each boundary edge is traversed (and therefore its sign in the
//! rank-2 incidence matrix). Identity, on the other hand, is the set of
//! boundary edges: rotating or reflecting the sequence yields an equal cell.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashSet;

use crate::error::ValidationError;
use crate::keys::{Edge, NodeId};

/// A 2-cell bounded by a cyclic walk over node identifiers.
///
/// # Example
///
/// ```
/// use cellplex::Cell;
///
/// let square = Cell::regular([1, 2, 3, 4]).unwrap();
/// let rotated = Cell::regular([3, 2, 1, 4]).unwrap();
///
/// assert_eq!(square, rotated);
/// assert_eq!(square.boundary_edges().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Cell<N> {
    nodes: Vec<N>,
    regular: bool,
    key: BoundaryKey<N>,
}

/// The sorted set of canonical boundary edges of a cell.
///
/// Two cells with the same key are equivalent: they are attached along the
/// same edges, whatever rotation, reflection or multiplicity their walks use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundaryKey<N>(Vec<Edge<N>>);

impl<N: NodeId> BoundaryKey<N> {
    /// Computes the key of a closed walk without validating it as a cell.
    ///
    /// Consecutive repeated nodes contribute no edge.
    pub fn of(nodes: &[N]) -> Self {
        let mut edges: Vec<Edge<N>> = cyclic_pairs(nodes)
            .filter_map(|(u, v)| Edge::new(u.clone(), v.clone()).ok())
            .collect();
        edges.sort_unstable();
        edges.dedup();
        Self(edges)
    }

    /// Returns the distinct boundary edges in canonical order.
    pub fn edges(&self) -> &[Edge<N>] {
        &self.0
    }

    /// Returns the number of distinct boundary edges.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the key holds no edge.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: NodeId> Cell<N> {
    /// Creates a cell from its boundary walk.
    ///
    /// With `regular` set, a node may appear only once in the walk.
    pub fn new(nodes: impl IntoIterator<Item = N>, regular: bool) -> Result<Self, ValidationError> {
        let nodes: Vec<N> = nodes.into_iter().collect();
        if nodes.len() < 2 {
            return Err(ValidationError::TooFewNodes(nodes.len()));
        }
        if let Some((u, _)) = cyclic_pairs(&nodes).find(|(u, v)| u == v) {
            return Err(ValidationError::SelfLoop(format!("{u:?}")));
        }

        let key = BoundaryKey::of(&nodes);
        if key.len() < 2 {
            return Err(ValidationError::DegenerateBoundary(key.len()));
        }

        let repeated = first_repeated(&nodes);
        if regular {
            if let Some(node) = repeated {
                return Err(ValidationError::IrregularCell(format!("{node:?}")));
            }
        }

        Ok(Self {
            regular: repeated.is_none(),
            nodes,
            key,
        })
    }

    /// Creates a cell that must be regular.
    pub fn regular(nodes: impl IntoIterator<Item = N>) -> Result<Self, ValidationError> {
        Self::new(nodes, true)
    }

    /// Creates a cell that may revisit nodes.
    pub fn irregular(nodes: impl IntoIterator<Item = N>) -> Result<Self, ValidationError> {
        Self::new(nodes, false)
    }

    /// Returns the boundary walk in its original order.
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Returns the length of the boundary walk.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a cell has at least two nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if no node is visited twice.
    pub fn is_regular(&self) -> bool {
        self.regular
    }

    /// Returns the first node visited twice, if any.
    pub fn repeated_node(&self) -> Option<&N> {
        first_repeated(&self.nodes)
    }

    /// Returns the boundary as directed pairs, wrapping around, with repeats.
    pub fn boundary(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        cyclic_pairs(&self.nodes)
    }

    /// Returns the canonical edge of every boundary step, with repeats.
    pub fn boundary_edges(&self) -> Vec<Edge<N>> {
        self.boundary()
            .filter_map(|(u, v)| Edge::new(u.clone(), v.clone()).ok())
            .collect()
    }

    /// Returns the distinct nodes on the boundary.
    pub fn node_set(&self) -> FxHashSet<&N> {
        self.nodes.iter().collect()
    }

    /// Returns `true` if `node` lies on the boundary.
    pub fn contains_node(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    /// Returns the boundary key used for equality and registry lookup.
    pub fn key(&self) -> &BoundaryKey<N> {
        &self.key
    }

    /// Returns `true` if `other` walks the same cycle, up to rotation and
    /// reflection. Stricter than `==`, which compares edge sets only.
    pub fn is_rotation_of(&self, other: &Cell<N>) -> bool {
        let n = self.nodes.len();
        if n != other.nodes.len() {
            return false;
        }
        let reversed: Vec<N> = other.nodes.iter().rev().cloned().collect();
        (0..n).any(|shift| {
            (0..n).all(|i| self.nodes[i] == other.nodes[(i + shift) % n])
                || (0..n).all(|i| self.nodes[i] == reversed[(i + shift) % n])
        })
    }
}

impl<N: NodeId> PartialEq for Cell<N> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<N: NodeId> Eq for Cell<N> {}

impl<N: NodeId> Hash for Cell<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Consecutive pairs of a closed walk, including the wrap-around pair.
fn cyclic_pairs<N>(nodes: &[N]) -> impl Iterator<Item = (&N, &N)> + '_ {
    nodes
        .iter()
        .zip(nodes.iter().cycle().skip(1))
        .take(nodes.len())
}

fn first_repeated<N: NodeId>(nodes: &[N]) -> Option<&N> {
    let mut seen = FxHashSet::default();
    nodes.iter().find(|n| !seen.insert(*n))
}
