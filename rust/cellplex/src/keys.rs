// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier, key and basis-element types.
//!
//! Nodes are identified by caller-chosen values (`N: NodeId`). Internal
//! storage hands out `slotmap` keys, which stay valid after unrelated
//! removals (generational indices). A 2-cell record is addressed by its
//! [`CellKey`], since several records may share the same boundary.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::error::ValidationError;

new_key_type! {
    /// Key for a node slot in a [`Graph`](crate::graph::Graph).
    pub struct NodeKey;

    /// Key for an edge slot in a [`Graph`](crate::graph::Graph).
    pub struct EdgeKey;

    /// Key for a single 2-cell record in a [`CellRegistry`](crate::registry::CellRegistry).
    pub struct CellKey;
}

/// Requirements on node identifiers.
///
/// `Ord` fixes the canonical orientation of edges (low → high), which makes
/// incidence matrices independent of insertion order.
pub trait NodeId: Clone + Eq + Hash + Ord + fmt::Debug {}

impl<T: Clone + Eq + Hash + Ord + fmt::Debug> NodeId for T {}

/// Rank of a cell in a 2-dimensional complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Node = 0,
    Edge = 1,
    Cell = 2,
}

impl Rank {
    /// Returns the rank as an integer.
    pub fn as_usize(self) -> usize {
        self as usize
    }

    /// Returns the rank name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Node => "Node",
            Rank::Edge => "Edge",
            Rank::Cell => "Cell",
        }
    }
}

impl TryFrom<usize> for Rank {
    type Error = ValidationError;

    fn try_from(rank: usize) -> Result<Self, Self::Error> {
        match rank {
            0 => Ok(Rank::Node),
            1 => Ok(Rank::Edge),
            2 => Ok(Rank::Cell),
            other => Err(ValidationError::UnsupportedRank(other)),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An undirected edge stored in canonical order (`lo < hi`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge<N> {
    lo: N,
    hi: N,
}

impl<N: NodeId> Edge<N> {
    /// Creates the canonical edge between two distinct nodes.
    pub fn new(u: N, v: N) -> Result<Self, ValidationError> {
        match u.cmp(&v) {
            std::cmp::Ordering::Less => Ok(Self { lo: u, hi: v }),
            std::cmp::Ordering::Greater => Ok(Self { lo: v, hi: u }),
            std::cmp::Ordering::Equal => Err(ValidationError::SelfLoop(format!("{u:?}"))),
        }
    }

    /// The smaller endpoint. The canonical orientation runs from here.
    pub fn lo(&self) -> &N {
        &self.lo
    }

    /// The larger endpoint.
    pub fn hi(&self) -> &N {
        &self.hi
    }

    /// Returns both endpoints in canonical order.
    pub fn endpoints(&self) -> (&N, &N) {
        (&self.lo, &self.hi)
    }

    /// Returns `true` if `node` is an endpoint.
    pub fn contains(&self, node: &N) -> bool {
        &self.lo == node || &self.hi == node
    }

    /// Returns `+1` if traversing `from → to` follows the canonical
    /// orientation and `-1` otherwise.
    pub fn orientation(from: &N, to: &N) -> f64 {
        if from < to {
            1.0
        } else {
            -1.0
        }
    }
}

/// A basis element of any rank: what a row or column of an operator stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element<N> {
    Node(N),
    Edge(Edge<N>),
    Cell(CellKey),
}

impl<N> Element<N> {
    /// Returns the rank of this element.
    pub fn rank(&self) -> Rank {
        match self {
            Element::Node(_) => Rank::Node,
            Element::Edge(_) => Rank::Edge,
            Element::Cell(_) => Rank::Cell,
        }
    }

    /// Returns the node identifier, if this is a node.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            Element::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the edge, if this is an edge.
    pub fn as_edge(&self) -> Option<&Edge<N>> {
        match self {
            Element::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the cell record key, if this is a 2-cell.
    pub fn as_cell(&self) -> Option<CellKey> {
        match self {
            Element::Cell(k) => Some(*k),
            _ => None,
        }
    }
}

impl<N> From<Edge<N>> for Element<N> {
    fn from(e: Edge<N>) -> Self {
        Element::Edge(e)
    }
}

impl<N> From<CellKey> for Element<N> {
    fn from(k: CellKey) -> Self {
        Element::Cell(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_names_and_ordering() {
        assert_eq!(Rank::Node.as_str(), "Node");
        assert_eq!(Rank::Cell.to_string(), "Cell");
        assert!(Rank::Node < Rank::Edge);
        assert!(Rank::Edge < Rank::Cell);
        assert_eq!(Rank::Edge.as_usize(), 1);
    }

    #[test]
    fn rank_from_usize() {
        assert_eq!(Rank::try_from(2), Ok(Rank::Cell));
        assert_eq!(
            Rank::try_from(3),
            Err(ValidationError::UnsupportedRank(3))
        );
    }

    #[test]
    fn edge_is_canonical() {
        let a = Edge::new(5, 2).unwrap();
        let b = Edge::new(2, 5).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.endpoints(), (&2, &5));
        assert!(a.contains(&5));
        assert!(!a.contains(&3));
    }

    #[test]
    fn edge_rejects_self_loop() {
        assert!(matches!(
            Edge::new(1, 1),
            Err(ValidationError::SelfLoop(_))
        ));
    }

    #[test]
    fn orientation_sign() {
        assert_eq!(Edge::orientation(&1, &2), 1.0);
        assert_eq!(Edge::orientation(&2, &1), -1.0);
    }

    #[test]
    fn element_rank() {
        let e: Element<u32> = Element::Edge(Edge::new(0, 1).unwrap());
        assert_eq!(e.rank(), Rank::Edge);
        assert!(e.as_node().is_none());
        assert_eq!(Element::Node(4u32).as_node(), Some(&4));
    }
}
