// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! s-adjacency, connected components, diameters and distances.
//!
//! Two nodes are s-adjacent when at least `s` higher cells (edges or
//! 2-cells) contain both. Two higher cells are s-adjacent when they share at
//! least `s` nodes. Queries run BFS on the derived [`Graph`] whose edges are
//! the nonzero off-diagonal entries of the s-adjacency matrix, so they see
//! shared 2-cells as well as skeleton edges.

use std::collections::BTreeSet;

use nalgebra_sparse::CsrMatrix;
use tracing::{debug, warn};

use crate::complex::CellComplex;
use crate::error::{Error, Result, ValidationError};
use crate::graph::Graph;
use crate::keys::{Element, NodeId};
use crate::operators::{BasisIndex, IndexedMatrix};
use crate::sparse;

/// Which elements a connectivity query runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    /// Nodes, linked through shared edges and 2-cells.
    Nodes,
    /// Edges and 2-cells, linked through shared nodes.
    Cells,
}

/// BFS hop count in a derived graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    Finite(usize),
    Unreachable,
}

impl Distance {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    /// The hop count, or infinity when unreachable.
    pub fn as_f64(&self) -> f64 {
        match self {
            Distance::Finite(d) => *d as f64,
            Distance::Unreachable => f64::INFINITY,
        }
    }
}

/// Per-component diameters of a derived graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diameters<N> {
    /// Largest component diameter (0 when there is no component).
    pub max: usize,
    pub diameters: Vec<usize>,
    pub components: Vec<BTreeSet<Element<N>>>,
}

impl<N: NodeId> CellComplex<N> {
    /// Unsigned membership matrix: nodes × (edges, then 2-cells).
    fn membership(&self) -> (BasisIndex<N>, BasisIndex<N>, CsrMatrix<f64>) {
        let nodes = BasisIndex::new(self.skeleton(0).unwrap_or_default());
        let mut higher = self.skeleton(1).unwrap_or_default();
        higher.extend(self.skeleton(2).unwrap_or_default());
        let higher = BasisIndex::new(higher);

        let mut triplets = Vec::new();
        for (j, element) in higher.elements().iter().enumerate() {
            let members: Vec<&N> = match element {
                Element::Edge(e) => vec![e.lo(), e.hi()],
                Element::Cell(k) => self
                    .cell(*k)
                    .map(|c| c.node_set().into_iter().collect())
                    .unwrap_or_default(),
                Element::Node(_) => Vec::new(),
            };
            for n in members {
                // nodes removed from the skeleton may remain on stranded cells
                if let Some(i) = nodes.position(&Element::Node(n.clone())) {
                    triplets.push((i, j, 1.0));
                }
            }
        }
        let matrix = sparse::from_triplets(nodes.len(), higher.len(), triplets);
        (nodes, higher, matrix)
    }

    fn s_adjacency(gram: &CsrMatrix<f64>, s: usize) -> CsrMatrix<f64> {
        sparse::zero_diagonal(&sparse::threshold(gram, s as f64))
    }

    /// Node s-adjacency: nodes sharing at least `s` edges or 2-cells.
    pub fn node_adjacency_matrix(&self, s: usize) -> Result<IndexedMatrix<N>> {
        if s == 0 {
            return Err(ValidationError::ZeroLocality.into());
        }
        let (nodes, _, m) = self.membership();
        let matrix = Self::s_adjacency(&(&m * &m.transpose()), s);
        Ok(IndexedMatrix {
            rows: nodes.clone(),
            cols: nodes,
            matrix,
        })
    }

    /// Cell s-adjacency: edges and 2-cells sharing at least `s` nodes.
    pub fn cell_adjacency_matrix(&self, s: usize) -> Result<IndexedMatrix<N>> {
        if s == 0 {
            return Err(ValidationError::ZeroLocality.into());
        }
        let (_, higher, m) = self.membership();
        let matrix = Self::s_adjacency(&(&m.transpose() * &m), s);
        Ok(IndexedMatrix {
            rows: higher.clone(),
            cols: higher,
            matrix,
        })
    }

    fn derived_graph(&self, s: usize, locality: Locality) -> Result<Graph<Element<N>>> {
        let indexed = match locality {
            Locality::Nodes => self.node_adjacency_matrix(s)?,
            Locality::Cells => self.cell_adjacency_matrix(s)?,
        };
        let graph = Graph::from_sparse_adjacency(&indexed.matrix, indexed.rows.elements());
        debug!(
            s,
            ?locality,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "derived graph built"
        );
        Ok(graph)
    }

    /// Returns `true` if the derived graph has exactly one component.
    pub fn is_connected(&self, s: usize, locality: Locality) -> Result<bool> {
        Ok(self.derived_graph(s, locality)?.is_connected())
    }

    /// Components of the derived graph, single elements dropped unless asked for.
    pub fn s_connected_components(
        &self,
        s: usize,
        locality: Locality,
        return_singletons: bool,
    ) -> Result<Vec<BTreeSet<Element<N>>>> {
        Ok(self
            .derived_graph(s, locality)?
            .connected_components()
            .into_iter()
            .filter(|c| return_singletons || c.len() > 1)
            .map(|c| c.into_iter().collect())
            .collect())
    }

    /// Node sets of the 1-connected components.
    pub fn connected_components(&self, return_singletons: bool) -> Result<Vec<BTreeSet<N>>> {
        Ok(self
            .s_connected_components(1, Locality::Nodes, return_singletons)?
            .into_iter()
            .map(|c| c.into_iter().filter_map(|e| e.as_node().cloned()).collect())
            .collect())
    }

    /// One sub-complex per s-connected component.
    pub fn component_subgraphs(
        &self,
        s: usize,
        locality: Locality,
        return_singletons: bool,
    ) -> Result<Vec<CellComplex<N>>> {
        Ok(self
            .s_connected_components(s, locality, return_singletons)?
            .into_iter()
            .map(|component| match locality {
                Locality::Nodes => {
                    let nodes: Vec<N> = component
                        .into_iter()
                        .filter_map(|e| e.as_node().cloned())
                        .collect();
                    self.restrict_to_nodes(&nodes)
                }
                Locality::Cells => self.restrict_to_cells(component),
            })
            .collect())
    }

    fn diameters(&self, s: usize, locality: Locality) -> Result<Diameters<N>> {
        let graph = self.derived_graph(s, locality)?;
        let mut result = Diameters {
            max: 0,
            diameters: Vec::new(),
            components: Vec::new(),
        };
        for component in graph.connected_components() {
            let diameter = graph.subgraph(&component).diameter().unwrap_or(0);
            result.max = result.max.max(diameter);
            result.diameters.push(diameter);
            result.components.push(component.into_iter().collect());
        }
        Ok(result)
    }

    /// Diameters of the node s-components.
    pub fn node_diameters(&self, s: usize) -> Result<Diameters<N>> {
        self.diameters(s, Locality::Nodes)
    }

    /// Diameters of the cell s-components.
    pub fn cell_diameters(&self, s: usize) -> Result<Diameters<N>> {
        self.diameters(s, Locality::Cells)
    }

    fn connected_diameter(&self, s: usize, locality: Locality) -> Result<usize> {
        self.derived_graph(s, locality)?
            .diameter()
            .ok_or(Error::NotConnected { s })
    }

    /// Diameter of the node s-adjacency graph.
    ///
    /// Fails with [`Error::NotConnected`] when that graph is disconnected
    /// or empty.
    pub fn diameter(&self, s: usize) -> Result<usize> {
        self.connected_diameter(s, Locality::Nodes)
    }

    /// Diameter of the cell s-adjacency graph.
    pub fn cell_diameter(&self, s: usize) -> Result<usize> {
        self.connected_diameter(s, Locality::Cells)
    }

    fn hop_distance(
        &self,
        source: Element<N>,
        target: Element<N>,
        s: usize,
        locality: Locality,
    ) -> Result<Distance> {
        let graph = self.derived_graph(s, locality)?;
        match graph.shortest_path_length(&source, &target) {
            Some(d) => Ok(Distance::Finite(d)),
            None => {
                warn!(?source, ?target, s, "no s-walk between elements");
                Ok(Distance::Unreachable)
            }
        }
    }

    /// Hop distance between two nodes in the node s-adjacency graph.
    pub fn distance(&self, source: &N, target: &N, s: usize) -> Result<Distance> {
        for node in [source, target] {
            if !self.contains_node(node) {
                return Err(ValidationError::UnknownNode(format!("{node:?}")).into());
            }
        }
        self.hop_distance(
            Element::Node(source.clone()),
            Element::Node(target.clone()),
            s,
            Locality::Nodes,
        )
    }

    /// Hop distance between two edges or 2-cells in the cell s-adjacency graph.
    pub fn cell_distance(
        &self,
        source: &Element<N>,
        target: &Element<N>,
        s: usize,
    ) -> Result<Distance> {
        for element in [source, target] {
            let known = match element {
                Element::Edge(e) => self.contains_edge(e.lo(), e.hi()),
                Element::Cell(k) => self.contains_cell(*k),
                Element::Node(_) => false,
            };
            if !known {
                return Err(ValidationError::UnknownElement(format!("{element:?}")).into());
            }
        }
        self.hop_distance(source.clone(), target.clone(), s, Locality::Cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Edge;

    fn path_of_triangles() -> CellComplex<i32> {
        // 1-2-3 and 3-4-5 share node 3
        let mut cx = CellComplex::new();
        cx.add_cell([1, 2, 3], 2).unwrap();
        cx.add_cell([3, 4, 5], 2).unwrap();
        cx
    }

    #[test]
    fn zero_locality_is_rejected() {
        let cx = path_of_triangles();
        assert_eq!(
            cx.node_adjacency_matrix(0).unwrap_err().as_validation(),
            Some(&ValidationError::ZeroLocality)
        );
        assert!(cx.cell_adjacency_matrix(0).is_err());
    }

    #[test]
    fn node_adjacency_counts_shared_cells() {
        let cx = path_of_triangles();
        let a1 = cx.node_adjacency_matrix(1).unwrap();
        assert!(sparse::is_symmetric(&a1.matrix, 0.0));
        // 6 edges, each linking two nodes both ways
        assert_eq!(a1.matrix.nnz(), 12);

        // (1,2) share the edge and the triangle
        let a2 = cx.node_adjacency_matrix(2).unwrap();
        assert_eq!(a2.matrix.nnz(), 12);
        assert_eq!(cx.node_adjacency_matrix(3).unwrap().matrix.nnz(), 0);
    }

    #[test]
    fn cell_adjacency_rows_are_edges_then_cells() {
        let cx = path_of_triangles();
        let a = cx.cell_adjacency_matrix(1).unwrap();
        assert_eq!(a.rows.len(), 6 + 2);
        assert_eq!(a.rows.get(6).map(|e| e.rank()), Some(crate::keys::Rank::Cell));
        // the two triangles share exactly node 3
        let c = sparse::to_dense(&a.matrix);
        assert_eq!(c[(6, 7)], 1.0);
        assert_eq!(
            sparse::to_dense(&cx.cell_adjacency_matrix(2).unwrap().matrix)[(6, 7)],
            0.0
        );
    }

    #[test]
    fn connected_through_shared_node() {
        let cx = path_of_triangles();
        assert!(cx.is_connected(1, Locality::Nodes).unwrap());
        assert!(cx.is_connected(1, Locality::Cells).unwrap());
        assert!(!cx.is_connected(2, Locality::Cells).unwrap());
        assert_eq!(cx.diameter(1).unwrap(), 2);
    }

    #[test]
    fn singletons_are_optional() {
        let mut cx = path_of_triangles();
        cx.add_node(9);
        assert_eq!(cx.connected_components(false).unwrap().len(), 1);
        let all = cx.connected_components(true).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|c| c.len() == 1 && c.contains(&9)));
        assert!(cx.diameter(1).unwrap_err().is_not_connected());
    }

    #[test]
    fn distances() {
        let mut cx = path_of_triangles();
        assert_eq!(cx.distance(&1, &5, 1).unwrap(), Distance::Finite(2));
        assert_eq!(cx.distance(&1, &1, 1).unwrap(), Distance::Finite(0));

        cx.add_node(9);
        let d = cx.distance(&1, &9, 1).unwrap();
        assert_eq!(d, Distance::Unreachable);
        assert!(d.as_f64().is_infinite());
        assert!(!d.is_reachable());

        assert!(matches!(
            cx.distance(&1, &42, 1),
            Err(Error::Validation(ValidationError::UnknownNode(_)))
        ));
    }

    #[test]
    fn cell_distances() {
        let cx = path_of_triangles();
        let keys: Vec<Element<i32>> = cx.skeleton(2).unwrap();
        assert_eq!(
            cx.cell_distance(&keys[0], &keys[1], 1).unwrap(),
            Distance::Finite(1)
        );
        let e12 = Element::Edge(Edge::new(1, 2).unwrap());
        let e45 = Element::Edge(Edge::new(4, 5).unwrap());
        assert_eq!(cx.cell_distance(&e12, &e45, 1).unwrap(), Distance::Finite(3));

        let missing = Element::Edge(Edge::new(1, 5).unwrap());
        assert!(cx.cell_distance(&e12, &missing, 1).is_err());
        assert!(cx.cell_distance(&Element::Node(1), &e12, 1).is_err());
    }

    #[test]
    fn diameters_per_component() {
        let mut cx = path_of_triangles();
        cx.add_cell([7, 8, 9], 2).unwrap();
        let d = cx.node_diameters(1).unwrap();
        assert_eq!(d.components.len(), 2);
        assert_eq!(d.max, 2);
        let mut sizes: Vec<usize> = d.diameters.clone();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 2]);

        let c = cx.cell_diameters(1).unwrap();
        assert_eq!(c.components.len(), 2);
        assert!(cx.cell_diameter(1).unwrap_err().is_not_connected());
    }

    #[test]
    fn component_subgraphs() {
        let mut cx = path_of_triangles();
        cx.add_cell([7, 8, 9], 2).unwrap();

        let by_nodes = cx.component_subgraphs(1, Locality::Nodes, false).unwrap();
        let mut shapes: Vec<(usize, usize, usize)> = by_nodes.iter().map(|c| c.shape()).collect();
        shapes.sort_unstable();
        assert_eq!(shapes, vec![(3, 3, 1), (5, 6, 2)]);

        let by_cells = cx.component_subgraphs(1, Locality::Cells, false).unwrap();
        let mut shapes: Vec<(usize, usize, usize)> = by_cells.iter().map(|c| c.shape()).collect();
        shapes.sort_unstable();
        assert_eq!(shapes, vec![(3, 3, 1), (5, 6, 2)]);
    }

    #[test]
    fn empty_complex_is_not_connected() {
        let cx = CellComplex::<i32>::new();
        assert!(!cx.is_connected(1, Locality::Nodes).unwrap());
        assert!(cx.diameter(1).unwrap_err().is_not_connected());
        assert_eq!(cx.node_diameters(1).unwrap().max, 0);
    }
}
