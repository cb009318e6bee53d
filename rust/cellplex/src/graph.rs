// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Undirected simple graph used as the 1-skeleton and as the derived
//! adjacency graph of connectivity queries.
//!
//! Nodes are addressed by caller identifiers (`N`) and stored in slot maps
//! with bidirectional adjacency, so node and edge removal keep every other
//! handle valid. Graph algorithms (connected components, BFS distances,
//! diameter) run on a dense index snapshot built on demand.

use std::collections::VecDeque;

use nalgebra_sparse::CsrMatrix;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::attributes::Attributes;
use crate::keys::{EdgeKey, NodeId, NodeKey};

/// A node of the graph.
#[derive(Debug, Clone)]
pub struct GraphNode<N> {
    /// The caller's identifier for this node.
    pub id: N,
    /// Node metadata.
    pub attributes: Attributes,
    /// Neighbor → connecting edge.
    adjacency: FxHashMap<NodeKey, EdgeKey>,
}

/// An undirected edge of the graph.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub source: NodeKey,
    pub target: NodeKey,
    /// Edge metadata.
    pub attributes: Attributes,
}

/// An undirected graph without self-loops or parallel edges.
///
/// # Example
///
/// ```
/// use cellplex::Graph;
///
/// let mut g = Graph::new();
/// g.add_edge(1, 2);
/// g.add_edge(2, 3);
///
/// assert_eq!(g.node_count(), 3);
/// assert_eq!(g.shortest_path_length(&1, &3), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Graph<N> {
    nodes: SlotMap<NodeKey, GraphNode<N>>,
    edges: SlotMap<EdgeKey, GraphEdge>,
    key_to_node: FxHashMap<N, NodeKey>,
}

impl<N: NodeId> Graph<N> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            key_to_node: FxHashMap::default(),
        }
    }

    /// Builds a graph from a square adjacency matrix.
    ///
    /// Row/column `i` becomes node `labels[i]`; every nonzero off-diagonal
    /// entry becomes an edge. Labels beyond the matrix size are ignored.
    pub fn from_sparse_adjacency(matrix: &CsrMatrix<f64>, labels: &[N]) -> Self {
        let mut graph = Self::new();
        let n = matrix.nrows().min(labels.len());
        let keys: Vec<NodeKey> = labels[..n]
            .iter()
            .map(|id| graph.add_node(id.clone(), Attributes::default()))
            .collect();

        for (row, col, &value) in matrix.triplet_iter() {
            if row < col && col < n && value != 0.0 {
                graph.link(keys[row], keys[col], Attributes::default());
            }
        }
        graph
    }

    // =========================================================================
    // Graph mutation
    // =========================================================================

    /// Adds a node, or merges `attributes` into an existing one.
    pub fn add_node(&mut self, id: N, attributes: Attributes) -> NodeKey {
        if let Some(&key) = self.key_to_node.get(&id) {
            self.nodes[key].attributes.extend(attributes);
            return key;
        }
        let key = self.nodes.insert(GraphNode {
            id: id.clone(),
            attributes,
            adjacency: FxHashMap::default(),
        });
        self.key_to_node.insert(id, key);
        key
    }

    /// Adds an undirected edge, creating missing endpoints.
    ///
    /// Adding an existing edge merges `attributes` into it. Returns `None`
    /// for a self-loop.
    pub fn add_edge_with(&mut self, u: N, v: N, attributes: Attributes) -> Option<EdgeKey> {
        if u == v {
            return None;
        }
        let a = self.add_node(u, Attributes::default());
        let b = self.add_node(v, Attributes::default());
        Some(self.link(a, b, attributes))
    }

    /// Adds an undirected edge without metadata.
    pub fn add_edge(&mut self, u: N, v: N) -> Option<EdgeKey> {
        self.add_edge_with(u, v, Attributes::default())
    }

    fn link(&mut self, a: NodeKey, b: NodeKey, attributes: Attributes) -> EdgeKey {
        if let Some(&existing) = self.nodes[a].adjacency.get(&b) {
            self.edges[existing].attributes.extend(attributes);
            return existing;
        }
        let key = self.edges.insert(GraphEdge {
            source: a,
            target: b,
            attributes,
        });
        self.nodes[a].adjacency.insert(b, key);
        self.nodes[b].adjacency.insert(a, key);
        key
    }

    /// Removes a node and its incident edges. Returns `false` if absent.
    pub fn remove_node(&mut self, id: &N) -> bool {
        let Some(key) = self.key_to_node.remove(id) else {
            return false;
        };
        if let Some(node) = self.nodes.remove(key) {
            for (neighbor, edge) in node.adjacency {
                self.edges.remove(edge);
                if let Some(other) = self.nodes.get_mut(neighbor) {
                    other.adjacency.remove(&key);
                }
            }
        }
        true
    }

    /// Removes the edge between `u` and `v`. Returns `false` if absent.
    pub fn remove_edge(&mut self, u: &N, v: &N) -> bool {
        let (Some(&a), Some(&b)) = (self.key_to_node.get(u), self.key_to_node.get(v)) else {
            return false;
        };
        let Some(edge) = self.nodes[a].adjacency.remove(&b) else {
            return false;
        };
        self.nodes[b].adjacency.remove(&a);
        self.edges.remove(edge);
        true
    }

    // =========================================================================
    // Graph accessors
    // =========================================================================

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the node exists.
    pub fn contains_node(&self, id: &N) -> bool {
        self.key_to_node.contains_key(id)
    }

    /// Returns `true` if `u` and `v` are joined by an edge.
    pub fn has_edge(&self, u: &N, v: &N) -> bool {
        self.edge_key(u, v).is_some()
    }

    fn edge_key(&self, u: &N, v: &N) -> Option<EdgeKey> {
        let a = self.key_to_node.get(u)?;
        let b = self.key_to_node.get(v)?;
        self.nodes[*a].adjacency.get(b).copied()
    }

    /// Returns a node by identifier.
    pub fn node(&self, id: &N) -> Option<&GraphNode<N>> {
        self.key_to_node.get(id).map(|&k| &self.nodes[k])
    }

    /// Returns a mutable node by identifier.
    pub fn node_mut(&mut self, id: &N) -> Option<&mut GraphNode<N>> {
        let key = *self.key_to_node.get(id)?;
        self.nodes.get_mut(key)
    }

    /// Returns the attributes of the edge between `u` and `v`.
    pub fn edge_attributes(&self, u: &N, v: &N) -> Option<&Attributes> {
        self.edge_key(u, v).map(|k| &self.edges[k].attributes)
    }

    /// Returns the mutable attributes of the edge between `u` and `v`.
    pub fn edge_attributes_mut(&mut self, u: &N, v: &N) -> Option<&mut Attributes> {
        let key = self.edge_key(u, v)?;
        self.edges.get_mut(key).map(|e| &mut e.attributes)
    }

    /// Iterates over node identifiers (storage order).
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.values().map(|n| &n.id)
    }

    /// Iterates over edges as endpoint pairs (storage order).
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.edges
            .values()
            .map(|e| (&self.nodes[e.source].id, &self.nodes[e.target].id))
    }

    /// Returns the neighbors of a node.
    pub fn neighbors(&self, id: &N) -> Option<Vec<&N>> {
        let node = self.node(id)?;
        Some(node.adjacency.keys().map(|&k| &self.nodes[k].id).collect())
    }

    /// Returns the degree (number of incident edges) of a node.
    pub fn degree(&self, id: &N) -> Option<usize> {
        self.node(id).map(|n| n.adjacency.len())
    }

    /// Returns isolated nodes (degree 0).
    pub fn isolated_nodes(&self) -> Vec<&N> {
        self.nodes
            .values()
            .filter(|n| n.adjacency.is_empty())
            .map(|n| &n.id)
            .collect()
    }

    /// Returns the subgraph induced by `ids`, attributes included.
    ///
    /// Identifiers that are not in the graph are ignored.
    pub fn subgraph<'a>(&self, ids: impl IntoIterator<Item = &'a N>) -> Self
    where
        N: 'a,
    {
        let mut sub = Self::new();
        for id in ids {
            if let Some(node) = self.node(id) {
                sub.add_node(id.clone(), node.attributes.clone());
            }
        }
        for edge in self.edges.values() {
            let (u, v) = (&self.nodes[edge.source].id, &self.nodes[edge.target].id);
            if sub.contains_node(u) && sub.contains_node(v) {
                sub.add_edge_with(u.clone(), v.clone(), edge.attributes.clone());
            }
        }
        sub
    }

    // =========================================================================
    // Connected components and distances
    // =========================================================================

    /// Returns connected components as lists of node identifiers.
    pub fn connected_components(&self) -> Vec<Vec<N>> {
        let dense = self.dense();
        let n = dense.ids.len();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            visited[start] = true;
            queue.push_back(start);

            while let Some(node) = queue.pop_front() {
                component.push(dense.ids[node].clone());
                for &neighbor in &dense.adjacency[node] {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }

            components.push(component);
        }

        components
    }

    /// Checks if the graph is connected. The empty graph is not.
    pub fn is_connected(&self) -> bool {
        self.node_count() > 0 && self.connected_components().len() == 1
    }

    /// BFS hop count between two nodes, or `None` if unreachable or absent.
    pub fn shortest_path_length(&self, source: &N, target: &N) -> Option<usize> {
        let dense = self.dense();
        let s = dense.index_of(source)?;
        let t = dense.index_of(target)?;
        let dist = dense.bfs_distances(s)[t];
        (dist != usize::MAX).then_some(dist)
    }

    /// BFS shortest path (hop count), endpoints included.
    pub fn shortest_path(&self, source: &N, target: &N) -> Option<Vec<N>> {
        let dense = self.dense();
        let s = dense.index_of(source)?;
        let t = dense.index_of(target)?;
        let n = dense.ids.len();
        let mut visited = vec![false; n];
        let mut prev = vec![None; n];
        let mut queue = VecDeque::new();

        visited[s] = true;
        queue.push_back(s);

        while let Some(node) = queue.pop_front() {
            if node == t {
                break;
            }
            for &neighbor in &dense.adjacency[node] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    prev[neighbor] = Some(node);
                    queue.push_back(neighbor);
                }
            }
        }

        if !visited[t] {
            return None;
        }

        let mut path = Vec::new();
        let mut current = t;
        while let Some(p) = prev[current] {
            path.push(dense.ids[current].clone());
            current = p;
        }
        path.push(dense.ids[s].clone());
        path.reverse();
        Some(path)
    }

    /// Returns the diameter (longest shortest path between any two nodes).
    ///
    /// Uses BFS from every node. Returns `None` if the graph is empty or
    /// not connected.
    pub fn diameter(&self) -> Option<usize> {
        if !self.is_connected() {
            return None;
        }

        let dense = self.dense();
        let mut max_dist = 0;
        for start in 0..dense.ids.len() {
            for &d in &dense.bfs_distances(start) {
                if d != usize::MAX && d > max_dist {
                    max_dist = d;
                }
            }
        }

        Some(max_dist)
    }

    /// Snapshot of the adjacency as dense indices for the BFS-based algorithms.
    fn dense(&self) -> DenseAdjacency<N> {
        let mut index: FxHashMap<NodeKey, usize> = FxHashMap::default();
        let mut ids = Vec::with_capacity(self.nodes.len());
        for (i, (key, node)) in self.nodes.iter().enumerate() {
            index.insert(key, i);
            ids.push(node.id.clone());
        }
        let adjacency = self
            .nodes
            .values()
            .map(|node| node.adjacency.keys().map(|k| index[k]).collect())
            .collect();
        DenseAdjacency { ids, adjacency }
    }
}

impl<N: NodeId> Default for Graph<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Index-based adjacency lists.
struct DenseAdjacency<N> {
    ids: Vec<N>,
    adjacency: Vec<Vec<usize>>,
}

impl<N: NodeId> DenseAdjacency<N> {
    fn index_of(&self, id: &N) -> Option<usize> {
        self.ids.iter().position(|x| x == id)
    }

    /// BFS distance from a source to all other nodes.
    fn bfs_distances(&self, source: usize) -> Vec<usize> {
        let mut dist = vec![usize::MAX; self.ids.len()];
        let mut queue = VecDeque::new();

        dist[source] = 0;
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            for &neighbor in &self.adjacency[node] {
                if dist[neighbor] == usize::MAX {
                    dist[neighbor] = dist[node] + 1;
                    queue.push_back(neighbor);
                }
            }
        }

        dist
    }
}
