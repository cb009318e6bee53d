// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The cell complex container and its mutation API.
//!
//! A [`CellComplex`] owns a 1-skeleton ([`Graph`]) and a [`CellRegistry`] of
//! 2-cells. Every insertion validates the cell against the complex before
//! touching any storage, so a failed call leaves the complex unchanged.
//!
//! Removal never cascades: removing a 2-cell keeps its boundary edges, and
//! removing a node or edge keeps the 2-cells that used it. Such cells are
//! reported by [`CellComplex::stranded_cells`].

use std::fmt;

use tracing::{debug, trace, warn};

use crate::attributes::Attributes;
use crate::cell::{BoundaryKey, Cell};
use crate::config::ComplexConfig;
use crate::error::{Result, ValidationError};
use crate::graph::Graph;
use crate::keys::{CellKey, Edge, Element, NodeId, Rank};
use crate::registry::CellRegistry;

// ============================================================================
// Inputs and outcomes
// ============================================================================

/// Something that can be inserted as a cell.
#[derive(Debug, Clone)]
pub enum CellInput<N> {
    /// A raw node sequence, validated on insertion.
    Nodes(Vec<N>),
    /// A prebuilt 2-cell.
    Cell(Cell<N>),
}

impl<N> From<Vec<N>> for CellInput<N> {
    fn from(nodes: Vec<N>) -> Self {
        CellInput::Nodes(nodes)
    }
}

impl<N: Clone> From<&[N]> for CellInput<N> {
    fn from(nodes: &[N]) -> Self {
        CellInput::Nodes(nodes.to_vec())
    }
}

impl<N, const K: usize> From<[N; K]> for CellInput<N> {
    fn from(nodes: [N; K]) -> Self {
        CellInput::Nodes(nodes.into())
    }
}

impl<N> From<Cell<N>> for CellInput<N> {
    fn from(cell: Cell<N>) -> Self {
        CellInput::Cell(cell)
    }
}

/// Addresses existing 2-cells: every record with a given boundary, or one
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellRef<N> {
    Boundary(BoundaryKey<N>),
    Record(CellKey),
}

impl<N: NodeId> From<Vec<N>> for CellRef<N> {
    fn from(nodes: Vec<N>) -> Self {
        CellRef::Boundary(BoundaryKey::of(&nodes))
    }
}

impl<N: NodeId> From<&[N]> for CellRef<N> {
    fn from(nodes: &[N]) -> Self {
        CellRef::Boundary(BoundaryKey::of(nodes))
    }
}

impl<N: NodeId, const K: usize> From<[N; K]> for CellRef<N> {
    fn from(nodes: [N; K]) -> Self {
        CellRef::Boundary(BoundaryKey::of(&nodes))
    }
}

impl<N: NodeId> From<&Cell<N>> for CellRef<N> {
    fn from(cell: &Cell<N>) -> Self {
        CellRef::Boundary(cell.key().clone())
    }
}

impl<N> From<CellKey> for CellRef<N> {
    fn from(key: CellKey) -> Self {
        CellRef::Record(key)
    }
}

/// Explicitly tagged input for [`CellComplex::from_items`].
#[derive(Debug, Clone)]
pub enum ComplexItem<N> {
    Node(N),
    Edge(N, N),
    Cell(Vec<N>),
}

/// Why an insertion was skipped without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection<N> {
    /// Skeleton checking is on and this boundary edge is not in the skeleton.
    MissingEdge(Edge<N>),
}

/// Outcome of [`CellComplex::add_cell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion<N> {
    /// A rank-1 insertion; the edge is present afterwards.
    Edge(Edge<N>),
    /// A new 2-cell record.
    Cell(CellKey),
    /// Nothing was changed.
    Skipped(Rejection<N>),
}

impl<N> Insertion<N> {
    /// Returns the record key of an inserted 2-cell.
    pub fn cell_key(&self) -> Option<CellKey> {
        match self {
            Insertion::Cell(k) => Some(*k),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Insertion::Skipped(_))
    }
}

/// Per-call options for [`CellComplex::add_cell_with`].
#[derive(Debug, Clone, Default)]
pub struct AddCellOptions {
    /// Overrides [`ComplexConfig::check_skeleton`] when set.
    pub check_skeleton: Option<bool>,
    /// Attributes of the new record or edge.
    pub attributes: Attributes,
}

impl AddCellOptions {
    pub fn check_skeleton(mut self, check: bool) -> Self {
        self.check_skeleton = Some(check);
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

// ============================================================================
// CellComplex
// ============================================================================

/// A 2-dimensional cell complex over node identifiers `N`.
///
/// # Example
///
/// ```
/// use cellplex::CellComplex;
///
/// let mut cx = CellComplex::<u32>::new();
/// cx.add_cell([1, 2, 3, 4], 2).unwrap();
/// cx.add_cell([2, 3, 4, 5], 2).unwrap();
///
/// assert_eq!(cx.shape(), (5, 6, 2));
/// assert_eq!(cx.dim(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CellComplex<N> {
    pub(crate) config: ComplexConfig,
    pub(crate) skeleton: Graph<N>,
    pub(crate) cells: CellRegistry<N>,
    pub(crate) attributes: Attributes,
}

impl<N: NodeId> CellComplex<N> {
    /// Creates an empty regular complex.
    pub fn new() -> Self {
        Self::with_config(ComplexConfig::default())
    }

    pub fn with_config(config: ComplexConfig) -> Self {
        Self {
            config,
            skeleton: Graph::new(),
            cells: CellRegistry::new(),
            attributes: Attributes::default(),
        }
    }

    /// Adopts a prebuilt 1-skeleton.
    pub fn from_graph(skeleton: Graph<N>, config: ComplexConfig) -> Self {
        Self {
            skeleton,
            ..Self::with_config(config)
        }
    }

    /// Builds a complex from tagged items, in order.
    ///
    /// Validation errors abort the build. Skeleton-gated 2-cells are skipped.
    pub fn from_items(
        items: impl IntoIterator<Item = ComplexItem<N>>,
        config: ComplexConfig,
    ) -> Result<Self> {
        let mut complex = Self::with_config(config);
        for item in items {
            match item {
                ComplexItem::Node(n) => {
                    complex.add_node(n);
                }
                ComplexItem::Edge(u, v) => {
                    complex.add_edge(u, v)?;
                }
                ComplexItem::Cell(nodes) => {
                    if let Insertion::Skipped(reason) = complex.add_cell(nodes, 2)? {
                        debug!(?reason, "from_items: cell skipped");
                    }
                }
            }
        }
        Ok(complex)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Adds a node. Returns `true` if it was not present.
    pub fn add_node(&mut self, node: N) -> bool {
        self.add_node_with(node, Attributes::default())
    }

    /// Adds a node, merging `attributes` into an existing node's map.
    pub fn add_node_with(&mut self, node: N, attributes: Attributes) -> bool {
        let is_new = !self.skeleton.contains_node(&node);
        self.skeleton.add_node(node, attributes);
        is_new
    }

    /// Adds an edge and its endpoints.
    pub fn add_edge(&mut self, u: N, v: N) -> Result<Edge<N>> {
        self.add_edge_with(u, v, Attributes::default())
    }

    /// Adds an edge, merging `attributes` into an existing edge's map.
    pub fn add_edge_with(&mut self, u: N, v: N, attributes: Attributes) -> Result<Edge<N>> {
        let edge = Edge::new(u, v)?;
        self.skeleton
            .add_edge_with(edge.lo().clone(), edge.hi().clone(), attributes);
        Ok(edge)
    }

    /// Inserts a cell of the given rank with default options.
    pub fn add_cell(
        &mut self,
        input: impl Into<CellInput<N>>,
        rank: usize,
    ) -> Result<Insertion<N>> {
        self.add_cell_with(input, rank, AddCellOptions::default())
    }

    /// Inserts a cell of the given rank.
    ///
    /// Rank 1 takes exactly two distinct nodes. Rank 2 validates the cell
    /// (and its regularity, for a regular complex) before any change. With
    /// skeleton checking on, a 2-cell whose boundary is not fully present is
    /// skipped; otherwise the missing boundary edges are added.
    pub fn add_cell_with(
        &mut self,
        input: impl Into<CellInput<N>>,
        rank: usize,
        options: AddCellOptions,
    ) -> Result<Insertion<N>> {
        match Rank::try_from(rank)? {
            Rank::Node => Err(ValidationError::NodeRank.into()),
            Rank::Edge => {
                let nodes = match input.into() {
                    CellInput::Nodes(nodes) => nodes,
                    CellInput::Cell(_) => return Err(ValidationError::CellRank(rank).into()),
                };
                let [u, v]: [N; 2] = nodes
                    .try_into()
                    .map_err(|n: Vec<N>| ValidationError::EdgeArity(n.len()))?;
                self.add_edge_with(u, v, options.attributes)
                    .map(Insertion::Edge)
            }
            Rank::Cell => {
                let cell = self.validate_cell(input.into())?;
                let check = options.check_skeleton.unwrap_or(self.config.check_skeleton);
                if check {
                    if let Some(edge) = self.missing_edge(&cell) {
                        warn!(
                            cell = ?cell.nodes(),
                            edge = ?edge,
                            "cell skipped: boundary edge is not in the 1-skeleton"
                        );
                        return Ok(Insertion::Skipped(Rejection::MissingEdge(edge)));
                    }
                }
                for edge in cell.key().edges() {
                    self.skeleton.add_edge(edge.lo().clone(), edge.hi().clone());
                }
                let key = self.cells.insert(cell, options.attributes);
                trace!(?key, "cell registered");
                Ok(Insertion::Cell(key))
            }
        }
    }

    /// Inserts several cells of one rank. Each input reports its own outcome.
    pub fn add_cells_from<I>(&mut self, inputs: I, rank: usize) -> Vec<Result<Insertion<N>>>
    where
        I: IntoIterator,
        I::Item: Into<CellInput<N>>,
    {
        inputs
            .into_iter()
            .map(|input| self.add_cell(input, rank))
            .collect()
    }

    /// Removes 2-cell records. Boundary edges stay in the skeleton.
    ///
    /// Returns the number of records removed.
    pub fn remove_cell(&mut self, target: impl Into<CellRef<N>>) -> usize {
        match target.into() {
            CellRef::Boundary(key) => self.cells.delete(&key).len(),
            CellRef::Record(key) => usize::from(self.cells.remove_record(key).is_some()),
        }
    }

    pub fn remove_cells<I>(&mut self, targets: I) -> Vec<usize>
    where
        I: IntoIterator,
        I::Item: Into<CellRef<N>>,
    {
        targets.into_iter().map(|t| self.remove_cell(t)).collect()
    }

    /// Removes a node and its incident edges. 2-cells are kept.
    pub fn remove_node(&mut self, node: &N) -> bool {
        self.skeleton.remove_node(node)
    }

    /// Returns the number of nodes removed.
    pub fn remove_nodes<'a>(&mut self, nodes: impl IntoIterator<Item = &'a N>) -> usize
    where
        N: 'a,
    {
        nodes.into_iter().filter(|n| self.remove_node(n)).count()
    }

    /// Removes an edge. 2-cells are kept.
    pub fn remove_edge(&mut self, u: &N, v: &N) -> bool {
        self.skeleton.remove_edge(u, v)
    }

    /// Collapses equivalent 2-cells into their first record.
    pub fn remove_equivalent_cells(&mut self) -> usize {
        self.cells.deduplicate_equivalent()
    }

    /// Removes every singleton node. Returns how many were removed.
    pub fn remove_singletons(&mut self) -> usize {
        let singletons = self.singletons();
        self.remove_nodes(&singletons)
    }

    // ========================================================================
    // Structural queries
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ComplexConfig {
        &self.config
    }

    /// Returns 0 without edges, 1 with edges but no 2-cells, else 2.
    ///
    /// Stranded cells left after every edge was removed do not raise it.
    pub fn dim(&self) -> usize {
        if self.skeleton.edge_count() == 0 {
            0
        } else if self.cells.is_empty() {
            1
        } else {
            2
        }
    }

    /// Returns `(nodes, edges, 2-cells)`; 2-cells count records.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.node_count(), self.edge_count(), self.cell_count())
    }

    /// Returns the elements of one rank in basis order.
    pub fn skeleton(&self, rank: usize) -> Result<Vec<Element<N>>> {
        Ok(match Rank::try_from(rank)? {
            Rank::Node => self.sorted_nodes().into_iter().map(Element::Node).collect(),
            Rank::Edge => self.sorted_edges().into_iter().map(Element::Edge).collect(),
            Rank::Cell => self.cells.keys().map(Element::Cell).collect(),
        })
    }

    /// Node identifiers in ascending order.
    pub(crate) fn sorted_nodes(&self) -> Vec<N> {
        let mut nodes: Vec<N> = self.skeleton.nodes().cloned().collect();
        nodes.sort_unstable();
        nodes
    }

    /// Canonical edges in ascending order.
    pub(crate) fn sorted_edges(&self) -> Vec<Edge<N>> {
        let mut edges: Vec<Edge<N>> = self.edges().collect();
        edges.sort_unstable();
        edges
    }

    /// Iterates over nodes (storage order).
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.skeleton.nodes()
    }

    /// Iterates over canonical edges (storage order).
    pub fn edges(&self) -> impl Iterator<Item = Edge<N>> + '_ {
        self.skeleton
            .edges()
            .filter_map(|(u, v)| Edge::new(u.clone(), v.clone()).ok())
    }

    /// Iterates over 2-cell records in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell<N>)> + '_ {
        self.cells.iter()
    }

    pub fn cell(&self, key: CellKey) -> Option<&Cell<N>> {
        self.cells.get(key).map(|r| &r.cell)
    }

    /// Read access to the 1-skeleton.
    pub fn graph(&self) -> &Graph<N> {
        &self.skeleton
    }

    pub fn node_count(&self) -> usize {
        self.skeleton.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.skeleton.edge_count()
    }

    /// Number of 2-cell records, multi-cells included.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.skeleton.contains_node(node)
    }

    pub fn contains_edge(&self, u: &N, v: &N) -> bool {
        self.skeleton.has_edge(u, v)
    }

    /// Returns `true` if the target addresses at least one live record.
    pub fn contains_cell(&self, target: impl Into<CellRef<N>>) -> bool {
        match target.into() {
            CellRef::Boundary(key) => self.cells.contains_key(&key),
            CellRef::Record(key) => self.cells.contains_record(key),
        }
    }

    /// Number of edges incident to a node.
    pub fn degree(&self, node: &N) -> Option<usize> {
        self.skeleton.degree(node)
    }

    /// Number of distinct nodes on a 2-cell boundary.
    pub fn size(&self, key: CellKey) -> Option<usize> {
        self.cell(key).map(|c| c.node_set().len())
    }

    pub fn neighbors(&self, node: &N) -> Option<Vec<&N>> {
        self.skeleton.neighbors(node)
    }

    /// Returns `true` if every 2-cell is regular.
    pub fn is_regular(&self) -> bool {
        self.cells.iter().all(|(_, c)| c.is_regular())
    }

    /// Nodes with no incident edge that lie on no 2-cell.
    pub fn singletons(&self) -> Vec<N> {
        self.skeleton
            .isolated_nodes()
            .into_iter()
            .filter(|n| !self.cells.iter().any(|(_, c)| c.contains_node(n)))
            .cloned()
            .collect()
    }

    /// 2-cells whose boundary references an edge missing from the skeleton.
    pub fn stranded_cells(&self) -> Vec<CellKey> {
        self.cells
            .iter()
            .filter(|(_, c)| self.missing_edge(c).is_some())
            .map(|(k, _)| k)
            .collect()
    }

    /// Checks whether a node sequence could be inserted as a 2-cell.
    ///
    /// Malformed or irregular sequences are errors. A sequence that would be
    /// skipped by skeleton checking yields its rejection.
    pub fn check_insertable(
        &self,
        nodes: &[N],
        check_skeleton: bool,
    ) -> Result<Option<Rejection<N>>> {
        let cell = self.validate_cell(CellInput::Nodes(nodes.to_vec()))?;
        Ok(check_skeleton
            .then(|| self.missing_edge(&cell))
            .flatten()
            .map(Rejection::MissingEdge))
    }

    /// Returns `true` if [`check_insertable`](Self::check_insertable) finds nothing wrong.
    pub fn is_insertable_cycle(&self, nodes: &[N], check_skeleton: bool) -> bool {
        matches!(self.check_insertable(nodes, check_skeleton), Ok(None))
    }

    fn validate_cell(&self, input: CellInput<N>) -> Result<Cell<N>> {
        let cell = match input {
            CellInput::Nodes(nodes) => Cell::new(nodes, self.config.regular)?,
            CellInput::Cell(cell) => cell,
        };
        if self.config.regular {
            if let Some(node) = cell.repeated_node() {
                return Err(ValidationError::IrregularCell(format!("{node:?}")).into());
            }
        }
        Ok(cell)
    }

    pub(crate) fn missing_edge(&self, cell: &Cell<N>) -> Option<Edge<N>> {
        cell.key()
            .edges()
            .iter()
            .find(|e| !self.skeleton.has_edge(e.lo(), e.hi()))
            .cloned()
    }

    /// Record keys addressed by a target; unknown targets resolve to nothing.
    pub(crate) fn resolve(&self, target: &CellRef<N>) -> Vec<CellKey> {
        match target {
            CellRef::Boundary(key) => self.cells.records_for(key).to_vec(),
            CellRef::Record(key) if self.cells.contains_record(*key) => vec![*key],
            CellRef::Record(_) => Vec::new(),
        }
    }

    // ========================================================================
    // Sub-complexes
    // ========================================================================

    /// Builds the sub-complex spanned by the given elements.
    ///
    /// Nodes and edges are copied when present; a 2-cell record brings its
    /// boundary along. Attributes are copied, and record keys are new.
    pub fn restrict_to_cells(&self, elements: impl IntoIterator<Item = Element<N>>) -> Self {
        let mut sub = Self::with_config(self.config.clone());
        for element in elements {
            match element {
                Element::Node(n) => sub.copy_node(self, &n),
                Element::Edge(e) => sub.copy_edge(self, &e),
                Element::Cell(key) => {
                    let Some(record) = self.cells.get(key) else {
                        trace!(?key, "restrict_to_cells: unknown record");
                        continue;
                    };
                    for edge in record.cell.key().edges() {
                        sub.copy_edge(self, edge);
                    }
                    sub.cells
                        .insert(record.cell.clone(), record.attributes.clone());
                }
            }
        }
        sub
    }

    /// Builds the sub-complex induced by a node set: the induced skeleton
    /// plus every 2-cell whose nodes all lie in the set.
    pub fn restrict_to_nodes<'a>(&self, nodes: impl IntoIterator<Item = &'a N>) -> Self
    where
        N: 'a,
    {
        let mut sub = Self::with_config(self.config.clone());
        sub.skeleton = self.skeleton.subgraph(nodes);
        for (key, cell) in self.cells.iter() {
            if cell.nodes().iter().all(|n| sub.skeleton.contains_node(n)) {
                let attributes = self
                    .cells
                    .get(key)
                    .map(|r| r.attributes.clone())
                    .unwrap_or_default();
                sub.cells.insert(cell.clone(), attributes);
            }
        }
        sub
    }

    fn copy_node(&mut self, from: &Self, node: &N) {
        if let Some(data) = from.skeleton.node(node) {
            self.skeleton.add_node(node.clone(), data.attributes.clone());
        }
    }

    fn copy_edge(&mut self, from: &Self, edge: &Edge<N>) {
        let (u, v) = edge.endpoints();
        if let Some(attributes) = from.skeleton.edge_attributes(u, v) {
            self.copy_node(from, u);
            self.copy_node(from, v);
            self.skeleton
                .add_edge_with(u.clone(), v.clone(), attributes.clone());
        }
    }
}

impl<N: NodeId> Default for CellComplex<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> fmt::Display for CellComplex<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nodes, edges, cells) = self.shape();
        write!(f, "Cell Complex with {nodes} nodes, {edges} edges and {cells} 2-cells")?;
        if !self.config.name.is_empty() {
            write!(f, " ({})", self.config.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttrValue;
    use crate::error::Error;

    fn two_squares() -> CellComplex<i32> {
        let mut cx = CellComplex::new();
        cx.add_cell([1, 2, 3, 4], 2).unwrap();
        cx.add_cell([3, 4, 5, 6], 2).unwrap();
        cx
    }

    #[test]
    fn empty_complex() {
        let cx = CellComplex::<i32>::new();
        assert_eq!(cx.shape(), (0, 0, 0));
        assert_eq!(cx.dim(), 0);
        assert!(cx.is_regular());
    }

    #[test]
    fn dim_follows_content() {
        let mut cx = CellComplex::<i32>::new();
        cx.add_node(1);
        assert_eq!(cx.dim(), 0);
        cx.add_edge(1, 2).unwrap();
        assert_eq!(cx.dim(), 1);
        cx.add_cell([1, 2, 3], 2).unwrap();
        assert_eq!(cx.dim(), 2);
    }

    #[test]
    fn dim_ignores_cells_without_edges() {
        let mut cx = CellComplex::<i32>::new();
        cx.add_cell([1, 2, 3], 2).unwrap();
        for (u, v) in [(1, 2), (2, 3), (1, 3)] {
            assert!(cx.remove_edge(&u, &v));
        }
        assert_eq!(cx.shape(), (3, 0, 1));
        assert_eq!(cx.dim(), 0);
        assert!(cx.hodge_laplacian_matrix(1, true).is_err());
        assert!(cx.down_laplacian_matrix(2, true).is_err());
    }

    #[test]
    fn add_cell_adds_boundary() {
        let cx = two_squares();
        // 1-2 2-3 3-4 4-1 4-5 5-6 6-3, 3-4 shared
        assert_eq!(cx.shape(), (6, 7, 2));
        assert!(cx.contains_edge(&4, &1));
        assert!(cx.contains_cell([4, 3, 2, 1]));
    }

    #[test]
    fn node_rank_is_rejected() {
        let mut cx = CellComplex::<i32>::new();
        let err = cx.add_cell(vec![1], 0).unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::NodeRank));
    }

    #[test]
    fn rank_three_is_rejected() {
        let mut cx = CellComplex::<i32>::new();
        let err = cx.add_cell([1, 2, 3, 4], 3).unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::UnsupportedRank(3)));
    }

    #[test]
    fn rank_one_inserts_an_edge() {
        let mut cx = CellComplex::<i32>::new();
        let out = cx.add_cell([2, 1], 1).unwrap();
        assert_eq!(out, Insertion::Edge(Edge::new(1, 2).unwrap()));
        assert_eq!(cx.shape(), (2, 1, 0));

        let err = cx.add_cell([1, 2, 3], 1).unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::EdgeArity(3)));
        assert!(matches!(
            cx.add_cell([3, 3], 1),
            Err(Error::Validation(ValidationError::SelfLoop(_)))
        ));

        let cell = Cell::regular([1, 2, 3]).unwrap();
        let err = cx.add_cell(cell, 1).unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::CellRank(1)));
    }

    #[test]
    fn regular_complex_rejects_irregular_cell() {
        let mut cx = two_squares();
        let err = cx.add_cell([1, 2, 3, 2], 2).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::IrregularCell(_))
        ));
        assert_eq!(cx.cell_count(), 2);

        let prebuilt = Cell::irregular([7, 8, 9, 8]).unwrap();
        assert!(cx.add_cell(prebuilt, 2).is_err());
        assert_eq!(cx.shape(), (6, 7, 2));
    }

    #[test]
    fn irregular_complex_accepts_repeats() {
        let config = ComplexConfig::default().with_regular(false);
        let mut cx = CellComplex::<i32>::with_config(config);
        cx.add_cell([1, 2, 3, 2], 2).unwrap();
        assert!(!cx.is_regular());
        assert_eq!(cx.shape(), (3, 2, 1));
    }

    #[test]
    fn skeleton_check_skips_without_change() {
        let mut cx = two_squares();
        let opts = AddCellOptions::default().check_skeleton(true);
        let out = cx.add_cell_with([1, 2, 7], 2, opts).unwrap();
        assert!(out.is_skipped());
        assert_eq!(
            out,
            Insertion::Skipped(Rejection::MissingEdge(Edge::new(1, 7).unwrap()))
        );
        assert_eq!(cx.shape(), (6, 7, 2));

        let opts = AddCellOptions::default().check_skeleton(true);
        let out = cx.add_cell_with([1, 2, 3, 4], 2, opts).unwrap();
        assert!(out.cell_key().is_some());
    }

    #[test]
    fn skeleton_check_from_config() {
        let config = ComplexConfig::default().with_check_skeleton(true);
        let mut cx = CellComplex::<i32>::with_config(config);
        assert!(cx.add_cell([1, 2, 3], 2).unwrap().is_skipped());
        assert_eq!(cx.shape(), (0, 0, 0));
    }

    #[test]
    fn node_insertion_is_idempotent_and_merges() {
        let mut cx = CellComplex::<i32>::new();
        assert!(cx.add_node(1));
        let mut attrs = Attributes::default();
        attrs.insert("color".to_string(), AttrValue::from("red"));
        assert!(!cx.add_node_with(1, attrs));
        assert_eq!(cx.node_count(), 1);
        assert_eq!(
            cx.node_attributes(&1).and_then(|a| a.get("color")),
            Some(&AttrValue::from("red"))
        );
    }

    #[test]
    fn batch_insertion_reports_each_element() {
        let mut cx = CellComplex::<i32>::new();
        let results = cx.add_cells_from(vec![vec![1, 2, 3], vec![1], vec![3, 4, 5]], 2);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert_eq!(cx.cell_count(), 2);
    }

    #[test]
    fn remove_cell_keeps_edges() {
        let mut cx = two_squares();
        assert_eq!(cx.remove_cell([2, 3, 4, 1]), 1);
        assert_eq!(cx.shape(), (6, 7, 1));
        assert_eq!(cx.remove_cell([2, 3, 4, 1]), 0);
    }

    #[test]
    fn remove_single_record_of_multi_cell() {
        let mut cx = CellComplex::<i32>::new();
        let a = cx.add_cell([1, 2, 3], 2).unwrap().cell_key().unwrap();
        cx.add_cell([3, 2, 1], 2).unwrap();
        assert_eq!(cx.cell_count(), 2);
        assert_eq!(cx.remove_cell(a), 1);
        assert!(cx.contains_cell([1, 2, 3]));
        assert!(!cx.contains_cell(a));
        assert_eq!(cx.remove_cells(vec![vec![1, 2, 3], vec![7, 8, 9]]), vec![1, 0]);
    }

    #[test]
    fn equivalent_cells_collapse() {
        let mut cx = CellComplex::<i32>::new();
        cx.add_cell([1, 2, 3], 2).unwrap();
        cx.add_cell([2, 3, 1], 2).unwrap();
        cx.add_cell([3, 2, 1], 2).unwrap();
        assert_eq!(cx.remove_equivalent_cells(), 2);
        assert_eq!(cx.cell_count(), 1);
    }

    #[test]
    fn removing_an_edge_strands_cells() {
        let mut cx = two_squares();
        assert!(cx.stranded_cells().is_empty());
        assert!(cx.remove_edge(&3, &4));
        assert_eq!(cx.stranded_cells().len(), 2);
        assert_eq!(cx.cell_count(), 2);
    }

    #[test]
    fn singletons() {
        let mut cx = two_squares();
        cx.add_node(10);
        cx.add_node(11);
        let mut found = cx.singletons();
        found.sort_unstable();
        assert_eq!(found, vec![10, 11]);
        assert_eq!(cx.remove_singletons(), 2);
        assert!(cx.singletons().is_empty());
        assert_eq!(cx.node_count(), 6);
    }

    #[test]
    fn insertable_cycles() {
        let cx = two_squares();
        assert!(cx.is_insertable_cycle(&[1, 2, 3], false));
        assert!(!cx.is_insertable_cycle(&[1, 2, 3], true));
        assert!(cx.is_insertable_cycle(&[1, 2, 3, 4], true));
        assert!(!cx.is_insertable_cycle(&[1], false));
        assert!(!cx.is_insertable_cycle(&[1, 2, 3, 2], false));
        assert_eq!(
            cx.check_insertable(&[1, 2, 3], true).unwrap(),
            Some(Rejection::MissingEdge(Edge::new(1, 3).unwrap()))
        );
    }

    #[test]
    fn degree_size_neighbors() {
        let cx = two_squares();
        assert_eq!(cx.degree(&3), Some(3));
        assert_eq!(cx.degree(&42), None);
        let key = cx.cells().next().map(|(k, _)| k).unwrap();
        assert_eq!(cx.size(key), Some(4));
        let mut n: Vec<i32> = cx.neighbors(&4).unwrap().into_iter().copied().collect();
        n.sort_unstable();
        assert_eq!(n, vec![1, 3, 5]);
    }

    #[test]
    fn skeleton_is_sorted() {
        let mut cx = CellComplex::<i32>::new();
        cx.add_cell([5, 1, 3], 2).unwrap();
        let nodes = cx.skeleton(0).unwrap();
        assert_eq!(
            nodes,
            vec![Element::Node(1), Element::Node(3), Element::Node(5)]
        );
        let edges = cx.skeleton(1).unwrap();
        assert_eq!(edges[0], Element::Edge(Edge::new(1, 3).unwrap()));
        assert_eq!(cx.skeleton(2).unwrap().len(), 1);
        assert!(cx.skeleton(3).is_err());
    }

    #[test]
    fn from_items() {
        let items = vec![
            ComplexItem::Node(0),
            ComplexItem::Edge(1, 2),
            ComplexItem::Cell(vec![1, 2, 3]),
        ];
        let cx = CellComplex::from_items(items, ComplexConfig::default()).unwrap();
        assert_eq!(cx.shape(), (4, 3, 1));

        let bad = vec![ComplexItem::Edge(1, 1)];
        assert!(CellComplex::from_items(bad, ComplexConfig::default()).is_err());
    }

    #[test]
    fn from_graph() {
        let mut g = Graph::new();
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        let cx = CellComplex::from_graph(g, ComplexConfig::default());
        assert_eq!(cx.shape(), (3, 2, 0));
        assert_eq!(cx.dim(), 1);
    }

    #[test]
    fn restrict_to_nodes_keeps_contained_cells() {
        let cx = two_squares();
        let sub = cx.restrict_to_nodes(&[1, 2, 3, 4]);
        assert_eq!(sub.shape(), (4, 4, 1));
        assert!(sub.contains_cell([1, 2, 3, 4]));
    }

    #[test]
    fn restrict_to_cells_brings_boundary() {
        let cx = two_squares();
        let key = cx.cells().nth(1).map(|(k, _)| k).unwrap();
        let sub = cx.restrict_to_cells([
            Element::Cell(key),
            Element::Edge(Edge::new(1, 2).unwrap()),
            Element::Edge(Edge::new(1, 6).unwrap()),
        ]);
        assert_eq!(sub.shape(), (6, 5, 1));
        assert!(sub.contains_cell([3, 4, 5, 6]));
        assert!(!sub.contains_edge(&1, &6));
    }

    #[test]
    fn display() {
        let cx = two_squares();
        assert_eq!(
            cx.to_string(),
            "Cell Complex with 6 nodes, 7 edges and 2 2-cells"
        );
        let named = CellComplex::<i32>::with_config(ComplexConfig::default().with_name("mesh"));
        assert_eq!(
            named.to_string(),
            "Cell Complex with 0 nodes, 0 edges and 0 2-cells (mesh)"
        );
    }
}
