// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Algebraic operators derived from a cell complex.
//!
//! All operators are rebuilt from the current state on every call and
//! returned as owned sparse matrices. Rows and columns follow the basis
//! order of [`CellComplex::basis`]:
//!
//! - rank 0: nodes in ascending order,
//! - rank 1: canonical edges in ascending order,
//! - rank 2: 2-cell records in insertion order.
//!
//! Edges are oriented from their smaller to their larger endpoint. A 2-cell
//! contributes `+1` each time its walk traverses an edge in that direction
//! and `-1` otherwise, so non-regular walks accumulate.

use nalgebra::linalg::SymmetricEigen;
use nalgebra_sparse::CsrMatrix;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::complex::CellComplex;
use crate::error::{Result, ValidationError};
use crate::keys::{Edge, Element, NodeId, Rank};
use crate::sparse;

/// Basis of one rank: the element behind each row or column.
#[derive(Debug, Clone)]
pub struct BasisIndex<N> {
    elements: Vec<Element<N>>,
    positions: FxHashMap<Element<N>, usize>,
}

impl<N: NodeId> BasisIndex<N> {
    pub fn new(elements: Vec<Element<N>>) -> Self {
        let positions = elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.clone(), i))
            .collect();
        Self {
            elements,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element<N>] {
        &self.elements
    }

    /// Row/column of an element.
    pub fn position(&self, element: &Element<N>) -> Option<usize> {
        self.positions.get(element).copied()
    }

    /// Element at a row/column.
    pub fn get(&self, index: usize) -> Option<&Element<N>> {
        self.elements.get(index)
    }
}

/// An operator together with the bases of its rows and columns.
#[derive(Debug, Clone)]
pub struct IndexedMatrix<N> {
    pub rows: BasisIndex<N>,
    pub cols: BasisIndex<N>,
    pub matrix: CsrMatrix<f64>,
}

impl<N: NodeId> CellComplex<N> {
    /// Returns the basis of one rank.
    pub fn basis(&self, rank: usize) -> Result<BasisIndex<N>> {
        Ok(BasisIndex::new(self.skeleton(rank)?))
    }

    // ========================================================================
    // Incidence
    // ========================================================================

    /// Boundary operator from rank `rank` to rank `rank - 1`, with bases.
    ///
    /// Rank 0 maps every node to the empty cell: a single all-ones row whose
    /// row basis is empty.
    pub fn incidence_matrix_indexed(&self, rank: usize, signed: bool) -> Result<IndexedMatrix<N>> {
        let indexed = match Rank::try_from(rank)? {
            Rank::Node => {
                let cols = self.basis(0)?;
                let ones = (0..cols.len()).map(|j| (0, j, 1.0));
                let matrix = sparse::from_triplets(1, cols.len(), ones);
                IndexedMatrix {
                    rows: BasisIndex::new(Vec::new()),
                    cols,
                    matrix,
                }
            }
            Rank::Edge => {
                let rows = self.basis(0)?;
                let cols = self.basis(1)?;
                let mut triplets = Vec::with_capacity(2 * cols.len());
                for (j, element) in cols.elements().iter().enumerate() {
                    let Some(edge) = element.as_edge() else { continue };
                    let (lo, hi) = edge.endpoints();
                    let lo_row = position(&rows, Element::Node(lo.clone()))?;
                    let hi_row = position(&rows, Element::Node(hi.clone()))?;
                    triplets.push((lo_row, j, -1.0));
                    triplets.push((hi_row, j, 1.0));
                }
                let matrix = sparse::from_triplets(rows.len(), cols.len(), triplets);
                IndexedMatrix { rows, cols, matrix }
            }
            Rank::Cell => {
                let rows = self.basis(1)?;
                let cols = self.basis(2)?;
                let mut triplets = Vec::new();
                for (j, (key, cell)) in self.cells.iter().enumerate() {
                    for (u, v) in cell.boundary() {
                        let edge = Edge::new(u.clone(), v.clone())?;
                        let Some(i) = rows.position(&Element::Edge(edge.clone())) else {
                            return Err(ValidationError::StrandedCell {
                                cell: key,
                                edge: format!("{edge:?}"),
                            }
                            .into());
                        };
                        triplets.push((i, j, Edge::orientation(u, v)));
                    }
                }
                let summed = sparse::from_triplets(rows.len(), cols.len(), triplets);
                let matrix = sparse::prune_zeros(&summed);
                IndexedMatrix { rows, cols, matrix }
            }
        };

        debug!(
            rank,
            rows = indexed.matrix.nrows(),
            cols = indexed.matrix.ncols(),
            nnz = indexed.matrix.nnz(),
            "incidence matrix built"
        );

        Ok(if signed {
            indexed
        } else {
            IndexedMatrix {
                matrix: sparse::abs(&indexed.matrix),
                ..indexed
            }
        })
    }

    /// Boundary operator from rank `rank` to rank `rank - 1`.
    pub fn incidence_matrix(&self, rank: usize, signed: bool) -> Result<CsrMatrix<f64>> {
        Ok(self.incidence_matrix_indexed(rank, signed)?.matrix)
    }

    /// Transpose of the incidence matrix.
    pub fn coincidence_matrix(&self, rank: usize, signed: bool) -> Result<CsrMatrix<f64>> {
        Ok(self.incidence_matrix(rank, signed)?.transpose())
    }

    // ========================================================================
    // Laplacians
    // ========================================================================

    fn check_up(&self, operator: &'static str, rank: usize) -> Result<()> {
        let dim = self.dim();
        if rank == 0 || rank < dim {
            Ok(())
        } else {
            Err(ValidationError::RankOutOfRange {
                operator,
                rank,
                min: 0,
                max: dim.saturating_sub(1),
            }
            .into())
        }
    }

    fn check_down(&self, operator: &'static str, rank: usize) -> Result<()> {
        let dim = self.dim();
        if rank > 0 && rank <= dim {
            Ok(())
        } else {
            Err(ValidationError::RankOutOfRange {
                operator,
                rank,
                min: 1,
                max: dim,
            }
            .into())
        }
    }

    fn finish(laplacian: CsrMatrix<f64>, signed: bool) -> CsrMatrix<f64> {
        let laplacian = sparse::prune_zeros(&laplacian);
        if signed {
            laplacian
        } else {
            sparse::abs(&laplacian)
        }
    }

    /// `B_{r+1} B_{r+1}^T`. Defined for rank 0 and every rank below `dim`.
    pub fn up_laplacian_matrix(&self, rank: usize, signed: bool) -> Result<CsrMatrix<f64>> {
        self.check_up("up Laplacian", rank)?;
        let b = self.incidence_matrix(rank + 1, true)?;
        Ok(Self::finish(&b * &b.transpose(), signed))
    }

    /// `B_r^T B_r`. Defined for ranks `1..=dim`.
    pub fn down_laplacian_matrix(&self, rank: usize, signed: bool) -> Result<CsrMatrix<f64>> {
        self.check_down("down Laplacian", rank)?;
        let b = self.incidence_matrix(rank, true)?;
        Ok(Self::finish(&b.transpose() * &b, signed))
    }

    /// Sum of the up and down Laplacians that exist at this rank.
    pub fn hodge_laplacian_matrix(&self, rank: usize, signed: bool) -> Result<CsrMatrix<f64>> {
        let dim = self.dim();
        if rank > dim {
            return Err(ValidationError::RankOutOfRange {
                operator: "Hodge Laplacian",
                rank,
                min: 0,
                max: dim,
            }
            .into());
        }
        if rank == 0 {
            self.up_laplacian_matrix(rank, signed)
        } else if rank == dim {
            self.down_laplacian_matrix(rank, signed)
        } else {
            let up = self.up_laplacian_matrix(rank, true)?;
            let down = self.down_laplacian_matrix(rank, true)?;
            Ok(Self::finish(&up + &down, signed))
        }
    }

    /// Ascending eigenvalues of the signed Hodge Laplacian.
    pub fn hodge_spectrum(&self, rank: usize) -> Result<Vec<f64>> {
        let laplacian = self.hodge_laplacian_matrix(rank, true)?;
        if laplacian.nrows() == 0 {
            return Ok(Vec::new());
        }
        let eigen = SymmetricEigen::new(sparse::to_dense(&laplacian));
        let mut values: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
        values.sort_by(f64::total_cmp);
        Ok(values)
    }

    // ========================================================================
    // Adjacency
    // ========================================================================

    /// Cells of one rank adjacent through a shared cell of rank `rank + 1`:
    /// the up Laplacian without its diagonal.
    ///
    /// The unsigned variant is `|B_{r+1}| |B_{r+1}|^T`, so opposite
    /// orientations on a shared coface add up instead of cancelling.
    pub fn adjacency_matrix(&self, rank: usize, signed: bool) -> Result<CsrMatrix<f64>> {
        if signed {
            let laplacian = self.up_laplacian_matrix(rank, true)?;
            return Ok(sparse::zero_diagonal(&laplacian));
        }
        self.check_up("adjacency", rank)?;
        let b = self.incidence_matrix(rank + 1, false)?;
        Ok(sparse::zero_diagonal(&(&b * &b.transpose())))
    }

    pub fn adjacency_matrix_indexed(&self, rank: usize, signed: bool) -> Result<IndexedMatrix<N>> {
        let matrix = self.adjacency_matrix(rank, signed)?;
        let basis = self.basis(rank)?;
        Ok(IndexedMatrix {
            rows: basis.clone(),
            cols: basis,
            matrix,
        })
    }

    /// Cells of one rank adjacent through a shared face of rank `rank - 1`:
    /// the down Laplacian without its diagonal. Unsigned is `|B_r|^T |B_r|`.
    pub fn coadjacency_matrix(&self, rank: usize, signed: bool) -> Result<CsrMatrix<f64>> {
        if signed {
            let laplacian = self.down_laplacian_matrix(rank, true)?;
            return Ok(sparse::zero_diagonal(&laplacian));
        }
        self.check_down("coadjacency", rank)?;
        let b = self.incidence_matrix(rank, false)?;
        Ok(sparse::zero_diagonal(&(&b.transpose() * &b)))
    }

    // ========================================================================
    // k-hop operators
    // ========================================================================

    /// `B_r A_r^k + B_r coA_r^k`, keeping only the terms defined at this rank.
    pub fn k_hop_incidence_matrix(&self, rank: usize, k: u32) -> Result<CsrMatrix<f64>> {
        let incidence = self.incidence_matrix(rank, true)?;
        let (adjacency, coadjacency) = self.hop_terms(rank, k)?;
        let mut result = CsrMatrix::zeros(incidence.nrows(), incidence.ncols());
        if let Some(a) = adjacency {
            result = &result + &(&incidence * &a);
        }
        if let Some(c) = coadjacency {
            result = &result + &(&incidence * &c);
        }
        Ok(sparse::prune_zeros(&result))
    }

    /// `A_r^k B_r^T + coA_r^k B_r^T`, keeping only the terms defined at this rank.
    pub fn k_hop_coincidence_matrix(&self, rank: usize, k: u32) -> Result<CsrMatrix<f64>> {
        let coincidence = self.coincidence_matrix(rank, true)?;
        let (adjacency, coadjacency) = self.hop_terms(rank, k)?;
        let mut result = CsrMatrix::zeros(coincidence.nrows(), coincidence.ncols());
        if let Some(a) = adjacency {
            result = &result + &(&a * &coincidence);
        }
        if let Some(c) = coadjacency {
            result = &result + &(&c * &coincidence);
        }
        Ok(sparse::prune_zeros(&result))
    }

    /// k-th powers of the signed adjacency and coadjacency at `rank`.
    #[allow(clippy::type_complexity)]
    fn hop_terms(
        &self,
        rank: usize,
        k: u32,
    ) -> Result<(Option<CsrMatrix<f64>>, Option<CsrMatrix<f64>>)> {
        let dim = self.dim();
        if rank > dim {
            return Err(ValidationError::RankOutOfRange {
                operator: "k-hop operator",
                rank,
                min: 0,
                max: dim,
            }
            .into());
        }
        let adjacency = if rank == 0 || rank < dim {
            Some(sparse::power(&self.adjacency_matrix(rank, true)?, k))
        } else {
            None
        };
        let coadjacency = if rank > 0 {
            Some(sparse::power(&self.coadjacency_matrix(rank, true)?, k))
        } else {
            None
        };
        Ok((adjacency, coadjacency))
    }
}

fn position<N: NodeId>(basis: &BasisIndex<N>, element: Element<N>) -> Result<usize> {
    basis
        .position(&element)
        .ok_or_else(|| ValidationError::UnknownElement(format!("{element:?}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComplexConfig;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn dense(m: &CsrMatrix<f64>) -> DMatrix<f64> {
        sparse::to_dense(m)
    }

    fn triangle() -> CellComplex<i32> {
        let mut cx = CellComplex::new();
        cx.add_cell([1, 2, 3], 2).unwrap();
        cx
    }

    #[test]
    fn basis_positions() {
        let cx = triangle();
        let b = cx.basis(1).unwrap();
        assert_eq!(b.len(), 3);
        assert_eq!(
            b.position(&Element::Edge(Edge::new(2, 3).unwrap())),
            Some(2)
        );
        assert_eq!(b.get(0), Some(&Element::Edge(Edge::new(1, 2).unwrap())));
        assert!(cx.basis(3).is_err());
    }

    #[test]
    fn rank_zero_incidence_is_a_row_of_ones() {
        let cx = triangle();
        let b0 = cx.incidence_matrix_indexed(0, true).unwrap();
        assert!(b0.rows.is_empty());
        assert_eq!(dense(&b0.matrix), DMatrix::from_element(1, 3, 1.0));
    }

    #[test]
    fn rank_one_incidence_signs() {
        let cx = triangle();
        let b1 = dense(&cx.incidence_matrix(1, true).unwrap());
        // columns: (1,2) (1,3) (2,3)
        let expected = DMatrix::from_row_slice(
            3,
            3,
            &[
                -1.0, -1.0, 0.0, //
                1.0, 0.0, -1.0, //
                0.0, 1.0, 1.0,
            ],
        );
        assert_eq!(b1, expected);
    }

    #[test]
    fn rank_two_incidence_follows_walk() {
        let cx = triangle();
        let b2 = dense(&cx.incidence_matrix(2, true).unwrap());
        // 1→2 forward, 2→3 forward, 3→1 against (1,3)
        assert_eq!(b2, DMatrix::from_column_slice(3, 1, &[1.0, -1.0, 1.0]));

        let unsigned = dense(&cx.incidence_matrix(2, false).unwrap());
        assert_eq!(unsigned, DMatrix::from_element(3, 1, 1.0));
    }

    #[test]
    fn boundary_of_boundary_vanishes() {
        let cx = triangle();
        let b1 = cx.incidence_matrix(1, true).unwrap();
        let b2 = cx.incidence_matrix(2, true).unwrap();
        assert_eq!(sparse::prune_zeros(&(&b1 * &b2)).nnz(), 0);
    }

    #[test]
    fn stranded_cells_block_rank_two() {
        let mut cx = triangle();
        cx.remove_edge(&1, &3);
        let err = cx.incidence_matrix(2, true).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::StrandedCell { .. })
        ));
    }

    #[test]
    fn coincidence_is_transpose() {
        let cx = triangle();
        let b = dense(&cx.incidence_matrix(1, true).unwrap());
        let c = dense(&cx.coincidence_matrix(1, true).unwrap());
        assert_eq!(b.transpose(), c);
    }

    #[test]
    fn laplacian_rank_bounds() {
        let cx = triangle();
        assert!(cx.up_laplacian_matrix(0, true).is_ok());
        assert!(cx.up_laplacian_matrix(1, true).is_ok());
        assert!(cx.up_laplacian_matrix(2, true).is_err());
        assert!(cx.down_laplacian_matrix(0, true).is_err());
        assert!(cx.down_laplacian_matrix(2, true).is_ok());
        assert!(cx.hodge_laplacian_matrix(3, true).is_err());

        let mut graph_only = CellComplex::<i32>::new();
        graph_only.add_edge(1, 2).unwrap();
        let err = graph_only.up_laplacian_matrix(1, true).unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::RankOutOfRange {
                operator: "up Laplacian",
                rank: 1,
                min: 0,
                max: 0,
            })
        );
    }

    #[test]
    fn graph_laplacian() {
        let cx = triangle();
        let l0 = dense(&cx.hodge_laplacian_matrix(0, true).unwrap());
        let expected = DMatrix::from_row_slice(
            3,
            3,
            &[
                2.0, -1.0, -1.0, //
                -1.0, 2.0, -1.0, //
                -1.0, -1.0, 2.0,
            ],
        );
        assert_eq!(l0, expected);
    }

    #[test]
    fn hodge_is_up_plus_down_in_between() {
        let cx = triangle();
        let up = dense(&cx.up_laplacian_matrix(1, true).unwrap());
        let down = dense(&cx.down_laplacian_matrix(1, true).unwrap());
        let hodge = dense(&cx.hodge_laplacian_matrix(1, true).unwrap());
        assert_eq!(hodge, up + down);
    }

    #[test]
    fn adjacency_has_zero_diagonal() {
        let cx = triangle();
        let a = dense(&cx.adjacency_matrix(0, false).unwrap());
        let expected = DMatrix::from_row_slice(
            3,
            3,
            &[
                0.0, 1.0, 1.0, //
                1.0, 0.0, 1.0, //
                1.0, 1.0, 0.0,
            ],
        );
        assert_eq!(a, expected);

        let indexed = cx.adjacency_matrix_indexed(1, true).unwrap();
        assert_eq!(indexed.rows.len(), 3);
        assert!(sparse::is_symmetric(&indexed.matrix, 1e-12));
        for i in 0..3 {
            assert_eq!(dense(&indexed.matrix)[(i, i)], 0.0);
        }
    }

    #[test]
    fn coadjacency_of_edges() {
        let cx = triangle();
        let co = dense(&cx.coadjacency_matrix(1, false).unwrap());
        // every pair of triangle edges shares a node
        assert_eq!(co.iter().filter(|&&v| v == 1.0).count(), 6);
        assert!(cx.coadjacency_matrix(0, true).is_err());
    }

    #[test]
    fn unsigned_adjacency_counts_opposite_orientations() {
        // both squares contain 1-2 and 3-4, traversed 3→4 in one and 4→3 in the other
        let mut cx = CellComplex::<i32>::new();
        cx.add_cell([1, 2, 3, 4], 2).unwrap();
        cx.add_cell([1, 2, 4, 3], 2).unwrap();

        let a1 = cx.adjacency_matrix_indexed(1, false).unwrap();
        let i = a1.rows.position(&Element::Edge(Edge::new(1, 2).unwrap())).unwrap();
        let j = a1.rows.position(&Element::Edge(Edge::new(3, 4).unwrap())).unwrap();
        assert_eq!(dense(&a1.matrix)[(i, j)], 2.0);
        let signed = dense(&cx.adjacency_matrix(1, true).unwrap());
        assert_eq!(signed[(i, j)], 0.0);

        let co2 = dense(&cx.coadjacency_matrix(2, false).unwrap());
        assert_eq!(co2[(0, 1)], 2.0);
        assert_eq!(co2[(1, 0)], 2.0);
        assert_eq!(co2[(0, 0)], 0.0);
    }

    #[test]
    fn k_hop_shapes() {
        let mut cx = triangle();
        cx.add_cell([2, 3, 4], 2).unwrap();
        // 4 nodes, 5 edges, 2 cells
        let h0 = cx.k_hop_incidence_matrix(0, 2).unwrap();
        assert_eq!((h0.nrows(), h0.ncols()), (1, 4));
        let h1 = cx.k_hop_incidence_matrix(1, 2).unwrap();
        assert_eq!((h1.nrows(), h1.ncols()), (4, 5));
        let h2 = cx.k_hop_incidence_matrix(2, 1).unwrap();
        assert_eq!((h2.nrows(), h2.ncols()), (5, 2));
        let c1 = cx.k_hop_coincidence_matrix(1, 2).unwrap();
        assert_eq!((c1.nrows(), c1.ncols()), (5, 4));
        assert!(cx.k_hop_incidence_matrix(3, 1).is_err());
    }

    #[test]
    fn zero_hops_reduce_to_incidence() {
        let cx = triangle();
        let b2 = dense(&cx.incidence_matrix(2, true).unwrap());
        let h = dense(&cx.k_hop_incidence_matrix(2, 0).unwrap());
        assert_eq!(h, b2);
    }

    #[test]
    fn spectrum_of_triangle_graph() {
        let cx = triangle();
        let spectrum = cx.hodge_spectrum(0).unwrap();
        assert_eq!(spectrum.len(), 3);
        assert_relative_eq!(spectrum[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(spectrum[1], 3.0, epsilon = 1e-9);
        assert_relative_eq!(spectrum[2], 3.0, epsilon = 1e-9);
        assert!(CellComplex::<i32>::new().hodge_spectrum(0).unwrap().is_empty());
    }

    #[test]
    fn non_regular_walks_accumulate() {
        let config = ComplexConfig::default().with_regular(false);
        let mut cx = CellComplex::<i32>::with_config(config);
        cx.add_cell([1, 2, 3, 2], 2).unwrap();
        let b2 = cx.incidence_matrix(2, true).unwrap();
        assert_eq!(b2.ncols(), 1);
        assert_eq!(b2.nnz(), 0);
    }
}
