// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CellPlex
//!
//! Regular and non-regular 2-dimensional cell complexes.
//!
//! A complex is made of nodes, edges and polygonal 2-cells glued along
//! closed walks of edges. The [`CellComplex`] container validates every
//! insertion against its 1-skeleton and regularity setting, and derives
//! the algebraic operators used for spectral and combinatorial analysis:
//! signed incidence matrices, up/down/Hodge Laplacians, adjacency and
//! coadjacency matrices, k-hop operators, and s-connectivity queries.
//!
//! Operators are returned as `nalgebra-sparse` CSR matrices whose rows and
//! columns follow a documented basis order (see [`operators`]).
//!
//! ```
//! use cellplex::CellComplex;
//!
//! let mut cx = CellComplex::<u32>::new();
//! cx.add_cell([1, 2, 3], 2).unwrap();
//!
//! let b1 = cx.incidence_matrix(1, true).unwrap();
//! let b2 = cx.incidence_matrix(2, true).unwrap();
//! let boundary_of_boundary = cellplex::sparse::prune_zeros(&(&b1 * &b2));
//! assert_eq!(boundary_of_boundary.nnz(), 0);
//! ```

pub mod attributes;
pub mod cell;
pub mod complex;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod graph;
pub mod keys;
pub mod operators;
pub mod registry;
pub mod serialization;
pub mod sparse;

pub use attributes::{AttrValue, Attributes};
pub use cell::{BoundaryKey, Cell};
pub use complex::{
    AddCellOptions, CellComplex, CellInput, CellRef, ComplexItem, Insertion, Rejection,
};
pub use config::{ComplexConfig, Weighting};
pub use connectivity::{Diameters, Distance, Locality};
pub use error::{Error, Result, ValidationError};
pub use graph::Graph;
pub use keys::{CellKey, Edge, EdgeKey, Element, NodeId, NodeKey, Rank};
pub use nalgebra_sparse::CsrMatrix;
pub use operators::{BasisIndex, IndexedMatrix};
pub use registry::{CellRecord, CellRegistry};
pub use serialization::ComplexSnapshot;
