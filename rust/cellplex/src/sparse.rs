// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Small helpers over `nalgebra-sparse` CSR matrices.
//!
//! Products of signed operators can cancel to explicit zeros; functions
//! that filter entries rebuild the matrix through a COO triplet list so the
//! result stores only what it should.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Builds a CSR matrix from `(row, col, value)` triplets, summing duplicates.
pub fn from_triplets(
    nrows: usize,
    ncols: usize,
    triplets: impl IntoIterator<Item = (usize, usize, f64)>,
) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(nrows, ncols);
    for (i, j, v) in triplets {
        coo.push(i, j, v);
    }
    CsrMatrix::from(&coo)
}

fn filtered(m: &CsrMatrix<f64>, keep: impl Fn(usize, usize, f64) -> bool) -> CsrMatrix<f64> {
    from_triplets(
        m.nrows(),
        m.ncols(),
        m.triplet_iter()
            .filter(|&(i, j, &v)| keep(i, j, v))
            .map(|(i, j, &v)| (i, j, v)),
    )
}

/// Element-wise absolute value.
pub fn abs(m: &CsrMatrix<f64>) -> CsrMatrix<f64> {
    let mut out = m.clone();
    for v in out.values_mut() {
        *v = v.abs();
    }
    out
}

/// Drops stored zeros.
pub fn prune_zeros(m: &CsrMatrix<f64>) -> CsrMatrix<f64> {
    filtered(m, |_, _, v| v != 0.0)
}

/// Drops the diagonal and any stored zeros.
pub fn zero_diagonal(m: &CsrMatrix<f64>) -> CsrMatrix<f64> {
    filtered(m, |i, j, v| i != j && v != 0.0)
}

/// Keeps entries whose value is at least `min`.
pub fn threshold(m: &CsrMatrix<f64>, min: f64) -> CsrMatrix<f64> {
    filtered(m, |_, _, v| v >= min)
}

/// Matrix power `m^k` of a square matrix; `m^0` is the identity.
pub fn power(m: &CsrMatrix<f64>, k: u32) -> CsrMatrix<f64> {
    let mut result = CsrMatrix::identity(m.nrows());
    for _ in 0..k {
        result = prune_zeros(&(&result * m));
    }
    result
}

/// Returns `true` if `m` equals its transpose within `eps`.
pub fn is_symmetric(m: &CsrMatrix<f64>, eps: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let diff = prune_zeros(&(m - &m.transpose()));
    diff.values().iter().all(|v| v.abs() <= eps)
}

/// Converts to a dense matrix.
pub fn to_dense(m: &CsrMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from(m)
}
