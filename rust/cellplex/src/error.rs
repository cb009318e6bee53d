// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for cell complex operations.

use crate::keys::CellKey;

/// Result type alias for cell complex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a cell complex.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A structural invariant was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A connectivity-dependent query ran on a disconnected derived graph.
    #[error("cell complex is not {s}-connected")]
    NotConnected { s: usize },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns the validation error if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` if this error reports a disconnected complex.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Error::NotConnected { .. })
    }
}

/// Structural invariant violations. Raised at the point of violation and
/// never retried internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Only ranks 0, 1 and 2 exist in a 2-dimensional cell complex.
    #[error("only ranks 0, 1 and 2 are supported, got {0}")]
    UnsupportedRank(usize),

    /// Rank-0 insertion goes through the node API.
    #[error("use add_node to insert nodes or zero ranked cells")]
    NodeRank,

    /// The operator is not defined at this rank for the current dimension.
    #[error("{operator} is defined for ranks {min}..={max} of this complex, got {rank}")]
    RankOutOfRange {
        operator: &'static str,
        rank: usize,
        min: usize,
        max: usize,
    },

    /// A 2-cell needs at least two boundary nodes.
    #[error("a 2-cell needs at least 2 nodes, got {0}")]
    TooFewNodes(usize),

    /// Two consecutive boundary nodes coincide, or an edge joins a node to itself.
    #[error("self-loops are not allowed (node {0})")]
    SelfLoop(String),

    /// The boundary walk does not span enough distinct edges.
    #[error("a 2-cell boundary must span at least 2 distinct edges, got {0}")]
    DegenerateBoundary(usize),

    /// A node repeats in a cell that must be regular.
    #[error("node {0} repeats on the boundary, which violates the regularity condition")]
    IrregularCell(String),

    /// An edge was given with the wrong number of endpoints.
    #[error("an edge needs exactly 2 nodes, got {0}")]
    EdgeArity(usize),

    /// A prebuilt `Cell` was inserted under a rank other than 2.
    #[error("cell values are always rank 2, got rank {0}")]
    CellRank(usize),

    /// A 2-cell references a boundary edge that is no longer in the skeleton.
    #[error("cell {cell:?} references edge {edge} missing from the 1-skeleton")]
    StrandedCell { cell: CellKey, edge: String },

    /// A node lookup failed.
    #[error("node {0} is not in the cell complex")]
    UnknownNode(String),

    /// A basis element lookup failed.
    #[error("element {0} is not in the cell complex")]
    UnknownElement(String),

    /// s-adjacency needs at least one shared element.
    #[error("s must be at least 1")]
    ZeroLocality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_convert() {
        let err: Error = ValidationError::UnsupportedRank(3).into();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::UnsupportedRank(3))
        );
        assert!(!err.is_not_connected());
        assert_eq!(err.to_string(), "only ranks 0, 1 and 2 are supported, got 3");
    }

    #[test]
    fn not_connected_message() {
        let err = Error::NotConnected { s: 2 };
        assert!(err.is_not_connected());
        assert!(err.as_validation().is_none());
        assert_eq!(err.to_string(), "cell complex is not 2-connected");
    }
}
