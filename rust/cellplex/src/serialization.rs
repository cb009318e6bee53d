// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON serialization for cell complexes.
//!
//! Nodes get sequential integer ids in the snapshot; edges and 2-cells refer
//! to nodes by those ids. 2-cells keep their boundary walk and are listed in
//! insertion order, so operators built from a restored complex have the same
//! basis order. Record keys are not preserved.

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::cell::Cell;
use crate::complex::CellComplex;
use crate::config::ComplexConfig;
use crate::error::{Error, Result, ValidationError};
use crate::keys::NodeId;

/// Serializable representation of a complete cell complex.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "N: Deserialize<'de>"))]
pub struct ComplexSnapshot<N> {
    pub config: ComplexConfig,
    pub nodes: Vec<NodeSnapshot<N>>,
    pub edges: Vec<EdgeSnapshot>,
    pub cells: Vec<CellSnapshot>,
    /// Nodes referenced only by stranded cells; not part of the skeleton.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detached: Vec<NodeSnapshot<N>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeSnapshot<N> {
    pub id: usize,
    pub node: N,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Boundary walk as node ids, in the original order.
    pub nodes: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

fn non_empty(attributes: &Attributes) -> Option<Attributes> {
    (!attributes.is_empty()).then(|| attributes.clone())
}

impl<N: NodeId> CellComplex<N> {
    /// Creates a serializable snapshot of the complex.
    pub fn snapshot(&self) -> ComplexSnapshot<N> {
        let mut node_ids: FxHashMap<&N, usize> = FxHashMap::default();

        let nodes: Vec<NodeSnapshot<N>> = self
            .sorted_nodes()
            .into_iter()
            .enumerate()
            .map(|(i, node)| NodeSnapshot {
                id: i,
                attributes: self.node_attributes(&node).and_then(non_empty),
                node,
            })
            .collect();
        for snapshot in &nodes {
            node_ids.insert(&snapshot.node, snapshot.id);
        }

        let edges = self
            .sorted_edges()
            .into_iter()
            .map(|edge| EdgeSnapshot {
                start: node_ids[edge.lo()],
                end: node_ids[edge.hi()],
                attributes: self.edge_attributes(&edge).and_then(non_empty),
            })
            .collect();

        // Nodes of stranded cells may be gone from the skeleton; they get
        // fresh ids past the skeleton nodes.
        let mut detached: Vec<NodeSnapshot<N>> = Vec::new();
        let mut cells = Vec::with_capacity(self.cell_count());
        for (key, cell) in self.cells() {
            let ids = cell
                .nodes()
                .iter()
                .map(|n| match node_ids.get(n) {
                    Some(&id) => id,
                    None => {
                        let id = nodes.len() + detached.len();
                        detached.push(NodeSnapshot {
                            id,
                            node: n.clone(),
                            attributes: None,
                        });
                        node_ids.insert(n, id);
                        id
                    }
                })
                .collect();
            cells.push(CellSnapshot {
                nodes: ids,
                attributes: self.cell_attributes(key).and_then(non_empty),
            });
        }

        ComplexSnapshot {
            config: self.config.clone(),
            nodes,
            edges,
            cells,
            detached,
            attributes: non_empty(&self.attributes),
        }
    }

    /// Rebuilds a complex from a snapshot.
    ///
    /// Cells are restored as recorded, without the regularity or skeleton
    /// checks of insertion, so stranded cells survive the round trip.
    pub fn from_snapshot(snapshot: ComplexSnapshot<N>) -> Result<Self> {
        let mut complex = Self::with_config(snapshot.config);
        let mut by_id: FxHashMap<usize, N> = FxHashMap::default();

        for node in snapshot.nodes {
            by_id.insert(node.id, node.node.clone());
            complex.add_node_with(node.node, node.attributes.unwrap_or_default());
        }
        for node in snapshot.detached {
            by_id.insert(node.id, node.node);
        }

        let lookup = |id: usize| {
            by_id
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::Serialization(format!("unknown node id {id}")))
        };

        for edge in snapshot.edges {
            complex.add_edge_with(
                lookup(edge.start)?,
                lookup(edge.end)?,
                edge.attributes.unwrap_or_default(),
            )?;
        }

        for cell in snapshot.cells {
            let nodes = cell
                .nodes
                .iter()
                .map(|&id| lookup(id))
                .collect::<Result<Vec<N>>>()?;
            let cell_value = Cell::irregular(nodes)?;
            if complex.config.regular {
                if let Some(node) = cell_value.repeated_node() {
                    return Err(ValidationError::IrregularCell(format!("{node:?}")).into());
                }
            }
            complex
                .cells
                .insert(cell_value, cell.attributes.unwrap_or_default());
        }

        complex.attributes = snapshot.attributes.unwrap_or_default();
        Ok(complex)
    }

    /// Serializes the complex to a JSON string.
    pub fn to_json(&self) -> Result<String>
    where
        N: Serialize,
    {
        let snapshot = self.snapshot();
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserializes a complex from a JSON string.
    pub fn from_json(json: &str) -> Result<Self>
    where
        N: DeserializeOwned,
    {
        let snapshot: ComplexSnapshot<N> =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }
}
