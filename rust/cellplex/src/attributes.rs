// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed key-value metadata that can be attached to nodes, edges, 2-cells
//! and the complex itself.
//!
//! Setters skip targets that are not in the complex and report how many
//! targets they touched instead of failing.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::complex::{CellComplex, CellRef};
use crate::error::Result;
use crate::keys::{CellKey, Edge, Element, NodeId, Rank};

/// A typed value stored in an attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<AttrValue>),
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Double(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(v: Vec<T>) -> Self {
        AttrValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// An attribute map attached to one entity.
pub type Attributes = FxHashMap<String, AttrValue>;

impl<N: NodeId> CellComplex<N> {
    // ========================================================================
    // Nodes
    // ========================================================================

    /// Sets one attribute of a node. Returns `false` if the node is unknown.
    pub fn set_node_attribute(
        &mut self,
        node: &N,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> bool {
        match self.skeleton.node_mut(node) {
            Some(data) => {
                data.attributes.insert(name.to_string(), value.into());
                true
            }
            None => {
                warn!(?node, attribute = name, "set_node_attribute: unknown node");
                false
            }
        }
    }

    /// Sets attribute `name` on several nodes. Returns how many existed.
    pub fn set_node_attributes(
        &mut self,
        values: impl IntoIterator<Item = (N, AttrValue)>,
        name: &str,
    ) -> usize {
        values
            .into_iter()
            .filter(|(node, value)| self.set_node_attribute(node, name, value.clone()))
            .count()
    }

    /// Merges whole attribute maps into nodes. Returns how many existed.
    pub fn update_node_attributes(
        &mut self,
        updates: impl IntoIterator<Item = (N, Attributes)>,
    ) -> usize {
        let mut touched = 0;
        for (node, attributes) in updates {
            match self.skeleton.node_mut(&node) {
                Some(data) => {
                    data.attributes.extend(attributes);
                    touched += 1;
                }
                None => warn!(?node, "update_node_attributes: unknown node"),
            }
        }
        touched
    }

    /// Collects attribute `name` from every node that has it.
    pub fn get_node_attributes(&self, name: &str) -> FxHashMap<N, AttrValue> {
        self.skeleton
            .nodes()
            .filter_map(|n| {
                let value = self.skeleton.node(n)?.attributes.get(name)?;
                Some((n.clone(), value.clone()))
            })
            .collect()
    }

    pub fn node_attributes(&self, node: &N) -> Option<&Attributes> {
        self.skeleton.node(node).map(|n| &n.attributes)
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Sets one attribute of an edge. Returns `false` if the edge is unknown.
    pub fn set_edge_attribute(
        &mut self,
        edge: &Edge<N>,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> bool {
        let (u, v) = edge.endpoints();
        match self.skeleton.edge_attributes_mut(u, v) {
            Some(attributes) => {
                attributes.insert(name.to_string(), value.into());
                true
            }
            None => {
                warn!(?edge, attribute = name, "set_edge_attribute: unknown edge");
                false
            }
        }
    }

    pub fn set_edge_attributes(
        &mut self,
        values: impl IntoIterator<Item = (Edge<N>, AttrValue)>,
        name: &str,
    ) -> usize {
        values
            .into_iter()
            .filter(|(edge, value)| self.set_edge_attribute(edge, name, value.clone()))
            .count()
    }

    pub fn update_edge_attributes(
        &mut self,
        updates: impl IntoIterator<Item = (Edge<N>, Attributes)>,
    ) -> usize {
        let mut touched = 0;
        for (edge, attributes) in updates {
            let (u, v) = edge.endpoints();
            match self.skeleton.edge_attributes_mut(u, v) {
                Some(existing) => {
                    existing.extend(attributes);
                    touched += 1;
                }
                None => warn!(?edge, "update_edge_attributes: unknown edge"),
            }
        }
        touched
    }

    pub fn get_edge_attributes(&self, name: &str) -> FxHashMap<Edge<N>, AttrValue> {
        self.edges()
            .filter_map(|e| {
                let value = self.edge_attributes(&e)?.get(name)?.clone();
                Some((e, value))
            })
            .collect()
    }

    pub fn edge_attributes(&self, edge: &Edge<N>) -> Option<&Attributes> {
        let (u, v) = edge.endpoints();
        self.skeleton.edge_attributes(u, v)
    }

    // ========================================================================
    // 2-cells
    // ========================================================================

    /// Sets one attribute on every record addressed by `target`.
    ///
    /// A boundary target reaches all of its multi-cell records. Returns the
    /// number of records touched.
    pub fn set_cell_attribute(
        &mut self,
        target: impl Into<CellRef<N>>,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> usize {
        let target = target.into();
        let keys = self.resolve(&target);
        if keys.is_empty() {
            warn!(?target, attribute = name, "set_cell_attribute: unknown cell");
        }
        let value = value.into();
        for &key in &keys {
            if let Some(record) = self.cells.get_mut(key) {
                record.attributes.insert(name.to_string(), value.clone());
            }
        }
        keys.len()
    }

    pub fn set_cell_attributes(
        &mut self,
        values: impl IntoIterator<Item = (CellRef<N>, AttrValue)>,
        name: &str,
    ) -> usize {
        values
            .into_iter()
            .map(|(target, value)| self.set_cell_attribute(target, name, value))
            .sum()
    }

    pub fn update_cell_attributes(
        &mut self,
        updates: impl IntoIterator<Item = (CellRef<N>, Attributes)>,
    ) -> usize {
        let mut touched = 0;
        for (target, attributes) in updates {
            let keys = self.resolve(&target);
            if keys.is_empty() {
                warn!(?target, "update_cell_attributes: unknown cell");
            }
            for key in keys {
                if let Some(record) = self.cells.get_mut(key) {
                    record.attributes.extend(attributes.clone());
                    touched += 1;
                }
            }
        }
        touched
    }

    /// Collects attribute `name` from every 2-cell record that has it.
    pub fn get_cell_attributes(&self, name: &str) -> FxHashMap<CellKey, AttrValue> {
        self.cells
            .keys()
            .filter_map(|k| {
                let value = self.cells.get(k)?.attributes.get(name)?;
                Some((k, value.clone()))
            })
            .collect()
    }

    pub fn cell_attributes(&self, key: CellKey) -> Option<&Attributes> {
        self.cells.get(key).map(|r| &r.attributes)
    }

    /// Collects attribute `name` from every element of one rank.
    pub fn get_rank_attributes(
        &self,
        name: &str,
        rank: usize,
    ) -> Result<FxHashMap<Element<N>, AttrValue>> {
        Ok(match Rank::try_from(rank)? {
            Rank::Node => self
                .get_node_attributes(name)
                .into_iter()
                .map(|(n, v)| (Element::Node(n), v))
                .collect(),
            Rank::Edge => self
                .get_edge_attributes(name)
                .into_iter()
                .map(|(e, v)| (Element::Edge(e), v))
                .collect(),
            Rank::Cell => self
                .get_cell_attributes(name)
                .into_iter()
                .map(|(k, v)| (Element::Cell(k), v))
                .collect(),
        })
    }

    // ========================================================================
    // Complex
    // ========================================================================

    /// Attributes of the complex as a whole.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}
