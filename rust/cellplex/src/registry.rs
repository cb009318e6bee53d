// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keyed multiset of 2-cell records.
//!
//! Every inserted cell becomes its own record with a stable [`CellKey`] and
//! its own attribute map. Records are grouped by [`BoundaryKey`], so several
//! cells may be attached along the same boundary (multi-cells) until they
//! are explicitly deduplicated. Iteration follows insertion order, which is
//! also the column order of the rank-2 incidence matrix.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::attributes::Attributes;
use crate::cell::{BoundaryKey, Cell};
use crate::keys::{CellKey, NodeId};

/// One registered 2-cell and its metadata.
#[derive(Debug, Clone)]
pub struct CellRecord<N> {
    pub cell: Cell<N>,
    pub attributes: Attributes,
}

/// Storage for the 2-cells of a complex.
#[derive(Debug, Clone)]
pub struct CellRegistry<N> {
    records: SlotMap<CellKey, CellRecord<N>>,
    groups: FxHashMap<BoundaryKey<N>, Vec<CellKey>>,
    order: Vec<CellKey>,
}

impl<N: NodeId> CellRegistry<N> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            records: SlotMap::with_key(),
            groups: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Appends a record under the cell's boundary key.
    pub fn insert(&mut self, cell: Cell<N>, attributes: Attributes) -> CellKey {
        let group = cell.key().clone();
        let key = self.records.insert(CellRecord { cell, attributes });
        self.groups.entry(group).or_default().push(key);
        self.order.push(key);
        key
    }

    /// Removes every record filed under `key`.
    pub fn delete(&mut self, key: &BoundaryKey<N>) -> Vec<CellRecord<N>> {
        let Some(members) = self.groups.remove(key) else {
            return Vec::new();
        };
        self.order.retain(|k| !members.contains(k));
        members
            .into_iter()
            .filter_map(|k| self.records.remove(k))
            .collect()
    }

    /// Removes a single record.
    pub fn remove_record(&mut self, key: CellKey) -> Option<CellRecord<N>> {
        let record = self.records.remove(key)?;
        if let Some(members) = self.groups.get_mut(record.cell.key()) {
            members.retain(|&k| k != key);
            if members.is_empty() {
                self.groups.remove(record.cell.key());
            }
        }
        self.order.retain(|&k| k != key);
        Some(record)
    }

    /// Returns `true` if at least one record has this boundary key.
    pub fn contains_key(&self, key: &BoundaryKey<N>) -> bool {
        self.groups.contains_key(key)
    }

    /// Returns `true` if a record equivalent to `cell` exists.
    pub fn contains(&self, cell: &Cell<N>) -> bool {
        self.contains_key(cell.key())
    }

    /// Returns `true` if the record handle is live.
    pub fn contains_record(&self, key: CellKey) -> bool {
        self.records.contains_key(key)
    }

    /// Returns a record by handle.
    pub fn get(&self, key: CellKey) -> Option<&CellRecord<N>> {
        self.records.get(key)
    }

    /// Returns a mutable record by handle.
    pub fn get_mut(&mut self, key: CellKey) -> Option<&mut CellRecord<N>> {
        self.records.get_mut(key)
    }

    /// Returns the record handles filed under a boundary key, oldest first.
    pub fn records_for(&self, key: &BoundaryKey<N>) -> &[CellKey] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over all records in insertion order, one item per record.
    pub fn iter(&self) -> impl Iterator<Item = (CellKey, &Cell<N>)> + '_ {
        self.order.iter().map(move |&k| (k, &self.records[k].cell))
    }

    /// Iterates over record handles in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.order.iter().copied()
    }

    /// Number of records (not distinct boundaries).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record exists.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct boundary keys.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Collapses every group of equivalent records into its first record.
    ///
    /// The survivor keeps its own attributes; the others are discarded.
    /// Returns the number of records removed.
    pub fn deduplicate_equivalent(&mut self) -> usize {
        let mut dropped = Vec::new();
        for members in self.groups.values_mut() {
            if members.len() > 1 {
                dropped.extend(members.drain(1..));
            }
        }
        for &k in &dropped {
            self.records.remove(k);
        }
        self.order.retain(|k| !dropped.contains(k));
        dropped.len()
    }
}

impl<N: NodeId> Default for CellRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}
