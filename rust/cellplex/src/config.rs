// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Complex-level settings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How operator entries are weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Every incidence contributes ±1.
    #[default]
    Unweighted,
}

/// Settings fixed when a [`CellComplex`](crate::complex::CellComplex) is created.
///
/// Missing fields fall back to their defaults when deserialized:
///
/// ```
/// use cellplex::ComplexConfig;
///
/// let config = ComplexConfig::from_json(r#"{ "regular": false }"#).unwrap();
/// assert!(!config.regular);
/// assert!(!config.check_skeleton);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexConfig {
    /// Display name of the complex.
    pub name: String,
    /// Reject 2-cells that visit a node twice.
    pub regular: bool,
    /// Default for [`AddCellOptions::check_skeleton`](crate::complex::AddCellOptions).
    pub check_skeleton: bool,
    pub weighting: Weighting,
}

impl Default for ComplexConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            regular: true,
            check_skeleton: false,
            weighting: Weighting::Unweighted,
        }
    }
}

impl ComplexConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_regular(mut self, regular: bool) -> Self {
        self.regular = regular;
        self
    }

    pub fn with_check_skeleton(mut self, check_skeleton: bool) -> Self {
        self.check_skeleton = check_skeleton;
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}
