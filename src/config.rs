// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::layout::{PlacementOptions, ROUTE_OFFSET};

/// Editor tunables. Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub history_capacity: usize,
    /// Pointer travel (layout units) below which a drag counts as a click.
    pub drag_click_threshold: f64,
    pub placement_grid_step: f64,
    pub placement_padding: f64,
    pub placement_max_radius: f64,
    pub route_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let placement = PlacementOptions::default();
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            drag_click_threshold: 1.0,
            placement_grid_step: placement.grid_step,
            placement_padding: placement.padding,
            placement_max_radius: placement.max_radius,
            route_offset: ROUTE_OFFSET,
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => {
                ConfigError::Parse { path: Some(path.to_path_buf()), source }
            }
            other => other,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("drag_click_threshold", self.drag_click_threshold),
            ("placement_grid_step", self.placement_grid_step),
            ("placement_padding", self.placement_padding),
            ("placement_max_radius", self.placement_max_radius),
            ("route_offset", self.route_offset),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid { field, reason: "must be a finite value >= 0" });
            }
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid { field: "history_capacity", reason: "must be >= 1" });
        }
        Ok(())
    }

    pub fn placement_options(&self) -> PlacementOptions {
        PlacementOptions {
            grid_step: self.placement_grid_step,
            padding: self.placement_padding,
            max_radius: self.placement_max_radius,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {source}")]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}
