// PageGate - Route Registry Builder
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Builds the immutable path -> config map for one mode universe.
// Mode filter, multi-route flattening, duplicate detection.
// Duplicate literal path = fatal startup error. Silent overwrite would
// make dispatch order-dependent, so it is not an option here.
// Malformed definitions (no routes) are skipped with a warning; one bad
// page must not take down routing for the rest of the portal.

use crate::paths;
use crate::route::{PageDefinition, PortalMode, RouteConfig};
use std::collections::HashMap;
use thiserror::Error;

/// Fatal registry construction errors — surfaced at startup, never at dispatch
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate route {path:?} in {mode} universe: declared by both {first} and {second}")]
    DuplicateRoute {
        path: String,
        mode: &'static str,
        first: String,
        second: String,
    },
}

/// Immutable path -> config map for exactly one mode universe.
/// Built once per mode at boot; rebuilt only if the definition set changes.
#[derive(Debug)]
pub struct RouteRegistry {
    mode: PortalMode,
    /// Registration order — the matcher's deterministic tie-break depends on it
    configs: Vec<RouteConfig>,
    /// Exact literal lookup for the O(1) fast path
    by_path: HashMap<String, usize>,
}

impl RouteRegistry {
    /// Scan definitions, apply the mode filter, flatten route lists.
    pub fn build(
        mode: PortalMode,
        definitions: &[PageDefinition],
    ) -> Result<Self, RegistryError> {
        let mut configs: Vec<RouteConfig> = Vec::new();
        let mut by_path: HashMap<String, usize> = HashMap::new();
        let mut included = 0usize;

        for def in definitions {
            if !def.mode.includes(mode) {
                continue;
            }
            if def.routes.is_empty() {
                log::warn!(
                    "page definition '{}' declares no routes — skipped",
                    def.module_id
                );
                continue;
            }
            included += 1;
            for entry in &def.routes {
                let path = paths::normalize(&entry.path);
                if let Some(&idx) = by_path.get(&path) {
                    return Err(RegistryError::DuplicateRoute {
                        path,
                        mode: mode.label(),
                        first: configs[idx].module_id.clone(),
                        second: def.module_id.to_string(),
                    });
                }
                let mut config = RouteConfig::from_entry(entry, def.module_id);
                config.path = path.clone();
                by_path.insert(path, configs.len());
                configs.push(config);
            }
        }

        log::info!(
            "{} universe: {} routes from {} definitions",
            mode.label(),
            configs.len(),
            included
        );

        Ok(Self {
            mode,
            configs,
            by_path,
        })
    }

    pub fn mode(&self) -> PortalMode {
        self.mode
    }

    /// Exact literal path lookup (input must be normalized)
    pub fn exact(&self, path: &str) -> Option<&RouteConfig> {
        self.by_path.get(path).map(|&idx| &self.configs[idx])
    }

    /// All configs in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RouteConfig> {
        self.configs.iter()
    }

    /// All registered path patterns, registration order. 404 diagnostic feed.
    pub fn paths(&self) -> Vec<String> {
        self.configs.iter().map(|c| c.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
