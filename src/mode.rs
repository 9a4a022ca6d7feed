// PageGate - Mode Selector
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Derives the active route universe from the navigation query string.
// Read-only for the lifetime of a single resolution; switching universes
// means reading from the other prebuilt registry, never rebuilding in place.

use crate::paths;
use crate::route::PortalMode;

/// Query key carried by agent-driven navigations ("?agentMode=true")
pub const MODE_QUERY_KEY: &str = "agentMode";

/// Derive the active mode for one navigation.
/// Anything other than an explicit "true" selects the interactive UI universe.
pub fn derive_mode(query: &str) -> PortalMode {
    match paths::query_param(query, MODE_QUERY_KEY) {
        Some("true") => PortalMode::Agent,
        _ => PortalMode::Ui,
    }
}

/// One value per universe. Both sides are built once at boot; the mode
/// selector only ever chooses which side serves a navigation.
#[derive(Debug, Clone)]
pub struct ModePair<T> {
    pub agent: T,
    pub ui: T,
}

impl<T> ModePair<T> {
    pub fn get(&self, mode: PortalMode) -> &T {
        match mode {
            PortalMode::Agent => &self.agent,
            PortalMode::Ui => &self.ui,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
