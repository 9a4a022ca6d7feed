// PageGate - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Portal boot configuration: entry points, default universe, backend
// selection, demo seeding. JSON on disk, defaults when absent.

use crate::route::PortalMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which table-store backend serves the data collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// LMDB tables on local disk
    Local { path: PathBuf },
    /// Hosted PostgREST-style backend
    Remote { base_url: String, api_key: String },
}

/// Master portal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub version: String,
    /// Known public entry point — denied navigations redirect here
    pub login_path: String,
    /// Static redirect for the bare root path "/"
    pub root_redirect: String,
    pub site_name: String,
    /// Universe used when a navigation carries no mode query at all
    pub default_mode: PortalMode,
    pub backend: BackendConfig,
    /// Seed demo users/lessons into an empty store at boot
    pub seed_demo_data: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            login_path: "/auth/login".to_string(),
            root_redirect: "/auth/login".to_string(),
            site_name: "EduPortal".to_string(),
            default_mode: PortalMode::Ui,
            backend: BackendConfig::Local {
                path: PathBuf::from("LIVE/TABLES/TABLES.DB"),
            },
            seed_demo_data: true,
        }
    }
}

impl PortalConfig {
    /// Load config from JSON file, falling back to defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            log::warn!("Config not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save config to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
