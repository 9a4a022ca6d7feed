// PageGate - Route Data Model
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Core types shared by the registry, matcher, resolver, and gate.
// A page definition declares routes + one renderable entry point;
// the registry stamps each declared route with its module id.

use crate::session::User;
use crate::store::TableStore;
use serde::{Deserialize, Serialize};

/// Active route universe. Exactly one per navigation session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PortalMode {
    /// Instrumented variant set — machine-driven navigation
    Agent,
    /// Interactive variant set — human-facing forms
    Ui,
}

impl PortalMode {
    pub fn label(&self) -> &'static str {
        match self {
            PortalMode::Agent => "agent",
            PortalMode::Ui => "ui",
        }
    }
}

/// Mode tag carried by a page definition.
/// Untagged (Both) definitions land in BOTH universes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModeTag {
    Agent,
    Ui,
    Both,
}

impl ModeTag {
    /// Does a definition with this tag belong in the given universe?
    pub fn includes(&self, mode: PortalMode) -> bool {
        match self {
            ModeTag::Both => true,
            ModeTag::Agent => mode == PortalMode::Agent,
            ModeTag::Ui => mode == PortalMode::Ui,
        }
    }
}

/// One navigable path as DECLARED by a page definition.
/// Segments separated by '/', ':'-prefixed segments bind parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    pub title: String,
    /// Required roles. None = public.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    /// Static redirect target. Matching this route navigates away instead of rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl RouteEntry {
    pub fn new(path: &str, title: &str) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            roles: None,
            redirect: None,
        }
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }

    pub fn with_redirect(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }
}

/// One navigable path as REGISTERED: the declared entry plus the
/// module that owns it. The unit of truth the matcher hands around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub module_id: String,
}

impl RouteConfig {
    pub fn from_entry(entry: &RouteEntry, module_id: &str) -> Self {
        Self {
            path: entry.path.clone(),
            title: entry.title.clone(),
            roles: entry.roles.clone(),
            redirect: entry.redirect.clone(),
            module_id: module_id.to_string(),
        }
    }

    /// Public = no roles requirement
    pub fn is_public(&self) -> bool {
        self.roles.as_ref().map(|r| r.is_empty()).unwrap_or(true)
    }
}

/// Output of path resolution: the winning config plus the concrete
/// parameter bindings extracted from the navigation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub config: RouteConfig,
    pub params: Vec<(String, String)>,
}

impl MatchResult {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Structured render output, serialized by the shell for the caller.
/// Heading plus content lines; pages stay presentation-thin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageBody {
    pub heading: String,
    pub lines: Vec<String>,
}

impl PageBody {
    pub fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, text: String) -> Self {
        self.lines.push(text);
        self
    }
}

/// Everything a page sees when it renders: bound parameters, raw query,
/// the session user (gate has already passed), and the table store.
pub struct PageContext<'a> {
    pub params: Vec<(String, String)>,
    pub query: String,
    pub user: Option<User>,
    pub store: &'a dyn TableStore,
}

impl PageContext<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The renderable unit behind a route config.
pub trait Page {
    fn render(&self, ctx: &PageContext) -> anyhow::Result<PageBody>;
}

/// A self-describing page unit: one or more route entries plus exactly
/// one renderable entry point. The dispatcher never creates these, only
/// discovers them through the manifest.
pub struct PageDefinition {
    /// Opaque module identity — the resolver's cache key
    pub module_id: &'static str,
    pub mode: ModeTag,
    /// Empty = malformed; the registry builder skips it with a warning
    pub routes: Vec<RouteEntry>,
    /// Materializes the renderable unit. Invoked by the loader, at most
    /// once per module id for the life of the process.
    pub ctor: fn() -> Box<dyn Page>,
}

// ============================================================================
// TESTS
// ============================================================================
