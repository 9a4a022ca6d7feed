// PageGate - Component Resolver
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Materializes page implementations from module ids, at most once each.
// The cache is append-only and never evicted: the registry is small and
// bounded, and a cached failure renders the same diagnostic on every
// visit instead of re-triggering a broken load.
//
// Suspension is a value, not a blocked thread: an in-flight load surfaces
// as Resolution::Pending and the render scheduler re-drives resolve()
// until the slot settles. Abandoning a navigation mid-load just means
// nobody re-drives it; the slot stays valid for the next visit.

use crate::route::Page;
use std::collections::HashMap;
use std::sync::Arc;

/// Loader's answer for one module
pub enum LoadStart {
    Ready(Arc<dyn Page>),
    /// Load is running; poll again on the next drive
    InFlight,
    Failed(String),
}

/// The external module-loading capability.
/// start_load is invoked at most once per module id for the life of the
/// process — the resolver's cache enforces it. poll_load observes an
/// in-flight load and must not trigger anything.
pub trait PageLoader {
    fn start_load(&self, module_id: &str) -> LoadStart;
    fn poll_load(&self, module_id: &str) -> LoadStart;
}

/// Cache slot per module id
enum LoadSlot {
    Loading,
    Ready(Arc<dyn Page>),
    Failed(String),
}

/// Resolver output for one drive
#[derive(Clone)]
pub enum Resolution {
    Ready(Arc<dyn Page>),
    Pending,
    Failed(String),
}

/// Process-wide component cache keyed by module id
pub struct ComponentResolver {
    loader: Box<dyn PageLoader>,
    slots: HashMap<String, LoadSlot>,
}

impl ComponentResolver {
    pub fn new(loader: Box<dyn PageLoader>) -> Self {
        Self {
            loader,
            slots: HashMap::new(),
        }
    }

    /// Start-or-advance the load for a module id.
    /// First call starts the load; later calls observe the slot, polling
    /// the loader only while the slot is still in flight. Never starts a
    /// second underlying load, under any call pattern.
    pub fn resolve(&mut self, module_id: &str) -> Resolution {
        match self.slots.get(module_id) {
            Some(LoadSlot::Ready(page)) => return Resolution::Ready(Arc::clone(page)),
            Some(LoadSlot::Failed(reason)) => return Resolution::Failed(reason.clone()),
            Some(LoadSlot::Loading) => {
                let answer = self.loader.poll_load(module_id);
                return self.settle(module_id, answer);
            }
            None => {}
        }

        log::debug!("loading module '{}'", module_id);
        let answer = self.loader.start_load(module_id);
        self.settle(module_id, answer)
    }

    fn settle(&mut self, module_id: &str, answer: LoadStart) -> Resolution {
        match answer {
            LoadStart::Ready(page) => {
                self.slots
                    .insert(module_id.to_string(), LoadSlot::Ready(Arc::clone(&page)));
                Resolution::Ready(page)
            }
            LoadStart::InFlight => {
                self.slots
                    .entry(module_id.to_string())
                    .or_insert(LoadSlot::Loading);
                Resolution::Pending
            }
            LoadStart::Failed(reason) => {
                log::error!("module '{}' failed to load: {}", module_id, reason);
                self.slots
                    .insert(module_id.to_string(), LoadSlot::Failed(reason.clone()));
                Resolution::Failed(reason)
            }
        }
    }

    /// Number of settled or in-flight slots (diagnostics)
    pub fn cached_count(&self) -> usize {
        self.slots.len()
    }
}

/// Production loader: materializes pages from the statically-registered
/// definition set. Loads complete synchronously — the whole manifest is
/// known before the first navigation resolves — but the resolver pipeline
/// above stays suspension-capable for loaders that are not.
pub struct DefinitionLoader {
    ctors: HashMap<String, fn() -> Box<dyn Page>>,
}

impl DefinitionLoader {
    pub fn from_definitions(definitions: &[crate::route::PageDefinition]) -> Self {
        let mut ctors = HashMap::new();
        for def in definitions {
            ctors.insert(def.module_id.to_string(), def.ctor);
        }
        Self { ctors }
    }
}

impl PageLoader for DefinitionLoader {
    fn start_load(&self, module_id: &str) -> LoadStart {
        match self.ctors.get(module_id) {
            Some(ctor) => LoadStart::Ready(Arc::from(ctor())),
            None => LoadStart::Failed(format!("no registered module: {}", module_id)),
        }
    }

    fn poll_load(&self, module_id: &str) -> LoadStart {
        // Synchronous loader never leaves a load in flight
        self.start_load(module_id)
    }
}

// ============================================================================
// TESTS
// ============================================================================
