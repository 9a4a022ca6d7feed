// PageGate - Dispatch Pipeline
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every navigation routes through here:
//   normalize -> mode select -> static redirect -> match -> resolve -> gate -> render
//
// NotFound and load failures are recovered in place as diagnostic
// outcomes; denial redirects; nothing here can take down the shell.
// The registries are built once per universe at boot and never mutated;
// the component cache is the only state the pipeline appends to.

use crate::config::PortalConfig;
use crate::gate::{self, GateDecision};
use crate::matcher;
use crate::mode::{self, ModePair};
use crate::paths;
use crate::registry::{RegistryError, RouteRegistry};
use crate::resolver::{ComponentResolver, DefinitionLoader, PageLoader, Resolution};
use crate::route::{PageBody, PageContext, PageDefinition, PortalMode};
use crate::session::AuthSnapshot;
use crate::store::TableStore;
use serde::{Deserialize, Serialize};

/// Why a navigation is paused. The render scheduler re-drives navigate()
/// when the corresponding collaborator reports progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuspendReason {
    ComponentLoad { module_id: String },
    AuthPending,
}

/// Terminal (or suspended) result of one navigation drive
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RenderOutcome {
    Rendered {
        title: String,
        mode: PortalMode,
        body: PageBody,
    },
    Redirect {
        to: String,
    },
    Suspended {
        reason: SuspendReason,
    },
    /// Diagnostic 404 — deliberately verbose, doubles as an operational aid
    NotFound {
        path: String,
        mode: PortalMode,
        known_paths: Vec<String>,
    },
    /// Matched route whose component could not be materialized
    LoadError {
        path: String,
        module_id: String,
        reason: String,
    },
    /// Page materialized but its render failed; recovered in place
    RenderFailed {
        path: String,
        reason: String,
    },
}

/// The dispatcher: both registry universes, the component cache, and the
/// portal config, owned together and passed to the shell at boot.
pub struct Dispatcher {
    registries: ModePair<RouteRegistry>,
    resolver: ComponentResolver,
    config: PortalConfig,
}

impl Dispatcher {
    /// Build both universes from the definition set and wire the default
    /// synchronous loader. DuplicateRoute aborts boot.
    pub fn boot(
        config: PortalConfig,
        definitions: &[PageDefinition],
    ) -> Result<Self, RegistryError> {
        let loader = Box::new(DefinitionLoader::from_definitions(definitions));
        Self::boot_with_loader(config, definitions, loader)
    }

    /// Boot with a caller-supplied loader (deferred/failing loaders in tests)
    pub fn boot_with_loader(
        config: PortalConfig,
        definitions: &[PageDefinition],
        loader: Box<dyn PageLoader>,
    ) -> Result<Self, RegistryError> {
        let registries = ModePair {
            agent: RouteRegistry::build(PortalMode::Agent, definitions)?,
            ui: RouteRegistry::build(PortalMode::Ui, definitions)?,
        };
        Ok(Self {
            registries,
            resolver: ComponentResolver::new(loader),
            config,
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn registry(&self, mode: PortalMode) -> &RouteRegistry {
        self.registries.get(mode)
    }

    /// Drive one navigation. Re-driving the same location after a
    /// Suspended outcome is how the scheduler resumes; it is always safe
    /// and never repeats a component load.
    pub fn navigate(
        &mut self,
        location: &str,
        session: &AuthSnapshot,
        store: &dyn TableStore,
    ) -> RenderOutcome {
        let (pathname, query) = paths::split_location(location);
        let path = paths::normalize(pathname);
        let mode = mode::derive_mode(query);

        // Static redirect for the bare root
        if path == "/" {
            return RenderOutcome::Redirect {
                to: self.config.root_redirect.clone(),
            };
        }

        let registry = self.registries.get(mode);
        let matched = match matcher::resolve(&path, registry) {
            Some(m) => m,
            None => {
                log::warn!("no route for {} in {} universe", path, mode.label());
                return RenderOutcome::NotFound {
                    path,
                    mode,
                    known_paths: registry.paths(),
                };
            }
        };

        // Route-declared static redirect replaces rendering entirely
        if let Some(target) = &matched.config.redirect {
            return RenderOutcome::Redirect { to: target.clone() };
        }

        let page = match self.resolver.resolve(&matched.config.module_id) {
            Resolution::Ready(page) => page,
            Resolution::Pending => {
                return RenderOutcome::Suspended {
                    reason: SuspendReason::ComponentLoad {
                        module_id: matched.config.module_id.clone(),
                    },
                }
            }
            Resolution::Failed(reason) => {
                return RenderOutcome::LoadError {
                    path,
                    module_id: matched.config.module_id.clone(),
                    reason,
                }
            }
        };

        match gate::evaluate(&matched.config, session, &self.config) {
            GateDecision::Pending => RenderOutcome::Suspended {
                reason: SuspendReason::AuthPending,
            },
            GateDecision::Denied { redirect_to } => RenderOutcome::Redirect { to: redirect_to },
            GateDecision::Allowed => {
                let ctx = PageContext {
                    params: matched.params.clone(),
                    query: query.to_string(),
                    user: session.user().cloned(),
                    store,
                };
                match page.render(&ctx) {
                    Ok(body) => RenderOutcome::Rendered {
                        title: matched.config.title.clone(),
                        mode,
                        body,
                    },
                    Err(e) => {
                        log::error!("render failed for {}: {:#}", path, e);
                        RenderOutcome::RenderFailed {
                            path,
                            reason: format!("{:#}", e),
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::LoadStart;
    use crate::route::{ModeTag, Page, RouteEntry};
    use crate::session::User;
    use crate::store::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    struct Titled(&'static str);

    impl Page for Titled {
        fn render(&self, ctx: &PageContext) -> anyhow::Result<PageBody> {
            let mut body = PageBody::new(self.0);
            if let Some(id) = ctx.param("id") {
                body.lines.push(format!("id={}", id));
            }
            Ok(body)
        }
    }

    fn login_page() -> Box<dyn Page> {
        Box::new(Titled("login"))
    }

    fn lesson_page() -> Box<dyn Page> {
        Box::new(Titled("lesson"))
    }

    fn editor_page() -> Box<dyn Page> {
        Box::new(Titled("editor"))
    }

    /// The §-scenario registry: one public page, one parameterized
    /// protected page, one literal protected page.
    fn portal_definitions() -> Vec<PageDefinition> {
        vec![
            PageDefinition {
                module_id: "auth.login",
                mode: ModeTag::Both,
                routes: vec![RouteEntry::new("/auth/login", "Login")],
                ctor: login_page,
            },
            PageDefinition {
                module_id: "teacher.lesson",
                mode: ModeTag::Both,
                routes: vec![
                    RouteEntry::new("/teacher/lessons/:id", "Lesson").with_roles(&["teacher"]),
                ],
                ctor: lesson_page,
            },
            PageDefinition {
                module_id: "teacher.editor",
                mode: ModeTag::Both,
                routes: vec![
                    RouteEntry::new("/teacher/lessons/create", "New Lesson")
                        .with_roles(&["teacher"]),
                ],
                ctor: editor_page,
            },
        ]
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::boot(PortalConfig::default(), &portal_definitions()).unwrap()
    }

    fn teacher() -> AuthSnapshot {
        AuthSnapshot::SignedIn(User {
            id: "t1".to_string(),
            email: "t@portal".to_string(),
            role: "teacher".to_string(),
        })
    }

    fn student() -> AuthSnapshot {
        AuthSnapshot::SignedIn(User {
            id: "s1".to_string(),
            email: "s@portal".to_string(),
            role: "student".to_string(),
        })
    }

    #[test]
    fn literal_route_beats_parameterized_sibling() {
        let mut d = dispatcher();
        let store = MemoryStore::new();
        match d.navigate("/teacher/lessons/create", &teacher(), &store) {
            RenderOutcome::Rendered { title, body, .. } => {
                assert_eq!(title, "New Lesson");
                assert_eq!(body.heading, "editor");
            }
            other => panic!("expected Rendered, got {:?}", other),
        }
    }

    #[test]
    fn parameterized_route_binds_and_renders() {
        let mut d = dispatcher();
        let store = MemoryStore::new();
        match d.navigate("/teacher/lessons/42", &teacher(), &store) {
            RenderOutcome::Rendered { title, body, .. } => {
                assert_eq!(title, "Lesson");
                assert!(body.lines.contains(&"id=42".to_string()));
            }
            other => panic!("expected Rendered, got {:?}", other),
        }
    }

    #[test]
    fn student_denied_teacher_page_redirects_to_login() {
        let mut d = dispatcher();
        let store = MemoryStore::new();
        match d.navigate("/teacher/lessons/42", &student(), &store) {
            RenderOutcome::Redirect { to } => assert_eq!(to, "/auth/login"),
            other => panic!("expected Redirect, got {:?}", other),
        }
    }

    #[test]
    fn unknown_path_yields_diagnostic_not_found() {
        let mut d = dispatcher();
        let store = MemoryStore::new();
        match d.navigate("/unknown/path", &teacher(), &store) {
            RenderOutcome::NotFound { path, mode, known_paths } => {
                assert_eq!(path, "/unknown/path");
                assert_eq!(mode, PortalMode::Ui);
                assert_eq!(known_paths.len(), 3);
                assert!(known_paths.contains(&"/auth/login".to_string()));
                assert!(known_paths.contains(&"/teacher/lessons/:id".to_string()));
                assert!(known_paths.contains(&"/teacher/lessons/create".to_string()));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn root_redirects_to_configured_entry() {
        let mut d = dispatcher();
        let store = MemoryStore::new();
        match d.navigate("/", &AuthSnapshot::SignedOut, &store) {
            RenderOutcome::Redirect { to } => assert_eq!(to, "/auth/login"),
            other => panic!("expected Redirect, got {:?}", other),
        }
    }

    #[test]
    fn route_declared_redirect_replaces_render() {
        let defs = vec![PageDefinition {
            module_id: "legacy.home",
            mode: ModeTag::Both,
            routes: vec![RouteEntry::new("/home", "Home").with_redirect("/dashboard")],
            ctor: login_page,
        }];
        let mut d = Dispatcher::boot(PortalConfig::default(), &defs).unwrap();
        let store = MemoryStore::new();
        match d.navigate("/home", &AuthSnapshot::SignedOut, &store) {
            RenderOutcome::Redirect { to } => assert_eq!(to, "/dashboard"),
            other => panic!("expected Redirect, got {:?}", other),
        }
    }

    #[test]
    fn trailing_slash_still_matches() {
        let mut d = dispatcher();
        let store = MemoryStore::new();
        assert!(matches!(
            d.navigate("/auth/login/", &AuthSnapshot::SignedOut, &store),
            RenderOutcome::Rendered { .. }
        ));
    }

    #[test]
    fn mode_universes_dispatch_independently() {
        let defs = vec![
            PageDefinition {
                module_id: "login.agent",
                mode: ModeTag::Agent,
                routes: vec![RouteEntry::new("/auth/login", "Login (agent)")],
                ctor: login_page,
            },
            PageDefinition {
                module_id: "login.ui",
                mode: ModeTag::Ui,
                routes: vec![RouteEntry::new("/auth/login", "Login")],
                ctor: login_page,
            },
            PageDefinition {
                module_id: "ui.only",
                mode: ModeTag::Ui,
                routes: vec![RouteEntry::new("/auth/student-welcome", "Welcome")],
                ctor: login_page,
            },
        ];
        let mut d = Dispatcher::boot(PortalConfig::default(), &defs).unwrap();
        let store = MemoryStore::new();
        let out = AuthSnapshot::SignedOut;

        // Same logical path, different module per universe
        match d.navigate("/auth/login?agentMode=true", &out, &store) {
            RenderOutcome::Rendered { title, mode, .. } => {
                assert_eq!(title, "Login (agent)");
                assert_eq!(mode, PortalMode::Agent);
            }
            other => panic!("expected Rendered, got {:?}", other),
        }
        match d.navigate("/auth/login", &out, &store) {
            RenderOutcome::Rendered { title, mode, .. } => {
                assert_eq!(title, "Login");
                assert_eq!(mode, PortalMode::Ui);
            }
            other => panic!("expected Rendered, got {:?}", other),
        }

        // UI-only page is unreachable from the agent universe
        assert!(matches!(
            d.navigate("/auth/student-welcome?agentMode=true", &out, &store),
            RenderOutcome::NotFound { .. }
        ));
        assert!(matches!(
            d.navigate("/auth/student-welcome", &out, &store),
            RenderOutcome::Rendered { .. }
        ));
    }

    #[test]
    fn auth_pending_suspends_then_settles() {
        let mut d = dispatcher();
        let store = MemoryStore::new();

        match d.navigate("/teacher/lessons/42", &AuthSnapshot::Loading, &store) {
            RenderOutcome::Suspended { reason } => assert_eq!(reason, SuspendReason::AuthPending),
            other => panic!("expected Suspended, got {:?}", other),
        }

        // Session collaborator pushes its settled state; the scheduler re-drives
        assert!(matches!(
            d.navigate("/teacher/lessons/42", &teacher(), &store),
            RenderOutcome::Rendered { .. }
        ));
    }

    #[test]
    fn in_flight_component_suspends_without_duplicate_loads() {
        struct SlowLoader {
            completed: Rc<RefCell<bool>>,
            starts: Rc<RefCell<usize>>,
        }

        impl PageLoader for SlowLoader {
            fn start_load(&self, _module_id: &str) -> LoadStart {
                *self.starts.borrow_mut() += 1;
                LoadStart::InFlight
            }
            fn poll_load(&self, _module_id: &str) -> LoadStart {
                if *self.completed.borrow() {
                    LoadStart::Ready(Arc::new(Titled("login")))
                } else {
                    LoadStart::InFlight
                }
            }
        }

        let completed = Rc::new(RefCell::new(false));
        let starts = Rc::new(RefCell::new(0));
        let defs = portal_definitions();
        let mut d = Dispatcher::boot_with_loader(
            PortalConfig::default(),
            &defs,
            Box::new(SlowLoader {
                completed: Rc::clone(&completed),
                starts: Rc::clone(&starts),
            }),
        )
        .unwrap();
        let store = MemoryStore::new();
        let out = AuthSnapshot::SignedOut;

        // Rapid repeated navigation to the same path while the load hangs
        for _ in 0..3 {
            match d.navigate("/auth/login", &out, &store) {
                RenderOutcome::Suspended { reason } => assert_eq!(
                    reason,
                    SuspendReason::ComponentLoad {
                        module_id: "auth.login".to_string()
                    }
                ),
                other => panic!("expected Suspended, got {:?}", other),
            }
        }
        assert_eq!(*starts.borrow(), 1, "exactly one underlying load");

        *completed.borrow_mut() = true;
        assert!(matches!(
            d.navigate("/auth/login", &out, &store),
            RenderOutcome::Rendered { .. }
        ));
        assert_eq!(*starts.borrow(), 1);
    }

    #[test]
    fn missing_module_reports_load_error() {
        struct BrokenLoader;
        impl PageLoader for BrokenLoader {
            fn start_load(&self, module_id: &str) -> LoadStart {
                LoadStart::Failed(format!("chunk fetch failed for {}", module_id))
            }
            fn poll_load(&self, module_id: &str) -> LoadStart {
                self.start_load(module_id)
            }
        }

        let defs = portal_definitions();
        let mut d =
            Dispatcher::boot_with_loader(PortalConfig::default(), &defs, Box::new(BrokenLoader))
                .unwrap();
        let store = MemoryStore::new();

        match d.navigate("/auth/login", &AuthSnapshot::SignedOut, &store) {
            RenderOutcome::LoadError { module_id, reason, .. } => {
                assert_eq!(module_id, "auth.login");
                assert!(reason.contains("auth.login"));
            }
            other => panic!("expected LoadError, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_route_aborts_boot() {
        let defs = vec![
            PageDefinition {
                module_id: "a",
                mode: ModeTag::Both,
                routes: vec![RouteEntry::new("/dashboard", "A")],
                ctor: login_page,
            },
            PageDefinition {
                module_id: "b",
                mode: ModeTag::Both,
                routes: vec![RouteEntry::new("/dashboard", "B")],
                ctor: login_page,
            },
        ];
        assert!(Dispatcher::boot(PortalConfig::default(), &defs).is_err());
    }
}
