// PageGate - Access Gate
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every matched navigation passes through here before anything renders.
// Pending while the session restore is in flight, Allowed on role match
// or public route, Denied redirects to the login entry point. Protected
// content is never rendered on Denied, not even transiently.

use crate::config::PortalConfig;
use crate::route::RouteConfig;
use crate::session::AuthSnapshot;
use serde::{Deserialize, Serialize};

/// Gate decision — the final word on whether a matched page renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum GateDecision {
    /// Auth state not yet known. Render a neutral loading affordance and
    /// re-evaluate when the session collaborator pushes its next change.
    Pending,
    Allowed,
    /// Terminal for this navigation. Carries only the redirect target;
    /// nothing about the protected page leaks past the gate.
    Denied { redirect_to: String },
}

/// Evaluate a route's role requirement against the current session.
/// Pure function of its inputs; the dispatcher re-runs it whenever the
/// auth provider reports a new generation.
pub fn evaluate(
    route: &RouteConfig,
    session: &AuthSnapshot,
    portal: &PortalConfig,
) -> GateDecision {
    // Public routes render regardless of session state
    if route.is_public() {
        return GateDecision::Allowed;
    }

    let required = route.roles.as_deref().unwrap_or_default();

    match session {
        AuthSnapshot::Loading => GateDecision::Pending,
        AuthSnapshot::SignedOut => {
            log::debug!("gate: {} denied (signed out)", route.path);
            GateDecision::Denied {
                redirect_to: portal.login_path.clone(),
            }
        }
        AuthSnapshot::SignedIn(user) => {
            if required.iter().any(|r| r == &user.role) {
                GateDecision::Allowed
            } else {
                log::debug!(
                    "gate: {} denied (role '{}' not in requirement)",
                    route.path,
                    user.role
                );
                GateDecision::Denied {
                    redirect_to: portal.login_path.clone(),
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
