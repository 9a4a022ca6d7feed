// PageGate - Portal Shell (JSON over stdio)
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Host process surface for the portal: accepts navigation requests as
// JSON lines on stdin, emits render outcomes as JSON lines on stdout,
// stderr is for logs. The shell is the render scheduler — it re-drives
// suspended navigations until they settle, and it forwards
// login/logout/delegation to the auth provider.
//
// Requests:
//   {"navigate": "/teacher/lessons?agentMode=true"}
//   {"login": {"email": "...", "password": "..."}}
//   {"logout": true}
//   {"delegate": "user-id"}   |   {"delegate": null}
//   {"session": true}

use crate::dispatch::{Dispatcher, RenderOutcome};
use crate::session::{AuthProvider, StoreAuthProvider};
use crate::store::TableStore;
use serde_json::{json, Value};
use std::io::{self, BufRead};

/// Upper bound on re-drives per request. With the synchronous manifest
/// loader a navigation settles in one or two drives; the bound only
/// guards against a loader that never completes.
const MAX_DRIVES: usize = 8;

/// Re-drive a navigation until it stops suspending.
/// Each drive re-polls the component cache and re-reads the session, so
/// progress pushed by either collaborator is picked up.
pub fn drive_to_settled(
    dispatcher: &mut Dispatcher,
    location: &str,
    provider: &StoreAuthProvider,
    store: &dyn TableStore,
) -> RenderOutcome {
    let mut outcome = dispatcher.navigate(location, &provider.snapshot(), store);
    for _ in 1..MAX_DRIVES {
        match outcome {
            RenderOutcome::Suspended { .. } => {
                outcome = dispatcher.navigate(location, &provider.snapshot(), store);
            }
            _ => break,
        }
    }
    outcome
}

/// Handle one shell request and produce one response value
pub fn handle_request(
    msg: &Value,
    dispatcher: &mut Dispatcher,
    provider: &StoreAuthProvider,
    store: &dyn TableStore,
) -> Value {
    if let Some(location) = msg.get("navigate").and_then(|v| v.as_str()) {
        let outcome = drive_to_settled(dispatcher, location, provider, store);
        return serde_json::to_value(&outcome).unwrap_or_else(|e| {
            json!({"error": format!("outcome serialization failed: {}", e)})
        });
    }

    if let Some(credentials) = msg.get("login") {
        let email = credentials.get("email").and_then(|v| v.as_str()).unwrap_or("");
        let password = credentials
            .get("password")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        return match provider.login(email, password) {
            Ok(user) => json!({"ok": true, "user": user}),
            Err(e) => json!({"ok": false, "error": e.to_string()}),
        };
    }

    if msg.get("logout").is_some() {
        provider.logout();
        return json!({"ok": true});
    }

    if let Some(target) = msg.get("delegate") {
        return match target.as_str() {
            Some(user_id) => match provider.delegate(user_id) {
                Ok(user) => json!({"ok": true, "acting_as": user}),
                Err(e) => json!({"ok": false, "error": e.to_string()}),
            },
            None => {
                provider.clear_delegation();
                json!({"ok": true})
            }
        };
    }

    if msg.get("session").is_some() {
        return json!({
            "session": provider.snapshot(),
            "effective_user": provider.effective_user(),
            "signed_in_at": provider.signed_in_at(),
            "generation": provider.generation(),
        });
    }

    json!({"error": "unknown request — expected navigate/login/logout/delegate/session"})
}

/// Run the shell loop — blocks until stdin closes
pub fn run(
    mut dispatcher: Dispatcher,
    provider: StoreAuthProvider,
    store: &dyn TableStore,
) {
    log::info!(
        "portal shell up: {} (ui: {} routes, agent: {} routes)",
        dispatcher.config().site_name,
        dispatcher.registry(crate::route::PortalMode::Ui).len(),
        dispatcher.registry(crate::route::PortalMode::Agent).len(),
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("stdin read error: {}", e);
                continue;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                println!("{}", json!({"error": format!("invalid JSON: {}", e)}));
                continue;
            }
        };

        let response = handle_request(&msg, &mut dispatcher, &provider, store);
        println!("{}", response);
    }

    log::info!("stdin closed, shell down");
}

// ============================================================================
// TESTS
// ============================================================================
