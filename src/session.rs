// PageGate - Auth Session
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// The auth collaborator: current identity + role + loading flag, with a
// generation counter so the dispatcher re-evaluates on pushed changes
// instead of polling. Credential records live in the "users" resource;
// passwords are stored as sha256 digests, never plaintext.

use crate::store::TableStore;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cell::{Cell, RefCell};
use std::sync::Arc;

/// Authenticated identity as the portal sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// The session as reported to the gate. Loading is a real state: the gate
/// must hold (not deny) until the restore settles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "state", content = "user")]
pub enum AuthSnapshot {
    Loading,
    SignedOut,
    SignedIn(User),
}

impl AuthSnapshot {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthSnapshot::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthSnapshot::Loading)
    }
}

/// The auth collaborator contract consumed by the gate and the shell.
/// State changes are pushed: every transition bumps generation(), and the
/// render scheduler re-drives any navigation that suspended on Loading.
pub trait AuthProvider {
    fn snapshot(&self) -> AuthSnapshot;
    fn generation(&self) -> u64;
    fn login(&self, email: &str, password: &str) -> Result<User>;
    fn logout(&self);
}

/// sha256 hex digest (credential storage format: "sha256:<hex>")
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn password_digest(password: &str) -> String {
    format!("sha256:{}", sha256_hex(password.as_bytes()))
}

/// Auth provider backed by the table store. Single-threaded interior
/// mutability; the snapshot is cheap to clone on every gate evaluation.
pub struct StoreAuthProvider {
    store: Arc<dyn TableStore>,
    state: RefCell<AuthSnapshot>,
    delegated: RefCell<Option<User>>,
    generation: Cell<u64>,
    signed_in_at: Cell<Option<DateTime<Utc>>>,
}

impl StoreAuthProvider {
    /// Starts in Loading — the portal boots before the session restore
    /// settles, and the gate must observe that window.
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            state: RefCell::new(AuthSnapshot::Loading),
            delegated: RefCell::new(None),
            generation: Cell::new(0),
            signed_in_at: Cell::new(None),
        }
    }

    fn bump(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    /// Session restore finished with no stored identity
    pub fn finish_restore(&self) {
        let mut state = self.state.borrow_mut();
        if matches!(*state, AuthSnapshot::Loading) {
            *state = AuthSnapshot::SignedOut;
            drop(state);
            self.bump();
            log::debug!("session restore settled: signed out");
        }
    }

    /// Acting identity: an active delegation overrides the signed-in user
    pub fn effective_user(&self) -> Option<User> {
        if let Some(delegated) = self.delegated.borrow().as_ref() {
            return Some(delegated.clone());
        }
        self.state.borrow().user().cloned()
    }

    /// Delegate to another user. Requires an active row in the
    /// user_delegations resource for (current user, target).
    pub fn delegate(&self, target_user_id: &str) -> Result<User> {
        let current = self
            .state
            .borrow()
            .user()
            .cloned()
            .ok_or_else(|| anyhow!("delegation requires a signed-in user"))?;

        let grants = self
            .store
            .list(&format!("user_delegations?delegator_id=eq.{}", current.id))
            .context("delegation lookup failed")?;
        let active = grants.iter().any(|g| {
            g.get("target_user_id").and_then(|v| v.as_str()) == Some(target_user_id)
                && g.get("is_active").and_then(|v| v.as_bool()).unwrap_or(false)
        });
        if !active {
            return Err(anyhow!(
                "no active delegation from {} to {}",
                current.id,
                target_user_id
            ));
        }

        let record = self
            .store
            .get("users", target_user_id)?
            .ok_or_else(|| anyhow!("delegated user {} not found", target_user_id))?;
        let user = user_from_record(&record)?;
        *self.delegated.borrow_mut() = Some(user.clone());
        self.bump();
        log::info!("delegation active: {} acting as {}", current.id, user.id);
        Ok(user)
    }

    pub fn clear_delegation(&self) {
        if self.delegated.borrow_mut().take().is_some() {
            self.bump();
        }
    }

    pub fn signed_in_at(&self) -> Option<DateTime<Utc>> {
        self.signed_in_at.get()
    }
}

/// Project a users-resource record onto the session identity shape
fn user_from_record(record: &serde_json::Value) -> Result<User> {
    Ok(User {
        id: record
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("user record missing id"))?
            .to_string(),
        email: record
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        role: record
            .get("role")
            .and_then(|v| v.as_str())
            .unwrap_or("user")
            .to_string(),
    })
}

impl AuthProvider for StoreAuthProvider {
    fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    fn generation(&self) -> u64 {
        self.generation.get()
    }

    fn login(&self, email: &str, password: &str) -> Result<User> {
        let matches = self
            .store
            .list(&format!("users?email=eq.{}", email))
            .context("credential lookup failed")?;
        let record = matches
            .first()
            .ok_or_else(|| anyhow!("unknown user: {}", email))?;

        let stored = record
            .get("password")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if stored != password_digest(password) {
            return Err(anyhow!("invalid credentials for {}", email));
        }

        let user = user_from_record(record)?;
        *self.state.borrow_mut() = AuthSnapshot::SignedIn(user.clone());
        self.signed_in_at.set(Some(Utc::now()));
        self.bump();
        log::info!("signed in: {} ({})", user.email, user.role);
        Ok(user)
    }

    fn logout(&self) {
        *self.state.borrow_mut() = AuthSnapshot::SignedOut;
        *self.delegated.borrow_mut() = None;
        self.signed_in_at.set(None);
        self.bump();
        log::info!("signed out");
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn seeded_provider() -> StoreAuthProvider {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(
                "users",
                json!({
                    "id": "t1",
                    "email": "teacher@portal",
                    "role": "teacher",
                    "password": password_digest("chalkboard"),
                }),
            )
            .unwrap();
        store
            .insert(
                "users",
                json!({
                    "id": "s1",
                    "email": "student@portal",
                    "role": "student",
                    "password": password_digest("recess"),
                }),
            )
            .unwrap();
        StoreAuthProvider::new(store)
    }

    #[test]
    fn starts_loading_then_settles_signed_out() {
        let provider = seeded_provider();
        assert!(provider.snapshot().is_loading());
        let before = provider.generation();

        provider.finish_restore();
        assert_eq!(provider.snapshot(), AuthSnapshot::SignedOut);
        assert!(provider.generation() > before);

        // Restore settling twice is a no-op
        let settled = provider.generation();
        provider.finish_restore();
        assert_eq!(provider.generation(), settled);
    }

    #[test]
    fn login_verifies_digest() {
        let provider = seeded_provider();
        provider.finish_restore();

        let user = provider.login("teacher@portal", "chalkboard").unwrap();
        assert_eq!(user.role, "teacher");
        assert_eq!(provider.snapshot().user().unwrap().id, "t1");

        assert!(provider.login("teacher@portal", "wrong").is_err());
        assert!(provider.login("nobody@portal", "chalkboard").is_err());
    }

    #[test]
    fn logout_clears_identity_and_delegation() {
        let provider = seeded_provider();
        provider.finish_restore();
        provider.login("teacher@portal", "chalkboard").unwrap();

        provider.logout();
        assert_eq!(provider.snapshot(), AuthSnapshot::SignedOut);
        assert!(provider.effective_user().is_none());
    }

    #[test]
    fn generation_bumps_on_every_transition() {
        let provider = seeded_provider();
        let g0 = provider.generation();
        provider.finish_restore();
        let g1 = provider.generation();
        provider.login("student@portal", "recess").unwrap();
        let g2 = provider.generation();
        provider.logout();
        let g3 = provider.generation();
        assert!(g0 < g1 && g1 < g2 && g2 < g3);
    }

    #[test]
    fn delegation_requires_active_grant() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(
                "users",
                json!({"id": "t1", "email": "teacher@portal", "role": "teacher",
                       "password": password_digest("chalkboard")}),
            )
            .unwrap();
        store
            .insert(
                "users",
                json!({"id": "s1", "email": "student@portal", "role": "student",
                       "password": password_digest("recess")}),
            )
            .unwrap();
        store
            .insert(
                "user_delegations",
                json!({"delegator_id": "t1", "target_user_id": "s1", "is_active": true}),
            )
            .unwrap();

        let provider = StoreAuthProvider::new(store);
        provider.finish_restore();
        provider.login("teacher@portal", "chalkboard").unwrap();

        let acting = provider.delegate("s1").unwrap();
        assert_eq!(acting.role, "student");
        assert_eq!(provider.effective_user().unwrap().id, "s1");

        provider.clear_delegation();
        assert_eq!(provider.effective_user().unwrap().id, "t1");

        // No grant for the reverse direction
        provider.logout();
        provider.login("student@portal", "recess").unwrap();
        assert!(provider.delegate("t1").is_err());
    }

    #[test]
    fn digest_format_is_stable() {
        let digest = password_digest("abc");
        assert!(digest.starts_with("sha256:"));
        assert_eq!(digest.len(), "sha256:".len() + 64);
        assert_eq!(digest, password_digest("abc"));
        assert_ne!(digest, password_digest("abd"));
    }
}
