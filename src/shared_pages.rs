// PageGate - Shared Pages
// Copyright 2026 Joseph Stone - All Rights Reserved

use crate::route::{ModeTag, Page, PageBody, PageContext, PageDefinition, RouteEntry};
use crate::store::{field_text, TableStore};
use anyhow::Result;

/// Smoke-test dashboard: dumps the users table. Public, both universes.
struct Dashboard;

impl Page for Dashboard {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let users = ctx.store.list("users")?;
        let mut body = PageBody::new("Dashboard");
        body.lines.push(format!("{} users", users.len()));
        for user in &users {
            body.lines.push(format!(
                "{} <{}> [{}]",
                field_text(user, "id"),
                field_text(user, "email"),
                field_text(user, "role"),
            ));
        }
        Ok(body)
    }
}

pub fn definitions() -> Vec<PageDefinition> {
    vec![PageDefinition {
        module_id: "shared.dashboard",
        mode: ModeTag::Both,
        routes: vec![RouteEntry::new("/dashboard", "Dashboard")],
        ctor: || Box::new(Dashboard),
    }]
}
