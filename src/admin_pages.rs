// PageGate - Admin Pages
// Copyright 2026 Joseph Stone - All Rights Reserved

use crate::route::{ModeTag, Page, PageBody, PageContext, PageDefinition, RouteEntry};
use crate::store::{field_text, TableStore};
use anyhow::Result;

/// Badge management serves two paths from one definition: the admin view
/// and the teacher view, each with its own role requirement.
struct BadgeManagement;

impl Page for BadgeManagement {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let badges = ctx.store.list("badges")?;
        let mut body = PageBody::new("Badge management");
        body.lines.push(format!("{} badges defined", badges.len()));
        for badge in &badges {
            body.lines.push(format!(
                "{}: {} ({} XP)",
                field_text(badge, "id"),
                field_text(badge, "name"),
                field_text(badge, "xp_required"),
            ));
        }
        Ok(body)
    }
}

pub fn definitions() -> Vec<PageDefinition> {
    vec![PageDefinition {
        module_id: "admin.badges",
        mode: ModeTag::Both,
        routes: vec![
            RouteEntry::new("/admin/badges", "Badge management").with_roles(&["admin"]),
            RouteEntry::new("/teacher/badges", "Badge management").with_roles(&["teacher"]),
        ],
        ctor: || Box::new(BadgeManagement),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_paths_carry_distinct_role_requirements() {
        let defs = definitions();
        let badges = &defs[0];
        assert_eq!(badges.routes[0].roles.as_deref(), Some(&["admin".to_string()][..]));
        assert_eq!(badges.routes[1].roles.as_deref(), Some(&["teacher".to_string()][..]));
    }
}
