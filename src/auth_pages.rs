// PageGate - Auth Pages
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Login and register in both universes. The agent and UI variants share
// their logical paths — mode filtering alone decides which one serves a
// navigation, so each pair declares the SAME path with a different tag.

use crate::route::{ModeTag, Page, PageBody, PageContext, PageDefinition, RouteEntry};
use crate::store::{field_text, TableStore};
use anyhow::Result;

/// Instrumented login surface for machine-driven sessions
struct LoginAgent;

impl Page for LoginAgent {
    fn render(&self, _ctx: &PageContext) -> Result<PageBody> {
        Ok(PageBody::new("Login")
            .line("form: login".to_string())
            .line("field: email".to_string())
            .line("field: password".to_string())
            .line("submit: {\"login\": {\"email\": ..., \"password\": ...}}".to_string()))
    }
}

/// Interactive login form
struct LoginUi;

impl Page for LoginUi {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let mut body = PageBody::new("Sign in to continue");
        if let Some(user) = &ctx.user {
            body.lines.push(format!("Already signed in as {}", user.email));
        } else {
            body.lines.push("Email and password, then Sign in".to_string());
            body.lines.push("New here? Register at /auth/register".to_string());
        }
        Ok(body)
    }
}

struct RegisterAgent;

impl Page for RegisterAgent {
    fn render(&self, _ctx: &PageContext) -> Result<PageBody> {
        Ok(PageBody::new("Register")
            .line("form: register".to_string())
            .line("field: email".to_string())
            .line("field: username".to_string())
            .line("field: password".to_string())
            .line("insert: users".to_string()))
    }
}

struct RegisterUi;

impl Page for RegisterUi {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let registered = ctx.store.list("users")?.len();
        Ok(PageBody::new("Create your account")
            .line("Email, username, password and confirmation".to_string())
            .line(format!("Joining {} registered users", registered)))
    }
}

/// First-run landing page after a student confirms their email
struct StudentWelcome;

impl Page for StudentWelcome {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let mut body = PageBody::new("Welcome!");
        if let Some(user) = &ctx.user {
            body.lines.push(format!("Glad you are here, {}", user.email));
        }
        let classes = ctx.store.list("classes")?;
        body.lines.push(format!("{} classes are open for enrollment:", classes.len()));
        for class in &classes {
            body.lines.push(format!("- {}", field_text(class, "name")));
        }
        Ok(body)
    }
}

pub fn definitions() -> Vec<PageDefinition> {
    vec![
        PageDefinition {
            module_id: "auth.login.agent",
            mode: ModeTag::Agent,
            routes: vec![RouteEntry::new("/auth/login", "Login")],
            ctor: || Box::new(LoginAgent),
        },
        PageDefinition {
            module_id: "auth.login.ui",
            mode: ModeTag::Ui,
            routes: vec![RouteEntry::new("/auth/login", "Login")],
            ctor: || Box::new(LoginUi),
        },
        PageDefinition {
            module_id: "auth.register.agent",
            mode: ModeTag::Agent,
            routes: vec![RouteEntry::new("/auth/register", "Register")],
            ctor: || Box::new(RegisterAgent),
        },
        PageDefinition {
            module_id: "auth.register.ui",
            mode: ModeTag::Ui,
            routes: vec![RouteEntry::new("/auth/register", "Register")],
            ctor: || Box::new(RegisterUi),
        },
        PageDefinition {
            module_id: "auth.student_welcome",
            mode: ModeTag::Ui,
            routes: vec![RouteEntry::new("/auth/student-welcome", "Student welcome")],
            ctor: || Box::new(StudentWelcome),
        },
    ]
}
