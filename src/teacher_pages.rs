// PageGate - Teacher Pages
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Authoring surface. The lesson editor is the flattening case: one
// definition, one renderable unit, two registered paths (create + edit).

use crate::route::{ModeTag, Page, PageBody, PageContext, PageDefinition, RouteEntry};
use crate::store::{field_text, TableStore};
use anyhow::Result;

/// Lessons owned by the signed-in teacher
struct TeacherLessons;

impl Page for TeacherLessons {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let mut body = PageBody::new("Manage Lessons");
        let Some(user) = &ctx.user else {
            body.lines.push("Sign in to manage lessons".to_string());
            return Ok(body);
        };
        let lessons = ctx
            .store
            .list(&format!("lessons?author_id=eq.{}", user.id))?;
        body.lines.push(format!("{} lessons", lessons.len()));
        for lesson in &lessons {
            body.lines.push(format!(
                "{}: {}",
                field_text(lesson, "id"),
                field_text(lesson, "title")
            ));
        }
        Ok(body)
    }
}

struct LessonDetail;

impl Page for LessonDetail {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let lesson_id = ctx.param("lessonId").unwrap_or("?");
        let mut body = PageBody::new("Lesson");
        match ctx.store.get("lessons", lesson_id)? {
            Some(lesson) => {
                body.lines.push(field_text(&lesson, "title"));
                body.lines
                    .push(format!("Description: {}", field_text(&lesson, "description")));
                let quizzes = ctx
                    .store
                    .list(&format!("quizzes?lesson_id=eq.{}", lesson_id))?;
                body.lines.push(format!("{} quizzes attached", quizzes.len()));
            }
            None => body.lines.push(format!("Lesson {} not found", lesson_id)),
        }
        Ok(body)
    }
}

/// Create/edit form. Which one depends on whether the path bound a lessonId.
struct LessonEditor;

impl Page for LessonEditor {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        match ctx.param("lessonId") {
            Some(lesson_id) => {
                let mut body = PageBody::new("Edit lesson");
                match ctx.store.get("lessons", lesson_id)? {
                    Some(lesson) => {
                        body.lines.push(format!("Editing: {}", field_text(&lesson, "title")));
                        body.lines.push("Fields: title, description".to_string());
                    }
                    None => body.lines.push(format!("Lesson {} not found", lesson_id)),
                }
                Ok(body)
            }
            None => Ok(PageBody::new("New lesson")
                .line("Fields: title, description".to_string())
                .line("insert: lessons".to_string())),
        }
    }
}

struct ArticleEditor;

impl Page for ArticleEditor {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        match ctx.param("articleId") {
            Some(article_id) => Ok(PageBody::new("Edit article")
                .line(format!("Article {}", article_id))
                .line("Fields: title, body".to_string())),
            None => Ok(PageBody::new("New article")
                .line("Fields: title, body".to_string())
                .line("insert: articles".to_string())),
        }
    }
}

/// Teaching overview (interactive universe only)
struct TeacherDashboard;

impl Page for TeacherDashboard {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let mut body = PageBody::new("Teacher dashboard");
        let Some(user) = &ctx.user else {
            return Ok(body);
        };
        let lessons = ctx
            .store
            .list(&format!("lessons?author_id=eq.{}", user.id))?;
        let articles = ctx
            .store
            .list(&format!("articles?author_id=eq.{}", user.id))?;
        body.lines.push(format!(
            "{} lessons, {} articles",
            lessons.len(),
            articles.len()
        ));
        Ok(body)
    }
}

pub fn definitions() -> Vec<PageDefinition> {
    vec![
        PageDefinition {
            module_id: "teacher.lessons",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/teacher/lessons", "Manage Lessons").with_roles(&["teacher"]),
            ],
            ctor: || Box::new(TeacherLessons),
        },
        PageDefinition {
            module_id: "teacher.lesson_detail",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/teacher/lessons/:lessonId", "Lesson").with_roles(&["teacher"]),
            ],
            ctor: || Box::new(LessonDetail),
        },
        PageDefinition {
            module_id: "teacher.lesson_editor",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/teacher/lessons/create", "New lesson").with_roles(&["teacher"]),
                RouteEntry::new("/teacher/lessons/:lessonId/edit", "Edit lesson")
                    .with_roles(&["teacher"]),
            ],
            ctor: || Box::new(LessonEditor),
        },
        PageDefinition {
            module_id: "teacher.article_editor",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/teacher/articles/create", "New article")
                    .with_roles(&["teacher"]),
                RouteEntry::new("/teacher/articles/:articleId/edit", "Edit article")
                    .with_roles(&["teacher"]),
            ],
            ctor: || Box::new(ArticleEditor),
        },
        PageDefinition {
            module_id: "teacher.dashboard.ui",
            mode: ModeTag::Ui,
            routes: vec![
                RouteEntry::new("/teacher/dashboard", "Teacher dashboard")
                    .with_roles(&["teacher"]),
            ],
            ctor: || Box::new(TeacherDashboard),
        },
    ]
}
