// PageGate - Student Pages
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Student-facing content: class selection, subject/topic browsing, quiz
// view, leaderboard, progress. All role-gated to "student" except the
// course/achievement showcases, which the portal leaves public.

use crate::route::{ModeTag, Page, PageBody, PageContext, PageDefinition, RouteEntry};
use crate::store::{field_text, TableStore};
use anyhow::Result;

struct ClassSelection;

impl Page for ClassSelection {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let classes = ctx.store.list("classes")?;
        let mut body = PageBody::new("Pick your class");
        for class in &classes {
            body.lines.push(format!(
                "{}: {}",
                field_text(class, "id"),
                field_text(class, "name")
            ));
        }
        Ok(body)
    }
}

struct SubjectList;

impl Page for SubjectList {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let subjects = ctx.store.list("subjects")?;
        let mut body = PageBody::new("Subjects");
        for subject in &subjects {
            body.lines.push(format!(
                "{}: {} (topics at /student/subjects/{}/topics)",
                field_text(subject, "id"),
                field_text(subject, "name"),
                field_text(subject, "id"),
            ));
        }
        Ok(body)
    }
}

/// Topics inside one subject — subjectId bound from the path
struct TopicList;

impl Page for TopicList {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let subject_id = ctx.param("subjectId").unwrap_or("?");
        let topics = ctx
            .store
            .list(&format!("topics?subject_id=eq.{}", subject_id))?;
        let mut body = PageBody::new("Topics");
        body.lines.push(format!("Subject {}", subject_id));
        for topic in &topics {
            body.lines.push(format!("- {}", field_text(topic, "title")));
        }
        if topics.is_empty() {
            body.lines.push("No topics yet".to_string());
        }
        Ok(body)
    }
}

struct QuizView;

impl Page for QuizView {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let quiz_id = ctx.param("quizId").unwrap_or("?");
        let mut body = PageBody::new("Quiz");
        match ctx.store.get("quizzes", quiz_id)? {
            Some(quiz) => {
                body.lines.push(field_text(&quiz, "title"));
                let questions = ctx
                    .store
                    .list(&format!("questions?quiz_id=eq.{}", quiz_id))?;
                body.lines.push(format!("{} questions", questions.len()));
            }
            None => body.lines.push(format!("Quiz {} not found", quiz_id)),
        }
        Ok(body)
    }
}

struct Leaderboard;

impl Page for Leaderboard {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let mut entries = ctx.store.list("progress")?;
        // Highest XP first; ordering beyond that is whatever the store returned
        entries.sort_by_key(|e| {
            std::cmp::Reverse(e.get("xp").and_then(|v| v.as_u64()).unwrap_or(0))
        });
        let mut body = PageBody::new("Leaderboard");
        for (rank, entry) in entries.iter().enumerate() {
            body.lines.push(format!(
                "#{} {} — {} XP",
                rank + 1,
                field_text(entry, "user_id"),
                field_text(entry, "xp"),
            ));
        }
        Ok(body)
    }
}

struct ProgressOverview;

impl Page for ProgressOverview {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let mut body = PageBody::new("Your progress");
        let Some(user) = &ctx.user else {
            body.lines.push("Sign in to track progress".to_string());
            return Ok(body);
        };
        let rows = ctx
            .store
            .list(&format!("progress?user_id=eq.{}", user.id))?;
        match rows.first() {
            Some(row) => {
                body.lines.push(format!("XP: {}", field_text(row, "xp")));
                body.lines
                    .push(format!("Streak: {}", field_text(row, "streak")));
            }
            None => body.lines.push("No progress recorded yet".to_string()),
        }
        Ok(body)
    }
}

/// Course catalogue showcase (interactive universe only)
struct Courses;

impl Page for Courses {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let courses = ctx.store.list("courses")?;
        let mut body = PageBody::new("Courses");
        for course in &courses {
            body.lines.push(format!("- {}", field_text(course, "title")));
        }
        Ok(body)
    }
}

struct Achievements;

impl Page for Achievements {
    fn render(&self, ctx: &PageContext) -> Result<PageBody> {
        let badges = ctx.store.list("badges")?;
        let mut body = PageBody::new("Achievements");
        for badge in &badges {
            body.lines.push(format!("- {}", field_text(badge, "name")));
        }
        Ok(body)
    }
}

pub fn definitions() -> Vec<PageDefinition> {
    vec![
        PageDefinition {
            module_id: "student.classes",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/student/classes", "Class selection").with_roles(&["student"]),
            ],
            ctor: || Box::new(ClassSelection),
        },
        PageDefinition {
            module_id: "student.subjects",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/student/subjects", "Subjects").with_roles(&["student"]),
            ],
            ctor: || Box::new(SubjectList),
        },
        PageDefinition {
            module_id: "student.topics",
            mode: ModeTag::Both,
            routes: vec![RouteEntry::new("/student/subjects/:subjectId/topics", "Topics")
                .with_roles(&["student"])],
            ctor: || Box::new(TopicList),
        },
        PageDefinition {
            module_id: "student.quiz",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/student/quizzes/:quizId", "Quiz").with_roles(&["student"]),
            ],
            ctor: || Box::new(QuizView),
        },
        PageDefinition {
            module_id: "student.leaderboard",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/student/leaderboard", "Leaderboard").with_roles(&["student"]),
            ],
            ctor: || Box::new(Leaderboard),
        },
        PageDefinition {
            module_id: "student.progress",
            mode: ModeTag::Both,
            routes: vec![
                RouteEntry::new("/student/progress", "Progress").with_roles(&["student"]),
            ],
            ctor: || Box::new(ProgressOverview),
        },
        PageDefinition {
            module_id: "student.courses.ui",
            mode: ModeTag::Ui,
            routes: vec![RouteEntry::new("/student/courses", "Courses")],
            ctor: || Box::new(Courses),
        },
        PageDefinition {
            module_id: "student.achievements.ui",
            mode: ModeTag::Ui,
            routes: vec![RouteEntry::new("/student/achievements", "Achievements")],
            ctor: || Box::new(Achievements),
        },
    ]
}
