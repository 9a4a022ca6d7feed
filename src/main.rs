// PageGate - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI and portal shell. All page navigation routes through this gateway.
// Usage:
//   page-gate serve                          # Run portal shell (stdio JSON)
//   page-gate resolve <location>             # One-shot navigation, print outcome
//   page-gate routes [--agent]               # List a universe's registry
//   page-gate status                         # Show portal status
//   page-gate seed                           # Seed demo data into the backend

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use page_gate::{
    config::{BackendConfig, PortalConfig},
    dispatch::Dispatcher,
    manifest,
    route::PortalMode,
    session::{password_digest, StoreAuthProvider},
    shell,
    store::TableStore,
    table_db::TableDb,
    web::RemoteTableStore,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "page-gate")]
#[command(author = "Joseph Stone")]
#[command(version = "1.0.0")]
#[command(about = "PageGate - education portal page gateway with role-gated route dispatch")]
struct Cli {
    /// Portal config file (JSON)
    #[arg(short, long, default_value = "portal.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the portal shell (JSON requests over stdio)
    Serve,

    /// One-shot navigation — resolve a location and print the outcome
    Resolve {
        /// Location, e.g. "/teacher/lessons?agentMode=true"
        location: String,
    },

    /// List the route registry for one universe
    Routes {
        /// List the agent universe instead of the interactive UI
        #[arg(long)]
        agent: bool,
    },

    /// Show portal status
    Status,

    /// Seed demo users and content into an empty backend
    Seed,
}

/// Open the configured table-store backend
fn open_store(config: &PortalConfig) -> Result<Arc<dyn TableStore>> {
    match &config.backend {
        BackendConfig::Local { path } => {
            let db = TableDb::open(path)
                .with_context(|| format!("Failed to open TABLES LMDB at {:?}", path))?;
            Ok(Arc::new(db))
        }
        BackendConfig::Remote { base_url, api_key } => {
            let store = RemoteTableStore::new(base_url, api_key)
                .with_context(|| format!("Failed to reach backend at {}", base_url))?;
            Ok(Arc::new(store))
        }
    }
}

/// Seed demo content if the users table is empty.
/// Safe to run repeatedly — an already-populated store is left alone.
fn seed_demo(store: &dyn TableStore) -> Result<usize> {
    if !store.list("users")?.is_empty() {
        log::info!("store already populated, skipping seed");
        return Ok(0);
    }

    let records: Vec<(&str, serde_json::Value)> = vec![
        ("users", json!({"id": "admin1", "email": "admin@portal", "role": "admin",
                         "password": password_digest("admin123")})),
        ("users", json!({"id": "t1", "email": "teacher@portal", "role": "teacher",
                         "password": password_digest("teacher123")})),
        ("users", json!({"id": "s1", "email": "student@portal", "role": "student",
                         "password": password_digest("student123")})),
        ("user_delegations", json!({"delegator_id": "admin1", "target_user_id": "t1",
                                    "is_active": true})),
        ("classes", json!({"id": "c1", "name": "4A"})),
        ("classes", json!({"id": "c2", "name": "4B"})),
        ("subjects", json!({"id": "m1", "name": "Mathematics"})),
        ("subjects", json!({"id": "p1", "name": "Polish"})),
        ("topics", json!({"title": "Fractions", "subject_id": "m1"})),
        ("topics", json!({"title": "Decimals", "subject_id": "m1"})),
        ("topics", json!({"title": "Spelling", "subject_id": "p1"})),
        ("lessons", json!({"id": "l1", "title": "Intro to fractions",
                           "description": "Halves and quarters", "author_id": "t1"})),
        ("quizzes", json!({"id": "q1", "title": "Fractions check", "lesson_id": "l1"})),
        ("questions", json!({"quiz_id": "q1", "text": "What is 1/2 + 1/4?"})),
        ("badges", json!({"name": "First steps", "xp_required": 10})),
        ("badges", json!({"name": "Quiz master", "xp_required": 500})),
        ("progress", json!({"user_id": "s1", "xp": 120, "streak": 4})),
        ("courses", json!({"title": "Math fundamentals"})),
    ];

    let count = records.len();
    for (resource, record) in records {
        store
            .insert(resource, record)
            .with_context(|| format!("seed insert into '{}' failed", resource))?;
    }
    log::info!("seeded {} demo records", count);
    Ok(count)
}

fn main() -> Result<()> {
    // Initialize logging (safe if already init)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let cli = Cli::parse();
    let config = PortalConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;

    // Both universes built before the first navigation resolves.
    // A duplicate literal path aborts right here, loudly.
    let definitions = manifest::page_definitions();
    let dispatcher = Dispatcher::boot(config.clone(), &definitions)
        .context("route registry construction failed")?;

    match &cli.command {
        Commands::Serve => {
            let store = open_store(&config)?;
            if config.seed_demo_data {
                seed_demo(store.as_ref())?;
            }
            let provider = StoreAuthProvider::new(Arc::clone(&store));
            provider.finish_restore();

            // Blocks until stdin closes
            shell::run(dispatcher, provider, store.as_ref());
        }

        Commands::Resolve { location } => {
            let store = open_store(&config)?;
            if config.seed_demo_data {
                seed_demo(store.as_ref())?;
            }
            let provider = StoreAuthProvider::new(Arc::clone(&store));
            provider.finish_restore();

            let mut dispatcher = dispatcher;
            let outcome =
                shell::drive_to_settled(&mut dispatcher, location, &provider, store.as_ref());
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Routes { agent } => {
            let mode = if *agent { PortalMode::Agent } else { PortalMode::Ui };
            let registry = dispatcher.registry(mode);
            println!("{} universe — {} routes", mode.label(), registry.len());
            for route in registry.iter() {
                let roles = route
                    .roles
                    .as_ref()
                    .map(|r| r.join(","))
                    .unwrap_or_else(|| "public".to_string());
                println!("  {:<42} {:<20} [{}] -> {}", route.path, route.title, roles, route.module_id);
            }
        }

        Commands::Status => {
            println!("PageGate v1.0.0");
            println!("Site: {}", config.site_name);
            println!("Config: {:?}", cli.config);
            match &config.backend {
                BackendConfig::Local { path } => println!("Backend: LMDB at {:?}", path),
                BackendConfig::Remote { base_url, .. } => println!("Backend: hosted at {}", base_url),
            }
            println!();
            println!(
                "UI universe:    {} routes",
                dispatcher.registry(PortalMode::Ui).len()
            );
            println!(
                "Agent universe: {} routes",
                dispatcher.registry(PortalMode::Agent).len()
            );
            println!();
            println!("Entry point: {}", config.login_path);
            println!("Root redirect: {}", config.root_redirect);
        }

        Commands::Seed => {
            let store = open_store(&config)?;
            let count = seed_demo(store.as_ref())?;
            if count == 0 {
                println!("Store already populated — nothing seeded.");
            } else {
                println!("Seeded {} demo records.", count);
                println!("Demo logins: admin@portal / teacher@portal / student@portal");
            }
        }
    }

    Ok(())
}
