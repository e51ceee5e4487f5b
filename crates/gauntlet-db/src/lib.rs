//! Database layer for Gauntlet.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization
//! and embedded SQL migrations. Every table is created through versioned
//! migrations managed by this crate.
//!
//! # Tables
//!
//! - `sessions`: one row per practice session and its scenario
//! - `session_event_log`: append-only session activity, sequenced per session
//! - `scorecards`: terminal scorecards with their transcript

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError, MEMORY_PATH};
