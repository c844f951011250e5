//! Core library for the feedback widget.
//!
//! This crate provides the feedback model and its database operations,
//! independent of any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use feedback_core::db::Database;
//! use feedback_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let feedbacks = db.list_feedback()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
