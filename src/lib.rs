//! Feedback widget server.
//!
//! Serves the feedback API (`/api/feedback`), the embeddable `my-widget`
//! element and a small host page, all backed by [`feedback_core`].

pub mod api;
pub mod config;
pub mod widget;

pub use feedback_core::{db, models};
