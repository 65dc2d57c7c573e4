//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod comment;
pub mod health;
pub mod metrics;
pub mod notification;
pub mod post;
pub mod room;
pub mod saved_post;
pub mod user;
