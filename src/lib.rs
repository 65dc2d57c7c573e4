//! # Social API Library
//!
//! REST backend for a photo-sharing social network:
//! - Accounts, bearer-token auth and the follow graph
//! - Posts, likes, comments and saved posts
//! - Direct-message rooms
//! - Activity notifications pushed over a WebSocket gateway
//!
//! ## Architecture
//!
//! - **Domain Layer**: Core entities and repository traits
//! - **Application Layer**: Business services and DTOs
//! - **Infrastructure Layer**: PostgreSQL repositories, Redis, metrics
//! - **Presentation Layer**: HTTP handlers, middleware and the gateway
//!
//! ## Module Structure
//!
//! ```text
//! social_api/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities and repository traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, Redis and metrics
//! +-- presentation/   HTTP routes, middleware and WebSocket gateway
//! +-- shared/         Common utilities (errors, snowflake IDs, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
