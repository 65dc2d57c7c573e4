//! # Domain Layer
//!
//! The domain layer contains the core business objects of the social API.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (User, Post, Comment, Room, etc.)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate small domain rules (ownership, room pairs)

pub mod entities;

// Re-export commonly used types
pub use entities::*;
