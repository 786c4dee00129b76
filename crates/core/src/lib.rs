//! Table Recipes Core - Shared types library.
//!
//! This crate provides common types used across all Table Recipes components:
//! - `api` - HTTP service for recipes and per-user favorites
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain logic - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, recipes, identities and favorite sets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
