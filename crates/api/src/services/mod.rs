//! Business logic services for the recipes API.
//!
//! # Services
//!
//! - `favorites` - Per-user favorite recipes (toggle, list) and bearer
//!   authentication for the routes that need it

pub mod favorites;
