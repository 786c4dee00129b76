//! Table Recipes API library.
//!
//! The recipe catalog and per-user favorites service behind the Table
//! Recipes web client. Exposed as a library so the binary, the CLI and the
//! integration tests share one router and one set of stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
