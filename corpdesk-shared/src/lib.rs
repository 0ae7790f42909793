//! # corpdesk Shared Library
//!
//! Domain types, persistence, and business rules used by the corpdesk API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, companies, adds)
//! - `db`: Connection pool and embedded migrations
//! - `auth`: Password hashing
//! - `cascade`: Status propagation and cascading deletes

pub mod auth;
pub mod cascade;
pub mod db;
pub mod models;

/// Current version of the corpdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
