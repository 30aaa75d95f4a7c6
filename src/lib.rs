//! SmartMark: a bookmark manager that keeps a per-user collection in sync
//! with a backing store and layers local favorites on top.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
