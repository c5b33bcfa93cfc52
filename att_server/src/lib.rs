//! HTTP server for the attendance platform.
//!
//! Exposes the authentication and role-protected endpoints over the
//! `attendance` core library. Split out as a library so integration tests
//! can build the router in-process.

pub mod api;
pub mod config;
pub mod logging;
