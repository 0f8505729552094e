//! Libris: a session-gated library catalog server.
//!
//! Library crate for integration tests and the `libris` binary.

pub mod admin;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
