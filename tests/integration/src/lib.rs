//! Integration test utilities for the room gateway
//!
//! This crate provides helpers for running end-to-end tests against a
//! spawned gateway: an HTTP client for `/health` and a WebSocket client
//! that speaks the room protocol.

pub mod helpers;

pub use helpers::*;
