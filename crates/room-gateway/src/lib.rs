//! # room-gateway
//!
//! WebSocket gateway for the single chat room: protocol frames, the live
//! session registry, fan-out, rate limiting, the empty-room purge, and the
//! axum server that ties them together.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, run_server, shutdown_signal, GatewayState};
