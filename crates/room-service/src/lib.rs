//! # room-service
//!
//! Application layer: the room's use cases (join, leave, post, history,
//! purge) expressed over the `room-core` store contract.

pub mod services;

pub use services::{
    MessageService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    UserService,
};
