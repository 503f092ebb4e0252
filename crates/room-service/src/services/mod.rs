//! Room services
//!
//! Each service borrows a [`ServiceContext`] and orchestrates repository calls
//! for one concern.

pub mod context;
pub mod error;
pub mod message;
pub mod user;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use message::MessageService;
pub use user::UserService;
