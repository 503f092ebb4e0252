//! Ports the domain needs from the outside world

mod repositories;

pub use repositories::{MessageRepository, RepoResult, UserRepository};
