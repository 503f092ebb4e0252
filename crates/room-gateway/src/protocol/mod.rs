//! Wire protocol
//!
//! JSON text frames with a `type` discriminator. Clients send `join`,
//! `message` and `heartbeat`; the server answers with the frames in
//! [`ServerFrame`].

mod frames;

pub use frames::{ClientFrame, ErrorCode, MessagePayload, ServerFrame, UserPayload};
