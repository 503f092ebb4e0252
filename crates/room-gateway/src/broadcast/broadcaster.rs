//! Broadcaster
//!
//! Each call serializes the frame once and queues the same buffer on every
//! target. Delivery is at-most-once with no retry; a failure on one session
//! is logged and does not stop delivery to the rest.

use std::sync::Arc;

use crate::connection::{ConnectionRegistry, Session};
use crate::protocol::ServerFrame;

/// Outcome of one fan-out
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Sends frames to registered sessions
#[derive(Debug)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Every registered session
    pub fn to_all(&self, frame: &ServerFrame) -> DeliveryReport {
        self.fan_out(self.registry.all(), frame)
    }

    /// Every registered session except `exclude_conn_id`
    pub fn to_others(&self, exclude_conn_id: &str, frame: &ServerFrame) -> DeliveryReport {
        let targets = self
            .registry
            .all()
            .into_iter()
            .filter(|session| session.conn_id != exclude_conn_id);
        self.fan_out(targets, frame)
    }

    /// A single session, if registered
    pub fn to_one(&self, conn_id: &str, frame: &ServerFrame) -> DeliveryReport {
        self.fan_out(self.registry.get(conn_id), frame)
    }

    fn fan_out<I>(&self, targets: I, frame: &ServerFrame) -> DeliveryReport
    where
        I: IntoIterator<Item = Session>,
    {
        let mut targets = targets.into_iter().peekable();
        let mut report = DeliveryReport::default();
        if targets.peek().is_none() {
            return report;
        }

        let payload: Arc<str> = match frame.to_json() {
            Ok(json) => Arc::from(json),
            Err(e) => {
                tracing::error!(frame = frame.kind(), error = %e, "Failed to serialize frame");
                report.failed = targets.count();
                return report;
            }
        };

        for session in targets {
            if !session.handle.is_open() {
                tracing::debug!(conn_id = %session.conn_id, "Skipping closed connection");
                report.failed += 1;
                continue;
            }
            match session.handle.deliver(Arc::clone(&payload)) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        conn_id = %session.conn_id,
                        frame = frame.kind(),
                        error = %e,
                        "Failed to deliver frame"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::trace!(
            frame = frame.kind(),
            delivered = report.delivered,
            failed = report.failed,
            "Frame broadcast"
        );

        report
    }
}
