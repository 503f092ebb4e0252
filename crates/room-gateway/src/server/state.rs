//! Gateway state
//!
//! Application state for the gateway server. Every long-lived room service
//! is built here once and shared by all connections.

use crate::broadcast::Broadcaster;
use crate::connection::ConnectionRegistry;
use crate::lifecycle::{RateLimitPolicy, RateLimiter, RoomLifecycleMonitor};
use room_common::AppConfig;
use room_service::ServiceContext;
use std::sync::Arc;
use tokio::sync::watch;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with repositories and the id generator
    service_context: Arc<ServiceContext>,
    /// Joined sessions
    registry: Arc<ConnectionRegistry>,
    /// Fan-out over the registry
    broadcaster: Arc<Broadcaster>,
    /// Per-user message limiter
    rate_limiter: Arc<RateLimiter>,
    /// Empty-room purge
    monitor: RoomLifecycleMonitor,
    /// Application configuration
    config: Arc<AppConfig>,
    /// Flips to `true` once shutdown starts
    shutdown: Arc<watch::Sender<bool>>,
}

impl GatewayState {
    /// Create a new gateway state
    ///
    /// The rate limiter's sweeper is not started here; see [`RateLimiter::start`].
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        let service_context = Arc::new(service_context);
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitPolicy::from(&config.chat)));
        let monitor = RoomLifecycleMonitor::new(Arc::clone(&service_context));
        let (shutdown, _) = watch::channel(false);

        Self {
            service_context,
            registry,
            broadcaster,
            rate_limiter,
            monitor,
            config: Arc::new(config),
            shutdown: Arc::new(shutdown),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the connection registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Get the broadcaster
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Get the rate limiter
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Get the room lifecycle monitor
    pub fn monitor(&self) -> &RoomLifecycleMonitor {
        &self.monitor
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Receiver that observes the shutdown flag
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Tell every connection to close
    pub fn trigger_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("sessions", &self.registry.count())
            .field("rate_limiter", &self.rate_limiter.policy())
            .field("shutting_down", &self.is_shutting_down())
            .field("config", &"AppConfig")
            .finish()
    }
}
