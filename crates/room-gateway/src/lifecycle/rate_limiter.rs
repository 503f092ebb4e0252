//! Fixed-window rate limiter
//!
//! One record per identity: a count and the instant its window resets. An
//! expired window is replaced on the next check, so decisions never depend
//! on when the sweeper last ran. Time comes from the tokio clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use room_common::ChatConfig;
use room_core::Snowflake;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Limits and sweep cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Messages allowed per window
    pub limit: u32,
    pub window: Duration,
    /// How often expired records are dropped
    pub sweep_interval: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            limit: 10,
            window: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl From<&ChatConfig> for RateLimitPolicy {
    fn from(config: &ChatConfig) -> Self {
        Self {
            limit: config.rate_limit_messages,
            window: config.rate_limit_window(),
            sweep_interval: config.rate_limit_sweep(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateRecord {
    count: u32,
    reset_at: Instant,
}

/// Per-identity fixed-window counter
#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    records: Mutex<HashMap<Snowflake, RateRecord>>,
    running: AtomicBool,
    /// Stop signal of the current sweeper; each start gets its own channel
    stop_signal: Mutex<Option<watch::Sender<bool>>>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            records: Mutex::new(HashMap::new()),
            running: AtomicBool::new(false),
            stop_signal: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Count one message against `identity`; `false` means denied
    ///
    /// A denied call does not increment the count.
    pub fn check(&self, identity: Snowflake) -> bool {
        let now = Instant::now();
        let mut records = self.records.lock();
        let record = records.entry(identity).or_insert(RateRecord {
            count: 0,
            reset_at: now + self.policy.window,
        });

        if now >= record.reset_at {
            record.count = 0;
            record.reset_at = now + self.policy.window;
        }

        if record.count < self.policy.limit {
            record.count += 1;
            true
        } else {
            false
        }
    }

    /// Time until `identity`'s window resets; zero when it has no active window
    pub fn remaining(&self, identity: Snowflake) -> Duration {
        let now = Instant::now();
        self.records
            .lock()
            .get(&identity)
            .map_or(Duration::ZERO, |record| {
                record.reset_at.saturating_duration_since(now)
            })
    }

    /// Drop expired records, returning how many were removed
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| now < record.reset_at);
        before - records.len()
    }

    /// Number of tracked identities
    pub fn tracked(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the periodic sweeper
    pub fn start(self: Arc<Self>) {
        let mut stop_signal = self.stop_signal.lock();
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Rate limiter sweeper is already running");
            return;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        *stop_signal = Some(stop_tx);
        drop(stop_signal);

        let limiter = self.clone();
        tokio::spawn(async move {
            limiter.run(stop_rx).await;
        });

        tracing::info!(
            limit = self.policy.limit,
            window_ms = self.policy.window.as_millis() as u64,
            "Rate limiter sweeper started"
        );
    }

    /// Stop the sweeper; safe to call when it is not running
    pub fn stop(&self) {
        let mut stop_signal = self.stop_signal.lock();
        if self.running.swap(false, Ordering::SeqCst) {
            if let Some(stop_tx) = stop_signal.take() {
                stop_tx.send_replace(true);
            }
            tracing::info!("Rate limiter sweeper stopped");
        }
    }

    async fn run(&self, mut stop_rx: watch::Receiver<bool>) {
        let period = self.policy.sweep_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "Expired rate limit records swept");
                    }
                }
                // a closed channel also means this sweeper was stopped
                _ = stop_rx.changed() => break,
            }
        }

        tracing::debug!("Rate limiter sweeper loop ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitPolicy {
            limit,
            window: Duration::from_secs(window_secs),
            sweep_interval: Duration::from_secs(window_secs),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_allows_up_to_limit_then_denies() {
        let limiter = limiter(3, 60);
        let id = Snowflake::new(1);

        assert!(limiter.check(id));
        assert!(limiter.check(id));
        assert!(limiter.check(id));
        assert!(!limiter.check(id));
        assert!(!limiter.check(id));

        // other identities are independent
        assert!(limiter.check(Snowflake::new(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = limiter(2, 60);
        let id = Snowflake::new(1);

        assert!(limiter.check(id));
        assert!(limiter.check(id));
        assert!(!limiter.check(id));

        time::advance(Duration::from_secs(30)).await;
        assert!(!limiter.check(id));
        assert_eq!(limiter.remaining(id), Duration::from_secs(30));

        time::advance(Duration::from_secs(30)).await;
        assert!(limiter.check(id));
        assert_eq!(limiter.remaining(id), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_without_record_is_zero() {
        let limiter = limiter(2, 60);
        assert_eq!(limiter.remaining(Snowflake::new(9)), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_only_expired() {
        let limiter = limiter(5, 60);
        limiter.check(Snowflake::new(1));
        time::advance(Duration::from_secs(40)).await;
        limiter.check(Snowflake::new(2));

        time::advance(Duration::from_secs(20)).await;
        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.tracked(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_lifecycle() {
        let limiter = Arc::new(limiter(5, 10));
        limiter.check(Snowflake::new(1));

        limiter.clone().start();
        assert!(limiter.is_running());

        time::sleep(Duration::from_secs(11)).await;
        assert_eq!(limiter.tracked(), 0);

        limiter.stop();
        assert!(!limiter.is_running());
        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_quick_stop_keeps_sweeping() {
        let limiter = Arc::new(limiter(5, 10));

        // the first loop only sees the stop after the restart was requested
        limiter.clone().start();
        limiter.stop();
        tokio::task::yield_now().await;
        limiter.clone().start();
        assert!(limiter.is_running());

        limiter.check(Snowflake::new(1));
        time::sleep(Duration::from_secs(11)).await;
        assert_eq!(limiter.tracked(), 0);
        assert!(limiter.is_running());

        limiter.stop();
        assert!(!limiter.is_running());
    }
}
