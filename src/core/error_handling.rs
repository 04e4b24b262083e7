// Retry and restart policies

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::warn;

use crate::config::RestartConfig;
use crate::error::{TradingError, TradingResult};

/// Run `operation` until it succeeds or fails with something other than a
/// timeout. Timeouts wait `delay` and try again with no attempt limit.
pub async fn retry_on_timeout<F, Fut, T>(delay: Duration, mut operation: F) -> TradingResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TradingResult<T>>,
{
    loop {
        match operation().await {
            Err(error) if error.is_timeout() => {
                warn!("⏳ {}. Retrying in {:?}...", error, delay);
                sleep(delay).await;
            }
            result => return result,
        }
    }
}

/// Bounded restart schedule with exponential backoff and jitter.
///
/// delay(n) = min(max_delay, base * multiplier^n) ± jitter
#[derive(Debug, Clone)]
pub struct RestartPolicy {
    max_restarts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    jitter_factor: f64,
    reset_after: Duration,
    attempt: u32,
}

impl RestartPolicy {
    pub fn new(
        max_restarts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
        jitter_factor: f64,
        reset_after: Duration,
    ) -> Self {
        Self {
            max_restarts,
            base_delay,
            max_delay,
            backoff_multiplier: backoff_multiplier.max(1.0),
            jitter_factor: jitter_factor.clamp(0.0, 1.0),
            reset_after,
            attempt: 0,
        }
    }

    pub fn from_config(config: &RestartConfig) -> Self {
        Self::new(
            config.max_restarts,
            Duration::from_secs(config.base_delay_secs),
            Duration::from_secs(config.max_delay_secs),
            config.backoff_multiplier,
            config.jitter_factor,
            Duration::from_secs(config.reset_after_secs),
        )
    }

    /// Delay before the next restart, or an error once the ceiling is passed
    pub fn next_delay(&mut self) -> TradingResult<Duration> {
        if self.attempt >= self.max_restarts {
            return Err(TradingError::RestartLimitReached(self.attempt));
        }

        let exp_secs = self.base_delay.as_secs_f64()
            * self.backoff_multiplier.powi(self.attempt as i32);
        let capped_secs = exp_secs.min(self.max_delay.as_secs_f64());

        let jitter_range = capped_secs * self.jitter_factor;
        let jitter = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };

        self.attempt = self.attempt.saturating_add(1);
        // Near the top of the Duration range the f64 sum can round past it
        Ok(Duration::try_from_secs_f64((capped_secs + jitter).max(0.0)).unwrap_or(self.max_delay))
    }

    /// A session that stayed up for `reset_after` earns a fresh restart budget
    pub fn note_session_uptime(&mut self, uptime: Duration) {
        if uptime >= self.reset_after {
            self.attempt = 0;
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self::from_config(&RestartConfig::default())
    }
}
