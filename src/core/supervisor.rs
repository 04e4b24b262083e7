// Session supervision: journaling outcomes and bounded restarts

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Once;
use std::time::Instant;

use futures_util::FutureExt;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::clients::PriceFeed;
use crate::config::Config;
use crate::core::error_handling::RestartPolicy;
use crate::core::live_trading::{SessionOutcome, TradingSession};
use crate::error::{TradingError, TradingResult};
use crate::journal::{Journal, SessionState};

pub const CAPITAL_LOST_REASON: &str = "Capital lost (balance 0)";

thread_local! {
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

pub struct Supervisor<'a> {
    config: &'a Config,
    journal: &'a Journal,
    policy: RestartPolicy,
}

impl<'a> Supervisor<'a> {
    pub fn new(config: &'a Config, journal: &'a Journal) -> Self {
        Self {
            config,
            journal,
            policy: RestartPolicy::from_config(&config.restart),
        }
    }

    pub fn with_policy(config: &'a Config, journal: &'a Journal, policy: RestartPolicy) -> Self {
        Self { config, journal, policy }
    }

    /// Run sessions until one ends by capital loss or shutdown. Faulted
    /// sessions are journaled and restarted under the restart policy; the
    /// first session adds `deposit` to the carried balance, restarts add nothing.
    pub async fn run<F, S>(&mut self, feed: &mut F, deposit: f64, shutdown: S) -> TradingResult<SessionState>
    where
        F: PriceFeed,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        install_panic_trace_hook();
        let mut deposit = deposit;

        loop {
            let previous = self.journal.sessions.load()?;
            let capital = deposit + previous.balance;
            deposit = 0.0;

            take_panic_trace();
            let started = Instant::now();
            let mut session = TradingSession::new(&self.config.trading, &self.journal.operations, capital);
            let result = AssertUnwindSafe(session.run(feed, &mut shutdown)).catch_unwind().await;
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let mut message = panic_message(panic.as_ref());
                    if let Some(trace) = take_panic_trace() {
                        message = format!("{} {}", message, trace);
                    }
                    SessionOutcome::Fault {
                        error: TradingError::SessionPanicked(message),
                        final_value: session.total_value(),
                    }
                }
            };

            match outcome {
                SessionOutcome::CapitalLost => {
                    self.journal.errors.record(CAPITAL_LOST_REASON, 0.0)?;
                    let state = self.journal.sessions.record(0.0, false)?;
                    self.render_chart();
                    return Ok(state);
                }
                SessionOutcome::Interrupted { final_value } => {
                    let won = final_value > capital;
                    let state = self.journal.sessions.record(final_value, won)?;
                    self.render_chart();
                    info!(
                        "🛑 Session closed manually. Final balance: {:.2} {} (Win: {})",
                        final_value, self.config.trading.quote_asset, won
                    );
                    return Ok(state);
                }
                SessionOutcome::Fault { error: fault, final_value } => {
                    error!("❌ Unexpected error [{}]: {}", fault.category(), fault);
                    self.journal.errors.record(
                        &format!("Unexpected error [{}]: {}", fault.category(), fault),
                        final_value,
                    )?;
                    self.journal.sessions.record(final_value, false)?;
                    self.render_chart();

                    self.policy.note_session_uptime(started.elapsed());
                    let delay = self.policy.next_delay()?;
                    warn!(
                        "🔁 Restarting in {:.1}s (restart {}/{})",
                        delay.as_secs_f64(),
                        self.policy.attempt(),
                        self.config.restart.max_restarts
                    );

                    tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            info!("🛑 Shutdown during restart backoff");
                            return self.journal.sessions.load();
                        }
                        _ = sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// A failed chart never stops the run
    fn render_chart(&self) {
        match self.journal.chart.render_from_log(&self.journal.operations) {
            Ok(true) => info!("📈 Chart written to {}", self.journal.chart.path().display()),
            Ok(false) => {}
            Err(e) => warn!("⚠️  Could not render chart: {}", e),
        }
    }
}

/// Chain a hook that keeps the location of the last panic on this thread,
/// plus the backtrace when `RUST_BACKTRACE` enables one. The previous hook
/// still runs.
fn install_panic_trace_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let mut trace = match info.location() {
                Some(location) => format!(
                    "at {}:{}:{}",
                    location.file(),
                    location.line(),
                    location.column()
                ),
                None => "at unknown location".to_string(),
            };
            let backtrace = Backtrace::capture();
            if backtrace.status() == BacktraceStatus::Captured {
                trace.push('\n');
                trace.push_str(&backtrace.to_string());
            }
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

fn take_panic_trace() -> Option<String> {
    PANIC_TRACE.with(|slot| slot.borrow_mut().take())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
