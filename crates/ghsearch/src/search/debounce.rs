//! Debounce, dedup and emptiness filter for the raw query text.

use std::time::Duration;

use tokio::time::Instant;

/// Quiet period before a query is considered settled.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Timer-guarded state machine that turns raw keystrokes into stable queries.
///
/// Each [`input`](Self::input) restarts the quiet period. Once it elapses,
/// [`fire`](Self::fire) yields the pending value unless it equals the
/// previously debounced value or is empty.
///
/// Dedup compares against the last *debounced* value, empty strings included,
/// so typing `"a"`, clearing the box and typing `"a"` again searches twice.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<Pending>,
    last_debounced: Option<String>,
}

#[derive(Debug, Clone)]
struct Pending {
    value: String,
    deadline: Instant,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_debounced: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Record a new raw value observed at `now`, restarting the timer.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some(Pending {
            value: value.into(),
            deadline: now + self.quiet,
        });
    }

    /// When the pending value settles, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Note a query that was issued without going through [`fire`](Self::fire),
    /// so later typed input is deduplicated against it.
    pub fn record(&mut self, issued: &str) {
        self.last_debounced = Some(issued.to_string());
    }

    /// Settle the pending value if its quiet period is over.
    ///
    /// Returns the stable query to fetch, or `None` when nothing is due, the
    /// value repeats the previous one, or it is empty.
    pub fn fire(&mut self, now: Instant) -> Option<String> {
        if self.deadline().is_none_or(|deadline| now < deadline) {
            return None;
        }
        let value = self.pending.take()?.value;

        if self.last_debounced.as_deref() == Some(value.as_str()) {
            tracing::trace!(query = %value, "Dropping duplicate query");
            return None;
        }
        self.last_debounced = Some(value.clone());

        if value.is_empty() {
            return None;
        }
        Some(value)
    }
}
