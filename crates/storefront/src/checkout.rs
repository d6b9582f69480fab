//! Deferred (simulated) checkout: clock abstraction, state machine, transport seam.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use cafecart_cart::CartSnapshot;
use cafecart_core::{CheckoutId, DomainError, DomainResult};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic tests and replays.
///
/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// External payment collaborator.
///
/// `submitted` receives the cart exactly as it was when the shopper pressed
/// the checkout trigger; `settled` fires once the deferred wait is over. The
/// simulated transport always settles successfully.
pub trait CheckoutTransport {
    fn submitted(&mut self, checkout_id: CheckoutId, snapshot: &CartSnapshot);

    fn settled(&mut self, checkout_id: CheckoutId, snapshot: &CartSnapshot, notice: &str);
}

/// Transport that only logs, used by the demo session.
#[derive(Debug, Default)]
pub struct LoggingCheckoutTransport;

impl CheckoutTransport for LoggingCheckoutTransport {
    fn submitted(&mut self, checkout_id: CheckoutId, snapshot: &CartSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(payload) => tracing::info!(%checkout_id, %payload, "checkout submitted"),
            Err(err) => tracing::warn!(%checkout_id, "snapshot not serializable: {err}"),
        }
    }

    fn settled(&mut self, checkout_id: CheckoutId, snapshot: &CartSnapshot, notice: &str) {
        tracing::info!(
            %checkout_id,
            total = %snapshot.total_price,
            items = snapshot.total_count,
            notice,
            "checkout settled"
        );
    }
}

/// A checkout waiting for its settlement instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCheckout {
    pub checkout_id: CheckoutId,
    pub snapshot: CartSnapshot,
    pub started_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CheckoutState {
    Idle,
    Pending(PendingCheckout),
    Completed {
        checkout_id: CheckoutId,
        completed_at: DateTime<Utc>,
    },
}

/// Fire-once deferred checkout with re-entry protection.
///
/// `Idle`/`Completed` → `Pending` on [`begin`](Self::begin); `Pending` →
/// `Completed` once the clock passes `due_at` and [`take_due`](Self::take_due)
/// is called. There is no cancellation and no failure path.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    state: CheckoutState,
    delay: TimeDelta,
}

impl CheckoutFlow {
    pub fn new(delay: TimeDelta) -> Self {
        Self {
            state: CheckoutState::Idle,
            delay,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, CheckoutState::Pending(_))
    }

    pub fn pending(&self) -> Option<&PendingCheckout> {
        match &self.state {
            CheckoutState::Pending(p) => Some(p),
            _ => None,
        }
    }

    /// Start a checkout. A second call while one is pending is rejected, as is
    /// a delay that would put the deadline past the end of the calendar.
    pub fn begin(
        &mut self,
        snapshot: CartSnapshot,
        now: DateTime<Utc>,
    ) -> DomainResult<&PendingCheckout> {
        if let CheckoutState::Pending(p) = &self.state {
            return Err(DomainError::conflict(format!(
                "checkout {} is still pending",
                p.checkout_id
            )));
        }
        if snapshot.lines.is_empty() {
            return Err(DomainError::validation("cannot check out an empty cart"));
        }

        let due_at = now.checked_add_signed(self.delay).ok_or_else(|| {
            DomainError::overflow(format!(
                "checkout delay of {}ms from {now} is out of range",
                self.delay.num_milliseconds()
            ))
        })?;

        self.state = CheckoutState::Pending(PendingCheckout {
            checkout_id: CheckoutId::new(),
            snapshot,
            started_at: now,
            due_at,
        });
        self.pending()
            .ok_or_else(|| DomainError::invariant("checkout not pending after begin"))
    }

    /// Complete the pending checkout if its wait has elapsed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<PendingCheckout> {
        let due = matches!(&self.state, CheckoutState::Pending(p) if now >= p.due_at);
        if !due {
            return None;
        }
        let previous = std::mem::replace(&mut self.state, CheckoutState::Idle);
        match previous {
            CheckoutState::Pending(p) => {
                self.state = CheckoutState::Completed {
                    checkout_id: p.checkout_id,
                    completed_at: now,
                };
                Some(p)
            }
            other => {
                self.state = other;
                None
            }
        }
    }
}

/// Enabled/busy state and label of a submission trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerState {
    pub enabled: bool,
    pub busy: bool,
    pub label: String,
}
