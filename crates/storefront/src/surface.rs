//! Interaction surface: named trigger points wired to the cart and renderer.
//!
//! Every handler runs synchronously to completion: store mutation, full
//! re-render, then observer notification. The only deferred work is the
//! simulated checkout, driven by [`Storefront::poll`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cafecart_cart::{AddItem, Cart, CartCommand, CartEvent, ClearCart, DecrementItem, IncrementItem};
use cafecart_core::{CartId, CheckoutId, DomainResult, Money, ProductId};
use cafecart_events::{EventBus, InMemoryEventBus, Subscription, execute};

use crate::checkout::{CheckoutFlow, CheckoutState, CheckoutTransport, Clock, TriggerState};
use crate::config::{HandoffConfig, StorefrontConfig};
use crate::error::StorefrontResult;
use crate::handoff::{LinkOpener, handoff_url, order_summary};
use crate::render::{CartView, Renderer, RowAction, RowControl};

/// Validated data of one add-to-cart trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTrigger {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
}

impl AddTrigger {
    /// Build from the trigger's three string attributes (id, name, price).
    pub fn from_attributes(id: &str, name: &str, price: &str) -> DomainResult<Self> {
        Ok(Self {
            product_id: ProductId::parse(id)?,
            name: name.trim().to_string(),
            unit_price: Money::parse(price)?,
        })
    }
}

/// Process-wide background scroll lock.
///
/// Clones share one flag, so several views (cart drawer, navigation drawer)
/// can lock and restore the same page.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    locked: Arc<AtomicBool>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) {
        self.locked.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Applied,
    /// The control was current but its product is no longer in the cart.
    NoOp,
    /// The control belongs to a superseded render and was ignored.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started(CheckoutId),
    /// A checkout is already pending; the trigger is disabled.
    Busy,
    EmptyCart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    Opened { url: String },
    EmptyCart,
}

/// Named interaction points of the storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Add(AddTrigger),
    Press(RowControl),
    Open,
    Close,
    DismissOverlay,
    SubmitCheckout,
    SubmitHandoff,
    /// Host timer tick; settles a due checkout.
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added,
    Pressed(PressOutcome),
    Visibility { open: bool },
    Checkout(SubmitOutcome),
    Handoff(HandoffOutcome),
    Settled(Option<CheckoutId>),
}

/// The cart widget: owns cart state, the current view and drawer state.
pub struct Storefront<C, T, L> {
    cart: Cart,
    renderer: Renderer,
    view: CartView,
    generation: u64,
    drawer_open: bool,
    scroll: ScrollLock,
    checkout: CheckoutFlow,
    handoff: HandoffConfig,
    bus: Arc<InMemoryEventBus<CartEvent>>,
    clock: C,
    transport: T,
    opener: L,
}

impl<C, T, L> Storefront<C, T, L>
where
    C: Clock,
    T: CheckoutTransport,
    L: LinkOpener,
{
    pub fn new(
        config: &StorefrontConfig,
        clock: C,
        transport: T,
        opener: L,
    ) -> StorefrontResult<Self> {
        config.validate()?;
        let delay = config.checkout_delay()?;
        let renderer = Renderer::new(config.currency_format(), config.labels.clone());
        let cart = Cart::new(CartId::new());
        let view = renderer.render(&cart, 0);

        tracing::debug!(cart_id = %cart.id_typed(), locale = config.locale.as_str(), "storefront ready");

        Ok(Self {
            cart,
            renderer,
            view,
            generation: 0,
            drawer_open: false,
            scroll: ScrollLock::new(),
            checkout: CheckoutFlow::new(delay),
            handoff: config.handoff.clone(),
            bus: Arc::new(InMemoryEventBus::new()),
            clock,
            transport,
            opener,
        })
    }

    /// Share a scroll lock with other views of the page.
    pub fn with_scroll_lock(mut self, scroll: ScrollLock) -> Self {
        self.scroll = scroll;
        self
    }

    /// Publish cart events on an externally owned bus.
    pub fn with_event_bus(mut self, bus: Arc<InMemoryEventBus<CartEvent>>) -> Self {
        self.bus = bus;
        self
    }

    pub fn subscribe(&self) -> Subscription<CartEvent> {
        self.bus.subscribe()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn view(&self) -> &CartView {
        &self.view
    }

    pub fn is_open(&self) -> bool {
        self.drawer_open
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll
    }

    pub fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn opener(&self) -> &L {
        &self.opener
    }

    pub fn checkout_trigger(&self) -> TriggerState {
        let busy = self.checkout.is_pending();
        let labels = self.renderer.labels();
        TriggerState {
            enabled: self.view.submit_enabled && !busy,
            busy,
            label: if busy {
                labels.checkout_busy.clone()
            } else {
                labels.checkout.clone()
            },
        }
    }

    pub fn handoff_trigger(&self) -> TriggerState {
        TriggerState {
            enabled: self.view.submit_enabled,
            busy: false,
            label: self.renderer.labels().handoff.clone(),
        }
    }

    /// Single entry point for host event loops.
    pub fn handle(&mut self, interaction: Interaction) -> StorefrontResult<Outcome> {
        let outcome = match interaction {
            Interaction::Add(trigger) => {
                self.add(trigger)?;
                Outcome::Added
            }
            Interaction::Press(control) => Outcome::Pressed(self.press(&control)?),
            Interaction::Open => {
                self.open();
                Outcome::Visibility { open: true }
            }
            Interaction::Close => {
                self.close();
                Outcome::Visibility { open: false }
            }
            Interaction::DismissOverlay => {
                self.dismiss_overlay();
                Outcome::Visibility { open: false }
            }
            Interaction::SubmitCheckout => Outcome::Checkout(self.submit_checkout()?),
            Interaction::SubmitHandoff => Outcome::Handoff(self.submit_handoff()),
            Interaction::Tick => Outcome::Settled(self.poll()?),
        };
        Ok(outcome)
    }

    /// Add one unit and open the drawer as confirmation.
    pub fn add(&mut self, trigger: AddTrigger) -> StorefrontResult<()> {
        let product_id = trigger.product_id.clone();
        self.dispatch(&CartCommand::AddItem(AddItem {
            product_id: trigger.product_id,
            name: trigger.name,
            unit_price: trigger.unit_price,
            occurred_at: self.clock.now(),
        }))?;
        tracing::debug!(%product_id, count = self.cart.total_count(), "item added");
        self.open();
        Ok(())
    }

    /// Validate raw trigger attributes, then add.
    pub fn add_from_attributes(&mut self, id: &str, name: &str, price: &str) -> StorefrontResult<()> {
        let trigger = AddTrigger::from_attributes(id, name, price).inspect_err(|err| {
            tracing::warn!(id, price, "rejected add-to-cart trigger: {err}");
        })?;
        self.add(trigger)
    }

    /// Invoke a row control obtained from the current view.
    pub fn press(&mut self, control: &RowControl) -> StorefrontResult<PressOutcome> {
        if !self.view.is_current(control) {
            tracing::debug!(
                product_id = %control.product_id,
                control_generation = control.generation,
                current_generation = self.view.generation,
                "ignoring stale row control"
            );
            return Ok(PressOutcome::Stale);
        }
        let applied = match control.action {
            RowAction::Decrement => self.decrement(&control.product_id)?,
            RowAction::Increment => self.increment(&control.product_id)?,
        };
        Ok(if applied {
            PressOutcome::Applied
        } else {
            PressOutcome::NoOp
        })
    }

    /// Returns whether anything changed; unknown ids are a no-op.
    pub fn increment(&mut self, product_id: &ProductId) -> StorefrontResult<bool> {
        let events = self.dispatch(&CartCommand::IncrementItem(IncrementItem {
            product_id: product_id.clone(),
            occurred_at: self.clock.now(),
        }))?;
        Ok(!events.is_empty())
    }

    /// Returns whether anything changed; unknown ids are a no-op.
    pub fn decrement(&mut self, product_id: &ProductId) -> StorefrontResult<bool> {
        let events = self.dispatch(&CartCommand::DecrementItem(DecrementItem {
            product_id: product_id.clone(),
            occurred_at: self.clock.now(),
        }))?;
        Ok(!events.is_empty())
    }

    pub fn open(&mut self) {
        self.drawer_open = true;
        self.scroll.lock();
    }

    pub fn close(&mut self) {
        self.drawer_open = false;
        self.scroll.release();
    }

    pub fn dismiss_overlay(&mut self) {
        self.close();
    }

    /// Start the simulated checkout.
    ///
    /// Busy and empty-cart presses are ordinary outcomes; an error means the
    /// checkout could not be scheduled at all and nothing was submitted.
    pub fn submit_checkout(&mut self) -> StorefrontResult<SubmitOutcome> {
        if self.checkout.is_pending() {
            tracing::debug!("checkout already pending; submission rejected");
            return Ok(SubmitOutcome::Busy);
        }
        if self.cart.is_empty() {
            tracing::debug!("checkout on empty cart ignored");
            return Ok(SubmitOutcome::EmptyCart);
        }

        let now = self.clock.now();
        let pending = self.checkout.begin(self.cart.snapshot(), now).inspect_err(|err| {
            tracing::warn!("checkout not started: {err}");
        })?;
        self.transport.submitted(pending.checkout_id, &pending.snapshot);
        tracing::info!(
            checkout_id = %pending.checkout_id,
            total = %pending.snapshot.total_price,
            due_at = %pending.due_at,
            "checkout pending"
        );
        Ok(SubmitOutcome::Started(pending.checkout_id))
    }

    /// Settle the pending checkout once its delay has elapsed.
    pub fn poll(&mut self) -> StorefrontResult<Option<CheckoutId>> {
        let now = self.clock.now();
        let Some(done) = self.checkout.take_due(now) else {
            return Ok(None);
        };

        self.transport.settled(
            done.checkout_id,
            &done.snapshot,
            &self.renderer.labels().checkout_done,
        );
        self.dispatch(&CartCommand::ClearCart(ClearCart { occurred_at: now }))?;
        self.close();

        tracing::info!(checkout_id = %done.checkout_id, "checkout settled; cart cleared");
        Ok(Some(done.checkout_id))
    }

    /// Open the prefilled messaging draft. The cart is kept.
    pub fn submit_handoff(&mut self) -> HandoffOutcome {
        if self.cart.is_empty() {
            tracing::debug!("handoff on empty cart ignored");
            return HandoffOutcome::EmptyCart;
        }

        let text = order_summary(&self.cart, &self.handoff, self.renderer.format());
        let url = handoff_url(&self.handoff, &text);
        self.opener.open(&url);
        self.close();

        tracing::info!(lines = self.cart.len(), "order handed off to messaging link");
        HandoffOutcome::Opened { url }
    }

    fn dispatch(&mut self, command: &CartCommand) -> StorefrontResult<Vec<CartEvent>> {
        let events = execute(&mut self.cart, command)?;
        if !events.is_empty() {
            self.refresh();
            self.publish(&events);
        }
        Ok(events)
    }

    fn refresh(&mut self) {
        self.generation += 1;
        self.view = self.renderer.render(&self.cart, self.generation);
    }

    fn publish(&self, events: &[CartEvent]) {
        for event in events {
            if let Err(err) = self.bus.publish(event.clone()) {
                tracing::warn!(?err, "failed to notify cart observers");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::ManualClock;
    use crate::error::StorefrontError;
    use crate::handoff::LoggingLinkOpener;
    use cafecart_core::DomainError;
    use cafecart_cart::CartSnapshot;
    use chrono::{TimeDelta, Utc};

    #[derive(Default)]
    struct NullTransport {
        submitted: usize,
        settled: usize,
    }

    impl CheckoutTransport for NullTransport {
        fn submitted(&mut self, _: CheckoutId, _: &CartSnapshot) {
            self.submitted += 1;
        }

        fn settled(&mut self, _: CheckoutId, _: &CartSnapshot, _: &str) {
            self.settled += 1;
        }
    }

    fn storefront() -> (Storefront<ManualClock, NullTransport, LoggingLinkOpener>, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        let sf = Storefront::new(
            &StorefrontConfig::default(),
            clock.clone(),
            NullTransport::default(),
            LoggingLinkOpener::default(),
        )
        .unwrap();
        (sf, clock)
    }

    #[test]
    fn add_trigger_validates_attributes() {
        assert!(AddTrigger::from_attributes("espresso", "Espresso", "8.50").is_ok());
        assert!(AddTrigger::from_attributes("", "Espresso", "8.50").is_err());
        assert!(AddTrigger::from_attributes("espresso", "Espresso", "oito").is_err());
    }

    #[test]
    fn rejected_add_leaves_view_untouched() {
        let (mut sf, _) = storefront();
        let before = sf.view().clone();
        assert!(sf.add_from_attributes("x", "X", "NaN").is_err());
        assert_eq!(sf.view(), &before);
        assert!(!sf.is_open());
    }

    #[test]
    fn noop_press_does_not_rerender() {
        let (mut sf, _) = storefront();
        sf.add_from_attributes("a", "A", "1.00").unwrap();
        let generation = sf.view().generation;

        let mut control = sf.view().controls().next().unwrap().clone();
        control.product_id = ProductId::parse("ghost").unwrap();
        assert_eq!(sf.press(&control).unwrap(), PressOutcome::NoOp);
        assert_eq!(sf.view().generation, generation);
    }

    #[test]
    fn overflowing_increment_is_reported_and_view_kept() {
        let (mut sf, _) = storefront();
        let max = Money::MAX.amount().to_string();
        sf.add_from_attributes("big", "Big", &max).unwrap();
        let before = sf.view().clone();

        let err = sf.increment(&ProductId::parse("big").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::Domain(DomainError::Overflow(_))
        ));
        assert_eq!(sf.view(), &before);
        assert_eq!(sf.cart().total_count(), 1);
    }

    #[test]
    fn shared_scroll_lock_is_restored_by_close() {
        let (sf, _) = storefront();
        let shared = ScrollLock::new();
        let mut sf = sf.with_scroll_lock(shared.clone());

        sf.open();
        assert!(shared.is_locked());
        sf.dismiss_overlay();
        assert!(!shared.is_locked());
        assert!(!sf.is_open());
    }

    #[test]
    fn handle_routes_interactions() {
        let (mut sf, clock) = storefront();
        let trigger = AddTrigger::from_attributes("a", "A", "2.00").unwrap();

        assert_eq!(sf.handle(Interaction::Add(trigger)).unwrap(), Outcome::Added);
        assert_eq!(
            sf.handle(Interaction::Close).unwrap(),
            Outcome::Visibility { open: false }
        );
        let started = sf.handle(Interaction::SubmitCheckout).unwrap();
        assert!(matches!(started, Outcome::Checkout(SubmitOutcome::Started(_))));
        assert_eq!(sf.handle(Interaction::Tick).unwrap(), Outcome::Settled(None));

        clock.advance(TimeDelta::milliseconds(1500));
        assert!(matches!(
            sf.handle(Interaction::Tick).unwrap(),
            Outcome::Settled(Some(_))
        ));
        assert_eq!(sf.transport().submitted, 1);
        assert_eq!(sf.transport().settled, 1);
    }
}
