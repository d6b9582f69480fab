//! `cafecart-storefront`
//!
//! **Responsibility:** the shopper-facing cart widget.
//!
//! - Cart Renderer: projects cart state into a [`CartView`] (badge, total,
//!   rows with generation-bound controls, HTML markup)
//! - Interaction Surface: [`Storefront`] maps trigger points to cart
//!   operations and re-renders after each one
//! - Order handoff: simulated checkout with an injectable clock, and a
//!   prefilled messaging link

pub mod checkout;
pub mod config;
pub mod error;
pub mod format;
pub mod handoff;
pub mod render;
pub mod surface;

pub use checkout::{
    CheckoutFlow, CheckoutState, CheckoutTransport, Clock, LoggingCheckoutTransport, ManualClock,
    PendingCheckout, SystemClock, TriggerState,
};
pub use config::{ConfigError, HandoffConfig, Labels, Locale, StorefrontConfig};
pub use error::{StorefrontError, StorefrontResult};
pub use format::{CurrencyFormat, SymbolPosition};
pub use handoff::{LinkOpener, LoggingLinkOpener};
pub use render::{Badge, CartView, Renderer, RowAction, RowControl, RowView, ViewBody};
pub use surface::{
    AddTrigger, HandoffOutcome, Interaction, Outcome, PressOutcome, ScrollLock, Storefront,
    SubmitOutcome,
};
