//! Storefront configuration (locale, labels, checkout delay, handoff target).
//!
//! Defaults reproduce the reference deployment (pt-BR, BRL). Every value can
//! be overridden through `CAFECART_*` environment variables.

use core::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::CurrencyFormat;

pub const ENV_CHECKOUT_DELAY_MS: &str = "CAFECART_CHECKOUT_DELAY_MS";
pub const ENV_HANDOFF_RECIPIENT: &str = "CAFECART_HANDOFF_RECIPIENT";
pub const ENV_HANDOFF_BASE_URL: &str = "CAFECART_HANDOFF_BASE_URL";
pub const ENV_LOCALE: &str = "CAFECART_LOCALE";

const DEFAULT_CHECKOUT_DELAY_MS: u64 = 1500;
/// One hour.
const MAX_CHECKOUT_DELAY_MS: u64 = 3_600_000;
const DEFAULT_RECIPIENT: &str = "5511999999999";
const DEFAULT_BASE_URL: &str = "https://wa.me";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}

/// Presentation locale. Selects the currency format and default texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::EnUs => "en-US",
        }
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        match self {
            Locale::PtBr => CurrencyFormat::brl(),
            Locale::EnUs => CurrencyFormat::usd(),
        }
    }

    pub fn labels(&self) -> Labels {
        match self {
            Locale::PtBr => Labels {
                empty_cart: "Seu carrinho está vazio.".into(),
                checkout: "Finalizar compra".into(),
                checkout_busy: "Processando...".into(),
                checkout_done: "A simulação do fluxo de e-commerce redirecionaria para a página de Stripe/MercadoPago agora.".into(),
                handoff: "Pedir pelo WhatsApp".into(),
            },
            Locale::EnUs => Labels {
                empty_cart: "Your cart is empty.".into(),
                checkout: "Checkout".into(),
                checkout_busy: "Processing...".into(),
                checkout_done: "A real store would now redirect to the payment provider.".into(),
                handoff: "Order via WhatsApp".into(),
            },
        }
    }

    fn greeting(&self) -> &'static str {
        match self {
            Locale::PtBr => "Olá! Gostaria de fazer o seguinte pedido:",
            Locale::EnUs => "Hi! I'd like to place the following order:",
        }
    }

    fn sign_off(&self) -> &'static str {
        match self {
            Locale::PtBr => "Obrigado!",
            Locale::EnUs => "Thank you!",
        }
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pt-BR" | "pt_BR" | "pt-br" => Ok(Locale::PtBr),
            "en-US" | "en_US" | "en-us" => Ok(Locale::EnUs),
            other => Err(ConfigError::invalid(
                ENV_LOCALE,
                format!("unsupported locale {other:?} (expected pt-BR or en-US)"),
            )),
        }
    }
}

/// User-visible texts of the cart drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub empty_cart: String,
    pub checkout: String,
    pub checkout_busy: String,
    /// Notice handed to the checkout transport when a checkout settles.
    pub checkout_done: String,
    pub handoff: String,
}

impl Default for Labels {
    fn default() -> Self {
        Locale::default().labels()
    }
}

/// Where and how the message handoff sends the order draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffConfig {
    pub base_url: String,
    /// Recipient address, digits only (international phone format).
    pub recipient: String,
    pub greeting: Option<String>,
    pub sign_off: Option<String>,
}

impl HandoffConfig {
    fn for_locale(locale: Locale) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            recipient: DEFAULT_RECIPIENT.into(),
            greeting: Some(locale.greeting().into()),
            sign_off: Some(locale.sign_off().into()),
        }
    }
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub locale: Locale,
    pub checkout_delay_ms: u64,
    pub labels: Labels,
    pub handoff: HandoffConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

impl StorefrontConfig {
    /// Defaults for a locale: its labels, greeting and sign-off.
    pub fn for_locale(locale: Locale) -> Self {
        Self {
            locale,
            checkout_delay_ms: DEFAULT_CHECKOUT_DELAY_MS,
            labels: locale.labels(),
            handoff: HandoffConfig::for_locale(locale),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (environment, tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let locale = match lookup(ENV_LOCALE) {
            Some(raw) => raw.parse()?,
            None => Locale::default(),
        };
        let mut config = Self::for_locale(locale);

        if let Some(raw) = lookup(ENV_CHECKOUT_DELAY_MS) {
            config.checkout_delay_ms = raw.trim().parse().map_err(|e| {
                ConfigError::invalid(ENV_CHECKOUT_DELAY_MS, format!("{raw:?}: {e}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_HANDOFF_RECIPIENT) {
            config.handoff.recipient = raw.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_HANDOFF_BASE_URL) {
            config.handoff.base_url = raw.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let recipient = &self.handoff.recipient;
        if recipient.is_empty() || !recipient.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::invalid(
                ENV_HANDOFF_RECIPIENT,
                format!("{recipient:?} must be a non-empty string of digits"),
            ));
        }
        let base = &self.handoff.base_url;
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(ConfigError::invalid(
                ENV_HANDOFF_BASE_URL,
                format!("{base:?} must be an http(s) URL"),
            ));
        }
        self.checkout_delay()?;
        Ok(())
    }

    /// The fixed wait between submitting and settling a simulated checkout.
    pub fn checkout_delay(&self) -> Result<TimeDelta, ConfigError> {
        if self.checkout_delay_ms > MAX_CHECKOUT_DELAY_MS {
            return Err(ConfigError::invalid(
                ENV_CHECKOUT_DELAY_MS,
                format!(
                    "{} exceeds the maximum of {MAX_CHECKOUT_DELAY_MS}ms",
                    self.checkout_delay_ms
                ),
            ));
        }
        i64::try_from(self.checkout_delay_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .ok_or_else(|| {
                ConfigError::invalid(ENV_CHECKOUT_DELAY_MS, "delay out of range")
            })
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        self.locale.currency_format()
    }
}
