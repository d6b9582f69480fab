//! Message handoff: itemized order text and the prefilled messaging link.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use cafecart_cart::Cart;

use crate::config::HandoffConfig;
use crate::format::CurrencyFormat;

/// Characters left intact by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Opens external links in a new browsing context (a new tab, the system
/// browser), leaving the storefront page where it was.
pub trait LinkOpener {
    fn open(&mut self, url: &str);
}

/// Opener that logs and remembers the links it was asked to open.
#[derive(Debug, Default)]
pub struct LoggingLinkOpener {
    opened: Vec<String>,
}

impl LoggingLinkOpener {
    pub fn opened(&self) -> &[String] {
        &self.opened
    }
}

impl LinkOpener for LoggingLinkOpener {
    fn open(&mut self, url: &str) {
        tracing::info!(url, "opening external link");
        self.opened.push(url.to_string());
    }
}

/// Human-readable order draft.
///
/// Shape (stable, read by a human on the other end):
///
/// ```text
/// <greeting>
///
/// 2x - Espresso (R$ 8,50)
/// 1x - Latte (R$ 12,00)
///
/// Total: R$ 29,00
///
/// <sign-off>
/// ```
///
/// Greeting and sign-off are optional.
pub fn order_summary(cart: &Cart, config: &HandoffConfig, format: &CurrencyFormat) -> String {
    let mut text = String::new();
    if let Some(greeting) = &config.greeting {
        text.push_str(greeting);
        text.push_str("\n\n");
    }

    for line in cart.lines() {
        text.push_str(&format!(
            "{}x - {} ({})\n",
            line.quantity,
            line.name,
            format.format(line.unit_price)
        ));
    }

    text.push_str(&format!("\nTotal: {}", format.format(cart.total_price())));

    if let Some(sign_off) = &config.sign_off {
        text.push_str("\n\n");
        text.push_str(sign_off);
    }
    text
}

/// Percent-encode text the way `encodeURIComponent` does.
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// `<base_url>/<recipient>?text=<encoded summary>`.
pub fn handoff_url(config: &HandoffConfig, text: &str) -> String {
    format!(
        "{}/{}?text={}",
        config.base_url.trim_end_matches('/'),
        config.recipient,
        encode_component(text)
    )
}
