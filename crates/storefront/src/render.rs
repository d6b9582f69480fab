//! Cart renderer: projects cart state into a fresh view on every call.
//!
//! There is no diffing. Each render produces a new [`CartView`] stamped with
//! a generation number, and every [`RowControl`] it exposes is bound to that
//! generation. Controls from an older view are stale by contract and must be
//! re-obtained from the current view after each render.

use cafecart_cart::{Cart, LineItem};
use cafecart_core::ProductId;
use serde::Serialize;

use crate::config::Labels;
use crate::format::CurrencyFormat;

/// Cart count badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub count: u64,
    /// Highlighted whenever the cart holds at least one item.
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    Decrement,
    Increment,
}

impl RowAction {
    fn css_class(&self) -> &'static str {
        match self {
            RowAction::Decrement => "minus-btn",
            RowAction::Increment => "plus-btn",
        }
    }

    fn glyph(&self) -> &'static str {
        match self {
            RowAction::Decrement => "-",
            RowAction::Increment => "+",
        }
    }
}

/// A row-scoped callback handle, valid only for the view that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowControl {
    pub product_id: ProductId,
    pub action: RowAction,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price_label: String,
    /// `"<unit price> x <qty>"`.
    pub price_label: String,
    pub quantity: u32,
    pub decrement: RowControl,
    pub increment: RowControl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewBody {
    Empty { message: String },
    Items { rows: Vec<RowView> },
}

/// Everything the drawer displays for one cart state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub generation: u64,
    pub badge: Badge,
    pub total_label: String,
    /// Order-submission triggers are enabled iff the cart is non-empty.
    pub submit_enabled: bool,
    pub body: ViewBody,
}

impl CartView {
    pub fn rows(&self) -> &[RowView] {
        match &self.body {
            ViewBody::Empty { .. } => &[],
            ViewBody::Items { rows } => rows,
        }
    }

    pub fn row(&self, product_id: &ProductId) -> Option<&RowView> {
        self.rows().iter().find(|r| &r.product_id == product_id)
    }

    /// Every interactive control of this view, in display order.
    pub fn controls(&self) -> impl Iterator<Item = &RowControl> {
        self.rows()
            .iter()
            .flat_map(|r| [&r.decrement, &r.increment])
    }

    pub fn is_current(&self, control: &RowControl) -> bool {
        control.generation == self.generation
    }

    /// Item-list markup for the drawer body.
    pub fn to_html(&self) -> String {
        match &self.body {
            ViewBody::Empty { message } => {
                format!("<p class=\"empty-cart-msg\">{}</p>", escape_html(message))
            }
            ViewBody::Items { rows } => rows.iter().map(row_html).collect(),
        }
    }
}

fn row_html(row: &RowView) -> String {
    format!(
        concat!(
            "<div class=\"cart-item\">",
            "<div class=\"cart-item-info\"><h4>{name}</h4>",
            "<span class=\"cart-item-price\">{price}</span></div>",
            "<div class=\"cart-item-qty\">{minus}<span>{qty}</span>{plus}</div>",
            "</div>"
        ),
        name = escape_html(&row.name),
        price = escape_html(&row.price_label),
        minus = button_html(&row.decrement),
        qty = row.quantity,
        plus = button_html(&row.increment),
    )
}

fn button_html(control: &RowControl) -> String {
    format!(
        "<button class=\"qty-btn {}\" data-id=\"{}\" data-generation=\"{}\">{}</button>",
        control.action.css_class(),
        escape_html(control.product_id.as_str()),
        control.generation,
        control.action.glyph(),
    )
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Pure projection of a cart into a [`CartView`].
#[derive(Debug, Clone)]
pub struct Renderer {
    format: CurrencyFormat,
    labels: Labels,
}

impl Renderer {
    pub fn new(format: CurrencyFormat, labels: Labels) -> Self {
        Self { format, labels }
    }

    pub fn format(&self) -> &CurrencyFormat {
        &self.format
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn render(&self, cart: &Cart, generation: u64) -> CartView {
        let count = cart.total_count();
        let body = if cart.is_empty() {
            ViewBody::Empty {
                message: self.labels.empty_cart.clone(),
            }
        } else {
            ViewBody::Items {
                rows: cart
                    .lines()
                    .iter()
                    .map(|line| self.row(line, generation))
                    .collect(),
            }
        };

        CartView {
            generation,
            badge: Badge {
                count,
                active: count > 0,
            },
            total_label: self.format.format(cart.total_price()),
            submit_enabled: !cart.is_empty(),
            body,
        }
    }

    fn row(&self, line: &LineItem, generation: u64) -> RowView {
        let unit_price_label = self.format.format(line.unit_price);
        let control = |action| RowControl {
            product_id: line.product_id.clone(),
            action,
            generation,
        };
        RowView {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price_label: format!("{} x {}", unit_price_label, line.quantity),
            unit_price_label,
            quantity: line.quantity,
            decrement: control(RowAction::Decrement),
            increment: control(RowAction::Increment),
        }
    }
}
