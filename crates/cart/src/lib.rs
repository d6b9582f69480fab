//! Cart domain module.
//!
//! Owns the ordered collection of line items for one shopping session and
//! derives its aggregates. Pure domain logic: no rendering, no IO.

pub mod cart;

pub use cart::{
    AddItem, Cart, CartCleared, CartCommand, CartEvent, CartSnapshot, ClearCart, DecrementItem,
    IncrementItem, ItemAdded, ItemRemoved, LineItem, QuantityChanged,
};
