//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two prices of `8.50` are the same price,
/// while two cart lines are only the same line when their product ids match.
/// They are immutable; "changing" one means building a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
