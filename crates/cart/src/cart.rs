use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cafecart_core::{
    Aggregate, AggregateRoot, CartId, DomainError, DomainResult, Entity, Money, ProductId,
};
use cafecart_events::Event;

/// One distinct product present in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Fixed when the product is first added; later adds never re-read it.
    pub unit_price: Money,
    /// Always >= 1. A line that would reach zero is removed instead.
    pub quantity: u32,
}

impl LineItem {
    pub fn subtotal(&self) -> DomainResult<Money> {
        self.unit_price.checked_times(self.quantity)
    }
}

impl Entity for LineItem {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}

/// Point-in-time copy of the cart, handed to checkout collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub cart_id: CartId,
    pub lines: Vec<LineItem>,
    pub total_count: u64,
    pub total_price: Money,
}

/// Aggregate root: Cart.
///
/// Lines keep first-insertion order. Aggregates are derived on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    id: CartId,
    lines: Vec<LineItem>,
    version: u64,
}

impl Cart {
    /// Create an empty cart for a new session.
    pub fn new(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities over all lines.
    pub fn total_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `unit_price × quantity` over all lines.
    ///
    /// Adds and increments are refused when they would make this sum
    /// unrepresentable, so an accepted cart always has an exact total.
    pub fn total_price(&self) -> Money {
        self.checked_total_price().unwrap_or(Money::MAX)
    }

    fn checked_total_price(&self) -> DomainResult<Money> {
        self.lines.iter().try_fold(Money::ZERO, |total, line| {
            total.checked_plus(line.subtotal()?)
        })
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            cart_id: self.id,
            lines: self.lines.clone(),
            total_count: self.total_count(),
            total_price: self.total_price(),
        }
    }

    /// Add one unit of a product from its catalog attributes.
    ///
    /// The id is trimmed like any trigger id; a malformed id or price is
    /// rejected before the cart is touched.
    pub fn add_item(
        &mut self,
        product_id: &str,
        name: impl Into<String>,
        unit_price: &str,
    ) -> DomainResult<Vec<CartEvent>> {
        let cmd = AddItem {
            product_id: ProductId::parse(product_id)?,
            name: name.into(),
            unit_price: Money::parse(unit_price)?,
            occurred_at: Utc::now(),
        };
        let events = self.decide_add(&cmd)?;
        Ok(self.record(events))
    }

    /// Increment a line's quantity. Unknown ids are a no-op.
    pub fn increment_item(&mut self, product_id: &ProductId) -> DomainResult<Vec<CartEvent>> {
        let events = self.decide_increment(product_id, Utc::now())?;
        Ok(self.record(events))
    }

    /// Decrement a line's quantity, removing it at zero. Unknown ids are a no-op.
    pub fn decrement_item(&mut self, product_id: &ProductId) -> Vec<CartEvent> {
        let events = self.decide_decrement(product_id, Utc::now());
        self.record(events)
    }

    /// Remove every line.
    pub fn clear(&mut self) -> Vec<CartEvent> {
        let events = self.decide_clear(Utc::now());
        self.record(events)
    }

    fn record(&mut self, events: Vec<CartEvent>) -> Vec<CartEvent> {
        for event in &events {
            self.apply(event);
        }
        events
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|l| &l.product_id == product_id)
    }
}

impl AggregateRoot for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: IncrementItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementItem {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DecrementItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecrementItem {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(AddItem),
    IncrementItem(IncrementItem),
    DecrementItem(DecrementItem),
    ClearCart(ClearCart),
}

/// Event: ItemAdded (a new line, quantity 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event payload for a quantity change; `quantity` is the new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub cart_id: CartId,
    pub removed_lines: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(ItemAdded),
    QuantityIncreased(QuantityChanged),
    QuantityDecreased(QuantityChanged),
    ItemRemoved(ItemRemoved),
    CartCleared(CartCleared),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item.added",
            CartEvent::QuantityIncreased(_) => "cart.item.quantity_increased",
            CartEvent::QuantityDecreased(_) => "cart.item.quantity_decreased",
            CartEvent::ItemRemoved(_) => "cart.item.removed",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ItemAdded(e) => e.occurred_at,
            CartEvent::QuantityIncreased(e) => e.occurred_at,
            CartEvent::QuantityDecreased(e) => e.occurred_at,
            CartEvent::ItemRemoved(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ItemAdded(e) => {
                self.lines.push(LineItem {
                    product_id: e.product_id.clone(),
                    name: e.name.clone(),
                    unit_price: e.unit_price,
                    quantity: 1,
                });
            }
            CartEvent::QuantityIncreased(e) | CartEvent::QuantityDecreased(e) => {
                if let Some(idx) = self.position(&e.product_id) {
                    self.lines[idx].quantity = e.quantity;
                }
            }
            CartEvent::ItemRemoved(e) => {
                self.lines.retain(|l| l.product_id != e.product_id);
            }
            CartEvent::CartCleared(_) => {
                self.lines.clear();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => self.decide_add(cmd),
            CartCommand::IncrementItem(cmd) => {
                self.decide_increment(&cmd.product_id, cmd.occurred_at)
            }
            CartCommand::DecrementItem(cmd) => {
                Ok(self.decide_decrement(&cmd.product_id, cmd.occurred_at))
            }
            CartCommand::ClearCart(cmd) => Ok(self.decide_clear(cmd.occurred_at)),
        }
    }
}

impl Cart {
    fn decide_add(&self, cmd: &AddItem) -> DomainResult<Vec<CartEvent>> {
        if self.line(&cmd.product_id).is_some() {
            // Price is immutable after first insertion; the command's price is ignored.
            return self.decide_increment(&cmd.product_id, cmd.occurred_at);
        }
        self.ensure_total_fits(cmd.unit_price)?;
        Ok(vec![CartEvent::ItemAdded(ItemAdded {
            cart_id: self.id,
            product_id: cmd.product_id.clone(),
            name: cmd.name.clone(),
            unit_price: cmd.unit_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn decide_increment(
        &self,
        product_id: &ProductId,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<CartEvent>> {
        let Some(line) = self.line(product_id) else {
            return Ok(Vec::new());
        };
        let quantity = line.quantity.checked_add(1).ok_or_else(|| {
            DomainError::overflow(format!("quantity of {product_id} is at its maximum"))
        })?;
        self.ensure_total_fits(line.unit_price)?;
        Ok(vec![CartEvent::QuantityIncreased(QuantityChanged {
            cart_id: self.id,
            product_id: product_id.clone(),
            quantity,
            occurred_at: at,
        })])
    }

    /// One more unit at `unit_price` must keep the total representable.
    fn ensure_total_fits(&self, unit_price: Money) -> DomainResult<()> {
        self.checked_total_price()?.checked_plus(unit_price)?;
        Ok(())
    }

    fn decide_decrement(&self, product_id: &ProductId, at: DateTime<Utc>) -> Vec<CartEvent> {
        let Some(line) = self.line(product_id) else {
            return Vec::new();
        };
        if line.quantity > 1 {
            vec![CartEvent::QuantityDecreased(QuantityChanged {
                cart_id: self.id,
                product_id: product_id.clone(),
                quantity: line.quantity - 1,
                occurred_at: at,
            })]
        } else {
            vec![CartEvent::ItemRemoved(ItemRemoved {
                cart_id: self.id,
                product_id: product_id.clone(),
                occurred_at: at,
            })]
        }
    }

    fn decide_clear(&self, at: DateTime<Utc>) -> Vec<CartEvent> {
        if self.lines.is_empty() {
            return Vec::new();
        }
        vec![CartEvent::CartCleared(CartCleared {
            cart_id: self.id,
            removed_lines: self.lines.len(),
            occurred_at: at,
        })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafecart_events::execute;

    fn test_cart() -> Cart {
        Cart::new(CartId::new())
    }

    fn pid(raw: &str) -> ProductId {
        ProductId::parse(raw).unwrap()
    }

    fn money(raw: &str) -> Money {
        Money::parse(raw).unwrap()
    }

    #[test]
    fn adding_same_product_twice_increments_quantity() {
        let mut cart = test_cart();
        cart.add_item("espresso", "Espresso", "8.50").unwrap();
        cart.add_item("espresso", "Espresso", "8.50").unwrap();

        assert_eq!(cart.len(), 1);
        let line = cart.line(&pid("espresso")).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, money("8.50"));
        assert_eq!(cart.total_count(), 2);
        assert_eq!(cart.total_price(), money("17.00"));
    }

    #[test]
    fn decrementing_last_unit_removes_line() {
        let mut cart = test_cart();
        cart.add_item("latte", "Latte", "12.00").unwrap();
        let events = cart.decrement_item(&pid("latte"));

        assert!(matches!(events.as_slice(), [CartEvent::ItemRemoved(_)]));
        assert!(cart.is_empty());
        assert_eq!(cart.total_count(), 0);
        assert_eq!(cart.total_price(), Money::ZERO);
    }

    #[test]
    fn removing_first_line_keeps_remaining_order() {
        let mut cart = test_cart();
        cart.add_item("a", "A", "1.00").unwrap();
        cart.add_item("b", "B", "2.00").unwrap();
        cart.decrement_item(&pid("a"));

        let ids: Vec<_> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn re_adding_removed_product_appends_at_end() {
        let mut cart = test_cart();
        cart.add_item("a", "A", "1.00").unwrap();
        cart.add_item("b", "B", "2.00").unwrap();
        cart.decrement_item(&pid("a"));
        cart.add_item("a", "A", "1.00").unwrap();

        let ids: Vec<_> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn second_add_ignores_new_price() {
        let mut cart = test_cart();
        cart.add_item("mocha", "Mocha", "10.00").unwrap();
        cart.add_item("mocha", "Mocha", "99.99").unwrap();

        let line = cart.line(&pid("mocha")).unwrap();
        assert_eq!(line.unit_price, money("10.00"));
        assert_eq!(cart.total_price(), money("20.00"));
    }

    #[test]
    fn malformed_price_is_rejected_without_touching_cart() {
        let mut cart = test_cart();
        cart.add_item("a", "A", "1.00").unwrap();
        let before = cart.clone();

        let err = cart.add_item("b", "B", "abc").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = cart.add_item("b", "B", "-2").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert_eq!(cart, before);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut cart = test_cart();
        cart.add_item("a", "A", "1.00").unwrap();
        let before = cart.clone();

        assert!(cart.increment_item(&pid("ghost")).unwrap().is_empty());
        assert!(cart.decrement_item(&pid("ghost")).is_empty());
        assert_eq!(cart, before);
    }

    #[test]
    fn padded_ids_merge_into_one_line() {
        let mut cart = test_cart();
        cart.add_item(" a", "A", "1.00").unwrap();
        cart.add_item("a ", "A", "1.00").unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(&pid("a")).unwrap().quantity, 2);
        assert!(matches!(
            cart.add_item("  ", "Blank", "1.00"),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn add_that_would_overflow_total_is_refused() {
        let mut cart = test_cart();
        let max = Money::MAX.amount().to_string();
        cart.add_item("big", "Big", &max).unwrap();
        let before = cart.clone();

        let err = cart.add_item("small", "Small", "1").unwrap_err();
        assert!(matches!(err, DomainError::Overflow(_)));
        let err = cart.increment_item(&pid("big")).unwrap_err();
        assert!(matches!(err, DomainError::Overflow(_)));

        assert_eq!(cart, before);
        assert_eq!(cart.total_price(), Money::MAX);
    }

    #[test]
    fn increment_past_max_quantity_is_refused() {
        let cart_id = CartId::new();
        let mut cart = Cart::new(cart_id);
        let at = Utc::now();
        cart.apply(&CartEvent::ItemAdded(ItemAdded {
            cart_id,
            product_id: pid("a"),
            name: "A".into(),
            unit_price: Money::ZERO,
            occurred_at: at,
        }));
        cart.apply(&CartEvent::QuantityIncreased(QuantityChanged {
            cart_id,
            product_id: pid("a"),
            quantity: u32::MAX,
            occurred_at: at,
        }));

        let err = cart.increment_item(&pid("a")).unwrap_err();
        assert!(matches!(err, DomainError::Overflow(_)));
        assert_eq!(cart.line(&pid("a")).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn clearing_empty_cart_emits_nothing() {
        let mut cart = test_cart();
        assert!(cart.clear().is_empty());
        assert_eq!(cart.version(), 0);
    }

    #[test]
    fn clear_removes_every_line() {
        let mut cart = test_cart();
        cart.add_item("a", "A", "1.00").unwrap();
        cart.add_item("b", "B", "2.00").unwrap();
        let events = cart.clear();

        match events.as_slice() {
            [CartEvent::CartCleared(e)] => assert_eq!(e.removed_lines, 2),
            other => panic!("Expected CartCleared, got {other:?}"),
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut cart = test_cart();
        cart.add_item("a", "A", "1.00").unwrap();
        let before = cart.clone();

        let cmd = CartCommand::IncrementItem(IncrementItem {
            product_id: pid("a"),
            occurred_at: Utc::now(),
        });
        let events1 = cart.handle(&cmd).unwrap();
        let events2 = cart.handle(&cmd).unwrap();

        assert_eq!(cart, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn execute_applies_commands_and_tracks_version() {
        let mut cart = test_cart();
        let at = Utc::now();

        execute(
            &mut cart,
            &CartCommand::AddItem(AddItem {
                product_id: pid("a"),
                name: "A".into(),
                unit_price: money("3.00"),
                occurred_at: at,
            }),
        )
        .unwrap();
        execute(
            &mut cart,
            &CartCommand::IncrementItem(IncrementItem {
                product_id: pid("a"),
                occurred_at: at,
            }),
        )
        .unwrap();
        assert_eq!(cart.version(), 2);
        assert_eq!(cart.total_price(), money("6.00"));

        let events = execute(
            &mut cart,
            &CartCommand::DecrementItem(DecrementItem {
                product_id: pid("ghost"),
                occurred_at: at,
            }),
        )
        .unwrap();
        assert!(events.is_empty());
        assert_eq!(cart.version(), 2);

        execute(&mut cart, &CartCommand::ClearCart(ClearCart { occurred_at: at })).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.version(), 3);
    }

    #[test]
    fn apply_is_deterministic() {
        let cart_id = CartId::new();
        let at = Utc::now();
        let events = vec![
            CartEvent::ItemAdded(ItemAdded {
                cart_id,
                product_id: pid("a"),
                name: "A".into(),
                unit_price: money("2.50"),
                occurred_at: at,
            }),
            CartEvent::QuantityIncreased(QuantityChanged {
                cart_id,
                product_id: pid("a"),
                quantity: 2,
                occurred_at: at,
            }),
        ];

        let mut cart1 = Cart::new(cart_id);
        let mut cart2 = Cart::new(cart_id);
        for e in &events {
            cart1.apply(e);
            cart2.apply(e);
        }
        assert_eq!(cart1, cart2);
        assert_eq!(cart1.total_price(), money("5.00"));
    }

    #[test]
    fn event_types_are_stable() {
        let mut cart = test_cart();
        let added = cart.add_item("a", "A", "1").unwrap();
        let increased = cart.increment_item(&pid("a")).unwrap();
        let decreased = cart.decrement_item(&pid("a"));
        let removed = cart.decrement_item(&pid("a"));

        let names: Vec<_> = [added, increased, decreased, removed]
            .iter()
            .flatten()
            .map(Event::event_type)
            .collect();
        assert_eq!(
            names,
            vec![
                "cart.item.added",
                "cart.item.quantity_increased",
                "cart.item.quantity_decreased",
                "cart.item.removed",
            ]
        );
    }

    #[test]
    fn snapshot_carries_lines_and_totals() {
        let mut cart = test_cart();
        cart.add_item("a", "A", "1.25").unwrap();
        cart.add_item("b", "B", "2.00").unwrap();
        cart.increment_item(&pid("b")).unwrap();

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.cart_id, cart.id_typed());
        assert_eq!(snapshot.lines.len(), 2);
        assert_eq!(snapshot.total_count, 3);
        assert_eq!(snapshot.total_price, money("5.25"));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["lines"][1]["quantity"], 2);
        assert_eq!(json["total_price"], "5.25");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(usize, u64),
            Increment(usize),
            Decrement(usize),
        }

        const IDS: [&str; 4] = ["espresso", "latte", "mocha", "cortado"];

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0..IDS.len(), 0u64..100_000).prop_map(|(i, cents)| Op::Add(i, cents)),
                (0..IDS.len() + 1).prop_map(Op::Increment),
                (0..IDS.len() + 1).prop_map(Op::Decrement),
            ]
        }

        fn id_at(i: usize) -> ProductId {
            IDS.get(i).map(|s| pid(s)).unwrap_or_else(|| pid("unlisted"))
        }

        fn run(ops: &[Op]) -> (Cart, Vec<(ProductId, Money)>) {
            let mut cart = test_cart();
            let mut first_prices: Vec<(ProductId, Money)> = Vec::new();
            for op in ops {
                match op {
                    Op::Add(i, cents) => {
                        let id = id_at(*i);
                        let price = Money::from_minor(*cents);
                        if cart.line(&id).is_none() {
                            first_prices.retain(|(p, _)| p != &id);
                            first_prices.push((id.clone(), price));
                        }
                        cart.add_item(id.as_str(), "name", &price.to_string()).unwrap();
                    }
                    Op::Increment(i) => {
                        cart.increment_item(&id_at(*i)).unwrap();
                    }
                    Op::Decrement(i) => {
                        cart.decrement_item(&id_at(*i));
                    }
                }
            }
            (cart, first_prices)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: every line has quantity >= 1 and ids are unique.
            #[test]
            fn quantities_positive_and_ids_unique(ops in prop::collection::vec(op_strategy(), 0..60)) {
                let (cart, _) = run(&ops);
                for line in cart.lines() {
                    prop_assert!(line.quantity >= 1);
                }
                let mut ids: Vec<_> = cart.lines().iter().map(|l| l.product_id.clone()).collect();
                let before = ids.len();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), before);
            }

            /// Property: derived totals match an independent recomputation.
            #[test]
            fn aggregates_match_recomputation(ops in prop::collection::vec(op_strategy(), 0..60)) {
                let (cart, _) = run(&ops);
                let count: u64 = cart.lines().iter().map(|l| u64::from(l.quantity)).sum();
                prop_assert_eq!(cart.total_count(), count);
                prop_assert_eq!(cart.total_price(), sum_by_repeated_addition(cart.lines()));
            }

            /// Property: a line keeps the price it had when it was (re)inserted.
            #[test]
            fn unit_price_fixed_at_first_insertion(ops in prop::collection::vec(op_strategy(), 0..60)) {
                let (cart, first_prices) = run(&ops);
                for line in cart.lines() {
                    let expected = first_prices
                        .iter()
                        .find(|(id, _)| id == &line.product_id)
                        .map(|(_, p)| *p);
                    prop_assert_eq!(Some(line.unit_price), expected);
                }
            }

            /// Property: increment/decrement of an absent id leaves the cart unchanged.
            #[test]
            fn absent_ids_are_structural_no_ops(ops in prop::collection::vec(op_strategy(), 0..30)) {
                let (mut cart, _) = run(&ops);
                let before = cart.clone();
                cart.increment_item(&pid("absent")).unwrap();
                cart.decrement_item(&pid("absent"));
                prop_assert_eq!(cart, before);
            }
        }

        fn sum_by_repeated_addition(lines: &[LineItem]) -> Money {
            let mut total = Money::ZERO;
            for line in lines {
                for _ in 0..line.quantity {
                    total = total.checked_plus(line.unit_price).unwrap();
                }
            }
            total
        }
    }
}
