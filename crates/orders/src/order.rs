use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::{
    Address, AggregateId, AggregateRoot, CustomerId, DomainError, DomainResult, Entity, Money,
};
use orderflow_products::Product;

use crate::item::{OrderItem, OrderItemId, RehydratedItem};
use crate::status::OrderStatus;

/// Base currency all order totals are kept in.
///
/// Single-currency design: adding an item priced in any other currency is
/// rejected. Multi-currency orders are an open product question, not an
/// inference this model makes.
pub const ORDER_CURRENCY: &str = "USD";

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Domain events recorded by the Order aggregate.
///
/// Recorded into the per-instance outbox and drained at persistence time;
/// nothing dispatches them yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    Created { order_id: OrderId, customer_id: CustomerId, occurred_at: DateTime<Utc> },
    ItemAdded { order_id: OrderId, item_id: OrderItemId, occurred_at: DateTime<Utc> },
    ItemRemoved { order_id: OrderId, item_id: OrderItemId, occurred_at: DateTime<Utc> },
    ItemQuantityUpdated { order_id: OrderId, item_id: OrderItemId, quantity: u32, occurred_at: DateTime<Utc> },
    Confirmed { order_id: OrderId, occurred_at: DateTime<Utc> },
    Shipped { order_id: OrderId, occurred_at: DateTime<Utc> },
    Delivered { order_id: OrderId, occurred_at: DateTime<Utc> },
    Cancelled { order_id: OrderId, reason: String, occurred_at: DateTime<Utc> },
}

/// Aggregate root: a customer order.
///
/// Owns its [`OrderItem`] collection exclusively and enforces the lifecycle
/// state machine. The `total` is always the sum of item subtotals in
/// [`ORDER_CURRENCY`]; items can only be mutated while the order is Pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    shipping_address: Address,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total: Money,
    created_at: DateTime<Utc>,
    confirmed_at: Option<DateTime<Utc>>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
    events: Vec<OrderEvent>,
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &OrderId {
        &self.id
    }
}

impl AggregateRoot for Order {
    type DomainEvent = OrderEvent;

    fn take_events(&mut self) -> Vec<OrderEvent> {
        core::mem::take(&mut self.events)
    }

    fn pending_events(&self) -> &[OrderEvent] {
        &self.events
    }
}

impl Order {
    /// Create a new empty order in Pending state.
    pub fn create(customer_id: CustomerId, shipping_address: Address) -> DomainResult<Self> {
        if customer_id.as_uuid().is_nil() {
            return Err(DomainError::validation("customer id cannot be empty"));
        }

        let id = OrderId::generate();
        let now = Utc::now();
        let mut order = Self {
            id,
            customer_id,
            shipping_address,
            status: OrderStatus::Pending,
            items: Vec::new(),
            total: Money::zero(ORDER_CURRENCY),
            created_at: now,
            confirmed_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            events: Vec::new(),
        };
        order.record(OrderEvent::Created {
            order_id: id,
            customer_id,
            occurred_at: now,
        });
        Ok(order)
    }

    /// Reconstruct an order from persisted state.
    ///
    /// For the persistence layer and seed data only: accepts historical
    /// timestamps explicitly rather than bypassing invariants. The total is
    /// always recomputed from the item snapshots. No event is recorded.
    #[allow(clippy::too_many_arguments)]
    pub fn rehydrate(
        id: OrderId,
        customer_id: CustomerId,
        shipping_address: Address,
        status: OrderStatus,
        items: Vec<RehydratedItem>,
        created_at: DateTime<Utc>,
        confirmed_at: Option<DateTime<Utc>>,
        shipped_at: Option<DateTime<Utc>>,
        delivered_at: Option<DateTime<Utc>>,
        cancelled_at: Option<DateTime<Utc>>,
        cancellation_reason: Option<String>,
    ) -> DomainResult<Self> {
        if customer_id.as_uuid().is_nil() {
            return Err(DomainError::validation("customer id cannot be empty"));
        }

        let items = items
            .into_iter()
            .map(|snapshot| OrderItem::from_snapshot(id, snapshot))
            .collect::<DomainResult<Vec<_>>>()?;

        let mut order = Self {
            id,
            customer_id,
            shipping_address,
            status,
            items,
            total: Money::zero(ORDER_CURRENCY),
            created_at,
            confirmed_at,
            shipped_at,
            delivered_at,
            cancelled_at,
            cancellation_reason,
            events: Vec::new(),
        };
        order.recalculate_total()?;
        Ok(order)
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self) -> &Money {
        &self.total
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// Append a line snapshotting the given product.
    ///
    /// The product must be active and have sufficient stock at add time;
    /// stock itself is only decremented later, at confirmation.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> DomainResult<()> {
        self.ensure_modifiable()?;

        let item = OrderItem::new(self.id, product, quantity)?;

        // Validate fully before mutating: a currency the total cannot absorb
        // must not leave a dangling item behind.
        if item.unit_price().currency() != self.total.currency() {
            return Err(DomainError::invariant(format!(
                "cannot add an item priced in {} to an order totaled in {}",
                item.unit_price().currency(),
                self.total.currency()
            )));
        }

        let item_id = item.id_typed();
        self.items.push(item);
        self.recalculate_total()?;
        self.record(OrderEvent::ItemAdded {
            order_id: self.id,
            item_id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Remove a line. An order must always keep at least one item.
    pub fn remove_item(&mut self, item_id: OrderItemId) -> DomainResult<()> {
        self.ensure_modifiable()?;

        let position = self
            .items
            .iter()
            .position(|item| item.id_typed() == item_id)
            .ok_or_else(|| DomainError::not_found("order item not found"))?;

        if self.items.len() == 1 {
            return Err(DomainError::invariant(
                "cannot remove the last item: an order must have at least one item",
            ));
        }

        self.items.remove(position);
        self.recalculate_total()?;
        self.record(OrderEvent::ItemRemoved {
            order_id: self.id,
            item_id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Change a line's quantity and recompute the total.
    pub fn update_item_quantity(
        &mut self,
        item_id: OrderItemId,
        new_quantity: u32,
    ) -> DomainResult<()> {
        self.ensure_modifiable()?;

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id_typed() == item_id)
            .ok_or_else(|| DomainError::not_found("order item not found"))?;

        item.update_quantity(new_quantity)?;
        self.recalculate_total()?;
        self.record(OrderEvent::ItemQuantityUpdated {
            order_id: self.id,
            item_id,
            quantity: new_quantity,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Pending -> Confirmed. Requires at least one item.
    pub fn confirm(&mut self) -> DomainResult<()> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::invariant(
                "only pending orders can be confirmed",
            ));
        }

        if self.items.is_empty() {
            return Err(DomainError::invariant(
                "cannot confirm an order without items",
            ));
        }

        self.status = OrderStatus::Confirmed;
        self.confirmed_at = Some(Utc::now());
        self.record(OrderEvent::Confirmed {
            order_id: self.id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Confirmed -> Shipped.
    pub fn ship(&mut self) -> DomainResult<()> {
        if self.status != OrderStatus::Confirmed {
            return Err(DomainError::invariant(
                "order must be confirmed before it can be shipped",
            ));
        }

        self.status = OrderStatus::Shipped;
        self.shipped_at = Some(Utc::now());
        self.record(OrderEvent::Shipped {
            order_id: self.id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Shipped -> Delivered.
    pub fn deliver(&mut self) -> DomainResult<()> {
        if self.status != OrderStatus::Shipped {
            return Err(DomainError::invariant(
                "only shipped orders can be delivered",
            ));
        }

        self.status = OrderStatus::Delivered;
        self.delivered_at = Some(Utc::now());
        self.record(OrderEvent::Delivered {
            order_id: self.id,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Pending | Confirmed -> Cancelled, with a mandatory reason.
    pub fn cancel(&mut self, reason: &str) -> DomainResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation(
                "cancellation reason cannot be empty",
            ));
        }

        if matches!(self.status, OrderStatus::Shipped | OrderStatus::Delivered) {
            return Err(DomainError::invariant(
                "cannot cancel an order that has already been shipped or delivered",
            ));
        }

        if self.status == OrderStatus::Cancelled {
            return Err(DomainError::invariant("order has already been cancelled"));
        }

        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(Utc::now());
        self.cancellation_reason = Some(reason.to_string());
        self.record(OrderEvent::Cancelled {
            order_id: self.id,
            reason: reason.to_string(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Whether cancellation is still allowed (Pending or Confirmed).
    pub fn can_be_cancelled(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Whether the order reached a terminal state.
    pub fn is_final(&self) -> bool {
        self.status.is_terminal()
    }

    /// Total unit count across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(OrderItem::quantity).sum()
    }

    fn ensure_modifiable(&self) -> DomainResult<()> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::invariant(
                "order can only be modified while pending",
            ));
        }
        Ok(())
    }

    fn recalculate_total(&mut self) -> DomainResult<()> {
        let mut total = Money::zero(ORDER_CURRENCY);
        for item in &self.items {
            total = total.add(item.subtotal())?;
        }
        self.total = total;
        Ok(())
    }

    fn record(&mut self, event: OrderEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn test_address() -> Address {
        Address::new("10880 Malibu Point", "Malibu", "CA", "90265", "USA").unwrap()
    }

    fn usd(cents: i64) -> Money {
        Money::usd(Decimal::new(cents, 2)).unwrap()
    }

    fn product_with_stock(price_cents: i64, stock: u32) -> Product {
        let mut product =
            Product::create("Repulsor", "REP-001", usd(price_cents), "Flight stabilizer").unwrap();
        if stock > 0 {
            product.add_stock(stock).unwrap();
        }
        product
    }

    fn pending_order() -> Order {
        Order::create(CustomerId::new(), test_address()).unwrap()
    }

    fn pending_order_with_items(lines: &[(i64, u32)]) -> Order {
        let mut order = pending_order();
        for &(price_cents, qty) in lines {
            let product = product_with_stock(price_cents, qty + 10);
            order.add_item(&product, qty).unwrap();
        }
        order
    }

    #[test]
    fn create_starts_pending_with_zero_total() {
        let order = pending_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.items().is_empty());
        assert!(order.total().is_zero());
        assert_eq!(order.total().currency(), ORDER_CURRENCY);
        assert!(order.confirmed_at().is_none());
    }

    #[test]
    fn create_rejects_nil_customer() {
        let nil = CustomerId::from_uuid(uuid::Uuid::nil());
        let err = Order::create(nil, test_address()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn add_item_snapshots_product_and_totals() {
        let mut order = pending_order();
        let product = product_with_stock(1999, 5);

        order.add_item(&product, 2).unwrap();

        let item = &order.items()[0];
        assert_eq!(item.product_id(), product.id_typed());
        assert_eq!(item.product_name(), "Repulsor");
        assert_eq!(item.product_sku(), "REP-001");
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.unit_price(), &usd(1999));
        assert_eq!(item.subtotal(), &usd(3998));
        assert_eq!(order.total(), &usd(3998));
    }

    #[test]
    fn add_item_snapshot_is_decoupled_from_later_product_changes() {
        let mut order = pending_order();
        let mut product = product_with_stock(1000, 5);
        order.add_item(&product, 1).unwrap();

        product.update_price(usd(9999)).unwrap();
        product.update_info("Renamed", "").unwrap();

        let item = &order.items()[0];
        assert_eq!(item.unit_price(), &usd(1000));
        assert_eq!(item.product_name(), "Repulsor");
    }

    #[test]
    fn add_item_rejects_inactive_product() {
        let mut order = pending_order();
        let mut product = product_with_stock(1000, 5);
        product.deactivate();

        let err = order.add_item(&product, 1).unwrap_err();
        assert!(err.to_string().contains("inactive"));
        assert!(order.items().is_empty());
    }

    #[test]
    fn add_item_rejects_insufficient_stock() {
        let mut order = pending_order();
        let product = product_with_stock(1000, 2);

        let err = order.add_item(&product, 3).unwrap_err();
        assert!(err.to_string().contains("insufficient stock"));
        assert!(order.items().is_empty());
        assert!(order.total().is_zero());
    }

    #[test]
    fn add_item_rejects_zero_quantity() {
        let mut order = pending_order();
        let product = product_with_stock(1000, 5);
        assert!(order.add_item(&product, 0).is_err());
    }

    #[test]
    fn add_item_rejects_foreign_currency_atomically() {
        let mut order = pending_order();
        let mut product = product_with_stock(1000, 5);
        product
            .update_price(Money::eur(Decimal::new(1000, 2)).unwrap())
            .unwrap();

        let err = order.add_item(&product, 1).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(order.items().is_empty());
        assert!(order.total().is_zero());
    }

    #[test]
    fn remove_item_recalculates_total() {
        let mut order = pending_order_with_items(&[(1000, 1), (2500, 2)]);
        assert_eq!(order.total(), &usd(6000));

        let first_id = order.items()[0].id_typed();
        order.remove_item(first_id).unwrap();
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total(), &usd(5000));
    }

    #[test]
    fn remove_item_rejects_unknown_item() {
        let mut order = pending_order_with_items(&[(1000, 1), (2000, 1)]);
        let err = order.remove_item(OrderItemId::generate()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn remove_item_guards_the_last_item() {
        let mut order = pending_order_with_items(&[(1000, 1)]);
        let only_id = order.items()[0].id_typed();

        let err = order.remove_item(only_id).unwrap_err();
        assert!(err.to_string().contains("last item"));
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn update_item_quantity_recalculates_total() {
        let mut order = pending_order_with_items(&[(1000, 1)]);
        let item_id = order.items()[0].id_typed();

        order.update_item_quantity(item_id, 4).unwrap();
        assert_eq!(order.items()[0].quantity(), 4);
        assert_eq!(order.items()[0].subtotal(), &usd(4000));
        assert_eq!(order.total(), &usd(4000));
    }

    #[test]
    fn update_item_quantity_rejects_zero_and_unknown() {
        let mut order = pending_order_with_items(&[(1000, 2)]);
        let item_id = order.items()[0].id_typed();

        assert!(order.update_item_quantity(item_id, 0).is_err());
        assert_eq!(order.items()[0].quantity(), 2);

        assert!(order
            .update_item_quantity(OrderItemId::generate(), 1)
            .is_err());
    }

    #[test]
    fn confirm_requires_items() {
        let mut order = pending_order();
        let err = order.confirm().unwrap_err();
        assert!(err.to_string().contains("without items"));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn full_lifecycle_pending_to_delivered() {
        let mut order = pending_order_with_items(&[(1000, 1)]);

        order.confirm().unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert!(order.confirmed_at().is_some());

        order.ship().unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert!(order.shipped_at().is_some());

        order.deliver().unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.delivered_at().is_some());
        assert!(order.is_final());
    }

    #[test]
    fn item_mutation_is_forbidden_after_confirmation() {
        let mut order = pending_order_with_items(&[(1000, 1)]);
        order.confirm().unwrap();

        let product = product_with_stock(1000, 5);
        let item_id = order.items()[0].id_typed();

        assert!(order.add_item(&product, 1).is_err());
        assert!(order.remove_item(item_id).is_err());
        assert!(order.update_item_quantity(item_id, 2).is_err());
    }

    #[test]
    fn cancel_requires_reason_and_non_final_state() {
        let mut order = pending_order_with_items(&[(1000, 1)]);

        assert!(order.cancel("   ").is_err());
        assert_eq!(order.status(), OrderStatus::Pending);

        order.cancel("customer changed their mind").unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(
            order.cancellation_reason(),
            Some("customer changed their mind")
        );
        assert!(order.cancelled_at().is_some());

        let err = order.cancel("again").unwrap_err();
        assert!(err.to_string().contains("already been cancelled"));
    }

    #[test]
    fn cancel_works_from_confirmed() {
        let mut order = pending_order_with_items(&[(1000, 1)]);
        order.confirm().unwrap();
        assert!(order.can_be_cancelled());
        order.cancel("out of budget").unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn illegal_transitions_fail_and_leave_state_unchanged() {
        // Pending: ship/deliver illegal.
        let mut order = pending_order_with_items(&[(1000, 1)]);
        assert!(order.ship().is_err());
        assert!(order.deliver().is_err());
        assert_eq!(order.status(), OrderStatus::Pending);

        // Confirmed: confirm/deliver illegal.
        order.confirm().unwrap();
        assert!(order.confirm().is_err());
        assert!(order.deliver().is_err());
        assert_eq!(order.status(), OrderStatus::Confirmed);

        // Shipped: confirm/ship/cancel illegal.
        order.ship().unwrap();
        assert!(order.confirm().is_err());
        assert!(order.ship().is_err());
        assert!(order.cancel("too late").is_err());
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert!(!order.can_be_cancelled());

        // Delivered: everything illegal.
        order.deliver().unwrap();
        assert!(order.confirm().is_err());
        assert!(order.ship().is_err());
        assert!(order.deliver().is_err());
        assert!(order.cancel("way too late").is_err());
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn item_count_sums_quantities() {
        let order = pending_order_with_items(&[(1000, 2), (2000, 3)]);
        assert_eq!(order.item_count(), 5);
    }

    #[test]
    fn mutations_record_events_and_take_drains_them() {
        let mut order = pending_order_with_items(&[(1000, 1)]);
        order.confirm().unwrap();

        // Created + ItemAdded + Confirmed
        assert_eq!(order.pending_events().len(), 3);
        let drained = order.take_events();
        assert_eq!(drained.len(), 3);
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn rehydrate_recomputes_total_from_snapshots() {
        let id = OrderId::generate();
        let items = vec![
            RehydratedItem {
                id: OrderItemId::generate(),
                product_id: orderflow_products::ProductId::generate(),
                product_name: "A".into(),
                product_sku: "A-1".into(),
                quantity: 2,
                unit_price: usd(1000),
            },
            RehydratedItem {
                id: OrderItemId::generate(),
                product_id: orderflow_products::ProductId::generate(),
                product_name: "B".into(),
                product_sku: "B-1".into(),
                quantity: 1,
                unit_price: usd(500),
            },
        ];

        let created = "2024-06-01T12:00:00Z".parse().unwrap();
        let order = Order::rehydrate(
            id,
            CustomerId::new(),
            test_address(),
            OrderStatus::Confirmed,
            items,
            created,
            Some("2024-06-01T13:00:00Z".parse().unwrap()),
            None,
            None,
            None,
            None,
        )
        .unwrap();

        assert_eq!(order.total(), &usd(2500));
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert_eq!(order.created_at(), created);
        assert!(order.pending_events().is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum ItemOp {
            Add { price_cents: i64, quantity: u32 },
            RemoveNth(usize),
            UpdateNth { index: usize, quantity: u32 },
        }

        fn item_op() -> impl Strategy<Value = ItemOp> {
            prop_oneof![
                (1i64..100_000, 1u32..20).prop_map(|(price_cents, quantity)| ItemOp::Add {
                    price_cents,
                    quantity
                }),
                (0usize..8).prop_map(ItemOp::RemoveNth),
                (0usize..8, 1u32..20)
                    .prop_map(|(index, quantity)| ItemOp::UpdateNth { index, quantity }),
            ]
        }

        proptest! {
            /// After any sequence of item mutations on a pending order the
            /// total exactly equals the sum of current item subtotals.
            #[test]
            fn total_always_equals_sum_of_subtotals(ops in proptest::collection::vec(item_op(), 1..30)) {
                let mut order = pending_order();

                for op in ops {
                    match op {
                        ItemOp::Add { price_cents, quantity } => {
                            let product = product_with_stock(price_cents, quantity);
                            order.add_item(&product, quantity).unwrap();
                        }
                        ItemOp::RemoveNth(n) => {
                            if let Some(item) = order.items().get(n % order.items().len().max(1)) {
                                let id = item.id_typed();
                                let _ = order.remove_item(id);
                            }
                        }
                        ItemOp::UpdateNth { index, quantity } => {
                            if let Some(item) = order.items().get(index % order.items().len().max(1)) {
                                let id = item.id_typed();
                                order.update_item_quantity(id, quantity).unwrap();
                            }
                        }
                    }

                    let expected = order
                        .items()
                        .iter()
                        .fold(Money::zero(ORDER_CURRENCY), |acc, item| {
                            acc.add(item.subtotal()).unwrap()
                        });
                    prop_assert_eq!(order.total(), &expected);
                }
            }
        }
    }
}
