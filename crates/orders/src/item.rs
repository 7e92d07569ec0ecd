use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_core::{AggregateId, DomainError, DomainResult, Entity, Money};
use orderflow_products::{Product, ProductId};

use crate::order::OrderId;

/// Order item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderItemId(pub AggregateId);

impl OrderItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for OrderItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A product line within an order.
///
/// Owned exclusively by one [`Order`](crate::Order); only the aggregate can
/// construct or mutate items. Name, SKU and unit price are snapshotted at
/// creation so later catalog changes never rewrite history on open orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    product_sku: String,
    quantity: u32,
    unit_price: Money,
    subtotal: Money,
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> &OrderItemId {
        &self.id
    }
}

impl OrderItem {
    /// Snapshot a product into a new line. Aggregate-internal.
    pub(crate) fn new(order_id: OrderId, product: &Product, quantity: u32) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "order item quantity must be greater than zero",
            ));
        }

        if !product.is_active() {
            return Err(DomainError::invariant(
                "cannot add an inactive product to an order",
            ));
        }

        if !product.has_sufficient_stock(quantity) {
            return Err(DomainError::insufficient_stock(
                product.name(),
                product.stock_quantity(),
                quantity,
            ));
        }

        let unit_price = product.price().clone();
        let subtotal = unit_price.mul(Decimal::from(quantity))?;

        Ok(Self {
            id: OrderItemId::generate(),
            order_id,
            product_id: product.id_typed(),
            product_name: product.name().to_string(),
            product_sku: product.sku().to_string(),
            quantity,
            unit_price,
            subtotal,
        })
    }

    /// Rebuild a line from a persisted snapshot. Aggregate-internal.
    pub(crate) fn from_snapshot(order_id: OrderId, snapshot: RehydratedItem) -> DomainResult<Self> {
        if snapshot.quantity == 0 {
            return Err(DomainError::validation(
                "order item quantity must be greater than zero",
            ));
        }
        let subtotal = snapshot.unit_price.mul(Decimal::from(snapshot.quantity))?;
        Ok(Self {
            id: snapshot.id,
            order_id,
            product_id: snapshot.product_id,
            product_name: snapshot.product_name,
            product_sku: snapshot.product_sku,
            quantity: snapshot.quantity,
            unit_price: snapshot.unit_price,
            subtotal,
        })
    }

    /// Change quantity and recompute the subtotal. Aggregate-internal.
    pub(crate) fn update_quantity(&mut self, new_quantity: u32) -> DomainResult<()> {
        if new_quantity == 0 {
            return Err(DomainError::validation(
                "new quantity must be greater than zero",
            ));
        }
        let subtotal = self.unit_price.mul(Decimal::from(new_quantity))?;
        self.quantity = new_quantity;
        self.subtotal = subtotal;
        Ok(())
    }

    pub fn id_typed(&self) -> OrderItemId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_sku(&self) -> &str {
        &self.product_sku
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> &Money {
        &self.unit_price
    }

    /// Always `unit_price * quantity`.
    pub fn subtotal(&self) -> &Money {
        &self.subtotal
    }
}

/// Persisted item snapshot used by [`Order::rehydrate`](crate::Order::rehydrate).
///
/// Carries the raw snapshotted fields; the aggregate recomputes the subtotal
/// when rebuilding, so a corrupted stored subtotal can never survive a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RehydratedItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: u32,
    pub unit_price: Money,
}
