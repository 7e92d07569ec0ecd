//! Order workflows: create, confirm (stock reservation), cancel, ship,
//! deliver.
//!
//! Stock is reserved at confirmation, not at order creation: an unconfirmed
//! order never holds inventory hostage. Multi-aggregate workflows validate
//! every line before mutating any product, so a failure leaves no partial
//! stock movement behind; the unit of work then commits product and order
//! mutations together.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use orderflow_core::{Address, CustomerId};
use orderflow_orders::{Order, OrderId, OrderItemId, OrderStatus};
use orderflow_products::{Product, ProductId};

use crate::result::{AppResult, Failure};
use crate::stores::{OrderStore, ProductStore, UnitOfWork};

/// Shipping address payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// One requested order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Request payload for placing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: CustomerId,
    pub shipping_address: AddressRequest,
    pub items: Vec<OrderLineRequest>,
}

/// Read-side view of an order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemView {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Read-side view of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub total: Decimal,
    pub currency: String,
    pub items: Vec<OrderItemView>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id_typed(),
            customer_id: order.customer_id(),
            status: order.status(),
            shipping_address: order.shipping_address().full_address(),
            total: order.total().amount(),
            currency: order.total().currency().to_string(),
            items: order
                .items()
                .iter()
                .map(|item| OrderItemView {
                    id: item.id_typed(),
                    product_id: item.product_id(),
                    product_name: item.product_name().to_string(),
                    product_sku: item.product_sku().to_string(),
                    quantity: item.quantity(),
                    unit_price: item.unit_price().amount(),
                    subtotal: item.subtotal().amount(),
                })
                .collect(),
            created_at: order.created_at(),
            confirmed_at: order.confirmed_at(),
            shipped_at: order.shipped_at(),
            delivered_at: order.delivered_at(),
            cancelled_at: order.cancelled_at(),
            cancellation_reason: order.cancellation_reason().map(str::to_string),
        }
    }
}

/// Order workflows: each operation takes a plain request, orchestrates the
/// aggregates, and persists atomically through the unit of work.
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    uow: Arc<dyn UnitOfWork>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        uow: Arc<dyn UnitOfWork>,
    ) -> Self {
        Self {
            orders,
            products,
            uow,
        }
    }

    /// Place a new order in Pending state. Stock is checked at add time but
    /// not reserved until confirmation.
    pub async fn create_order(&self, request: CreateOrderRequest) -> AppResult<OrderId> {
        if request.items.is_empty() {
            return Err(Failure::new("order must have at least one item"));
        }

        let address = Address::new(
            &request.shipping_address.street,
            &request.shipping_address.city,
            &request.shipping_address.state,
            &request.shipping_address.postal_code,
            &request.shipping_address.country,
        )?;

        let mut order = Order::create(request.customer_id, address)?;

        // One round trip for all referenced products.
        let product_ids: Vec<ProductId> =
            request.items.iter().map(|line| line.product_id).collect();
        let products = self.load_products(&product_ids).await?;

        for line in &request.items {
            let product = products.get(&line.product_id).ok_or_else(|| {
                Failure::new(format!("product with id {} does not exist", line.product_id))
            })?;
            order.add_item(product, line.quantity)?;
        }

        let id = order.id_typed();
        self.orders.add(order).await?;
        self.uow.save_changes().await?;

        info!(order_id = %id, customer_id = %request.customer_id, "order created");
        Ok(id)
    }

    /// Confirm an order, reserving stock for every line.
    ///
    /// All lines are validated before any stock is decremented; a missing or
    /// under-stocked product fails the whole operation with nothing applied.
    pub async fn confirm_order(&self, order_id: OrderId) -> AppResult<()> {
        let mut order = self.load_order(order_id).await?;

        let product_ids: Vec<ProductId> =
            order.items().iter().map(|item| item.product_id()).collect();
        let mut products = self.load_products(&product_ids).await?;

        // Validate every line first: all-or-nothing.
        for item in order.items() {
            let product = products.get(&item.product_id()).ok_or_else(|| {
                Failure::new(format!(
                    "product with id {} no longer exists",
                    item.product_id()
                ))
            })?;

            if !product.has_sufficient_stock(item.quantity()) {
                return Err(Failure::new(format!(
                    "insufficient stock for product {}: available {}, requested {}",
                    product.name(),
                    product.stock_quantity(),
                    item.quantity()
                )));
            }
        }

        // Reserve: decrement stock for every line.
        for item in order.items() {
            let product = products.get_mut(&item.product_id()).ok_or_else(|| {
                Failure::new(format!(
                    "product with id {} no longer exists",
                    item.product_id()
                ))
            })?;
            product.remove_stock(item.quantity())?;
        }

        order.confirm()?;

        for product in products.into_values() {
            self.products.update(product).await?;
        }
        self.orders.update(order).await?;
        self.uow.save_changes().await?;

        info!(order_id = %order_id, "order confirmed, stock reserved");
        Ok(())
    }

    /// Cancel an order. Confirmed orders release their reserved stock;
    /// pending orders never held any.
    pub async fn cancel_order(&self, order_id: OrderId, reason: &str) -> AppResult<()> {
        let mut order = self.load_order(order_id).await?;

        let stock_was_reserved = order.status() == OrderStatus::Confirmed;

        // The domain guards must pass before anything is staged: the store's
        // pending buffer outlives this call, so an update staged ahead of a
        // rejected cancel would ride along with the next unrelated commit.
        order.cancel(reason)?;

        if stock_was_reserved {
            let product_ids: Vec<ProductId> =
                order.items().iter().map(|item| item.product_id()).collect();
            let mut products = self.load_products(&product_ids).await?;

            for item in order.items() {
                // A product deleted since confirmation simply has no stock
                // to restore.
                if let Some(product) = products.get_mut(&item.product_id()) {
                    product.add_stock(item.quantity())?;
                }
            }

            for product in products.into_values() {
                self.products.update(product).await?;
            }
        }

        self.orders.update(order).await?;
        self.uow.save_changes().await?;

        info!(order_id = %order_id, stock_was_reserved, "order cancelled");
        Ok(())
    }

    pub async fn ship_order(&self, order_id: OrderId) -> AppResult<()> {
        let mut order = self.load_order(order_id).await?;
        order.ship()?;

        self.orders.update(order).await?;
        self.uow.save_changes().await?;

        info!(order_id = %order_id, "order shipped");
        Ok(())
    }

    pub async fn deliver_order(&self, order_id: OrderId) -> AppResult<()> {
        let mut order = self.load_order(order_id).await?;
        order.deliver()?;

        self.orders.update(order).await?;
        self.uow.save_changes().await?;

        info!(order_id = %order_id, "order delivered");
        Ok(())
    }

    pub async fn get_order(&self, order_id: OrderId) -> AppResult<OrderView> {
        let order = self.load_order(order_id).await?;
        Ok(OrderView::from(&order))
    }

    pub async fn get_orders_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> AppResult<Vec<OrderView>> {
        let orders = self.orders.get_by_customer_id(customer_id).await?;
        Ok(orders.iter().map(OrderView::from).collect())
    }

    async fn load_order(&self, order_id: OrderId) -> AppResult<Order> {
        self.orders
            .get_by_id_with_items(order_id)
            .await?
            .ok_or_else(|| Failure::new(format!("order with id {order_id} was not found")))
    }

    async fn load_products(
        &self,
        ids: &[ProductId],
    ) -> AppResult<HashMap<ProductId, Product>> {
        let products = self.products.get_by_ids(ids).await?;
        Ok(products
            .into_iter()
            .map(|product| (product.id_typed(), product))
            .collect())
    }
}
