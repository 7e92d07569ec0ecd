use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Entity, Money};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Domain events recorded by the Product aggregate.
///
/// Recorded into the per-instance outbox and drained at persistence time;
/// nothing dispatches them yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    Created { product_id: ProductId, sku: String, occurred_at: DateTime<Utc> },
    StockAdded { product_id: ProductId, quantity: u32, occurred_at: DateTime<Utc> },
    StockRemoved { product_id: ProductId, quantity: u32, occurred_at: DateTime<Utc> },
    PriceChanged { product_id: ProductId, new_price: Money, occurred_at: DateTime<Utc> },
    Activated { product_id: ProductId, occurred_at: DateTime<Utc> },
    Deactivated { product_id: ProductId, occurred_at: DateTime<Utc> },
}

/// Aggregate root: a catalog item with price, stock, and activation state.
///
/// Stock never goes negative, the SKU never changes after creation, and
/// products are soft-deleted only (`deactivate`): deactivated products are
/// excluded from order placement but retained for audit and reactivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    sku: String,
    price: Money,
    description: String,
    stock_quantity: u32,
    low_stock_threshold: u32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    events: Vec<ProductEvent>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

impl AggregateRoot for Product {
    type DomainEvent = ProductEvent;

    fn take_events(&mut self) -> Vec<ProductEvent> {
        core::mem::take(&mut self.events)
    }

    fn pending_events(&self) -> &[ProductEvent] {
        &self.events
    }
}

impl Product {
    /// Create a new product with zero stock, active by default.
    pub fn create(name: &str, sku: &str, price: Money, description: &str) -> DomainResult<Self> {
        let name = Self::require_name(name)?;
        let sku = sku.trim();
        if sku.is_empty() {
            return Err(DomainError::validation("product SKU cannot be empty"));
        }

        let id = ProductId::generate();
        let now = Utc::now();
        let mut product = Self {
            id,
            name,
            sku: sku.to_string(),
            price,
            description: description.to_string(),
            stock_quantity: 0,
            low_stock_threshold: 0,
            is_active: true,
            created_at: now,
            updated_at: None,
            events: Vec::new(),
        };
        product.record(ProductEvent::Created {
            product_id: id,
            sku: product.sku.clone(),
            occurred_at: now,
        });
        Ok(product)
    }

    /// Reconstruct a product from persisted state.
    ///
    /// For the persistence layer and seed data only: accepts historical
    /// timestamps and stock explicitly instead of bypassing invariants, so
    /// name/sku validation still applies. No event is recorded.
    #[allow(clippy::too_many_arguments)]
    pub fn rehydrate(
        id: ProductId,
        name: &str,
        sku: &str,
        price: Money,
        description: &str,
        stock_quantity: u32,
        low_stock_threshold: u32,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> DomainResult<Self> {
        let name = Self::require_name(name)?;
        let sku = sku.trim();
        if sku.is_empty() {
            return Err(DomainError::validation("product SKU cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            sku: sku.to_string(),
            price,
            description: description.to_string(),
            stock_quantity,
            low_stock_threshold,
            is_active,
            created_at,
            updated_at,
            events: Vec::new(),
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Increase available stock.
    pub fn add_stock(&mut self, quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "quantity to add must be greater than zero",
            ));
        }

        self.stock_quantity += quantity;
        self.touch();
        self.record(ProductEvent::StockAdded {
            product_id: self.id,
            quantity,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Decrease available stock. Fails if there is not enough on hand.
    pub fn remove_stock(&mut self, quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "quantity to remove must be greater than zero",
            ));
        }

        if quantity > self.stock_quantity {
            return Err(DomainError::insufficient_stock(
                &self.name,
                self.stock_quantity,
                quantity,
            ));
        }

        self.stock_quantity -= quantity;
        self.touch();
        self.record(ProductEvent::StockRemoved {
            product_id: self.id,
            quantity,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Whether at least `quantity` units are on hand.
    pub fn has_sufficient_stock(&self, quantity: u32) -> bool {
        self.stock_quantity >= quantity
    }

    pub fn update_price(&mut self, new_price: Money) -> DomainResult<()> {
        self.price = new_price.clone();
        self.touch();
        self.record(ProductEvent::PriceChanged {
            product_id: self.id,
            new_price,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    pub fn update_info(&mut self, name: &str, description: &str) -> DomainResult<()> {
        self.name = Self::require_name(name)?;
        self.description = description.to_string();
        self.touch();
        Ok(())
    }

    /// Reactivate a soft-deleted product.
    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
        self.record(ProductEvent::Activated {
            product_id: self.id,
            occurred_at: Utc::now(),
        });
    }

    /// Soft delete. Does not affect orders that already reference this
    /// product (they carry their own snapshot).
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
        self.record(ProductEvent::Deactivated {
            product_id: self.id,
            occurred_at: Utc::now(),
        });
    }

    pub fn set_low_stock_threshold(&mut self, threshold: u32) -> DomainResult<()> {
        self.low_stock_threshold = threshold;
        self.touch();
        Ok(())
    }

    /// Stock at or below the configured threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }

    fn require_name(name: &str) -> DomainResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(trimmed.to_string())
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    fn record(&mut self, event: ProductEvent) {
        self.events.push(event);
    }
}
