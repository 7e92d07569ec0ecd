//! Collaborator contracts implemented by the surrounding infrastructure.
//!
//! The domain core performs no IO; workflows talk to these traits and the
//! infrastructure decides how to satisfy them (in-memory for tests, a
//! relational store in production).
//!
//! ## Concurrency assumption
//!
//! Cross-request races (two confirmations racing on the same product's
//! stock) are NOT resolved by the domain layer. Implementations must provide
//! at least read-committed isolation with either optimistic concurrency
//! tokens or row-level locking on products during the reservation step;
//! otherwise stock can be oversold. The in-memory implementation satisfies
//! this by serializing commits behind a single write lock.

use async_trait::async_trait;

use orderflow_core::CustomerId;
use orderflow_orders::{Order, OrderId};
use orderflow_products::{Product, ProductId};

/// Product persistence contract.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_by_id(&self, id: ProductId) -> anyhow::Result<Option<Product>>;
    async fn get_by_sku(&self, sku: &str) -> anyhow::Result<Option<Product>>;

    /// Batch load; the order workflows use this to avoid N+1 lookups.
    async fn get_by_ids(&self, ids: &[ProductId]) -> anyhow::Result<Vec<Product>>;
    async fn get_all(&self) -> anyhow::Result<Vec<Product>>;
    async fn get_active(&self) -> anyhow::Result<Vec<Product>>;

    /// Active products at or below their low-stock threshold, ascending by
    /// stock quantity.
    async fn get_low_stock(&self) -> anyhow::Result<Vec<Product>>;

    async fn sku_exists(&self, sku: &str) -> anyhow::Result<bool>;

    /// Stage a new product. Persisted on the next `save_changes`.
    async fn add(&self, product: Product) -> anyhow::Result<()>;

    /// Stage an update (mark dirty). Persisted on the next `save_changes`.
    async fn update(&self, product: Product) -> anyhow::Result<()>;

    async fn delete(&self, id: ProductId) -> anyhow::Result<()>;
}

/// Order persistence contract.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// The order without eagerly loaded items.
    async fn get_by_id(&self, id: OrderId) -> anyhow::Result<Option<Order>>;

    /// The order with its items loaded eagerly.
    async fn get_by_id_with_items(&self, id: OrderId) -> anyhow::Result<Option<Order>>;

    async fn get_by_customer_id(&self, customer_id: CustomerId) -> anyhow::Result<Vec<Order>>;
    async fn get_pending_orders(&self) -> anyhow::Result<Vec<Order>>;
    async fn get_all(&self) -> anyhow::Result<Vec<Order>>;
    async fn exists(&self, id: OrderId) -> anyhow::Result<bool>;

    async fn add(&self, order: Order) -> anyhow::Result<()>;
    async fn update(&self, order: Order) -> anyhow::Result<()>;
    async fn delete(&self, id: OrderId) -> anyhow::Result<()>;
}

/// Transactional unit: all staged mutations commit together or not at all.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Commit every pending mutation atomically. Aggregate event outboxes
    /// are drained as part of the commit.
    async fn save_changes(&self) -> anyhow::Result<()>;

    /// Open an explicit multi-step transaction.
    async fn begin_transaction(&self) -> anyhow::Result<()>;

    /// Commit the explicit transaction. Rolls back automatically if an
    /// inner failure occurs.
    async fn commit(&self) -> anyhow::Result<()>;

    /// Abandon the explicit transaction and all changes made within it.
    async fn rollback(&self) -> anyhow::Result<()>;
}
