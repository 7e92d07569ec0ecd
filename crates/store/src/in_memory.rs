//! In-memory store: shared maps behind a lock, staged mutations flushed
//! atomically by the unit of work.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{anyhow, bail};
use async_trait::async_trait;

use orderflow_app::{OrderStore, ProductStore, UnitOfWork};
use orderflow_core::{AggregateRoot, CustomerId};
use orderflow_orders::{Order, OrderId, OrderStatus};
use orderflow_products::{Product, ProductId};

/// Committed state. Cloned wholesale for snapshots and commit staging.
#[derive(Debug, Default, Clone)]
struct Db {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
}

/// A staged mutation, applied at `save_changes`.
#[derive(Debug)]
enum Pending {
    AddProduct(Product),
    UpdateProduct(Product),
    DeleteProduct(ProductId),
    AddOrder(Order),
    UpdateOrder(Order),
    DeleteOrder(OrderId),
}

struct Shared {
    committed: RwLock<Db>,
    pending: Mutex<Vec<Pending>>,
    snapshot: Mutex<Option<Db>>,
}

/// In-memory product/order store and unit of work.
///
/// Reads see committed state only; `add`/`update`/`delete` stage mutations
/// that `save_changes` applies all-or-nothing under a single write lock
/// (which also serializes concurrent commits, satisfying the reservation
/// isolation assumption in-process). Aggregate event outboxes are drained
/// at commit time and discarded: events are declared, never dispatched.
#[derive(Clone)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                committed: RwLock::new(Db::default()),
                pending: Mutex::new(Vec::new()),
                snapshot: Mutex::new(None),
            }),
        }
    }

    fn read_db(&self) -> anyhow::Result<Db> {
        Ok(self
            .shared
            .committed
            .read()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .clone())
    }

    fn stage(&self, op: Pending) -> anyhow::Result<()> {
        self.shared
            .pending
            .lock()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .push(op);
        Ok(())
    }

    /// Apply every staged mutation to a copy of the committed state, then
    /// swap the copy in. A failure discards the whole batch.
    fn flush(&self) -> anyhow::Result<()> {
        let staged: Vec<Pending> = self
            .shared
            .pending
            .lock()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .drain(..)
            .collect();

        if staged.is_empty() {
            return Ok(());
        }

        let mut committed = self
            .shared
            .committed
            .write()
            .map_err(|_| anyhow!("store lock poisoned"))?;

        let mut next = committed.clone();
        for op in staged {
            match op {
                Pending::AddProduct(mut product) => {
                    let id = product.id_typed();
                    if next.products.contains_key(&id) {
                        bail!("product {id} already exists");
                    }
                    let _ = product.take_events();
                    next.products.insert(id, product);
                }
                Pending::UpdateProduct(mut product) => {
                    let id = product.id_typed();
                    if !next.products.contains_key(&id) {
                        bail!("cannot update unknown product {id}");
                    }
                    let _ = product.take_events();
                    next.products.insert(id, product);
                }
                Pending::DeleteProduct(id) => {
                    if next.products.remove(&id).is_none() {
                        bail!("cannot delete unknown product {id}");
                    }
                }
                Pending::AddOrder(mut order) => {
                    let id = order.id_typed();
                    if next.orders.contains_key(&id) {
                        bail!("order {id} already exists");
                    }
                    let _ = order.take_events();
                    next.orders.insert(id, order);
                }
                Pending::UpdateOrder(mut order) => {
                    let id = order.id_typed();
                    if !next.orders.contains_key(&id) {
                        bail!("cannot update unknown order {id}");
                    }
                    let _ = order.take_events();
                    next.orders.insert(id, order);
                }
                Pending::DeleteOrder(id) => {
                    if next.orders.remove(&id).is_none() {
                        bail!("cannot delete unknown order {id}");
                    }
                }
            }
        }

        *committed = next;
        Ok(())
    }

    fn restore(&self, db: Db) -> anyhow::Result<()> {
        let mut committed = self
            .shared
            .committed
            .write()
            .map_err(|_| anyhow!("store lock poisoned"))?;
        *committed = db;
        self.shared
            .pending
            .lock()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .clear();
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn get_by_id(&self, id: ProductId) -> anyhow::Result<Option<Product>> {
        Ok(self.read_db()?.products.get(&id).cloned())
    }

    async fn get_by_sku(&self, sku: &str) -> anyhow::Result<Option<Product>> {
        Ok(self
            .read_db()?
            .products
            .values()
            .find(|product| product.sku() == sku)
            .cloned())
    }

    async fn get_by_ids(&self, ids: &[ProductId]) -> anyhow::Result<Vec<Product>> {
        let db = self.read_db()?;
        Ok(ids
            .iter()
            .filter_map(|id| db.products.get(id).cloned())
            .collect())
    }

    async fn get_all(&self) -> anyhow::Result<Vec<Product>> {
        Ok(self.read_db()?.products.into_values().collect())
    }

    async fn get_active(&self) -> anyhow::Result<Vec<Product>> {
        Ok(self
            .read_db()?
            .products
            .into_values()
            .filter(Product::is_active)
            .collect())
    }

    async fn get_low_stock(&self) -> anyhow::Result<Vec<Product>> {
        let mut low: Vec<Product> = self
            .read_db()?
            .products
            .into_values()
            .filter(|product| product.is_active() && product.is_low_stock())
            .collect();
        low.sort_by_key(Product::stock_quantity);
        Ok(low)
    }

    async fn sku_exists(&self, sku: &str) -> anyhow::Result<bool> {
        Ok(self
            .read_db()?
            .products
            .values()
            .any(|product| product.sku() == sku))
    }

    async fn add(&self, product: Product) -> anyhow::Result<()> {
        self.stage(Pending::AddProduct(product))
    }

    async fn update(&self, product: Product) -> anyhow::Result<()> {
        self.stage(Pending::UpdateProduct(product))
    }

    async fn delete(&self, id: ProductId) -> anyhow::Result<()> {
        self.stage(Pending::DeleteProduct(id))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn get_by_id(&self, id: OrderId) -> anyhow::Result<Option<Order>> {
        // Items live inside the aggregate here; eager/lazy loading only
        // differs for relational implementations.
        Ok(self.read_db()?.orders.get(&id).cloned())
    }

    async fn get_by_id_with_items(&self, id: OrderId) -> anyhow::Result<Option<Order>> {
        Ok(self.read_db()?.orders.get(&id).cloned())
    }

    async fn get_by_customer_id(&self, customer_id: CustomerId) -> anyhow::Result<Vec<Order>> {
        Ok(self
            .read_db()?
            .orders
            .into_values()
            .filter(|order| order.customer_id() == customer_id)
            .collect())
    }

    async fn get_pending_orders(&self) -> anyhow::Result<Vec<Order>> {
        Ok(self
            .read_db()?
            .orders
            .into_values()
            .filter(|order| order.status() == OrderStatus::Pending)
            .collect())
    }

    async fn get_all(&self) -> anyhow::Result<Vec<Order>> {
        Ok(self.read_db()?.orders.into_values().collect())
    }

    async fn exists(&self, id: OrderId) -> anyhow::Result<bool> {
        Ok(self.read_db()?.orders.contains_key(&id))
    }

    async fn add(&self, order: Order) -> anyhow::Result<()> {
        self.stage(Pending::AddOrder(order))
    }

    async fn update(&self, order: Order) -> anyhow::Result<()> {
        self.stage(Pending::UpdateOrder(order))
    }

    async fn delete(&self, id: OrderId) -> anyhow::Result<()> {
        self.stage(Pending::DeleteOrder(id))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn save_changes(&self) -> anyhow::Result<()> {
        self.flush()
    }

    async fn begin_transaction(&self) -> anyhow::Result<()> {
        let mut snapshot = self
            .shared
            .snapshot
            .lock()
            .map_err(|_| anyhow!("store lock poisoned"))?;
        if snapshot.is_some() {
            bail!("a transaction is already open");
        }
        *snapshot = Some(self.read_db()?);
        Ok(())
    }

    async fn commit(&self) -> anyhow::Result<()> {
        let taken = self
            .shared
            .snapshot
            .lock()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .take();
        let Some(snapshot) = taken else {
            bail!("no open transaction to commit");
        };

        if let Err(err) = self.flush() {
            // Automatic rollback on inner failure.
            self.restore(snapshot)?;
            return Err(err);
        }
        Ok(())
    }

    async fn rollback(&self) -> anyhow::Result<()> {
        let taken = self
            .shared
            .snapshot
            .lock()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .take();
        let Some(snapshot) = taken else {
            bail!("no open transaction to roll back");
        };
        self.restore(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::Money;
    use rust_decimal::Decimal;

    fn test_product(sku: &str) -> Product {
        Product::create(
            "Widget",
            sku,
            Money::usd(Decimal::new(1000, 2)).unwrap(),
            "",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn staged_add_is_invisible_until_save() {
        let store = InMemoryStore::new();
        let product = test_product("SKU-1");
        let id = product.id_typed();

        ProductStore::add(&store, product).await.unwrap();
        assert!(ProductStore::get_by_id(&store,id).await.unwrap().is_none());

        store.save_changes().await.unwrap();
        let loaded = ProductStore::get_by_id(&store,id).await.unwrap().unwrap();
        assert_eq!(loaded.sku(), "SKU-1");
        // Outbox drained at commit.
        assert!(loaded.pending_events().is_empty());
    }

    #[tokio::test]
    async fn duplicate_add_fails_and_applies_nothing() {
        let store = InMemoryStore::new();
        let product = test_product("SKU-1");
        let id = product.id_typed();

        ProductStore::add(&store, product.clone()).await.unwrap();
        store.save_changes().await.unwrap();

        let other = test_product("SKU-2");
        let other_id = other.id_typed();
        ProductStore::add(&store, other).await.unwrap();
        ProductStore::add(&store, product).await.unwrap();

        assert!(store.save_changes().await.is_err());
        // The whole batch was discarded, including the valid add.
        assert!(ProductStore::get_by_id(&store,other_id).await.unwrap().is_none());
        assert!(ProductStore::get_by_id(&store,id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_replaces_committed_state() {
        let store = InMemoryStore::new();
        let mut product = test_product("SKU-1");
        let id = product.id_typed();
        ProductStore::add(&store, product.clone()).await.unwrap();
        store.save_changes().await.unwrap();

        product.add_stock(7).unwrap();
        ProductStore::update(&store, product).await.unwrap();
        store.save_changes().await.unwrap();

        assert_eq!(
            ProductStore::get_by_id(&store,id).await.unwrap().unwrap().stock_quantity(),
            7
        );
    }

    #[tokio::test]
    async fn get_low_stock_filters_and_sorts_ascending() {
        let store = InMemoryStore::new();

        let mut a = test_product("A");
        a.set_low_stock_threshold(10).unwrap();
        a.add_stock(5).unwrap();

        let mut b = test_product("B");
        b.set_low_stock_threshold(10).unwrap();
        b.add_stock(2).unwrap();

        let mut c = test_product("C");
        c.set_low_stock_threshold(10).unwrap();
        c.add_stock(3).unwrap();
        c.deactivate(); // inactive products are excluded

        let mut d = test_product("D");
        d.add_stock(50).unwrap(); // well above its threshold of 0

        for product in [a, b, c, d] {
            ProductStore::add(&store, product).await.unwrap();
        }
        store.save_changes().await.unwrap();

        let low = store.get_low_stock().await.unwrap();
        let skus: Vec<&str> = low.iter().map(Product::sku).collect();
        assert_eq!(skus, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn sku_exists_and_get_by_sku() {
        let store = InMemoryStore::new();
        ProductStore::add(&store, test_product("SKU-1")).await.unwrap();
        store.save_changes().await.unwrap();

        assert!(store.sku_exists("SKU-1").await.unwrap());
        assert!(!store.sku_exists("SKU-2").await.unwrap());
        assert!(store.get_by_sku("SKU-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rollback_restores_pre_transaction_state() {
        let store = InMemoryStore::new();
        let product = test_product("SKU-1");
        let id = product.id_typed();
        ProductStore::add(&store, product).await.unwrap();
        store.save_changes().await.unwrap();

        store.begin_transaction().await.unwrap();
        ProductStore::delete(&store, id).await.unwrap();
        store.save_changes().await.unwrap();
        assert!(ProductStore::get_by_id(&store,id).await.unwrap().is_none());

        store.rollback().await.unwrap();
        assert!(ProductStore::get_by_id(&store,id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn commit_rolls_back_on_inner_failure() {
        let store = InMemoryStore::new();
        let product = test_product("SKU-1");
        ProductStore::add(&store, product.clone()).await.unwrap();
        store.save_changes().await.unwrap();

        store.begin_transaction().await.unwrap();
        // Duplicate add will fail the flush inside commit.
        ProductStore::add(&store, product.clone()).await.unwrap();
        assert!(store.commit().await.is_err());

        // Committed state unchanged, staging cleared.
        assert_eq!(ProductStore::get_all(&store).await.unwrap().len(), 1);
        store.save_changes().await.unwrap();
        assert_eq!(ProductStore::get_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_active_excludes_deactivated_products() {
        let store = InMemoryStore::new();
        let active = test_product("SKU-1");
        let mut inactive = test_product("SKU-2");
        inactive.deactivate();
        for product in [active, inactive] {
            ProductStore::add(&store, product).await.unwrap();
        }
        store.save_changes().await.unwrap();

        let listed = store.get_active().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].sku(), "SKU-1");
    }

    #[tokio::test]
    async fn order_queries_filter_by_status_and_customer() {
        let store = InMemoryStore::new();
        let mut product = test_product("SKU-1");
        product.add_stock(10).unwrap();

        let address = orderflow_core::Address::new("1 Main St", "Springfield", "IL", "62701", "US")
            .unwrap();
        let customer = CustomerId::new();

        let mut pending = Order::create(customer, address.clone()).unwrap();
        pending.add_item(&product, 1).unwrap();

        let mut confirmed = Order::create(customer, address).unwrap();
        confirmed.add_item(&product, 2).unwrap();
        confirmed.confirm().unwrap();

        let pending_id = pending.id_typed();
        for order in [pending, confirmed] {
            OrderStore::add(&store, order).await.unwrap();
        }
        store.save_changes().await.unwrap();

        assert!(store.exists(pending_id).await.unwrap());
        assert!(!store.exists(OrderId::generate()).await.unwrap());

        let open = store.get_pending_orders().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id_typed(), pending_id);

        assert_eq!(store.get_by_customer_id(customer).await.unwrap().len(), 2);
        assert!(store
            .get_by_customer_id(CustomerId::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn delete_product_removes_it() {
        let store = InMemoryStore::new();
        let product = test_product("SKU-1");
        let id = product.id_typed();
        ProductStore::add(&store, product).await.unwrap();
        store.save_changes().await.unwrap();

        ProductStore::delete(&store, id).await.unwrap();
        store.save_changes().await.unwrap();
        assert!(ProductStore::get_by_id(&store,id).await.unwrap().is_none());
    }
}
