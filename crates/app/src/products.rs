//! Product use cases: catalog management and stock adjustments.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use orderflow_core::Money;
use orderflow_products::{Product, ProductId};

use crate::result::{AppResult, Failure};
use crate::stores::{ProductStore, UnitOfWork};

/// Request payload for creating a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub currency: String,
    pub description: String,
    pub low_stock_threshold: Option<u32>,
}

/// Read-side view of a product; queries never leak aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub currency: String,
    pub description: String,
    pub stock_quantity: u32,
    pub low_stock_threshold: u32,
    pub is_active: bool,
    pub is_low_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id_typed(),
            name: product.name().to_string(),
            sku: product.sku().to_string(),
            price: product.price().amount(),
            currency: product.price().currency().to_string(),
            description: product.description().to_string(),
            stock_quantity: product.stock_quantity(),
            low_stock_threshold: product.low_stock_threshold(),
            is_active: product.is_active(),
            is_low_stock: product.is_low_stock(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

/// Product workflows: each operation takes a plain request, runs the domain
/// logic, and persists through the unit of work.
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    uow: Arc<dyn UnitOfWork>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductStore>, uow: Arc<dyn UnitOfWork>) -> Self {
        Self { products, uow }
    }

    /// Create a product. SKUs are unique across the catalog; the check runs
    /// before any domain object is constructed.
    pub async fn create_product(&self, request: CreateProductRequest) -> AppResult<ProductId> {
        if self.products.sku_exists(&request.sku).await? {
            return Err(Failure::new(format!(
                "a product with SKU '{}' already exists",
                request.sku
            )));
        }

        let price = Money::new(request.price, &request.currency)?;
        let mut product = Product::create(
            &request.name,
            &request.sku,
            price,
            &request.description,
        )?;

        if let Some(threshold) = request.low_stock_threshold {
            product.set_low_stock_threshold(threshold)?;
        }

        let id = product.id_typed();
        self.products.add(product).await?;
        self.uow.save_changes().await?;

        info!(product_id = %id, sku = %request.sku, "product created");
        Ok(id)
    }

    pub async fn add_stock(&self, product_id: ProductId, quantity: u32) -> AppResult<()> {
        let mut product = self.load(product_id).await?;
        product.add_stock(quantity)?;

        self.products.update(product).await?;
        self.uow.save_changes().await?;

        info!(product_id = %product_id, quantity, "stock added");
        Ok(())
    }

    pub async fn update_product_price(
        &self,
        product_id: ProductId,
        price: Decimal,
        currency: &str,
    ) -> AppResult<()> {
        let new_price = Money::new(price, currency)?;
        let mut product = self.load(product_id).await?;
        product.update_price(new_price)?;

        self.products.update(product).await?;
        self.uow.save_changes().await?;
        Ok(())
    }

    pub async fn update_product_info(
        &self,
        product_id: ProductId,
        name: &str,
        description: &str,
    ) -> AppResult<()> {
        let mut product = self.load(product_id).await?;
        product.update_info(name, description)?;

        self.products.update(product).await?;
        self.uow.save_changes().await?;
        Ok(())
    }

    /// Soft delete: the product is retained for audit and reactivation,
    /// only excluded from new order placement.
    pub async fn deactivate_product(&self, product_id: ProductId) -> AppResult<()> {
        let mut product = self.load(product_id).await?;
        product.deactivate();

        self.products.update(product).await?;
        self.uow.save_changes().await?;

        info!(product_id = %product_id, "product deactivated");
        Ok(())
    }

    pub async fn activate_product(&self, product_id: ProductId) -> AppResult<()> {
        let mut product = self.load(product_id).await?;
        product.activate();

        self.products.update(product).await?;
        self.uow.save_changes().await?;
        Ok(())
    }

    pub async fn get_product(&self, product_id: ProductId) -> AppResult<ProductView> {
        let product = self.load(product_id).await?;
        Ok(ProductView::from(&product))
    }

    pub async fn get_all_products(&self) -> AppResult<Vec<ProductView>> {
        let products = self.products.get_all().await?;
        Ok(products.iter().map(ProductView::from).collect())
    }

    /// Active products at or below their low-stock threshold.
    pub async fn get_low_stock_products(&self) -> AppResult<Vec<ProductView>> {
        let products = self.products.get_low_stock().await?;
        Ok(products.iter().map(ProductView::from).collect())
    }

    async fn load(&self, product_id: ProductId) -> AppResult<Product> {
        self.products
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| Failure::new(format!("product with id {product_id} was not found")))
    }
}
