//! `orderflow-app` — application workflows over the order/product domain.
//!
//! Workflows load aggregates through the store contracts, invoke domain
//! operations, persist atomically through the unit of work, and convert
//! every failure (domain rule or infrastructure) into a typed [`Failure`]
//! result. Domain errors never escape this layer as raw errors.

pub mod orders;
pub mod products;
pub mod result;
pub mod stores;

pub use orders::{
    AddressRequest, CreateOrderRequest, OrderItemView, OrderLineRequest, OrderService, OrderView,
};
pub use products::{CreateProductRequest, ProductService, ProductView};
pub use result::{AppResult, Failure};
pub use stores::{OrderStore, ProductStore, UnitOfWork};
