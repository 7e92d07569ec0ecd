//! `orderflow-products` — the Product catalog aggregate.

pub mod product;

pub use product::{Product, ProductEvent, ProductId};
