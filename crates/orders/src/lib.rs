//! `orderflow-orders` — the Order aggregate root and its item entities.

pub mod item;
pub mod order;
pub mod status;

pub use item::{OrderItem, OrderItemId, RehydratedItem};
pub use order::{Order, OrderEvent, OrderId, ORDER_CURRENCY};
pub use status::OrderStatus;
