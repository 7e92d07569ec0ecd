//! Aggregate root trait for state-mutating domain models.

use crate::entity::Entity;

/// Aggregate root marker + minimal interface.
///
/// An aggregate root is the sole mutation entry point for its cluster of
/// child objects. This is intentionally small so modules can decide how they
/// model state transitions without bringing in any infrastructure concerns.
///
/// Aggregates record domain events into a per-instance outbox as they
/// mutate. Nothing dispatches these events yet; the persistence layer drains
/// the outbox via [`take_events`](AggregateRoot::take_events) at commit time
/// so instances never accumulate stale events across save cycles.
pub trait AggregateRoot: Entity {
    /// Domain event type recorded by this aggregate.
    type DomainEvent: Clone + core::fmt::Debug;

    /// Drain the pending (undispatched) domain events.
    fn take_events(&mut self) -> Vec<Self::DomainEvent>;

    /// Pending events recorded since the last drain.
    fn pending_events(&self) -> &[Self::DomainEvent];
}
