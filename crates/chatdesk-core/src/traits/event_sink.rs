//! Fire-and-forget admin notification sink.

use crate::events::AdminEvent;

/// Delivers [`AdminEvent`]s to whoever is watching.
///
/// Delivery is at-most-once with no backlog; a sink with no subscribers
/// drops the event.
pub trait AdminEventSink: Send + Sync + 'static {
    /// Publish an event to all admin observers.
    fn publish(&self, event: AdminEvent);
}
