//! Publish/subscribe channel for grid events
//!
//! Listeners are notified synchronously in subscription order. Every event is
//! also queued so the session can route it after the handler that produced it
//! has finished mutating grids. Publishing with no listeners is fine.

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use crate::spatial::grid::{GridId, GridKind};
use crate::spatial::item::ItemId;

/// Something that happened to a grid's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// An item was written into a grid's occupancy
    ItemPlaced {
        /// Receiving grid
        grid: GridId,
        /// Placed item
        item: ItemId,
    },
    /// An item's cells were cleared
    ItemRemoved {
        /// Grid the item left
        grid: GridId,
        /// Removed item
        item: ItemId,
    },
    /// A drop landed in a different grid than the drag started from
    ItemTransferred {
        /// Grid the drag started from
        from: GridId,
        /// Topology of the source grid
        from_kind: GridKind,
        /// Grid the item was placed in
        to: GridId,
        /// Topology of the destination grid
        to_kind: GridKind,
        /// Transferred item
        item: ItemId,
    },
}

impl GridEvent {
    /// Item the event concerns
    pub const fn item(&self) -> ItemId {
        match *self {
            Self::ItemPlaced { item, .. }
            | Self::ItemRemoved { item, .. }
            | Self::ItemTransferred { item, .. } => item,
        }
    }

    /// True for a transfer from the staging row onto the board
    pub const fn is_staging_to_board(&self) -> bool {
        matches!(
            self,
            Self::ItemTransferred {
                from_kind: GridKind::SingleRow,
                to_kind: GridKind::Coordinate,
                ..
            }
        )
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Listener = Box<dyn FnMut(&GridEvent)>;

/// Multicast event channel with a drainable backlog
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    pending: VecDeque<GridEvent>,
    next_subscription: u32,
    published: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("pending", &self.pending)
            .field("published", &self.published)
            .finish()
    }
}

impl EventBus {
    /// Bus with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called for every later event
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GridEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Notify listeners and append the event to the backlog
    pub fn publish(&mut self, event: GridEvent) {
        trace!(?event, "grid event");
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        self.pending.push_back(event);
        self.published += 1;
    }

    /// Take every queued event in publication order
    pub fn drain(&mut self) -> Vec<GridEvent> {
        self.pending.drain(..).collect()
    }

    /// Number of queued events
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Total events published since creation
    pub const fn published_count(&self) -> u64 {
        self.published
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
