//! Tests for the grid event bus

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use slotgrid::services::events::{EventBus, GridEvent};
    use slotgrid::services::pool::InstanceId;
    use slotgrid::spatial::grid::{GridId, GridKind};

    fn placed(item: u32) -> GridEvent {
        GridEvent::ItemPlaced {
            grid: GridId(0),
            item: InstanceId(item),
        }
    }

    // Tests synchronous delivery in subscription order
    // Verified by notifying listeners in reverse
    #[test]
    fn test_listeners_called_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            bus.subscribe(move |event| log.borrow_mut().push((tag, event.item())));
        }

        bus.publish(placed(7));
        assert_eq!(
            *log.borrow(),
            vec![("first", InstanceId(7)), ("second", InstanceId(7))]
        );
        assert_eq!(bus.listener_count(), 2);
    }

    // Tests that unsubscribed listeners stop receiving events
    // Verified by leaving the listener in place
    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&hits);
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);

        bus.publish(placed(0));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(placed(1));
        assert_eq!(*hits.borrow(), 1);
    }

    // Tests the backlog keeps publication order and survives no listeners
    // Verified by dropping events when nobody listens
    #[test]
    fn test_drain_backlog() {
        let mut bus = EventBus::new();
        bus.publish(placed(1));
        bus.publish(GridEvent::ItemRemoved {
            grid: GridId(0),
            item: InstanceId(1),
        });
        assert_eq!(bus.pending_len(), 2);
        let drained = bus.drain();
        assert!(matches!(drained.first(), Some(GridEvent::ItemPlaced { .. })));
        assert!(matches!(drained.get(1), Some(GridEvent::ItemRemoved { .. })));
        assert_eq!(bus.pending_len(), 0);
        assert_eq!(bus.published_count(), 2);
    }

    // Tests the staging-to-board classifier
    // Verified by matching on any transfer
    #[test]
    fn test_staging_to_board_classification() {
        let inward = GridEvent::ItemTransferred {
            from: GridId(1),
            from_kind: GridKind::SingleRow,
            to: GridId(0),
            to_kind: GridKind::Coordinate,
            item: InstanceId(3),
        };
        let outward = GridEvent::ItemTransferred {
            from: GridId(0),
            from_kind: GridKind::Coordinate,
            to: GridId(1),
            to_kind: GridKind::SingleRow,
            item: InstanceId(3),
        };
        assert!(inward.is_staging_to_board());
        assert!(!outward.is_staging_to_board());
        assert!(!placed(3).is_staging_to_board());
        assert_eq!(outward.item(), InstanceId(3));
    }
}
