//! Tests for keyed object pools and deferred releases

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use slotgrid::services::pool::{InstanceId, ObjectPool, PoolSettings, PoolTask, Poolable};
    use slotgrid::services::scheduler::Scheduler;

    #[derive(Debug, Default)]
    struct Token {
        spawns: u32,
        despawns: u32,
    }

    impl Poolable for Token {
        fn on_spawn(&mut self) {
            self.spawns += 1;
        }

        fn on_despawn(&mut self) {
            self.despawns += 1;
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Task {
        Pool(PoolTask),
    }

    impl From<PoolTask> for Task {
        fn from(task: PoolTask) -> Self {
            Self::Pool(task)
        }
    }

    fn pool() -> ObjectPool<u8, Token> {
        ObjectPool::new(|key: &u8, _id| (*key != 0).then(Token::default))
    }

    fn settings(initial_size: usize, max_size: usize) -> PoolSettings {
        PoolSettings {
            initial_size,
            max_size,
        }
    }

    // Tests pre-warming and the floors applied to settings
    // Verified by skipping normalization in register
    #[test]
    fn test_register_prewarms() {
        let mut pool = pool();
        assert_eq!(pool.register(1, settings(2, 5)), 2);
        assert_eq!(pool.free_count(&1), 2);
        assert_eq!(pool.total_count(&1), 2);
        assert_eq!(pool.register(1, settings(4, 5)), 0);
        assert_eq!(pool.register(2, settings(0, 0)), 1);
        assert_eq!(settings(9, 4).normalized(), settings(4, 4));
        assert!(pool.has_pool(&2));
        assert!(!pool.has_pool(&3));
    }

    // Tests growth up to the cap and refusal beyond it
    // Verified by ignoring max_size when the free list is empty
    #[test]
    fn test_acquire_grows_to_cap() {
        let mut pool = pool();
        pool.register(1, settings(1, 2));
        let first = pool.acquire(1);
        let second = pool.acquire(1);
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
        assert!(pool.acquire(1).is_none());
        assert!(pool.acquire(7).is_none());
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.stats().refused, 2);
        assert_eq!(pool.stats().created, 2);
    }

    // Tests that a factory returning nothing is treated as exhaustion
    // Verified by panicking on a None factory result
    #[test]
    fn test_factory_refusal() {
        let mut pool = pool();
        assert_eq!(pool.register(0, settings(3, 3)), 0);
        assert!(pool.acquire(0).is_none());
    }

    // Tests recycling, hooks and double-release protection
    // Verified by pushing released ids twice onto the free list
    #[test]
    fn test_release_recycles() {
        let mut pool = pool();
        pool.register(1, settings(1, 1));
        let Some(id) = pool.acquire(1) else {
            unreachable!("pool has a free instance");
        };
        assert!(pool.get(id).is_some_and(|token| token.spawns == 1));
        assert_eq!(pool.key_of(id), Some(1));

        assert!(pool.release(id));
        assert!(!pool.release(id));
        assert!(pool.get(id).is_none());
        assert!(!pool.is_active(id));
        assert_eq!(pool.free_count(&1), 1);

        assert_eq!(pool.acquire(1), Some(id));
        assert!(pool.get(id).is_some_and(|token| token.spawns == 2 && token.despawns == 2));
        assert_eq!(pool.active_ids(), vec![id]);
        assert!(!pool.release(InstanceId(99)));
    }

    // Tests that a deferred release fires once its delay elapses
    // Verified by releasing immediately in release_after
    #[test]
    fn test_release_after() {
        let mut pool = pool();
        let mut scheduler: Scheduler<InstanceId, Task> = Scheduler::new();
        pool.register(1, settings(1, 1));
        let Some(id) = pool.acquire(1) else {
            unreachable!("pool has a free instance");
        };
        assert!(pool.release_after(id, Duration::from_secs(1), &mut scheduler).is_some());
        assert!(scheduler.advance(Duration::from_millis(500)).is_empty());
        assert!(pool.is_active(id));

        for Task::Pool(task) in scheduler.advance(Duration::from_millis(500)) {
            assert!(pool.run_task(task));
        }
        assert!(!pool.is_active(id));
        assert!(pool.release_after(id, Duration::ZERO, &mut scheduler).is_none());
    }

    // Tests that a stale release cannot hit a reacquired instance
    // Verified by dropping the generation check in run_task
    #[test]
    fn test_stale_release_is_ignored() {
        let mut pool = pool();
        let mut scheduler: Scheduler<InstanceId, Task> = Scheduler::new();
        pool.register(1, settings(1, 1));
        let Some(id) = pool.acquire(1) else {
            unreachable!("pool has a free instance");
        };
        assert!(pool.release_after(id, Duration::from_secs(1), &mut scheduler).is_some());
        assert!(pool.release(id));
        assert_eq!(pool.acquire(1), Some(id));

        for Task::Pool(task) in scheduler.advance(Duration::from_secs(1)) {
            assert!(!pool.run_task(task));
        }
        assert!(pool.is_active(id));
    }
}
