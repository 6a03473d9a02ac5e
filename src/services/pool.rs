//! Keyed object pools with bounded growth
//!
//! Instances are created by a factory, pre-warmed per key, and recycled
//! instead of dropped. Acquiring never blocks: an exhausted or unknown pool
//! yields `None` and the caller skips the spawn. Lookups only see active
//! instances, so an id held past its release degrades to a no-op.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::io::configuration::{DEFAULT_POOL_INITIAL_SIZE, DEFAULT_POOL_MAX_SIZE};
use crate::services::scheduler::{Scheduler, TaskId};

/// Identity of a pooled instance, stable across reuse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle hooks run when an instance enters or leaves the active set
pub trait Poolable {
    /// Called after the instance is handed out
    fn on_spawn(&mut self) {}

    /// Called before the instance returns to its pool
    fn on_despawn(&mut self) {}
}

/// Size limits of one keyed pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Instances created up front (at least one)
    pub initial_size: usize,
    /// Upper bound on instances ever created for the key; 0 means the default
    pub max_size: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_POOL_INITIAL_SIZE,
            max_size: DEFAULT_POOL_MAX_SIZE,
        }
    }
}

impl PoolSettings {
    /// Apply the floors: one pre-warmed instance and a non-zero cap
    #[must_use]
    pub fn normalized(self) -> Self {
        let max_size = if self.max_size == 0 {
            DEFAULT_POOL_MAX_SIZE
        } else {
            self.max_size
        };
        Self {
            initial_size: self.initial_size.clamp(1, max_size),
            max_size,
        }
    }
}

/// Deferred pool work carried by a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolTask {
    /// Release an instance if it is still in the spawn it was scheduled for
    Release {
        /// Instance to release
        id: InstanceId,
        /// Spawn generation captured when scheduling
        generation: u32,
    },
}

/// Running totals across every key
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances built by the factory
    pub created: usize,
    /// Successful acquires
    pub acquired: usize,
    /// Successful releases
    pub released: usize,
    /// Acquires refused because a pool was exhausted or missing
    pub refused: usize,
}

#[derive(Debug)]
struct Entry<K, T> {
    key: K,
    value: T,
    active: bool,
    generation: u32,
}

type Factory<K, T> = Box<dyn FnMut(&K, InstanceId) -> Option<T>>;

/// Pools of `T` keyed by `K`
pub struct ObjectPool<K, T> {
    factory: Factory<K, T>,
    entries: BTreeMap<InstanceId, Entry<K, T>>,
    free: HashMap<K, VecDeque<InstanceId>>,
    settings: HashMap<K, PoolSettings>,
    totals: HashMap<K, usize>,
    next_id: u32,
    stats: PoolStats,
}

impl<K: fmt::Debug, T> fmt::Debug for ObjectPool<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("instances", &self.entries.len())
            .field("keys", &self.settings.keys().collect::<Vec<_>>())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<K, T> ObjectPool<K, T>
where
    K: Copy + Eq + Hash + fmt::Debug,
    T: Poolable,
{
    /// Empty set of pools; `factory` builds instances on demand
    ///
    /// The factory may return `None` (for example, an unknown key), which is
    /// treated like an exhausted pool.
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut(&K, InstanceId) -> Option<T> + 'static,
    {
        Self {
            factory: Box::new(factory),
            entries: BTreeMap::new(),
            free: HashMap::new(),
            settings: HashMap::new(),
            totals: HashMap::new(),
            next_id: 0,
            stats: PoolStats::default(),
        }
    }

    /// Create the pool for `key` and pre-warm it
    ///
    /// Returns how many instances were built. Registering a key twice keeps
    /// the first pool and logs a warning.
    pub fn register(&mut self, key: K, settings: PoolSettings) -> usize {
        if self.settings.contains_key(&key) {
            warn!(?key, "pool already registered");
            return 0;
        }
        let settings = settings.normalized();
        self.settings.insert(key, settings);
        self.free.entry(key).or_default();

        let mut built = 0;
        for _ in 0..settings.initial_size {
            let Some(id) = self.create(key) else {
                break;
            };
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.value.on_despawn();
            }
            self.free.entry(key).or_default().push_back(id);
            built += 1;
        }
        debug!(?key, built, max = settings.max_size, "pool registered");
        built
    }

    /// Whether a pool exists for `key`
    pub fn has_pool(&self, key: &K) -> bool {
        self.settings.contains_key(key)
    }

    fn create(&mut self, key: K) -> Option<InstanceId> {
        let id = InstanceId(self.next_id);
        let value = (self.factory)(&key, id)?;
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                key,
                value,
                active: false,
                generation: 0,
            },
        );
        *self.totals.entry(key).or_default() += 1;
        self.stats.created += 1;
        Some(id)
    }

    /// Hand out an instance of `key`, growing the pool up to its cap
    pub fn acquire(&mut self, key: K) -> Option<InstanceId> {
        let Some(settings) = self.settings.get(&key).copied() else {
            warn!(?key, "no pool registered for key");
            self.stats.refused += 1;
            return None;
        };

        let reused = self.free.get_mut(&key).and_then(VecDeque::pop_front);
        let id = match reused {
            Some(id) => id,
            None => {
                let total = self.totals.get(&key).copied().unwrap_or(0);
                if total >= settings.max_size {
                    warn!(?key, max = settings.max_size, "pool exhausted");
                    self.stats.refused += 1;
                    return None;
                }
                let Some(id) = self.create(key) else {
                    warn!(?key, "pool factory produced no instance");
                    self.stats.refused += 1;
                    return None;
                };
                id
            }
        };

        let entry = self.entries.get_mut(&id)?;
        entry.active = true;
        entry.generation = entry.generation.wrapping_add(1);
        entry.value.on_spawn();
        self.stats.acquired += 1;
        Some(id)
    }

    /// Return an active instance to its pool; releasing twice is a no-op
    pub fn release(&mut self, id: InstanceId) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        if !entry.active {
            return false;
        }
        entry.value.on_despawn();
        entry.active = false;
        let key = entry.key;
        self.free.entry(key).or_default().push_back(id);
        self.stats.released += 1;
        true
    }

    /// Schedule a release of `id` after `delay`
    ///
    /// The task is owned by the instance. If the instance is released and
    /// acquired again before the task runs, the stale task does nothing.
    /// Returns `None` when `id` is not active.
    pub fn release_after<O, P>(
        &self,
        id: InstanceId,
        delay: Duration,
        scheduler: &mut Scheduler<O, P>,
    ) -> Option<TaskId>
    where
        O: From<InstanceId>,
        P: From<PoolTask>,
    {
        let entry = self.entries.get(&id).filter(|entry| entry.active)?;
        let task = PoolTask::Release {
            id,
            generation: entry.generation,
        };
        Some(scheduler.schedule(O::from(id), delay, P::from(task)))
    }

    /// Execute a deferred pool task; returns whether it had an effect
    pub fn run_task(&mut self, task: PoolTask) -> bool {
        match task {
            PoolTask::Release { id, generation } => {
                let current = self
                    .entries
                    .get(&id)
                    .is_some_and(|entry| entry.active && entry.generation == generation);
                current && self.release(id)
            }
        }
    }

    /// Active instance by id
    pub fn get(&self, id: InstanceId) -> Option<&T> {
        self.entries
            .get(&id)
            .filter(|entry| entry.active)
            .map(|entry| &entry.value)
    }

    /// Mutable active instance by id
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut T> {
        self.entries
            .get_mut(&id)
            .filter(|entry| entry.active)
            .map(|entry| &mut entry.value)
    }

    /// Key an instance belongs to, active or not
    pub fn key_of(&self, id: InstanceId) -> Option<K> {
        self.entries.get(&id).map(|entry| entry.key)
    }

    /// Whether `id` is currently handed out
    pub fn is_active(&self, id: InstanceId) -> bool {
        self.entries.get(&id).is_some_and(|entry| entry.active)
    }

    /// Ids of every active instance in ascending order
    pub fn active_ids(&self) -> Vec<InstanceId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.active)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of active instances across all keys
    pub fn active_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.active).count()
    }

    /// Idle instances waiting in the pool for `key`
    pub fn free_count(&self, key: &K) -> usize {
        self.free.get(key).map_or(0, VecDeque::len)
    }

    /// Instances ever built for `key`
    pub fn total_count(&self, key: &K) -> usize {
        self.totals.get(key).copied().unwrap_or(0)
    }

    /// Running totals
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }
}
