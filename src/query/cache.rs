//! Compiled-query cache
//!
//! - Keyed by schema name, query kind and the raw string
//! - Bounded; the oldest entry is evicted first
//! - A single mutex guards all state; compilation runs outside the lock
//! - Errors are never cached
//!
//! A hit returns the same value a fresh compilation would.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::schema::SchemaGraph;

use super::errors::QueryResult;
use super::predicate::{OrderKey, Predicate};

/// Which compiler produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Filter,
    Order,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    schema: String,
    kind: QueryKind,
    raw: String,
}

#[derive(Debug, Clone)]
enum CachedQuery {
    Filter(Arc<Predicate>),
    Order(Arc<Vec<OrderKey>>),
}

/// Passive counters; never influence caching
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CachedQuery>,
    order: VecDeque<CacheKey>,
    stats: CacheStats,
}

#[derive(Debug)]
pub struct QueryCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl QueryCache {
    /// Creates a cache holding at most `capacity` entries; 0 disables it
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    /// Compiles a filter string, or returns the cached predicate
    pub fn filter(&self, filter: &str, schema: &str, graph: &SchemaGraph) -> QueryResult<Arc<Predicate>> {
        let key = CacheKey {
            schema: schema.to_string(),
            kind: QueryKind::Filter,
            raw: filter.to_string(),
        };
        if let Some(CachedQuery::Filter(predicate)) = self.lookup(&key) {
            return Ok(predicate);
        }

        let predicate = Arc::new(super::parse_and_compile(filter, schema, graph)?);
        self.insert(key, CachedQuery::Filter(Arc::clone(&predicate)));
        Ok(predicate)
    }

    /// Compiles an order string, or returns the cached keys
    pub fn order(&self, order: &str, schema: &str, graph: &SchemaGraph) -> QueryResult<Arc<Vec<OrderKey>>> {
        let key = CacheKey {
            schema: schema.to_string(),
            kind: QueryKind::Order,
            raw: order.to_string(),
        };
        if let Some(CachedQuery::Order(keys)) = self.lookup(&key) {
            return Ok(keys);
        }

        let keys = Arc::new(super::compile_order(order, schema, graph)?);
        self.insert(key, CachedQuery::Order(Arc::clone(&keys)));
        Ok(keys)
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedQuery> {
        if self.capacity == 0 {
            return None;
        }
        let mut state = self.lock();
        match state.entries.get(key).cloned() {
            Some(hit) => {
                state.stats.hits += 1;
                Some(hit)
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    fn insert(&self, key: CacheKey, value: CachedQuery) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.lock();
        // Another thread may have compiled the same string meanwhile
        if state.entries.contains_key(&key) {
            return;
        }
        while state.order.len() >= self.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                    state.stats.evictions += 1;
                }
                None => break,
            }
        }
        state.order.push_back(key.clone());
        state.entries.insert(key, value);
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Entries are immutable once inserted, so a poisoned lock holds valid data
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
