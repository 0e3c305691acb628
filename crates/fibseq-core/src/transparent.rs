//! Memoized supplier whose cache is invisible to callers.
//!
//! Terms are filled bottom-up from the nearest pair of known terms, so the
//! call stack never grows with the index. The whole read-check-write runs
//! under one lock: concurrent callers asking for the same index see exactly
//! one evaluation per key while it stays resident.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::{debug, trace};

use crate::error::{SeqError, SeqResult};
use crate::supplier::{Strategy, SupplierStats, TermSupplier};
use crate::term::{base_term, is_base_case, Term};

/// Entry bound used when no capacity is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

const DEFAULT_LRU_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CACHE_CAPACITY) {
    Some(capacity) => capacity,
    None => panic!("DEFAULT_CACHE_CAPACITY must be non-zero"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Grow forever. Memory is proportional to the largest index requested.
    Unbounded,
    /// Keep at most `capacity` terms, evicting the least recently used.
    Lru { capacity: usize },
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Lru {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Lru { capacity } => write!(f, "lru({capacity})"),
        }
    }
}

enum Cache {
    Unbounded(HashMap<u64, Term>),
    Lru(LruCache<u64, Term>),
}

impl Cache {
    fn new(policy: CachePolicy) -> SeqResult<Self> {
        match policy {
            CachePolicy::Unbounded => Ok(Self::Unbounded(HashMap::new())),
            CachePolicy::Lru { capacity } => {
                let capacity = NonZeroUsize::new(capacity)
                    .ok_or_else(|| SeqError::Config("cache capacity must be at least 1".into()))?;
                Ok(Self::Lru(LruCache::new(capacity)))
            }
        }
    }

    /// Lookup that counts as a use for LRU ordering.
    fn get(&mut self, n: u64) -> Option<Term> {
        match self {
            Self::Unbounded(map) => map.get(&n).cloned(),
            Self::Lru(lru) => lru.get(&n).cloned(),
        }
    }

    fn peek(&self, n: u64) -> Option<&Term> {
        match self {
            Self::Unbounded(map) => map.get(&n),
            Self::Lru(lru) => lru.peek(&n),
        }
    }

    /// Insert-if-absent; an existing entry is never replaced.
    fn insert(&mut self, n: u64, term: Term) {
        match self {
            Self::Unbounded(map) => {
                map.entry(n).or_insert(term);
            }
            Self::Lru(lru) => {
                if lru.contains(&n) {
                    return;
                }
                if let Some((evicted, _)) = lru.push(n, term) {
                    trace!(evicted, "lru eviction");
                }
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Unbounded(map) => map.len(),
            Self::Lru(lru) => lru.len(),
        }
    }

    /// Known value for `n`, counting base cases as always known.
    fn known(&self, n: u64) -> Option<Term> {
        if is_base_case(n) {
            Some(base_term())
        } else {
            self.peek(n).cloned()
        }
    }
}

struct Inner {
    cache: Cache,
    computations: u64,
    cache_hits: u64,
}

impl Inner {
    fn fill(&mut self, n: u64) -> Term {
        if let Some(hit) = self.cache.get(n) {
            self.cache_hits += 1;
            trace!(n, "cache hit");
            return hit;
        }

        // Highest k < n with both k and k-1 known. k = 2 always qualifies.
        let mut k = n - 1;
        let (mut prev, mut curr) = loop {
            if let (Some(a), Some(b)) = (self.cache.known(k - 1), self.cache.known(k)) {
                break (a, b);
            }
            k -= 1;
        };

        let before = self.computations;
        for i in (k + 1)..=n {
            let next = match self.cache.peek(i) {
                Some(cached) => cached.clone(),
                None => {
                    let value = &prev + &curr;
                    self.computations += 1;
                    self.cache.insert(i, value.clone());
                    value
                }
            };
            prev = std::mem::replace(&mut curr, next);
        }
        debug!(
            n,
            from = k,
            computed = self.computations - before,
            "filled memo"
        );
        curr
    }
}

pub struct TransparentSupplier {
    policy: CachePolicy,
    inner: Mutex<Inner>,
}

impl TransparentSupplier {
    pub fn new(policy: CachePolicy) -> SeqResult<Self> {
        Ok(Self::with_cache(policy, Cache::new(policy)?))
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn with_cache(policy: CachePolicy, cache: Cache) -> Self {
        Self {
            policy,
            inner: Mutex::new(Inner {
                cache,
                computations: 0,
                cache_hits: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries are only ever whole, inserted-once values, so a panic
        // elsewhere cannot leave the cache inconsistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// LRU with [`DEFAULT_CACHE_CAPACITY`] entries.
impl Default for TransparentSupplier {
    fn default() -> Self {
        Self::with_cache(
            CachePolicy::default(),
            Cache::Lru(LruCache::new(DEFAULT_LRU_CAPACITY)),
        )
    }
}

impl fmt::Debug for TransparentSupplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransparentSupplier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl TermSupplier for TransparentSupplier {
    fn term(&self, n: u64) -> SeqResult<Term> {
        if is_base_case(n) {
            return Ok(base_term());
        }
        Ok(self.lock().fill(n))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Transparent
    }

    fn stats(&self) -> SupplierStats {
        let inner = self.lock();
        SupplierStats {
            strategy: Strategy::Transparent,
            computations: inner.computations,
            cache_hits: inner.cache_hits,
            cached_terms: inner.cache.len(),
        }
    }
}
