//! Memoized supplier whose cache the caller can see and own.
//!
//! [`explicit_term`] reads and writes a [`Memo`] itself: check, compute,
//! store. Recursion on `n - 1` and `n - 2` is driven by a work stack rather
//! than the call stack.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::error::SeqResult;
use crate::supplier::{Strategy, SupplierStats, TermSupplier};
use crate::term::{base_term, is_base_case, Term};

/// Index → term table. Only indices above the base cases are stored, and an
/// entry is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memo {
    entries: BTreeMap<u64, Term>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, n: u64) -> Option<&Term> {
        self.entries.get(&n)
    }

    pub fn contains(&self, n: u64) -> bool {
        self.entries.contains_key(&n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Term)> {
        self.entries.iter().map(|(n, t)| (*n, t))
    }

    fn lookup(&self, n: u64) -> Option<Term> {
        if is_base_case(n) {
            Some(base_term())
        } else {
            self.entries.get(&n).cloned()
        }
    }

    fn store(&mut self, n: u64, term: Term) {
        debug_assert!(!is_base_case(n));
        self.entries.entry(n).or_insert(term);
    }
}

/// The n-th term, using and extending `memo`.
pub fn explicit_term(n: u64, memo: &mut Memo) -> Term {
    if let Some(known) = memo.lookup(n) {
        return known;
    }

    let mut pending = vec![n];
    while let Some(&k) = pending.last() {
        if memo.contains(k) {
            pending.pop();
            continue;
        }
        match (memo.lookup(k - 1), memo.lookup(k - 2)) {
            (Some(a), Some(b)) => {
                memo.store(k, a + b);
                pending.pop();
            }
            (a, b) => {
                // n - 1 on top so it resolves first and fills n - 2 on the way.
                if b.is_none() {
                    pending.push(k - 2);
                }
                if a.is_none() {
                    pending.push(k - 1);
                }
            }
        }
    }

    memo.lookup(n).unwrap_or_else(base_term)
}

#[derive(Debug, Default)]
struct Inner {
    memo: Memo,
    computations: u64,
    cache_hits: u64,
}

#[derive(Debug, Default)]
pub struct ExplicitSupplier {
    inner: Mutex<Inner>,
}

impl ExplicitSupplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a memo the caller already holds.
    pub fn from_memo(memo: Memo) -> Self {
        Self {
            inner: Mutex::new(Inner {
                memo,
                ..Inner::default()
            }),
        }
    }

    pub fn memo_snapshot(&self) -> Memo {
        self.lock().memo.clone()
    }

    pub fn with_memo<R>(&self, f: impl FnOnce(&Memo) -> R) -> R {
        f(&self.lock().memo)
    }

    pub fn into_memo(self) -> Memo {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .memo
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TermSupplier for ExplicitSupplier {
    fn term(&self, n: u64) -> SeqResult<Term> {
        if is_base_case(n) {
            return Ok(base_term());
        }

        let mut inner = self.lock();
        if let Some(hit) = inner.memo.get(n).cloned() {
            inner.cache_hits += 1;
            trace!(n, "memo hit");
            return Ok(hit);
        }

        let before = inner.memo.len();
        let value = explicit_term(n, &mut inner.memo);
        // Every computation stores exactly one new entry.
        let computed = (inner.memo.len() - before) as u64;
        inner.computations += computed;
        debug!(n, computed, "extended memo");
        Ok(value)
    }

    fn strategy(&self) -> Strategy {
        Strategy::Explicit
    }

    fn stats(&self) -> SupplierStats {
        let inner = self.lock();
        SupplierStats {
            strategy: Strategy::Explicit,
            computations: inner.computations,
            cache_hits: inner.cache_hits,
            cached_terms: inner.memo.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn test_free_function_fills_memo() {
        let mut memo = Memo::new();
        assert_eq!(explicit_term(10, &mut memo), BigUint::from(55u32));
        let indices: Vec<u64> = memo.iter().map(|(n, _)| n).collect();
        assert_eq!(indices, (3..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_base_cases_skip_memo() {
        let mut memo = Memo::new();
        for n in 0..=2 {
            assert_eq!(explicit_term(n, &mut memo), BigUint::from(1u32));
        }
        assert!(memo.is_empty());
    }

    #[test]
    fn test_reference_values() {
        let supplier = ExplicitSupplier::new();
        assert_eq!(supplier.term(0).unwrap(), BigUint::from(1u32));
        assert_eq!(supplier.term(3).unwrap(), BigUint::from(2u32));
        assert_eq!(supplier.term(30).unwrap(), BigUint::from(832040u32));
        assert_eq!(supplier.term(49).unwrap(), BigUint::from(7778742049u64));
    }

    #[test]
    fn test_second_call_does_no_work() {
        let supplier = ExplicitSupplier::new();
        let first = supplier.term(25).unwrap();
        assert_eq!(supplier.stats().computations, 23);

        let second = supplier.term(25).unwrap();
        let stats = supplier.stats();
        assert_eq!(first, second);
        assert_eq!(stats.computations, 23);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cached_terms, 23);
    }

    #[test]
    fn test_memo_is_visible() {
        let supplier = ExplicitSupplier::new();
        supplier.term(12).unwrap();
        let t12 = supplier.with_memo(|memo| memo.get(12).cloned());
        assert_eq!(t12, Some(BigUint::from(144u32)));
        assert_eq!(supplier.memo_snapshot().len(), 10);
    }

    #[test]
    fn test_entries_never_change() {
        let supplier = ExplicitSupplier::new();
        supplier.term(20).unwrap();
        let before = supplier.memo_snapshot();

        supplier.term(40).unwrap();
        let after = supplier.memo_snapshot();
        for (n, term) in before.iter() {
            assert_eq!(after.get(n), Some(term));
        }
    }

    #[test]
    fn test_prewarmed_memo_reused() {
        let mut memo = Memo::new();
        explicit_term(30, &mut memo);

        let supplier = ExplicitSupplier::from_memo(memo);
        supplier.term(31).unwrap();
        assert_eq!(supplier.stats().computations, 1);

        let memo = supplier.into_memo();
        assert_eq!(memo.get(31), Some(&BigUint::from(1346269u32)));
    }

    #[test]
    fn test_large_index_no_stack_growth() {
        let mut memo = Memo::new();
        let big = explicit_term(10_000, &mut memo);
        assert_eq!(big, crate::iterative_term(10_000));
        assert_eq!(memo.len(), 9998);
    }
}
