use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SeqResult;
use crate::supplier::{Strategy, SupplierStats, TermSupplier};
use crate::term::{base_term, is_base_case, Term};

/// The n-th term from a single forward pass, keeping only the last two terms.
pub fn iterative_term(n: u64) -> Term {
    let mut prev = base_term();
    let mut curr = base_term();
    if is_base_case(n) {
        return curr;
    }
    for _ in 2..n {
        let next = &prev + &curr;
        prev = std::mem::replace(&mut curr, next);
    }
    curr
}

/// Stateless apart from a counter of recurrence steps taken.
#[derive(Debug, Default)]
pub struct IterativeSupplier {
    computations: AtomicU64,
}

impl IterativeSupplier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TermSupplier for IterativeSupplier {
    fn term(&self, n: u64) -> SeqResult<Term> {
        if !is_base_case(n) {
            self.computations.fetch_add(n - 2, Ordering::Relaxed);
        }
        Ok(iterative_term(n))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Iterative
    }

    fn stats(&self) -> SupplierStats {
        SupplierStats {
            computations: self.computations.load(Ordering::Relaxed),
            ..SupplierStats::new(Strategy::Iterative)
        }
    }
}
