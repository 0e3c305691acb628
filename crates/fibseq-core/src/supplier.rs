use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{SeqError, SeqResult};
use crate::term::{self, Index, Term};

/// Which way a supplier evaluates the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single forward pass over a two-term window.
    Iterative,
    /// Memoized, with the cache hidden inside the supplier.
    #[default]
    Transparent,
    /// Memoized, with a caller-visible cache.
    Explicit,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Self::Iterative, Self::Transparent, Self::Explicit];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iterative => write!(f, "iterative"),
            Self::Transparent => write!(f, "transparent"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "iterative" => Ok(Self::Iterative),
            "transparent" => Ok(Self::Transparent),
            "explicit" => Ok(Self::Explicit),
            _ => Err(SeqError::Config(format!("invalid strategy: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierStats {
    pub strategy: Strategy,
    /// Evaluations of the recurrence for non-base indices.
    pub computations: u64,
    /// Requests answered straight from the cache.
    pub cache_hits: u64,
    pub cached_terms: usize,
}

impl SupplierStats {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            computations: 0,
            cache_hits: 0,
            cached_terms: 0,
        }
    }
}

pub trait TermSupplier: Send + Sync {
    /// The n-th term. Indices 0, 1 and 2 are all 1.
    fn term(&self, n: u64) -> SeqResult<Term>;
    fn strategy(&self) -> Strategy;
    fn stats(&self) -> SupplierStats;

    /// Signed entry point; negative indices are rejected before any work.
    fn compute(&self, n: i64) -> SeqResult<Term> {
        let index = Index::try_from(n)?;
        self.term(index.get())
    }

    fn term_u64(&self, n: u64) -> SeqResult<u64> {
        if n > term::U64_MAX_INDEX {
            return Err(SeqError::Overflow {
                index: n,
                width: "u64",
            });
        }
        let value = self.term(n)?;
        term::to_u64(n, &value)
    }

    fn sequence(&self, range: RangeInclusive<u64>) -> SeqResult<Vec<Term>> {
        range.map(|n| self.term(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_roundtrip_str() {
        for strategy in Strategy::ALL {
            let parsed: Strategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
        assert_eq!("EXPLICIT".parse::<Strategy>().unwrap(), Strategy::Explicit);
        assert!(matches!(
            "lru".parse::<Strategy>(),
            Err(SeqError::Config(_))
        ));
    }

    #[test]
    fn test_default_strategy() {
        assert_eq!(Strategy::default(), Strategy::Transparent);
    }

    #[test]
    fn test_stats_new() {
        let stats = SupplierStats::new(Strategy::Explicit);
        assert_eq!(stats.computations, 0);
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.cached_terms, 0);
    }
}
