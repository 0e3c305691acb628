use std::ops::RangeInclusive;
use std::sync::OnceLock;

use tracing::{debug, warn};

use fibseq_core::{
    ExplicitSupplier, IterativeSupplier, SeqResult, Strategy, SupplierStats, Term, TermSupplier,
    TransparentSupplier,
};

use crate::config::{load_config, Config};

/// Build the supplier named by `config`.
pub fn build_supplier(config: &Config) -> SeqResult<Box<dyn TermSupplier>> {
    let supplier: Box<dyn TermSupplier> = match config.engine.strategy {
        Strategy::Iterative => Box::new(IterativeSupplier::new()),
        Strategy::Transparent => {
            Box::new(TransparentSupplier::new(config.cache.cache_policy()?)?)
        }
        Strategy::Explicit => Box::new(ExplicitSupplier::new()),
    };
    Ok(supplier)
}

/// Front door to one configured supplier.
pub struct SequenceEngine {
    supplier: Box<dyn TermSupplier>,
}

impl SequenceEngine {
    pub fn new(config: &Config) -> SeqResult<Self> {
        let supplier = build_supplier(config)?;
        debug!(strategy = %supplier.strategy(), "sequence engine ready");
        Ok(Self { supplier })
    }

    pub fn with_supplier(supplier: Box<dyn TermSupplier>) -> Self {
        Self { supplier }
    }

    /// Process-wide engine, built from the on-disk config at first use and
    /// never torn down.
    pub fn global() -> &'static SequenceEngine {
        static ENGINE: OnceLock<SequenceEngine> = OnceLock::new();
        ENGINE.get_or_init(|| Self::from_loaded(load_config()))
    }

    /// Engine for a config load attempt. A config that cannot be read, or
    /// reads but does not validate, yields the default engine.
    fn from_loaded(loaded: anyhow::Result<Config>) -> Self {
        let config = loaded.unwrap_or_else(|e| {
            warn!("config load failed, using defaults: {e:#}");
            Config::default()
        });
        Self::new(&config).unwrap_or_else(|e| {
            warn!("invalid engine config, using defaults: {e}");
            Self::with_supplier(Box::new(TransparentSupplier::default()))
        })
    }

    pub fn compute(&self, n: i64) -> SeqResult<Term> {
        self.supplier.compute(n)
    }

    pub fn term(&self, n: u64) -> SeqResult<Term> {
        self.supplier.term(n)
    }

    pub fn term_u64(&self, n: u64) -> SeqResult<u64> {
        self.supplier.term_u64(n)
    }

    pub fn sequence(&self, range: RangeInclusive<u64>) -> SeqResult<Vec<Term>> {
        self.supplier.sequence(range)
    }

    pub fn strategy(&self) -> Strategy {
        self.supplier.strategy()
    }

    pub fn stats(&self) -> SupplierStats {
        self.supplier.stats()
    }
}
