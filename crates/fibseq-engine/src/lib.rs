pub mod config;
pub mod engine;

pub use config::{
    load_config, load_config_from, show_config_path, CacheConfig, Config, EngineConfig,
};
pub use engine::{build_supplier, SequenceEngine};
pub use fibseq_core::{SeqError, SeqResult, Strategy, SupplierStats, Term, TermSupplier};
