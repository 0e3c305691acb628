pub mod error;
pub mod explicit;
pub mod iterative;
pub mod supplier;
pub mod term;
pub mod transparent;

pub use error::{SeqError, SeqResult};
pub use explicit::{explicit_term, ExplicitSupplier, Memo};
pub use iterative::{iterative_term, IterativeSupplier};
pub use supplier::{Strategy, SupplierStats, TermSupplier};
pub use term::{Index, Term, BASE_TERM, U64_MAX_INDEX};
pub use transparent::{CachePolicy, TransparentSupplier, DEFAULT_CACHE_CAPACITY};
