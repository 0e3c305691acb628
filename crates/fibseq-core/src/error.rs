use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeqError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("term {index} does not fit in {width}")]
    Overflow { index: u64, width: &'static str },

    #[error("config error: {0}")]
    Config(String),
}

pub type SeqResult<T> = Result<T, SeqError>;
