use std::fmt;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::error::{SeqError, SeqResult};

/// A single value of the sequence. Grows without bound, so it is never a
/// fixed-width integer.
pub type Term = BigUint;

/// Value of every base-case term.
pub const BASE_TERM: u64 = 1;

/// Largest index whose term still fits in a `u64`.
///
/// Indices 0, 1 and 2 all map to 1, and from there the sequence tracks the
/// textbook one, so term 93 is 12200160415121876738 and term 94 overflows.
pub const U64_MAX_INDEX: u64 = 93;

/// Indices 0, 1 and 2 short-circuit to [`BASE_TERM`].
pub fn is_base_case(n: u64) -> bool {
    n <= 2
}

pub fn base_term() -> Term {
    BigUint::from(BASE_TERM)
}

/// Narrow a term to `u64`, reporting the index that overflowed.
pub fn to_u64(index: u64, term: &Term) -> SeqResult<u64> {
    term.to_u64().ok_or(SeqError::Overflow {
        index,
        width: "u64",
    })
}

/// A validated, non-negative sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(u64);

impl Index {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for Index {
    type Error = SeqError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        u64::try_from(n)
            .map(Self)
            .map_err(|_| SeqError::InvalidInput(format!("negative index: {n}")))
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Index {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u64>() {
            return Ok(Self(n));
        }
        if let Ok(n) = s.parse::<i64>() {
            return Self::try_from(n);
        }
        if s.parse::<f64>().is_ok() {
            return Err(SeqError::InvalidInput(format!("non-integral index: {s}")));
        }
        Err(SeqError::InvalidInput(format!("not an index: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_cases() {
        assert!(is_base_case(0));
        assert!(is_base_case(1));
        assert!(is_base_case(2));
        assert!(!is_base_case(3));
        assert_eq!(base_term(), BigUint::from(1u32));
    }

    #[test]
    fn test_index_from_i64() {
        assert_eq!(Index::try_from(0i64).unwrap().get(), 0);
        assert_eq!(Index::try_from(49i64).unwrap().get(), 49);
        assert!(matches!(
            Index::try_from(-1i64),
            Err(SeqError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_index_from_str() {
        assert_eq!("30".parse::<Index>().unwrap().get(), 30);
        assert_eq!(" 7 ".parse::<Index>().unwrap().get(), 7);
        for bad in ["-1", "2.5", "abc", "", "1e3"] {
            let err = bad.parse::<Index>().unwrap_err();
            assert!(matches!(err, SeqError::InvalidInput(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn test_non_integral_message() {
        let err = "2.5".parse::<Index>().unwrap_err();
        assert_eq!(err.to_string(), "invalid input: non-integral index: 2.5");
    }

    #[test]
    fn test_to_u64_boundary() {
        let fits = BigUint::from(u64::MAX);
        assert_eq!(to_u64(93, &fits).unwrap(), u64::MAX);

        let too_big = BigUint::from(u64::MAX) + 1u32;
        let err = to_u64(94, &too_big).unwrap_err();
        assert!(matches!(err, SeqError::Overflow { index: 94, .. }));
    }
}
