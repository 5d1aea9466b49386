//! Increment arithmetic.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("value overflows int64: {0} + 1")]
    Overflow(i64),
}

/// Return `val + 1`, rejecting `i64::MAX` instead of wrapping.
pub fn increment(val: i64) -> Result<i64, CalcError> {
    val.checked_add(1).ok_or(CalcError::Overflow(val))
}

impl From<CalcError> for tonic::Status {
    fn from(err: CalcError) -> Self {
        match err {
            CalcError::Overflow(_) => tonic::Status::out_of_range(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment() {
        assert_eq!(increment(5), Ok(6));
        assert_eq!(increment(0), Ok(1));
        assert_eq!(increment(-1), Ok(0));
    }

    #[test]
    fn test_increment_range_edges() {
        assert_eq!(increment(i64::MIN), Ok(i64::MIN + 1));
        assert_eq!(increment(i64::MAX - 1), Ok(i64::MAX));
    }

    #[test]
    fn test_increment_rejects_max() {
        assert_eq!(increment(i64::MAX), Err(CalcError::Overflow(i64::MAX)));
    }

    #[test]
    fn test_overflow_maps_to_out_of_range() {
        let status: tonic::Status = CalcError::Overflow(i64::MAX).into();
        assert_eq!(status.code(), tonic::Code::OutOfRange);
        assert!(status.message().contains("overflows int64"));
    }

    #[test]
    fn test_increment_sampled_range() {
        let mut v = i64::MIN;
        let step = i64::MAX / 997;
        while let Some(next) = v.checked_add(step) {
            assert_eq!(increment(v).unwrap() - v, 1);
            v = next;
        }
    }
}
