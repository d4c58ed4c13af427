//! # Order Codes
//!
//! Human-readable order references of the form `ORD-YYYYMMDD-NNNN`.
//!
//! ```text
//!   ORD-20231211-0001
//!   ─┬─ ────┬─── ──┬─
//!    │      │      └── per-day sequence, 0001..=9999, zero padded
//!    │      └───────── calendar date the order was created
//!    └──────────────── fixed prefix
//! ```
//!
//! Codes sort lexicographically in creation order within a day and across
//! days. This module only formats and parses; allocating the sequence
//! number is the database's job (see `vitrine-db`'s code sequence repository).

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Fixed prefix of every order code.
pub const ORDER_CODE_PREFIX: &str = "ORD";

/// Largest sequence the 4-digit field can hold.
pub const MAX_DAILY_SEQUENCE: u32 = 9999;

/// A validated order code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderCode {
    date: NaiveDate,
    sequence: u32,
}

impl OrderCode {
    /// Builds the code for the `sequence`-th order on `date`.
    ///
    /// ## Errors
    /// - `CodeSpaceExhausted` when `sequence > 9999`
    /// - `InvalidOrderCode` when `sequence == 0`
    pub fn new(date: NaiveDate, sequence: u32) -> CoreResult<Self> {
        if sequence == 0 {
            return Err(CoreError::InvalidOrderCode {
                code: format!("{}0000", Self::prefix_for(date)),
                reason: "sequence starts at 0001".to_string(),
            });
        }
        if sequence > MAX_DAILY_SEQUENCE {
            return Err(CoreError::CodeSpaceExhausted { date });
        }
        Ok(OrderCode { date, sequence })
    }

    /// Builds a code from a counter value as returned by the database.
    ///
    /// The counter is an i64 column; anything outside `1..=9999` is rejected
    /// the same way as [`OrderCode::new`].
    pub fn from_counter(date: NaiveDate, counter: i64) -> CoreResult<Self> {
        let sequence = u32::try_from(counter).map_err(|_| {
            if counter > 0 {
                CoreError::CodeSpaceExhausted { date }
            } else {
                CoreError::InvalidOrderCode {
                    code: format!("{}{}", Self::prefix_for(date), counter),
                    reason: "sequence must be positive".to_string(),
                }
            }
        })?;
        Self::new(date, sequence)
    }

    /// `ORD-YYYYMMDD-`, the prefix shared by every code on `date`.
    pub fn prefix_for(date: NaiveDate) -> String {
        format!("{}-{}-", ORDER_CODE_PREFIX, Self::day_key(date))
    }

    /// `YYYYMMDD`, the key of the per-day sequence counter.
    pub fn day_key(date: NaiveDate) -> String {
        date.format("%Y%m%d").to_string()
    }

    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[inline]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", Self::prefix_for(self.date), self.sequence)
    }
}

impl FromStr for OrderCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidOrderCode {
            code: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split('-');
        let (prefix, day, seq) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(d), Some(n), None) => (p, d, n),
            _ => return Err(invalid("expected ORD-YYYYMMDD-NNNN")),
        };

        if prefix != ORDER_CODE_PREFIX {
            return Err(invalid("missing ORD prefix"));
        }
        if day.len() != 8 || !day.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("date must be 8 digits"));
        }
        if seq.len() != 4 || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("sequence must be 4 digits"));
        }

        let date = NaiveDate::parse_from_str(day, "%Y%m%d")
            .map_err(|_| invalid("not a calendar date"))?;
        let sequence: u32 = seq.parse().map_err(|_| invalid("sequence is not a number"))?;

        OrderCode::new(date, sequence)
    }
}

impl From<OrderCode> for String {
    fn from(code: OrderCode) -> Self {
        code.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, 11).unwrap()
    }

    #[test]
    fn test_format() {
        assert_eq!(OrderCode::new(day(), 1).unwrap().to_string(), "ORD-20231211-0001");
        assert_eq!(OrderCode::new(day(), 42).unwrap().to_string(), "ORD-20231211-0042");
        assert_eq!(OrderCode::new(day(), 9999).unwrap().to_string(), "ORD-20231211-9999");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(OrderCode::prefix_for(day()), "ORD-20231211-");
        assert_eq!(OrderCode::day_key(day()), "20231211");
    }

    #[test]
    fn test_sequence_bounds() {
        assert!(matches!(
            OrderCode::new(day(), 0),
            Err(CoreError::InvalidOrderCode { .. })
        ));
        assert!(matches!(
            OrderCode::new(day(), 10_000),
            Err(CoreError::CodeSpaceExhausted { .. })
        ));
        assert!(matches!(
            OrderCode::from_counter(day(), 10_000),
            Err(CoreError::CodeSpaceExhausted { .. })
        ));
        assert!(matches!(
            OrderCode::from_counter(day(), -1),
            Err(CoreError::InvalidOrderCode { .. })
        ));
    }

    #[test]
    fn test_parse() {
        let code: OrderCode = "ORD-20231211-0007".parse().unwrap();
        assert_eq!(code.date(), day());
        assert_eq!(code.sequence(), 7);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "ORD-20231211",
            "ORD-20231211-1",
            "ORD-20231211-00001",
            "INV-20231211-0001",
            "ORD-20231311-0001",
            "ORD-2023121a-0001",
            "ORD-20231211-0000",
            "ORD-20231211-0001-x",
        ] {
            assert!(bad.parse::<OrderCode>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_codes_sort_by_creation() {
        let a = OrderCode::new(day(), 9).unwrap().to_string();
        let b = OrderCode::new(day(), 10).unwrap().to_string();
        let c = OrderCode::new(day().succ_opt().unwrap(), 1).unwrap().to_string();
        assert!(a < b);
        assert!(b < c);
    }
}
