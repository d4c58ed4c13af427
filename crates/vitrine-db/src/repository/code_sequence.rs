//! # Order Code Sequence Repository
//!
//! One row per calendar day holding the last sequence number handed out.
//!
//! ```text
//!   order_code_sequences
//!   ┌──────────┬──────────┐
//!   │ day      │ last_seq │
//!   ├──────────┼──────────┤
//!   │ 20231211 │        3 │   ORD-20231211-0001 .. 0003 issued
//!   │ 20231212 │        1 │   ORD-20231212-0001 issued
//!   └──────────┴──────────┘
//! ```
//!
//! `next` is a single upsert statement, so two concurrent callers can never
//! receive the same number. A number is consumed even if the order insert
//! that wanted it later fails; the UNIQUE(code) constraint remains the
//! backstop for codes written by other means.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct CodeSequenceRepository {
    pool: SqlitePool,
}

impl CodeSequenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CodeSequenceRepository { pool }
    }

    /// Atomically increments the counter for `day` (`YYYYMMDD`) and returns
    /// the new value. The first call for a day returns 1.
    ///
    /// The value is not capped here; turning an out-of-range value into
    /// `CodeSpaceExhausted` is `OrderCode::from_counter`'s job.
    pub async fn next(&self, day: &str) -> DbResult<i64> {
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO order_code_sequences (day, last_seq)
            VALUES (?1, 1)
            ON CONFLICT(day) DO UPDATE SET last_seq = last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        debug!(day = %day, seq = seq, "Allocated order code sequence");
        Ok(seq)
    }

    /// Last value handed out for `day`, or 0 if none.
    pub async fn current(&self, day: &str) -> DbResult<i64> {
        let seq: Option<i64> =
            sqlx::query_scalar("SELECT last_seq FROM order_code_sequences WHERE day = ?1")
                .bind(day)
                .fetch_optional(&self.pool)
                .await?;

        Ok(seq.unwrap_or(0))
    }

    /// Moves the counter for `day` forward to at least `seq`.
    ///
    /// Never moves it backwards. Used by repair tooling after codes were
    /// written without going through [`CodeSequenceRepository::next`].
    pub async fn advance_to(&self, day: &str, seq: i64) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_code_sequences (day, last_seq)
            VALUES (?1, ?2)
            ON CONFLICT(day) DO UPDATE SET last_seq = MAX(last_seq, excluded.last_seq)
            "#,
        )
        .bind(day)
        .bind(seq)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_sequence_starts_at_one_and_increments() {
        let db = test_support::db().await;
        let seqs = db.code_sequences();

        assert_eq!(seqs.current("20231211").await.unwrap(), 0);
        assert_eq!(seqs.next("20231211").await.unwrap(), 1);
        assert_eq!(seqs.next("20231211").await.unwrap(), 2);
        assert_eq!(seqs.next("20231211").await.unwrap(), 3);
        assert_eq!(seqs.current("20231211").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_days_are_independent() {
        let db = test_support::db().await;
        let seqs = db.code_sequences();

        seqs.next("20231211").await.unwrap();
        seqs.next("20231211").await.unwrap();
        assert_eq!(seqs.next("20231212").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_advance_never_moves_backwards() {
        let db = test_support::db().await;
        let seqs = db.code_sequences();

        seqs.advance_to("20231211", 5).await.unwrap();
        assert_eq!(seqs.current("20231211").await.unwrap(), 5);

        seqs.advance_to("20231211", 2).await.unwrap();
        assert_eq!(seqs.current("20231211").await.unwrap(), 5);
        assert_eq!(seqs.next("20231211").await.unwrap(), 6);
    }
}
