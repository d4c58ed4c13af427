//! # Order Code Backfill
//!
//! Out-of-band repair for orders stored before codes existed.
//!
//! ```text
//!   find_missing_codes()          oldest first
//!        │
//!        ▼
//!   day = created_at (UTC date)
//!        │
//!        ▼
//!   sync_code_counter(day)        once per day, skip past stored codes
//!        │
//!        ▼
//!   code_sequences.next(day)  ──► OrderCode::from_counter(day, seq)
//!        │
//!        ▼
//!   assign_code(id, code)
//!        ├── ok                       next order
//!        └── UNIQUE(code) violation   code already taken, draw again
//! ```
//!
//! Sequences come from the same per-day counter that live order creation
//! uses, so a repaired code can never collide with a future one.
//! Databases imported from elsewhere carry codes but no counter rows, so each
//! day's counter is first moved past the highest code already stored.

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};
use vitrine_core::{CoreError, OrderCode};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Moves the counter for `date` past every well-formed code already stored
/// for that day and returns the counter's value afterwards.
///
/// Codes that do not parse are ignored; they cannot collide with a drawn one.
pub async fn sync_code_counter(db: &Database, date: NaiveDate) -> DbResult<i64> {
    let day = OrderCode::day_key(date);
    let highest = db
        .orders()
        .codes_with_prefix(&OrderCode::prefix_for(date))
        .await?
        .iter()
        .filter_map(|code| code.parse::<OrderCode>().ok())
        .map(|code| i64::from(code.sequence()))
        .max()
        .unwrap_or(0);

    let sequences = db.code_sequences();
    if highest > 0 {
        sequences.advance_to(&day, highest).await?;
    }
    let current = sequences.current(&day).await?;
    debug!(day = %day, highest, current, "Synced order code counter");
    Ok(current)
}

/// Errors that stop a backfill run.
#[derive(Debug, Error)]
pub enum BackfillError {
    #[error(transparent)]
    Database(#[from] DbError),

    /// Sequence space exhausted for a day, or counter corrupted.
    #[error(transparent)]
    Code(#[from] CoreError),

    #[error("Gave up on order {order_id} after {attempts} colliding codes")]
    TooManyCollisions { order_id: String, attempts: u32 },
}

/// What a backfill run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    /// `(order_id, code)` pairs written, in processing order.
    pub assigned: Vec<(String, String)>,
    /// Orders that gained a code concurrently and were left alone.
    pub skipped: usize,
}

/// Assigns a code to every order that has none.
///
/// `max_attempts` bounds the retries per order when a drawn code turns out
/// to be taken already.
pub async fn backfill_missing_codes(
    db: &Database,
    max_attempts: u32,
) -> Result<BackfillReport, BackfillError> {
    let orders = db.orders();
    let sequences = db.code_sequences();
    let mut report = BackfillReport::default();
    let mut synced = HashSet::new();

    let missing = orders.find_missing_codes().await?;
    info!(count = missing.len(), "Backfilling order codes");

    for order in missing {
        let date = order.created_at.date_naive();
        let day = OrderCode::day_key(date);
        if synced.insert(date) {
            sync_code_counter(db, date).await?;
        }
        let mut attempt = 0;

        loop {
            attempt += 1;
            let seq = sequences.next(&day).await?;
            let code = OrderCode::from_counter(date, seq)?.to_string();

            match orders.assign_code(&order.id, &code).await {
                Ok(true) => {
                    info!(order_id = %order.id, code = %code, "Assigned order code");
                    report.assigned.push((order.id.clone(), code));
                    break;
                }
                Ok(false) => {
                    warn!(order_id = %order.id, "Order gained a code meanwhile, skipping");
                    report.skipped += 1;
                    break;
                }
                Err(e) if e.is_unique_violation_on("orders.code") => {
                    warn!(order_id = %order.id, code = %code, attempt, "Code already taken");
                    if attempt >= max_attempts {
                        return Err(BackfillError::TooManyCollisions {
                            order_id: order.id.clone(),
                            attempts: attempt,
                        });
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(report)
}
