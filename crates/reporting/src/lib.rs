//! Pure reporting over an already-fetched ledger snapshot.
//!
//! Nothing here does I/O. Every call recomputes from its input, so callers
//! simply re-run it whenever the data changes.

pub mod aggregator;
pub mod classifier;
pub mod view;

pub use aggregator::{aggregate, series_over, top_n, CategoryTotal, ChartSeries, DEFAULT_TOP_N};
pub use classifier::{classify, Totals};
pub use view::{CategoryKey, LedgerEntry, LedgerRecord};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("transaction {transaction_id} references a category that could not be resolved")]
    UnresolvedCategory { transaction_id: i64 },
    #[error("total overflows at transaction {transaction_id}")]
    AmountOverflow { transaction_id: i64 },
}
