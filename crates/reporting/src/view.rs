use common::ledger::{CategoryIcon, TransactionKind};

/// Name and glyph of the category a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryKey<'a> {
    pub name: &'a str,
    pub icon: CategoryIcon,
}

/// One transaction as the engine sees it.
#[derive(Debug, Clone, Copy)]
pub struct LedgerEntry<'a> {
    pub transaction_id: i64,
    pub kind: &'a TransactionKind,
    /// Minor units, never negative.
    pub amount: i64,
    /// `None` when the store could not join the category.
    pub category: Option<CategoryKey<'a>>,
}

/// Anything that carries ledger entries, walked in input order.
///
/// A row of the transaction list yields the single entry it is, with its
/// category embedded. A row of the category list yields every transaction
/// nested under it. Reports take a slice of either and do not care which
/// query produced the data.
pub trait LedgerRecord {
    fn ledger_entries(&self) -> Box<dyn Iterator<Item = LedgerEntry<'_>> + '_>;
}

pub(crate) fn walk<R: LedgerRecord>(records: &[R]) -> impl Iterator<Item = LedgerEntry<'_>> {
    records.iter().flat_map(|record| record.ledger_entries())
}
