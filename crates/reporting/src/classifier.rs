use common::ledger::TransactionKind;
use serde::Serialize;

use crate::view::{walk, LedgerRecord};
use crate::ReportError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total_income: i64,
    pub total_expense: i64,
}

impl Totals {
    /// Income minus expense; negative when spending exceeds income.
    /// Saturates at the `i64` bounds.
    pub fn net(&self) -> i64 {
        self.total_income.saturating_sub(self.total_expense)
    }
}

/// Sums income and expense amounts.
///
/// Entries whose kind is neither income nor expense count towards neither
/// total. Categories are not looked at, so an unresolved category does not
/// stop the balance from being shown.
pub fn classify<R: LedgerRecord>(records: &[R]) -> Result<Totals, ReportError> {
    walk(records).try_fold(Totals::default(), |mut totals, entry| {
        let total = match entry.kind {
            TransactionKind::Income => &mut totals.total_income,
            TransactionKind::Expense => &mut totals.total_expense,
            TransactionKind::Unrecognized(_) => return Ok(totals),
        };
        *total = total
            .checked_add(entry.amount)
            .ok_or(ReportError::AmountOverflow { transaction_id: entry.transaction_id })?;
        Ok(totals)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::fixtures::{expense, income, sample_expenses, Row};
    use common::ledger::CategoryIcon;

    #[test]
    fn test_empty_is_zero() {
        let rows: Vec<Row> = Vec::new();
        let totals = classify(&rows).unwrap();
        assert_eq!(totals, Totals { total_income: 0, total_expense: 0 });
        assert_eq!(totals.net(), 0);
    }

    #[test]
    fn test_sample_expenses() {
        let totals = classify(&sample_expenses()).unwrap();
        assert_eq!(totals, Totals { total_income: 0, total_expense: 7400 });
        assert_eq!(totals.net(), -7400);
    }

    #[test]
    fn test_mixed_kinds_and_net() {
        let rows = vec![
            income(1, "Salary", CategoryIcon::Work, 500_000),
            expense(2, "Food", CategoryIcon::Food, 12_345),
            income(3, "Freelance", CategoryIcon::Coding, 55),
            expense(4, "Bills", CategoryIcon::Bills, 80_000),
        ];
        let totals = classify(&rows).unwrap();
        assert_eq!(totals.total_income, 500_055);
        assert_eq!(totals.total_expense, 92_345);
        assert_eq!(totals.net(), 407_710);
    }

    #[test]
    fn test_unrecognized_kind_is_skipped() {
        let mut odd = expense(2, "Food", CategoryIcon::Food, 9_999);
        odd.kind = TransactionKind::Unrecognized("transfer".into());
        let rows = vec![income(1, "Salary", CategoryIcon::Work, 100), odd];
        assert_eq!(classify(&rows).unwrap(), Totals { total_income: 100, total_expense: 0 });
    }

    #[test]
    fn test_unresolved_category_still_classified() {
        let mut orphan = expense(1, "Food", CategoryIcon::Food, 300);
        orphan.category = None;
        assert_eq!(classify(&vec![orphan]).unwrap().total_expense, 300);
    }

    #[test]
    fn test_order_does_not_matter() {
        let mut rows = vec![
            income(1, "Salary", CategoryIcon::Work, 7),
            expense(2, "Food", CategoryIcon::Food, 11),
            income(3, "Gift", CategoryIcon::Shopping, 13),
            expense(4, "Rent", CategoryIcon::Housing, 17),
        ];
        let forward = classify(&rows).unwrap();
        rows.reverse();
        assert_eq!(classify(&rows).unwrap(), forward);
        rows.swap(0, 2);
        assert_eq!(classify(&rows).unwrap(), forward);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let rows = vec![
            income(1, "Salary", CategoryIcon::Work, i64::MAX - 10),
            expense(2, "Food", CategoryIcon::Food, i64::MAX),
            income(3, "Gift", CategoryIcon::Shopping, 11),
        ];
        assert_eq!(classify(&rows), Err(ReportError::AmountOverflow { transaction_id: 3 }));
    }

    #[test]
    fn test_totals_at_the_limit() {
        let rows = vec![
            income(1, "Salary", CategoryIcon::Work, i64::MAX - 10),
            income(2, "Gift", CategoryIcon::Shopping, 10),
        ];
        let totals = classify(&rows).unwrap();
        assert_eq!(totals.total_income, i64::MAX);
        assert_eq!(totals.net(), i64::MAX);

        let deficit = Totals { total_income: 0, total_expense: i64::MAX };
        assert_eq!(deficit.net(), -i64::MAX);
    }
}
