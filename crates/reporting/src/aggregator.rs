use common::ledger::CategoryIcon;
use serde::Serialize;
use std::collections::HashMap;

use crate::view::{walk, CategoryKey, LedgerRecord};
use crate::ReportError;

/// How many categories the dashboard ranks.
pub const DEFAULT_TOP_N: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    /// Taken from the first transaction seen for this category.
    pub icon: CategoryIcon,
    /// Minor units.
    pub total: i64,
}

/// Chart-ready labels and values, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

impl ChartSeries {
    pub fn from_totals(totals: &[CategoryTotal]) -> Self {
        Self {
            labels: totals.iter().map(|t| t.name.clone()).collect(),
            values: totals.iter().map(|t| t.total).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_value(&self) -> i64 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

/// Sums amounts per category name, largest total first.
///
/// Every entry counts regardless of kind. Equal totals keep the order in
/// which their categories first appeared in the input.
pub fn aggregate<R: LedgerRecord>(records: &[R]) -> Result<Vec<CategoryTotal>, ReportError> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for entry in walk(records) {
        let category = resolve(entry.transaction_id, entry.category)?;
        match positions.get(category.name) {
            Some(&i) => totals[i].total = add(totals[i].total, entry.amount, entry.transaction_id)?,
            None => {
                positions.insert(category.name, totals.len());
                totals.push(CategoryTotal {
                    name: category.name.to_string(),
                    icon: category.icon,
                    total: entry.amount,
                });
            }
        }
    }

    // sort_by is stable, so ties stay in first-appearance order
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    Ok(totals)
}

/// The `n` largest categories, or all of them when there are fewer.
pub fn top_n<R: LedgerRecord>(records: &[R], n: usize) -> Result<Vec<CategoryTotal>, ReportError> {
    let mut totals = aggregate(records)?;
    totals.truncate(n);
    Ok(totals)
}

/// Totals keyed over an explicit category list, in that list's order.
///
/// Categories without transactions report zero. Transactions in categories
/// outside the list are ignored. If the list names a category twice, the
/// first occurrence receives the amounts and the second stays at zero.
pub fn series_over<R: LedgerRecord>(
    categories: &[CategoryKey<'_>],
    records: &[R],
) -> Result<ChartSeries, ReportError> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(categories.len());
    for (i, category) in categories.iter().enumerate() {
        positions.entry(category.name).or_insert(i);
    }

    let mut values = vec![0; categories.len()];
    for entry in walk(records) {
        let category = resolve(entry.transaction_id, entry.category)?;
        if let Some(&i) = positions.get(category.name) {
            values[i] = add(values[i], entry.amount, entry.transaction_id)?;
        }
    }

    Ok(ChartSeries {
        labels: categories.iter().map(|c| c.name.to_string()).collect(),
        values,
    })
}

fn add(total: i64, amount: i64, transaction_id: i64) -> Result<i64, ReportError> {
    total.checked_add(amount).ok_or(ReportError::AmountOverflow { transaction_id })
}

fn resolve(transaction_id: i64, category: Option<CategoryKey<'_>>) -> Result<CategoryKey<'_>, ReportError> {
    category.ok_or(ReportError::UnresolvedCategory { transaction_id })
}
