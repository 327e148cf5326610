use chrono::NaiveDateTime;
use common::ledger::{CategoryIcon, TransactionKind};
use reporting::{CategoryKey, LedgerEntry, LedgerRecord};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon: CategoryIcon,
}

impl Category {
    pub fn key(&self) -> CategoryKey<'_> {
        CategoryKey { name: &self.name, icon: self.icon }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 60, message = "Category name must be between 1 and 60 characters"))]
    pub name: String,
    pub icon: CategoryIcon,
}

#[derive(Deserialize)]
pub struct RawCreateCategoryRequest {
    pub name: String,
    pub icon: String,
}

/// Omitted fields keep their current value.
#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub icon: Option<CategoryIcon>,
}

impl CreateCategoryRequest {
    pub fn new(name: String, icon: &str) -> Result<Self, String> {
        if icon.is_empty() {
            return Err("Please select an icon for the category".to_string());
        }
        let icon = icon.parse::<CategoryIcon>().map_err(|e| e.to_string())?;

        let req = Self {
            name: name.trim().to_string(),
            icon,
        };
        req.validate().map_err(|e| e.to_string())?;
        Ok(req)
    }
}

/// A transaction as listed under its category.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ActivityItem {
    pub id: i64,
    pub kind: TransactionKind,
    pub title: String,
    pub description: String,
    pub amount: i64, // Minor units
    pub occurred_at: NaiveDateTime,
}

/// Category-centric read view: a category with all of its transactions.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CategoryActivity {
    pub category: Category,
    pub transactions: Vec<ActivityItem>,
}

impl LedgerRecord for CategoryActivity {
    fn ledger_entries(&self) -> Box<dyn Iterator<Item = LedgerEntry<'_>> + '_> {
        let key = self.category.key();
        Box::new(self.transactions.iter().map(move |t| LedgerEntry {
            transaction_id: t.id,
            kind: &t.kind,
            amount: t.amount,
            category: Some(key),
        }))
    }
}
