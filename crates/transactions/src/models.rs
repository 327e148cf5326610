use categories::models::Category;
use chrono::{NaiveDate, NaiveDateTime};
use common::ledger::TransactionKind;
use common::money::to_minor_units;
use reporting::{LedgerEntry, LedgerRecord};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A transaction with its category joined in.
///
/// `category` is `None` when the stored category id does not resolve.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: i64,
    pub kind: TransactionKind,
    pub title: String,
    pub description: String,
    pub amount: i64, // Minor units, never negative
    pub occurred_at: NaiveDateTime,
    pub category: Option<Category>,
}

impl LedgerRecord for Transaction {
    fn ledger_entries(&self) -> Box<dyn Iterator<Item = LedgerEntry<'_>> + '_> {
        Box::new(std::iter::once(LedgerEntry {
            transaction_id: self.id,
            kind: &self.kind,
            amount: self.amount,
            category: self.category.as_ref().map(Category::key),
        }))
    }
}

#[derive(Debug, Validate)]
pub struct CreateTransactionRequest {
    kind: TransactionKind,
    #[validate(length(min = 1, max = 120, message = "Title must be between 1 and 120 characters"))]
    title: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    description: String,
    #[validate(range(min = 0i64, max = 100_000_000_000i64, message = "Amount must be between 0 and 1,000,000,000"))]
    amount: i64,
    occurred_at: NaiveDateTime,
    #[validate(range(min = 1, message = "Please select a category"))]
    category_id: i64,
}

/// Form and JSON body for creating or replacing a transaction.
#[derive(Debug, Deserialize)]
pub struct RawCreateTransactionRequest {
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub amount: f64, // Major units
    pub occurred_at: String,
    pub category_id: i64,
}

impl CreateTransactionRequest {
    pub fn new(raw: RawCreateTransactionRequest) -> Result<Self, String> {
        let kind = TransactionKind::parse_strict(raw.kind.trim()).map_err(|e| e.to_string())?;

        if !raw.amount.is_finite() {
            return Err("Amount must be a number".to_string());
        }
        let amount = to_minor_units(raw.amount).ok_or_else(|| "Amount is too large".to_string())?;

        let occurred_at = parse_occurred_at(raw.occurred_at.trim())
            .ok_or_else(|| "Invalid date, expected YYYY-MM-DDTHH:MM".to_string())?;

        let req = Self {
            kind,
            title: raw.title.trim().to_string(),
            description: raw.description.unwrap_or_default().trim().to_string(),
            amount,
            occurred_at,
            category_id: raw.category_id,
        };
        req.validate().map_err(|e| e.to_string())?;
        Ok(req)
    }

    pub fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn occurred_at(&self) -> NaiveDateTime {
        self.occurred_at
    }

    pub fn category_id(&self) -> i64 {
        self.category_id
    }
}

/// Accepts what a `datetime-local` input sends as well as the stored format.
/// A bare date means midnight.
fn parse_occurred_at(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Title,
    #[default]
    Date,
    Amount,
    Category,
}

impl SortField {
    pub const ALL: [SortField; 4] = [SortField::Title, SortField::Date, SortField::Amount, SortField::Category];

    pub fn key(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Date => "date",
            SortField::Amount => "amount",
            SortField::Category => "category",
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            SortField::Title => "t.title",
            SortField::Date => "t.occurred_at",
            SortField::Amount => "t.amount",
            SortField::Category => "c.name",
        }
    }
}

/// Query string of the list page. Missing values fall back to newest first.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub order: Option<SortField>,
    pub ascending: Option<bool>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub search: String,
    pub order: SortField,
    pub ascending: bool,
    pub offset: u32,
    pub length: u32,
}

impl ListQuery {
    pub fn into_params(self, length: u32) -> ListParams {
        ListParams {
            search: self.q.unwrap_or_default().trim().to_string(),
            order: self.order.unwrap_or_default(),
            ascending: self.ascending.unwrap_or(false),
            offset: self.offset.unwrap_or(0),
            length: length.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub offset: u32,
    pub length: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_offset: u32,
    pub next_offset: u32,
}

impl PageMeta {
    pub fn new(total: i64, offset: u32, length: u32) -> Self {
        let end = i64::from(offset) + i64::from(length);
        Self {
            total,
            offset,
            length,
            has_previous: offset > 0,
            has_next: end < total,
            previous_offset: offset.saturating_sub(length),
            next_offset: offset.saturating_add(length),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub meta: PageMeta,
}
