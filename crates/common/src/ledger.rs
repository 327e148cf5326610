//! Vocabulary shared by every crate that reads or writes the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown {kind} key: {value}")]
pub struct UnknownKey {
    pub kind: &'static str,
    pub value: String,
}

/// Direction of a money movement.
///
/// Stored as free text, so rows written by other tools can hold anything.
/// Those decode to `Unrecognized` instead of failing the whole query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionKind {
    Income,
    Expense,
    Unrecognized(String),
}

impl TransactionKind {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Unrecognized(raw) => raw,
        }
    }

    /// Strict parse for user input; only the two real kinds are accepted.
    pub fn parse_strict(value: &str) -> Result<Self, UnknownKey> {
        match TransactionKind::from(value.to_string()) {
            TransactionKind::Unrecognized(value) => Err(UnknownKey { kind: "transaction kind", value }),
            kind => Ok(kind),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TransactionKind::Income => "fa-circle-arrow-down",
            TransactionKind::Expense => "fa-circle-arrow-up",
            TransactionKind::Unrecognized(_) => "fa-circle-question",
        }
    }
}

impl From<String> for TransactionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "income" => TransactionKind::Income,
            "expense" => TransactionKind::Expense,
            _ => TransactionKind::Unrecognized(value),
        }
    }
}

impl From<TransactionKind> for String {
    fn from(kind: TransactionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Glyph attached to a category. Resolved to markup by the templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CategoryIcon {
    Entertainment,
    Gaming,
    Courses,
    Work,
    Shopping,
    Cooking,
    Housing,
    Bills,
    Book,
    Bookmark,
    Coding,
    Clothing,
    Healthcare,
    Utility,
    Transport,
    Food,
}

impl CategoryIcon {
    pub const ALL: [CategoryIcon; 16] = [
        CategoryIcon::Entertainment,
        CategoryIcon::Gaming,
        CategoryIcon::Courses,
        CategoryIcon::Work,
        CategoryIcon::Shopping,
        CategoryIcon::Cooking,
        CategoryIcon::Housing,
        CategoryIcon::Bills,
        CategoryIcon::Book,
        CategoryIcon::Bookmark,
        CategoryIcon::Coding,
        CategoryIcon::Clothing,
        CategoryIcon::Healthcare,
        CategoryIcon::Utility,
        CategoryIcon::Transport,
        CategoryIcon::Food,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CategoryIcon::Entertainment => "entertainment",
            CategoryIcon::Gaming => "gaming",
            CategoryIcon::Courses => "courses",
            CategoryIcon::Work => "work",
            CategoryIcon::Shopping => "shopping",
            CategoryIcon::Cooking => "cooking",
            CategoryIcon::Housing => "housing",
            CategoryIcon::Bills => "bills",
            CategoryIcon::Book => "book",
            CategoryIcon::Bookmark => "bookmark",
            CategoryIcon::Coding => "coding",
            CategoryIcon::Clothing => "clothing",
            CategoryIcon::Healthcare => "healthcare",
            CategoryIcon::Utility => "utility",
            CategoryIcon::Transport => "transport",
            CategoryIcon::Food => "food",
        }
    }

    /// Font Awesome 6 class for the glyph.
    pub fn css_class(self) -> &'static str {
        match self {
            CategoryIcon::Entertainment => "fa-film",
            CategoryIcon::Gaming => "fa-gamepad",
            CategoryIcon::Courses => "fa-chalkboard-user",
            CategoryIcon::Work => "fa-briefcase",
            CategoryIcon::Shopping => "fa-cart-shopping",
            CategoryIcon::Cooking => "fa-utensils",
            CategoryIcon::Housing => "fa-house-chimney",
            CategoryIcon::Bills => "fa-lightbulb",
            CategoryIcon::Book => "fa-book-open",
            CategoryIcon::Bookmark => "fa-book-bookmark",
            CategoryIcon::Coding => "fa-laptop-code",
            CategoryIcon::Clothing => "fa-vest",
            CategoryIcon::Healthcare => "fa-heart-circle-check",
            CategoryIcon::Utility => "fa-plug-circle-bolt",
            CategoryIcon::Transport => "fa-car-side",
            CategoryIcon::Food => "fa-bowl-rice",
        }
    }
}

impl FromStr for CategoryIcon {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryIcon::ALL
            .into_iter()
            .find(|icon| icon.key() == s)
            .ok_or_else(|| UnknownKey { kind: "category icon", value: s.to_string() })
    }
}

impl fmt::Display for CategoryIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_stored_text() {
        assert_eq!(TransactionKind::from("income".to_string()), TransactionKind::Income);
        assert_eq!(TransactionKind::from("expense".to_string()), TransactionKind::Expense);
        assert_eq!(
            TransactionKind::from("transfer".to_string()),
            TransactionKind::Unrecognized("transfer".into())
        );
    }

    #[test]
    fn test_kind_strict_parse_rejects_unknown() {
        assert_eq!(TransactionKind::parse_strict("income"), Ok(TransactionKind::Income));
        assert!(TransactionKind::parse_strict("Income").is_err());
        assert!(TransactionKind::parse_strict("").is_err());
    }

    #[test]
    fn test_kind_serde_uses_plain_strings() {
        let json = serde_json::to_string(&TransactionKind::Expense).unwrap();
        assert_eq!(json, "\"expense\"");
        let kind: TransactionKind = serde_json::from_str("\"refund\"").unwrap();
        assert_eq!(kind, TransactionKind::Unrecognized("refund".into()));
    }

    #[test]
    fn test_icon_keys_round_trip() {
        for icon in CategoryIcon::ALL {
            assert_eq!(icon.key().parse::<CategoryIcon>(), Ok(icon));
        }
        assert!("FaFilm".parse::<CategoryIcon>().is_err());
    }

    #[test]
    fn test_icon_serde_matches_key() {
        let json = serde_json::to_string(&CategoryIcon::Healthcare).unwrap();
        assert_eq!(json, format!("\"{}\"", CategoryIcon::Healthcare.key()));
    }
}
