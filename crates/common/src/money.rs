//! Rendering of minor-unit amounts.
//!
//! Aggregates are always summed in minor units at full precision. Rounding to
//! whole major units happens here and only here, so formatting the same
//! aggregate twice always yields the same text.

use numfmt::{Formatter, Precision};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::ledger::UnknownKey;

/// Minor units per major unit.
pub const MINOR_PER_MAJOR: i64 = 100;

/// Display currency chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Currency {
    Euro,
    #[default]
    Dollar,
    Naira,
    Cedi,
    Franc,
    Rupee,
    Peso,
    Pound,
    Yen,
}

impl Currency {
    pub const ALL: [Currency; 9] = [
        Currency::Euro,
        Currency::Dollar,
        Currency::Naira,
        Currency::Cedi,
        Currency::Franc,
        Currency::Rupee,
        Currency::Peso,
        Currency::Pound,
        Currency::Yen,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Currency::Euro => "euro",
            Currency::Dollar => "dollar",
            Currency::Naira => "naira",
            Currency::Cedi => "cedi",
            Currency::Franc => "franc",
            Currency::Rupee => "rupee",
            Currency::Peso => "peso",
            Currency::Pound => "pound",
            Currency::Yen => "yen",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Euro => "€",
            Currency::Dollar => "$",
            Currency::Naira => "₦",
            Currency::Cedi => "₵",
            Currency::Franc => "₣",
            Currency::Rupee => "₹",
            Currency::Peso => "₱",
            Currency::Pound => "£",
            Currency::Yen => "¥",
        }
    }
}

impl FromStr for Currency {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| UnknownKey { kind: "currency", value: s.to_string() })
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Digit grouping convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
    Fr,
    In,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::En, Locale::De, Locale::Fr, Locale::In];

    pub fn key(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
            Locale::Fr => "fr",
            Locale::In => "in",
        }
    }

    /// Whole major units with this locale's digit grouping.
    fn group(self, whole: u64) -> String {
        match self {
            Locale::In => group_lakh(&whole.to_string()),
            Locale::En | Locale::De | Locale::Fr => {
                let grouped = thousands_formatter(self)
                    .map(|f| f.fmt_string(whole as f64))
                    .unwrap_or_else(|| whole.to_string());
                // numfmt only takes single-byte separators
                if self == Locale::Fr {
                    grouped.replace(',', "\u{202f}")
                } else {
                    grouped
                }
            }
        }
    }
}

fn thousands_formatter(locale: Locale) -> Option<&'static Formatter> {
    static COMMA_FMT: OnceLock<Option<Formatter>> = OnceLock::new();
    static DOT_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let (cell, separator) = match locale {
        Locale::De => (&DOT_FMT, '.'),
        _ => (&COMMA_FMT, ','),
    };

    cell.get_or_init(|| {
        Formatter::new()
            .separator(separator)
            .ok()
            .map(|f| f.precision(Precision::Decimals(0)))
    })
    .as_ref()
}

/// Indian grouping: `12,34,567`, one group of three then groups of two.
fn group_lakh(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 2);
    for (i, c) in digits.chars().enumerate() {
        let remaining = len - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl FromStr for Locale {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.key() == s)
            .ok_or_else(|| UnknownKey { kind: "locale", value: s.to_string() })
    }
}

/// Everything the formatter needs, passed explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MoneyFormat {
    pub currency: Currency,
    pub locale: Locale,
}

impl MoneyFormat {
    pub fn new(currency: Currency, locale: Locale) -> Self {
        Self { currency, locale }
    }

    /// `-$1,235` style: sign, symbol, grouped whole units.
    pub fn format(&self, minor_units: i64) -> String {
        let whole = round_to_major(minor_units);
        let sign = if whole < 0 { "-" } else { "" };
        format!("{}{}{}", sign, self.currency.symbol(), self.locale.group(whole.unsigned_abs()))
    }

    /// Same as [`MoneyFormat::format`] without the currency symbol.
    pub fn format_plain(&self, minor_units: i64) -> String {
        let whole = round_to_major(minor_units);
        let sign = if whole < 0 { "-" } else { "" };
        format!("{}{}", sign, self.locale.group(whole.unsigned_abs()))
    }
}

/// Rounds to whole major units, half away from zero.
pub fn round_to_major(minor_units: i64) -> i64 {
    let quotient = minor_units / MINOR_PER_MAJOR;
    let remainder = minor_units % MINOR_PER_MAJOR;
    if remainder >= MINOR_PER_MAJOR / 2 {
        quotient + 1
    } else if remainder <= -MINOR_PER_MAJOR / 2 {
        quotient - 1
    } else {
        quotient
    }
}

/// Converts a user-entered major amount (e.g. `45.5`) to minor units.
///
/// `None` when the result does not fit in an `i64` or the input is not a
/// finite number.
pub fn to_minor_units(major: f64) -> Option<i64> {
    let minor = (major * MINOR_PER_MAJOR as f64).round();
    // i64::MAX as f64 is 2^63, itself out of range
    if minor.is_finite() && minor >= i64::MIN as f64 && minor < i64::MAX as f64 {
        Some(minor as i64)
    } else {
        None
    }
}
