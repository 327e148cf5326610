use common::money::{Currency, Locale, MoneyFormat};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub currency: Currency,
    pub locale: Locale,
}

impl Profile {
    pub fn money_format(&self) -> MoneyFormat {
        MoneyFormat::new(self.currency, self.locale)
    }
}

#[derive(Deserialize)]
pub struct RawUpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub currency: String,
    pub locale: Option<String>,
}

#[derive(Debug, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 80, message = "Name must be between 1 and 80 characters"))]
    name: String,
    #[validate(email(message = "Email address is invalid"))]
    email: String,
    currency: Currency,
    locale: Locale,
}

impl UpdateProfileRequest {
    pub fn new(name: String, email: String, currency: &str, locale: Option<&str>) -> Result<Self, String> {
        let currency = currency.parse::<Currency>().map_err(|e| e.to_string())?;
        let locale = match locale {
            Some(l) if !l.is_empty() => l.parse::<Locale>().map_err(|e| e.to_string())?,
            _ => Locale::default(),
        };

        let req = Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            currency,
            locale,
        };
        req.validate().map_err(|e| e.to_string())?;
        Ok(req)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}
