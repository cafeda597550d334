//! Monetary amount with a validated ISO 4217-style currency code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

/// A 3-letter currency code ("USD", "BRL", ...), stored uppercase.
///
/// Unlike a closed enum, any 3-letter code is accepted: the gateway is the
/// authority on which currencies it actually settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency([u8; 3]);

impl Currency {
    /// Parses and normalizes a currency code.
    ///
    /// Fails unless the code is exactly 3 ASCII letters.
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Invariant: `new` only admits ASCII letters.
        std::str::from_utf8(&self.0).expect("currency code is ASCII")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Currency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Currency::new(&code).map_err(serde::de::Error::custom)
    }
}

impl utoipa::PartialSchema for Currency {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        use utoipa::openapi::schema::{ObjectBuilder, Type};
        ObjectBuilder::new()
            .schema_type(Type::String)
            .description(Some("3-letter currency code"))
            .examples(["USD"])
            .into()
    }
}

impl ToSchema for Currency {}

/// A strictly positive payment amount in the smallest currency unit
/// (cents, centavos, ...), with two implied fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value. Amounts of zero or less are rejected.
    pub fn new(minor: i64, currency: Currency) -> Result<Self, DomainError> {
        if minor <= 0 {
            return Err(DomainError::NonPositiveAmount);
        }
        Ok(Self { minor, currency })
    }

    /// Returns the amount in the smallest currency unit.
    pub fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.minor / 100,
            (self.minor % 100).abs(),
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_normalizes_to_uppercase() {
        let c = Currency::new("usd").unwrap();
        assert_eq!(c.as_str(), "USD");
    }

    #[test]
    fn test_currency_rejects_wrong_length() {
        assert!(matches!(
            Currency::new("US"),
            Err(DomainError::InvalidCurrency(_))
        ));
        assert!(matches!(
            Currency::new("USDT"),
            Err(DomainError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_currency_rejects_non_letters() {
        assert!(matches!(
            Currency::new("U5D"),
            Err(DomainError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_money_creation() {
        let money = Money::new(1000, Currency::new("USD").unwrap()).unwrap();
        assert_eq!(money.minor(), 1000);
        assert_eq!(money.currency().as_str(), "USD");
    }

    #[test]
    fn test_zero_and_negative_amounts_fail() {
        let usd = Currency::new("USD").unwrap();
        assert!(matches!(
            Money::new(0, usd),
            Err(DomainError::NonPositiveAmount)
        ));
        assert!(matches!(
            Money::new(-500, usd),
            Err(DomainError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(1050, Currency::new("USD").unwrap()).unwrap();
        assert_eq!(format!("{}", money), "10.50 USD");
    }

    #[test]
    fn test_currency_serde_round_trip() {
        let c = Currency::new("BRL").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"BRL\"");
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
