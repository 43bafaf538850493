//! Currency identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ConvertError;

/// The currency every rate is expressed against. Its own rate is always 1.
pub const BASE_CURRENCY: &str = "SSP";

/// Currency shown to shoppers until they pick another one.
pub const DEFAULT_DISPLAY_CURRENCY: &str = "KES";

/// A short currency identifier such as `USD`, `SSP` or `KES`.
///
/// Codes are trimmed and upper-cased on construction. Beyond being non-empty
/// there is no validation: a code is "supported" only if the current rate
/// table has an entry for it.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "SSP")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, ConvertError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(ConvertError::EmptyCode);
        }
        Ok(Self(code.to_uppercase()))
    }

    /// The base currency code.
    pub fn base() -> Self {
        Self(BASE_CURRENCY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self(DEFAULT_DISPLAY_CURRENCY.to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_normalized() {
        let code = CurrencyCode::new("  usd ").unwrap();
        assert_eq!(code.as_str(), "USD");
        assert_eq!(code, "Usd".parse().unwrap());
    }

    #[test]
    fn test_empty_code_rejected() {
        assert!(matches!(CurrencyCode::new("   "), Err(ConvertError::EmptyCode)));
        assert!("".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_base_and_default() {
        assert!(CurrencyCode::base().is_base());
        assert_eq!(CurrencyCode::default().as_str(), "KES");
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let code: CurrencyCode = serde_json::from_str("\"kes\"").unwrap();
        assert_eq!(code.as_str(), "KES");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"KES\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"\"").is_err());
    }
}
