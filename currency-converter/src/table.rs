//! Rate tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{BASE_CURRENCY, CurrencyCode};

/// A `{code, rate}` pair as delivered by a rate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateEntry {
    #[schema(example = "USD")]
    pub code: String,
    /// Units of this currency per one unit of the base currency
    #[schema(example = 0.0016)]
    pub rate: f64,
}

impl RateEntry {
    pub fn new(code: impl Into<String>, rate: f64) -> Self {
        Self {
            code: code.into(),
            rate,
        }
    }
}

/// Currency code to rate, each rate being "units of this currency per one
/// unit of the base currency".
///
/// Only positive, finite rates are ever stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateTable {
    #[schema(value_type = BTreeMap<String, f64>)]
    rates: BTreeMap<CurrencyCode, f64>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hardcoded table used when the source is unreachable and nothing is cached.
    pub fn fallback() -> Self {
        Self::from_pairs([(BASE_CURRENCY, 1.0), ("USD", 0.0016)])
    }

    /// Builds a table from source rows, dropping rows with an empty code or a
    /// rate that is zero, negative or not finite.
    pub fn from_entries(entries: impl IntoIterator<Item = RateEntry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            let Ok(code) = CurrencyCode::new(&entry.code) else {
                tracing::warn!("Skipping rate row with empty currency code");
                continue;
            };
            if !table.insert(code.clone(), entry.rate) {
                tracing::warn!(currency = %code, rate = entry.rate, "Skipping unusable rate");
            }
        }
        table
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::from_entries(
            pairs
                .into_iter()
                .map(|(code, rate)| RateEntry::new(code, rate)),
        )
    }

    /// Inserts a rate, replacing any previous one. Returns `false` (and stores
    /// nothing) when the rate is unusable.
    pub fn insert(&mut self, code: CurrencyCode, rate: f64) -> bool {
        if !rate.is_finite() || rate <= 0.0 {
            return false;
        }
        self.rates.insert(code, rate);
        true
    }

    pub fn get(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    /// Units of `to` per one unit of `from`.
    pub fn cross_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
        Some(self.get(to)? / self.get(from)?)
    }

    /// Codes in sorted order.
    pub fn codes(&self) -> Vec<CurrencyCode> {
        self.rates.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f64)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn test_unusable_rows_are_dropped() {
        let table = RateTable::from_entries([
            RateEntry::new("SSP", 1.0),
            RateEntry::new("USD", 0.0),
            RateEntry::new("EUR", -2.0),
            RateEntry::new("GBP", f64::NAN),
            RateEntry::new(" ", 3.0),
            RateEntry::new("kes", 0.2),
        ]);

        assert_eq!(table.codes(), vec![code("KES"), code("SSP")]);
    }

    #[test]
    fn test_cross_rate() {
        let table = RateTable::from_pairs([("SSP", 1.0), ("USD", 0.0015), ("KES", 0.2)]);

        let rate = table.cross_rate(&code("KES"), &code("SSP")).unwrap();
        assert!((rate - 5.0).abs() < 1e-9);
        assert!(table.cross_rate(&code("KES"), &code("ZZZ")).is_none());
    }

    #[test]
    fn test_fallback_table() {
        let table = RateTable::fallback();
        assert_eq!(table.get(&CurrencyCode::base()), Some(1.0));
        assert_eq!(table.get(&code("USD")), Some(0.0016));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_later_row_replaces_earlier() {
        let table = RateTable::from_pairs([("USD", 0.001), ("usd", 0.002)]);
        assert_eq!(table.get(&code("USD")), Some(0.002));
    }
}
