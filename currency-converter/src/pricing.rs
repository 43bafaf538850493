//! Product and cart pricing in the shopper's currency.
//!
//! Cart totals convert every line's unit price on its own and only then sum,
//! so each line matches the price displayed next to it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{CurrencyCode, CurrencyService};

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricedItem {
    /// Unit price in `currency`
    #[schema(example = 15000.0)]
    pub price: f64,
    /// Listing currency; the base currency when absent
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    #[serde(default = "default_quantity")]
    #[schema(example = 2)]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl PricedItem {
    pub fn new(price: f64, currency: CurrencyCode, quantity: u32) -> Self {
        Self {
            price,
            currency: Some(currency),
            quantity,
        }
    }
}

/// One converted cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

/// Converted cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartTotal {
    pub currency: CurrencyCode,
    pub lines: Vec<CartLine>,
    pub total: f64,
}

impl CurrencyService {
    /// Converts a listing price. A listing without a currency is priced in the
    /// base currency.
    pub async fn convert_price(
        &self,
        price: f64,
        currency: Option<&CurrencyCode>,
        target: &CurrencyCode,
    ) -> f64 {
        match currency {
            Some(from) => self.convert(price, from, target).await,
            None => self.convert(price, &CurrencyCode::base(), target).await,
        }
    }

    /// Converts each line's unit price into `target`, then sums the lines.
    #[tracing::instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn cart_total(&self, items: &[PricedItem], target: &CurrencyCode) -> CartTotal {
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let unit_price = self
                .convert_price(item.price, item.currency.as_ref(), target)
                .await;
            lines.push(CartLine {
                unit_price,
                quantity: item.quantity,
                line_total: unit_price * f64::from(item.quantity),
            });
        }

        let total = lines.iter().map(|line| line.line_total).sum();
        CartTotal {
            currency: target.clone(),
            lines,
            total,
        }
    }
}
