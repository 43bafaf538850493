//! Exchange Rate Cache and Currency Conversion
//!
//! Rates are expressed against a single base currency (`SSP`): every entry in a
//! [`RateTable`] says how many units of that currency equal one unit of the
//! base. Converting between two currencies composes through the base.
//!
//! [`CurrencyService`] owns the cached table, refreshes it from a
//! [`RateSource`] no more often than its TTL, and falls back to the last good
//! table (or a small hardcoded one) when the source is unreachable.
//!
//! # Example
//! ```
//! use currency_converter::{CurrencyCode, CurrencyService, RateTable, StaticRateSource};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let table = RateTable::from_pairs([("SSP", 1.0), ("USD", 0.0015)]);
//! let service = CurrencyService::new(StaticRateSource::new(table));
//!
//! let ssp = CurrencyCode::new("SSP").unwrap();
//! let usd = CurrencyCode::new("USD").unwrap();
//!
//! assert_eq!(service.convert(1000.0, &ssp, &usd).await, 2.0);
//! assert_eq!(service.format_currency(1_250_000.0, &ssp), "SSP 1,250,000");
//! # });
//! ```

mod code;
mod error;
mod format;
pub mod pricing;
mod preference;
mod refresher;
mod rounding;
mod service;
mod source;
mod table;


pub use code::{BASE_CURRENCY, CurrencyCode, DEFAULT_DISPLAY_CURRENCY};
pub use error::{ConvertError, RateSourceError};
pub use format::format_currency;
pub use pricing::{CartLine, CartTotal, PricedItem};
pub use preference::CurrencyPreference;
pub use refresher::RateRefresher;
pub use rounding::RoundingPolicy;
pub use service::{
    Conversion, CurrencyService, CurrencyServiceBuilder, DEFAULT_FETCH_TIMEOUT, DEFAULT_TTL,
};
pub use source::{RateSource, StaticRateSource};
pub use table::{RateEntry, RateTable};
