//! Port traits (interfaces for adapters).
//!
//! The rate source port is defined by `currency-converter`; the admin
//! repository port is defined here.

mod repository;

pub use currency_converter::RateSource;
pub use repository::CurrencyRepository;
