//! Domain models for the pricing service.

pub mod currency;

pub use currency::{CurrencyId, CurrencyRecord, CurrencyStatus};
