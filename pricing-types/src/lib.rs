//! # Pricing Types
//!
//! Domain types and port traits for the marketplace pricing service.
//! No IO lives here - only data structures, validation rules and trait
//! definitions.
//!
//! ## Architecture
//!
//! - `domain/` - Currency records as administered in the `currencies` table
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, repository and application error types
//!
//! Conversion itself lives in `currency-converter`; its core types are
//! re-exported here so adapters only need one import path.

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

pub use currency_converter::{
    CartLine, CartTotal, CurrencyCode, PricedItem, RateEntry, RateSource, RateSourceError,
    RateTable,
};
pub use domain::{CurrencyId, CurrencyRecord, CurrencyStatus};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::CurrencyRepository;
