//! # Pricing Hex
//!
//! Application service layer and HTTP adapter for the pricing service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (conversion, cart totals, currency admin)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served at `/api-docs/openapi.json`
//!
//! The service is generic over `R: CurrencyRepository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::PricingService;
