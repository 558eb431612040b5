//! Shipping rate calculation against third-party carriers.
//!
//! - `domain`: shipment model, package bucketing, cache keys, request options.
//! - `infra`: carrier transport seam, error normalization, TTL rate cache.
//! - `calculator`: per-service pricing, availability and transit-time lookups.

pub mod calculator;
pub mod domain;
pub mod infra;
pub mod util;

pub use calculator::{CalculatorCaches, RateCalculator};
pub use domain::{Shipment, ShippingError, ShippingService};
pub use infra::cache::{CacheLookup, RateCache, Served};
pub use infra::carrier::{CarrierError, CarrierTransport, RateEstimate, RateResponse, TransportError};
pub use util::config::ShippingConfig;
