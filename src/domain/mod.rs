//! Shipment model and the pure parts of rate calculation live here.

pub mod entities;
pub mod error;
pub mod fingerprint;
pub mod location;
pub mod options;
pub mod packaging;
pub mod service;

pub use entities::{
    Address, CarrierCredentials, ContentItem, Order, PhysicalPackage, ProductPackage, RateMap,
    Shipment, StockLocation, TransitTimes, Units, Variant, VariantId,
};
pub use error::ShippingError;
pub use fingerprint::{cache_key, request_digest, timings_key, TIMINGS_SUFFIX};
pub use location::{build_location, CarrierLocation};
pub use options::{build_options, FreightOptions, RateOptions};
pub use packaging::{build_packages, resolve_max_weight, DimensionsFn, WeightPolicy};
pub use service::ShippingService;
