//! Seam to the carrier-rating service and normalization of its failures.
//!
//! - `CarrierTransport` is implemented by concrete carrier integrations.
//! - `translate_error` folds every carrier's error payload into `ShippingError::Carrier`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    CarrierLocation, PhysicalPackage, RateMap, RateOptions, ShippingError, TransitTimes,
};

/// Common location of the message in XML-style carrier responses.
const RESPONSE_ERROR_POINTER: &str = "/Response/Error/ErrorDescription";
/// Canada Post reports failures under its own envelope.
const EPARCEL_ERROR_POINTER: &str = "/eparcel/error/statusMessage";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    pub service_name: String,
    /// Minor currency units (cents).
    pub price: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateResponse {
    pub rates: Vec<RateEstimate>,
}

/// A failure reported by the carrier itself.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}")]
pub struct CarrierError {
    pub message: String,
    /// Parsed response body, when the carrier answered with one.
    pub params: Option<Value>,
}

impl CarrierError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            params: None,
        }
    }

    pub fn with_params(message: impl Into<String>, params: Value) -> Self {
        Self {
            message: message.into(),
            params: Some(params),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Carrier(#[from] CarrierError),
    /// The carrier could not be reached or answered with something unusable.
    #[error("carrier unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CarrierTransport: Send + Sync {
    /// Stable carrier name, part of every cache key.
    fn name(&self) -> &str;

    fn supports_freight(&self) -> bool {
        false
    }

    fn supports_time_in_transit(&self) -> bool {
        false
    }

    async fn find_rates(
        &self,
        origin: &CarrierLocation,
        destination: &CarrierLocation,
        packages: &[PhysicalPackage],
        options: &RateOptions,
    ) -> Result<RateResponse, TransportError>;

    /// Only called when `supports_time_in_transit` is true. `None` means the
    /// carrier answered without a usable per-service mapping.
    async fn find_time_in_transit(
        &self,
        _origin: &CarrierLocation,
        _destination: &CarrierLocation,
        _packages: &[PhysicalPackage],
        _options: &RateOptions,
    ) -> Result<Option<TransitTimes>, TransportError> {
        Ok(None)
    }
}

/// Normalizes a carrier failure into the one error kind callers handle.
pub fn translate_error(error: &CarrierError) -> ShippingError {
    let message = error
        .params
        .as_ref()
        .and_then(|params| {
            message_at(params, RESPONSE_ERROR_POINTER)
                .or_else(|| message_at(params, EPARCEL_ERROR_POINTER))
        })
        .unwrap_or_else(|| error.message.clone());
    ShippingError::carrier(message)
}

pub fn translate_transport_error(error: TransportError) -> ShippingError {
    match error {
        TransportError::Carrier(carrier) => translate_error(&carrier),
        TransportError::Unavailable(reason) => ShippingError::Transport(reason),
    }
}

/// Flattens a rate response into service name → price. Carriers return service
/// names HTML-escaped (`UPS Next Day Air&#174;` etc).
pub fn rates_to_map(response: RateResponse) -> RateMap {
    response
        .rates
        .into_iter()
        .map(|rate| {
            let name = html_escape::decode_html_entities(&rate.service_name).into_owned();
            (name, rate.price)
        })
        .collect()
}

fn message_at(params: &Value, pointer: &str) -> Option<String> {
    match params.pointer(pointer)? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
