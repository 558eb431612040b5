use thiserror::Error;

/// Every failure a calculator reports to its caller.
///
/// `PolicyViolation` and `Carrier` are the recognized kinds: the availability
/// probe turns them into "not available". `Carrier` is also the only kind the
/// rate cache stores and replays.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ShippingError {
    #[error("Shipping Error: {0}")]
    PolicyViolation(String),
    #[error("Shipping Error: {message}")]
    Carrier { message: String },
    #[error("Shipping Error: transport failure: {0}")]
    Transport(String),
}

impl ShippingError {
    pub fn weight_limit(max_weight: f64) -> Self {
        Self::PolicyViolation(format!(
            "The maximum per package weight for the selected service from the selected country is {max_weight} ounces."
        ))
    }

    pub fn unserved_country(country_iso: &str) -> Self {
        Self::PolicyViolation(format!(
            "The selected service is not available for shipments to {country_iso}."
        ))
    }

    pub fn carrier(message: impl Into<String>) -> Self {
        Self::Carrier {
            message: message.into(),
        }
    }

    /// Kinds that mean "this service cannot price this shipment".
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::PolicyViolation(_) | Self::Carrier { .. })
    }

    /// Only terminal carrier answers are worth replaying from cache.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Carrier { .. })
    }
}
