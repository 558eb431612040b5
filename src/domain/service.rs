//! A single carrier service (e.g. "Ground", "Priority Mail") and its destination limits.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingService {
    /// Must match the service name the carrier reports in its rate response.
    pub name: String,
    /// Max ounces per package by destination country ISO. Missing or 0 means no limit.
    #[serde(default)]
    pub country_max_weights: HashMap<String, f64>,
    /// Countries the service does not ship to at all.
    #[serde(default)]
    pub excluded_countries: HashSet<String>,
    /// Freight services request pallet rates with freight options.
    #[serde(default)]
    pub freight: bool,
}

impl ShippingService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_country_limit(mut self, country_iso: impl Into<String>, max_ounces: f64) -> Self {
        self.country_max_weights.insert(country_iso.into(), max_ounces);
        self
    }

    pub fn excluding(mut self, country_iso: impl Into<String>) -> Self {
        self.excluded_countries.insert(country_iso.into());
        self
    }

    pub fn as_freight(mut self) -> Self {
        self.freight = true;
        self
    }

    /// `None` when the service does not serve the country, else the cap (0 = unlimited).
    pub fn max_weight_for_country(&self, country_iso: &str) -> Option<f64> {
        if self.excluded_countries.contains(country_iso) {
            return None;
        }
        Some(
            self.country_max_weights
                .get(country_iso)
                .copied()
                .filter(|weight| *weight > 0.0)
                .unwrap_or(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_country_is_unlimited() {
        let service = ShippingService::new("Ground").with_country_limit("CA", 1040.0);
        assert_eq!(service.max_weight_for_country("US"), Some(0.0));
        assert_eq!(service.max_weight_for_country("CA"), Some(1040.0));
    }

    #[test]
    fn excluded_country_is_unserved() {
        let service = ShippingService::new("Ground")
            .with_country_limit("MX", 500.0)
            .excluding("MX");
        assert_eq!(service.max_weight_for_country("MX"), None);
    }
}
