use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};

/// Identifier for variants as handed over by the storefront.
pub type VariantId = u64;

/// Carrier prices keyed by service name, expressed in minor currency units (cents).
pub type RateMap = HashMap<String, u64>;

/// Transit estimates keyed by service name.
pub type TransitTimes = HashMap<String, Duration>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country_iso: String,
    /// Abbreviation of a known state (e.g. "CA"). Preferred over `state_name`.
    #[serde(default)]
    pub state_abbr: Option<String>,
    /// Free-text state for countries without a state list.
    #[serde(default)]
    pub state_name: Option<String>,
    pub city: String,
    pub zipcode: String,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
}

impl Address {
    /// Returns the abbreviation when the state is known, else the free-text name.
    pub fn best_state(&self) -> String {
        self.state_abbr
            .clone()
            .or_else(|| self.state_name.clone())
            .unwrap_or_default()
    }
}

/// Per-warehouse carrier account, used when each stock location bills separately.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierCredentials {
    pub key: String,
    pub password: String,
    pub account: String,
    pub login: String,
}

impl CarrierCredentials {
    /// All four fields must be present for the carrier to accept them.
    pub fn is_complete(&self) -> bool {
        [&self.key, &self.password, &self.account, &self.login]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockLocation {
    pub id: u64,
    pub address: Address,
    #[serde(default)]
    pub credentials: Option<CarrierCredentials>,
    #[serde(default)]
    pub freight_account: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub number: String,
    pub ship_address: Address,
}

/// Custom packaging a product always ships in, one per unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductPackage {
    pub weight: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    /// Raw catalog weight. Zero or negative means "unknown".
    pub weight: f64,
    #[serde(default)]
    pub product_packages: Vec<ProductPackage>,
}

impl Variant {
    pub fn has_custom_packaging(&self) -> bool {
        !self.product_packages.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub variant: Variant,
    pub quantity: u32,
}

/// The unit of work priced by a calculator: what leaves one stock location for one order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub order: Order,
    pub stock_location: StockLocation,
    pub contents: Vec<ContentItem>,
}

impl Shipment {
    pub fn destination(&self) -> &Address {
        &self.order.ship_address
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

/// One parcel as submitted to the carrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPackage {
    pub weight: f64,
    /// Zero to three values (length, width, height).
    pub dimensions: Vec<f64>,
    pub units: Units,
}

impl PhysicalPackage {
    pub fn new(weight: f64, dimensions: Vec<f64>, units: Units) -> Self {
        Self {
            weight,
            dimensions,
            units,
        }
    }
}
