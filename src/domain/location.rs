//! Carrier-neutral origin/destination descriptors.

use serde::{Deserialize, Serialize};

use super::entities::Address;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierLocation {
    pub country: String,
    pub state: String,
    pub city: String,
    pub zip: String,
    pub address1: Option<String>,
    pub address2: Option<String>,
}

impl From<&Address> for CarrierLocation {
    fn from(address: &Address) -> Self {
        build_location(address)
    }
}

pub fn build_location(address: &Address) -> CarrierLocation {
    CarrierLocation {
        country: address.country_iso.clone(),
        state: address.best_state(),
        city: address.city.clone(),
        zip: address.zipcode.clone(),
        address1: address.address1.clone(),
        address2: address.address2.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(state_abbr: Option<&str>, state_name: Option<&str>) -> Address {
        Address {
            country_iso: "US".to_string(),
            state_abbr: state_abbr.map(str::to_string),
            state_name: state_name.map(str::to_string),
            city: "Portland".to_string(),
            zipcode: "97201".to_string(),
            address1: Some("1 Main St".to_string()),
            address2: None,
        }
    }

    #[test]
    fn prefers_state_abbreviation() {
        let location = build_location(&address(Some("OR"), Some("Oregon")));
        assert_eq!(location.state, "OR");
        assert_eq!(location.country, "US");
        assert_eq!(location.zip, "97201");
        assert_eq!(location.address1.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn falls_back_to_state_name() {
        let location = build_location(&address(None, Some("Oregon")));
        assert_eq!(location.state, "Oregon");
    }

    #[test]
    fn missing_state_is_empty() {
        let location = CarrierLocation::from(&address(None, None));
        assert!(location.state.is_empty());
    }
}
