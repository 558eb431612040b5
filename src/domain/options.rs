//! Extra request options passed through to the carrier.

use serde::{Deserialize, Serialize};

use crate::util::config::ShippingConfig;

use super::entities::{CarrierCredentials, StockLocation};
use super::location::{build_location, CarrierLocation};
use super::service::ShippingService;

const FREIGHT_PAYMENT_TYPE: &str = "SENDER";
const FREIGHT_ROLE: &str = "SHIPPER";
const FREIGHT_CLASS: &str = "CLASS_050";
const FREIGHT_PACKAGING: &str = "PALLET";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FreightOptions {
    pub payment_type: String,
    pub role: String,
    pub account: String,
    pub billing_location: CarrierLocation,
    pub freight_class: String,
    pub packaging: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateOptions {
    /// Stock-location account overriding the carrier's configured one.
    pub credentials: Option<CarrierCredentials>,
    pub freight: Option<FreightOptions>,
}

impl RateOptions {
    pub fn is_empty(&self) -> bool {
        self.credentials.is_none() && self.freight.is_none()
    }

    /// Deterministic `key=value` pairs joined by `:`, used in cache keys.
    pub fn cache_fragment(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(freight) = &self.freight {
            let billing = &freight.billing_location;
            pairs.push(format!("freight.payment_type={}", freight.payment_type));
            pairs.push(format!("freight.role={}", freight.role));
            pairs.push(format!("freight.account={}", freight.account));
            pairs.push(format!(
                "freight.billing_location={},{},{},{}",
                billing.country, billing.state, billing.city, billing.zip
            ));
            pairs.push(format!("freight.freight_class={}", freight.freight_class));
            pairs.push(format!("freight.packaging={}", freight.packaging));
        }
        if let Some(credentials) = &self.credentials {
            pairs.push(format!("key={}", credentials.key));
            pairs.push(format!("password={}", credentials.password));
            pairs.push(format!("account={}", credentials.account));
            pairs.push(format!("login={}", credentials.login));
        }
        pairs.join(":")
    }
}

pub fn build_options(
    service: &ShippingService,
    carrier_supports_freight: bool,
    stock_location: &StockLocation,
    config: &ShippingConfig,
) -> RateOptions {
    let mut options = RateOptions::default();

    let freight_account = config
        .freight_account()
        .filter(|_| service.freight && carrier_supports_freight);
    if let Some(account) = freight_account {
        options.freight = Some(FreightOptions {
            payment_type: FREIGHT_PAYMENT_TYPE.to_string(),
            role: FREIGHT_ROLE.to_string(),
            account: account.to_string(),
            billing_location: build_location(&stock_location.address),
            freight_class: FREIGHT_CLASS.to_string(),
            packaging: FREIGHT_PACKAGING.to_string(),
        });
    }

    if !config.multi_warehouse {
        return options;
    }
    let Some(credentials) = stock_location
        .credentials
        .as_ref()
        .filter(|credentials| credentials.is_complete())
    else {
        return options;
    };

    options.credentials = Some(credentials.clone());
    if let (Some(freight), Some(account)) = (
        options.freight.as_mut(),
        stock_location.freight_account.as_deref(),
    ) {
        freight.account = account.to_string();
    }
    options
}
