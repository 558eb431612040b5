#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use carrier_rates::{
    domain::{
        Address, CarrierLocation, ContentItem, Order, PhysicalPackage, RateOptions, StockLocation,
        TransitTimes, Variant,
    },
    CalculatorCaches, CarrierError, CarrierTransport, RateCalculator, RateEstimate, RateResponse,
    Shipment, ShippingConfig, ShippingService, TransportError,
};

/// What the fake carrier answers with.
#[derive(Clone, Debug)]
pub enum Reply {
    Rates(Vec<(&'static str, u64)>),
    Fail(CarrierError),
    Down(&'static str),
}

pub struct FakeCarrier {
    reply: Mutex<Reply>,
    transit: Option<HashMap<String, Duration>>,
    rate_calls: AtomicUsize,
    transit_calls: AtomicUsize,
    seen_packages: Mutex<Vec<PhysicalPackage>>,
}

impl FakeCarrier {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self::build(reply, None))
    }

    pub fn with_transit(reply: Reply, transit: &[(&str, u64)]) -> Arc<Self> {
        let transit = transit
            .iter()
            .map(|(name, days)| (name.to_string(), Duration::from_secs(days * 86_400)))
            .collect();
        Arc::new(Self::build(reply, Some(transit)))
    }

    fn build(reply: Reply, transit: Option<HashMap<String, Duration>>) -> Self {
        Self {
            reply: Mutex::new(reply),
            transit,
            rate_calls: AtomicUsize::new(0),
            transit_calls: AtomicUsize::new(0),
            seen_packages: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn rate_calls(&self) -> usize {
        self.rate_calls.load(Ordering::SeqCst)
    }

    pub fn transit_calls(&self) -> usize {
        self.transit_calls.load(Ordering::SeqCst)
    }

    pub fn seen_packages(&self) -> Vec<PhysicalPackage> {
        self.seen_packages.lock().unwrap().clone()
    }

    fn answer<T>(&self, ok: impl FnOnce(Vec<(&'static str, u64)>) -> T) -> Result<T, TransportError> {
        match self.reply.lock().unwrap().clone() {
            Reply::Rates(rates) => Ok(ok(rates)),
            Reply::Fail(error) => Err(TransportError::Carrier(error)),
            Reply::Down(reason) => Err(TransportError::Unavailable(reason.to_string())),
        }
    }
}

#[async_trait]
impl CarrierTransport for FakeCarrier {
    fn name(&self) -> &str {
        "FakeEx"
    }

    fn supports_freight(&self) -> bool {
        true
    }

    fn supports_time_in_transit(&self) -> bool {
        self.transit.is_some()
    }

    async fn find_rates(
        &self,
        _origin: &CarrierLocation,
        _destination: &CarrierLocation,
        packages: &[PhysicalPackage],
        _options: &RateOptions,
    ) -> Result<RateResponse, TransportError> {
        self.rate_calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_packages.lock().unwrap() = packages.to_vec();
        self.answer(|rates| RateResponse {
            rates: rates
                .into_iter()
                .map(|(service_name, price)| RateEstimate {
                    service_name: service_name.to_string(),
                    price,
                })
                .collect(),
        })
    }

    async fn find_time_in_transit(
        &self,
        _origin: &CarrierLocation,
        _destination: &CarrierLocation,
        _packages: &[PhysicalPackage],
        _options: &RateOptions,
    ) -> Result<Option<TransitTimes>, TransportError> {
        self.transit_calls.fetch_add(1, Ordering::SeqCst);
        let transit = self.transit.clone();
        self.answer(|_| transit)
    }
}

pub fn address(country: &str, state: &str, city: &str, zip: &str) -> Address {
    Address {
        country_iso: country.to_string(),
        state_abbr: Some(state.to_string()),
        state_name: None,
        city: city.to_string(),
        zipcode: zip.to_string(),
        address1: Some("1 Main St".to_string()),
        address2: None,
    }
}

pub fn item(id: u64, weight: f64, quantity: u32) -> ContentItem {
    ContentItem {
        variant: Variant {
            id,
            weight,
            product_packages: Vec::new(),
        },
        quantity,
    }
}

pub fn shipment(contents: Vec<ContentItem>) -> Shipment {
    Shipment {
        order: Order {
            number: "R100200300".to_string(),
            ship_address: address("US", "NY", "New York", "10001"),
        },
        stock_location: StockLocation {
            id: 1,
            address: address("US", "TN", "Memphis", "38118"),
            credentials: None,
            freight_account: None,
        },
        contents,
    }
}

pub fn config() -> ShippingConfig {
    ShippingConfig {
        unit_multiplier: 1.0,
        ..ShippingConfig::default()
    }
}

pub fn calculator(service: ShippingService, carrier: Arc<FakeCarrier>, config: ShippingConfig) -> RateCalculator {
    let caches = CalculatorCaches::from_config(&config);
    RateCalculator::new(service, carrier, Arc::new(config), caches)
}
