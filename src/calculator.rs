//! Prices a shipment for one carrier service.
//!
//! One `RateCalculator` exists per offered service. Calculators for services of
//! the same carrier should share one `CalculatorCaches`: the carrier returns
//! every service's price in a single answer, and the cache key does not depend
//! on the service.

use std::{sync::Arc, time::Duration};

use crate::{
    domain::{
        build_location, build_options, build_packages, cache_key, timings_key, CarrierLocation,
        DimensionsFn, PhysicalPackage, RateMap, RateOptions, Shipment, ShippingError,
        ShippingService, TransitTimes, WeightPolicy,
    },
    infra::{
        cache::{RateCache, Served},
        carrier::{rates_to_map, translate_transport_error, CarrierTransport},
    },
    util::config::ShippingConfig,
};

/// Process-wide caches for carrier answers. Cloning shares them.
#[derive(Clone)]
pub struct CalculatorCaches {
    pub rates: RateCache<RateMap>,
    pub timings: RateCache<Option<TransitTimes>>,
}

impl CalculatorCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            rates: RateCache::new(ttl),
            timings: RateCache::new(ttl),
        }
    }

    pub fn from_config(config: &ShippingConfig) -> Self {
        Self::new(config.cache_ttl())
    }
}

#[derive(Clone)]
pub struct RateCalculator {
    service: ShippingService,
    carrier: Arc<dyn CarrierTransport>,
    config: Arc<ShippingConfig>,
    caches: CalculatorCaches,
    dimensions: Option<Arc<DimensionsFn>>,
}

impl RateCalculator {
    pub fn new(
        service: ShippingService,
        carrier: Arc<dyn CarrierTransport>,
        config: Arc<ShippingConfig>,
        caches: CalculatorCaches,
    ) -> Self {
        Self {
            service,
            carrier,
            config,
            caches,
            dimensions: None,
        }
    }

    /// Supplies package dimensions for dimensional-weight pricing.
    pub fn with_dimensions<F>(mut self, dimensions: F) -> Self
    where
        F: Fn(&Shipment) -> Vec<f64> + Send + Sync + 'static,
    {
        let dimensions: Arc<DimensionsFn> = Arc::new(dimensions);
        self.dimensions = Some(dimensions);
        self
    }

    pub fn service(&self) -> &ShippingService {
        &self.service
    }

    pub fn caches(&self) -> &CalculatorCaches {
        &self.caches
    }

    /// Weight limits for the shipment's destination. Fails if the service does not ship there.
    pub fn weight_policy(&self, shipment: &Shipment) -> Result<WeightPolicy, ShippingError> {
        let country = &shipment.destination().country_iso;
        let country_max_weight = self
            .service
            .max_weight_for_country(country)
            .ok_or_else(|| ShippingError::unserved_country(country))?;
        Ok(WeightPolicy::new(country_max_weight, &self.config))
    }

    pub fn packages(&self, shipment: &Shipment) -> Result<Vec<PhysicalPackage>, ShippingError> {
        let policy = self.weight_policy(shipment)?;
        build_packages(shipment, &policy, self.dimensions.as_deref())
    }

    pub fn options(&self, shipment: &Shipment) -> RateOptions {
        build_options(
            &self.service,
            self.carrier.supports_freight(),
            &shipment.stock_location,
            &self.config,
        )
    }

    pub fn cache_key(&self, shipment: &Shipment, options: &RateOptions) -> String {
        cache_key(shipment, self.carrier.name(), options, &self.config.locale)
    }

    /// Checks limits the carrier does not enforce itself, without calling it.
    pub fn check_shippable(&self, shipment: &Shipment) -> Result<(), ShippingError> {
        self.packages(shipment).map(|_| ())
    }

    /// Price of this service for `shipment` in major currency units, handling fee included.
    ///
    /// `Ok(None)` means the carrier offers no rate for this service. A carrier
    /// failure is returned as `Err` on the call that hit the carrier. Until the
    /// entry expires, later calls read the stored failure as `Ok(None)` without
    /// asking the carrier again.
    pub async fn compute(&self, shipment: &Shipment) -> Result<Option<f64>, ShippingError> {
        let origin = build_location(&shipment.stock_location.address);
        let destination = build_location(shipment.destination());
        let options = self.options(shipment);
        let key = self.cache_key(shipment, &options);

        let served = self
            .caches
            .rates
            .get_or_compute(&key, || {
                self.retrieve_rates(shipment, &origin, &destination, &options)
            })
            .await?;
        let rates = match served {
            Served::Value(rates) => rates,
            Served::ReplayedFailure(error) => {
                tracing::debug!(
                    service = %self.service.name,
                    fingerprint = %key,
                    error = %error,
                    "no rate while carrier failure is cached"
                );
                return Ok(None);
            }
        };
        tracing::debug!(
            service = %self.service.name,
            fingerprint = %key,
            rates = ?rates,
            "carrier rates"
        );

        let Some(price) = rates.get(&self.service.name) else {
            return Ok(None);
        };
        // carriers quote in cents
        Ok(Some(*price as f64 / 100.0 + self.config.handling_fee))
    }

    /// Whether this service can price `shipment`. Policy and carrier failures read
    /// as `false`; anything else (e.g. an unreachable carrier) is returned.
    pub async fn available(&self, shipment: &Shipment) -> Result<bool, ShippingError> {
        if let Err(error) = self.check_shippable(shipment) {
            tracing::debug!(service = %self.service.name, error = %error, "shipment not shippable");
            return Ok(false);
        }

        match self.compute(shipment).await {
            Ok(price) => Ok(price.is_some()),
            Err(error) if error.is_recognized() => {
                tracing::debug!(service = %self.service.name, error = %error, "service unavailable");
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    /// Transit estimate for this service. Origin is the shipment's stock location.
    /// Unlike `compute`, a stored carrier failure is returned again as `Err`.
    pub async fn timing(&self, shipment: &Shipment) -> Result<Option<Duration>, ShippingError> {
        let origin = build_location(&shipment.stock_location.address);
        let destination = build_location(shipment.destination());
        let options = self.options(shipment);
        let key = timings_key(&self.cache_key(shipment, &options));

        let timings = self
            .caches
            .timings
            .get_or_compute(&key, || {
                self.retrieve_timings(shipment, &origin, &destination, &options)
            })
            .await?
            .into_result()?;

        Ok(timings
            .as_ref()
            .and_then(|timings| timings.get(&self.service.name))
            .copied())
    }

    async fn retrieve_rates(
        &self,
        shipment: &Shipment,
        origin: &CarrierLocation,
        destination: &CarrierLocation,
        options: &RateOptions,
    ) -> Result<RateMap, ShippingError> {
        let packages = self.packages(shipment)?;
        if packages.is_empty() {
            return Ok(RateMap::new());
        }

        tracing::info!(
            carrier = self.carrier.name(),
            order = %shipment.order.number,
            packages = packages.len(),
            "requesting carrier rates"
        );
        match self
            .carrier
            .find_rates(origin, destination, &packages, options)
            .await
        {
            Ok(response) => Ok(rates_to_map(response)),
            Err(error) => {
                tracing::info!(carrier = self.carrier.name(), error = %error, "carrier rate request failed");
                Err(translate_transport_error(error))
            }
        }
    }

    async fn retrieve_timings(
        &self,
        shipment: &Shipment,
        origin: &CarrierLocation,
        destination: &CarrierLocation,
        options: &RateOptions,
    ) -> Result<Option<TransitTimes>, ShippingError> {
        if !self.carrier.supports_time_in_transit() {
            tracing::debug!(carrier = self.carrier.name(), "carrier has no transit times");
            return Ok(None);
        }
        let packages = self.packages(shipment)?;
        if packages.is_empty() {
            return Ok(None);
        }

        self.carrier
            .find_time_in_transit(origin, destination, &packages, options)
            .await
            .map_err(|error| {
                tracing::info!(carrier = self.carrier.name(), error = %error, "carrier transit request failed");
                translate_transport_error(error)
            })
    }
}
