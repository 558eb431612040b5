//! Splits a shipment into carrier-compliant parcels.
//!
//! Plain items are packed greedily (lightest first) under the effective weight
//! cap. Items whose product declares custom packaging always travel in their
//! own boxes, one per unit, appended after the greedy parcels.

use crate::util::config::ShippingConfig;

use super::entities::{PhysicalPackage, Shipment, Units, Variant};
use super::error::ShippingError;

/// Override hook for dimensional-weight pricing. Receives the shipment, returns
/// up to three dimensions applied to every greedy parcel.
pub type DimensionsFn = dyn Fn(&Shipment) -> Vec<f64> + Send + Sync;

/// Weight limits in effect for one shipment. All weights are post-multiplier (ounces).
#[derive(Clone, Debug, PartialEq)]
pub struct WeightPolicy {
    /// Destination cap from the service. 0 = unlimited.
    pub country_max_weight: f64,
    /// Global cap from config, already multiplied. 0 = unlimited.
    pub global_max_weight: f64,
    pub unit_multiplier: f64,
    pub default_weight: f64,
    pub units: Units,
}

impl WeightPolicy {
    pub fn new(country_max_weight: f64, config: &ShippingConfig) -> Self {
        Self {
            country_max_weight,
            global_max_weight: config.max_weight_per_package * config.unit_multiplier,
            unit_multiplier: config.unit_multiplier,
            default_weight: config.default_weight,
            units: config.units,
        }
    }

    pub fn max_weight(&self) -> f64 {
        resolve_max_weight(self.country_max_weight, self.global_max_weight)
    }

    /// Shippable weight of one unit of `variant`.
    pub fn unit_weight(&self, variant: &Variant) -> f64 {
        let weight = if variant.weight > 0.0 {
            variant.weight
        } else {
            self.default_weight
        };
        weight * self.unit_multiplier
    }
}

/// Effective per-package cap: the smaller of the two limits, where 0 means "no limit".
pub fn resolve_max_weight(country_max_weight: f64, global_max_weight: f64) -> f64 {
    if country_max_weight <= 0.0 && global_max_weight > 0.0 {
        global_max_weight
    } else if country_max_weight > 0.0
        && global_max_weight > 0.0
        && global_max_weight < country_max_weight
    {
        global_max_weight
    } else {
        country_max_weight.max(0.0)
    }
}

pub fn build_packages(
    shipment: &Shipment,
    policy: &WeightPolicy,
    dimensions: Option<&DimensionsFn>,
) -> Result<Vec<PhysicalPackage>, ShippingError> {
    let max_weight = policy.max_weight();
    let weights = unit_weights(shipment, policy, max_weight)?;
    let custom = custom_packages(shipment, policy, max_weight)?;

    let mut packages = Vec::with_capacity(weights.len().min(8) + custom.len());
    if !weights.is_empty() {
        let dims = dimensions.map(|compute| compute(shipment)).unwrap_or_default();
        for weight in bin_weights(&weights, max_weight) {
            packages.push(PhysicalPackage::new(weight, dims.clone(), policy.units));
        }
    }
    packages.extend(custom);

    tracing::debug!(
        order = %shipment.order.number,
        max_weight,
        packages = packages.len(),
        "built shipment packages"
    );
    Ok(packages)
}

/// Unit weights of every plain item with their unit counts, ascending by weight.
fn unit_weights(
    shipment: &Shipment,
    policy: &WeightPolicy,
    max_weight: f64,
) -> Result<Vec<(f64, u64)>, ShippingError> {
    let mut weights: Vec<(f64, u64)> = Vec::new();
    for item in &shipment.contents {
        if item.variant.has_custom_packaging() || item.quantity == 0 {
            continue;
        }
        let weight = policy.unit_weight(&item.variant);
        if max_weight > 0.0 && weight > max_weight {
            return Err(ShippingError::weight_limit(max_weight));
        }
        weights.push((weight, u64::from(item.quantity)));
    }
    weights.sort_by(|a, b| a.0.total_cmp(&b.0));
    weights.dedup_by(|next, kept| {
        if next.0 == kept.0 {
            kept.1 += next.1;
            true
        } else {
            false
        }
    });
    Ok(weights)
}

/// Greedy first-fit over units sorted by weight, counted per weight class.
/// `max_weight == 0` packs everything together.
fn bin_weights(weights: &[(f64, u64)], max_weight: f64) -> Vec<f64> {
    if max_weight <= 0.0 {
        return vec![weights.iter().map(|&(weight, count)| weight * count as f64).sum()];
    }

    let mut bins = Vec::new();
    let mut current = 0.0;
    for &(weight, count) in weights {
        let fit = units_fitting(max_weight - current, weight).min(count);
        current += weight * fit as f64;
        let rest = count - fit;
        if rest == 0 {
            continue;
        }
        bins.push(current);

        // every unit is at most max_weight, so an empty bin takes at least one
        let per_bin = units_fitting(max_weight, weight).max(1);
        let full = (rest - 1) / per_bin;
        let full_weight = weight * per_bin as f64;
        bins.extend((0..full).map(|_| full_weight));
        current = weight * (rest - full * per_bin) as f64;
    }
    // weights is non-empty here, so the last bin always holds at least one unit
    bins.push(current);
    bins
}

/// How many units of `weight` fit into `room`.
fn units_fitting(room: f64, weight: f64) -> u64 {
    if weight <= 0.0 {
        return u64::MAX;
    }
    if room < weight {
        return 0;
    }
    let mut fit = (room / weight).floor() as u64;
    while fit > 0 && weight * fit as f64 > room {
        fit -= 1;
    }
    while fit < u64::MAX && weight * (fit + 1) as f64 <= room {
        fit += 1;
    }
    fit
}

fn custom_packages(
    shipment: &Shipment,
    policy: &WeightPolicy,
    max_weight: f64,
) -> Result<Vec<PhysicalPackage>, ShippingError> {
    let mut packages = Vec::new();
    for item in &shipment.contents {
        for product_package in &item.variant.product_packages {
            let weight = product_package.weight * policy.unit_multiplier;
            if max_weight > 0.0 && weight > max_weight {
                return Err(ShippingError::weight_limit(max_weight));
            }
            // Custom box dimensions are catalogued in inches.
            let dims = vec![
                product_package.length,
                product_package.width,
                product_package.height,
            ];
            for _ in 0..item.quantity {
                packages.push(PhysicalPackage::new(weight, dims.clone(), Units::Imperial));
            }
        }
    }
    Ok(packages)
}
