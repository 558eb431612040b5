//! Cache keys for carrier lookups.
//!
//! A key covers everything that can change the carrier's answer: origin,
//! carrier, order, destination, the shipped contents, request options and
//! locale. The readable part of the key has its whitespace stripped and its
//! fields joined by `-`, so it is not unique on its own. The digest in the
//! middle is taken over the exact field values and keeps keys apart.

use serde_json::json;
use sha2::{Digest, Sha256};

use super::entities::Shipment;
use super::options::RateOptions;

/// Appended to a rate key to address the transit-time entry for the same shipment.
pub const TIMINGS_SUFFIX: &str = "-timings";

pub fn cache_key(shipment: &Shipment, carrier_name: &str, options: &RateOptions, locale: &str) -> String {
    let address = shipment.destination();
    let options = options.cache_fragment();
    let key = format!(
        "{stock}-{carrier}-{order}-{country}-{state}-{city}-{zip}-{digest}-{options}-{locale}",
        stock = shipment.stock_location.id,
        carrier = carrier_name,
        order = shipment.order.number,
        country = address.country_iso,
        state = address.best_state(),
        city = address.city,
        zip = address.zipcode,
        digest = request_digest(shipment, carrier_name, &options, locale),
    );
    key.split_whitespace().collect()
}

pub fn timings_key(rate_key: &str) -> String {
    format!("{rate_key}{TIMINGS_SUFFIX}")
}

/// Hex SHA-256 over the JSON form of every key field, with contents as sorted
/// `(variant, quantity)` pairs so line order never matters.
pub fn request_digest(
    shipment: &Shipment,
    carrier_name: &str,
    options_fragment: &str,
    locale: &str,
) -> String {
    let mut pairs: Vec<(u64, u32)> = shipment
        .contents
        .iter()
        .map(|item| (item.variant.id, item.quantity))
        .collect();
    pairs.sort_unstable();

    let address = shipment.destination();
    let fields = json!([
        shipment.stock_location.id,
        carrier_name,
        shipment.order.number,
        address.country_iso,
        address.best_state(),
        address.city,
        address.zipcode,
        pairs,
        options_fragment,
        locale,
    ]);
    hex::encode(Sha256::digest(fields.to_string().as_bytes()))
}
