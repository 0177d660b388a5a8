use std::{fs, io, path::Path};

use crate::constants::{
    env::{HIGH, LOW},
    MAX_PRICE,
};

/// Linear map between a magnitude range and a symmetric normalized range.
///
/// Inputs outside either range saturate at the nearest bound, so
/// `denormalize(normalize(v)) == v` for every `v` inside the magnitude range.
/// Bounds may be given in either order. A range that is empty or not finite
/// maps everything to the low bound of the other side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    pub lo: f64,
    pub hi: f64,
    pub lo_norm: f64,
    pub hi_norm: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::PRICE
    }
}

impl Normalizer {
    pub const PRICE: Normalizer = Normalizer::new(0., MAX_PRICE, LOW, HIGH);

    pub const fn new(lo: f64, hi: f64, lo_norm: f64, hi_norm: f64) -> Self {
        Self {
            lo,
            hi,
            lo_norm,
            hi_norm,
        }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        rescale(value, (self.lo, self.hi), (self.lo_norm, self.hi_norm))
    }

    pub fn denormalize(&self, normalized: f64) -> f64 {
        rescale(normalized, (self.lo_norm, self.hi_norm), (self.lo, self.hi))
    }
}

fn rescale(value: f64, (from_lo, from_hi): (f64, f64), (to_lo, to_hi): (f64, f64)) -> f64 {
    let span = from_hi - from_lo;
    if span == 0. || !span.is_finite() {
        return to_lo;
    }

    let ratio = (clip(value, from_lo, from_hi) - from_lo) / span;

    to_lo + ratio * (to_hi - to_lo)
}

/// Normalizes a price-like magnitude from `[0, MAX_PRICE]` into `[-1, 1]`
pub fn normalize(value: f64) -> f64 {
    Normalizer::PRICE.normalize(value)
}

/// Inverse of [`normalize`]
pub fn denormalize(normalized: f64) -> f64 {
    Normalizer::PRICE.denormalize(normalized)
}

/// Clamp that accepts bounds in either order and maps NaN to the smaller one
fn clip(value: f64, a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if value.is_nan() {
        return lo;
    }

    value.max(lo).min(hi)
}

/// Returns how many whole shares, and at what total cost, fit in `max` at `price`
pub fn round_to_stock(price: f64, max: f64) -> (f64, u64) {
    if !(price > 0.) || !price.is_finite() || !(max > 0.) {
        return (0., 0);
    }

    let quantity = (max / price).floor() as u64;

    (price * quantity as f64, quantity)
}

pub fn create_folder_if_not_exists(dir: impl AsRef<Path>) -> io::Result<()> {
    let dir = dir.as_ref();
    if dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir)
}
