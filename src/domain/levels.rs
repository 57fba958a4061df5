//! Quarter price levels.
//!
//! A quarter level is a price that is an exact multiple of 25 increments
//! (0.25 for a 0.01 tick). Prices are truncated to 2 decimals and all
//! arithmetic is done in integer cents.

const TICKS_PER_QUARTER: i64 = 25;

/// Truncates toward zero at 2 decimals, tolerating representation error
/// just below an exact cent (0.29 * 100 = 28.999999999999996).
fn to_cents(price: f64) -> i64 {
    let scaled = price * 100.0;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < 1e-6 {
        nearest as i64
    } else {
        scaled.trunc() as i64
    }
}

/// Every quarter level in `[min, max]`, ascending.
///
/// Walks from `min` in steps of `increment`, so `min` must sit on the tick
/// grid for any level to be found. Increments below one cent yield nothing.
pub fn quarter_levels(min: f64, max: f64, increment: f64) -> Vec<f64> {
    let min_c = to_cents(min);
    let max_c = to_cents(max);
    let step = to_cents(increment);
    if step <= 0 || min_c > max_c {
        return Vec::new();
    }
    let quarter = step * TICKS_PER_QUARTER;

    (min_c..=max_c)
        .step_by(step as usize)
        .filter(|cents| cents.rem_euclid(quarter) == 0)
        .map(|cents| cents as f64 / 100.0)
        .collect()
}

/// The quarter level inside `[min, max]` closest to `price`.
pub fn nearest_quarter_level(min: f64, max: f64, increment: f64, price: f64) -> Option<f64> {
    quarter_levels(min, max, increment)
        .into_iter()
        .min_by(|a, b| (a - price).abs().total_cmp(&(b - price).abs()))
}
