//! Decimal rounding helpers
//!
//! All helpers scale by `10^decimals`, apply the rounding operation and
//! scale back, matching how the solver and the reports round values.

fn scale(decimals: u32) -> f64 {
    10f64.powi(decimals as i32)
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = scale(decimals);
    (value * factor).round() / factor
}

/// Round toward negative infinity to `decimals` places
pub fn floor_to(value: f64, decimals: u32) -> f64 {
    let factor = scale(decimals);
    (value * factor).floor() / factor
}

/// Round toward positive infinity to `decimals` places
pub fn ceil_to(value: f64, decimals: u32) -> f64 {
    let factor = scale(decimals);
    (value * factor).ceil() / factor
}
