//! Seeding credit calculation.
//!
//! Credit grows linearly with the transferred volume and the configured
//! multiplier, and with the square root of the session duration. Sub-linear
//! growth in time keeps an idle-but-connected session from accruing
//! unbounded credit while still rewarding sustained seeding over bursts.

/// Calibration constant for the credit curve. A one-year session that moved
/// 10 GB at multiplier 2 accrues 219.03531322574617 credits.
const CREDIT_SCALE: f64 = 0.117_012_454_504_228_27;

/// Computes the credit accrued by a seeding session.
///
/// `seconds` is the elapsed session time, `bytes` the transferred volume and
/// `multiplier` the per-deployment reward factor. Returns `0.0` whenever any
/// input is zero or the multiplier is not positive. The function is pure and
/// deterministic; rounding for user-facing totals happens at the persistence
/// boundary via [`round_plus`].
pub fn calculate_bonus(seconds: u64, bytes: u64, multiplier: f64) -> f64 {
    if seconds == 0 || bytes == 0 || multiplier <= 0.0 {
        return 0.0;
    }
    let hours = seconds as f64 / 3600.0;
    let gigabytes = bytes as f64 / 1_000_000_000.0;
    multiplier * gigabytes * hours.sqrt() * CREDIT_SCALE
}

/// Rounds `value` to `places` decimal places. Exact halves round up,
/// toward positive infinity.
pub fn round_plus(value: f64, places: i32) -> f64 {
    let shift = 10f64.powi(places);
    (value * shift + 0.5).floor() / shift
}

/// Produces a human readable representation of an SI size.
///
/// `human_bytes(82854982)` -> `"83MB"`
pub fn human_bytes(size: u64) -> String {
    const SIZES: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];
    if size < 10 {
        return format!("{size}B");
    }
    let exponent = (size as f64).log(1000.0).floor();
    let suffix = SIZES[exponent as usize];
    let value = ((size as f64 / 1000f64.powf(exponent)) * 10.0 + 0.5).floor() / 10.0;
    if value < 10.0 {
        format!("{value:.1}{suffix}")
    } else {
        format!("{value:.0}{suffix}")
    }
}
