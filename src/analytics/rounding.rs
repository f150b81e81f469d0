/// Decimal places used for percentages and per-option averages.
pub const SHARE_DECIMALS: u32 = 1;
/// Decimal places used for numeric summaries (average, median, standard deviation).
pub const SUMMARY_DECIMALS: u32 = 2;

/// Rounds `value` to `decimals` places, halves away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Collapse -0.0 so serialized output never shows a signed zero.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// `numerator / denominator` rounded to `decimals`, or 0 when there is nothing to divide by.
pub fn ratio(numerator: f64, denominator: usize, decimals: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round_to(numerator / denominator as f64, decimals)
}

/// Share of `count` in `total` as a percentage, rounded to [`SHARE_DECIMALS`].
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(count as f64 / total as f64 * 100.0, SHARE_DECIMALS)
}
