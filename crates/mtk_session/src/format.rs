//! # Display Formatting
//!
//! Helpers the presentation layer uses for balances and addresses.

/// Formats a number with a `K` / `M` suffix past a thousand / million.
///
/// ```
/// use mtk_session::format::format_amount;
///
/// assert_eq!(format_amount(1_500.0, 2), "1.50K");
/// assert_eq!(format_amount(2_000_000.0, 1), "2.0M");
/// assert_eq!(format_amount(42.0, 0), "42");
/// ```
#[must_use]
pub fn format_amount(value: f64, decimals: usize) -> String {
    if value >= 1_000_000.0 {
        format!("{:.decimals$}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.decimals$}K", value / 1_000.0)
    } else {
        format!("{value:.decimals$}")
    }
}

/// Shortens an address to `0x1234...abcd`.
///
/// Returns the input unchanged if it is too short to shorten.
#[must_use]
pub fn format_address(address: &str, start: usize, end: usize) -> String {
    if address.len() < start + end {
        return address.to_owned();
    }
    match (address.get(..start), address.get(address.len() - end..)) {
        (Some(head), Some(tail)) => format!("{head}...{tail}"),
        _ => address.to_owned(),
    }
}

/// Formats mining efficiency as `"1.25 MTK/s"`.
#[must_use]
pub fn format_rate(coins_per_second: f64) -> String {
    format!("{coins_per_second:.2} MTK/s")
}
