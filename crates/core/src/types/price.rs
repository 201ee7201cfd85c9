//! Amount helpers using decimal arithmetic.
//!
//! Totals are truncated to whole cents (kobo) with a floor, never rounded:
//! the multiply/floor/divide sequence keeps displayed totals identical to
//! what customers have always seen.

use rust_decimal::Decimal;

/// Floor an amount to two decimal places.
///
/// ```
/// use rust_decimal::Decimal;
/// use vtu_dashboard_core::floor_to_cents;
///
/// // 19.999 * 3 = 59.997 -> 59.99
/// assert_eq!(floor_to_cents(Decimal::new(59_997, 3)), Decimal::new(5_999, 2));
/// ```
#[must_use]
pub fn floor_to_cents(amount: Decimal) -> Decimal {
    (amount.saturating_mul(Decimal::ONE_HUNDRED)).floor() / Decimal::ONE_HUNDRED
}

/// Format an amount for display with a currency symbol and thousands
/// separators, e.g. `₦12,500.00`.
#[must_use]
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{symbol}{grouped}.{fraction}")
}
