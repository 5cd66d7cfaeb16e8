//! Indian-numbering currency formatting.
//!
//! The rightmost three digits form one group; everything to the left is
//! grouped in pairs (lakhs, crores). Always two decimal places, sign
//! before the currency symbol.

use rust_decimal::Decimal;

use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// Format a value as Indian Rupees: `6797258.49` -> `"₹67,97,258.49"`,
/// `-1234.5` -> `"-₹1,234.50"`. Total function; zero formats as `"₹0.00"`.
pub fn format_inr(value: Decimal) -> String {
    let negative = value.is_sign_negative() && !value.is_zero();
    let rounded = value.abs().round_dp(DISPLAY_DECIMAL_PRECISION);

    let text = rounded.to_string();
    let (integer_part, fraction_part) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (text.as_str(), ""),
    };

    let mut fraction = fraction_part.to_string();
    fraction.truncate(DISPLAY_DECIMAL_PRECISION as usize);
    while fraction.len() < DISPLAY_DECIMAL_PRECISION as usize {
        fraction.push('0');
    }

    format!(
        "{}₹{}.{}",
        if negative { "-" } else { "" },
        group_indian(integer_part),
        fraction
    )
}

/// Group an unsigned digit string Indian-style: last three digits, then
/// pairs leftward.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (mut remaining, last_three) = digits.split_at(digits.len() - 3);
    let mut groups = vec![last_three.to_string()];
    while remaining.len() > 2 {
        let (head, pair) = remaining.split_at(remaining.len() - 2);
        groups.push(pair.to_string());
        remaining = head;
    }
    if !remaining.is_empty() {
        groups.push(remaining.to_string());
    }

    groups.reverse();
    groups.join(",")
}
