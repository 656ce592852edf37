//! Numeric Normalization
//!
//! Exact conversion between human-readable decimal strings and integer base
//! units, and the inverse display formatting. Everything is done on decimal
//! digit strings and `BigInt`; no floating point is involved.
//!
//! Conversions truncate and never round: `to_base_units("1.239", 2)` is `123`.
//! The only rounding is in the `M` abbreviation, which shows two decimals
//! rounded half-up.

use num_bigint::{BigInt, Sign};
use std::str::FromStr;

use crate::error::{FlowError, FlowResult};

/// Options for [`to_display_string`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Appended after a space, e.g. `"1.23 USDC"`
    pub symbol: Option<String>,
    /// Digits after the decimal point. `None` shows two digits past the first
    /// significant one.
    pub precision: Option<i64>,
    /// Insert thousands separators in the integer part
    pub commify: bool,
    /// Abbreviate 7 to 9 digit integer parts to millions (`"1.34M"`)
    pub short: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            symbol: None,
            precision: None,
            commify: false,
            short: true,
        }
    }
}

/// Returns `10^exp`.
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

/// Largest uint256 value, used for unlimited repayments.
pub fn max_uint256() -> BigInt {
    BigInt::from(2u32).pow(256) - BigInt::from(1u32)
}

pub fn is_positive(value: &BigInt) -> bool {
    value.sign() == Sign::Plus
}

fn all_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

/// Converts a decimal string into integer base units.
///
/// Accepts an optional sign and an optional fractional part (`".5"` and `"5."`
/// are valid). Fraction digits beyond `decimals` are dropped before scaling.
///
/// # Returns
///
/// * `Ok(BigInt)` - `amount * 10^decimals`, truncated
/// * `Err(FlowError::InvalidAmount)` - Empty or non-numeric input
pub fn to_base_units(amount: &str, decimals: u32) -> FlowResult<BigInt> {
    let trimmed = amount.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(FlowError::InvalidAmount(format!("'{}' is not a number", amount)));
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(FlowError::InvalidAmount(format!("'{}' is not a number", amount)));
    }

    let kept = &frac_part[..frac_part.len().min(decimals as usize)];
    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(decimals as usize - kept.len()));
    if digits.is_empty() {
        digits.push('0');
    }

    let value = BigInt::from_str(&digits)
        .map_err(|e| FlowError::InvalidAmount(format!("'{}': {}", amount, e)))?;
    Ok(if negative { -value } else { value })
}

/// Parses an integer base-unit string as returned by chain queries.
pub fn parse_base_units(value: &str) -> FlowResult<BigInt> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains('.') {
        return Err(FlowError::InvalidAmount(format!(
            "'{}' is not an integer amount",
            value
        )));
    }
    BigInt::from_str(trimmed)
        .map_err(|_| FlowError::InvalidAmount(format!("'{}' is not an integer amount", value)))
}

/// Splits a positive base-unit value into integer and fractional digit strings
/// of `value / 10^decimals`. Trailing fractional zeros are removed.
fn split_units(value: &BigInt, decimals: u32) -> (String, String) {
    let digits = value.magnitude().to_string();
    let decimals = decimals as usize;
    let (int_part, frac_part) = if digits.len() > decimals {
        let (i, f) = digits.split_at(digits.len() - decimals);
        (i.to_string(), f.to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };
    (int_part, frac_part.trim_end_matches('0').to_string())
}

/// floor(log10(x)) for a positive value given as integer and fraction digits.
fn floor_log10(int_part: &str, frac_part: &str) -> i64 {
    if int_part != "0" {
        int_part.len() as i64 - 1
    } else {
        let leading_zeros = frac_part.bytes().take_while(|b| *b == b'0').count();
        -(leading_zeros as i64) - 1
    }
}

/// Formats base units for display.
///
/// Returns `"0"` for zero and negative input. Precision defaults to two
/// digits past the first significant digit and is clamped to `[0, decimals]`.
///
/// # Arguments
///
/// * `amount` - Value in base units
/// * `decimals` - Token decimals
/// * `options` - Formatting options
pub fn to_display_string(amount: &BigInt, decimals: u32, options: &DisplayOptions) -> String {
    if !is_positive(amount) {
        return "0".to_string();
    }

    let (int_part, frac_part) = split_units(amount, decimals);
    let truncate_at = options
        .precision
        .unwrap_or_else(|| 2 - floor_log10(&int_part, &frac_part))
        .clamp(0, decimals as i64) as usize;

    let truncated = if frac_part.is_empty() || truncate_at == 0 {
        int_part
    } else {
        format!(
            "{}.{}",
            int_part,
            &frac_part[..frac_part.len().min(truncate_at)]
        )
    };

    let (final_amount, suffix) = if options.short {
        abbreviate(&truncated)
    } else {
        (truncated, "")
    };

    let mut out = if options.commify {
        commify(&final_amount)
    } else {
        final_amount
    };
    out.push_str(suffix);
    if let Some(symbol) = &options.symbol {
        out.push(' ');
        out.push_str(symbol);
    }
    out
}

/// Abbreviates millions. Integer parts of 10 or more digits are returned as is.
fn abbreviate(amount: &str) -> (String, &'static str) {
    let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount, ""));

    // digit count of the half-up rounded integer value
    let mut rounded = BigInt::from_str(int_part).unwrap_or_default();
    if frac_part.as_bytes().first().is_some_and(|d| *d >= b'5') {
        rounded += 1;
    }
    let digits = rounded.to_string().len();

    if digits > 6 && digits < 10 {
        let scale = frac_part.len() as u32;
        let all_digits = format!("{}{}", int_part, frac_part);
        let value = BigInt::from_str(&all_digits).unwrap_or_default();
        // value / 10^(6 + scale), kept to 2 decimals, rounded half-up
        let divisor = pow10(6 + scale) * 2;
        let cents: BigInt = (value * 200 + pow10(6 + scale)) / divisor;
        let hundred = BigInt::from(100u32);
        let whole = &cents / &hundred;
        let rem = (&cents % &hundred).to_string();
        return (format!("{}.{:0>2}", whole, rem), "M");
    }

    (amount.to_string(), "")
}

/// Inserts thousands separators into the integer part only.
fn commify(amount: &str) -> String {
    let (int_part, rest) = match amount.find('.') {
        Some(idx) => amount.split_at(idx),
        None => (amount, ""),
    };
    let mut out = String::with_capacity(amount.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push_str(rest);
    out
}
