/// Elementary Unit Conversion
///
/// Nodes report UTXO values as decimal coin amounts ("10000.00000000").
/// Summaries carry integer elementary units (satoshis, koinu, drops...).
/// The conversion is done on the decimal text so no precision is lost;
/// `serde_json` is built with `arbitrary_precision` so numeric JSON values
/// keep their original digits.

use num_bigint::BigInt;
use num_traits::Zero;
use serde_json::Value;

use crate::error::{Result, SummaryError};

/// Largest power of ten an amount may be shifted by beyond its own digit count
const MAX_SCALE_SLACK: i64 = 128;

/// Convert a decimal string into elementary units scaled by `10^decimals`
///
/// Accepts an optional sign, an optional fractional part and an optional
/// exponent (`1e-8`). Fractional digits beyond `decimals` are rejected
/// unless they are zeros.
pub fn to_elementary_units(value: &str, decimals: u32) -> Result<BigInt> {
    let text = value.trim();
    let invalid = || SummaryError::InvalidAmount(value.to_string());

    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        Some(_) => (false, text),
        None => return Err(invalid()),
    };

    let (mantissa, exponent) = match unsigned.find(|c| c == 'e' || c == 'E') {
        Some(pos) => {
            let exp: i64 = unsigned[pos + 1..].parse().map_err(|_| invalid())?;
            (&unsigned[..pos], exp)
        }
        None => (unsigned, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut digits = String::with_capacity(int_part.len() + frac_part.len());
    digits.push_str(int_part);
    digits.push_str(frac_part);

    // Power of ten still to apply once the decimal point is removed
    let scale = i64::from(decimals)
        .checked_add(exponent)
        .and_then(|s| s.checked_sub(i64::try_from(frac_part.len()).ok()?))
        .ok_or_else(invalid)?;
    let bound = i64::try_from(digits.len()).map_err(|_| invalid())? + MAX_SCALE_SLACK;
    if scale.checked_abs().map_or(true, |s| s > bound) {
        return Err(invalid());
    }

    let magnitude = if scale >= 0 {
        let base: BigInt = digits.parse().map_err(|_| invalid())?;
        let power = u32::try_from(scale).map_err(|_| invalid())?;
        base * BigInt::from(10u32).pow(power)
    } else {
        let cut = (-scale) as usize;
        if cut > digits.len() {
            if digits.bytes().all(|b| b == b'0') {
                BigInt::zero()
            } else {
                return Err(SummaryError::AmountPrecision {
                    value: value.to_string(),
                    decimals,
                });
            }
        } else {
            let (kept, dropped) = digits.split_at(digits.len() - cut);
            if !dropped.bytes().all(|b| b == b'0') {
                return Err(SummaryError::AmountPrecision {
                    value: value.to_string(),
                    decimals,
                });
            }
            if kept.is_empty() {
                BigInt::zero()
            } else {
                kept.parse().map_err(|_| invalid())?
            }
        }
    };

    Ok(if negative { -magnitude } else { magnitude })
}

/// Convert a JSON number or numeric string into elementary units
pub fn json_to_elementary_units(value: &Value, decimals: u32) -> Result<BigInt> {
    match value {
        Value::Number(n) => to_elementary_units(&n.to_string(), decimals),
        Value::String(s) => to_elementary_units(s, decimals),
        other => Err(SummaryError::InvalidAmount(other.to_string())),
    }
}

/// Parse an integer amount that is already in elementary units
///
/// Ledger and account chains report drops/microunits as integers or
/// integer strings.
pub fn json_to_integer_amount(value: &Value) -> Result<BigInt> {
    json_to_elementary_units(value, 0)
}
