use std::cmp::Ordering;

use cosmwasm_std::Uint128;

use crate::error::ContractError;

// XRPL issued amounts are serialized with a decimal mantissa of at most 17 digits
pub const MAX_XRPL_AMOUNT_DIGITS: u32 = 17;

pub const MIN_SENDING_PRECISION: i32 = -15;
pub const MAX_SENDING_PRECISION: i32 = 15;

fn ten_pow(exponent: u32) -> Result<Uint128, ContractError> {
    Uint128::new(10)
        .checked_pow(exponent)
        .map_err(ContractError::Overflow)
}

/// Truncates an amount toward zero so that it keeps at most `sending_precision`
/// fractional digits of a token with `decimals` decimals. Returns the truncated
/// amount together with the residue that was cut off.
///
/// Example: sending_precision = 2, decimals = 15 keeps the amount a multiple of 10^13.
pub fn truncate_amount(
    sending_precision: i32,
    decimals: u32,
    amount: Uint128,
) -> Result<(Uint128, Uint128), ContractError> {
    let exponent = decimals as i32 - sending_precision;
    // A sending precision covering every decimal keeps the amount untouched
    if exponent <= 0 {
        return Ok((amount, Uint128::zero()));
    }

    let truncation_unit = ten_pow(exponent as u32)?;
    let residue = amount.checked_rem(truncation_unit)?;
    let truncated_amount = amount.checked_sub(residue)?;

    if truncated_amount.is_zero() {
        return Err(ContractError::AmountSentIsZeroAfterTruncation {});
    }

    Ok((truncated_amount, residue))
}

/// Rescales an amount between two decimal conventions. Scaling down divides with
/// truncation toward zero.
pub fn convert_amount_decimals(
    from_decimals: u32,
    to_decimals: u32,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    let converted_amount = match from_decimals.cmp(&to_decimals) {
        Ordering::Less => amount.checked_mul(ten_pow(to_decimals - from_decimals)?)?,
        Ordering::Greater => amount.checked_div(ten_pow(from_decimals - to_decimals)?)?,
        Ordering::Equal => amount,
    };

    if converted_amount.is_zero() {
        return Err(ContractError::AmountSentIsZeroAfterTruncation {});
    }

    Ok(converted_amount)
}

/// Conversion first, truncation second. Used for inbound transfers, where the
/// residue must land in the target denomination to stay representable.
pub fn convert_and_truncate_amount(
    sending_precision: i32,
    from_decimals: u32,
    to_decimals: u32,
    amount: Uint128,
) -> Result<(Uint128, Uint128), ContractError> {
    let converted_amount = convert_amount_decimals(from_decimals, to_decimals, amount)?;
    truncate_amount(sending_precision, to_decimals, converted_amount)
}

pub fn amount_after_bridge_fees(
    amount: Uint128,
    bridging_fee: Uint128,
) -> Result<Uint128, ContractError> {
    if bridging_fee >= amount {
        return Err(ContractError::CannotCoverBridgingFees {});
    }

    Ok(amount.checked_sub(bridging_fee)?)
}

pub fn validate_sending_precision(
    sending_precision: i32,
    decimals: u32,
) -> Result<(), ContractError> {
    if sending_precision < MIN_SENDING_PRECISION || sending_precision > MAX_SENDING_PRECISION {
        return Err(ContractError::InvalidSendingPrecision {});
    }

    if sending_precision > decimals as i32 {
        return Err(ContractError::InvalidSendingPrecision {});
    }

    Ok(())
}

/// Amounts delivered to XRPL must fit in the XRPL issued amount mantissa.
pub fn validate_xrpl_amount(amount: Uint128) -> Result<(), ContractError> {
    let mut mantissa = amount.u128();
    while mantissa != 0 && mantissa % 10 == 0 {
        mantissa /= 10;
    }

    if mantissa >= 10u128.pow(MAX_XRPL_AMOUNT_DIGITS) {
        return Err(ContractError::InvalidXRPLAmount {});
    }

    Ok(())
}
