use cosmwasm_std::Uint128;

use crate::{
    amount::validate_sending_precision,
    contract::{COREUM_CURRENCY_PREFIX, XRPL_DENOM_PREFIX, XRP_CURRENCY, XRP_ISSUER},
    error::ContractError,
    evidence::hash_bytes,
    state::TokenState,
};

// Issuer+currency is the key we use to find an XRPL token
pub fn build_xrpl_token_key(issuer: &str, currency: &str) -> String {
    let mut key = issuer.to_owned();
    key.push_str(currency);
    key
}

// Helper to distinguish the XRP token from the rest of XRPL originated tokens
pub fn is_token_xrp(issuer: &str, currency: &str) -> bool {
    issuer == XRP_ISSUER && currency == XRP_CURRENCY
}

/// Prefix of the Coreum denom assigned to a newly registered XRPL token. Derived
/// from a monotone counter in base36 so that every replica mints the same denom.
/// The XRP subunit (`drop`) is assigned separately at instantiation.
pub fn build_xrpl_denom_prefix(counter: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut encoded = vec![];
    let mut remainder = counter;
    loop {
        encoded.push(ALPHABET[(remainder % 36) as usize] as char);
        remainder /= 36;
        if remainder == 0 {
            break;
        }
    }

    let mut prefix = XRPL_DENOM_PREFIX.to_owned();
    prefix.extend(encoded.iter().rev());
    prefix
}

/// XRPL currency assigned to a registered Coreum token: a fixed prefix plus the
/// start of the denom hash. Pure function of the denom, reproducible across replicas.
pub fn build_xrpl_currency_for_denom(denom: &str) -> String {
    let hex_string = hash_bytes(denom.as_bytes());
    format!("{}{}", COREUM_CURRENCY_PREFIX, &hex_string[..10])
}

/// Registered XRPL currencies must use the standard 3 character format or the 40
/// character hex format. The standard XRP code is reserved for XRP itself.
pub fn validate_xrpl_currency(currency: &str) -> Result<(), ContractError> {
    match currency.len() {
        3 => {
            if currency == XRP_CURRENCY {
                return Err(ContractError::InvalidXRPLCurrency {});
            }
            if !currency
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "?!@#$%^&*<>(){}[]|".contains(c))
            {
                return Err(ContractError::InvalidXRPLCurrency {});
            }
            Ok(())
        }
        40 => {
            if !currency.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ContractError::InvalidXRPLCurrency {});
            }
            Ok(())
        }
        _ => Err(ContractError::InvalidXRPLCurrency {}),
    }
}

pub fn validate_coreum_denom(denom: &str) -> Result<(), ContractError> {
    if !(3..=128).contains(&denom.len()) {
        return Err(ContractError::InvalidDenom {});
    }

    let mut chars = denom.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(ContractError::InvalidDenom {});
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c)) {
        return Err(ContractError::InvalidDenom {});
    }

    Ok(())
}

// Helper function to update the state of a token. Only active states can be set
// by the owner; Processing and Inactive are driven by TrustSet confirmations.
pub fn set_token_state(
    state: &mut TokenState,
    target_state: Option<TokenState>,
) -> Result<(), ContractError> {
    if let Some(target_state) = target_state {
        if (*state).eq(&TokenState::Inactive) || (*state).eq(&TokenState::Processing) {
            return Err(ContractError::TokenStateIsImmutable {});
        }
        if target_state.eq(&TokenState::Inactive) || target_state.eq(&TokenState::Processing) {
            return Err(ContractError::InvalidTargetTokenState {});
        }

        *state = target_state;
    }

    Ok(())
}

// Helper function to update the sending precision of a token
pub fn set_token_sending_precision(
    sending_precision: &mut i32,
    target_sending_precision: Option<i32>,
    decimals: u32,
) -> Result<(), ContractError> {
    if let Some(target_sending_precision) = target_sending_precision {
        validate_sending_precision(target_sending_precision, decimals)?;

        *sending_precision = target_sending_precision;
    }

    Ok(())
}

// Helper function to update the bridging fee of a token
pub fn set_token_bridging_fee(
    bridging_fee: &mut Uint128,
    target_bridging_fee: Option<Uint128>,
) -> Result<(), ContractError> {
    if let Some(target_bridging_fee) = target_bridging_fee {
        *bridging_fee = target_bridging_fee;
    }

    Ok(())
}

// Helper function to update the max holding amount of a token
pub fn set_token_max_holding_amount(
    current_bridged_amount: Uint128,
    max_holding_amount: &mut Uint128,
    target_max_holding_amount: Option<Uint128>,
) -> Result<(), ContractError> {
    if let Some(target_max_holding_amount) = target_max_holding_amount {
        // The cap can never go below what the bridge already holds
        if current_bridged_amount > target_max_holding_amount {
            return Err(ContractError::InvalidTargetMaxHoldingAmount {});
        }

        *max_holding_amount = target_max_holding_amount;
    }

    Ok(())
}
