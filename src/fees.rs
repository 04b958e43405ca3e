use cosmwasm_std::{coin, Addr, Coin, Storage, Uint128};

use crate::{
    error::ContractError,
    relayer::Relayer,
    state::{FEES_COLLECTED, FEE_REMAINDERS},
};

/// Credits one fee event to the relayer ledger. The fee plus whatever remainder
/// was carried for this denom is split evenly; the indivisible rest is persisted
/// and folded into the next fee event for the same denom.
pub fn accrue_relayer_fees(
    storage: &mut dyn Storage,
    relayers: &[Relayer],
    denom: &str,
    fee: Uint128,
) -> Result<(), ContractError> {
    let carried_remainder = FEE_REMAINDERS
        .may_load(storage, denom.to_owned())?
        .unwrap_or_default();

    let amount_to_split = fee.checked_add(carried_remainder)?;
    if amount_to_split.is_zero() {
        return Ok(());
    }

    let relayer_count = Uint128::new(relayers.len() as u128);
    let fee_per_relayer = amount_to_split.checked_div(relayer_count)?;
    let remainder = amount_to_split.checked_rem(relayer_count)?;

    if !fee_per_relayer.is_zero() {
        for relayer in relayers {
            let mut fees_collected = FEES_COLLECTED
                .may_load(storage, relayer.coreum_address.clone())?
                .unwrap_or_default();

            match fees_collected.iter_mut().find(|c| c.denom == denom) {
                Some(collected) => {
                    collected.amount = collected.amount.checked_add(fee_per_relayer)?
                }
                None => fees_collected.push(coin(fee_per_relayer.u128(), denom)),
            }

            FEES_COLLECTED.save(storage, relayer.coreum_address.clone(), &fees_collected)?;
        }
    }

    FEE_REMAINDERS.save(storage, denom.to_owned(), &remainder)?;

    Ok(())
}

/// Deducts the claimed coins from the sender's ledger. Claims are all or
/// nothing: one coin over the collected balance rejects the whole claim.
pub fn claim_fees(
    storage: &mut dyn Storage,
    sender: &Addr,
    amounts: &[Coin],
) -> Result<(), ContractError> {
    let mut fees_collected = FEES_COLLECTED
        .may_load(storage, sender.clone())?
        .unwrap_or_default();

    for claimed in amounts {
        let collected = fees_collected
            .iter_mut()
            .find(|c| c.denom == claimed.denom)
            .ok_or(ContractError::NotEnoughFeesToClaim {
                denom: claimed.denom.clone(),
            })?;

        collected.amount = collected.amount.checked_sub(claimed.amount).map_err(|_| {
            ContractError::NotEnoughFeesToClaim {
                denom: claimed.denom.clone(),
            }
        })?;
    }

    // Drop exhausted coins so later claims and queries don't iterate over them
    fees_collected.retain(|c| !c.amount.is_zero());
    FEES_COLLECTED.save(storage, sender.clone(), &fees_collected)?;

    Ok(())
}
