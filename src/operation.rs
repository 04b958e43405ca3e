use coreum_wasm_sdk::{assetft, core::CoreumMsg};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{coin, Addr, Coin, CosmosMsg, Response, Storage, Uint128};

use crate::{
    amount::convert_amount_decimals,
    contract::XRPL_TOKENS_DECIMALS,
    error::ContractError,
    evidence::{OperationResult, TransactionResult},
    fees::accrue_relayer_fees,
    relayer::{handle_rotate_keys_confirmation, Relayer},
    signatures::Signature,
    state::{
        BridgeState, Config, PendingRefund, TokenState, CONFIG, COREUM_TOKENS, PENDING_OPERATIONS,
        PENDING_REFUNDS, PENDING_ROTATE_KEYS, PENDING_TICKET_UPDATE, REFUND_COUNTER, XRPL_TOKENS,
    },
    tickets::{handle_ticket_allocation_confirmation, return_ticket},
    token::build_xrpl_token_key,
};

#[cw_serde]
pub struct Operation {
    // Bumped every time the XRPL base fee changes so that relayers know their
    // signatures over the old fee are void
    pub version: u64,
    pub ticket_sequence: Option<u64>,
    pub account_sequence: Option<u64>,
    pub signatures: Vec<Signature>,
    pub operation_type: OperationType,
    // Snapshot of the base fee this operation must be signed against
    pub xrpl_base_fee: u64,
}

#[cw_serde]
pub enum OperationType {
    AllocateTickets {
        number: u32,
    },
    TrustSet {
        issuer: String,
        currency: String,
        trust_set_limit_amount: Uint128,
    },
    RotateKeys {
        new_relayers: Vec<Relayer>,
        new_evidence_threshold: u32,
    },
    #[serde(rename = "coreum_to_xrpl_transfer")]
    CoreumToXRPLTransfer {
        issuer: String,
        currency: String,
        // Amount to deliver and delivery cap, both in XRPL terms
        amount: Uint128,
        max_amount: Option<Uint128>,
        // The exact coin escrowed by the sender. Refunded whole on failure,
        // split into delivery and fees on acceptance.
        funds: Coin,
        sender: Addr,
        recipient: String,
    },
}

// For responses
impl OperationType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllocateTickets { .. } => "allocate_tickets",
            Self::TrustSet { .. } => "trust_set",
            Self::RotateKeys { .. } => "rotate_keys",
            Self::CoreumToXRPLTransfer { .. } => "coreum_to_xrpl_transfer",
        }
    }
}

pub fn check_operation_exists(
    storage: &dyn Storage,
    operation_sequence: u64,
) -> Result<Operation, ContractError> {
    let operation = PENDING_OPERATIONS
        .load(storage, operation_sequence)
        .map_err(|_| ContractError::PendingOperationNotFound {})?;

    Ok(operation)
}

pub fn create_pending_operation(
    storage: &mut dyn Storage,
    ticket_sequence: Option<u64>,
    account_sequence: Option<u64>,
    operation_type: OperationType,
) -> Result<(), ContractError> {
    let config = CONFIG.load(storage)?;

    // If the bridge is halted we prohibit all operation creations except allowed ones
    check_valid_operation_if_halt(storage, &config, &operation_type)?;

    let operation_sequence = ticket_sequence.unwrap_or_else(|| account_sequence.unwrap());

    if PENDING_OPERATIONS.has(storage, operation_sequence) {
        return Err(ContractError::PendingOperationAlreadyExists {});
    }

    let operation = Operation {
        // Operations are initially created with version 1
        version: 1,
        ticket_sequence,
        account_sequence,
        signatures: vec![],
        operation_type,
        xrpl_base_fee: config.xrpl_base_fee,
    };

    PENDING_OPERATIONS.save(storage, operation_sequence, &operation)?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_operation(
    storage: &mut dyn Storage,
    operation: &Operation,
    operation_result: &Option<OperationResult>,
    transaction_result: &TransactionResult,
    tx_hash: &Option<String>,
    operation_sequence: u64,
    response: &mut Response<CoreumMsg>,
) -> Result<(), ContractError> {
    // Only ticket allocations deliver an operation result payload
    if operation_result.is_some()
        && !matches!(operation.operation_type, OperationType::AllocateTickets { .. })
    {
        return Err(ContractError::InvalidOperationResult {});
    }

    match &operation.operation_type {
        OperationType::AllocateTickets { .. } => match operation_result {
            Some(OperationResult::TicketsAllocation { tickets }) => {
                handle_ticket_allocation_confirmation(storage, tickets.clone(), transaction_result)?;
            }
            None => return Err(ContractError::InvalidOperationResult {}),
        },
        OperationType::TrustSet {
            issuer, currency, ..
        } => {
            handle_trust_set_confirmation(storage, issuer, currency, transaction_result)?;
        }
        OperationType::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        } => {
            handle_rotate_keys_confirmation(
                storage,
                new_relayers.to_owned(),
                new_evidence_threshold.to_owned(),
                transaction_result,
            )?;
        }
        OperationType::CoreumToXRPLTransfer { .. } => {
            handle_coreum_to_xrpl_transfer_confirmation(
                storage,
                transaction_result,
                tx_hash.clone(),
                operation,
                response,
            )?;
        }
    }

    // Operation is removed because it was confirmed
    PENDING_OPERATIONS.remove(storage, operation_sequence);

    // If an operation was invalid, the ticket was never consumed on XRPL,
    // so it goes back into the pool
    if transaction_result.eq(&TransactionResult::Invalid) {
        if let Some(ticket_sequence) = operation.ticket_sequence {
            return_ticket(storage, ticket_sequence)?;
        }
    }

    Ok(())
}

pub fn handle_trust_set_confirmation(
    storage: &mut dyn Storage,
    issuer: &str,
    currency: &str,
    transaction_result: &TransactionResult,
) -> Result<(), ContractError> {
    let key = build_xrpl_token_key(issuer, currency);

    let mut token = XRPL_TOKENS
        .load(storage, key.clone())
        .map_err(|_| ContractError::TokenNotRegistered {})?;

    // The token is ready for bridging only once the trust line exists
    if transaction_result.eq(&TransactionResult::Accepted) {
        token.state = TokenState::Enabled;
    } else {
        token.state = TokenState::Inactive;
    }

    XRPL_TOKENS.save(storage, key, &token)?;
    Ok(())
}

fn handle_coreum_to_xrpl_transfer_confirmation(
    storage: &mut dyn Storage,
    transaction_result: &TransactionResult,
    tx_hash: Option<String>,
    operation: &Operation,
    response: &mut Response<CoreumMsg>,
) -> Result<(), ContractError> {
    let OperationType::CoreumToXRPLTransfer {
        issuer,
        currency,
        amount,
        max_amount,
        funds,
        sender,
        ..
    } = &operation.operation_type
    else {
        // Relayers sent a transfer result for a different operation type
        return Err(ContractError::InvalidOperationResult {});
    };

    if transaction_result.ne(&TransactionResult::Accepted) {
        // Failed delivery refunds the exact coin the sender escrowed, fees included
        let cause = match transaction_result {
            TransactionResult::Invalid => "invalid",
            _ => "rejected",
        };
        store_pending_refund(storage, cause, tx_hash, sender.clone(), funds.clone())?;
        return Ok(());
    }

    let config = CONFIG.load(storage)?;
    // For XRP there is no delivery cap, the delivered amount is the sent amount
    let amount_delivered = max_amount.unwrap_or(*amount);

    let key = build_xrpl_token_key(issuer, currency);
    match XRPL_TOKENS.may_load(storage, key)? {
        Some(xrpl_token) => {
            // Confirmed delivery of an XRPL originated token burns the bridged
            // amount; the fee part of the escrow is credited to the relayers
            let burn_msg = CosmosMsg::from(CoreumMsg::AssetFT(assetft::Msg::Burn {
                coin: coin(amount_delivered.u128(), xrpl_token.coreum_denom),
            }));
            *response = response.to_owned().add_message(burn_msg);

            let fee_collected = funds.amount.checked_sub(amount_delivered)?;
            accrue_relayer_fees(storage, &config.relayers, &funds.denom, fee_collected)?;
        }
        None => {
            match COREUM_TOKENS
                .idx
                .xrpl_currency
                .item(storage, currency.to_owned())?
                .map(|(_, ct)| ct)
            {
                Some(token) => {
                    // Coreum originated tokens stay escrowed while they live on
                    // XRPL; only the fee part of the escrow moves on
                    let delivered_on_coreum = convert_amount_decimals(
                        XRPL_TOKENS_DECIMALS,
                        token.decimals,
                        amount_delivered,
                    )?;
                    let fee_collected = funds.amount.checked_sub(delivered_on_coreum)?;
                    accrue_relayer_fees(storage, &config.relayers, &funds.denom, fee_collected)?;
                }
                // Can only happen if relayers misbehave: a transfer operation is
                // never created for an unregistered token
                None => return Err(ContractError::TokenNotRegistered {}),
            }
        }
    }

    Ok(())
}

/// Cancellation by the owner. Releases the ticket, unwinds the side state of the
/// cancelled operation and refunds escrowed transfers.
pub fn cancel_operation(
    storage: &mut dyn Storage,
    operation_sequence: u64,
    operation: Operation,
) -> Result<(), ContractError> {
    match &operation.operation_type {
        OperationType::AllocateTickets { .. } => {
            PENDING_TICKET_UPDATE.save(storage, &false)?;
        }
        OperationType::TrustSet {
            issuer, currency, ..
        } => {
            handle_trust_set_confirmation(storage, issuer, currency, &TransactionResult::Rejected)?;
        }
        OperationType::CoreumToXRPLTransfer { funds, sender, .. } => {
            store_pending_refund(storage, "cancelled", None, sender.clone(), funds.clone())?;
        }
        OperationType::RotateKeys { .. } => {
            PENDING_ROTATE_KEYS.save(storage, &false)?;
        }
    }

    PENDING_OPERATIONS.remove(storage, operation_sequence);

    if let Some(ticket_sequence) = operation.ticket_sequence {
        return_ticket(storage, ticket_sequence)?;
    }

    Ok(())
}

pub fn store_pending_refund(
    storage: &mut dyn Storage,
    cause: &str,
    xrpl_tx_hash: Option<String>,
    receiver: Addr,
    coin: Coin,
) -> Result<(), ContractError> {
    // Refund ids come from a monotone counter tagged with the creation cause so
    // that they are reproducible and unique even when sequences are reused
    let counter = REFUND_COUNTER.load(storage)? + 1;
    REFUND_COUNTER.save(storage, &counter)?;
    let pending_refund_id = format!("{counter}-{cause}");

    let pending_refund = PendingRefund {
        id: pending_refund_id.clone(),
        xrpl_tx_hash,
        coin,
    };

    PENDING_REFUNDS.save(storage, (receiver, pending_refund_id), &pending_refund)?;

    Ok(())
}

pub fn remove_pending_refund(
    storage: &mut dyn Storage,
    sender: &Addr,
    pending_refund_id: String,
) -> Result<Coin, ContractError> {
    let pending_refund = PENDING_REFUNDS
        .load(storage, (sender.clone(), pending_refund_id.clone()))
        .map_err(|_| ContractError::PendingRefundNotFound {})?;

    PENDING_REFUNDS.remove(storage, (sender.clone(), pending_refund_id));

    Ok(pending_refund.coin)
}

pub fn check_valid_operation_if_halt(
    storage: &dyn Storage,
    config: &Config,
    operation_type: &OperationType,
) -> Result<(), ContractError> {
    if config.bridge_state.eq(&BridgeState::Halted) {
        match &operation_type {
            // Only the pending key rotation and ticket allocations may progress
            // while the bridge is halted
            OperationType::RotateKeys { .. } => {
                if !PENDING_ROTATE_KEYS.load(storage)? {
                    return Err(ContractError::BridgeHalted {});
                }
            }
            OperationType::AllocateTickets { .. } => (),
            _ => return Err(ContractError::BridgeHalted {}),
        }
    }

    Ok(())
}
