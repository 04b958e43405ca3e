use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Storage};

use crate::{
    error::ContractError,
    operation::check_valid_operation_if_halt,
    state::{CONFIG, PENDING_OPERATIONS},
};

// Hex encoded DER signatures stay well below this bound
pub const MAX_SIGNATURE_LENGTH: usize = 200;

#[cw_serde]
pub struct Signature {
    pub relayer_coreum_address: Addr,
    pub signature: String,
}

pub fn add_signature(
    storage: &mut dyn Storage,
    operation_id: u64,
    operation_version: u64,
    sender: Addr,
    signature: String,
) -> Result<(), ContractError> {
    if signature.len() > MAX_SIGNATURE_LENGTH {
        return Err(ContractError::InvalidSignatureLength {});
    }

    let mut pending_operation = PENDING_OPERATIONS
        .load(storage, operation_id)
        .map_err(|_| ContractError::PendingOperationNotFound {})?;

    // Signatures over an outdated base fee snapshot are worthless to the multisig
    if operation_version != pending_operation.version {
        return Err(ContractError::OperationVersionMismatch {});
    }

    let config = CONFIG.load(storage)?;

    // If the bridge is halted we prohibit all signatures except for allowed operations
    check_valid_operation_if_halt(storage, &config, &pending_operation.operation_type)?;

    // A relayer can't overwrite the signature it already provided
    if pending_operation
        .signatures
        .iter()
        .any(|s| s.relayer_coreum_address == sender)
    {
        return Err(ContractError::SignatureAlreadyProvided {});
    }

    pending_operation.signatures.push(Signature {
        relayer_coreum_address: sender,
        signature,
    });

    PENDING_OPERATIONS.save(storage, operation_id, &pending_operation)?;

    Ok(())
}
