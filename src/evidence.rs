use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Empty, StdError, Storage, Uint128};
use sha2::{Digest, Sha256};

use crate::{
    error::ContractError,
    state::{Evidences, CONFIG, PROCESSED_TXS, TX_EVIDENCES},
};

#[cw_serde]
pub enum TransactionResult {
    Accepted,
    Rejected,
    // The transaction was never included in a validated XRPL ledger,
    // its sequence or ticket was never consumed
    Invalid,
}

#[cw_serde]
pub enum OperationResult {
    TicketsAllocation { tickets: Option<Vec<u64>> },
}

#[cw_serde]
pub enum Evidence {
    #[serde(rename = "xrpl_to_coreum_transfer")]
    XRPLToCoreumTransfer {
        tx_hash: String,
        issuer: String,
        currency: String,
        amount: Uint128,
        recipient: Addr,
    },
    #[serde(rename = "xrpl_transaction_result")]
    XRPLTransactionResult {
        tx_hash: Option<String>,
        account_sequence: Option<u64>,
        ticket_sequence: Option<u64>,
        transaction_result: TransactionResult,
        operation_result: Option<OperationResult>,
    },
}

impl Evidence {
    /// Canonical identity of an evidence body: the sha256 of its serialization.
    /// Field order is the declaration order, so two evidences collide exactly
    /// when every field, the variant tag and the transaction hash included, is equal.
    pub fn get_hash(&self) -> Result<String, ContractError> {
        let canonical_bytes =
            serde_json::to_vec(self).map_err(|e| StdError::generic_err(e.to_string()))?;
        Ok(hash_bytes(&canonical_bytes))
    }

    pub fn get_tx_hash(&self) -> Option<String> {
        match self {
            Evidence::XRPLToCoreumTransfer { tx_hash, .. } => Some(tx_hash.clone()),
            Evidence::XRPLTransactionResult { tx_hash, .. } => tx_hash.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        match self {
            Evidence::XRPLToCoreumTransfer { amount, .. } => {
                if amount.is_zero() {
                    return Err(ContractError::InvalidAmount {});
                }
                Ok(())
            }
            Evidence::XRPLTransactionResult {
                tx_hash,
                account_sequence,
                ticket_sequence,
                transaction_result,
                operation_result,
            } => {
                if account_sequence.is_some() == ticket_sequence.is_some() {
                    return Err(ContractError::InvalidTransactionResultEvidence {});
                }

                // Transactions that made it into a ledger have a hash; transactions
                // that never existed can not have one
                match transaction_result {
                    TransactionResult::Invalid => {
                        if tx_hash.is_some() {
                            return Err(ContractError::InvalidFailedTransactionResultEvidence {});
                        }
                    }
                    _ => {
                        if tx_hash.is_none() {
                            return Err(
                                ContractError::InvalidSuccessfulTransactionResultEvidence {},
                            );
                        }
                    }
                }

                if let Some(OperationResult::TicketsAllocation { tickets }) = operation_result {
                    match transaction_result {
                        TransactionResult::Accepted => {
                            if tickets.as_ref().map_or(true, |t| t.is_empty()) {
                                return Err(ContractError::InvalidTicketAllocationEvidence {});
                            }
                        }
                        _ => {
                            if tickets.is_some() {
                                return Err(ContractError::InvalidTicketAllocationEvidence {});
                            }
                        }
                    }
                }

                Ok(())
            }
        }
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let output = hasher.finalize();
    hex::encode(output)
}

/// Records one relayer attestation for an evidence body and reports whether the
/// evidence threshold has been reached with this attestation. Executed bodies are
/// tracked by transaction hash so that no second body for the same transaction,
/// and no late attestation for the same body, can execute again.
pub fn handle_evidence(
    storage: &mut dyn Storage,
    sender: Addr,
    evidence: &Evidence,
) -> Result<bool, ContractError> {
    if let Some(tx_hash) = evidence.get_tx_hash() {
        if PROCESSED_TXS.has(storage, tx_hash.to_lowercase()) {
            return Err(ContractError::OperationAlreadyExecuted {});
        }
    }

    let key = evidence.get_hash()?;
    let mut evidences = TX_EVIDENCES
        .may_load(storage, key.clone())?
        .unwrap_or(Evidences {
            relayer_addresses: vec![],
        });

    if evidences.relayer_addresses.contains(&sender) {
        return Err(ContractError::EvidenceAlreadyProvided {});
    }
    evidences.relayer_addresses.push(sender);

    let config = CONFIG.load(storage)?;
    if evidences.relayer_addresses.len() as u32 >= config.evidence_threshold {
        if let Some(tx_hash) = evidence.get_tx_hash() {
            PROCESSED_TXS.save(storage, tx_hash.to_lowercase(), &Empty {})?;
        }
        TX_EVIDENCES.remove(storage, key);
        return Ok(true);
    }

    TX_EVIDENCES.save(storage, key, &evidences)?;
    Ok(false)
}
