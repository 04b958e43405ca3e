use std::collections::HashMap;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Api, Empty, Storage};

use crate::{
    address::validate_xrpl_address,
    contract::MAX_RELAYERS,
    error::ContractError,
    evidence::TransactionResult,
    state::{CONFIG, PENDING_ROTATE_KEYS},
};

#[cw_serde]
pub struct Relayer {
    pub coreum_address: Addr,
    pub xrpl_address: String,
    pub xrpl_pub_key: String,
}

pub fn validate_relayers(api: &dyn Api, relayers: &[Relayer]) -> Result<(), ContractError> {
    // Every relayer is also an XRPL multisig signer, which bounds the set size
    if relayers.is_empty() || relayers.len() > MAX_RELAYERS {
        return Err(ContractError::TooManyRelayers {});
    }

    let mut map_xrpl_addresses = HashMap::new();
    let mut map_xrpl_pubkeys = HashMap::new();
    let mut map_coreum_addresses = HashMap::new();

    for relayer in relayers {
        api.addr_validate(relayer.coreum_address.as_ref())?;
        validate_xrpl_address(&relayer.xrpl_address)?;

        // If the map returns a value during insertion, the key is duplicated
        if map_xrpl_addresses
            .insert(relayer.xrpl_address.clone(), Empty {})
            .is_some()
        {
            return Err(ContractError::DuplicatedRelayerXRPLAddress {});
        };
        if map_xrpl_pubkeys
            .insert(relayer.xrpl_pub_key.clone(), Empty {})
            .is_some()
        {
            return Err(ContractError::DuplicatedRelayerXRPLPubKey {});
        };
        if map_coreum_addresses
            .insert(relayer.coreum_address.clone(), Empty {})
            .is_some()
        {
            return Err(ContractError::DuplicatedRelayerCoreumAddress {});
        };
    }

    Ok(())
}

pub fn validate_evidence_threshold(
    evidence_threshold: u32,
    relayer_count: usize,
) -> Result<(), ContractError> {
    if evidence_threshold == 0 || evidence_threshold as usize > relayer_count {
        return Err(ContractError::InvalidThreshold {});
    }

    Ok(())
}

pub fn assert_relayer(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    let config = CONFIG.load(storage)?;

    if config.relayers.iter().any(|r| r.coreum_address == *sender) {
        return Ok(());
    }

    Err(ContractError::UnauthorizedSender {})
}

/// Resolution of a RotateKeys operation. An accepted rotation installs the new
/// relayer set and threshold; the bridge stays halted either way until the owner
/// resumes it.
pub fn handle_rotate_keys_confirmation(
    storage: &mut dyn Storage,
    new_relayers: Vec<Relayer>,
    new_evidence_threshold: u32,
    transaction_result: &TransactionResult,
) -> Result<(), ContractError> {
    PENDING_ROTATE_KEYS.save(storage, &false)?;

    if transaction_result.eq(&TransactionResult::Accepted) {
        let mut config = CONFIG.load(storage)?;
        config.relayers = new_relayers;
        config.evidence_threshold = new_evidence_threshold;
        CONFIG.save(storage, &config)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockApi;

    fn relayer(coreum: &str, xrpl_address: &str, pub_key: &str) -> Relayer {
        Relayer {
            coreum_address: Addr::unchecked(coreum),
            xrpl_address: xrpl_address.to_owned(),
            xrpl_pub_key: pub_key.to_owned(),
        }
    }

    #[test]
    fn relayer_set_validation() {
        let api = MockApi::default();
        let relayers = vec![
            relayer("relayer1", "rrrrrrrrrrrrrrrrrrrrBZbvji", "key1"),
            relayer("relayer2", "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh", "key2"),
        ];
        validate_relayers(&api, &relayers).unwrap();

        let duplicated_coreum = vec![
            relayer("relayer1", "rrrrrrrrrrrrrrrrrrrrBZbvji", "key1"),
            relayer("relayer1", "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh", "key2"),
        ];
        assert_eq!(
            validate_relayers(&api, &duplicated_coreum).unwrap_err(),
            ContractError::DuplicatedRelayerCoreumAddress {}
        );

        let duplicated_xrpl = vec![
            relayer("relayer1", "rrrrrrrrrrrrrrrrrrrrBZbvji", "key1"),
            relayer("relayer2", "rrrrrrrrrrrrrrrrrrrrBZbvji", "key2"),
        ];
        assert_eq!(
            validate_relayers(&api, &duplicated_xrpl).unwrap_err(),
            ContractError::DuplicatedRelayerXRPLAddress {}
        );

        let duplicated_key = vec![
            relayer("relayer1", "rrrrrrrrrrrrrrrrrrrrBZbvji", "key1"),
            relayer("relayer2", "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh", "key1"),
        ];
        assert_eq!(
            validate_relayers(&api, &duplicated_key).unwrap_err(),
            ContractError::DuplicatedRelayerXRPLPubKey {}
        );

        let too_many: Vec<Relayer> = (0..MAX_RELAYERS + 1)
            .map(|i| relayer(&format!("relayer{i}"), "rrrrrrrrrrrrrrrrrrrrBZbvji", "k"))
            .collect();
        assert!(matches!(
            validate_relayers(&api, &too_many),
            Err(ContractError::TooManyRelayers {})
        ));
    }

    #[test]
    fn threshold_validation() {
        validate_evidence_threshold(1, 2).unwrap();
        validate_evidence_threshold(2, 2).unwrap();
        assert_eq!(
            validate_evidence_threshold(0, 2).unwrap_err(),
            ContractError::InvalidThreshold {}
        );
        assert_eq!(
            validate_evidence_threshold(3, 2).unwrap_err(),
            ContractError::InvalidThreshold {}
        );
    }
}
