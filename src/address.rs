use sha2::{Digest, Sha256};

use crate::error::ContractError;

// An XRPL classic address decodes to exactly 25 bytes:
// one version byte (0x00), a 20 byte account id and a 4 byte checksum.
const ACCOUNT_ID_VERSION: u8 = 0x00;
const DECODED_ADDRESS_LEN: usize = 25;

pub fn validate_xrpl_address(address: &str) -> Result<(), ContractError> {
    let invalid = || ContractError::InvalidXRPLAddress {
        address: address.to_owned(),
    };

    let data = bs58::decode(address)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|_| invalid())?;

    if data.len() != DECODED_ADDRESS_LEN || data[0] != ACCOUNT_ID_VERSION {
        return Err(invalid());
    }

    // The payload must reproduce the attached checksum
    let expected_checksum = &checksum(&data[..21])[..4];
    let provided_checksum = &data[21..];

    if expected_checksum != provided_checksum {
        return Err(invalid());
    }

    Ok(())
}

pub fn checksum(data: &[u8]) -> Vec<u8> {
    Sha256::digest(Sha256::digest(data)).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_addresses() {
        for address in [
            "rrrrrrrrrrrrrrrrrrrrrhoLvTp",
            "rrrrrrrrrrrrrrrrrrrrBZbvji",
            "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
            "rrrrrrrrrrrrrrrrrNAMEtxvNvQ",
            "rrrrrrrrrrrrrrrrrrrn5RM1rHd",
        ] {
            validate_xrpl_address(address).unwrap();
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for address in [
            "",
            "notanaddress",
            "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTg", // tampered checksum
            "xHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh", // wrong leading character
            "rrrrrrrrrrrrrrrrrrrrrhoLvT",         // truncated
        ] {
            validate_xrpl_address(address).unwrap_err();
        }
    }
}
