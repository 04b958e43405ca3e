use cosmwasm_std::{entry_point, DepsMut, Env, Response, StdError};
use cw2::{get_contract_version, set_contract_version};

use crate::{error::ContractError, msg::MigrateMsg, state::ContractActions};

const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Migrations must keep the storage layout of the live bridge readable:
/// pending operations stay keyed by ticket/account sequence, evidence
/// accumulators by canonical body hash, refunds by their counter derived ids,
/// and the monotone denom/refund counters keep their values. Outstanding
/// operations, collected fees and unclaimed refunds survive the upgrade as is.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(StdError::generic_err(format!(
            "can only migrate from {CONTRACT_NAME}, found {}",
            stored.contract
        ))
        .into());
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::Migration.as_str())
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
