use std::collections::{BTreeMap, VecDeque};

use coreum_wasm_sdk::{
    assetft::{self, ParamsResponse, Query, BURNING, IBC, MINTING},
    core::{CoreumMsg, CoreumQueries, CoreumResult},
};
use cosmwasm_std::{
    coin, coins, entry_point, to_binary, Addr, Api, BankMsg, Binary, Coin, CosmosMsg, Deps,
    DepsMut, Empty, Env, MessageInfo, Order, QuerierWrapper, Response, StdResult, Storage, Uint128,
};
use cw2::set_contract_version;
use cw_ownable::{assert_owner, get_ownership, initialize_owner, Action};
use cw_storage_plus::Bound;
use cw_utils::one_coin;
use sha2::{Digest, Sha256};

use crate::{
    address::validate_xrpl_address,
    amount::{
        amount_after_bridge_fees, convert_amount_decimals, convert_and_truncate_amount,
        truncate_amount, validate_sending_precision, validate_xrpl_amount,
    },
    error::ContractError,
    evidence::{handle_evidence, Evidence},
    fees::{accrue_relayer_fees, claim_fees},
    msg::{
        AvailableTicketsResponse, BridgeStateResponse, CoreumTokenResponse, CoreumTokensResponse,
        ExecuteMsg, FeesCollectedResponse, InstantiateMsg, OperationSignature,
        PendingOperationsResponse, PendingRefundsResponse, ProcessedTxsResponse,
        ProhibitedXRPLAddressesResponse, QueryMsg, SendToXRPLRequest, TransactionEvidence,
        TransactionEvidencesResponse, XRPLTokenResponse, XRPLTokensResponse,
    },
    operation::{
        cancel_operation, check_operation_exists, create_pending_operation, handle_operation,
        remove_pending_refund, Operation, OperationType,
    },
    relayer::{assert_relayer, validate_evidence_threshold, validate_relayers, Relayer},
    signatures::add_signature,
    state::{
        BridgeState, Config, ContractActions, CoreumToken, TokenState, XRPLToken,
        AVAILABLE_TICKETS, CONFIG, COREUM_TOKENS, FEES_COLLECTED, PENDING_OPERATIONS,
        PENDING_REFUNDS, PENDING_ROTATE_KEYS, PENDING_TICKET_UPDATE, PROCESSED_TXS,
        PROHIBITED_XRPL_ADDRESSES, REFUND_COUNTER, TX_EVIDENCES, USED_TICKETS_COUNTER,
        USED_XRPL_CURRENCIES, XRPL_DENOM_COUNTER, XRPL_TOKENS,
    },
    tickets::{allocate_ticket, register_used_ticket},
    token::{
        build_xrpl_currency_for_denom, build_xrpl_denom_prefix, build_xrpl_token_key,
        is_token_xrp, set_token_bridging_fee, set_token_max_holding_amount,
        set_token_sending_precision, set_token_state, validate_coreum_denom,
        validate_xrpl_currency,
    },
};

// version info for migration info
const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const MAX_TICKETS_TO_ALLOCATE: u32 = 250;
pub const MAX_RELAYERS: usize = 32;
const MAX_PAGE_LIMIT: u32 = 250;

pub const XRP_SYMBOL: &str = "XRP";
pub const XRP_SUBUNIT: &str = "drop";
pub const XRP_DECIMALS: u32 = 6;
pub const XRP_DEFAULT_SENDING_PRECISION: i32 = 6;
pub const XRP_DEFAULT_MAX_HOLDING_AMOUNT: u128 = 10u128.pow(16);
// XRP is modelled as a pseudo issued token so that it flows through the same
// paths as every other XRPL originated token
pub const XRP_ISSUER: &str = "rrrrrrrrrrrrrrrrrrrrrhoLvTp";
pub const XRP_CURRENCY: &str = "XRP";

pub const XRPL_DENOM_PREFIX: &str = "xrpl";
pub const COREUM_CURRENCY_PREFIX: &str = "coreum";
pub const XRPL_TOKENS_DECIMALS: u32 = 15;

// Well known XRPL black hole accounts. Outbound transfers towards them would
// burn the funds forever; the bridge XRPL address is appended at instantiation.
pub const INITIAL_PROHIBITED_XRPL_ADDRESSES: [&str; 5] = [
    "rrrrrrrrrrrrrrrrrrrrrhoLvTp",
    "rrrrrrrrrrrrrrrrrrrrBZbvji",
    "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
    "rrrrrrrrrrrrrrrrrNAMEtxvNvQ",
    "rrrrrrrrrrrrrrrrrrrn5RM1rHd",
];

// Module accounts can not hold bank tokens sent by a contract. Their canonical
// addresses are a hash of the module name, independent of the chain prefix.
const BLOCKED_MODULE_ACCOUNTS: [&str; 8] = [
    "gov",
    "mint",
    "distribution",
    "bonded_tokens_pool",
    "not_bonded_tokens_pool",
    "transfer",
    "assetft",
    "deterministicgas",
];

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> CoreumResult<ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    initialize_owner(
        deps.storage,
        deps.api,
        Some(deps.api.addr_validate(msg.owner.as_ref())?.as_ref()),
    )?;

    validate_relayers(deps.api, &msg.relayers)?;
    validate_evidence_threshold(msg.evidence_threshold, msg.relayers.len())?;

    if msg.used_ticket_sequence_threshold <= 1
        || msg.used_ticket_sequence_threshold > MAX_TICKETS_TO_ALLOCATE
    {
        return Err(ContractError::InvalidUsedTicketSequenceThreshold {});
    }

    validate_xrpl_address(&msg.bridge_xrpl_address)?;

    // We want to check that exactly the issue fee was sent, not more.
    check_issue_fee(&deps, &info)?;

    let config = Config {
        relayers: msg.relayers,
        evidence_threshold: msg.evidence_threshold,
        used_ticket_sequence_threshold: msg.used_ticket_sequence_threshold,
        trust_set_limit_amount: msg.trust_set_limit_amount,
        bridge_xrpl_address: msg.bridge_xrpl_address.clone(),
        bridge_state: BridgeState::Active,
        xrpl_base_fee: msg.xrpl_base_fee,
    };
    CONFIG.save(deps.storage, &config)?;

    AVAILABLE_TICKETS.save(deps.storage, &VecDeque::new())?;
    USED_TICKETS_COUNTER.save(deps.storage, &0)?;
    PENDING_TICKET_UPDATE.save(deps.storage, &false)?;
    PENDING_ROTATE_KEYS.save(deps.storage, &false)?;
    XRPL_DENOM_COUNTER.save(deps.storage, &0)?;
    REFUND_COUNTER.save(deps.storage, &0)?;

    let mut prohibited_addresses: Vec<String> = INITIAL_PROHIBITED_XRPL_ADDRESSES
        .iter()
        .map(|a| a.to_string())
        .collect();
    if !prohibited_addresses.contains(&msg.bridge_xrpl_address) {
        prohibited_addresses.push(msg.bridge_xrpl_address);
    }
    PROHIBITED_XRPL_ADDRESSES.save(deps.storage, &prohibited_addresses)?;

    let xrp_issue_msg = CosmosMsg::from(CoreumMsg::AssetFT(assetft::Msg::Issue {
        symbol: XRP_SYMBOL.to_string(),
        subunit: XRP_SUBUNIT.to_string(),
        precision: XRP_DECIMALS,
        initial_amount: Uint128::zero(),
        description: None,
        features: Some(vec![MINTING, BURNING, IBC]),
        burn_rate: "0.0".to_string(),
        send_commission_rate: "0.0".to_string(),
        uri: None,
        uri_hash: None,
    }));

    let xrp_coreum_denom = format!("{}-{}", XRP_SUBUNIT, env.contract.address).to_lowercase();

    // XRP is enabled from the start, no trust line is needed for it
    let token = XRPLToken {
        issuer: XRP_ISSUER.to_string(),
        currency: XRP_CURRENCY.to_string(),
        coreum_denom: xrp_coreum_denom,
        sending_precision: XRP_DEFAULT_SENDING_PRECISION,
        max_holding_amount: Uint128::new(XRP_DEFAULT_MAX_HOLDING_AMOUNT),
        bridging_fee: Uint128::zero(),
        state: TokenState::Enabled,
    };
    XRPL_TOKENS.save(
        deps.storage,
        build_xrpl_token_key(XRP_ISSUER, XRP_CURRENCY),
        &token,
    )?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::Instantiation.as_str())
        .add_attribute("contract_name", CONTRACT_NAME)
        .add_attribute("contract_version", CONTRACT_VERSION)
        .add_attribute("owner", info.sender)
        .add_message(xrp_issue_msg))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> CoreumResult<ContractError> {
    match msg {
        ExecuteMsg::UpdateOwnership(action) => {
            update_ownership(deps.into_empty(), env, info, action)
        }
        ExecuteMsg::RegisterCoreumToken {
            denom,
            decimals,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        } => register_coreum_token(
            deps.into_empty(),
            info.sender,
            denom,
            decimals,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        ),
        ExecuteMsg::RegisterXRPLToken {
            issuer,
            currency,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        } => register_xrpl_token(
            deps,
            env,
            info,
            issuer,
            currency,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        ),
        ExecuteMsg::UpdateCoreumToken {
            denom,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        } => update_coreum_token(
            deps,
            env,
            info.sender,
            denom,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        ),
        ExecuteMsg::UpdateXRPLToken {
            issuer,
            currency,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        } => update_xrpl_token(
            deps,
            info.sender,
            issuer,
            currency,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        ),
        ExecuteMsg::RecoverXRPLTokenRegistration { issuer, currency } => {
            recover_xrpl_token_registration(deps.into_empty(), info.sender, issuer, currency)
        }
        ExecuteMsg::RecoverTickets {
            account_sequence,
            number_of_tickets,
        } => recover_tickets(
            deps.into_empty(),
            info.sender,
            account_sequence,
            number_of_tickets,
        ),
        ExecuteMsg::SaveEvidence { evidence } => save_evidence(deps, env, info.sender, evidence),
        ExecuteMsg::SaveSignature {
            operation_id,
            operation_version,
            signature,
        } => save_signature(
            deps.into_empty(),
            info.sender,
            operation_id,
            operation_version,
            signature,
        ),
        ExecuteMsg::SaveMultipleSignatures { signatures } => {
            save_multiple_signatures(deps.into_empty(), info.sender, signatures)
        }
        ExecuteMsg::SendToXRPL {
            recipient,
            deliver_amount,
        } => send_to_xrpl(deps, env, info, recipient, deliver_amount),
        ExecuteMsg::MultiSendToXRPL { requests } => multi_send_to_xrpl(deps, env, info, requests),
        ExecuteMsg::ClaimRelayerFees { amounts } => {
            claim_relayer_fees(deps.into_empty(), info.sender, amounts)
        }
        ExecuteMsg::ClaimRefund { pending_refund_id } => {
            claim_refund(deps.into_empty(), info.sender, pending_refund_id)
        }
        ExecuteMsg::HaltBridge {} => halt_bridge(deps.into_empty(), info.sender),
        ExecuteMsg::ResumeBridge {} => resume_bridge(deps.into_empty(), info.sender),
        ExecuteMsg::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        } => rotate_keys(
            deps.into_empty(),
            info.sender,
            new_relayers,
            new_evidence_threshold,
        ),
        ExecuteMsg::CancelPendingOperation { operation_id } => {
            cancel_pending_operation(deps.into_empty(), info.sender, operation_id)
        }
        ExecuteMsg::UpdateXRPLBaseFee { xrpl_base_fee } => {
            update_xrpl_base_fee(deps.into_empty(), info.sender, xrpl_base_fee)
        }
        ExecuteMsg::UpdateProhibitedXRPLAddresses {
            prohibited_xrpl_addresses,
        } => update_prohibited_xrpl_addresses(
            deps.into_empty(),
            info.sender,
            prohibited_xrpl_addresses,
        ),
    }
}

fn update_ownership(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    action: Action,
) -> CoreumResult<ContractError> {
    let ownership = cw_ownable::update_ownership(deps, &env.block, &info.sender, action)?;
    Ok(Response::new().add_attributes(ownership.into_attributes()))
}

#[allow(clippy::too_many_arguments)]
fn register_coreum_token(
    deps: DepsMut,
    sender: Addr,
    denom: String,
    decimals: u32,
    sending_precision: i32,
    max_holding_amount: Uint128,
    bridging_fee: Uint128,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;
    assert_bridge_active(deps.storage)?;

    validate_coreum_denom(&denom)?;
    validate_sending_precision(sending_precision, decimals)?;

    if COREUM_TOKENS.may_load(deps.storage, denom.clone())?.is_some() {
        return Err(ContractError::CoreumTokenAlreadyRegistered { denom });
    }

    let xrpl_currency = build_xrpl_currency_for_denom(&denom);
    if USED_XRPL_CURRENCIES.has(deps.storage, xrpl_currency.clone()) {
        return Err(ContractError::RegistrationFailure {});
    }
    USED_XRPL_CURRENCIES.save(deps.storage, xrpl_currency.clone(), &Empty {})?;

    let token = CoreumToken {
        denom: denom.clone(),
        decimals,
        xrpl_currency: xrpl_currency.clone(),
        sending_precision,
        max_holding_amount,
        bridging_fee,
        state: TokenState::Enabled,
    };
    COREUM_TOKENS.save(deps.storage, denom.clone(), &token)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::RegisterCoreumToken.as_str())
        .add_attribute("denom", denom)
        .add_attribute("decimals", decimals.to_string())
        .add_attribute("xrpl_currency_for_denom", xrpl_currency))
}

#[allow(clippy::too_many_arguments)]
fn register_xrpl_token(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    issuer: String,
    currency: String,
    sending_precision: i32,
    max_holding_amount: Uint128,
    bridging_fee: Uint128,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &info.sender)?;
    assert_bridge_active(deps.storage)?;

    validate_xrpl_address(&issuer)?;
    validate_xrpl_currency(&currency)?;
    validate_sending_precision(sending_precision, XRPL_TOKENS_DECIMALS)?;

    // We want to check that exactly the issue fee was sent, not more.
    check_issue_fee(&deps, &info)?;

    let key = build_xrpl_token_key(&issuer, &currency);
    if XRPL_TOKENS.has(deps.storage, key.clone()) {
        return Err(ContractError::XRPLTokenAlreadyRegistered { issuer, currency });
    }

    // The symbol and subunit of the issued token come from a monotone counter,
    // so every replica derives the same denom for the same registration
    let counter = XRPL_DENOM_COUNTER.load(deps.storage)? + 1;
    XRPL_DENOM_COUNTER.save(deps.storage, &counter)?;
    let symbol_and_subunit = build_xrpl_denom_prefix(counter);

    let issue_msg = CosmosMsg::from(CoreumMsg::AssetFT(assetft::Msg::Issue {
        symbol: symbol_and_subunit.to_uppercase(),
        subunit: symbol_and_subunit.clone(),
        precision: XRPL_TOKENS_DECIMALS,
        initial_amount: Uint128::zero(),
        description: None,
        features: Some(vec![MINTING, BURNING, IBC]),
        burn_rate: "0.0".to_string(),
        send_commission_rate: "0.0".to_string(),
        uri: None,
        uri_hash: None,
    }));

    // Denom that the token will have in Coreum
    let denom = format!("{}-{}", symbol_and_subunit, env.contract.address).to_lowercase();

    let token = XRPLToken {
        issuer: issuer.clone(),
        currency: currency.clone(),
        coreum_denom: denom.clone(),
        sending_precision,
        max_holding_amount,
        bridging_fee,
        state: TokenState::Processing,
    };
    XRPL_TOKENS.save(deps.storage, key, &token)?;

    // The token is usable only once the trust line towards the issuer exists
    let config = CONFIG.load(deps.storage)?;
    let ticket = allocate_ticket(deps.storage)?;
    create_pending_operation(
        deps.storage,
        Some(ticket),
        None,
        OperationType::TrustSet {
            issuer: issuer.clone(),
            currency: currency.clone(),
            trust_set_limit_amount: config.trust_set_limit_amount,
        },
    )?;
    register_used_ticket(deps.storage)?;

    Ok(Response::new()
        .add_message(issue_msg)
        .add_attribute("action", ContractActions::RegisterXRPLToken.as_str())
        .add_attribute("issuer", issuer)
        .add_attribute("currency", currency)
        .add_attribute("denom", denom))
}

#[allow(clippy::too_many_arguments)]
fn update_coreum_token(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    sender: Addr,
    denom: String,
    state: Option<TokenState>,
    sending_precision: Option<i32>,
    bridging_fee: Option<Uint128>,
    max_holding_amount: Option<Uint128>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;
    assert_bridge_active(deps.storage)?;

    let mut token = COREUM_TOKENS
        .may_load(deps.storage, denom.clone())?
        .ok_or(ContractError::TokenNotRegistered {})?;

    set_token_state(&mut token.state, state)?;
    set_token_sending_precision(&mut token.sending_precision, sending_precision, token.decimals)?;
    set_token_bridging_fee(&mut token.bridging_fee, bridging_fee)?;

    // What the bridge currently holds in escrow bounds the new cap
    let current_bridged_amount = deps
        .querier
        .query_balance(env.contract.address, denom.clone())?
        .amount;
    set_token_max_holding_amount(
        current_bridged_amount,
        &mut token.max_holding_amount,
        max_holding_amount,
    )?;

    COREUM_TOKENS.save(deps.storage, denom.clone(), &token)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::UpdateCoreumToken.as_str())
        .add_attribute("denom", denom))
}

#[allow(clippy::too_many_arguments)]
fn update_xrpl_token(
    deps: DepsMut<CoreumQueries>,
    sender: Addr,
    issuer: String,
    currency: String,
    state: Option<TokenState>,
    sending_precision: Option<i32>,
    bridging_fee: Option<Uint128>,
    max_holding_amount: Option<Uint128>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;
    assert_bridge_active(deps.storage)?;

    let key = build_xrpl_token_key(&issuer, &currency);
    let mut token = XRPL_TOKENS
        .may_load(deps.storage, key.clone())?
        .ok_or(ContractError::TokenNotRegistered {})?;

    set_token_state(&mut token.state, state)?;

    let decimals = if is_token_xrp(&token.issuer, &token.currency) {
        XRP_DECIMALS
    } else {
        XRPL_TOKENS_DECIMALS
    };
    set_token_sending_precision(&mut token.sending_precision, sending_precision, decimals)?;
    set_token_bridging_fee(&mut token.bridging_fee, bridging_fee)?;

    // Everything minted for this token so far bounds the new cap
    let current_bridged_amount = deps
        .querier
        .query_supply(token.coreum_denom.clone())?
        .amount;
    set_token_max_holding_amount(
        current_bridged_amount,
        &mut token.max_holding_amount,
        max_holding_amount,
    )?;

    XRPL_TOKENS.save(deps.storage, key, &token)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::UpdateXRPLToken.as_str())
        .add_attribute("issuer", issuer)
        .add_attribute("currency", currency))
}

fn recover_xrpl_token_registration(
    deps: DepsMut,
    sender: Addr,
    issuer: String,
    currency: String,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;
    assert_bridge_active(deps.storage)?;

    let key = build_xrpl_token_key(&issuer, &currency);
    let mut token = XRPL_TOKENS
        .may_load(deps.storage, key.clone())?
        .ok_or(ContractError::TokenNotRegistered {})?;

    // Only failed registrations can retry their trust line
    if token.state.ne(&TokenState::Inactive) {
        return Err(ContractError::XRPLTokenNotInactive {});
    }

    token.state = TokenState::Processing;
    XRPL_TOKENS.save(deps.storage, key, &token)?;

    let config = CONFIG.load(deps.storage)?;
    let ticket = allocate_ticket(deps.storage)?;
    create_pending_operation(
        deps.storage,
        Some(ticket),
        None,
        OperationType::TrustSet {
            issuer: issuer.clone(),
            currency: currency.clone(),
            trust_set_limit_amount: config.trust_set_limit_amount,
        },
    )?;
    register_used_ticket(deps.storage)?;

    Ok(Response::new()
        .add_attribute(
            "action",
            ContractActions::RecoverXRPLTokenRegistration.as_str(),
        )
        .add_attribute("issuer", issuer)
        .add_attribute("currency", currency))
}

fn recover_tickets(
    deps: DepsMut,
    sender: Addr,
    account_sequence: u64,
    number_of_tickets: Option<u32>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    if PENDING_TICKET_UPDATE.load(deps.storage)? {
        return Err(ContractError::PendingTicketUpdate {});
    }

    // Recovery is for a drained pool; autonomous replenishment covers the rest
    if !AVAILABLE_TICKETS.load(deps.storage)?.is_empty() {
        return Err(ContractError::StillHaveAvailableTickets {});
    }

    let config = CONFIG.load(deps.storage)?;
    let number_to_allocate = number_of_tickets.unwrap_or(config.used_ticket_sequence_threshold);
    if number_to_allocate == 0 || number_to_allocate > MAX_TICKETS_TO_ALLOCATE {
        return Err(ContractError::InvalidTicketSequenceToAllocate {});
    }

    create_pending_operation(
        deps.storage,
        None,
        Some(account_sequence),
        OperationType::AllocateTickets {
            number: number_to_allocate,
        },
    )?;
    PENDING_TICKET_UPDATE.save(deps.storage, &true)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::RecoverTickets.as_str())
        .add_attribute("account_sequence", account_sequence.to_string()))
}

fn save_evidence(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    sender: Addr,
    evidence: Evidence,
) -> CoreumResult<ContractError> {
    evidence.validate()?;
    assert_relayer(deps.storage, &sender)?;

    let config = CONFIG.load(deps.storage)?;

    let mut response = Response::new()
        .add_attribute("action", ContractActions::SaveEvidence.as_str())
        .add_attribute("sender", sender.as_str());

    match evidence.clone() {
        Evidence::XRPLToCoreumTransfer {
            tx_hash,
            issuer,
            currency,
            amount,
            recipient,
        } => {
            // No new value enters the bridge while it is halted
            if config.bridge_state.eq(&BridgeState::Halted) {
                return Err(ContractError::BridgeHalted {});
            }

            let key = build_xrpl_token_key(&issuer, &currency);
            if let Some(token) = XRPL_TOKENS.may_load(deps.storage, key)? {
                if token.state.ne(&TokenState::Enabled) {
                    return Err(ContractError::TokenNotEnabled {});
                }

                let decimals = if is_token_xrp(&token.issuer, &token.currency) {
                    XRP_DECIMALS
                } else {
                    XRPL_TOKENS_DECIMALS
                };

                let threshold_reached = handle_evidence(deps.storage, sender, &evidence)?;
                if threshold_reached {
                    validate_coreum_recipient(deps.api, &env, &recipient)?;

                    let (amount_truncated, _) =
                        truncate_amount(token.sending_precision, decimals, amount)?;
                    let amount_to_send =
                        amount_after_bridge_fees(amount_truncated, token.bridging_fee)?;

                    // The whole evidence amount gets minted, so the cap is
                    // checked against it, fees included
                    let current_supply =
                        deps.querier.query_supply(token.coreum_denom.clone())?.amount;
                    if current_supply.checked_add(amount)? > token.max_holding_amount {
                        return Err(ContractError::MaximumBridgedAmountReached {});
                    }

                    // Bridging fee plus the truncation residue stay with the
                    // contract as the relayers' fee escrow
                    let fee_collected = amount.checked_sub(amount_to_send)?;
                    accrue_relayer_fees(
                        deps.storage,
                        &config.relayers,
                        &token.coreum_denom,
                        fee_collected,
                    )?;

                    response = add_mint_and_send(
                        response,
                        amount,
                        amount_to_send,
                        &token.coreum_denom,
                        &recipient,
                    );
                }

                response = response
                    .add_attribute("hash", tx_hash)
                    .add_attribute("issuer", issuer)
                    .add_attribute("currency", currency)
                    .add_attribute("amount", amount.to_string())
                    .add_attribute("recipient", recipient.to_string())
                    .add_attribute("threshold_reached", threshold_reached.to_string());
            } else if issuer == config.bridge_xrpl_address {
                // A Coreum originated token coming back home
                let token = COREUM_TOKENS
                    .idx
                    .xrpl_currency
                    .item(deps.storage, currency.clone())?
                    .map(|(_, ct)| ct)
                    .ok_or(ContractError::TokenNotRegistered {})?;

                if token.state.ne(&TokenState::Enabled) {
                    return Err(ContractError::TokenNotEnabled {});
                }

                let threshold_reached = handle_evidence(deps.storage, sender, &evidence)?;
                if threshold_reached {
                    validate_coreum_recipient(deps.api, &env, &recipient)?;

                    let (amount_truncated, residue) = convert_and_truncate_amount(
                        token.sending_precision,
                        XRPL_TOKENS_DECIMALS,
                        token.decimals,
                        amount,
                    )?;
                    let amount_to_send =
                        amount_after_bridge_fees(amount_truncated, token.bridging_fee)?;

                    let fee_collected = amount_truncated
                        .checked_sub(amount_to_send)?
                        .checked_add(residue)?;
                    accrue_relayer_fees(
                        deps.storage,
                        &config.relayers,
                        &token.denom,
                        fee_collected,
                    )?;

                    // The escrow pays the recipient back
                    response = response.add_message(BankMsg::Send {
                        to_address: recipient.to_string(),
                        amount: coins(amount_to_send.u128(), token.denom.clone()),
                    });
                }

                response = response
                    .add_attribute("hash", tx_hash)
                    .add_attribute("issuer", issuer)
                    .add_attribute("currency", currency)
                    .add_attribute("amount", amount.to_string())
                    .add_attribute("recipient", recipient.to_string())
                    .add_attribute("threshold_reached", threshold_reached.to_string());
            } else {
                return Err(ContractError::TokenNotRegistered {});
            }
        }
        Evidence::XRPLTransactionResult {
            tx_hash,
            account_sequence,
            ticket_sequence,
            transaction_result,
            operation_result,
        } => {
            let operation_sequence = ticket_sequence.unwrap_or_else(|| account_sequence.unwrap());
            let operation = check_operation_exists(deps.storage, operation_sequence)?;

            // Result evidences stay valid while the bridge is halted: they
            // resolve operations that were already outstanding
            let threshold_reached = handle_evidence(deps.storage, sender, &evidence)?;
            if threshold_reached {
                handle_operation(
                    deps.storage,
                    &operation,
                    &operation_result,
                    &transaction_result,
                    &tx_hash,
                    operation_sequence,
                    &mut response,
                )?;
            }

            response = response
                .add_attribute("operation_type", operation.operation_type.as_str())
                .add_attribute("operation_sequence", operation_sequence.to_string())
                .add_attribute("transaction_result", format!("{:?}", transaction_result))
                .add_attribute("threshold_reached", threshold_reached.to_string());
            if let Some(tx_hash) = tx_hash {
                response = response.add_attribute("hash", tx_hash);
            }
        }
    }

    Ok(response)
}

fn save_signature(
    deps: DepsMut,
    sender: Addr,
    operation_id: u64,
    operation_version: u64,
    signature: String,
) -> CoreumResult<ContractError> {
    assert_relayer(deps.storage, &sender)?;

    add_signature(
        deps.storage,
        operation_id,
        operation_version,
        sender.clone(),
        signature.clone(),
    )?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::SaveSignature.as_str())
        .add_attribute("sender", sender)
        .add_attribute("operation_sequence", operation_id.to_string())
        .add_attribute("signature", signature))
}

fn save_multiple_signatures(
    deps: DepsMut,
    sender: Addr,
    signatures: Vec<OperationSignature>,
) -> CoreumResult<ContractError> {
    assert_relayer(deps.storage, &sender)?;

    for operation_signature in &signatures {
        add_signature(
            deps.storage,
            operation_signature.operation_id,
            operation_signature.operation_version,
            sender.clone(),
            operation_signature.signature.clone(),
        )?;
    }

    Ok(Response::new()
        .add_attribute("action", ContractActions::SaveSignature.as_str())
        .add_attribute("sender", sender)
        .add_attribute("signatures_saved", signatures.len().to_string()))
}

fn send_to_xrpl(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    recipient: String,
    deliver_amount: Option<Uint128>,
) -> CoreumResult<ContractError> {
    // One coin per transfer; multi coin sends go through MultiSendToXRPL
    let funds = one_coin(&info)?;

    let denom = funds.denom.clone();
    let amount = funds.amount;
    execute_transfer_to_xrpl(
        deps.storage,
        &deps.querier,
        &env,
        info.sender.clone(),
        funds,
        &recipient,
        deliver_amount,
    )?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::SendToXRPL.as_str())
        .add_attribute("sender", info.sender)
        .add_attribute("recipient", recipient)
        .add_attribute("coin", format!("{amount}{denom}")))
}

fn multi_send_to_xrpl(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    requests: Vec<SendToXRPLRequest>,
) -> CoreumResult<ContractError> {
    if requests.is_empty() {
        return Err(ContractError::InvalidFundsAmount {});
    }

    // The attached funds must match the aggregate of the requests exactly
    let mut required: BTreeMap<String, Uint128> = BTreeMap::new();
    for request in &requests {
        let entry = required.entry(request.coin.denom.clone()).or_default();
        *entry = entry.checked_add(request.coin.amount)?;
    }
    let mut provided: BTreeMap<String, Uint128> = BTreeMap::new();
    for fund in &info.funds {
        let entry = provided.entry(fund.denom.clone()).or_default();
        *entry = entry.checked_add(fund.amount)?;
    }
    if required != provided {
        return Err(ContractError::InvalidFundsAmount {});
    }

    let request_count = requests.len();
    for request in requests {
        execute_transfer_to_xrpl(
            deps.storage,
            &deps.querier,
            &env,
            info.sender.clone(),
            request.coin,
            &request.recipient,
            request.deliver_amount,
        )?;
    }

    Ok(Response::new()
        .add_attribute("action", ContractActions::MultiSendToXRPL.as_str())
        .add_attribute("sender", info.sender)
        .add_attribute("transfers", request_count.to_string()))
}

/// Shared path of SendToXRPL and MultiSendToXRPL: validates the recipient and
/// the amounts, reserves a ticket and records the pending operation. The funds
/// stay escrowed in the contract until the result evidence arrives.
fn execute_transfer_to_xrpl(
    storage: &mut dyn Storage,
    querier: &QuerierWrapper<CoreumQueries>,
    env: &Env,
    sender: Addr,
    funds: Coin,
    recipient: &str,
    deliver_amount: Option<Uint128>,
) -> Result<(), ContractError> {
    assert_bridge_active(storage)?;

    validate_xrpl_address(recipient)?;
    if PROHIBITED_XRPL_ADDRESSES
        .load(storage)?
        .iter()
        .any(|a| a == recipient)
    {
        return Err(ContractError::ProhibitedAddress {});
    }

    let config = CONFIG.load(storage)?;

    // XRPL originated tokens are matched by their Coreum denom
    let xrpl_token = XRPL_TOKENS
        .range(storage, None, None, Order::Ascending)
        .filter_map(Result::ok)
        .map(|(_, token)| token)
        .find(|token| token.coreum_denom == funds.denom);

    match xrpl_token {
        Some(token) => {
            if token.state.ne(&TokenState::Enabled) {
                return Err(ContractError::TokenNotEnabled {});
            }

            let is_xrp = is_token_xrp(&token.issuer, &token.currency);
            let decimals = if is_xrp { XRP_DECIMALS } else { XRPL_TOKENS_DECIMALS };

            // Partial payments only exist for issued currencies
            if is_xrp && deliver_amount.is_some() {
                return Err(ContractError::DeliverAmountIsProhibited {});
            }

            let (amount_truncated, _) =
                truncate_amount(token.sending_precision, decimals, funds.amount)?;
            let max_amount = amount_after_bridge_fees(amount_truncated, token.bridging_fee)?;

            let amount = match deliver_amount {
                Some(deliver_amount) => {
                    let (deliver_truncated, _) =
                        truncate_amount(token.sending_precision, decimals, deliver_amount)?;
                    if deliver_truncated > max_amount {
                        return Err(ContractError::InvalidDeliverAmount {});
                    }
                    deliver_truncated
                }
                None => max_amount,
            };

            validate_xrpl_amount(amount)?;
            validate_xrpl_amount(max_amount)?;

            let ticket = allocate_ticket(storage)?;
            create_pending_operation(
                storage,
                Some(ticket),
                None,
                OperationType::CoreumToXRPLTransfer {
                    issuer: token.issuer,
                    currency: token.currency,
                    amount,
                    max_amount: if is_xrp { None } else { Some(max_amount) },
                    funds,
                    sender,
                    recipient: recipient.to_owned(),
                },
            )?;
            register_used_ticket(storage)?;
        }
        None => {
            let token = COREUM_TOKENS
                .may_load(storage, funds.denom.clone())?
                .ok_or(ContractError::TokenNotRegistered {})?;

            if token.state.ne(&TokenState::Enabled) {
                return Err(ContractError::TokenNotEnabled {});
            }

            // On XRPL the bridge delivers exactly what it promises for its own
            // issued currencies, a partial delivery amount makes no sense here
            if deliver_amount.is_some() {
                return Err(ContractError::DeliverAmountIsProhibited {});
            }

            let (amount_truncated, _) =
                truncate_amount(token.sending_precision, token.decimals, funds.amount)?;
            let net_amount = amount_after_bridge_fees(amount_truncated, token.bridging_fee)?;
            let xrpl_amount =
                convert_amount_decimals(token.decimals, XRPL_TOKENS_DECIMALS, net_amount)?;
            validate_xrpl_amount(xrpl_amount)?;

            // The escrow, this transfer included, must stay under the cap
            let escrow_balance = querier
                .query_balance(env.contract.address.clone(), funds.denom.clone())?
                .amount;
            if escrow_balance > token.max_holding_amount {
                return Err(ContractError::MaximumBridgedAmountReached {});
            }

            let ticket = allocate_ticket(storage)?;
            create_pending_operation(
                storage,
                Some(ticket),
                None,
                OperationType::CoreumToXRPLTransfer {
                    issuer: config.bridge_xrpl_address,
                    currency: token.xrpl_currency,
                    amount: xrpl_amount,
                    max_amount: Some(xrpl_amount),
                    funds,
                    sender,
                    recipient: recipient.to_owned(),
                },
            )?;
            register_used_ticket(storage)?;
        }
    }

    Ok(())
}

fn claim_relayer_fees(
    deps: DepsMut,
    sender: Addr,
    amounts: Vec<Coin>,
) -> CoreumResult<ContractError> {
    assert_relayer(deps.storage, &sender)?;
    assert_bridge_active(deps.storage)?;

    claim_fees(deps.storage, &sender, &amounts)?;

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: sender.to_string(),
            amount: amounts,
        })
        .add_attribute("action", ContractActions::ClaimRelayerFees.as_str())
        .add_attribute("sender", sender))
}

fn claim_refund(
    deps: DepsMut,
    sender: Addr,
    pending_refund_id: String,
) -> CoreumResult<ContractError> {
    assert_bridge_active(deps.storage)?;

    let refunded_coin = remove_pending_refund(deps.storage, &sender, pending_refund_id.clone())?;

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: sender.to_string(),
            amount: vec![refunded_coin.clone()],
        })
        .add_attribute("action", ContractActions::ClaimRefund.as_str())
        .add_attribute("sender", sender)
        .add_attribute("pending_refund_id", pending_refund_id)
        .add_attribute("coin", refunded_coin.to_string()))
}

fn halt_bridge(deps: DepsMut, sender: Addr) -> CoreumResult<ContractError> {
    // Any relayer can pull the brake, not only the owner
    if assert_owner(deps.storage, &sender).is_err() {
        assert_relayer(deps.storage, &sender)?;
    }

    let mut config = CONFIG.load(deps.storage)?;
    config.bridge_state = BridgeState::Halted;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::HaltBridge.as_str())
        .add_attribute("sender", sender))
}

fn resume_bridge(deps: DepsMut, sender: Addr) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    // An unresolved key rotation keeps the bridge down
    if PENDING_ROTATE_KEYS.load(deps.storage)? {
        return Err(ContractError::RotateKeysOngoing {});
    }

    let mut config = CONFIG.load(deps.storage)?;
    config.bridge_state = BridgeState::Active;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::ResumeBridge.as_str())
        .add_attribute("sender", sender))
}

fn rotate_keys(
    deps: DepsMut,
    sender: Addr,
    new_relayers: Vec<Relayer>,
    new_evidence_threshold: u32,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    // Only one rotation at a time
    if PENDING_ROTATE_KEYS.load(deps.storage)? {
        return Err(ContractError::RotateKeysOngoing {});
    }

    validate_relayers(deps.api, &new_relayers)?;
    validate_evidence_threshold(new_evidence_threshold, new_relayers.len())?;

    // The bridge halts for the whole rotation. The current relayer set stays
    // authoritative until the rotation is accepted on XRPL.
    let mut config = CONFIG.load(deps.storage)?;
    config.bridge_state = BridgeState::Halted;
    CONFIG.save(deps.storage, &config)?;
    PENDING_ROTATE_KEYS.save(deps.storage, &true)?;

    let ticket = allocate_ticket(deps.storage)?;
    create_pending_operation(
        deps.storage,
        Some(ticket),
        None,
        OperationType::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        },
    )?;
    register_used_ticket(deps.storage)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::RotateKeys.as_str())
        .add_attribute("sender", sender))
}

fn cancel_pending_operation(
    deps: DepsMut,
    sender: Addr,
    operation_id: u64,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    let operation = check_operation_exists(deps.storage, operation_id)?;
    cancel_operation(deps.storage, operation_id, operation)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::CancelPendingOperation.as_str())
        .add_attribute("operation_sequence", operation_id.to_string()))
}

fn update_xrpl_base_fee(
    deps: DepsMut,
    sender: Addr,
    xrpl_base_fee: u64,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    // Every pending operation gets the new fee snapshot and a bumped version;
    // the signatures collected over the old snapshot are void
    let operations: Vec<(u64, Operation)> = PENDING_OPERATIONS
        .range(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    for (operation_sequence, mut operation) in operations {
        operation.version += 1;
        operation.xrpl_base_fee = xrpl_base_fee;
        operation.signatures.clear();
        PENDING_OPERATIONS.save(deps.storage, operation_sequence, &operation)?;
    }

    let mut config = CONFIG.load(deps.storage)?;
    config.xrpl_base_fee = xrpl_base_fee;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::UpdateXRPLBaseFee.as_str())
        .add_attribute("xrpl_base_fee", xrpl_base_fee.to_string()))
}

fn update_prohibited_xrpl_addresses(
    deps: DepsMut,
    sender: Addr,
    prohibited_xrpl_addresses: Vec<String>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    let config = CONFIG.load(deps.storage)?;

    for address in &prohibited_xrpl_addresses {
        validate_xrpl_address(address)?;
    }

    // The bridge address itself is always prohibited as a transfer target
    let mut prohibited_xrpl_addresses = prohibited_xrpl_addresses;
    if !prohibited_xrpl_addresses.contains(&config.bridge_xrpl_address) {
        prohibited_xrpl_addresses.push(config.bridge_xrpl_address);
    }

    PROHIBITED_XRPL_ADDRESSES.save(deps.storage, &prohibited_xrpl_addresses)?;

    Ok(Response::new().add_attribute(
        "action",
        ContractActions::UpdateProhibitedXRPLAddresses.as_str(),
    ))
}

// ********** Queries **********
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::BridgeState {} => to_binary(&query_bridge_state(deps)?),
        QueryMsg::XRPLTokens {
            start_after_key,
            limit,
        } => to_binary(&query_xrpl_tokens(deps, start_after_key, limit)?),
        QueryMsg::XRPLToken { issuer, currency } => {
            to_binary(&query_xrpl_token(deps, issuer, currency)?)
        }
        QueryMsg::CoreumTokens {
            start_after_key,
            limit,
        } => to_binary(&query_coreum_tokens(deps, start_after_key, limit)?),
        QueryMsg::CoreumToken { denom } => to_binary(&query_coreum_token(deps, denom)?),
        QueryMsg::AvailableTickets {} => to_binary(&query_available_tickets(deps)?),
        QueryMsg::PendingOperations {
            start_after_key,
            limit,
        } => to_binary(&query_pending_operations(deps, start_after_key, limit)?),
        QueryMsg::TransactionEvidences {
            start_after_key,
            limit,
        } => to_binary(&query_transaction_evidences(deps, start_after_key, limit)?),
        QueryMsg::TransactionEvidence { hash } => {
            to_binary(&query_transaction_evidence(deps, hash)?)
        }
        QueryMsg::ProcessedTxs {
            start_after_key,
            limit,
        } => to_binary(&query_processed_txs(deps, start_after_key, limit)?),
        QueryMsg::ProcessedTx { hash } => to_binary(&query_processed_tx(deps, hash)?),
        QueryMsg::FeesCollected { relayer_address } => {
            to_binary(&query_fees_collected(deps, relayer_address)?)
        }
        QueryMsg::PendingRefunds {
            address,
            start_after_key,
            limit,
        } => to_binary(&query_pending_refunds(deps, address, start_after_key, limit)?),
        QueryMsg::ProhibitedXRPLAddresses {} => {
            to_binary(&query_prohibited_xrpl_addresses(deps)?)
        }
        QueryMsg::Ownership {} => to_binary(&get_ownership(deps.storage)?),
    }
}

fn query_config(deps: Deps) -> StdResult<Config> {
    CONFIG.load(deps.storage)
}

fn query_bridge_state(deps: Deps) -> StdResult<BridgeStateResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(BridgeStateResponse {
        state: config.bridge_state,
    })
}

fn query_xrpl_tokens(
    deps: Deps,
    start_after_key: Option<String>,
    limit: Option<u32>,
) -> StdResult<XRPLTokensResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let start = start_after_key.map(Bound::exclusive);
    let mut last_key = None;
    let tokens: Vec<XRPLToken> = XRPL_TOKENS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit as usize)
        .filter_map(Result::ok)
        .map(|(key, token)| {
            last_key = Some(key);
            token
        })
        .collect();

    Ok(XRPLTokensResponse { last_key, tokens })
}

fn query_xrpl_token(deps: Deps, issuer: String, currency: String) -> StdResult<XRPLTokenResponse> {
    let token = XRPL_TOKENS.load(deps.storage, build_xrpl_token_key(&issuer, &currency))?;

    Ok(XRPLTokenResponse { token })
}

fn query_coreum_tokens(
    deps: Deps,
    start_after_key: Option<String>,
    limit: Option<u32>,
) -> StdResult<CoreumTokensResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let start = start_after_key.map(Bound::exclusive);
    let mut last_key = None;
    let tokens: Vec<CoreumToken> = COREUM_TOKENS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit as usize)
        .filter_map(Result::ok)
        .map(|(key, token)| {
            last_key = Some(key);
            token
        })
        .collect();

    Ok(CoreumTokensResponse { last_key, tokens })
}

fn query_coreum_token(deps: Deps, denom: String) -> StdResult<CoreumTokenResponse> {
    let token = COREUM_TOKENS.load(deps.storage, denom)?;

    Ok(CoreumTokenResponse { token })
}

fn query_available_tickets(deps: Deps) -> StdResult<AvailableTicketsResponse> {
    let available_tickets = AVAILABLE_TICKETS.load(deps.storage)?;

    Ok(AvailableTicketsResponse {
        tickets: available_tickets.into_iter().collect(),
    })
}

fn query_pending_operations(
    deps: Deps,
    start_after_key: Option<u64>,
    limit: Option<u32>,
) -> StdResult<PendingOperationsResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let start = start_after_key.map(Bound::exclusive);
    let mut last_key = None;
    let operations: Vec<Operation> = PENDING_OPERATIONS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit as usize)
        .filter_map(Result::ok)
        .map(|(key, operation)| {
            last_key = Some(key);
            operation
        })
        .collect();

    Ok(PendingOperationsResponse {
        last_key,
        operations,
    })
}

fn query_transaction_evidences(
    deps: Deps,
    start_after_key: Option<String>,
    limit: Option<u32>,
) -> StdResult<TransactionEvidencesResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let start = start_after_key.map(Bound::exclusive);
    let mut last_key = None;
    let transaction_evidences: Vec<TransactionEvidence> = TX_EVIDENCES
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit as usize)
        .filter_map(Result::ok)
        .map(|(key, evidences)| {
            last_key = Some(key.clone());
            TransactionEvidence {
                hash: key,
                relayer_addresses: evidences.relayer_addresses,
            }
        })
        .collect();

    Ok(TransactionEvidencesResponse {
        last_key,
        transaction_evidences,
    })
}

fn query_transaction_evidence(deps: Deps, hash: String) -> StdResult<TransactionEvidence> {
    let evidences = TX_EVIDENCES.load(deps.storage, hash.clone())?;

    Ok(TransactionEvidence {
        hash,
        relayer_addresses: evidences.relayer_addresses,
    })
}

fn query_processed_txs(
    deps: Deps,
    start_after_key: Option<String>,
    limit: Option<u32>,
) -> StdResult<ProcessedTxsResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let start = start_after_key.map(Bound::exclusive);
    let processed_txs: Vec<String> = PROCESSED_TXS
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit as usize)
        .filter_map(Result::ok)
        .collect();

    Ok(ProcessedTxsResponse {
        last_key: processed_txs.last().cloned(),
        processed_txs,
    })
}

fn query_processed_tx(deps: Deps, hash: String) -> StdResult<bool> {
    Ok(PROCESSED_TXS.has(deps.storage, hash.to_lowercase()))
}

fn query_fees_collected(deps: Deps, relayer_address: Addr) -> StdResult<FeesCollectedResponse> {
    let fees_collected = FEES_COLLECTED
        .may_load(deps.storage, relayer_address)?
        .unwrap_or_default();

    Ok(FeesCollectedResponse { fees_collected })
}

fn query_pending_refunds(
    deps: Deps,
    address: Addr,
    start_after_key: Option<String>,
    limit: Option<u32>,
) -> StdResult<PendingRefundsResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let start = start_after_key.map(Bound::exclusive);
    let mut last_key = None;
    let pending_refunds: Vec<_> = PENDING_REFUNDS
        .prefix(address)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit as usize)
        .filter_map(Result::ok)
        .map(|(key, pending_refund)| {
            last_key = Some(key);
            pending_refund
        })
        .collect();

    Ok(PendingRefundsResponse {
        last_key,
        pending_refunds,
    })
}

fn query_prohibited_xrpl_addresses(deps: Deps) -> StdResult<ProhibitedXRPLAddressesResponse> {
    let prohibited_xrpl_addresses = PROHIBITED_XRPL_ADDRESSES.load(deps.storage)?;

    Ok(ProhibitedXRPLAddressesResponse {
        prohibited_xrpl_addresses,
    })
}

// ********** Helpers **********

fn check_issue_fee(
    deps: &DepsMut<CoreumQueries>,
    info: &MessageInfo,
) -> Result<(), ContractError> {
    let query_params_res: ParamsResponse = deps
        .querier
        .query(&CoreumQueries::AssetFT(Query::Params {}).into())?;

    if query_params_res.params.issue_fee != one_coin(info)? {
        return Err(ContractError::InvalidIssueFee {});
    }

    Ok(())
}

pub fn assert_bridge_active(storage: &dyn Storage) -> Result<(), ContractError> {
    let config = CONFIG.load(storage)?;

    if config.bridge_state.ne(&BridgeState::Active) {
        return Err(ContractError::BridgeHalted {});
    }

    Ok(())
}

/// Inbound transfers may pay out to any account except the contract itself and
/// the host chain module accounts, whose bank balances are off limits.
fn validate_coreum_recipient(
    api: &dyn Api,
    env: &Env,
    recipient: &Addr,
) -> Result<(), ContractError> {
    if *recipient == env.contract.address {
        return Err(ContractError::ProhibitedAddress {});
    }

    let canonical_recipient = api.addr_canonicalize(recipient.as_str())?;
    for module_name in BLOCKED_MODULE_ACCOUNTS {
        let module_account = Sha256::digest(module_name.as_bytes());
        if canonical_recipient.as_slice() == &module_account[..20] {
            return Err(ContractError::RecipientBlocked {});
        }
    }

    Ok(())
}

fn add_mint_and_send(
    response: Response<CoreumMsg>,
    total_amount: Uint128,
    amount_to_send: Uint128,
    denom: &str,
    recipient: &Addr,
) -> Response<CoreumMsg> {
    // The full evidence amount is minted: what is not sent to the recipient
    // backs the collected fees held by the contract
    let mint_msg = CosmosMsg::from(CoreumMsg::AssetFT(assetft::Msg::Mint {
        coin: coin(total_amount.u128(), denom),
        recipient: None,
    }));

    let send_msg = CosmosMsg::Bank(BankMsg::Send {
        to_address: recipient.to_string(),
        amount: coins(amount_to_send.u128(), denom),
    });

    response.add_messages([mint_msg, send_msg])
}
