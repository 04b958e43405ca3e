use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Coin, Uint128};
use cw_ownable::{cw_ownable_execute, cw_ownable_query};

use crate::{
    evidence::Evidence,
    operation::Operation,
    relayer::Relayer,
    state::{BridgeState, Config, CoreumToken, PendingRefund, TokenState, XRPLToken},
};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: Addr,
    // Relayers allowed to attest XRPL activity and sign outbound operations
    pub relayers: Vec<Relayer>,
    // How many distinct relayer attestations commit an evidence
    pub evidence_threshold: u32,
    // Used ticket count that triggers a ticket replenishment operation
    pub used_ticket_sequence_threshold: u32,
    // Limit of the trust lines the bridge sets for registered XRPL tokens
    pub trust_set_limit_amount: Uint128,
    // The multisig account on XRPL this contract coordinates
    pub bridge_xrpl_address: String,
    pub xrpl_base_fee: u64,
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct SendToXRPLRequest {
    pub recipient: String,
    pub coin: Coin,
    pub deliver_amount: Option<Uint128>,
}

#[cw_serde]
pub struct OperationSignature {
    pub operation_id: u64,
    pub operation_version: u64,
    pub signature: String,
}

#[cw_ownable_execute]
#[cw_serde]
pub enum ExecuteMsg {
    RegisterCoreumToken {
        denom: String,
        decimals: u32,
        sending_precision: i32,
        max_holding_amount: Uint128,
        bridging_fee: Uint128,
    },
    #[serde(rename = "register_xrpl_token")]
    RegisterXRPLToken {
        issuer: String,
        currency: String,
        sending_precision: i32,
        max_holding_amount: Uint128,
        bridging_fee: Uint128,
    },
    UpdateCoreumToken {
        denom: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<Uint128>,
        max_holding_amount: Option<Uint128>,
    },
    #[serde(rename = "update_xrpl_token")]
    UpdateXRPLToken {
        issuer: String,
        currency: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<Uint128>,
        max_holding_amount: Option<Uint128>,
    },
    #[serde(rename = "recover_xrpl_token_registration")]
    RecoverXRPLTokenRegistration {
        issuer: String,
        currency: String,
    },
    RecoverTickets {
        account_sequence: u64,
        number_of_tickets: Option<u32>,
    },
    SaveEvidence {
        evidence: Evidence,
    },
    SaveSignature {
        operation_id: u64,
        operation_version: u64,
        signature: String,
    },
    SaveMultipleSignatures {
        signatures: Vec<OperationSignature>,
    },
    #[serde(rename = "send_to_xrpl")]
    SendToXRPL {
        recipient: String,
        deliver_amount: Option<Uint128>,
    },
    #[serde(rename = "multi_send_to_xrpl")]
    MultiSendToXRPL {
        requests: Vec<SendToXRPLRequest>,
    },
    ClaimRelayerFees {
        amounts: Vec<Coin>,
    },
    ClaimRefund {
        pending_refund_id: String,
    },
    HaltBridge {},
    ResumeBridge {},
    RotateKeys {
        new_relayers: Vec<Relayer>,
        new_evidence_threshold: u32,
    },
    CancelPendingOperation {
        operation_id: u64,
    },
    #[serde(rename = "update_xrpl_base_fee")]
    UpdateXRPLBaseFee {
        xrpl_base_fee: u64,
    },
    #[serde(rename = "update_prohibited_xrpl_addresses")]
    UpdateProhibitedXRPLAddresses {
        prohibited_xrpl_addresses: Vec<String>,
    },
}

#[cw_ownable_query]
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(BridgeStateResponse)]
    BridgeState {},
    #[returns(XRPLTokensResponse)]
    #[serde(rename = "xrpl_tokens")]
    XRPLTokens {
        start_after_key: Option<String>,
        limit: Option<u32>,
    },
    #[returns(XRPLTokenResponse)]
    #[serde(rename = "xrpl_token")]
    XRPLToken { issuer: String, currency: String },
    #[returns(CoreumTokensResponse)]
    CoreumTokens {
        start_after_key: Option<String>,
        limit: Option<u32>,
    },
    #[returns(CoreumTokenResponse)]
    CoreumToken { denom: String },
    #[returns(AvailableTicketsResponse)]
    AvailableTickets {},
    #[returns(PendingOperationsResponse)]
    PendingOperations {
        start_after_key: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(TransactionEvidencesResponse)]
    TransactionEvidences {
        start_after_key: Option<String>,
        limit: Option<u32>,
    },
    #[returns(TransactionEvidence)]
    TransactionEvidence { hash: String },
    #[returns(ProcessedTxsResponse)]
    ProcessedTxs {
        start_after_key: Option<String>,
        limit: Option<u32>,
    },
    #[returns(bool)]
    ProcessedTx { hash: String },
    #[returns(FeesCollectedResponse)]
    FeesCollected { relayer_address: Addr },
    #[returns(PendingRefundsResponse)]
    PendingRefunds {
        address: Addr,
        start_after_key: Option<String>,
        limit: Option<u32>,
    },
    #[returns(ProhibitedXRPLAddressesResponse)]
    #[serde(rename = "prohibited_xrpl_addresses")]
    ProhibitedXRPLAddresses {},
}

#[cw_serde]
pub struct BridgeStateResponse {
    pub state: BridgeState,
}

#[cw_serde]
pub struct XRPLTokensResponse {
    pub last_key: Option<String>,
    pub tokens: Vec<XRPLToken>,
}

#[cw_serde]
pub struct XRPLTokenResponse {
    pub token: XRPLToken,
}

#[cw_serde]
pub struct CoreumTokensResponse {
    pub last_key: Option<String>,
    pub tokens: Vec<CoreumToken>,
}

#[cw_serde]
pub struct CoreumTokenResponse {
    pub token: CoreumToken,
}

#[cw_serde]
pub struct AvailableTicketsResponse {
    pub tickets: Vec<u64>,
}

#[cw_serde]
pub struct PendingOperationsResponse {
    pub last_key: Option<u64>,
    pub operations: Vec<Operation>,
}

#[cw_serde]
pub struct TransactionEvidence {
    pub hash: String,
    pub relayer_addresses: Vec<Addr>,
}

#[cw_serde]
pub struct TransactionEvidencesResponse {
    pub last_key: Option<String>,
    pub transaction_evidences: Vec<TransactionEvidence>,
}

#[cw_serde]
pub struct ProcessedTxsResponse {
    pub last_key: Option<String>,
    pub processed_txs: Vec<String>,
}

#[cw_serde]
pub struct FeesCollectedResponse {
    pub fees_collected: Vec<Coin>,
}

#[cw_serde]
pub struct PendingRefundsResponse {
    pub last_key: Option<String>,
    pub pending_refunds: Vec<PendingRefund>,
}

#[cw_serde]
pub struct ProhibitedXRPLAddressesResponse {
    pub prohibited_xrpl_addresses: Vec<String>,
}
