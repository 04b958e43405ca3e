use std::collections::VecDeque;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, Empty, Uint128};
use cw_storage_plus::{Index, IndexList, IndexedMap, Item, Map, UniqueIndex};

use crate::{operation::Operation, relayer::Relayer};

/// Top level storage key. Values must not conflict.
/// Each key is only one byte long to ensure we use the smallest possible storage keys.
#[repr(u8)]
pub enum TopKey {
    Config = b'c',
    CoreumTokens = b'1',
    XRPLTokens = b'2',
    UsedXRPLCurrencies = b'3',
    AvailableTickets = b'4',
    UsedTicketsCounter = b'5',
    PendingTicketUpdate = b'6',
    PendingOperations = b'7',
    TransactionEvidences = b'8',
    ProcessedTxs = b'9',
    FeesCollected = b'f',
    FeeRemainders = b'm',
    PendingRefunds = b'p',
    PendingRotateKeys = b'k',
    ProhibitedXRPLAddresses = b'x',
    XRPLDenomCounter = b'd',
    RefundCounter = b'u',
}

impl TopKey {
    const fn as_str(&self) -> &str {
        let array_ref = unsafe { std::mem::transmute::<_, &[u8; 1]>(self) };
        match core::str::from_utf8(array_ref) {
            Ok(a) => a,
            Err(_) => panic!("Non-utf8 enum value found. Use a-z, A-Z and 0-9"),
        }
    }
}

#[cw_serde]
pub enum BridgeState {
    Active,
    Halted,
}

#[cw_serde]
pub struct Config {
    pub relayers: Vec<Relayer>,
    pub evidence_threshold: u32,
    pub used_ticket_sequence_threshold: u32,
    pub trust_set_limit_amount: Uint128,
    pub bridge_xrpl_address: String,
    pub bridge_state: BridgeState,
    pub xrpl_base_fee: u64,
}

#[cw_serde]
pub enum TokenState {
    // TrustSet operation is pending on XRPL, the token can't be bridged yet
    Processing,
    Enabled,
    Disabled,
    // TrustSet operation was rejected or cancelled, registration can be recovered
    Inactive,
}

#[cw_serde]
pub struct XRPLToken {
    pub issuer: String,
    pub currency: String,
    pub coreum_denom: String,
    pub sending_precision: i32,
    pub max_holding_amount: Uint128,
    pub bridging_fee: Uint128,
    pub state: TokenState,
}

#[cw_serde]
pub struct CoreumToken {
    pub denom: String,
    pub decimals: u32,
    pub xrpl_currency: String,
    pub sending_precision: i32,
    pub max_holding_amount: Uint128,
    pub bridging_fee: Uint128,
    pub state: TokenState,
}

#[cw_serde]
pub struct Evidences {
    pub relayer_addresses: Vec<Addr>,
}

#[cw_serde]
pub struct PendingRefund {
    pub id: String,
    pub xrpl_tx_hash: Option<String>,
    pub coin: Coin,
}

pub const CONFIG: Item<Config> = Item::new(TopKey::Config.as_str());

// Tokens registered from the Coreum side - key is the denom on the Coreum chain.
// The unique xrpl_currency index resolves the token for evidences coming back
// from XRPL, where only the currency issued by the bridge address is known.
pub struct CoreumTokensIndexes<'a> {
    pub xrpl_currency: UniqueIndex<'a, String, CoreumToken, String>,
}

impl<'a> IndexList<CoreumToken> for CoreumTokensIndexes<'a> {
    fn get_indexes(&'_ self) -> Box<dyn Iterator<Item = &'_ dyn Index<CoreumToken>> + '_> {
        let v: Vec<&dyn Index<CoreumToken>> = vec![&self.xrpl_currency];
        Box::new(v.into_iter())
    }
}

pub const COREUM_TOKENS: IndexedMap<String, CoreumToken, CoreumTokensIndexes<'static>> =
    IndexedMap::new(
    TopKey::CoreumTokens.as_str(),
    CoreumTokensIndexes {
        xrpl_currency: UniqueIndex::new(
            |token| token.xrpl_currency.clone(),
            "coreum_tokens__xrpl_currency",
        ),
    },
);

// Tokens registered from the XRPL side - key is issuer+currency on XRPL
pub const XRPL_TOKENS: Map<String, XRPLToken> = Map::new(TopKey::XRPLTokens.as_str());
// XRPL currencies derived for Coreum tokens, guarding against derivation collisions
pub const USED_XRPL_CURRENCIES: Map<String, Empty> = Map::new(TopKey::UsedXRPLCurrencies.as_str());

// Tickets available for outbound operations, lowest first
pub const AVAILABLE_TICKETS: Item<VecDeque<u64>> = Item::new(TopKey::AvailableTickets.as_str());
pub const USED_TICKETS_COUNTER: Item<u32> = Item::new(TopKey::UsedTicketsCounter.as_str());
// Set while an AllocateTickets operation is in flight
pub const PENDING_TICKET_UPDATE: Item<bool> = Item::new(TopKey::PendingTicketUpdate.as_str());

// Outbound operations awaiting signatures and a result evidence,
// keyed by ticket sequence or account sequence
pub const PENDING_OPERATIONS: Map<u64, Operation> = Map::new(TopKey::PendingOperations.as_str());

// Attestations collected per canonical evidence hash, until the threshold is reached
pub const TX_EVIDENCES: Map<String, Evidences> = Map::new(TopKey::TransactionEvidences.as_str());
// XRPL transaction hashes whose evidence has been executed, to stop replays
pub const PROCESSED_TXS: Map<String, Empty> = Map::new(TopKey::ProcessedTxs.as_str());

// Bridging fees each relayer can claim, and the indivisible residue per denom
// that is folded into the next fee event for the same denom
pub const FEES_COLLECTED: Map<Addr, Vec<Coin>> = Map::new(TopKey::FeesCollected.as_str());
pub const FEE_REMAINDERS: Map<String, Uint128> = Map::new(TopKey::FeeRemainders.as_str());

// Refundable coins per (address, refund id) after rejected or cancelled transfers
pub const PENDING_REFUNDS: Map<(Addr, String), PendingRefund> =
    Map::new(TopKey::PendingRefunds.as_str());

pub const PENDING_ROTATE_KEYS: Item<bool> = Item::new(TopKey::PendingRotateKeys.as_str());

pub const PROHIBITED_XRPL_ADDRESSES: Item<Vec<String>> =
    Item::new(TopKey::ProhibitedXRPLAddresses.as_str());

// Monotone counters so that every identifier the contract mints is
// reproducible across replicas
pub const XRPL_DENOM_COUNTER: Item<u64> = Item::new(TopKey::XRPLDenomCounter.as_str());
pub const REFUND_COUNTER: Item<u64> = Item::new(TopKey::RefundCounter.as_str());

pub enum ContractActions {
    Instantiation,
    RegisterCoreumToken,
    RegisterXRPLToken,
    UpdateCoreumToken,
    UpdateXRPLToken,
    RecoverXRPLTokenRegistration,
    RecoverTickets,
    SaveEvidence,
    SaveSignature,
    SendToXRPL,
    MultiSendToXRPL,
    ClaimRelayerFees,
    ClaimRefund,
    HaltBridge,
    ResumeBridge,
    RotateKeys,
    CancelPendingOperation,
    UpdateXRPLBaseFee,
    UpdateProhibitedXRPLAddresses,
    Migration,
}

impl ContractActions {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Instantiation => "bridge_instantiation",
            Self::RegisterCoreumToken => "register_coreum_token",
            Self::RegisterXRPLToken => "register_xrpl_token",
            Self::UpdateCoreumToken => "update_coreum_token",
            Self::UpdateXRPLToken => "update_xrpl_token",
            Self::RecoverXRPLTokenRegistration => "recover_xrpl_token_registration",
            Self::RecoverTickets => "recover_tickets",
            Self::SaveEvidence => "save_evidence",
            Self::SaveSignature => "save_signature",
            Self::SendToXRPL => "send_to_xrpl",
            Self::MultiSendToXRPL => "multi_send_to_xrpl",
            Self::ClaimRelayerFees => "claim_relayer_fees",
            Self::ClaimRefund => "claim_refund",
            Self::HaltBridge => "halt_bridge",
            Self::ResumeBridge => "resume_bridge",
            Self::RotateKeys => "rotate_keys",
            Self::CancelPendingOperation => "cancel_pending_operation",
            Self::UpdateXRPLBaseFee => "update_xrpl_base_fee",
            Self::UpdateProhibitedXRPLAddresses => "update_prohibited_xrpl_addresses",
            Self::Migration => "contract_migration",
        }
    }
}
