use cosmwasm_std::{DivideByZeroError, OverflowError, StdError};
use cw_ownable::OwnershipError;
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    DivideByZero(#[from] DivideByZeroError),

    #[error("UnauthorizedSender: Sender is not a valid relayer")]
    UnauthorizedSender {},

    #[error("InvalidThreshold: Threshold can not be 0 or higher than the amount of relayers")]
    InvalidThreshold {},

    #[error("TooManyRelayers: Relayer set can not be larger than the maximum allowed XRPL signers")]
    TooManyRelayers {},

    #[error("DuplicatedRelayerCoreumAddress: All relayers must have different coreum addresses")]
    DuplicatedRelayerCoreumAddress {},

    #[error("DuplicatedRelayerXRPLAddress: All relayers must have different XRPL addresses")]
    DuplicatedRelayerXRPLAddress {},

    #[error("DuplicatedRelayerXRPLPubKey: All relayers must have different XRPL public keys")]
    DuplicatedRelayerXRPLPubKey {},

    #[error("InvalidIssueFee: Need to send exactly the issue fee amount")]
    InvalidIssueFee {},

    #[error("InvalidUsedTicketSequenceThreshold: Used ticket sequence threshold must be more than 1 and less or equal than {}", crate::contract::MAX_TICKETS_TO_ALLOCATE)]
    InvalidUsedTicketSequenceThreshold {},

    #[error("BridgeHalted: The bridge is currently halted and this operation is not allowed")]
    BridgeHalted {},

    #[error("RotateKeysOngoing: There is a key rotation pending to be confirmed")]
    RotateKeysOngoing {},

    #[error("CoreumTokenAlreadyRegistered: Token {} already registered", denom)]
    CoreumTokenAlreadyRegistered { denom: String },

    #[error(
        "XRPLTokenAlreadyRegistered: Token with issuer: {} and currency: {} is already registered",
        issuer,
        currency
    )]
    XRPLTokenAlreadyRegistered { issuer: String, currency: String },

    #[error(
        "RegistrationFailure: Currency/denom derived for this token already exists, please try again"
    )]
    RegistrationFailure {},

    #[error("TokenNotRegistered: The token must be registered first before bridging")]
    TokenNotRegistered {},

    #[error("TokenNotEnabled: This token must be enabled to be bridged")]
    TokenNotEnabled {},

    #[error("XRPLTokenNotInactive: To recover this token it must be inactive")]
    XRPLTokenNotInactive {},

    #[error("TokenStateIsImmutable: Current token state is immutable")]
    TokenStateIsImmutable {},

    #[error("InvalidTargetTokenState: A token state can only be updated to enabled or disabled")]
    InvalidTargetTokenState {},

    #[error("InvalidTargetMaxHoldingAmount: Max holding amount can't be lower than the current amount of held tokens")]
    InvalidTargetMaxHoldingAmount {},

    #[error(
        "InvalidSendingPrecision: The sending precision can't be more than the token decimals or less than the minimum XRPL decimal value"
    )]
    InvalidSendingPrecision {},

    #[error("InvalidDenom: The provided denom is not a valid Coreum denom")]
    InvalidDenom {},

    #[error("InvalidXRPLCurrency: The currency must be a valid XRPL currency")]
    InvalidXRPLCurrency {},

    #[error("InvalidXRPLAddress: The XRPL address {} is not valid", address)]
    InvalidXRPLAddress { address: String },

    #[error("InvalidXRPLAmount: The amount must not have more than {} significant digits", crate::amount::MAX_XRPL_AMOUNT_DIGITS)]
    InvalidXRPLAmount {},

    #[error("InvalidAmount: Amount must be more than 0")]
    InvalidAmount {},

    #[error("InvalidUint128: The value can not be represented as a 128 bit unsigned integer")]
    InvalidUint128 {},

    #[error("AmountSentIsZeroAfterTruncation: Amount was truncated to 0 with the token sending precision")]
    AmountSentIsZeroAfterTruncation {},

    #[error("CannotCoverBridgingFees: The amount sent is not enough to cover the bridging fees")]
    CannotCoverBridgingFees {},

    #[error("MaximumBridgedAmountReached: The maximum amount this contract can have bridged has been reached")]
    MaximumBridgedAmountReached {},

    #[error("InvalidDeliverAmount: The deliver amount must be less or equal than the amount after fees and truncation")]
    InvalidDeliverAmount {},

    #[error("DeliverAmountIsProhibited: Deliver amount can only be used with XRPL originated tokens that are not XRP")]
    DeliverAmountIsProhibited {},

    #[error("ProhibitedAddress: The recipient address is prohibited from receiving transfers")]
    ProhibitedAddress {},

    #[error("RecipientBlocked: The recipient is a blocked module account and can not receive transfers")]
    RecipientBlocked {},

    #[error("OperationAlreadyExecuted: The operation has already been executed")]
    OperationAlreadyExecuted {},

    #[error(
        "EvidenceAlreadyProvided: The relayer already provided its evidence for the operation"
    )]
    EvidenceAlreadyProvided {},

    #[error("InvalidTransactionResultEvidence: An evidence must contain only one of sequence number or ticket number")]
    InvalidTransactionResultEvidence {},

    #[error("InvalidSuccessfulTransactionResultEvidence: An evidence with a successful transaction must contain a transaction hash")]
    InvalidSuccessfulTransactionResultEvidence {},

    #[error("InvalidFailedTransactionResultEvidence: An evidence with an invalid transaction can't have a transaction hash")]
    InvalidFailedTransactionResultEvidence {},

    #[error("InvalidTicketAllocationEvidence: Tickets have to be present if operation is accepted and absent if operation is rejected or invalid")]
    InvalidTicketAllocationEvidence {},

    #[error("InvalidOperationResult: The operation result delivered does not match the pending operation type")]
    InvalidOperationResult {},

    #[error("PendingOperationNotFound: There is no pending operation with this ticket/sequence number")]
    PendingOperationNotFound {},

    #[error("PendingOperationAlreadyExists: There is already a pending operation with this ticket/sequence number")]
    PendingOperationAlreadyExists {},

    #[error("OperationVersionMismatch: The signature was provided for a different version of the operation")]
    OperationVersionMismatch {},

    #[error("SignatureAlreadyProvided: There is already a signature provided for this relayer and this operation")]
    SignatureAlreadyProvided {},

    #[error("InvalidSignatureLength: The signature provided is too long")]
    InvalidSignatureLength {},

    #[error("InvalidTicketSequenceToAllocate: The number of tickets to recover must be more than 0 and less or equal than the maximum allowed")]
    InvalidTicketSequenceToAllocate {},

    #[error(
        "PendingTicketUpdate: There is a pending ticket update operation already in the queue"
    )]
    PendingTicketUpdate {},

    #[error("StillHaveAvailableTickets: Tickets can only be recovered after the current set has been used up")]
    StillHaveAvailableTickets {},

    #[error("NoAvailableTickets: There are no available tickets left to perform the operation")]
    NoAvailableTickets {},

    #[error("LastTicketReserved: Last available ticket is reserved for updating tickets")]
    LastTicketReserved {},

    #[error("InvalidFundsAmount: The funds attached must match the sum of the requested transfers")]
    InvalidFundsAmount {},

    #[error("NotEnoughFeesToClaim: The fees claimed for denom {} exceed the amount collected for this relayer", denom)]
    NotEnoughFeesToClaim { denom: String },

    #[error("PendingRefundNotFound: There is no pending refund with this id for this address")]
    PendingRefundNotFound {},

    #[error("AssetFTFreezing: The recipient balance for this token is frozen")]
    AssetFTFreezing {},

    #[error("AssetFTGlobalFreezing: The token is globally frozen")]
    AssetFTGlobalFreezing {},

    #[error("AssetFTWhitelistedLimitExceeded: The transfer exceeds the whitelisted limit of the recipient")]
    AssetFTWhitelistedLimitExceeded {},

    #[error("AssetFTStateError: The token module rejected the transfer")]
    AssetFTStateError {},
}
