use thiserror::Error;

/// Errors from the CIP68 lifecycle core.
///
/// Every variant aborts the whole batch before any instruction reaches the
/// builder collaborator; batch-level variants carry all offending asset names
/// collected across the batch's concurrent branches.
#[derive(Debug, Error)]
pub enum Cip68Error {
    #[error("batch mixes new and existing assets; already minted: {}", .assets.join(", "))]
    MixedMintNotSupported { assets: Vec<String> },

    #[error("caller key hash does not match the reference datum owner for: {}", .assets.join(", "))]
    NotAssetOwner { assets: Vec<String> },

    #[error("no live reference UTxO at the store address for: {}", .assets.join(", "))]
    StoreUtxoNotFound { assets: Vec<String> },

    #[error("malformed inline datum: {0}")]
    MalformedDatum(String),

    #[error("datum encoding failed: {0}")]
    DatumEncode(String),

    #[error("invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid quantity '{value}' for asset '{asset_name}': {message}")]
    InvalidQuantity {
        asset_name: String,
        value: String,
        message: String,
    },

    #[error("output index {0} does not fit in the one-byte name prefix")]
    OutputIndexOutOfRange(u32),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Builder(#[from] BuilderError),
}

/// Errors surfaced by the chain-query collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("chain query failed: {0}")]
    Query(String),

    #[error("chain provider returned malformed data: {0}")]
    InvalidData(String),
}

/// Errors surfaced by the transaction-builder collaborator. Opaque to the
/// core: a builder failure aborts the operation without interpretation.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("script evaluation failed: {0}")]
    ScriptEvaluation(String),

    #[error("transaction builder failed: {0}")]
    Other(String),
}
