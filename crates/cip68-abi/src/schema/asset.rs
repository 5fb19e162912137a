//! Request and chain-state types for CIP68 lifecycle operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unit name of the chain's native currency.
pub const LOVELACE_UNIT: &str = "lovelace";

/// Caller-supplied metadata stored in the reference token's datum.
pub type Metadata = BTreeMap<String, String>;

/// One unit/quantity pair inside a UTxO value or a produced output.
///
/// Quantities are signed: burn instructions and over-burn remainders are
/// negative, and the ledger is the final arbiter of what balances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetQuantity {
    pub unit: String,
    pub quantity: i64,
}

impl AssetQuantity {
    #[must_use]
    pub fn new(unit: impl Into<String>, quantity: i64) -> Self {
        Self {
            unit: unit.into(),
            quantity,
        }
    }
}

/// An unspent transaction output as observed on-chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Utxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub address: String,
    pub amount: Vec<AssetQuantity>,
    /// Hex-encoded CBOR payload, as chain providers return it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_datum: Option<String>,
}

impl Utxo {
    /// Total quantity of `unit` held in this output.
    #[must_use]
    pub fn quantity_of(&self, unit: &str) -> i64 {
        self.amount
            .iter()
            .filter(|asset| asset.unit == unit)
            .map(|asset| asset.quantity)
            .sum()
    }

    /// Whether this output carries a non-empty inline datum.
    #[must_use]
    pub fn has_inline_datum(&self) -> bool {
        self.inline_datum
            .as_ref()
            .is_some_and(|datum| !datum.is_empty())
    }
}

/// One mint work item: create a new asset pair or top up an existing one.
///
/// `quantity` is a signed integer rendered as a string, the form in which
/// requests travel between services. An absent or empty `receiver` means the
/// caller's own address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MintAssetParams {
    pub asset_name: String,
    pub metadata: Metadata,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

/// One burn work item. `tx_hash` pins the store-UTxO lookup to an explicit
/// prior transaction instead of current on-chain state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BurnAssetParams {
    pub asset_name: String,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// One metadata-update work item; same store-UTxO resolution as burning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateAssetParams {
    pub asset_name: String,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// The caller's wallet view required to furnish a transaction, supplied by
/// the wallet collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletContext {
    pub address: String,
    pub pub_key_hash: String,
    pub utxos: Vec<Utxo>,
    pub collateral: Utxo,
}
