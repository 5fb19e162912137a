//! Builder instructions: the ordered, immutable command sequence one
//! lifecycle operation hands to the transaction-builder collaborator.
//!
//! The sequence is accumulated up front and replayed in one pass, so
//! instruction order is data and can be asserted on directly.

use serde::{Deserialize, Serialize};

use crate::config::Network;
use crate::datum;
use crate::error::{BuilderError, Cip68Error};
use crate::schema::asset::{AssetQuantity, Utxo};

/// Which deployed validator an operation parameter refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    Mint,
    Store,
}

/// Plutus V3 script carried as hex-encoded CBOR.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlutusScript {
    pub cbor: String,
}

impl PlutusScript {
    #[must_use]
    pub fn new(cbor: impl Into<String>) -> Self {
        Self { cbor: cbor.into() }
    }
}

/// Redeemer handed to a validator; each variant is a fieldless constructor
/// record on-chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RedeemerKind {
    /// Mint validator: issue reference/user tokens.
    Issue,
    /// Mint validator: burn previously issued tokens.
    Burn,
    /// Store validator: spend and recreate the reference UTxO.
    Update,
    /// Store validator: retire the reference UTxO.
    Remove,
}

impl RedeemerKind {
    /// Constructor index of the on-chain redeemer value.
    #[must_use]
    pub const fn constructor_index(self) -> u64 {
        match self {
            Self::Issue | Self::Update => 0,
            Self::Burn | Self::Remove => 1,
        }
    }

    /// CBOR encoding of the redeemer.
    pub fn to_cbor(self) -> Result<Vec<u8>, Cip68Error> {
        datum::encode_constr(self.constructor_index(), Vec::new())
    }
}

/// One immutable builder command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuilderInstruction {
    /// Spend a plain (non-script) input.
    SpendInput { tx_hash: String, output_index: u32 },
    /// Spend a script-locked UTxO with the given validator and redeemer.
    SpendScriptInput {
        tx_hash: String,
        output_index: u32,
        script: PlutusScript,
        redeemer: RedeemerKind,
        inline_datum_present: bool,
    },
    /// Mint (positive) or burn (negative) `quantity` of `unit`.
    MintAsset {
        unit: String,
        quantity: i64,
        script: PlutusScript,
        redeemer: RedeemerKind,
    },
    /// Produce one transaction output.
    ProduceOutput {
        address: String,
        assets: Vec<AssetQuantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inline_datum: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datum_hash: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_script: Option<PlutusScript>,
    },
    SetChangeAddress { address: String },
    RequireSigner { key_hash: String },
    SelectUtxosFrom { utxos: Vec<Utxo> },
    SetCollateral { utxo: Utxo },
    SetNetwork { network: Network },
}

impl BuilderInstruction {
    /// A bare output with no datum or attached script.
    #[must_use]
    pub fn output(address: impl Into<String>, assets: Vec<AssetQuantity>) -> Self {
        Self::ProduceOutput {
            address: address.into(),
            assets,
            inline_datum: None,
            datum_hash: None,
            reference_script: None,
        }
    }

    /// An output carrying a hex-encoded inline datum.
    #[must_use]
    pub fn output_with_datum(
        address: impl Into<String>,
        assets: Vec<AssetQuantity>,
        inline_datum: String,
    ) -> Self {
        Self::ProduceOutput {
            address: address.into(),
            assets,
            inline_datum: Some(inline_datum),
            datum_hash: None,
            reference_script: None,
        }
    }
}

/// Builder collaborator: turns one instruction sequence into a serializable
/// unsigned transaction. Fee calculation, UTXO selection and witness
/// attachment all live behind this boundary.
pub trait TransactionBuilder {
    /// Serializable unsigned-transaction representation.
    type UnsignedTx;

    fn complete(
        &self,
        instructions: &[BuilderInstruction],
    ) -> Result<Self::UnsignedTx, BuilderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeemers_encode_as_fieldless_constructors() {
        assert_eq!(hex::encode(RedeemerKind::Issue.to_cbor().expect("encodes")), "d87980");
        assert_eq!(hex::encode(RedeemerKind::Burn.to_cbor().expect("encodes")), "d87a80");
        assert_eq!(hex::encode(RedeemerKind::Update.to_cbor().expect("encodes")), "d87980");
        assert_eq!(hex::encode(RedeemerKind::Remove.to_cbor().expect("encodes")), "d87a80");
    }

    #[test]
    fn instructions_serialize_as_snake_case_tagged_values() {
        let instruction = BuilderInstruction::MintAsset {
            unit: "c0ffee000de1406131".to_string(),
            quantity: -2,
            script: PlutusScript::new("4d01"),
            redeemer: RedeemerKind::Burn,
        };

        let value = serde_json::to_value(&instruction).expect("serializes");

        assert_eq!(value["type"], "mint_asset");
        assert_eq!(value["quantity"], -2);
        assert_eq!(value["redeemer"], "burn");
    }

    #[test]
    fn optional_output_fields_are_omitted_when_unset() {
        let value =
            serde_json::to_value(BuilderInstruction::output("addr_test1_x", Vec::new()))
                .expect("serializes");

        assert!(value.get("inline_datum").is_none());
        assert!(value.get("reference_script").is_none());
    }
}
