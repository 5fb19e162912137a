//! Deployment-scoped configuration threaded into every component.
//!
//! Nothing here is process-wide: callers construct one [`Cip68Config`] per
//! deployed script pair and hand it to the runtime at construction.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::label::{CIP68_REFERENCE_LABEL, CIP68_USER_LABEL};
use crate::schema::instruction::{PlutusScript, ScriptKind};

/// Default lovelace amount locked together with a published reference script.
pub const DEFAULT_REFERENCE_SCRIPT_LOVELACE: u64 = 20_000_000;

/// Cardano network the assembled transactions target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Mainnet,
    Preprod,
    #[default]
    Preview,
    Testnet,
}

impl Network {
    /// Numeric network id as used by wallet and provider tooling.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Preprod | Self::Preview | Self::Testnet => 0,
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "preprod" => Ok(Self::Preprod),
            "preview" => Ok(Self::Preview),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network '{other}'")),
        }
    }
}

/// Configuration for one deployed CIP68 script pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cip68Config {
    pub network: Network,
    /// Policy id of the deployed minting script.
    pub policy_id: String,
    /// Script address holding every reference-token UTxO.
    pub store_address: String,
    pub mint_script: PlutusScript,
    pub store_script: PlutusScript,
    #[serde(default = "default_reference_script_lovelace")]
    pub reference_script_lovelace: u64,
}

fn default_reference_script_lovelace() -> u64 {
    DEFAULT_REFERENCE_SCRIPT_LOVELACE
}

impl Cip68Config {
    /// Full unit id of the reference token (label 100) for `asset_name`.
    #[must_use]
    pub fn reference_unit(&self, asset_name: &str) -> String {
        format!(
            "{}{CIP68_REFERENCE_LABEL}{}",
            self.policy_id,
            hex::encode(asset_name)
        )
    }

    /// Full unit id of the user token (label 222) for `asset_name`.
    #[must_use]
    pub fn user_unit(&self, asset_name: &str) -> String {
        format!(
            "{}{CIP68_USER_LABEL}{}",
            self.policy_id,
            hex::encode(asset_name)
        )
    }

    /// The deployed script an instruction refers to.
    #[must_use]
    pub const fn script(&self, kind: ScriptKind) -> &PlutusScript {
        match kind {
            ScriptKind::Mint => &self.mint_script,
            ScriptKind::Store => &self.store_script,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Cip68Config {
        Cip68Config {
            network: Network::Preview,
            policy_id: "c0ffee".to_string(),
            store_address: "addr_test1_store".to_string(),
            mint_script: PlutusScript::new("4d01"),
            store_script: PlutusScript::new("4d02"),
            reference_script_lovelace: DEFAULT_REFERENCE_SCRIPT_LOVELACE,
        }
    }

    #[test]
    fn unit_ids_are_policy_label_name() {
        let config = config();

        assert_eq!(
            config.reference_unit("a1"),
            format!("c0ffee000643b0{}", hex::encode("a1"))
        );
        assert_eq!(
            config.user_unit("a1"),
            format!("c0ffee000de140{}", hex::encode("a1"))
        );
    }

    #[test]
    fn only_mainnet_has_network_id_one() {
        assert_eq!(Network::Mainnet.id(), 1);
        assert_eq!(Network::Preprod.id(), 0);
        assert_eq!(Network::Preview.id(), 0);
        assert_eq!(Network::Testnet.id(), 0);
    }

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("MainNet".parse::<Network>(), Ok(Network::Mainnet));
        assert!("devnet".parse::<Network>().is_err());
    }
}
