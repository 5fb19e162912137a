//! Lifecycle orchestration: request batches in, ordered builder instructions
//! out.
//!
//! Every operation follows the same shape: fan out per-asset lookups, join,
//! decide, then merge per-branch instruction fragments in request order and
//! attach the transaction furniture from configuration. All decisions happen
//! before anything reaches the builder collaborator, so a rejected batch
//! emits nothing and nothing is submitted on-chain for it.

pub mod aggregate;
pub mod burn;
pub mod classify;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Cip68Config;
use crate::datum;
use crate::error::Cip68Error;
use crate::provider::ChainQuery;
use crate::schema::{
    AssetQuantity, BuilderInstruction, BurnAssetParams, LOVELACE_UNIT, MintAssetParams,
    RedeemerKind, ScriptKind, TransactionBuilder, UpdateAssetParams, Utxo, WalletContext,
};

use aggregate::OutputAggregator;
use burn::{BurnDecision, resolve_burn};
use classify::{BatchClassification, check_ownership, classify_batch};

/// Ordered instruction sequence produced by one lifecycle operation.
///
/// The plan is inert data: hand it to a [`TransactionBuilder`] with
/// [`InstructionPlan::complete`], or inspect/serialize it directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstructionPlan {
    instructions: Vec<BuilderInstruction>,
}

impl InstructionPlan {
    fn new(instructions: Vec<BuilderInstruction>) -> Self {
        Self { instructions }
    }

    #[must_use]
    pub fn instructions(&self) -> &[BuilderInstruction] {
        &self.instructions
    }

    #[must_use]
    pub fn into_instructions(self) -> Vec<BuilderInstruction> {
        self.instructions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Run the plan through the builder collaborator in one pass.
    pub fn complete<B: TransactionBuilder>(
        &self,
        builder: &B,
    ) -> Result<B::UnsignedTx, Cip68Error> {
        Ok(builder.complete(&self.instructions)?)
    }
}

/// Drives the CIP68 asset lifecycle for one deployed script pair.
#[derive(Debug)]
pub struct Cip68Runtime<P> {
    config: Cip68Config,
    provider: P,
}

impl<P: ChainQuery> Cip68Runtime<P> {
    pub const fn new(config: Cip68Config, provider: P) -> Self {
        Self { config, provider }
    }

    #[must_use]
    pub const fn config(&self) -> &Cip68Config {
        &self.config
    }

    /// Assemble a mint plan for a batch of asset requests.
    ///
    /// The batch must be uniformly new or uniformly existing. New assets mint
    /// both CIP68-labeled units and create the store output carrying the
    /// inline datum; existing assets (ownership-checked against the caller's
    /// key hash) mint additional user tokens only. User tokens are
    /// consolidated into one output per receiver. `anchor` is spent first
    /// when supplied, typically to feed unique-name derivation.
    ///
    /// # Errors
    ///
    /// [`Cip68Error::MixedMintNotSupported`] for a mixed batch,
    /// [`Cip68Error::NotAssetOwner`] when an existing asset's datum owner is
    /// not the caller, plus quantity, datum and provider failures. Any error
    /// aborts the whole batch.
    pub async fn mint(
        &self,
        wallet: &WalletContext,
        params: &[MintAssetParams],
        anchor: Option<&Utxo>,
    ) -> Result<InstructionPlan, Cip68Error> {
        let names: Vec<String> = params.iter().map(|p| p.asset_name.clone()).collect();
        let classification = classify_batch(&self.provider, &self.config, &names).await?;

        let all_new = match classification {
            BatchClassification::Mixed { existing } => {
                return Err(Cip68Error::MixedMintNotSupported { assets: existing });
            }
            BatchClassification::AllExisting(states) => {
                check_ownership(&states, &wallet.pub_key_hash)?;
                false
            }
            BatchClassification::AllNew(_) => true,
        };

        let mut instructions = Vec::new();
        if let Some(anchor) = anchor {
            instructions.push(BuilderInstruction::SpendInput {
                tx_hash: anchor.tx_hash.clone(),
                output_index: anchor.output_index,
            });
        }

        let mut aggregator = OutputAggregator::new();
        for request in params {
            let quantity = parse_mint_quantity(&request.asset_name, &request.quantity)?;
            let user_unit = self.config.user_unit(&request.asset_name);
            let receiver = resolve_receiver(request.receiver.as_deref(), &wallet.address);
            aggregator.push(receiver, user_unit.clone(), quantity);

            instructions.push(BuilderInstruction::MintAsset {
                unit: user_unit,
                quantity,
                script: self.config.mint_script.clone(),
                redeemer: RedeemerKind::Issue,
            });

            if all_new {
                let reference_unit = self.config.reference_unit(&request.asset_name);
                instructions.push(BuilderInstruction::MintAsset {
                    unit: reference_unit.clone(),
                    quantity: 1,
                    script: self.config.mint_script.clone(),
                    redeemer: RedeemerKind::Issue,
                });
                instructions.push(BuilderInstruction::output_with_datum(
                    self.config.store_address.clone(),
                    vec![AssetQuantity::new(reference_unit, 1)],
                    datum::encode_metadata_hex(&request.metadata)?,
                ));
            }
        }

        for (receiver, assets) in aggregator.into_outputs() {
            instructions.push(BuilderInstruction::output(receiver, assets));
        }

        instructions.extend([
            BuilderInstruction::SetChangeAddress {
                address: wallet.address.clone(),
            },
            BuilderInstruction::RequireSigner {
                key_hash: wallet.pub_key_hash.clone(),
            },
            BuilderInstruction::SelectUtxosFrom {
                utxos: wallet.utxos.clone(),
            },
            BuilderInstruction::SetCollateral {
                utxo: wallet.collateral.clone(),
            },
            BuilderInstruction::SetNetwork {
                network: self.config.network,
            },
        ]);

        info!(
            assets = params.len(),
            all_new,
            instructions = instructions.len(),
            "assembled mint plan"
        );

        Ok(InstructionPlan::new(instructions))
    }

    /// Assemble a burn plan for a batch of burn requests.
    ///
    /// Per asset: the caller's held total decides between a full burn (which
    /// also retires the reference token and spends the store UTxO) and a
    /// partial burn (which returns the remainder to the caller).
    ///
    /// # Errors
    ///
    /// [`Cip68Error::StoreUtxoNotFound`] naming every asset whose reference
    /// UTxO is missing, plus quantity and provider failures.
    pub async fn burn(
        &self,
        wallet: &WalletContext,
        params: &[BurnAssetParams],
    ) -> Result<InstructionPlan, Cip68Error> {
        let branches = params.iter().map(|request| self.burn_branch(wallet, request));
        let fragments = merge_branch_results(join_all(branches).await)?;

        let mut instructions: Vec<BuilderInstruction> =
            fragments.into_iter().flatten().collect();
        self.push_furniture(&mut instructions, wallet);

        info!(
            assets = params.len(),
            instructions = instructions.len(),
            "assembled burn plan"
        );

        Ok(InstructionPlan::new(instructions))
    }

    async fn burn_branch(
        &self,
        wallet: &WalletContext,
        request: &BurnAssetParams,
    ) -> Result<Vec<BuilderInstruction>, Cip68Error> {
        let quantity = parse_burn_quantity(&request.asset_name, &request.quantity)?;
        let user_unit = self.config.user_unit(&request.asset_name);

        let held_total: i64 = self
            .provider
            .utxos_by_unit(&wallet.address, &user_unit)
            .await?
            .iter()
            .map(|utxo| utxo.quantity_of(&user_unit))
            .sum();

        let store_utxo = self
            .resolve_store_utxo(&request.asset_name, request.tx_hash.as_deref())
            .await?;

        let mut fragment = vec![BuilderInstruction::MintAsset {
            unit: user_unit.clone(),
            quantity,
            script: self.config.mint_script.clone(),
            redeemer: RedeemerKind::Burn,
        }];

        match resolve_burn(quantity, held_total) {
            BurnDecision::Full => {
                debug!(asset = %request.asset_name, held_total, "full burn retires reference token");
                fragment.push(BuilderInstruction::MintAsset {
                    unit: self.config.reference_unit(&request.asset_name),
                    quantity: -1,
                    script: self.config.mint_script.clone(),
                    redeemer: RedeemerKind::Burn,
                });
                fragment.push(BuilderInstruction::SpendScriptInput {
                    tx_hash: store_utxo.tx_hash,
                    output_index: store_utxo.output_index,
                    script: self.config.store_script.clone(),
                    redeemer: RedeemerKind::Remove,
                    inline_datum_present: true,
                });
            }
            BurnDecision::Partial { remainder } => {
                debug!(asset = %request.asset_name, held_total, remainder, "partial burn");
                fragment.push(BuilderInstruction::output(
                    wallet.address.clone(),
                    vec![AssetQuantity::new(user_unit, remainder)],
                ));
            }
        }

        Ok(fragment)
    }

    /// Assemble an update plan: each asset's store UTxO is spent and
    /// recreated at the store address with a freshly encoded inline datum.
    /// Token quantities are unchanged.
    ///
    /// # Errors
    ///
    /// [`Cip68Error::StoreUtxoNotFound`] naming every asset whose reference
    /// UTxO is missing, plus datum and provider failures.
    pub async fn update(
        &self,
        wallet: &WalletContext,
        params: &[UpdateAssetParams],
    ) -> Result<InstructionPlan, Cip68Error> {
        let branches = params.iter().map(|request| self.update_branch(request));
        let fragments = merge_branch_results(join_all(branches).await)?;

        let mut instructions: Vec<BuilderInstruction> =
            fragments.into_iter().flatten().collect();
        self.push_furniture(&mut instructions, wallet);

        info!(
            assets = params.len(),
            instructions = instructions.len(),
            "assembled update plan"
        );

        Ok(InstructionPlan::new(instructions))
    }

    async fn update_branch(
        &self,
        request: &UpdateAssetParams,
    ) -> Result<Vec<BuilderInstruction>, Cip68Error> {
        let store_utxo = self
            .resolve_store_utxo(&request.asset_name, request.tx_hash.as_deref())
            .await?;

        Ok(vec![
            BuilderInstruction::SpendScriptInput {
                tx_hash: store_utxo.tx_hash,
                output_index: store_utxo.output_index,
                script: self.config.store_script.clone(),
                redeemer: RedeemerKind::Update,
                inline_datum_present: true,
            },
            BuilderInstruction::output_with_datum(
                self.config.store_address.clone(),
                vec![AssetQuantity::new(
                    self.config.reference_unit(&request.asset_name),
                    1,
                )],
                datum::encode_metadata_hex(&request.metadata)?,
            ),
        ])
    }

    /// Assemble a plan that publishes one of the deployed scripts as an
    /// on-chain reference script: the configured lovelace amount is locked at
    /// `address` together with the script attachment.
    pub fn publish_reference_script(
        &self,
        wallet: &WalletContext,
        address: &str,
        script: ScriptKind,
    ) -> Result<InstructionPlan, Cip68Error> {
        let lovelace = i64::try_from(self.config.reference_script_lovelace).map_err(|_| {
            Cip68Error::InvalidQuantity {
                asset_name: LOVELACE_UNIT.to_string(),
                value: self.config.reference_script_lovelace.to_string(),
                message: "exceeds the signed 64-bit range".to_string(),
            }
        })?;

        Ok(InstructionPlan::new(vec![
            BuilderInstruction::SpendInput {
                tx_hash: wallet.collateral.tx_hash.clone(),
                output_index: wallet.collateral.output_index,
            },
            BuilderInstruction::ProduceOutput {
                address: address.to_string(),
                assets: vec![AssetQuantity::new(LOVELACE_UNIT, lovelace)],
                inline_datum: None,
                datum_hash: Some(String::new()),
                reference_script: Some(self.config.script(script).clone()),
            },
            BuilderInstruction::SetChangeAddress {
                address: wallet.address.clone(),
            },
            BuilderInstruction::SelectUtxosFrom {
                utxos: wallet.utxos.clone(),
            },
            BuilderInstruction::SetCollateral {
                utxo: wallet.collateral.clone(),
            },
        ]))
    }

    /// Resolve the store UTxO for one asset: by explicit prior transaction
    /// hash when supplied, else by current on-chain state.
    async fn resolve_store_utxo(
        &self,
        asset_name: &str,
        tx_hash: Option<&str>,
    ) -> Result<Utxo, Cip68Error> {
        let store_utxo = match tx_hash {
            Some(tx_hash) => {
                self.provider
                    .utxo_by_tx_hash(&self.config.store_address, tx_hash)
                    .await?
            }
            None => {
                let unit = self.config.reference_unit(asset_name);
                self.provider
                    .utxo_by_unit(&self.config.store_address, &unit)
                    .await?
            }
        };

        store_utxo.ok_or_else(|| Cip68Error::StoreUtxoNotFound {
            assets: vec![asset_name.to_string()],
        })
    }

    /// Common transaction furniture for burn and update plans.
    fn push_furniture(&self, instructions: &mut Vec<BuilderInstruction>, wallet: &WalletContext) {
        instructions.extend([
            BuilderInstruction::RequireSigner {
                key_hash: wallet.pub_key_hash.clone(),
            },
            BuilderInstruction::SetChangeAddress {
                address: wallet.address.clone(),
            },
            BuilderInstruction::SelectUtxosFrom {
                utxos: wallet.utxos.clone(),
            },
            BuilderInstruction::SetCollateral {
                utxo: wallet.collateral.clone(),
            },
            BuilderInstruction::SetNetwork {
                network: self.config.network,
            },
        ]);
    }
}

/// Join per-branch results in request order. Missing-store failures are
/// merged so one error names every affected asset; otherwise the first
/// failure in request order wins.
fn merge_branch_results<T>(results: Vec<Result<T, Cip68Error>>) -> Result<Vec<T>, Cip68Error> {
    let mut values = Vec::with_capacity(results.len());
    let mut missing = Vec::new();
    let mut first_other: Option<Cip68Error> = None;

    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(Cip68Error::StoreUtxoNotFound { assets }) => missing.extend(assets),
            Err(error) => {
                if first_other.is_none() {
                    first_other = Some(error);
                }
            }
        }
    }

    if !missing.is_empty() {
        return Err(Cip68Error::StoreUtxoNotFound { assets: missing });
    }
    if let Some(error) = first_other {
        return Err(error);
    }

    Ok(values)
}

fn parse_quantity(asset_name: &str, value: &str) -> Result<i64, Cip68Error> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|error| Cip68Error::InvalidQuantity {
            asset_name: asset_name.to_string(),
            value: value.to_string(),
            message: error.to_string(),
        })
}

fn parse_mint_quantity(asset_name: &str, value: &str) -> Result<i64, Cip68Error> {
    let quantity = parse_quantity(asset_name, value)?;
    if quantity <= 0 {
        return Err(Cip68Error::InvalidQuantity {
            asset_name: asset_name.to_string(),
            value: value.to_string(),
            message: "mint quantity must be positive".to_string(),
        });
    }
    Ok(quantity)
}

fn parse_burn_quantity(asset_name: &str, value: &str) -> Result<i64, Cip68Error> {
    let quantity = parse_quantity(asset_name, value)?;
    if quantity >= 0 {
        return Err(Cip68Error::InvalidQuantity {
            asset_name: asset_name.to_string(),
            value: value.to_string(),
            message: "burn quantity must be negative".to_string(),
        });
    }
    Ok(quantity)
}

/// An absent or empty receiver means the caller's own address.
fn resolve_receiver<'a>(receiver: Option<&'a str>, caller: &'a str) -> &'a str {
    match receiver {
        Some(receiver) if !receiver.is_empty() => receiver,
        _ => caller,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_quantities_must_be_positive_integers() {
        assert_eq!(parse_mint_quantity("a1", "3").expect("parses"), 3);
        assert!(parse_mint_quantity("a1", "0").is_err());
        assert!(parse_mint_quantity("a1", "-1").is_err());
        assert!(parse_mint_quantity("a1", "three").is_err());
    }

    #[test]
    fn burn_quantities_must_be_negative_integers() {
        assert_eq!(parse_burn_quantity("a1", "-5").expect("parses"), -5);
        assert!(parse_burn_quantity("a1", "5").is_err());
        assert!(parse_burn_quantity("a1", "0").is_err());
    }

    #[test]
    fn empty_receiver_falls_back_to_caller() {
        assert_eq!(resolve_receiver(None, "addr_caller"), "addr_caller");
        assert_eq!(resolve_receiver(Some(""), "addr_caller"), "addr_caller");
        assert_eq!(resolve_receiver(Some("addr_other"), "addr_caller"), "addr_other");
    }

    #[test]
    fn missing_store_failures_are_merged_across_branches() {
        let results: Vec<Result<(), Cip68Error>> = vec![
            Err(Cip68Error::StoreUtxoNotFound {
                assets: vec!["a1".to_string()],
            }),
            Ok(()),
            Err(Cip68Error::StoreUtxoNotFound {
                assets: vec!["a3".to_string()],
            }),
        ];

        let err = merge_branch_results(results).expect_err("must surface missing stores");
        match err {
            Cip68Error::StoreUtxoNotFound { assets } => {
                assert_eq!(assets, vec!["a1".to_string(), "a3".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn first_other_failure_wins_when_no_store_is_missing() {
        let results: Vec<Result<(), Cip68Error>> = vec![
            Ok(()),
            Err(Cip68Error::MalformedDatum("first".to_string())),
            Err(Cip68Error::MalformedDatum("second".to_string())),
        ];

        let err = merge_branch_results(results).expect_err("must surface the failure");
        assert!(matches!(err, Cip68Error::MalformedDatum(reason) if reason == "first"));
    }
}
