//! Mint-batch classification against existing on-chain state.
//!
//! Per-asset lookups are independent and fan out concurrently; classification
//! itself needs the whole batch's existence picture, so branch results are
//! joined first and the decision runs single-threaded over local results.

use futures::future::join_all;
use tracing::debug;

use crate::config::Cip68Config;
use crate::datum;
use crate::error::{Cip68Error, ProviderError};
use crate::provider::ChainQuery;
use crate::schema::Utxo;

/// One requested asset name joined with its store-address lookup result.
#[derive(Debug, Clone)]
pub struct AssetState {
    pub asset_name: String,
    pub store_utxo: Option<Utxo>,
}

impl AssetState {
    /// An asset exists when its reference token sits at the store address
    /// with a non-empty inline datum.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.store_utxo.as_ref().is_some_and(Utxo::has_inline_datum)
    }
}

/// Closed classification of one mint batch.
#[derive(Debug, Clone)]
pub enum BatchClassification {
    /// No requested name has a live reference UTxO.
    AllNew(Vec<AssetState>),
    /// Every requested name has a live reference UTxO.
    AllExisting(Vec<AssetState>),
    /// Some exist and some do not; carries the already-existing subset.
    Mixed { existing: Vec<String> },
}

/// Look up every requested name at the store address and classify the batch.
///
/// A provider failure on any branch aborts the whole batch. An empty batch
/// classifies as [`BatchClassification::AllNew`].
pub async fn classify_batch<P: ChainQuery>(
    provider: &P,
    config: &Cip68Config,
    asset_names: &[String],
) -> Result<BatchClassification, ProviderError> {
    let lookups = asset_names.iter().map(|name| async move {
        let unit = config.reference_unit(name);
        let store_utxo = provider.utxo_by_unit(&config.store_address, &unit).await?;
        Ok::<_, ProviderError>(AssetState {
            asset_name: name.clone(),
            store_utxo,
        })
    });

    let states = join_all(lookups)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let existing_count = states.iter().filter(|state| state.exists()).count();
    debug!(
        batch = states.len(),
        existing = existing_count,
        "classified mint batch"
    );

    if existing_count == 0 {
        Ok(BatchClassification::AllNew(states))
    } else if existing_count == states.len() {
        Ok(BatchClassification::AllExisting(states))
    } else {
        Ok(BatchClassification::Mixed {
            existing: states
                .iter()
                .filter(|state| state.exists())
                .map(|state| state.asset_name.clone())
                .collect(),
        })
    }
}

/// Verify that the caller owns every existing asset in the batch: the `_pk`
/// recorded in each reference datum must equal the caller's key hash.
///
/// Mismatches are collected across the whole batch and reported together.
pub fn check_ownership(states: &[AssetState], caller_key_hash: &str) -> Result<(), Cip68Error> {
    let mut mismatched = Vec::new();

    for state in states {
        let datum_hex = state
            .store_utxo
            .as_ref()
            .and_then(|utxo| utxo.inline_datum.as_deref());
        let Some(datum_hex) = datum_hex else {
            continue;
        };

        match datum::owner_key_hash(datum_hex)? {
            Some(owner) if owner == caller_key_hash => {}
            _ => mismatched.push(state.asset_name.clone()),
        }
    }

    if mismatched.is_empty() {
        Ok(())
    } else {
        Err(Cip68Error::NotAssetOwner { assets: mismatched })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Metadata;

    fn state_with_owner(asset_name: &str, owner_hex: &str) -> AssetState {
        let metadata = Metadata::from([
            ("name".to_string(), asset_name.to_string()),
            (datum::OWNER_KEY.to_string(), owner_hex.to_string()),
        ]);

        AssetState {
            asset_name: asset_name.to_string(),
            store_utxo: Some(Utxo {
                tx_hash: "ab".repeat(32),
                output_index: 0,
                address: "addr_test1_store".to_string(),
                amount: Vec::new(),
                inline_datum: Some(datum::encode_metadata_hex(&metadata).expect("encodes")),
            }),
        }
    }

    #[test]
    fn matching_owner_passes() {
        let caller = "ab".repeat(28);
        let states = vec![state_with_owner("a1", &caller)];

        check_ownership(&states, &caller).expect("caller owns the asset");
    }

    #[test]
    fn mismatches_are_collected_across_the_batch() {
        let caller = "ab".repeat(28);
        let other = "cd".repeat(28);
        let states = vec![
            state_with_owner("a1", &other),
            state_with_owner("a2", &caller),
            state_with_owner("a3", &other),
        ];

        let err = check_ownership(&states, &caller).expect_err("must flag foreign assets");
        match err {
            Cip68Error::NotAssetOwner { assets } => {
                assert_eq!(assets, vec!["a1".to_string(), "a3".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_owner_field_counts_as_mismatch() {
        let metadata = Metadata::from([("name".to_string(), "a1".to_string())]);
        let states = vec![AssetState {
            asset_name: "a1".to_string(),
            store_utxo: Some(Utxo {
                tx_hash: "cd".repeat(32),
                output_index: 0,
                address: "addr_test1_store".to_string(),
                amount: Vec::new(),
                inline_datum: Some(datum::encode_metadata_hex(&metadata).expect("encodes")),
            }),
        }];

        let err = check_ownership(&states, "any").expect_err("must flag ownerless datum");
        assert!(matches!(err, Cip68Error::NotAssetOwner { .. }));
    }
}
