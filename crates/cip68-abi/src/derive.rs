//! Deterministic asset-name derivation from a spent transaction input.

use sha3::{Digest, Sha3_256};

use crate::error::Cip68Error;
use crate::schema::Utxo;

/// Digest bytes kept after the index byte; the full name is 28 bytes.
const DIGEST_PREFIX_LEN: usize = 27;

/// Derive a collision-resistant asset name from the UTxO spent as the mint's
/// anchor input.
///
/// The name is `hex(index_byte || sha3_256(tx_hash_bytes)[..27])`. The same
/// input always yields the same name, and the ledger guarantees an input is
/// spent at most once, so two live assets can never share a derived name.
///
/// # Errors
///
/// Returns [`Cip68Error::InvalidHex`] if the transaction hash is not valid
/// hex, and [`Cip68Error::OutputIndexOutOfRange`] if the output index does
/// not fit in the single index byte.
pub fn unique_asset_name(utxo: &Utxo) -> Result<String, Cip68Error> {
    let index = u8::try_from(utxo.output_index)
        .map_err(|_| Cip68Error::OutputIndexOutOfRange(utxo.output_index))?;
    let tx_hash = hex::decode(&utxo.tx_hash)?;
    let digest = Sha3_256::digest(&tx_hash);

    let mut name = Vec::with_capacity(1 + DIGEST_PREFIX_LEN);
    name.push(index);
    name.extend_from_slice(&digest[..DIGEST_PREFIX_LEN]);

    Ok(hex::encode(name))
}
