//! Chain-query collaborator interface.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::schema::Utxo;

/// Read-only UTXO lookups against a chain-indexing provider.
///
/// Implementations wrap whatever indexer the deployment uses. The core relies
/// on these three lookups only, fans them out concurrently per batch, and
/// treats any failure as fatal for the whole batch.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// First UTxO at `address` holding `unit`, if any.
    async fn utxo_by_unit(&self, address: &str, unit: &str)
    -> Result<Option<Utxo>, ProviderError>;

    /// All UTxOs at `address` holding `unit`.
    async fn utxos_by_unit(&self, address: &str, unit: &str) -> Result<Vec<Utxo>, ProviderError>;

    /// UTxO at `address` created by `tx_hash`, if still unspent.
    async fn utxo_by_tx_hash(
        &self,
        address: &str,
        tx_hash: &str,
    ) -> Result<Option<Utxo>, ProviderError>;
}
