//! Per-receiver output consolidation.

use std::collections::BTreeMap;

use crate::schema::AssetQuantity;

/// Consolidates user-token outputs: one transaction output per receiver
/// address, unit entries appended in processing order.
///
/// Built fresh for every operation and drained once. Identical units for the
/// same receiver are kept as independent entries; summing or rejecting them
/// is the builder collaborator's call.
#[derive(Debug, Default)]
pub struct OutputAggregator {
    outputs: BTreeMap<String, Vec<AssetQuantity>>,
}

impl OutputAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one unit/quantity entry to `receiver`'s output.
    pub fn push(&mut self, receiver: &str, unit: impl Into<String>, quantity: i64) {
        self.outputs
            .entry(receiver.to_string())
            .or_default()
            .push(AssetQuantity::new(unit, quantity));
    }

    /// Number of distinct receivers aggregated so far.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.outputs.len()
    }

    /// Total number of unit entries across all receivers.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.outputs.values().map(Vec::len).sum()
    }

    /// Drain into `(receiver, assets)` pairs. Receiver order is deterministic
    /// (sorted); per-receiver entry order is the push order.
    #[must_use]
    pub fn into_outputs(self) -> Vec<(String, Vec<AssetQuantity>)> {
        self.outputs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_output_per_receiver_with_entries_in_push_order() {
        let mut aggregator = OutputAggregator::new();
        aggregator.push("addr_b", "unit1", 1);
        aggregator.push("addr_a", "unit2", 5);
        aggregator.push("addr_b", "unit3", 2);

        let outputs = aggregator.into_outputs();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].0, "addr_a");
        assert_eq!(outputs[1].0, "addr_b");
        assert_eq!(
            outputs[1].1,
            vec![AssetQuantity::new("unit1", 1), AssetQuantity::new("unit3", 2)]
        );
    }

    #[test]
    fn entry_count_matches_pushes() {
        let mut aggregator = OutputAggregator::new();
        for index in 0..7 {
            aggregator.push(
                if index % 2 == 0 { "addr_a" } else { "addr_b" },
                format!("unit{index}"),
                1,
            );
        }

        assert_eq!(aggregator.receiver_count(), 2);
        assert_eq!(aggregator.entry_count(), 7);
    }

    #[test]
    fn duplicate_units_stay_independent_entries() {
        let mut aggregator = OutputAggregator::new();
        aggregator.push("addr_a", "unit1", 1);
        aggregator.push("addr_a", "unit1", 4);

        let outputs = aggregator.into_outputs();

        assert_eq!(
            outputs[0].1,
            vec![AssetQuantity::new("unit1", 1), AssetQuantity::new("unit1", 4)]
        );
    }
}
