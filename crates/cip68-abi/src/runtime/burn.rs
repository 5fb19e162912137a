//! Full-vs-partial burn decision.

/// Outcome of comparing a requested burn against the caller's held total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnDecision {
    /// The whole holding is burned and the reference token is retired with it.
    Full,
    /// Part of the holding is burned; the remainder returns to the caller and
    /// the reference UTxO stays untouched. The remainder is negative for an
    /// over-burn, which the ledger rejects when the transaction is balanced.
    Partial { remainder: i64 },
}

/// Decide between a full and a partial burn.
///
/// `quantity` is the (negative) requested burn, `held_total` the quantity the
/// caller currently holds across all wallet UTxOs. The boundary is exact
/// equality: anything else, including an over-burn, is a partial burn.
#[must_use]
pub const fn resolve_burn(quantity: i64, held_total: i64) -> BurnDecision {
    if -quantity == held_total {
        BurnDecision::Full
    } else {
        BurnDecision::Partial {
            remainder: held_total + quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_a_full_burn() {
        assert_eq!(resolve_burn(-5, 5), BurnDecision::Full);
        assert_eq!(resolve_burn(-1, 1), BurnDecision::Full);
    }

    #[test]
    fn smaller_burn_leaves_a_remainder() {
        assert_eq!(resolve_burn(-3, 5), BurnDecision::Partial { remainder: 2 });
    }

    #[test]
    fn over_burn_is_partial_with_negative_remainder() {
        // The ledger, not this component, rejects the impossible balance.
        assert_eq!(resolve_burn(-7, 5), BurnDecision::Partial { remainder: -2 });
    }

    #[test]
    fn one_token_off_either_side_is_partial() {
        assert_eq!(resolve_burn(-4, 5), BurnDecision::Partial { remainder: 1 });
        assert_eq!(resolve_burn(-6, 5), BurnDecision::Partial { remainder: -1 });
    }
}
