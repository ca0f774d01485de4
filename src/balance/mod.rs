//! Settlement computation over a pair's ledger
//!
//! Pure and stateless: every call receives the full state and returns the
//! full result. Input is trusted — validation happens before data gets here.

use serde::Serialize;

use crate::data::{PairState, Party};

/// Net settlement derived from a ledger. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceResult {
    /// Sum of amounts paid by party A
    pub total_paid_by_a: f64,
    /// Sum of amounts paid by party B
    pub total_paid_by_b: f64,
    /// Sum of all amounts
    pub total: f64,
    /// Net amount B owes A; negative means A owes B
    pub net_owed: f64,
    /// Who has to pay to zero out the ledger, `None` when nothing is owed
    pub settling_party: Option<Party>,
    /// Rounded absolute settlement
    pub settlement_amount: u64,
}

/// Compute who owes whom from the full ledger.
///
/// Each entry contributes its `split_amount` (half the amount when unset) to
/// the running net in the payer's favor. The settlement is the rounded
/// absolute net; when it rounds to zero nobody settles.
pub fn compute_balance(state: &PairState) -> BalanceResult {
    let mut total_paid_by_a = 0.0;
    let mut total_paid_by_b = 0.0;

    // Positive: B owes A. Negative: A owes B.
    let mut net_owed = 0.0;

    for entry in &state.entries {
        let split = entry.split_amount.unwrap_or(entry.amount / 2.0);

        match entry.paid_by {
            Party::A => {
                total_paid_by_a += entry.amount;
                net_owed += split;
            }
            Party::B => {
                total_paid_by_b += entry.amount;
                net_owed -= split;
            }
        }
    }

    let total = total_paid_by_a + total_paid_by_b;
    let settlement_amount = net_owed.round().abs() as u64;

    let settling_party = if settlement_amount == 0 {
        None
    } else if net_owed > 0.0 {
        Some(Party::B)
    } else {
        Some(Party::A)
    };

    BalanceResult {
        total_paid_by_a,
        total_paid_by_b,
        total,
        net_owed,
        settling_party,
        settlement_amount,
    }
}
