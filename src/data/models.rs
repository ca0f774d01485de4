//! Data models for rooms and their ledgers

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the two people in a pair.
///
/// Wire names are `person1`/`person2` so tokens minted by earlier clients
/// keep decoding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Party {
    #[serde(rename = "person1")]
    A,
    #[serde(rename = "person2")]
    B,
}

impl Party {
    /// The opposite party.
    pub fn other(&self) -> Party {
        match self {
            Party::A => Party::B,
            Party::B => Party::A,
        }
    }
}

/// One recorded payment event. Immutable once created; removed by id only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    /// Unique identifier (uuid-v4 text)
    pub id: String,
    /// What the money was spent on
    pub description: String,
    /// Amount paid, non-negative
    pub amount: f64,
    /// Portion owed by the non-payer; `None` means half of `amount`
    #[serde(rename = "splitAmount", skip_serializing_if = "Option::is_none")]
    pub split_amount: Option<f64>,
    /// Which party paid
    #[serde(rename = "paidBy")]
    pub paid_by: Party,
    /// Calendar date of the payment
    pub date: NaiveDate,
}

impl Expense {
    /// Create a new expense with a fresh id.
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        split_amount: Option<f64>,
        paid_by: Party,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            amount,
            split_amount,
            paid_by,
            date,
        }
    }
}

/// The full state of one pair: both names plus the ledger in insertion order.
///
/// Field order is fixed (person1, person2, expenses) — the codec relies on it
/// for a canonical serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairState {
    /// Display name of party A
    #[serde(rename = "person1")]
    pub party_a: String,
    /// Display name of party B
    #[serde(rename = "person2")]
    pub party_b: String,
    /// Ledger entries, oldest first
    #[serde(rename = "expenses")]
    pub entries: Vec<Expense>,
}

impl PairState {
    /// Create an empty ledger for the named pair.
    pub fn new(party_a: impl Into<String>, party_b: impl Into<String>) -> Self {
        Self {
            party_a: party_a.into(),
            party_b: party_b.into(),
            entries: Vec::new(),
        }
    }

    /// Whether this state tracks the same two people, in either order.
    pub fn same_pair(&self, other: &PairState) -> bool {
        (self.party_a == other.party_a && self.party_b == other.party_b)
            || (self.party_a == other.party_b && self.party_b == other.party_a)
    }

    /// Display name for a party.
    pub fn name_of(&self, party: Party) -> &str {
        match party {
            Party::A => &self.party_a,
            Party::B => &self.party_b,
        }
    }
}

/// A persisted pair with bookkeeping timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier
    pub id: Uuid,
    /// The pair's state
    pub state: PairState,
    /// When the room was created
    pub created_at: DateTime<Utc>,
    /// Last time the room was modified
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Create a new room around the given state.
    pub fn new(state: PairState) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            state,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_amount_is_omitted_from_json_when_absent() {
        let expense = Expense::new(
            "lunch",
            1200.0,
            None,
            Party::A,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        let json = serde_json::to_string(&expense).unwrap();
        assert!(!json.contains("splitAmount"));
        assert!(json.contains("\"paidBy\":\"person1\""));
    }

    #[test]
    fn same_pair_matches_in_either_order() {
        let a = PairState::new("Aki", "Ben");
        let b = PairState::new("Ben", "Aki");
        let c = PairState::new("Aki", "Caro");
        assert!(a.same_pair(&b));
        assert!(!a.same_pair(&c));
    }
}
