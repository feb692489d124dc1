use crate::core::transaction::{OutputPoint, Transaction};
use crate::crypto::keys::PublicKey;
use serde::Serialize;
use std::collections::BTreeMap;

/// A transaction output that no accepted transaction has spent yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnspentOutput {
    pub output_point: OutputPoint,
    pub recipient: PublicKey,
    pub amount: u64,
}

/// Picks which of an owner's unspent outputs fund a spend of `minimum_amount`.
///
/// Implementations must return a selection totalling at least `minimum_amount`
/// whenever the candidates can cover it, and every candidate otherwise.
pub trait CoinSelector: Send + Sync {
    fn select(&self, candidates: Vec<UnspentOutput>, minimum_amount: u64) -> Vec<UnspentOutput>;
}

/// Takes outputs in index order until the running total reaches the minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

/// Takes the largest outputs first, keeping the number of inputs small.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestFirst;

impl CoinSelector for FirstFit {
    fn select(&self, candidates: Vec<UnspentOutput>, minimum_amount: u64) -> Vec<UnspentOutput> {
        take_until(candidates, minimum_amount)
    }
}

impl CoinSelector for LargestFirst {
    fn select(&self, mut candidates: Vec<UnspentOutput>, minimum_amount: u64) -> Vec<UnspentOutput> {
        candidates.sort_by(|a, b| b.amount.cmp(&a.amount));
        take_until(candidates, minimum_amount)
    }
}

fn take_until(candidates: Vec<UnspentOutput>, minimum_amount: u64) -> Vec<UnspentOutput> {
    let mut accumulated = 0u128;
    let mut selected = Vec::new();

    for candidate in candidates {
        if accumulated >= minimum_amount as u128 {
            break;
        }
        accumulated += candidate.amount as u128;
        selected.push(candidate);
    }

    selected
}

/// The unspent output index, keyed and iterated in output point order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtxoSet {
    entries: BTreeMap<OutputPoint, UnspentOutput>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, output_point: &OutputPoint) -> Option<&UnspentOutput> {
        self.entries.get(output_point)
    }

    /// Looks up each point in order; spent or unknown points yield `None`.
    pub fn find_many(&self, output_points: &[OutputPoint]) -> Vec<Option<&UnspentOutput>> {
        output_points.iter().map(|point| self.find(point)).collect()
    }

    pub fn owned_by<'a>(&'a self, owner: &'a PublicKey) -> impl Iterator<Item = &'a UnspentOutput> + 'a {
        self.entries.values().filter(move |entry| &entry.recipient == owner)
    }

    /// All of `owner`'s outputs when `minimum_amount` is zero, otherwise the
    /// selection `selector` makes to cover it.
    pub fn unspent_outputs(
        &self,
        owner: &PublicKey,
        minimum_amount: u64,
        selector: &dyn CoinSelector,
    ) -> Vec<UnspentOutput> {
        let owned: Vec<UnspentOutput> = self.owned_by(owner).cloned().collect();

        if minimum_amount == 0 {
            return owned;
        }

        selector.select(owned, minimum_amount)
    }

    pub fn balance(&self, owner: &PublicKey) -> u64 {
        self.owned_by(owner).map(|entry| entry.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnspentOutput> {
        self.entries.values()
    }

    /// Removes every point the transaction spends and indexes every output it creates.
    /// Callers validate the transaction first.
    pub(crate) fn apply_transaction(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.entries.remove(input.output_point());
        }

        for (output_point, output) in transaction.output_points().into_iter().zip(transaction.outputs()) {
            let entry = UnspentOutput {
                output_point: output_point.clone(),
                recipient: output.recipient().clone(),
                amount: output.amount(),
            };
            self.entries.insert(output_point, entry);
        }
    }
}
