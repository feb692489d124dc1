use crate::core::utxo::UnspentOutput;
use crate::crypto::hash::Hash256;
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::crypto::signatures::Signature;
use crate::{ChainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one output of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputPoint {
    pub transaction_id: Hash256,
    pub output_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    recipient: PublicKey,
    amount: u64,
    hash: Hash256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    output_point: OutputPoint,
    signature: Option<Signature>,
    hash: Hash256,
}

/// An immutable transfer of value. The id commits to every input and output
/// hash, in order, and is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: Hash256,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl OutputPoint {
    pub fn new(transaction_id: Hash256, output_index: u32) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    /// Canonical digest of the point: what an input hashes to and what its owner signs.
    pub fn digest(&self) -> Hash256 {
        Hash256::hash_parts([
            self.transaction_id.as_bytes().as_slice(),
            self.output_index.to_be_bytes().as_slice(),
        ])
    }
}

impl fmt::Display for OutputPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

impl TransactionOutput {
    pub fn new(recipient: PublicKey, amount: u64) -> Self {
        let hash = Hash256::hash_parts([recipient.to_bytes(), amount.to_be_bytes().as_slice()]);

        Self {
            recipient,
            amount,
            hash,
        }
    }

    pub fn recipient(&self) -> &PublicKey {
        &self.recipient
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn hash(&self) -> Hash256 {
        self.hash
    }
}

impl TransactionInput {
    pub fn new(output_point: OutputPoint) -> Self {
        let hash = output_point.digest();

        Self {
            output_point,
            signature: None,
            hash,
        }
    }

    pub fn from_unspent(unspent: &UnspentOutput) -> Self {
        Self::new(unspent.output_point.clone())
    }

    pub fn output_point(&self) -> &OutputPoint {
        &self.output_point
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Returns a copy of this input carrying `signature`, whatever its content.
    pub fn with_signature(&self, signature: Signature) -> Self {
        Self {
            output_point: self.output_point.clone(),
            signature: Some(signature),
            hash: self.hash,
        }
    }

    pub fn sign(&self, private_key: &PrivateKey) -> Result<Self> {
        let signature = private_key.sign(&self.signing_message())?;
        Ok(self.with_signature(signature))
    }

    /// False when unsigned or when the signature does not check out against `address`.
    pub fn verify(&self, address: &PublicKey) -> bool {
        match &self.signature {
            Some(signature) => address.verify(&self.signing_message(), signature),
            None => false,
        }
    }

    fn signing_message(&self) -> Hash256 {
        self.output_point.digest()
    }
}

impl fmt::Display for TransactionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output_point)
    }
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Result<Self> {
        if inputs.is_empty() {
            return Err(ChainError::InvalidTransaction("No inputs specified".to_string()));
        }
        if outputs.is_empty() {
            return Err(ChainError::InvalidTransaction("No outputs specified".to_string()));
        }
        check_output_count(outputs.len())?;

        Ok(Self::build(inputs, outputs))
    }

    pub(crate) fn genesis(output: TransactionOutput) -> Self {
        Self::build(Vec::new(), vec![output])
    }

    fn build(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let id = Hash256::hash_parts(
            inputs
                .iter()
                .map(TransactionInput::hash)
                .chain(outputs.iter().map(TransactionOutput::hash)),
        );

        Self { id, inputs, outputs }
    }

    pub fn id(&self) -> Hash256 {
        self.id
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn is_genesis(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn output(&self, output_point: &OutputPoint) -> Result<&TransactionOutput> {
        if output_point.transaction_id != self.id {
            return Err(ChainError::InvalidTransaction(format!(
                "Invalid transaction id: {}",
                output_point
            )));
        }

        self.outputs
            .get(output_point.output_index as usize)
            .ok_or_else(|| ChainError::InvalidTransaction(format!("Invalid output index: {}", output_point)))
    }

    pub fn output_points(&self) -> Vec<OutputPoint> {
        (0..=u32::MAX)
            .zip(&self.outputs)
            .map(|(index, _)| OutputPoint::new(self.id, index))
            .collect()
    }

    pub fn total_output_amount(&self) -> u128 {
        self.outputs.iter().map(|output| output.amount as u128).sum()
    }
}

/// Output indices are `u32`, so a transaction cannot address more outputs than that.
fn check_output_count(count: usize) -> Result<()> {
    u32::try_from(count)
        .map(|_| ())
        .map_err(|_| ChainError::InvalidTransaction(format!("Too many outputs: {}", count)))
}
