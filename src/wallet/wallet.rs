use crate::core::{Blockchain, Transaction, TransactionInput, TransactionOutput};
use crate::crypto::keys::{KeyPair, PrivateKey, PublicKey};
use crate::{ChainError, Result};

/// Holds a keypair and nothing else. Balances and spendable outputs are read
/// from the ledger at call time.
#[derive(Debug, Clone)]
pub struct Wallet {
    keypair: KeyPair,
}

impl Wallet {
    pub fn new() -> Result<Self> {
        Ok(Self {
            keypair: KeyPair::new()?,
        })
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        Self {
            keypair: KeyPair::from_private_key(private_key),
        }
    }

    pub fn address(&self) -> &PublicKey {
        self.keypair.address()
    }

    pub fn balance(&self, blockchain: &Blockchain) -> u64 {
        blockchain.balance(self.address())
    }

    pub fn sign_input(&self, input: &TransactionInput) -> Result<TransactionInput> {
        input.sign(&self.keypair.private_key)
    }

    /// Builds a signed transaction paying `amount` to `recipient` and the
    /// remainder of the selected outputs back to this wallet. The change output
    /// is always present, even when it is zero.
    ///
    /// The caller wraps the result in a block, mines it and submits it.
    pub fn transfer(&self, blockchain: &Blockchain, recipient: &PublicKey, amount: u64) -> Result<Transaction> {
        let selected = blockchain.unspent_outputs(self.address(), amount);
        let available: u64 = selected.iter().map(|unspent| unspent.amount).sum();

        if available < amount {
            return Err(ChainError::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let inputs = selected
            .iter()
            .map(|unspent| self.sign_input(&TransactionInput::from_unspent(unspent)))
            .collect::<Result<Vec<_>>>()?;

        let outputs = vec![
            TransactionOutput::new(recipient.clone(), amount),
            TransactionOutput::new(self.address().clone(), available - amount),
        ];

        let transaction = Transaction::new(inputs, outputs)?;
        log::debug!(
            "Built transaction {} sending {} to {} with {} change",
            transaction.id(),
            amount,
            recipient,
            available - amount
        );

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use std::sync::Arc;

    fn funded(amount: u64) -> (Wallet, Blockchain) {
        let wallet = Wallet::new().unwrap();
        let blockchain =
            Blockchain::with_clock(wallet.address().clone(), amount, 1, Arc::new(FixedClock::new(0))).unwrap();
        (wallet, blockchain)
    }

    #[test]
    fn test_balance() {
        let (wallet, blockchain) = funded(15);

        assert_eq!(wallet.balance(&blockchain), 15);
        assert_eq!(Wallet::new().unwrap().balance(&blockchain), 0);
    }

    #[test]
    fn test_transfer_builds_payment_and_change() -> Result<()> {
        let (alice, blockchain) = funded(15);
        let bob = Wallet::new()?;

        let transaction = alice.transfer(&blockchain, bob.address(), 10)?;

        assert_eq!(transaction.inputs().len(), 1);
        assert!(transaction.inputs()[0].verify(alice.address()));
        assert_eq!(transaction.outputs().len(), 2);
        assert_eq!(transaction.outputs()[0].recipient(), bob.address());
        assert_eq!(transaction.outputs()[0].amount(), 10);
        assert_eq!(transaction.outputs()[1].recipient(), alice.address());
        assert_eq!(transaction.outputs()[1].amount(), 5);
        Ok(())
    }

    #[test]
    fn test_transfer_keeps_zero_change() -> Result<()> {
        let (alice, blockchain) = funded(15);

        let transaction = alice.transfer(&blockchain, Wallet::new()?.address(), 15)?;

        assert_eq!(transaction.outputs().len(), 2);
        assert_eq!(transaction.outputs()[1].amount(), 0);
        Ok(())
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let (alice, blockchain) = funded(15);

        let result = alice.transfer(&blockchain, Wallet::new().unwrap().address(), 16);

        assert!(matches!(
            result,
            Err(ChainError::InsufficientFunds { required: 16, available: 15 })
        ));
    }

    #[test]
    fn test_transfer_does_not_touch_ledger() -> Result<()> {
        let (alice, blockchain) = funded(15);

        alice.transfer(&blockchain, Wallet::new()?.address(), 10)?;

        assert_eq!(blockchain.height(), 1);
        assert_eq!(alice.balance(&blockchain), 15);
        Ok(())
    }

    #[test]
    fn test_from_private_key() -> Result<()> {
        let private_key = PrivateKey::from_bytes(&[9u8; 32])?;
        let wallet = Wallet::from_private_key(private_key.clone());

        assert_eq!(wallet.address(), &private_key.public_key());
        Ok(())
    }
}
