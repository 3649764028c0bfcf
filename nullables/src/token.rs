//! Nullable vote token: an in-memory fungible token with allowances.

use quorum_external::{TokenService, TransferError};
use quorum_types::{Address, Amount};
use std::collections::HashMap;

/// An in-memory fungible token.
///
/// Behaves like a minimal mintable ERC-20 whose only spender is the engine's
/// custody account: members `approve` the custody account, `transfer_in`
/// spends that allowance, `transfer_out` pays out of the custody balance.
#[derive(Debug, Clone)]
pub struct NullToken {
    custody: Address,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<Address, Amount>,
    fail_transfers_out: bool,
}

impl NullToken {
    pub fn new(custody: Address) -> Self {
        Self {
            custody,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            fail_transfers_out: false,
        }
    }

    /// Create tokens out of thin air.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        self.credit(to, amount)
    }

    /// Allow the custody account to pull up to `amount` from `owner`.
    pub fn approve(&mut self, owner: &Address, amount: Amount) {
        self.allowances.insert(owner.clone(), amount);
    }

    pub fn balance_of(&self, who: &Address) -> Amount {
        self.balances.get(who).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: &Address) -> Amount {
        self.allowances.get(owner).copied().unwrap_or_default()
    }

    pub fn custody(&self) -> &Address {
        &self.custody
    }

    pub fn custody_balance(&self) -> Amount {
        self.balance_of(&self.custody)
    }

    /// Make every subsequent `transfer_out` fail (or succeed again).
    pub fn set_fail_transfers_out(&mut self, fail: bool) {
        self.fail_transfers_out = fail;
    }

    fn credit(&mut self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        let balance = self.balances.entry(to.clone()).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected(format!("balance overflow for {to}")))?;
        Ok(())
    }

    fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let available = self.balance_of(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        // Credit first so an overflow leaves the sender untouched.
        self.credit(to, amount)?;
        self.balances.insert(from.clone(), remaining);
        Ok(())
    }
}

impl TokenService for NullToken {
    fn transfer_in(&mut self, from: &Address, amount: Amount) -> Result<(), TransferError> {
        let allowed = self.allowance(from);
        let left = allowed
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientAllowance {
                needed: amount,
                allowed,
            })?;
        let custody = self.custody.clone();
        self.move_balance(from, &custody, amount)?;
        self.allowances.insert(from.clone(), left);
        Ok(())
    }

    fn transfer_out(&mut self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        if self.fail_transfers_out {
            return Err(TransferError::Rejected("transfers out are disabled".into()));
        }
        let custody = self.custody.clone();
        self.move_balance(&custody, to, amount)
    }
}
