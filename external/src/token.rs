//! Fungible balance service.

use crate::error::TransferError;
use quorum_types::{Address, Amount};

/// The vote token as seen by the engine.
///
/// Custody is implicit: `transfer_in` moves tokens from a member into the
/// engine's custody (spending an allowance the member granted beforehand),
/// `transfer_out` moves custody tokens back to a member.
pub trait TokenService {
    /// Pull `amount` from `from` into custody.
    fn transfer_in(&mut self, from: &Address, amount: Amount) -> Result<(), TransferError>;

    /// Push `amount` from custody to `to`.
    fn transfer_out(&mut self, to: &Address, amount: Amount) -> Result<(), TransferError>;
}
