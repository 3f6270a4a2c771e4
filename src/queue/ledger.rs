use tracing::debug;

use crate::error::LedgerError;

/// 积分账本
///
/// 只在内存中保存余额，余额永远不会小于 0
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreditLedger {
    balance: u64,
}

impl CreditLedger {
    pub fn new(starting_credits: u64) -> Self {
        Self {
            balance: starting_credits,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    /// 充值
    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
        debug!("积分入账 +{}，余额 {}", amount, self.balance);
    }

    /// 扣费，余额不足时拒绝且不修改余额
    pub fn debit(&mut self, amount: u64) -> Result<(), LedgerError> {
        if !self.can_afford(amount) {
            return Err(LedgerError::Insufficient {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        debug!("积分扣除 -{}，余额 {}", amount, self.balance);
        Ok(())
    }
}
