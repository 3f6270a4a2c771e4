//! 积分购买服务
//!
//! 没有真实支付，选择套餐后立即入账

use tracing::info;

use crate::error::{AppResult, ConfigError};
use crate::models::{find_package, CreditPackage};
use crate::queue::CreditLedger;

#[derive(Debug, Default)]
pub struct PurchaseService;

impl PurchaseService {
    pub fn new() -> Self {
        Self
    }

    /// 购买套餐，返回新的余额
    pub fn purchase(&self, ledger: &mut CreditLedger, package: &CreditPackage) -> u64 {
        ledger.credit(package.credits);
        info!(
            "💳 已购买套餐 {}: +{} 积分 (${})，余额 {}",
            package.id,
            package.credits,
            package.price,
            ledger.balance()
        );
        ledger.balance()
    }

    /// 按套餐 ID 购买
    pub fn purchase_by_id(&self, ledger: &mut CreditLedger, package_id: &str) -> AppResult<u64> {
        let package = find_package(package_id).ok_or_else(|| ConfigError::UnknownPackage {
            id: package_id.to_string(),
        })?;
        Ok(self.purchase(ledger, package))
    }
}
