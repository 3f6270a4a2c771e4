/// 积分套餐
#[derive(Debug, Clone, PartialEq)]
pub struct CreditPackage {
    pub id: &'static str,
    pub credits: u64,
    /// 价格（美元）
    pub price: u32,
    pub featured: bool,
}

pub static CREDIT_PACKAGES: [CreditPackage; 4] = [
    CreditPackage {
        id: "starter",
        credits: 100,
        price: 39,
        featured: false,
    },
    CreditPackage {
        id: "pro",
        credits: 500,
        price: 149,
        featured: true,
    },
    CreditPackage {
        id: "studio",
        credits: 1000,
        price: 299,
        featured: false,
    },
    CreditPackage {
        id: "enterprise",
        credits: 10000,
        price: 2799,
        featured: false,
    },
];

/// 按 ID 查找套餐
pub fn find_package(id: &str) -> Option<&'static CreditPackage> {
    CREDIT_PACKAGES.iter().find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}
