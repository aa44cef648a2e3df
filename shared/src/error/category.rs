//! 错误码分组 (按千位)

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Domain an [`ErrorCode`] belongs to, derived from its thousands digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Account,
    Order,
    Sale,
    Catalog,
    /// 门店与餐桌
    Table,
    User,
    /// 存储、超时、内部错误；响应时记录 error 日志
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        const BY_THOUSAND: [ErrorCategory; 9] = [
            ErrorCategory::General,
            ErrorCategory::Auth,
            ErrorCategory::Permission,
            ErrorCategory::Account,
            ErrorCategory::Order,
            ErrorCategory::Sale,
            ErrorCategory::Catalog,
            ErrorCategory::Table,
            ErrorCategory::User,
        ];
        BY_THOUSAND
            .get(usize::from(code / 1000))
            .copied()
            .unwrap_or(Self::System)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Account => "account",
            Self::Order => "order",
            Self::Sale => "sale",
            Self::Catalog => "catalog",
            Self::Table => "table",
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_digit_selects_category() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5002), ErrorCategory::Sale);
        assert_eq!(ErrorCategory::from_code(7002), ErrorCategory::Table);
        assert_eq!(ErrorCategory::from_code(9102), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(u16::MAX), ErrorCategory::System);
    }

    #[test]
    fn codes_land_in_their_domain() {
        assert_eq!(ErrorCode::OrderInvalidTransition.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::SettlementConflict.category(), ErrorCategory::Sale);
        assert_eq!(ErrorCode::AddOnUnavailable.category(), ErrorCategory::Catalog);
        assert_eq!(ErrorCode::TimeoutError.category(), ErrorCategory::System);
        assert_eq!(ErrorCategory::Catalog.name(), "catalog");
    }
}
