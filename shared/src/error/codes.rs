//! Unified error codes for the nano-food backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors (registration, verification)
//! - 4xxx: Order errors
//! - 5xxx: Sale / settlement errors
//! - 6xxx: Catalog errors (menus, add-ons, categories, uploads)
//! - 7xxx: Table and branch errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so frontends can switch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account email has not been verified yet
    EmailNotVerified = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Root admin account cannot be modified
    CannotModifyRoot = 2003,

    // ==================== 3xxx: Account ====================
    /// Verification code does not match
    VerificationCodeInvalid = 3001,
    /// Account is already verified
    AlreadyVerified = 3002,
    /// Password does not meet the minimum length
    PasswordTooShort = 3003,
    /// Email address is malformed
    InvalidEmail = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order already completed
    OrderAlreadyCompleted = 4002,
    /// Order already cancelled
    OrderAlreadyCancelled = 4003,
    /// Order status transition not allowed
    OrderInvalidTransition = 4004,
    /// Order has no items
    OrderEmpty = 4005,
    /// Quantity must be a positive integer within limits
    InvalidQuantity = 4006,
    /// Cart references a menu item that cannot be resolved
    InvalidMenuReference = 4007,
    /// Cart references an add-on that cannot be resolved
    InvalidAddOnReference = 4008,

    // ==================== 5xxx: Sale ====================
    /// Sale not found
    SaleNotFound = 5001,
    /// Order changed while being settled
    SettlementConflict = 5002,
    /// Settlement failed after some orders were already transitioned
    SettlementPartiallyApplied = 5003,
    /// Invalid money amount (negative discount/tax, ...)
    InvalidAmount = 5004,
    /// Sale references no orders or duplicate orders
    InvalidOrderSet = 5005,
    /// Orders belong to a different branch than the sale
    BranchMismatch = 5006,

    // ==================== 6xxx: Catalog ====================
    /// Menu not found
    MenuNotFound = 6001,
    /// Menu is marked unavailable
    MenuUnavailable = 6002,
    /// Add-on not found
    AddOnNotFound = 6003,
    /// Add-on is marked unavailable
    AddOnUnavailable = 6004,
    /// Category not found
    CategoryNotFound = 6005,
    /// Invalid price or discount
    InvalidPrice = 6006,
    /// Uploaded file is empty
    FileEmpty = 6501,
    /// Uploaded file exceeds the size limit
    FileTooLarge = 6502,
    /// Unsupported file format
    UnsupportedFileFormat = 6503,
    /// File content is not a valid image
    InvalidImageFile = 6504,
    /// No file in the request
    NoFilename = 6505,

    // ==================== 7xxx: Table / Branch ====================
    /// Table not found
    TableNotFound = 7001,
    /// Branch not found
    BranchNotFound = 7002,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Email already registered
    EmailExists = 8002,
    /// Invalid role value
    InvalidRole = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database / document store error
    DatabaseError = 9002,
    /// Network / upstream error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Blob storage failure
    FileStorageFailed = 9101,
    /// Notifier (email) failure
    NotifierFailed = 9102,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Whether the caller may retry the same request unchanged
    #[inline]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, ErrorCode::TimeoutError | ErrorCode::NetworkError)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::EmailNotVerified => "Email address has not been verified",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "A higher role is required",
            ErrorCode::CannotModifyRoot => "Root admin cannot be modified",

            // Account
            ErrorCode::VerificationCodeInvalid => "Verification code is invalid",
            ErrorCode::AlreadyVerified => "Account is already verified",
            ErrorCode::PasswordTooShort => "Password is too short",
            ErrorCode::InvalidEmail => "Email address is invalid",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyCompleted => "Order already completed",
            ErrorCode::OrderAlreadyCancelled => "Order already cancelled",
            ErrorCode::OrderInvalidTransition => "Order status transition not allowed",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::InvalidQuantity => "Invalid quantity",
            ErrorCode::InvalidMenuReference => "Menu reference cannot be resolved",
            ErrorCode::InvalidAddOnReference => "Add-on reference cannot be resolved",

            // Sale
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::SettlementConflict => "Order changed during settlement",
            ErrorCode::SettlementPartiallyApplied => {
                "Settlement failed after some orders were transitioned"
            }
            ErrorCode::InvalidAmount => "Invalid amount",
            ErrorCode::InvalidOrderSet => "Invalid set of orders",
            ErrorCode::BranchMismatch => "Order belongs to a different branch",

            // Catalog
            ErrorCode::MenuNotFound => "Menu not found",
            ErrorCode::MenuUnavailable => "Menu is not available",
            ErrorCode::AddOnNotFound => "Add-on not found",
            ErrorCode::AddOnUnavailable => "Add-on is not available",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::InvalidPrice => "Invalid price",
            ErrorCode::FileEmpty => "File is empty",
            ErrorCode::FileTooLarge => "File is too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFilename => "No file provided",

            // Table / Branch
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::BranchNotFound => "Branch not found",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailExists => "Email already registered",
            ErrorCode::InvalidRole => "Invalid role",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::FileStorageFailed => "File storage failed",
            ErrorCode::NotifierFailed => "Failed to send notification",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::EmailNotVerified),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::CannotModifyRoot),

            // Account
            3001 => Ok(ErrorCode::VerificationCodeInvalid),
            3002 => Ok(ErrorCode::AlreadyVerified),
            3003 => Ok(ErrorCode::PasswordTooShort),
            3004 => Ok(ErrorCode::InvalidEmail),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyCompleted),
            4003 => Ok(ErrorCode::OrderAlreadyCancelled),
            4004 => Ok(ErrorCode::OrderInvalidTransition),
            4005 => Ok(ErrorCode::OrderEmpty),
            4006 => Ok(ErrorCode::InvalidQuantity),
            4007 => Ok(ErrorCode::InvalidMenuReference),
            4008 => Ok(ErrorCode::InvalidAddOnReference),

            // Sale
            5001 => Ok(ErrorCode::SaleNotFound),
            5002 => Ok(ErrorCode::SettlementConflict),
            5003 => Ok(ErrorCode::SettlementPartiallyApplied),
            5004 => Ok(ErrorCode::InvalidAmount),
            5005 => Ok(ErrorCode::InvalidOrderSet),
            5006 => Ok(ErrorCode::BranchMismatch),

            // Catalog
            6001 => Ok(ErrorCode::MenuNotFound),
            6002 => Ok(ErrorCode::MenuUnavailable),
            6003 => Ok(ErrorCode::AddOnNotFound),
            6004 => Ok(ErrorCode::AddOnUnavailable),
            6005 => Ok(ErrorCode::CategoryNotFound),
            6006 => Ok(ErrorCode::InvalidPrice),
            6501 => Ok(ErrorCode::FileEmpty),
            6502 => Ok(ErrorCode::FileTooLarge),
            6503 => Ok(ErrorCode::UnsupportedFileFormat),
            6504 => Ok(ErrorCode::InvalidImageFile),
            6505 => Ok(ErrorCode::NoFilename),

            // Table / Branch
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::BranchNotFound),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::EmailExists),
            8003 => Ok(ErrorCode::InvalidRole),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::FileStorageFailed),
            9102 => Ok(ErrorCode::NotifierFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::NotAuthenticated,
        ErrorCode::EmailNotVerified,
        ErrorCode::PermissionDenied,
        ErrorCode::VerificationCodeInvalid,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderInvalidTransition,
        ErrorCode::InvalidAddOnReference,
        ErrorCode::SaleNotFound,
        ErrorCode::SettlementPartiallyApplied,
        ErrorCode::MenuUnavailable,
        ErrorCode::NoFilename,
        ErrorCode::TableNotFound,
        ErrorCode::BranchNotFound,
        ErrorCode::EmailExists,
        ErrorCode::TimeoutError,
        ErrorCode::NotifierFailed,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::SettlementPartiallyApplied.code(), 5003);
        assert_eq!(ErrorCode::MenuNotFound.code(), 6001);
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);
        assert_eq!(ErrorCode::UserNotFound.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_covers_every_code() {
        for code in ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("5003").unwrap();
        assert_eq!(code, ErrorCode::SettlementPartiallyApplied);
        assert!(serde_json::from_str::<ErrorCode>("10000").is_err());
    }

    #[test]
    fn test_retriable() {
        assert!(ErrorCode::TimeoutError.is_retriable());
        assert!(ErrorCode::NetworkError.is_retriable());
        assert!(!ErrorCode::DatabaseError.is_retriable());
        assert!(!ErrorCode::OrderNotFound.is_retriable());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::OrderEmpty.message(), "Order has no items");
        assert_eq!(ErrorCode::TimeoutError.message(), "Operation timed out");
    }
}
