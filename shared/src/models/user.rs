//! User Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role
///
/// Numeric values match the legacy role numbers:
/// 0 waiter/chef, 1 assistant, 2 manager, 3 owner, 100 root admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Role {
    Staff = 0,
    Assistant = 1,
    Manager = 2,
    Owner = 3,
    Root = 100,
}

impl Role {
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Assistant => "assistant",
            Self::Manager => "manager",
            Self::Owner => "owner",
            Self::Root => "root",
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Staff),
            1 => Ok(Self::Assistant),
            2 => Ok(Self::Manager),
            3 => Ok(Self::Owner),
            100 => Ok(Self::Root),
            other => Err(format!("invalid role: {other}")),
        }
    }
}

/// Gender, stored with the legacy codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "001")]
    Male,
    #[serde(rename = "002")]
    Female,
}

/// Stored user document
///
/// Holds the password hash and pending verification code; never returned
/// to clients directly, see [`UserInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub branch_id: Option<String>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub nrc: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub verification_code: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub branch_id: Option<String>,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub address: Option<String>,
    pub nrc: Option<String>,
    pub gender: Option<Gender>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            branch_id: user.branch_id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            role: user.role,
            address: user.address,
            nrc: user.nrc,
            gender: user.gender,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub branch_id: Option<String>,
}

/// Account verification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub verification_code: String,
}

/// Resend verification code payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Self-service profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfoUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub address: Option<String>,
    pub nrc: Option<String>,
    pub gender: Option<Gender>,
}

/// Self-service password change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordUpdate {
    pub current_password: String,
    pub new_password: String,
}

/// Admin role change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// User list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub role: Option<u8>,
    pub branch_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_numbers() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "2");
        assert_eq!(serde_json::from_str::<Role>("100").unwrap(), Role::Root);
        assert!(serde_json::from_str::<Role>("7").is_err());
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Staff < Role::Assistant);
        assert!(Role::Owner < Role::Root);
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"002\"");
        assert_eq!(serde_json::from_str::<Gender>("\"001\"").unwrap(), Gender::Male);
    }
}
