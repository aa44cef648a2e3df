//! Account Service
//!
//! Registration, email verification, login and profile management.
//! Passwords and pending verification codes are both stored as Argon2
//! hashes; plain codes only ever leave the process through the notifier.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use shared::models::{
    LoginRequest, LoginResponse, PasswordUpdate, RegisterRequest, ResendCodeRequest, Role, User,
    UserInfo, UserInfoUpdate, UserQuery, VerifyRequest,
};

use crate::auth::{CurrentUser, JwtService};
use crate::db::repository::{BranchRepository, RepoError, UserRepository, patch_of};
use crate::security_log;
use crate::services::blob::BlobStore;
use crate::services::credential::CredentialVerifier;
use crate::services::image::ImageFile;
use crate::services::notifier::{Notifier, verification_email};
use crate::store::Document;
use crate::utils::id::new_object_id;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_email, validate_email,
    validate_optional_text, validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Blob folder for avatars
pub const AVATAR_FOLDER: &str = "avatars";

fn user_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
        .with_detail("user_id", id)
}

#[derive(Clone)]
pub struct AccountService {
    users: UserRepository,
    branches: BranchRepository,
    credentials: CredentialVerifier,
    jwt: Arc<JwtService>,
    notifier: Arc<dyn Notifier>,
    blobs: Arc<dyn BlobStore>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("users", &self.users)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(
        users: UserRepository,
        branches: BranchRepository,
        jwt: Arc<JwtService>,
        notifier: Arc<dyn Notifier>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            users,
            branches,
            credentials: CredentialVerifier::new(),
            jwt,
            notifier,
            blobs,
        }
    }

    async fn load(&self, id: &str) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    async fn load_by_email(&self, email: &str) -> AppResult<User> {
        self.users.find_by_email(email).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::UserNotFound, format!("No account for {email}"))
        })
    }

    async fn send_code(&self, email: &str, code: &str) -> AppResult<()> {
        let (subject, body) = verification_email(code);
        self.notifier.send(email, &subject, &body).await?;
        Ok(())
    }

    // ==================== Registration ====================

    /// Create an unverified staff account and email its verification code
    ///
    /// A notifier failure removes the new account again and fails the call.
    pub async fn register(&self, payload: RegisterRequest) -> AppResult<UserInfo> {
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        let email = normalize_email(&payload.email);
        validate_email(&email)?;
        validate_password(&payload.password)?;
        if let Some(branch_id) = &payload.branch_id
            && !self.branches.exists(branch_id).await?
        {
            return Err(AppError::with_message(
                ErrorCode::BranchNotFound,
                format!("Branch {branch_id} not found"),
            ));
        }

        let code = self.credentials.generate_code();
        let now = Utc::now();
        let user = User {
            id: new_object_id(),
            branch_id: payload.branch_id,
            name: payload.name.trim().to_string(),
            email: email.clone(),
            password_hash: self.credentials.hash(&payload.password)?,
            avatar: None,
            role: Role::Staff,
            address: None,
            nrc: None,
            gender: None,
            verification_code: Some(self.credentials.hash(&code)?),
            is_verified: false,
            created_at: now,
            updated_at: now,
        };

        match self.users.create(&user).await {
            Ok(()) => {}
            Err(RepoError::Duplicate(_)) => {
                return Err(AppError::with_message(
                    ErrorCode::EmailExists,
                    format!("Email {email} is already registered"),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = self.send_code(&email, &code).await {
            tracing::error!(user_id = %user.id, error = %e, "Verification email failed, rolling back registration");
            if let Err(cleanup) = self.users.delete(&user.id).await {
                tracing::error!(user_id = %user.id, error = %cleanup, "Failed to remove unverified account");
            }
            return Err(e);
        }

        tracing::info!(user_id = %user.id, email = %email, "User registered");
        Ok(user.into())
    }

    pub async fn verify(&self, payload: VerifyRequest) -> AppResult<UserInfo> {
        let email = normalize_email(&payload.email);
        let user = self.load_by_email(&email).await?;
        if user.is_verified {
            return Err(AppError::new(ErrorCode::AlreadyVerified));
        }

        let matches = user
            .verification_code
            .as_deref()
            .is_some_and(|hash| self.credentials.verify(payload.verification_code.trim(), hash));
        if !matches {
            security_log!("WARN", "verification_failed", email = email.clone());
            return Err(AppError::new(ErrorCode::VerificationCodeInvalid));
        }

        let mut patch = Document::new();
        patch.insert("is_verified".into(), Value::Bool(true));
        patch.insert("verification_code".into(), Value::Null);
        let user = self.users.patch(&user.id, patch).await?;
        tracing::info!(user_id = %user.id, "Account verified");
        Ok(user.into())
    }

    /// Issue a fresh code, invalidating the previous one
    pub async fn resend_code(&self, payload: ResendCodeRequest) -> AppResult<()> {
        let email = normalize_email(&payload.email);
        let user = self.load_by_email(&email).await?;
        if user.is_verified {
            return Err(AppError::new(ErrorCode::AlreadyVerified));
        }

        let code = self.credentials.generate_code();
        let mut patch = Document::new();
        patch.insert(
            "verification_code".into(),
            Value::String(self.credentials.hash(&code)?),
        );
        self.users.patch(&user.id, patch).await?;
        self.send_code(&email, &code).await
    }

    // ==================== Session ====================

    pub async fn login(&self, payload: LoginRequest) -> AppResult<LoginResponse> {
        let email = normalize_email(&payload.email);
        let user = match self.users.find_by_email(&email).await? {
            Some(user) if self.credentials.verify(&payload.password, &user.password_hash) => user,
            _ => {
                security_log!("WARN", "login_failed", email = email.clone());
                return Err(AppError::invalid_credentials());
            }
        };
        if !user.is_verified {
            return Err(AppError::new(ErrorCode::EmailNotVerified));
        }

        let token = self
            .jwt
            .generate_token(&user.id, &user.email, user.role)
            .map_err(|e| AppError::internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, role = user.role.name(), "User logged in");
        Ok(LoginResponse {
            token,
            expires_in: self.jwt.expires_in_seconds(),
            user: user.into(),
        })
    }

    // ==================== Profile ====================

    pub async fn me(&self, current: &CurrentUser) -> AppResult<UserInfo> {
        Ok(self.load(&current.id).await?.into())
    }

    pub async fn update_info(&self, current: &CurrentUser, payload: UserInfoUpdate) -> AppResult<UserInfo> {
        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
        validate_optional_text(&payload.nrc, "nrc", MAX_SHORT_TEXT_LEN)?;

        let user = self.users.patch(&current.id, patch_of(&payload)?).await?;
        Ok(user.into())
    }

    /// Store a new avatar and drop the previous one
    pub async fn update_avatar(&self, current: &CurrentUser, image: ImageFile) -> AppResult<UserInfo> {
        let previous = self.load(&current.id).await?.avatar;
        let url = self
            .blobs
            .put(AVATAR_FOLDER, &image.extension, image.bytes, &image.content_type)
            .await?;

        let mut patch = Document::new();
        patch.insert("avatar".into(), Value::String(url.clone()));
        let user = self.users.patch(&current.id, patch).await?;

        if let Some(old) = previous.filter(|old| *old != url) {
            self.discard_blob(&old).await;
        }
        Ok(user.into())
    }

    pub async fn update_password(&self, current: &CurrentUser, payload: PasswordUpdate) -> AppResult<()> {
        let user = self.load(&current.id).await?;
        if !self
            .credentials
            .verify(&payload.current_password, &user.password_hash)
        {
            security_log!("WARN", "password_change_rejected", user_id = user.id.clone());
            return Err(AppError::invalid_credentials());
        }
        validate_password(&payload.new_password)?;

        let mut patch = Document::new();
        patch.insert(
            "password_hash".into(),
            Value::String(self.credentials.hash(&payload.new_password)?),
        );
        self.users.patch(&user.id, patch).await?;
        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    // ==================== Administration ====================

    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<UserInfo>> {
        if let Some(role) = query.role {
            Role::try_from(role).map_err(|e| AppError::with_message(ErrorCode::InvalidRole, e))?;
        }
        let users = self.users.find_all(query).await?;
        Ok(users.into_iter().map(UserInfo::from).collect())
    }

    /// Change another user's role
    ///
    /// Root accounts are never modified and nobody is promoted to root here.
    pub async fn set_role(&self, actor: &CurrentUser, id: &str, role: Role) -> AppResult<UserInfo> {
        let target = self.load(id).await?;
        if target.role == Role::Root || role == Role::Root {
            security_log!("WARN", "root_modification_denied", actor = actor.id.clone(), target = id.to_string());
            return Err(AppError::new(ErrorCode::CannotModifyRoot));
        }
        if role > actor.role && !actor.is_root() {
            return Err(AppError::with_message(
                ErrorCode::InvalidRole,
                format!("Cannot grant role {} above your own", role.name()),
            ));
        }

        let user = self.users.set_role(id, role).await?;
        tracing::info!(actor = %actor.id, user_id = %id, role = role.name(), "User role changed");
        Ok(user.into())
    }

    pub async fn delete(&self, actor: &CurrentUser, id: &str) -> AppResult<()> {
        let target = self.load(id).await?;
        if target.role == Role::Root {
            return Err(AppError::new(ErrorCode::CannotModifyRoot));
        }
        if target.id == actor.id {
            return Err(AppError::validation("Cannot delete your own account"));
        }
        self.users.delete(id).await?;
        if let Some(avatar) = target.avatar {
            self.discard_blob(&avatar).await;
        }
        tracing::info!(actor = %actor.id, user_id = %id, "User deleted");
        Ok(())
    }

    async fn discard_blob(&self, url: &str) {
        if let Err(e) = self.blobs.delete(url).await {
            tracing::warn!(url = %url, error = %e, "Failed to delete superseded blob");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::auth::JwtConfig;
    use crate::services::blob::LocalBlobStore;
    use crate::services::notifier::{LogNotifier, NotifyError};
    use crate::store::StoreHandle;

    struct DownNotifier;

    #[async_trait]
    impl Notifier for DownNotifier {
        async fn send(&self, _: &str, _: &str, _: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("smtp unreachable".into()))
        }
    }

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::with_config(JwtConfig {
            secret: "account-service-test-secret-0123456789".into(),
            expiration_minutes: 60,
            issuer: "food-server".into(),
            audience: "food-clients".into(),
        }))
    }

    fn service(notifier: Arc<dyn Notifier>, dir: &tempfile::TempDir) -> AccountService {
        let store = StoreHandle::memory();
        AccountService::new(
            UserRepository::new(store.clone()),
            BranchRepository::new(store),
            jwt(),
            notifier,
            Arc::new(LocalBlobStore::new(dir.path(), "http://localhost/uploads")),
        )
    }

    fn sent_code(notifier: &LogNotifier, email: &str) -> String {
        let body = notifier.last_to(email).unwrap().html_body;
        body.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Aung Aung".into(),
            email: email.into(),
            password: "secret-pass".into(),
            branch_id: None,
        }
    }

    #[tokio::test]
    async fn test_register_verify_login() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(LogNotifier::new());
        let accounts = service(notifier.clone(), &dir);

        let info = accounts.register(registration(" Aung@Example.com ")).await.unwrap();
        assert_eq!(info.email, "aung@example.com");
        assert!(!info.is_verified);

        let err = accounts
            .login(LoginRequest {
                email: "aung@example.com".into(),
                password: "secret-pass".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailNotVerified);

        let err = accounts
            .verify(VerifyRequest {
                email: "aung@example.com".into(),
                verification_code: "000000x".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationCodeInvalid);

        let code = sent_code(&notifier, "aung@example.com");
        let verified = accounts
            .verify(VerifyRequest {
                email: "aung@example.com".into(),
                verification_code: code,
            })
            .await
            .unwrap();
        assert!(verified.is_verified);

        let login = accounts
            .login(LoginRequest {
                email: "AUNG@example.com".into(),
                password: "secret-pass".into(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.role, Role::Staff);
        assert_eq!(login.expires_in, 3600);
        assert!(jwt().validate_token(&login.token).is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = service(Arc::new(LogNotifier::new()), &dir);
        accounts.register(registration("dup@example.com")).await.unwrap();
        let err = accounts.register(registration("DUP@example.com")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailExists);
    }

    #[tokio::test]
    async fn test_notifier_failure_fails_registration() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = service(Arc::new(DownNotifier), &dir);
        let err = accounts.register(registration("x@example.com")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotifierFailed);
        // rolled back, so the address can register again later
        assert!(accounts.users.find_by_email("x@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = service(Arc::new(LogNotifier::new()), &dir);
        accounts.register(registration("k@example.com")).await.unwrap();

        let unknown = accounts
            .login(LoginRequest {
                email: "nobody@example.com".into(),
                password: "secret-pass".into(),
            })
            .await
            .unwrap_err();
        let wrong = accounts
            .login(LoginRequest {
                email: "k@example.com".into(),
                password: "wrong-pass".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(unknown.code, ErrorCode::InvalidCredentials);
        assert_eq!(wrong.code, unknown.code);
        assert_eq!(wrong.message, unknown.message);
    }
}
