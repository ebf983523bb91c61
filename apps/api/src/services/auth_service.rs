//! Authentication service implementation.
//!
//! Registers accounts, exchanges email/password for an access token and
//! resolves bearer tokens back to users.
//!
//! ## Token Flow
//! ```text
//! POST /auth/login {email, password}
//!      │
//!      ▼
//! users.find_by_email ──► argon2 verify ──► JwtManager::generate_access_token
//!      │                                          │
//!      ▼                                          ▼
//! Unauthenticated (same message for both)    {access_token, expires_in}
//!
//! Authorization: Bearer <token>
//!      │
//!      ▼
//! authenticate() ──► claims.sub ──► user row must still exist
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use feast_core::validation::{validate_email, validate_name, validate_password};
use feast_core::User;
use feast_db::{DbError, NewUser};

use crate::auth::{hash_password, verify_password, AccessToken};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user together with a fresh token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(flatten)]
    pub token: AccessToken,
}

/// Authentication service implementation.
pub struct AuthService {
    state: Arc<AppState>,
}

impl AuthService {
    /// Create a new authentication service.
    pub fn new(state: Arc<AppState>) -> Self {
        AuthService { state }
    }

    /// Creates an account and logs it in.
    ///
    /// ## Errors
    /// - `ValidationFailed` for a bad name, email or password
    /// - `Conflict` when the email is taken
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthResponse> {
        let name = validate_name(&request.name)?;
        let email = validate_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = hash_password(&request.password)?;

        let user = self
            .state
            .db
            .users()
            .create(&NewUser {
                name,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation { .. } => ApiError::conflict("Email is already registered"),
                other => other.into(),
            })?;

        info!(user_id = user.id, "User registered");

        let token = self.state.jwt.generate_access_token(user.id)?;
        Ok(AuthResponse { user, token })
    }

    /// Exchanges credentials for an access token.
    ///
    /// ## Errors
    /// - `Unauthenticated` for an unknown email or a wrong password
    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();

        let user = match self.state.db.users().find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Login for unknown email");
                return Err(ApiError::unauthenticated(INVALID_CREDENTIALS));
            }
        };

        if !verify_password(&request.password, &user.password_hash) {
            warn!(user_id = user.id, "Login with wrong password");
            return Err(ApiError::unauthenticated(INVALID_CREDENTIALS));
        }

        info!(user_id = user.id, "User logged in");

        let token = self.state.jwt.generate_access_token(user.id)?;
        Ok(AuthResponse { user, token })
    }

    /// Resolves a bearer token to the id of an existing user.
    pub async fn authenticate(&self, token: &str) -> ApiResult<i64> {
        let claims = self.state.jwt.validate_access_token(token)?;
        let user_id = claims.user_id()?;

        match self.state.db.users().get_by_id(user_id).await? {
            Some(_) => Ok(user_id),
            None => Err(ApiError::unauthenticated("Account no longer exists")),
        }
    }

    /// The profile of the authenticated user.
    pub async fn me(&self, user_id: i64) -> ApiResult<User> {
        self.state
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User not found: {}", user_id)))
    }
}
