//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use portal_core::error::CoreError;
use portal_core::roles::DEFAULT_ROLE;
use portal_core::types::DbId;
use portal_core::workflow::validate_required;
use portal_db::models::session::CreateSession;
use portal_db::models::user::{CreateUser, User};
use portal_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, hash_refresh_token, RefreshToken, TokenSubject};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::auth::session::{
    parse_stored_role, promote_configured_admin, resolve_sign_in_role, RoleSource,
};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub role: String,
    pub organization_id: Option<DbId>,
}

/// Response for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: DbId,
    pub email: String,
    pub role: String,
    pub organization_id: Option<DbId>,
    pub role_source: RoleSource,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a client account and sign it in. The configured admin email is
/// promoted to `admin` on the way through.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    if !state.config.allow_registration {
        return Err(AppError::Core(CoreError::Forbidden(
            "Registration is disabled".into(),
        )));
    }

    let name = validate_required("name", input.name.as_deref())?;
    let email = validate_email(input.email.as_deref())?;
    let password = input.password.as_deref().unwrap_or_default();
    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
            role: DEFAULT_ROLE.as_str().to_string(),
            organization_id: None,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    promote_configured_admin(&state.pool, &state.config, user.id, &user.email, DEFAULT_ROLE)
        .await;

    let response = sign_in(&state, &user, ClientInfo::from_headers(&headers)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = validate_required("email", input.email.as_deref())?;
    let password = validate_required("password", input.password.as_deref())?;

    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, email)
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::record_failed_login(&state.pool, user.id).await?;

        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after repeated failed logins");
        }

        return Err(invalid());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let current = parse_stored_role(user.id, &user.role);
    promote_configured_admin(&state.pool, &state.config, user.id, &user.email, current).await;

    let response = sign_in(&state, &user, ClientInfo::from_headers(&headers)).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The role
/// is re-read from the store.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    // Rotation: the presented token is single-use.
    let session = SessionRepo::consume(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = sign_in(&state, &user, ClientInfo::from_headers(&headers)).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// The caller's identity as seen by this request, including where the role
/// came from.
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.user_id,
        email: auth_user.email,
        role: auth_user.role.as_str().to_string(),
        organization_id: auth_user.organization_id,
        role_source: auth_user.role_source,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_email(value: Option<&str>) -> AppResult<&str> {
    let email = validate_required("email", value)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Core(CoreError::Validation(
            "email must be a valid email address".into(),
        ))),
    }
}

/// Request metadata stored with a refresh session.
#[derive(Debug, Default, PartialEq, Eq)]
struct ClientInfo {
    user_agent: Option<String>,
    ip_address: Option<String>,
}

impl ClientInfo {
    fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        Self {
            user_agent: header("user-agent").map(str::to_string),
            ip_address: header("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(|ip| ip.trim().to_string())
                .or_else(|| header("x-real-ip").map(str::to_string)),
        }
    }
}

/// Resolve the sign-in role, issue tokens and persist the refresh session.
async fn sign_in(state: &AppState, user: &User, client: ClientInfo) -> AppResult<AuthResponse> {
    let role = resolve_sign_in_role(user.id, UserRepo::find_role(&state.pool, user.id).await);

    let access_token = generate_access_token(
        &TokenSubject {
            user_id: user.id,
            email: &user.email,
            role: role.as_str(),
            organization_id: user.organization_id,
        },
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = RefreshToken::generate();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh.hash,
            expires_at: state.config.jwt.refresh_expires_at(),
            user_agent: client.user_agent,
            ip_address: client.ip_address,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.token,
        expires_in: state.config.jwt.access_ttl_secs(),
        user: UserInfo {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: role.as_str().to_string(),
            organization_id: user.organization_id,
        },
    })
}
