//! JWT authentication and role policy.
//!
//! Tokens are issued upstream; this service validates them and maps the
//! `role` claim onto the operations it may perform.
//!
//! ## Role Policy
//! ```text
//! ┌──────────────────────────────┬─────────┬─────────┬───────────┐
//! │ Operation                    │  admin  │  sales  │ warehouse │
//! ├──────────────────────────────┼─────────┼─────────┼───────────┤
//! │ place order                  │         │    ✓    │           │
//! │ update order status          │         │         │     ✓     │
//! │ list / get orders            │    ✓    │    ✓    │     ✓     │
//! │ delete order                 │    ✓    │         │           │
//! │ product / customer writes    │    ✓    │         │           │
//! │ list / get products          │    ✓    │    ✓    │     ✓     │
//! │ list / get customers         │    ✓    │    ✓    │           │
//! └──────────────────────────────┴─────────┴─────────┴───────────┘
//! ```

use std::fmt;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ErrorCode};
use crate::state::AppState;

// =============================================================================
// Roles and Principal
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Sales,
    Warehouse,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Sales => "sales",
            Role::Warehouse => "warehouse",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PlaceOrder,
    UpdateOrderStatus,
    ReadOrders,
    DeleteOrder,
    WriteCatalog,
    ReadCatalog,
    WriteCustomers,
    ReadCustomers,
}

impl Operation {
    pub const fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::PlaceOrder => &[Role::Sales],
            Operation::UpdateOrderStatus => &[Role::Warehouse],
            Operation::ReadOrders | Operation::ReadCatalog => {
                &[Role::Admin, Role::Sales, Role::Warehouse]
            }
            Operation::DeleteOrder | Operation::WriteCatalog | Operation::WriteCustomers => {
                &[Role::Admin]
            }
            Operation::ReadCustomers => &[Role::Admin, Role::Sales],
        }
    }
}

/// The authenticated caller, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    /// Fails with `FORBIDDEN` unless this principal's role may perform `op`.
    pub fn require(&self, op: Operation) -> Result<(), ApiError> {
        if op.allowed_roles().contains(&self.role) {
            return Ok(());
        }

        debug!(user = %self.user_id, role = %self.role, ?op, "Operation denied");
        Err(ApiError::new(
            ErrorCode::Forbidden,
            format!("Role '{}' may not perform {:?}", self.role, op),
        ))
    }
}

// =============================================================================
// JWT
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        JwtManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Mints a token. Used by tooling and tests; production tokens come from
    /// the identity provider sharing the secret.
    pub fn issue_token(&self, user_id: &str, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.lifetime_secs)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {}", e)))
    }

    /// Validates signature and expiry and returns the caller.
    pub fn validate_token(&self, token: &str) -> Result<Principal, ApiError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::new(ErrorCode::Unauthorized, format!("Invalid token: {}", e)))?;

        Ok(Principal {
            user_id: token_data.claims.sub,
            role: token_data.claims.role,
        })
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authenticates every request on the protected router.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| ApiError::new(ErrorCode::Unauthorized, "Missing bearer token"))?;

    let principal = state.jwt.validate_token(token)?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let token = manager.issue_token("agent-7", Role::Sales).unwrap();
        let principal = manager.validate_token(&token).unwrap();

        assert_eq!(principal.user_id, "agent-7");
        assert_eq!(principal.role, Role::Sales);
    }

    #[test]
    fn test_wrong_secret_and_expired_tokens_rejected() {
        let issuer = JwtManager::new("secret-a", 3600);
        let token = issuer.issue_token("agent-7", Role::Sales).unwrap();

        let err = JwtManager::new("secret-b", 3600).validate_token(&token).unwrap_err();
        assert!(matches!(err.code, ErrorCode::Unauthorized));

        let expired = JwtManager::new("secret-a", -3600)
            .issue_token("agent-7", Role::Sales)
            .unwrap();
        assert!(issuer.validate_token(&expired).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer   "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_role_policy() {
        let sales = Principal { user_id: "s".into(), role: Role::Sales };
        let warehouse = Principal { user_id: "w".into(), role: Role::Warehouse };
        let admin = Principal { user_id: "a".into(), role: Role::Admin };

        assert!(sales.require(Operation::PlaceOrder).is_ok());
        assert!(warehouse.require(Operation::PlaceOrder).is_err());
        assert!(admin.require(Operation::PlaceOrder).is_err());

        assert!(warehouse.require(Operation::UpdateOrderStatus).is_ok());
        assert!(sales.require(Operation::UpdateOrderStatus).is_err());

        for p in [&sales, &warehouse, &admin] {
            assert!(p.require(Operation::ReadOrders).is_ok());
            assert!(p.require(Operation::ReadCatalog).is_ok());
        }

        assert!(admin.require(Operation::DeleteOrder).is_ok());
        assert!(sales.require(Operation::WriteCatalog).is_err());
        assert!(sales.require(Operation::ReadCustomers).is_ok());
        assert!(warehouse.require(Operation::ReadCustomers).is_err());

        let err = warehouse.require(Operation::WriteCustomers).unwrap_err();
        assert!(matches!(err.code, ErrorCode::Forbidden));
    }
}
