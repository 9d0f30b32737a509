//! Authentication middleware
//!
//! Validates the bearer JWT issued by the user service and exposes the
//! caller's identity to handlers.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    /// Access level claim as issued; numeric levels are kept as text
    pub level: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    #[serde(default)]
    pub level: Option<serde_json::Value>,
    pub exp: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        let level = claims.level.and_then(|value| match value {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });
        AuthUser {
            user_id: claims.id,
            level,
        }
    }
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.map(bearer_token) {
        Some(token) if !token.is_empty() => token,
        _ => return unauthorized_response("Token tidak ditemukan"),
    };

    let claims = match decode_jwt(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(msg) => {
            tracing::debug!(error = %msg, "Rejected bearer token");
            return unauthorized_response("Token tidak valid");
        }
    };

    request.extensions_mut().insert(AuthUser::from(claims));

    next.run(request).await
}

/// Token from an Authorization header; legacy clients omit the `Bearer ` scheme
fn bearer_token(header: &str) -> &str {
    let header = header.trim_start();
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

/// Decode and validate JWT token
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| unauthorized_response("Autentikasi diperlukan"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(claims: &serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_decode_valid_token() {
        let jwt = token(
            &serde_json::json!({ "id": "u-1", "level": 2, "exp": future_exp() }),
            "secret",
        );
        let user = AuthUser::from(decode_jwt(&jwt, "secret").unwrap());
        assert_eq!(user.user_id, "u-1");
        assert_eq!(user.level.as_deref(), Some("2"));
    }

    #[test]
    fn test_bearer_scheme_is_optional() {
        assert_eq!(bearer_token("Bearer abc.def"), "abc.def");
        assert_eq!(bearer_token("abc.def"), "abc.def");
        assert_eq!(bearer_token(" Bearer  "), "");
    }

    #[test]
    fn test_decode_rejects_wrong_secret_and_expiry() {
        let jwt = token(
            &serde_json::json!({ "id": "u-1", "level": "admin", "exp": future_exp() }),
            "secret",
        );
        assert!(decode_jwt(&jwt, "other").is_err());

        let expired = token(
            &serde_json::json!({ "id": "u-1", "exp": chrono::Utc::now().timestamp() - 3600 }),
            "secret",
        );
        assert!(decode_jwt(&expired, "secret").is_err());
    }
}
