use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

/// Header carrying the anonymous cart marker.
pub const CART_TOKEN_HEADER: &str = "x-cart-token";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "admin")
}

/// Decode the bearer token, if the request carries one.
pub fn bearer_user(headers: &HeaderMap, secret: &str) -> Result<Option<AuthUser>, AppError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

    if !auth_str.starts_with("Bearer ") {
        return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
    }
    let token = auth_str.trim_start_matches("Bearer ").trim();

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;

    Ok(Some(AuthUser {
        user_id,
        role: decoded.claims.role,
    }))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_user(&parts.headers, &state.config.jwt_secret)?.ok_or(AppError::Unauthorized)
    }
}

/// Who is asking: a logged-in user or an anonymous visitor with an
/// optional cart token.
#[derive(Debug, Clone)]
pub enum Identity {
    Authenticated(AuthUser),
    Anonymous { cart_token: Option<Uuid> },
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap, secret: &str) -> Result<Self, AppError> {
        if let Some(user) = bearer_user(headers, secret)? {
            return Ok(Identity::Authenticated(user));
        }

        let cart_token = match headers.get(CART_TOKEN_HEADER) {
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| AppError::BadRequest("Invalid cart token".into()))?;
                Some(
                    Uuid::parse_str(raw.trim())
                        .map_err(|_| AppError::BadRequest("Invalid cart token".into()))?,
                )
            }
            None => None,
        };
        Ok(Identity::Anonymous { cart_token })
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous { .. } => None,
        }
    }

    /// Operations that need a customer reject anonymous visitors.
    pub fn require_user(&self) -> Result<&AuthUser, AppError> {
        self.user().ok_or(AppError::NoIdentity)
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers, &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "unit-test-secret";

    fn token_for(user_id: Uuid, role: &str) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn no_headers_is_anonymous_without_token() {
        let identity = Identity::from_headers(&HeaderMap::new(), SECRET).unwrap();
        assert!(matches!(identity, Identity::Anonymous { cart_token: None }));
        assert!(matches!(identity.require_user(), Err(AppError::NoIdentity)));
    }

    #[test]
    fn cart_token_header_is_parsed() {
        let token = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            CART_TOKEN_HEADER,
            HeaderValue::from_str(&token.to_string()).unwrap(),
        );
        let identity = Identity::from_headers(&headers, SECRET).unwrap();
        match identity {
            Identity::Anonymous { cart_token } => assert_eq!(cart_token, Some(token)),
            other => panic!("unexpected identity {other:?}"),
        }
    }

    #[test]
    fn malformed_cart_token_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(CART_TOKEN_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(
            Identity::from_headers(&headers, SECRET),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn bearer_token_wins_over_cart_token() {
        let user_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token_for(user_id, "user"))).unwrap(),
        );
        headers.insert(
            CART_TOKEN_HEADER,
            HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
        );
        let identity = Identity::from_headers(&headers, SECRET).unwrap();
        let user = identity.require_user().unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, "user");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token_for(Uuid::new_v4(), "user")))
                .unwrap(),
        );
        assert!(matches!(
            bearer_user(&headers, "another-secret"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn admin_gate() {
        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            role: "admin".into(),
        };
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            role: "user".into(),
        };
        assert!(ensure_admin(&admin).is_ok());
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
    }
}
