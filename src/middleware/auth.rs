use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;
use crate::services::Requester;
use crate::state::AppState;

/// Authenticated caller extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn requester(&self) -> Requester {
        Requester::new(self.id, self.username.clone(), self.roles.clone())
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

impl From<AuthUser> for Requester {
    fn from(user: AuthUser) -> Self {
        Requester::new(user.id, user.username, user.roles)
    }
}

/// JWT authentication middleware: validates the bearer token and injects `AuthUser`
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(token, &state.config.security.jwt_secret).map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError::unauthorized(e.to_string())
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, String> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = extract_bearer(&HeaderMap::new()).unwrap_err();
        assert!(err.contains("Missing"));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(extract_bearer(&headers("Bearer   ")).unwrap_err().contains("Empty"));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(extract_bearer(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer(&headers("abc.def")).is_err());
    }

    #[test]
    fn auth_user_becomes_requester() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            username: "user0".into(),
            roles: vec!["user".into(), "admin".into()],
        };
        let requester = Requester::from(user.clone());
        assert_eq!(requester.id, user.id);
        assert!(requester.is_admin());
    }
}
