use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::error::ApiError;
use crate::AppState;

/// Bearer-token middleware: verify the JWT, load the account it names, and
/// attach the `Account` to request extensions. A token whose account has been
/// deleted since issuance is rejected the same way as a bad token.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers)?;
    let claims = auth::validate_jwt(&token)?;

    let account = state
        .store
        .find_account(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

/// Pull the token out of the Authorization header. Clients send either
/// `Bearer <token>` or the bare token; both are accepted.
fn extract_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(ApiError::unauthorized("Missing token"));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert("authorization", HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn accepts_bearer_and_bare_tokens() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_bearer(&headers("abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_and_empty_headers() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
        assert!(extract_bearer(&headers("Bearer   ")).is_err());
    }
}
