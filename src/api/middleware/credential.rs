use crate::AppState;
use crate::services::identity::{Credential, IdentityMode};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const PASSWORD_HEADER: &str = "x-drop-password";
pub const SESSION_COOKIE: &str = "drop_session";

/// Session token minted while serving a request. Handlers put it in the
/// response extensions and the middleware turns it into a cookie.
#[derive(Debug, Clone)]
pub struct MintedSession(pub String);

/// Attach a freshly minted session, if any, to a response.
pub fn with_session(minted: Option<String>, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    if let Some(token) = minted {
        response.extensions_mut().insert(MintedSession(token));
    }
    response
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// Pull whatever credential the configured identity mode expects out of the request
pub fn extract_credential(mode: IdentityMode, headers: &HeaderMap) -> Credential {
    match mode {
        IdentityMode::Open => Credential::Anonymous,
        IdentityMode::Password => headers
            .get(PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| Credential::Secret(v.to_string()))
            .unwrap_or_default(),
        IdentityMode::Session => cookie_value(headers, SESSION_COOKIE)
            .filter(|v| !v.is_empty())
            .map(|v| Credential::Session(v.to_string()))
            .unwrap_or_default(),
    }
}

pub async fn credential_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let credential = extract_credential(state.service.identity_mode(), req.headers());
    req.extensions_mut().insert(credential);

    let mut response = next.run(req).await;

    if let Some(MintedSession(token)) = response.extensions_mut().remove::<MintedSession>() {
        let max_age = state.config.session_cookie_days * 24 * 60 * 60;
        let cookie = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, token, max_age
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; drop_session=abc123 ; other=1"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_per_mode() {
        let mut headers = HeaderMap::new();
        headers.insert(PASSWORD_HEADER, HeaderValue::from_static("s3cret"));
        headers.insert(header::COOKIE, HeaderValue::from_static("drop_session=tok"));

        assert_eq!(
            extract_credential(IdentityMode::Open, &headers),
            Credential::Anonymous
        );
        assert_eq!(
            extract_credential(IdentityMode::Password, &headers),
            Credential::Secret("s3cret".to_string())
        );
        assert_eq!(
            extract_credential(IdentityMode::Session, &headers),
            Credential::Session("tok".to_string())
        );
        assert_eq!(
            extract_credential(IdentityMode::Password, &HeaderMap::new()),
            Credential::Anonymous
        );
    }
}
