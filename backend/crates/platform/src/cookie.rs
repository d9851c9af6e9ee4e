//! Cookie and header extraction

use axum::http::{HeaderMap, header};

/// Extract a cookie value from headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Extract a `Bearer` credential from the `Authorization` header
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Session credential: cookie first, then `Authorization: Bearer`
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    extract_cookie(headers, cookie_name).or_else(|| extract_bearer(headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; temuin_session=abc123; other=xyz"),
        );

        assert_eq!(
            extract_cookie(&headers, "temuin_session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(extract_bearer(&headers), Some("tok".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("temuin_session=fromcookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer fromheader"));
        assert_eq!(
            extract_session_token(&headers, "temuin_session"),
            Some("fromcookie".to_string())
        );
        assert_eq!(
            extract_session_token(&headers, "other"),
            Some("fromheader".to_string())
        );
    }
}
