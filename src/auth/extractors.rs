use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// The credential presented in the `Authorization` header, if any.
///
/// Accepts `Bearer <token>` as well as a bare token. Whether it is any good
/// is decided later by the token validator, so extraction never rejects.
#[derive(Debug, Clone, Default)]
pub struct Credential(pub Option<String>);

impl Credential {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

fn parse_authorization(value: &str) -> Option<String> {
    let value = value.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!token.is_empty()).then(|| token.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_authorization);
        Ok(Credential(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_and_bare_tokens() {
        assert_eq!(parse_authorization("Bearer abc").as_deref(), Some("abc"));
        assert_eq!(parse_authorization("bearer abc").as_deref(), Some("abc"));
        assert_eq!(parse_authorization("abc").as_deref(), Some("abc"));
        assert_eq!(parse_authorization("BEARER  abc ").as_deref(), Some("abc"));
    }

    #[test]
    fn empty_header_is_no_credential() {
        assert_eq!(parse_authorization(""), None);
        assert_eq!(parse_authorization("Bearer "), None);
        assert_eq!(parse_authorization("   "), None);
        assert_eq!(parse_authorization("bearer"), None);
        assert_eq!(parse_authorization(" Bearer \t"), None);
    }
}
