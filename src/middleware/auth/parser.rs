//! Credential parsing strategies.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::AUTHORIZATION;
use serde::Deserialize;

use crate::request::Request;

/// A username/password pair taken from a request.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct Credentials {
    #[serde(rename = "Username", alias = "username", default)]
    pub username: String,
    #[serde(rename = "Password", alias = "password", default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

/// Why credentials could not be read. Always answered with `400`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CredentialError {
    #[error("no Authorization header")]
    MissingHeader,

    #[error("Authorization header does not use the Basic scheme")]
    NotBasic,

    #[error("Basic credentials are not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Basic credentials are not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Basic credentials have no ':' separator")]
    MissingSeparator,

    #[error("request body is empty")]
    EmptyBody,

    #[error("request body is not a credentials object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extracts [`Credentials`] from a request.
///
/// Closures of the same shape are parsers too, so one-off conventions
/// (an API-key header, a form body) do not need a named type.
pub trait CredentialParser: Send + Sync + 'static {
    fn parse(&self, req: &Request) -> Result<Credentials, CredentialError>;
}

impl<F> CredentialParser for F
where
    F: Fn(&Request) -> Result<Credentials, CredentialError> + Send + Sync + 'static,
{
    fn parse(&self, req: &Request) -> Result<Credentials, CredentialError> {
        self(req)
    }
}

/// HTTP Basic: `Authorization: Basic base64(username:password)`.
///
/// The scheme name is matched case-insensitively; the password is
/// everything after the first `:` and may itself contain colons.
#[derive(Clone, Copy, Debug, Default)]
pub struct Basic;

impl CredentialParser for Basic {
    fn parse(&self, req: &Request) -> Result<Credentials, CredentialError> {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .ok_or(CredentialError::MissingHeader)?
            .as_bytes();

        const PREFIX: &[u8] = b"Basic ";
        if header.len() < PREFIX.len() || !header[..PREFIX.len()].eq_ignore_ascii_case(PREFIX) {
            return Err(CredentialError::NotBasic);
        }

        let decoded = String::from_utf8(STANDARD.decode(&header[PREFIX.len()..])?)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(CredentialError::MissingSeparator)?;
        Ok(Credentials::new(username, password))
    }
}

/// JSON body: `{"Username": "...", "Password": "..."}`.
///
/// Lowercase field names are accepted as well, and a missing field reads as
/// an empty string; a bare `null` reads as empty credentials. Only the first
/// JSON value in the body is decoded; any bytes after it are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonBody;

impl CredentialParser for JsonBody {
    fn parse(&self, req: &Request) -> Result<Credentials, CredentialError> {
        serde_json::Deserializer::from_slice(req.body())
            .into_iter::<Option<Credentials>>()
            .next()
            .ok_or(CredentialError::EmptyBody)?
            .map(Option::unwrap_or_default)
            .map_err(CredentialError::from)
    }
}

/// Basic first, then the JSON body if the header did not yield credentials.
///
/// When both fail, the body error is reported.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyOf;

impl CredentialParser for AnyOf {
    fn parse(&self, req: &Request) -> Result<Credentials, CredentialError> {
        Basic.parse(req).or_else(|_| JsonBody.parse(req))
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;

    fn basic(raw: &str) -> Request {
        Request::new(Method::GET, "/".parse().unwrap())
            .with_header(AUTHORIZATION, &format!("Basic {}", STANDARD.encode(raw)))
    }

    fn body(raw: &'static str) -> Request {
        Request::new(Method::POST, "/".parse().unwrap()).with_body(raw)
    }

    #[test]
    fn basic_splits_at_first_colon() {
        let creds = Basic.parse(&basic("alice:se:cret")).unwrap();
        assert_eq!(creds, Credentials::new("alice", "se:cret"));
    }

    #[test]
    fn basic_scheme_is_case_insensitive() {
        let req = Request::new(Method::GET, "/".parse().unwrap())
            .with_header(AUTHORIZATION, &format!("bAsIc {}", STANDARD.encode("a:b")));
        assert_eq!(Basic.parse(&req).unwrap(), Credentials::new("a", "b"));
    }

    #[test]
    fn basic_rejects_malformed_headers() {
        let none = Request::new(Method::GET, "/".parse().unwrap());
        assert!(matches!(Basic.parse(&none), Err(CredentialError::MissingHeader)));

        let bearer = none_with("Bearer abc");
        assert!(matches!(Basic.parse(&bearer), Err(CredentialError::NotBasic)));

        let garbage = none_with("Basic !!!");
        assert!(matches!(Basic.parse(&garbage), Err(CredentialError::Base64(_))));

        assert!(matches!(Basic.parse(&basic("nocolon")), Err(CredentialError::MissingSeparator)));
    }

    fn none_with(value: &str) -> Request {
        Request::new(Method::GET, "/".parse().unwrap()).with_header(AUTHORIZATION, value)
    }

    #[test]
    fn json_body_accepts_documented_shape() {
        let creds = JsonBody.parse(&body(r#"{"Username":"alice","Password":"secret"}"#)).unwrap();
        assert_eq!(creds, Credentials::new("alice", "secret"));
    }

    #[test]
    fn json_body_is_lenient_like_the_wire_format() {
        let lower = JsonBody.parse(&body(r#"{"username":"bob","password":"pw"}"#)).unwrap();
        assert_eq!(lower, Credentials::new("bob", "pw"));

        let partial = JsonBody.parse(&body(r#"{"Username":"bob"}"#)).unwrap();
        assert_eq!(partial, Credentials::new("bob", ""));

        let trailing = JsonBody.parse(&body(r#"{"Username":"c","Password":"d"} trailing"#)).unwrap();
        assert_eq!(trailing, Credentials::new("c", "d"));

        let null = JsonBody.parse(&body("null")).unwrap();
        assert_eq!(null, Credentials::default());
    }

    #[test]
    fn json_body_rejects_non_objects() {
        assert!(matches!(JsonBody.parse(&body("")), Err(CredentialError::EmptyBody)));
        assert!(matches!(JsonBody.parse(&body("not json")), Err(CredentialError::Json(_))));
        assert!(matches!(JsonBody.parse(&body(r#""alice""#)), Err(CredentialError::Json(_))));
    }

    #[test]
    fn any_prefers_basic_and_falls_back_to_body() {
        let both = basic("alice:secret").with_body(r#"{"Username":"mallory","Password":"x"}"#);
        assert_eq!(AnyOf.parse(&both).unwrap(), Credentials::new("alice", "secret"));

        let only_body = body(r#"{"Username":"bob","Password":"pw"}"#);
        assert_eq!(AnyOf.parse(&only_body).unwrap(), Credentials::new("bob", "pw"));

        assert!(AnyOf.parse(&body("{")).is_err());
    }

    #[test]
    fn closures_are_parsers() {
        let api_key = |req: &Request| -> Result<Credentials, CredentialError> {
            req.header("x-api-key")
                .map(|k| Credentials::new("service", k))
                .ok_or(CredentialError::MissingHeader)
        };
        let req = Request::new(Method::GET, "/".parse().unwrap())
            .with_header(http::header::HeaderName::from_static("x-api-key"), "k1");
        assert_eq!(api_key.parse(&req).unwrap(), Credentials::new("service", "k1"));
    }
}
