//! Bearer access token

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// A bearer token obtained at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The bearer token sent in the `Authorization` header.
    pub access_token: String,
    /// When the token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token without a known expiry.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Creates a token that expires at the given time.
    pub fn with_expiry(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Returns `true` if the token has expired.
    ///
    /// Returns `false` if expiration time is unknown.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    /// Returns the token as a bearer authorization header value.
    pub fn as_bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_expiry_never_expires() {
        assert!(!AccessToken::new("t").is_expired());
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(AccessToken::new("t0k").as_bearer(), "Bearer t0k");
    }

    #[test]
    fn test_bincode_roundtrip_keeps_expiry() {
        let token = AccessToken::with_expiry("t", Utc::now());
        let bytes = bincode::serialize(&token).unwrap();
        let decoded: AccessToken = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, token);
    }
}
