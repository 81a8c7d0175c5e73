use crate::error::{FaceError, FaceResult};
use secrecy::{ExposeSecret, SecretString};

/// Form field carrying the API key.
pub const API_KEY_FIELD: &str = "api_key";

/// Form field carrying the API secret.
pub const API_SECRET_FIELD: &str = "api_secret";

/// API key and secret issued by the Face++ console.
///
/// Sent as the `api_key` / `api_secret` form fields of every request.
/// The secret is never printed by `Debug`.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: SecretString,
}

impl Credentials {
    /// Create credentials from a key and secret.
    ///
    /// # Errors
    ///
    /// Returns [`FaceError::Builder`] if either value is empty.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> FaceResult<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();
        if api_key.is_empty() || api_secret.is_empty() {
            return Err(FaceError::Builder(
                "api_key and api_secret must not be empty".into(),
            ));
        }
        Ok(Self {
            api_key,
            api_secret: SecretString::from(api_secret),
        })
    }

    /// The API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_key_or_secret() {
        assert!(matches!(
            Credentials::new("", "secret"),
            Err(FaceError::Builder(_))
        ));
        assert!(matches!(
            Credentials::new("key", ""),
            Err(FaceError::Builder(_))
        ));
    }

    #[test]
    fn exposes_key_and_secret() {
        let credentials = Credentials::new("key", "secret").expect("valid credentials");
        assert_eq!(credentials.api_key(), "key");
        assert_eq!(credentials.api_secret(), "secret");
    }

    #[test]
    fn debug_redacts_secret() {
        let credentials = Credentials::new("key", "very-secret").expect("valid credentials");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("key"));
        assert!(!debug.contains("very-secret"), "{debug}");
    }
}
