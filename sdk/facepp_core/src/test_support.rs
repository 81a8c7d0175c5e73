//! Helpers for testing code built on the SDK against a mock server.
//!
//! Enabled with the `test-support` feature.

use crate::auth::Credentials;
use crate::client::FaceClient;
use wiremock::MockServer;

/// Test API key (not a real key).
pub const TEST_API_KEY: &str = "test-api-key";

/// Test API secret (not a real secret).
pub const TEST_API_SECRET: &str = "test-api-secret";

/// Create a client pointed at a mock server.
///
/// # Panics
///
/// Panics if the client cannot be built, which only happens for an invalid server URI.
pub fn mock_client(server: &MockServer) -> FaceClient {
    let credential = Credentials::new(TEST_API_KEY, TEST_API_SECRET);
    FaceClient::builder()
        .endpoint(server.uri())
        .credential(credential.expect("valid credentials"))
        .build()
        .expect("should build client")
}

/// Extract a text field from a recorded multipart body.
///
/// Returns `None` if the body has no field called `name`.
pub fn form_field(body: &[u8], name: &str) -> Option<String> {
    let body = String::from_utf8_lossy(body);
    let marker = format!("name=\"{name}\"\r\n\r\n");
    let start = body.find(&marker)? + marker.len();
    let end = body[start..].find("\r\n--")? + start;
    Some(body[start..end].to_string())
}
