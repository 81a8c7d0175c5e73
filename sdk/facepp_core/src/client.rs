//! HTTP client for the Face++ API.
//!
//! This module provides [`FaceClient`], the handle every Face++ call goes
//! through. The client holds the credentials, the base endpoint and the
//! HTTP transport; it sends one multipart `POST` per call, classifies
//! non-200 answers and decodes the JSON body.
//!
//! # Examples
//!
//! ```rust,no_run
//! use facepp_core::auth::Credentials;
//! use facepp_core::client::FaceClient;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FaceClient::builder()
//!     .credential(Credentials::new("your-key", "your-secret")?)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the international region
//! ```rust,no_run
//! use facepp_core::auth::Credentials;
//! use facepp_core::client::{FaceClient, INTERNATIONAL_ENDPOINT};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FaceClient::builder()
//!     .endpoint(INTERNATIONAL_ENDPOINT)
//!     .credential(Credentials::new("your-key", "your-secret")?)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::auth::Credentials;
use crate::error::{FaceError, FaceResult, ServiceError};
use crate::form::FormFields;
use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use std::time::Duration;

/// Base URL of the Face++ v3 API (mainland China region).
pub const DEFAULT_ENDPOINT: &str = "https://api-cn.faceplusplus.com/facepp/v3/";

/// Base URL of the Face++ v3 API (international region).
pub const INTERNATIONAL_ENDPOINT: &str = "https://api-us.faceplusplus.com/facepp/v3/";

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read/response timeout (60 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// The client for the Face++ API.
///
/// The client is cheaply cloneable and can be shared across threads; the
/// credentials are the only state shared between calls and never change.
#[derive(Debug, Clone)]
pub struct FaceClient {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: Url,
    pub(crate) credential: Credentials,
}

/// Builder for constructing a [`FaceClient`].
///
/// Use [`FaceClient::builder()`] to create a new builder.
#[derive(Debug, Default)]
pub struct FaceClientBuilder {
    endpoint: Option<String>,
    credential: Option<Credentials>,
    http_client: Option<HttpClient>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl FaceClient {
    /// Create a new builder for configuring a `FaceClient`.
    pub fn builder() -> FaceClientBuilder {
        FaceClientBuilder::default()
    }

    /// Get the base endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the credentials attached to every request.
    pub fn credential(&self) -> &Credentials {
        &self.credential
    }

    /// Build a full URL for an API path such as `/faceset/create`.
    ///
    /// The path is resolved below the base endpoint, with or without a leading `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined to the endpoint URL.
    pub fn url(&self, path: &str) -> FaceResult<Url> {
        self.endpoint
            .join(path.trim_start_matches('/'))
            .map_err(|e| FaceError::invalid_endpoint_with_source("failed to construct URL", e))
    }

    /// A fresh parameter bag already holding `api_key` and `api_secret`.
    pub fn form(&self) -> FormFields {
        FormFields::with_credentials(&self.credential)
    }

    /// Send one multipart `POST` and decode the JSON answer.
    ///
    /// Exactly one HTTP call is made; nothing is retried.
    ///
    /// # Errors
    ///
    /// - [`FaceError::Request`] if the transport fails.
    /// - [`FaceError::Service`] if the status is not 200.
    /// - [`FaceError::Decode`] if a 200 body is not the expected JSON.
    ///
    /// # Tracing
    ///
    /// Emits a span named `facepp::request` with field `path`.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: FormFields,
    ) -> FaceResult<T> {
        let (value, _body) = self.post_form_with_body(path, fields).await?;
        Ok(value)
    }

    /// Like [`post_form`](Self::post_form), but also return the raw JSON body.
    ///
    /// The body keeps fields the response type does not model.
    ///
    /// # Errors
    ///
    /// Same as [`post_form`](Self::post_form).
    #[tracing::instrument(name = "facepp::request", skip(self, fields), fields(path = %path))]
    pub async fn post_form_with_body<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: FormFields,
    ) -> FaceResult<(T, String)> {
        let url = self.url(path)?;
        tracing::debug!(fields = fields.len(), "sending form request");

        let response = self
            .http
            .post(url)
            .multipart(fields.into_multipart())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), "response received");

        decode_response(status, body)
    }
}

/// Turn a status and body into the endpoint's response or a classified error.
///
/// On success the body is handed back next to the decoded value.
pub(crate) fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: String,
) -> FaceResult<(T, String)> {
    if status != StatusCode::OK {
        let error = ServiceError::classify(status.as_u16(), &body);
        tracing::warn!(
            status = error.status,
            error_message = %error.error_message,
            "service returned an error"
        );
        return Err(error.into());
    }

    match serde_json::from_str(&body) {
        Ok(value) => Ok((value, body)),
        Err(source) => Err(FaceError::Decode { source, body }),
    }
}

impl FaceClientBuilder {
    /// Set the base endpoint URL.
    ///
    /// Defaults to [`DEFAULT_ENDPOINT`]. A trailing `/` is added if missing
    /// so that API paths resolve below it.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the credentials to use for every request (required).
    pub fn credential(mut self, credential: Credentials) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set a custom HTTP client.
    ///
    /// Use this to configure proxies, TLS or other HTTP settings.
    ///
    /// **Note:** If you provide a custom HTTP client, any timeout configuration
    /// via [`connect_timeout`](Self::connect_timeout) or
    /// [`read_timeout`](Self::read_timeout) will be ignored.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the connection timeout.
    ///
    /// **Note:** This setting is ignored if a custom HTTP client is provided
    /// via [`http_client`](Self::http_client).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout.
    ///
    /// This covers the entire request/response cycle including uploading the
    /// form and reading the body.
    ///
    /// **Note:** This setting is ignored if a custom HTTP client is provided
    /// via [`http_client`](Self::http_client).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Build the `FaceClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No credentials were provided
    /// - The endpoint URL is invalid
    /// - The HTTP client cannot be constructed
    pub fn build(self) -> FaceResult<FaceClient> {
        let credential = self.credential.ok_or_else(|| {
            FaceError::MissingConfig("credential is required. Set it via the builder.".into())
        })?;

        let mut endpoint_str = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !endpoint_str.ends_with('/') {
            endpoint_str.push('/');
        }

        let endpoint = Url::parse(&endpoint_str)
            .map_err(|e| FaceError::invalid_endpoint_with_source("invalid endpoint URL", e))?;

        let http = match self.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                .timeout(self.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT))
                .build()?,
        };

        Ok(FaceClient {
            http,
            endpoint,
            credential,
        })
    }
}
