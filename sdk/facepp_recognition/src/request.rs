//! The request builder shared by every Face++ endpoint.
//!
//! A [`FaceRequest`] is a parameter bag bound to one [`Endpoint`]. It is
//! created by an endpoint's factory function (e.g. [`crate::detect::detect`])
//! with the client's credentials already set, configured with chained
//! setters, and consumed by [`FaceRequest::send`].

use std::marker::PhantomData;

use facepp_core::client::FaceClient;
use facepp_core::error::{FaceError, FaceResult};
use facepp_core::form::{FieldValue, FormFields};
use serde::de::DeserializeOwned;

/// Describes one Face++ API endpoint.
///
/// Implemented by zero-sized marker types such as [`crate::detect::Detect`].
pub trait Endpoint {
    /// Path below the client's base endpoint, e.g. `/faceset/create`.
    const PATH: &'static str;

    /// Short name recorded on tracing spans.
    const NAME: &'static str;

    /// The decoded body of a successful call.
    type Response: DeserializeOwned;

    /// Check the parameters before anything is sent.
    fn validate(_fields: &FormFields) -> FaceResult<()> {
        Ok(())
    }
}

/// A pending call to endpoint `E`.
#[must_use = "requests do nothing until `send` is awaited"]
pub struct FaceRequest<'a, E: Endpoint> {
    client: &'a FaceClient,
    fields: FormFields,
    endpoint: PhantomData<E>,
}

impl<'a, E: Endpoint> FaceRequest<'a, E> {
    /// Start a request whose bag holds the client's credentials.
    pub fn new(client: &'a FaceClient) -> Self {
        Self {
            client,
            fields: client.form(),
            endpoint: PhantomData,
        }
    }

    /// Set a parameter. Setting the same name again replaces the value.
    ///
    /// Use this for parameters without a dedicated setter.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.set(name, value);
        self
    }

    /// Set several parameters at once, with the same replacement rule as [`field`](Self::field).
    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.merge(fields);
        self
    }

    /// The parameters that will be sent.
    pub fn form(&self) -> &FormFields {
        &self.fields
    }

    /// Send the request and decode the endpoint's response.
    ///
    /// # Errors
    ///
    /// - [`FaceError::Builder`] if the parameters fail the endpoint's checks.
    /// - Any error of [`FaceClient::post_form`].
    ///
    /// # Tracing
    ///
    /// Emits a span named `facepp::send` with field `endpoint`.
    #[tracing::instrument(name = "facepp::send", skip(self), fields(endpoint = E::NAME))]
    pub async fn send(self) -> FaceResult<E::Response> {
        tracing::debug!("validating request");
        E::validate(&self.fields)?;

        let response = self.client.post_form(E::PATH, self.fields).await?;
        tracing::debug!("request complete");
        Ok(response)
    }

    /// Send the request and return the decoded response with the raw JSON body.
    ///
    /// The raw body carries fields the response type leaves out.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    #[tracing::instrument(name = "facepp::send", skip(self), fields(endpoint = E::NAME))]
    pub async fn send_raw(self) -> FaceResult<(E::Response, String)> {
        tracing::debug!("validating request");
        E::validate(&self.fields)?;

        let (response, body) = self.client.post_form_with_body(E::PATH, self.fields).await?;
        tracing::debug!(body_len = body.len(), "request complete");
        Ok((response, body))
    }
}

impl<E: Endpoint> std::fmt::Debug for FaceRequest<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceRequest")
            .field("endpoint", &E::PATH)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Number of entries of a comma-separated list parameter.
pub(crate) fn list_len(fields: &FormFields, name: &str) -> usize {
    fields
        .get(name)
        .and_then(FieldValue::as_text)
        .map(|list| list.split(',').filter(|item| !item.trim().is_empty()).count())
        .unwrap_or(0)
}

/// Join list items the way Face++ expects them (`a,b,c`).
pub(crate) fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Reject a list parameter with more than `max` entries.
pub(crate) fn check_list_max(fields: &FormFields, name: &str, max: usize) -> FaceResult<()> {
    let len = list_len(fields, name);
    if len > max {
        return Err(FaceError::Builder(format!(
            "{name} accepts at most {max} entries per call, got {len}"
        )));
    }
    Ok(())
}
