//! Request parameters sent as multipart/form-data.
//!
//! Every Face++ call is a `POST` whose body is a multipart form. The
//! parameters are collected in a [`FormFields`] bag keyed by field name;
//! values are a [`FieldValue`], which is either a scalar written as a text
//! part or a [`FilePayload`] written as a file part.

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use crate::auth::{Credentials, API_KEY_FIELD, API_SECRET_FIELD};
use crate::error::FaceResult;

/// File name used when a payload is built from a path without one.
const DEFAULT_FILE_NAME: &str = "image";

/// An uploaded file, e.g. the `image_file` of a detect call.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePayload {
    file_name: String,
    bytes: Bytes,
}

impl FilePayload {
    /// Create a payload from bytes already in memory.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a payload from disk. The file name part is taken from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FaceError::Io`](crate::error::FaceError::Io) if the file cannot be read.
    pub async fn read(path: impl AsRef<Path>) -> FaceResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// The file name sent with the part.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The file contents.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

impl std::fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePayload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A single form parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Sent verbatim.
    Text(String),
    /// Sent in decimal notation.
    Integer(i64),
    /// Sent in decimal notation.
    Float(f64),
    /// Sent as a file part.
    File(FilePayload),
}

impl FieldValue {
    /// Whether this value is sent as a file part.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// The text written into the form, or `None` for files.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::File(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

/// Face++ flags are `0`/`1` integers.
impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<FilePayload> for FieldValue {
    fn from(value: FilePayload) -> Self {
        Self::File(value)
    }
}

/// The parameter bag of one request.
///
/// Field names are unique; setting a field again replaces the earlier value.
#[derive(Clone, Default, PartialEq)]
pub struct FormFields {
    fields: BTreeMap<String, FieldValue>,
}

impl FormFields {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag holding the `api_key` and `api_secret` fields.
    pub fn with_credentials(credentials: &Credentials) -> Self {
        let mut fields = Self::new();
        fields.set(API_KEY_FIELD, credentials.api_key());
        fields.set(API_SECRET_FIELD, credentials.api_secret());
        fields
    }

    /// Set a field, returning the value it replaced.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Set every field of `fields`, with the same replacement rule as [`set`](Self::set).
    pub fn merge<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        for (name, value) in fields {
            self.set(name, value);
        }
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Whether a field is set.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove a field.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Encode the bag as a multipart form.
    pub fn into_multipart(self) -> Form {
        self.fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| match value {
                FieldValue::File(payload) => {
                    let part = Part::bytes(payload.bytes.to_vec()).file_name(payload.file_name);
                    form.part(name, part)
                }
                FieldValue::Text(text) => form.text(name, text),
                FieldValue::Integer(value) => form.text(name, value.to_string()),
                FieldValue::Float(value) => form.text(name, value.to_string()),
            })
    }
}

impl std::fmt::Debug for FormFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.fields {
            if name == API_SECRET_FIELD {
                map.entry(name, &"****");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        fields.merge(iter);
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("test-key", "test-secret").expect("valid credentials")
    }

    #[test]
    fn test_with_credentials_seeds_key_and_secret() {
        let fields = FormFields::with_credentials(&credentials());
        assert_eq!(fields.len(), 2);
        assert_eq!(
            fields.get(API_KEY_FIELD),
            Some(&FieldValue::Text("test-key".into()))
        );
        assert_eq!(
            fields.get(API_SECRET_FIELD),
            Some(&FieldValue::Text("test-secret".into()))
        );
    }

    #[test]
    fn test_set_last_write_wins() {
        let mut fields = FormFields::new();
        assert!(fields.set("outer_id", "first").is_none());
        let previous = fields.set("outer_id", "second");

        assert_eq!(previous, Some(FieldValue::Text("first".into())));
        assert_eq!(fields.len(), 1);
        let outer_id = fields.get("outer_id").and_then(FieldValue::as_text);
        assert_eq!(outer_id.as_deref(), Some("second"));
    }

    #[test]
    fn test_merge_overwrites_existing() {
        let mut fields: FormFields = [("return_landmark", 0), ("return_result_count", 1)]
            .into_iter()
            .collect();
        fields.merge([("return_landmark", 2)]);

        assert_eq!(fields.get("return_landmark"), Some(&FieldValue::Integer(2)));
        assert_eq!(
            fields.get("return_result_count"),
            Some(&FieldValue::Integer(1))
        );
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(FieldValue::from(true), FieldValue::Integer(1));
        assert_eq!(FieldValue::from(false), FieldValue::Integer(0));
        assert_eq!(FieldValue::from(5_u8).as_text().as_deref(), Some("5"));
        assert_eq!(FieldValue::from(0.5_f64).as_text().as_deref(), Some("0.5"));
        assert_eq!(FieldValue::from("a").as_text().as_deref(), Some("a"));
    }

    #[test]
    fn test_file_value_has_no_text() {
        let value = FieldValue::from(FilePayload::new("face.jpg", vec![0xFF, 0xD8]));
        assert!(value.is_file());
        assert!(value.as_text().is_none());
    }

    #[test]
    fn test_file_payload_debug_hides_bytes() {
        let payload = FilePayload::new("face.jpg", vec![1, 2, 3]);
        let debug = format!("{payload:?}");
        assert!(debug.contains("face.jpg"));
        assert!(debug.contains("len: 3"), "{debug}");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let fields = FormFields::with_credentials(&credentials());
        let debug = format!("{fields:?}");
        assert!(debug.contains("test-key"));
        assert!(!debug.contains("test-secret"), "{debug}");
    }

    #[test]
    fn test_remove_and_contains() {
        let mut fields = FormFields::new();
        fields.set("tags", "a,b");
        assert!(fields.contains("tags"));
        assert!(fields.remove("tags").is_some());
        assert!(!fields.contains("tags"));
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_file_payload_read_from_disk() {
        let path = std::env::temp_dir().join("facepp_core_form_read_test.jpg");
        tokio::fs::write(&path, b"jpeg-bytes")
            .await
            .expect("should write temp file");

        let payload = FilePayload::read(&path).await.expect("should read");
        assert_eq!(payload.file_name(), "facepp_core_form_read_test.jpg");
        assert_eq!(payload.bytes().as_ref(), b"jpeg-bytes");

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_file_payload_read_missing_file() {
        let result = FilePayload::read("/definitely/not/here.jpg").await;
        assert!(matches!(result, Err(crate::error::FaceError::Io(_))));
    }
}
