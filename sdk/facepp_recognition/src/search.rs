//! Face search within a FaceSet with the Face++ Search API.
//!
//! Finds the faces of a FaceSet most similar to a query face. The query is
//! either an image (its largest face is used) or a `face_token`; the FaceSet
//! is addressed by token or outer id through [`FaceRequest::faceset`].
//!
//! ## Example
//!
//! ```rust,no_run
//! # use facepp_core::client::FaceClient;
//! use facepp_recognition::models::{FaceSetRef, FalseAcceptRate, ImageSource};
//! use facepp_recognition::search;
//!
//! # async fn example(client: &FaceClient) -> facepp_core::error::FaceResult<()> {
//! let result = search::search(client)
//!     .face(ImageSource::url("https://example.com/visitor.jpg"))
//!     .faceset(FaceSetRef::outer_id("employees"))
//!     .return_result_count(3)
//!     .send()
//!     .await?;
//!
//! if let Some(best) = result.best_match(FalseAcceptRate::OneInTenThousand) {
//!     println!("matched {} ({})", best.face_token, best.user_id);
//! }
//! # Ok(())
//! # }
//! ```

use facepp_core::client::FaceClient;
use facepp_core::error::{FaceError, FaceResult};
use facepp_core::form::{FieldValue, FormFields};
use facepp_core::models::ResponseEnvelope;
use serde::{Deserialize, Deserializer};

use crate::faceset::TargetsFaceSet;
use crate::models::{
    meets_threshold, Face, FaceRectangle, FalseAcceptRate, ImageSource, Thresholds,
};
use crate::request::{Endpoint, FaceRequest};

/// Largest `return_result_count` the service accepts.
pub const MAX_RESULT_COUNT: u8 = 5;

/// The `/search` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Search;

impl Endpoint for Search {
    const PATH: &'static str = "/search";
    const NAME: &'static str = "search";
    type Response = SearchResponse;

    fn validate(fields: &FormFields) -> FaceResult<()> {
        let count = fields
            .get("return_result_count")
            .and_then(FieldValue::as_text)
            .and_then(|text| text.parse::<i64>().ok());
        if let Some(count) = count {
            if !(1..=i64::from(MAX_RESULT_COUNT)).contains(&count) {
                return Err(FaceError::Builder(format!(
                    "return_result_count must be between 1 and {MAX_RESULT_COUNT}, got {count}"
                )));
            }
        }
        Ok(())
    }
}

impl TargetsFaceSet for Search {}

/// One candidate face returned by a search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    pub face_token: String,

    /// Similarity to the query face in `[0, 100]`.
    pub confidence: f64,

    /// The user id bound to the face, empty when none was set.
    #[serde(default)]
    pub user_id: String,
}

/// The result of a search call.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    /// Candidates ordered by descending confidence.
    #[serde(default, deserialize_with = "ranked")]
    pub results: Vec<SearchResult>,

    #[serde(default)]
    pub thresholds: Thresholds,

    /// Identifier of the query image, when an image was sent.
    pub image_id: Option<String>,

    /// Faces detected in the query image.
    #[serde(default)]
    pub faces: Vec<Face>,
}

impl SearchResponse {
    /// The top candidate, if it reaches the threshold for `rate`.
    pub fn best_match(&self, rate: FalseAcceptRate) -> Option<&SearchResult> {
        let best = self.results.first()?;
        meets_threshold(best.confidence, &self.thresholds, rate)
            .filter(|matched| *matched)
            .map(|_| best)
    }
}

fn ranked<'de, D>(deserializer: D) -> Result<Vec<SearchResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut results = Vec::<SearchResult>::deserialize(deserializer)?;
    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(results)
}

/// Start a search request.
pub fn search(client: &FaceClient) -> FaceRequest<'_, Search> {
    FaceRequest::new(client)
}

impl FaceRequest<'_, Search> {
    /// The query face.
    pub fn face(self, source: ImageSource) -> Self {
        let name = source.field_name(None);
        self.field(name, source.into_value())
    }

    /// How many candidates to return, 1 to [`MAX_RESULT_COUNT`].
    pub fn return_result_count(self, count: u8) -> Self {
        self.field("return_result_count", count)
    }

    /// Use the face inside this rectangle instead of the largest one.
    pub fn face_rectangle(self, rect: FaceRectangle) -> Self {
        self.field("face_rectangle", rect)
    }
}
