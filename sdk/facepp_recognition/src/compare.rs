//! Face comparison with the Face++ Compare API.
//!
//! Compares two faces and returns a confidence that they belong to the same
//! person, plus the confidence thresholds at several false accept rates.
//! Each side may be an image (the largest face is used) or a face token.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use facepp_core::client::FaceClient;
//! use facepp_recognition::compare;
//! use facepp_recognition::models::{FalseAcceptRate, ImageSource};
//!
//! # async fn example(client: &FaceClient) -> facepp_core::error::FaceResult<()> {
//! let result = compare::compare(client)
//!     .face1(ImageSource::url("https://example.com/a.jpg"))
//!     .face2(ImageSource::face_token("ed319e807e039ae669a4d1af0922a0c8"))
//!     .send()
//!     .await?;
//!
//! if result.is_match(FalseAcceptRate::OneInTenThousand) == Some(true) {
//!     println!("same person ({:?})", result.confidence);
//! }
//! # Ok(())
//! # }
//! ```

use facepp_core::client::FaceClient;
use facepp_core::models::ResponseEnvelope;
use serde::Deserialize;

use crate::models::{meets_threshold, Face, FalseAcceptRate, ImageSource, Thresholds};
use crate::request::{Endpoint, FaceRequest};

/// The `/compare` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Compare;

impl Endpoint for Compare {
    const PATH: &'static str = "/compare";
    const NAME: &'static str = "compare";
    type Response = CompareResponse;
}

/// The result of a compare call.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    /// Similarity in `[0, 100]`; absent when a side contained no face.
    pub confidence: Option<f64>,

    /// Confidence thresholds keyed by false accept rate.
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Identifier of the first image, when an image was sent.
    pub image_id1: Option<String>,

    /// Identifier of the second image, when an image was sent.
    pub image_id2: Option<String>,

    /// Faces detected in the first image.
    #[serde(default)]
    pub faces1: Vec<Face>,

    /// Faces detected in the second image.
    #[serde(default)]
    pub faces2: Vec<Face>,
}

impl CompareResponse {
    /// Whether the two faces match at the given false accept rate.
    ///
    /// `None` if no confidence was returned or the rate has no threshold.
    pub fn is_match(&self, rate: FalseAcceptRate) -> Option<bool> {
        meets_threshold(self.confidence?, &self.thresholds, rate)
    }
}

/// Start a compare request.
pub fn compare(client: &FaceClient) -> FaceRequest<'_, Compare> {
    FaceRequest::new(client)
}

impl FaceRequest<'_, Compare> {
    /// The first face.
    pub fn face1(self, source: ImageSource) -> Self {
        let name = source.field_name(Some(1));
        self.field(name, source.into_value())
    }

    /// The second face.
    pub fn face2(self, source: ImageSource) -> Self {
        let name = source.field_name(Some(2));
        self.field(name, source.into_value())
    }
}
