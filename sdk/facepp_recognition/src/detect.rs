//! Face detection with the Face++ Detect API.
//!
//! Detects every face in an image and returns a `face_token` for each,
//! optionally with landmarks and attributes. Tokens feed the other
//! endpoints (analyze, compare, search, FaceSet).
//!
//! ## Example
//!
//! ```rust,no_run
//! use facepp_core::auth::Credentials;
//! use facepp_core::client::FaceClient;
//! use facepp_core::form::FilePayload;
//! use facepp_recognition::detect;
//! use facepp_recognition::models::{FaceAttribute, ImageSource, LandmarkDetail};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FaceClient::builder()
//!     .credential(Credentials::new("your-key", "your-secret")?)
//!     .build()?;
//!
//! let image = FilePayload::read("./demo.jpg").await?;
//! let result = detect::detect(&client)
//!     .image(ImageSource::file(image))
//!     .return_landmark(LandmarkDetail::Points83)
//!     .return_attributes(&[FaceAttribute::Gender, FaceAttribute::Age])
//!     .send()
//!     .await?;
//!
//! for face in &result.faces {
//!     println!("{} at {:?}", face.face_token, face.face_rectangle);
//! }
//! # Ok(())
//! # }
//! ```

use facepp_core::client::FaceClient;
use facepp_core::error::{FaceError, FaceResult};
use facepp_core::form::FormFields;
use facepp_core::models::ResponseEnvelope;
use serde::Deserialize;

use crate::models::{Face, FaceAttribute, FaceRectangle, ImageSource, LandmarkDetail};
use crate::request::{Endpoint, FaceRequest};

/// The `/detect` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Detect;

impl Endpoint for Detect {
    const PATH: &'static str = "/detect";
    const NAME: &'static str = "detect";
    type Response = DetectResponse;

    fn validate(fields: &FormFields) -> FaceResult<()> {
        if fields.contains("face_token") {
            return Err(FaceError::Builder(
                "detect needs an image (url, file or base64), not a face_token".into(),
            ));
        }
        Ok(())
    }
}

/// The result of a detect call.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    /// Identifier of the submitted image.
    #[serde(default)]
    pub image_id: String,

    /// Detected faces; empty when none were found.
    #[serde(default)]
    pub faces: Vec<Face>,

    /// Number of faces detected, which may exceed `faces.len()` for trial keys.
    #[serde(default)]
    pub face_num: u32,
}

/// Start a detect request.
pub fn detect(client: &FaceClient) -> FaceRequest<'_, Detect> {
    FaceRequest::new(client)
}

impl FaceRequest<'_, Detect> {
    /// The image to search for faces (required).
    pub fn image(self, source: ImageSource) -> Self {
        let name = source.field_name(None);
        self.field(name, source.into_value())
    }

    /// How many landmarks to return per face.
    pub fn return_landmark(self, detail: LandmarkDetail) -> Self {
        self.field("return_landmark", detail)
    }

    /// Attributes to compute per face.
    pub fn return_attributes(self, attributes: &[FaceAttribute]) -> Self {
        self.field("return_attributes", FaceAttribute::join(attributes))
    }

    /// Analyze every detected face, not only the largest five (paid keys only).
    pub fn calculate_all(self, all: bool) -> Self {
        self.field("calculate_all", all)
    }

    /// Only look for faces inside this rectangle (paid keys only).
    pub fn face_rectangle(self, rect: FaceRectangle) -> Self {
        self.field("face_rectangle", rect)
    }
}
