//! Shared types for the Face++ recognition endpoints.
//!
//! This module contains the face structures returned by detect, analyze,
//! compare and search, plus the request-side enums used to pick images,
//! attributes and landmark detail.

use std::collections::BTreeMap;

use facepp_core::form::{FieldValue, FilePayload};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Where the service should take a face from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// A publicly reachable image URL.
    Url(String),
    /// An uploaded image file.
    File(FilePayload),
    /// A base64-encoded image.
    Base64(String),
    /// A face already detected by the service.
    FaceToken(String),
}

impl ImageSource {
    /// An image URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// An uploaded image file.
    pub fn file(payload: FilePayload) -> Self {
        Self::File(payload)
    }

    /// A base64-encoded image.
    pub fn base64(data: impl Into<String>) -> Self {
        Self::Base64(data.into())
    }

    /// A previously detected face token.
    pub fn face_token(token: impl Into<String>) -> Self {
        Self::FaceToken(token.into())
    }

    /// The form field carrying this source.
    ///
    /// Compare numbers its two inputs: `image_url1`, `face_token2`, and
    /// `image_base64_1` (the base64 field keeps an underscore).
    pub(crate) fn field_name(&self, index: Option<u8>) -> String {
        let base = match self {
            Self::Url(_) => "image_url",
            Self::File(_) => "image_file",
            Self::Base64(_) => "image_base64",
            Self::FaceToken(_) => "face_token",
        };
        match (self, index) {
            (_, None) => base.to_string(),
            (Self::Base64(_), Some(index)) => format!("{base}_{index}"),
            (_, Some(index)) => format!("{base}{index}"),
        }
    }

    pub(crate) fn into_value(self) -> FieldValue {
        match self {
            Self::Url(value) | Self::Base64(value) | Self::FaceToken(value) => value.into(),
            Self::File(payload) => payload.into(),
        }
    }
}

/// A face attribute the service can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceAttribute {
    Gender,
    Age,
    Smiling,
    HeadPose,
    FaceQuality,
    Blur,
    EyeStatus,
    Emotion,
    Ethnicity,
    Beauty,
    MouthStatus,
    EyeGaze,
    SkinStatus,
}

impl FaceAttribute {
    /// Every attribute, in the order the service documents them.
    pub const ALL: [FaceAttribute; 13] = [
        Self::Gender,
        Self::Age,
        Self::Smiling,
        Self::HeadPose,
        Self::FaceQuality,
        Self::Blur,
        Self::EyeStatus,
        Self::Emotion,
        Self::Ethnicity,
        Self::Beauty,
        Self::MouthStatus,
        Self::EyeGaze,
        Self::SkinStatus,
    ];

    /// Returns the API string representation of this attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Smiling => "smiling",
            Self::HeadPose => "headpose",
            Self::FaceQuality => "facequality",
            Self::Blur => "blur",
            Self::EyeStatus => "eyestatus",
            Self::Emotion => "emotion",
            Self::Ethnicity => "ethnicity",
            Self::Beauty => "beauty",
            Self::MouthStatus => "mouthstatus",
            Self::EyeGaze => "eyegaze",
            Self::SkinStatus => "skinstatus",
        }
    }

    /// The `return_attributes` value for a selection; `none` when empty.
    pub fn join(attributes: &[FaceAttribute]) -> String {
        if attributes.is_empty() {
            return "none".to_string();
        }
        attributes
            .iter()
            .map(FaceAttribute::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// How many facial landmarks to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LandmarkDetail {
    /// No landmarks.
    #[default]
    None,
    /// The 83-point landmark set.
    Points83,
    /// The 106-point landmark set.
    Points106,
}

impl From<LandmarkDetail> for FieldValue {
    fn from(detail: LandmarkDetail) -> Self {
        let value: i64 = match detail {
            LandmarkDetail::None => 0,
            LandmarkDetail::Points83 => 1,
            LandmarkDetail::Points106 => 2,
        };
        value.into()
    }
}

/// A reference to a FaceSet: its service token or the caller's outer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceSetRef {
    /// `faceset_token` assigned by the service.
    Token(String),
    /// `outer_id` chosen by the caller.
    OuterId(String),
}

impl FaceSetRef {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }

    pub fn outer_id(outer_id: impl Into<String>) -> Self {
        Self::OuterId(outer_id.into())
    }

    pub(crate) fn into_field(self) -> (&'static str, String) {
        match self {
            Self::Token(token) => ("faceset_token", token),
            Self::OuterId(outer_id) => ("outer_id", outer_id),
        }
    }
}

/// A false accept rate for which the service publishes a confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FalseAcceptRate {
    /// One in a thousand (`1e-3`).
    OneInThousand,
    /// One in ten thousand (`1e-4`).
    OneInTenThousand,
    /// One in a hundred thousand (`1e-5`).
    OneInHundredThousand,
}

impl FalseAcceptRate {
    /// Key of this rate in a `thresholds` map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneInThousand => "1e-3",
            Self::OneInTenThousand => "1e-4",
            Self::OneInHundredThousand => "1e-5",
        }
    }
}

/// Confidence thresholds keyed by false accept rate (`1e-3`, `1e-4`, `1e-5`).
pub type Thresholds = BTreeMap<String, f64>;

/// Whether `confidence` reaches the threshold for `rate`.
///
/// `None` if the thresholds do not contain that rate.
pub(crate) fn meets_threshold(
    confidence: f64,
    thresholds: &Thresholds,
    rate: FalseAcceptRate,
) -> Option<bool> {
    thresholds
        .get(rate.as_str())
        .map(|threshold| confidence >= *threshold)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Position of a face in the image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaceRectangle {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl From<FaceRectangle> for FieldValue {
    /// Face++ expects `top,left,width,height`.
    fn from(rect: FaceRectangle) -> Self {
        format!("{},{},{},{}", rect.top, rect.left, rect.width, rect.height).into()
    }
}

/// A landmark coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
}

/// A face found by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Face {
    /// Identifier of the face, usable by later calls.
    pub face_token: String,

    /// Where the face is.
    #[serde(default)]
    pub face_rectangle: FaceRectangle,

    /// Landmarks by name, when requested with `return_landmark`.
    pub landmark: Option<BTreeMap<String, LandmarkPoint>>,

    /// Attributes, when requested with `return_attributes`.
    pub attributes: Option<FaceAttributes>,
}

/// Per-face analysis results. Each attribute is only present if requested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaceAttributes {
    /// `Male` or `Female`.
    pub gender: Option<AttributeValue<String>>,
    pub age: Option<AttributeValue<u32>>,
    pub smile: Option<ScoredValue>,
    pub headpose: Option<HeadPose>,
    pub blur: Option<Blur>,
    pub eyestatus: Option<EyeStatus>,
    pub emotion: Option<Emotion>,
    pub facequality: Option<ScoredValue>,
    /// E.g. `Asian`, `White`, `Black`, `India`.
    pub ethnicity: Option<AttributeValue<String>>,
    pub beauty: Option<Beauty>,
    pub mouthstatus: Option<MouthStatus>,
    pub eyegaze: Option<EyeGaze>,
    pub skinstatus: Option<SkinStatus>,
}

/// An attribute reported as `{"value": ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttributeValue<T> {
    pub value: T,
}

/// A score in `[0, 100]` with the threshold above which it counts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ScoredValue {
    pub value: f64,
    pub threshold: f64,
}

impl ScoredValue {
    /// Whether the value exceeds its threshold.
    pub fn is_above_threshold(&self) -> bool {
        self.value > self.threshold
    }
}

/// Head rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct HeadPose {
    pub pitch_angle: f64,
    pub roll_angle: f64,
    pub yaw_angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Blur {
    pub blurness: ScoredValue,
    pub motionblur: ScoredValue,
    pub gaussianblur: ScoredValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EyeStatus {
    pub left_eye_status: EyeState,
    pub right_eye_status: EyeState,
}

/// Confidence of each eye state, in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EyeState {
    pub occlusion: f64,
    pub no_glass_eye_open: f64,
    pub no_glass_eye_close: f64,
    pub normal_glass_eye_open: f64,
    pub normal_glass_eye_close: f64,
    pub dark_glasses: f64,
}

/// Emotion distribution; the values sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Emotion {
    pub anger: f64,
    pub disgust: f64,
    pub fear: f64,
    pub happiness: f64,
    pub neutral: f64,
    pub sadness: f64,
    pub surprise: f64,
}

impl Emotion {
    /// The emotion with the highest confidence.
    pub fn dominant(&self) -> &'static str {
        [
            ("anger", self.anger),
            ("disgust", self.disgust),
            ("fear", self.fear),
            ("happiness", self.happiness),
            ("neutral", self.neutral),
            ("sadness", self.sadness),
            ("surprise", self.surprise),
        ]
        .into_iter()
        .fold(("neutral", f64::MIN), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
        .0
    }
}

/// Attractiveness as rated by male and female raters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Beauty {
    pub male_score: f64,
    pub female_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct MouthStatus {
    pub surgical_mask_or_respirator: f64,
    pub other_occlusion: f64,
    pub close: f64,
    pub open: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EyeGaze {
    pub left_eye_gaze: GazeVector,
    pub right_eye_gaze: GazeVector,
}

/// Eye center position and gaze direction, normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GazeVector {
    pub position_x_coordinate: f64,
    pub position_y_coordinate: f64,
    pub vector_x_component: f64,
    pub vector_y_component: f64,
    pub vector_z_component: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SkinStatus {
    pub health: f64,
    pub stain: f64,
    pub acne: f64,
    pub dark_circle: f64,
}

/// Summary of a FaceSet, as listed by `getfacesets` and face `getdetail`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FaceSetSummary {
    pub faceset_token: String,
    pub outer_id: String,
    pub display_name: String,
    pub tags: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_attribute_as_str_matches_serde() {
        for attribute in FaceAttribute::ALL {
            let serialized = serde_json::to_string(&attribute).expect("should serialize");
            assert_eq!(
                serialized,
                format!("\"{}\"", attribute.as_str()),
                "serde mismatch for {attribute:?}",
            );
        }
    }

    #[test]
    fn test_face_attribute_join() {
        assert_eq!(FaceAttribute::join(&[]), "none");
        assert_eq!(
            FaceAttribute::join(&[FaceAttribute::Gender, FaceAttribute::Age]),
            "gender,age"
        );
        let all = FaceAttribute::join(&FaceAttribute::ALL);
        assert_eq!(all.split(',').count(), 13);
    }

    #[test]
    fn test_image_source_field_names() {
        let url = ImageSource::url("https://example.com/a.jpg");
        assert_eq!(url.field_name(None), "image_url");
        assert_eq!(url.field_name(Some(1)), "image_url1");

        let base64 = ImageSource::base64("aGk=");
        assert_eq!(base64.field_name(None), "image_base64");
        assert_eq!(base64.field_name(Some(2)), "image_base64_2");

        let token = ImageSource::face_token("ft");
        assert_eq!(token.field_name(Some(2)), "face_token2");

        let file = ImageSource::file(FilePayload::new("a.jpg", vec![1]));
        assert_eq!(file.field_name(Some(1)), "image_file1");
        assert!(file.into_value().is_file());
    }

    #[test]
    fn test_landmark_detail_values() {
        let values = [
            LandmarkDetail::None,
            LandmarkDetail::Points83,
            LandmarkDetail::Points106,
        ]
        .map(FieldValue::from);
        assert_eq!(
            values,
            [
                FieldValue::Integer(0),
                FieldValue::Integer(1),
                FieldValue::Integer(2),
            ]
        );
    }

    #[test]
    fn test_face_rectangle_field_value() {
        let rect = FaceRectangle {
            top: 10,
            left: 20,
            width: 100,
            height: 120,
        };
        let expected = FieldValue::Text("10,20,100,120".into());
        assert_eq!(FieldValue::from(rect), expected);
    }

    #[test]
    fn test_faceset_ref_fields() {
        assert_eq!(
            FaceSetRef::token("tok").into_field(),
            ("faceset_token", "tok".to_string())
        );
        assert_eq!(
            FaceSetRef::outer_id("user1").into_field(),
            ("outer_id", "user1".to_string())
        );
    }

    #[test]
    fn test_meets_threshold() {
        let thresholds: Thresholds = [("1e-3".to_string(), 62.3), ("1e-5".to_string(), 73.9)]
            .into_iter()
            .collect();
        assert_eq!(
            meets_threshold(70.0, &thresholds, FalseAcceptRate::OneInThousand),
            Some(true)
        );
        assert_eq!(
            meets_threshold(70.0, &thresholds, FalseAcceptRate::OneInHundredThousand),
            Some(false)
        );
        assert_eq!(
            meets_threshold(70.0, &thresholds, FalseAcceptRate::OneInTenThousand),
            None
        );
    }

    #[test]
    fn test_face_deserialization_minimal() {
        let json = r#"{
            "face_token": "ed319e807e039ae669a4d1af0922a0c8",
            "face_rectangle": {"top": 135, "left": 84, "width": 140, "height": 140}
        }"#;
        let face: Face = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(face.face_token, "ed319e807e039ae669a4d1af0922a0c8");
        assert_eq!(face.face_rectangle.width, 140);
        assert!(face.landmark.is_none());
        assert!(face.attributes.is_none());
    }

    #[test]
    fn test_face_deserialization_with_attributes() {
        let json = r#"{
            "face_token": "ft",
            "face_rectangle": {"top": 1, "left": 2, "width": 3, "height": 4},
            "landmark": {
                "mouth_upper_lip_left_contour2": {"y": 185, "x": 146},
                "nose_tip": {"y": 162.5, "x": 155}
            },
            "attributes": {
                "gender": {"value": "Female"},
                "age": {"value": 21},
                "smile": {"value": 95.2, "threshold": 30.1},
                "headpose": {"yaw_angle": -26.6, "pitch_angle": 12.9, "roll_angle": 22.2},
                "blur": {"blurness": {"threshold": 50.0, "value": 0.5}},
                "eyestatus": {
                    "left_eye_status": {"no_glass_eye_open": 99.9, "occlusion": 0.1},
                    "right_eye_status": {"dark_glasses": 0.0, "no_glass_eye_open": 98.0}
                },
                "emotion": {"anger": 0.1, "happiness": 95.3, "neutral": 3.6, "surprise": 1.0},
                "facequality": {"value": 60.1, "threshold": 70.1},
                "ethnicity": {"value": "Asian"},
                "beauty": {"male_score": 70.1, "female_score": 72.4},
                "mouthstatus": {"close": 0.0, "open": 100.0},
                "eyegaze": {"left_eye_gaze": {"position_x_coordinate": 0.5, "vector_z_component": 0.9}},
                "skinstatus": {"health": 1.1, "stain": 20.3, "acne": 3.5, "dark_circle": 5.3}
            }
        }"#;

        let face: Face = serde_json::from_str(json).expect("should deserialize");
        let landmark = face.landmark.as_ref().expect("should have landmarks");
        assert_eq!(landmark["nose_tip"].y, 162.5);

        let attributes = face.attributes.as_ref().expect("should have attributes");
        let gender = attributes.gender.as_ref().map(|g| g.value.as_str());
        assert_eq!(gender, Some("Female"));
        assert_eq!(attributes.age.as_ref().map(|a| a.value), Some(21));
        assert!(attributes.smile.expect("smile").is_above_threshold());
        let quality = attributes.facequality.expect("quality");
        assert!(!quality.is_above_threshold());
        assert_eq!(attributes.blur.expect("blur").blurness.value, 0.5);
        let eyes = attributes.eyestatus.expect("eyes");
        assert_eq!(eyes.left_eye_status.no_glass_eye_open, 99.9);
        let emotion = attributes.emotion.expect("emotion");
        assert_eq!(emotion.dominant(), "happiness");
        assert_eq!(attributes.mouthstatus.expect("mouth").open, 100.0);
        let gaze = attributes.eyegaze.expect("gaze");
        assert_eq!(gaze.left_eye_gaze.vector_z_component, 0.9);
        assert_eq!(attributes.skinstatus.expect("skin").stain, 20.3);
    }

    #[test]
    fn test_face_attributes_independently_optional() {
        let json = r#"{
            "face_token": "ft",
            "face_rectangle": {"top": 0, "left": 0, "width": 1, "height": 1},
            "attributes": {"age": {"value": 30}}
        }"#;
        let face: Face = serde_json::from_str(json).expect("should deserialize");
        let attributes = face.attributes.expect("should have attributes");
        assert!(attributes.age.is_some());
        assert!(attributes.gender.is_none());
        assert!(attributes.emotion.is_none());
    }
}
