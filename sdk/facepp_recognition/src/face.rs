//! Operations on already detected faces: analyze, get detail, set user id.
//!
//! These endpoints take `face_token`s from a previous detect call instead of
//! images. A token that is not stored in any FaceSet expires 72 hours after
//! detection.

use facepp_core::client::FaceClient;
use facepp_core::error::{FaceError, FaceResult};
use facepp_core::form::FormFields;
use facepp_core::models::ResponseEnvelope;
use serde::Deserialize;

use crate::models::{Face, FaceAttribute, FaceRectangle, FaceSetSummary, LandmarkDetail};
use crate::request::{check_list_max, join_list, list_len, Endpoint, FaceRequest};

/// Most face tokens one analyze call accepts.
pub const MAX_ANALYZE_FACE_TOKENS: usize = 5;

/// The `/face/analyze` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Analyze;

impl Endpoint for Analyze {
    const PATH: &'static str = "/face/analyze";
    const NAME: &'static str = "face_analyze";
    type Response = AnalyzeResponse;

    fn validate(fields: &FormFields) -> FaceResult<()> {
        if list_len(fields, "face_tokens") == 0 {
            return Err(FaceError::Builder(
                "analyze needs at least one face token".into(),
            ));
        }
        check_list_max(fields, "face_tokens", MAX_ANALYZE_FACE_TOKENS)
    }
}

/// The `/face/getdetail` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct FaceGetDetail;

impl Endpoint for FaceGetDetail {
    const PATH: &'static str = "/face/getdetail";
    const NAME: &'static str = "face_get_detail";
    type Response = FaceDetail;
}

/// The `/face/setuserid` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct SetUserId;

impl Endpoint for SetUserId {
    const PATH: &'static str = "/face/setuserid";
    const NAME: &'static str = "face_set_user_id";
    type Response = SetUserIdResponse;
}

/// Result of an analyze call.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    /// One entry per requested token, with landmarks and attributes.
    #[serde(default)]
    pub faces: Vec<Face>,
}

/// What the service knows about one face token.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceDetail {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    #[serde(default)]
    pub face_token: String,

    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub image_id: String,

    pub face_rectangle: Option<FaceRectangle>,

    /// FaceSets holding this face.
    #[serde(default)]
    pub facesets: Vec<FaceSetSummary>,
}

/// Result of a set user id call.
#[derive(Debug, Clone, Deserialize)]
pub struct SetUserIdResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    #[serde(default)]
    pub face_token: String,

    #[serde(default)]
    pub user_id: String,
}

/// Start an analyze request.
pub fn analyze(client: &FaceClient) -> FaceRequest<'_, Analyze> {
    FaceRequest::new(client)
}

/// Start a request reading one face token.
pub fn get_detail(client: &FaceClient) -> FaceRequest<'_, FaceGetDetail> {
    FaceRequest::new(client)
}

/// Start a request binding a user id to a face token.
pub fn set_user_id(client: &FaceClient) -> FaceRequest<'_, SetUserId> {
    FaceRequest::new(client)
}

impl FaceRequest<'_, Analyze> {
    /// Faces to analyze, 1 to [`MAX_ANALYZE_FACE_TOKENS`].
    pub fn face_tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.field("face_tokens", join_list(tokens))
    }

    pub fn return_landmark(self, detail: LandmarkDetail) -> Self {
        self.field("return_landmark", detail)
    }

    pub fn return_attributes(self, attributes: &[FaceAttribute]) -> Self {
        self.field("return_attributes", FaceAttribute::join(attributes))
    }
}

impl FaceRequest<'_, FaceGetDetail> {
    pub fn face_token(self, token: impl Into<String>) -> Self {
        self.field("face_token", token.into())
    }
}

impl FaceRequest<'_, SetUserId> {
    pub fn face_token(self, token: impl Into<String>) -> Self {
        self.field("face_token", token.into())
    }

    /// Up to 255 characters; letters, digits and `-_.@` are allowed.
    pub fn user_id(self, user_id: impl Into<String>) -> Self {
        self.field("user_id", user_id.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facepp_core::test_support::{form_field, mock_client};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_analyze_tokens_and_options() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(path("/face/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "request_id": "r",
                "time_used": 77,
                "faces": [
                    {
                        "face_token": "a",
                        "face_rectangle": {"top": 1, "left": 2, "width": 3, "height": 4},
                        "landmark": {"nose_tip": {"x": 10.0, "y": 20.0}},
                        "attributes": {"smile": {"value": 88.1, "threshold": 50.0}}
                    },
                    {
                        "face_token": "b",
                        "face_rectangle": {"top": 5, "left": 6, "width": 7, "height": 8}
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = analyze(&client)
            .face_tokens(["a", "b"])
            .return_landmark(LandmarkDetail::Points83)
            .return_attributes(&[FaceAttribute::Smiling])
            .send()
            .await
            .expect("should succeed");

        assert_eq!(response.faces.len(), 2);
        let first = &response.faces[0];
        let nose = first
            .landmark
            .as_ref()
            .and_then(|points| points.get("nose_tip"))
            .expect("should have nose tip");
        assert_eq!(nose.x, 10.0);
        let smile = first
            .attributes
            .as_ref()
            .and_then(|a| a.smile)
            .expect("should have smile");
        assert!(smile.is_above_threshold());

        let requests = server.received_requests().await.expect("recording enabled");
        let body = &requests[0].body;
        assert_eq!(form_field(body, "face_tokens").as_deref(), Some("a,b"));
        assert_eq!(form_field(body, "return_landmark").as_deref(), Some("1"));
        assert_eq!(
            form_field(body, "return_attributes").as_deref(),
            Some("smiling")
        );
    }

    #[tokio::test]
    async fn test_analyze_token_count_bounds() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = analyze(&client).send().await.expect_err("no tokens");
        assert!(err.to_string().contains("at least one"), "{err}");

        let err = analyze(&client)
            .face_tokens(["1", "2", "3", "4", "5", "6"])
            .send()
            .await
            .expect_err("too many tokens");
        assert!(matches!(err, FaceError::Builder(_)));
    }

    #[tokio::test]
    async fn test_get_detail_lists_facesets() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(path("/face/getdetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "request_id": "r",
                "time_used": 3,
                "face_token": "ft",
                "user_id": "alice",
                "image_id": "img",
                "face_rectangle": {"top": 1, "left": 1, "width": 9, "height": 9},
                "facesets": [{
                    "faceset_token": "fs",
                    "outer_id": "staff",
                    "display_name": "Staff",
                    "tags": ""
                }]
            })))
            .mount(&server)
            .await;

        let detail = get_detail(&client)
            .face_token("ft")
            .send()
            .await
            .expect("should succeed");
        assert_eq!(detail.user_id, "alice");
        assert_eq!(detail.face_rectangle.map(|r| r.width), Some(9));
        assert_eq!(detail.facesets[0].outer_id, "staff");

        let requests = server.received_requests().await.expect("recording enabled");
        let body = &requests[0].body;
        assert_eq!(form_field(body, "face_token").as_deref(), Some("ft"));
    }

    #[tokio::test]
    async fn test_set_user_id() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(path("/face/setuserid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "request_id": "r", "time_used": 2, "face_token": "ft", "user_id": "bob"
            })))
            .mount(&server)
            .await;

        let response = set_user_id(&client)
            .face_token("ft")
            .user_id("bob")
            .send()
            .await
            .expect("should succeed");
        assert_eq!(response.user_id, "bob");

        let requests = server.received_requests().await.expect("recording enabled");
        let body = &requests[0].body;
        assert_eq!(form_field(body, "user_id").as_deref(), Some("bob"));
        assert_eq!(form_field(body, "face_token").as_deref(), Some("ft"));
    }

    #[tokio::test]
    async fn test_unknown_face_token_is_service_error() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(path("/face/getdetail"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "request_id": "r", "time_used": 1, "error_message": "INVALID_FACE_TOKEN"
            })))
            .mount(&server)
            .await;

        let err = get_detail(&client)
            .face_token("missing")
            .send()
            .await
            .expect_err("should fail");
        match err {
            FaceError::Service(service) => assert_eq!(service.error_message, "INVALID_FACE_TOKEN"),
            other => panic!("Expected Service error, got {other:?}"),
        }
    }
}
