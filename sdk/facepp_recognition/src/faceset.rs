//! FaceSet management with the Face++ FaceSet API.
//!
//! A FaceSet is a named, server-side collection of face tokens that
//! [`crate::search`] searches against. Every operation except
//! [`create`] and [`get_facesets`] addresses an existing FaceSet through
//! [`FaceRequest::faceset`], by service token or by the caller's outer id.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use facepp_core::client::FaceClient;
//! use facepp_recognition::faceset;
//! use facepp_recognition::models::FaceSetRef;
//!
//! # async fn example(client: &FaceClient) -> facepp_core::error::FaceResult<()> {
//! let created = faceset::create(client)
//!     .display_name("Employees")
//!     .outer_id("employees")
//!     .send()
//!     .await?;
//!
//! faceset::add_face(client)
//!     .faceset(FaceSetRef::token(created.faceset_token))
//!     .face_tokens(["ed319e807e039ae669a4d1af0922a0c8"])
//!     .send()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use facepp_core::client::FaceClient;
use facepp_core::error::FaceResult;
use facepp_core::form::FormFields;
use facepp_core::models::ResponseEnvelope;
use serde::Deserialize;

use crate::models::{FaceSetRef, FaceSetSummary};
use crate::request::{check_list_max, join_list, Endpoint, FaceRequest};

/// Most face tokens `create` and `add_face` accept in one call.
pub const MAX_FACE_TOKENS_PER_CALL: usize = 5;

/// `face_tokens` value that makes `remove_face` empty the whole FaceSet.
pub const REMOVE_ALL_FACE_TOKENS: &str = "RemoveAllFaceTokens";

/// Endpoints that act on one existing FaceSet.
pub trait TargetsFaceSet: Endpoint {}

impl<E: TargetsFaceSet> FaceRequest<'_, E> {
    /// The FaceSet to act on.
    pub fn faceset(self, faceset: FaceSetRef) -> Self {
        let (name, value) = faceset.into_field();
        self.field(name, value)
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// The `/faceset/create` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct FaceSetCreate;

impl Endpoint for FaceSetCreate {
    const PATH: &'static str = "/faceset/create";
    const NAME: &'static str = "faceset_create";
    type Response = FaceSetCreateResponse;

    fn validate(fields: &FormFields) -> FaceResult<()> {
        check_list_max(fields, "face_tokens", MAX_FACE_TOKENS_PER_CALL)
    }
}

/// The `/faceset/addface` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct FaceSetAddFace;

impl Endpoint for FaceSetAddFace {
    const PATH: &'static str = "/faceset/addface";
    const NAME: &'static str = "faceset_add_face";
    type Response = FaceSetCreateResponse;

    fn validate(fields: &FormFields) -> FaceResult<()> {
        check_list_max(fields, "face_tokens", MAX_FACE_TOKENS_PER_CALL)
    }
}

impl TargetsFaceSet for FaceSetAddFace {}

/// The `/faceset/removeface` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct FaceSetRemoveFace;

impl Endpoint for FaceSetRemoveFace {
    const PATH: &'static str = "/faceset/removeface";
    const NAME: &'static str = "faceset_remove_face";
    type Response = FaceSetRemoveResponse;
}

impl TargetsFaceSet for FaceSetRemoveFace {}

/// The `/faceset/update` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct FaceSetUpdate;

impl Endpoint for FaceSetUpdate {
    const PATH: &'static str = "/faceset/update";
    const NAME: &'static str = "faceset_update";
    type Response = FaceSetRefResponse;
}

impl TargetsFaceSet for FaceSetUpdate {}

/// The `/faceset/getdetail` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct FaceSetGetDetail;

impl Endpoint for FaceSetGetDetail {
    const PATH: &'static str = "/faceset/getdetail";
    const NAME: &'static str = "faceset_get_detail";
    type Response = FaceSetDetail;
}

impl TargetsFaceSet for FaceSetGetDetail {}

/// The `/faceset/delete` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct FaceSetDelete;

impl Endpoint for FaceSetDelete {
    const PATH: &'static str = "/faceset/delete";
    const NAME: &'static str = "faceset_delete";
    type Response = FaceSetRefResponse;
}

impl TargetsFaceSet for FaceSetDelete {}

/// The `/faceset/getfacesets` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct FaceSetList;

impl Endpoint for FaceSetList {
    const PATH: &'static str = "/faceset/getfacesets";
    const NAME: &'static str = "faceset_list";
    type Response = FaceSetListResponse;
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A face token the service refused to add or remove.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FailureDetail {
    /// E.g. `INVALID_FACE_TOKEN` or `QUOTA_EXCEEDED`.
    pub reason: String,
    pub face_token: String,
}

/// Result of `create` and `add_face`.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceSetCreateResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    #[serde(default)]
    pub faceset_token: String,

    #[serde(default)]
    pub outer_id: String,

    /// Face tokens added by this call.
    #[serde(default)]
    pub face_added: u32,

    /// Face tokens in the FaceSet after this call.
    #[serde(default)]
    pub face_count: u32,

    #[serde(default)]
    pub failure_detail: Vec<FailureDetail>,
}

/// Result of `remove_face`.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceSetRemoveResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    #[serde(default)]
    pub faceset_token: String,

    #[serde(default)]
    pub outer_id: String,

    /// Face tokens removed by this call.
    #[serde(default)]
    pub face_removed: u32,

    /// Face tokens left in the FaceSet.
    #[serde(default)]
    pub face_count: u32,

    #[serde(default)]
    pub failure_detail: Vec<FailureDetail>,
}

/// Result of `update` and `delete`: the FaceSet that was touched.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceSetRefResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    #[serde(default)]
    pub faceset_token: String,

    #[serde(default)]
    pub outer_id: String,
}

/// Result of `get_detail`.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceSetDetail {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    #[serde(default)]
    pub faceset_token: String,

    #[serde(default)]
    pub outer_id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub user_data: String,

    /// Comma-separated tags.
    #[serde(default)]
    pub tags: String,

    #[serde(default)]
    pub face_count: u32,

    /// One page of the FaceSet's face tokens (at most 100).
    #[serde(default)]
    pub face_tokens: Vec<String>,

    /// Start offset of the next page, absent or empty on the last one.
    pub next: Option<String>,
}

impl FaceSetDetail {
    /// The `start` value for the next page, if there is one.
    pub fn next_start(&self) -> Option<u32> {
        parse_next(self.next.as_deref())
    }
}

/// Result of `get_facesets`.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceSetListResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,

    #[serde(default)]
    pub facesets: Vec<FaceSetSummary>,

    /// Start offset of the next page, absent or empty on the last one.
    pub next: Option<String>,
}

impl FaceSetListResponse {
    /// The `start` value for the next page, if there is one.
    pub fn next_start(&self) -> Option<u32> {
        parse_next(self.next.as_deref())
    }
}

fn parse_next(next: Option<&str>) -> Option<u32> {
    next.map(str::trim)
        .filter(|next| !next.is_empty())
        .and_then(|next| next.parse().ok())
}

// ---------------------------------------------------------------------------
// Factories and setters
// ---------------------------------------------------------------------------

/// Start a request creating a FaceSet.
pub fn create(client: &FaceClient) -> FaceRequest<'_, FaceSetCreate> {
    FaceRequest::new(client)
}

/// Start a request adding faces to a FaceSet.
pub fn add_face(client: &FaceClient) -> FaceRequest<'_, FaceSetAddFace> {
    FaceRequest::new(client)
}

/// Start a request removing faces from a FaceSet.
pub fn remove_face(client: &FaceClient) -> FaceRequest<'_, FaceSetRemoveFace> {
    FaceRequest::new(client)
}

/// Start a request updating a FaceSet's attributes.
pub fn update(client: &FaceClient) -> FaceRequest<'_, FaceSetUpdate> {
    FaceRequest::new(client)
}

/// Start a request reading a FaceSet.
pub fn get_detail(client: &FaceClient) -> FaceRequest<'_, FaceSetGetDetail> {
    FaceRequest::new(client)
}

/// Start a request deleting a FaceSet.
pub fn delete(client: &FaceClient) -> FaceRequest<'_, FaceSetDelete> {
    FaceRequest::new(client)
}

/// Start a request listing the account's FaceSets.
pub fn get_facesets(client: &FaceClient) -> FaceRequest<'_, FaceSetList> {
    FaceRequest::new(client)
}

impl FaceRequest<'_, FaceSetCreate> {
    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.field("display_name", name.into())
    }

    /// A caller-chosen id, unique within the account.
    pub fn outer_id(self, outer_id: impl Into<String>) -> Self {
        self.field("outer_id", outer_id.into())
    }

    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.field("tags", join_list(tags))
    }

    pub fn user_data(self, data: impl Into<String>) -> Self {
        self.field("user_data", data.into())
    }

    /// Faces to add on creation, at most [`MAX_FACE_TOKENS_PER_CALL`].
    pub fn face_tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.field("face_tokens", join_list(tokens))
    }

    /// Add the faces to an existing FaceSet with the same `outer_id`
    /// instead of failing.
    pub fn force_merge(self, merge: bool) -> Self {
        self.field("force_merge", merge)
    }
}

impl FaceRequest<'_, FaceSetAddFace> {
    /// Faces to add, at most [`MAX_FACE_TOKENS_PER_CALL`].
    pub fn face_tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.field("face_tokens", join_list(tokens))
    }
}

impl FaceRequest<'_, FaceSetRemoveFace> {
    /// Faces to remove.
    pub fn face_tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.field("face_tokens", join_list(tokens))
    }

    /// Remove every face in the FaceSet.
    pub fn remove_all(self) -> Self {
        self.field("face_tokens", REMOVE_ALL_FACE_TOKENS)
    }
}

impl FaceRequest<'_, FaceSetUpdate> {
    pub fn new_outer_id(self, outer_id: impl Into<String>) -> Self {
        self.field("new_outer_id", outer_id.into())
    }

    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.field("display_name", name.into())
    }

    pub fn user_data(self, data: impl Into<String>) -> Self {
        self.field("user_data", data.into())
    }

    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.field("tags", join_list(tags))
    }
}

impl FaceRequest<'_, FaceSetGetDetail> {
    /// Offset of the first face token to return; see [`FaceSetDetail::next_start`].
    pub fn start(self, start: u32) -> Self {
        self.field("start", start)
    }
}

impl FaceRequest<'_, FaceSetDelete> {
    /// Refuse to delete a FaceSet that still holds faces.
    pub fn check_empty(self, check: bool) -> Self {
        self.field("check_empty", check)
    }
}

impl FaceRequest<'_, FaceSetList> {
    /// Only list FaceSets carrying all of these tags.
    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.field("tags", join_list(tags))
    }

    /// Offset of the first FaceSet to return; see [`FaceSetListResponse::next_start`].
    pub fn start(self, start: u32) -> Self {
        self.field("start", start)
    }
}
