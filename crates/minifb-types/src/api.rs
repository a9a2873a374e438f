use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Profile, StatusMessage};

// -- Profiles --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProfileRequest {
    /// Display handle recorded for the account on first signup.
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub city: String,
    pub email: String,
    pub image_url: Option<String>,
}

/// Only these fields may change after signup.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub city: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

/// A profile as shown to other clients. The owning account id is left out:
/// it is what callers present to act as that account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub email: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            city: p.city,
            email: p.email,
            image_url: p.image_url,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfilePageResponse {
    pub profile: ProfileResponse,
    pub status_messages: Vec<StatusMessage>,
}

// -- Status messages --

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentRequest {
    pub file_ref: String,
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostStatusRequest {
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailedAttachmentResponse {
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostStatusResponse {
    pub status: StatusMessage,
    pub failed_attachments: Vec<FailedAttachmentResponse>,
}

// -- Friends --

#[derive(Debug, Serialize, Deserialize)]
pub struct AddFriendResponse {
    pub profile_id: Uuid,
    pub friend_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
