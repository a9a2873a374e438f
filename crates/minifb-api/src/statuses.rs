use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use minifb_social::Attachment;
use minifb_types::api::{
    FailedAttachmentResponse, PostStatusRequest, PostStatusResponse, UpdateStatusRequest,
};
use minifb_types::models::AccountId;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::{AppState, blocking};

/// POST /me/statuses — publish a status with optional attachments.
/// Attachments that could not be recorded are listed in the response; the
/// post itself still stands.
pub async fn post_status(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    ApiJson(req): ApiJson<PostStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let attachments: Vec<Attachment> = req
        .attachments
        .into_iter()
        .map(|a| Attachment { file_ref: a.file_ref, caption: a.caption })
        .collect();

    let post = blocking(&state, move |db| {
        let me = minifb_social::profile_for_account(db, account)?;
        minifb_social::post_status(db, &me, &req.message, attachments)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostStatusResponse {
            status: post.status,
            failed_attachments: post
                .failed_attachments
                .into_iter()
                .map(|f| FailedAttachmentResponse { index: f.index, error: f.error })
                .collect(),
        }),
    ))
}

/// PATCH /statuses/{id} — owner edits the body.
pub async fn update_status(
    State(state): State<AppState>,
    ApiPath(status_id): ApiPath<Uuid>,
    Extension(account): Extension<AccountId>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = blocking(&state, move |db| {
        let me = minifb_social::profile_for_account(db, account)?;
        minifb_social::update_status(db, &me, status_id, &req.message)
    })
    .await?;

    Ok(Json(status))
}

/// DELETE /statuses/{id} — owner removes the post.
pub async fn delete_status(
    State(state): State<AppState>,
    ApiPath(status_id): ApiPath<Uuid>,
    Extension(account): Extension<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |db| {
        let me = minifb_social::profile_for_account(db, account)?;
        minifb_social::delete_status(db, &me, status_id)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
