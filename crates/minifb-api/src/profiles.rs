use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use minifb_social::{NewProfile, ProfileUpdate};
use minifb_types::api::{
    CreateProfileRequest, ProfilePageResponse, ProfileResponse, UpdateProfileRequest,
};
use minifb_types::models::AccountId;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::{AppState, blocking};

/// GET /profiles — every profile.
pub async fn list_profiles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let profiles = blocking(&state, minifb_social::list_profiles).await?;
    Ok(Json(profiles.into_iter().map(ProfileResponse::from).collect::<Vec<_>>()))
}

/// GET /profiles/{id} — a profile page with its own status messages.
pub async fn show_profile(
    State(state): State<AppState>,
    ApiPath(profile_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let page = blocking(&state, move |db| {
        let profile = minifb_social::get_profile(db, profile_id)?;
        let status_messages = minifb_social::status_messages_of(db, &profile)?;
        Ok(ProfilePageResponse { profile: profile.into(), status_messages })
    })
    .await?;

    Ok(Json(page))
}

/// POST /signup — create the caller's profile.
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    ApiJson(req): ApiJson<CreateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = NewProfile {
        username: req.username,
        first_name: req.first_name,
        last_name: req.last_name,
        city: req.city,
        email: req.email,
        image_url: req.image_url,
    };

    let profile = blocking(&state, move |db| minifb_social::create_profile(db, account, new)).await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// GET /me — the caller's own profile page.
pub async fn show_me(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let page = blocking(&state, move |db| {
        let profile = minifb_social::profile_for_account(db, account)?;
        let status_messages = minifb_social::status_messages_of(db, &profile)?;
        Ok(ProfilePageResponse { profile: profile.into(), status_messages })
    })
    .await?;

    Ok(Json(page))
}

/// PATCH /me — change city, email or avatar.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = ProfileUpdate {
        city: req.city,
        email: req.email,
        image_url: req.image_url,
    };

    let profile = blocking(&state, move |db| {
        let me = minifb_social::profile_for_account(db, account)?;
        minifb_social::update_profile(db, &me, update)
    })
    .await?;

    Ok(Json(ProfileResponse::from(profile)))
}
