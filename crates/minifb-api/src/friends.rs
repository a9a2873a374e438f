use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use minifb_types::api::{AddFriendResponse, ProfileResponse};
use minifb_types::models::AccountId;

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::{AppState, blocking};

/// GET /me/friends
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let friends = blocking(&state, move |db| {
        let me = minifb_social::profile_for_account(db, account)?;
        minifb_social::connections_of(db, &me)
    })
    .await?;

    Ok(Json(friends.into_iter().map(ProfileResponse::from).collect::<Vec<_>>()))
}

/// POST /me/friends/{other_id} — befriend another profile, effective at once.
pub async fn add_friend(
    State(state): State<AppState>,
    ApiPath(other_id): ApiPath<Uuid>,
    Extension(account): Extension<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let (me, edge) = blocking(&state, move |db| {
        let me = minifb_social::profile_for_account(db, account)?;
        let other = minifb_social::get_profile(db, other_id)?;
        let edge = minifb_social::add_edge(db, &me, &other)?;
        Ok((me, edge))
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddFriendResponse {
            profile_id: me.id,
            friend_id: other_id,
            created_at: edge.created_at,
        }),
    ))
}

/// GET /me/suggestions — everyone the caller is not yet friends with.
pub async fn suggestions(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let suggestions = blocking(&state, move |db| {
        let me = minifb_social::profile_for_account(db, account)?;
        minifb_social::suggestions_for(db, &me)
    })
    .await?;

    Ok(Json(suggestions.into_iter().map(ProfileResponse::from).collect::<Vec<_>>()))
}
