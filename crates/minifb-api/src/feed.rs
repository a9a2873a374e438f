use axum::{Extension, Json, extract::State, response::IntoResponse};

use minifb_types::models::AccountId;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// GET /me/feed — friends' status messages, newest first.
pub async fn news_feed(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let feed = blocking(&state, move |db| {
        let me = minifb_social::profile_for_account(db, account)?;
        minifb_social::news_feed(db, &me)
    })
    .await?;

    Ok(Json(feed))
}
