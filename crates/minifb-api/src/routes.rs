use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::middleware::require_account;
use crate::state::{AppState, health};
use crate::{feed, friends, profiles, statuses};

/// The whole HTTP surface. Routes under `protected` need the account header.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/profiles", get(profiles::list_profiles))
        .route("/profiles/{profile_id}", get(profiles::show_profile))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/signup", post(profiles::create_profile))
        .route("/me", get(profiles::show_me).patch(profiles::update_me))
        .route("/me/statuses", post(statuses::post_status))
        .route("/me/friends", get(friends::list_friends))
        .route("/me/friends/{other_id}", post(friends::add_friend))
        .route("/me/suggestions", get(friends::suggestions))
        .route("/me/feed", get(feed::news_feed))
        .route(
            "/statuses/{status_id}",
            patch(statuses::update_status).delete(statuses::delete_status),
        )
        .layer(middleware::from_fn(require_account))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
