use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use uuid::Uuid;

use minifb_types::models::AccountId;

/// Header carrying the caller's account id, set by the authenticating proxy
/// in front of this service.
pub const ACCOUNT_HEADER: &str = "x-account-id";

/// Extract the already-authenticated account from the request headers.
pub async fn require_account(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let account = req
        .headers()
        .get(ACCOUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<Uuid>().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(AccountId(account));
    Ok(next.run(req).await)
}
