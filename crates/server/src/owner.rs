use axum::http::HeaderMap;
use tower_sessions::Session;
use tracing::warn;
use versemark_primitives::owner::{DeviceId, Owner};
use versemark_server_primitives::{DEVICE_ID_HEADER, SESSION_USER_KEY};
use versemark_store::Store;

use crate::api::ApiError;
use crate::storage::devices::register_device;

/// Resolve the acting identity for a request.
///
/// The session credential takes priority; a missing or unreadable session
/// falls through to the anonymous device header rather than rejecting.
/// Resolution itself never fails - callers decide whether `Unresolved` is
/// acceptable for the operation requested.
pub async fn resolve_owner(session: &Session, headers: &HeaderMap, store: &Store) -> Owner {
    if let Some(user_id) = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .ok()
        .flatten()
    {
        return Owner::authenticated(user_id);
    }

    let Some(header) = headers.get(DEVICE_ID_HEADER) else {
        return Owner::Unresolved;
    };

    let device_id = header
        .to_str()
        .ok()
        .and_then(|raw| raw.parse::<DeviceId>().ok());

    let Some(device_id) = device_id else {
        return Owner::Unresolved;
    };

    // First-seen registration, insert-if-absent. A registry failure must not
    // turn resolution into an error.
    if let Err(err) = register_device(store, &device_id) {
        warn!(%device_id, %err, "failed to register device");
    }

    Owner::anonymous(device_id)
}

/// Reject `Unresolved` owners for owner-scoped operations.
pub fn require_owner(owner: Owner) -> Result<Owner, ApiError> {
    if !owner.is_resolved() {
        return Err(ApiError::unauthorized(
            "Sign in or provide a device id to access annotations.",
        ));
    }

    Ok(owner)
}

/// Reject everything but an authenticated account for account-only operations.
pub fn require_account(owner: &Owner) -> Result<String, ApiError> {
    match owner {
        Owner::Authenticated { user_id } => Ok(user_id.as_str().to_owned()),
        Owner::Anonymous { .. } => Err(ApiError::forbidden(
            "This operation requires a signed-in account.",
        )),
        Owner::Unresolved => Err(ApiError::unauthorized(
            "Sign in to access account resources.",
        )),
    }
}
