use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::info;
use versemark_primitives::owner::UserId;
use versemark_server_primitives::DeleteAccountResponse;
use versemark_store::Store;

use crate::api::{parse_api_error, ApiResponse};
use crate::owner::{require_account, resolve_owner};
use crate::storage::account::delete_account;

pub async fn delete_account_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let owner = resolve_owner(&session, &headers, &store).await;

    let user_id = match require_account(&owner) {
        Ok(user_id) => UserId::from(user_id),
        Err(err) => return err.into_response(),
    };

    match delete_account(&store, &user_id) {
        Ok(deleted) => {
            info!(%user_id, deleted, "deleted account data");

            ApiResponse {
                payload: DeleteAccountResponse::new(deleted),
            }
            .into_response()
        }
        Err(err) => parse_api_error(err).into_response(),
    }
}
