use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use tower_sessions::Session;
use tracing::info;
use versemark_primitives::owner::UserId;
use versemark_server_primitives::{ClaimDeviceRequest, ClaimDeviceResponse};
use versemark_store::Store;

use crate::api::{parse_api_error, ApiResponse};
use crate::owner::{require_account, resolve_owner};
use crate::storage::claim::claim_device;

pub async fn claim_device_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
    Json(request): Json<ClaimDeviceRequest>,
) -> impl IntoResponse {
    let owner = resolve_owner(&session, &headers, &store).await;

    let user_id = match require_account(&owner) {
        Ok(user_id) => UserId::from(user_id),
        Err(err) => return err.into_response(),
    };

    match claim_device(&store, &request.device_id, &user_id) {
        Ok(reassigned) => {
            info!(device_id = %request.device_id, %user_id, reassigned, "claimed device rows");

            ApiResponse {
                payload: ClaimDeviceResponse::new(reassigned),
            }
            .into_response()
        }
        Err(err) => parse_api_error(err).into_response(),
    }
}
