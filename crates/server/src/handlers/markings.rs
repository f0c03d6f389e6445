use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use tower_sessions::Session;
use versemark_primitives::chapter::ChapterId;
use versemark_server_primitives::{GetMarkingsResponse, PutMarkingsRequest, PutRecordResponse};
use versemark_store::Store;

use super::payload;
use crate::api::{parse_api_error, ApiResponse};
use crate::owner::{require_owner, resolve_owner};
use crate::storage::markings::{get_markings, put_markings};

pub async fn get_markings_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
    Path((translation, book, chapter)): Path<(String, u16, u16)>,
) -> impl IntoResponse {
    let owner = match require_owner(resolve_owner(&session, &headers, &store).await) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let Some(scope) = owner.scope() else {
        unreachable!("resolved owners always have a scope");
    };

    let chapter = ChapterId::new(translation, book, chapter);

    match get_markings(&store, &scope, &chapter) {
        Ok(record) => ApiResponse {
            payload: GetMarkingsResponse {
                data: record.map(payload),
            },
        }
        .into_response(),
        Err(err) => parse_api_error(err).into_response(),
    }
}

pub async fn put_markings_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
    Path((translation, book, chapter)): Path<(String, u16, u16)>,
    Json(request): Json<PutMarkingsRequest>,
) -> impl IntoResponse {
    let owner = match require_owner(resolve_owner(&session, &headers, &store).await) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let Some(scope) = owner.scope() else {
        unreachable!("resolved owners always have a scope");
    };

    let chapter = ChapterId::new(translation, book, chapter);

    match put_markings(&store, &scope, &chapter, request.markings, &owner) {
        Ok(updated_at) => ApiResponse {
            payload: PutRecordResponse::new(updated_at),
        }
        .into_response(),
        Err(err) => parse_api_error(err).into_response(),
    }
}
