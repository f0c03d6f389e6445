//! Handlers for the JSON-valued resource families: the per-owner symbol
//! palette, word-memory map and preferences, and per-chapter notes. The
//! server treats their values as opaque JSON; only markings need schema
//! awareness (for backup-on-clear).

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use tower_sessions::Session;
use versemark_primitives::chapter::ChapterId;
use versemark_primitives::owner::Owner;
use versemark_server_primitives::{GetValueResponse, PutRecordResponse, PutValueRequest};
use versemark_store::{Column, Store};

use super::payload;
use crate::api::{parse_api_error, ApiError, ApiResponse};
use crate::owner::{require_account, require_owner, resolve_owner};
use crate::storage::{chapter_key, get_record, singleton_key, upsert_record};

fn get_value(store: &Store, col: Column, key: &[u8]) -> axum::response::Response {
    match get_record(store, col, key) {
        Ok(record) => ApiResponse {
            payload: GetValueResponse {
                data: record.map(payload),
            },
        }
        .into_response(),
        Err(err) => parse_api_error(err).into_response(),
    }
}

fn put_value(
    store: &Store,
    col: Column,
    key: &[u8],
    request: PutValueRequest,
    writer: &Owner,
) -> axum::response::Response {
    match upsert_record(store, col, key, request.value, writer) {
        Ok(updated_at) => ApiResponse {
            payload: PutRecordResponse::new(updated_at),
        }
        .into_response(),
        Err(err) => parse_api_error(err).into_response(),
    }
}

async fn resolve_scope(
    session: &Session,
    headers: &HeaderMap,
    store: &Store,
) -> Result<(Owner, String), ApiError> {
    let owner = require_owner(resolve_owner(session, headers, store).await)?;

    let Some(scope) = owner.scope() else {
        unreachable!("resolved owners always have a scope");
    };

    Ok((owner, scope))
}

// ----------------------------------- Palette -----------------------------------

pub async fn get_palette_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match resolve_scope(&session, &headers, &store).await {
        Ok((_, scope)) => get_value(&store, Column::Palette, &singleton_key(&scope)),
        Err(err) => err.into_response(),
    }
}

pub async fn put_palette_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
    Json(request): Json<PutValueRequest>,
) -> impl IntoResponse {
    match resolve_scope(&session, &headers, &store).await {
        Ok((owner, scope)) => {
            put_value(&store, Column::Palette, &singleton_key(&scope), request, &owner)
        }
        Err(err) => err.into_response(),
    }
}

// --------------------------------- Word memory ---------------------------------

pub async fn get_word_memory_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match resolve_scope(&session, &headers, &store).await {
        Ok((_, scope)) => get_value(&store, Column::WordMemory, &singleton_key(&scope)),
        Err(err) => err.into_response(),
    }
}

pub async fn put_word_memory_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
    Json(request): Json<PutValueRequest>,
) -> impl IntoResponse {
    match resolve_scope(&session, &headers, &store).await {
        Ok((owner, scope)) => {
            put_value(&store, Column::WordMemory, &singleton_key(&scope), request, &owner)
        }
        Err(err) => err.into_response(),
    }
}

// ------------------------------------ Notes ------------------------------------

pub async fn get_notes_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
    Path((translation, book, chapter)): Path<(String, u16, u16)>,
) -> impl IntoResponse {
    match resolve_scope(&session, &headers, &store).await {
        Ok((_, scope)) => {
            let chapter = ChapterId::new(translation, book, chapter);
            get_value(&store, Column::Notes, &chapter_key(&scope, &chapter))
        }
        Err(err) => err.into_response(),
    }
}

pub async fn put_notes_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
    Path((translation, book, chapter)): Path<(String, u16, u16)>,
    Json(request): Json<PutValueRequest>,
) -> impl IntoResponse {
    match resolve_scope(&session, &headers, &store).await {
        Ok((owner, scope)) => {
            let chapter = ChapterId::new(translation, book, chapter);
            put_value(&store, Column::Notes, &chapter_key(&scope, &chapter), request, &owner)
        }
        Err(err) => err.into_response(),
    }
}

// --------------------------------- Preferences ---------------------------------

pub async fn get_preferences_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let owner = resolve_owner(&session, &headers, &store).await;

    match require_account(&owner) {
        Ok(user_id) => get_value(
            &store,
            Column::Preferences,
            &singleton_key(&format!("u:{user_id}")),
        ),
        Err(err) => err.into_response(),
    }
}

pub async fn put_preferences_handler(
    session: Session,
    State(store): State<Store>,
    headers: HeaderMap,
    Json(request): Json<PutValueRequest>,
) -> impl IntoResponse {
    let owner = resolve_owner(&session, &headers, &store).await;

    match require_account(&owner) {
        Ok(user_id) => put_value(
            &store,
            Column::Preferences,
            &singleton_key(&format!("u:{user_id}")),
            request,
            &owner,
        ),
        Err(err) => err.into_response(),
    }
}
