use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use tower_sessions::Session;
use versemark_primitives::chapter::ChapterId;
use versemark_server_primitives::{GetBackupResponse, RecordPayload, RestoreBackupResponse};
use versemark_store::Store;

use crate::api::{parse_api_error, ApiResponse};
use crate::owner::{require_owner, resolve_owner};
use crate::storage::backup::{consume, fetch, BackupRecord};
use crate::storage::chapter_key;

fn backup_payload(record: BackupRecord) -> RecordPayload<versemark_primitives::markings::WordMarkings> {
    RecordPayload {
        value: record.value,
        updated_at: record.created_at,
    }
}

pub async fn get_backup_handler(
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

    match fetch(&store, &chapter_key(&scope, &chapter)) {
        Ok(record) => ApiResponse {
            payload: GetBackupResponse {
                data: record.map(backup_payload),
            },
        }
        .into_response(),
        Err(err) => parse_api_error(err).into_response(),
    }
}

pub async fn restore_backup_handler(
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

    match consume(&store, &chapter_key(&scope, &chapter)) {
        Ok(record) => ApiResponse {
            payload: RestoreBackupResponse {
                data: record.map(backup_payload),
            },
        }
        .into_response(),
        Err(err) => parse_api_error(err).into_response(),
    }
}
