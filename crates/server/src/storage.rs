use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use versemark_primitives::chapter::ChapterId;
use versemark_primitives::common::now_ms;
use versemark_primitives::owner::{Owner, UserId};
use versemark_store::{Column, Store};

pub mod account;
pub mod backup;
pub mod claim;
pub mod devices;
pub mod markings;

/// One stored row: the JSON value, the account that owns it (absent until an
/// authenticated write or a claim backfills it), and the advisory write
/// timestamp.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<UserId>,
    pub updated_at: u64,
}

/// Key for per-chapter resources: `{scope}/{translation}:{book}:{chapter}`.
pub(crate) fn chapter_key(scope: &str, chapter: &ChapterId) -> Vec<u8> {
    format!("{scope}/{}", chapter.storage_segment()).into_bytes()
}

/// Key for per-owner singleton resources: the scope alone.
pub(crate) fn singleton_key(scope: &str) -> Vec<u8> {
    scope.as_bytes().to_vec()
}

pub(crate) fn get_record<T: DeserializeOwned>(
    store: &Store,
    col: Column,
    key: &[u8],
) -> eyre::Result<Option<Record<T>>> {
    store.get_json(col, key)
}

/// Serializes every upsert's read-modify-write. The store exposes no
/// transactions, and concurrent first writes to one key would otherwise race
/// on the owner backfill.
static UPSERT_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

/// Idempotent upsert: overwrite value and timestamp, backfill `claimedBy`
/// only if it was previously unset. An already-set owner is never replaced.
pub(crate) fn upsert_record<T: Serialize>(
    store: &Store,
    col: Column,
    key: &[u8],
    value: T,
    writer: &Owner,
) -> eyre::Result<u64> {
    let _guard = UPSERT_LOCK.lock();

    let existing: Option<Record<serde_json::Value>> = store.get_json(col, key)?;

    let claimed_by = existing
        .and_then(|record| record.claimed_by)
        .or_else(|| writer.user_id().cloned());

    let updated_at = now_ms();

    let record = Record {
        value,
        claimed_by,
        updated_at,
    };

    store.put_json(col, key, &record)?;

    Ok(updated_at)
}
