use serde::{Deserialize, Serialize};
use versemark_primitives::common::now_ms;
use versemark_primitives::markings::WordMarkings;
use versemark_store::{Column, Store};

/// Snapshots outlive the clear that produced them by seven days.
pub const BACKUP_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub value: WordMarkings,
    pub created_at: u64,
    pub expires_at: u64,
}

/// Snapshot a chapter's pre-clear markings. Called only when a clearing write
/// is about to overwrite non-empty data.
pub fn snapshot(store: &Store, key: &[u8], markings: WordMarkings) -> eyre::Result<()> {
    let created_at = now_ms();

    let record = BackupRecord {
        value: markings,
        created_at,
        expires_at: created_at.saturating_add(BACKUP_TTL_MS),
    };

    store.put_json(Column::Backups, key, &record)
}

/// Read a snapshot, lazily purging it once expired.
pub fn fetch(store: &Store, key: &[u8]) -> eyre::Result<Option<BackupRecord>> {
    let Some(record) = store.get_json::<BackupRecord>(Column::Backups, key)? else {
        return Ok(None);
    };

    if record.expires_at <= now_ms() {
        store.delete(Column::Backups, key)?;
        return Ok(None);
    }

    Ok(Some(record))
}

/// Read and delete: a successful restore consumes the snapshot.
pub fn consume(store: &Store, key: &[u8]) -> eyre::Result<Option<BackupRecord>> {
    let Some(record) = fetch(store, key)? else {
        return Ok(None);
    };

    store.delete(Column::Backups, key)?;

    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use versemark_primitives::chapter::WordCoord;
    use versemark_primitives::markings::LayerValue;

    use super::*;

    fn sample() -> WordMarkings {
        let mut markings = WordMarkings::new();
        markings.set_layer(WordCoord::new(3, 2), LayerValue::Highlight("#ff0000".into()), 1);
        markings
    }

    #[test]
    fn consume_removes_the_snapshot() {
        let store = Store::in_memory();

        snapshot(&store, b"d:dev1/KJV:43:3", sample()).unwrap();

        assert!(fetch(&store, b"d:dev1/KJV:43:3").unwrap().is_some());
        assert!(consume(&store, b"d:dev1/KJV:43:3").unwrap().is_some());
        assert!(
            fetch(&store, b"d:dev1/KJV:43:3").unwrap().is_none(),
            "restore must delete the snapshot"
        );
    }

    #[test]
    fn expired_snapshot_is_purged_on_read() {
        let store = Store::in_memory();

        let record = BackupRecord {
            value: sample(),
            created_at: 0,
            expires_at: 1,
        };
        store.put_json(Column::Backups, b"k", &record).unwrap();

        assert!(fetch(&store, b"k").unwrap().is_none());
        assert!(!store.has(Column::Backups, b"k").unwrap(), "lazy purge");
    }
}
