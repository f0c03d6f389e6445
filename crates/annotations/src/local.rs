//! Durable per-chapter cache on the client side.
//!
//! Records are format-versioned. A superseded layout stored one object per
//! coordinate tagged with an explicit `type` discriminator; it is upgraded to
//! the layer-map shape transparently on read. Corruption is swallowed: a
//! record that fails to parse loads as an empty map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use versemark_primitives::chapter::{ChapterId, WordCoord};
use versemark_primitives::markings::{LayerValue, WordMarkings};
use versemark_store::{Column, Store};

const MARKINGS_FORMAT_VERSION: u32 = 2;

/// Write failure surfaced to the caller exactly once per mutation attempt.
/// Never retried automatically.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not encode annotations for storage")]
    Encode(#[source] serde_json::Error),
    #[error("local storage rejected the write, it may be full")]
    Storage(#[source] eyre::Report),
}

#[derive(Debug, Deserialize, Serialize)]
struct ChapterRecord {
    version: u32,
    markings: WordMarkings,
}

#[derive(Debug, Serialize)]
struct ChapterRecordRef<'a> {
    version: u32,
    markings: &'a WordMarkings,
}

/// One coordinate's entry in the superseded single-layer layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEntry {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    created_at: u64,
}

#[derive(Clone, Debug)]
pub struct LocalStore {
    store: Store,
}

impl LocalStore {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Load a chapter's map. Absence, unreadable storage and unparseable
    /// records all load as the empty map.
    pub fn load_markings(&self, chapter: &ChapterId) -> WordMarkings {
        let key = chapter_key(chapter);

        let raw = match self.store.get(Column::Markings, &key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return WordMarkings::new(),
            Err(err) => {
                warn!(%chapter, %err, "local read failed, loading empty chapter");
                return WordMarkings::new();
            }
        };

        match serde_json::from_slice::<Value>(&raw) {
            Ok(value) => parse_record(chapter, value),
            Err(err) => {
                warn!(%chapter, %err, "corrupt local record, loading empty chapter");
                WordMarkings::new()
            }
        }
    }

    pub fn save_markings(
        &self,
        chapter: &ChapterId,
        markings: &WordMarkings,
    ) -> Result<(), SaveError> {
        let record = ChapterRecordRef {
            version: MARKINGS_FORMAT_VERSION,
            markings,
        };

        let raw = serde_json::to_vec(&record).map_err(SaveError::Encode)?;

        self.store
            .put(Column::Markings, &chapter_key(chapter), &raw)
            .map_err(SaveError::Storage)
    }
}

fn chapter_key(chapter: &ChapterId) -> Vec<u8> {
    chapter.storage_segment().into_bytes()
}

fn parse_record(chapter: &ChapterId, value: Value) -> WordMarkings {
    let is_versioned = value
        .as_object()
        .is_some_and(|object| object.contains_key("version"));

    if is_versioned {
        return match serde_json::from_value::<ChapterRecord>(value) {
            Ok(record) => record.markings,
            Err(err) => {
                warn!(%chapter, %err, "corrupt versioned record, loading empty chapter");
                WordMarkings::new()
            }
        };
    }

    migrate_legacy(chapter, value)
}

/// Upgrade the per-entry `{type, value, createdAt}` layout. Entries that no
/// longer parse are dropped rather than failing the whole chapter.
fn migrate_legacy(chapter: &ChapterId, value: Value) -> WordMarkings {
    let Ok(entries) = serde_json::from_value::<BTreeMap<String, LegacyEntry>>(value) else {
        warn!(%chapter, "unrecognised local record shape, loading empty chapter");
        return WordMarkings::new();
    };

    let mut markings = WordMarkings::new();

    for (coord, entry) in entries {
        let Ok(coord) = coord.parse::<WordCoord>() else {
            continue;
        };

        let layer = match entry.kind.as_str() {
            "highlight" => LayerValue::Highlight(entry.value.into()),
            "underline" => LayerValue::Underline(entry.value.into()),
            "symbol" => LayerValue::Symbol(entry.value.into()),
            _ => continue,
        };

        markings.set_layer(coord, layer, entry.created_at);
    }

    markings
}
