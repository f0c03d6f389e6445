use versemark_primitives::chapter::ChapterId;
use versemark_primitives::markings::WordMarkings;
use versemark_primitives::owner::Owner;
use versemark_store::{Column, Store};

use super::{backup, chapter_key, get_record, upsert_record, Record};

pub fn get_markings(
    store: &Store,
    scope: &str,
    chapter: &ChapterId,
) -> eyre::Result<Option<Record<WordMarkings>>> {
    get_record(store, Column::Markings, &chapter_key(scope, chapter))
}

/// Upsert a chapter's markings. Empty layer-sets are pruned before storage,
/// so emptiness below means "no layers anywhere". A write that transitions
/// existing non-empty data to empty snapshots the old map into the backup
/// cache first.
pub fn put_markings(
    store: &Store,
    scope: &str,
    chapter: &ChapterId,
    mut markings: WordMarkings,
    writer: &Owner,
) -> eyre::Result<u64> {
    markings.prune();

    let key = chapter_key(scope, chapter);

    if markings.is_empty() {
        let existing: Option<Record<WordMarkings>> = get_record(store, Column::Markings, &key)?;

        if let Some(existing) = existing {
            if !existing.value.is_empty() {
                backup::snapshot(store, &key, existing.value)?;
            }
        }
    }

    upsert_record(store, Column::Markings, &key, markings, writer)
}
