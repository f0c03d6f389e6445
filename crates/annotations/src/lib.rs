//! In-memory annotation state machine: the current chapter map, bounded
//! undo/redo, local-wins merge against the cloud copy, and the persistence
//! plus sync side effects of every mutation.
//!
//! Mutations always complete against in-memory state and the local store
//! before any remote work happens; remote pushes are debounced and
//! fire-and-forget.

use std::collections::HashMap;
use std::sync::Arc;

use eyre::Result;
use parking_lot::Mutex;
use tracing::{debug, warn};
use versemark_primitives::chapter::{ChapterId, WordCoord};
use versemark_primitives::common::now_ms;
use versemark_primitives::markings::{LayerKind, LayerValue, SymbolValue, WordMarkings};
use versemark_sync::{RemoteStore, SyncCoordinator};

pub use crate::history::{ChapterHistory, EditRecord, HISTORY_LIMIT};
pub use crate::local::{LocalStore, SaveError};

mod history;
mod local;

/// A state-changing edit to one chapter's map. A batch is one undo step.
#[derive(Clone, Debug)]
pub enum Mutation {
    SetLayers(Vec<(WordCoord, LayerValue)>),
    ClearLayer(WordCoord, LayerKind),
    ClearVerse(u32),
    ClearSymbol(SymbolValue),
    ClearChapter,
}

impl Mutation {
    /// Label shown on the undo affordance.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::SetLayers(entries) if entries.len() == 1 => match entries[0].1.kind() {
                LayerKind::Highlight => "Added highlight".to_owned(),
                LayerKind::Underline => "Added underline".to_owned(),
                LayerKind::Symbol => "Added symbol".to_owned(),
            },
            Self::SetLayers(entries) => format!("Marked {} words", entries.len()),
            Self::ClearLayer(_, kind) => format!("Removed {}", kind.label()),
            Self::ClearVerse(verse) => format!("Cleared verse {verse}"),
            Self::ClearSymbol(_) => "Removed symbol from chapter".to_owned(),
            Self::ClearChapter => "Cleared chapter".to_owned(),
        }
    }
}

/// What a mutation did, and whether the durable save took.
#[derive(Clone, Debug)]
pub struct MutationOutcome {
    pub description: String,
    /// `false` when the local save failed; the edit is live in memory and
    /// will still sync, the caller should show a dismissible warning.
    pub persisted: bool,
}

#[derive(Debug, Default)]
struct ChapterState {
    markings: WordMarkings,
    history: ChapterHistory,
    backup_offer: Option<WordMarkings>,
}

#[derive(Debug, Default)]
struct ControllerState {
    active: Option<ChapterId>,
    chapters: HashMap<ChapterId, ChapterState>,
}

/// Owns every loaded chapter's `{map, undo, redo}`. Histories stay cached
/// across navigation for the life of the process, never across restarts.
#[derive(Debug)]
pub struct AnnotationController<R> {
    local: LocalStore,
    sync: SyncCoordinator<R>,
    state: Arc<Mutex<ControllerState>>,
}

impl<R> Clone for AnnotationController<R> {
    fn clone(&self) -> Self {
        Self {
            local: self.local.clone(),
            sync: self.sync.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: RemoteStore> AnnotationController<R> {
    pub fn new(local: LocalStore, sync: SyncCoordinator<R>) -> Self {
        Self {
            local,
            sync,
            state: Arc::new(Mutex::new(ControllerState::default())),
        }
    }

    /// Make `chapter` the active chapter: load its map from the local store,
    /// restore its cached history if it was visited this session, and kick
    /// off a background pull-and-merge.
    pub fn load_chapter(&self, chapter: &ChapterId) -> WordMarkings {
        let markings = {
            let mut state = self.state.lock();

            state.active = Some(chapter.clone());

            let entry = state.chapters.entry(chapter.clone()).or_default();
            entry.markings = self.local.load_markings(chapter);
            entry.markings.clone()
        };

        let this = self.clone();
        let chapter = chapter.clone();

        drop(tokio::spawn(async move {
            if let Some(payload) = this.sync.pull_markings(&chapter).await {
                drop(this.merge_remote(&chapter, payload.value));
            }
        }));

        markings
    }

    /// Apply one edit: update memory, record history, persist locally and
    /// schedule the debounced push. Returns `None` when the edit changed
    /// nothing.
    pub fn apply(&self, chapter: &ChapterId, mutation: Mutation) -> Option<MutationOutcome> {
        let description = mutation.describe();
        let timestamp = now_ms();

        let (previous, updated) = {
            let mut state = self.state.lock();
            let entry = state.chapters.entry(chapter.clone()).or_default();

            let previous = entry.markings.clone();
            let mut updated = previous.clone();

            match mutation {
                Mutation::SetLayers(entries) => {
                    for (coord, layer) in entries {
                        updated.set_layer(coord, layer, timestamp);
                    }
                }
                Mutation::ClearLayer(coord, kind) => updated.clear_layer(&coord, kind),
                Mutation::ClearVerse(verse) => updated.clear_verse(verse),
                Mutation::ClearSymbol(ref symbol) => updated.clear_symbol(symbol),
                Mutation::ClearChapter => updated = WordMarkings::new(),
            }

            if updated == previous {
                return None;
            }

            entry.history.record(previous.clone(), description.clone());
            entry.markings = updated.clone();

            (previous, updated)
        };

        let persisted = self.persist(chapter, &updated);

        if updated.is_empty() && !previous.is_empty() {
            self.probe_backup_later(chapter);
        }

        Some(MutationOutcome {
            description,
            persisted,
        })
    }

    /// Revert the most recent edit. Returns its label, or `None` when there
    /// is nothing to undo.
    pub fn undo(&self, chapter: &ChapterId) -> Option<MutationOutcome> {
        let (restored, description) = {
            let mut state = self.state.lock();
            let entry = state.chapters.get_mut(chapter)?;

            let record = entry.history.undo(entry.markings.clone())?;
            entry.markings = record.snapshot.clone();

            (record.snapshot, record.description)
        };

        let persisted = self.persist(chapter, &restored);

        Some(MutationOutcome {
            description,
            persisted,
        })
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&self, chapter: &ChapterId) -> Option<MutationOutcome> {
        let (restored, description) = {
            let mut state = self.state.lock();
            let entry = state.chapters.get_mut(chapter)?;

            let record = entry.history.redo(entry.markings.clone())?;
            entry.markings = record.snapshot.clone();

            (record.snapshot, record.description)
        };

        let persisted = self.persist(chapter, &restored);

        Some(MutationOutcome {
            description,
            persisted,
        })
    }

    /// Fold a pulled cloud copy into the chapter: local values win on every
    /// shared coordinate, the remote contributes only coordinates missing
    /// locally. Applies nothing when the chapter is no longer active or the
    /// remote contributes nothing. A contributing merge counts as a mutation
    /// for history purposes and is persisted locally, never echoed back out.
    pub fn merge_remote(&self, chapter: &ChapterId, mut remote: WordMarkings) -> bool {
        // An empty layer-set in the pulled map is not a contribution.
        remote.prune();

        let merged = {
            let mut state = self.state.lock();

            if state.active.as_ref() != Some(chapter) {
                debug!(%chapter, "discarding stale pull for an inactive chapter");
                return false;
            }

            let entry = state.chapters.entry(chapter.clone()).or_default();

            let contributes = remote
                .0
                .keys()
                .any(|coord| entry.markings.get(coord).is_none());

            if !contributes {
                return false;
            }

            let previous = entry.markings.clone();

            let mut merged = remote;
            for (coord, layers) in &previous.0 {
                drop(merged.0.insert(*coord, layers.clone()));
            }

            entry.history.record(previous, "Merged cloud copy");
            entry.markings = merged.clone();

            merged
        };

        if let Err(err) = self.local.save_markings(chapter, &merged) {
            warn!(%chapter, %err, "merged state not saved locally");
        }

        true
    }

    /// Restore the server-side pre-clear snapshot, applied as a normal
    /// undoable mutation. The snapshot is consumed server-side on success.
    pub async fn restore_from_backup(&self, chapter: &ChapterId) -> Result<Option<MutationOutcome>> {
        let Some(payload) = self.sync.restore_backup(chapter).await? else {
            return Ok(None);
        };

        let restored = {
            let mut state = self.state.lock();
            let entry = state.chapters.entry(chapter.clone()).or_default();

            entry
                .history
                .record(entry.markings.clone(), "Restored from backup");
            entry.markings = payload.value.clone();
            entry.backup_offer = None;

            payload.value
        };

        let persisted = self.persist(chapter, &restored);

        Ok(Some(MutationOutcome {
            description: "Restored from backup".to_owned(),
            persisted,
        }))
    }

    #[must_use]
    pub fn markings(&self, chapter: &ChapterId) -> WordMarkings {
        self.state
            .lock()
            .chapters
            .get(chapter)
            .map(|entry| entry.markings.clone())
            .unwrap_or_default()
    }

    /// Pre-clear snapshot the server reported as restorable, if any.
    #[must_use]
    pub fn backup_offer(&self, chapter: &ChapterId) -> Option<WordMarkings> {
        self.state
            .lock()
            .chapters
            .get(chapter)
            .and_then(|entry| entry.backup_offer.clone())
    }

    #[must_use]
    pub fn can_undo(&self, chapter: &ChapterId) -> bool {
        self.state
            .lock()
            .chapters
            .get(chapter)
            .is_some_and(|entry| entry.history.can_undo())
    }

    #[must_use]
    pub fn can_redo(&self, chapter: &ChapterId) -> bool {
        self.state
            .lock()
            .chapters
            .get(chapter)
            .is_some_and(|entry| entry.history.can_redo())
    }

    /// Save locally and schedule the debounced push. A failed save is
    /// reported once via the return value and never retried here.
    fn persist(&self, chapter: &ChapterId, markings: &WordMarkings) -> bool {
        let persisted = match self.local.save_markings(chapter, markings) {
            Ok(()) => true,
            Err(err) => {
                warn!(%chapter, %err, "local save failed, edit kept in memory");
                false
            }
        };

        self.sync.schedule_markings(chapter.clone(), markings.clone());

        persisted
    }

    /// After a clear, wait out the debounce so the remote clear lands, then
    /// ask whether the server kept a restorable snapshot.
    fn probe_backup_later(&self, chapter: &ChapterId) {
        let this = self.clone();
        let chapter = chapter.clone();

        drop(tokio::spawn(async move {
            if let Some(offer) = this.sync.probe_backup(&chapter).await {
                let mut state = this.state.lock();

                if let Some(entry) = state.chapters.get_mut(&chapter) {
                    entry.backup_offer = Some(offer.value);
                }
            }
        }));
    }
}
