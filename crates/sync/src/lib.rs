//! Background reconciliation between the local annotation cache and the
//! remote service.
//!
//! Writes are debounced per resource: a burst of edits to one chapter
//! collapses into a single push carrying the final state. Reads are
//! best-effort, a dead network degrades to local-only operation instead of
//! surfacing errors to the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use versemark_primitives::chapter::ChapterId;
use versemark_primitives::common::now_ms;
use versemark_primitives::markings::WordMarkings;
use versemark_primitives::owner::DeviceId;
use versemark_server_primitives::RecordPayload;
use versemark_store::{Column, Store};

pub use crate::remote::{RemoteStore, SingletonKind};

mod remote;

/// Quiet period before a scheduled push actually fires. Every reschedule of
/// the same resource restarts the clock.
pub const DEBOUNCE: Duration = Duration::from_millis(800);

/// How long after a destructive clear the coordinator waits before asking
/// the server whether a restorable snapshot exists.
pub const BACKUP_PROBE_DELAY: Duration = Duration::from_secs(2);

/// One debounce slot. Each resource coalesces independently.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ResourceKey {
    Markings(ChapterId),
    Notes(ChapterId),
    Singleton(SingletonKind),
}

#[derive(Clone, Debug)]
enum PushPayload {
    Markings(ChapterId, WordMarkings),
    Notes(ChapterId, Value),
    Singleton(SingletonKind, Value),
}

/// One scheduled push waiting out its debounce window. The generation ties
/// the slot entry to the task that owns it, so a finished task never clears
/// a successor's entry.
#[derive(Debug)]
struct PendingPush {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Debouncing push scheduler plus best-effort pull frontend over a remote
/// store.
#[derive(Debug)]
pub struct SyncCoordinator<R> {
    remote: Arc<R>,
    generation: Arc<AtomicU64>,
    pending: Arc<Mutex<HashMap<ResourceKey, PendingPush>>>,
}

impl<R> Clone for SyncCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            generation: Arc::clone(&self.generation),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<R: RemoteStore> SyncCoordinator<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote: Arc::new(remote),
            generation: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn schedule_markings(&self, chapter: ChapterId, markings: WordMarkings) {
        self.schedule(
            ResourceKey::Markings(chapter.clone()),
            PushPayload::Markings(chapter, markings),
        );
    }

    pub fn schedule_notes(&self, chapter: ChapterId, value: Value) {
        self.schedule(
            ResourceKey::Notes(chapter.clone()),
            PushPayload::Notes(chapter, value),
        );
    }

    pub fn schedule_singleton(&self, kind: SingletonKind, value: Value) {
        self.schedule(
            ResourceKey::Singleton(kind),
            PushPayload::Singleton(kind, value),
        );
    }

    /// Number of pushes still waiting out their debounce window.
    #[must_use]
    pub fn pending_pushes(&self) -> usize {
        self.pending.lock().len()
    }

    fn schedule(&self, key: ResourceKey, payload: PushPayload) {
        let remote = Arc::clone(&self.remote);
        let pending = Arc::clone(&self.pending);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let slot = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;

            if let Err(err) = push(&*remote, payload).await {
                // Swallowed: the local cache stays authoritative and the
                // next edit reschedules the push.
                debug!(?slot, %err, "background push failed");
            }

            // The slot may already hold a successor scheduled after this
            // task passed its abort point; only the owner clears it.
            let mut pending = pending.lock();
            if pending
                .get(&slot)
                .is_some_and(|entry| entry.generation == generation)
            {
                drop(pending.remove(&slot));
            }
        });

        let superseded = self
            .pending
            .lock()
            .insert(key, PendingPush { generation, handle });

        if let Some(superseded) = superseded {
            superseded.handle.abort();
        }
    }

    /// Fetch the remote chapter state, or `None` when the server has nothing
    /// or cannot be reached.
    pub async fn pull_markings(&self, chapter: &ChapterId) -> Option<RecordPayload<WordMarkings>> {
        match self.remote.fetch_markings(chapter).await {
            Ok(payload) => payload,
            Err(err) => {
                debug!(%chapter, %err, "markings pull failed, staying local");
                None
            }
        }
    }

    pub async fn pull_notes(&self, chapter: &ChapterId) -> Option<RecordPayload<Value>> {
        match self.remote.fetch_notes(chapter).await {
            Ok(payload) => payload,
            Err(err) => {
                debug!(%chapter, %err, "notes pull failed, staying local");
                None
            }
        }
    }

    pub async fn pull_singleton(&self, kind: SingletonKind) -> Option<RecordPayload<Value>> {
        match self.remote.fetch_singleton(kind).await {
            Ok(payload) => payload,
            Err(err) => {
                debug!(?kind, %err, "singleton pull failed, staying local");
                None
            }
        }
    }

    /// Wait out [`BACKUP_PROBE_DELAY`], then ask whether the server kept a
    /// snapshot of the chapter that was just cleared.
    pub async fn probe_backup(&self, chapter: &ChapterId) -> Option<RecordPayload<WordMarkings>> {
        tokio::time::sleep(BACKUP_PROBE_DELAY).await;

        match self.remote.fetch_backup(chapter).await {
            Ok(payload) => payload,
            Err(err) => {
                debug!(%chapter, %err, "backup probe failed");
                None
            }
        }
    }

    pub async fn restore_backup(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>> {
        self.remote.restore_backup(chapter).await
    }

    /// Attach this device's anonymous server rows to the signed-in account,
    /// at most once per device.
    ///
    /// A marker in the local meta column records a completed claim; until it
    /// exists every sign-in retries. Returns whether a claim ran.
    pub async fn ensure_claimed(&self, local: &Store, device_id: &DeviceId) -> Result<bool> {
        let marker = claim_marker_key(device_id);

        if local.has(Column::Meta, &marker)? {
            return Ok(false);
        }

        let reassigned = self.remote.claim_device(device_id.clone()).await?;

        info!(%device_id, reassigned, "claimed device rows for account");

        local.put_json(Column::Meta, &marker, &now_ms())?;

        Ok(true)
    }
}

fn claim_marker_key(device_id: &DeviceId) -> Vec<u8> {
    format!("claimed/{device_id}").into_bytes()
}

async fn push<R: RemoteStore>(remote: &R, payload: PushPayload) -> Result<()> {
    match payload {
        PushPayload::Markings(chapter, markings) => {
            drop(remote.push_markings(&chapter, markings).await?);
        }
        PushPayload::Notes(chapter, value) => {
            drop(remote.push_notes(&chapter, value).await?);
        }
        PushPayload::Singleton(kind, value) => {
            drop(remote.push_singleton(kind, value).await?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use eyre::bail;
    use versemark_primitives::chapter::WordCoord;
    use versemark_primitives::markings::LayerValue;

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        markings_pushes: StdMutex<Vec<(ChapterId, WordMarkings)>>,
        claim_calls: StdMutex<u32>,
        offline: bool,
        backup: Option<WordMarkings>,
    }

    #[async_trait]
    impl RemoteStore for Arc<Recorder> {
        async fn fetch_markings(
            &self,
            _chapter: &ChapterId,
        ) -> Result<Option<RecordPayload<WordMarkings>>> {
            if self.offline {
                bail!("connection refused");
            }

            Ok(None)
        }

        async fn push_markings(&self, chapter: &ChapterId, markings: WordMarkings) -> Result<u64> {
            self.markings_pushes
                .lock()
                .unwrap()
                .push((chapter.clone(), markings));

            Ok(1)
        }

        async fn fetch_backup(
            &self,
            _chapter: &ChapterId,
        ) -> Result<Option<RecordPayload<WordMarkings>>> {
            Ok(self.backup.clone().map(|value| RecordPayload {
                value,
                updated_at: 1,
            }))
        }

        async fn restore_backup(
            &self,
            chapter: &ChapterId,
        ) -> Result<Option<RecordPayload<WordMarkings>>> {
            self.fetch_backup(chapter).await
        }

        async fn fetch_notes(&self, _chapter: &ChapterId) -> Result<Option<RecordPayload<Value>>> {
            Ok(None)
        }

        async fn push_notes(&self, _chapter: &ChapterId, _value: Value) -> Result<u64> {
            Ok(1)
        }

        async fn fetch_singleton(
            &self,
            _kind: SingletonKind,
        ) -> Result<Option<RecordPayload<Value>>> {
            Ok(None)
        }

        async fn push_singleton(&self, _kind: SingletonKind, _value: Value) -> Result<u64> {
            Ok(1)
        }

        async fn claim_device(&self, _device_id: DeviceId) -> Result<u64> {
            if self.offline {
                bail!("connection refused");
            }

            *self.claim_calls.lock().unwrap() += 1;

            Ok(3)
        }
    }

    fn markings_with(verse: u32, word: u32, color: &str) -> WordMarkings {
        let mut markings = WordMarkings::new();
        markings.set_layer(
            WordCoord::new(verse, word),
            LayerValue::Highlight(color.into()),
            1,
        );
        markings
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_collapses_into_one_push() {
        let recorder = Arc::new(Recorder::default());
        let coordinator = SyncCoordinator::new(Arc::clone(&recorder));

        let chapter = ChapterId::new("KJV", 43, 3);

        coordinator.schedule_markings(chapter.clone(), markings_with(1, 1, "yellow"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        coordinator.schedule_markings(chapter.clone(), markings_with(1, 1, "blue"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        let last = markings_with(2, 5, "#ff0000");
        coordinator.schedule_markings(chapter.clone(), last.clone());

        tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;

        let pushes = recorder.markings_pushes.lock().unwrap();
        assert_eq!(pushes.len(), 1, "burst must coalesce to one push");
        assert_eq!(pushes[0], (chapter, last), "latest state wins");
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_resources_debounce_independently() {
        let recorder = Arc::new(Recorder::default());
        let coordinator = SyncCoordinator::new(Arc::clone(&recorder));

        let john = ChapterId::new("KJV", 43, 3);
        let genesis = ChapterId::new("KJV", 1, 1);

        coordinator.schedule_markings(john.clone(), markings_with(1, 1, "yellow"));
        coordinator.schedule_markings(genesis.clone(), markings_with(2, 2, "blue"));

        tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;

        let pushes = recorder.markings_pushes.lock().unwrap();
        assert_eq!(pushes.len(), 2, "each chapter pushes once");
        assert_eq!(coordinator.pending_pushes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slot_survives_completed_push_then_coalesces_again() {
        let recorder = Arc::new(Recorder::default());
        let coordinator = SyncCoordinator::new(Arc::clone(&recorder));

        let chapter = ChapterId::new("KJV", 43, 3);

        let first = markings_with(1, 1, "yellow");
        coordinator.schedule_markings(chapter.clone(), first.clone());
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;
        assert_eq!(coordinator.pending_pushes(), 0, "finished push clears its slot");

        // A new burst reuses the same slot; the finished task from the first
        // round must not have evicted it.
        coordinator.schedule_markings(chapter.clone(), markings_with(2, 2, "blue"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        let last = markings_with(3, 3, "#00ff00");
        coordinator.schedule_markings(chapter.clone(), last.clone());

        tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;

        let pushes = recorder.markings_pushes.lock().unwrap();
        assert_eq!(pushes.len(), 2, "one push per burst");
        assert_eq!(pushes[0], (chapter.clone(), first));
        assert_eq!(pushes[1], (chapter, last), "second burst coalesces to its latest state");
        assert_eq!(coordinator.pending_pushes(), 0);
    }

    #[tokio::test]
    async fn pull_swallows_transport_failure() {
        let recorder = Arc::new(Recorder {
            offline: true,
            ..Recorder::default()
        });
        let coordinator = SyncCoordinator::new(Arc::clone(&recorder));

        let chapter = ChapterId::new("KJV", 43, 3);
        assert!(coordinator.pull_markings(&chapter).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn backup_probe_waits_then_reports_offer() {
        let recorder = Arc::new(Recorder {
            backup: Some(markings_with(1, 1, "yellow")),
            ..Recorder::default()
        });
        let coordinator = SyncCoordinator::new(Arc::clone(&recorder));

        let chapter = ChapterId::new("KJV", 43, 3);
        let offer = coordinator.probe_backup(&chapter).await;
        assert_eq!(offer.unwrap().value, markings_with(1, 1, "yellow"));
    }

    #[tokio::test]
    async fn claim_runs_once_then_is_marked_done() {
        let recorder = Arc::new(Recorder::default());
        let coordinator = SyncCoordinator::new(Arc::clone(&recorder));

        let local = Store::in_memory();
        let device_id = DeviceId::new("dev1").unwrap();

        assert!(coordinator.ensure_claimed(&local, &device_id).await.unwrap());
        assert!(!coordinator.ensure_claimed(&local, &device_id).await.unwrap());
        assert_eq!(*recorder.claim_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_claim_leaves_no_marker() {
        let recorder = Arc::new(Recorder {
            offline: true,
            ..Recorder::default()
        });
        let coordinator = SyncCoordinator::new(Arc::clone(&recorder));

        let local = Store::in_memory();
        let device_id = DeviceId::new("dev1").unwrap();

        assert!(coordinator.ensure_claimed(&local, &device_id).await.is_err());
        assert!(!local
            .has(Column::Meta, &claim_marker_key(&device_id))
            .unwrap());
    }
}
