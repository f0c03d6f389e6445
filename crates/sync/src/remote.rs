//! The remote operations the coordinator needs, abstracted so tests can
//! substitute an in-process double for the HTTP client.

use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;
use versemark_client::Client;
use versemark_primitives::chapter::ChapterId;
use versemark_primitives::markings::WordMarkings;
use versemark_primitives::owner::DeviceId;
use versemark_server_primitives::RecordPayload;

/// A singleton resource stored once per owner rather than per chapter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SingletonKind {
    Palette,
    WordMemory,
    Preferences,
}

#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn fetch_markings(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>>;

    async fn push_markings(&self, chapter: &ChapterId, markings: WordMarkings) -> Result<u64>;

    async fn fetch_backup(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>>;

    async fn restore_backup(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>>;

    async fn fetch_notes(&self, chapter: &ChapterId) -> Result<Option<RecordPayload<Value>>>;

    async fn push_notes(&self, chapter: &ChapterId, value: Value) -> Result<u64>;

    async fn fetch_singleton(&self, kind: SingletonKind) -> Result<Option<RecordPayload<Value>>>;

    async fn push_singleton(&self, kind: SingletonKind, value: Value) -> Result<u64>;

    async fn claim_device(&self, device_id: DeviceId) -> Result<u64>;
}

#[async_trait]
impl RemoteStore for Client {
    async fn fetch_markings(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>> {
        self.get_markings(chapter).await
    }

    async fn push_markings(&self, chapter: &ChapterId, markings: WordMarkings) -> Result<u64> {
        self.put_markings(chapter, markings).await
    }

    async fn fetch_backup(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>> {
        self.get_markings_backup(chapter).await
    }

    async fn restore_backup(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>> {
        self.restore_markings_backup(chapter).await
    }

    async fn fetch_notes(&self, chapter: &ChapterId) -> Result<Option<RecordPayload<Value>>> {
        self.get_notes(chapter).await
    }

    async fn push_notes(&self, chapter: &ChapterId, value: Value) -> Result<u64> {
        self.put_notes(chapter, value).await
    }

    async fn fetch_singleton(&self, kind: SingletonKind) -> Result<Option<RecordPayload<Value>>> {
        match kind {
            SingletonKind::Palette => self.get_palette().await,
            SingletonKind::WordMemory => self.get_word_memory().await,
            SingletonKind::Preferences => self.get_preferences().await,
        }
    }

    async fn push_singleton(&self, kind: SingletonKind, value: Value) -> Result<u64> {
        match kind {
            SingletonKind::Palette => self.put_palette(value).await,
            SingletonKind::WordMemory => self.put_word_memory(value).await,
            SingletonKind::Preferences => self.put_preferences(value).await,
        }
    }

    async fn claim_device(&self, device_id: DeviceId) -> Result<u64> {
        Self::claim_device(self, device_id).await
    }
}
