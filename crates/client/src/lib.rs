//! Typed HTTP client for the annotation service.
//!
//! One method per remote operation, each returning the unwrapped `data`
//! payload. The connection layer handles the device header, session cookies
//! and error mapping.

use eyre::Result;
use serde_json::Value;
use url::Url;
use versemark_primitives::chapter::ChapterId;
use versemark_primitives::markings::WordMarkings;
use versemark_primitives::owner::DeviceId;
use versemark_server_primitives::{
    ClaimDeviceRequest, ClaimDeviceResponse, DeleteAccountResponse, GetBackupResponse,
    GetMarkingsResponse, GetValueResponse, PutMarkingsRequest, PutRecordResponse, PutValueRequest,
    RecordPayload, RestoreBackupResponse,
};

pub use crate::connection::ConnectionInfo;

mod connection;

fn chapter_path(chapter: &ChapterId, resource: &str) -> String {
    format!(
        "/annotations/{}/{}/{}/{resource}",
        chapter.translation, chapter.book, chapter.chapter
    )
}

#[derive(Clone, Debug)]
pub struct Client {
    connection: ConnectionInfo,
}

impl Client {
    /// Connect as an anonymous device. Every request carries the device
    /// token until an account session replaces it.
    pub fn new(api_url: Url, device_id: DeviceId) -> Result<Self> {
        Ok(Self {
            connection: ConnectionInfo::new(api_url, Some(device_id))?,
        })
    }

    /// Connect without any owner credential. Only useful once the session
    /// cookie has been established out of band.
    pub fn without_device(api_url: Url) -> Result<Self> {
        Ok(Self {
            connection: ConnectionInfo::new(api_url, None)?,
        })
    }

    pub async fn get_markings(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>> {
        let response: GetMarkingsResponse =
            self.connection.get(&chapter_path(chapter, "markings")).await?;

        Ok(response.data)
    }

    /// Push the full chapter map, replacing whatever the server holds.
    /// Returns the server-side write timestamp.
    pub async fn put_markings(&self, chapter: &ChapterId, markings: WordMarkings) -> Result<u64> {
        let response: PutRecordResponse = self
            .connection
            .put(
                &chapter_path(chapter, "markings"),
                PutMarkingsRequest::new(markings),
            )
            .await?;

        Ok(response.data.updated_at)
    }

    pub async fn get_markings_backup(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>> {
        let response: GetBackupResponse = self
            .connection
            .get(&chapter_path(chapter, "markings/backup"))
            .await?;

        Ok(response.data)
    }

    /// Restore the pre-clear snapshot. The snapshot is consumed server-side
    /// on success.
    pub async fn restore_markings_backup(
        &self,
        chapter: &ChapterId,
    ) -> Result<Option<RecordPayload<WordMarkings>>> {
        let response: RestoreBackupResponse = self
            .connection
            .post(&chapter_path(chapter, "markings/restore"), None::<()>)
            .await?;

        Ok(response.data)
    }

    pub async fn get_notes(&self, chapter: &ChapterId) -> Result<Option<RecordPayload<Value>>> {
        let response: GetValueResponse =
            self.connection.get(&chapter_path(chapter, "notes")).await?;

        Ok(response.data)
    }

    pub async fn put_notes(&self, chapter: &ChapterId, value: Value) -> Result<u64> {
        let response: PutRecordResponse = self
            .connection
            .put(&chapter_path(chapter, "notes"), PutValueRequest::new(value))
            .await?;

        Ok(response.data.updated_at)
    }

    pub async fn get_palette(&self) -> Result<Option<RecordPayload<Value>>> {
        let response: GetValueResponse = self.connection.get("/palette").await?;

        Ok(response.data)
    }

    pub async fn put_palette(&self, value: Value) -> Result<u64> {
        let response: PutRecordResponse = self
            .connection
            .put("/palette", PutValueRequest::new(value))
            .await?;

        Ok(response.data.updated_at)
    }

    pub async fn get_word_memory(&self) -> Result<Option<RecordPayload<Value>>> {
        let response: GetValueResponse = self.connection.get("/word-memory").await?;

        Ok(response.data)
    }

    pub async fn put_word_memory(&self, value: Value) -> Result<u64> {
        let response: PutRecordResponse = self
            .connection
            .put("/word-memory", PutValueRequest::new(value))
            .await?;

        Ok(response.data.updated_at)
    }

    pub async fn get_preferences(&self) -> Result<Option<RecordPayload<Value>>> {
        let response: GetValueResponse = self.connection.get("/preferences").await?;

        Ok(response.data)
    }

    pub async fn put_preferences(&self, value: Value) -> Result<u64> {
        let response: PutRecordResponse = self
            .connection
            .put("/preferences", PutValueRequest::new(value))
            .await?;

        Ok(response.data.updated_at)
    }

    /// Attach the given device's anonymous rows to the signed-in account.
    /// Returns how many rows were moved; zero on a repeat call.
    pub async fn claim_device(&self, device_id: DeviceId) -> Result<u64> {
        let response: ClaimDeviceResponse = self
            .connection
            .post("/devices/claim", Some(ClaimDeviceRequest::new(device_id)))
            .await?;

        Ok(response.data.reassigned)
    }

    pub async fn delete_account(&self) -> Result<u64> {
        let response: DeleteAccountResponse = self.connection.delete("/account").await?;

        Ok(response.data.deleted)
    }
}
