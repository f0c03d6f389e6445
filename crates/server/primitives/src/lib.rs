//! Request/response payload types shared by the annotation server and the
//! client. Every response wraps its payload in a `data` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use versemark_primitives::markings::WordMarkings;
use versemark_primitives::owner::DeviceId;

/// Name of the header carrying the anonymous device token.
pub const DEVICE_ID_HEADER: &str = "x-versemark-device";

/// Session key holding the authenticated account id.
pub const SESSION_USER_KEY: &str = "user_id";

/// A stored resource value together with its advisory write timestamp.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload<T> {
    pub value: T,
    pub updated_at: u64,
}

// ---------------------------------- Markings ----------------------------------

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMarkingsResponse {
    pub data: Option<RecordPayload<WordMarkings>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutMarkingsRequest {
    pub markings: WordMarkings,
}

impl PutMarkingsRequest {
    #[must_use]
    pub const fn new(markings: WordMarkings) -> Self {
        Self { markings }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRecordResponse {
    pub data: PutRecordResponseData,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRecordResponseData {
    pub updated_at: u64,
}

impl PutRecordResponse {
    #[must_use]
    pub const fn new(updated_at: u64) -> Self {
        Self {
            data: PutRecordResponseData { updated_at },
        }
    }
}

// ----------------------------------- Backup -----------------------------------

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBackupResponse {
    pub data: Option<RecordPayload<WordMarkings>>,
}

/// Restore consumes the snapshot: a successful response means it no longer
/// exists server-side.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreBackupResponse {
    pub data: Option<RecordPayload<WordMarkings>>,
}

// --------------------------- Singleton JSON resources ---------------------------

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetValueResponse {
    pub data: Option<RecordPayload<Value>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutValueRequest {
    pub value: Value,
}

impl PutValueRequest {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self { value }
    }
}

// ---------------------------------- Claiming ----------------------------------

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDeviceRequest {
    pub device_id: DeviceId,
}

impl ClaimDeviceRequest {
    #[must_use]
    pub const fn new(device_id: DeviceId) -> Self {
        Self { device_id }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDeviceResponse {
    pub data: ClaimDeviceResponseData,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDeviceResponseData {
    /// Rows moved to the account scope by this call.
    pub reassigned: u64,
}

impl ClaimDeviceResponse {
    #[must_use]
    pub const fn new(reassigned: u64) -> Self {
        Self {
            data: ClaimDeviceResponseData { reassigned },
        }
    }
}

// ----------------------------------- Account -----------------------------------

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponse {
    pub data: DeleteAccountResponseData,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponseData {
    pub deleted: u64,
}

impl DeleteAccountResponse {
    #[must_use]
    pub const fn new(deleted: u64) -> Self {
        Self {
            data: DeleteAccountResponseData { deleted },
        }
    }
}
