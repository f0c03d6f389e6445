use serde::{Deserialize, Serialize};
use versemark_primitives::common::now_ms;
use versemark_primitives::owner::{DeviceId, UserId};
use versemark_store::{Column, Store};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub first_seen: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<UserId>,
}

/// Insert-if-absent registration, performed on first reference to an unseen
/// device id.
pub fn register_device(store: &Store, device_id: &DeviceId) -> eyre::Result<()> {
    let key = device_id.as_str().as_bytes();

    if store.has(Column::Devices, key)? {
        return Ok(());
    }

    let record = DeviceRecord {
        first_seen: now_ms(),
        claimed_by: None,
    };

    store.put_json(Column::Devices, key, &record)
}

pub fn get_device(store: &Store, device_id: &DeviceId) -> eyre::Result<Option<DeviceRecord>> {
    store.get_json(Column::Devices, device_id.as_str().as_bytes())
}

/// Stamp the registry entry once a claim has run. Leaves an already-set
/// claimant alone.
pub fn mark_claimed(store: &Store, device_id: &DeviceId, user_id: &UserId) -> eyre::Result<()> {
    let key = device_id.as_str().as_bytes();

    let mut record = get_device(store, device_id)?.unwrap_or(DeviceRecord {
        first_seen: now_ms(),
        claimed_by: None,
    });

    if record.claimed_by.is_none() {
        record.claimed_by = Some(user_id.clone());
        store.put_json(Column::Devices, key, &record)?;
    }

    Ok(())
}
