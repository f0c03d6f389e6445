use serde_json::Value;
use versemark_primitives::owner::{DeviceId, UserId};
use versemark_store::{Column, Store};

use super::{devices, Record};

/// Resource families a device can own rows in. Preferences are account-only
/// and never exist under a device scope.
const CLAIMABLE: [Column; 4] = [
    Column::Markings,
    Column::Notes,
    Column::Palette,
    Column::WordMemory,
];

/// Reassign every row owned by `device_id` to `user_id`, touching only rows
/// whose account owner is currently unset.
///
/// Safe to run repeatedly: the first run stamps every unclaimed row, so a
/// second run finds nothing left to move.
pub fn claim_device(store: &Store, device_id: &DeviceId, user_id: &UserId) -> eyre::Result<u64> {
    let source_scope = format!("d:{device_id}");
    let dest_scope = format!("u:{user_id}");

    let mut reassigned = 0_u64;

    for col in CLAIMABLE {
        for (key, raw) in store.scan_prefix(col, source_scope.as_bytes())? {
            // A device id may be a prefix of another; accept only exact scope
            // matches and chapter keys under it.
            let suffix = &key[source_scope.len()..];
            if !(suffix.is_empty() || suffix.starts_with(b"/")) {
                continue;
            }

            let mut record: Record<Value> = serde_json::from_slice(&raw)?;

            if record.claimed_by.is_some() {
                continue;
            }

            record.claimed_by = Some(user_id.clone());

            let dest_key = [dest_scope.as_bytes(), suffix].concat();

            // A row already present under the account scope is owned; it is
            // never replaced and does not count as a reassignment.
            if !store.has(col, &dest_key)? {
                store.put_json(col, &dest_key, &record)?;

                reassigned = reassigned.saturating_add(1);
            }

            // The source row is stamped either way so reruns skip it.
            store.put_json(col, &key, &record)?;
        }
    }

    devices::mark_claimed(store, device_id, user_id)?;

    Ok(reassigned)
}
