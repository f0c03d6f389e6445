use versemark_server_primitives::RecordPayload;

use crate::storage::Record;

pub mod account;
pub mod backup;
pub mod claim;
pub mod markings;
pub mod resources;

fn payload<T>(record: Record<T>) -> RecordPayload<T> {
    RecordPayload {
        value: record.value,
        updated_at: record.updated_at,
    }
}
