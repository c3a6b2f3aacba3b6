use serde::{Deserialize, Serialize};

/// Persisted shape of `device_id.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceRecord {
    pub id: String,
}

impl DeviceRecord {
    /// Any non-empty id is kept as stored, whitespace included, so records
    /// already tagged with it stay attributable.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
    }
}
