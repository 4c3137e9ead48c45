//! Device state storage and reporting
//!
//! The bridge keeps one record per (user, device). Storage and the report
//! channel back to the voice platform are collaborators behind traits so
//! the handlers can run against memory in tests.

mod memory;
mod reporter;

pub use memory::MemoryStore;
pub use reporter::{LogReporter, StateReporter};
#[cfg(test)]
pub use reporter::testing::RecordingReporter;

use async_trait::async_trait;
use brewlink_shared::{DevicePatch, DeviceRecord, NewDeviceState, StoreError};

/// Persistent device records keyed by user and device
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Read a record; `StoreError::UnknownUser` or `StoreError::NotFound`
    /// if either half of the pair is unknown
    async fn fetch(&self, user_id: &str, device_id: &str) -> Result<DeviceRecord, StoreError>;

    /// Replace the runtime state of an existing record
    async fn persist(
        &self,
        user_id: &str,
        device_id: &str,
        state: &NewDeviceState,
    ) -> Result<(), StoreError>;

    /// Apply a partial update and return the resulting record
    async fn update(
        &self,
        user_id: &str,
        device_id: &str,
        patch: &DevicePatch,
    ) -> Result<DeviceRecord, StoreError>;

    /// Reset every device of a user; returns how many were reset
    async fn reset_user(&self, user_id: &str) -> Result<usize, StoreError>;

    /// Every device of a user, ordered by device id
    async fn devices(&self, user_id: &str) -> Result<Vec<(String, DeviceRecord)>, StoreError>;

    /// Record whether the user's account is linked to the voice platform
    async fn set_linked(&self, user_id: &str, linked: bool) -> Result<(), StoreError>;

    async fn is_linked(&self, user_id: &str) -> Result<bool, StoreError>;
}
