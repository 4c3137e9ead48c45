//! In-memory device store

use super::DeviceStore;
use async_trait::async_trait;
use brewlink_shared::{DevicePatch, DeviceRecord, NewDeviceState, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A user's account: link flag plus device_id -> record
#[derive(Debug, Default)]
struct Account {
    linked: bool,
    devices: HashMap<String, DeviceRecord>,
}

/// Map of user_id -> account
type Accounts = HashMap<String, Account>;

/// Device store held in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    accounts: Arc<RwLock<Accounts>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a device record, creating the account if needed
    pub async fn insert(&self, user_id: &str, device_id: &str, record: DeviceRecord) {
        let mut accounts = self.accounts.write().await;
        accounts
            .entry(user_id.to_string())
            .or_default()
            .devices
            .insert(device_id.to_string(), record);
    }
}

fn account<'a>(accounts: &'a Accounts, user_id: &str) -> Result<&'a Account, StoreError> {
    accounts.get(user_id).ok_or_else(|| StoreError::UnknownUser {
        user: user_id.to_string(),
    })
}

fn account_mut<'a>(
    accounts: &'a mut Accounts,
    user_id: &str,
) -> Result<&'a mut Account, StoreError> {
    accounts.get_mut(user_id).ok_or_else(|| StoreError::UnknownUser {
        user: user_id.to_string(),
    })
}

fn record_mut<'a>(
    accounts: &'a mut Accounts,
    user_id: &str,
    device_id: &str,
) -> Result<&'a mut DeviceRecord, StoreError> {
    account_mut(accounts, user_id)?
        .devices
        .get_mut(device_id)
        .ok_or_else(|| StoreError::NotFound {
            user: user_id.to_string(),
            device: device_id.to_string(),
        })
}

#[async_trait]
impl DeviceStore for MemoryStore {
    async fn fetch(&self, user_id: &str, device_id: &str) -> Result<DeviceRecord, StoreError> {
        let accounts = self.accounts.read().await;
        account(&accounts, user_id)?
            .devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                user: user_id.to_string(),
                device: device_id.to_string(),
            })
    }

    async fn persist(
        &self,
        user_id: &str,
        device_id: &str,
        state: &NewDeviceState,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        record_mut(&mut accounts, user_id, device_id)?.state = state.clone();
        debug!("[STORE] Persisted {}/{}", user_id, device_id);
        Ok(())
    }

    async fn update(
        &self,
        user_id: &str,
        device_id: &str,
        patch: &DevicePatch,
    ) -> Result<DeviceRecord, StoreError> {
        let mut accounts = self.accounts.write().await;
        let record = record_mut(&mut accounts, user_id, device_id)?;
        record.apply(patch);
        debug!("[STORE] Updated {}/{}", user_id, device_id);
        Ok(record.clone())
    }

    async fn reset_user(&self, user_id: &str) -> Result<usize, StoreError> {
        let mut accounts = self.accounts.write().await;
        let devices = &mut account_mut(&mut accounts, user_id)?.devices;
        for record in devices.values_mut() {
            record.reset();
        }
        debug!("[STORE] Reset {} device(s) of {}", devices.len(), user_id);
        Ok(devices.len())
    }

    async fn devices(&self, user_id: &str) -> Result<Vec<(String, DeviceRecord)>, StoreError> {
        let accounts = self.accounts.read().await;
        let mut devices: Vec<_> = account(&accounts, user_id)?
            .devices
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();
        devices.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(devices)
    }

    async fn set_linked(&self, user_id: &str, linked: bool) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        account_mut(&mut accounts, user_id)?.linked = linked;
        debug!("[STORE] {} linked={}", user_id, linked);
        Ok(())
    }

    async fn is_linked(&self, user_id: &str) -> Result<bool, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(account(&accounts, user_id)?.linked)
    }
}
