//! In-memory doubles for controller and handler tests

use super::Actuator;
use crate::transport::{Advertisement, ApplianceCharacteristics, BleCentral, DisconnectSignal};
use async_trait::async_trait;
use brewlink_shared::gatt::{CharacteristicPath, GattProfile};
use brewlink_shared::{ControllerError, LinkError};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};
use tokio::time::Instant;

/// Adapter operations recorded by [`FakeCentral`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PowerOn,
    StartScan,
    Connect,
    Resolve,
    /// Characteristic role and payload
    Write(&'static str, Vec<u8>),
    Disconnect,
}

/// Scripted BLE central
///
/// Peripherals are their addresses and characteristics are their role names.
pub struct FakeCentral {
    advertisements: Vec<String>,
    seen: Arc<AtomicUsize>,
    calls: Mutex<Vec<(Call, Instant)>>,
    exposed: Mutex<Vec<CharacteristicPath>>,
    hold_resolve: AtomicBool,
    resolve_entered: Notify,
    refuse_connect: AtomicBool,
    failing_write: Mutex<Option<&'static str>>,
    command_written: Notify,
    link: Mutex<Option<oneshot::Sender<()>>>,
}

impl FakeCentral {
    pub fn new(advertisements: Vec<String>) -> Self {
        let profile = GattProfile::default();
        Self {
            advertisements,
            seen: Arc::new(AtomicUsize::new(0)),
            calls: Mutex::new(Vec::new()),
            exposed: Mutex::new(vec![profile.auth, profile.command]),
            hold_resolve: AtomicBool::new(false),
            resolve_entered: Notify::new(),
            refuse_connect: AtomicBool::new(false),
            failing_write: Mutex::new(None),
            command_written: Notify::new(),
            link: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.timeline().into_iter().map(|(call, _)| call).collect()
    }

    pub fn timeline(&self) -> Vec<(Call, Instant)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Last payload written to a characteristic role
    pub fn written(&self, role: &str) -> Option<Vec<u8>> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::Write(written_role, data) if written_role == role => Some(data),
            _ => None,
        })
    }

    /// Advertisements pulled from the scan stream so far
    pub fn seen(&self) -> usize {
        self.seen.load(Ordering::SeqCst)
    }

    /// Park service discovery until the link drops
    pub fn hold_resolve(&self, hold: bool) {
        self.hold_resolve.store(hold, Ordering::SeqCst);
    }

    /// Wait until a connection has reached service discovery
    pub async fn resolve_entered(&self) {
        self.resolve_entered.notified().await;
    }

    pub fn hide_command_characteristic(&self) {
        let command = GattProfile::default().command;
        self.exposed
            .lock()
            .expect("exposed lock poisoned")
            .retain(|path| *path != command);
    }

    pub fn refuse_connect(&self) {
        self.refuse_connect.store(true, Ordering::SeqCst);
    }

    /// Reject every write to a characteristic role
    pub fn fail_write(&self, role: &'static str) {
        *self.failing_write.lock().expect("write lock poisoned") = Some(role);
    }

    /// Wait until the brew command has been written
    pub async fn command_written(&self) {
        self.command_written.notified().await;
    }

    /// Simulate the appliance dropping the open link
    pub fn drop_link(&self) {
        if let Some(tx) = self.link.lock().expect("link lock poisoned").take() {
            let _ = tx.send(());
        }
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((call, Instant::now()));
    }

    fn lookup(&self, wanted: &CharacteristicPath) -> Result<&'static str, LinkError> {
        let exposed = self.exposed.lock().expect("exposed lock poisoned");
        let profile = GattProfile::default();
        exposed
            .iter()
            .find(|path| wanted.matches(&path.service, &path.characteristic))
            .map(|path| if *path == profile.auth { "auth" } else { "command" })
            .ok_or_else(|| LinkError::CharacteristicNotFound {
                service: wanted.service.clone(),
                characteristic: wanted.characteristic.clone(),
            })
    }
}

#[async_trait]
impl BleCentral for FakeCentral {
    type Peripheral = String;
    type Characteristic = &'static str;

    async fn power_on(&self) -> Result<(), LinkError> {
        self.record(Call::PowerOn);
        Ok(())
    }

    async fn start_scan(&self) -> Result<BoxStream<'static, Advertisement<String>>, LinkError> {
        self.record(Call::StartScan);
        let seen = self.seen.clone();
        let advertisements = stream::iter(self.advertisements.clone())
            .inspect(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .map(|address| Advertisement {
                peripheral: address.clone(),
                address,
            });
        Ok(advertisements.boxed())
    }

    async fn connect(&self, _peripheral: &String) -> Result<DisconnectSignal, LinkError> {
        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(LinkError::Connect("refused".into()));
        }
        self.record(Call::Connect);
        let (tx, rx) = oneshot::channel();
        *self.link.lock().expect("link lock poisoned") = Some(tx);
        Ok(Box::pin(async move {
            let _ = rx.await;
        }))
    }

    async fn resolve(
        &self,
        _peripheral: &String,
        profile: &GattProfile,
    ) -> Result<ApplianceCharacteristics<&'static str>, LinkError> {
        self.record(Call::Resolve);
        self.resolve_entered.notify_one();
        if self.hold_resolve.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        Ok(ApplianceCharacteristics {
            auth: self.lookup(&profile.auth)?,
            command: self.lookup(&profile.command)?,
        })
    }

    async fn write(&self, characteristic: &&'static str, data: &[u8]) -> Result<(), LinkError> {
        let role = *characteristic;
        if *self.failing_write.lock().expect("write lock poisoned") == Some(role) {
            return Err(LinkError::Write(format!("{} rejected", role)));
        }
        self.record(Call::Write(role, data.to_vec()));
        if role == "command" {
            self.command_written.notify_one();
        }
        Ok(())
    }

    async fn disconnect(&self, _peripheral: &String) -> Result<(), LinkError> {
        self.record(Call::Disconnect);
        self.drop_link();
        Ok(())
    }
}

/// Actuator that records presets instead of touching an appliance
#[derive(Default)]
pub struct RecordingActuator {
    presets: Mutex<Vec<Option<String>>>,
    failure: Mutex<Option<ControllerError>>,
}

impl RecordingActuator {
    pub fn failing(error: ControllerError) -> Self {
        Self {
            presets: Mutex::new(Vec::new()),
            failure: Mutex::new(Some(error)),
        }
    }

    pub fn presets(&self) -> Vec<Option<String>> {
        self.presets.lock().expect("presets lock poisoned").clone()
    }
}

#[async_trait]
impl Actuator for RecordingActuator {
    async fn actuate(&self, food_preset: Option<&str>) -> Result<(), ControllerError> {
        self.presets
            .lock()
            .expect("presets lock poisoned")
            .push(food_preset.map(str::to_string));
        match self.failure.lock().expect("failure lock poisoned").clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
