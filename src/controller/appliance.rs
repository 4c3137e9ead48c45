//! Link choreography for one appliance

use super::Actuator;
use crate::transport::BleCentral;
use async_trait::async_trait;
use brewlink_shared::encoder::{CommandBuffer, Temperature, Volume};
use brewlink_shared::gatt::GattProfile;
use brewlink_shared::state_machine::{LinkEvent, LinkState, LinkStateMachine, TransitionResult};
use brewlink_shared::{address, appliance, timing, AuthKey, ControllerError, LinkError};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

/// Configuration for the appliance controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Hardware address to look for, in any common rendering
    pub appliance_address: String,
    pub auth_key: AuthKey,
    /// GATT identifiers rendered for the host stack
    pub profile: GattProfile,
    /// Temperature sent with every brew command
    pub default_temperature: Temperature,
    /// Measured from entering authentication to the command write
    pub auth_settle_delay: Duration,
    /// Measured from the command write to closing the link
    pub command_settle_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            appliance_address: appliance::DEFAULT_ADDRESS.into(),
            auth_key: AuthKey::default(),
            profile: GattProfile::for_host(),
            default_temperature: Temperature::resolve(appliance::DEFAULT_TEMPERATURE),
            auth_settle_delay: Duration::from_millis(timing::AUTH_SETTLE_MS),
            command_settle_delay: Duration::from_millis(timing::COMMAND_SETTLE_MS),
        }
    }
}

/// Owner of the appliance link
pub struct ApplianceController<B: BleCentral> {
    central: Arc<B>,
    config: ControllerConfig,
    fsm: RwLock<LinkStateMachine>,
    /// Bound by the first successful scan, kept for every later command
    peripheral: OnceCell<B::Peripheral>,
    scan_lock: Mutex<()>,
    in_flight: Mutex<()>,
}

impl<B: BleCentral> ApplianceController<B> {
    pub fn new(central: Arc<B>, config: ControllerConfig) -> Self {
        Self {
            central,
            config,
            fsm: RwLock::new(LinkStateMachine::new()),
            peripheral: OnceCell::new(),
            scan_lock: Mutex::new(()),
            in_flight: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> LinkState {
        self.fsm.read().await.state()
    }

    /// Whether the appliance has been discovered
    pub fn is_ready(&self) -> bool {
        self.peripheral.initialized()
    }

    /// Power the adapter on and scan until the appliance address is seen.
    ///
    /// Scanning stops at the first match. Returns immediately if the
    /// appliance is already bound.
    pub async fn discover(&self) -> Result<(), ControllerError> {
        let _scan = self.scan_lock.lock().await;
        if self.is_ready() {
            return Ok(());
        }

        self.central.power_on().await?;
        self.transition(LinkEvent::ScanStarted).await;
        info!("[BLE] Scanning for {}", self.config.appliance_address);

        let mut advertisements = match self.central.start_scan().await {
            Ok(stream) => stream,
            Err(e) => {
                self.transition(LinkEvent::ScanFailed).await;
                return Err(e.into());
            }
        };

        let found = loop {
            match advertisements.next().await {
                Some(adv) if address::matches(&self.config.appliance_address, &adv.address) => {
                    break Some(adv);
                }
                Some(adv) => debug!("[BLE] Ignoring {}", adv.address),
                None => break None,
            }
        };
        // Stops the scan
        drop(advertisements);

        let Some(adv) = found else {
            self.transition(LinkEvent::ScanFailed).await;
            return Err(LinkError::Scan("scan ended before the appliance was seen".into()).into());
        };

        info!("[BLE] Found appliance at {}", adv.address);
        // The scan lock makes this the only writer
        let _ = self.peripheral.set(adv.peripheral);
        self.transition(LinkEvent::PeripheralFound).await;
        Ok(())
    }

    /// Deliver one brew command.
    ///
    /// Fails fast with `Busy` while another command is in flight and with
    /// `NotReady` before discovery. Any failure leaves the link closed and
    /// the controller ready for the next command.
    pub async fn actuate(&self, food_preset: Option<&str>) -> Result<(), ControllerError> {
        let _in_flight = self
            .in_flight
            .try_lock()
            .map_err(|_| ControllerError::Busy)?;
        let peripheral = self.peripheral.get().ok_or(ControllerError::NotReady)?;

        let volume = Volume::resolve(food_preset.unwrap_or_default());
        let temperature = self.config.default_temperature;
        let buffer = CommandBuffer::new(volume, temperature);
        info!("[CTRL] Brewing {:?} at {}", volume, temperature.name());

        self.transition(LinkEvent::ConnectRequested).await;
        let disconnected = match self.central.connect(peripheral).await {
            Ok(signal) => signal,
            Err(e) => {
                warn!("[CTRL] Connect failed: {}", e);
                self.transition(LinkEvent::Failed).await;
                return Err(e.into());
            }
        };
        self.transition(LinkEvent::Connected).await;

        let outcome = tokio::select! {
            biased;
            _ = disconnected => Err(ControllerError::Disconnected),
            result = self.deliver(peripheral, &buffer) => result,
        };

        match outcome {
            Ok(()) => {
                self.transition(LinkEvent::CommandSent).await;
                let closed = self.central.disconnect(peripheral).await;
                self.transition(LinkEvent::LinkClosed).await;
                closed?;
                info!("[CTRL] Command delivered");
                Ok(())
            }
            Err(ControllerError::Disconnected) => {
                warn!("[CTRL] Appliance dropped the link mid-sequence");
                self.transition(LinkEvent::LinkLost).await;
                Err(ControllerError::Disconnected)
            }
            Err(e) => {
                warn!("[CTRL] Sequence failed: {}", e);
                self.transition(LinkEvent::Failed).await;
                if let Err(close) = self.central.disconnect(peripheral).await {
                    warn!("[CTRL] Forced disconnect failed: {}", close);
                }
                self.transition(LinkEvent::LinkClosed).await;
                Err(e)
            }
        }
    }

    /// Resolve, authenticate, write the command and let it settle
    async fn deliver(
        &self,
        peripheral: &B::Peripheral,
        buffer: &CommandBuffer,
    ) -> Result<(), ControllerError> {
        let characteristics = self
            .central
            .resolve(peripheral, &self.config.profile)
            .await
            .map_err(ControllerError::ServiceDiscoveryFailed)?;
        self.transition(LinkEvent::ServicesResolved).await;

        let authenticating_since = Instant::now();
        self.central
            .write(&characteristics.auth, self.config.auth_key.as_bytes())
            .await?;
        self.transition(LinkEvent::AuthKeySent).await;
        debug!("[CTRL] Auth key written");

        sleep_until(authenticating_since + self.config.auth_settle_delay).await;
        self.central
            .write(&characteristics.command, buffer.as_bytes())
            .await?;
        debug!("[CTRL] Command written");

        sleep(self.config.command_settle_delay).await;
        Ok(())
    }

    async fn transition(&self, event: LinkEvent) {
        let mut fsm = self.fsm.write().await;
        let from = fsm.state();
        match fsm.process_event(event) {
            TransitionResult::Success(to) => debug!("[CTRL] {:?} -> {:?}", from, to),
            TransitionResult::Invalid { from, event } => {
                warn!("[CTRL] Ignoring {:?} in {:?}", event, from)
            }
        }
    }
}

#[async_trait]
impl<B: BleCentral> Actuator for ApplianceController<B> {
    async fn actuate(&self, food_preset: Option<&str>) -> Result<(), ControllerError> {
        ApplianceController::actuate(self, food_preset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::{Call, FakeCentral};
    use brewlink_shared::encoder;

    const APPLIANCE: &str = "E9:C6:DD:63:48:D2";

    fn fast_config() -> ControllerConfig {
        ControllerConfig {
            auth_settle_delay: Duration::from_millis(30),
            command_settle_delay: Duration::from_millis(30),
            ..ControllerConfig::default()
        }
    }

    fn controller(central: &Arc<FakeCentral>) -> Arc<ApplianceController<FakeCentral>> {
        Arc::new(ApplianceController::new(central.clone(), fast_config()))
    }

    async fn discovered(central: &Arc<FakeCentral>) -> Arc<ApplianceController<FakeCentral>> {
        let controller = controller(central);
        controller.discover().await.expect("discovery should succeed");
        controller
    }

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.appliance_address, APPLIANCE);
        assert_eq!(config.default_temperature, Temperature::VeryHot);
        assert_eq!(config.auth_settle_delay, Duration::from_secs(1));
        assert_eq!(config.command_settle_delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_actuate_before_discovery_not_ready() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = controller(&central);

        assert_eq!(
            controller.actuate(Some("espresso")).await,
            Err(ControllerError::NotReady)
        );
        assert!(central.calls().is_empty());
        assert_eq!(controller.state().await, LinkState::Idle);
    }

    #[tokio::test]
    async fn test_discover_stops_at_first_match() {
        let central = Arc::new(FakeCentral::new(vec![
            "11:22:33:44:55:66".into(),
            "e9c6dd6348d2".into(),
            APPLIANCE.into(),
        ]));
        let controller = discovered(&central).await;

        assert!(controller.is_ready());
        assert_eq!(central.seen(), 2);
        assert_eq!(controller.state().await, LinkState::Discovered);
        assert_eq!(central.calls(), vec![Call::PowerOn, Call::StartScan]);

        // Already bound: no second scan
        controller.discover().await.expect("rediscovery is a no-op");
        assert_eq!(central.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_discover_scan_exhausted() {
        let central = Arc::new(FakeCentral::new(vec!["11:22:33:44:55:66".into()]));
        let controller = controller(&central);

        let result = controller.discover().await;
        assert!(matches!(
            result,
            Err(ControllerError::Link(LinkError::Scan(_)))
        ));
        assert!(!controller.is_ready());
        assert_eq!(controller.state().await, LinkState::Idle);
    }

    #[tokio::test]
    async fn test_actuate_write_order() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = discovered(&central).await;

        controller
            .actuate(Some("lungo"))
            .await
            .expect("actuation should succeed");

        let expected_command = encoder::encode("lungo", "muito quente");
        assert_eq!(
            central.calls()[2..].to_vec(),
            vec![
                Call::Connect,
                Call::Resolve,
                Call::Write("auth", AuthKey::default().as_bytes().to_vec()),
                Call::Write("command", expected_command.as_bytes().to_vec()),
                Call::Disconnect,
            ]
        );
        assert_eq!(controller.state().await, LinkState::Idle);
    }

    #[tokio::test]
    async fn test_unknown_preset_uses_default_volume() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = discovered(&central).await;

        controller.actuate(None).await.expect("actuation should succeed");

        let command = central
            .written("command")
            .expect("command should be written");
        assert_eq!(command[9], Volume::default().code());
        assert_eq!(command[8], Temperature::VeryHot.code());
    }

    #[tokio::test]
    async fn test_settle_delays_respected() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = discovered(&central).await;

        controller
            .actuate(Some("espresso"))
            .await
            .expect("actuation should succeed");

        let timeline = central.timeline();
        let at = |wanted: &Call| {
            timeline
                .iter()
                .find(|(call, _)| call == wanted)
                .map(|(_, at)| *at)
                .expect("call should be recorded")
        };
        let auth = at(&Call::Write("auth", AuthKey::default().as_bytes().to_vec()));
        let command = at(&Call::Write(
            "command",
            encoder::encode("espresso", "muito quente").as_bytes().to_vec(),
        ));
        let disconnect = at(&Call::Disconnect);

        assert!(command.duration_since(auth) >= Duration::from_millis(25));
        assert!(disconnect.duration_since(command) >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_disconnect_during_service_discovery() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = discovered(&central).await;
        central.hold_resolve(true);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.actuate(Some("espresso")).await }
        });

        central.resolve_entered().await;
        assert_eq!(controller.state().await, LinkState::ServiceDiscovery);

        central.drop_link();
        let result = pending.await.expect("task should not panic");
        assert_eq!(result, Err(ControllerError::Disconnected));
        assert_eq!(controller.state().await, LinkState::Idle);
        assert!(central.written("command").is_none());

        // Not stuck: the next command goes through
        central.hold_resolve(false);
        controller
            .actuate(Some("espresso"))
            .await
            .expect("second actuation should succeed");
        assert_eq!(controller.state().await, LinkState::Idle);
    }

    #[tokio::test]
    async fn test_disconnect_during_command_settle() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let config = ControllerConfig {
            command_settle_delay: Duration::from_millis(300),
            ..fast_config()
        };
        let controller = Arc::new(ApplianceController::new(central.clone(), config));
        controller.discover().await.expect("discovery should succeed");

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.actuate(Some("lungo")).await }
        });

        central.command_written().await;
        assert_eq!(controller.state().await, LinkState::CommandPending);

        central.drop_link();
        let result = pending.await.expect("task should not panic");
        assert_eq!(result, Err(ControllerError::Disconnected));
        assert_eq!(controller.state().await, LinkState::Idle);
        assert!(!central.calls().contains(&Call::Disconnect));

        controller
            .actuate(Some("lungo"))
            .await
            .expect("second actuation should succeed");
        assert_eq!(controller.state().await, LinkState::Idle);
    }

    #[tokio::test]
    async fn test_auth_write_failure_forces_disconnect() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = discovered(&central).await;
        central.fail_write("auth");

        let result = controller.actuate(Some("espresso")).await;
        assert!(matches!(
            result,
            Err(ControllerError::Link(LinkError::Write(_)))
        ));
        assert_eq!(result.unwrap_err().code(), "deviceUnreachable");
        assert_eq!(central.calls().last(), Some(&Call::Disconnect));
        assert!(central.written("command").is_none());
        assert_eq!(controller.state().await, LinkState::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_actuate_busy() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = discovered(&central).await;
        central.hold_resolve(true);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.actuate(Some("espresso")).await }
        });
        central.resolve_entered().await;

        assert_eq!(
            controller.actuate(Some("lungo")).await,
            Err(ControllerError::Busy)
        );

        central.drop_link();
        assert_eq!(
            pending.await.expect("task should not panic"),
            Err(ControllerError::Disconnected)
        );
        // Only one connect reached the adapter
        assert_eq!(
            central.calls().iter().filter(|c| **c == Call::Connect).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_missing_characteristic_fails_loudly() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = discovered(&central).await;
        central.hide_command_characteristic();

        let result = controller.actuate(Some("espresso")).await;
        assert!(matches!(
            result,
            Err(ControllerError::ServiceDiscoveryFailed(
                LinkError::CharacteristicNotFound { .. }
            ))
        ));
        assert_eq!(central.calls().last(), Some(&Call::Disconnect));
        assert!(central.written("auth").is_none());
        assert_eq!(controller.state().await, LinkState::Idle);
    }

    #[tokio::test]
    async fn test_connect_failure_returns_to_idle() {
        let central = Arc::new(FakeCentral::new(vec![APPLIANCE.into()]));
        let controller = discovered(&central).await;
        central.refuse_connect();

        let result = controller.actuate(Some("espresso")).await;
        assert!(matches!(
            result,
            Err(ControllerError::Link(LinkError::Connect(_)))
        ));
        assert_eq!(controller.state().await, LinkState::Idle);
        assert!(!central.calls().contains(&Call::Disconnect));
    }
}
