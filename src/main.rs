mod command;
mod config;
mod controller;
mod intent;
mod storage;
mod transport;

use anyhow::{Context, Result};
use brewlink_shared::{timing, DeviceDescription, DeviceRecord};
use command::IntentExecutor;
use config::BridgeConfig;
use controller::ApplianceController;
use intent::IntentListener;
use std::sync::Arc;
use std::time::Duration;
use storage::{LogReporter, MemoryStore};
use transport::{BleCentral, BluezCentral};

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = BridgeConfig::from_env().context("invalid configuration")?;

    info!("Brewlink bridge starting");
    info!("  Appliance: {}", config.controller.appliance_address);
    info!(
        "  Temperature: {}",
        config.controller.default_temperature.name()
    );
    info!("  UUID style: {:?}", config.controller.profile.style);

    let central = Arc::new(
        BluezCentral::new()
            .await
            .context("failed to open the Bluetooth adapter")?,
    );
    let controller = Arc::new(ApplianceController::new(
        central,
        config.controller.clone(),
    ));

    let store = MemoryStore::new();
    let seeded = DeviceRecord {
        description: DeviceDescription {
            name: "Coffee machine".into(),
            default_names: vec!["Brewlink coffee machine".into()],
            ..DeviceDescription::default()
        },
        ..DeviceRecord::default()
    };
    store
        .insert(&config.user_id, &config.device_id, seeded)
        .await;
    info!("  Device: {}/{}", config.user_id, config.device_id);

    let executor = IntentExecutor::new(
        Arc::new(store),
        Arc::new(LogReporter::new()),
        controller.clone(),
    );

    // Spawn appliance discovery
    tokio::spawn(run_discovery(controller.clone()));

    // Spawn the one-shot debug brew
    if let Some(delay) = config.debug_brew_after {
        let controller_clone = controller.clone();
        tokio::spawn(async move {
            info!("[CTRL] Debug brew in {}s", delay.as_secs());
            tokio::time::sleep(delay).await;
            match controller_clone.actuate(None).await {
                Ok(()) => info!("[CTRL] Debug brew delivered"),
                Err(e) => error!("[CTRL] Debug brew failed: {}", e),
            }
        });
    }

    IntentListener::bind(&config.listen_addr)
        .await?
        .run(executor)
        .await
}

/// Scan until the appliance is bound, backing off between attempts
async fn run_discovery<B: BleCentral>(controller: Arc<ApplianceController<B>>) {
    let retry = Duration::from_millis(timing::SCAN_RETRY_MS);

    loop {
        match controller.discover().await {
            Ok(()) => {
                info!("[BLE] Appliance ready: {:?}", controller.state().await);
                return;
            }
            Err(e) => {
                warn!("[BLE] Discovery failed: {}, retrying in {:?}", e, retry);
                tokio::time::sleep(retry).await;
            }
        }
    }
}
