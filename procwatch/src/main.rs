// procwatch entry point

use std::sync::Arc;

use anyhow::{Context, Result};
use procwatch_core::{init_logging, init_minimal_logging, ConfigLoader, CoreConfig};
use procwatch_domain::{SharedRuleStore, SystemClock};
use procwatch_system::{
    BackgroundTasks, LoggingNotificationView, Orchestrator, OrchestratorParts, ThemeIconProvider,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = match ConfigLoader::default_config_path() {
        Ok(path) => Some(path),
        Err(e) => {
            init_minimal_logging();
            warn!("Could not determine the configuration directory: {}", e);
            None
        }
    };

    let config = match &config_path {
        Some(path) => match ConfigLoader::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                init_minimal_logging();
                error!("Failed to load configuration from {:?}: {}", path, e);
                return Err(e).context("Invalid configuration");
            }
        },
        None => CoreConfig::default(),
    };

    // Minimal logging is already installed when the config directory is unknown.
    let logging_installed = config_path.is_none();
    init_logging(&config.logging, logging_installed).context("Failed to initialise logging")?;
    info!("Starting procwatch...");

    let rule_store = Arc::new(SharedRuleStore::new());
    let (orchestrator, handle) = Orchestrator::new(OrchestratorParts {
        config: config.clone(),
        config_path,
        view: LoggingNotificationView::new(),
        icon_provider: Arc::new(ThemeIconProvider::new(config.icons.theme_dirs.clone())),
        rule_store: rule_store.clone(),
        classifier: None,
        clock: Arc::new(SystemClock),
    });

    let background = BackgroundTasks::spawn(&config, rule_store, handle.sender());
    let mut control = tokio::spawn(orchestrator.run());

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
            info!("Shutdown requested");
            background.abort_all();
            if let Err(e) = handle.shutdown().await {
                warn!("Control loop already stopped: {}", e);
            }
            control.await.context("Control loop panicked")?;
        }
        result = &mut control => {
            background.abort_all();
            result.context("Control loop panicked")?;
            warn!("Control loop exited on its own");
        }
    }

    info!("procwatch shutting down.");
    Ok(())
}
