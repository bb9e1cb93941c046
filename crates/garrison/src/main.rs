//! Garrison server entry point.
//!
//! Parses the CLI, initializes logging with a reloadable filter (so the core
//! configuration can adjust the level through the host natives), establishes
//! the working directory at the resource root, runs the bootstrap, and then
//! waits for a shutdown signal.

mod cli;
mod host;
mod signals;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use garrison_server::{Bootstrap, DylibModuleLoader, Host};

use crate::cli::CliArgs;
use crate::host::{FilterHandle, RuntimeHost};

fn setup_logging(level: &str, json_format: bool) -> FilterHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let (filter, handle) = reload::Layer::new(filter);
    let registry = tracing_subscriber::registry().with(filter);

    if json_format {
        registry
            .with(fmt::layer().json().with_file(false).with_line_number(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_ansi(true).with_file(false).with_line_number(false))
            .init();
    }

    handle
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let filter_handle = setup_logging(&args.log_level, args.json_logs);

    let resource_root = args
        .resource_root
        .canonicalize()
        .unwrap_or_else(|_| args.resource_root.clone());
    std::env::set_current_dir(&resource_root)
        .with_context(|| format!("failed to enter resource root {}", resource_root.display()))?;

    info!(
        "Garrison Server v{} | resource root: {}",
        env!("CARGO_PKG_VERSION"),
        resource_root.display()
    );

    let runtime_host = Arc::new(RuntimeHost::new(filter_handle));
    let host: Arc<dyn Host> = runtime_host.clone();
    let mut loader = DylibModuleLoader::new(&resource_root);

    let server = match Bootstrap::new(&resource_root, host).run(&mut loader).await {
        Ok(server) => server,
        Err(e) => {
            error!("bootstrap failed: {e}");
            return Err(e.into());
        }
    };

    info!(
        plugins = server.plugins_loaded,
        controllers = server.controllers.len(),
        map = runtime_host.map_name().as_deref().unwrap_or("unset"),
        game_type = runtime_host.game_type().as_deref().unwrap_or("unset"),
        "server initialized, press Ctrl+C to shut down"
    );

    signals::wait_for_shutdown().await?;

    info!("shutdown complete");
    Ok(())
}
