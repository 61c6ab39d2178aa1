use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use crm_core::{ServiceConfig, ServiceRegistry, WorkflowService};
use crm_db_sqlite::SqliteServiceFactory;
use tracing::{debug, info};

use crm_ui::app::CrmApp;
use crm_ui::logging;

/// Dealer-facing customer and estimate workflow manager.
///
/// Connects to the configured backend and opens the desktop UI with the
/// estimate workflow table and the customer intake form.
#[derive(Debug, Parser)]
struct Cli {
    /// Database backend to use.
    #[arg(long, default_value = "sqlite")]
    backend: String,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `dealer.db`) or `:memory:`.
    #[arg(long, default_value = "dealer.db")]
    db: String,

    /// Append log records to this file in addition to stdout.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn build_registry() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry.register(Box::new(SqliteServiceFactory));
    registry
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    let config = ServiceConfig {
        backend: cli.backend,
        connection_string: cli.db,
    };

    // Service calls run on this runtime; the UI thread stays blocking.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    debug!("connecting to {} backend", config.backend);
    let registry = build_registry();
    let service = runtime.block_on(registry.create(&config))?;
    let service: Arc<dyn WorkflowService> = Arc::from(service);
    info!("backend ready, starting UI");

    let handle = runtime.handle().clone();
    eframe::run_native(
        "Dealer Workflow",
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1280.0, 800.0])
                .with_min_inner_size([900.0, 600.0]),
            ..Default::default()
        },
        Box::new(move |cc| Ok(Box::new(CrmApp::new(cc, handle, service)))),
    )
    .map_err(|e| anyhow::anyhow!("UI failed: {e}"))?;

    Ok(())
}
