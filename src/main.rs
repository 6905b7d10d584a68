use rangeserve::config::Config;
use rangeserve::logger::{self, LogWriter};
use rangeserve::server::{self, ServerState};
use std::sync::Arc;
use tokio::sync::Notify;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path without extension, "config" by default
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;

    // Build the Tokio runtime with the configured worker count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let log = Arc::new(LogWriter::new(
        cfg.logging.access_log_file.as_deref(),
        cfg.logging.error_log_file.as_deref(),
    )?);

    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(ServerState::from_config(&cfg, Arc::clone(&log)));
    let shutdown = Arc::new(Notify::new());
    server::signal::spawn_shutdown_listener(Arc::clone(&shutdown), Arc::clone(&log));

    logger::log_server_start(&log, &addr, &cfg);
    server::run(listener, state, shutdown).await?;
    Ok(())
}
