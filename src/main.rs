use std::sync::Arc;

use file_to_text::config::{AppState, Config};
use file_to_text::{bot, logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging);

    // Create Tokio runtime; worker count follows server.workers when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!("[CONFIG] Using {workers} worker threads");
    } else {
        tracing::info!("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let state = Arc::new(AppState::new(&cfg));

    logger::log_server_start(&addr, &cfg);
    tracing::debug!(config = ?cfg, "[CONFIG] Loaded configuration");

    if cfg.bot.verify_on_startup {
        bot::verify_credentials(&state).await;
    }

    server::serve(listener, state, server::shutdown_signal()).await;
    Ok(())
}
