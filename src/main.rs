use std::process::ExitCode;
use std::time::Duration;

use devserve::browser::SystemBrowser;
use devserve::config::Config;
use devserve::error::StartupError;
use devserve::logger;
use devserve::server::{signal, DevServer};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging).map_err(StartupError::Logger)?;

    // Create the Tokio runtime, sized by `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
        logger::log_debug(&format!("[CONFIG] Using {workers} worker threads"));
    }

    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;
    let result = runtime.block_on(async_main(cfg));

    // A browser opener that is still running must not hold the exit
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    // Handlers go in before the banner so an early Ctrl+C is never lost
    let shutdown = signal::shutdown_signal()?;

    let server = DevServer::start(cfg, SystemBrowser)?;
    std::env::set_current_dir(server.root()).map_err(|source| {
        StartupError::RootInaccessible {
            path: server.root().to_path_buf(),
            source,
        }
    })?;

    server.serve(shutdown).await;
    Ok(())
}
