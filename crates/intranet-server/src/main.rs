use std::env;
use std::process::ExitCode;

use intranet_server::ServerBuilder;
use intranet_server::config::loader::{DEFAULT_CONFIG_FILE, load_config};

/// `--config <path>` wins over `INTRANET_CONFIG`; without either the loader
/// falls back to [`DEFAULT_CONFIG_FILE`] in the working directory.
fn config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.windows(2)
        .find(|pair| pair[0] == "--config")
        .map(|pair| pair[1].clone())
        .or_else(|| env::var("INTRANET_CONFIG").ok().filter(|p| !p.is_empty()))
}

#[tokio::main]
async fn main() -> ExitCode {
    match dotenvy::dotenv() {
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => eprintln!("Ignoring unreadable .env file: {e}"),
        Ok(_) => {}
    }

    let path = config_path();
    let cfg = match load_config(path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(2);
        }
    };

    intranet_server::observability::init_tracing(&cfg.logging);
    tracing::info!(
        path = path.as_deref().unwrap_or(DEFAULT_CONFIG_FILE),
        seed_demo_data = cfg.server.seed_demo_data,
        "Configuration loaded"
    );

    let server = match ServerBuilder::new().with_config(cfg).build() {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Server initialization failed");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server stopped with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
