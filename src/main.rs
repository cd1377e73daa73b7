use tracing::{error, info};

use datalink_protocol::config::NetworkConfig;
use datalink_protocol::service::daemon;
use datalink_protocol::utils::logging::init_logging;

#[tokio::main]
async fn main() {
    // Logging is not up yet, so a bad environment goes to stderr.
    let config = match NetworkConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging.to_log_config());
    info!(address = %config.server.address, "starting datalink daemon");

    if let Err(err) = daemon::start_with_config(config.server).await {
        error!(error = %err, "daemon terminated");
        std::process::exit(1);
    }
}
