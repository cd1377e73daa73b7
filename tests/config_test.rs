use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::Level;

use datalink_protocol::config::{NetworkConfig, DEFAULT_SERVER_ADDRESS, MAX_FRAME_SIZE};
use datalink_protocol::error::Result;

#[test]
#[serial_test::serial]
fn test_config_defaults_and_file_round_trip() -> Result<()> {
    // Built-in defaults
    let defaults = NetworkConfig::default();
    assert_eq!(defaults.server.address, DEFAULT_SERVER_ADDRESS);
    assert_eq!(defaults.server.max_frame_size, MAX_FRAME_SIZE);
    assert_eq!(defaults.server.shutdown_timeout, Duration::from_secs(10));
    assert_eq!(defaults.client.address, DEFAULT_SERVER_ADDRESS);
    assert_eq!(defaults.client.connection_timeout, Duration::from_secs(5));
    assert_eq!(defaults.client.response_timeout, Duration::from_secs(5));
    assert_eq!(defaults.logging.log_level, Level::INFO);
    assert!(defaults.logging.log_to_console);
    assert!(!defaults.logging.log_to_file);

    // Create a temporary config file for testing
    let test_config = r#"
    [server]
    address = "127.0.0.1:9999"
    max_frame_size = 65536
    shutdown_timeout = 5000

    [client]
    address = "127.0.0.1:9999"
    connection_timeout = 2500
    response_timeout = 15000

    [logging]
    app_name = "config-test"
    log_level = "debug"
    log_to_console = true
    log_to_file = false
    json_format = false
    "#;

    let test_config_path = Path::new("test_config.toml");
    fs::write(test_config_path, test_config)?;

    println!("Testing config loading from file...");
    let file_config = NetworkConfig::from_file(test_config_path)?;

    assert_eq!(file_config.server.address, "127.0.0.1:9999");
    assert_eq!(file_config.server.max_frame_size, 65536);
    assert_eq!(
        file_config.server.shutdown_timeout,
        Duration::from_millis(5000)
    );
    assert_eq!(
        file_config.client.connection_timeout,
        Duration::from_millis(2500)
    );
    assert_eq!(
        file_config.client.response_timeout,
        Duration::from_millis(15000)
    );
    assert_eq!(file_config.logging.app_name, "config-test");
    assert_eq!(file_config.logging.log_level, Level::DEBUG);

    // Test programmatic overrides plus save and reload
    println!("Testing config save and reload...");
    let custom = NetworkConfig::default_with_overrides(|cfg| {
        cfg.server.address = "0.0.0.0:7000".to_string();
        cfg.client.response_timeout = Duration::from_secs(30);
        cfg.logging.log_level = Level::TRACE;
    });

    let save_path = Path::new("test_config_save.toml");
    custom.save_to_file(save_path)?;

    let reloaded = NetworkConfig::from_file(save_path)?;
    assert_eq!(reloaded.server.address, "0.0.0.0:7000");
    assert_eq!(reloaded.client.response_timeout, Duration::from_secs(30));
    assert_eq!(reloaded.logging.log_level, Level::TRACE);

    // Clean up test files
    fs::remove_file(test_config_path)?;
    fs::remove_file(save_path)?;
    Ok(())
}

#[test]
#[serial_test::serial]
fn test_config_env_overrides() -> Result<()> {
    println!("Testing config loading from environment variables...");
    env::set_var("DATALINK_PROTOCOL_SERVER_ADDRESS", "127.0.0.1:8888");
    env::set_var("DATALINK_PROTOCOL_MAX_FRAME_SIZE", "131072");
    env::set_var("DATALINK_PROTOCOL_RESPONSE_TIMEOUT_MS", "12000");
    env::set_var("DATALINK_PROTOCOL_LOG_LEVEL", "warn");

    let config = NetworkConfig::from_env()?;
    assert_eq!(config.server.address, "127.0.0.1:8888");
    assert_eq!(config.server.max_frame_size, 131072);
    assert_eq!(config.client.response_timeout, Duration::from_millis(12000));
    assert_eq!(config.logging.log_level, Level::WARN);

    // A malformed number must be reported, not silently defaulted
    env::set_var("DATALINK_PROTOCOL_MAX_FRAME_SIZE", "not-a-number");
    assert!(NetworkConfig::from_env().is_err());

    // Clean up environment variables
    env::remove_var("DATALINK_PROTOCOL_SERVER_ADDRESS");
    env::remove_var("DATALINK_PROTOCOL_MAX_FRAME_SIZE");
    env::remove_var("DATALINK_PROTOCOL_RESPONSE_TIMEOUT_MS");
    env::remove_var("DATALINK_PROTOCOL_LOG_LEVEL");
    Ok(())
}
