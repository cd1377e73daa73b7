use datalink_protocol::config::DEFAULT_SERVER_ADDRESS;
use datalink_protocol::datalink::UasDatalinkLocalSet;
use datalink_protocol::service::client::Client;
use datalink_protocol::utils::time::now_micros;

#[tokio::main]
async fn main() {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());

    let mut set = UasDatalinkLocalSet {
        precision_time_stamp: now_micros(),
        alternate_platform_name: Some("Hello, from Rust!".to_string()),
        ..UasDatalinkLocalSet::default()
    };

    // Carry the checksum the KLV rendition of this set would have
    set.checksum = match set.packet_checksum() {
        Ok(checksum) => checksum,
        Err(e) => {
            eprintln!("Failed to compute checksum: {e}");
            std::process::exit(1);
        }
    };

    let mut client = match Client::connect(&addr).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to connect to {addr}: {e}");
            std::process::exit(1);
        }
    };

    match client.update(&set).await {
        Ok(()) => println!("update acknowledged: {set}"),
        Err(e) => {
            eprintln!("Update failed: {e}");
            std::process::exit(1);
        }
    }
}
