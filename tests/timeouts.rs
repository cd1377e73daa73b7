use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::sleep;

use datalink_protocol::config::ClientConfig;
use datalink_protocol::datalink::UasDatalinkLocalSet;
use datalink_protocol::error::ProtocolError;
use datalink_protocol::service::client::Client;

fn valid_set() -> UasDatalinkLocalSet {
    UasDatalinkLocalSet {
        checksum: 0x0001,
        precision_time_stamp: 1_700_000_000_000_000,
        ..UasDatalinkLocalSet::default()
    }
}

#[tokio::test]
async fn test_update_times_out_when_the_server_stays_silent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    // Accept the connection and hold it open without ever replying
    let silent = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        sleep(Duration::from_secs(60)).await;
    });

    let config = ClientConfig {
        address: addr,
        connection_timeout: Duration::from_secs(1),
        response_timeout: Duration::from_millis(300),
    };
    let mut client = Client::connect_with_config(config)
        .await
        .expect("Failed to connect");

    let err = client
        .update(&valid_set())
        .await
        .expect_err("update must time out");
    assert!(
        matches!(err, ProtocolError::Timeout),
        "expected timeout, got {err:?}"
    );

    silent.abort();
}

#[tokio::test]
async fn test_connect_fails_when_nothing_listens() {
    // Bind and immediately drop to get a port nobody is listening on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let err = Client::connect(&addr)
        .await
        .expect_err("connect must fail without a daemon");
    match err {
        // Refused on a live loopback, timed out where packets blackhole
        ProtocolError::Io(_) | ProtocolError::Timeout => {}
        other => panic!("unexpected error: {other:?}"),
    }
}
