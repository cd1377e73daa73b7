use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use datalink_protocol::config::ServerConfig;
use datalink_protocol::datalink::service::DatalinkHandler;
use datalink_protocol::datalink::UasDatalinkLocalSet;
use datalink_protocol::error::Result;
use datalink_protocol::service::client::Client;
use datalink_protocol::service::daemon;

#[derive(Default)]
struct CountingHandler {
    count: AtomicUsize,
}

impl DatalinkHandler for CountingHandler {
    fn update(&self, _set: UasDatalinkLocalSet) -> Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

async fn spawn_daemon(
    handler: Arc<CountingHandler>,
) -> (String, mpsc::Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let config = ServerConfig {
        address: addr.clone(),
        ..ServerConfig::default()
    };
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let handle = tokio::spawn(async move {
        let _ = daemon::start_with_shutdown(config, handler, shutdown_rx).await;
    });

    sleep(Duration::from_millis(100)).await;
    (addr, shutdown_tx, handle)
}

fn sample_set() -> UasDatalinkLocalSet {
    UasDatalinkLocalSet {
        checksum: 0x0001,
        precision_time_stamp: 1_700_000_000_000_000,
        platform_call_sign: Some("TOP GUN".to_string()),
        sensor_latitude: Some(60.176_822_966_978_3),
        sensor_longitude: Some(128.426_759_765_625),
        ..UasDatalinkLocalSet::default()
    }
}

#[tokio::test]
async fn benchmark_update_roundtrip_latency() {
    let handler = Arc::new(CountingHandler::default());
    let (addr, shutdown_tx, handle) = spawn_daemon(handler.clone()).await;

    let mut client = match Client::connect(&addr).await {
        Ok(client) => {
            println!("[benchmark] Client connected successfully");
            client
        }
        Err(e) => panic!("Failed to connect: {e:?}"),
    };

    let set = sample_set();
    let rounds = 50;
    let mut total = Duration::ZERO;
    let mut successful = 0u32;

    for i in 0..rounds {
        // Breathe every few calls so the numbers stay stable
        if i % 10 == 0 {
            sleep(Duration::from_millis(10)).await;
        }

        let start = Instant::now();
        match tokio::time::timeout(Duration::from_millis(500), client.update(&set)).await {
            Ok(Ok(())) => {
                total += start.elapsed();
                successful += 1;
            }
            Ok(Err(e)) => println!("Error during update: {e:?}"),
            Err(_) => println!("Timeout waiting for acknowledgement"),
        }
    }

    if successful > 0 {
        let avg = total / successful;
        println!("Average update latency over {successful} successful calls: {avg:?} per call");
    } else {
        println!("No successful update exchanges completed");
    }

    assert_eq!(handler.count.load(Ordering::Relaxed), successful as usize);

    drop(client);
    let _ = shutdown_tx.send(()).await;
    let _ = handle.await;
}

#[tokio::test]
async fn benchmark_update_throughput() {
    let handler = Arc::new(CountingHandler::default());
    let (addr, shutdown_tx, handle) = spawn_daemon(handler.clone()).await;

    let mut client = match Client::connect(&addr).await {
        Ok(client) => {
            println!("[benchmark] Client connected successfully");
            client
        }
        Err(e) => panic!("Failed to connect: {e:?}"),
    };

    let set = sample_set();
    let rounds = 50;
    let mut successful = 0u32;
    let start = Instant::now();

    for _ in 0..rounds {
        match tokio::time::timeout(Duration::from_millis(500), client.update(&set)).await {
            Ok(Ok(())) => successful += 1,
            Ok(Err(e)) => println!("Error during update: {e:?}"),
            Err(_) => println!("Timeout waiting for acknowledgement"),
        }
    }

    let elapsed = start.elapsed();
    if successful > 0 {
        let per_sec = successful as f64 / elapsed.as_secs_f64();
        println!("Throughput: {per_sec:.0} updates/sec ({successful} successful of {rounds} attempts) over {elapsed:?} total");
    } else {
        println!("No successful exchanges completed");
    }

    drop(client);
    let _ = shutdown_tx.send(()).await;
    let _ = handle.await;
}
