#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use tempfile::TempDir;
use tokio::sync::watch;

use formrelay::config::{Config, JournalConfig, RelayConfig};
use formrelay::journal::JournalStore;
use formrelay::models::Journal;
use formrelay::relay::{RelayReceiver, RelaySender};

/// A running test server with its own journal directory and relay.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub journal: Arc<JournalStore>,
    pub dir: TempDir,
    shutdown: watch::Sender<bool>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a raw form-urlencoded body.
    pub async fn post_form(&self, path: &str, body: &str) -> Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .expect("form post failed")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed")
    }

    /// Poll the journal until it holds at least `count` entries.
    pub async fn wait_for_entries(&self, count: usize) -> Journal {
        wait_for_entries(&self.journal, count).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

pub fn journal_config(dir: &Path, locking: bool) -> JournalConfig {
    JournalConfig {
        path: dir.join("storage").join("data.json"),
        locking,
    }
}

pub fn test_config(dir: &Path, relay_addr: SocketAddr) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        relay: RelayConfig {
            host: relay_addr.ip(),
            port: relay_addr.port(),
            buffer_size: 1024,
        },
        journal: journal_config(dir, false),
        static_dir: dir.join("public"),
        max_body_size: 65_507,
        log_level: "warn".to_string(),
    }
}

/// Spawn the app together with a relay receiver writing to a fresh journal.
pub async fn spawn_app() -> TestApp {
    let receiver = RelayReceiver::bind("127.0.0.1:0".parse().unwrap(), 1024)
        .await
        .expect("Failed to bind relay receiver");
    let relay_addr = receiver.local_addr().unwrap();

    spawn(relay_addr, Some(receiver)).await
}

/// Spawn the app with a relay destination nobody is listening on.
pub async fn spawn_app_without_receiver() -> TestApp {
    let relay_addr = {
        let probe = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        probe.local_addr().unwrap()
    };

    spawn(relay_addr, None).await
}

async fn spawn(relay_addr: SocketAddr, receiver: Option<RelayReceiver>) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::create_dir_all(dir.path().join("public")).unwrap();
    std::fs::write(dir.path().join("public").join("hello.txt"), "hello static").unwrap();

    let config = test_config(dir.path(), relay_addr);

    let journal = Arc::new(JournalStore::new(&config.journal));
    journal.ensure_exists().await.expect("Failed to create journal");

    let (shutdown, shutdown_rx) = watch::channel(false);
    if let Some(receiver) = receiver {
        tokio::spawn(receiver.run(journal.clone(), shutdown_rx));
    }

    let sender = RelaySender::bind(relay_addr)
        .await
        .expect("Failed to bind relay sender");

    let (app, _state) = formrelay::build_app(config, journal.clone(), sender);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        journal,
        dir,
        shutdown,
    }
}

pub async fn wait_for_entries(journal: &JournalStore, count: usize) -> Journal {
    for _ in 0..100 {
        let entries = journal.load().await.expect("Failed to load journal");
        if entries.len() >= count {
            return entries;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    panic!("journal did not reach {count} entries in time");
}
