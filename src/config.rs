use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub relay: RelayConfig,
    pub journal: JournalConfig,
    pub static_dir: PathBuf,
    pub max_body_size: usize,
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Receive-buffer capacity; longer datagrams are truncated by the OS.
    pub buffer_size: usize,
}

impl RelayConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct JournalConfig {
    pub path: PathBuf,
    /// Serialize read-modify-write cycles behind an in-process mutex.
    pub locking: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("FORMRELAY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_HOST: {e}"))?;

        let port: u16 = env_or("FORMRELAY_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_PORT: {e}"))?;

        let relay_host: IpAddr = env_or("FORMRELAY_RELAY_HOST", "127.0.0.1")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_RELAY_HOST: {e}"))?;

        let relay_port: u16 = env_or("FORMRELAY_RELAY_PORT", "5000")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_RELAY_PORT: {e}"))?;

        let buffer_size: usize = env_or("FORMRELAY_RELAY_BUFFER_SIZE", "1024")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_RELAY_BUFFER_SIZE: {e}"))?;

        if buffer_size == 0 || buffer_size > MAX_DATAGRAM_SIZE {
            return Err(format!(
                "Invalid FORMRELAY_RELAY_BUFFER_SIZE: must be between 1 and {MAX_DATAGRAM_SIZE}"
            ));
        }

        let journal_path = PathBuf::from(env_or("FORMRELAY_JOURNAL_PATH", "storage/data.json"));

        let locking = match env_or("FORMRELAY_JOURNAL_LOCKING", "false").as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => return Err(format!("Invalid FORMRELAY_JOURNAL_LOCKING: {other}")),
        };

        let static_dir = PathBuf::from(env_or("FORMRELAY_STATIC_DIR", "public"));

        let max_body_size: usize = env_or("FORMRELAY_MAX_BODY_SIZE", "65507")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("FORMRELAY_LOG_LEVEL", "info");

        Ok(Config {
            host,
            port,
            relay: RelayConfig {
                host: relay_host,
                port: relay_port,
                buffer_size,
            },
            journal: JournalConfig {
                path: journal_path,
                locking,
            },
            static_dir,
            max_body_size,
            log_level,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
