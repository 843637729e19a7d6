//! Command-line configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::store::StoreConfig;

/// bistro - read-only JSON API over a restaurants/dishes SQLite database
#[derive(Parser, Debug, Clone)]
#[command(name = "bistro")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Path to the SQLite database file (must exist)
    #[arg(long, default_value = "database.sqlite")]
    pub database: PathBuf,

    /// How long a query waits on a locked database, in milliseconds
    #[arg(long, default_value_t = 5_000)]
    pub busy_timeout_ms: u64,
}

impl Config {
    pub fn store(&self) -> StoreConfig {
        StoreConfig {
            path: self.database.clone(),
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_port_3000() {
        let config = Config::try_parse_from(["bistro"]).unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.database, PathBuf::from("database.sqlite"));
        assert_eq!(config.store().busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "bistro",
            "--addr", "127.0.0.1:8080",
            "--database", "/srv/bistro/menu.sqlite",
            "--busy-timeout-ms", "250",
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.store().path, PathBuf::from("/srv/bistro/menu.sqlite"));
        assert_eq!(config.store().busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn rejects_malformed_address() {
        assert!(Config::try_parse_from(["bistro", "--addr", "localhost"]).is_err());
    }
}
