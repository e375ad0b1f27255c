// Runtime configuration from the environment (and `.env` when present)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:1234";
pub const DEFAULT_DATA_DIR: &str = "data/pirate-parlays";
pub const DEFAULT_LIVE_TICK_SECS: u64 = 5;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// sled directory holding the snapshot
    pub data_dir: PathBuf,
    /// false runs fully in memory
    pub persist: bool,
    /// None disables the live ticker
    pub live_tick: Option<Duration>,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 1234)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            persist: true,
            live_tick: Some(Duration::from_secs(DEFAULT_LIVE_TICK_SECS)),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = parsed(&lookup, "PP_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let data_dir = lookup("PP_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let persist = match lookup("PP_PERSIST").as_deref().map(str::trim) {
            None => defaults.persist,
            Some("true" | "1" | "yes") => true,
            Some("false" | "0" | "no") => false,
            Some(other) => {
                warn!(value = other, "⚠️  PP_PERSIST is not a boolean, using default");
                defaults.persist
            }
        };
        let live_tick = match parsed::<u64, _>(&lookup, "PP_LIVE_TICK_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.live_tick,
        };
        let log_filter = lookup("PP_LOG")
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        Self {
            bind_addr,
            data_dir,
            persist,
            live_tick,
            log_filter,
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "⚠️  Invalid config value, using default");
            None
        }
    }
}
