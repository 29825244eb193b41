//! Engine configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_DB: &str = "famtree.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
/// Depth used by `POST /fill/{username}` when no depth is given.
pub const DEFAULT_GENERATIONS: i64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub db_path: String,
    pub server_host: String,
    pub server_port: u16,
    /// Directory holding a `names.json` that replaces the embedded dataset.
    pub data_dir: Option<PathBuf>,
    pub default_generations: i64,
    /// Seed for reproducible trees; unset means OS randomness.
    pub seed: Option<u64>,
    pub cors_allowed_origins: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            db_path: get("FAMTREE_DB").unwrap_or_else(|| DEFAULT_DB.into()),
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            server_port: parsed("SERVER_PORT", get("SERVER_PORT").or_else(|| get("PORT")))
                .unwrap_or(DEFAULT_PORT),
            data_dir: get("FAMTREE_DATA_DIR").map(PathBuf::from),
            default_generations: parsed(
                "FAMTREE_DEFAULT_GENERATIONS",
                get("FAMTREE_DEFAULT_GENERATIONS"),
            )
            .unwrap_or(DEFAULT_GENERATIONS),
            seed: parsed("FAMTREE_SEED", get("FAMTREE_SEED")),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        }
    }
}

fn parsed<T: FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "Ignoring unparsable setting");
            None
        }
    }
}
