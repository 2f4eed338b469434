//! Reads and writes `~/.hammer/config.toml`.

use hammer_runtime::BehaviorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted operator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Fixed patrol seed for reproducible runs.  Entropy-seeded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patrol_seed: Option<u64>,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".hammer").join("config.toml")
}

/// Load the config from disk.  `Ok(None)` when the file does not exist yet.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    cfg.behavior = cfg.behavior.validated();
    Ok(Some(cfg))
}

/// Apply `HAMMER_*` environment overrides.
///
/// | Variable | Field |
/// |---|---|
/// | `HAMMER_POLL_MS` | `behavior.poll_interval_ms` |
/// | `HAMMER_BREACH_DISTANCE` | `behavior.breach_distance` |
/// | `HAMMER_BLOCKING_MOVES` | `behavior.blocking_moves` |
///
/// Unparsable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("HAMMER_POLL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.behavior.poll_interval_ms = ms;
    }
    if let Ok(v) = std::env::var("HAMMER_BREACH_DISTANCE")
        && let Ok(d) = v.parse::<f32>()
    {
        cfg.behavior.breach_distance = d;
    }
    if let Ok(v) = std::env::var("HAMMER_BLOCKING_MOVES")
        && let Ok(b) = v.parse::<bool>()
    {
        cfg.behavior.blocking_moves = b;
    }
}

pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Write `cfg` with owner-only permissions on Unix.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
