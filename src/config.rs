/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), or from an
/// explicit path given on the command line.
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub map_file: PathBuf,
    pub log_file: Option<PathBuf>,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub enemy_tick_ms: u64,
    pub coin_min_secs: u64,      // inclusive
    pub coin_max_secs: u64,      // exclusive, always > coin_min_secs
    pub button_period_secs: u64,
}

impl TimingConfig {
    pub fn enemy_tick(&self) -> Duration {
        Duration::from_millis(self.enemy_tick_ms.max(1))
    }

    pub fn button_period(&self) -> Duration {
        Duration::from_secs(self.button_period_secs.max(1))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TomlTiming::default().into()
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_enemy_tick")]
    enemy_tick_ms: u64,
    #[serde(default = "default_coin_min")]
    coin_min_secs: u64,
    #[serde(default = "default_coin_max")]
    coin_max_secs: u64,
    #[serde(default = "default_button_period")]
    button_period_secs: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_map_file")]
    map_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_enemy_tick() -> u64 { 500 }
fn default_coin_min() -> u64 { 5 }
fn default_coin_max() -> u64 { 15 }
fn default_button_period() -> u64 { 15 }
fn default_map_file() -> String { "map.txt".into() }
fn default_log_file() -> String { "gridchase.log".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            enemy_tick_ms: default_enemy_tick(),
            coin_min_secs: default_coin_min(),
            coin_max_secs: default_coin_max(),
            button_period_secs: default_button_period(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            map_file: default_map_file(),
            log_file: default_log_file(),
            seed: None,
        }
    }
}

impl From<TomlTiming> for TimingConfig {
    fn from(t: TomlTiming) -> Self {
        TimingConfig {
            enemy_tick_ms: t.enemy_tick_ms,
            coin_min_secs: t.coin_min_secs,
            // Keep the range non-empty.
            coin_max_secs: t.coin_max_secs.max(t.coin_min_secs + 1),
            button_period_secs: t.button_period_secs,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `explicit` if given, else search for `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = match explicit {
            Some(path) => load_file(path).unwrap_or_default(),
            None => load_toml(&search_dirs),
        };
        Self::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // A relative map path is looked up next to the binary first.
        let map_str = &toml_cfg.general.map_file;
        let map_file = if PathBuf::from(map_str).is_absolute() {
            PathBuf::from(map_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(map_str))
                .find(|p| p.is_file())
                .unwrap_or_else(|| PathBuf::from(map_str))
        };

        let log_file = match toml_cfg.general.log_file.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };

        GameConfig {
            timing: toml_cfg.timing.into(),
            map_file,
            log_file,
            seed: toml_cfg.general.seed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            if let Some(cfg) = load_file(&path) {
                return cfg;
            }
        }
    }
    TomlConfig::default()
}

/// Parse one file. Read errors skip the file; parse errors mean defaults.
fn load_file(path: &Path) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!("Warning: {} parse error: {e}", path.display());
                eprintln!("Using default settings.");
                Some(TomlConfig::default())
            }
        },
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            None
        }
    }
}
