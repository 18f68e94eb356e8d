use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::export::DataLayout;
use crate::schedule::ScheduleConfig;

pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "polybench.yaml";

/// Harness configuration. Built once at startup and passed to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Benchmark executable, invoked as `<binary> <degree>`.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// Root holding the `runs/`, `stats/` and `plots/` directories.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    /// Per-trial wall-clock limit. Absent or 0 disables the limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}
fn default_binary() -> PathBuf {
    PathBuf::from("bin/main")
}
fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            binary: default_binary(),
            data_root: default_data_root(),
            timeout_seconds: None,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl BenchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_root)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }
        if self.binary.as_os_str().is_empty() {
            return Err(ConfigError("binary must not be empty".into()));
        }
        self.schedule
            .validate()
            .map_err(|e| ConfigError(format!("invalid schedule: {}", e)))
    }
}

/// Values supplied on the command line or via environment; they win over
/// the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub binary: Option<PathBuf>,
    pub data_root: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, cfg: &mut BenchConfig) {
        if let Some(b) = &self.binary {
            cfg.binary = b.clone();
        }
        if let Some(d) = &self.data_root {
            cfg.data_root = d.clone();
        }
        if let Some(t) = self.timeout_seconds {
            cfg.timeout_seconds = Some(t);
        }
    }
}

pub fn load_config(path: &Path) -> Result<BenchConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);
    let mut cfg: BenchConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.push(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML {}: {}", path.display(), e)))?;

    if !ignored_keys.is_empty() {
        tracing::warn!(
            config = %path.display(),
            keys = ?ignored_keys,
            "ignored unknown config fields"
        );
    }

    let r = path_resolver::PathResolver::new(path);
    r.resolve_program(&mut cfg.binary);
    r.resolve(&mut cfg.data_root);

    cfg.validate()?;
    Ok(cfg)
}

/// Loads `explicit` if given, else `polybench.yaml` in the working directory
/// when present, else the built-in defaults. Overrides are applied last.
pub fn resolve_config(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<BenchConfig, ConfigError> {
    let mut cfg = match explicit {
        Some(p) => load_config(p)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                load_config(default_path)?
            } else {
                BenchConfig::default()
            }
        }
    };
    overrides.apply(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"version: 1
# Benchmark executable, invoked as `<binary> <degree>`.
binary: bin/main
# Holds runs/, stats/ and plots/.
data_root: data
# Per-trial limit in seconds (0 or absent: no limit).
timeout_seconds: 600
schedule:
  # degrees are base^p - 1 for p in min_exp..=max_exp
  base: 2
  min_exp: 7
  max_exp: 17
  # smallest degree gets the most repeats, decaying by `growth`
  min_repeats: 3
  max_repeats: 30
  growth: 2
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polybench.yaml");
        write_sample_config(&path).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.binary, dir.path().join("bin/main"));
        assert_eq!(cfg.data_root, dir.path().join("data"));
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(600)));
        assert_eq!(cfg.schedule.growth, Some(2.0));
        assert_eq!(cfg.schedule.build().unwrap().len(), 11);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.yaml");
        std::fs::write(&path, "schedule:\n  max_exp: 9\nunknown_key: 1\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.schedule.min_exp, 7);
        assert_eq!(cfg.schedule.max_exp, 9);
        assert_eq!(cfg.timeout(), None);
    }

    #[test]
    fn test_rejects_unsupported_version_and_bad_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.yaml");

        std::fs::write(&path, "version: 7\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config version 7"));

        std::fs::write(&path, "schedule:\n  min_exp: 9\n  max_exp: 3\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("invalid schedule"));
    }

    #[test]
    fn test_overrides_win() {
        let mut cfg = BenchConfig::default();
        ConfigOverrides {
            binary: Some(PathBuf::from("/opt/poly")),
            data_root: None,
            timeout_seconds: Some(0),
        }
        .apply(&mut cfg);
        assert_eq!(cfg.binary, PathBuf::from("/opt/poly"));
        assert_eq!(cfg.data_root, PathBuf::from("data"));
        assert_eq!(cfg.timeout(), None);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let err = resolve_config(
            Some(Path::new("/no/such/polybench.yaml")),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to read config"));
    }
}
