use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backoff::DEFAULT_SEED;
use crate::classify::FailureClassifier;
use crate::engine::RetryPlan;
use crate::policy::Policy;

/// One stopping policy as written in config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicySpec {
    MaxRetries { count: u32 },
    MaxDuration { ms: u64 },
    ConstantInterval { ms: u64 },
    ExponentialBackoff { interval_ms: u64, max_interval_ms: u64 },
}

/// One failure classifier as written in config.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Status { code: u16 },
    /// 401.
    Unauthenticated,
    /// 403.
    Unauthorized,
    NetworkError,
    Timeout,
    All,
}

/// Retry plan section (`[retry]` in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Seed for exponential backoff jitter. Unset means the fixed default seed.
    #[serde(default)]
    pub jitter_seed: Option<u64>,
    pub policies: Vec<PolicySpec>,
    /// Failures eligible for retry. An empty list disables retrying.
    pub classifiers: Vec<ClassifierSpec>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            jitter_seed: None,
            policies: vec![
                PolicySpec::MaxRetries { count: 3 },
                PolicySpec::ExponentialBackoff {
                    interval_ms: 500,
                    max_interval_ms: 3000,
                },
            ],
            classifiers: vec![
                ClassifierSpec::NetworkError,
                ClassifierSpec::Timeout,
                ClassifierSpec::Status { code: 503 },
            ],
        }
    }
}

impl PolicySpec {
    pub fn to_policy(&self, seed: u64) -> Policy {
        match *self {
            PolicySpec::MaxRetries { count } => Policy::max_retries(count),
            PolicySpec::MaxDuration { ms } => Policy::max_duration(Duration::from_millis(ms)),
            PolicySpec::ConstantInterval { ms } => {
                Policy::constant_interval(Duration::from_millis(ms))
            }
            PolicySpec::ExponentialBackoff {
                interval_ms,
                max_interval_ms,
            } => Policy::exponential_backoff_seeded(
                Duration::from_millis(interval_ms),
                Duration::from_millis(max_interval_ms),
                seed,
            ),
        }
    }
}

impl ClassifierSpec {
    pub fn to_classifier(self) -> FailureClassifier {
        match self {
            ClassifierSpec::Status { code } => FailureClassifier::on_status(code),
            ClassifierSpec::Unauthenticated => FailureClassifier::on_unauthenticated_status(),
            ClassifierSpec::Unauthorized => FailureClassifier::on_unauthorized_status(),
            ClassifierSpec::NetworkError => FailureClassifier::on_network_error(),
            ClassifierSpec::Timeout => FailureClassifier::on_timeout(),
            ClassifierSpec::All => FailureClassifier::on_all_failures(),
        }
    }
}

impl RetryConfig {
    pub fn plan(&self) -> RetryPlan {
        let seed = self.jitter_seed.unwrap_or(DEFAULT_SEED);
        RetryPlan::new(
            self.policies.iter().map(|p| p.to_policy(seed)).collect(),
            self.classifiers.iter().map(|c| c.to_classifier()).collect(),
        )
    }
}

/// Global configuration loaded from `~/.config/rtry/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_filter: Option<String>,
    #[serde(default)]
    pub retry: RetryConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rtry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Configuration plus where it came from. Loading happens before logging is
/// installed, so callers report `created` once their subscriber is up.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RtryConfig,
    pub path: PathBuf,
    /// A default file was written because none existed.
    pub created: bool,
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LoadedConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<LoadedConfig> {
    if path.exists() {
        return Ok(LoadedConfig {
            config: load_from(path)?,
            path: path.to_path_buf(),
            created: false,
        });
    }
    let default_cfg = RtryConfig::default();
    let toml = toml::to_string_pretty(&default_cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
    Ok(LoadedConfig {
        config: default_cfg,
        path: path.to_path_buf(),
        created: true,
    })
}

/// Load configuration from an explicit path; the file must exist.
pub fn load_from(path: &Path) -> Result<RtryConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RtryConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = RtryConfig::default();
        assert!(cfg.log_filter.is_none());
        assert_eq!(cfg.retry.policies.len(), 2);
        assert_eq!(cfg.retry.classifiers.len(), 3);
        assert!(cfg.retry.jitter_seed.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RtryConfig {
            log_filter: Some("debug".into()),
            retry: RetryConfig {
                jitter_seed: Some(42),
                ..RetryConfig::default()
            },
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RtryConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            log_filter = "warn"

            [retry]
            jitter_seed = 7
            policies = [
                { kind = "max_retries", count = 2 },
                { kind = "max_duration", ms = 10000 },
                { kind = "constant_interval", ms = 250 },
                { kind = "exponential_backoff", interval_ms = 100, max_interval_ms = 800 },
            ]
            classifiers = [
                { kind = "status", code = 429 },
                { kind = "unauthenticated" },
                { kind = "unauthorized" },
                { kind = "all" },
            ]
        "#;
        let cfg: RtryConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.log_filter.as_deref(), Some("warn"));
        assert_eq!(cfg.retry.jitter_seed, Some(7));
        assert_eq!(
            cfg.retry.policies,
            vec![
                PolicySpec::MaxRetries { count: 2 },
                PolicySpec::MaxDuration { ms: 10000 },
                PolicySpec::ConstantInterval { ms: 250 },
                PolicySpec::ExponentialBackoff {
                    interval_ms: 100,
                    max_interval_ms: 800
                },
            ]
        );
        assert_eq!(cfg.retry.classifiers[0], ClassifierSpec::Status { code: 429 });
        assert_eq!(cfg.retry.classifiers[3], ClassifierSpec::All);
    }

    #[test]
    fn missing_retry_section_uses_defaults() {
        let cfg: RtryConfig = toml::from_str("log_filter = \"info\"").unwrap();
        assert_eq!(cfg.retry, RetryConfig::default());
    }

    #[test]
    fn empty_classifier_list_is_kept() {
        let toml = r#"
            [retry]
            policies = [{ kind = "max_retries", count = 5 }]
            classifiers = []
        "#;
        let cfg: RtryConfig = toml::from_str(toml).unwrap();
        assert!(cfg.retry.plan().classifiers.is_empty());
    }

    #[test]
    fn plan_applies_jitter_seed() {
        let retry = RetryConfig {
            jitter_seed: Some(9),
            ..RetryConfig::default()
        };
        let plan = retry.plan();
        assert_eq!(plan.policies[0], Policy::max_retries(3));
        assert_eq!(
            plan.policies[1],
            Policy::exponential_backoff_seeded(
                Duration::from_millis(500),
                Duration::from_millis(3000),
                9
            )
        );
        assert_eq!(plan.classifiers.len(), 3);
    }

    #[test]
    fn load_from_path() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"[retry]\npolicies = []\nclassifiers = [{ kind = \"timeout\" }]\n")
            .unwrap();
        f.flush().unwrap();
        let cfg = load_from(f.path()).unwrap();
        assert!(cfg.retry.policies.is_empty());
        assert_eq!(cfg.retry.classifiers, vec![ClassifierSpec::Timeout]);
    }

    #[test]
    fn load_or_init_creates_default_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = load_or_init_at(&path).unwrap();
        assert!(first.created);
        assert!(path.exists());
        assert_eq!(first.config, RtryConfig::default());

        fs::write(&path, "log_filter = \"warn\"\n").unwrap();
        let second = load_or_init_at(&path).unwrap();
        assert!(!second.created);
        assert_eq!(second.path, path);
        assert_eq!(second.config.log_filter.as_deref(), Some("warn"));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"[retry]\npolicies = [{ kind = \"forever\" }]\nclassifiers = []\n")
            .unwrap();
        f.flush().unwrap();
        let err = load_from(f.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("parse"));
    }
}
