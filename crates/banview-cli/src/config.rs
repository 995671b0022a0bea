// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "banview";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_DEMO_SEED: i64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub source: Source,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            source: Source::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub show_totals: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            show_totals: Some(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub snapshot_path: Option<String>,
    pub demo_seed: Option<i64>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            demo_seed: Some(DEFAULT_DEMO_SEED),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("BANVIEW_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set BANVIEW_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [ui] and [source]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        if let Some(snapshot_path) = &self.source.snapshot_path {
            validate_snapshot_path(snapshot_path)?;
        }

        if let Some(seed) = self.source.demo_seed
            && seed < 0
        {
            bail!(
                "source.demo_seed in {} must be non-negative, got {}",
                path.display(),
                seed
            );
        }

        Ok(())
    }

    pub fn snapshot_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.source.snapshot_path {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = env::var_os("BANVIEW_SNAPSHOT_PATH") {
            return Ok(PathBuf::from(path));
        }
        default_snapshot_path()
    }

    pub fn show_totals(&self) -> bool {
        self.ui.show_totals.unwrap_or(true)
    }

    pub fn demo_seed(&self) -> u64 {
        self.source.demo_seed.unwrap_or(DEFAULT_DEMO_SEED).max(0) as u64
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# banview config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\nshow_totals = true\n\n[source]\n# Optional. Default is platform data dir (for example ~/.local/share/banview/bans.json)\n# snapshot_path = \"/absolute/path/to/bans.json\"\ndemo_seed = {}\n",
            path.display(),
            DEFAULT_DEMO_SEED,
        )
    }
}

/// A snapshot path is a plain filesystem path; anything URI-shaped is a
/// misconfiguration, not a fetch target.
fn validate_snapshot_path(raw: &str) -> Result<()> {
    if raw.contains("://") {
        bail!(
            "source.snapshot_path {raw:?} looks like a URI; use a filesystem path to a local snapshot"
        );
    }
    if raw.trim().is_empty() {
        bail!("source.snapshot_path must not be empty");
    }
    Ok(())
}

fn default_snapshot_path() -> Result<PathBuf> {
    let data_root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set BANVIEW_SNAPSHOT_PATH to the snapshot file")
    })?;
    Ok(data_root.join(APP_NAME).join("bans.json"))
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert!(config.show_totals());
        assert_eq!(config.demo_seed(), 1);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\nshow_totals = false\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[ui] and [source]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[ui]\nshow_totals = false\n[source]\nsnapshot_path = \"/var/lib/banview/bans.json\"\ndemo_seed = 7\n",
        )?;

        let config = Config::load(&path)?;
        assert!(!config.show_totals());
        assert_eq!(config.demo_seed(), 7);
        assert_eq!(
            config.snapshot_path()?,
            PathBuf::from("/var/lib/banview/bans.json")
        );
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 3\n")?;
        let error = Config::load(&path).expect_err("v3 config should fail");
        assert!(error.to_string().contains("unsupported config version 3"));
        Ok(())
    }

    #[test]
    fn negative_demo_seed_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[source]\ndemo_seed = -4\n")?;
        let error = Config::load(&path).expect_err("negative seed should fail");
        assert!(error.to_string().contains("must be non-negative"));
        Ok(())
    }

    #[test]
    fn uri_style_snapshot_path_is_rejected() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[source]\nsnapshot_path = \"https://evil.example/bans.json\"\n",
        )?;
        let error = Config::load(&path).expect_err("URI path should fail validation");
        assert!(error.to_string().contains("looks like a URI"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("BANVIEW_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("BANVIEW_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn snapshot_path_prefers_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[source]\nsnapshot_path = \"/explicit/bans.json\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("BANVIEW_SNAPSHOT_PATH", "/from/env.json");
        }
        let config = Config::load(&path)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("BANVIEW_SNAPSHOT_PATH");
        }
        assert_eq!(config.snapshot_path()?, PathBuf::from("/explicit/bans.json"));
        Ok(())
    }

    #[test]
    fn snapshot_path_uses_env_override_when_config_is_silent() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("BANVIEW_SNAPSHOT_PATH", "/from/env-only.json");
        }
        let config = Config::load(&path)?;
        let resolved = config.snapshot_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("BANVIEW_SNAPSHOT_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.json"));
        Ok(())
    }

    #[test]
    fn snapshot_path_defaults_to_bans_json_when_unset() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("BANVIEW_SNAPSHOT_PATH");
        }
        let config = Config::load(&path)?;
        let resolved = config.snapshot_path()?;
        assert!(resolved.ends_with("bans.json"), "got {}", resolved.display());
        Ok(())
    }

    #[test]
    fn example_config_includes_required_sections() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("[source]"));
        Ok(())
    }
}
