use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, info, trace, warn};

use crate::colors::ColorTable;

const COLOR_KEY_PREFIX: &str = "color.task.";

/// Key-value configuration loaded from `~/.weekgridrc` (or `WEEKGRID_RC`),
/// with `include` support and `rc.key=value` command-line overrides.
/// Carries the backend location, the auth token, and the task-code color
/// table.
#[derive(Debug, Clone)]
pub struct Config {
    map: HashMap<String, String>,
    pub loaded_files: Vec<PathBuf>,
}

impl Config {
    #[tracing::instrument(skip(rc_override))]
    pub fn load(rc_override: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = Config {
            map: HashMap::new(),
            loaded_files: vec![],
        };

        cfg.map.insert(
            "backend.url".to_string(),
            "http://localhost:3000".to_string(),
        );
        cfg.map.insert("color".to_string(), "on".to_string());

        let rc_path = resolve_rc_path(rc_override)?;
        if let Some(path) = rc_path {
            info!(rc = %path.display(), "loading weekgridrc");
            cfg.load_file(&path)?;
        } else {
            warn!("no weekgridrc found; using defaults");
        }

        Ok(cfg)
    }

    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
            loaded_files: vec![],
        }
    }

    #[tracing::instrument(skip(self, overrides))]
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in overrides {
            let key = k.strip_prefix("rc.").unwrap_or(&k).to_string();
            debug!(key = %key, value = %v, "applying override");
            self.map.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.map.get(key).map(|v| parse_bool(v))
    }

    pub fn backend_url(&self) -> String {
        self.get("backend.url")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
    }

    pub fn backend_token(&self) -> Option<String> {
        self.get("backend.token").filter(|t| !t.is_empty())
    }

    /// Build the task-code color table: the built-in palette first, then
    /// `color.task.<CODE>` entries overriding or extending it (sorted by
    /// code for a stable order), with `color.task.default` as the fallback.
    pub fn color_table(&self) -> ColorTable {
        let defaults = ColorTable::defaults();
        let mut entries: Vec<(String, String)> = defaults
            .entries()
            .map(|(code, color)| (code.to_string(), color.to_string()))
            .collect();

        let mut configured: Vec<(&String, &String)> = self
            .map
            .iter()
            .filter(|(key, _)| key.starts_with(COLOR_KEY_PREFIX))
            .collect();
        configured.sort_by_key(|(key, _)| key.as_str());

        let mut fallback = defaults.fallback().to_string();
        for (key, value) in configured {
            let code = &key[COLOR_KEY_PREFIX.len()..];
            if code == "default" {
                fallback = value.clone();
                continue;
            }
            match entries.iter_mut().find(|(existing, _)| existing == code) {
                Some(entry) => entry.1 = value.clone(),
                None => entries.push((code.to_string(), value.clone())),
            }
        }

        ColorTable::new(entries, fallback)
    }

    #[tracing::instrument(skip(self))]
    fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let path = expand_tilde(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        self.loaded_files.push(path.clone());

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        for (line_num, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            // No inline comments: values are hex colors, so '#' only opens
            // a comment at the start of a line.
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(include_rest) = line.strip_prefix("include ") {
                let include_path = resolve_include_path(&base_dir, include_rest.trim())?;
                debug!(
                    file = %path.display(),
                    include = %include_path.display(),
                    line = line_num + 1,
                    "processing include"
                );

                if include_path.exists() {
                    self.load_file(&include_path)?;
                } else {
                    warn!(include = %include_path.display(), "include file does not exist; skipping");
                }
                continue;
            }

            let (k, v) = line.split_once('=').ok_or_else(|| {
                anyhow!(
                    "invalid config line {}:{}: {}",
                    path.display(),
                    line_num + 1,
                    raw_line
                )
            })?;

            let key = k.trim().to_string();
            let value = v.trim().to_string();
            trace!(key = %key, value = %value, "loaded config key");
            self.map.insert(key, value);
        }

        Ok(())
    }
}

#[tracing::instrument(skip(override_path))]
fn resolve_rc_path(override_path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = override_path {
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(rc_env) = std::env::var("WEEKGRID_RC") {
        if rc_env == "/dev/null" {
            return Ok(None);
        }
        return Ok(Some(PathBuf::from(rc_env)));
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    let candidate = home.join(".weekgridrc");
    if candidate.exists() {
        return Ok(Some(candidate));
    }

    Ok(None)
}

fn resolve_include_path(base_dir: &Path, include: &str) -> anyhow::Result<PathBuf> {
    if include.trim().is_empty() {
        return Err(anyhow!("include path cannot be empty"));
    }

    let raw = PathBuf::from(include);
    let expanded = expand_tilde(&raw);
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base_dir.join(expanded))
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "on" | "true"
    )
}
