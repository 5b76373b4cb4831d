use anyhow::Context;
use chatcloud_core::Viewport;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 40.0,
            right: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub sock_path: String,
    /// Outer timeline width; brush pixels are measured inside the margins.
    pub timeline_width: f64,
    pub timeline_margins: Margins,
    pub cloud_width: f64,
    pub cloud_height: f64,
    pub bar_width: usize,
    pub top_words: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            sock_path: default_uds_path(),
            timeline_width: 760.0,
            timeline_margins: Margins::default(),
            cloud_width: 800.0,
            cloud_height: 600.0,
            bar_width: 40,
            top_words: 25,
        }
    }
}

impl ViewerConfig {
    pub fn timeline_inner_width(&self) -> f64 {
        (self.timeline_width - self.timeline_margins.left - self.timeline_margins.right).max(0.0)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            timeline_width: self.timeline_inner_width(),
            cloud_width: self.cloud_width,
            cloud_height: self.cloud_height,
        }
    }
}

fn default_uds_path() -> String {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        format!("{dir}/chatcloud.sock")
    } else {
        "/tmp/chatcloud.sock".to_string()
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "chatcloud")?;
    Some(proj.config_dir().join("viewer.toml"))
}

/// Reads the config file, writing the defaults out on first run so there is
/// something to edit.
pub fn load_or_init() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    if !path.exists() {
        let cfg = ViewerConfig::default();
        if let Err(err) = save_to_path(&cfg, &path) {
            tracing::warn!(error = %format!("{err:#}"), "could not write default viewer config");
        }
        return cfg;
    }
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), error = %err, "ignoring malformed viewer config");
        ViewerConfig::default()
    })
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}
