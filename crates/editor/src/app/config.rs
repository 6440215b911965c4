use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use editor_engine::{LoopConfig, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const CONFIG_PATH_ENV_VAR: &str = "SCENE_EDITOR_CONFIG";
pub(crate) const TICK_RATE_ENV_VAR: &str = "SCENE_EDITOR_TPS";
pub(crate) const MOVEMENT_STEP_ENV_VAR: &str = "SCENE_EDITOR_STEP";

const LAYOUT_GAP_PX: i32 = 16;
const PANEL_MIN_HEIGHT_PX: i32 = 160;
/// Largest scene or viewport side; keeps every surface and layout edge in `i32`.
const MAX_SIDE_PX: u32 = 16_384;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config json at {at}: {source}")]
    Parse {
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EditorConfig {
    pub(crate) window_title: String,
    pub(crate) scene_width: u32,
    pub(crate) scene_height: u32,
    pub(crate) viewport_width: u32,
    pub(crate) viewport_height: u32,
    pub(crate) minimap_ratio: u32,
    pub(crate) movement_step: u32,
    pub(crate) tick_rate: u32,
    pub(crate) metrics_interval_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window_title: "Scene Editor".to_string(),
            scene_width: 2000,
            scene_height: 2000,
            viewport_width: 800,
            viewport_height: 600,
            minimap_ratio: 5,
            movement_step: 5,
            tick_rate: 60,
            metrics_interval_ms: 1000,
        }
    }
}

/// Where each editor region sits inside the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EditorLayout {
    pub(crate) viewport: Rect,
    pub(crate) minimap: Rect,
    pub(crate) panel: Rect,
    pub(crate) framebuffer_width: u32,
    pub(crate) framebuffer_height: u32,
}

impl EditorConfig {
    /// File named by `SCENE_EDITOR_CONFIG` (or defaults), then per-field env overrides.
    pub(crate) fn load_from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                info!(path = %path.display(), "config_file_selected");
                Self::load_from_path(&path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub(crate) fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: Self = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let at = error.path().to_string();
            ConfigError::Parse {
                at,
                source: error.into_inner(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Invalid override values are logged and ignored.
    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = positive_override(&lookup, TICK_RATE_ENV_VAR) {
            self.tick_rate = value;
        }
        if let Some(value) = positive_override(&lookup, MOVEMENT_STEP_ENV_VAR) {
            self.movement_step = value;
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("scene_width", self.scene_width),
            ("scene_height", self.scene_height),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("minimap_ratio", self.minimap_ratio),
            ("movement_step", self.movement_step),
            ("tick_rate", self.tick_rate),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        let bounded = [
            ("scene_width", self.scene_width),
            ("scene_height", self.scene_height),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("movement_step", self.movement_step),
        ];
        for (field, value) in bounded {
            if value > MAX_SIDE_PX {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} exceeds the maximum of {MAX_SIDE_PX}"),
                });
            }
        }
        if self.minimap_ratio > self.scene_width.min(self.scene_height) {
            return Err(ConfigError::Invalid {
                field: "minimap_ratio",
                reason: format!(
                    "{} would shrink the {}x{} scene to nothing",
                    self.minimap_ratio, self.scene_width, self.scene_height
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn minimap_size(&self) -> (u32, u32) {
        (
            self.scene_width / self.minimap_ratio,
            self.scene_height / self.minimap_ratio,
        )
    }

    pub(crate) fn layout(&self) -> EditorLayout {
        let (minimap_w, minimap_h) = self.minimap_size();
        let (minimap_w, minimap_h) = (minimap_w as i32, minimap_h as i32);
        let viewport_w = self.viewport_width as i32;
        let viewport_h = self.viewport_height as i32;

        let column_x = viewport_w + LAYOUT_GAP_PX;
        let panel_y = minimap_h + LAYOUT_GAP_PX;
        let height = viewport_h.max(panel_y + PANEL_MIN_HEIGHT_PX);
        let width = column_x + minimap_w;

        EditorLayout {
            viewport: Rect::new(0, 0, viewport_w, viewport_h),
            minimap: Rect::new(column_x, 0, minimap_w, minimap_h),
            panel: Rect::new(column_x, panel_y, minimap_w, height - panel_y),
            framebuffer_width: width as u32,
            framebuffer_height: height as u32,
        }
    }

    pub(crate) fn loop_config(&self) -> LoopConfig {
        let layout = self.layout();
        LoopConfig {
            window_title: self.window_title.clone(),
            framebuffer_width: layout.framebuffer_width,
            framebuffer_height: layout.framebuffer_height,
            target_tps: self.tick_rate,
            metrics_log_interval: Duration::from_millis(self.metrics_interval_ms),
        }
    }
}

fn positive_override(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Option<u32> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(var = name, value = %raw, "config_override_ignored");
            None
        }
    }
}
