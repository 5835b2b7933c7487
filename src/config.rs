use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Horizontal band policy for the generic flow layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Justify,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Node rectangle width used by the generic flow layout, px.
    pub node_width: f32,
    /// Vertical gap between stacked nodes in one column, px.
    pub node_padding: f32,
    /// Vertical compression of the generic layout, 0 < scale <= 1. The
    /// compressed extent is centered in the canvas.
    pub flow_scale: f32,
    pub align: Align,
}

impl LayoutConfig {
    /// Out-of-range values are clamped, never rejected.
    pub fn effective_flow_scale(&self) -> f32 {
        if self.flow_scale.is_finite() {
            self.flow_scale.clamp(0.05, 1.0)
        } else {
            1.0
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 26.0,
            node_padding: 14.0,
            flow_scale: 0.85,
            align: Align::Justify,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl RenderConfig {
    pub fn canvas(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

/// Partial on-disk shape; every field optional so a config file only
/// overrides what it names.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    node_width: Option<f32>,
    node_padding: Option<f32>,
    flow_scale: Option<f32>,
    align: Option<Align>,
    width: Option<f32>,
    height: Option<f32>,
}

/// Load a JSON (or JSON5) config file on top of the defaults. `None`
/// yields the default config.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "reference" || theme_name == "default" {
            config.theme = Theme::reference();
        }
    }
    if let Some(v) = parsed.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = parsed.font_size {
        config.theme.font_size = v;
    }
    if let Some(v) = parsed.background {
        config.theme.background = v.clone();
        config.render.background = v;
    }
    if let Some(v) = parsed.node_width {
        config.layout.node_width = v;
    }
    if let Some(v) = parsed.node_padding {
        config.layout.node_padding = v;
    }
    if let Some(v) = parsed.flow_scale {
        config.layout.flow_scale = v;
    }
    if let Some(v) = parsed.align {
        config.layout.align = v;
    }
    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_scale_is_clamped() {
        let mut config = LayoutConfig::default();
        config.flow_scale = 3.0;
        assert_eq!(config.effective_flow_scale(), 1.0);
        config.flow_scale = -1.0;
        assert_eq!(config.effective_flow_scale(), 0.05);
        config.flow_scale = f32::NAN;
        assert_eq!(config.effective_flow_scale(), 1.0);
    }

    #[test]
    fn missing_config_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.align, Align::Justify);
        assert_eq!(config.render.width, 960.0);
    }
}
