use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("width must be a non-negative number of pixels or \"inherit\", got {0}")]
    Width(String),
    #[error("`{0}` must not be empty")]
    Empty(&'static str),
}

/// Configured drawing width of a view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWidth", into = "RawWidth")]
pub enum Width {
    Pixels(f64),
    /// Use the measured width of the host container at mapper build time.
    Inherit,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawWidth {
    Number(f64),
    Text(String),
}

impl TryFrom<RawWidth> for Width {
    type Error = ConfigError;

    fn try_from(raw: RawWidth) -> Result<Self, Self::Error> {
        match raw {
            RawWidth::Number(px) if px.is_finite() && px >= 0.0 => Ok(Width::Pixels(px)),
            RawWidth::Number(px) => Err(ConfigError::Width(px.to_string())),
            RawWidth::Text(s) if s == "inherit" => Ok(Width::Inherit),
            RawWidth::Text(s) => match s.trim_end_matches("px").parse::<f64>() {
                Ok(px) if px.is_finite() && px >= 0.0 => Ok(Width::Pixels(px)),
                _ => Err(ConfigError::Width(s)),
            },
        }
    }
}

impl From<Width> for RawWidth {
    fn from(width: Width) -> Self {
        match width {
            Width::Pixels(px) => RawWidth::Number(px),
            Width::Inherit => RawWidth::Text("inherit".into()),
        }
    }
}

/// Selector creation policy on band click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every click adds a selector.
    #[default]
    Multi,
    /// At most one selector per view.
    Single,
}

/// Per-view host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    /// Chromosome (segment) to load, e.g. `"1"` or `"X"`.
    pub chr: String,
    /// Scale the drawn length against chromosome 1 instead of filling the width.
    #[serde(default = "default_true", alias = "rel_size")]
    pub rel_size: bool,
    /// Reference assembly version (GRCh37, GRCh38, ...).
    #[serde(default = "default_assembly")]
    pub assembly: u32,
    #[serde(default = "default_width")]
    pub width: Width,
    /// Track height in pixels.
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_true")]
    pub axis: bool,
    #[serde(default)]
    pub mode: Mode,
    /// Namespaces the rendered container and owns this view's selectors.
    pub id: String,
}

fn default_true() -> bool {
    true
}

fn default_assembly() -> u32 {
    37
}

fn default_width() -> Width {
    Width::Inherit
}

fn default_height() -> f64 {
    20.0
}

impl ViewConfig {
    pub fn new(chr: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            chr: chr.into(),
            rel_size: default_true(),
            assembly: default_assembly(),
            width: default_width(),
            height: default_height(),
            axis: default_true(),
            mode: Mode::default(),
            id: id.into(),
        }
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chr.trim().is_empty() {
            return Err(ConfigError::Empty("chr"));
        }
        if self.id.trim().is_empty() {
            return Err(ConfigError::Empty("id"));
        }
        Ok(())
    }

    pub fn with_width(mut self, width: Width) -> Self {
        self.width = width;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_rel_size(mut self, rel_size: bool) -> Self {
        self.rel_size = rel_size;
        self
    }

    pub fn with_axis(mut self, axis: bool) -> Self {
        self.axis = axis;
        self
    }
}
