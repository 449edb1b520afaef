//! Configuration types and validation for the masking pipeline

use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, str::FromStr};

use crate::error::{Error, Result};

/// Fill colour of a mask, each component in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "[f32; 3]")]
pub struct MaskColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Named colours accepted wherever a colour is parsed from a single string
const NAMED_COLORS: &[(&str, [f32; 3])] = &[
    ("black", [0.0, 0.0, 0.0]),
    ("white", [1.0, 1.0, 1.0]),
    ("red", [1.0, 0.0, 0.0]),
    ("green", [0.0, 1.0, 0.0]),
    ("blue", [0.0, 0.0, 1.0]),
    ("yellow", [1.0, 1.0, 0.0]),
];

impl MaskColor {
    pub const BLACK: MaskColor = MaskColor { r: 0.0, g: 0.0, b: 0.0 };

    /// Builds a colour, rejecting components outside `[0, 1]`
    pub fn new(r: f32, g: f32, b: f32) -> Result<Self> {
        for (name, value) in [("red", r), ("green", g), ("blue", b)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration(format!(
                    "{} component {} is outside [0, 1]",
                    name, value
                )));
            }
        }
        Ok(Self { r, g, b })
    }

    /// Parses the values given to `--color`: either three floats in `[0, 1]`
    /// or a single colour name / `r,g,b` triple of 0-255 integers.
    pub fn from_args<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        match values {
            [single] => single.as_ref().parse(),
            [r, g, b] => {
                let component = |s: &S| {
                    s.as_ref().trim().parse::<f32>().map_err(|_| {
                        Error::InvalidConfiguration(format!(
                            "'{}' is not a number",
                            s.as_ref()
                        ))
                    })
                };
                Self::new(component(r)?, component(g)?, component(b)?)
            }
            _ => Err(Error::InvalidConfiguration(format!(
                "expected 3 colour components or one colour name, got {} values",
                values.len()
            ))),
        }
    }

    pub fn components(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for MaskColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for MaskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for MaskColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((_, [r, g, b])) = NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
        {
            return Self::new(*r, *g, *b);
        }

        let channels = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| {
                Error::InvalidConfiguration(format!(
                    "invalid colour '{}'; use black, white, red, green, blue, yellow or 'r,g,b' with 0-255 values",
                    s
                ))
            })?;

        match channels.as_slice() {
            [r, g, b] => Self::new(
                f32::from(*r) / 255.0,
                f32::from(*g) / 255.0,
                f32::from(*b) / 255.0,
            ),
            _ => Err(Error::InvalidConfiguration(format!(
                "colour '{}' must have exactly 3 channels",
                s
            ))),
        }
    }
}

/// On-disk forms of a colour: `[r, g, b]` or a string
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Components([f32; 3]),
    Text(String),
}

impl TryFrom<ColorRepr> for MaskColor {
    type Error = Error;

    fn try_from(repr: ColorRepr) -> Result<Self> {
        match repr {
            ColorRepr::Components([r, g, b]) => MaskColor::new(r, g, b),
            ColorRepr::Text(text) => text.parse(),
        }
    }
}

impl From<MaskColor> for [f32; 3] {
    fn from(color: MaskColor) -> Self {
        color.components()
    }
}

/// Options that shape a masking run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Fill colour of every rectangle
    pub color: MaskColor,
    /// Horizontal widening of each rectangle, as a ratio of its width per side
    pub padding: f32,
    /// Per-page and per-occurrence diagnostics
    pub verbose: bool,
    /// Search and report without writing an output file
    pub dry_run: bool,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            color: MaskColor::BLACK,
            padding: 0.0,
            verbose: false,
            dry_run: false,
        }
    }
}

impl MaskConfig {
    pub fn validate(&self) -> Result<()> {
        MaskColor::new(self.color.r, self.color.g, self.color.b)?;
        if !self.padding.is_finite() || !(0.0..=1.0).contains(&self.padding) {
            return Err(Error::InvalidConfiguration(format!(
                "padding {} is outside [0, 1]",
                self.padding
            )));
        }
        Ok(())
    }

    /// Loads a config file, trying JSON first and then YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: MaskConfig = serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| Error::ConfigError(format!("Config parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
