use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config JSON at {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fixed rectangle on the canvas where one text field is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    pub fn overlaps(&self, other: &Region) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Per-field fitting constraints. Sizes are integer pixel candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldStyle {
    pub max_lines: usize,
    pub max_size: u32,
    pub min_size: u32,
    pub weight: u16,
    pub line_height: f32,
    #[serde(default)]
    pub letter_spacing: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FontFace {
    pub weight: u16,
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldRegions {
    pub name: Region,
    pub role: Region,
    pub phone: Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldStyles {
    pub name: FieldStyle,
    pub role: FieldStyle,
    pub phone: FieldStyle,
}

/// Static render configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CardConfig {
    pub canvas: Canvas,
    /// Background source: filesystem path, `data:` URI, or http(s) URL.
    pub background: String,
    pub fonts: Vec<FontFace>,
    pub regions: FieldRegions,
    pub styles: FieldStyles,
    /// Foreground text color, `#rrggbb`.
    pub color: String,
    pub default_country: String,
    pub export_prefix: String,
    /// Outline each region when rendering. Visual verification only.
    pub debug: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas { width: 2048, height: 776 },
            background: "app/assets/card_background.png".to_string(),
            fonts: vec![
                FontFace { weight: 900, file: "Roboto-Black.ttf".to_string() },
                FontFace { weight: 800, file: "Roboto-ExtraBold.ttf".to_string() },
            ],
            regions: FieldRegions {
                name: Region { x: 650, y: 78, w: 1320, h: 160 },
                role: Region { x: 650, y: 262, w: 1320, h: 86 },
                phone: Region { x: 650, y: 392, w: 1320, h: 86 },
            },
            styles: FieldStyles {
                name: FieldStyle {
                    max_lines: 2,
                    max_size: 86,
                    min_size: 34,
                    weight: 900,
                    line_height: 1.06,
                    letter_spacing: 0.0,
                },
                role: FieldStyle {
                    max_lines: 1,
                    max_size: 42,
                    min_size: 24,
                    weight: 800,
                    line_height: 1.15,
                    letter_spacing: 0.0,
                },
                phone: FieldStyle {
                    max_lines: 1,
                    max_size: 42,
                    min_size: 22,
                    weight: 800,
                    line_height: 1.15,
                    letter_spacing: 0.0,
                },
            },
            color: "#1b5a92".to_string(),
            default_country: "+54".to_string(),
            export_prefix: "tarjeta".to_string(),
            debug: false,
        }
    }
}

impl CardConfig {
    /// Loads from `CARD_CONFIG` (or the default path). A missing file yields
    /// the built-in card grid, matching how the backend treats optional data
    /// files elsewhere.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CARD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root().join("app").join("data").join("card_config.json"));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.validate()?;
                return Ok(cfg);
            }
            Err(e) => {
                return Err(ConfigError::Read { path: path.to_path_buf(), source: e })
            }
        };

        let cfg: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), source: e })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Invalid("canvas dimensions must be non-zero".into()));
        }
        if self.fonts.is_empty() {
            return Err(ConfigError::Invalid("at least one font face is required".into()));
        }

        let named = [
            ("name", self.regions.name, self.styles.name),
            ("role", self.regions.role, self.styles.role),
            ("phone", self.regions.phone, self.styles.phone),
        ];
        for (field, region, style) in &named {
            if region.w == 0 || region.h == 0 {
                return Err(ConfigError::Invalid(format!("{field} region is empty")));
            }
            if style.min_size == 0 || style.min_size > style.max_size {
                return Err(ConfigError::Invalid(format!(
                    "{field} sizes invalid: min {} max {}",
                    style.min_size, style.max_size
                )));
            }
            if style.max_lines == 0 {
                return Err(ConfigError::Invalid(format!("{field} max_lines must be >= 1")));
            }
        }
        for i in 0..named.len() {
            for j in (i + 1)..named.len() {
                if named[i].1.overlaps(&named[j].1) {
                    return Err(ConfigError::Invalid(format!(
                        "regions {} and {} overlap",
                        named[i].0, named[j].0
                    )));
                }
            }
        }
        Ok(())
    }
}

/// App root for data/asset paths, overridable for deployments.
pub fn project_root() -> PathBuf {
    std::env::var("PROJECT_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_regions_do_not_overlap() {
        let cfg = CardConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(!cfg.regions.name.overlaps(&cfg.regions.role));
        assert!(!cfg.regions.role.overlaps(&cfg.regions.phone));
        assert!(!cfg.regions.name.overlaps(&cfg.regions.phone));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = CardConfig::load_from(Path::new("/nonexistent/card_config.json")).unwrap();
        assert_eq!(cfg, CardConfig::default());
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r##"{{"color": "#000000", "default_country": "+34"}}"##).unwrap();
        let cfg = CardConfig::load_from(f.path()).unwrap();
        assert_eq!(cfg.color, "#000000");
        assert_eq!(cfg.default_country, "+34");
        assert_eq!(cfg.canvas, CardConfig::default().canvas);
    }

    #[test]
    fn overlapping_regions_rejected() {
        let mut cfg = CardConfig::default();
        cfg.regions.role = cfg.regions.name;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        assert!(matches!(
            CardConfig::load_from(f.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
