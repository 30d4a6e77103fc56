//! Effect defaults loaded from TOML
//!
//! Every section is optional; missing sections and fields keep their
//! built-in defaults. A file only needs to list what it changes:
//!
//! ```toml
//! [magnetic]
//! strength = 20.0
//!
//! [tilt]
//! tilt_amount = 12.0
//! spring = { stiffness = 300.0, damping = 35.0 }
//!
//! [backgrounds.beams]
//! density = 12
//! colors = ["#18ccfc", "#6344f5"]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backgrounds::{AuroraConfig, BackgroundEffectConfig, GridDotsConfig, MovingBorderConfig};
use crate::effects::hover::{FloatingConfig, HoverConfig};
use crate::effects::magnetic::MagneticConfig;
use crate::effects::parallax::ParallaxConfig;
use crate::effects::spotlight::SpotlightConfig;
use crate::effects::stagger::StaggerConfig;
use crate::effects::tilt::TiltConfig;
use crate::effects::typewriter::TypewriterConfig;
use crate::error::{EffectsError, Result};

/// Defaults for every effect and background
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub magnetic: MagneticConfig,
    pub spotlight: SpotlightConfig,
    pub tilt: TiltConfig,
    pub hover: HoverConfig,
    pub floating: FloatingConfig,
    pub parallax: ParallaxConfig,
    pub typewriter: TypewriterConfig,
    pub stagger: StaggerConfig,
    pub backgrounds: BackgroundsConfig,
}

/// Background renderer defaults
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundsConfig {
    pub beams: BackgroundEffectConfig,
    pub particles: BackgroundEffectConfig,
    pub grid_dots: GridDotsConfig,
    pub moving_border: MovingBorderConfig,
    pub aurora: AuroraConfig,
}

impl Default for BackgroundsConfig {
    fn default() -> Self {
        Self {
            beams: BackgroundEffectConfig::default(),
            particles: BackgroundEffectConfig::default().with_density(40),
            grid_dots: GridDotsConfig::default(),
            moving_border: MovingBorderConfig::default(),
            aurora: AuroraConfig::default(),
        }
    }
}

impl EffectsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EffectsError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded effects config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::stagger::StaggerOrder;
    use flair_animation::SpringConfig;
    use flair_core::Color;

    #[test]
    fn test_empty_file_is_default() {
        let config = EffectsConfig::from_toml_str("").unwrap();
        assert_eq!(config, EffectsConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = EffectsConfig::from_toml_str(
            r#"
            [magnetic]
            strength = 20.0

            [tilt]
            tilt_amount = 12.0
            spring = { stiffness = 300.0, damping = 35.0 }

            [stagger]
            order = "from_center"
            limit = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.magnetic.strength, 20.0);
        assert_eq!(config.magnetic.spring, SpringConfig::magnetic());
        assert_eq!(config.tilt.tilt_amount, 12.0);
        assert_eq!(config.tilt.hover_scale, 1.05);
        assert_eq!(config.tilt.spring.stiffness, 300.0);
        assert_eq!(config.tilt.spring.mass, 1.0);
        assert_eq!(config.stagger.order, StaggerOrder::FromCenter);
        assert_eq!(config.stagger.limit, Some(4));
        assert_eq!(config.hover, HoverConfig::default());
    }

    #[test]
    fn test_background_palette_from_hex() {
        let config = EffectsConfig::from_toml_str(
            r##"
            [backgrounds.beams]
            density = 12
            colors = ["#ff0000", "#00ff0080"]
            "##,
        )
        .unwrap();
        let beams = &config.backgrounds.beams;
        assert_eq!(beams.density, 12);
        assert_eq!(beams.colors[0], Color::rgb(1.0, 0.0, 0.0));
        assert!((beams.colors[1].a - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(config.backgrounds.particles.density, 40);
    }

    #[test]
    fn test_invalid_color_is_an_error() {
        let err = EffectsConfig::from_toml_str(
            r#"
            [spotlight]
            color = "not-a-color"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, EffectsError::ConfigParse(_)));
        assert!(err.to_string().contains("not-a-color"));
    }

    #[test]
    fn test_invalid_scroll_offset_is_an_error() {
        let err = EffectsConfig::from_toml_str(
            r#"
            [parallax.window]
            start = "middle nowhere"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, EffectsError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EffectsConfig::load("/nonexistent/flair-effects.toml").unwrap_err();
        assert!(matches!(err, EffectsError::ConfigRead { .. }));
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let text = EffectsConfig::default().to_toml_string().unwrap();
        let parsed = EffectsConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.tilt, TiltConfig::default());
        assert_eq!(parsed.stagger, StaggerConfig::default());
    }
}
