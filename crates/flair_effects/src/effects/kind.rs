//! Effect kinds and per-instance effect configuration

use std::fmt;

use flair_core::Color;
use serde::{Deserialize, Serialize};

/// Named interactive behavior attached to an element
///
/// Parsed from lowercase names. Anything unrecognized becomes
/// [`EffectKind::None`], the inert no-effect behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EffectKind {
    Zoom,
    Lift,
    Glow,
    Rotate,
    Magnetic,
    Spotlight,
    Tilt,
    Floating,
    Parallax,
    #[default]
    None,
}

impl EffectKind {
    pub const ALL: [EffectKind; 10] = [
        EffectKind::Zoom,
        EffectKind::Lift,
        EffectKind::Glow,
        EffectKind::Rotate,
        EffectKind::Magnetic,
        EffectKind::Spotlight,
        EffectKind::Tilt,
        EffectKind::Floating,
        EffectKind::Parallax,
        EffectKind::None,
    ];

    /// Parse a kind name, falling back to `None` for unknown names
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "zoom" => EffectKind::Zoom,
            "lift" => EffectKind::Lift,
            "glow" => EffectKind::Glow,
            "rotate" => EffectKind::Rotate,
            "magnetic" => EffectKind::Magnetic,
            "spotlight" => EffectKind::Spotlight,
            "tilt" => EffectKind::Tilt,
            "floating" => EffectKind::Floating,
            "parallax" => EffectKind::Parallax,
            "none" | "" => EffectKind::None,
            other => {
                tracing::warn!(kind = other, "unknown effect kind, using none");
                EffectKind::None
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Zoom => "zoom",
            EffectKind::Lift => "lift",
            EffectKind::Glow => "glow",
            EffectKind::Rotate => "rotate",
            EffectKind::Magnetic => "magnetic",
            EffectKind::Spotlight => "spotlight",
            EffectKind::Tilt => "tilt",
            EffectKind::Floating => "floating",
            EffectKind::Parallax => "parallax",
            EffectKind::None => "none",
        }
    }

    /// Whether the effect reacts to pointer hover
    pub fn is_pointer_driven(&self) -> bool {
        matches!(
            self,
            EffectKind::Zoom
                | EffectKind::Lift
                | EffectKind::Glow
                | EffectKind::Rotate
                | EffectKind::Magnetic
                | EffectKind::Spotlight
                | EffectKind::Tilt
        )
    }
}

impl From<String> for EffectKind {
    fn from(name: String) -> Self {
        EffectKind::parse(&name)
    }
}

impl From<&str> for EffectKind {
    fn from(name: &str) -> Self {
        EffectKind::parse(name)
    }
}

impl From<EffectKind> for String {
    fn from(kind: EffectKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable descriptor supplied by the component using an effect
///
/// Unset fields fall back to the section defaults in
/// [`EffectsConfig`](crate::config::EffectsConfig).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub kind: EffectKind,
    /// Kind-specific strength: pull in pixels for magnetic, degrees for tilt
    /// and rotate, scale for zoom, radius for spotlight, opacity for glow,
    /// otherwise a distance in pixels
    pub strength: Option<f32>,
    /// Loop period override for floating
    pub duration_ms: Option<u32>,
    pub colors: Vec<Color>,
    /// Explicit reduced-motion override for this instance
    pub disable_animation: Option<bool>,
    /// Position among sibling effects, used to phase-shift loops
    pub index: usize,
}

impl EffectConfig {
    pub fn new(kind: impl Into<EffectKind>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn strength(mut self, strength: f32) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    pub fn disable_animation(mut self, disable: bool) -> Self {
        self.disable_animation = Some(disable);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::parse(kind.name()), kind);
        }
        assert_eq!(EffectKind::parse(" Tilt "), EffectKind::Tilt);
    }

    #[test]
    fn test_unknown_kind_is_none() {
        assert_eq!(EffectKind::parse("wobble"), EffectKind::None);
        assert_eq!(EffectKind::from("sparkle".to_string()), EffectKind::None);
    }

    #[test]
    fn test_builder() {
        let config = EffectConfig::new("magnetic").strength(30.0).index(2);
        assert_eq!(config.kind, EffectKind::Magnetic);
        assert_eq!(config.strength, Some(30.0));
        assert_eq!(config.index, 2);
        assert_eq!(config.disable_animation, None);
    }
}
