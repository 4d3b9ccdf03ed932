use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use effects::EffectId;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A stage: the set of drawing surfaces to open and the effect each shows.
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub surfaces: BTreeMap<String, SurfaceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    pub effect: Option<EffectId>,
    #[serde(
        default = "default_resize_debounce",
        deserialize_with = "deserialize_duration"
    )]
    pub resize_debounce: Duration,
    #[serde(default)]
    pub device_pixel_ratio: Option<f64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            effect: None,
            resize_debounce: default_resize_debounce(),
            device_pixel_ratio: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceEntry {
    #[serde(default)]
    pub effect: Option<EffectId>,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub title: Option<String>,
}

/// Surface entry with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSurface {
    pub name: String,
    pub effect: EffectId,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub device_pixel_ratio: Option<f64>,
}

fn default_resize_debounce() -> Duration {
    Duration::from_millis(250)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or(default_resize_debounce()))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of milliseconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_millis(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_millis(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v / 1000.0)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl StageConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: StageConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Stage with a single surface, used when no stage file is present.
    pub fn single(effect: &str, width: u32, height: u32) -> Self {
        let mut surfaces = BTreeMap::new();
        surfaces.insert(
            "main".to_string(),
            SurfaceEntry {
                effect: Some(EffectId::from(effect)),
                width,
                height,
                title: None,
            },
        );
        Self {
            version: 1,
            defaults: Defaults::default(),
            surfaces,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.surfaces.is_empty() {
            return Err(ConfigError::Invalid(
                "config must define at least one surface".into(),
            ));
        }

        if let Some(ratio) = self.defaults.device_pixel_ratio {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(ConfigError::Invalid(
                    "defaults.device_pixel_ratio must be > 0".into(),
                ));
            }
        }

        for (name, surface) in &self.surfaces {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("surface name may not be empty".into()));
            }
            if surface.width == 0 || surface.height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "surface '{name}' must have non-zero width and height"
                )));
            }
        }

        Ok(())
    }

    /// Effect token for a surface: its own, then `defaults.effect`, then the
    /// registry default.
    pub fn effect_for(&self, surface: &SurfaceEntry) -> EffectId {
        surface
            .effect
            .clone()
            .or_else(|| self.defaults.effect.clone())
            .unwrap_or_else(|| EffectId::from(effects::DEFAULT_EFFECT))
    }

    pub fn resolved_surfaces(&self) -> Vec<ResolvedSurface> {
        self.surfaces
            .iter()
            .map(|(name, surface)| ResolvedSurface {
                name: name.clone(),
                effect: self.effect_for(surface),
                width: surface.width,
                height: surface.height,
                title: surface.title.clone().unwrap_or_else(|| name.clone()),
                device_pixel_ratio: self.defaults.device_pixel_ratio,
            })
            .collect()
    }

    /// `(surface, token)` pairs whose token the registry will not recognise.
    /// These surfaces still render, using the default effect.
    pub fn unknown_effects(&self) -> Vec<(String, EffectId)> {
        self.resolved_surfaces()
            .into_iter()
            .filter(|surface| effects::EffectKind::from_token(surface.effect.as_str()).is_none())
            .map(|surface| (surface.name, surface.effect))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[defaults]
effect = "pulse-grid"
resize_debounce = "400ms"

[surfaces.background-shader]
effect = "chrome-liquid"
width = 1280
height = 720
title = "Background"

[surfaces.hero]
width = 640
height = 360

[surfaces.footer]
effect = "sparkles"
width = 320
height = 100
"#;

    #[test]
    fn parses_sample_config() {
        let config = StageConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.surfaces.len(), 3);
        assert_eq!(config.defaults.resize_debounce, Duration::from_millis(400));
    }

    #[test]
    fn resolves_effects_through_defaults() {
        let config = StageConfig::from_toml_str(SAMPLE).unwrap();
        let surfaces = config.resolved_surfaces();
        let hero = surfaces.iter().find(|s| s.name == "hero").unwrap();
        assert_eq!(hero.effect, "pulse-grid");
        assert_eq!(hero.title, "hero");

        let background = surfaces
            .iter()
            .find(|s| s.name == "background-shader")
            .unwrap();
        assert_eq!(background.effect, "chrome-liquid");
        assert_eq!(background.title, "Background");
    }

    #[test]
    fn falls_back_to_registry_default() {
        let config = StageConfig::from_toml_str(
            r#"
version = 1

[surfaces.main]
width = 10
height = 10
"#,
        )
        .unwrap();
        assert_eq!(config.resolved_surfaces()[0].effect, "liquid-metal");
        assert_eq!(config.defaults.resize_debounce, Duration::from_millis(250));
    }

    #[test]
    fn reports_unknown_effects_without_rejecting() {
        let config = StageConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(
            config.unknown_effects(),
            vec![("footer".to_string(), EffectId::from("sparkles"))]
        );
    }

    #[test]
    fn effect_tokens_are_trimmed_on_load() {
        let config = StageConfig::from_toml_str(
            r#"
version = 1

[surfaces.main]
effect = "  quantum-flux "
width = 10
height = 10
"#,
        )
        .unwrap();
        assert_eq!(config.resolved_surfaces()[0].effect, "quantum-flux");
        assert!(config.unknown_effects().is_empty());
    }

    #[test]
    fn numeric_debounce_is_milliseconds() {
        let config = StageConfig::from_toml_str(
            r#"
version = 1

[defaults]
resize_debounce = 100

[surfaces.main]
width = 10
height = 10
"#,
        )
        .unwrap();
        assert_eq!(config.defaults.resize_debounce, Duration::from_millis(100));
    }

    #[test]
    fn rejects_zero_sized_surface() {
        let err = StageConfig::from_toml_str(
            r#"
version = 1

[surfaces.main]
width = 0
height = 10
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_empty_stage() {
        let err = StageConfig::from_toml_str("version = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_version_and_ratio() {
        let err = StageConfig::from_toml_str(
            r#"
version = 2

[surfaces.main]
width = 10
height = 10
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = StageConfig::from_toml_str(
            r#"
version = 1

[defaults]
device_pixel_ratio = 0.0

[surfaces.main]
width = 10
height = 10
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn single_stage_is_valid() {
        let config = StageConfig::single("neon-genesis", 800, 600);
        config.validate().unwrap();
        assert!(config.unknown_effects().is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stage.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = StageConfig::load(&path).unwrap();
        assert_eq!(config.surfaces.len(), 3);

        let missing = StageConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
