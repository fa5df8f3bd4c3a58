//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Hard ceiling on `max_lod`, matching the size of the distance-LUT
/// uniform array on the shader side.
pub const MAX_LOD_CEILING: u8 = 32;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Viewport settings.
    pub viewport: ViewportConfig,
    /// Sphere tessellation settings.
    pub sphere: SphereConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Viewport configuration, read by the host when constructing the camera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f64,
    /// Near clip plane distance.
    pub near: f64,
    /// Far clip plane distance.
    pub far: f64,
}

/// Configuration of one tessellated sphere.
///
/// Validated by [`SphereConfig::validate`] before any LUT is generated
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SphereConfig {
    /// Sphere radius in world units. Must be positive and finite.
    pub radius: f64,
    /// Sphere center in world space.
    pub center: [f64; 3],
    /// Orientation quaternion as `[x, y, z, w]`. Must have non-zero length.
    pub orientation: [f64; 4],
    /// Hard ceiling on face subdivision depth.
    pub max_lod: u8,
    /// Subdivision depth of the static reference patch mesh.
    pub patch_levels: u32,
    /// Maximum terrain displacement above the base sphere, in world units.
    /// Inflates face bounding volumes and widens horizon-culling angles.
    pub max_terrain_height: f64,
    /// Target on-screen triangle edge size in pixels; drives the
    /// split-distance LUT.
    pub max_edge_size: f64,
    /// Fraction of the split-distance interval over which geometric
    /// morphing blends, in `(0, 1]`.
    pub morph_range: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Render patches as wireframe.
    pub wireframe_mode: bool,
    /// Color patches by LOD level instead of shading them.
    pub show_patch_levels: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fov_degrees: 30.0,
            near: 0.1,
            far: 5000.0,
        }
    }
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            center: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
            max_lod: 6,
            patch_levels: 4,
            max_terrain_height: 0.0,
            max_edge_size: 150.0,
            morph_range: 0.5,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            wireframe_mode: false,
            show_patch_levels: false,
            log_level: "info".to_string(),
        }
    }
}

impl SphereConfig {
    /// Earth-like preset: radius 6371 km in meters, terrain up to 9 km.
    pub fn earth_like() -> Self {
        Self {
            radius: 6_371_000.0,
            max_terrain_height: 9_000.0,
            ..Self::default()
        }
    }

    /// Check every field against its documented constraints.
    ///
    /// Called at sphere construction so a bad value fails with a
    /// descriptive error instead of propagating NaNs into the LUTs and
    /// silently breaking culling and split decisions at render time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                message: message.into(),
            }
        }

        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(invalid(
                "radius",
                format!("must be positive and finite, got {}", self.radius),
            ));
        }
        if !(self.max_terrain_height.is_finite() && self.max_terrain_height >= 0.0) {
            return Err(invalid(
                "max_terrain_height",
                format!(
                    "must be non-negative and finite, got {}",
                    self.max_terrain_height
                ),
            ));
        }
        if !(self.max_edge_size.is_finite() && self.max_edge_size > 0.0) {
            return Err(invalid(
                "max_edge_size",
                format!("must be positive and finite, got {}", self.max_edge_size),
            ));
        }
        if !(self.morph_range.is_finite() && self.morph_range > 0.0 && self.morph_range <= 1.0) {
            return Err(invalid(
                "morph_range",
                format!("must be in (0, 1], got {}", self.morph_range),
            ));
        }
        if self.max_lod > MAX_LOD_CEILING {
            return Err(invalid(
                "max_lod",
                format!("must be at most {MAX_LOD_CEILING}, got {}", self.max_lod),
            ));
        }
        if self.patch_levels == 0 || self.patch_levels > 8 {
            return Err(invalid(
                "patch_levels",
                format!("must be in 1..=8, got {}", self.patch_levels),
            ));
        }
        let q = self.orientation;
        let len_sq = q.iter().map(|c| c * c).sum::<f64>();
        if !(len_sq.is_finite() && len_sq > 1e-12) {
            return Err(invalid(
                "orientation",
                "quaternion must have non-zero length".to_string(),
            ));
        }

        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.sphere.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.sphere.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Default config directory (`<user config dir>/tellus`), if one exists
    /// on this platform.
    pub fn default_dir() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|d| d.join("tellus"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("width: 1920"));
        assert!(ron_str.contains("max_lod: 6"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `sphere` section entirely
        let ron_str = "(viewport: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.sphere, SphereConfig::default());
    }

    #[test]
    fn test_default_sphere_config_is_valid() {
        assert!(SphereConfig::default().validate().is_ok());
        assert!(SphereConfig::earth_like().validate().is_ok());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let config = SphereConfig {
            radius: -1.0,
            ..SphereConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn test_zero_max_edge_size_rejected() {
        // Would divide by zero in split-distance LUT generation.
        let config = SphereConfig {
            max_edge_size: 0.0,
            ..SphereConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_terrain_height_rejected() {
        let config = SphereConfig {
            max_terrain_height: f64::NAN,
            ..SphereConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_morph_range_bounds() {
        for bad in [0.0, -0.5, 1.5] {
            let config = SphereConfig {
                morph_range: bad,
                ..SphereConfig::default()
            };
            assert!(config.validate().is_err(), "morph_range {bad} should fail");
        }
        let ok = SphereConfig {
            morph_range: 1.0,
            ..SphereConfig::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_zero_orientation_rejected() {
        let config = SphereConfig {
            orientation: [0.0; 4],
            ..SphereConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.sphere.max_lod = 8;
        config.viewport.width = 2560;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.sphere.max_lod = 10;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result, Some(modified));
    }

    #[test]
    fn test_load_rejects_invalid_sphere() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.ron"),
            "(sphere: (radius: -5.0))",
        )
        .unwrap();
        assert!(Config::load_or_create(dir.path()).is_err());
    }
}
