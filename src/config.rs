use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::GestureError;

/// Thresholds for the classifier and the debouncer.
///
/// Distances are in normalized image units, angles in degrees.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// Every joint angle along a finger must exceed this for it to count as extended.
    pub straight_angle_deg: f32,
    /// Minimum index/middle spread at the index base for "peace".
    pub peace_min_spread_deg: f32,
    /// Maximum thumb-tip to index-tip distance for "ok".
    pub ok_max_pinch: f32,
    /// Minimum |middle base x - wrist x| for "wave".
    pub wave_min_horizontal: f32,
    /// Maximum |middle base y - wrist y| for "stop".
    pub stop_max_vertical: f32,
    /// A label is confirmed once seen on more than this many consecutive frames.
    pub confirm_frames: u32,
    pub cooldown_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            straight_angle_deg: 160.0,
            peace_min_spread_deg: 30.0,
            ok_max_pinch: 0.1,
            wave_min_horizontal: 0.3,
            stop_max_vertical: 0.1,
            confirm_frames: 10,
            cooldown_ms: 1_000,
        }
    }
}

impl GestureConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: GestureConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        check_angle("straight_angle_deg", self.straight_angle_deg)?;
        check_angle("peace_min_spread_deg", self.peace_min_spread_deg)?;
        check_distance("ok_max_pinch", self.ok_max_pinch)?;
        check_distance("wave_min_horizontal", self.wave_min_horizontal)?;
        check_distance("stop_max_vertical", self.stop_max_vertical)?;
        if self.cooldown_ms == 0 {
            return Err(GestureError::config("cooldown_ms", "must be greater than zero"));
        }
        Ok(())
    }
}

fn check_angle(field: &'static str, value: f32) -> Result<(), GestureError> {
    if !value.is_finite() || value <= 0.0 || value > 180.0 {
        return Err(GestureError::config(
            field,
            format!("must be within (0, 180] degrees, got {value}"),
        ));
    }
    Ok(())
}

fn check_distance(field: &'static str, value: f32) -> Result<(), GestureError> {
    if !value.is_finite() || value < 0.0 {
        return Err(GestureError::config(
            field,
            format!("must be a non-negative distance, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GestureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cooldown(), Duration::from_millis(1_000));
    }

    #[test]
    fn rejects_negative_distance() {
        let config = GestureConfig {
            ok_max_pinch: -0.1,
            ..GestureConfig::default()
        };
        match config.validate() {
            Err(GestureError::Configuration { field, .. }) => assert_eq!(field, "ok_max_pinch"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_angles_and_zero_cooldown() {
        for config in [
            GestureConfig {
                straight_angle_deg: 200.0,
                ..GestureConfig::default()
            },
            GestureConfig {
                peace_min_spread_deg: f32::NAN,
                ..GestureConfig::default()
            },
            GestureConfig {
                cooldown_ms: 0,
                ..GestureConfig::default()
            },
        ] {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GestureConfig = toml::from_str("confirm_frames = 5\ncooldown_ms = 250\n").unwrap();
        assert_eq!(config.confirm_frames, 5);
        assert_eq!(config.cooldown_ms, 250);
        assert_eq!(config.straight_angle_deg, 160.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<GestureConfig>("threshold = 3\n").is_err());
    }
}
