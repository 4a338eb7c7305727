//! Error types for turret configuration.

/// A `TurretConfig` value that the controller cannot run with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{field}` must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("raycast mask bit {0} is out of range (0..32)")]
    MaskBitOutOfRange(u8),

    #[error("aim smoothing must be within [0, 1), got {0}")]
    SmoothingOutOfRange(f64),
}
