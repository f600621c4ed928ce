//! Per-shot pan/zoom transform.

use serde::{Deserialize, Serialize};

use crate::geometry::Offset;

/// Smallest zoom a shot may carry.
pub const MIN_SCALE: f64 = 0.05;

/// Largest zoom a shot may carry.
pub const MAX_SCALE: f64 = 20.0;

/// The user's pan/zoom adjustment for one shot.
///
/// `offset` is the top-left of the drawn frame in preview-box pixels and
/// `scale` multiplies the cover-fit base scale. Frozen once the shot is
/// confirmed. Deserialized scales are clamped like [`ShotTransform::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawShotTransform")]
pub struct ShotTransform {
    pub offset: Offset,
    pub scale: f64,
}

impl ShotTransform {
    /// No pan, no zoom.
    pub const IDENTITY: ShotTransform = ShotTransform {
        offset: Offset::ZERO,
        scale: 1.0,
    };

    /// Create a transform, clamping `scale` into `[MIN_SCALE, MAX_SCALE]`.
    pub fn new(offset: Offset, scale: f64) -> Self {
        Self {
            offset,
            scale: clamp_scale(scale),
        }
    }

    /// Same transform with a different offset.
    pub fn with_offset(self, offset: Offset) -> Self {
        Self { offset, ..self }
    }

    /// Same transform with a different (clamped) scale.
    pub fn with_scale(self, scale: f64) -> Self {
        Self {
            scale: clamp_scale(scale),
            ..self
        }
    }
}

/// Wire form of [`ShotTransform`] before the scale is clamped.
#[derive(Deserialize)]
struct RawShotTransform {
    offset: Offset,
    scale: f64,
}

impl From<RawShotTransform> for ShotTransform {
    fn from(raw: RawShotTransform) -> Self {
        Self::new(raw.offset, raw.scale)
    }
}

impl Default for ShotTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Clamp a zoom factor into the valid range. Non-finite input maps to the
/// nearest bound (`NaN` maps to the minimum).
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_default() {
        assert_eq!(ShotTransform::default(), ShotTransform::IDENTITY);
        assert_eq!(ShotTransform::IDENTITY.scale, 1.0);
    }

    #[test]
    fn test_new_clamps_scale() {
        assert_eq!(ShotTransform::new(Offset::ZERO, 0.0).scale, MIN_SCALE);
        assert_eq!(ShotTransform::new(Offset::ZERO, -3.0).scale, MIN_SCALE);
        assert_eq!(ShotTransform::new(Offset::ZERO, 1000.0).scale, MAX_SCALE);
        assert_eq!(ShotTransform::new(Offset::ZERO, f64::NAN).scale, MIN_SCALE);
        assert_eq!(ShotTransform::new(Offset::ZERO, f64::INFINITY).scale, MAX_SCALE);
        assert_eq!(ShotTransform::new(Offset::ZERO, 1.5).scale, 1.5);
    }

    #[test]
    fn test_with_offset_keeps_scale() {
        let t = ShotTransform::new(Offset::ZERO, 2.0).with_offset(Offset::new(5.0, -5.0));
        assert_eq!(t.scale, 2.0);
        assert_eq!(t.offset, Offset::new(5.0, -5.0));
    }

    #[test]
    fn test_serialization_shape() {
        let t = ShotTransform::new(Offset::new(50.0, -20.0), 1.25);
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["offset"]["x"], 50.0);
        assert_eq!(json["scale"], 1.25);
    }

    #[test]
    fn test_deserialize_clamps_scale() {
        let low: ShotTransform =
            serde_json::from_str(r#"{"offset":{"x":1.0,"y":2.0},"scale":-1.0}"#).unwrap();
        assert_eq!(low.scale, MIN_SCALE);
        assert_eq!(low.offset, Offset::new(1.0, 2.0));

        let high: ShotTransform =
            serde_json::from_str(r#"{"offset":{"x":0.0,"y":0.0},"scale":500.0}"#).unwrap();
        assert_eq!(high.scale, MAX_SCALE);
    }
}
