//! Tunables for motion, gestures and projection, with the viewer's defaults.

use crate::error::{CoreError, CoreResult};

/// Which way a growing two-finger distance moves the object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PinchConvention {
    /// Spreading the fingers brings the object closer (positive depth delta).
    #[default]
    SpreadApproaches,
    /// Spreading the fingers pushes the object away.
    SpreadRecedes,
}

impl PinchConvention {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            PinchConvention::SpreadApproaches => 1.0,
            PinchConvention::SpreadRecedes => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    /// Degrees of target rotation per unit of normalized pointer coordinate.
    pub rotation_scale: f32,
    /// Depth change per unit of two-finger distance change (pixels).
    pub pinch_sensitivity: f32,
    pub pinch_convention: PinchConvention,
    /// Depth change per scroll line.
    pub scroll_step: f32,
    /// Degrees per discrete step rotation.
    pub step_degrees: f32,
    pub head_rate: f32,
    pub body_rate: f32,
    pub initial_depth: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            rotation_scale: 180.0,
            pinch_sensitivity: 0.01,
            pinch_convention: PinchConvention::default(),
            scroll_step: 0.5,
            step_degrees: 15.0,
            head_rate: 0.15,
            body_rate: 0.1,
            initial_depth: -5.0,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> CoreResult<()> {
        for rate in [self.head_rate, self.body_rate] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(CoreError::InvalidRate(rate));
            }
        }
        let finite = [
            ("rotation_scale", self.rotation_scale),
            ("pinch_sensitivity", self.pinch_sensitivity),
            ("scroll_step", self.scroll_step),
            ("step_degrees", self.step_degrees),
            ("initial_depth", self.initial_depth),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CoreError::InvalidConfig(format!("{name} = {value}")));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionConfig {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 45.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl ProjectionConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.fov_y_deg > 0.0 && self.fov_y_deg < 180.0) {
            return Err(CoreError::InvalidProjection(format!(
                "fov {} must be in (0, 180)",
                self.fov_y_deg
            )));
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(CoreError::InvalidProjection(format!(
                "clip planes near={} far={} must satisfy 0 < near < far",
                self.near, self.far
            )));
        }
        Ok(())
    }
}
