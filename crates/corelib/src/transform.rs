use crate::error::{CoreError, CoreResult};

/// Orientation and depth of one posable object.
///
/// Angles are in degrees and unbounded. Targets are set by input; the current values
/// close a fixed fraction (`rate`) of the remaining gap on every [`advance`](Self::advance).
/// Depth has no target: zoom is applied directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformState {
    angle_x: f32,
    angle_y: f32,
    target_x: f32,
    target_y: f32,
    depth: f32,
    rate: f32,
}

impl TransformState {
    pub fn new(rate: f32) -> CoreResult<Self> {
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(CoreError::InvalidRate(rate));
        }
        Ok(Self {
            angle_x: 0.0,
            angle_y: 0.0,
            target_x: 0.0,
            target_y: 0.0,
            depth: 0.0,
            rate,
        })
    }

    #[inline]
    pub fn with_depth(mut self, depth: f32) -> Self {
        if depth.is_finite() {
            self.depth = depth;
        }
        self
    }

    #[inline]
    pub fn angle_x(&self) -> f32 {
        self.angle_x
    }

    #[inline]
    pub fn angle_y(&self) -> f32 {
        self.angle_y
    }

    #[inline]
    pub fn target(&self) -> (f32, f32) {
        (self.target_x, self.target_y)
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.depth
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Retarget the orientation. Non-finite targets are ignored.
    pub fn set_target(&mut self, x: f32, y: f32) {
        if !(x.is_finite() && y.is_finite()) {
            log::debug!("Ignoring non-finite target ({x}, {y})");
            return;
        }
        self.target_x = x;
        self.target_y = y;
    }

    /// Discrete rotation: shift the target by a fixed amount.
    pub fn step(&mut self, dx: f32, dy: f32) {
        self.set_target(self.target_x + dx, self.target_y + dy);
    }

    /// Additive, unclamped zoom.
    pub fn zoom(&mut self, delta: f32) {
        let depth = self.depth + delta;
        if !depth.is_finite() {
            log::debug!("Ignoring zoom by {delta}: depth would become {depth}");
            return;
        }
        self.depth = depth;
    }

    /// One frame of first-order approach toward the target.
    pub fn advance(&mut self) {
        self.angle_x += (self.target_x - self.angle_x) * self.rate;
        self.angle_y += (self.target_y - self.angle_y) * self.rate;
    }

    /// Jump straight to the target.
    pub fn snap(&mut self) {
        self.angle_x = self.target_x;
        self.angle_y = self.target_y;
    }
}
