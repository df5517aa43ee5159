//! Model and projection matrices for the posable objects.
//!
//! All matrices are column-major `glam::Mat4` values in OpenGL clip convention
//! (right-handed, z in [-1, 1]); the renderer converts depth range on upload.

use crate::config::ProjectionConfig;
use crate::error::CoreResult;
use crate::transform::TransformState;
use crate::{Mat4, Vec3};

/// Perspective projection built by hand from the field of view.
///
/// The depth row is `(near - far) / (far - near)` and `-2 * far * near / (far - near)`
/// with `-1` in the w row.
pub fn perspective(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let a = 1.0 / (fov_y_deg.to_radians() / 2.0).tan();
    let d = far - near;
    Mat4::from_cols_array(&[
        a / aspect, 0.0, 0.0, 0.0, //
        0.0, a, 0.0, 0.0, //
        0.0, 0.0, (near - far) / d, -1.0, //
        0.0, 0.0, -2.0 * far * near / d, 0.0,
    ])
}

/// Off-center frustum. Element `[2][0]` is `(r + l) / (r - l)`, not twice that.
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let w = right - left;
    let h = top - bottom;
    let d = far - near;
    Mat4::from_cols_array(&[
        2.0 * near / w, 0.0, 0.0, 0.0, //
        0.0, 2.0 * near / h, 0.0, 0.0, //
        (right + left) / w, (top + bottom) / h, -(far + near) / d, -1.0, //
        0.0, 0.0, -2.0 * far * near / d, 0.0,
    ])
}

/// Aspect ratio that keeps pixels square: the larger axis decides which way the
/// field of view is stretched.
pub fn viewport_aspect(width: u32, height: u32) -> f32 {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    if w > h {
        w / h
    } else {
        1.0 / (h / w)
    }
}

/// identity * T(0, 0, depth) * Ry(angle_y) * Rx(angle_x).
pub fn model_matrix(state: &TransformState) -> Mat4 {
    Mat4::IDENTITY
        * Mat4::from_translation(Vec3::new(0.0, 0.0, state.depth()))
        * Mat4::from_rotation_y(state.angle_y().to_radians())
        * Mat4::from_rotation_x(state.angle_x().to_radians())
}

/// Owns the current projection; rebuilt on every viewport resize.
#[derive(Clone, Copy, Debug)]
pub struct FrameTransformBuilder {
    config: ProjectionConfig,
    aspect: f32,
    projection: Mat4,
}

impl FrameTransformBuilder {
    pub fn new(config: ProjectionConfig, width: u32, height: u32) -> CoreResult<Self> {
        config.validate()?;
        let mut builder = Self {
            config,
            aspect: 1.0,
            projection: Mat4::IDENTITY,
        };
        builder.resize(width, height);
        Ok(builder)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = viewport_aspect(width, height);
        self.projection = perspective(
            self.config.fov_y_deg,
            self.aspect,
            self.config.near,
            self.config.far,
        );
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn model_matrix(&self, state: &TransformState) -> Mat4 {
        model_matrix(state)
    }

    /// Projection times model, for callers that upload a single MVP.
    #[inline]
    pub fn mvp(&self, state: &TransformState) -> Mat4 {
        self.projection * model_matrix(state)
    }
}
