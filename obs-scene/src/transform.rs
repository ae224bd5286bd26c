//! Transform stack consumed by the render traversal
//!
//! The scene only talks to the graphics backend through [`GraphicsContext`].
//! [`MatrixStack`] is a CPU implementation built on glam that backends (and
//! tests) can use to track the current matrix.

use glam::{Mat4, Vec3};

/// Matrix stack operations the render traversal needs from a graphics backend
///
/// Every operation post-multiplies the current matrix, so operations applied
/// later act on coordinates first.
pub trait GraphicsContext {
    /// Save the current matrix
    fn push_matrix(&mut self);

    /// Restore the most recently pushed matrix
    fn pop_matrix(&mut self);

    fn translate(&mut self, x: f32, y: f32);

    fn scale(&mut self, x: f32, y: f32);

    /// Rotate about the z axis, in radians
    fn rotate(&mut self, radians: f32);

    /// The matrix currently in effect
    fn current(&self) -> Mat4;
}

/// glam-backed matrix stack
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl MatrixStack {
    pub fn new() -> Self {
        Self::with_base(Mat4::IDENTITY)
    }

    /// Start from an arbitrary base matrix (e.g. a projection)
    pub fn with_base(base: Mat4) -> Self {
        Self {
            current: base,
            saved: Vec::with_capacity(8),
        }
    }

    /// Number of matrices currently pushed
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for MatrixStack {
    fn push_matrix(&mut self) {
        self.saved.push(self.current);
    }

    fn pop_matrix(&mut self) {
        match self.saved.pop() {
            Some(matrix) => self.current = matrix,
            None => log::warn!("pop_matrix called on an empty matrix stack"),
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.current *= Mat4::from_translation(Vec3::new(x, y, 0.0));
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.current *= Mat4::from_scale(Vec3::new(x, y, 1.0));
    }

    fn rotate(&mut self, radians: f32) {
        self.current *= Mat4::from_rotation_z(radians);
    }

    fn current(&self) -> Mat4 {
        self.current
    }
}
