//! Core type definitions for the scene compositor
//!
//! Plain value types shared by scene items, the ordering engine and the
//! render traversal.

use glam::{Mat4, Vec2};

/// Default canvas width used when no render context is supplied
pub const DEFAULT_BASE_WIDTH: u32 = 1920;
/// Default canvas height used when no render context is supplied
pub const DEFAULT_BASE_HEIGHT: u32 = 1080;

/// Rendering context injected into a scene at construction
///
/// Carries the canvas dimensions a scene reports as its own size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub base_width: u32,
    pub base_height: u32,
}

impl RenderContext {
    pub fn new(base_width: u32, base_height: u32) -> Self {
        Self {
            base_width,
            base_height,
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_WIDTH, DEFAULT_BASE_HEIGHT)
    }
}

/// Direction for reordering an item within its scene
///
/// The head of the list is painted first (visually behind), the tail last
/// (visually on top).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMovement {
    /// One slot toward the head
    Up = 0,
    /// One slot toward the tail
    Down = 1,
    /// To the tail, painted last
    Top = 2,
    /// To the head, painted first
    Bottom = 3,
}

/// 2D placement of a scene item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemTransform {
    /// Position in scene coordinates
    pub pos: Vec2,
    /// Scale factors (x, y)
    pub scale: Vec2,
    /// Pivot point
    pub origin: Vec2,
    /// Rotation in degrees
    pub rot: f32,
}

impl ItemTransform {
    /// Composite matrix applied while the item's source draws.
    ///
    /// Order: translate(origin) * scale(scale) * rotate(-rot) * translate(-pos)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.origin.extend(0.0))
            * Mat4::from_scale(self.scale.extend(1.0))
            * Mat4::from_rotation_z((-self.rot).to_radians())
            * Mat4::from_translation((-self.pos).extend(0.0))
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite()
            && self.scale.is_finite()
            && self.origin.is_finite()
            && self.rot.is_finite()
    }

    /// Approximate equality, used when comparing reloaded transforms
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.pos.abs_diff_eq(other.pos, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
            && self.origin.abs_diff_eq(other.origin, max_abs_diff)
            && (self.rot - other.rot).abs() <= max_abs_diff
    }
}

impl Default for ItemTransform {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            scale: Vec2::ONE,
            origin: Vec2::ZERO,
            rot: 0.0,
        }
    }
}
