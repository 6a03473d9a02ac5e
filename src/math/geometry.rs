//! Canvas-space geometry shared by grids, cells and dragged items
//!
//! Canvas space is y-down with its origin at the top-left corner. A
//! [`RectTransform`] places its pivot at `position`; local coordinates of a
//! rect are measured from that pivot. Screen space is whatever the input
//! surface reports, and a [`Camera`] converts between the two.

use serde::Deserialize;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Two-component vector used for points, sizes and normalized pivots
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Vec2 {
    /// Horizontal component (grows rightward)
    pub x: f32,
    /// Vertical component (grows downward)
    pub y: f32,
}

impl Vec2 {
    /// Both components zero
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// Both components one
    pub const ONE: Self = Self::new(1.0, 1.0);
    /// Normalized center pivot
    pub const HALF: Self = Self::new(0.5, 0.5);

    /// Create a vector from components
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise product
    #[must_use]
    pub fn scale(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Component-wise absolute value
    #[must_use]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Component-wise maximum against a scalar floor
    #[must_use]
    pub fn max_scalar(self, floor: f32) -> Self {
        Self::new(self.x.max(floor), self.y.max(floor))
    }

    /// Component-wise clamp into `[min, max]`
    #[must_use]
    pub fn clamp_scalar(self, min: f32, max: f32) -> Self {
        Self::new(self.x.clamp(min, max), self.y.clamp(min, max))
    }

    /// True when both components are finite
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle with a normalized pivot, in canvas space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectTransform {
    /// Canvas-space position of the pivot
    pub position: Vec2,
    /// Width and height in canvas pixels
    pub size: Vec2,
    /// Normalized pivot, `(0,0)` top-left and `(1,1)` bottom-right
    pub pivot: Vec2,
}

impl Default for RectTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            pivot: Vec2::HALF,
        }
    }
}

impl RectTransform {
    /// Create a rect whose top-left corner sits at `top_left`
    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self {
            position: top_left,
            size,
            pivot: Vec2::ZERO,
        }
    }

    /// Canvas-space top-left corner
    pub fn top_left(&self) -> Vec2 {
        self.position - self.size.scale(self.pivot)
    }

    /// Canvas-space center
    pub fn center(&self) -> Vec2 {
        self.top_left() + self.size * 0.5
    }

    /// Top-left corner expressed in this rect's local space
    pub fn local_top_left(&self) -> Vec2 {
        -self.size.scale(self.pivot)
    }

    /// Convert a canvas point into this rect's local space
    pub fn to_local(&self, canvas: Vec2) -> Vec2 {
        canvas - self.position
    }

    /// Convert a local point back into canvas space
    pub fn to_canvas(&self, local: Vec2) -> Vec2 {
        local + self.position
    }

    /// Half-open containment test (`[min, max)` on both axes)
    pub fn contains(&self, canvas: Vec2) -> bool {
        let min = self.top_left();
        let max = min + self.size;
        canvas.x >= min.x && canvas.x < max.x && canvas.y >= min.y && canvas.y < max.y
    }

    /// Move the pivot without moving the rect on the canvas
    pub fn set_pivot_preserving_position(&mut self, pivot: Vec2) {
        let top_left = self.top_left();
        self.pivot = pivot;
        self.position = top_left + self.size.scale(pivot);
    }

    /// Place the rect so that its top-left corner sits at `top_left`
    pub fn set_top_left(&mut self, top_left: Vec2) {
        self.position = top_left + self.size.scale(self.pivot);
    }
}

/// Projection between screen space and canvas space
///
/// Implemented by the render/input surface. Returning `None` means the point
/// cannot be projected (for example, a degenerate camera), which every caller
/// treats as "outside".
pub trait Camera {
    /// Project a screen point onto the canvas
    fn screen_to_canvas(&self, screen: Vec2) -> Option<Vec2>;

    /// Project a canvas point back onto the screen
    fn canvas_to_screen(&self, canvas: Vec2) -> Option<Vec2>;
}

/// Screen-space overlay where screen and canvas coincide
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayCamera;

impl Camera for OverlayCamera {
    fn screen_to_canvas(&self, screen: Vec2) -> Option<Vec2> {
        Some(screen)
    }

    fn canvas_to_screen(&self, canvas: Vec2) -> Option<Vec2> {
        Some(canvas)
    }
}

/// Uniformly scaled canvas displaced by a screen offset
#[derive(Debug, Clone, Copy)]
pub struct OrthoCamera {
    /// Screen position of the canvas origin
    pub offset: Vec2,
    /// Screen pixels per canvas pixel
    pub scale: f32,
}

impl Camera for OrthoCamera {
    fn screen_to_canvas(&self, screen: Vec2) -> Option<Vec2> {
        if self.scale <= f32::EPSILON || !self.scale.is_finite() {
            return None;
        }
        Some((screen - self.offset) / self.scale)
    }

    fn canvas_to_screen(&self, canvas: Vec2) -> Option<Vec2> {
        if self.scale <= f32::EPSILON || !self.scale.is_finite() {
            return None;
        }
        Some(canvas * self.scale + self.offset)
    }
}

/// Test whether a screen point falls inside a canvas rect
pub fn rectangle_contains_screen_point(
    rect: &RectTransform,
    screen: Vec2,
    camera: &dyn Camera,
) -> bool {
    camera
        .screen_to_canvas(screen)
        .is_some_and(|canvas| rect.contains(canvas))
}

/// Convert a screen point into a rect's local space
pub fn screen_point_to_local_point(
    rect: &RectTransform,
    screen: Vec2,
    camera: &dyn Camera,
) -> Option<Vec2> {
    camera
        .screen_to_canvas(screen)
        .map(|canvas| rect.to_local(canvas))
}

/// Floor a float to the containing integer cell index
///
/// Saturates on non-finite input so corrupt geometry maps far outside any grid
/// instead of wrapping.
pub fn floor_to_index(value: f32) -> i32 {
    if value.is_nan() {
        return i32::MIN;
    }
    value.floor() as i32
}
