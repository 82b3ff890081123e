use core::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Smallest scale the board can be zoomed out to.
pub const MIN_SCALE: f32 = 0.3;
/// Largest scale the board can be zoomed in to.
pub const MAX_SCALE: f32 = 5.0;
/// Edge length of one cell in content units.
pub const CELL_SIZE: f32 = 48.0;
/// Gap kept inside each cell edge, taps on it can be ignored.
pub const CELL_PADDING: f32 = 1.0;
/// Margin around the whole grid in content units.
pub const CANVAS_PADDING: f32 = 8.0;
pub const ZOOM_IN_STEP: f32 = 1.25;
pub const ZOOM_OUT_STEP: f32 = 0.8;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Point {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(self) -> f32 {
        self.width / self.height
    }
}

/// Axis aligned rectangle, `left`/`top` being its screen offset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.left + self.width && p.y >= self.top && p.y <= self.top + self.height
    }
}

/// Translate plus uniform scale, `screen = content * scale + (tx, ty)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub tx: f32,
    pub ty: f32,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        tx: 0.0,
        ty: 0.0,
        scale: 1.0,
    };

    fn translation(&self) -> Point {
        Point::new(self.tx, self.ty)
    }

    /// Content point to screen point.
    pub fn apply(&self, p: Point) -> Point {
        p * self.scale + self.translation()
    }

    /// Screen point to content point.
    pub fn apply_inverse(&self, p: Point) -> Point {
        (p - self.translation()) / self.scale
    }

    pub fn invert(&self) -> Self {
        Self {
            tx: -self.tx / self.scale,
            ty: -self.ty / self.scale,
            scale: 1.0 / self.scale,
        }
    }

    /// Moves by a content-space delta, a screen drag of `d` is `pan_by(d / scale)`.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.tx += dx * self.scale;
        self.ty += dy * self.scale;
    }

    /// Scales by `factor` keeping the content under the screen point `pivot` in place.
    pub fn zoom_about(&mut self, factor: f32, pivot: Point) {
        let t = pivot - (pivot - self.translation()) * factor;
        self.tx = t.x;
        self.ty = t.y;
        self.scale *= factor;
    }

    /// Maps a screen point to the `(column, row)` of the grid cell under it.
    ///
    /// `None` for points left of or above the grid. With `require_inside_border` a point on the padded edge of a cell
    /// maps to nothing either.
    pub fn cell_from_screen_point(
        &self,
        p: Point,
        cell_size: f32,
        padding: f32,
        require_inside_border: bool,
    ) -> Option<(u32, u32)> {
        let content = self.apply_inverse(p);
        if !content.x.is_finite() || !content.y.is_finite() || content.x < 0.0 || content.y < 0.0 {
            return None;
        }
        let column = (content.x / cell_size).floor();
        let row = (content.y / cell_size).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        if require_inside_border {
            let inner = Rect::new(
                column * cell_size + padding,
                row * cell_size + padding,
                cell_size - 2.0 * padding,
                cell_size - 2.0 * padding,
            );
            if !inner.contains(content) {
                return None;
            }
        }
        Some((column as u32, row as u32))
    }
}

/// Adjusts a zoom `factor` so `current * factor` stays within `[min, max]`.
///
/// Already sitting on the bound in the zoom direction yields `1.0`, and so does a factor that is not a finite
/// positive number.
pub fn clamp_zoom(factor: f32, current: f32, min: f32, max: f32) -> f32 {
    if !factor.is_finite() || factor <= 0.0 {
        1.0
    } else if factor < 1.0 {
        if current <= min {
            1.0
        } else if current * factor < min {
            min / current
        } else {
            factor
        }
    } else if current >= max {
        1.0
    } else if current * factor > max {
        max / current
    } else {
        factor
    }
}

/// Centered, aspect preserving transform showing `content` inside `viewport`.
///
/// Content that already fits is shown at scale 1, anything larger is shrunk to fit along its tighter axis but never
/// below `min_scale`.
pub fn fit_initial(content: Size, viewport: Rect, min_scale: f32) -> ViewTransform {
    let scale = if content.width <= viewport.width && content.height <= viewport.height {
        1.0
    } else if content.aspect_ratio() > viewport.size().aspect_ratio() {
        viewport.width / content.width
    } else {
        viewport.height / content.height
    };
    let scale = if scale < min_scale {
        log::debug!("Initial scale {scale} below minimum, using {min_scale}");
        min_scale
    } else {
        scale
    };

    ViewTransform {
        tx: viewport.left + (viewport.width - content.width * scale) / 2.0,
        ty: viewport.top + (viewport.height - content.height * scale) / 2.0,
        scale,
    }
}
